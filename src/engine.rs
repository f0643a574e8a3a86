use embassy_time::Instant;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::Rgb;
use crate::config::{ConfigError, EngineConfig};
use crate::controller::StageController;
use crate::cycle::{CycleEvent, CycleTimer};
use crate::intent_processor::{IntentEffects, IntentProcessor, IntentReceiver, TestRequest};
use crate::pixel_buffer::PixelBuffer;
use crate::test_sweep::TestSweep;
use crate::trigger::ProcessFlags;

/// Stage lights engine - the main orchestrator
pub struct Engine<'a, const MAX_LEDS: usize, const INTENT_CHANNEL_SIZE: usize> {
    // External dependencies
    intent_processor: IntentProcessor<'a, INTENT_CHANNEL_SIZE>,

    // Internal state
    controller: StageController<MAX_LEDS>,
    cycle: CycleTimer,
    pixels: PixelBuffer<MAX_LEDS>,
    test: Option<TestSweep>,
    auto_start_pending: bool,
}

impl<'a, const MAX_LEDS: usize, const INTENT_CHANNEL_SIZE: usize>
    Engine<'a, MAX_LEDS, INTENT_CHANNEL_SIZE>
{
    /// Validate `config` and build an engine reading intents from `intents`
    pub fn new(
        intents: IntentReceiver<'a, INTENT_CHANNEL_SIZE>,
        config: &EngineConfig,
    ) -> Result<Self, ConfigError> {
        let mut config = config.clone();
        config.validate(MAX_LEDS)?;

        Ok(Self {
            intent_processor: IntentProcessor::new(intents),
            controller: StageController::new(&config),
            cycle: CycleTimer::new(config.cycle),
            pixels: PixelBuffer::new(usize::from(config.led_count)),
            test: None,
            auto_start_pending: config.cycle.auto_start,
        })
    }

    /// Process one frame
    ///
    /// This is the main render loop step. Call this continuously with the
    /// current time; the returned slice covers the wired pixels only.
    pub fn render(&mut self, now: Instant) -> &[Rgb] {
        self.process_intents(now);

        if core::mem::take(&mut self.auto_start_pending) {
            self.start_cycle(now);
        }

        if let Some(test) = &mut self.test {
            test.render(&mut self.pixels, now);
            return self.pixels.as_slice();
        }

        match self.cycle.tick(now) {
            Some(CycleEvent::SourceExpired) => {
                #[cfg(feature = "esp32-log")]
                println!("[Engine.render] source time is over");
                self.controller.set_flag(self.cycle.config().source, false);
            }
            Some(CycleEvent::Finished) => {
                #[cfg(feature = "esp32-log")]
                println!("[Engine.render] cycle finished");
                self.controller.reset(&mut self.pixels, now);
            }
            None => {}
        }

        self.controller.tick(&mut self.pixels, now);
        self.pixels.as_slice()
    }

    /// Current process flags, for relays and status display
    pub const fn flags(&self) -> ProcessFlags {
        self.controller.flags()
    }

    /// No cycle is running and the start button would be accepted
    pub const fn is_ready(&self) -> bool {
        self.cycle.is_ready() && self.test.is_none()
    }

    pub const fn is_testing(&self) -> bool {
        self.test.is_some()
    }

    pub const fn controller(&self) -> &StageController<MAX_LEDS> {
        &self.controller
    }

    pub fn pixels(&self) -> &[Rgb] {
        self.pixels.as_slice()
    }

    /// Start a cycle; ignored while one is running or in test mode
    pub fn start_cycle(&mut self, now: Instant) -> bool {
        if self.test.is_some() || !self.cycle.start(now) {
            return false;
        }
        #[cfg(feature = "esp32-log")]
        println!("[Engine.start_cycle] cycle started");
        self.controller.set_flag(self.cycle.config().source, true);
        true
    }

    /// Full-chain reset; also cancels a running cycle and leaves test mode
    pub fn reset(&mut self, now: Instant) {
        self.cycle.cancel();
        self.test = None;
        self.controller.reset(&mut self.pixels, now);
    }

    /// Process pending intents from the channel (non-blocking)
    fn process_intents(&mut self, now: Instant) {
        let effects = self
            .intent_processor
            .process_pending(&mut self.controller, &mut self.pixels);

        self.apply_effects(effects, now);
    }

    /// Apply side effects from intent processing
    fn apply_effects(&mut self, effects: IntentEffects, now: Instant) {
        if effects.reset {
            self.reset(now);
        }

        match effects.test {
            Some(TestRequest::Start(range)) => {
                #[cfg(feature = "esp32-log")]
                println!("[Engine.apply_effects] test mode {}..={}", range.start(), range.end());
                self.cycle.cancel();
                self.pixels.clear_all();
                self.test = Some(TestSweep::new(range));
            }
            Some(TestRequest::Stop) => {
                #[cfg(feature = "esp32-log")]
                println!("[Engine.apply_effects] test mode off");
                self.reset(now);
            }
            None => {}
        }

        if effects.start_cycle {
            self.start_cycle(now);
        }
    }
}
