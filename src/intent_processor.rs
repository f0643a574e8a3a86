//! Intent processing module
//!
//! Drains intents posted by collaborators. Segment edits are applied to
//! the controller right away; cycle, reset and test-mode requests are
//! handed back to the engine, which owns the clock and the cycle timer.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::bounds::PixelRange;
use crate::channel::{Mailbox, Receiver, Sender};
use crate::controller::{SegmentChange, StageController};
use crate::pixel_buffer::PixelBuffer;
use crate::segment::{SegmentConfig, SegmentId};

/// A request from outside the render loop
#[derive(Debug, Clone)]
pub enum EngineIntent {
    /// Operator button: raise the source flag and start the cycle timer
    StartCycle,
    /// Full-chain reset
    Reset,
    /// Change one field of a segment
    Segment(SegmentId, SegmentChange),
    /// Append a user-defined segment
    AddCustom(SegmentConfig),
    /// Remove a user-defined segment
    RemoveCustom(SegmentId),
    /// Suspend the chain and sweep a white pixel over the range
    StartTest(PixelRange),
    /// Leave test mode with a full-chain reset
    StopTest,
}

/// Test mode request collected from the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestRequest {
    Start(PixelRange),
    Stop,
}

/// Side effects from processing intents that the engine should apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentEffects {
    pub start_cycle: bool,
    pub reset: bool,
    /// Latest test mode request, if any
    pub test: Option<TestRequest>,
}

impl IntentEffects {
    /// Check if any effects need to be applied
    pub const fn has_effects(&self) -> bool {
        self.start_cycle || self.reset || self.test.is_some()
    }
}

/// Type alias for intent sender
pub type IntentSender<'a, const SIZE: usize> = Sender<'a, EngineIntent, SIZE>;

/// Type alias for intent receiver
pub type IntentReceiver<'a, const SIZE: usize> = Receiver<'a, EngineIntent, SIZE>;

/// Type alias for the intent channel
pub type IntentChannel<const SIZE: usize> = Mailbox<EngineIntent, SIZE>;

pub struct IntentProcessor<'a, const SIZE: usize> {
    intents: IntentReceiver<'a, SIZE>,
}

impl<'a, const SIZE: usize> IntentProcessor<'a, SIZE> {
    pub const fn new(intents: IntentReceiver<'a, SIZE>) -> Self {
        Self { intents }
    }

    /// Process all pending intents from the channel (non-blocking)
    ///
    /// A rejected segment edit is logged and dropped; the remaining
    /// intents are still processed.
    pub fn process_pending<const MAX_LEDS: usize, const N: usize>(
        &mut self,
        controller: &mut StageController<MAX_LEDS>,
        pixels: &mut PixelBuffer<N>,
    ) -> IntentEffects {
        let mut effects = IntentEffects::default();

        while let Some(intent) = self.intents.take() {
            match intent {
                EngineIntent::StartCycle => effects.start_cycle = true,
                EngineIntent::Reset => effects.reset = true,
                EngineIntent::StartTest(range) => effects.test = Some(TestRequest::Start(range)),
                EngineIntent::StopTest => effects.test = Some(TestRequest::Stop),
                EngineIntent::Segment(id, change) => {
                    if let Err(_error) = controller.apply(id, change, pixels) {
                        #[cfg(feature = "esp32-log")]
                        println!("[IntentProcessor.process_pending] segment {}: {}", id.0, _error);
                    }
                }
                EngineIntent::AddCustom(config) => {
                    if let Err(_error) = controller.add_custom(config) {
                        #[cfg(feature = "esp32-log")]
                        println!("[IntentProcessor.process_pending] add custom: {}", _error);
                    }
                }
                EngineIntent::RemoveCustom(id) => {
                    if let Err(_error) = controller.remove_custom(id, pixels) {
                        #[cfg(feature = "esp32-log")]
                        println!("[IntentProcessor.process_pending] remove {}: {}", id.0, _error);
                    }
                }
            }
        }

        effects
    }
}
