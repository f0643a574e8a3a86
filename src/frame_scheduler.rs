//! Frame pacing for the render loop.
//!
//! The scheduler never sleeps itself: it renders, pushes the frame and the
//! process flags to the output driver, and tells the caller how long to
//! wait before the next frame.

use embassy_time::{Duration, Instant};

use crate::{Engine, OutputDriver, clock::elapsed_ms};

/// Default target frame rate (90 FPS).
pub const DEFAULT_FPS: u32 = 90;

/// Default frame duration based on target FPS.
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_FPS as u64);

/// Frames the schedule may fall behind before it is restarted from now
const MAX_DRIFT_FRAMES: u64 = 2;

/// Result of a frame tick operation.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long to wait until the next frame (zero when behind schedule).
    pub sleep_duration: Duration,
}

/// Portable frame scheduler.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(engine, driver);
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     Timer::after(result.sleep_duration).await;
/// }
/// ```
pub struct FrameScheduler<'a, O: OutputDriver, const MAX_LEDS: usize, const INTENT_CHANNEL_SIZE: usize>
{
    output: O,
    engine: Engine<'a, MAX_LEDS, INTENT_CHANNEL_SIZE>,
    next_frame: Option<Instant>,
    frame_duration: Duration,
}

impl<'a, O: OutputDriver, const MAX_LEDS: usize, const INTENT_CHANNEL_SIZE: usize>
    FrameScheduler<'a, O, MAX_LEDS, INTENT_CHANNEL_SIZE>
{
    /// Create a new frame scheduler running at `DEFAULT_FPS`.
    pub fn new(engine: Engine<'a, MAX_LEDS, INTENT_CHANNEL_SIZE>, driver: O) -> Self {
        Self::with_frame_duration(engine, driver, DEFAULT_FRAME_DURATION)
    }

    pub fn with_frame_duration(
        engine: Engine<'a, MAX_LEDS, INTENT_CHANNEL_SIZE>,
        driver: O,
        frame_duration: Duration,
    ) -> Self {
        Self {
            output: driver,
            engine,
            next_frame: None,
            frame_duration,
        }
    }

    /// Render one frame, write it out and return the next deadline.
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        let frame_ms = self.frame_duration.as_millis();
        let scheduled = match self.next_frame {
            // Restart the schedule after a long stall instead of bursting
            Some(next) if now > next && elapsed_ms(now, next) > frame_ms * MAX_DRIFT_FRAMES => now,
            Some(next) => next,
            None => now,
        };

        let frame = self.engine.render(now);
        self.output.write(frame);
        self.output.flags(self.engine.flags());

        let next_frame = scheduled + self.frame_duration;
        self.next_frame = Some(next_frame);

        let sleep_duration = if next_frame > now {
            Duration::from_millis(elapsed_ms(next_frame, now))
        } else {
            Duration::from_millis(0)
        };

        FrameResult {
            next_deadline: next_frame,
            sleep_duration,
        }
    }

    pub fn engine(&self) -> &Engine<'a, MAX_LEDS, INTENT_CHANNEL_SIZE> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<'a, MAX_LEDS, INTENT_CHANNEL_SIZE> {
        &mut self.engine
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}
