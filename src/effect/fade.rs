//! Breathing fade between a dim floor and full brightness
//!
//! One fade state is shared by every segment that breathes, so all fading
//! segments pulse in phase.

use embassy_time::{Duration, Instant};

use crate::{
    bounds::PixelRange,
    clock::elapsed_ms,
    color::{Rgb, scale_color},
    math8::{progress8, scale8},
    pixel_buffer::PixelBuffer,
    segment::SegmentRuntime,
};

/// Lowest brightness of the breathing cycle (5%)
pub const FADE_FLOOR: u8 = 13;
const FADE_SPAN: u8 = 255 - FADE_FLOOR;

#[derive(Debug, Clone)]
pub struct FadeEffect {
    /// Half-cycle used when a call does not override it
    duration: Duration,
    last_flip: Instant,
    fading_in: bool,
}

impl FadeEffect {
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            last_flip: Instant::from_millis(0),
            fading_in: true,
        }
    }

    pub const fn is_fading_in(&self) -> bool {
        self.fading_in
    }

    pub fn reset(&mut self, now: Instant) {
        self.last_flip = now;
        self.fading_in = true;
    }

    /// Brightness for the current phase (`FADE_FLOOR..=255`)
    fn brightness(&self, elapsed: u64, duration: Duration) -> u8 {
        let progress = progress8(Duration::from_millis(elapsed), duration);
        if self.fading_in {
            FADE_FLOOR + scale8(FADE_SPAN, progress)
        } else {
            255 - scale8(FADE_SPAN, progress)
        }
    }

    /// Paint `range` at the current breathing brightness
    pub fn render<const N: usize>(
        &mut self,
        pixels: &mut PixelBuffer<N>,
        range: PixelRange,
        color: Rgb,
        duration: Option<Duration>,
        runtime: &mut SegmentRuntime,
        now: Instant,
    ) {
        if runtime.first_run {
            pixels.fill(range, scale_color(color, FADE_FLOOR));
            runtime.first_run = false;
            self.last_flip = now;
            return;
        }

        let duration = duration.unwrap_or(self.duration);
        let duration = if duration.as_millis() == 0 {
            Duration::from_millis(1)
        } else {
            duration
        };

        let mut elapsed = elapsed_ms(now, self.last_flip);
        if elapsed >= duration.as_millis() {
            self.fading_in = !self.fading_in;
            self.last_flip = now;
            elapsed = 0;
        }

        pixels.fill(range, scale_color(color, self.brightness(elapsed, duration)));
    }
}
