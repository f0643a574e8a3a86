//! LED check: a single white pixel walking across a range

use embassy_time::{Duration, Instant};

use crate::{
    bounds::{Direction, PixelRange},
    clock::has_elapsed,
    color::WHITE,
    pixel_buffer::PixelBuffer,
};

/// Time each pixel stays lit
pub const TEST_STEP: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSweep {
    range: PixelRange,
    cursor: u16,
    last_step: Option<Instant>,
}

impl TestSweep {
    pub const fn new(range: PixelRange) -> Self {
        Self {
            range,
            cursor: range.start(),
            last_step: None,
        }
    }

    pub const fn range(&self) -> PixelRange {
        self.range
    }

    /// Pixel lit by the next step
    pub const fn cursor(&self) -> u16 {
        self.cursor
    }

    pub fn render<const N: usize>(&mut self, pixels: &mut PixelBuffer<N>, now: Instant) {
        if let Some(last) = self.last_step {
            if !has_elapsed(now, last, TEST_STEP) {
                return;
            }
        }
        self.last_step = Some(now);

        pixels.clear_all();
        pixels.set(self.cursor, WHITE);
        self.cursor = self.range.next(self.cursor, Direction::Forward);
    }
}
