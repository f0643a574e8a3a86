//! Fire simulation with a fixed heat palette
//!
//! Heat cells cover the whole pixel buffer, so a segment can sit anywhere
//! on the strip.

use embassy_time::{Duration, Instant};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    bounds::PixelRange,
    clock::has_elapsed,
    color::heat_color,
    math8::{qadd8, qsub8, scale8},
    pixel_buffer::PixelBuffer,
    segment::SegmentRuntime,
};

/// Fire redraws at its own pace, independent of the segment delay
pub const FIRE_FRAME_INTERVAL: Duration = Duration::from_millis(50);

const COOLING: usize = 55;
const SPARKING: u8 = 120;
/// Sparks land within this many pixels of the low end
const SPARK_ZONE: u16 = 7;
const RED_BOOST: u8 = 50;
const GREEN_SCALE: u8 = 150;
const PEAK_HEAT: u8 = 200;

#[derive(Debug, Clone)]
pub struct FireEffect<const N: usize> {
    heat: [u8; N],
    rng: SmallRng,
}

impl<const N: usize> FireEffect<N> {
    pub fn new(seed: u64) -> Self {
        Self {
            heat: [0; N],
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Heat of a single cell
    pub fn heat(&self, index: u16) -> u8 {
        self.heat.get(usize::from(index)).copied().unwrap_or(0)
    }

    /// Drop all heat in `range`
    pub fn extinguish(&mut self, range: PixelRange) {
        for i in range.indices() {
            if let Some(cell) = self.heat.get_mut(i) {
                *cell = 0;
            }
        }
    }

    pub fn extinguish_all(&mut self) {
        self.heat.fill(0);
    }

    /// Render one fire frame if the frame interval has passed
    #[allow(clippy::cast_possible_truncation)]
    pub fn render<const M: usize>(
        &mut self,
        pixels: &mut PixelBuffer<M>,
        range: PixelRange,
        runtime: &mut SegmentRuntime,
        now: Instant,
    ) {
        if let Some(last) = runtime.last_frame {
            if !has_elapsed(now, last, FIRE_FRAME_INTERVAL) {
                return;
            }
        }
        runtime.last_frame = Some(now);

        if N == 0 || usize::from(range.start()) >= N {
            return;
        }
        let start = usize::from(range.start());
        let end = usize::from(range.end()).min(N - 1);
        let len = end - start + 1;

        // Cool down every cell a little
        let cooling_limit = ((COOLING * 10) / len + 2).min(255) as u8;
        for cell in &mut self.heat[start..=end] {
            let cooldown = self.rng.gen_range(0..cooling_limit);
            *cell = qsub8(*cell, cooldown);
        }

        // Heat drifts toward the high end and diffuses
        for i in (start + 2..=end).rev() {
            let sum = u16::from(self.heat[i - 1]) + 2 * u16::from(self.heat[i - 2]);
            self.heat[i] = (sum / 3) as u8;
        }

        // Ignite new sparks near the low end
        if self.rng.r#gen::<u8>() < SPARKING {
            let offset = usize::from(self.rng.gen_range(0..SPARK_ZONE));
            let y = (start + offset).min(end);
            let spark = self.rng.gen_range(160..255);
            self.heat[y] = qadd8(self.heat[y], spark);
        }

        for i in start..=end {
            let heat = self.heat[i];
            let mut color = heat_color(heat);
            color.r = qadd8(color.r, RED_BOOST);
            color.g = scale8(color.g, GREEN_SCALE);
            color.b = 0;
            if heat > PEAK_HEAT {
                color.r = scale8(color.r, 240);
                color.g = scale8(color.g, 120);
            }
            pixels.set(i as u16, color);
        }
    }
}
