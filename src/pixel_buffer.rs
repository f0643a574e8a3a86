//! The shared output surface

use crate::bounds::PixelRange;
use crate::color::{BLACK, Rgb};

/// Fixed-capacity RGB buffer with a configured visible length
///
/// Writes outside the visible length are ignored, so a stale range never
/// touches memory past the strip.
#[derive(Debug, Clone)]
pub struct PixelBuffer<const N: usize> {
    pixels: [Rgb; N],
    len: usize,
}

impl<const N: usize> PixelBuffer<N> {
    /// Create a blank buffer showing `len` pixels (capped at `N`)
    pub fn new(len: usize) -> Self {
        Self {
            pixels: [BLACK; N],
            len: len.min(N),
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Visible pixels, as read by the output flush
    pub fn as_slice(&self) -> &[Rgb] {
        &self.pixels[..self.len]
    }

    pub fn get(&self, index: u16) -> Option<Rgb> {
        self.as_slice().get(usize::from(index)).copied()
    }

    pub fn set(&mut self, index: u16, color: Rgb) {
        let index = usize::from(index);
        if index < self.len {
            self.pixels[index] = color;
        }
    }

    pub fn fill(&mut self, range: PixelRange, color: Rgb) {
        let end = usize::from(range.end()).min(self.len.saturating_sub(1));
        let start = usize::from(range.start());
        if self.len == 0 || start > end {
            return;
        }
        self.pixels[start..=end].fill(color);
    }

    pub fn clear(&mut self, range: PixelRange) {
        self.fill(range, BLACK);
    }

    pub fn clear_all(&mut self) {
        self.pixels.fill(BLACK);
    }
}
