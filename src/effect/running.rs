//! Running light: a single head pixel sweeping through the range

use embassy_time::{Duration, Instant};

use crate::{
    bounds::{Direction, PixelRange},
    clock::has_elapsed,
    color::Rgb,
    pixel_buffer::PixelBuffer,
    segment::SegmentRuntime,
};

/// Head and trailing pixel colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningColors {
    pub head: Rgb,
    pub tail: Rgb,
}

/// Advance the running light by one step if `delay` has passed
///
/// The first step after a reset blanks the whole range instead of
/// dimming the previous pixel, and is taken immediately. Returns the
/// cursor, which is the index the next step will light.
pub fn run<const N: usize>(
    pixels: &mut PixelBuffer<N>,
    range: PixelRange,
    direction: Direction,
    colors: RunningColors,
    delay: Duration,
    runtime: &mut SegmentRuntime,
    now: Instant,
) -> u16 {
    // The delay gates every step except the first after a rewind, so an
    // activated segment lights its initial pixel on the same tick
    if !runtime.first_run && !has_elapsed(now, runtime.last_tick, delay) {
        return runtime.cursor;
    }
    runtime.last_tick = now;

    if !range.contains(runtime.cursor) {
        runtime.cursor = range.initial(direction);
    }

    if runtime.first_run {
        pixels.clear(range);
        runtime.first_run = false;
    } else {
        pixels.set(range.previous(runtime.cursor, direction), colors.tail);
    }

    pixels.set(runtime.cursor, colors.head);
    runtime.cursor = range.next(runtime.cursor, direction);

    runtime.cursor
}
