//! Millisecond clock helpers
//!
//! Elapsed time is computed with wrapping subtraction on the millisecond
//! counter, so a wrapped clock source never produces a negative interval.

use embassy_time::{Duration, Instant};

/// Milliseconds elapsed between `since` and `now`
#[inline]
pub const fn elapsed_ms(now: Instant, since: Instant) -> u64 {
    now.as_millis().wrapping_sub(since.as_millis())
}

/// Returns true when at least `period` has passed since `since`
#[inline]
pub const fn has_elapsed(now: Instant, since: Instant, period: Duration) -> bool {
    elapsed_ms(now, since) >= period.as_millis()
}
