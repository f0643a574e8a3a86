//! Bounded demonstration cycle
//!
//! A cycle switches the source stage on for a while, lets the chain run
//! out, then asks for a full reset so the next start is clean.

use embassy_time::{Duration, Instant};

use crate::{clock::elapsed_ms, trigger::Flag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleConfig {
    /// Flag raised by a start
    pub source: Flag,
    /// How long the source stays on
    pub source_duration: Duration,
    /// Total cycle length, measured from the start
    pub run_duration: Duration,
    /// Start a cycle on the first frame
    pub auto_start: bool,
}

/// Transition reported by [`CycleTimer::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    /// The source stage time ran out
    SourceExpired,
    /// The cycle is over; the chain should be reset
    Finished,
}

#[derive(Debug, Clone)]
pub struct CycleTimer {
    config: CycleConfig,
    started: Option<Instant>,
    source_on: bool,
}

impl CycleTimer {
    pub const fn new(config: CycleConfig) -> Self {
        Self {
            config,
            started: None,
            source_on: false,
        }
    }

    pub const fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// No cycle is running and a start would be accepted
    pub const fn is_ready(&self) -> bool {
        self.started.is_none()
    }

    /// Begin a cycle; returns false while one is already running
    pub fn start(&mut self, now: Instant) -> bool {
        if self.started.is_some() {
            return false;
        }
        self.started = Some(now);
        self.source_on = true;
        true
    }

    /// Forget the running cycle
    pub fn cancel(&mut self) {
        self.started = None;
        self.source_on = false;
    }

    pub fn tick(&mut self, now: Instant) -> Option<CycleEvent> {
        let started = self.started?;
        let elapsed = elapsed_ms(now, started);

        if elapsed >= self.config.run_duration.as_millis() {
            self.cancel();
            return Some(CycleEvent::Finished);
        }
        if self.source_on && elapsed >= self.config.source_duration.as_millis() {
            self.source_on = false;
            return Some(CycleEvent::SourceExpired);
        }
        None
    }
}
