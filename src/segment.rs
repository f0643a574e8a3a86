//! Segment configuration and runtime state
//!
//! A segment is a contiguous range of the strip standing for one process
//! stage. Its configuration comes from the outside; only the runtime
//! fields change while the engine runs.

use embassy_time::{Duration, Instant};
use heapless::{String, Vec};

use crate::{
    bounds::{Direction, PixelRange},
    clock::has_elapsed,
    color::Rgb,
    effect::AnimationKind,
    pixel_buffer::PixelBuffer,
    trigger::{Flag, ProcessFlags, Trigger, is_active},
};

/// Maximum length of a segment name
pub const SEGMENT_NAME_LEN: usize = 24;
/// Maximum propagation rules per segment
pub const MAX_PROPAGATIONS: usize = 3;

pub type SegmentName = String<SEGMENT_NAME_LEN>;

/// Position of a segment in the engine's segment table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SegmentId(pub u8);

impl SegmentId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position within a segment that completes a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waypoint {
    /// Reached on every tick the segment is active
    Active,
    /// Middle pixel of the range
    Midpoint,
    /// Bound the cursor travels toward
    Terminal,
    /// Explicit buffer index
    Index(u16),
}

/// How a propagated flag is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Stays set until a chain reset or an explicit clear
    Latched,
    /// Cleared on any tick where no owner of the flag is active
    Follow,
}

/// "On reaching `waypoint`, set `target`"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Propagation {
    pub waypoint: Waypoint,
    pub target: Flag,
    pub release: Release,
}

impl Propagation {
    pub const fn follow(waypoint: Waypoint, target: Flag) -> Self {
        Self {
            waypoint,
            target,
            release: Release::Follow,
        }
    }

    pub const fn latched(waypoint: Waypoint, target: Flag) -> Self {
        Self {
            waypoint,
            target,
            release: Release::Latched,
        }
    }
}

/// What drives a segment's cursor toward its waypoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The running cursor; Fire and Fade never move it
    Animated,
    /// An invisible cursor stepped at the segment delay, whatever is drawn
    Paced,
    /// Waypoints other than `Active` are never reached
    Off,
}

impl Progress {
    /// Default progress for an animation kind
    pub const fn for_animation(kind: AnimationKind) -> Self {
        match kind {
            AnimationKind::Running => Self::Animated,
            AnimationKind::Fire => Self::Paced,
            AnimationKind::Fade => Self::Off,
        }
    }
}

/// Static configuration of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentConfig {
    pub name: SegmentName,
    pub range: PixelRange,
    pub color: Rgb,
    pub direction: Direction,
    /// Minimum time between animation steps (fade half-cycle for Fade)
    pub delay: Duration,
    pub animation: AnimationKind,
    pub progress: Progress,
    pub enabled: bool,
    pub trigger: Trigger,
    pub propagations: Vec<Propagation, MAX_PROPAGATIONS>,
}

impl SegmentConfig {
    /// Enabled forward running segment without propagation rules
    pub fn new(name: &str, range: PixelRange, color: Rgb, trigger: Trigger) -> Self {
        let mut segment_name = SegmentName::new();
        for c in name.chars() {
            if segment_name.push(c).is_err() {
                break;
            }
        }
        Self {
            name: segment_name,
            range,
            color,
            direction: Direction::Forward,
            delay: Duration::from_millis(100),
            animation: AnimationKind::Running,
            progress: Progress::Animated,
            enabled: true,
            trigger,
            propagations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the animation kind and its default progress mode
    #[must_use]
    pub fn with_animation(mut self, animation: AnimationKind) -> Self {
        self.animation = animation;
        self.progress = Progress::for_animation(animation);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Add a propagation rule; rules past capacity are dropped
    #[must_use]
    pub fn propagate(mut self, propagation: Propagation) -> Self {
        let _ = self.propagations.push(propagation);
        self
    }

    /// Trailing pixel color of the running light
    pub const fn tail_color(&self) -> Rgb {
        crate::color::dim(self.color, 10)
    }
}

/// Per-tick mutable state of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRuntime {
    pub(crate) cursor: u16,
    pub(crate) last_tick: Instant,
    pub(crate) first_run: bool,
    /// Fire frame gate, `None` until the first frame
    pub(crate) last_frame: Option<Instant>,
}

impl SegmentRuntime {
    pub const fn new(range: PixelRange, direction: Direction) -> Self {
        Self {
            cursor: range.initial(direction),
            last_tick: Instant::from_millis(0),
            first_run: true,
            last_frame: None,
        }
    }

    pub const fn cursor(&self) -> u16 {
        self.cursor
    }

    pub const fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub const fn last_tick(&self) -> Instant {
        self.last_tick
    }

    /// Return to the direction's initial index with a fresh first run
    pub fn rewind(&mut self, range: PixelRange, direction: Direction) {
        self.cursor = range.initial(direction);
        self.first_run = true;
        self.last_frame = None;
    }

    /// Step the cursor without drawing, at the same pace as a running light
    pub fn advance(&mut self, range: PixelRange, direction: Direction, delay: Duration, now: Instant) {
        if !self.first_run && !has_elapsed(now, self.last_tick, delay) {
            return;
        }
        self.last_tick = now;
        if range.contains(self.cursor) {
            self.cursor = range.next(self.cursor, direction);
        } else {
            self.cursor = range.initial(direction);
        }
        self.first_run = false;
    }
}

/// A configured segment with its runtime state
#[derive(Debug, Clone)]
pub struct Segment {
    config: SegmentConfig,
    runtime: SegmentRuntime,
}

impl Segment {
    pub fn new(config: SegmentConfig) -> Self {
        let runtime = SegmentRuntime::new(config.range, config.direction);
        Self { config, runtime }
    }

    pub const fn config(&self) -> &SegmentConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut SegmentConfig {
        &mut self.config
    }

    pub const fn runtime(&self) -> &SegmentRuntime {
        &self.runtime
    }

    pub(crate) fn runtime_mut(&mut self) -> &mut SegmentRuntime {
        &mut self.runtime
    }

    /// Borrow the configuration and runtime at once
    pub(crate) fn parts_mut(&mut self) -> (&SegmentConfig, &mut SegmentRuntime) {
        (&self.config, &mut self.runtime)
    }

    pub const fn cursor(&self) -> u16 {
        self.runtime.cursor
    }

    /// Enabled and triggered
    pub const fn is_active(&self, flags: ProcessFlags) -> bool {
        self.config.enabled && is_active(flags, self.config.trigger)
    }

    /// Buffer index of a waypoint, `None` for `Active`
    pub const fn waypoint_index(&self, waypoint: Waypoint) -> Option<u16> {
        match waypoint {
            Waypoint::Active => None,
            Waypoint::Midpoint => Some(self.config.range.midpoint()),
            Waypoint::Terminal => Some(self.config.range.terminal(self.config.direction)),
            Waypoint::Index(index) => Some(index),
        }
    }

    /// Whether the cursor currently sits on `waypoint`
    pub fn reached(&self, waypoint: Waypoint) -> bool {
        match self.waypoint_index(waypoint) {
            None => true,
            Some(_) if self.config.progress == Progress::Off => false,
            Some(index) => self.runtime.cursor == index,
        }
    }

    /// Blank the range and rewind to the initial index
    pub fn clear<const N: usize>(&mut self, pixels: &mut PixelBuffer<N>) {
        pixels.clear(self.config.range);
        self.runtime.rewind(self.config.range, self.config.direction);
    }
}
