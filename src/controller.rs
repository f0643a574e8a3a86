//! Per-tick stage chain evaluation
//!
//! The controller walks the segment table once per tick. Inactive segments
//! are blanked and rewound, active ones are rendered, and propagation rules
//! turn reached waypoints into downstream flags. `Follow` flags with no
//! active owner are released at the end of the tick.

use embassy_time::Instant;
use heapless::Vec;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::{
    bounds::{Direction, PixelRange},
    clock::has_elapsed,
    color::{BLACK, RED},
    config::{
        ConfigError, DelayedPropagation, EngineConfig, Indicator, MAX_CUSTOM_SEGMENTS,
        MAX_DELAYED_PROPAGATIONS, MAX_INDICATORS, MAX_SEGMENTS,
    },
    effect::{AnimationKind, Effects, FadeEffect, RenderPass},
    pixel_buffer::PixelBuffer,
    segment::{Progress, Release, Segment, SegmentConfig, SegmentId, SegmentName},
    storage::StorageAutomaton,
    trigger::{Flag, ProcessFlags, Trigger},
};

/// A single field change of one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentChange {
    /// New bounds, clamped onto the strip
    Range { start: i32, end: i32 },
    Color(crate::color::Rgb),
    Direction(Direction),
    Delay(embassy_time::Duration),
    /// Also resets the progress mode to the kind's default
    Animation(AnimationKind),
    Progress(Progress),
    Trigger(Trigger),
    Enabled(bool),
    Name(SegmentName),
}

#[derive(Debug, Clone)]
struct DelayedState {
    rule: DelayedPropagation,
    since: Option<Instant>,
}

pub struct StageController<const MAX_LEDS: usize> {
    led_count: u16,
    segments: Vec<Segment, MAX_SEGMENTS>,
    builtin: usize,
    delayed: Vec<DelayedState, MAX_DELAYED_PROPAGATIONS>,
    storage: Option<StorageAutomaton>,
    indicators: Vec<Indicator, MAX_INDICATORS>,
    flags: ProcessFlags,
    /// Flags targeted by at least one `Follow` owner
    followed: ProcessFlags,
    effects: Effects<MAX_LEDS>,
}

impl<const MAX_LEDS: usize> StageController<MAX_LEDS> {
    /// Build the controller from a validated configuration
    pub fn new(config: &EngineConfig) -> Self {
        let mut segments = Vec::new();
        for segment in &config.segments {
            // Built-in capacity is below the table capacity
            let _ = segments.push(Segment::new(segment.clone()));
        }
        let builtin = segments.len();

        let mut delayed = Vec::new();
        for rule in &config.delayed {
            let _ = delayed.push(DelayedState {
                rule: *rule,
                since: None,
            });
        }

        let mut controller = Self {
            led_count: config.led_count,
            segments,
            builtin,
            delayed,
            storage: config.storage.clone().map(StorageAutomaton::new),
            indicators: config.indicators.clone(),
            flags: ProcessFlags::new(),
            followed: ProcessFlags::new(),
            effects: Effects::new(config.fire_seed, FadeEffect::new(config.fade_duration)),
        };
        controller.collect_followed();
        controller
    }

    pub const fn flags(&self) -> ProcessFlags {
        self.flags
    }

    pub const fn led_count(&self) -> u16 {
        self.led_count
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    /// Number of user-defined segments after the built-in ones
    pub fn custom_count(&self) -> usize {
        self.segments.len() - self.builtin
    }

    pub const fn storage(&self) -> Option<&StorageAutomaton> {
        self.storage.as_ref()
    }

    pub const fn effects(&self) -> &Effects<MAX_LEDS> {
        &self.effects
    }

    /// Set or clear a flag from outside the chain
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        set_flag(&mut self.flags, flag, value);
    }

    /// Run one tick of the whole chain
    pub fn tick<const N: usize>(&mut self, pixels: &mut PixelBuffer<N>, now: Instant) {
        let Self {
            segments,
            storage,
            flags,
            effects,
            delayed,
            ..
        } = self;

        let pipe_owned = storage.as_ref().is_some_and(|s| s.pipe_owned(segments, *flags));
        let blocked = blocked_flags(segments);
        let mut engaged = ProcessFlags::new();

        for (index, segment) in segments.iter_mut().enumerate() {
            if storage.as_ref().is_some_and(|s| s.owns(index, pipe_owned)) {
                continue;
            }
            if !segment.is_active(*flags) {
                effects.fire.extinguish(segment.config().range);
                segment.clear(pixels);
                continue;
            }

            let pass = RenderPass::normal(segment.config());
            effects.render(segment, pixels, pass, now);

            for rule in &segment.config().propagations {
                if rule.release == Release::Follow {
                    engaged.set(rule.target, true);
                }
                if segment.reached(rule.waypoint) && !blocked.get(rule.target) {
                    set_flag(flags, rule.target, true);
                }
            }
        }

        for state in delayed.iter_mut() {
            if !flags.get(state.rule.source) {
                state.since = None;
                continue;
            }
            engaged.set(state.rule.target, true);
            match state.since {
                None => state.since = Some(now),
                Some(since)
                    if has_elapsed(now, since, state.rule.delay) && !blocked.get(state.rule.target) =>
                {
                    set_flag(flags, state.rule.target, true);
                }
                Some(_) => {}
            }
        }

        if let Some(storage) = storage {
            storage.tick(segments, flags, pixels, effects, pipe_owned, now);
            let filling = storage.filling(segments, *flags);
            if storage.engaged(*flags, filling) {
                engaged.set(storage.config().drained, true);
            }
        }

        for flag in self.followed.iter() {
            if !engaged.get(flag) {
                set_flag(&mut self.flags, flag, false);
            }
        }

        self.paint_indicators(pixels);
    }

    fn paint_indicators<const N: usize>(&self, pixels: &mut PixelBuffer<N>) {
        for indicator in &self.indicators {
            let color = if self.flags.get(indicator.flag) { RED } else { BLACK };
            pixels.set(indicator.pixel, color);
        }
    }

    /// Clear every flag, cursor and timer in one pass and blank the strip
    pub fn reset<const N: usize>(&mut self, pixels: &mut PixelBuffer<N>, now: Instant) {
        self.flags.clear_all();
        for segment in &mut self.segments {
            segment.clear(pixels);
            segment.runtime_mut().last_tick = now;
        }
        for state in &mut self.delayed {
            state.since = None;
        }
        if let Some(storage) = &mut self.storage {
            storage.reset();
        }
        self.effects.fire.extinguish_all();
        self.effects.fade.reset(now);
        pixels.clear_all();

        #[cfg(feature = "esp32-log")]
        println!("[StageController.reset] chain reset");
    }

    /// Apply a runtime change to one segment
    pub fn apply<const N: usize>(
        &mut self,
        id: SegmentId,
        change: SegmentChange,
        pixels: &mut PixelBuffer<N>,
    ) -> Result<(), ConfigError> {
        let led_count = self.led_count;
        let segment = self
            .segments
            .get_mut(id.index())
            .ok_or(ConfigError::UnknownSegment(id.0))?;

        match change {
            SegmentChange::Range { start, end } => {
                let range = PixelRange::clamped(start, end, led_count)
                    .ok_or(ConfigError::OutOfStrip { start, len: led_count })?;
                self.effects.fire.extinguish(segment.config().range);
                segment.clear(pixels);
                segment.config_mut().range = range;
                segment.clear(pixels);
            }
            SegmentChange::Direction(direction) => {
                segment.clear(pixels);
                segment.config_mut().direction = direction;
                segment.clear(pixels);
            }
            SegmentChange::Animation(animation) => {
                let config = segment.config_mut();
                config.animation = animation;
                config.progress = Progress::for_animation(animation);
                segment.clear(pixels);
            }
            SegmentChange::Color(color) => segment.config_mut().color = color,
            SegmentChange::Delay(delay) => segment.config_mut().delay = delay,
            SegmentChange::Progress(progress) => segment.config_mut().progress = progress,
            SegmentChange::Trigger(trigger) => segment.config_mut().trigger = trigger,
            SegmentChange::Enabled(enabled) => segment.config_mut().enabled = enabled,
            SegmentChange::Name(name) => segment.config_mut().name = name,
        }
        Ok(())
    }

    /// Append a user-defined segment
    pub fn add_custom(&mut self, mut config: SegmentConfig) -> Result<SegmentId, ConfigError> {
        if self.custom_count() >= MAX_CUSTOM_SEGMENTS {
            return Err(ConfigError::CustomPoolFull);
        }
        let range = config.range;
        config.range = PixelRange::clamped(
            i32::from(range.start()),
            i32::from(range.end()),
            self.led_count,
        )
        .ok_or(ConfigError::OutOfStrip {
            start: i32::from(range.start()),
            len: self.led_count,
        })?;

        #[allow(clippy::cast_possible_truncation)]
        let id = SegmentId(self.segments.len() as u8);
        self.segments
            .push(Segment::new(config))
            .map_err(|_| ConfigError::TableFull)?;
        self.collect_followed();
        Ok(id)
    }

    /// Remove a user-defined segment; later custom segments move down by one
    pub fn remove_custom<const N: usize>(
        &mut self,
        id: SegmentId,
        pixels: &mut PixelBuffer<N>,
    ) -> Result<(), ConfigError> {
        if id.index() < self.builtin || id.index() >= self.segments.len() {
            return Err(ConfigError::UnknownSegment(id.0));
        }
        let mut segment = self.segments.remove(id.index());
        self.effects.fire.extinguish(segment.config().range);
        segment.clear(pixels);
        self.collect_followed();
        Ok(())
    }

    fn collect_followed(&mut self) {
        let mut followed = ProcessFlags::new();
        for segment in &self.segments {
            for rule in &segment.config().propagations {
                if rule.release == Release::Follow {
                    followed.set(rule.target, true);
                }
            }
        }
        for state in &self.delayed {
            followed.set(state.rule.target, true);
        }
        if let Some(storage) = &self.storage {
            followed.set(storage.config().drained, true);
        }
        self.followed = followed;
    }
}

/// Flags whose every triggered segment is disabled
///
/// Flags no segment is triggered by (relays, timer-only stages) are never
/// blocked.
fn blocked_flags(segments: &[Segment]) -> ProcessFlags {
    let mut triggered = ProcessFlags::new();
    let mut live = ProcessFlags::new();
    for segment in segments {
        let config = segment.config();
        if let Some(flag) = config.trigger.flag() {
            triggered.set(flag, true);
            if config.enabled {
                live.set(flag, true);
            }
        }
    }

    let mut blocked = ProcessFlags::new();
    for flag in triggered.iter().filter(|flag| !live.get(*flag)) {
        blocked.set(flag, true);
    }
    blocked
}

fn set_flag(flags: &mut ProcessFlags, flag: Flag, value: bool) {
    if flags.set(flag, value) {
        #[cfg(feature = "esp32-log")]
        println!(
            "[StageController.set_flag] {} {}",
            flag.as_str(),
            if value { "on" } else { "off" }
        );
    }
}
