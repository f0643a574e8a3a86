//! Fill / hold / drain automaton for the storage tanks
//!
//! The automaton takes over its member segments from the generic stage
//! loop. Members fill forward like any running segment, sit dimmed while
//! full, then drain backward. The companion transport pipe is drained
//! visually once its own trigger drops while the tanks are full.

use embassy_time::{Duration, Instant};
use heapless::Vec;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::{
    clock::has_elapsed,
    color::{BLACK, Rgb, dim},
    effect::{Effects, RenderPass, RunningColors, run},
    pixel_buffer::PixelBuffer,
    segment::{Progress, Segment, SegmentId, Waypoint},
    trigger::{Flag, ProcessFlags},
};

/// Tanks handled by one automaton
pub const MAX_STORAGE_MEMBERS: usize = 2;

/// Divisor of the member color while the tanks are full
const HOLD_DIM: u8 = 10;
/// Divisor of the storage color used to prime the pipe before it drains
const PIPE_DIM: u8 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Tank segments; the first enabled one decides when filling is done
    pub members: Vec<SegmentId, MAX_STORAGE_MEMBERS>,
    /// Transport pipe drained while the tanks are full
    pub pipe: Option<SegmentId>,
    /// Set when filling completes
    pub full: Flag,
    /// Set when draining completes
    pub drained: Flag,
    /// Consumer switched off as soon as the tanks are full
    pub clear_on_hold: Option<Flag>,
    /// Time spent full before draining starts
    pub hold: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoragePhase {
    Idle,
    Fill,
    Hold,
    Drain,
}

impl StoragePhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fill => "fill",
            Self::Hold => "hold",
            Self::Drain => "drain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipePhase {
    /// Nothing to drain
    Idle,
    /// The pipe ran to its end and will drain once released
    Primed,
    Draining,
    /// Drained and dark until the pipe is released again
    Empty,
}

#[derive(Debug, Clone)]
pub struct StorageAutomaton {
    config: StorageConfig,
    phase: StoragePhase,
    full_since: Instant,
    hold_started: bool,
    pipe_phase: PipePhase,
}

impl StorageAutomaton {
    pub const fn new(config: StorageConfig) -> Self {
        Self {
            config,
            phase: StoragePhase::Idle,
            full_since: Instant::from_millis(0),
            hold_started: false,
            pipe_phase: PipePhase::Idle,
        }
    }

    pub const fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub const fn phase(&self) -> StoragePhase {
        self.phase
    }

    pub const fn pipe_phase(&self) -> PipePhase {
        self.pipe_phase
    }

    pub fn reset(&mut self) {
        self.phase = StoragePhase::Idle;
        self.hold_started = false;
        self.pipe_phase = PipePhase::Idle;
    }

    /// Whether the pipe is drawn by the automaton this tick
    pub fn pipe_owned(&self, segments: &[Segment], flags: ProcessFlags) -> bool {
        let Some(pipe) = self.config.pipe.and_then(|id| segments.get(id.index())) else {
            return false;
        };
        pipe.config().enabled && !pipe.is_active(flags) && flags.get(self.config.full)
    }

    /// Whether segment `index` is skipped by the generic stage loop
    pub fn owns(&self, index: usize, pipe_owned: bool) -> bool {
        self.config.members.iter().any(|id| id.index() == index)
            || (pipe_owned && self.config.pipe.is_some_and(|id| id.index() == index))
    }

    /// Whether the drained flag still has a live owner
    pub const fn engaged(&self, flags: ProcessFlags, filling: bool) -> bool {
        filling || flags.get(self.config.full)
    }

    /// Whether any enabled member is triggered
    pub fn filling(&self, segments: &[Segment], flags: ProcessFlags) -> bool {
        self.config
            .members
            .iter()
            .filter_map(|id| segments.get(id.index()))
            .any(|member| member.is_active(flags))
    }

    fn set_phase(&mut self, phase: StoragePhase) {
        if self.phase == phase {
            return;
        }
        #[cfg(feature = "esp32-log")]
        println!(
            "[StorageAutomaton.set_phase] {} -> {}",
            self.phase.as_str(),
            phase.as_str()
        );
        self.phase = phase;
    }

    /// Advance the automaton and the pipe drain by one tick
    pub fn tick<const N: usize, const MAX_LEDS: usize>(
        &mut self,
        segments: &mut [Segment],
        flags: &mut ProcessFlags,
        pixels: &mut PixelBuffer<N>,
        effects: &mut Effects<MAX_LEDS>,
        pipe_owned: bool,
        now: Instant,
    ) {
        self.tick_pipe(segments, *flags, pixels, pipe_owned, now);

        let filling = self.filling(segments, *flags);
        match self.phase {
            StoragePhase::Idle => {
                if flags.get(self.config.full) {
                    // Drained; stays dark until the cycle resets the chain
                    return;
                }
                if !filling {
                    self.clear_members(segments, pixels);
                    self.hold_started = false;
                    return;
                }
                self.set_phase(StoragePhase::Fill);
                self.fill(segments, flags, pixels, effects, now);
            }
            StoragePhase::Fill => {
                if !filling {
                    self.clear_members(segments, pixels);
                    self.set_phase(StoragePhase::Idle);
                    return;
                }
                self.fill(segments, flags, pixels, effects, now);
            }
            StoragePhase::Hold => self.hold(segments, flags, pixels, effects, now),
            StoragePhase::Drain => self.drain(segments, flags, pixels, effects, now),
        }
    }

    fn fill<const N: usize, const MAX_LEDS: usize>(
        &mut self,
        segments: &mut [Segment],
        flags: &mut ProcessFlags,
        pixels: &mut PixelBuffer<N>,
        effects: &mut Effects<MAX_LEDS>,
        now: Instant,
    ) {
        let mut primary_full = None;
        for id in &self.config.members {
            let Some(member) = segments.get_mut(id.index()) else {
                continue;
            };
            if !member.config().enabled {
                member.clear(pixels);
                continue;
            }
            let pass = RenderPass::normal(member.config());
            effects.render(member, pixels, pass, now);
            if primary_full.is_none() {
                primary_full = Some(member.reached(Waypoint::Terminal));
            }
        }

        if primary_full == Some(true) {
            if flags.set(self.config.full, true) {
                #[cfg(feature = "esp32-log")]
                println!("[StorageAutomaton.fill] {} on", self.config.full.as_str());
            }
            self.set_phase(StoragePhase::Hold);
        }
    }

    fn hold<const N: usize, const MAX_LEDS: usize>(
        &mut self,
        segments: &mut [Segment],
        flags: &mut ProcessFlags,
        pixels: &mut PixelBuffer<N>,
        effects: &mut Effects<MAX_LEDS>,
        now: Instant,
    ) {
        if !self.hold_started {
            for id in &self.config.members {
                let Some(member) = segments.get_mut(id.index()) else {
                    continue;
                };
                if !member.config().enabled {
                    member.clear(pixels);
                    continue;
                }
                let (config, runtime) = member.parts_mut();
                pixels.fill(config.range, dim(config.color, HOLD_DIM));
                runtime.cursor = config.range.terminal(config.direction);
                runtime.first_run = false;
            }
            self.full_since = now;
            self.hold_started = true;
            if let Some(consumer) = self.config.clear_on_hold {
                if flags.set(consumer, false) {
                    #[cfg(feature = "esp32-log")]
                    println!("[StorageAutomaton.hold] {} off", consumer.as_str());
                }
            }
            return;
        }

        if has_elapsed(now, self.full_since, self.config.hold) {
            self.set_phase(StoragePhase::Drain);
            self.drain(segments, flags, pixels, effects, now);
        }
    }

    fn drain<const N: usize, const MAX_LEDS: usize>(
        &mut self,
        segments: &mut [Segment],
        flags: &mut ProcessFlags,
        pixels: &mut PixelBuffer<N>,
        effects: &mut Effects<MAX_LEDS>,
        now: Instant,
    ) {
        let mut drained = false;
        for id in &self.config.members {
            let Some(member) = segments.get_mut(id.index()) else {
                continue;
            };
            if !member.config().enabled {
                member.clear(pixels);
                continue;
            }
            let config = member.config();
            let pass = RenderPass {
                direction: config.direction.reversed(),
                tail: dim(config.color, HOLD_DIM),
            };
            effects.render(member, pixels, pass, now);

            let config = member.config();
            drained |= config.progress == Progress::Off
                || member.cursor() == config.range.initial(config.direction);
        }

        if drained {
            if flags.set(self.config.drained, true) {
                #[cfg(feature = "esp32-log")]
                println!("[StorageAutomaton.drain] {} on", self.config.drained.as_str());
            }
            self.clear_members(segments, pixels);
            self.set_phase(StoragePhase::Idle);
        }
    }

    fn clear_members<const N: usize>(&self, segments: &mut [Segment], pixels: &mut PixelBuffer<N>) {
        for id in &self.config.members {
            if let Some(member) = segments.get_mut(id.index()) {
                member.clear(pixels);
            }
        }
    }

    /// Color the pipe is primed with before it drains
    fn storage_color(&self, segments: &[Segment]) -> Rgb {
        self.config
            .members
            .first()
            .and_then(|id| segments.get(id.index()))
            .map_or(BLACK, |member| dim(member.config().color, PIPE_DIM))
    }

    fn tick_pipe<const N: usize>(
        &mut self,
        segments: &mut [Segment],
        flags: ProcessFlags,
        pixels: &mut PixelBuffer<N>,
        pipe_owned: bool,
        now: Instant,
    ) {
        let Some(pipe_id) = self.config.pipe else {
            return;
        };
        let primed_color = self.storage_color(segments);
        let Some(pipe) = segments.get_mut(pipe_id.index()) else {
            return;
        };

        if !pipe_owned {
            if !pipe.is_active(flags) {
                self.pipe_phase = PipePhase::Idle;
            } else if pipe.reached(Waypoint::Terminal) {
                self.pipe_phase = PipePhase::Primed;
            }
            return;
        }

        let (config, runtime) = pipe.parts_mut();
        match self.pipe_phase {
            PipePhase::Primed => {
                pixels.fill(config.range, primed_color);
                runtime.cursor = config.range.initial(config.direction);
                runtime.first_run = false;
                runtime.last_tick = now;
                self.pipe_phase = PipePhase::Draining;
            }
            PipePhase::Draining => {
                let colors = RunningColors {
                    head: config.color,
                    tail: BLACK,
                };
                let start = config.range.initial(config.direction);
                let cursor = run(pixels, config.range, config.direction, colors, config.delay, runtime, now);
                if cursor == start {
                    self.pipe_phase = PipePhase::Empty;
                    pipe.clear(pixels);
                }
            }
            PipePhase::Idle | PipePhase::Empty => {
                self.pipe_phase = PipePhase::Empty;
                pipe.clear(pixels);
            }
        }
    }
}
