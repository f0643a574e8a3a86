//! Segment render primitives
//!
//! Each primitive draws one segment range into the shared pixel buffer and
//! advances the segment's runtime fields. Running is stateless per call;
//! Fire and Fade keep engine-wide state that is owned here, once.

mod fade;
mod fire;
mod running;

pub use fade::{FADE_FLOOR, FadeEffect};
pub use fire::{FIRE_FRAME_INTERVAL, FireEffect};
pub use running::{RunningColors, run};

use embassy_time::Instant;

use crate::{
    bounds::Direction,
    color::Rgb,
    pixel_buffer::PixelBuffer,
    segment::{Progress, Segment, SegmentConfig},
};

const ANIMATION_NAME_RUNNING: &str = "running";
const ANIMATION_NAME_FIRE: &str = "fire";
const ANIMATION_NAME_FADE: &str = "fade";

const ANIMATION_ID_RUNNING: u8 = 0;
const ANIMATION_ID_FIRE: u8 = 1;
const ANIMATION_ID_FADE: u8 = 2;

/// Known animation kinds that can be configured for a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AnimationKind {
    #[default]
    Running = ANIMATION_ID_RUNNING,
    Fire = ANIMATION_ID_FIRE,
    Fade = ANIMATION_ID_FADE,
}

impl AnimationKind {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            ANIMATION_ID_RUNNING => Self::Running,
            ANIMATION_ID_FIRE => Self::Fire,
            ANIMATION_ID_FADE => Self::Fade,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => ANIMATION_NAME_RUNNING,
            Self::Fire => ANIMATION_NAME_FIRE,
            Self::Fade => ANIMATION_NAME_FADE,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            ANIMATION_NAME_RUNNING => Some(Self::Running),
            ANIMATION_NAME_FIRE => Some(Self::Fire),
            ANIMATION_NAME_FADE => Some(Self::Fade),
            _ => None,
        }
    }
}

/// Direction and trailing color for one render call
///
/// Normal rendering uses the segment's own direction and dimmed tail;
/// the storage automaton overrides both while draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPass {
    pub direction: Direction,
    pub tail: Rgb,
}

impl RenderPass {
    pub const fn normal(config: &SegmentConfig) -> Self {
        Self {
            direction: config.direction,
            tail: config.tail_color(),
        }
    }
}

/// Engine-wide primitive state
#[derive(Debug, Clone)]
pub struct Effects<const MAX_LEDS: usize> {
    pub fire: FireEffect<MAX_LEDS>,
    pub fade: FadeEffect,
}

impl<const MAX_LEDS: usize> Effects<MAX_LEDS> {
    pub fn new(fire_seed: u64, fade: FadeEffect) -> Self {
        Self {
            fire: FireEffect::new(fire_seed),
            fade,
        }
    }

    /// Draw one step of `segment` with its configured animation
    pub fn render<const N: usize>(
        &mut self,
        segment: &mut Segment,
        pixels: &mut PixelBuffer<N>,
        pass: RenderPass,
        now: Instant,
    ) {
        let (config, runtime) = segment.parts_mut();
        match config.animation {
            AnimationKind::Running => {
                let colors = RunningColors {
                    head: config.color,
                    tail: pass.tail,
                };
                run(pixels, config.range, pass.direction, colors, config.delay, runtime, now);
                return;
            }
            AnimationKind::Fire => self.fire.render(pixels, config.range, runtime, now),
            AnimationKind::Fade => {
                self.fade
                    .render(pixels, config.range, config.color, Some(config.delay), runtime, now);
            }
        }

        if config.progress == Progress::Paced {
            runtime.advance(config.range, pass.direction, config.delay, now);
        }
    }
}
