#![no_std]

pub mod bounds;
pub mod channel;
pub mod clock;
pub mod color;
pub mod config;
pub mod controller;
pub mod cycle;
pub mod effect;
pub mod engine;
pub mod frame_scheduler;
pub mod intent_processor;
pub mod math8;
pub mod pixel_buffer;
pub mod segment;
pub mod storage;
pub mod test_sweep;
pub mod trigger;

pub use bounds::{Direction, PixelRange};
pub use config::{ConfigError, DelayedPropagation, EngineConfig, Indicator, RawSegmentConfig, Stage};
pub use controller::{SegmentChange, StageController};
pub use cycle::{CycleConfig, CycleEvent, CycleTimer};
pub use effect::AnimationKind;
pub use engine::Engine;
pub use frame_scheduler::FrameScheduler;
pub use intent_processor::{
    EngineIntent, IntentChannel, IntentEffects, IntentProcessor, IntentReceiver, IntentSender,
};
pub use pixel_buffer::PixelBuffer;
pub use segment::{Progress, Propagation, Release, Segment, SegmentConfig, SegmentId, Waypoint};
pub use storage::{StorageAutomaton, StorageConfig, StoragePhase};
pub use trigger::{Flag, ProcessFlags, Trigger, is_active, is_raw_active};

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
/// The engine is generic over this trait.
pub trait OutputDriver {
    /// Write colors to the LED strip
    fn write(&mut self, colors: &[Rgb]);

    /// Receive the process flags of the frame just written
    ///
    /// Relays and other outputs driven by the chain hook in here.
    fn flags(&mut self, _flags: ProcessFlags) {}
}
