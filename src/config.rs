//! Engine configuration and load-time validation
//!
//! Everything that reaches the engine has been validated here first:
//! unknown ids are rejected and ranges are clamped onto the strip.

use embassy_time::Duration;
use heapless::Vec;

use crate::{
    bounds::{Direction, PixelRange},
    color::rgb_from_u32,
    cycle::CycleConfig,
    effect::AnimationKind,
    segment::{Propagation, SegmentConfig, SegmentId, Waypoint},
    storage::StorageConfig,
    trigger::{Flag, Trigger},
};

/// Segment table capacity, built-in and custom together
pub const MAX_SEGMENTS: usize = 15;
/// User-defined segments appended after the built-in ones
pub const MAX_CUSTOM_SEGMENTS: usize = 3;
pub const MAX_BUILTIN_SEGMENTS: usize = MAX_SEGMENTS - MAX_CUSTOM_SEGMENTS;
pub const MAX_DELAYED_PROPAGATIONS: usize = 4;
pub const MAX_INDICATORS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown trigger id {0}")]
    UnknownTrigger(u8),
    #[error("unknown animation id {0}")]
    UnknownAnimation(u8),
    #[error("unknown direction {0}")]
    UnknownDirection(u8),
    #[error("range starting at {start} lies past the {len} pixel strip")]
    OutOfStrip { start: i32, len: u16 },
    #[error("strip of {len} pixels exceeds the buffer capacity of {capacity}")]
    StripTooLong { len: u16, capacity: usize },
    #[error("segment table is full")]
    TableFull,
    #[error("custom segment pool is full")]
    CustomPoolFull,
    #[error("unknown segment {0}")]
    UnknownSegment(u8),
    #[error("storage references missing segment {0}")]
    MissingStorageMember(u8),
}

/// "Once `source` has been set for `delay`, set `target`"
///
/// Models timer-only stages that have no segment of their own. The
/// target is released as soon as the source drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedPropagation {
    pub source: Flag,
    pub target: Flag,
    pub delay: Duration,
}

/// A single status pixel, red while its flag is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    pub pixel: u16,
    pub flag: Flag,
}

/// Segment configuration in its persisted form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSegmentConfig<'a> {
    pub name: &'a str,
    pub start: i32,
    pub end: i32,
    /// `0xRRGGBB`
    pub color: u32,
    pub direction: u8,
    pub delay_ms: u32,
    pub animation: u8,
    pub trigger: u8,
    pub enabled: bool,
}

impl SegmentConfig {
    /// Validate a persisted segment for a strip of `led_count` pixels
    pub fn from_raw(raw: &RawSegmentConfig<'_>, led_count: u16) -> Result<Self, ConfigError> {
        let trigger = Trigger::from_raw(raw.trigger).ok_or(ConfigError::UnknownTrigger(raw.trigger))?;
        let animation = AnimationKind::from_raw(raw.animation)
            .ok_or(ConfigError::UnknownAnimation(raw.animation))?;
        let direction =
            Direction::from_raw(raw.direction).ok_or(ConfigError::UnknownDirection(raw.direction))?;
        let range = PixelRange::clamped(raw.start, raw.end, led_count).ok_or(ConfigError::OutOfStrip {
            start: raw.start,
            len: led_count,
        })?;

        Ok(Self::new(raw.name, range, rgb_from_u32(raw.color), trigger)
            .with_direction(direction)
            .with_delay(Duration::from_millis(u64::from(raw.delay_ms)))
            .with_animation(animation)
            .with_enabled(raw.enabled))
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of pixels actually wired
    pub led_count: u16,
    pub segments: Vec<SegmentConfig, MAX_BUILTIN_SEGMENTS>,
    pub delayed: Vec<DelayedPropagation, MAX_DELAYED_PROPAGATIONS>,
    pub storage: Option<StorageConfig>,
    pub indicators: Vec<Indicator, MAX_INDICATORS>,
    pub cycle: CycleConfig,
    /// Half-cycle of Fade when a segment does not override it
    pub fade_duration: Duration,
    pub fire_seed: u64,
}

impl EngineConfig {
    /// Check the configuration against a buffer of `capacity` pixels
    ///
    /// Segment ranges are clamped onto the strip; anything that cannot be
    /// clamped is rejected.
    pub fn validate(&mut self, capacity: usize) -> Result<(), ConfigError> {
        if usize::from(self.led_count) > capacity {
            return Err(ConfigError::StripTooLong {
                len: self.led_count,
                capacity,
            });
        }

        for segment in &mut self.segments {
            let range = segment.range;
            segment.range = PixelRange::clamped(
                i32::from(range.start()),
                i32::from(range.end()),
                self.led_count,
            )
            .ok_or(ConfigError::OutOfStrip {
                start: i32::from(range.start()),
                len: self.led_count,
            })?;
        }

        if let Some(storage) = &self.storage {
            let segments = self.segments.len();
            for id in storage.members.iter().chain(storage.pipe.iter()) {
                if id.index() >= segments {
                    return Err(ConfigError::MissingStorageMember(id.0));
                }
            }
        }

        for indicator in &self.indicators {
            if indicator.pixel >= self.led_count {
                return Err(ConfigError::OutOfStrip {
                    start: i32::from(indicator.pixel),
                    len: self.led_count,
                });
            }
        }

        Ok(())
    }

    /// Energy to hydrogen demonstration on a 150 pixel strip
    pub fn hydrogen_demo() -> Self {
        let mut segments = Vec::new();
        for stage in Stage::ALL {
            // Capacity matches the stage count
            let _ = segments.push(stage.config());
        }

        let mut delayed = Vec::new();
        let _ = delayed.push(DelayedPropagation {
            source: Flag::Electrolyser,
            target: Flag::HydrogenProduction,
            delay: Duration::from_millis(2000),
        });

        let mut members = Vec::new();
        let _ = members.push(Stage::Storage1.id());
        let _ = members.push(Stage::Storage2.id());

        let mut indicators = Vec::new();
        let indicator_flags = [
            Flag::Wind,
            Flag::ElectricityProduction,
            Flag::Electrolyser,
            Flag::HydrogenProduction,
            Flag::HydrogenStorage,
            Flag::StorageFull,
            Flag::StreetLight,
        ];
        for (pixel, flag) in (DEMO_INDICATOR_START..).zip(indicator_flags) {
            let _ = indicators.push(Indicator { pixel, flag });
        }

        Self {
            led_count: DEMO_LED_COUNT,
            segments,
            delayed,
            storage: Some(StorageConfig {
                members,
                pipe: Some(Stage::HydrogenTransport.id()),
                full: Flag::StorageFull,
                drained: Flag::StorageTransport,
                clear_on_hold: Some(Flag::H2Consumption),
                hold: Duration::from_millis(5000),
            }),
            indicators,
            cycle: CycleConfig {
                source: Flag::Wind,
                source_duration: Duration::from_secs(60),
                run_duration: Duration::from_secs(120),
                auto_start: false,
            },
            fade_duration: Duration::from_millis(2000),
            fire_seed: 0x5EED_F12E,
        }
    }
}

const DEMO_LED_COUNT: u16 = 150;
const DEMO_INDICATOR_START: u16 = 140;

const COLOR_WIND: u32 = 0x0080FF;
const COLOR_SOLAR: u32 = 0xFFC000;
const COLOR_ELECTRICITY: u32 = 0xFFFF00;
const COLOR_HYDROGEN: u32 = 0x00FF40;
const COLOR_STORAGE: u32 = 0x00FFB0;
const COLOR_CONSUMPTION: u32 = 0xFF8000;
const COLOR_ELECTRICITY_TRANSPORT: u32 = 0xFFD000;

/// Built-in segments of the hydrogen demo, in table order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Stage {
    Wind = 0,
    Solar = 1,
    ElectricityProduction = 2,
    HydrogenProduction = 3,
    HydrogenTransport = 4,
    Storage1 = 5,
    Storage2 = 6,
    H2Consumption = 7,
    Fabrication = 8,
    ElectricityTransport = 9,
    StorageTransport = 10,
    StoragePowerstation = 11,
}

impl Stage {
    pub const ALL: [Stage; 12] = [
        Stage::Wind,
        Stage::Solar,
        Stage::ElectricityProduction,
        Stage::HydrogenProduction,
        Stage::HydrogenTransport,
        Stage::Storage1,
        Stage::Storage2,
        Stage::H2Consumption,
        Stage::Fabrication,
        Stage::ElectricityTransport,
        Stage::StorageTransport,
        Stage::StoragePowerstation,
    ];

    pub const fn id(self) -> SegmentId {
        SegmentId(self as u8)
    }

    /// Demo layout of this stage
    pub fn config(self) -> SegmentConfig {
        let fast = Duration::from_millis(100);
        let slow = Duration::from_millis(150);
        match self {
            Self::Wind => SegmentConfig::new("wind", PixelRange::new(0, 9), rgb_from_u32(COLOR_WIND), Trigger::Wind)
                .with_delay(slow)
                .propagate(Propagation::follow(Waypoint::Terminal, Flag::ElectricityProduction)),
            Self::Solar => SegmentConfig::new(
                "solar",
                PixelRange::new(10, 19),
                rgb_from_u32(COLOR_SOLAR),
                Trigger::Wind,
            )
            .with_direction(Direction::Reverse)
            .with_delay(slow)
            .propagate(Propagation::follow(Waypoint::Terminal, Flag::ElectricityProduction)),
            Self::ElectricityProduction => SegmentConfig::new(
                "electricity_production",
                PixelRange::new(20, 34),
                rgb_from_u32(COLOR_ELECTRICITY),
                Trigger::ElectricityProduction,
            )
            .with_delay(fast)
            .propagate(Propagation::follow(Waypoint::Terminal, Flag::Electrolyser)),
            Self::HydrogenProduction => SegmentConfig::new(
                "hydrogen_production",
                PixelRange::new(35, 44),
                rgb_from_u32(COLOR_HYDROGEN),
                Trigger::HydrogenProduction,
            )
            .with_delay(Duration::from_millis(1000))
            .with_animation(AnimationKind::Fade)
            .propagate(Propagation::follow(Waypoint::Active, Flag::HydrogenTransport)),
            Self::HydrogenTransport => SegmentConfig::new(
                "hydrogen_transport",
                PixelRange::new(45, 64),
                rgb_from_u32(COLOR_HYDROGEN),
                Trigger::HydrogenTransport,
            )
            .with_delay(fast)
            .propagate(Propagation::latched(Waypoint::Midpoint, Flag::H2Consumption))
            .propagate(Propagation::follow(Waypoint::Terminal, Flag::HydrogenStorage)),
            Self::Storage1 => SegmentConfig::new(
                "storage_1",
                PixelRange::new(65, 74),
                rgb_from_u32(COLOR_STORAGE),
                Trigger::HydrogenStorage,
            )
            .with_delay(slow),
            Self::Storage2 => SegmentConfig::new(
                "storage_2",
                PixelRange::new(75, 84),
                rgb_from_u32(COLOR_STORAGE),
                Trigger::HydrogenStorage,
            )
            .with_delay(slow),
            Self::H2Consumption => SegmentConfig::new(
                "h2_consumption",
                PixelRange::new(85, 94),
                rgb_from_u32(COLOR_CONSUMPTION),
                Trigger::H2Consumption,
            )
            .with_delay(fast)
            .propagate(Propagation::follow(Waypoint::Terminal, Flag::Fabrication)),
            Self::Fabrication => SegmentConfig::new(
                "fabrication",
                PixelRange::new(95, 104),
                rgb_from_u32(COLOR_CONSUMPTION),
                Trigger::Fabrication,
            )
            .with_animation(AnimationKind::Fire),
            Self::ElectricityTransport => SegmentConfig::new(
                "electricity_transport",
                PixelRange::new(105, 119),
                rgb_from_u32(COLOR_ELECTRICITY_TRANSPORT),
                Trigger::ElectricityTransport,
            )
            .with_delay(fast)
            .propagate(Propagation::follow(Waypoint::Terminal, Flag::StreetLight)),
            Self::StorageTransport => SegmentConfig::new(
                "storage_transport",
                PixelRange::new(120, 129),
                rgb_from_u32(COLOR_STORAGE),
                Trigger::StorageTransport,
            )
            .with_delay(fast)
            .propagate(Propagation::follow(Waypoint::Terminal, Flag::Fabrication))
            .propagate(Propagation::follow(Waypoint::Terminal, Flag::StoragePowerstation)),
            Self::StoragePowerstation => SegmentConfig::new(
                "storage_powerstation",
                PixelRange::new(130, 139),
                rgb_from_u32(COLOR_ELECTRICITY_TRANSPORT),
                Trigger::StoragePowerstation,
            )
            .with_delay(fast)
            .propagate(Propagation::latched(Waypoint::Terminal, Flag::ElectricityTransport)),
        }
    }
}
