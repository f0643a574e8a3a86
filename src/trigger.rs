//! Process flags and segment activation triggers
//!
//! Flags are the shared causal state of the stage chain. A trigger names
//! the flag a segment waits for, or `AlwaysOn`.

const FLAG_NAME_WIND: &str = "wind";
const FLAG_NAME_ELECTRICITY_PRODUCTION: &str = "electricity_production";
const FLAG_NAME_ELECTROLYSER: &str = "electrolyser";
const FLAG_NAME_HYDROGEN_PRODUCTION: &str = "hydrogen_production";
const FLAG_NAME_HYDROGEN_TRANSPORT: &str = "hydrogen_transport";
const FLAG_NAME_HYDROGEN_STORAGE: &str = "hydrogen_storage";
const FLAG_NAME_STORAGE_FULL: &str = "storage_full";
const FLAG_NAME_H2_CONSUMPTION: &str = "h2_consumption";
const FLAG_NAME_FABRICATION: &str = "fabrication";
const FLAG_NAME_ELECTRICITY_TRANSPORT: &str = "electricity_transport";
const FLAG_NAME_STORAGE_TRANSPORT: &str = "storage_transport";
const FLAG_NAME_STORAGE_POWERSTATION: &str = "storage_powerstation";
const FLAG_NAME_STREET_LIGHT: &str = "street_light";

const TRIGGER_ID_ALWAYS_ON: u8 = 0;
const TRIGGER_ID_WIND: u8 = 1;
const TRIGGER_ID_ELECTRICITY_PRODUCTION: u8 = 2;
const TRIGGER_ID_ELECTROLYSER: u8 = 3;
const TRIGGER_ID_HYDROGEN_PRODUCTION: u8 = 4;
const TRIGGER_ID_HYDROGEN_TRANSPORT: u8 = 5;
const TRIGGER_ID_HYDROGEN_STORAGE: u8 = 6;
const TRIGGER_ID_H2_CONSUMPTION: u8 = 7;
const TRIGGER_ID_FABRICATION: u8 = 8;
const TRIGGER_ID_ELECTRICITY_TRANSPORT: u8 = 9;
const TRIGGER_ID_STORAGE_TRANSPORT: u8 = 10;
const TRIGGER_ID_STORAGE_POWERSTATION: u8 = 11;

/// One boolean of the stage chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Flag {
    Wind = 0,
    ElectricityProduction = 1,
    Electrolyser = 2,
    HydrogenProduction = 3,
    HydrogenTransport = 4,
    HydrogenStorage = 5,
    StorageFull = 6,
    H2Consumption = 7,
    Fabrication = 8,
    ElectricityTransport = 9,
    StorageTransport = 10,
    StoragePowerstation = 11,
    StreetLight = 12,
}

impl Flag {
    pub const ALL: [Flag; 13] = [
        Flag::Wind,
        Flag::ElectricityProduction,
        Flag::Electrolyser,
        Flag::HydrogenProduction,
        Flag::HydrogenTransport,
        Flag::HydrogenStorage,
        Flag::StorageFull,
        Flag::H2Consumption,
        Flag::Fabrication,
        Flag::ElectricityTransport,
        Flag::StorageTransport,
        Flag::StoragePowerstation,
        Flag::StreetLight,
    ];

    const fn mask(self) -> u16 {
        1 << (self as u8)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wind => FLAG_NAME_WIND,
            Self::ElectricityProduction => FLAG_NAME_ELECTRICITY_PRODUCTION,
            Self::Electrolyser => FLAG_NAME_ELECTROLYSER,
            Self::HydrogenProduction => FLAG_NAME_HYDROGEN_PRODUCTION,
            Self::HydrogenTransport => FLAG_NAME_HYDROGEN_TRANSPORT,
            Self::HydrogenStorage => FLAG_NAME_HYDROGEN_STORAGE,
            Self::StorageFull => FLAG_NAME_STORAGE_FULL,
            Self::H2Consumption => FLAG_NAME_H2_CONSUMPTION,
            Self::Fabrication => FLAG_NAME_FABRICATION,
            Self::ElectricityTransport => FLAG_NAME_ELECTRICITY_TRANSPORT,
            Self::StorageTransport => FLAG_NAME_STORAGE_TRANSPORT,
            Self::StoragePowerstation => FLAG_NAME_STORAGE_POWERSTATION,
            Self::StreetLight => FLAG_NAME_STREET_LIGHT,
        }
    }
}

/// Bit set of process flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessFlags(u16);

impl ProcessFlags {
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn get(self, flag: Flag) -> bool {
        self.0 & flag.mask() != 0
    }

    /// Set or clear a flag, returning true when the value changed
    pub fn set(&mut self, flag: Flag, value: bool) -> bool {
        let before = self.get(flag);
        if value {
            self.0 |= flag.mask();
        } else {
            self.0 &= !flag.mask();
        }
        before != value
    }

    pub fn clear_all(&mut self) {
        self.0 = 0;
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the flags that are currently set
    pub fn iter(self) -> impl Iterator<Item = Flag> {
        Flag::ALL.into_iter().filter(move |flag| self.get(*flag))
    }
}

/// Activation condition of a segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Trigger {
    AlwaysOn = TRIGGER_ID_ALWAYS_ON,
    Wind = TRIGGER_ID_WIND,
    ElectricityProduction = TRIGGER_ID_ELECTRICITY_PRODUCTION,
    Electrolyser = TRIGGER_ID_ELECTROLYSER,
    HydrogenProduction = TRIGGER_ID_HYDROGEN_PRODUCTION,
    HydrogenTransport = TRIGGER_ID_HYDROGEN_TRANSPORT,
    HydrogenStorage = TRIGGER_ID_HYDROGEN_STORAGE,
    H2Consumption = TRIGGER_ID_H2_CONSUMPTION,
    Fabrication = TRIGGER_ID_FABRICATION,
    ElectricityTransport = TRIGGER_ID_ELECTRICITY_TRANSPORT,
    StorageTransport = TRIGGER_ID_STORAGE_TRANSPORT,
    StoragePowerstation = TRIGGER_ID_STORAGE_POWERSTATION,
}

impl Trigger {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            TRIGGER_ID_ALWAYS_ON => Self::AlwaysOn,
            TRIGGER_ID_WIND => Self::Wind,
            TRIGGER_ID_ELECTRICITY_PRODUCTION => Self::ElectricityProduction,
            TRIGGER_ID_ELECTROLYSER => Self::Electrolyser,
            TRIGGER_ID_HYDROGEN_PRODUCTION => Self::HydrogenProduction,
            TRIGGER_ID_HYDROGEN_TRANSPORT => Self::HydrogenTransport,
            TRIGGER_ID_HYDROGEN_STORAGE => Self::HydrogenStorage,
            TRIGGER_ID_H2_CONSUMPTION => Self::H2Consumption,
            TRIGGER_ID_FABRICATION => Self::Fabrication,
            TRIGGER_ID_ELECTRICITY_TRANSPORT => Self::ElectricityTransport,
            TRIGGER_ID_STORAGE_TRANSPORT => Self::StorageTransport,
            TRIGGER_ID_STORAGE_POWERSTATION => Self::StoragePowerstation,
            _ => return None,
        })
    }

    /// The flag this trigger watches, `None` for `AlwaysOn`
    pub const fn flag(self) -> Option<Flag> {
        Some(match self {
            Self::AlwaysOn => return None,
            Self::Wind => Flag::Wind,
            Self::ElectricityProduction => Flag::ElectricityProduction,
            Self::Electrolyser => Flag::Electrolyser,
            Self::HydrogenProduction => Flag::HydrogenProduction,
            Self::HydrogenTransport => Flag::HydrogenTransport,
            Self::HydrogenStorage => Flag::HydrogenStorage,
            Self::H2Consumption => Flag::H2Consumption,
            Self::Fabrication => Flag::Fabrication,
            Self::ElectricityTransport => Flag::ElectricityTransport,
            Self::StorageTransport => Flag::StorageTransport,
            Self::StoragePowerstation => Flag::StoragePowerstation,
        })
    }
}

/// Evaluate a trigger against the current flags
pub const fn is_active(flags: ProcessFlags, trigger: Trigger) -> bool {
    match trigger.flag() {
        None => true,
        Some(flag) => flags.get(flag),
    }
}

/// Evaluate a persisted trigger id; unknown ids are never active
pub fn is_raw_active(flags: ProcessFlags, raw: u8) -> bool {
    Trigger::from_raw(raw).is_some_and(|trigger| is_active(flags, trigger))
}
