//! This module contains the enumerated value types carried in the status payload.

use modular_bitfield::prelude::*;
use strum_macros::EnumIter;

/// Label published when a raw register value falls outside the documented range.
///
/// The controller keeps working when firmware adds new codes, so an unknown
/// value must degrade to this sentinel rather than fail the decode.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Battery chemistry configured on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum BatteryType {
    Agm = 0x00,
    Flooded = 0x01,
    Gel = 0x02,
    /// Charging profile set manually through the front panel.
    UserDefined = 0x03,
}

impl BatteryType {
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x00 => Some(Self::Agm),
            0x01 => Some(Self::Flooded),
            0x02 => Some(Self::Gel),
            0x03 => Some(Self::UserDefined),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Agm => "AGM",
            Self::Flooded => "Flooded",
            Self::Gel => "Gel",
            Self::UserDefined => "User defined",
        }
    }
}

/// Whether an optional detection feature is active.
///
/// Used for the remote battery voltage probe, the remote temperature probe and
/// the low-voltage shutdown function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum DetectionStatus {
    Disabled = 0x00,
    Enabled = 0x01,
}

impl DetectionStatus {
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x00 => Some(Self::Disabled),
            0x01 => Some(Self::Enabled),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Enabled => "Enabled",
        }
    }
}

/// Rated system voltage of the battery bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum BatteryRatedVoltage {
    V12 = 0x00,
    V24 = 0x01,
    V48 = 0x02,
    /// The controller picks the bank voltage on power-up.
    Auto = 0x03,
}

impl BatteryRatedVoltage {
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x00 => Some(Self::V12),
            0x01 => Some(Self::V24),
            0x02 => Some(Self::V48),
            0x03 => Some(Self::Auto),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::V12 => "12V",
            Self::V24 => "24V",
            Self::V48 => "48V",
            Self::Auto => "Auto",
        }
    }
}

/// Lookup helpers with the sentinel fallback, used by the register map.
pub fn battery_type_label(raw: u8) -> &'static str {
    match BatteryType::from_raw(raw) {
        Some(value) => value.label(),
        None => UNKNOWN_LABEL,
    }
}

pub fn detection_label(raw: u8) -> &'static str {
    match DetectionStatus::from_raw(raw) {
        Some(value) => value.label(),
        None => UNKNOWN_LABEL,
    }
}

pub fn rated_voltage_label(raw: u8) -> &'static str {
    match BatteryRatedVoltage::from_raw(raw) {
        Some(value) => value.label(),
        None => UNKNOWN_LABEL,
    }
}

/// "Warning status register".
///
/// The controller reports one bit per condition, least significant bit first.
/// The upper bits of the 32-bit word are reserved by current firmware.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningStatus {
    pub over_charge_current: bool,
    pub over_temperature: bool,
    pub battery_voltage_under: bool,
    pub battery_voltage_high: bool,
    pub pv_high_loss: bool,
    pub battery_temperature_low: bool,
    pub battery_temperature_high: bool,
    pub pv_low_loss: bool,
    pub pv_high_derating: bool,
    pub temperature_high_derating: bool,
    pub battery_temperature_low_alarm: bool,
    pub battery_low_warning: bool,
    #[skip]
    __: B20,
}

impl WarningStatus {
    /// Number of warning conditions current firmware actually reports.
    pub const FLAG_COUNT: usize = 12;

    /// Read one flag by wire index, LSB first.
    ///
    /// Indices past the end of the bit-vector read as `false`; asking for more
    /// flags than the device carries is not an error.
    pub fn flag(&self, index: usize) -> bool {
        let bytes = self.into_bytes();
        if index >= bytes.len() * 8 {
            return false;
        }
        (bytes[index / 8] >> (index % 8)) & 1 == 1
    }
}
