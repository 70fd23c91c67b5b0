//! This module is used to define where each monitored quantity lives inside the
//! status payload and how to interpret it.
//!
//! The table is pure data: it performs no I/O, knows nothing about which fields
//! the host enabled, and decoding a frame twice yields identical results.

use strum::EnumCount;
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

use crate::{
    frame::ResponseFrame,
    sink::Value,
    types::{self, WarningStatus},
};

/// Length of the status payload produced by current firmware.
pub const STATUS_PAYLOAD_LEN: usize = 42;

/// Byte offset of the 32-bit warning bit-vector at the tail of the payload.
pub const WARNING_STATUS_OFFSET: usize = 38;

/// Every scalar quantity the controller reports.
///
/// The strum name of each variant is the wire name the host configuration and
/// the sensor sink use, e.g. `Field::PvVoltage.name() == "pv_voltage"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumCountMacro, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Field {
    PvVoltage = 0,
    BatteryVoltage,
    ChargingCurrent,
    #[strum(serialize = "charging_current_1")]
    ChargingCurrent1,
    #[strum(serialize = "charging_current_2")]
    ChargingCurrent2,
    ChargingPower,
    UnitTemperature,
    RemoteBatteryVoltage,
    RemoteBatteryTemperature,
    MaxOutputPower,
    NominalBatteryVoltage,
    NominalChargingCurrent,
    AbsorptionVoltage,
    FloatVoltage,
    TempCompensation,
    BatteriesInSeries,
    LowWarningVoltage,
    BatteryType,
    RemoteBattVoltageDetect,
    RemoteTempDetect,
    BatteryRatedVoltage,
    LowShutdownDetect,
}

impl Field {
    /// Wire name of this field, e.g. `"pv_voltage"`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Where this field lives in the payload and how to interpret it.
    pub fn descriptor(self) -> FieldDescriptor {
        use Encoding::{Signed, Text, Unsigned};
        use Field as F;
        match self {
            F::PvVoltage => FieldDescriptor::numeric(0, 2, Unsigned, 10),
            F::BatteryVoltage => FieldDescriptor::numeric(2, 2, Unsigned, 100),
            F::ChargingCurrent => FieldDescriptor::numeric(4, 2, Unsigned, 100),
            F::ChargingCurrent1 => FieldDescriptor::numeric(6, 2, Unsigned, 100),
            F::ChargingCurrent2 => FieldDescriptor::numeric(8, 2, Unsigned, 100),
            F::ChargingPower => FieldDescriptor::numeric(10, 2, Unsigned, 1),
            F::UnitTemperature => FieldDescriptor::numeric(12, 2, Signed, 1),
            F::RemoteBatteryVoltage => FieldDescriptor::numeric(14, 2, Unsigned, 100),
            F::RemoteBatteryTemperature => FieldDescriptor::numeric(16, 2, Signed, 1),
            F::MaxOutputPower => FieldDescriptor::numeric(18, 2, Unsigned, 1),
            F::NominalBatteryVoltage => FieldDescriptor::numeric(20, 2, Unsigned, 10),
            F::NominalChargingCurrent => FieldDescriptor::numeric(22, 2, Unsigned, 10),
            F::AbsorptionVoltage => FieldDescriptor::numeric(24, 2, Unsigned, 100),
            F::FloatVoltage => FieldDescriptor::numeric(26, 2, Unsigned, 100),
            F::TempCompensation => FieldDescriptor::numeric(28, 2, Unsigned, 10),
            F::BatteriesInSeries => FieldDescriptor::numeric(30, 1, Unsigned, 1),
            F::BatteryType => FieldDescriptor::text(31, types::battery_type_label),
            F::LowWarningVoltage => FieldDescriptor::numeric(32, 2, Unsigned, 100),
            F::RemoteBattVoltageDetect => FieldDescriptor::text(34, types::detection_label),
            F::RemoteTempDetect => FieldDescriptor::text(35, types::detection_label),
            F::BatteryRatedVoltage => FieldDescriptor::text(36, types::rated_voltage_label),
            F::LowShutdownDetect => FieldDescriptor::text(37, types::detection_label),
        }
    }
}

/// How the raw bytes of a field are turned into a [`Value`].
#[derive(Debug, Clone, Copy)]
pub enum Encoding {
    /// Big-endian unsigned integer.
    Unsigned,
    /// Big-endian two's-complement integer.
    Signed,
    /// Single byte mapped through a fixed lookup table.
    Text(fn(u8) -> &'static str),
}

/// Static description of one field: byte extent, interpretation and scaling.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub offset: usize,
    pub width: usize,
    pub kind: Encoding,
    /// Power-of-ten divisor applied to the raw integer. Keeping the scale as
    /// an exact decimal divisor means the scaled value carries exactly
    /// `decimals` fractional digits with no rounding step.
    pub divisor: u16,
    /// Fractional digits the scaled value is accurate to.
    pub decimals: u8,
}

impl FieldDescriptor {
    fn numeric(offset: usize, width: usize, kind: Encoding, divisor: u16) -> Self {
        let decimals = match divisor {
            100 => 2,
            10 => 1,
            _ => 0,
        };
        Self {
            offset,
            width,
            kind,
            divisor,
            decimals,
        }
    }

    fn text(offset: usize, lookup: fn(u8) -> &'static str) -> Self {
        Self {
            offset,
            width: 1,
            kind: Encoding::Text(lookup),
            divisor: 1,
            decimals: 0,
        }
    }
}

/// Decoded values for every field, indexed by [`Field`].
///
/// `None` marks a field whose extent lies beyond the end of the payload, which
/// only happens on frames shorter than [`STATUS_PAYLOAD_LEN`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValues([Option<Value>; Field::COUNT]);

impl FieldValues {
    pub fn get(&self, field: Field) -> Option<Value> {
        self.0[field as usize]
    }
}

/// Decode a single field out of a validated frame.
pub fn decode(frame: &ResponseFrame, field: Field) -> Option<Value> {
    let descriptor = field.descriptor();
    let payload = frame.payload();
    match descriptor.kind {
        Encoding::Unsigned => {
            let raw = raw_unsigned(payload, descriptor.offset, descriptor.width)?;
            Some(Value::Number(raw as f32 / descriptor.divisor as f32))
        }
        Encoding::Signed => {
            let raw = raw_unsigned(payload, descriptor.offset, descriptor.width)?;
            let signed = match descriptor.width {
                1 => raw as u8 as i8 as i32,
                _ => raw as u16 as i16 as i32,
            };
            Some(Value::Number(signed as f32 / descriptor.divisor as f32))
        }
        Encoding::Text(lookup) => payload
            .get(descriptor.offset)
            .map(|&raw| Value::Text(lookup(raw))),
    }
}

/// Decode every field of the frame. Pure: no state, no I/O.
pub fn decode_all(frame: &ResponseFrame) -> FieldValues {
    let mut values = [None; Field::COUNT];
    for field in <Field as strum::IntoEnumIterator>::iter() {
        values[field as usize] = decode(frame, field);
    }
    FieldValues(values)
}

/// Extract the warning bit-vector from the tail of the payload.
pub fn warning_status(frame: &ResponseFrame) -> Option<WarningStatus> {
    let raw = raw_unsigned(frame.payload(), WARNING_STATUS_OFFSET, 4)?;
    Some(WarningStatus::from_bytes(raw.to_le_bytes()))
}

fn raw_unsigned(payload: &[u8], offset: usize, width: usize) -> Option<u32> {
    let bytes = payload.get(offset..offset + width)?;
    let mut raw: u32 = 0;
    for &byte in bytes {
        raw = raw << 8 | byte as u32;
    }
    Some(raw)
}
