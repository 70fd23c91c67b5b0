//! Host-supplied monitoring configuration.
//!
//! Built once at startup and handed to the session; nothing in here changes at
//! runtime. Any subset of fields may be enabled, including none.

use crate::clock::Duration;
use crate::registers::Field;
use crate::types::WarningStatus;
use strum::EnumCount;

/// Set of enabled [`Field`]s, one bit per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSet(u32);

impl FieldSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self((1 << Field::COUNT) - 1)
    }

    #[must_use]
    pub const fn with(self, field: Field) -> Self {
        Self(self.0 | 1 << field as u32)
    }

    #[must_use]
    pub const fn without(self, field: Field) -> Self {
        Self(self.0 & !(1 << field as u32))
    }

    pub const fn contains(self, field: Field) -> bool {
        self.0 & 1 << field as u32 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Everything the host decides about one monitored controller.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Cadence of the poll loop.
    pub poll_interval: Duration,
    /// How long a poll waits for a complete response after sending the
    /// request. The controller routinely takes a couple hundred milliseconds
    /// at 2400 baud.
    pub response_timeout: Duration,
    /// Consecutive failed polls before the device is reported offline.
    pub offline_threshold: u32,
    /// Which fields get published to the sink. Disabled fields are still
    /// decoded but never reported.
    pub enabled: FieldSet,
    /// How many warning flag indices to publish, LSB first.
    pub warning_bits: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::secs(10),
            response_timeout: Duration::millis(300),
            offline_threshold: 5,
            enabled: FieldSet::all(),
            warning_bits: WarningStatus::FLAG_COUNT,
        }
    }
}
