//! The boundary between this crate and whatever consumes the measurements.

use crate::registers::Field;

/// One decoded measurement.
///
/// The register map tags each field with the variant it produces; the sink
/// does not need separate channels per sensor kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f32),
    Text(&'static str),
    Flag(bool),
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Number(number) => write!(f, "{number}"),
            Value::Text(text) => f.write_str(text),
            Value::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// Receives decoded values from the poll loop.
///
/// The session publishes every enabled field of a validated frame, every tick;
/// implementations that only care about changes are free to deduplicate.
/// Failed ticks publish nothing, so the previous values stay whatever the
/// sink last stored.
pub trait SensorSink {
    /// A scalar field decoded from the status payload.
    fn publish(&mut self, field: Field, value: Value);

    /// One warning flag, by wire index.
    fn publish_warning_bit(&mut self, index: usize, raised: bool);

    /// Link supervision: `false` once the consecutive-failure threshold is
    /// reached, `true` again on the next successful poll.
    fn link_state(&mut self, _online: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_display_for_humans() {
        #[cfg(not(feature = "no_std"))]
        {
            assert_eq!(Value::Number(30.5).to_string(), "30.5");
            assert_eq!(Value::Text("AGM").to_string(), "AGM");
            assert_eq!(Value::Flag(true).to_string(), "true");
        }
    }
}
