//! We use this mocking module in unit tests to emulate a serial port, a
//! monotonic clock and a sensor sink.

use std::cell::Cell;
use std::collections::VecDeque;

use crate::clock::{Clock, Instant};
use crate::registers::{Field, STATUS_PAYLOAD_LEN, WARNING_STATUS_OFFSET};
use crate::sink::{SensorSink, Value};

/// Our mock type used to emulate a half-duplex serial port.
///
/// Reads are scripted as chunks: each `read()` call drains at most one queued
/// chunk, so tests can exercise byte accumulation across partial reads. An
/// empty queue reads as would-block, the way a real port with no pending data
/// does.
pub struct MockSerial {
    write_buffer: Vec<u8>,
    read_chunks: VecDeque<Vec<u8>>,
    should_error_on_write: bool,
    should_error_on_read: bool,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// Would block - no data available
    WouldBlock,
    /// Generic simulated error for testing
    SimulatedError,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MockSerialError::WouldBlock => write!(f, "would block - no data available"),
            MockSerialError::SimulatedError => write!(f, "simulated error"),
        }
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::WouldBlock => embedded_io::ErrorKind::Other,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::BrokenPipe,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        self.write_buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }
        let Some(mut chunk) = self.read_chunks.pop_front() else {
            return Err(MockSerialError::WouldBlock);
        };
        let count = core::cmp::min(buf.len(), chunk.len());
        buf[..count].copy_from_slice(&chunk[..count]);
        if count < chunk.len() {
            // Leftover bytes stay at the front for the next read.
            chunk.drain(..count);
            self.read_chunks.push_front(chunk);
        }
        Ok(count)
    }
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            write_buffer: Vec::new(),
            read_chunks: VecDeque::new(),
            should_error_on_write: false,
            should_error_on_read: false,
        }
    }

    /// Queue one chunk of bytes to be handed out by a future `read()` call.
    pub fn queue_read(&mut self, data: &[u8]) {
        self.read_chunks.push_back(data.to_vec());
    }

    /// Everything written to this mock port so far.
    pub fn written(&self) -> &[u8] {
        &self.write_buffer
    }

    pub fn fail_writes(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    pub fn fail_reads(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

/// Deterministic clock that advances by a fixed step on every reading.
///
/// The session consults the clock at least once per read attempt, so a silent
/// transport walks the clock up to the response deadline and the timeout path
/// runs without real sleeping.
pub struct MockClock {
    now_ms: Cell<u64>,
    step_ms: u64,
}

impl MockClock {
    pub fn stepping(step_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(0),
            step_ms,
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let now = self.now_ms.get();
        self.now_ms.set(now + self.step_ms);
        Instant::from_ticks(now)
    }
}

/// Records everything the session publishes.
pub struct RecordingSink {
    pub published: Vec<(Field, Value)>,
    pub warning_bits: Vec<(usize, bool)>,
    pub link_events: Vec<bool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            published: Vec::new(),
            warning_bits: Vec::new(),
            link_events: Vec::new(),
        }
    }
}

impl SensorSink for RecordingSink {
    fn publish(&mut self, field: Field, value: Value) {
        self.published.push((field, value));
    }

    fn publish_warning_bit(&mut self, index: usize, raised: bool) {
        self.warning_bits.push((index, raised));
    }

    fn link_state(&mut self, online: bool) {
        self.link_events.push(online);
    }
}

/// A status payload with every field populated, shared by the register-map and
/// session tests. Raw values are chosen so each scaling rule is visible.
pub fn build_status_payload() -> [u8; STATUS_PAYLOAD_LEN] {
    let mut payload = [0u8; STATUS_PAYLOAD_LEN];
    let mut put_u16 = |offset: usize, raw: u16| {
        payload[offset..offset + 2].copy_from_slice(&raw.to_be_bytes());
    };
    put_u16(0, 305); // pv_voltage 30.5 V
    put_u16(2, 1312); // battery_voltage 13.12 V
    put_u16(4, 2050); // charging_current 20.50 A
    put_u16(6, 1025); // charging_current_1 10.25 A
    put_u16(8, 1025); // charging_current_2 10.25 A
    put_u16(10, 269); // charging_power 269 W
    put_u16(12, 41); // unit_temperature 41 C
    put_u16(14, 1308); // remote_battery_voltage 13.08 V
    put_u16(16, -7i16 as u16); // remote_battery_temperature -7 C
    put_u16(18, 600); // max_output_power 600 W
    put_u16(20, 120); // nominal_battery_voltage 12.0 V
    put_u16(22, 600); // nominal_charging_current 60.0 A
    put_u16(24, 1440); // absorption_voltage 14.40 V
    put_u16(26, 1380); // float_voltage 13.80 V
    put_u16(28, 42); // temp_compensation 4.2 mV/C
    payload[30] = 1; // batteries_in_series
    payload[31] = 0x01; // battery_type Flooded
    payload[32..34].copy_from_slice(&1110u16.to_be_bytes()); // low_warning_voltage 11.10 V
    payload[34] = 0x01; // remote_batt_voltage_detect Enabled
    payload[35] = 0x00; // remote_temp_detect Disabled
    payload[36] = 0x00; // battery_rated_voltage 12V
    payload[37] = 0x01; // low_shutdown_detect Enabled
    payload[WARNING_STATUS_OFFSET..WARNING_STATUS_OFFSET + 4]
        .copy_from_slice(&0b0000_0101u32.to_be_bytes());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    #[test]
    fn reads_hand_out_one_chunk_at_a_time() {
        let mut mock = MockSerial::new();
        mock.queue_read(b"Hello");
        mock.queue_read(b" World");

        let mut buffer = [0u8; 16];
        assert_eq!(mock.read(&mut buffer).unwrap(), 5);
        assert_eq!(&buffer[..5], b"Hello");
        assert_eq!(mock.read(&mut buffer).unwrap(), 6);
        assert_eq!(&buffer[..6], b" World");
    }

    #[test]
    fn oversized_chunks_carry_over_between_reads() {
        let mut mock = MockSerial::new();
        mock.queue_read(b"abcdef");

        let mut buffer = [0u8; 4];
        assert_eq!(mock.read(&mut buffer).unwrap(), 4);
        assert_eq!(&buffer, b"abcd");
        assert_eq!(mock.read(&mut buffer).unwrap(), 2);
        assert_eq!(&buffer[..2], b"ef");
    }

    #[test]
    fn exhausted_queue_would_block() {
        let mut mock = MockSerial::new();
        let mut buffer = [0u8; 4];
        assert!(matches!(
            mock.read(&mut buffer),
            Err(MockSerialError::WouldBlock)
        ));
    }

    #[test]
    fn writes_accumulate() {
        let mut mock = MockSerial::new();
        mock.write(b"one").unwrap();
        mock.write(b"two").unwrap();
        assert_eq!(mock.written(), b"onetwo");
    }

    #[test]
    fn simulated_errors_trip_both_directions() {
        let mut mock = MockSerial::new();
        mock.fail_writes(true);
        assert!(mock.write(b"x").is_err());
        mock.fail_writes(false);

        mock.queue_read(b"data");
        mock.fail_reads(true);
        let mut buffer = [0u8; 4];
        assert!(mock.read(&mut buffer).is_err());
    }

    #[test]
    fn mock_clock_steps_on_every_reading() {
        let clock = MockClock::stepping(10);
        assert_eq!(clock.now(), Instant::from_ticks(0));
        assert_eq!(clock.now(), Instant::from_ticks(10));
        assert_eq!(clock.now(), Instant::from_ticks(20));
    }
}
