//! One monitored charge controller: request, await, decode, report.

use crate::{
    clock::{Clock, Instant},
    config::MonitorConfig,
    error::{Error, Result},
    frame::{self, ParseOutcome, ResponseFrame},
    registers::{self, Field},
    sink::SensorSink,
};
use embedded_io::Error as _;
use strum::IntoEnumIterator;

/// Whether the controller is currently considered reachable.
///
/// `Unknown` only exists between startup and the first decided tick, so the
/// first success and the first threshold crossing both notify the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Unknown,
    Online,
    Offline,
}

/// Transient per-device poll state. Created at startup, never persisted.
#[derive(Debug)]
struct SessionState {
    last_poll: Option<Instant>,
    consecutive_failures: u32,
    last_frame: Option<ResponseFrame>,
    link: LinkState,
}

impl SessionState {
    fn new() -> Self {
        Self {
            last_poll: None,
            consecutive_failures: 0,
            last_frame: None,
            link: LinkState::Unknown,
        }
    }
}

/// You can create a Pcm60x using any interface which implements
/// [embedded_io::Read] & [embedded_io::Write], plus a [Clock] for deadlines.
///
/// The transport and receive buffer are exclusively owned here; one value of
/// this type is one conversation, never interleaved with itself. Run several
/// controllers by creating several independent instances.
pub struct Pcm60x<S, C, const L: usize = 64>
where
    S: embedded_io::Read + embedded_io::Write,
    C: Clock,
{
    interface: S,
    clock: C,
    config: MonitorConfig,
    state: SessionState,
    rx: heapless::Vec<u8, L>,
}

impl<S, C, const L: usize> Pcm60x<S, C, L>
where
    S: embedded_io::Read + embedded_io::Write,
    C: Clock,
{
    /// Create a new monitor instance over the given interface.
    pub fn new(interface: S, clock: C, config: MonitorConfig) -> Self {
        Self {
            interface,
            clock,
            config,
            state: SessionState::new(),
            rx: heapless::Vec::new(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Access the underlying transport, e.g. to reconfigure it between polls.
    pub fn interface_mut(&mut self) -> &mut S {
        &mut self.interface
    }

    /// The last frame that passed validation, if any poll has succeeded yet.
    pub fn last_frame(&self) -> Option<&ResponseFrame> {
        self.state.last_frame.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state.consecutive_failures
    }

    /// When the most recent poll tick started, if one ran.
    pub fn last_poll(&self) -> Option<Instant> {
        self.state.last_poll
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Run one full poll tick: request, await the response, decode, report.
    ///
    /// On success every enabled field plus the configured warning bits are
    /// published to `sink`. On failure nothing is published (the sink keeps
    /// its stale values) and the error says why; the next tick retries from
    /// scratch. Either the whole frame reports or none of it does.
    pub fn poll<K: SensorSink>(&mut self, sink: &mut K) -> Result<(), S::Error> {
        let started = self.clock.now();
        self.state.last_poll = Some(started);
        // A previous tick may have been abandoned mid-wait; its leftovers must
        // not leak into this conversation.
        self.rx.clear();

        if let Err(e) = self.interface.write_all(&frame::encode_request()) {
            return self.fail(sink, Error::SerialError(e));
        }

        let deadline = started + self.config.response_timeout;
        let frame = loop {
            if self.clock.now() >= deadline {
                return self.fail(sink, Error::Timeout);
            }
            let mut chunk = [0u8; 16];
            match self.interface.read(&mut chunk) {
                Ok(0) => continue,
                Ok(count) => {
                    if self.rx.extend_from_slice(&chunk[..count]).is_err() {
                        return self.fail(sink, Error::BufferOverflow);
                    }
                    if let Some(frame) = self.take_frame() {
                        break frame;
                    }
                }
                // The teacher protocol treats these kinds as "no data yet";
                // the deadline check above bounds how long we spin on them.
                Err(e)
                    if matches!(
                        e.kind(),
                        embedded_io::ErrorKind::TimedOut | embedded_io::ErrorKind::Other
                    ) => {}
                Err(e) => return self.fail(sink, Error::SerialError(e)),
            }
        };

        self.report(&frame, sink);
        self.state.last_frame = Some(frame);
        self.state.consecutive_failures = 0;
        if self.state.link != LinkState::Online {
            log::info!("controller online");
            sink.link_state(true);
            self.state.link = LinkState::Online;
        }
        Ok(())
    }

    /// Parse as much of the receive buffer as possible, resynchronizing past
    /// corrupted stretches. `None` means more bytes are required.
    fn take_frame(&mut self) -> Option<ResponseFrame> {
        loop {
            match frame::try_parse(&self.rx) {
                ParseOutcome::Complete(frame) => return Some(frame),
                ParseOutcome::NeedMoreBytes => return None,
                ParseOutcome::Invalid => {
                    log::debug!("corrupt frame data, resynchronizing");
                    frame::resync(&mut self.rx);
                    if self.rx.is_empty() {
                        return None;
                    }
                }
            }
        }
    }

    fn report<K: SensorSink>(&self, frame: &ResponseFrame, sink: &mut K) {
        let values = registers::decode_all(frame);
        for field in Field::iter() {
            if !self.config.enabled.contains(field) {
                continue;
            }
            if let Some(value) = values.get(field) {
                sink.publish(field, value);
            }
        }
        if self.config.warning_bits > 0 {
            if let Some(status) = registers::warning_status(frame) {
                for index in 0..self.config.warning_bits {
                    sink.publish_warning_bit(index, status.flag(index));
                }
            }
        }
        log::debug!("published status frame ({} payload bytes)", frame.payload().len());
    }

    fn fail<K: SensorSink>(&mut self, sink: &mut K, error: Error<S::Error>) -> Result<(), S::Error> {
        self.state.consecutive_failures += 1;
        log::warn!(
            "poll failed ({} consecutive): {error:?}",
            self.state.consecutive_failures
        );
        if self.state.consecutive_failures >= self.config.offline_threshold
            && self.state.link != LinkState::Offline
        {
            log::info!("controller offline");
            sink.link_state(false);
            self.state.link = LinkState::Offline;
        }
        Err(error)
    }
}
