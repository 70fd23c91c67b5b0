//! Fixed-cadence driver for the poll loop.

use crate::{
    clock::{Clock, Duration, Instant},
    error::Result,
    monitor::Pcm60x,
    sink::SensorSink,
};

/// Invokes [`Pcm60x::poll`] once per interval.
///
/// The session executes strictly sequentially, so a poll that overruns its
/// slot simply defers the next one; missed interval boundaries are collapsed
/// rather than replayed, which keeps the half-duplex bus at one in-flight
/// request and avoids catch-up bursts after a stall. Failed polls are not
/// retried early; recovery is the next regular tick.
#[derive(Debug)]
pub struct PollScheduler {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Whether a tick should run at `now`. The first tick is always due.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.next_due {
            Some(due) => now >= due,
            None => true,
        }
    }

    /// Run one poll if an interval boundary has passed.
    ///
    /// Returns `None` when nothing was due, otherwise the poll outcome.
    pub fn run<S, C, K, const L: usize>(
        &mut self,
        session: &mut Pcm60x<S, C, L>,
        sink: &mut K,
    ) -> Option<Result<(), S::Error>>
    where
        S: embedded_io::Read + embedded_io::Write,
        C: Clock,
        K: SensorSink,
    {
        let now = session.now();
        if !self.is_due(now) {
            return None;
        }
        self.advance(now);
        Some(session.poll(sink))
    }

    /// Move the deadline past `now`, skipping any boundaries that elapsed
    /// while the previous poll was in flight.
    fn advance(&mut self, now: Instant) {
        let mut due = match self.next_due {
            Some(due) => due,
            None => now,
        };
        while due <= now {
            due += self.interval;
        }
        self.next_due = Some(due);
    }
}
