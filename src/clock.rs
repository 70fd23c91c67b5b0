//! Monotonic time source used for response deadlines and poll scheduling.

/// Millisecond-resolution monotonic timestamp.
pub type Instant = fugit::Instant<u64, 1, 1000>;
/// Millisecond-resolution duration.
pub type Duration = fugit::Duration<u64, 1, 1000>;

/// Supplies "now" to the session and scheduler.
///
/// On an embedded target this is typically backed by a hardware timer; on a
/// host, [`StdClock`] wraps `std::time::Instant`.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> Instant {
        (*self).now()
    }
}

/// Host clock counting milliseconds since its creation.
#[cfg(not(feature = "no_std"))]
pub struct StdClock {
    epoch: std::time::Instant,
}

#[cfg(not(feature = "no_std"))]
impl StdClock {
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

#[cfg(not(feature = "no_std"))]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(feature = "no_std"))]
impl Clock for StdClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.epoch.elapsed().as_millis() as u64)
    }
}
