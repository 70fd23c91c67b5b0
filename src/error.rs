//! Our error types for PCM60X communications.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for PCM60X charge controller communications.
///
/// Only transport-level problems surface here; frame corruption is handled by
/// resynchronization inside a poll and out-of-range register values decode to
/// sentinel values instead of failing.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Serial communication error")]
    SerialError(I),
    #[error("No complete response before the deadline")]
    Timeout,
    #[error("Receive buffer overflow")]
    BufferOverflow,
}
