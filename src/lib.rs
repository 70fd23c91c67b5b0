//! This crate provides an interface for monitoring the PCM60X family of MPPT solar charge controllers.
//!
//! It supports `no-std` environments by use of the `no_std` feature flag.
//!
//! The controller exposes a single "read status" request; the crate encodes it, validates the
//! framed response (CRC-16/IBM) and decodes the monitored quantities: PV/battery voltages,
//! charging currents and power, temperatures, the configured charging parameters, enumerated
//! text states and the warning flag vector. Decoded values are handed to a
//! [`SensorSink`](sink::SensorSink) implementation supplied by the host.
//!
//! Charge controller models this should work with:
//! * PCM60X
//! * PCM50X
//! * PCM30X
//!
//! The serial port used for controller comms should be configured like so:
//! * Default baud rate: 2400
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//!
//! The link is half duplex: issue one request, wait for the response (or the timeout), and only
//! then issue the next. [`scheduler::PollScheduler`] enforces that cadence.

#![cfg_attr(feature = "no_std", no_std)]

pub mod clock;
pub mod config;
pub mod error;
pub mod frame;
pub mod monitor;
pub mod registers;
pub mod scheduler;
pub mod sink;
pub mod types;

#[cfg(test)]
mod mock_serial;
