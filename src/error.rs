//! Error types used across modules.
//!
//! This module contains the error types that may be created and used within this crate. See
//! individual error types for documentation.

use std::{fmt, io};
use thiserror::Error;

use signals::MessageError;
use time::ClockError;

/// Why a clock source could not be used to generate the carrier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RejectReason {
	/// The source is excluded from use because its frequency follows other system activity.
	Disabled,
	/// The frequency of the source could not be measured.
	Unmeasured,
	/// The divider needed for the target is outside `[2, 4095]`. The divider is the payload.
	DividerOutOfRange(f64)
}

/// A clock source that was not selected, with the reason it was rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
	/// Name of the clock source.
	pub source: &'static str,
	/// Reason the source was rejected.
	pub reason: RejectReason
}

impl fmt::Display for Rejection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.reason {
			RejectReason::Disabled => write!(f, "{}: disabled", self.source),
			RejectReason::Unmeasured => write!(f, "{}: frequency unknown", self.source),
			RejectReason::DividerOutOfRange(d) => write!(f, "{}: divider {:.4} out of range", self.source, d)
		}
	}
}

/// A list of [`Rejection`]s, displayed comma separated.
#[derive(Clone, Debug, PartialEq)]
pub struct Rejections(pub Vec<Rejection>);

impl fmt::Display for Rejections {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, r) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}", r)?;
		}
		Ok(())
	}
}

/// The error type for running the transmitter.
#[derive(Debug, Error)]
pub enum TransmitterError {
	/// The board revision could not be read or is not a supported Raspberry Pi.
	#[error("Unsupported platform: {0}")]
	UnsupportedPlatform(String),
	/// Mapping the peripheral registers failed, usually for lack of root privileges.
	#[error("Hardware unavailable (are you root?): {0}")]
	HardwareUnavailable(#[source] io::Error),
	/// No clock source can produce the requested carrier frequency.
	#[error("No suitable clock source for {target} Hz: {rejections}")]
	NoSuitableClockSource {
		/// Requested carrier frequency in Hz.
		target: u32,
		/// Every candidate source and the reason it was rejected.
		rejections: Rejections
	},
	/// Encoding a minute or looking up a pulse width failed.
	#[error("Encoding error: {0}")]
	Encoding(#[from] MessageError),
	/// Reading or waiting on the system clock failed.
	#[error("System clock error: {0}")]
	Clock(#[from] ClockError),
	/// The system clock is not plausible, so transmitting would set receivers to a wrong time.
	#[error("Sanity check failed: system clock year {0} is before 2020 (use -d to skip this check)")]
	SanityCheck(u16),
	/// Installing the SIGINT / SIGTERM handlers failed.
	#[error("Failed to install signal handlers: {0}")]
	Signal(#[source] io::Error),
	/// Locking process memory failed.
	#[error("Failed to lock memory: {0}")]
	MemoryLock(#[source] io::Error),
	/// The transmitter thread could not be started or panicked.
	#[error("Transmitter thread failed: {0}")]
	Thread(String)
}
