//! Encode longwave time signals.
//!
//! This crate turns an instant into the 60-bit frame that a public time signal ([DCF77], [JJY],
//! [MSF], or [WWVB]) broadcasts during one minute, and gives the length of the modulated part of
//! each second of that minute. Driving a carrier from the frame is left to the caller.
//!
//! Each signal encodes its own civil time:
//! | Signal     | Timezone                        | Minute encoded | Modulated part of a second |
//! | ---------- | ------------------------------- | -------------- | -------------------------- |
//! | [`dcf77`]  | `CET-1CEST,M3.5.0,M10.5.0/3`    | next           | carrier reduced            |
//! | [`jjy`]    | `JST-9`                         | current        | carrier on                 |
//! | [`msf`]    | `GMT0BST,M3.5.0/1,M10.5.0`      | next           | carrier off                |
//! | [`wwvb`]   | UTC, DST bits from local time   | current        | carrier reduced            |
//!
//! [DCF77]: https://en.wikipedia.org/wiki/DCF77
//! [JJY]: https://en.wikipedia.org/wiki/JJY
//! [MSF]: https://en.wikipedia.org/wiki/Time_from_NPL_(MSF)
//! [WWVB]: https://en.wikipedia.org/wiki/WWVB
//!
//! # Examples
//! ```
//! # use signals::{Encoder, MessageGenerator, TimeService};
//! # use time::tz::Timezone;
//! let (service, carrier) = TimeService::lookup("jjy60").unwrap();
//! assert_eq!(service, TimeService::JJY);
//! assert_eq!(carrier, 60000);
//!
//! let encoder = Encoder::new(service, Timezone::utc());
//! // Friday, June 10, 2016. 17:15 JST
//! let frame = encoder.encode(1465546500).unwrap();
//! for second in 0..60 {
//! 	let width = encoder.pulse_width_millis(frame, second).unwrap();
//! 	assert!(width == 200 || width == 500 || width == 800);
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

use std::{fmt, str::FromStr};
use thiserror::Error;
use time::tz::Timezone;

pub mod frame;
pub mod dcf77;
pub mod jjy;
pub mod msf;
pub mod wwvb;

pub use frame::{BitOrder, MinuteFrame};

/// A public time signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeService {
	/// Germany, 77.5 kHz.
	DCF77,
	/// Japan, 40 kHz or 60 kHz.
	JJY,
	/// United Kingdom, 60 kHz.
	MSF,
	/// United States, 60 kHz.
	WWVB
}

impl TimeService {
	/// Look up a service by name, returning it with its default carrier frequency in Hz.
	///
	/// Names are case-insensitive. `jjy` and `jjy40` select the 40 kHz JJY station, `jjy60` the
	/// 60 kHz one.
	///
	/// # Errors
	///
	/// Returns [`MessageError::UnknownService`] if `name` is not a supported service.
	///
	/// # Examples
	///
	/// ```
	/// # use signals::TimeService;
	/// assert_eq!(TimeService::lookup("DCF77").unwrap(), (TimeService::DCF77, 77500));
	/// assert_eq!(TimeService::lookup("jjy").unwrap(), (TimeService::JJY, 40000));
	/// assert!(TimeService::lookup("wwv").is_err());
	/// ```
	pub fn lookup(name: &str) -> Result<(TimeService, u32), MessageError> {
		match name.to_ascii_lowercase().as_str() {
			"dcf77" => Ok((TimeService::DCF77, dcf77::CARRIER_HZ)),
			"jjy" | "jjy40" => Ok((TimeService::JJY, jjy::CARRIER_40_HZ)),
			"jjy60" => Ok((TimeService::JJY, jjy::CARRIER_60_HZ)),
			"msf" => Ok((TimeService::MSF, msf::CARRIER_HZ)),
			"wwvb" => Ok((TimeService::WWVB, wwvb::CARRIER_HZ)),
			_ => Err(MessageError::UnknownService(name.to_string()))
		}
	}

	/// The order in which this service transmits frame bits.
	pub fn order(&self) -> BitOrder {
		match self {
			TimeService::DCF77 => dcf77::ORDER,
			TimeService::JJY => jjy::ORDER,
			TimeService::MSF => msf::ORDER,
			TimeService::WWVB => wwvb::ORDER
		}
	}

	/// Whether the carrier is on during the pulse of each second.
	///
	/// Only JJY transmits the pulse as carrier; the others transmit it as a gap.
	pub fn pulse_is_carrier(&self) -> bool {
		matches!(self, TimeService::JJY)
	}
}

impl FromStr for TimeService {
	type Err = MessageError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		TimeService::lookup(s).map(|(service, _)| service)
	}
}

impl fmt::Display for TimeService {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			TimeService::DCF77 => "DCF77",
			TimeService::JJY => "JJY",
			TimeService::MSF => "MSF",
			TimeService::WWVB => "WWVB"
		})
	}
}

/// The error type for encoding messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
	/// The input time is outside of 1970 through 2155, or the transmitted time could not be
	/// computed. The unsupported time is provided in the payload.
	#[error("unsupported time: {0}")]
	UnsupportedTime(i64),
	/// The service name does not match a supported time signal.
	#[error("unknown time service: {0}")]
	UnknownService(String),
	/// A second outside of `0..=59` was requested.
	#[error("second out of range: {0}")]
	SecondOutOfRange(u8)
}

/// Encode `time` for `service`.
///
/// DCF77 and MSF encode the minute after `time`, JJY and WWVB the minute containing it. `local` is
/// only used for the WWVB DST bits.
///
/// # Errors
///
/// Returns [`MessageError::UnsupportedTime`] if `time` is before the Unix epoch or after 2155.
pub fn encode(service: TimeService, time: i64, local: &Timezone) -> Result<MinuteFrame, MessageError> {
	match service {
		TimeService::DCF77 => dcf77::encode(time),
		TimeService::JJY => jjy::encode(time),
		TimeService::MSF => msf::encode(time),
		TimeService::WWVB => wwvb::encode(time, local)
	}
}

/// Length of the pulse in `second` of `frame` for `service`, in milliseconds.
///
/// # Errors
///
/// Returns [`MessageError::SecondOutOfRange`] if `second > 59`.
pub fn pulse_width_millis(service: TimeService, frame: MinuteFrame, second: u8) -> Result<u32, MessageError> {
	match service {
		TimeService::DCF77 => dcf77::pulse_width(frame, second),
		TimeService::JJY => jjy::pulse_width(frame, second),
		TimeService::MSF => msf::pulse_width(frame, second),
		TimeService::WWVB => wwvb::pulse_width(frame, second)
	}
}

/// Trait for time signal message generators.
pub trait MessageGenerator {
	/// Get the frame to transmit during the minute starting at `time`.
	///
	/// It is up to the generator which minute the frame describes. For example, DCF77 encodes the
	/// minute **after** `time`, while WWVB encodes the minute **at** `time`.
	fn encode(&self, time: i64) -> Result<MinuteFrame, MessageError>;

	/// Get the pulse length in milliseconds for `second` of `frame`.
	fn pulse_width_millis(&self, frame: MinuteFrame, second: u8) -> Result<u32, MessageError>;
}

/// Message generator for one [`TimeService`].
#[derive(Clone, Copy, Debug)]
pub struct Encoder {
	service: TimeService,
	local: Timezone
}

impl Encoder {
	/// Create a new encoder. `local` is the receiver's timezone, used for the WWVB DST bits.
	pub fn new(service: TimeService, local: Timezone) -> Encoder {
		Encoder { service, local }
	}
}

impl MessageGenerator for Encoder {
	fn encode(&self, time: i64) -> Result<MinuteFrame, MessageError> {
		encode(self.service, time, &self.local)
	}

	fn pulse_width_millis(&self, frame: MinuteFrame, second: u8) -> Result<u32, MessageError> {
		pulse_width_millis(self.service, frame, second)
	}
}
