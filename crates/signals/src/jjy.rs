//! Support for encoding the JJY time signal.
//!
//! JJY transmits the *current* minute in Japan Standard Time, most significant bit first. The same
//! time code is broadcast on 40 kHz (Fukushima) and 60 kHz (Kyushu). See
//! [JJY documentation](https://en.wikipedia.org/wiki/JJY#Timecode) for details.
//!
//! Call sign announcements in minutes 15 and 45 are not generated; those minutes carry the regular
//! time code.
//!
//! # Examples
//!
//! ```
//! # use signals::jjy;
//! // Friday, June 10, 2016. 17:15:00 JST
//! let frame = jjy::encode(1465546500).unwrap();
//! assert_eq!(frame.bits(), 0x1284E130840B280);
//! assert_eq!(jjy::pulse_width(frame, 0).unwrap(), 200);
//! assert_eq!(jjy::pulse_width(frame, 3).unwrap(), 500);
//! assert_eq!(jjy::pulse_width(frame, 4).unwrap(), 800);
//! ```

use time::tz::{Timezone, TzSpec};
use crate::frame::{bcd, padded_bcd, BitOrder, MinuteFrame};
use crate::MessageError;

/// Transmission order of JJY frames.
pub const ORDER: BitOrder = BitOrder::MsbFirst;

/// Carrier frequency of the Fukushima station in Hz.
pub const CARRIER_40_HZ: u32 = 40000;

/// Carrier frequency of the Kyushu station in Hz.
pub const CARRIER_60_HZ: u32 = 60000;

/// Japan Standard Time, `JST-9`.
pub const ZONE: TzSpec = TzSpec {
	utoff: 32400,
	dst: None
};

/// An unpacked JJY message.
///
/// # Examples
/// ```ignore
/// // Saturday, July 4, 2020. 11:36:58 JST
/// let m = MessageUncompressed::new(1593830218, &Timezone::from_spec(ZONE)).unwrap();
/// assert_eq!((m.hour, m.min), (11, 36));
/// assert_eq!(m.yday, 186);
/// assert_eq!(m.day_of_week, 6);
/// ```
struct MessageUncompressed {
	/// Minute, ranged [0, 59].
	min: u8,
	/// Hour, ranged [0, 23].
	hour: u8,
	/// Day of year, ranged [1, 366].
	yday: u16,
	/// Year of century, ranged [0, 99].
	year: u8,
	/// Day of week, ranged [0, 6], where 0=Sunday, 6=Saturday.
	day_of_week: u8
}

impl MessageUncompressed {
	/// Create a new JJY message for `time` in `timezone`.
	///
	/// # Errors
	///
	/// Returns [`MessageError::UnsupportedTime`] if `time` is before the Unix epoch or after 2155.
	fn new(time: i64, timezone: &Timezone) -> Result<MessageUncompressed, MessageError> {
		if time < 0 {
			return Err(MessageError::UnsupportedTime(time));
		}
		let date = timezone.date(time).ok_or(MessageError::UnsupportedTime(time))?;

		Ok(MessageUncompressed {
			min: date.tm.min,
			hour: date.tm.hour,
			yday: date.tm.yday,
			year: date.tm.year_of_century(),
			day_of_week: date.tm.wday
		})
	}

	/// Pack the message into a frame. Bit 59 is transmitted first.
	fn pack(&self) -> MinuteFrame {
		let mut f = MinuteFrame::new();
		f.set_field(51, 8, padded_bcd(self.min as u16));
		f.set_field(41, 7, padded_bcd(self.hour as u16));
		f.set_field(26, 12, padded_bcd(self.yday));
		// PA1 covers the hour, PA2 the minute
		f.set(23, f.even_parity(41, 47));
		f.set(22, f.even_parity(51, 58));
		f.set_field(11, 8, bcd(self.year));
		f.set_field(7, 3, bcd(self.day_of_week));
		f
	}
}

/// Encode the minute containing `time`.
///
/// # Errors
///
/// Returns [`MessageError::UnsupportedTime`] if `time` is before the Unix epoch or after 2155.
pub fn encode(time: i64) -> Result<MinuteFrame, MessageError> {
	MessageUncompressed::new(time, &Timezone::from_spec(ZONE)).map(|m| m.pack())
}

/// Pulse width in milliseconds for `second` of `frame`.
///
/// JJY keeps the carrier high for the pulse: 200 ms for position markers (second 0 and every
/// second ending in 9), 500 ms for a `1`, and 800 ms for a `0`.
///
/// # Errors
///
/// Returns [`MessageError::SecondOutOfRange`] if `second > 59`.
pub fn pulse_width(frame: MinuteFrame, second: u8) -> Result<u32, MessageError> {
	match second {
		s if s > 59 => Err(MessageError::SecondOutOfRange(s)),
		0 => Ok(200),
		s if s % 10 == 9 => Ok(200),
		s if frame.transmit_bit(ORDER, s) => Ok(500),
		_ => Ok(800)
	}
}
