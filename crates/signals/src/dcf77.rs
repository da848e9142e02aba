//! Support for encoding the DCF77 time signal.
//!
//! DCF77 transmits the *next* minute in German civil time, least significant bit first, with a
//! silent final second marking the start of the following minute. See
//! [DCF77 documentation](https://en.wikipedia.org/wiki/DCF77#Time_code_details) for details.
//!
//! # Examples
//!
//! ```
//! # use signals::dcf77;
//! // Sunday, May 26, 2024. 18:57:00 CEST, so the frame carries 18:58
//! let frame = dcf77::encode(1716742620).unwrap();
//! assert_eq!(frame.field(21, 7), 0x58);
//! assert_eq!(dcf77::pulse_width(frame, 20).unwrap(), 200);
//! assert_eq!(dcf77::pulse_width(frame, 59).unwrap(), 0);
//! ```

use time::tz::{Timezone, TzDateRule, TzRule, TzSpec};
use crate::frame::{bcd, BitOrder, MinuteFrame};
use crate::MessageError;

/// Transmission order of DCF77 frames.
pub const ORDER: BitOrder = BitOrder::LsbFirst;

/// Default carrier frequency in Hz.
pub const CARRIER_HZ: u32 = 77500;

/// German civil time, `CET-1CEST,M3.5.0,M10.5.0/3`.
pub const ZONE: TzSpec = TzSpec {
	utoff: 3600,
	dst: Some((7200, TzRule {
		todst: (TzDateRule::M(3, 5, 0), 7200),
		fromdst: (TzDateRule::M(10, 5, 0), 10800)
	}))
};

/// An unpacked DCF77 message.
///
/// # Examples
///
/// ```ignore
/// // Sunday, May 26, 2024. 18:58:25 CEST / 16:58:25 UTC.
/// let m = MessageUncompressed::new(1716742705, &Timezone::from_spec(ZONE)).unwrap();
/// assert!(m.dst);
/// assert_eq!((m.hour, m.min), (18, 58));
/// assert_eq!(m.dow, 7);
/// assert_eq!(m.pack().bits(), 0x90BE631B120000);
/// ```
struct MessageUncompressed {
	/// Whether CEST is in effect.
	dst: bool,
	/// Minute, ranged [0, 59].
	min: u8,
	/// Hour, ranged [0, 23].
	hour: u8,
	/// Day of month, ranged [1, 31].
	day: u8,
	/// Day of week, ranged [1, 7] where 1=Monday, 7=Sunday.
	dow: u8,
	/// Month, ranged [1, 12].
	month: u8,
	/// Year of century, ranged [0, 99].
	year: u8
}

impl MessageUncompressed {
	/// Create a new DCF77 message for `time` in `timezone`.
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
			dst: date.info.isdst,
			min: date.tm.min,
			hour: date.tm.hour,
			day: date.tm.day,
			dow: if date.tm.wday > 0 { date.tm.wday } else { 7 },
			month: date.tm.mon,
			year: date.tm.year_of_century()
		})
	}

	/// Pack the message into a frame.
	fn pack(&self) -> MinuteFrame {
		let mut f = MinuteFrame::new();
		f.set(17, self.dst);
		f.set(18, !self.dst);
		// Start of encoded time
		f.set(20, true);

		f.set_field(21, 7, bcd(self.min));
		f.set(28, f.even_parity(21, 27));

		f.set_field(29, 6, bcd(self.hour));
		f.set(35, f.even_parity(29, 34));

		f.set_field(36, 6, bcd(self.day));
		f.set_field(42, 3, bcd(self.dow));
		f.set_field(45, 5, bcd(self.month));
		f.set_field(50, 8, bcd(self.year));
		f.set(58, f.even_parity(36, 57));
		f
	}
}

/// Encode the minute following `time`.
///
/// # Errors
///
/// Returns [`MessageError::UnsupportedTime`] if `time` is before the Unix epoch or after 2155.
pub fn encode(time: i64) -> Result<MinuteFrame, MessageError> {
	let next = time.checked_add(60).ok_or(MessageError::UnsupportedTime(time))?;
	MessageUncompressed::new(next, &Timezone::from_spec(ZONE)).map(|m| m.pack())
}

/// Pulse width in milliseconds for `second` of `frame`.
///
/// The carrier is reduced for 100 ms to send a `0` and 200 ms to send a `1`. Second 59 carries no
/// pulse at all.
///
/// # Errors
///
/// Returns [`MessageError::SecondOutOfRange`] if `second > 59`.
pub fn pulse_width(frame: MinuteFrame, second: u8) -> Result<u32, MessageError> {
	match second {
		59 => Ok(0),
		0..=58 if frame.transmit_bit(ORDER, second) => Ok(200),
		0..=58 => Ok(100),
		_ => Err(MessageError::SecondOutOfRange(second))
	}
}
