//! Support for encoding the MSF time signal.
//!
//! MSF transmits the *next* minute in UK civil time, most significant bit first. Each second
//! carries two bits, A and B. The A bits hold the date and time in BCD and the fixed `01111110`
//! minute identifier in seconds 52-59. The B bits hold odd parity over the A fields and the
//! summer time flag. DUT1 and the summer time warning are always zero. See
//! [MSF documentation](https://en.wikipedia.org/wiki/Time_from_NPL_(MSF)#Timecode) for details.
//!
//! The frame stores the A fields and B bits side by side: B bits live in frame bits 1-5 (seconds
//! 54-58), a range where the A bits are fixed and are instead added by [`pulse_width`].
//!
//! # Examples
//!
//! ```
//! # use signals::msf;
//! // Monday, January 1, 2024. 00:00 GMT
//! let frame = msf::encode(1704067140).unwrap();
//! assert_eq!(frame.bits(), 0x12041200034);
//! assert_eq!(msf::pulse_width(frame, 0).unwrap(), 500);
//! assert_eq!(msf::pulse_width(frame, 53).unwrap(), 200);
//! assert_eq!(msf::pulse_width(frame, 54).unwrap(), 300);
//! ```

use time::tz::{Timezone, TzDateRule, TzRule, TzSpec};
use crate::frame::{bcd, BitOrder, MinuteFrame};
use crate::MessageError;

/// Transmission order of MSF frames.
pub const ORDER: BitOrder = BitOrder::MsbFirst;

/// Default carrier frequency in Hz.
pub const CARRIER_HZ: u32 = 60000;

/// UK civil time, `GMT0BST,M3.5.0/1,M10.5.0`.
pub const ZONE: TzSpec = TzSpec {
	utoff: 0,
	dst: Some((3600, TzRule {
		todst: (TzDateRule::M(3, 5, 0), 3600),
		fromdst: (TzDateRule::M(10, 5, 0), 7200)
	}))
};

/// An unpacked MSF message.
struct MessageUncompressed {
	/// Year of century, ranged [0, 99].
	year: u8,
	/// Month, ranged [1, 12].
	month: u8,
	/// Day of month, ranged [1, 31].
	day: u8,
	/// Day of week, ranged [0, 6], where 0=Sunday.
	day_of_week: u8,
	/// Hour, ranged [0, 23].
	hour: u8,
	/// Minute, ranged [0, 59].
	min: u8,
	/// Whether BST is in effect.
	bst: bool
}

impl MessageUncompressed {
	/// Create a new MSF message for `time` in `timezone`.
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
			year: date.tm.year_of_century(),
			month: date.tm.mon,
			day: date.tm.day,
			day_of_week: date.tm.wday,
			hour: date.tm.hour,
			min: date.tm.min,
			bst: date.info.isdst
		})
	}

	/// Pack the message into a frame. Bit 59 is transmitted first.
	fn pack(&self) -> MinuteFrame {
		let mut f = MinuteFrame::new();
		f.set_field(35, 8, bcd(self.year));
		f.set_field(30, 5, bcd(self.month));
		f.set_field(24, 6, bcd(self.day));
		f.set_field(21, 3, bcd(self.day_of_week));
		f.set_field(15, 6, bcd(self.hour));
		f.set_field(8, 7, bcd(self.min));

		f.set(5, f.odd_parity(35, 42));
		f.set(4, f.odd_parity(24, 34));
		f.set(3, f.odd_parity(21, 23));
		f.set(2, f.odd_parity(8, 20));
		f.set(1, self.bst);
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
/// Second 0 is a 500 ms minute marker. Every other second starts with 100 ms off, followed by
/// 100 ms for the bit at that position and another 100 ms in seconds 53-58, where the minute
/// identifier sets the A bit.
///
/// # Errors
///
/// Returns [`MessageError::SecondOutOfRange`] if `second > 59`.
pub fn pulse_width(frame: MinuteFrame, second: u8) -> Result<u32, MessageError> {
	match second {
		s if s > 59 => Err(MessageError::SecondOutOfRange(s)),
		0 => Ok(500),
		s => {
			let bit = if frame.transmit_bit(ORDER, s) { 100 } else { 0 };
			let identifier = if (53..=58).contains(&s) { 100 } else { 0 };
			Ok(100 + bit + identifier)
		}
	}
}
