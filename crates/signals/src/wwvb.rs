//! Support for encoding the WWVB time signal.
//!
//! WWVB transmits the *current* minute in UTC, most significant bit first. The two daylight saving
//! time bits describe the receiver's local timezone rather than UTC: bit 57 of the broadcast is
//! set when DST is in effect a day later, and bit 58 when it is in effect now. See
//! [WWVB documentation](https://en.wikipedia.org/wiki/WWVB#Amplitude-modulated_time_code) for
//! details.
//!
//! Only the amplitude modulated time code is generated. The leap second warning and DUT1 fields
//! are always zero.
//!
//! # Examples
//!
//! ```
//! # use signals::wwvb;
//! # use time::tz;
//! let local = tz::parse_tzstring(b"EST5EDT,M3.2.0,M11.1.0").unwrap();
//!
//! // Monday, January 1, 2024. 00:00 UTC
//! let frame = wwvb::encode(1704067200, &local).unwrap();
//! assert_eq!(frame.bits(), 1 << 26 | 1 << 12 | 1 << 8 | 1 << 4);
//! assert_eq!(wwvb::pulse_width(frame, 0).unwrap(), 800);
//! assert_eq!(wwvb::pulse_width(frame, 1).unwrap(), 200);
//! ```

use time::{isleapyear, Tm, SECONDS_PER_DAY};
use time::tz::Timezone;
use crate::frame::{padded_bcd, BitOrder, MinuteFrame};
use crate::MessageError;

/// Transmission order of WWVB frames.
pub const ORDER: BitOrder = BitOrder::MsbFirst;

/// Default carrier frequency in Hz.
pub const CARRIER_HZ: u32 = 60000;

/// An unpacked WWVB message.
///
/// # Examples
///
/// ```ignore
/// // Wednesday, July 4, 2012. 17:30:00 UTC, New York DST
/// let local = tz::parse_tzstring(b"EST5EDT,M3.2.0,M11.1.0").unwrap();
/// let m = MessageUncompressed::new(1341423000, &local).unwrap();
/// assert_eq!((m.hour, m.min), (17, 30));
/// assert_eq!(m.yday, 186);
/// assert!(m.leapyear);
/// assert_eq!(m.pack().bits(), 0x3004E1418000896);
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
	/// Whether the current year is a leap year.
	leapyear: bool,
	/// Whether local DST is in effect 24 hours from now.
	dst_tomorrow: bool,
	/// Whether local DST is in effect now.
	dst_today: bool
}

impl MessageUncompressed {
	/// Create a new WWVB message for `time`, with DST bits taken from `local`.
	///
	/// # Errors
	///
	/// Returns [`MessageError::UnsupportedTime`] if `time` is before the Unix epoch or after 2155.
	fn new(time: i64, local: &Timezone) -> Result<MessageUncompressed, MessageError> {
		let tm = Tm::new(time).ok_or(MessageError::UnsupportedTime(time))?;
		let tomorrow = time.checked_add(SECONDS_PER_DAY).ok_or(MessageError::UnsupportedTime(time))?;

		Ok(MessageUncompressed {
			min: tm.min,
			hour: tm.hour,
			yday: tm.yday,
			year: tm.year_of_century(),
			leapyear: isleapyear(tm.year()),
			dst_tomorrow: local.info(tomorrow).isdst,
			dst_today: local.info(time).isdst
		})
	}

	/// Pack the message into a frame. Bit 59 is transmitted first.
	fn pack(&self) -> MinuteFrame {
		let mut f = MinuteFrame::new();
		f.set_field(51, 8, padded_bcd(self.min as u16));
		f.set_field(41, 7, padded_bcd(self.hour as u16));
		f.set_field(26, 12, padded_bcd(self.yday));
		f.set_field(6, 9, padded_bcd(self.year as u16));
		f.set(4, self.leapyear);
		f.set(2, self.dst_tomorrow);
		f.set(1, self.dst_today);
		f
	}
}

/// Encode the minute containing `time`, taking the DST bits from the `local` timezone.
///
/// # Errors
///
/// Returns [`MessageError::UnsupportedTime`] if `time` is before the Unix epoch or after 2155.
pub fn encode(time: i64, local: &Timezone) -> Result<MinuteFrame, MessageError> {
	MessageUncompressed::new(time, local).map(|m| m.pack())
}

/// Pulse width in milliseconds for `second` of `frame`.
///
/// WWVB reduces the carrier for 800 ms on markers (second 0 and every second ending in 9), 500 ms
/// for a `1`, and 200 ms for a `0`.
///
/// # Errors
///
/// Returns [`MessageError::SecondOutOfRange`] if `second > 59`.
pub fn pulse_width(frame: MinuteFrame, second: u8) -> Result<u32, MessageError> {
	match second {
		s if s > 59 => Err(MessageError::SecondOutOfRange(s)),
		0 => Ok(800),
		s if s % 10 == 9 => Ok(800),
		s if frame.transmit_bit(ORDER, s) => Ok(500),
		_ => Ok(200)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use time::tz;

	fn new_york() -> Timezone {
		tz::parse_tzstring(b"EST5EDT,M3.2.0,M11.1.0").unwrap()
	}

	#[test]
	fn message_test() {
		let m = MessageUncompressed::new(1341423000, &new_york()).unwrap();
		assert_eq!(m.min, 30);
		assert_eq!(m.hour, 17);
		assert_eq!(m.yday, 186);
		assert_eq!(m.year, 12);
		assert!(m.leapyear);
		assert!(m.dst_today);
		assert!(m.dst_tomorrow);
		assert_eq!(m.pack().bits(), 0x3004E1418000896);
	}

	#[test]
	fn encode_test() {
		// Mon, Jan 1 2024 00:00 UTC: day 1 of leap year 24
		assert_eq!(encode(1704067200, &new_york()).unwrap().bits(), 0x4001110);
		assert_eq!(encode(1704067259, &new_york()).unwrap().bits(), 0x4001110);

		// Sat, Mar 9 2024 16:00 UTC: DST starts in New York within a day
		let f = encode(1710000000, &new_york()).unwrap();
		assert_eq!(f.bits(), 0x4C0324001114);
		assert!(f.bit(2));
		assert!(!f.bit(1));

		// DST bits follow the local timezone, not UTC
		assert!(!encode(1341423000, &Timezone::utc()).unwrap().bit(1));

		assert_eq!(encode(-60, &new_york()), Err(MessageError::UnsupportedTime(-60)));
	}

	#[test]
	fn leap_year_test() {
		// Jan 1 of 2023, 2024, 2000
		assert!(!encode(1672531200, &Timezone::utc()).unwrap().bit(4));
		assert!(encode(1704067200, &Timezone::utc()).unwrap().bit(4));
		assert!(encode(946684800, &Timezone::utc()).unwrap().bit(4));
		assert!(!isleapyear(1900));
		assert!(isleapyear(2000));
	}

	#[test]
	fn pulse_width_test() {
		let f = encode(1341423000, &new_york()).unwrap();
		let widths: Vec<u32> = (0..60).map(|s| pulse_width(f, s).unwrap()).collect();
		for s in [0, 9, 19, 29, 39, 49, 59] {
			assert_eq!(widths[s], 800);
		}
		// Minute 30: 011 0 0000
		assert_eq!(&widths[1..9], &[200, 500, 500, 200, 200, 200, 200, 200]);
		// Both DST bits
		assert_eq!(&widths[57..59], &[500, 500]);
		assert_eq!(pulse_width(f, 60), Err(MessageError::SecondOutOfRange(60)));
	}
}
