//! Fixed-width bit frames holding one minute of a time signal.
//!
//! A [`MinuteFrame`] stores 60 bits, one per second of the minute. Bit positions are numbered from
//! the least significant bit. Whether second `0` reads bit `0` or bit `59` depends on the
//! [`BitOrder`] of the time signal.

/// Number of bits in a minute frame.
pub const FRAME_BITS: u8 = 60;

const FRAME_MASK: u64 = (1 << FRAME_BITS) - 1;

/// Order in which a time signal transmits the bits of a [`MinuteFrame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOrder {
	/// Second `s` transmits bit `s`.
	LsbFirst,
	/// Second `s` transmits bit `59 - s`.
	MsbFirst
}

/// A 60-bit frame for one minute of transmission.
///
/// Frames are built once per minute by the encoders and never modified after they are returned.
///
/// # Examples
///
/// ```
/// # use signals::frame::{MinuteFrame, BitOrder, bcd};
/// let mut frame = MinuteFrame::new();
/// frame.set(20, true);
/// frame.set_field(21, 7, bcd(58));
/// assert_eq!(frame.field(21, 7), 0x58);
/// assert!(frame.transmit_bit(BitOrder::LsbFirst, 20));
/// assert!(!frame.transmit_bit(BitOrder::MsbFirst, 20));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct MinuteFrame(u64);

impl MinuteFrame {
	/// An empty frame.
	pub const fn new() -> MinuteFrame {
		MinuteFrame(0)
	}

	/// A frame from raw bits. Bits above bit 59 are discarded.
	pub const fn from_bits(bits: u64) -> MinuteFrame {
		MinuteFrame(bits & FRAME_MASK)
	}

	/// The raw bits of this frame.
	pub const fn bits(&self) -> u64 {
		self.0
	}

	/// Read bit `index`. Indices past the end of the frame read as `false`.
	pub const fn bit(&self, index: u8) -> bool {
		index < FRAME_BITS && (self.0 >> index) & 1 == 1
	}

	/// Set or clear bit `index`. Indices past the end of the frame are ignored.
	pub fn set(&mut self, index: u8, value: bool) {
		if index >= FRAME_BITS {
			return;
		}
		if value {
			self.0 |= 1 << index;
		} else {
			self.0 &= !(1 << index);
		}
	}

	/// Write `value` into the `width` bits starting at bit `lsb`.
	///
	/// Bits of `value` that do not fit in the field are dropped, and so are field bits past the end
	/// of the frame.
	pub fn set_field(&mut self, lsb: u8, width: u8, value: u64) {
		let mask = field_mask(lsb, width);
		self.0 = (self.0 & !mask) | ((value << lsb) & mask);
	}

	/// Read the `width` bits starting at bit `lsb`.
	pub fn field(&self, lsb: u8, width: u8) -> u64 {
		if lsb >= FRAME_BITS {
			return 0;
		}
		(self.0 & field_mask(lsb, width)) >> lsb
	}

	/// Even parity over bits `first..=last`: `true` when an odd number of those bits are set, so
	/// that setting a parity bit to this value makes the total even.
	pub fn even_parity(&self, first: u8, last: u8) -> bool {
		if last < first {
			return false;
		}
		self.field(first, last - first + 1).count_ones() & 1 == 1
	}

	/// Odd parity over bits `first..=last`, the negation of [`MinuteFrame::even_parity`].
	pub fn odd_parity(&self, first: u8, last: u8) -> bool {
		!self.even_parity(first, last)
	}

	/// The bit transmitted during `second`, given the signal's bit order.
	pub fn transmit_bit(&self, order: BitOrder, second: u8) -> bool {
		match order {
			BitOrder::LsbFirst => self.bit(second),
			BitOrder::MsbFirst => second < FRAME_BITS && self.bit(FRAME_BITS - 1 - second)
		}
	}
}

fn field_mask(lsb: u8, width: u8) -> u64 {
	if lsb >= FRAME_BITS || width == 0 {
		return 0;
	}
	let width = width.min(FRAME_BITS - lsb);
	((1u64 << width) - 1) << lsb
}

/// Plain binary coded decimal of a two digit number: tens in the high nibble, ones in the low.
///
/// # Examples
///
/// ```
/// # use signals::frame::bcd;
/// assert_eq!(bcd(59), 0x59);
/// assert_eq!(bcd(7), 0x07);
/// ```
pub const fn bcd(n: u8) -> u64 {
	(((n / 10) % 10) as u64) << 4 | (n % 10) as u64
}

/// Padded binary coded decimal: each decimal digit takes five bits, the top one always zero.
///
/// Ones occupy bits 0-3, tens bits 5-8, and hundreds bits 10-13.
///
/// # Examples
///
/// ```
/// # use signals::frame::padded_bcd;
/// assert_eq!(padded_bcd(59), 0b0101_0_1001);
/// assert_eq!(padded_bcd(366), 0b0011_0_0110_0_0110);
/// ```
pub const fn padded_bcd(n: u16) -> u64 {
	(((n / 100) % 10) as u64) << 10 | (((n / 10) % 10) as u64) << 5 | (n % 10) as u64
}
