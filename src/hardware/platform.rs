//! Raspberry Pi model detection.
//!
//! The model is decoded from the `Revision` line of `/proc/cpuinfo`. See the
//! [revision code documentation](https://github.com/raspberrypi/documentation/blob/develop/documentation/asciidoc/computers/raspberry-pi/revision-codes.adoc)
//! for the format.

use std::{fs, path::Path};

use crate::error::TransmitterError;

/// A Raspberry Pi model family, grouped by peripheral layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
	/// BCM2835: A, B, A+, B+, CM1, Zero, Zero W.
	Pi1,
	/// BCM2836: 2B.
	Pi2,
	/// BCM2837: 3B, 3B+, 3A+, CM3, CM3+, Zero 2 W.
	Pi3,
	/// BCM2711: 4B, 400, CM4, CM4S.
	Pi4,
	/// BCM2712: 5. Its peripherals sit behind the RP1 chip and are not supported.
	Pi5
}

impl Model {
	/// Decode a revision code.
	///
	/// Returns `None` for prototypes, internal models, and unknown codes.
	///
	/// # Examples
	///
	/// ```ignore
	/// assert_eq!(Model::from_revision(0xa02082), Some(Model::Pi3));
	/// assert_eq!(Model::from_revision(0x000e), Some(Model::Pi1));
	/// assert_eq!(Model::from_revision(0xa02052), None);
	/// ```
	pub fn from_revision(revision: u32) -> Option<Model> {
		// Old style codes have no new-style flag (bit 23) and all belong to the first generation
		if (revision >> 23) & 1 == 0 {
			return match revision {
				0x02..=0x09 | 0x0d..=0x15 => Some(Model::Pi1),
				_ => None
			};
		}

		match (revision >> 4) & 0xff {
			0x00 | 0x01 | 0x02 | 0x03 | 0x06 | 0x09 | 0x0c => Some(Model::Pi1),
			0x04 => Some(Model::Pi2),
			0x08 | 0x0a | 0x0d | 0x0e | 0x10 | 0x12 => Some(Model::Pi3),
			0x11 | 0x13 | 0x14 | 0x15 => Some(Model::Pi4),
			0x17 => Some(Model::Pi5),
			_ => None
		}
	}

	/// Physical address of the peripheral block, or `None` if the model is not supported.
	pub fn peripheral_base(&self) -> Option<u64> {
		match self {
			Model::Pi1 => Some(0x20000000),
			Model::Pi2 | Model::Pi3 => Some(0x3f000000),
			Model::Pi4 => Some(0xfe000000),
			Model::Pi5 => None
		}
	}
}

/// Find the hexadecimal revision code in the text of `/proc/cpuinfo`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_revision("Hardware\t: BCM2835\nRevision\t: a02082\n"), Some(0xa02082));
/// ```
pub fn parse_revision(cpuinfo: &str) -> Option<u32> {
	cpuinfo.lines()
		.filter_map(|line| line.split_once(':'))
		.find(|(key, _)| key.trim() == "Revision")
		.and_then(|(_, value)| u32::from_str_radix(value.trim(), 16).ok())
		.filter(|&revision| revision != 0)
}

/// Read `cpuinfo` and identify the board.
///
/// # Errors
///
/// Returns [`TransmitterError::UnsupportedPlatform`] if the file cannot be read, has no revision
/// code, or the revision code is not a known Raspberry Pi.
pub fn probe(cpuinfo: impl AsRef<Path>) -> Result<Model, TransmitterError> {
	let path = cpuinfo.as_ref();
	let text = fs::read_to_string(path)
		.map_err(|e| TransmitterError::UnsupportedPlatform(format!("{}: {}", path.display(), e)))?;
	let revision = parse_revision(&text)
		.ok_or_else(|| TransmitterError::UnsupportedPlatform(String::from("no board revision found")))?;
	Model::from_revision(revision)
		.ok_or_else(|| TransmitterError::UnsupportedPlatform(format!("unknown board revision {:x}", revision)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn revision_test() {
		assert_eq!(Model::from_revision(0x0002), Some(Model::Pi1));
		assert_eq!(Model::from_revision(0x0015), Some(Model::Pi1));
		assert_eq!(Model::from_revision(0x000a), None);
		assert_eq!(Model::from_revision(0x900092), Some(Model::Pi1));
		assert_eq!(Model::from_revision(0xa01041), Some(Model::Pi2));
		assert_eq!(Model::from_revision(0xa02082), Some(Model::Pi3));
		assert_eq!(Model::from_revision(0xa020d3), Some(Model::Pi3));
		assert_eq!(Model::from_revision(0x902120), Some(Model::Pi3));
		assert_eq!(Model::from_revision(0xc03111), Some(Model::Pi4));
		assert_eq!(Model::from_revision(0xc04170), Some(Model::Pi5));
		assert_eq!(Model::from_revision(0xa02052), None);
		assert_eq!(Model::from_revision(0xa020f0), None);
	}

	#[test]
	fn base_test() {
		assert_eq!(Model::Pi1.peripheral_base(), Some(0x20000000));
		assert_eq!(Model::Pi2.peripheral_base(), Some(0x3f000000));
		assert_eq!(Model::Pi3.peripheral_base(), Some(0x3f000000));
		assert_eq!(Model::Pi4.peripheral_base(), Some(0xfe000000));
		assert_eq!(Model::Pi5.peripheral_base(), None);
	}

	#[test]
	fn parse_revision_test() {
		let text = "processor\t: 0\nBogoMIPS\t: 108.00\n\nHardware\t: BCM2835\nRevision\t: c03111\nSerial\t\t: 100000001\n";
		assert_eq!(parse_revision(text), Some(0xc03111));
		assert_eq!(parse_revision("Revision : 000e"), Some(0x000e));
		assert_eq!(parse_revision("Revision\t: zz"), None);
		assert_eq!(parse_revision("Revision\t: 0"), None);
		assert_eq!(parse_revision("model name\t: ARMv7"), None);
	}

	#[test]
	fn probe_test() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"Hardware\t: BCM2835\nRevision\t: a22082\n").unwrap();
		assert_eq!(probe(file.path()).unwrap(), Model::Pi3);

		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"Hardware\t: x86\n").unwrap();
		assert!(matches!(probe(file.path()), Err(TransmitterError::UnsupportedPlatform(_))));

		assert!(matches!(
			probe("/nonexistent/cpuinfo"),
			Err(TransmitterError::UnsupportedPlatform(_))
		));
	}
}
