//! Support for POSIX TZ strings and the TZ string footer of TZif files.
//!
//! Every timezone used by the time codes is fully described by a [TZ string]: a standard time
//! offset plus an optional pair of daylight savings time transition rules. TZif files (version 2
//! and later, e.g. `/etc/localtime`) end with the same TZ string describing times after their last
//! explicit transition, which is the only part this module reads from them.
//!
//! Unsupported TZ string features:
//! - **Quoted names**. Names enclosed in `<...>` (e.g. `<+09>-9`) are rejected; use an alphabetic
//!   name instead (`JST-9`).
//! - **Timezone names**. Names are validated but not stored.
//!
//! [TZ string]: https://www.gnu.org/software/libc/manual/html_node/TZ-Variable.html
//!
//! # Examples
//!
//! ```
//! # use time::{time::Tm, tz::{parse_tzstring, TzInfo, TmWithTzInfo}};
//! let timezone = parse_tzstring(b"EST5EDT,M3.2.0,M11.1.0").unwrap();
//! assert_eq!(timezone.info(1723433665), TzInfo { utoff: -14400, isdst: true });
//! assert_eq!(timezone.date(1723433665), Some(TmWithTzInfo {
//! 	tm: Tm { sec: 25, min: 34, hour: 23, day: 11, mon: 8, year: 124, wday: 0, yday: 224 },
//! 	info: TzInfo { utoff: -14400, isdst: true }
//! }));
//! ```

use core::{error, fmt};
#[cfg(feature = "std")]
use std::{fs, io, path::Path};
use crate::time::{
	days_per_month,
	isleapyear,
	timestamp_from_yd,
	timestamp_from_ymd,
	wday_from_ymd,
	y_from_timestamp,
	Tm
};

/// The error type for parsing timezones.
#[derive(Debug)]
#[cfg_attr(not(feature = "std"), derive(Clone, Copy, PartialEq))]
pub enum TzError {
	/// Empty input.
	MissingTzString,
	/// A DST name was given without transition rules.
	MissingTzDateRule,
	/// A date component of a [`TzDateRule`] was out of range.
	DateOutOfRange,
	/// A time component was out of range.
	TimeOutOfRange,
	/// The [`TzDateRule`] had an invalid specifier (only 'J', 'M', or a digit are allowed).
	InvalidTzDateRuleSpecifier,
	/// Found unexpected bytes after a valid [`TzSpec`].
	UnexpectedInput,
	/// The TZ string is invalid or unsupported.
	InvalidOrUnsupportedTzString,
	/// The file does not start with the "TZif" magic bytes.
	NotATzFile,
	/// The file is TZif version 1, which has no TZ string footer. The version byte is the payload.
	UnsupportedVersion(u8),
	/// The TZif file has no TZ string footer.
	MissingFooter,
	/// The file could not be read.
	#[cfg(feature = "std")]
	#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
	Io(io::Error)
}

impl fmt::Display for TzError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TzError::MissingTzString => f.write_str("Missing TZ string"),
			TzError::MissingTzDateRule => f.write_str("Missing TZ date rule"),
			TzError::DateOutOfRange => f.write_str("Date component out of range"),
			TzError::TimeOutOfRange => f.write_str("Time component out of range"),
			TzError::InvalidTzDateRuleSpecifier => f.write_str("Invalid date rule"),
			TzError::UnexpectedInput => f.write_str("Unexpected input at end of TZ string"),
			TzError::InvalidOrUnsupportedTzString => f.write_str("Invalid TZ string"),
			TzError::NotATzFile => f.write_str("Not a TZif file"),
			TzError::UnsupportedVersion(v) => write!(f, "Unsupported TZif version: {0:#04x}", v),
			TzError::MissingFooter => f.write_str("TZif file has no TZ string footer"),
			#[cfg(feature = "std")]
			TzError::Io(e) => write!(f, "Failed to read timezone file: {}", e)
		}
	}
}

impl error::Error for TzError {}

#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[cfg(feature = "std")]
impl From<io::Error> for TzError {
	/// Wrap an [`io::Error`] in a [`TzError::Io`].
	fn from(error: io::Error) -> Self {
		TzError::Io(error)
	}
}

/// Timezone information at a moment in time.
///
/// UTC offsets are added to UTC to get local time: New York during standard time has a UTC offset
/// of `-18000` seconds, so `16:00 UTC` becomes `11:00 EST`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct TzInfo {
	/// The UTC offset in seconds
	pub utoff: i32,
	/// Whether standard time (`false`) or daylight savings time (`true`) is in effect
	pub isdst: bool
}

/// Calendar time with associated timezone information.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TmWithTzInfo {
	/// The calendar time (in local timezone)
	pub tm: Tm,
	/// The timezone information for that time
	pub info: TzInfo
}

/// A TZ string date rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TzDateRule {
	/// 'J`n`' where `n` is the day of year between 1 and 365, ignoring leap days, so day 60 is
	/// always March 1st.
	J(u16),
	/// '`n`' where `n` is the zero-indexed day of year between 0 and 365, counting leap days.
	N(u16),
	/// 'M`m`.`w`.`d`': day of week `d` (0-6 => Sunday-Saturday) of week `w` (1-5) of month `m`
	/// (1-12). Week 5 means the last such weekday of the month.
	M(u8, u8, u8)
}

impl TzDateRule {
	/// Convert this date rule into the timestamp of 00:00:00 UTC on the selected day of `year`.
	///
	/// # Examples
	///
	/// ```
	/// # use time::tz::TzDateRule;
	/// assert_eq!(TzDateRule::J(60).as_timestamp(2024), 1709251200);
	/// assert_eq!(TzDateRule::N(59).as_timestamp(2024), 1709164800);
	/// assert_eq!(TzDateRule::M(3, 5, 0).as_timestamp(2024), 1711843200);
	/// ```
	pub fn as_timestamp(&self, year: u16) -> i64 {
		match *self {
			TzDateRule::J(n) => timestamp_from_yd(year, n.saturating_sub(1), false),
			TzDateRule::N(n) => timestamp_from_yd(year, n, isleapyear(year)),
			TzDateRule::M(m, w, d) => {
				// Shift the target weekday relative to the weekday of the 1st, then step whole weeks.
				// The 5th week clamps back a week when it runs past the end of the month.
				let first = wday_from_ymd(year, m, 1);
				let offset = (d + 7 - first) % 7;
				let mut day = 1 + offset + 7 * (w.saturating_sub(1));
				if day > days_per_month(year, m) {
					day -= 7;
				}
				timestamp_from_ymd(year, m, day)
			}
		}
	}
}

/// A pair of TZ string transition rules, each a date and a local time in seconds after midnight.
///
/// Times default to 02:00:00 local time when omitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TzRule {
	/// Transition from standard time to daylight savings time (date & time)
	pub todst: (TzDateRule, i32),
	/// Transition from daylight savings time to standard time (date & time)
	pub fromdst: (TzDateRule, i32)
}

/// A parsed TZ string.
///
/// Offsets are stored with the sign used by [`TzInfo`] (added to UTC), which is the inverse of the
/// sign written in TZ strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TzSpec {
	/// UTC offset for standard time, in seconds
	pub utoff: i32,
	/// Optional DST configuration (UTC offset in seconds and corresponding transition rules)
	pub dst: Option<(i32, TzRule)>
}

/// A byte cursor over a TZ string.
struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize
}

impl<'a> Cursor<'a> {
	fn new(bytes: &'a [u8]) -> Self {
		Cursor { bytes, pos: 0 }
	}

	fn peek(&self) -> Option<u8> {
		self.bytes.get(self.pos).copied()
	}

	fn eat(&mut self, b: u8) -> bool {
		if self.peek() == Some(b) {
			self.pos += 1;
			true
		} else {
			false
		}
	}

	fn is_empty(&self) -> bool {
		self.pos >= self.bytes.len()
	}

	/// Read a run of decimal digits. Returns `None` if there are no digits.
	fn number(&mut self) -> Result<Option<u32>, TzError> {
		let start = self.pos;
		let mut r: u32 = 0;
		while let Some(v @ b'0'..=b'9') = self.peek() {
			r = r.checked_mul(10)
				.and_then(|r| r.checked_add((v - b'0') as u32))
				.ok_or(TzError::TimeOutOfRange)?;
			self.pos += 1;
		}
		Ok((self.pos > start).then_some(r))
	}

	/// Read a timezone name, returning its length.
	fn name(&mut self) -> usize {
		let start = self.pos;
		while let Some(b) = self.peek() {
			if b.is_ascii_alphabetic() {
				self.pos += 1;
			} else {
				break;
			}
		}
		self.pos - start
	}

	/// Read `[+-]hh[:mm[:ss]]` as signed seconds. Hours may range up to 167 in `extended` mode
	/// (transition times), otherwise up to 24.
	fn time(&mut self, extended: bool) -> Result<i32, TzError> {
		let sign = if self.eat(b'-') { -1 } else { self.eat(b'+'); 1 };
		let hours = self.number()?.ok_or(TzError::InvalidOrUnsupportedTzString)?;
		if hours > if extended { 167 } else { 24 } {
			return Err(TzError::TimeOutOfRange);
		}
		let mut seconds = hours * 3600;
		for unit in [60, 1] {
			if !self.eat(b':') {
				break;
			}
			let v = self.number()?.ok_or(TzError::InvalidOrUnsupportedTzString)?;
			if v > 59 {
				return Err(TzError::TimeOutOfRange);
			}
			seconds += v * unit;
		}
		Ok(sign * seconds as i32)
	}

	/// Read a date rule and its optional `/time` suffix.
	fn transition(&mut self) -> Result<(TzDateRule, i32), TzError> {
		let rule = match self.peek() {
			None => return Err(TzError::MissingTzDateRule),
			Some(b'J') => {
				self.pos += 1;
				match self.number()?.ok_or(TzError::InvalidOrUnsupportedTzString)? {
					n @ 1..=365 => TzDateRule::J(n as u16),
					_ => return Err(TzError::DateOutOfRange)
				}
			},
			Some(b'0'..=b'9') => match self.number()? {
				Some(n @ 0..=365) => TzDateRule::N(n as u16),
				_ => return Err(TzError::DateOutOfRange)
			},
			Some(b'M') => {
				self.pos += 1;
				let m = self.number()?.ok_or(TzError::InvalidOrUnsupportedTzString)?;
				if !self.eat(b'.') { return Err(TzError::InvalidOrUnsupportedTzString) }
				let w = self.number()?.ok_or(TzError::InvalidOrUnsupportedTzString)?;
				if !self.eat(b'.') { return Err(TzError::InvalidOrUnsupportedTzString) }
				let d = self.number()?.ok_or(TzError::InvalidOrUnsupportedTzString)?;
				if !(1..=12).contains(&m) || !(1..=5).contains(&w) || d > 6 {
					return Err(TzError::DateOutOfRange);
				}
				TzDateRule::M(m as u8, w as u8, d as u8)
			},
			Some(_) => return Err(TzError::InvalidTzDateRuleSpecifier)
		};
		let time = if self.eat(b'/') { self.time(true)? } else { 7200 };
		Ok((rule, time))
	}
}

impl TzSpec {
	/// Parse a TZ spec from a TZ string.
	///
	/// # Errors
	///
	/// Returns [`TzError`] if `bytes` is empty, is not a POSIX TZ string, uses an unsupported
	/// feature, or has trailing data after the TZ string.
	///
	/// # Examples
	///
	/// ```
	/// # use time::tz::{TzSpec, TzDateRule, TzRule};
	/// assert_eq!(TzSpec::parse(b"JST-9").unwrap(), TzSpec { utoff: 32400, dst: None });
	/// assert_eq!(TzSpec::parse(b"GMT0BST,M3.5.0/1,M10.5.0").unwrap(), TzSpec {
	/// 	utoff: 0,
	/// 	dst: Some((3600, TzRule {
	/// 		todst: (TzDateRule::M(3, 5, 0), 3600),
	/// 		fromdst: (TzDateRule::M(10, 5, 0), 7200)
	/// 	}))
	/// });
	/// ```
	pub fn parse(bytes: &[u8]) -> Result<TzSpec, TzError> {
		if bytes.is_empty() {
			return Err(TzError::MissingTzString);
		}
		let mut c = Cursor::new(bytes);

		if c.name() < 3 {
			return Err(TzError::InvalidOrUnsupportedTzString);
		}
		let utoff = -c.time(false)?;

		let dst = if c.name() == 0 {
			None
		} else {
			// DST defaults to one hour ahead of standard time
			let dstoff = match c.peek() {
				Some(b'0'..=b'9' | b'+' | b'-') => -c.time(false)?,
				_ => utoff + 3600
			};
			if !c.eat(b',') {
				return Err(TzError::MissingTzDateRule);
			}
			let todst = c.transition()?;
			if !c.eat(b',') {
				return Err(TzError::MissingTzDateRule);
			}
			let fromdst = c.transition()?;
			Some((dstoff, TzRule { todst, fromdst }))
		};

		if c.is_empty() {
			Ok(TzSpec { utoff, dst })
		} else {
			Err(TzError::UnexpectedInput)
		}
	}

	/// Get timezone info for a given moment in time.
	///
	/// # Examples
	///
	/// ```
	/// # use time::tz::{TzSpec, TzInfo};
	/// let spec = TzSpec::parse(b"EST5EDT,M3.2.0,M11.1.0").unwrap();
	/// assert_eq!(spec.info(1710053999), TzInfo { utoff: -18000, isdst: false });
	/// assert_eq!(spec.info(1710054000), TzInfo { utoff: -14400, isdst: true });
	/// ```
	pub fn info(&self, time: i64) -> TzInfo {
		let Some((dstoff, rule)) = self.dst else {
			return TzInfo { utoff: self.utoff, isdst: false };
		};

		// Transition times are local; convert them to UTC with the offset in effect before each
		let y = y_from_timestamp(time);
		let todst = rule.todst.0.as_timestamp(y) + rule.todst.1 as i64 - self.utoff as i64;
		let fromdst = rule.fromdst.0.as_timestamp(y) + rule.fromdst.1 as i64 - dstoff as i64;
		// Northern hemisphere rules have todst < fromdst within a year; southern hemisphere rules
		// wrap around the new year
		let isdst = if todst < fromdst {
			todst <= time && time < fromdst
		} else {
			time < fromdst || todst <= time
		};
		TzInfo {
			utoff: if isdst { dstoff } else { self.utoff },
			isdst
		}
	}
}

/// Timezone configuration.
///
/// Converts UTC timestamps to calendar dates in the local timezone, applying the optional daylight
/// savings time rules of its [`TzSpec`]. A timezone without a spec is UTC.
///
/// # Examples
///
/// ```
/// # use time::tz::{parse_tzstring, Timezone, TzInfo};
/// let timezone = parse_tzstring(b"PST8PDT,M3.2.0,M11.1.0").unwrap();
/// assert_eq!(timezone.info(1723433665), TzInfo { utoff: -25200, isdst: true });
/// assert_eq!(Timezone::utc().info(1723433665), TzInfo { utoff: 0, isdst: false });
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timezone {
	spec: Option<TzSpec>
}

impl Timezone {
	/// Coordinated Universal Time.
	pub const fn utc() -> Timezone {
		Timezone { spec: None }
	}

	/// A timezone following `spec`.
	pub const fn from_spec(spec: TzSpec) -> Timezone {
		Timezone { spec: Some(spec) }
	}

	/// Get timezone info for a given moment in time.
	pub fn info(&self, time: i64) -> TzInfo {
		match self.spec {
			Some(spec) => spec.info(time),
			None => TzInfo::default()
		}
	}

	/// Get the calendar date for `time` in this timezone.
	///
	/// Returns `None` when the local time is before the Unix epoch or after 2155.
	pub fn date(&self, time: i64) -> Option<TmWithTzInfo> {
		let info = self.info(time);
		let local = time.checked_add(info.utoff as i64)?;
		Tm::new(local).map(|tm| TmWithTzInfo { tm, info })
	}
}

impl From<TzSpec> for Timezone {
	fn from(spec: TzSpec) -> Self {
		Timezone::from_spec(spec)
	}
}

/// Parse a byte slice containing a TZ string.
///
/// # Errors
///
/// Returns [`TzError`] if the TZ string is malformed.
pub fn parse_tzstring(tzstring: &[u8]) -> Result<Timezone, TzError> {
	TzSpec::parse(tzstring).map(Timezone::from)
}

/// Parse the TZ string footer of TZif data.
///
/// TZif version 2 and later end with `\n<TZ string>\n`. An empty footer is an error, since it means
/// the zone has no rule for times after the last explicit transition.
///
/// # Errors
///
/// Returns [`TzError::NotATzFile`], [`TzError::UnsupportedVersion`], [`TzError::MissingFooter`],
/// or any TZ string error from the footer.
pub fn parse_bytes(bytes: &[u8]) -> Result<Timezone, TzError> {
	if bytes.get(..4) != Some(b"TZif".as_slice()) {
		return Err(TzError::NotATzFile);
	}
	match bytes.get(4).copied() {
		Some(b'2'..=b'4') => (),
		Some(v) => return Err(TzError::UnsupportedVersion(v)),
		None => return Err(TzError::NotATzFile)
	}

	let body = match bytes.split_last() {
		Some((b'\n', body)) => body,
		_ => return Err(TzError::MissingFooter)
	};
	let start = body.iter().rposition(|&b| b == b'\n').ok_or(TzError::MissingFooter)?;
	match &body[start + 1..] {
		[] => Err(TzError::MissingFooter),
		footer => parse_tzstring(footer)
	}
}

/// Read a TZif file and parse its TZ string footer.
///
/// # Errors
///
/// Returns [`TzError::Io`] if the file cannot be read, otherwise see [`parse_bytes`].
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[cfg(feature = "std")]
pub fn parse_file(path: impl AsRef<Path>) -> Result<Timezone, TzError> {
	parse_bytes(&fs::read(path)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(s: &[u8]) -> Result<TzSpec, TzError> {
		TzSpec::parse(s)
	}

	#[test]
	fn tz_spec_parse() {
		assert!(matches!(parse(b""), Err(TzError::MissingTzString)));
		assert!(matches!(parse(b"EST"), Err(TzError::InvalidOrUnsupportedTzString)));
		assert!(matches!(parse(b"<+09>-9"), Err(TzError::InvalidOrUnsupportedTzString)));
		assert!(matches!(parse(b"EST5EDT"), Err(TzError::MissingTzDateRule)));
		assert!(matches!(parse(b"EST5EDT,M3.2.0"), Err(TzError::MissingTzDateRule)));
		assert!(matches!(parse(b"EST5EDT,M13.2.0,M11.1.0"), Err(TzError::DateOutOfRange)));
		assert!(matches!(parse(b"EST5EDT,X3,M11.1.0"), Err(TzError::InvalidTzDateRuleSpecifier)));
		assert!(matches!(parse(b"EST25"), Err(TzError::TimeOutOfRange)));
		assert!(matches!(parse(b"EST5:70"), Err(TzError::TimeOutOfRange)));
		assert!(matches!(parse(b"EST5 "), Err(TzError::UnexpectedInput)));

		assert_eq!(parse(b"UTC0").unwrap(), TzSpec { utoff: 0, dst: None });
		assert_eq!(parse(b"JST-9").unwrap(), TzSpec { utoff: 32400, dst: None });
		assert_eq!(parse(b"CET-1CEST,M3.5.0,M10.5.0/3").unwrap(), TzSpec {
			utoff: 3600,
			dst: Some((7200, TzRule {
				todst: (TzDateRule::M(3, 5, 0), 7200),
				fromdst: (TzDateRule::M(10, 5, 0), 10800)
			}))
		});
		assert_eq!(parse(b"XXX4:30YYY6:45,25/3:10:30,J280/-1:20").unwrap(), TzSpec {
			utoff: -16200,
			dst: Some((-24300, TzRule {
				todst: (TzDateRule::N(25), 11430),
				fromdst: (TzDateRule::J(280), -4800)
			}))
		});
		assert_eq!(parse(b"IST-2IDT,M3.4.4/26,M10.5.0").unwrap(), TzSpec {
			utoff: 7200,
			dst: Some((10800, TzRule {
				todst: (TzDateRule::M(3, 4, 4), 93600),
				fromdst: (TzDateRule::M(10, 5, 0), 7200)
			}))
		});
	}

	#[test]
	fn tz_date_rule_as_timestamp() {
		assert_eq!(TzDateRule::N(0).as_timestamp(2024), 1704067200);
		assert_eq!(TzDateRule::N(365).as_timestamp(2024), 1735603200);
		assert_eq!(TzDateRule::J(1).as_timestamp(2024), 1704067200);
		assert_eq!(TzDateRule::J(59).as_timestamp(2024), 1709078400);
		assert_eq!(TzDateRule::M(1, 1, 0).as_timestamp(2024), 1704585600);
		assert_eq!(TzDateRule::M(1, 5, 0).as_timestamp(2024), 1706400000);
		assert_eq!(TzDateRule::M(1, 1, 1).as_timestamp(2024), 1704067200);
		assert_eq!(TzDateRule::M(1, 5, 1).as_timestamp(2024), 1706486400);
		assert_eq!(TzDateRule::M(9, 5, 5).as_timestamp(2024), 1727395200);
		// Last Sunday of October 2024 is the 27th
		assert_eq!(TzDateRule::M(10, 5, 0).as_timestamp(2024), 1729987200);
	}

	#[test]
	fn tz_spec_info() {
		let spec = parse(b"EST5EDT,M3.2.0,M11.1.0").unwrap();
		assert_eq!(spec.info(1704672000), TzInfo { utoff: -18000, isdst: false });
		assert_eq!(spec.info(1710053999), TzInfo { utoff: -18000, isdst: false });
		assert_eq!(spec.info(1710054000), TzInfo { utoff: -14400, isdst: true });
		assert_eq!(spec.info(1730613599), TzInfo { utoff: -14400, isdst: true });
		assert_eq!(spec.info(1730613600), TzInfo { utoff: -18000, isdst: false });

		// Europe switches at 01:00 UTC on the last Sunday of March/October
		let spec = parse(b"CET-1CEST,M3.5.0,M10.5.0/3").unwrap();
		assert!(!spec.info(1711846799).isdst);
		assert!(spec.info(1711846800).isdst);
		assert!(spec.info(1729990799).isdst);
		assert!(!spec.info(1729990800).isdst);

		// Southern hemisphere rules wrap the new year
		let spec = parse(b"AEST-10AEDT,M10.1.0,M4.1.0/3").unwrap();
		assert!(spec.info(1704067200).isdst);
		assert!(!spec.info(1719792000).isdst);

		// Extreme inputs must not panic
		spec.info(i64::MIN);
		spec.info(i64::MAX);
	}

	#[test]
	fn timezone_date() {
		let tz = parse_tzstring(b"JST-9").unwrap();
		let date = tz.date(1465546500).unwrap();
		assert_eq!((date.tm.hour, date.tm.min, date.tm.yday), (17, 15, 162));
		assert_eq!(Timezone::utc().date(-1), None);
	}

	#[test]
	fn tzif_footer() {
		let data = b"TZif2\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\nCET-1CEST,M3.5.0,M10.5.0/3\n";
		assert_eq!(parse_bytes(data).unwrap(), parse_tzstring(b"CET-1CEST,M3.5.0,M10.5.0/3").unwrap());

		assert!(matches!(parse_bytes(b"TZjf2\n\n"), Err(TzError::NotATzFile)));
		assert!(matches!(parse_bytes(b"TZif\0\nUTC0\n"), Err(TzError::UnsupportedVersion(0))));
		assert!(matches!(parse_bytes(b"TZif3\n\n"), Err(TzError::MissingFooter)));
		assert!(matches!(parse_bytes(b"TZif3UTC0"), Err(TzError::MissingFooter)));
	}

	#[cfg(feature = "std")]
	#[test]
	fn tzif_file() {
		use std::io::Write;
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"TZif2\0\0\0\nEST5EDT,M3.2.0,M11.1.0\n").unwrap();
		let tz = parse_file(file.path()).unwrap();
		assert!(tz.info(1720000000).isdst);

		assert!(matches!(parse_file("/nonexistent/zoneinfo"), Err(TzError::Io(_))));
	}
}
