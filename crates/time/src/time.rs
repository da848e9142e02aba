//! UTC calendar arithmetic and access to the system real-time clock.
//!
//! The calendar functions here do not rely on libc's `gmtime`/`mktime`, so they are thread safe and
//! usable without `std`. With the `clock` feature enabled, [`now`] reads `CLOCK_REALTIME` and
//! [`sleep_until`] blocks until an absolute `CLOCK_REALTIME` deadline, which keeps a long-running
//! transmission loop from accumulating drift.
//!
//! # Examples
//!
//! ```
//! # use time::time::{Tm, TimeSpec, Seconds};
//! let minute = TimeSpec { sec: 1704067200, nsec: 0 };
//! let date = Tm::new((minute + Seconds(59)).sec).unwrap();
//! assert_eq!((date.hour, date.min, date.sec), (0, 0, 59));
//! ```

use core::ops::{Add, AddAssign};
#[cfg(feature = "clock")]
use core::mem::MaybeUninit;
#[cfg(feature = "clock")]
use libc::{timespec, clock_gettime, clock_nanosleep, CLOCK_REALTIME, EINTR, TIMER_ABSTIME};

/// Helper type to support math on [`TimeSpec`]s. Represents seconds.
///
/// # Examples
///
/// ```
/// # use time::time::{Seconds, TimeSpec};
/// let c = TimeSpec { sec: 1735732800, nsec: 123456789 };
/// assert_eq!(c + Seconds(10), TimeSpec { sec: c.sec + 10, nsec: c.nsec });
/// ```
#[repr(transparent)]
pub struct Seconds(pub i64);

/// Helper type to support math on [`TimeSpec`]s. Represents milliseconds.
///
/// Pulse widths are expressed in milliseconds, so this is the unit used to compute the end of a
/// pulse from the start of its second.
///
/// # Examples
///
/// ```
/// # use time::time::{Milliseconds, TimeSpec};
/// let c = TimeSpec { sec: 1735732800, nsec: 900000000 };
/// assert_eq!(c + Milliseconds(200), TimeSpec { sec: c.sec + 1, nsec: 100000000 });
/// ```
#[repr(transparent)]
pub struct Milliseconds(pub i64);

/// Helper type to support math on [`TimeSpec`]s. Represents nanoseconds.
///
/// Adding nanoseconds to a [`TimeSpec`] rolls over into seconds as needed.
///
/// # Examples
///
/// ```
/// # use time::time::{Nanoseconds, TimeSpec};
/// let mut c = TimeSpec { sec: 1735732800, nsec: 123456789 };
/// assert_eq!(c + Nanoseconds(10), TimeSpec { sec: c.sec, nsec: 123456799});
/// c.nsec = 999999999;
/// assert_eq!(c + Nanoseconds(10), TimeSpec { sec: c.sec + 1, nsec: 9});
/// ```
#[repr(transparent)]
pub struct Nanoseconds(pub i64);

/// Unix time with nanosecond granularity.
///
/// Supports addition / addition-assignment with [`Seconds`], [`Milliseconds`], and
/// [`Nanoseconds`]. Subtraction is supported by adding negative values.
///
/// # Examples
///
/// ```
/// # use time::time::{Seconds, Nanoseconds, TimeSpec};
/// let c = TimeSpec { sec: 1735732800, nsec: 999999999 };
/// assert_eq!(c + Seconds(10) + Nanoseconds(10), TimeSpec { sec: c.sec + 11, nsec: 9});
/// assert_eq!(c + Seconds(-10), TimeSpec { sec: c.sec - 10, nsec: 999999999 });
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSpec {
	/// Seconds since the Unix epoch
	pub sec: i64,
	/// Nanoseconds since the beginning of `sec`, ranging [0-999999999]
	pub nsec: i64
}

impl TimeSpec {
	/// The start of a whole second.
	#[inline(always)]
	pub const fn from_secs(sec: i64) -> TimeSpec {
		TimeSpec { sec, nsec: 0 }
	}

	/// The start of the minute containing `self`.
	///
	/// # Examples
	///
	/// ```
	/// # use time::time::TimeSpec;
	/// let t = TimeSpec { sec: 1716742705, nsec: 123 };
	/// assert_eq!(t.minute_start(), 1716742680);
	/// ```
	#[inline(always)]
	pub const fn minute_start(&self) -> i64 {
		self.sec - self.sec.rem_euclid(SECONDS_PER_MINUTE)
	}
}

#[cfg_attr(docsrs, doc(cfg(feature = "clock")))]
#[cfg(feature = "clock")]
impl From<timespec> for TimeSpec {
	/// Convert from `libc::timespec` to [`TimeSpec`] for better math ergonomics
	#[allow(clippy::unnecessary_cast)]
	fn from(value: timespec) -> Self {
		TimeSpec {
			sec: value.tv_sec as i64,
			nsec: value.tv_nsec as i64
		}
	}
}

impl Add<Seconds> for TimeSpec {
	type Output = Self;

	fn add(mut self, rhs: Seconds) -> Self::Output {
		self.sec += rhs.0;
		self
	}
}

impl AddAssign<Seconds> for TimeSpec {
	fn add_assign(&mut self, rhs: Seconds) {
		*self = *self + rhs;
	}
}

impl Add<Nanoseconds> for TimeSpec {
	type Output = Self;

	/// Add `rhs` nanoseconds to `self`, keeping `nsec` in the range [0-999999999].
	fn add(mut self, rhs: Nanoseconds) -> Self::Output {
		self.nsec += rhs.0;
		self.sec += self.nsec.div_euclid(NANOSECONDS_PER_SECOND);
		self.nsec = self.nsec.rem_euclid(NANOSECONDS_PER_SECOND);
		self
	}
}

impl AddAssign<Nanoseconds> for TimeSpec {
	fn add_assign(&mut self, rhs: Nanoseconds) {
		*self = *self + rhs;
	}
}

impl Add<Milliseconds> for TimeSpec {
	type Output = Self;

	fn add(self, rhs: Milliseconds) -> Self::Output {
		self + Nanoseconds(rhs.0 * 1000000)
	}
}

/// Error returned by the system clock functions.
///
/// The payload is the error number reported by libc.
#[cfg_attr(docsrs, doc(cfg(feature = "clock")))]
#[cfg(feature = "clock")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockError(pub i32);

#[cfg(feature = "clock")]
impl core::fmt::Display for ClockError {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "System clock call failed with error {}", self.0)
	}
}

#[cfg(feature = "clock")]
impl core::error::Error for ClockError {}

/// Get the current time as a Unix timestamp with nanosecond granularity.
///
/// This function will return `None` if `libc::clock_gettime` fails.
///
/// # Examples
///
/// ```
/// # use time::time::now;
/// let c = now().expect("Failed to get current time");
/// assert!(c.sec > 0);
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "clock")))]
#[cfg(feature = "clock")]
pub fn now() -> Option<TimeSpec> {
	let mut time = MaybeUninit::<timespec>::uninit();
	// Safety:
	// - clock_gettime does not read time, only writes
	// - if clock_gettime returns zero, time is successfully initialized
	unsafe {
		match clock_gettime(CLOCK_REALTIME, time.as_mut_ptr()) {
			0 => Some(time.assume_init().into()),
			_ => None
		}
	}
}

/// Block the calling thread until `CLOCK_REALTIME` reaches `deadline`.
///
/// The deadline is absolute, so repeated calls with deadlines derived from a fixed epoch do not
/// accumulate the scheduling latency of earlier calls. Interruptions by signal handlers (`EINTR`)
/// resume the same deadline. A deadline in the past returns immediately.
///
/// # Errors
///
/// Returns [`ClockError`] with the error number if `clock_nanosleep` fails for any reason other
/// than `EINTR`.
///
/// # Examples
///
/// ```
/// # use time::time::{now, sleep_until, Milliseconds};
/// let start = now().unwrap();
/// sleep_until(start + Milliseconds(5)).unwrap();
/// assert!(now().unwrap() >= start + Milliseconds(5));
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "clock")))]
#[cfg(feature = "clock")]
pub fn sleep_until(deadline: TimeSpec) -> Result<(), ClockError> {
	let target = timespec {
		tv_sec: deadline.sec as libc::time_t,
		tv_nsec: deadline.nsec as libc::c_long
	};
	loop {
		// Safety: target is a valid timespec, and the remainder pointer may be null for absolute
		// sleeps
		match unsafe { clock_nanosleep(CLOCK_REALTIME, TIMER_ABSTIME, &target, core::ptr::null_mut()) } {
			0 => return Ok(()),
			EINTR => continue,
			e => return Err(ClockError(e))
		}
	}
}

/// Check whether a given `year` is a leap year.
///
/// Year must be the absolute Gregorian calendar year (i.e. 2024), not the abbreviated format year
/// stored in [`Tm::year`][Tm#structfield.year]. Use [`Tm::isleapyear()`] for the latter.
///
/// # Examples
///
/// ```
/// # use time::time::isleapyear;
/// assert_eq!(isleapyear(1900), false);
/// assert_eq!(isleapyear(2000), true);
/// assert_eq!(isleapyear(2023), false);
/// assert_eq!(isleapyear(2024), true);
/// ```
#[inline(always)]
pub fn isleapyear(year: u16) -> bool {
	let l = if year%100 != 0 { 3 } else { 15 };
	(year & l) == 0
}

/// Nanoseconds per second.
const NANOSECONDS_PER_SECOND: i64 = 1000000000;
/// Seconds per minute.
pub const SECONDS_PER_MINUTE: i64 = 60;
/// Seconds per hour.
pub const SECONDS_PER_HOUR: i64 = SECONDS_PER_MINUTE * 60;
/// Seconds per day.
pub const SECONDS_PER_DAY: i64 = SECONDS_PER_HOUR * 24;
/// Minutes per day.
pub const MINUTES_PER_DAY: usize = 1440;
/// Days per non-leap year.
const DAYS_PER_NON_LEAP_YEAR: i64 = 365;
/// Days per leap year.
const DAYS_PER_LEAP_YEAR: i64 = DAYS_PER_NON_LEAP_YEAR + 1;
/// Leap years occur every 4 years...
const YEARS_PER_LEAP_YEAR_1: i64 = 4;
/// ... except every 100, unless it's the end of the era.
const YEARS_PER_LEAP_YEAR_2: i64 = 100;
/// Number of years per era.
const YEARS_PER_ERA: i64 = 400;
/// Number of days every 4 years.
const DAYS_PER_LEAP_YEAR_1: i64 = YEARS_PER_LEAP_YEAR_1 * DAYS_PER_NON_LEAP_YEAR;
/// Number of days every 100 years.
const DAYS_PER_LEAP_YEAR_2: i64 = YEARS_PER_LEAP_YEAR_2 * DAYS_PER_NON_LEAP_YEAR
                                + YEARS_PER_LEAP_YEAR_2 / YEARS_PER_LEAP_YEAR_1 - 1;
/// Number of days every era (400 years), excluding the last leap day.
const DAYS_PER_LEAP_YEAR_3: i64 = YEARS_PER_ERA * DAYS_PER_NON_LEAP_YEAR
                                + (YEARS_PER_ERA / YEARS_PER_LEAP_YEAR_2)
                                * (YEARS_PER_LEAP_YEAR_2 / YEARS_PER_LEAP_YEAR_1 - 1);
/// Number of days every era (400 years).
const DAYS_PER_ERA: i64 = DAYS_PER_LEAP_YEAR_3 + 1;
/// Days from January 1 to February 28, inclusive.
const DAYS_FROM_JAN_TO_FEB: i64 = 31 + 28;
/// Days from March 1 to December 31, inclusive.
const DAYS_FROM_MAR_TO_DEC: i64 = DAYS_PER_NON_LEAP_YEAR - DAYS_FROM_JAN_TO_FEB;
/// Days per week.
const DAYS_PER_WEEK: i64 = 7;
/// Days from March 1, 0000 to January 1, 1970.
const DAYS_FROM_JAN_1970_TO_MARCH_0000: i64 = (1970 / YEARS_PER_ERA) * DAYS_PER_ERA
                                            + (1970 % YEARS_PER_ERA) * DAYS_PER_NON_LEAP_YEAR
                                            + (1970 % YEARS_PER_ERA) / YEARS_PER_LEAP_YEAR_1
                                            - (1970 % YEARS_PER_ERA) / YEARS_PER_LEAP_YEAR_2
                                            - DAYS_FROM_JAN_TO_FEB;
/// Years to add to [`Tm::year`][Tm#structfield.year] to get absolute Gregorian calendar year.
pub const YEAR_ADJUST: i64 = 1900;

/// Gregorian calendar date.
///
/// Close to [`libc::tm`], except that `mon` is [1, 12] and `yday` is [1, 366], which are the
/// ranges the time codes transmit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tm {
	/// Seconds, ranged [0, 59]
	pub sec: u8,
	/// Minutes, ranged [0, 59]
	pub min: u8,
	/// Hours, ranged [0, 23]
	pub hour: u8,
	/// Day of the month, ranged [1, 31]
	pub day: u8,
	/// Month of the year, ranged [1, 12]
	pub mon: u8,
	/// Years since 1900, ranged [0, 255] => [1900, 2155]
	pub year: u8,
	/// Day of the week, ranged [0, 6] => [Sunday, Saturday]
	pub wday: u8,
	/// Day of the year, ranged [1, 366]
	pub yday: u16
}

impl Tm {
	/// Convert a Unix timestamp into a calendar date.
	///
	/// Only timestamps from the Unix epoch through the end of 2155 are supported; other inputs
	/// return `None`.
	pub fn new(unixtimestamp: i64) -> Option<Tm> {
		// The Gregorian calendar repeats every 400 years. Rotating the year to start in March puts
		// the leap day at the end of the rotated year, which makes day-of-era to date conversion a
		// pair of linear equations. See:
		// http://howardhinnant.github.io/date_algorithms.html#civil_from_days
		if unixtimestamp < 0 { return None }
		let days = unixtimestamp / SECONDS_PER_DAY;
		let rem = unixtimestamp % SECONDS_PER_DAY;
		let hr = rem / SECONDS_PER_HOUR;
		let remrem = rem % SECONDS_PER_HOUR;
		let z = days + DAYS_FROM_JAN_1970_TO_MARCH_0000;
		let era = z / DAYS_PER_ERA;
		let doe = z % DAYS_PER_ERA;
		let yoe = (doe
			       - doe / DAYS_PER_LEAP_YEAR_1
			       + doe / DAYS_PER_LEAP_YEAR_2
			       - doe / DAYS_PER_LEAP_YEAR_3
			      ) / DAYS_PER_NON_LEAP_YEAR;
		let y = yoe + era * YEARS_PER_ERA - YEAR_ADJUST;
		let leap = yoe / YEARS_PER_LEAP_YEAR_1 - yoe / YEARS_PER_LEAP_YEAR_2;
		let pyoe = if yoe == 0 { -4 } else { yoe-1 };
		let leapadj = leap - pyoe / YEARS_PER_LEAP_YEAR_1 + pyoe / YEARS_PER_LEAP_YEAR_2;
		let doy = doe - (DAYS_PER_NON_LEAP_YEAR * yoe + leap);
		let mp = (5 * doy + 2) / 153;
		let d = doy - (153 * mp + 2) / 5 + 1;
		// Back from the Mar-Feb year to the Jan-Dec year
		let rotate = |l, r| if mp < 10 { l } else { r };
		let m = rotate(mp + 3, mp - 9);
		let y = rotate(y, y + 1);
		let yadj = rotate(0, if leapadj == 0 { DAYS_PER_NON_LEAP_YEAR } else { DAYS_PER_LEAP_YEAR });
		if y > u8::MAX as i64 { return None }

		Some(Tm {
			sec: (remrem % SECONDS_PER_MINUTE) as u8,
			min: (remrem / SECONDS_PER_MINUTE) as u8,
			hour: hr as u8,
			day: d as u8,
			mon: m as u8,
			year: y as u8,
			wday: ((days + 4) % DAYS_PER_WEEK) as u8, // Jan 1, 1970 was a Thursday
			yday: (doy + leapadj + DAYS_FROM_JAN_TO_FEB - yadj + 1) as u16
		})
	}

	/// Get the absolute Gregorian calendar year.
	#[inline(always)]
	pub fn year(&self) -> u16 {
		self.year as u16 + YEAR_ADJUST as u16
	}

	/// Get the two digit year, ranged [0, 99].
	#[inline(always)]
	pub fn year_of_century(&self) -> u8 {
		(self.year() % 100) as u8
	}

	/// Check whether `self` is a leap year.
	#[inline(always)]
	pub fn isleapyear(&self) -> bool {
		isleapyear(self.year())
	}

	/// Minutes since midnight, ranged [0, 1439].
	#[inline(always)]
	pub fn minute_of_day(&self) -> usize {
		self.hour as usize * 60 + self.min as usize
	}
}

/// Get the Unix timestamp for 00:00:00 UTC on a given year and zero-indexed day of year.
///
/// If `leap == true`, then `doy = 59` means February 29, otherwise it means March 1.
///
/// # Examples
///
/// ```
/// # use time::time::timestamp_from_yd;
/// assert_eq!(timestamp_from_yd(2024, 59, true), 1709164800);  // Feb 29, 2024
/// assert_eq!(timestamp_from_yd(2024, 59, false), 1709251200); // Mar  1, 2024
/// ```
pub fn timestamp_from_yd(y: u16, doy: u16, leap: bool) -> i64 {
	// http://howardhinnant.github.io/date_algorithms.html#days_from_civil
	let y = y as i64;
	let doy = doy as i64;
	let cmp = if leap { DAYS_FROM_JAN_TO_FEB + 1 } else { DAYS_FROM_JAN_TO_FEB };
	let (y, doy) = if doy < cmp {
		(y - 1, doy + DAYS_FROM_MAR_TO_DEC)
	} else {
		(y, doy - cmp)
	};
	let era = y / YEARS_PER_ERA;
	let yoe = y - era * YEARS_PER_ERA;
	let doe = yoe * DAYS_PER_NON_LEAP_YEAR
			+ yoe / YEARS_PER_LEAP_YEAR_1
			- yoe / YEARS_PER_LEAP_YEAR_2
			+ doy;
	SECONDS_PER_DAY * (era * DAYS_PER_ERA + doe - DAYS_FROM_JAN_1970_TO_MARCH_0000)
}

/// Get the Unix timestamp for 00:00:00 UTC on a given year, month (1-12), and day.
///
/// # Examples
///
/// ```
/// # use time::time::timestamp_from_ymd;
/// assert_eq!(timestamp_from_ymd(2024, 2, 29), 1709164800);
/// assert_eq!(timestamp_from_ymd(2024, 3, 1), 1709251200);
/// ```
pub fn timestamp_from_ymd(y: u16, m: u8, d: u8) -> i64 {
	let y = if m < 3 { y as i64 - 1 } else { y as i64 };
	let era = y / YEARS_PER_ERA;
	let yoe = y - era * YEARS_PER_ERA;
	let m2 = if m > 2 { m as i64 - 3 } else { m as i64 + 9 };
	let doy = (153 * m2 + 2) / 5 + d as i64 - 1;
	let doe = yoe * DAYS_PER_NON_LEAP_YEAR
			+ yoe / YEARS_PER_LEAP_YEAR_1
			- yoe / YEARS_PER_LEAP_YEAR_2
			+ doy;
	SECONDS_PER_DAY * (era * DAYS_PER_ERA + doe - DAYS_FROM_JAN_1970_TO_MARCH_0000)
}

/// Get the weekday (0-6 => Sunday-Saturday) for a given year, month (1-12), and day.
///
/// # Examples
///
/// ```
/// # use time::time::wday_from_ymd;
/// assert_eq!(wday_from_ymd(2024, 1, 1), 1);   // Monday
/// assert_eq!(wday_from_ymd(2024, 10, 27), 0); // Sunday
/// ```
pub fn wday_from_ymd(y: u16, m: u8, d: u8) -> u8 {
	// https://arxiv.org/pdf/2102.06959
	let factor = if m < 3 {
		3 * m.wrapping_sub(1) as i64
	} else {
		(153 * m as i64 - 447) / 5
	};
	let y = if m < 3 { y.wrapping_sub(1) as i64 } else { y as i64 };
	((
		y
		+ y / YEARS_PER_LEAP_YEAR_1
		- y / YEARS_PER_LEAP_YEAR_2
		+ y / YEARS_PER_ERA
		+ factor
		+ d as i64
	) % 7) as u8
}

/// The number of days in month `m` (1-12) of year `y`.
pub fn days_per_month(y: u16, m: u8) -> u8 {
	if m == 2 {
		if isleapyear(y) { 29 } else { 28 }
	} else {
		30 | (m ^ (m >> 3))
	}
}

/// Get the absolute Gregorian calendar year from a given Unix timestamp.
pub fn y_from_timestamp(unixtimestamp: i64) -> u16 {
	let days = unixtimestamp / SECONDS_PER_DAY;
	let z = days + DAYS_FROM_JAN_1970_TO_MARCH_0000;
	let era = z / DAYS_PER_ERA;
	let doe = z % DAYS_PER_ERA;
	let yoe = (doe
		       - doe / DAYS_PER_LEAP_YEAR_1
		       + doe / DAYS_PER_LEAP_YEAR_2
		       - doe / DAYS_PER_LEAP_YEAR_3
		      ) / DAYS_PER_NON_LEAP_YEAR;
	let y = yoe + era * YEARS_PER_ERA;
	let leap = yoe / YEARS_PER_LEAP_YEAR_1 - yoe / YEARS_PER_LEAP_YEAR_2;
	let doy = doe - (DAYS_PER_NON_LEAP_YEAR * yoe + leap);
	if doy >= DAYS_FROM_MAR_TO_DEC { (y + 1) as u16 } else { y as u16 }
}

#[cfg(test)]
mod tests {
	use super::*;
	use core::mem::MaybeUninit;
	use libc::{time_t, tm};

	// libc's UTC calendar time as the reference
	fn gmtime(time: time_t) -> tm {
		unsafe {
			let mut utc = MaybeUninit::<tm>::uninit();
			libc::gmtime_r(&time, utc.as_mut_ptr());
			utc.assume_init()
		}
	}

	fn check_against_libc(time: i64) {
		let d1 = gmtime(time as time_t);
		let d2 = Tm::new(time).unwrap();
		assert_eq!(
			(d1.tm_sec, d1.tm_min, d1.tm_hour, d1.tm_mday, d1.tm_mon + 1, d1.tm_year, d1.tm_wday, d1.tm_yday + 1),
			(d2.sec as i32, d2.min as i32, d2.hour as i32, d2.day as i32, d2.mon as i32, d2.year as i32,
			 d2.wday as i32, d2.yday as i32),
			"time: {}", time
		);
	}

	#[test]
	fn date_matches_libc() {
		assert!(Tm::new(-1).is_none());
		for t in [0, 5097600, 31449600, 951782400, 1704067200, 1709164800, 1716742680, 1735689599,
		          1844848207, 4102444800] {
			check_against_libc(t);
		}

		// Years are stored relative to 1900 in a u8
		assert_eq!(Tm::new(5869583999).unwrap().year(), 2155);
		assert!(Tm::new(5869584000).is_none());
		assert!(Tm::new(i64::MAX).is_none());
		assert!(Tm::new(i64::MIN).is_none());
	}

	#[test]
	fn tm_helpers() {
		let tm = Tm::new(1716742680).unwrap();
		assert_eq!(tm.year(), 2024);
		assert_eq!(tm.year_of_century(), 24);
		assert!(tm.isleapyear());
		assert_eq!(tm.minute_of_day(), 16 * 60 + 58);
	}

	#[test]
	fn isleapyear_test() {
		assert!(!isleapyear(1900));
		assert!(isleapyear(2000));
		assert!(!isleapyear(2023));
		assert!(isleapyear(2024));
		assert!(!isleapyear(2100));
	}

	#[test]
	fn timespec_math() {
		let t = TimeSpec::from_secs(1716742680);
		assert_eq!(t + Seconds(59) + Milliseconds(800), TimeSpec { sec: 1716742739, nsec: 800000000 });
		assert_eq!(t + Milliseconds(1500), TimeSpec { sec: 1716742681, nsec: 500000000 });
		assert_eq!(t + Nanoseconds(-1), TimeSpec { sec: 1716742679, nsec: 999999999 });
		assert_eq!(TimeSpec { sec: 1716742739, nsec: 5 }.minute_start(), 1716742680);
		assert_eq!(TimeSpec::from_secs(-1).minute_start(), -60);
	}

	#[test]
	fn calendar_helpers() {
		assert_eq!(timestamp_from_yd(2024, 0, true), 1704067200);
		assert_eq!(timestamp_from_yd(2024, 300, false), 1730073600);
		assert_eq!(timestamp_from_ymd(2024, 10, 27), 1729987200);
		assert_eq!(wday_from_ymd(2024, 2, 29), 4);
		assert_eq!(days_per_month(2024, 2), 29);
		assert_eq!(days_per_month(2023, 2), 28);
		assert_eq!(days_per_month(2024, 7), 31);
		assert_eq!(days_per_month(2024, 11), 30);
		assert_eq!(y_from_timestamp(1704067199), 2023);
		assert_eq!(y_from_timestamp(1704067200), 2024);
	}

	#[cfg(feature = "clock")]
	#[test]
	fn sleep_until_past_deadline_returns() {
		let start = now().unwrap();
		assert_eq!(sleep_until(start + Seconds(-5)), Ok(()));
		sleep_until(start + Milliseconds(2)).unwrap();
		assert!(now().unwrap() >= start + Milliseconds(2));
	}
}
