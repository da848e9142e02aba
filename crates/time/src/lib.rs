//! Calendar and timezone utilities for time code transmission.
//!
//! This crate is divided into two halves: [`time`] converts between Unix timestamps and UTC
//! calendar time and (with the `clock` feature) reads and waits on the system real-time clock;
//! [`tz`] parses [TZ strings] and the TZ string footer of TZif files, and converts Unix timestamps
//! into civil time for an arbitrary timezone.
//!
//! The crate is `no_std` by default. Enabling `std` adds [`tz::parse_file`], and enabling `clock`
//! adds [`time::now`] and [`time::sleep_until`], both backed by `libc`.
//!
//! [TZ strings]: https://www.gnu.org/software/libc/manual/html_node/TZ-Variable.html
//!
//! # Examples
//!
//! Basic conversion from Unix time to UTC calendar time.
//! ```
//! # use time::time::Tm;
//! let date = Tm::new(1704067200).unwrap();
//! assert_eq!(date, Tm {
//! 	sec: 0,
//! 	min: 0,
//! 	hour: 0,
//! 	day: 1,
//! 	mon: 1,
//! 	year: 124,
//! 	wday: 1,
//! 	yday: 1
//! });
//! ```
//!
//! Conversion from Unix time to German civil time.
//! ```
//! # use time::{time::Tm, tz::{parse_tzstring, TzInfo, TmWithTzInfo}};
//! let timezone = parse_tzstring(b"CET-1CEST,M3.5.0,M10.5.0/3").unwrap();
//! let date = timezone.date(1716742680);
//! assert_eq!(date, Some(TmWithTzInfo {
//! 	tm: Tm { sec: 0, min: 58, hour: 18, day: 26, mon: 5, year: 124, wday: 0, yday: 147 },
//! 	info: TzInfo { utoff: 7200, isdst: true }
//! }));
//! ```

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

pub mod time;
pub mod tz;

pub use time::*;
