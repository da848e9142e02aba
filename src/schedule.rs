//! Daily transmission windows.
//!
//! A window is written `start-hour:duration-minutes`, for example `1:90` for 01:00 to 02:30 local
//! time. Windows may run past midnight, in which case they continue at the start of the day.

use std::str::FromStr;
use thiserror::Error;

use time::MINUTES_PER_DAY;

/// The error type for parsing schedule windows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
	/// The window is not of the form `start-hour:duration-minutes`.
	#[error("Invalid schedule window (expected start-hour:duration-minutes): {0}")]
	InvalidWindow(String),
	/// The start hour is not in `0..=23`.
	#[error("Schedule window start hour out of range: {0}")]
	HourOutOfRange(u32),
	/// The duration is not in `1..=1440` minutes.
	#[error("Schedule window duration out of range: {0}")]
	DurationOutOfRange(u32)
}

/// A daily window of transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
	/// Local hour the window opens, `0..=23`.
	pub start_hour: u32,
	/// Length of the window in minutes, `1..=1440`.
	pub duration: u32
}

impl FromStr for Window {
	type Err = ScheduleError;

	/// Parse `start-hour:duration-minutes`.
	///
	/// # Examples
	///
	/// ```ignore
	/// assert_eq!("22:180".parse::<Window>(), Ok(Window { start_hour: 22, duration: 180 }));
	/// assert!("25:10".parse::<Window>().is_err());
	/// ```
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || ScheduleError::InvalidWindow(s.to_string());
		let (hour, duration) = s.split_once(':').ok_or_else(invalid)?;
		let start_hour: u32 = hour.trim().parse().map_err(|_| invalid())?;
		let duration: u32 = duration.trim().parse().map_err(|_| invalid())?;

		if start_hour > 23 {
			return Err(ScheduleError::HourOutOfRange(start_hour));
		}
		if duration == 0 || duration as usize > MINUTES_PER_DAY {
			return Err(ScheduleError::DurationOutOfRange(duration));
		}
		Ok(Window { start_hour, duration })
	}
}

/// Which minutes of the local day the transmitter is active.
#[derive(Clone, PartialEq, Eq)]
pub struct ScheduleMask([bool; MINUTES_PER_DAY]);

impl ScheduleMask {
	/// Active only during `windows`. With no windows every minute is active.
	pub fn from_windows(windows: &[Window]) -> ScheduleMask {
		if windows.is_empty() {
			return ScheduleMask::default();
		}

		let mut mask = [false; MINUTES_PER_DAY];
		for w in windows {
			let start = w.start_hour as usize * 60;
			for m in start..start + w.duration as usize {
				mask[m % MINUTES_PER_DAY] = true;
			}
		}
		ScheduleMask(mask)
	}

	/// Whether the transmitter is active at `minute_of_day`. Values past the end of the day wrap.
	pub fn is_active(&self, minute_of_day: usize) -> bool {
		self.0[minute_of_day % MINUTES_PER_DAY]
	}

	/// Number of active minutes per day.
	pub fn active_minutes(&self) -> usize {
		self.0.iter().filter(|&&m| m).count()
	}
}

impl Default for ScheduleMask {
	fn default() -> Self {
		ScheduleMask([true; MINUTES_PER_DAY])
	}
}

impl std::fmt::Debug for ScheduleMask {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "ScheduleMask({} active minutes)", self.active_minutes())
	}
}
