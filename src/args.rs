//! Support for command line argument parsing.
//!
//! See [crate] documentation for details on command line arguments and examples.

use std::ffi::OsString;
use std::fmt::{Debug, Display};
use thiserror::Error;

use signals::{MessageError, TimeService};
use time::tz::{self, Timezone, TzError};

use crate::schedule::{ScheduleError, Window};

/// Largest accepted `--time-offset` magnitude, in hours (one leap year).
pub const MAX_HOUR_OFFSET: f64 = 24.0 * 366.0;

/// The error type for parsing command line arguments.
#[derive(Error)]
pub enum ArgumentsError {
	/// The option was unrecognized. The option is returned as the payload of this variant.
	#[error("Unrecognized option: {0}")]
	UnrecognizedOption(String),
	/// Error converting an option or parameter to UTF-8. Options are required to be UTF-8, as are
	/// most parameters (except the parameter to `-z` / `--timezone`). The argument index and original
	/// [`OsString`] that could not be converted are returned as the payload of this variant.
	#[error("Invalid UTF-8 in argument {0}: {1:?}")]
	InvalidUTF8(usize, OsString),
	/// No time service was given.
	#[error("Missing time service")]
	MissingService,
	/// The time service is not supported. The supplied name is returned as the payload.
	#[error("Invalid time service: {0}")]
	InvalidService(String),
	/// The carrier frequency was not an integer greater than zero. The supplied argument is
	/// returned as the payload.
	#[error("Carrier frequency must be an integer greater than zero: {0}")]
	InvalidFrequency(String),
	/// The hour offset was not a number within [`MAX_HOUR_OFFSET`] hours of zero. The supplied
	/// argument is returned as the payload.
	#[error("Hour offset must be a number between -8784 and 8784: {0}")]
	InvalidOffset(String),
	/// A schedule window could not be parsed.
	#[error("{0}")]
	InvalidWindow(#[from] ScheduleError),
	/// The parameter for an option was not supplied. The option is returned as the payload for this
	/// variant.
	#[error("Missing parameter for option {0}")]
	MissingParameter(String),
	/// An error occured while parsing the provided timezone. The underlying timezone error is
	/// returned as the payload for this variant.
	#[error("Timezone error: {0}")]
	TimezoneError(TzError),
	/// Help option (-h) was included, so print help details and exit.
	#[error("Help requested")]
	Help
}

impl Debug for ArgumentsError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		Display::fmt(self, f)
	}
}

#[cfg(test)]
impl PartialEq for ArgumentsError {
	// TzError holds io::Error, which has no equality, so compare messages
	fn eq(&self, other: &Self) -> bool {
		self.to_string() == other.to_string()
	}
}

/// Convert an argument to [`&str`].
///
/// The function takes the argument index `i`, optional argument name `a`, and the argument `s`.
///
/// # Errors
///
/// Returns [`ArgumentsError::InvalidUTF8`] if the argument could not be converted to UTF-8 or
/// [`ArgumentsError::MissingParameter`] if the argument is `None`.
fn arg_to_str<'a, 'b>(i: usize, a: Option<&'a str>, s: Option<&'b OsString>)
	-> Result<&'b str, ArgumentsError>
{
	match s {
		Some(v) => v.to_str().ok_or_else(|| ArgumentsError::InvalidUTF8(i, v.clone())),
		None => Err(ArgumentsError::MissingParameter(a.map(String::from).unwrap_or_default()))
	}
}

/// Take the parameter of option `name`, either given inline (`--name=value`) or as the next
/// argument. `i` is advanced past any argument consumed.
fn take_param(
	i: &mut usize,
	name: &str,
	inline: Option<&str>,
	args: &mut impl Iterator<Item = OsString>
) -> Result<OsString, ArgumentsError> {
	match inline {
		Some(v) => Ok(OsString::from(v)),
		None => {
			*i += 1;
			args.next().ok_or_else(|| ArgumentsError::MissingParameter(name.to_string()))
		}
	}
}

/// Parse a timezone argument, which is either a TZif file or a TZ string.
fn parse_timezone(a: &OsString) -> Result<Timezone, ArgumentsError> {
	tz::parse_file(a).or_else(|e| {
		if let TzError::Io(_) = e {
			tz::parse_tzstring(a.as_encoded_bytes())
		} else {
			Err(e)
		}
	}).map_err(ArgumentsError::TimezoneError)
}

/// Parsed command line arguments.
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Arguments {
	/// The time service to transmit.
	pub service: TimeService,
	/// The carrier frequency in Hz, either the service default or the override.
	pub carrier_hz: u32,
	/// Output an unmodulated carrier only.
	pub carrier_only: bool,
	/// Hours added to the transmitted time.
	pub hour_offset: f64,
	/// Skip the system clock sanity check.
	pub disable_checks: bool,
	/// Number of times `-v` was given.
	pub verbosity: u8,
	/// Daily transmission windows. Empty means always transmit.
	pub windows: Vec<Window>,
	/// The configured local timezone (if provided).
	pub timezone: Option<Timezone>
}

impl Arguments {
	/// Parse command line arguments.
	///
	/// The input can be any type that implements [`Iterator`] that yields [`OsString`], though
	/// typically this would be [`std::env::args_os`]. This function assumes that the application
	/// name is **not** supplied as the first item yielded by `args`, see examples for common use.
	///
	/// Long options accept their parameter either as the next argument or inline after `=`.
	///
	/// # Errors
	///
	/// This function can return any of the variants in [`ArgumentsError`]. See that documentation
	/// for more details.
	///
	/// # Examples
	///
	/// ```ignore
	/// let args = match Arguments::parse(std::env::args_os().skip(1)) {
	/// 	Ok(a) => a,
	/// 	Err(e) => {
	/// 		// Handle error
	/// 		panic!("{}", e);
	/// 	}
	/// };
	/// ```
	pub fn parse(mut args: impl Iterator<Item = OsString>) -> Result<Arguments, ArgumentsError>
	{
		let mut service: Option<(TimeService, u32)> = None;
		let mut frequency: Option<u32> = None;
		let mut carrier_only = false;
		let mut hour_offset = 0.0;
		let mut disable_checks = false;
		let mut verbosity: u8 = 0;
		let mut windows = Vec::new();
		let mut timezone: Option<Timezone> = None;
		let mut i = 0;

		while let Some(arg) = args.next() {
			let a = arg_to_str(i, None, Some(&arg))?;
			let (name, inline) = match a.split_once('=') {
				Some((n, v)) if n.starts_with("--") => (n, Some(v)),
				_ => (a, None)
			};

			match name {
				n @ ("-s" | "--time-service") => {
					let p = take_param(&mut i, n, inline, &mut args)?;
					service = Some(lookup(arg_to_str(i, Some(n), Some(&p))?)?);
				},
				"-c" | "--carrier-only" if inline.is_none() => carrier_only = true,
				n @ ("-f" | "--frequency-override") => {
					let p = take_param(&mut i, n, inline, &mut args)?;
					let v = arg_to_str(i, Some(n), Some(&p))?;
					frequency = Some(
						v.parse::<u32>().ok()
							.filter(|&f| f > 0)
							.ok_or_else(|| ArgumentsError::InvalidFrequency(v.to_string()))?
					);
				},
				n @ ("-o" | "--time-offset") => {
					let p = take_param(&mut i, n, inline, &mut args)?;
					let v = arg_to_str(i, Some(n), Some(&p))?;
					hour_offset = v.parse::<f64>().ok()
						.filter(|o: &f64| o.abs() <= MAX_HOUR_OFFSET)
						.ok_or_else(|| ArgumentsError::InvalidOffset(v.to_string()))?;
				},
				"-d" | "--disable-checks" if inline.is_none() => disable_checks = true,
				"--verbose" if inline.is_none() => verbosity = verbosity.saturating_add(1),
				v if v.len() > 1 && v.starts_with('-') && v[1..].bytes().all(|b| b == b'v') => {
					verbosity = verbosity.saturating_add((v.len() - 1).min(u8::MAX as usize) as u8);
				},
				n @ ("-w" | "--window") => {
					let p = take_param(&mut i, n, inline, &mut args)?;
					windows.push(arg_to_str(i, Some(n), Some(&p))?.parse::<Window>()?);
				},
				n @ ("-z" | "--timezone") => {
					let p = take_param(&mut i, n, inline, &mut args)?;
					timezone = Some(parse_timezone(&p)?);
				},
				"-h" | "--help" if inline.is_none() => return Err(ArgumentsError::Help),
				v => {
					if v.starts_with('-') {
						return Err(ArgumentsError::UnrecognizedOption(v.to_string()));
					}

					service = Some(lookup(v)?);
				}
			}
			i += 1;
		}

		let (service, default_hz) = service.ok_or(ArgumentsError::MissingService)?;
		Ok(Arguments {
			service,
			carrier_hz: frequency.unwrap_or(default_hz),
			carrier_only,
			hour_offset,
			disable_checks,
			verbosity,
			windows,
			timezone
		})
	}
}

fn lookup(name: &str) -> Result<(TimeService, u32), ArgumentsError> {
	TimeService::lookup(name).map_err(|e| match e {
		MessageError::UnknownService(s) => ArgumentsError::InvalidService(s),
		_ => ArgumentsError::InvalidService(name.to_string())
	})
}
