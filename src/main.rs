//! Transmit longwave time signals from a Raspberry Pi GPIO pin.
//!
//! This crate generates the carrier of a public time signal ([DCF77], [JJY40/60], [MSF], or
//! [WWVB]) with the Raspberry Pi's general purpose clock 0 on GPIO 4, and modulates it by switching
//! the pin between the clock output and an input. A short wire on GPIO 4 is enough to set
//! radio-controlled clocks placed next to it.
//!
//! [DCF77]: https://en.wikipedia.org/wiki/DCF77
//! [JJY40/60]: https://en.wikipedia.org/wiki/JJY
//! [MSF]: https://en.wikipedia.org/wiki/Time_from_NPL_(MSF)
//! [WWVB]: https://en.wikipedia.org/wiki/WWVB
//!
//! The program must run as root to map the peripheral registers and to lock its memory. The
//! modulation runs on a `SCHED_FIFO` thread at maximum priority, and all pulse edges are timed to
//! absolute deadlines of the system clock, so the system clock should be synchronized (e.g. with
//! NTP) for receivers to show the correct time.
//!
//! # Command Line Arguments
//!
//! General form: `timesignal-rpi [options...] service`
//!
//! The service may also be given with `-s`. Long options take their parameter either as the next
//! argument or after `=`.
//!
//! | Short form | Long form              | Argument                    | Default          | Description                          |
//! | ---------- | ---------------------- | --------------------------- | ---------------- | ------------------------------------ |
//! | `-s`       | `--time-service`       | Service name                | None             | The time service to transmit         |
//! | `-c`       | `--carrier-only`       |                             | Off              | Output the carrier without modulation |
//! | `-f`       | `--frequency-override` | Integer > 0                 | Service-specific | The carrier frequency in Hz          |
//! | `-o`       | `--time-offset`        | Number                      | 0                | Hours to add to the transmitted time |
//! | `-w`       | `--window`             | `start-hour:duration-mins`  | Always on        | A daily transmission window          |
//! | `-z`       | `--timezone`           | Filename or [TZ string]     | /etc/localtime   | The local [timezone]                 |
//! | `-d`       | `--disable-checks`     |                             | Off              | Skip the system clock sanity check   |
//! | `-v`       | `--verbose`            |                             | Off              | More output, repeat for even more    |
//!
//! Windows can be repeated, and the transmitter is idle outside of all of them. A window may run
//! past midnight. The local timezone decides when windows open, and is also the zone WWVB's DST
//! bits describe. The other services always transmit their own civil time.
//!
//! Supported services and their carriers:
//! - `dcf77`: 77.5 kHz
//! - `jjy` / `jjy40`: 40 kHz
//! - `jjy60`: 60 kHz
//! - `msf`: 60 kHz
//! - `wwvb`: 60 kHz
//!
//! [timezone]: time::tz
//! [TZ string]: https://www.gnu.org/software/libc/manual/html_node/TZ-Variable.html
//!
//! # Examples
//!
//! Transmit DCF77
//! ```sh
//! sudo timesignal-rpi dcf77
//! ```
//!
//! Transmit WWVB for US Eastern receivers from 1:00 to 3:00 each night
//! ```sh
//! sudo timesignal-rpi -z "EST5EDT,M3.2.0,M11.1.0" -w 1:120 wwvb
//! ```
//!
//! Transmit MSF with a carrier at 40 kHz, with per-minute logging
//! ```sh
//! sudo timesignal-rpi -v -f 40000 msf
//! ```

use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use thread_priority::{RealtimeThreadSchedulePolicy, ThreadBuilder, ThreadPriority, ThreadSchedulePolicy};
use tracing::{info, warn, Level};

use signals::Encoder;
use time::tz::{self, Timezone};

use args::{Arguments, ArgumentsError};
use error::TransmitterError;
use schedule::ScheduleMask;
use transmitter::{Config, SystemClock, Transmitter};

mod args;
mod error;
mod hardware;
mod schedule;
mod transmitter;

const CPUINFO: &str = "/proc/cpuinfo";
const LOCALTIME: &str = "/etc/localtime";

/// Cleared by SIGINT / SIGTERM to stop the transmitter.
static RUNNING: AtomicBool = AtomicBool::new(false);
/// The last signal received, or `0`.
static SIGNAL: AtomicI32 = AtomicI32::new(0);

extern "C" fn on_signal(signum: libc::c_int) {
	SIGNAL.store(signum, Ordering::Relaxed);
	RUNNING.store(false, Ordering::Relaxed);
}

fn install_signal_handlers() -> Result<(), TransmitterError> {
	for signum in [libc::SIGINT, libc::SIGTERM] {
		// Safety: sigaction is fully initialized before use, and on_signal only touches atomics
		let result = unsafe {
			let mut action: libc::sigaction = std::mem::zeroed();
			action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
			libc::sigemptyset(&mut action.sa_mask);
			libc::sigaction(signum, &action, std::ptr::null_mut())
		};
		if result != 0 {
			return Err(TransmitterError::Signal(io::Error::last_os_error()));
		}
	}
	Ok(())
}

/// Keep all current and future pages in memory, so page faults do not delay pulse edges.
fn lock_memory() -> Result<(), TransmitterError> {
	// Safety: mlockall has no memory safety requirements
	if unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) } != 0 {
		return Err(TransmitterError::MemoryLock(io::Error::last_os_error()));
	}
	Ok(())
}

fn unlock_memory() {
	// Safety: as for mlockall
	if unsafe { libc::munlockall() } != 0 {
		warn!("Failed to unlock memory: {}", io::Error::last_os_error());
	}
}

/// The timezone of this machine, or UTC if it cannot be determined.
fn local_timezone() -> Timezone {
	tz::parse_file(LOCALTIME).unwrap_or_else(|e| {
		warn!("Failed to read {}, using UTC: {}", LOCALTIME, e);
		Timezone::utc()
	})
}

/// Set up the process and run the transmitter on a real-time thread until cancelled.
///
/// # Errors
///
/// Returns any [`TransmitterError`] from process setup or from the transmitter thread.
fn transmit(args: Arguments) -> Result<(), TransmitterError> {
	let local = args.timezone.unwrap_or_else(local_timezone);
	let config = Config {
		service: args.service,
		carrier_hz: args.carrier_hz,
		hour_offset: args.hour_offset,
		schedule: ScheduleMask::from_windows(&args.windows),
		local,
		disable_checks: args.disable_checks
	};
	if !args.windows.is_empty() {
		info!("Transmitting {} minutes per day", config.schedule.active_minutes());
	}
	let carrier_only = args.carrier_only;

	RUNNING.store(true, Ordering::Relaxed);
	install_signal_handlers()?;
	lock_memory()?;

	let worker = ThreadBuilder::default()
		.name("transmitter")
		.priority(ThreadPriority::Max)
		.policy(ThreadSchedulePolicy::Realtime(RealtimeThreadSchedulePolicy::Fifo))
		.spawn(move |priority| {
			if let Err(e) = priority {
				warn!("Failed to set real-time priority, timing may suffer: {:?}", e);
			}

			let carrier = hardware::open(CPUINFO)?;
			let encoder = Encoder::new(config.service, config.local);
			let mut transmitter = Transmitter::new(carrier, SystemClock, encoder, config, &RUNNING);
			if carrier_only {
				transmitter.carrier_only()
			} else {
				transmitter.run()
			}
		});

	let result = match worker {
		Ok(handle) => handle.join()
			.unwrap_or_else(|_| Err(TransmitterError::Thread(String::from("transmitter thread panicked")))),
		Err(e) => Err(TransmitterError::Thread(e.to_string()))
	};

	unlock_memory();
	match SIGNAL.load(Ordering::Relaxed) {
		0 => (),
		libc::SIGINT => info!("Received SIGINT"),
		libc::SIGTERM => info!("Received SIGTERM"),
		s => info!("Received signal {}", s)
	}
	result
}

/// Main program entry point.
///
/// Parses input arguments and runs the transmitter. See [`crate`] documentation for details.
fn main() -> ExitCode {
	let args = match Arguments::parse(std::env::args_os().skip(1)) {
		Ok(a) => a,
		Err(e) => {
			return if let ArgumentsError::Help = e {
				println!("\
Transmit longwave time signals from a Raspberry Pi GPIO pin (GPIO 4).

Usage: timesignal-rpi [OPTIONS] <SERVICE>

Options:
  -s, --time-service <SERVICE>      the time service to transmit
  -c, --carrier-only                output the carrier without modulation
  -f, --frequency-override <HZ>     set the carrier frequency, default depends on service
  -o, --time-offset <HOURS>         offset the transmitted time, default 0
  -w, --window <HOUR:MINUTES>       transmit only during this daily window, repeatable
  -z, --timezone <TIMEZONE>         the local timezone, default /etc/localtime
  -d, --disable-checks              skip the system clock sanity check
  -v, --verbose                     more output, repeat for even more (e.g. -vv)
  -h, --help                        print this message and exit

Supported services:
  dcf77
  jjy (alias jjy40)
  jjy60
  msf
  wwvb

Examples:
  timesignal-rpi dcf77
  timesignal-rpi -z \"EST5EDT,M3.2.0,M11.1.0\" -w 1:120 wwvb
  timesignal-rpi -vv -o 1 msf\n");
				ExitCode::SUCCESS
			} else {
				eprintln!("{}", e);
				ExitCode::FAILURE
			}
		}
	};

	tracing_subscriber::fmt()
		.with_max_level(match args.verbosity {
			0 => Level::INFO,
			1 => Level::DEBUG,
			_ => Level::TRACE
		})
		.with_target(false)
		.init();

	match transmit(args) {
		Ok(()) => {
			info!("Program terminated");
			ExitCode::SUCCESS
		},
		Err(e) => {
			eprintln!("{}", e);
			ExitCode::FAILURE
		}
	}
}
