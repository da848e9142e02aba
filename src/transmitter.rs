//! The real-time transmission loop.
//!
//! Once started, the [`Transmitter`] walks wall-clock time minute by minute. Each active minute is
//! encoded once, then each second sleeps to its absolute start, switches the carrier gate for the
//! length of that second's pulse, and switches it back. All sleeps target absolute deadlines
//! derived from the start of the minute, so scheduling latency in one second does not carry over
//! into the next.
//!
//! Most services signal by reducing the carrier during a pulse, so the gate is off for the pulse and
//! on for the remainder of the second. JJY is the opposite: the carrier is on during the pulse.
//!
//! Whatever happens, the carrier is left with its gate off and its clock stopped when [`run`]
//! or [`carrier_only`] returns.
//!
//! [`run`]: Transmitter::run
//! [`carrier_only`]: Transmitter::carrier_only

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace};

use signals::{MessageError, MessageGenerator, TimeService};
use time::tz::Timezone;
use time::{ClockError, Milliseconds, Seconds, TimeSpec, Tm, SECONDS_PER_MINUTE};

use crate::error::TransmitterError;
use crate::hardware::Carrier;
use crate::schedule::ScheduleMask;

/// Years before this are assumed to be an unset system clock.
pub const MIN_PLAUSIBLE_YEAR: u16 = 2020;

const CARRIER_ONLY_POLL: Milliseconds = Milliseconds(100);

/// A source of wall-clock time that can block until a deadline.
pub trait WallClock {
	/// The current time.
	fn now(&self) -> Result<TimeSpec, TransmitterError>;

	/// Block until `deadline`. Deadlines in the past return immediately.
	fn sleep_until(&mut self, deadline: TimeSpec) -> Result<(), TransmitterError>;
}

/// The system real-time clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
	fn now(&self) -> Result<TimeSpec, TransmitterError> {
		time::now().ok_or_else(|| ClockError(io::Error::last_os_error().raw_os_error().unwrap_or(0)).into())
	}

	fn sleep_until(&mut self, deadline: TimeSpec) -> Result<(), TransmitterError> {
		Ok(time::sleep_until(deadline)?)
	}
}

/// Transmitter configuration, validated by the command line layer.
#[derive(Clone, Debug)]
pub struct Config {
	/// Service to transmit.
	pub service: TimeService,
	/// Carrier frequency in Hz.
	pub carrier_hz: u32,
	/// Hours added to the transmitted time. Rounded to whole minutes.
	pub hour_offset: f64,
	/// Minutes of the local day during which to transmit.
	pub schedule: ScheduleMask,
	/// The local timezone, used for the schedule and log output.
	pub local: Timezone,
	/// Skip the system clock sanity check.
	pub disable_checks: bool
}

/// Runtime state of a transmission.
#[derive(Debug)]
pub struct TransmissionState<'a> {
	/// Service being transmitted.
	pub service: TimeService,
	/// Requested carrier frequency in Hz.
	pub carrier_hz: u32,
	/// Start of the minute being transmitted, as a Unix timestamp.
	pub minute_start: i64,
	/// Minutes added to the transmitted time.
	pub offset_minutes: i64,
	running: &'a AtomicBool
}

impl TransmissionState<'_> {
	/// Whether transmission should continue.
	pub fn is_running(&self) -> bool {
		self.running.load(Ordering::Relaxed)
	}

	/// Ask the transmission to stop.
	pub fn cancel(&self) {
		self.running.store(false, Ordering::Relaxed);
	}
}

/// Formats a timestamp as civil time in a timezone.
struct LocalTime<'a>(&'a Timezone, i64);

impl fmt::Display for LocalTime<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0.date(self.1) {
			Some(d) => write!(
				f,
				"{:04}-{:02}-{:02} {:02}:{:02}:{:02}{}",
				d.tm.year(),
				d.tm.mon,
				d.tm.day,
				d.tm.hour,
				d.tm.min,
				d.tm.sec,
				if d.info.isdst { " (DST)" } else { "" }
			),
			None => write!(f, "@{}", self.1)
		}
	}
}

/// Drives a [`Carrier`] according to the frames of a [`MessageGenerator`].
pub struct Transmitter<'a, C: Carrier, W: WallClock, M: MessageGenerator> {
	carrier: C,
	clock: W,
	generator: M,
	state: TransmissionState<'a>,
	schedule: ScheduleMask,
	local: Timezone,
	disable_checks: bool
}

impl<'a, C: Carrier, W: WallClock, M: MessageGenerator> Transmitter<'a, C, W, M> {
	/// Create a transmitter. Clearing `running` from any thread or signal handler stops it.
	pub fn new(carrier: C, clock: W, generator: M, config: Config, running: &'a AtomicBool) -> Self {
		Transmitter {
			carrier,
			clock,
			generator,
			state: TransmissionState {
				service: config.service,
				carrier_hz: config.carrier_hz,
				minute_start: 0,
				offset_minutes: (config.hour_offset * 60.0).round() as i64,
				running
			},
			schedule: config.schedule,
			local: config.local,
			disable_checks: config.disable_checks
		}
	}

	/// Transmit until cancelled.
	///
	/// # Errors
	///
	/// Returns the first error from the sanity check, the carrier, the clock, or the encoder. The
	/// running flag is cleared on error and the carrier is shut down either way.
	pub fn run(&mut self) -> Result<(), TransmitterError> {
		let result = self.start().and_then(|_| self.transmit());
		self.finish(result)
	}

	/// Output an unmodulated carrier until cancelled.
	///
	/// # Errors
	///
	/// As for [`run`](Self::run).
	pub fn carrier_only(&mut self) -> Result<(), TransmitterError> {
		let result = self.start().and_then(|_| {
			info!("Transmitting carrier only");
			self.carrier.set_gate(true);
			while self.state.is_running() {
				let now = self.clock.now()?;
				self.clock.sleep_until(now + CARRIER_ONLY_POLL)?;
			}
			Ok(())
		});
		self.finish(result)
	}

	fn start(&mut self) -> Result<(), TransmitterError> {
		info!(
			"Time service {}, carrier {:.4} kHz, offset {} min",
			self.state.service,
			self.state.carrier_hz as f64 / 1000.0,
			self.state.offset_minutes
		);

		let now = self.clock.now()?;
		if !self.disable_checks {
			let year = Tm::new(now.sec).map(|tm| tm.year()).unwrap_or(1970);
			if year < MIN_PLAUSIBLE_YEAR {
				return Err(TransmitterError::SanityCheck(year));
			}
		}

		let actual = self.carrier.start(self.state.carrier_hz)?;
		debug!(actual_hz = actual, "Carrier started");
		self.carrier.set_gate(false);
		Ok(())
	}

	fn finish(&mut self, result: Result<(), TransmitterError>) -> Result<(), TransmitterError> {
		if result.is_err() {
			self.state.cancel();
		}
		info!("Stopping transmitter");
		self.carrier.set_gate(false);
		self.carrier.stop();
		result
	}

	fn transmit(&mut self) -> Result<(), TransmitterError> {
		self.state.minute_start = self.clock.now()?.minute_start();
		while self.state.is_running() {
			let minute_start = self.state.minute_start;
			let active = self.local.date(minute_start)
				.is_none_or(|d| self.schedule.is_active(d.tm.minute_of_day()));

			if active {
				self.transmit_minute(minute_start)?;
			} else {
				self.idle_minute(minute_start)?;
			}
			self.state.minute_start += SECONDS_PER_MINUTE;
		}
		Ok(())
	}

	fn idle_minute(&mut self, minute_start: i64) -> Result<(), TransmitterError> {
		debug!("{} outside of schedule", LocalTime(&self.local, minute_start));
		self.carrier.set_gate(false);
		for second in 1..=SECONDS_PER_MINUTE {
			if !self.state.is_running() {
				break;
			}
			self.clock.sleep_until(TimeSpec::from_secs(minute_start) + Seconds(second))?;
		}
		Ok(())
	}

	fn transmit_minute(&mut self, minute_start: i64) -> Result<(), TransmitterError> {
		let encoded = self.state.offset_minutes.checked_mul(SECONDS_PER_MINUTE)
			.and_then(|offset| minute_start.checked_add(offset))
			.ok_or(MessageError::UnsupportedTime(minute_start))?;
		if encoded == minute_start {
			debug!("{}", LocalTime(&self.local, minute_start));
		} else {
			debug!("{} -> {}", LocalTime(&self.local, minute_start), LocalTime(&self.local, encoded));
		}

		let frame = self.generator.encode(encoded)?;
		trace!(bits = format_args!("{:#017x}", frame.bits()), order = ?self.state.service.order(), "Encoded frame");
		let pulse = self.state.service.pulse_is_carrier();
		let mut widths = String::with_capacity(80);

		for second in 0..60u8 {
			if !self.state.is_running() {
				break;
			}

			let width = self.generator.pulse_width_millis(frame, second)?;
			let start = TimeSpec::from_secs(minute_start) + Seconds(second as i64);
			let end = start + Milliseconds(width as i64);

			// A zero width pulse leaves the gate as it was, and a pulse that has already ended when
			// starting mid-minute is not sent at all
			let pending = width > 0 && end > self.clock.now()?;
			self.clock.sleep_until(start)?;
			if pending {
				self.carrier.set_gate(pulse);
				self.clock.sleep_until(end)?;
				self.carrier.set_gate(!pulse);
			}

			widths.push_str(&format!(" {:3}", width));
			if second % 15 == 14 {
				trace!("Pulses:{}", widths);
				widths.clear();
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::RefCell;
	use std::rc::Rc;
	use signals::{Encoder, MessageError, MinuteFrame};
	use crate::schedule::Window;

	/// 2024-01-01 00:00:00 UTC
	const T0: i64 = 1704067200;

	#[derive(Clone, Debug, PartialEq)]
	enum Event {
		Start(u32),
		Gate(bool),
		Stop,
		Sleep(TimeSpec),
		Encode(i64)
	}

	type Log = Rc<RefCell<Vec<Event>>>;

	struct FakeCarrier {
		log: Log
	}

	impl Carrier for FakeCarrier {
		fn start(&mut self, target_hz: u32) -> Result<f64, TransmitterError> {
			self.log.borrow_mut().push(Event::Start(target_hz));
			Ok(target_hz as f64)
		}

		fn set_gate(&mut self, on: bool) {
			self.log.borrow_mut().push(Event::Gate(on));
		}

		fn stop(&mut self) {
			self.log.borrow_mut().push(Event::Stop);
		}
	}

	/// Jumps to each deadline and clears `running` once `stop_at` is reached.
	struct FakeClock<'a> {
		now: TimeSpec,
		stop_at: TimeSpec,
		running: &'a AtomicBool,
		log: Log
	}

	impl WallClock for FakeClock<'_> {
		fn now(&self) -> Result<TimeSpec, TransmitterError> {
			Ok(self.now)
		}

		fn sleep_until(&mut self, deadline: TimeSpec) -> Result<(), TransmitterError> {
			self.log.borrow_mut().push(Event::Sleep(deadline));
			self.now = self.now.max(deadline);
			if self.now >= self.stop_at {
				self.running.store(false, Ordering::Relaxed);
			}
			Ok(())
		}
	}

	struct FakeGenerator {
		inner: Encoder,
		fail: bool,
		log: Log
	}

	impl MessageGenerator for FakeGenerator {
		fn encode(&self, time: i64) -> Result<MinuteFrame, MessageError> {
			self.log.borrow_mut().push(Event::Encode(time));
			if self.fail {
				return Err(MessageError::UnsupportedTime(time));
			}
			self.inner.encode(time)
		}

		fn pulse_width_millis(&self, frame: MinuteFrame, second: u8) -> Result<u32, MessageError> {
			self.inner.pulse_width_millis(frame, second)
		}
	}

	fn config(service: TimeService) -> Config {
		Config {
			service,
			carrier_hz: 77500,
			hour_offset: 0.0,
			schedule: ScheduleMask::default(),
			local: Timezone::utc(),
			disable_checks: false
		}
	}

	fn transmitter<'a>(
		config: Config,
		now: TimeSpec,
		stop_at: TimeSpec,
		fail: bool,
		running: &'a AtomicBool,
		log: &Log
	) -> Transmitter<'a, FakeCarrier, FakeClock<'a>, FakeGenerator> {
		let generator = FakeGenerator {
			inner: Encoder::new(config.service, config.local),
			fail,
			log: log.clone()
		};
		Transmitter::new(
			FakeCarrier { log: log.clone() },
			FakeClock { now, stop_at, running, log: log.clone() },
			generator,
			config,
			running
		)
	}

	fn at(sec: i64, millis: i64) -> TimeSpec {
		TimeSpec::from_secs(sec) + Milliseconds(millis)
	}

	fn position(log: &[Event], event: &Event) -> usize {
		log.iter().position(|e| e == event).unwrap()
	}

	#[test]
	fn inactive_minute_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut c = config(TimeService::DCF77);
		c.schedule = ScheduleMask::from_windows(&[Window { start_hour: 1, duration: 60 }]);
		let mut t = transmitter(c, at(T0, 5000), at(T0 + 120, 0), false, &running, &log);

		t.run().unwrap();
		let log = log.borrow();
		assert_eq!(log[0], Event::Start(77500));
		assert!(!log.iter().any(|e| matches!(e, Event::Encode(_))));
		assert!(!log.contains(&Event::Gate(true)));
		assert_eq!(log.iter().filter(|e| matches!(e, Event::Sleep(_))).count(), 120);
		assert_eq!(log[log.len() - 2..], [Event::Gate(false), Event::Stop]);
	}

	#[test]
	fn cancel_mid_second_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut t = transmitter(config(TimeService::DCF77), at(T0, 0), at(T0 + 30, 50), false, &running, &log);

		t.run().unwrap();
		assert!(!running.load(Ordering::Relaxed));
		let log = log.borrow();
		let last_sleep = log.iter().rev().find_map(|e| match e {
			Event::Sleep(t) => Some(*t),
			_ => None
		});
		assert!(last_sleep.unwrap() < at(T0 + 31, 0));
		assert_eq!(log[log.len() - 2..], [Event::Gate(false), Event::Stop]);
		assert_eq!(log.iter().filter(|e| matches!(e, Event::Encode(_))).count(), 1);
	}

	#[test]
	fn dcf77_second_59_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut t = transmitter(config(TimeService::DCF77), at(T0, 0), at(T0 + 60, 0), false, &running, &log);

		t.run().unwrap();
		let log = log.borrow();
		assert_eq!(log[..3], [Event::Start(77500), Event::Gate(false), Event::Encode(T0)]);

		// DCF77 transmits a reduced carrier during the pulse
		let i = position(&log, &Event::Sleep(at(T0, 0)));
		assert_eq!(log[i + 1..i + 4], [Event::Gate(false), Event::Sleep(at(T0, 100)), Event::Gate(true)]);

		// No pulse, and the gate stays on into the next minute
		let i = position(&log, &Event::Sleep(at(T0 + 59, 0)));
		assert_eq!(log[i + 1], Event::Encode(T0 + 60));
		let first_minute = &log[..i];
		assert_eq!(first_minute.iter().filter(|e| **e == Event::Gate(true)).count(), 59);
	}

	#[test]
	fn jjy_polarity_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut c = config(TimeService::JJY);
		c.carrier_hz = 40000;
		let mut t = transmitter(c, at(T0, 0), at(T0 + 2, 0), false, &running, &log);

		t.run().unwrap();
		let log = log.borrow();
		assert_eq!(log[0], Event::Start(40000));
		let i = position(&log, &Event::Sleep(at(T0, 0)));
		assert_eq!(log[i + 1..i + 4], [Event::Gate(true), Event::Sleep(at(T0, 200)), Event::Gate(false)]);
	}

	#[test]
	fn hour_offset_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut c = config(TimeService::WWVB);
		c.hour_offset = -1.5;
		// Active only in the first minute of the day, which the offset moves out of
		c.schedule = ScheduleMask::from_windows(&[Window { start_hour: 0, duration: 1 }]);
		let mut t = transmitter(c, at(T0, 0), at(T0 + 1, 0), false, &running, &log);
		assert_eq!(t.state.offset_minutes, -90);

		t.run().unwrap();
		let log = log.borrow();
		assert!(log.contains(&Event::Encode(T0 - 5400)));
		assert!(log.contains(&Event::Sleep(at(T0, 0))));
		assert!(log.contains(&Event::Sleep(at(T0 + 1, 0))));
	}

	#[test]
	fn huge_offset_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut c = config(TimeService::DCF77);
		c.hour_offset = 1e17;
		let mut t = transmitter(c, at(T0, 0), at(T0 + 60, 0), false, &running, &log);

		assert!(matches!(t.run(), Err(TransmitterError::Encoding(MessageError::UnsupportedTime(T0)))));
		assert!(!running.load(Ordering::Relaxed));
		assert_eq!(*log.borrow(), [Event::Start(77500), Event::Gate(false), Event::Gate(false), Event::Stop]);

		// Representable, but past the last year a calendar date can hold
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut c = config(TimeService::DCF77);
		c.hour_offset = 2e6;
		let mut t = transmitter(c, at(T0, 0), at(T0 + 60, 0), false, &running, &log);

		// DCF77 dates the following minute
		let dated = T0 + 2_000_000 * 3600 + 60;
		assert!(matches!(t.run(), Err(TransmitterError::Encoding(MessageError::UnsupportedTime(e))) if e == dated));
		assert_eq!(log.borrow()[log.borrow().len() - 2..], [Event::Gate(false), Event::Stop]);
	}

	#[test]
	fn mid_minute_start_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut t = transmitter(config(TimeService::DCF77), at(T0 + 20, 150), at(T0 + 23, 0), false, &running, &log);

		t.run().unwrap();
		let log = log.borrow();
		let first_gate = log.iter().skip(2).position(|e| matches!(e, Event::Gate(_))).unwrap() + 2;
		// Pulses that ended before the start are skipped, the one in progress is cut short
		assert_eq!(log[first_gate - 1..first_gate + 3], [
			Event::Sleep(at(T0 + 20, 0)),
			Event::Gate(false),
			Event::Sleep(at(T0 + 20, 200)),
			Event::Gate(true)
		]);
		assert!(log[..first_gate].iter().all(|e| !matches!(e, Event::Sleep(s) if *s > at(T0 + 20, 0))));
		assert_eq!(log[log.len() - 2..], [Event::Gate(false), Event::Stop]);
	}

	#[test]
	fn encode_error_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut t = transmitter(config(TimeService::MSF), at(T0, 0), at(T0 + 600, 0), true, &running, &log);

		assert!(matches!(t.run(), Err(TransmitterError::Encoding(MessageError::UnsupportedTime(T0)))));
		assert!(!running.load(Ordering::Relaxed));
		assert_eq!(*log.borrow(), [
			Event::Start(77500),
			Event::Gate(false),
			Event::Encode(T0),
			Event::Gate(false),
			Event::Stop
		]);
	}

	#[test]
	fn sanity_check_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		// 2010-01-01
		let mut t = transmitter(config(TimeService::DCF77), at(1262304000, 0), at(1262304001, 0), false, &running, &log);

		assert!(matches!(t.run(), Err(TransmitterError::SanityCheck(2010))));
		assert!(!running.load(Ordering::Relaxed));
		assert_eq!(*log.borrow(), [Event::Gate(false), Event::Stop]);

		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut c = config(TimeService::DCF77);
		c.disable_checks = true;
		let mut t = transmitter(c, at(1262304000, 0), at(1262304001, 0), false, &running, &log);
		t.run().unwrap();
		assert!(log.borrow().contains(&Event::Encode(1262304000)));
	}

	#[test]
	fn carrier_only_test() {
		let running = AtomicBool::new(true);
		let log = Log::default();
		let mut t = transmitter(config(TimeService::DCF77), at(T0, 500), at(T0 + 1, 500), false, &running, &log);

		t.carrier_only().unwrap();
		let log = log.borrow();
		assert_eq!(log[..3], [Event::Start(77500), Event::Gate(false), Event::Gate(true)]);
		assert_eq!(log.iter().filter(|e| matches!(e, Event::Sleep(_))).count(), 10);
		assert!(!log.iter().any(|e| matches!(e, Event::Encode(_))));
		assert_eq!(log[log.len() - 2..], [Event::Gate(false), Event::Stop]);
	}

	#[test]
	fn cancelled_before_start_test() {
		let running = AtomicBool::new(false);
		let log = Log::default();
		let mut t = transmitter(config(TimeService::DCF77), at(T0, 0), at(T0, 0), false, &running, &log);

		t.run().unwrap();
		assert_eq!(*log.borrow(), [Event::Start(77500), Event::Gate(false), Event::Gate(false), Event::Stop]);
	}

	#[test]
	fn local_time_test() {
		let tz = time::tz::parse_tzstring(b"CET-1CEST,M3.5.0,M10.5.0/3").unwrap();
		assert_eq!(LocalTime(&tz, T0).to_string(), "2024-01-01 01:00:00");
		assert_eq!(LocalTime(&tz, 1716742680).to_string(), "2024-05-26 18:58:00 (DST)");
		assert_eq!(LocalTime(&Timezone::utc(), -5).to_string(), "@-5");
	}
}
