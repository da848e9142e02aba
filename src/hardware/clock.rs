//! General purpose clock 0 (GPCLK0).
//!
//! The clock manager divides one of several on-chip clock sources by a fractional divider with
//! 12 integer bits and 10 fractional bits. With MASH filter level 1 the output alternates between
//! `source / DIVI` and `source / (DIVI + 1)` such that the average is `source / (DIVI + DIVF/1024)`.
//!
//! Only the average frequency matters to a longwave receiver, so the source that gets the average
//! closest to the target wins.

use std::{fs, path::Path, thread, time::Duration};
use tracing::{trace, warn};

use super::Registers;
use crate::error::{RejectReason, Rejection, Rejections, TransmitterError};

/// Word index of the GPCLK0 control register.
pub const GP0CTL: usize = 28;
/// Word index of the GPCLK0 divider register.
pub const GP0DIV: usize = 29;

/// Password that must accompany every write to a clock manager register.
pub const PASSWD: u32 = 0x5a << 24;
/// MASH filter level 1.
pub const CTL_MASH1: u32 = 1 << 9;
/// Set by hardware while the generator is running.
pub const CTL_BUSY: u32 = 1 << 7;
/// Stop the generator immediately, risking a glitch.
pub const CTL_KILL: u32 = 1 << 5;
/// Enable the generator.
pub const CTL_ENAB: u32 = 1 << 4;

/// Where the kernel exposes clock rates.
pub const CLK_ROOT: &str = "/sys/kernel/debug/clk";

const SETTLE: Duration = Duration::from_micros(10);
const BUSY_POLLS: u32 = 1000;

/// Smallest usable divider with MASH level 1.
pub const MIN_DIVIDER: f64 = 2.0;
/// Largest divider the 12 integer bits can hold.
pub const MAX_DIVIDER: f64 = 4095.0;

/// A clock source selectable by the generator's `SRC` field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockSource {
	/// Value of the `SRC` field.
	pub id: u32,
	/// Name of the source, which is also its directory under `/sys/kernel/debug/clk`.
	pub name: &'static str,
	/// Whether the source may be used. The core PLL follows CPU frequency scaling and is excluded.
	pub enabled: bool,
	/// Measured frequency in Hz, or `0.0` if unknown.
	pub freq_hz: f64
}

impl ClockSource {
	pub const fn new(id: u32, name: &'static str, enabled: bool, freq_hz: f64) -> ClockSource {
		ClockSource { id, name, enabled, freq_hz }
	}
}

/// All clock sources the generator may use, with unmeasured frequencies.
pub const SOURCES: [ClockSource; 5] = [
	ClockSource::new(1, "osc", true, 0.0),
	ClockSource::new(4, "plla_per", false, 0.0),
	ClockSource::new(5, "pllc_per", false, 0.0),
	ClockSource::new(6, "plld_per", true, 0.0),
	ClockSource::new(7, "pllh_aux", true, 0.0)
];

/// Fill in the frequency of each entry of [`SOURCES`] from `clk_rate` files under `root`.
///
/// `root` is normally `/sys/kernel/debug/clk`. A source whose rate cannot be read or parsed keeps
/// a frequency of `0.0` and will not be selected.
pub fn measure(root: impl AsRef<Path>) -> Vec<ClockSource> {
	let root = root.as_ref();
	SOURCES.iter()
		.map(|s| {
			let freq_hz = fs::read_to_string(root.join(s.name).join("clk_rate"))
				.ok()
				.and_then(|text| text.trim().parse::<f64>().ok())
				.filter(|f| f.is_finite() && *f > 0.0)
				.unwrap_or(0.0);
			ClockSource { freq_hz, ..*s }
		})
		.collect()
}

/// The divider settings chosen for a carrier frequency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
	/// `SRC` field value of the chosen source.
	pub source: u32,
	/// Name of the chosen source.
	pub name: &'static str,
	/// Frequency of the chosen source in Hz.
	pub source_hz: f64,
	/// Integer part of the divider.
	pub div_i: u32,
	/// Fractional part of the divider, in 1024ths.
	pub div_f: u32,
	/// Average output frequency in Hz.
	pub actual_hz: f64,
	/// Absolute difference between the target and [`actual_hz`](Self::actual_hz).
	pub error_hz: f64
}

fn divide(source: &ClockSource, target: f64) -> Result<Selection, RejectReason> {
	if !source.enabled {
		return Err(RejectReason::Disabled);
	}
	if source.freq_hz <= 0.0 {
		return Err(RejectReason::Unmeasured);
	}

	let division = source.freq_hz / target;
	if !(MIN_DIVIDER..=MAX_DIVIDER).contains(&division) {
		return Err(RejectReason::DividerOutOfRange(division));
	}

	let mut div_i = division.floor() as u32;
	let mut div_f = ((division - division.floor()) * 1024.0).round() as u32;
	if div_f >= 1024 {
		div_i += 1;
		div_f = 0;
	}
	if div_i as f64 > MAX_DIVIDER {
		return Err(RejectReason::DividerOutOfRange(division));
	}

	let actual_hz = source.freq_hz / (div_i as f64 + div_f as f64 / 1024.0);
	Ok(Selection {
		source: source.id,
		name: source.name,
		source_hz: source.freq_hz,
		div_i,
		div_f,
		actual_hz,
		error_hz: (target - actual_hz).abs()
	})
}

/// Choose the source and divider that get closest to `target_hz`.
///
/// Ties go to the source with the higher frequency.
///
/// # Errors
///
/// Returns [`TransmitterError::NoSuitableClockSource`] listing every source and why it was
/// rejected if none can be used.
pub fn select_source(sources: &[ClockSource], target_hz: u32) -> Result<Selection, TransmitterError> {
	let target = target_hz as f64;
	let mut best: Option<Selection> = None;
	let mut rejections = Vec::new();

	for source in sources {
		match divide(source, target) {
			Ok(s) => {
				trace!(
					source = s.name,
					freq = s.source_hz,
					div_i = s.div_i,
					div_f = s.div_f,
					actual = s.actual_hz,
					error = s.error_hz,
					"Candidate clock source"
				);
				let better = match &best {
					None => true,
					Some(b) => s.error_hz < b.error_hz || (s.error_hz == b.error_hz && s.source_hz > b.source_hz)
				};
				if better {
					best = Some(s);
				}
			},
			Err(reason) => {
				let rejection = Rejection { source: source.name, reason };
				trace!("Rejected clock source {}", rejection);
				rejections.push(rejection);
			}
		}
	}

	best.ok_or(TransmitterError::NoSuitableClockSource {
		target: target_hz,
		rejections: Rejections(rejections)
	})
}

/// The GPCLK0 generator registers.
pub struct ClockGenerator<R: Registers> {
	regs: R
}

impl<R: Registers> ClockGenerator<R> {
	pub fn new(regs: R) -> ClockGenerator<R> {
		ClockGenerator { regs }
	}

	/// The underlying clock manager register block.
	pub fn registers(&self) -> &R {
		&self.regs
	}

	/// Program the divider and source from `selection` and enable the generator.
	///
	/// The generator must be stopped first.
	pub fn program(&mut self, selection: &Selection) {
		self.regs.write(GP0DIV, PASSWD | (selection.div_i & 0xfff) << 12 | (selection.div_f & 0x3ff));
		thread::sleep(SETTLE);
		self.regs.write(GP0CTL, PASSWD | CTL_MASH1 | (selection.source & 0xf));
		thread::sleep(SETTLE);
		let ctl = self.regs.read(GP0CTL) & 0xff_ffff;
		self.regs.write(GP0CTL, PASSWD | ctl | CTL_ENAB);
	}

	/// Disable the generator and wait for it to stop.
	///
	/// If the generator is still busy after about 10 ms it is killed.
	pub fn stop(&mut self) {
		let ctl = self.regs.read(GP0CTL) & 0xff_ffff & !CTL_ENAB;
		self.regs.write(GP0CTL, PASSWD | ctl);

		for _ in 0..BUSY_POLLS {
			if self.regs.read(GP0CTL) & CTL_BUSY == 0 {
				return;
			}
			thread::sleep(SETTLE);
		}

		warn!("Clock generator did not stop, killing it");
		let ctl = self.regs.read(GP0CTL) & 0xff_ffff;
		self.regs.write(GP0CTL, PASSWD | ctl | CTL_KILL);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;

	#[test]
	fn divide_test() {
		let osc = ClockSource::new(1, "osc", true, 19.2e6);
		let s = divide(&osc, 77500.0).unwrap();
		assert_eq!((s.div_i, s.div_f), (247, 760));
		assert!((s.actual_hz - 77499.92).abs() < 0.01);
		assert!(s.error_hz < 0.1);

		let s = divide(&osc, 60000.0).unwrap();
		assert_eq!((s.div_i, s.div_f), (320, 0));
		assert_eq!(s.actual_hz, 60000.0);
		assert_eq!(s.error_hz, 0.0);
	}

	#[test]
	fn divide_carry_test() {
		// The fraction of 2.9999 rounds up to 1024/1024 and must carry
		let src = ClockSource::new(1, "osc", true, 2.9999);
		let s = divide(&src, 1.0).unwrap();
		assert_eq!((s.div_i, s.div_f), (3, 0));
	}

	#[test]
	fn divide_reject_test() {
		let off = ClockSource::new(4, "plla_per", false, 19.2e6);
		assert_eq!(divide(&off, 77500.0).unwrap_err(), RejectReason::Disabled);

		let unknown = ClockSource::new(1, "osc", true, 0.0);
		assert_eq!(divide(&unknown, 77500.0).unwrap_err(), RejectReason::Unmeasured);

		let osc = ClockSource::new(1, "osc", true, 19.2e6);
		assert_eq!(divide(&osc, 19.2e6).unwrap_err(), RejectReason::DividerOutOfRange(1.0));
		assert!(matches!(divide(&osc, 4000.0), Err(RejectReason::DividerOutOfRange(_))));
		assert!(divide(&osc, 9.6e6).is_ok());
	}

	#[test]
	fn select_test() {
		// plld at 500 MHz needs a divider of 6451 for DCF77 and is rejected
		let sources = [
			ClockSource::new(1, "osc", true, 19.2e6),
			ClockSource::new(4, "plla_per", false, 0.0),
			ClockSource::new(5, "pllc_per", false, 1e9),
			ClockSource::new(6, "plld_per", true, 500e6),
			ClockSource::new(7, "pllh_aux", true, 0.0)
		];
		let s = select_source(&sources, 77500).unwrap();
		assert_eq!(s.source, 1);
		assert_eq!(s.name, "osc");

		// Both osc and plld divide to 200 kHz exactly
		let s = select_source(&sources[..4], 200_000).unwrap();
		assert_eq!(s.source, 6);
		assert_eq!(s.div_i, 2500);
	}

	#[test]
	fn select_minimum_error_test() {
		// 77500 * 4 = 310000 divides exactly, 19.2 MHz does not
		let sources = [
			ClockSource::new(1, "osc", true, 19.2e6),
			ClockSource::new(6, "plld_per", true, 310000.0 * 100.0)
		];
		let s = select_source(&sources, 77500).unwrap();
		assert_eq!(s.source, 6);
		assert_eq!((s.div_i, s.div_f), (400, 0));
		assert_eq!(s.error_hz, 0.0);
	}

	#[test]
	fn select_tie_test() {
		let sources = [
			ClockSource::new(1, "osc", true, 1.2e6),
			ClockSource::new(6, "plld_per", true, 2.4e6),
			ClockSource::new(7, "pllh_aux", true, 1.8e6)
		];
		let s = select_source(&sources, 60000).unwrap();
		assert_eq!(s.source, 6);
		assert_eq!(s.error_hz, 0.0);
	}

	#[test]
	fn select_none_test() {
		let sources = [
			ClockSource::new(1, "osc", true, 19.2e6),
			ClockSource::new(4, "plla_per", false, 0.0),
			ClockSource::new(7, "pllh_aux", true, 0.0)
		];
		match select_source(&sources, 1000) {
			Err(TransmitterError::NoSuitableClockSource { target, rejections }) => {
				assert_eq!(target, 1000);
				assert_eq!(rejections.0.len(), 3);
				assert_eq!(rejections.0[0].source, "osc");
				assert_eq!(rejections.0[0].reason, RejectReason::DividerOutOfRange(19200.0));
				assert_eq!(rejections.0[1].reason, RejectReason::Disabled);
				assert_eq!(rejections.0[2].reason, RejectReason::Unmeasured);
				assert_eq!(
					rejections.to_string(),
					"osc: divider 19200.0000 out of range, plla_per: disabled, pllh_aux: frequency unknown"
				);
			},
			r => panic!("unexpected {:?}", r)
		}

		assert!(matches!(
			select_source(&[], 77500),
			Err(TransmitterError::NoSuitableClockSource { target: 77500, .. })
		));
	}

	#[test]
	fn measure_test() {
		let dir = tempfile::tempdir().unwrap();
		for (name, rate) in [("osc", "19200000\n"), ("plld_per", "750000000"), ("pllh_aux", "garbage")] {
			fs::create_dir(dir.path().join(name)).unwrap();
			fs::write(dir.path().join(name).join("clk_rate"), rate).unwrap();
		}

		let sources = measure(dir.path());
		assert_eq!(sources.len(), SOURCES.len());
		let freq = |name: &str| sources.iter().find(|s| s.name == name).unwrap().freq_hz;
		assert_eq!(freq("osc"), 19.2e6);
		assert_eq!(freq("plld_per"), 750e6);
		assert_eq!(freq("pllh_aux"), 0.0);
		assert_eq!(freq("plla_per"), 0.0);
		assert!(!sources.iter().find(|s| s.name == "pllc_per").unwrap().enabled);
	}

	#[test]
	fn program_test() {
		let mut generator = ClockGenerator::new(vec![0u32; 32]);
		let s = Selection {
			source: 6,
			name: "plld_per",
			source_hz: 500e6,
			div_i: 2500,
			div_f: 3,
			actual_hz: 200_000.0,
			error_hz: 0.0
		};
		generator.program(&s);
		assert_eq!(generator.registers().read(GP0DIV), PASSWD | 2500 << 12 | 3);
		assert_eq!(generator.registers().read(GP0CTL), PASSWD | CTL_MASH1 | CTL_ENAB | 6);

		generator.stop();
		assert_eq!(generator.registers().read(GP0CTL), PASSWD | CTL_MASH1 | 6);
	}

	/// Registers whose control word reports busy for a fixed number of reads.
	struct StuckBusy {
		regs: Vec<u32>,
		busy_reads: Cell<u32>
	}

	impl Registers for StuckBusy {
		fn read(&self, word: usize) -> u32 {
			let v = self.regs.read(word);
			if word == GP0CTL && self.busy_reads.get() > 0 {
				self.busy_reads.set(self.busy_reads.get() - 1);
				return v | CTL_BUSY;
			}
			v
		}

		fn write(&mut self, word: usize, value: u32) {
			// BUSY is read only
			self.regs.write(word, if word == GP0CTL { value & !CTL_BUSY } else { value });
		}
	}

	#[test]
	fn stop_waits_for_busy_test() {
		let mut regs = vec![0u32; 32];
		regs[GP0CTL] = PASSWD | CTL_MASH1 | CTL_ENAB | 1;
		let mut generator = ClockGenerator::new(StuckBusy { regs, busy_reads: Cell::new(4) });
		generator.stop();
		assert_eq!(generator.registers().regs[GP0CTL], PASSWD | CTL_MASH1 | 1);
	}

	#[test]
	fn stop_kills_stuck_generator_test() {
		let mut regs = vec![0u32; 32];
		regs[GP0CTL] = PASSWD | CTL_MASH1 | CTL_ENAB | 1;
		let mut generator = ClockGenerator::new(StuckBusy { regs, busy_reads: Cell::new(u32::MAX) });
		generator.stop();
		assert_eq!(generator.registers().regs[GP0CTL], PASSWD | CTL_MASH1 | CTL_KILL | 1);
	}
}
