//! Raspberry Pi peripheral access for generating a carrier on GPIO 4.
//!
//! The carrier is produced by general purpose clock 0 (GPCLK0), which the BCM283x family can route
//! to GPIO 4 as its alternate function 0. Modulation switches the pin between that alternate
//! function (carrier on) and a plain input (carrier off).
//!
//! Register blocks are accessed through the [`Registers`] trait, implemented by
//! [`MappedRegisters`] for the real peripherals and by `Vec<u32>` for tests.

pub mod clock;
pub mod gpio;
pub mod platform;
pub mod registers;

pub use clock::{ClockGenerator, ClockSource, Selection};
pub use gpio::GpioOutputGate;
pub use registers::MappedRegisters;

use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::TransmitterError;

/// Offset of the GPIO register block from the peripheral base.
pub const GPIO_OFFSET: u64 = 0x200000;

/// Offset of the clock manager register block from the peripheral base.
pub const CLOCK_OFFSET: u64 = 0x101000;

/// Length of each mapped register block, in 32-bit words.
pub const BLOCK_WORDS: usize = 1024;

/// A block of 32-bit hardware registers addressed by word index.
///
/// Accesses outside of the block are ignored: reads return `0` and writes are dropped.
pub trait Registers {
	/// Read the register at `word`.
	fn read(&self, word: usize) -> u32;
	/// Write `value` to the register at `word`.
	fn write(&mut self, word: usize, value: u32);
}

impl Registers for Vec<u32> {
	fn read(&self, word: usize) -> u32 {
		self.get(word).copied().unwrap_or(0)
	}

	fn write(&mut self, word: usize, value: u32) {
		if let Some(w) = self.get_mut(word) {
			*w = value;
		}
	}
}

impl<R: Registers + ?Sized> Registers for &mut R {
	fn read(&self, word: usize) -> u32 {
		(**self).read(word)
	}

	fn write(&mut self, word: usize, value: u32) {
		(**self).write(word, value)
	}
}

/// Control over the carrier output.
pub trait Carrier {
	/// Start generating a carrier as close as possible to `target_hz`, with the output gate off.
	///
	/// Returns the realized frequency in Hz.
	///
	/// # Errors
	///
	/// Returns [`TransmitterError::NoSuitableClockSource`] if the frequency cannot be generated.
	fn start(&mut self, target_hz: u32) -> Result<f64, TransmitterError>;

	/// Route the carrier to the output pin (`true`) or park the pin as an input (`false`).
	fn set_gate(&mut self, on: bool);

	/// Stop the clock generator and park the output pin.
	fn stop(&mut self);
}

/// The carrier hardware: the GPCLK0 generator and its output pin.
///
/// A started carrier is stopped when dropped, including while unwinding from a panic.
pub struct CarrierOutput<C: Registers, G: Registers> {
	clock: ClockGenerator<C>,
	gate: GpioOutputGate<G>,
	started: bool
}

impl<C: Registers, G: Registers> CarrierOutput<C, G> {
	/// Wrap a clock register block and a GPIO register block.
	pub fn new(clock: C, gpio: G) -> CarrierOutput<C, G> {
		CarrierOutput {
			clock: ClockGenerator::new(clock),
			gate: GpioOutputGate::new(gpio),
			started: false
		}
	}

	/// Select the best of `sources` for `target_hz` and start the generator with the pin parked.
	///
	/// Returns the selection, whose [`Selection::actual_hz`] is the realized carrier frequency.
	///
	/// # Errors
	///
	/// Returns [`TransmitterError::NoSuitableClockSource`] if no source can produce `target_hz`.
	pub fn start_with(&mut self, sources: &[ClockSource], target_hz: u32) -> Result<Selection, TransmitterError> {
		let selection = clock::select_source(sources, target_hz)?;
		info!(
			"Using clock source {} ({} Hz), divider {} + {}/1024, carrier {:.4} Hz (error {:.4} Hz)",
			selection.name,
			selection.source_hz,
			selection.div_i,
			selection.div_f,
			selection.actual_hz,
			selection.error_hz
		);
		self.stop();
		self.clock.program(&selection);
		self.started = true;
		self.gate.set_output(false);
		Ok(selection)
	}
}

impl<C: Registers, G: Registers> Carrier for CarrierOutput<C, G> {
	fn start(&mut self, target_hz: u32) -> Result<f64, TransmitterError> {
		let sources = clock::measure(clock::CLK_ROOT);
		self.start_with(&sources, target_hz).map(|s| s.actual_hz)
	}

	fn set_gate(&mut self, on: bool) {
		self.gate.set_output(on);
	}

	fn stop(&mut self) {
		self.gate.set_output(false);
		self.clock.stop();
		self.started = false;
	}
}

impl<C: Registers, G: Registers> Drop for CarrierOutput<C, G> {
	fn drop(&mut self) {
		if self.started {
			warn!("Carrier still running, stopping it");
			self.stop();
		}
	}
}

/// Probe the platform and map the clock and GPIO register blocks.
///
/// `cpuinfo` is normally `/proc/cpuinfo`.
///
/// # Errors
///
/// Returns [`TransmitterError::UnsupportedPlatform`] if the board is not a supported Raspberry Pi
/// and [`TransmitterError::HardwareUnavailable`] if `/dev/mem` cannot be mapped.
pub fn open(cpuinfo: impl AsRef<Path>) -> Result<CarrierOutput<MappedRegisters, MappedRegisters>, TransmitterError> {
	let model = platform::probe(cpuinfo)?;
	let base = model.peripheral_base()
		.ok_or_else(|| TransmitterError::UnsupportedPlatform(format!("{:?} is not supported", model)))?;
	debug!(?model, base = format_args!("{:#x}", base), "Detected platform");

	let clock = MappedRegisters::map(base + CLOCK_OFFSET, BLOCK_WORDS)
		.map_err(TransmitterError::HardwareUnavailable)?;
	let gpio = MappedRegisters::map(base + GPIO_OFFSET, BLOCK_WORDS)
		.map_err(TransmitterError::HardwareUnavailable)?;
	Ok(CarrierOutput::new(clock, gpio))
}
