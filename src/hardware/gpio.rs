//! GPIO function selection for the carrier pin.

use super::Registers;

/// The pin GPCLK0 can be routed to.
pub const CARRIER_PIN: u32 = 4;

/// Pin function codes for the `GPFSEL` registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Function {
	Input = 0b000,
	Alt0 = 0b100
}

/// Switches the carrier pin between GPCLK0 (carrier on) and input (carrier off).
pub struct GpioOutputGate<R: Registers> {
	regs: R
}

impl<R: Registers> GpioOutputGate<R> {
	pub fn new(regs: R) -> GpioOutputGate<R> {
		GpioOutputGate { regs }
	}

	/// The underlying GPIO register block.
	pub fn registers(&self) -> &R {
		&self.regs
	}

	/// Set the function of `pin`, leaving the other pins sharing its register untouched.
	pub fn set_function(&mut self, pin: u32, function: Function) {
		let word = (pin / 10) as usize;
		let shift = (pin % 10) * 3;
		let value = self.regs.read(word) & !(0b111 << shift);
		self.regs.write(word, value | (function as u32) << shift);
	}

	/// Connect the carrier pin to the clock generator, or park it as an input.
	pub fn set_output(&mut self, on: bool) {
		let function = if on { Function::Alt0 } else { Function::Input };
		self.set_function(CARRIER_PIN, function);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn gate_test() {
		let mut g = GpioOutputGate::new(vec![0u32; 8]);
		g.set_output(true);
		assert_eq!(g.registers()[0], 0b100 << 12);
		g.set_output(true);
		assert_eq!(g.registers()[0], 0b100 << 12);
		g.set_output(false);
		assert_eq!(g.registers()[0], 0);
	}

	#[test]
	fn neighbours_untouched_test() {
		// Pins 3 and 5 are outputs, pin 4 starts as an output too
		let mut g = GpioOutputGate::new(vec![0b001_001_001 << 9, 0, 0]);
		g.set_output(true);
		assert_eq!(g.registers()[0], 0b001_100_001 << 9);
		g.set_output(false);
		assert_eq!(g.registers()[0], 0b001_000_001 << 9);
	}

	#[test]
	fn set_function_test() {
		let mut g = GpioOutputGate::new(vec![u32::MAX; 8]);
		g.set_function(17, Function::Input);
		assert_eq!(g.registers()[1], !(0b111 << 21));
		g.set_function(17, Function::Alt0);
		assert_eq!(g.registers()[1], !(0b011 << 21));
		g.set_function(9, Function::Alt0);
		assert_eq!(g.registers()[0], !(0b011 << 27));
	}
}
