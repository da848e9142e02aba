//! Memory mapped peripheral registers.

use std::fs::OpenOptions;
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::ptr::NonNull;

use super::Registers;

#[cfg(all(target_os = "linux", target_env = "gnu"))]
use libc::mmap64 as mmap;
#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
use libc::mmap;

/// A block of peripheral registers mapped from `/dev/mem`.
///
/// All accesses are volatile and bounds checked. The mapping is released when the value is
/// dropped.
pub struct MappedRegisters {
	base: NonNull<u32>,
	words: usize
}

impl MappedRegisters {
	/// Map `words` 32-bit registers starting at physical address `address`.
	///
	/// # Errors
	///
	/// Returns the OS error if `/dev/mem` cannot be opened or mapped. Both require root.
	pub fn map(address: u64, words: usize) -> io::Result<MappedRegisters> {
		let file = OpenOptions::new()
			.read(true)
			.write(true)
			.custom_flags(libc::O_SYNC)
			.open("/dev/mem")?;
		let offset = address.try_into()
			.map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "address out of range"))?;
		let len = words * size_of::<u32>();

		// Safety: mapping a fresh region chosen by the kernel does not alias any Rust memory. The
		// file descriptor may be closed once the mapping exists.
		let ptr = unsafe {
			mmap(
				std::ptr::null_mut(),
				len,
				libc::PROT_READ | libc::PROT_WRITE,
				libc::MAP_SHARED,
				file.as_raw_fd(),
				offset
			)
		};
		if ptr == libc::MAP_FAILED {
			return Err(io::Error::last_os_error());
		}
		NonNull::new(ptr.cast::<u32>())
			.map(|base| MappedRegisters { base, words })
			.ok_or_else(|| io::Error::other("mmap returned null"))
	}
}

impl Registers for MappedRegisters {
	fn read(&self, word: usize) -> u32 {
		if word >= self.words {
			return 0;
		}
		// Safety: word is within the mapping, which is aligned and lives as long as self
		unsafe { self.base.as_ptr().add(word).read_volatile() }
	}

	fn write(&mut self, word: usize, value: u32) {
		if word >= self.words {
			return;
		}
		// Safety: as for read
		unsafe { self.base.as_ptr().add(word).write_volatile(value) }
	}
}

impl Drop for MappedRegisters {
	fn drop(&mut self) {
		// Safety: base and words describe exactly the region returned by mmap
		unsafe {
			libc::munmap(self.base.as_ptr().cast(), self.words * size_of::<u32>());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn map_without_privilege_test() {
		// Only root may map /dev/mem, and test runners normally are not root
		if unsafe { libc::geteuid() } != 0 {
			assert!(MappedRegisters::map(0x3f200000, 16).is_err());
		}
	}
}
