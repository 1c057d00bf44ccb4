//! Access to physical memory from the kernel's address space.
//!
//! The frame pool keeps its state map inside a physical frame, so it needs a
//! way to turn `frame × FRAME_SIZE` into a pointer it can dereference. An
//! [`IPhysicalMemory`] window provides that translation.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

use core::ptr::NonNull;

use abstractions::IUsizeAlias;
use address::PhysicalAddress;

/// # Safety
///
/// A pointer returned by [`IPhysicalMemory::linear_map`] must be valid for reads and writes of
/// `len` bytes for as long as the physical range stays in use, since frame pools keep `'static`
/// views into the frames they are given.
pub unsafe trait IPhysicalMemory {
    /// Returns a pointer through which `len` bytes starting at `paddr` can be accessed,
    /// or `None` if the range is not covered by this window.
    fn linear_map(&self, paddr: PhysicalAddress, len: usize) -> Option<NonNull<u8>>;
}

/// Physical memory is accessible at the same numeric address, as in early boot
/// before paging is enabled.
#[derive(Debug, Clone, Copy)]
pub struct IdentityMemory {
    _private: (),
}

impl IdentityMemory {
    /// # Safety
    ///
    /// Every physical address handed to the window must be directly addressable.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

// SAFETY: `IdentityMemory::new` requires physical memory to be addressable as is.
unsafe impl IPhysicalMemory for IdentityMemory {
    fn linear_map(&self, paddr: PhysicalAddress, len: usize) -> Option<NonNull<u8>> {
        paddr.as_usize().checked_add(len)?;

        NonNull::new(paddr.as_usize() as *mut u8)
    }
}

/// Physical memory is mapped linearly at a fixed virtual offset (a higher-half direct map).
#[derive(Debug, Clone, Copy)]
pub struct OffsetMemory {
    offset: usize,
}

impl OffsetMemory {
    /// # Safety
    ///
    /// Physical memory must be mapped read-write at `offset` for the rest of the program.
    pub const unsafe fn new(offset: usize) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

// SAFETY: `OffsetMemory::new` requires the direct map at `offset` to cover physical memory.
unsafe impl IPhysicalMemory for OffsetMemory {
    fn linear_map(&self, paddr: PhysicalAddress, len: usize) -> Option<NonNull<u8>> {
        let va = paddr.as_usize().checked_add(self.offset)?;
        va.checked_add(len)?;

        NonNull::new(va as *mut u8)
    }
}
