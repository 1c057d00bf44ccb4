//! # Frame pool
//!
//! A physical frame allocator that hands out runs of contiguous frames.
//!
//! Each [`FramePool`] manages one contiguous range of frame numbers and keeps a 2-bit state per
//! frame in a [`FrameStateMap`] stored inside a physical "management" frame. A run is released by
//! its first frame alone: the [`FramePoolRegistry`] finds the pool owning that frame.
//!
//! The [`global`] module wraps a process-wide registry for kernel use.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod error;
mod map;
mod pool;
mod registry;
mod state;

pub mod global;

pub use error::{RegistryError, ReleaseError};
pub use map::{needed_info_frames, FrameStateMap};
pub use pool::FramePool;
pub use registry::{FramePoolHandle, FramePoolRegistry, FramePoolStatistics};
pub use state::FrameState;
