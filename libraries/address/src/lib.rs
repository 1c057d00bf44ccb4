#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod physical_address;
mod physical_frame_num;
mod physical_frame_num_range;

pub use physical_address::*;
pub use physical_frame_num::*;
pub use physical_frame_num_range::*;
