#![no_std]

/// Size of a physical frame in bytes.
pub const FRAME_SIZE: usize = 4096;
pub const FRAME_SIZE_BITS: usize = 0xc;

/// Number of frame states packed into one byte of a pool's state map.
pub const FRAME_STATES_PER_BYTE: usize = 4;

/// Frames whose states fit into a single management frame.
pub const FRAMES_PER_INFO_FRAME: usize = FRAME_SIZE * FRAME_STATES_PER_BYTE;

/// Largest pool the allocator accepts; its whole state map must fit in one management frame.
pub const MAX_POOL_FRAMES: usize = FRAMES_PER_INFO_FRAME;

/// Capacity of the process-wide frame pool registry.
pub const MAX_FRAME_POOLS: usize = 100;

const _: () = assert!(1 << FRAME_SIZE_BITS == FRAME_SIZE);
