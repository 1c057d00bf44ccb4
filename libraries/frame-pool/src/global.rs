//! Process-wide frame pool registry.
//!
//! Pools created here live in one static [`FramePoolRegistry`], so frames can be released from
//! anywhere in the kernel by frame number alone.

use address::{PhysicalFrameNum, PhysicalFrameNumRange};
use hermit_sync::SpinMutex;
use log::{info, warn};
use memory_abstractions::IPhysicalMemory;

use crate::{FramePool, FramePoolHandle, FramePoolRegistry, FramePoolStatistics};
use crate::{RegistryError, ReleaseError};

pub use crate::needed_info_frames;

static FRAME_POOLS: SpinMutex<FramePoolRegistry> = SpinMutex::new(FramePoolRegistry::new());

/// Creates a frame pool and registers it globally. See [`FramePool::new`].
///
/// # Safety
///
/// Same contract as [`FramePool::new`].
pub unsafe fn create_pool(
    base_frame: PhysicalFrameNum,
    frame_count: usize,
    info_frame: Option<PhysicalFrameNum>,
    memory: &(impl IPhysicalMemory + ?Sized),
) -> Result<FramePoolHandle, RegistryError> {
    let mut registry = FRAME_POOLS.lock();

    if registry.is_full() {
        return Err(RegistryError::Full);
    }

    let pool = unsafe { FramePool::new(base_frame, frame_count, info_frame, memory) };

    registry.register(pool)
}

/// Covers `frames` with self-hosted pools of at most [`constants::MAX_POOL_FRAMES`] frames each,
/// returning their handles in address order.
///
/// # Safety
///
/// Every frame in `frames` must be backed by `memory` and unused by anything else.
pub unsafe fn init_region(
    frames: PhysicalFrameNumRange,
    memory: &(impl IPhysicalMemory + ?Sized),
) -> Result<alloc::vec::Vec<FramePoolHandle>, RegistryError> {
    info!(
        "Initializing frame pools over {:?} ({} frames)",
        frames,
        frames.frame_count()
    );

    let mut handles = alloc::vec::Vec::new();
    let mut base = frames.start();

    while base < frames.end() {
        let count = (frames.end() - base).min(constants::MAX_POOL_FRAMES);

        handles.push(unsafe { create_pool(base, count, None, memory) }?);
        base += count;
    }

    Ok(handles)
}

/// Unregisters a pool, handing it back to the caller.
pub fn remove_pool(handle: FramePoolHandle) -> Option<FramePool> {
    FRAME_POOLS.lock().unregister(handle)
}

/// Runs `f` on a registered pool.
pub fn with_pool<R>(
    handle: FramePoolHandle,
    f: impl FnOnce(&mut FramePool) -> R,
) -> Result<R, RegistryError> {
    FRAME_POOLS
        .lock()
        .get_mut(handle)
        .map(f)
        .ok_or(RegistryError::UnknownHandle)
}

/// Allocates `n_frames` contiguous frames from a pool. `None` if the pool has no such run
/// or the handle is stale.
pub fn get_frames(handle: FramePoolHandle, n_frames: usize) -> Option<PhysicalFrameNum> {
    with_pool(handle, |pool| pool.get_frames(n_frames))
        .ok()
        .flatten()
}

pub fn get_frame(handle: FramePoolHandle) -> Option<PhysicalFrameNum> {
    get_frames(handle, 1)
}

/// Reserves `[base_frame, base_frame + n_frames)` in a pool. See [`FramePool::mark_inaccessible`].
pub fn mark_inaccessible(
    handle: FramePoolHandle,
    base_frame: PhysicalFrameNum,
    n_frames: usize,
) -> Result<(), RegistryError> {
    with_pool(handle, |pool| pool.mark_inaccessible(base_frame, n_frames))
}

/// Releases the run starting at `first_frame`, whichever pool it came from.
///
/// # Panics
///
/// Panics if `first_frame` is not the head of an allocated run.
pub fn release_frames(first_frame: PhysicalFrameNum) -> Result<usize, ReleaseError> {
    FRAME_POOLS.lock().release_frames(first_frame)
}

pub fn allocation_statistics() -> FramePoolStatistics {
    FRAME_POOLS.lock().statistics()
}

/// A run of contiguous frames that is released back to its pool when dropped.
#[must_use = "dropping the run releases its frames immediately"]
pub struct TrackedFrameRun {
    start: PhysicalFrameNum,
    count: usize,
}

impl TrackedFrameRun {
    pub fn start(&self) -> PhysicalFrameNum {
        self.start
    }

    pub fn frame_count(&self) -> usize {
        self.count
    }

    pub fn to_range(&self) -> PhysicalFrameNumRange {
        PhysicalFrameNumRange::from_start_count(self.start, self.count)
    }

    /// Gives up tracking; the frames stay allocated until passed to [`release_frames`].
    pub fn leak(self) -> PhysicalFrameNumRange {
        let range = self.to_range();
        core::mem::forget(self);
        range
    }
}

impl Drop for TrackedFrameRun {
    fn drop(&mut self) {
        if let Err(e) = release_frames(self.start) {
            warn!("Failed to release tracked run {:?}: {}", self.to_range(), e);
        }
    }
}

/// Like [`get_frames`], but the run is released automatically.
pub fn alloc_contiguous(handle: FramePoolHandle, count: usize) -> Option<TrackedFrameRun> {
    get_frames(handle, count).map(|start| TrackedFrameRun { start, count })
}
