use address::{PhysicalFrameNum, PhysicalFrameNumRange};
use constants::MAX_POOL_FRAMES;
use log::{debug, warn};
use memory_abstractions::IPhysicalMemory;

use crate::{FrameState, FrameStateMap};

/// Allocator for one contiguous range of physical frames.
///
/// Frames are handed out as runs: the first frame of a run is marked
/// [`FrameState::HeadOfSequence`] and the rest [`FrameState::Used`], so a run can later be
/// released knowing only its first frame.
pub struct FramePool {
    base_frame: PhysicalFrameNum,
    frame_count: usize,
    free_frames: usize,
    // None when the map lives in the pool's own first frame
    info_frame: Option<PhysicalFrameNum>,
    map: FrameStateMap<'static>,
}

impl FramePool {
    /// Creates a pool managing `[base_frame, base_frame + frame_count)`.
    ///
    /// The state map is stored in `info_frame` if given, otherwise in `base_frame`, which is then
    /// marked as used and never handed out.
    ///
    /// # Panics
    ///
    /// Panics if `frame_count` is zero or too large for one management frame, or if `memory`
    /// cannot map the management frame.
    ///
    /// # Safety
    ///
    /// The management frame must be backed by `memory` for the rest of the program, and nothing
    /// else, including another pool, may use it.
    pub unsafe fn new(
        base_frame: PhysicalFrameNum,
        frame_count: usize,
        info_frame: Option<PhysicalFrameNum>,
        memory: &(impl IPhysicalMemory + ?Sized),
    ) -> Self {
        assert!(frame_count > 0, "frame pool at {} has no frames", base_frame);
        assert!(
            frame_count <= MAX_POOL_FRAMES,
            "frame pool of {} frames exceeds the {} frames one management frame can describe",
            frame_count,
            MAX_POOL_FRAMES
        );

        let map_frame = info_frame.unwrap_or(base_frame);
        let map_len = FrameStateMap::bytes_for(frame_count);

        let map_ptr = match memory.linear_map(map_frame.start_addr(), map_len) {
            Some(ptr) => ptr,
            None => panic!("management frame {} is not accessible", map_frame),
        };

        // SAFETY: the caller guarantees the management frame is mapped for the rest of the
        // program and exclusively owned by this pool.
        let bytes = unsafe { core::slice::from_raw_parts_mut(map_ptr.as_ptr(), map_len) };

        let mut pool = FramePool {
            base_frame,
            frame_count,
            free_frames: frame_count,
            info_frame,
            map: FrameStateMap::new_cleared(bytes, frame_count),
        };

        if pool.is_self_hosted() {
            pool.map.set_state(0, FrameState::Used);
            pool.free_frames -= 1;
        }

        debug!(
            "Frame pool created: {:?}, state map in {}{}",
            pool.range(),
            map_frame,
            if pool.is_self_hosted() { " (self-hosted)" } else { "" }
        );

        pool
    }

    pub fn base_frame(&self) -> PhysicalFrameNum {
        self.base_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn free_frames(&self) -> usize {
        self.free_frames
    }

    /// The frame holding this pool's state map.
    pub fn info_frame(&self) -> PhysicalFrameNum {
        self.info_frame.unwrap_or(self.base_frame)
    }

    pub fn is_self_hosted(&self) -> bool {
        self.info_frame.is_none()
    }

    pub fn range(&self) -> PhysicalFrameNumRange {
        PhysicalFrameNumRange::from_start_count(self.base_frame, self.frame_count)
    }

    pub fn contains(&self, frame: PhysicalFrameNum) -> bool {
        self.range().contains(frame)
    }

    /// State of the frame at `frame_index`, counted from the pool's base frame.
    pub fn get_state(&self, frame_index: usize) -> FrameState {
        self.map.get_state(frame_index)
    }

    /// Overwrites the state of the frame at `frame_index`, keeping the free count in step.
    ///
    /// # Panics
    ///
    /// Panics if `frame_index` is the management frame of a self-hosted pool.
    pub fn set_state(&mut self, frame_index: usize, state: FrameState) {
        self.assert_outside_info_frame(frame_index, 1);

        let was_free = self.map.get_state(frame_index).is_free();
        self.map.set_state(frame_index, state);

        match (was_free, state.is_free()) {
            (true, false) => self.free_frames -= 1,
            (false, true) => self.free_frames += 1,
            _ => {}
        }
    }

    /// State of a frame given by its global number, or `None` if this pool does not own it.
    pub fn state_of(&self, frame: PhysicalFrameNum) -> Option<FrameState> {
        match self.contains(frame) {
            true => Some(self.map.get_state(self.local_index(frame))),
            false => None,
        }
    }

    fn local_index(&self, frame: PhysicalFrameNum) -> usize {
        frame - self.base_frame
    }

    // a self-hosted pool keeps its map in local frame 0
    fn assert_outside_info_frame(&self, start: usize, n_frames: usize) {
        assert!(
            !(self.is_self_hosted() && start == 0 && n_frames > 0),
            "frame {} holds the state map of frame pool {:?}",
            self.base_frame,
            self.range()
        );
    }

    fn commit_run(&mut self, start: usize, n_frames: usize) {
        self.map.set_state(start, FrameState::HeadOfSequence);

        for index in start + 1..start + n_frames {
            self.map.set_state(index, FrameState::Used);
        }
    }

    /// Allocates `n_frames` contiguous frames, first fit, returning the first frame of the run.
    ///
    /// Returns `None` if no run of `n_frames` free frames exists; the pool is then unchanged.
    pub fn get_frames(&mut self, n_frames: usize) -> Option<PhysicalFrameNum> {
        if n_frames == 0 || n_frames > self.free_frames {
            return None;
        }

        let mut candidate = 0;
        let mut run = 0;

        for index in 0..self.frame_count {
            if self.map.get_state(index).is_allocated() {
                run = 0;
                candidate = index + 1;
                continue;
            }

            run += 1;

            if run == n_frames {
                self.commit_run(candidate, n_frames);
                self.free_frames -= n_frames;

                let first = self.base_frame + candidate;
                debug!("Allocated {} frame(s) at {}", n_frames, first);

                return Some(first);
            }
        }

        None
    }

    pub fn get_frame(&mut self) -> Option<PhysicalFrameNum> {
        self.get_frames(1)
    }

    /// Marks `[base_frame, base_frame + n_frames)` as one allocated run, whatever its current state.
    /// An empty range is ignored.
    ///
    /// # Panics
    ///
    /// Panics if the range is not inside this pool, or covers the management frame of a
    /// self-hosted pool.
    pub fn mark_inaccessible(&mut self, base_frame: PhysicalFrameNum, n_frames: usize) {
        if n_frames == 0 {
            return;
        }

        let target = PhysicalFrameNumRange::from_start_count(base_frame, n_frames);

        assert!(
            self.range().contains_range(&target),
            "cannot reserve {:?} in frame pool {:?}",
            target,
            self.range()
        );

        let start = self.local_index(base_frame);
        self.assert_outside_info_frame(start, n_frames);
        let previously_free = (start..start + n_frames)
            .filter(|index| self.map.get_state(*index).is_free())
            .count();

        if previously_free != n_frames {
            warn!(
                "Reserving {:?} overwrites {} allocated frame(s)",
                target,
                n_frames - previously_free
            );
        }

        self.commit_run(start, n_frames);
        self.free_frames -= previously_free;

        debug!("Marked {:?} inaccessible", target);
    }

    /// Frees the run starting at `first_frame` and returns how many frames it held.
    ///
    /// # Panics
    ///
    /// Panics if `first_frame` is outside this pool or not the head of an allocated run.
    pub fn release_run(&mut self, first_frame: PhysicalFrameNum) -> usize {
        assert!(
            self.contains(first_frame),
            "frame {} is not in frame pool {:?}",
            first_frame,
            self.range()
        );

        let mut index = self.local_index(first_frame);

        assert_eq!(
            self.map.get_state(index),
            FrameState::HeadOfSequence,
            "frame {} is not the head of an allocated run",
            first_frame
        );

        self.map.set_state(index, FrameState::Free);
        index += 1;

        while index < self.frame_count && self.map.get_state(index) == FrameState::Used {
            self.map.set_state(index, FrameState::Free);
            index += 1;
        }

        let released = index - self.local_index(first_frame);
        self.free_frames += released;

        debug!("Released {} frame(s) at {}", released, first_frame);

        released
    }
}

impl core::fmt::Debug for FramePool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FramePool")
            .field("range", &self.range())
            .field("free_frames", &self.free_frames)
            .field("info_frame", &self.info_frame())
            .finish()
    }
}
