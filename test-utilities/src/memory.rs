use std::alloc::Layout;
use std::ptr::NonNull;

use abstractions::IUsizeAlias;
use address::{PhysicalAddress, PhysicalFrameNum, PhysicalFrameNumRange};
use log::trace;
use memory_abstractions::IPhysicalMemory;

/// A window of host memory standing in for the physical frames `[first_frame, first_frame + count)`.
///
/// The backing buffer is zeroed, frame aligned and intentionally leaked: frame pools built on top of
/// it keep `'static` views into it, and some of them end up in the process-wide registry.
pub struct TestPhysicalMemory {
    frames: PhysicalFrameNumRange,
    base: NonNull<u8>,
}

// The buffer is never freed and only handed out as raw pointers.
unsafe impl Send for TestPhysicalMemory {}
unsafe impl Sync for TestPhysicalMemory {}

impl TestPhysicalMemory {
    pub fn new(first_frame: usize, count: usize) -> Self {
        assert!(count > 0, "test memory must cover at least one frame");

        let layout = Layout::from_size_align(count * constants::FRAME_SIZE, constants::FRAME_SIZE)
            .expect("invalid layout for test memory");

        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        let base = NonNull::new(ptr).unwrap_or_else(|| std::alloc::handle_alloc_error(layout));

        let frames = PhysicalFrameNumRange::from_start_count(
            PhysicalFrameNum::from_usize(first_frame),
            count,
        );

        trace!("Test memory {:?} backed by host {:p}", frames, base);

        Self { frames, base }
    }

    pub fn frames(&self) -> PhysicalFrameNumRange {
        self.frames
    }

    /// Raw bytes of a backed frame, for inspecting what the allocator wrote there.
    pub fn frame_bytes(&self, frame: PhysicalFrameNum) -> &[u8] {
        let ptr = self
            .linear_map(frame.start_addr(), constants::FRAME_SIZE)
            .expect("frame is not backed by this test memory");

        unsafe { std::slice::from_raw_parts(ptr.as_ptr(), constants::FRAME_SIZE) }
    }
}

// SAFETY: the leaked buffer stays allocated for the whole process and `linear_map` only hands out
// pointers inside it.
unsafe impl IPhysicalMemory for TestPhysicalMemory {
    fn linear_map(&self, paddr: PhysicalAddress, len: usize) -> Option<NonNull<u8>> {
        let start = self.frames.start().start_addr().as_usize();
        let end = self.frames.end().start_addr().as_usize();

        let offset = paddr.as_usize().checked_sub(start)?;

        match paddr.as_usize().checked_add(len)? {
            last if last <= end => NonNull::new(unsafe { self.base.as_ptr().add(offset) }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test_physical_memory_tests {
    use super::*;

    #[test]
    fn test_window_bounds() {
        let memory = TestPhysicalMemory::new(100, 2);

        let first = PhysicalFrameNum::from_usize(100).start_addr();
        let last = PhysicalFrameNum::from_usize(101).start_addr();

        assert!(memory.linear_map(first, constants::FRAME_SIZE).is_some());
        assert!(memory.linear_map(last, constants::FRAME_SIZE).is_some());
        assert!(memory.linear_map(last, constants::FRAME_SIZE + 1).is_none());
        assert!(memory
            .linear_map(PhysicalFrameNum::from_usize(99).start_addr(), 1)
            .is_none());
    }

    #[test]
    fn test_memory_is_zeroed() {
        let memory = TestPhysicalMemory::new(7, 1);

        assert!(memory
            .frame_bytes(PhysicalFrameNum::from_usize(7))
            .iter()
            .all(|b| *b == 0));
    }
}
