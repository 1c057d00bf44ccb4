use abstractions::IUsizeAlias;

use crate::PhysicalFrameNum;

/// Half-open range of frame numbers `[start, end)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PhysicalFrameNumRange {
    start: PhysicalFrameNum,
    end: PhysicalFrameNum,
}

impl PhysicalFrameNumRange {
    pub fn from_start_end(start: PhysicalFrameNum, end: PhysicalFrameNum) -> Self {
        debug_assert!(start <= end);

        Self { start, end }
    }

    pub fn from_start_count(start: PhysicalFrameNum, count: usize) -> Self {
        Self::from_start_end(start, start + count)
    }

    pub fn start(&self) -> PhysicalFrameNum {
        self.start
    }

    pub fn end(&self) -> PhysicalFrameNum {
        self.end
    }

    pub fn frame_count(&self) -> usize {
        self.end - self.start
    }

    pub fn contains(&self, frame: PhysicalFrameNum) -> bool {
        self.start <= frame && frame < self.end
    }

    pub fn contains_range(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl core::fmt::Debug for PhysicalFrameNumRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "PhysicalFrameNumRange({:#x}..{:#x})",
            self.start.as_usize(),
            self.end.as_usize()
        )
    }
}
