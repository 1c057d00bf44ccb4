use abstractions::IUsizeAlias;

use crate::PhysicalAddress;

/// Number of a physical frame, i.e. its start address divided by the frame size.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysicalFrameNum(usize);

impl IUsizeAlias for PhysicalFrameNum {
    #[inline(always)]
    fn as_usize(&self) -> usize {
        self.0
    }

    #[inline(always)]
    fn from_usize(value: usize) -> Self {
        Self(value)
    }
}

abstractions::impl_offset_arith!(PhysicalFrameNum);
abstractions::impl_usize_display!(PhysicalFrameNum);

impl PhysicalFrameNum {
    pub fn start_addr(self) -> PhysicalAddress {
        PhysicalAddress::from_usize(self.0 * constants::FRAME_SIZE)
    }
}
