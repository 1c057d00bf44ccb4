/// Allocation state of a single frame, stored as a 2-bit field in a pool's state map.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Not allocated, may be handed out.
    Free = 0b00,
    /// Allocated, but not the first frame of its run.
    Used = 0b01,
    /// First frame of an allocated run.
    HeadOfSequence = 0b10,
}

impl FrameState {
    pub const BITS: usize = 2;
    pub const MASK: u8 = 0b11;

    #[inline(always)]
    pub const fn encode(self) -> u8 {
        self as u8
    }

    /// Decodes a 2-bit field. The reserved pattern `0b11` reads as `Free`.
    #[inline(always)]
    pub const fn decode(bits: u8) -> Self {
        match bits & Self::MASK {
            0b01 => FrameState::Used,
            0b10 => FrameState::HeadOfSequence,
            _ => FrameState::Free,
        }
    }

    #[inline(always)]
    pub fn is_free(self) -> bool {
        self == FrameState::Free
    }

    #[inline(always)]
    pub fn is_allocated(self) -> bool {
        !self.is_free()
    }
}
