use constants::{FRAMES_PER_INFO_FRAME, FRAME_STATES_PER_BYTE};

use crate::FrameState;

/// Number of management frames needed to hold the state map of `n_frames` frames.
pub const fn needed_info_frames(n_frames: usize) -> usize {
    n_frames.div_ceil(FRAMES_PER_INFO_FRAME)
}

/// Densely packed per-frame states, four frames per byte.
///
/// Frame `i` lives in byte `i / 4` at bit offset `(i % 4) * 2`.
pub struct FrameStateMap<'a> {
    bytes: &'a mut [u8],
    frame_count: usize,
}

impl<'a> FrameStateMap<'a> {
    /// Bytes of storage needed for `frame_count` frames.
    pub const fn bytes_for(frame_count: usize) -> usize {
        frame_count.div_ceil(FRAME_STATES_PER_BYTE)
    }

    /// Wraps `bytes` as a map of `frame_count` frames, leaving the current contents as they are.
    pub fn new(bytes: &'a mut [u8], frame_count: usize) -> Self {
        assert!(
            bytes.len() >= Self::bytes_for(frame_count),
            "state map of {} bytes cannot describe {} frames",
            bytes.len(),
            frame_count
        );

        Self { bytes, frame_count }
    }

    /// Wraps `bytes` and marks every frame as free.
    pub fn new_cleared(bytes: &'a mut [u8], frame_count: usize) -> Self {
        let mut map = Self::new(bytes, frame_count);
        map.clear();
        map
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn clear(&mut self) {
        let len = Self::bytes_for(self.frame_count);
        self.bytes[..len].fill(0);
    }

    #[inline(always)]
    fn locate(&self, frame_index: usize) -> (usize, usize) {
        assert!(
            frame_index < self.frame_count,
            "frame index {} out of bounds for a map of {} frames",
            frame_index,
            self.frame_count
        );

        (
            frame_index / FRAME_STATES_PER_BYTE,
            (frame_index % FRAME_STATES_PER_BYTE) * FrameState::BITS,
        )
    }

    pub fn get_state(&self, frame_index: usize) -> FrameState {
        let (byte, shift) = self.locate(frame_index);

        FrameState::decode(self.bytes[byte] >> shift)
    }

    pub fn set_state(&mut self, frame_index: usize, state: FrameState) {
        let (byte, shift) = self.locate(frame_index);

        self.bytes[byte] &= !(FrameState::MASK << shift);
        self.bytes[byte] |= state.encode() << shift;
    }

    /// Iterates over the states of all frames in index order.
    pub fn states(&self) -> impl Iterator<Item = FrameState> + '_ {
        (0..self.frame_count).map(|index| self.get_state(index))
    }

    pub fn count_free(&self) -> usize {
        self.states().filter(|state| state.is_free()).count()
    }
}

#[cfg(test)]
mod frame_state_map_tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn test_needed_info_frames() {
        assert_eq!(needed_info_frames(0), 0);
        assert_eq!(needed_info_frames(1), 1);
        assert_eq!(needed_info_frames(FRAMES_PER_INFO_FRAME), 1);
        assert_eq!(needed_info_frames(FRAMES_PER_INFO_FRAME + 1), 2);
        assert_eq!(needed_info_frames(3 * FRAMES_PER_INFO_FRAME), 3);
        assert_eq!(FRAMES_PER_INFO_FRAME, 4 * constants::FRAME_SIZE);
    }

    #[test]
    fn test_bytes_for() {
        assert_eq!(FrameStateMap::bytes_for(0), 0);
        assert_eq!(FrameStateMap::bytes_for(1), 1);
        assert_eq!(FrameStateMap::bytes_for(4), 1);
        assert_eq!(FrameStateMap::bytes_for(5), 2);
    }

    #[test]
    fn test_packing_layout() {
        let mut bytes = [0u8; 2];
        let mut map = FrameStateMap::new(&mut bytes, 8);

        map.set_state(0, FrameState::HeadOfSequence);
        map.set_state(1, FrameState::Used);
        map.set_state(3, FrameState::Used);
        map.set_state(5, FrameState::HeadOfSequence);

        assert_eq!(bytes, [0b01_00_01_10, 0b00_00_10_00]);
    }

    #[test]
    fn test_set_state_keeps_neighbours() {
        let mut bytes = [0u8; 1];
        let mut map = FrameStateMap::new(&mut bytes, 4);

        map.set_state(0, FrameState::Used);
        map.set_state(1, FrameState::HeadOfSequence);
        map.set_state(2, FrameState::Used);
        map.set_state(3, FrameState::HeadOfSequence);

        map.set_state(1, FrameState::Free);

        assert_eq!(map.get_state(0), FrameState::Used);
        assert_eq!(map.get_state(1), FrameState::Free);
        assert_eq!(map.get_state(2), FrameState::Used);
        assert_eq!(map.get_state(3), FrameState::HeadOfSequence);
    }

    #[test]
    fn test_overwrite_state() {
        let mut bytes = [0u8; 1];
        let mut map = FrameStateMap::new(&mut bytes, 4);

        map.set_state(2, FrameState::HeadOfSequence);
        map.set_state(2, FrameState::Used);
        assert_eq!(map.get_state(2), FrameState::Used);
    }

    #[test]
    fn test_reserved_bits_read_as_free() {
        let mut bytes = [0b11_11_11_11u8];
        let map = FrameStateMap::new(&mut bytes, 4);

        assert!(map.states().all(|state| state == FrameState::Free));
        assert_eq!(map.count_free(), 4);
    }

    #[test]
    fn test_new_cleared() {
        let mut bytes = vec![0xAAu8; 3];
        let map = FrameStateMap::new_cleared(&mut bytes, 10);

        assert_eq!(map.count_free(), 10);
        assert_eq!(bytes, [0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_out_of_bounds() {
        let mut bytes = [0u8; 2];
        let map = FrameStateMap::new(&mut bytes, 6);

        map.get_state(6);
    }

    #[test]
    #[should_panic(expected = "cannot describe")]
    fn test_storage_too_small() {
        let mut bytes = [0u8; 1];
        FrameStateMap::new(&mut bytes, 5);
    }
}
