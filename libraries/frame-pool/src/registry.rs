use address::PhysicalFrameNum;
use constants::MAX_FRAME_POOLS;
use log::{debug, warn};

use crate::{FramePool, RegistryError, ReleaseError};

/// Refers to a pool registered in a [`FramePoolRegistry`].
///
/// A handle goes stale once its pool is unregistered, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramePoolHandle {
    index: usize,
    generation: u32,
}

impl FramePoolHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Frame counts summed over every registered pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramePoolStatistics {
    pub pools: usize,
    pub free_frames: usize,
    pub total_frames: usize,
}

/// Fixed-capacity arena of frame pools, searched by frame number when releasing.
pub struct FramePoolRegistry {
    slots: [Option<FramePool>; MAX_FRAME_POOLS],
    // bumped whenever a slot is vacated
    generations: [u32; MAX_FRAME_POOLS],
    count: usize,
}

const EMPTY_SLOT: Option<FramePool> = None;

impl FramePoolRegistry {
    pub const fn new() -> Self {
        Self {
            slots: [EMPTY_SLOT; MAX_FRAME_POOLS],
            generations: [0; MAX_FRAME_POOLS],
            count: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        MAX_FRAME_POOLS
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == MAX_FRAME_POOLS
    }

    /// Takes ownership of `pool`. Ranges are not checked against other registered pools.
    pub fn register(&mut self, pool: FramePool) -> Result<FramePoolHandle, RegistryError> {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(RegistryError::Full)?;

        debug!("Registering {:?} in slot {}", pool, index);

        self.slots[index] = Some(pool);
        self.count += 1;

        Ok(self.handle_of(index))
    }

    pub fn unregister(&mut self, handle: FramePoolHandle) -> Option<FramePool> {
        if !self.is_live(handle) {
            return None;
        }

        let pool = self.slots[handle.index].take()?;
        self.generations[handle.index] = self.generations[handle.index].wrapping_add(1);
        self.count -= 1;

        debug!("Unregistered {:?} from slot {}", pool, handle.index);

        Some(pool)
    }

    fn handle_of(&self, index: usize) -> FramePoolHandle {
        FramePoolHandle {
            index,
            generation: self.generations[index],
        }
    }

    fn is_live(&self, handle: FramePoolHandle) -> bool {
        self.generations.get(handle.index) == Some(&handle.generation)
    }

    pub fn get(&self, handle: FramePoolHandle) -> Option<&FramePool> {
        match self.is_live(handle) {
            true => self.slots[handle.index].as_ref(),
            false => None,
        }
    }

    pub fn get_mut(&mut self, handle: FramePoolHandle) -> Option<&mut FramePool> {
        match self.is_live(handle) {
            true => self.slots[handle.index].as_mut(),
            false => None,
        }
    }

    /// Registered pools in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (FramePoolHandle, &FramePool)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| {
                slot.as_ref().map(|pool| (self.handle_of(index), pool))
            })
    }

    /// Finds the pool whose range contains `frame`.
    pub fn find_owner(&self, frame: PhysicalFrameNum) -> Option<FramePoolHandle> {
        self.iter()
            .find(|(_, pool)| pool.contains(frame))
            .map(|(handle, _)| handle)
    }

    /// Releases the run starting at `first_frame` in whichever pool owns it.
    ///
    /// Returns the number of frames released.
    ///
    /// # Panics
    ///
    /// Panics if `first_frame` is not the head of an allocated run.
    pub fn release_frames(
        &mut self,
        first_frame: PhysicalFrameNum,
    ) -> Result<usize, ReleaseError> {
        let owner = match self.find_owner(first_frame) {
            Some(handle) => handle,
            None => {
                warn!("Ignoring release of {}: no frame pool owns it", first_frame);
                return Err(ReleaseError::NoOwningPool { frame: first_frame });
            }
        };

        match self.get_mut(owner) {
            Some(pool) => Ok(pool.release_run(first_frame)),
            None => Err(ReleaseError::NoOwningPool { frame: first_frame }),
        }
    }

    pub fn statistics(&self) -> FramePoolStatistics {
        self.iter()
            .fold(FramePoolStatistics::default(), |mut stats, (_, pool)| {
                stats.pools += 1;
                stats.free_frames += pool.free_frames();
                stats.total_frames += pool.frame_count();
                stats
            })
    }
}

impl Default for FramePoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod frame_pool_registry_tests {
    use abstractions::IUsizeAlias;
    use alloc::vec::Vec;
    use test_utilities::memory::TestPhysicalMemory;

    use super::*;
    use crate::FrameState;

    fn frame(n: usize) -> PhysicalFrameNum {
        PhysicalFrameNum::from_usize(n)
    }

    fn pool(base: usize, count: usize) -> FramePool {
        let memory = TestPhysicalMemory::new(base, 1);
        unsafe { FramePool::new(frame(base), count, None, &memory) }
    }

    fn registry() -> FramePoolRegistry {
        FramePoolRegistry::new()
    }

    #[test]
    fn test_register() {
        let mut registry = registry();
        assert!(registry.is_empty());

        let a = registry.register(pool(0, 50)).unwrap();
        let b = registry.register(pool(50, 50)).unwrap();

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(a).map(|p| p.base_frame()), Some(frame(0)));
        assert_eq!(registry.get(b).map(|p| p.base_frame()), Some(frame(50)));
    }

    #[test]
    fn test_find_owner() {
        let mut registry = registry();

        let a = registry.register(pool(0, 50)).unwrap();
        let b = registry.register(pool(50, 50)).unwrap();

        assert_eq!(registry.find_owner(frame(0)), Some(a));
        assert_eq!(registry.find_owner(frame(49)), Some(a));
        assert_eq!(registry.find_owner(frame(50)), Some(b));
        assert_eq!(registry.find_owner(frame(99)), Some(b));
        assert_eq!(registry.find_owner(frame(100)), None);
    }

    #[test]
    fn test_release_dispatches_to_owner() {
        let mut registry = registry();

        let a = registry.register(pool(0, 50)).unwrap();
        let b = registry.register(pool(50, 50)).unwrap();

        registry.get_mut(a).unwrap().get_frames(10);
        registry.get_mut(b).unwrap().mark_inaccessible(frame(75), 5);

        let first_before: Vec<FrameState> =
            (0..50).map(|i| registry.get(a).unwrap().get_state(i)).collect();

        assert_eq!(registry.release_frames(frame(75)), Ok(5));

        let second = registry.get(b).unwrap();
        assert!((75..80).all(|f| second.state_of(frame(f)) == Some(FrameState::Free)));
        assert_eq!(second.free_frames(), 49);

        let first = registry.get(a).unwrap();
        assert!((0..50).all(|i| first.get_state(i) == first_before[i]));
        assert_eq!(first.free_frames(), 39);
    }

    #[test]
    fn test_release_unowned_frame() {
        let mut registry = registry();
        registry.register(pool(0, 50)).unwrap();

        assert_eq!(
            registry.release_frames(frame(500)),
            Err(ReleaseError::NoOwningPool { frame: frame(500) })
        );
    }

    #[test]
    #[should_panic(expected = "not the head of an allocated run")]
    fn test_release_non_head() {
        let mut registry = registry();
        let handle = registry.register(pool(0, 50)).unwrap();

        registry.get_mut(handle).unwrap().get_frames(4);
        let _ = registry.release_frames(frame(3));
    }

    #[test]
    fn test_alloc_then_release_round_trip() {
        let mut registry = registry();
        let handle = registry.register(pool(100, 10)).unwrap();

        let first = registry.get_mut(handle).unwrap().get_frames(3).unwrap();
        assert_eq!(first, frame(101));
        let second = registry.get_mut(handle).unwrap().get_frames(5).unwrap();
        assert_eq!(second, frame(104));

        assert_eq!(registry.release_frames(first), Ok(3));

        let pool = registry.get(handle).unwrap();
        assert_eq!(pool.state_of(frame(104)), Some(FrameState::HeadOfSequence));
        assert_eq!(pool.state_of(frame(108)), Some(FrameState::Used));
        assert_eq!(pool.free_frames(), 4);
    }

    #[test]
    fn test_registry_full() {
        let mut registry = registry();

        for i in 0..MAX_FRAME_POOLS {
            registry.register(pool(i * 4, 4)).unwrap();
        }

        assert!(registry.is_full());
        assert_eq!(
            registry.register(pool(MAX_FRAME_POOLS * 4, 4)).unwrap_err(),
            RegistryError::Full
        );
    }

    #[test]
    fn test_unregister_frees_slot() {
        let mut registry = registry();

        let a = registry.register(pool(0, 8)).unwrap();
        let b = registry.register(pool(8, 8)).unwrap();

        let removed = registry.unregister(a).unwrap();
        assert_eq!(removed.base_frame(), frame(0));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(a).is_none());
        assert!(registry.unregister(a).is_none());
        assert_eq!(registry.find_owner(frame(3)), None);

        // the emptied slot is reused, the old handle stays stale
        let c = registry.register(pool(16, 8)).unwrap();
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert!(registry.get(a).is_none());
        assert!(registry.unregister(a).is_none());
        assert_eq!(registry.find_owner(frame(9)), Some(b));
        assert_eq!(registry.find_owner(frame(17)), Some(c));
    }

    #[test]
    fn test_statistics() {
        let mut registry = registry();

        let a = registry.register(pool(0, 50)).unwrap();
        registry.register(pool(50, 50)).unwrap();
        registry.get_mut(a).unwrap().get_frames(9);

        assert_eq!(
            registry.statistics(),
            FramePoolStatistics {
                pools: 2,
                free_frames: 40 + 49,
                total_frames: 100,
            }
        );
    }

    #[test]
    fn test_handle_out_of_range() {
        let registry = registry();

        let handle = FramePoolHandle {
            index: MAX_FRAME_POOLS + 1,
            generation: 0,
        };

        assert!(registry.get(handle).is_none());
        assert_eq!(registry.capacity(), MAX_FRAME_POOLS);
    }
}
