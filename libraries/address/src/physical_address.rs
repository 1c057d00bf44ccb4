use abstractions::IUsizeAlias;

/// A byte address in physical memory. Only meaningful once translated through a memory window.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysicalAddress(usize);

impl IUsizeAlias for PhysicalAddress {
    #[inline(always)]
    fn as_usize(&self) -> usize {
        self.0
    }

    #[inline(always)]
    fn from_usize(value: usize) -> Self {
        Self(value)
    }
}

abstractions::impl_usize_display!(PhysicalAddress);
