/// A newtype over `usize`, such as an address or a frame number.
pub trait IUsizeAlias: Copy + Clone + PartialEq + PartialOrd + Eq + Ord {
    fn as_usize(&self) -> usize;

    fn from_usize(value: usize) -> Self;
}

/// Offsetting an alias by a count (`frame + 3`, `frame += 3`) and measuring the distance
/// between two of them (`end - start`, a plain `usize`).
#[macro_export]
macro_rules! impl_offset_arith {
    ($type:ty) => {
        impl core::ops::Add<usize> for $type {
            type Output = Self;

            fn add(self, count: usize) -> Self {
                <$type as $crate::IUsizeAlias>::from_usize($crate::IUsizeAlias::as_usize(&self) + count)
            }
        }

        impl core::ops::AddAssign<usize> for $type {
            fn add_assign(&mut self, count: usize) {
                *self = *self + count;
            }
        }

        impl core::ops::Sub<usize> for $type {
            type Output = Self;

            fn sub(self, count: usize) -> Self {
                <$type as $crate::IUsizeAlias>::from_usize($crate::IUsizeAlias::as_usize(&self) - count)
            }
        }

        impl core::ops::Sub<$type> for $type {
            type Output = usize;

            fn sub(self, origin: Self) -> usize {
                $crate::IUsizeAlias::as_usize(&self) - $crate::IUsizeAlias::as_usize(&origin)
            }
        }
    };
}

/// Formats the alias as `TypeName(0x...)` for both `Display` and `Debug`.
#[macro_export]
macro_rules! impl_usize_display {
    ($type:ty) => {
        impl core::fmt::Display for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(
                    f,
                    "{}({:#x})",
                    stringify!($type),
                    $crate::IUsizeAlias::as_usize(self)
                )
            }
        }

        impl core::fmt::Debug for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(self, f)
            }
        }
    };
}
