use core::fmt::{Display, Formatter};

use address::PhysicalFrameNum;

/// The error type for registering frame pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Every registry slot is taken.
    Full,
    /// The handle does not refer to a registered pool.
    UnknownHandle,
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            RegistryError::Full => write!(
                f,
                "frame pool registry is full ({} pools)",
                constants::MAX_FRAME_POOLS
            ),
            RegistryError::UnknownHandle => write!(f, "no frame pool registered for the handle"),
        }
    }
}

/// The error type for releasing frames through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseError {
    /// No registered pool owns the frame.
    NoOwningPool { frame: PhysicalFrameNum },
}

impl Display for ReleaseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ReleaseError::NoOwningPool { frame } => {
                write!(f, "no registered frame pool owns {}", frame)
            }
        }
    }
}
