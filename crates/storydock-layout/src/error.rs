//! Layout-side failures.

use storydock_core::{EntityId, ErrorKind, Region};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("entity {id} is not pinned to any region")]
    UnknownEntity { id: EntityId },
    #[error("entity {id} is already pinned to the {region} region")]
    AlreadyPinned { id: EntityId, region: Region },
    #[error("the {region} region has no stored size")]
    NotResizable { region: Region },
    #[error("no drag gesture is in progress")]
    NoActiveDrag,
}

impl LayoutError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownEntity { .. } => ErrorKind::UnknownEntity,
            Self::AlreadyPinned { .. } | Self::NotResizable { .. } | Self::NoActiveDrag => {
                ErrorKind::InvalidInput
            }
        }
    }
}
