//! Entity store validation errors.

use storydock_core::{DetailKind, EntityId, ErrorKind};

/// Rejections raised by [`EntityStore`](crate::EntityStore) before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown entity {id}")]
    UnknownEntity { id: EntityId },
    #[error("{scope} already has an entry titled {title:?}")]
    DuplicateTitle { title: String, scope: String },
    #[error("title {title:?} is empty or contains only whitespace")]
    InvalidTitle { title: String },
    #[error("a {kind} cannot be owned by {owner}")]
    InvalidOwner { kind: DetailKind, owner: String },
    #[error("moving {id} under {owner} would make it its own ancestor")]
    OwnershipCycle { id: EntityId, owner: EntityId },
    #[error("{id} is a panel; only detail entities can be re-parented")]
    NotADetail { id: EntityId },
    #[error("attribute {key:?} is managed by the store and cannot be set directly")]
    ReservedKey { key: String },
}

impl StoreError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownEntity { .. } => ErrorKind::UnknownEntity,
            Self::DuplicateTitle { .. } => ErrorKind::DuplicateTitle,
            Self::InvalidTitle { .. }
            | Self::InvalidOwner { .. }
            | Self::OwnershipCycle { .. }
            | Self::NotADetail { .. }
            | Self::ReservedKey { .. } => ErrorKind::InvalidInput,
        }
    }
}
