//! Facade error type.

use storydock_core::{ConfigError, EntityId, ErrorKind};
use storydock_layout::LayoutError;
use storydock_store::{DocumentError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{id} is not a panel")]
    NotAPanel { id: EntityId },
    #[error("{id} has no canvas document")]
    NoCanvas { id: EntityId },
}

impl StoryError {
    /// Classification shared with every other storydock error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(err) => err.kind(),
            Self::Layout(err) => err.kind(),
            Self::Document(err) => err.kind(),
            Self::Config(_) => ErrorKind::Config,
            Self::NotAPanel { .. } | Self::NoCanvas { .. } => ErrorKind::InvalidInput,
        }
    }
}
