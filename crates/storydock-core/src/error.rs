//! Error taxonomy shared by every layer.
//!
//! Each crate defines its own error enum; all of them classify into one
//! [`ErrorKind`] so a host can decide how to surface a failure without
//! matching on crate-specific variants.

use serde::{Deserialize, Serialize};

/// Coarse classification of every storydock failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// An operation referenced an entity id the store does not know.
    UnknownEntity,
    /// A create or rename would collide with a sibling's title.
    DuplicateTitle,
    /// Input rejected before any mutation (empty title, illegal owner, cycle).
    InvalidInput,
    /// No document on disk yet; recovered as a first run.
    DocumentNotFound,
    /// Document content is malformed; recovered by substituting defaults.
    DocumentCorrupt,
    /// A region listed an occupant that no longer exists.
    InconsistentRegionReference,
    /// Filesystem failure not covered by the recoveries above.
    Io,
    /// Configuration could not be loaded.
    Config,
}

impl ErrorKind {
    /// Validation failures the user can fix by changing their input.
    #[must_use]
    pub const fn is_user_facing(self) -> bool {
        matches!(
            self,
            Self::DuplicateTitle | Self::InvalidInput | Self::UnknownEntity
        )
    }
}
