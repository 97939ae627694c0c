//! Stable entity identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for panel and detail entities.
///
/// `0` is reserved so ids are always non-zero. Ids are never reused within a
/// story session, which keeps drag-source lookups unambiguous after deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Lowest valid entity id.
    pub const MIN: Self = Self(1);

    /// Create an id, rejecting 0.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityIdAllocator {
    next: EntityId,
}

impl EntityIdAllocator {
    /// Hand out the next id.
    ///
    /// Saturates at `u64::MAX`; a story would need more entities than fit in
    /// memory to get there.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next;
        self.next = EntityId(self.next.0.saturating_add(1));
        id
    }

    /// Peek at the id the next call to [`allocate`](Self::allocate) returns.
    #[must_use]
    pub const fn peek(&self) -> EntityId {
        self.next
    }
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self {
            next: EntityId::MIN,
        }
    }
}
