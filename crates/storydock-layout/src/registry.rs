//! Region membership and visibility for every placed panel.
//!
//! Each pinned entity has exactly one entry, and each entry names exactly one
//! region, so an entity can never be listed by two regions at once. The
//! per-region occupant lists keep insertion order, which is display order.

use rustc_hash::FxHashMap;
use storydock_core::{EntityId, Region};

use crate::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PinEntry {
    region: Region,
    visible: bool,
}

/// Which region each panel occupies and whether it is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinRegistry {
    entries: FxHashMap<EntityId, PinEntry>,
    /// Occupants per region, indexed by [`Region::index`].
    occupants: [Vec<EntityId>; 5],
}

impl PinRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `id` at the end of `region`'s occupant list.
    pub fn pin(&mut self, id: EntityId, region: Region, visible: bool) -> Result<(), LayoutError> {
        if let Some(entry) = self.entries.get(&id) {
            return Err(LayoutError::AlreadyPinned {
                id,
                region: entry.region,
            });
        }
        self.entries.insert(id, PinEntry { region, visible });
        self.occupants[region.index()].push(id);
        tracing::trace!(%id, %region, visible, "pinned");
        Ok(())
    }

    /// Stop tracking `id`, returning the region it occupied.
    pub fn unpin(&mut self, id: EntityId) -> Result<Region, LayoutError> {
        let entry = self
            .entries
            .remove(&id)
            .ok_or(LayoutError::UnknownEntity { id })?;
        self.occupants[entry.region.index()].retain(|other| *other != id);
        Ok(entry.region)
    }

    /// Move `id` to the end of `region`.
    ///
    /// Returns `false` when `id` already occupies `region`; its position is
    /// then left as is.
    pub fn set_region(&mut self, id: EntityId, region: Region) -> Result<bool, LayoutError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(LayoutError::UnknownEntity { id })?;
        let from = entry.region;
        if from == region {
            return Ok(false);
        }
        entry.region = region;
        self.occupants[from.index()].retain(|other| *other != id);
        self.occupants[region.index()].push(id);
        tracing::debug!(%id, %from, to = %region, "region changed");
        Ok(true)
    }

    /// Returns whether the flag changed.
    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> Result<bool, LayoutError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(LayoutError::UnknownEntity { id })?;
        let changed = entry.visible != visible;
        entry.visible = visible;
        Ok(changed)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn region_of(&self, id: EntityId) -> Option<Region> {
        self.entries.get(&id).map(|entry| entry.region)
    }

    #[must_use]
    pub fn is_visible(&self, id: EntityId) -> Option<bool> {
        self.entries.get(&id).map(|entry| entry.visible)
    }

    /// All occupants of `region`, hidden ones included, in display order.
    #[must_use]
    pub fn occupants(&self, region: Region) -> &[EntityId] {
        &self.occupants[region.index()]
    }

    /// Occupants of `region` with `visible == true`, in display order.
    #[must_use]
    pub fn visible_occupants(&self, region: Region) -> Vec<EntityId> {
        self.occupants(region)
            .iter()
            .copied()
            .filter(|id| self.is_visible(*id) == Some(true))
            .collect()
    }

    #[must_use]
    pub fn is_region_empty(&self, region: Region) -> bool {
        !self
            .occupants(region)
            .iter()
            .any(|id| self.is_visible(*id) == Some(true))
    }

    /// Visible occupants across all five regions.
    #[must_use]
    pub fn total_visible(&self) -> usize {
        self.entries.values().filter(|entry| entry.visible).count()
    }

    /// Number of pinned entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entity for which `keep` returns `false`.
    ///
    /// Returns the dropped ids in region then display order.
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId) -> bool) -> Vec<EntityId> {
        let mut dropped = Vec::new();
        for list in &mut self.occupants {
            list.retain(|id| {
                let kept = keep(*id);
                if !kept {
                    dropped.push(*id);
                }
                kept
            });
        }
        for id in &dropped {
            self.entries.remove(id);
        }
        dropped
    }
}
