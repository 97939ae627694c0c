//! Stored sizes of the four side regions.
//!
//! Heights for top and bottom, widths for left and right. Main has no stored
//! size; it fills whatever the sides leave.

use serde::{Deserialize, Serialize};
use storydock_core::Region;
use storydock_core::config::DEFAULT_MIN_REGION_SIZE;

use crate::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDimensions {
    pub top: u16,
    pub left: u16,
    pub right: u16,
    pub bottom: u16,
}

impl Default for RegionDimensions {
    fn default() -> Self {
        Self::uniform(DEFAULT_MIN_REGION_SIZE)
    }
}

impl RegionDimensions {
    #[must_use]
    pub const fn uniform(size: u16) -> Self {
        Self {
            top: size,
            left: size,
            right: size,
            bottom: size,
        }
    }

    /// Stored size of a side region; `None` for main.
    #[must_use]
    pub const fn get(&self, region: Region) -> Option<u16> {
        match region {
            Region::Top => Some(self.top),
            Region::Left => Some(self.left),
            Region::Right => Some(self.right),
            Region::Bottom => Some(self.bottom),
            Region::Main => None,
        }
    }

    pub fn set(&mut self, region: Region, size: u16) -> Result<(), LayoutError> {
        let slot = match region {
            Region::Top => &mut self.top,
            Region::Left => &mut self.left,
            Region::Right => &mut self.right,
            Region::Bottom => &mut self.bottom,
            Region::Main => return Err(LayoutError::NotResizable { region }),
        };
        *slot = size;
        Ok(())
    }

    /// Raise `region` to `minimum` if it is below it.
    ///
    /// Returns the previous size when a raise happened.
    pub(crate) fn enforce_minimum(&mut self, region: Region, minimum: u16) -> Option<u16> {
        let current = self.get(region)?;
        if current >= minimum {
            return None;
        }
        self.set(region, minimum).ok()?;
        Some(current)
    }
}
