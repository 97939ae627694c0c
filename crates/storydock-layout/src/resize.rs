//! Divider drags on side regions.
//!
//! Each delta is checked on its own against `[minimum, extent / 2]`: a delta
//! that would leave the bound is dropped whole and the size stays put. The
//! controller remembers where each gesture started so that only the final
//! size is persisted, once, when the gesture ends.

use storydock_core::{Axis, Rect, Region};

use crate::dimensions::RegionDimensions;
use crate::error::LayoutError;

/// Result of one [`apply_delta`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeStep {
    Applied { from: u16, to: u16 },
    /// The delta would have left the allowed range; `size` is unchanged.
    Dropped { size: u16 },
}

impl ResizeStep {
    #[must_use]
    pub const fn size(self) -> u16 {
        match self {
            Self::Applied { to, .. } => to,
            Self::Dropped { size } => size,
        }
    }
}

/// Add `delta` to `region`'s stored size if the result stays within
/// `[minimum, container_extent / 2]`.
pub fn apply_delta(
    dimensions: &mut RegionDimensions,
    region: Region,
    delta: i32,
    minimum: u16,
    container_extent: u16,
) -> Result<ResizeStep, LayoutError> {
    let current = dimensions
        .get(region)
        .ok_or(LayoutError::NotResizable { region })?;
    let maximum = i64::from(container_extent / 2);
    let proposed = i64::from(current) + i64::from(delta);
    if delta == 0 || proposed < i64::from(minimum) || proposed > maximum {
        return Ok(ResizeStep::Dropped { size: current });
    }
    let Ok(to) = u16::try_from(proposed) else {
        return Ok(ResizeStep::Dropped { size: current });
    };
    dimensions.set(region, to)?;
    Ok(ResizeStep::Applied { from: current, to })
}

/// Extent of the container a side region resizes within: the height of
/// `area` for top and bottom, the width for left and right.
#[must_use]
pub fn container_extent(region: Region, area: Rect) -> Option<u16> {
    match region.axis()? {
        Axis::Height => Some(area.height),
        Axis::Width => Some(area.width),
    }
}

/// Convert pointer motion on a region's divider into a size delta.
///
/// Moving the divider away from the region's window edge grows it: down for
/// top, right for left, left for right, up for bottom.
#[must_use]
pub fn delta_for_pointer(region: Region, dx: i32, dy: i32) -> Option<i32> {
    match region {
        Region::Top => Some(dy),
        Region::Bottom => Some(dy.saturating_neg()),
        Region::Left => Some(dx),
        Region::Right => Some(dx.saturating_neg()),
        Region::Main => None,
    }
}

/// Tracks open resize gestures so each persists once.
#[derive(Debug, Clone, Default)]
pub struct ResizeController {
    minimum: u16,
    /// Size at the first applied delta of the open gesture, per side region.
    started: [Option<u16>; 5],
}

impl ResizeController {
    #[must_use]
    pub fn new(minimum: u16) -> Self {
        Self {
            minimum,
            started: [None; 5],
        }
    }

    #[must_use]
    pub const fn minimum(&self) -> u16 {
        self.minimum
    }

    /// Apply one divider movement.
    pub fn resize(
        &mut self,
        dimensions: &mut RegionDimensions,
        region: Region,
        delta: i32,
        container_extent: u16,
    ) -> Result<ResizeStep, LayoutError> {
        let step = apply_delta(dimensions, region, delta, self.minimum, container_extent)?;
        if let ResizeStep::Applied { from, .. } = step {
            self.started[region.index()].get_or_insert(from);
        }
        Ok(step)
    }

    /// Apply raw pointer motion on `region`'s divider.
    pub fn drag_divider(
        &mut self,
        dimensions: &mut RegionDimensions,
        region: Region,
        dx: i32,
        dy: i32,
        area: Rect,
    ) -> Result<ResizeStep, LayoutError> {
        let (Some(delta), Some(extent)) =
            (delta_for_pointer(region, dx, dy), container_extent(region, area))
        else {
            return Err(LayoutError::NotResizable { region });
        };
        self.resize(dimensions, region, delta, extent)
    }

    /// Close the gesture on `region`.
    ///
    /// Returns the size to persist, or `None` when the gesture ended where it
    /// started (or never changed anything).
    pub fn finish(&mut self, dimensions: &RegionDimensions, region: Region) -> Option<u16> {
        let start = self.started.get_mut(region.index())?.take()?;
        let end = dimensions.get(region)?;
        let changed = start != end;
        tracing::debug!(%region, start, end, changed, "resize finished");
        changed.then_some(end)
    }

    #[must_use]
    pub fn is_resizing(&self, region: Region) -> bool {
        self.started[region.index()].is_some()
    }
}
