//! The five docking regions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the five fixed docking areas around (and including) the work surface.
///
/// Stored in documents as the `pin_location` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Top,
    Left,
    Main,
    Right,
    Bottom,
}

/// Which stored dimension a side region resizes along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Top/bottom regions store a height.
    Height,
    /// Left/right regions store a width.
    Width,
}

impl Region {
    /// All regions in display order.
    pub const ALL: [Self; 5] = [Self::Top, Self::Left, Self::Main, Self::Right, Self::Bottom];

    /// The four regions that carry a stored size.
    pub const SIDES: [Self; 4] = [Self::Top, Self::Left, Self::Right, Self::Bottom];

    /// Order in which side regions donate an occupant to an empty main region.
    pub const PROMOTION_ORDER: [Self; 4] = [Self::Top, Self::Left, Self::Right, Self::Bottom];

    /// Dense index into `[T; 5]` tables, matching [`Region::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Left => 1,
            Self::Main => 2,
            Self::Right => 3,
            Self::Bottom => 4,
        }
    }

    /// The stored dimension for side regions; `None` for main, which always
    /// fills the remaining space.
    #[must_use]
    pub const fn axis(self) -> Option<Axis> {
        match self {
            Self::Top | Self::Bottom => Some(Axis::Height),
            Self::Left | Self::Right => Some(Axis::Width),
            Self::Main => None,
        }
    }

    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Self::Main)
    }

    /// Stable lowercase name, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Left => "left",
            Self::Main => "main",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `pin_location` string that names none of the five regions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown region name {0:?}")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "main" => Ok(Self::Main),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            _ => Err(UnknownRegion(s.to_owned())),
        }
    }
}
