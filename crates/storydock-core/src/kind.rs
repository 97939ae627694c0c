//! Panel and detail entity kinds.
//!
//! A [`PanelKind`] decides a panel's category directory, the `tag`
//! discriminant written into its document, the region it docks into when
//! first created, and whether bulky drawing data lives in a sibling document.
//!
//! A [`DetailKind`] decides the container key a nested entity is embedded
//! under inside its owner's document and which owners may hold it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::region::Region;

/// Content type of a top-level, placeable panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Character,
    Chapter,
    Note,
    Timeline,
    World,
    Map,
    Canvas,
}

impl PanelKind {
    pub const ALL: [Self; 7] = [
        Self::Character,
        Self::Chapter,
        Self::Note,
        Self::Timeline,
        Self::World,
        Self::Map,
        Self::Canvas,
    ];

    /// Directory (relative to the story root) holding this kind's documents.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::Character => "characters",
            Self::Chapter => "content",
            Self::Note => "notes",
            Self::Timeline => "timelines",
            Self::World => "world_building",
            Self::Map => "world_building/maps",
            Self::Canvas => "canvases",
        }
    }

    /// Discriminant stored in the document's `tag` field.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Chapter => "chapter",
            Self::Note => "note",
            Self::Timeline => "timeline",
            Self::World => "world",
            Self::Map => "map",
            Self::Canvas => "canvas",
        }
    }

    /// Inverse of [`tag`](Self::tag).
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Region a freshly created panel of this kind is pinned to.
    #[must_use]
    pub const fn default_region(self) -> Region {
        match self {
            Self::Character => Region::Left,
            Self::Note => Region::Right,
            Self::Timeline => Region::Bottom,
            Self::Chapter | Self::World | Self::Map | Self::Canvas => Region::Main,
        }
    }

    /// Kinds that keep drawing/shape data in a `<title>_canvas.json` sibling.
    #[must_use]
    pub const fn has_canvas(self) -> bool {
        matches!(self, Self::Map | Self::Canvas)
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Content type of a nested ("mini") entity owned by a panel or another detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    Branch,
    PlotPoint,
    Arc,
    SubMap,
    Marker,
    Comment,
}

impl DetailKind {
    pub const ALL: [Self; 6] = [
        Self::Branch,
        Self::PlotPoint,
        Self::Arc,
        Self::SubMap,
        Self::Marker,
        Self::Comment,
    ];

    /// Key under which children of this kind are embedded in their owner's map.
    #[must_use]
    pub const fn container_key(self) -> &'static str {
        match self {
            Self::Branch => "branches",
            Self::PlotPoint => "plot_points",
            Self::Arc => "arcs",
            Self::SubMap => "maps",
            Self::Marker => "markers",
            Self::Comment => "comments",
        }
    }

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::PlotPoint => "plot_point",
            Self::Arc => "arc",
            Self::SubMap => "sub_map",
            Self::Marker => "marker",
            Self::Comment => "comment",
        }
    }

    /// Whether a panel of `owner` kind may directly own this kind.
    #[must_use]
    pub const fn allowed_under_panel(self, owner: PanelKind) -> bool {
        match self {
            Self::Branch | Self::PlotPoint | Self::Arc => matches!(owner, PanelKind::Timeline),
            Self::SubMap | Self::Marker => matches!(owner, PanelKind::Map),
            Self::Comment => matches!(owner, PanelKind::Chapter | PanelKind::Note),
        }
    }

    /// Whether a detail of `owner` kind may directly own this kind.
    ///
    /// Branches nest inside branches and sub-maps inside sub-maps to any depth.
    #[must_use]
    pub const fn allowed_under_detail(self, owner: Self) -> bool {
        match self {
            Self::Branch | Self::PlotPoint | Self::Arc => matches!(owner, Self::Branch),
            Self::SubMap | Self::Marker => matches!(owner, Self::SubMap),
            Self::Comment => false,
        }
    }
}

impl fmt::Display for DetailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
