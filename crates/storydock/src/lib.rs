#![forbid(unsafe_code)]

//! Docking layout and document persistence for story authoring tools.
//!
//! A [`Story`] is one project directory: `settings.json` at the root and one
//! JSON document per panel under a folder named for its kind. Panels are
//! pinned to one of five regions and re-laid out after every change; nested
//! details (timeline branches, map markers, comments) are embedded in their
//! panel's document.
//!
//! ```no_run
//! use storydock::{PanelKind, Region, Story, StoryConfig};
//!
//! # fn main() -> Result<(), storydock::StoryError> {
//! let mut story = Story::open("my-novel", StoryConfig::default())?;
//! story.create_panel(PanelKind::Chapter, "Chapter One")?;
//! let bob = story.create_panel(PanelKind::Character, "Bob")?;
//! assert_eq!(story.region_of(bob), Some(Region::Left));
//!
//! story.begin_drag(bob)?;
//! story.hover_drop_target(Some(Region::Right));
//! story.drop_on(Region::Right)?;
//! assert_eq!(story.region_of(bob), Some(Region::Right));
//! # Ok(())
//! # }
//! ```
//!
//! Sub-crates are re-exported for callers that need the lower layers
//! directly.

pub mod diagnostics;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;
mod settings;
pub mod story;

pub use storydock_core as core;
pub use storydock_layout as layout;
pub use storydock_store as store;

pub use diagnostics::Diagnostic;
pub use error::StoryError;
pub use story::Story;

pub use storydock_core::{
    AttributeMap, DetailKind, EntityId, ErrorKind, PanelKind, Rect, Region, StoryConfig,
};
pub use storydock_layout::{
    CancelReason, DragEffect, DragState, DragTransition, LayoutPass, MainContent, RegionTree,
    ResizeStep,
};
pub use storydock_store::{CanvasDocument, Stroke, StrokeBuffer};
