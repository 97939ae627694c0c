#![forbid(unsafe_code)]

//! Shared vocabulary for the storydock engine.
//!
//! Every other storydock crate speaks in these types: stable entity ids, the
//! five docking [`Region`]s, the panel and detail kinds that decide where a
//! document lives on disk, a small [`Rect`] for space allocation, and the
//! [`StoryConfig`] that tunes the engine at startup.

pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod kind;
pub mod region;

pub use config::{ConfigError, DragConfig, LayoutConfig, LoggingConfig, StoryConfig};
pub use error::ErrorKind;
pub use geometry::Rect;
pub use id::{EntityId, EntityIdAllocator};
pub use kind::{DetailKind, PanelKind};
pub use region::{Axis, Region, UnknownRegion};

/// Attribute map backing every entity and every on-disk document.
pub type AttributeMap = serde_json::Map<String, serde_json::Value>;
