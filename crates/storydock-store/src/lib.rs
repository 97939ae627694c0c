#![forbid(unsafe_code)]

//! Entity arena, schema reconciliation, and document persistence.
//!
//! Panels and their nested detail entities live in one [`EntityStore`] arena
//! keyed by [`EntityId`](storydock_core::EntityId). Each panel persists to a
//! single JSON document in which its descendants are embedded inline
//! ([`EntityStore::embed`] / [`EntityStore::absorb`]); the [`DocumentCodec`]
//! reads and writes those documents and always passes them through the
//! [`reconcile`] pass before handing them out.

pub mod arena;
pub mod canvas;
pub mod codec;
pub mod error;
pub mod reconcile;
pub mod schema;

pub use arena::{AbsorbReport, EntityKind, EntityNode, EntityStore, Owner};
pub use canvas::{CanvasDocument, Stroke, StrokeBuffer};
pub use codec::{DocumentCodec, DocumentError, LoadOutcome, LoadStatus};
pub use error::StoreError;
pub use reconcile::{DefaultSpec, RequiredFields, ValueKind, reconcile, reconcile_in_place};
