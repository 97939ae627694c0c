#![forbid(unsafe_code)]

//! Five-region docking layout.
//!
//! Panels are pinned to one of five regions (top, left, main, right, bottom)
//! in a [`PinRegistry`]. A [`LayoutEngine`] pass turns the registry into a
//! [`RegionTree`]: dividers between side-region siblings, tabs in main, empty
//! sides collapsed, and main never left empty while content exists. The
//! [`ResizeController`] adjusts side sizes from divider drags and the
//! [`DragController`] moves panels between regions.
//!
//! Nothing here performs I/O. Callers persist what the returned values say
//! changed: promotions, accepted drops, finished resizes.

pub mod dimensions;
pub mod drag;
pub mod engine;
pub mod error;
pub mod registry;
pub mod resize;
mod timer;

pub use dimensions::RegionDimensions;
pub use drag::{
    CancelReason, DragController, DragEffect, DragMessage, DragNoopReason, DragState,
    DragTransition, GestureId,
};
pub use engine::{
    LayoutEngine, LayoutPass, MainContent, Promotion, RegionElement, RegionRects, RegionTree,
    SideRegion,
};
pub use error::LayoutError;
pub use registry::PinRegistry;
pub use resize::{ResizeController, ResizeStep, apply_delta, container_extent, delta_for_pointer};
