//! Required-field specs for every document shape.
//!
//! Adding a field here is the whole migration story: the next load of an
//! older document fills it in through [`reconcile`](crate::reconcile) and the
//! codec writes the repaired document back.

use storydock_core::{DetailKind, PanelKind};

use crate::reconcile::{RequiredFields, ValueKind};

/// Fields every panel document carries, whatever its kind.
fn panel_common(kind: PanelKind, title: &str) -> RequiredFields {
    RequiredFields::new()
        .literal("title", title)
        .literal("tag", kind.tag())
        .literal("pin_location", kind.default_region().as_str())
        .literal("visible", true)
}

/// Empty containers for every detail kind a panel of `kind` may own.
fn panel_containers(kind: PanelKind) -> RequiredFields {
    DetailKind::ALL
        .into_iter()
        .filter(|detail| detail.allowed_under_panel(kind))
        .fold(RequiredFields::new(), |spec, detail| {
            spec.empty(detail.container_key(), ValueKind::Mapping)
        })
}

fn detail_containers(kind: DetailKind) -> RequiredFields {
    DetailKind::ALL
        .into_iter()
        .filter(|child| child.allowed_under_detail(kind))
        .fold(RequiredFields::new(), |spec, child| {
            spec.empty(child.container_key(), ValueKind::Mapping)
        })
}

/// Spec for a top-level panel document titled `title`.
#[must_use]
pub fn panel_fields(kind: PanelKind, title: &str) -> RequiredFields {
    let specific = match kind {
        PanelKind::Character => RequiredFields::new()
            .literal("color", "primary")
            .empty("sex", ValueKind::String)
            .empty("age", ValueKind::String)
            .empty("physical_description", ValueKind::Mapping)
            .empty("personality", ValueKind::String)
            .empty("backstory", ValueKind::String)
            .empty("abilities", ValueKind::Sequence)
            .empty("family", ValueKind::Mapping)
            .literal("morality", "none")
            .empty("dead", ValueKind::Boolean),
        PanelKind::Chapter => RequiredFields::new()
            .empty("body", ValueKind::String)
            .empty("word_count", ValueKind::Integer)
            .empty("summary", ValueKind::String),
        PanelKind::Note => RequiredFields::new()
            .empty("body", ValueKind::String)
            .literal("color", "secondary"),
        PanelKind::Timeline => RequiredFields::new()
            .empty("start_date", ValueKind::String)
            .empty("end_date", ValueKind::String)
            .literal("color", "primary"),
        PanelKind::World => RequiredFields::new()
            .empty("description", ValueKind::String)
            .empty("history", ValueKind::String)
            .empty("lore", ValueKind::Mapping)
            .empty("locations", ValueKind::Sequence),
        PanelKind::Map => RequiredFields::new()
            .empty("description", ValueKind::String)
            .literal("zoom", 1.0),
        PanelKind::Canvas => RequiredFields::new()
            .literal("background", "#ffffff")
            .literal("zoom", 1.0),
    };
    panel_common(kind, title)
        .extend(specific)
        .extend(panel_containers(kind))
}

/// Spec for a detail entity embedded in its owner's document.
#[must_use]
pub fn detail_fields(kind: DetailKind, title: &str) -> RequiredFields {
    let common = RequiredFields::new()
        .literal("title", title)
        .literal("tag", kind.tag())
        .literal("visible", true);
    let specific = match kind {
        DetailKind::Branch => RequiredFields::new()
            .empty("description", ValueKind::String)
            .empty("start_date", ValueKind::String)
            .empty("end_date", ValueKind::String)
            .literal("color", "secondary"),
        DetailKind::PlotPoint => RequiredFields::new()
            .empty("description", ValueKind::String)
            .empty("date", ValueKind::String)
            .empty("position", ValueKind::Float),
        DetailKind::Arc => RequiredFields::new()
            .empty("description", ValueKind::String)
            .empty("start_date", ValueKind::String)
            .empty("end_date", ValueKind::String)
            .literal("color", "tertiary"),
        DetailKind::SubMap => RequiredFields::new()
            .empty("description", ValueKind::String)
            .literal("zoom", 1.0),
        DetailKind::Marker => RequiredFields::new()
            .empty("label", ValueKind::String)
            .empty("x", ValueKind::Float)
            .empty("y", ValueKind::Float),
        DetailKind::Comment => RequiredFields::new()
            .empty("body", ValueKind::String)
            .empty("author", ValueKind::String)
            .empty("resolved", ValueKind::Boolean),
    };
    common.extend(specific).extend(detail_containers(kind))
}

/// Settings document keys holding the stored side-region sizes.
pub const TOP_SIZE_KEY: &str = "top_pin_height";
pub const LEFT_SIZE_KEY: &str = "left_pin_width";
pub const RIGHT_SIZE_KEY: &str = "right_pin_width";
pub const BOTTOM_SIZE_KEY: &str = "bottom_pin_height";
/// Settings key remembering the selected main-region tab.
pub const MAIN_TAB_KEY: &str = "main_selected_tab";

/// Spec for the story-wide `settings.json` document.
#[must_use]
pub fn settings_fields(default_side_size: u16) -> RequiredFields {
    RequiredFields::new()
        .literal("theme_mode", "dark")
        .literal("theme_color", "blue")
        .literal("active_rail", "content")
        .empty("workspaces_rail_order", ValueKind::Sequence)
        .literal(TOP_SIZE_KEY, default_side_size)
        .literal(LEFT_SIZE_KEY, default_side_size)
        .literal(RIGHT_SIZE_KEY, default_side_size)
        .literal(BOTTOM_SIZE_KEY, default_side_size)
        .empty(MAIN_TAB_KEY, ValueKind::Integer)
}
