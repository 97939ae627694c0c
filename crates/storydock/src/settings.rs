//! Layout values kept in `settings.json`.

use serde_json::Value;
use storydock_core::AttributeMap;
use storydock_layout::RegionDimensions;
use storydock_store::schema::{
    BOTTOM_SIZE_KEY, LEFT_SIZE_KEY, MAIN_TAB_KEY, RIGHT_SIZE_KEY, TOP_SIZE_KEY,
};

fn read_size(settings: &AttributeMap, key: &str, fallback: u16) -> u16 {
    let Some(value) = settings.get(key) else {
        return fallback;
    };
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.round() as u64)
        })
        .and_then(|raw| u16::try_from(raw).ok())
        .unwrap_or(fallback)
}

/// Side sizes stored in `settings`, `fallback` for any missing or invalid one.
pub(crate) fn dimensions_from(settings: &AttributeMap, fallback: u16) -> RegionDimensions {
    RegionDimensions {
        top: read_size(settings, TOP_SIZE_KEY, fallback),
        left: read_size(settings, LEFT_SIZE_KEY, fallback),
        right: read_size(settings, RIGHT_SIZE_KEY, fallback),
        bottom: read_size(settings, BOTTOM_SIZE_KEY, fallback),
    }
}

/// Returns whether any stored value changed.
pub(crate) fn write_dimensions(settings: &mut AttributeMap, dims: &RegionDimensions) -> bool {
    let mut changed = false;
    for (key, size) in [
        (TOP_SIZE_KEY, dims.top),
        (LEFT_SIZE_KEY, dims.left),
        (RIGHT_SIZE_KEY, dims.right),
        (BOTTOM_SIZE_KEY, dims.bottom),
    ] {
        let value = Value::from(size);
        if settings.get(key) != Some(&value) {
            settings.insert(key.to_owned(), value);
            changed = true;
        }
    }
    changed
}

pub(crate) fn selected_tab(settings: &AttributeMap) -> usize {
    settings
        .get(MAIN_TAB_KEY)
        .and_then(Value::as_u64)
        .and_then(|raw| usize::try_from(raw).ok())
        .unwrap_or(0)
}

pub(crate) fn write_selected_tab(settings: &mut AttributeMap, index: usize) -> bool {
    let value = Value::from(index);
    if settings.get(MAIN_TAB_KEY) == Some(&value) {
        return false;
    }
    settings.insert(MAIN_TAB_KEY.to_owned(), value);
    true
}
