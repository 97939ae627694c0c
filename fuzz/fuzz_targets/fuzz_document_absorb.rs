#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use storydock_core::{AttributeMap, PanelKind};
use storydock_store::EntityStore;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let Ok(Value::Object(doc)) = serde_json::from_slice::<Value>(payload) else {
        return;
    };
    let kind = PanelKind::ALL[usize::from(selector) % PanelKind::ALL.len()];

    let mut store = EntityStore::new();
    let Ok(id) = store.create_panel(kind, "Fuzz", AttributeMap::new()) else {
        return;
    };
    // Malformed entries are reported, never fatal.
    let report = store.absorb(id, doc).unwrap_or_else(|err| panic!("absorb failed: {err}"));
    assert_eq!(store.len(), report.created + 1);

    // What was absorbed embeds and absorbs again to the same shape.
    let embedded = store.embed(id).unwrap_or_else(|err| panic!("embed failed: {err}"));
    let mut again = EntityStore::new();
    let Ok(copy) = again.create_panel(kind, "Fuzz", AttributeMap::new()) else {
        return;
    };
    let second = again
        .absorb(copy, embedded.clone())
        .unwrap_or_else(|err| panic!("re-absorb failed: {err}"));
    assert!(second.skipped.is_empty());
    assert_eq!(again.embed(copy).ok().as_ref(), Some(&embedded));
});
