//! Panel lifecycle through the `Story` facade, checked against the files it
//! writes.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use storydock::{
    CancelReason, DetailKind, DragEffect, ErrorKind, MainContent, PanelKind, Region, ResizeStep,
    Story, StoryConfig, StoryError,
};

fn read(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn open(dir: &Path) -> Story {
    Story::open(dir, StoryConfig::default()).unwrap()
}

#[test]
fn duplicate_character_title_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    story.create_panel(PanelKind::Character, "Bob").unwrap();

    let err = story.create_panel(PanelKind::Character, "Bob").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateTitle);
    assert_eq!(story.panels_of_kind(PanelKind::Character).len(), 1);

    // Same title under another kind is fine.
    story.create_panel(PanelKind::Note, "Bob").unwrap();
}

#[test]
fn unopened_document_on_disk_blocks_create() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut story = open(dir.path());
        story.create_panel(PanelKind::Character, "Bob").unwrap();
    }
    let mut story = open(dir.path());
    let err = story.create_panel(PanelKind::Character, "Bob").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateTitle);

    let bob = story.open_panel(PanelKind::Character, "Bob").unwrap();
    assert_eq!(story.open_panel(PanelKind::Character, " Bob ").unwrap(), bob);
}

#[test]
fn dropping_onto_bottom_persists_the_new_region() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    story.create_panel(PanelKind::Chapter, "One").unwrap();
    let c = story.create_panel(PanelKind::Note, "Clues").unwrap();
    let other = story.create_panel(PanelKind::Note, "Suspects").unwrap();
    assert_eq!(story.visible_occupants(Region::Right), vec![c, other]);

    story.begin_drag(c).unwrap();
    assert!(story.overlays_visible());
    story.hover_drop_target(Some(Region::Bottom));
    let transition = story.drop_on(Region::Bottom).unwrap();
    assert!(matches!(
        transition.effect,
        DragEffect::Accepted { moved: true, .. }
    ));
    assert!(!story.overlays_visible());

    assert_eq!(story.region_of(c), Some(Region::Bottom));
    assert_eq!(story.visible_occupants(Region::Right), vec![other]);
    assert_eq!(story.layout().tree.divider_count(Region::Right), 0);

    let doc = read(&dir.path().join("notes/Clues.json"));
    assert_eq!(doc["pin_location"], "bottom");
}

#[test]
fn late_drop_is_cancelled_and_leaves_the_panel() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoryConfig::default();
    config.drag.cancel_timeout_ms = 50;
    let mut story = Story::open(dir.path(), config).unwrap();
    story.create_panel(PanelKind::Chapter, "One").unwrap();
    let clues = story.create_panel(PanelKind::Note, "Clues").unwrap();

    story.begin_drag(clues).unwrap();
    story.hover_drop_target(Some(Region::Bottom));
    thread::sleep(Duration::from_millis(200));
    let transition = story.drop_on(Region::Bottom).unwrap();
    assert!(matches!(
        transition.effect,
        DragEffect::Cancelled {
            reason: CancelReason::TimedOut,
            ..
        }
    ));
    assert!(!story.overlays_visible());
    assert_eq!(story.region_of(clues), Some(Region::Right));
    assert_eq!(read(&dir.path().join("notes/Clues.json"))["pin_location"], "right");
    assert!(story.pump().iter().all(|t| !t.ends_gesture()));
}

#[test]
fn canvas_titled_like_a_sibling_keeps_its_own_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    let tricky = story.create_panel(PanelKind::Canvas, "Sketch_canvas").unwrap();
    let sketch = story.create_panel(PanelKind::Canvas, "Sketch").unwrap();
    let mut canvas = story.canvas(sketch).unwrap();
    canvas.push(storydock::Stroke {
        points: vec![[1.0, 1.0], [2.0, 3.0]],
        color: "red".into(),
        width: 1.0,
    });
    story.save_canvas(sketch, &canvas).unwrap();
    assert!(story.diagnostics().is_empty());

    let doc = read(&dir.path().join("canvases/Sketch%5Fcanvas.json"));
    assert_eq!(doc["title"], "Sketch_canvas");
    assert!(doc.get("strokes").is_none());
    assert_eq!(story.canvas(tricky).unwrap().len(), 0);
    assert_eq!(story.canvas(sketch).unwrap(), canvas);

    drop(story);
    let mut story = open(dir.path());
    let tricky = story.open_panel(PanelKind::Canvas, "Sketch_canvas").unwrap();
    assert_eq!(story.panel_attributes(tricky).unwrap()["title"], "Sketch_canvas");
    assert!(story.diagnostics().is_empty());
}

#[test]
fn clamped_tab_selection_is_saved() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    let mut story = open(dir.path());
    story.create_panel(PanelKind::Chapter, "One").unwrap();
    story.create_panel(PanelKind::Chapter, "Two").unwrap();
    let three = story.create_panel(PanelKind::Chapter, "Three").unwrap();
    assert_eq!(story.select_tab(2), 2);
    assert_eq!(read(&settings)["main_selected_tab"], 2);

    story.delete_panel(three).unwrap();
    assert!(matches!(
        story.layout().tree.main,
        MainContent::Tabs { selected: 0, .. }
    ));
    assert_eq!(read(&settings)["main_selected_tab"], 0);
}

#[test]
fn deleting_a_panel_removes_its_files_and_relayouts() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    let map = story.create_panel(PanelKind::Map, "Realm").unwrap();
    let bob = story.create_panel(PanelKind::Character, "Bob").unwrap();
    let mut canvas = story.canvas(map).unwrap();
    canvas.push(storydock::Stroke {
        points: vec![[0.0, 0.0], [4.0, 2.0]],
        color: "#000000".into(),
        width: 2.0,
    });
    story.save_canvas(map, &canvas).unwrap();
    let doc_path = dir.path().join("world_building/maps/Realm.json");
    let canvas_path = dir.path().join("world_building/maps/Realm_canvas.json");
    assert!(doc_path.exists() && canvas_path.exists());

    let removed = story.delete_panel(map).unwrap();
    assert_eq!(removed, vec![map]);
    assert!(!doc_path.exists());
    assert!(!canvas_path.exists());

    // Bob was the only visible panel left, so main picks it up.
    assert_eq!(story.layout().tree.main, MainContent::Single { id: bob });
    assert_eq!(read(&dir.path().join("characters/Bob.json"))["pin_location"], "main");
}

#[test]
fn cascade_delete_rewrites_the_timeline_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    let saga = story.create_panel(PanelKind::Timeline, "Saga").unwrap();
    let main = story.create_detail(saga, DetailKind::Branch, "Main").unwrap();
    let side = story.create_detail(main, DetailKind::Branch, "Side").unwrap();
    let twist = story.create_detail(side, DetailKind::PlotPoint, "Twist").unwrap();
    story.create_detail(saga, DetailKind::Arc, "Rise").unwrap();

    let path = dir.path().join("timelines/Saga.json");
    let doc = read(&path);
    assert!(doc["branches"]["Main"]["branches"]["Side"]["plot_points"]["Twist"].is_object());

    let removed = story.delete_detail(main).unwrap();
    assert_eq!(removed, vec![main, side, twist]);
    assert!(!story.store().contains(twist));

    let doc = read(&path);
    assert_eq!(doc["branches"], serde_json::json!({}));
    assert!(doc["arcs"]["Rise"].is_object());
}

#[test]
fn moving_a_detail_saves_both_panels() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    let a = story.create_panel(PanelKind::Timeline, "A").unwrap();
    let b = story.create_panel(PanelKind::Timeline, "B").unwrap();
    let branch = story.create_detail(a, DetailKind::Branch, "Exile").unwrap();
    story
        .edit_detail(branch, |attrs| {
            attrs.insert("description".into(), Value::from("years abroad"));
        })
        .unwrap();

    story.move_detail(branch, b).unwrap();
    assert!(read(&dir.path().join("timelines/A.json"))["branches"]["Exile"].is_null());
    assert_eq!(
        read(&dir.path().join("timelines/B.json"))["branches"]["Exile"]["description"],
        "years abroad"
    );
}

#[test]
fn detail_lookup_creates_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    let chapter = story.create_panel(PanelKind::Chapter, "One").unwrap();
    let first = story.detail(chapter, DetailKind::Comment, "pacing").unwrap();
    let again = story.detail(chapter, DetailKind::Comment, "pacing").unwrap();
    assert_eq!(first, again);

    let err = story
        .create_detail(chapter, DetailKind::Marker, "X")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn rename_moves_document_and_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    let sketch = story.create_panel(PanelKind::Canvas, "Draft").unwrap();
    let canvas = story.canvas(sketch).unwrap();
    assert!(canvas.is_empty());

    story.rename_panel(sketch, "Final/v2").unwrap();
    assert!(!dir.path().join("canvases/Draft.json").exists());
    assert!(!dir.path().join("canvases/Draft_canvas.json").exists());
    let doc = read(&dir.path().join("canvases/Final%2Fv2.json"));
    assert_eq!(doc["title"], "Final/v2");
    assert!(dir.path().join("canvases/Final%2Fv2_canvas.json").exists());
}

#[test]
fn layout_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let area = storydock::Rect::from_size(1200, 800);
    {
        let mut story = open(dir.path());
        story.create_panel(PanelKind::Chapter, "One").unwrap();
        story.create_panel(PanelKind::Chapter, "Two").unwrap();
        let bob = story.create_panel(PanelKind::Character, "Bob").unwrap();
        story.set_visible(bob, false).unwrap();
        story.set_visible(bob, true).unwrap();

        assert_eq!(story.select_tab(1), 1);
        assert!(matches!(
            story.drag_divider(Region::Left, 40, 0, area).unwrap(),
            ResizeStep::Applied { from: 200, to: 240 }
        ));
        assert_eq!(story.finish_resize(Region::Left), Some(240));
    }

    let mut story = open(dir.path());
    assert_eq!(story.dimensions().left, 240);
    let one = story.open_panel(PanelKind::Chapter, "One").unwrap();
    let two = story.open_panel(PanelKind::Chapter, "Two").unwrap();
    let bob = story.open_panel(PanelKind::Character, "Bob").unwrap();
    assert_eq!(story.region_of(bob), Some(Region::Left));
    assert_eq!(story.is_visible(bob), Some(true));
    assert_eq!(
        story.layout().tree.main,
        MainContent::Tabs {
            tabs: vec![one, two],
            selected: 1,
        }
    );
    assert_eq!(story.solve(area).left.width, 240);
}

#[test]
fn resize_gesture_writes_settings_once_at_the_end() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    let mut story = open(dir.path());
    story.create_panel(PanelKind::Chapter, "One").unwrap();
    story.create_panel(PanelKind::Timeline, "Saga").unwrap();

    for _ in 0..5 {
        story.resize_by(Region::Bottom, 10, 800).unwrap();
    }
    assert_eq!(story.dimensions().bottom, 250);
    assert_eq!(read(&settings)["bottom_pin_height"], 200);

    assert_eq!(story.finish_resize(Region::Bottom), Some(250));
    assert_eq!(read(&settings)["bottom_pin_height"], 250);
    assert_eq!(story.finish_resize(Region::Bottom), None);

    // Past half the container: dropped whole.
    let step = story.resize_by(Region::Bottom, 200, 800).unwrap();
    assert_eq!(step, ResizeStep::Dropped { size: 250 });
    assert!(matches!(
        story.resize_by(Region::Main, 10, 800),
        Err(StoryError::Layout(_))
    ));
}

#[test]
fn per_item_callbacks_act_on_their_own_panel() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    story.create_panel(PanelKind::Chapter, "One").unwrap();
    let ids: Vec<_> = ["Ann", "Bob", "Cy"]
        .into_iter()
        .map(|title| story.create_panel(PanelKind::Character, title).unwrap())
        .collect();

    let mut hide_buttons: Vec<Box<dyn Fn(&mut Story)>> = Vec::new();
    for id in &ids {
        let id = *id;
        hide_buttons.push(Box::new(move |story: &mut Story| {
            story.set_visible(id, false).unwrap();
        }));
    }

    hide_buttons[1](&mut story);
    assert_eq!(story.is_visible(ids[0]), Some(true));
    assert_eq!(story.is_visible(ids[1]), Some(false));
    assert_eq!(story.is_visible(ids[2]), Some(true));
    assert_eq!(story.visible_occupants(Region::Left), vec![ids[0], ids[2]]);
}

#[test]
fn dropping_a_dragged_panel_cancels_the_gesture() {
    let dir = tempfile::tempdir().unwrap();
    let mut story = open(dir.path());
    story.create_panel(PanelKind::Chapter, "One").unwrap();
    let bob = story.create_panel(PanelKind::Character, "Bob").unwrap();
    story.begin_drag(bob).unwrap();
    story.delete_panel(bob).unwrap();
    assert!(!story.overlays_visible());
    assert!(matches!(
        story.drop_on(Region::Right),
        Err(StoryError::Layout(_))
    ));
}
