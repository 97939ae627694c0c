#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use storydock_core::{EntityId, Rect, Region};
use storydock_layout::{
    DragController, LayoutEngine, MainContent, PinRegistry, RegionDimensions, ResizeController,
};

const MIN: u16 = 200;

#[derive(Debug, Arbitrary)]
enum Op {
    Pin { id: u8, region: u8, visible: bool },
    Unpin { id: u8 },
    Move { id: u8, region: u8 },
    SetVisible { id: u8, visible: bool },
    Kill { id: u8 },
    Resize { region: u8, delta: i16, extent: u16 },
    FinishResize { region: u8 },
    BeginDrag { id: u8 },
    Hover { region: Option<u8> },
    Drop { region: u8 },
    ReleaseOutside,
    SelectTab { index: u8 },
}

fn region(raw: u8) -> Region {
    Region::ALL[usize::from(raw) % Region::ALL.len()]
}

fn entity(raw: u8) -> EntityId {
    // Small id space so operations collide often.
    EntityId::new(u64::from(raw % 16) + 1).unwrap_or_else(|| unreachable!())
}

fuzz_target!(|ops: Vec<Op>| {
    let mut registry = PinRegistry::new();
    let mut dims = RegionDimensions::uniform(MIN);
    let mut engine = LayoutEngine::new(MIN);
    let mut resize = ResizeController::new(MIN);
    // Long timeout: the fuzzer never waits for the timer.
    let mut drag = DragController::new(Duration::from_secs(3600));
    let mut dead = [false; 17];

    for op in ops.into_iter().take(256) {
        match op {
            Op::Pin { id, region: r, visible } => {
                let _ = registry.pin(entity(id), region(r), visible);
                dead[entity(id).get() as usize] = false;
            }
            Op::Unpin { id } => {
                let _ = registry.unpin(entity(id));
            }
            Op::Move { id, region: r } => {
                let _ = registry.set_region(entity(id), region(r));
            }
            Op::SetVisible { id, visible } => {
                let _ = registry.set_visible(entity(id), visible);
            }
            Op::Kill { id } => dead[entity(id).get() as usize] = true,
            Op::Resize { region: r, delta, extent } => {
                let extent = extent.max(2 * MIN);
                let _ = resize.resize(&mut dims, region(r), i32::from(delta), extent);
            }
            Op::FinishResize { region: r } => {
                let _ = resize.finish(&dims, region(r));
            }
            Op::BeginDrag { id } => {
                if let Some(origin) = registry.region_of(entity(id)) {
                    drag.begin(entity(id), origin);
                }
            }
            Op::Hover { region: r } => {
                drag.hover(r.map(region));
            }
            Op::Drop { region: r } => {
                let _ = drag.drop_on(region(r), &mut registry);
            }
            Op::ReleaseOutside => {
                drag.release_outside();
            }
            Op::SelectTab { index } => {
                engine.select_tab(usize::from(index));
            }
        }

        let pass = engine.run(&mut registry, &mut dims, |id| !dead[id.get() as usize]);

        // Every entity appears in at most one region.
        let mut seen = Vec::new();
        for r in Region::ALL {
            for id in registry.occupants(r) {
                assert!(!seen.contains(id), "{id} pinned twice");
                seen.push(*id);
            }
        }
        // Main is never empty while anything is visible.
        if registry.total_visible() > 0 {
            assert!(pass.tree.main != MainContent::Empty, "main left empty");
        }
        if let MainContent::Tabs { tabs, selected } = &pass.tree.main {
            assert!(*selected < tabs.len());
        }
        for r in Region::SIDES {
            let side = pass.tree.side(r).unwrap_or_else(|| unreachable!());
            let shown = side.panels().count();
            assert_eq!(side.hidden, shown == 0);
            assert_eq!(side.divider_count(), shown.saturating_sub(1));
            if shown > 0 {
                assert!(side.size >= MIN);
            }
        }
        let rects = pass.tree.solve(Rect::from_size(1024, 768));
        assert!(rects.main.width <= 1024 && rects.main.height <= 768);
    }
});
