//! Property checks over random registry states and operation sequences.

use proptest::prelude::*;
use storydock_core::{EntityId, Region};
use storydock_layout::{LayoutEngine, PinRegistry, RegionDimensions};

#[derive(Debug, Clone)]
enum Op {
    Pin { raw: u64, region: Region, visible: bool },
    Move { raw: u64, region: Region },
    Toggle { raw: u64 },
    Unpin { raw: u64 },
}

fn region() -> impl Strategy<Value = Region> {
    prop::sample::select(Region::ALL.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1_u64..12, region(), any::<bool>())
            .prop_map(|(raw, region, visible)| Op::Pin { raw, region, visible }),
        (1_u64..12, region()).prop_map(|(raw, region)| Op::Move { raw, region }),
        (1_u64..12).prop_map(|raw| Op::Toggle { raw }),
        (1_u64..12).prop_map(|raw| Op::Unpin { raw }),
    ]
}

fn id(raw: u64) -> EntityId {
    EntityId::new(raw).unwrap()
}

/// Apply `op`, ignoring rejections the registry is expected to make.
fn apply(registry: &mut PinRegistry, op: &Op) {
    match *op {
        Op::Pin { raw, region, visible } => {
            let _ = registry.pin(id(raw), region, visible);
        }
        Op::Move { raw, region } => {
            let _ = registry.set_region(id(raw), region);
        }
        Op::Toggle { raw } => {
            if let Some(visible) = registry.is_visible(id(raw)) {
                registry.set_visible(id(raw), !visible).unwrap();
            }
        }
        Op::Unpin { raw } => {
            let _ = registry.unpin(id(raw));
        }
    }
}

proptest! {
    #[test]
    fn every_entity_is_visible_in_at_most_one_region(ops in prop::collection::vec(op(), 0..48)) {
        let mut registry = PinRegistry::new();
        let mut engine = LayoutEngine::default();
        let mut dims = RegionDimensions::default();
        for op in &ops {
            apply(&mut registry, op);
            let pass = engine.run(&mut registry, &mut dims, |_| true);
            for raw in 1..12 {
                let listed = Region::ALL
                    .iter()
                    .filter(|region| registry.visible_occupants(**region).contains(&id(raw)))
                    .count();
                prop_assert!(listed <= 1);
                let rendered = Region::ALL
                    .iter()
                    .filter(|region| pass.tree.panels_in(**region).contains(&id(raw)))
                    .count();
                prop_assert!(rendered <= 1);
            }
        }
    }

    #[test]
    fn main_is_filled_whenever_anything_is_visible(ops in prop::collection::vec(op(), 0..48)) {
        let mut registry = PinRegistry::new();
        let mut engine = LayoutEngine::default();
        let mut dims = RegionDimensions::default();
        for op in &ops {
            apply(&mut registry, op);
            let pass = engine.run(&mut registry, &mut dims, |_| true);
            if registry.total_visible() > 0 {
                prop_assert!(!registry.is_region_empty(Region::Main));
                prop_assert!(pass.tree.main.active().is_some());
            }
        }
    }

    #[test]
    fn side_regions_have_one_divider_fewer_than_panels(ops in prop::collection::vec(op(), 0..48)) {
        let mut registry = PinRegistry::new();
        let mut engine = LayoutEngine::default();
        let mut dims = RegionDimensions::default();
        for op in &ops {
            apply(&mut registry, op);
        }
        let pass = engine.run(&mut registry, &mut dims, |_| true);
        for region in Region::SIDES {
            let visible = registry.visible_occupants(region).len();
            prop_assert_eq!(pass.tree.divider_count(region), visible.saturating_sub(1));
            prop_assert_eq!(pass.tree.is_hidden(region), visible == 0);
        }
    }

    #[test]
    fn visible_sides_never_render_below_minimum(
        ops in prop::collection::vec(op(), 0..32),
        stored in 0_u16..400,
    ) {
        let mut registry = PinRegistry::new();
        let mut engine = LayoutEngine::new(200);
        let mut dims = RegionDimensions::uniform(stored);
        for op in &ops {
            apply(&mut registry, op);
        }
        let pass = engine.run(&mut registry, &mut dims, |_| true);
        for region in Region::SIDES {
            let side = pass.tree.side(region).unwrap();
            if !side.hidden {
                prop_assert!(side.size >= 200);
            }
        }
    }
}
