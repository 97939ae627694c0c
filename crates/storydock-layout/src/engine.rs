//! Layout passes: registry state in, renderable region tree out.
//!
//! Each pass
//!
//! 1. prunes occupants whose entity no longer exists,
//! 2. promotes one side occupant into `main` when main is empty but content
//!    exists elsewhere (top first, then left, right, bottom),
//! 3. rebuilds every side region's element list from scratch, with a divider
//!    between each adjacent pair of visible panels,
//! 4. renders main as a single panel or as tabs with a clamped selection,
//! 5. hides empty side regions and raises every other side region to the
//!    minimum size.
//!
//! A pass never fails. Inconsistent input is repaired and reported in the
//! returned [`LayoutPass`].

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use storydock_core::{EntityId, Rect, Region};

use crate::dimensions::RegionDimensions;
use crate::registry::PinRegistry;

/// One item of a side region's rendered content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum RegionElement {
    Panel { id: EntityId },
    /// Resize handle between two adjacent panels.
    Divider { before: EntityId, after: EntityId },
}

/// Rendered state of a side region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideRegion {
    pub region: Region,
    pub elements: Vec<RegionElement>,
    /// Size to render at; zero when hidden.
    pub size: u16,
    /// Empty regions are collapsed and take no space.
    pub hidden: bool,
}

impl SideRegion {
    fn build(region: Region, visible: &[EntityId], stored_size: u16) -> Self {
        let mut elements = Vec::with_capacity(visible.len().saturating_mul(2));
        for (index, id) in visible.iter().enumerate() {
            if index > 0 {
                elements.push(RegionElement::Divider {
                    before: visible[index - 1],
                    after: *id,
                });
            }
            elements.push(RegionElement::Panel { id: *id });
        }
        let hidden = visible.is_empty();
        Self {
            region,
            elements,
            size: if hidden { 0 } else { stored_size },
            hidden,
        }
    }

    /// Panels in display order.
    pub fn panels(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.elements.iter().filter_map(|element| match element {
            RegionElement::Panel { id } => Some(*id),
            RegionElement::Divider { .. } => None,
        })
    }

    #[must_use]
    pub fn divider_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|element| matches!(element, RegionElement::Divider { .. }))
            .count()
    }
}

/// Rendered state of the main region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "content", rename_all = "snake_case")]
pub enum MainContent {
    /// Nothing is visible anywhere.
    Empty,
    Single { id: EntityId },
    Tabs { tabs: Vec<EntityId>, selected: usize },
}

impl MainContent {
    /// Panels in tab order.
    #[must_use]
    pub fn panels(&self) -> &[EntityId] {
        match self {
            Self::Empty => &[],
            Self::Single { id } => std::slice::from_ref(id),
            Self::Tabs { tabs, .. } => tabs,
        }
    }

    /// The panel currently shown.
    #[must_use]
    pub fn active(&self) -> Option<EntityId> {
        match self {
            Self::Empty => None,
            Self::Single { id } => Some(*id),
            Self::Tabs { tabs, selected } => tabs.get(*selected).copied(),
        }
    }
}

/// Rectangles allocated to each region by [`RegionTree::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionRects {
    pub top: Rect,
    pub left: Rect,
    pub main: Rect,
    pub right: Rect,
    pub bottom: Rect,
}

impl RegionRects {
    #[must_use]
    pub const fn get(&self, region: Region) -> Rect {
        match region {
            Region::Top => self.top,
            Region::Left => self.left,
            Region::Main => self.main,
            Region::Right => self.right,
            Region::Bottom => self.bottom,
        }
    }
}

/// Renderable output of one layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTree {
    pub top: SideRegion,
    pub left: SideRegion,
    pub main: MainContent,
    pub right: SideRegion,
    pub bottom: SideRegion,
}

impl RegionTree {
    /// The side region record, `None` for main.
    #[must_use]
    pub const fn side(&self, region: Region) -> Option<&SideRegion> {
        match region {
            Region::Top => Some(&self.top),
            Region::Left => Some(&self.left),
            Region::Right => Some(&self.right),
            Region::Bottom => Some(&self.bottom),
            Region::Main => None,
        }
    }

    /// Visible panels rendered in `region`, in display order.
    #[must_use]
    pub fn panels_in(&self, region: Region) -> Vec<EntityId> {
        match self.side(region) {
            Some(side) => side.panels().collect(),
            None => self.main.panels().to_vec(),
        }
    }

    #[must_use]
    pub fn divider_count(&self, region: Region) -> usize {
        self.side(region).map_or(0, SideRegion::divider_count)
    }

    #[must_use]
    pub fn is_hidden(&self, region: Region) -> bool {
        match self.side(region) {
            Some(side) => side.hidden,
            None => matches!(self.main, MainContent::Empty),
        }
    }

    /// Region in which `id` is rendered, if it is rendered at all.
    #[must_use]
    pub fn region_of(&self, id: EntityId) -> Option<Region> {
        Region::ALL
            .into_iter()
            .find(|region| self.panels_in(*region).contains(&id))
    }

    /// Allocate rectangles within `area`.
    ///
    /// Top and bottom span the full width; left and right fill the band
    /// between them; main takes the rest. Hidden regions get a zero-size
    /// rectangle and no space. A side never takes more than what is left
    /// after the regions allocated before it (top, bottom, left, right).
    #[must_use]
    pub fn solve(&self, area: Rect) -> RegionRects {
        let top_h = visible_size(&self.top).min(area.height);
        let bottom_h = visible_size(&self.bottom).min(area.height - top_h);
        let band_y = area.y.saturating_add(top_h);
        let band_h = area.height - top_h - bottom_h;

        let left_w = visible_size(&self.left).min(area.width);
        let right_w = visible_size(&self.right).min(area.width - left_w);
        let main_x = area.x.saturating_add(left_w);
        let main_w = area.width - left_w - right_w;

        RegionRects {
            top: Rect::new(area.x, area.y, area.width, top_h),
            bottom: Rect::new(area.x, band_y.saturating_add(band_h), area.width, bottom_h),
            left: Rect::new(area.x, band_y, left_w, band_h),
            right: Rect::new(main_x.saturating_add(main_w), band_y, right_w, band_h),
            main: Rect::new(main_x, band_y, main_w, band_h),
        }
    }
}

fn visible_size(side: &SideRegion) -> u16 {
    if side.hidden { 0 } else { side.size }
}

/// An occupant moved into main by the orphan rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: EntityId,
    pub from: Region,
}

/// Everything one pass produced or repaired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPass {
    pub tree: RegionTree,
    /// Region changes made by the orphan rule; callers persist these.
    pub promotions: Vec<Promotion>,
    /// Occupants dropped because their entity no longer exists.
    pub pruned: Vec<EntityId>,
    /// Side regions whose stored size was raised to the minimum, with the
    /// size they had before.
    pub raised: Vec<(Region, u16)>,
}

/// Deterministic layout pass runner.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    min_region_size: u16,
    selected_tab: usize,
    /// Tab count of main in the latest pass.
    main_tabs: usize,
    /// Dangling ids already logged, so each is reported once.
    reported: FxHashSet<EntityId>,
    passes: u64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(storydock_core::config::DEFAULT_MIN_REGION_SIZE)
    }
}

impl LayoutEngine {
    #[must_use]
    pub fn new(min_region_size: u16) -> Self {
        Self {
            min_region_size,
            selected_tab: 0,
            main_tabs: 0,
            reported: FxHashSet::default(),
            passes: 0,
        }
    }

    #[must_use]
    pub const fn min_region_size(&self) -> u16 {
        self.min_region_size
    }

    #[must_use]
    pub const fn selected_tab(&self) -> usize {
        self.selected_tab
    }

    /// Number of passes run so far.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Select a main-region tab.
    ///
    /// Out-of-range indices select the first tab, the same clamp every pass
    /// applies. Returns the index now selected.
    pub fn select_tab(&mut self, index: usize) -> usize {
        self.selected_tab = if index < self.main_tabs { index } else { 0 };
        self.selected_tab
    }

    /// Restore a remembered selection without clamping; the next pass clamps.
    pub fn restore_tab(&mut self, index: usize) {
        self.selected_tab = index;
    }

    /// Run one pass over `registry`.
    ///
    /// `exists` reports whether an entity is still alive; occupants for which
    /// it returns `false` are pruned from the registry.
    pub fn run(
        &mut self,
        registry: &mut PinRegistry,
        dimensions: &mut RegionDimensions,
        exists: impl Fn(EntityId) -> bool,
    ) -> LayoutPass {
        self.passes += 1;

        let pruned = registry.retain(|id| exists(id));
        for id in &pruned {
            if self.reported.insert(*id) {
                tracing::warn!(%id, "pruned region occupant referencing a missing entity");
            }
        }

        let promotions = promote_orphans(registry);

        let mut raised = Vec::new();
        let mut side = |region: Region| {
            let visible = registry.visible_occupants(region);
            if !visible.is_empty() {
                if let Some(before) = dimensions.enforce_minimum(region, self.min_region_size) {
                    raised.push((region, before));
                }
            }
            SideRegion::build(region, &visible, dimensions.get(region).unwrap_or(0))
        };
        let top = side(Region::Top);
        let left = side(Region::Left);
        let right = side(Region::Right);
        let bottom = side(Region::Bottom);

        let main_visible = registry.visible_occupants(Region::Main);
        self.main_tabs = main_visible.len();
        let main = match main_visible.as_slice() {
            [] => MainContent::Empty,
            [only] => MainContent::Single { id: *only },
            _ => {
                if self.selected_tab >= main_visible.len() {
                    self.selected_tab = 0;
                }
                MainContent::Tabs {
                    tabs: main_visible,
                    selected: self.selected_tab,
                }
            }
        };

        tracing::debug!(
            pass = self.passes,
            pruned = pruned.len(),
            promoted = promotions.len(),
            raised = raised.len(),
            main_tabs = self.main_tabs,
            "layout pass"
        );

        LayoutPass {
            tree: RegionTree {
                top,
                left,
                main,
                right,
                bottom,
            },
            promotions,
            pruned,
            raised,
        }
    }
}

/// Move one side occupant into main when main shows nothing but content
/// exists elsewhere.
fn promote_orphans(registry: &mut PinRegistry) -> Vec<Promotion> {
    if !registry.is_region_empty(Region::Main) || registry.total_visible() == 0 {
        return Vec::new();
    }
    for from in Region::PROMOTION_ORDER {
        if let Some(id) = registry.visible_occupants(from).first().copied() {
            // Known id taken from the registry itself.
            if registry.set_region(id, Region::Main).is_ok() {
                tracing::debug!(%id, %from, "promoted orphan into main");
                return vec![Promotion { id, from }];
            }
        }
    }

    // Visible content exists but no side region lists it: move every visible
    // entity to main so the work surface is not left empty.
    let mut promotions = Vec::new();
    for from in Region::SIDES {
        for id in registry.visible_occupants(from) {
            if registry.set_region(id, Region::Main).is_ok() {
                promotions.push(Promotion { id, from });
            }
        }
    }
    promotions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    fn run(registry: &mut PinRegistry) -> LayoutPass {
        let mut dims = RegionDimensions::default();
        LayoutEngine::default().run(registry, &mut dims, |_| true)
    }

    #[test]
    fn first_top_occupant_is_promoted() {
        let mut registry = PinRegistry::new();
        registry.pin(id(1), Region::Top, true).unwrap();
        registry.pin(id(2), Region::Top, true).unwrap();
        let pass = run(&mut registry);
        assert_eq!(pass.tree.main, MainContent::Single { id: id(1) });
        assert_eq!(pass.tree.panels_in(Region::Top), vec![id(2)]);
        assert_eq!(
            pass.promotions,
            vec![Promotion {
                id: id(1),
                from: Region::Top
            }]
        );
    }

    #[test]
    fn promotion_order_is_top_left_right_bottom() {
        let mut registry = PinRegistry::new();
        registry.pin(id(1), Region::Bottom, true).unwrap();
        registry.pin(id(2), Region::Right, true).unwrap();
        registry.pin(id(3), Region::Left, true).unwrap();
        let pass = run(&mut registry);
        assert_eq!(pass.tree.main.active(), Some(id(3)));
    }

    #[test]
    fn hidden_occupants_are_never_promoted() {
        let mut registry = PinRegistry::new();
        registry.pin(id(1), Region::Top, false).unwrap();
        let pass = run(&mut registry);
        assert_eq!(pass.tree.main, MainContent::Empty);
        assert!(pass.promotions.is_empty());
        assert!(pass.tree.top.hidden);
    }

    #[test]
    fn dividers_sit_between_adjacent_panels() {
        let mut registry = PinRegistry::new();
        registry.pin(id(9), Region::Main, true).unwrap();
        for raw in 1..=3 {
            registry.pin(id(raw), Region::Left, true).unwrap();
        }
        let pass = run(&mut registry);
        assert_eq!(
            pass.tree.left.elements,
            vec![
                RegionElement::Panel { id: id(1) },
                RegionElement::Divider {
                    before: id(1),
                    after: id(2)
                },
                RegionElement::Panel { id: id(2) },
                RegionElement::Divider {
                    before: id(2),
                    after: id(3)
                },
                RegionElement::Panel { id: id(3) },
            ]
        );
        assert_eq!(pass.tree.divider_count(Region::Right), 0);
    }

    #[test]
    fn tab_selection_is_clamped() {
        let mut registry = PinRegistry::new();
        for raw in 1..=3 {
            registry.pin(id(raw), Region::Main, true).unwrap();
        }
        let mut engine = LayoutEngine::default();
        let mut dims = RegionDimensions::default();
        engine.restore_tab(2);
        let pass = engine.run(&mut registry, &mut dims, |_| true);
        assert_eq!(pass.tree.main.active(), Some(id(3)));

        registry.unpin(id(3)).unwrap();
        let pass = engine.run(&mut registry, &mut dims, |_| true);
        assert_eq!(
            pass.tree.main,
            MainContent::Tabs {
                tabs: vec![id(1), id(2)],
                selected: 0
            }
        );
        assert_eq!(engine.select_tab(1), 1);
        assert_eq!(engine.select_tab(7), 0);
    }

    #[test]
    fn undersized_region_is_raised_only_when_visible() {
        let mut registry = PinRegistry::new();
        registry.pin(id(1), Region::Main, true).unwrap();
        registry.pin(id(2), Region::Left, true).unwrap();
        let mut dims = RegionDimensions::uniform(150);
        let pass = LayoutEngine::new(200).run(&mut registry, &mut dims, |_| true);
        assert_eq!(dims.left, 200);
        assert_eq!(dims.right, 150);
        assert_eq!(pass.tree.left.size, 200);
        assert_eq!(pass.raised, vec![(Region::Left, 150)]);
        assert_eq!(pass.tree.right.size, 0);
    }

    #[test]
    fn dangling_occupants_are_pruned() {
        let mut registry = PinRegistry::new();
        registry.pin(id(1), Region::Main, true).unwrap();
        registry.pin(id(2), Region::Left, true).unwrap();
        let mut dims = RegionDimensions::default();
        let pass = LayoutEngine::default().run(&mut registry, &mut dims, |id| id.get() != 2);
        assert_eq!(pass.pruned, vec![id(2)]);
        assert!(!registry.contains(id(2)));
        assert!(pass.tree.left.hidden);
    }

    #[test]
    fn solve_skips_hidden_regions() {
        let mut registry = PinRegistry::new();
        registry.pin(id(1), Region::Main, true).unwrap();
        registry.pin(id(2), Region::Left, true).unwrap();
        registry.pin(id(3), Region::Top, true).unwrap();
        let pass = run(&mut registry);
        let rects = pass.tree.solve(Rect::new(0, 0, 1000, 800));
        assert_eq!(rects.top, Rect::new(0, 0, 1000, 200));
        assert_eq!(rects.left, Rect::new(0, 200, 200, 600));
        assert_eq!(rects.main, Rect::new(200, 200, 800, 600));
        assert!(rects.right.is_empty());
        assert!(rects.bottom.is_empty());
    }

    #[test]
    fn solve_caps_sizes_to_available_space() {
        let mut registry = PinRegistry::new();
        registry.pin(id(1), Region::Main, true).unwrap();
        registry.pin(id(2), Region::Left, true).unwrap();
        registry.pin(id(3), Region::Right, true).unwrap();
        let pass = run(&mut registry);
        let rects = pass.tree.solve(Rect::new(0, 0, 300, 100));
        assert_eq!(rects.left.width, 200);
        assert_eq!(rects.right.width, 100);
        assert_eq!(rects.main.width, 0);
    }
}
