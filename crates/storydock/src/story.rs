//! The story context: one open project and everything wired to it.
//!
//! A [`Story`] owns the entity arena, the pin registry, the layout engine and
//! both gesture controllers, and it is the only thing that talks to the
//! document codec. Every operation that mutates state ends with a layout
//! pass; panels whose region changed in that pass are saved.
//!
//! Documents are saved synchronously. A failed save or an unreadable
//! document never turns into an error for the caller: it is logged, kept in
//! [`Story::diagnostics`], and the story carries on with what it has in
//! memory.

use std::path::{Path, PathBuf};

use serde_json::Value;
use storydock_core::{
    AttributeMap, ConfigError, DetailKind, EntityId, ErrorKind, PanelKind, Rect, Region,
    StoryConfig,
};
use storydock_layout::{
    DragController, DragEffect, DragState, DragTransition, LayoutEngine, LayoutError, LayoutPass,
    MainContent, PinRegistry, RegionDimensions, RegionRects, ResizeController, ResizeStep,
};
use storydock_store::schema::{detail_fields, panel_fields, settings_fields};
use storydock_store::{
    CanvasDocument, DocumentCodec, DocumentError, EntityStore, LoadStatus, StoreError, reconcile,
};

use crate::diagnostics::Diagnostic;
use crate::error::StoryError;
use crate::settings;

/// One open story.
#[derive(Debug)]
pub struct Story {
    config: StoryConfig,
    codec: DocumentCodec,
    store: EntityStore,
    registry: PinRegistry,
    dimensions: RegionDimensions,
    engine: LayoutEngine,
    resize: ResizeController,
    drag: DragController,
    settings: AttributeMap,
    layout: LayoutPass,
    diagnostics: Vec<Diagnostic>,
    /// Panels whose corrupt original could not be moved aside. Their
    /// document path still holds it, so they are never saved over.
    held: Vec<EntityId>,
    /// Same for `settings.json`.
    settings_held: bool,
}

/// Whether a recovery left the corrupt original at its path.
fn left_in_place(status: &LoadStatus) -> bool {
    matches!(status, LoadStatus::Recovered { preserved: None, .. })
}

fn outcome_diagnostic(path: &Path, status: &LoadStatus) -> Option<Diagnostic> {
    match status {
        LoadStatus::Recovered { reason, preserved } => {
            let message = match preserved {
                Some(aside) => format!(
                    "{reason}; replaced by defaults, original kept at {}",
                    aside.display()
                ),
                None => format!("{reason}; using defaults, original left in place"),
            };
            Some(Diagnostic::new(
                ErrorKind::DocumentCorrupt,
                Some(path.to_path_buf()),
                message,
            ))
        }
        LoadStatus::Repaired { filled } => {
            tracing::debug!(path = %path.display(), filled = ?filled, "document completed");
            None
        }
        LoadStatus::Loaded | LoadStatus::Created => None,
    }
}

fn document_diagnostic(err: &DocumentError) -> Diagnostic {
    Diagnostic::new(err.kind(), Some(err.path().to_path_buf()), err.to_string())
}

impl Story {
    /// Open the story rooted at `root`, creating `settings.json` if needed.
    ///
    /// Fails only when `config` does not validate.
    pub fn open(root: impl Into<PathBuf>, config: StoryConfig) -> Result<Self, StoryError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors).into());
        }

        let codec = DocumentCodec::new(root);
        let mut diagnostics = Vec::new();
        let spec = settings_fields(config.layout.default_side_size);
        let path = codec.settings_path();
        let mut settings_held = false;
        let settings = match codec.load_or_create(&path, &spec) {
            Ok(outcome) => {
                settings_held = left_in_place(&outcome.status);
                diagnostics.extend(outcome_diagnostic(&path, &outcome.status));
                outcome.document
            }
            Err(err) => {
                diagnostics.push(document_diagnostic(&err));
                reconcile(AttributeMap::new(), &spec)
            }
        };
        for diagnostic in &diagnostics {
            tracing::warn!(kind = ?diagnostic.kind, message = %diagnostic.message, "settings recovered");
        }

        let mut dimensions =
            settings::dimensions_from(&settings, config.layout.default_side_size);
        let mut engine = LayoutEngine::new(config.layout.min_region_size);
        engine.restore_tab(settings::selected_tab(&settings));
        let mut registry = PinRegistry::new();
        let layout = engine.run(&mut registry, &mut dimensions, |_| false);

        tracing::info!(root = %codec.root().display(), "story opened");
        Ok(Self {
            resize: ResizeController::new(config.layout.min_region_size),
            drag: DragController::new(config.drag.cancel_timeout()),
            config,
            codec,
            store: EntityStore::new(),
            registry,
            dimensions,
            engine,
            settings,
            layout,
            diagnostics,
            held: Vec::new(),
            settings_held,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &StoryConfig {
        &self.config
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.codec.root()
    }

    #[must_use]
    pub const fn store(&self) -> &EntityStore {
        &self.store
    }

    #[must_use]
    pub const fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn dimensions(&self) -> RegionDimensions {
        self.dimensions
    }

    /// The in-memory `settings.json` document.
    #[must_use]
    pub const fn settings(&self) -> &AttributeMap {
        &self.settings
    }

    /// Recoveries performed since the story was opened.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // ---------------------------------------------------------------------
    // Panels
    // ---------------------------------------------------------------------

    /// Create a new panel and its document.
    ///
    /// Rejects titles already used by a loaded panel of the same kind or by a
    /// document on disk that has not been opened; use
    /// [`open_panel`](Self::open_panel) for those.
    pub fn create_panel(&mut self, kind: PanelKind, title: &str) -> Result<EntityId, StoryError> {
        let title = title.trim();
        let path = self.codec.document_path(kind, title);
        self.ensure_free_on_disk(kind, title, &path)?;

        let document = reconcile(AttributeMap::new(), &panel_fields(kind, title));
        let id = self.admit_panel(kind, title, document, &path, false)?;
        self.save_panel(id);
        tracing::info!(%id, %kind, title, "panel created");
        self.relayout();
        Ok(id)
    }

    /// Load a panel's document, creating it if it does not exist.
    ///
    /// Returns the existing id when the panel is already loaded.
    pub fn open_panel(&mut self, kind: PanelKind, title: &str) -> Result<EntityId, StoryError> {
        let trimmed = title.trim();
        if let Some(id) = self.store.panel_by_title(kind, trimmed) {
            return Ok(id);
        }
        if trimmed.is_empty() {
            return Err(StoreError::InvalidTitle {
                title: title.to_owned(),
            }
            .into());
        }

        let path = self.codec.document_path(kind, trimmed);
        let spec = panel_fields(kind, trimmed);
        let mut held = false;
        let document = match self.codec.load_or_create(&path, &spec) {
            Ok(outcome) => {
                held = left_in_place(&outcome.status);
                if let Some(diagnostic) = outcome_diagnostic(&path, &outcome.status) {
                    self.record(diagnostic);
                }
                outcome.document
            }
            Err(err) => {
                self.record(document_diagnostic(&err));
                reconcile(AttributeMap::new(), &spec)
            }
        };
        let id = self.admit_panel(kind, trimmed, document, &path, held)?;
        tracing::debug!(%id, %kind, title = trimmed, "panel opened");
        self.relayout();
        Ok(id)
    }

    /// Delete a panel, its descendants, its document and its canvas.
    ///
    /// Returns every removed id, the panel first.
    pub fn delete_panel(&mut self, id: EntityId) -> Result<Vec<EntityId>, StoryError> {
        let (kind, title) = self.panel(id)?;
        if self.drag.dragged() == Some(id) {
            self.drag.force_cancel();
        }
        let removed = self.store.remove(id)?;
        // Already gone if a layout pass pruned it.
        let _ = self.registry.unpin(id);
        self.held.retain(|held| *held != id);

        let document = self.codec.document_path(kind, &title);
        self.remove_file(&document);
        if kind.has_canvas() {
            let canvas = self.codec.canvas_path(kind, &title);
            self.remove_file(&canvas);
        }
        tracing::info!(%id, %kind, title = %title, removed = removed.len(), "panel deleted");
        self.relayout();
        Ok(removed)
    }

    /// Rename a panel and move its files.
    pub fn rename_panel(&mut self, id: EntityId, new_title: &str) -> Result<(), StoryError> {
        let (kind, old_title) = self.panel(id)?;
        let title = new_title.trim();
        if title == old_title {
            return Ok(());
        }
        let new_path = self.codec.document_path(kind, title);
        self.ensure_free_on_disk(kind, title, &new_path)?;
        self.store.rename(id, title)?;

        let old_path = self.codec.document_path(kind, &old_title);
        self.move_file(&old_path, &new_path);
        if kind.has_canvas() {
            let from = self.codec.canvas_path(kind, &old_title);
            let to = self.codec.canvas_path(kind, title);
            self.move_file(&from, &to);
        }
        self.save_panel(id);
        self.relayout();
        Ok(())
    }

    /// Show or hide a panel.
    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> Result<(), StoryError> {
        self.panel(id)?;
        self.registry.set_visible(id, visible)?;
        self.save_panel(id);
        self.relayout();
        Ok(())
    }

    /// Edit a panel's attributes, then save and relayout.
    ///
    /// Changes to `visible` or `pin_location` made by `edit` are applied to
    /// the registry.
    pub fn edit_panel<R>(
        &mut self,
        id: EntityId,
        edit: impl FnOnce(&mut AttributeMap) -> R,
    ) -> Result<R, StoryError> {
        self.panel(id)?;
        let result = edit(self.store.attributes_mut(id)?);

        let attributes = self.store.attributes(id)?;
        let visible = attributes.get("visible").and_then(Value::as_bool);
        let region = attributes
            .get("pin_location")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Region>().ok());
        if let Some(visible) = visible {
            self.registry.set_visible(id, visible)?;
        }
        if let Some(region) = region {
            self.registry.set_region(id, region)?;
        }
        self.save_panel(id);
        self.relayout();
        Ok(result)
    }

    pub fn panel_attributes(&self, id: EntityId) -> Result<&AttributeMap, StoryError> {
        self.panel(id)?;
        Ok(self.store.attributes(id)?)
    }

    // ---------------------------------------------------------------------
    // Details
    // ---------------------------------------------------------------------

    /// Create a detail entity under `owner` and save the owning panel.
    pub fn create_detail(
        &mut self,
        owner: EntityId,
        kind: DetailKind,
        title: &str,
    ) -> Result<EntityId, StoryError> {
        let attributes = reconcile(AttributeMap::new(), &detail_fields(kind, title.trim()));
        let id = self.store.create_detail(owner, kind, title, attributes)?;
        let root = self.store.root_panel(id)?;
        self.save_panel(root);
        self.relayout();
        Ok(id)
    }

    /// The detail titled `title` under `owner`, created on first access.
    pub fn detail(
        &mut self,
        owner: EntityId,
        kind: DetailKind,
        title: &str,
    ) -> Result<EntityId, StoryError> {
        match self.store.detail_by_title(owner, kind, title.trim()) {
            Some(id) => Ok(id),
            None => self.create_detail(owner, kind, title),
        }
    }

    pub fn rename_detail(&mut self, id: EntityId, new_title: &str) -> Result<(), StoryError> {
        let root = self.detail_root(id)?;
        self.store.rename(id, new_title)?;
        self.save_panel(root);
        self.relayout();
        Ok(())
    }

    /// Delete a detail and its subtree from the owning panel's document.
    pub fn delete_detail(&mut self, id: EntityId) -> Result<Vec<EntityId>, StoryError> {
        let root = self.detail_root(id)?;
        let removed = self.store.remove(id)?;
        self.save_panel(root);
        self.relayout();
        Ok(removed)
    }

    /// Re-parent a detail, saving both the old and the new owning panel.
    pub fn move_detail(&mut self, id: EntityId, new_owner: EntityId) -> Result<(), StoryError> {
        let old_root = self.detail_root(id)?;
        self.store.move_detail(id, new_owner)?;
        let new_root = self.store.root_panel(id)?;
        self.save_panel(old_root);
        if new_root != old_root {
            self.save_panel(new_root);
        }
        self.relayout();
        Ok(())
    }

    /// Edit a detail's attributes, then save the owning panel.
    pub fn edit_detail<R>(
        &mut self,
        id: EntityId,
        edit: impl FnOnce(&mut AttributeMap) -> R,
    ) -> Result<R, StoryError> {
        let root = self.detail_root(id)?;
        let result = edit(self.store.attributes_mut(id)?);
        self.save_panel(root);
        self.relayout();
        Ok(result)
    }

    // ---------------------------------------------------------------------
    // Drag, resize, tabs
    // ---------------------------------------------------------------------

    /// Start dragging a placed panel. Any active drag is cancelled first.
    pub fn begin_drag(&mut self, id: EntityId) -> Result<Vec<DragTransition>, StoryError> {
        let origin = self
            .registry
            .region_of(id)
            .ok_or(LayoutError::UnknownEntity { id })?;
        Ok(self.drag.begin(id, origin))
    }

    pub fn hover_drop_target(&mut self, target: Option<Region>) -> DragTransition {
        self.drag.hover(target)
    }

    /// Drop the dragged panel on `target`, persisting its new region.
    pub fn drop_on(&mut self, target: Region) -> Result<DragTransition, StoryError> {
        let transition = self.drag.drop_on(target, &mut self.registry)?;
        if let DragEffect::Accepted {
            entity,
            moved: true,
            ..
        } = transition.effect
        {
            self.save_panel(entity);
        }
        self.relayout();
        Ok(transition)
    }

    pub fn release_outside(&mut self) -> DragTransition {
        self.drag.release_outside()
    }

    /// Apply pending drag timeouts. Call from the thread that owns the story.
    pub fn pump(&mut self) -> Vec<DragTransition> {
        self.drag.pump()
    }

    #[must_use]
    pub const fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    #[must_use]
    pub const fn overlays_visible(&self) -> bool {
        self.drag.overlays_visible()
    }

    /// Apply one divider delta to a side region. Nothing is saved until
    /// [`finish_resize`](Self::finish_resize).
    pub fn resize_by(
        &mut self,
        region: Region,
        delta: i32,
        container_extent: u16,
    ) -> Result<ResizeStep, StoryError> {
        let step = self
            .resize
            .resize(&mut self.dimensions, region, delta, container_extent)?;
        if matches!(step, ResizeStep::Applied { .. }) {
            self.relayout();
        }
        Ok(step)
    }

    /// Apply raw pointer motion on a side region's divider within `area`.
    pub fn drag_divider(
        &mut self,
        region: Region,
        dx: i32,
        dy: i32,
        area: Rect,
    ) -> Result<ResizeStep, StoryError> {
        let step = self
            .resize
            .drag_divider(&mut self.dimensions, region, dx, dy, area)?;
        if matches!(step, ResizeStep::Applied { .. }) {
            self.relayout();
        }
        Ok(step)
    }

    /// End a resize gesture, writing the final size once.
    pub fn finish_resize(&mut self, region: Region) -> Option<u16> {
        let size = self.resize.finish(&self.dimensions, region)?;
        self.save_settings();
        Some(size)
    }

    /// Select a main-region tab; out-of-range indices select the first.
    pub fn select_tab(&mut self, index: usize) -> usize {
        let selected = self.engine.select_tab(index);
        if settings::write_selected_tab(&mut self.settings, selected) {
            self.save_settings();
        }
        self.relayout();
        selected
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn panels_of_kind(&self, kind: PanelKind) -> Vec<EntityId> {
        self.store.panels_of_kind(kind)
    }

    #[must_use]
    pub fn region_of(&self, id: EntityId) -> Option<Region> {
        self.registry.region_of(id)
    }

    #[must_use]
    pub fn is_visible(&self, id: EntityId) -> Option<bool> {
        self.registry.is_visible(id)
    }

    #[must_use]
    pub fn visible_occupants(&self, region: Region) -> Vec<EntityId> {
        self.registry.visible_occupants(region)
    }

    /// Result of the latest layout pass.
    #[must_use]
    pub const fn layout(&self) -> &LayoutPass {
        &self.layout
    }

    #[must_use]
    pub fn solve(&self, area: Rect) -> RegionRects {
        self.layout.tree.solve(area)
    }

    // ---------------------------------------------------------------------
    // Canvas documents
    // ---------------------------------------------------------------------

    /// Load the canvas sibling of a map or canvas panel.
    pub fn canvas(&mut self, id: EntityId) -> Result<CanvasDocument, StoryError> {
        let path = self.canvas_path_of(id)?;
        match self.codec.load_canvas(&path) {
            Ok(outcome) => {
                if let Some(diagnostic) = outcome_diagnostic(&path, &outcome.status) {
                    self.record(diagnostic);
                }
                Ok(outcome.document)
            }
            Err(err) => {
                self.record(document_diagnostic(&err));
                Ok(CanvasDocument::default())
            }
        }
    }

    pub fn save_canvas(&mut self, id: EntityId, canvas: &CanvasDocument) -> Result<(), StoryError> {
        let path = self.canvas_path_of(id)?;
        if let Err(err) = self.codec.save_canvas(&path, canvas) {
            self.record(document_diagnostic(&err));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn panel(&self, id: EntityId) -> Result<(PanelKind, String), StoryError> {
        let node = self.store.get(id).ok_or(StoreError::UnknownEntity { id })?;
        let kind = node.panel_kind().ok_or(StoryError::NotAPanel { id })?;
        Ok((kind, node.title().to_owned()))
    }

    fn detail_root(&self, id: EntityId) -> Result<EntityId, StoryError> {
        let node = self.store.get(id).ok_or(StoreError::UnknownEntity { id })?;
        if node.detail_kind().is_none() {
            return Err(StoreError::NotADetail { id }.into());
        }
        Ok(self.store.root_panel(id)?)
    }

    fn canvas_path_of(&self, id: EntityId) -> Result<PathBuf, StoryError> {
        let (kind, title) = self.panel(id)?;
        if !kind.has_canvas() {
            return Err(StoryError::NoCanvas { id });
        }
        Ok(self.codec.canvas_path(kind, &title))
    }

    /// Reject `title` when an unopened document already claims its file.
    fn ensure_free_on_disk(
        &self,
        kind: PanelKind,
        title: &str,
        path: &Path,
    ) -> Result<(), StoryError> {
        let loaded = self.store.panel_by_title(kind, title).is_some();
        if !title.is_empty() && !loaded && path.exists() {
            return Err(StoreError::DuplicateTitle {
                title: title.to_owned(),
                scope: format!("{kind} documents on disk"),
            }
            .into());
        }
        Ok(())
    }

    /// Register a loaded document as a panel and pin it where it says.
    fn admit_panel(
        &mut self,
        kind: PanelKind,
        title: &str,
        document: AttributeMap,
        path: &Path,
        held: bool,
    ) -> Result<EntityId, StoryError> {
        let id = self.store.create_panel(kind, title, AttributeMap::new())?;
        if held {
            self.held.push(id);
        }
        let report = self.store.absorb(id, document)?;

        let attributes = self.store.attributes(id)?;
        let stored = attributes.get("pin_location").and_then(Value::as_str);
        let parsed = stored.and_then(|s| s.parse::<Region>().ok());
        let region = parsed.unwrap_or_else(|| kind.default_region());
        let repin = parsed.is_none();
        if repin {
            tracing::debug!(%id, stored = ?stored, %region, "invalid pin_location, using default region");
        }
        let visible = attributes
            .get("visible")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        self.registry.pin(id, region, visible)?;

        for skipped in &report.skipped {
            self.record(Diagnostic::new(
                ErrorKind::DocumentCorrupt,
                Some(path.to_path_buf()),
                format!("dropped embedded entry {skipped}"),
            ));
        }
        if repin || !report.repaired.is_empty() {
            self.save_panel(id);
        }
        Ok(id)
    }

    /// Write a panel's document, mirroring its region and visibility.
    ///
    /// Held panels keep their attributes in memory only.
    fn save_panel(&mut self, id: EntityId) {
        let Some(node) = self.store.get(id) else {
            return;
        };
        let Some(kind) = node.panel_kind() else {
            return;
        };
        let title = node.title().to_owned();
        let region = self.registry.region_of(id);
        let visible = self.registry.is_visible(id);
        if let Ok(attributes) = self.store.attributes_mut(id) {
            if let Some(region) = region {
                attributes.insert("pin_location".to_owned(), Value::from(region.as_str()));
            }
            if let Some(visible) = visible {
                attributes.insert("visible".to_owned(), Value::Bool(visible));
            }
        }
        let document = match self.store.embed(id) {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(%id, error = %err, "panel could not be embedded");
                return;
            }
        };
        let path = self.codec.document_path(kind, &title);
        if self.held.contains(&id) {
            tracing::warn!(%id, path = %path.display(), "corrupt original still in place, not saved");
            return;
        }
        if let Err(err) = self.codec.save(&path, &document) {
            self.record(document_diagnostic(&err));
        }
    }

    fn save_settings(&mut self) {
        settings::write_dimensions(&mut self.settings, &self.dimensions);
        let path = self.codec.settings_path();
        if self.settings_held {
            tracing::warn!(path = %path.display(), "corrupt original still in place, not saved");
            return;
        }
        if let Err(err) = self.codec.save(&path, &self.settings) {
            self.record(document_diagnostic(&err));
        }
    }

    fn remove_file(&mut self, path: &Path) {
        if let Err(err) = self.codec.remove(path) {
            self.record(document_diagnostic(&err));
        }
    }

    fn move_file(&mut self, from: &Path, to: &Path) {
        if let Err(err) = self.codec.rename(from, to) {
            self.record(document_diagnostic(&err));
        }
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            kind = ?diagnostic.kind,
            path = ?diagnostic.path,
            message = %diagnostic.message,
            "recovered"
        );
        self.diagnostics.push(diagnostic);
    }

    /// Run a layout pass and persist whatever it changed.
    fn relayout(&mut self) {
        let store = &self.store;
        let pass = self
            .engine
            .run(&mut self.registry, &mut self.dimensions, |id| store.contains(id));

        for id in &pass.pruned {
            self.record(Diagnostic::new(
                ErrorKind::InconsistentRegionReference,
                None,
                format!("region occupant {id} referenced a missing entity and was removed"),
            ));
        }
        for promotion in &pass.promotions {
            self.save_panel(promotion.id);
        }
        // A tabbed main clamps a stale selection; remember the clamped one.
        let reselected = matches!(pass.tree.main, MainContent::Tabs { .. })
            && settings::write_selected_tab(&mut self.settings, self.engine.selected_tab());
        if reselected || !pass.raised.is_empty() {
            self.save_settings();
        }
        self.layout = pass;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> (tempfile::TempDir, Story) {
        let dir = tempfile::tempdir().unwrap();
        let story = Story::open(dir.path(), StoryConfig::default()).unwrap();
        (dir, story)
    }

    #[test]
    fn open_creates_settings() {
        let (dir, story) = story();
        assert!(dir.path().join("settings.json").exists());
        assert!(story.diagnostics().is_empty());
        assert_eq!(story.dimensions(), RegionDimensions::uniform(200));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StoryConfig::default();
        config.drag.cancel_timeout_ms = 1;
        let err = Story::open(dir.path(), config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn first_panel_is_promoted_to_main_and_saved_there() {
        let (dir, mut story) = story();
        let bob = story.create_panel(PanelKind::Character, "Bob").unwrap();
        assert_eq!(story.region_of(bob), Some(Region::Main));
        assert_eq!(story.layout().tree.main, MainContent::Single { id: bob });

        let text = std::fs::read_to_string(dir.path().join("characters/Bob.json")).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["pin_location"], "main");
    }

    #[test]
    fn second_panel_keeps_its_default_region() {
        let (_dir, mut story) = story();
        story.create_panel(PanelKind::Chapter, "One").unwrap();
        let bob = story.create_panel(PanelKind::Character, "Bob").unwrap();
        assert_eq!(story.region_of(bob), Some(Region::Left));
        assert_eq!(story.layout().tree.panels_in(Region::Left), vec![bob]);
    }

    #[test]
    fn panel_operations_reject_details() {
        let (_dir, mut story) = story();
        let saga = story.create_panel(PanelKind::Timeline, "Saga").unwrap();
        let branch = story.create_detail(saga, DetailKind::Branch, "Main").unwrap();
        assert!(matches!(
            story.set_visible(branch, false),
            Err(StoryError::NotAPanel { .. })
        ));
        assert!(matches!(
            story.canvas(saga),
            Err(StoryError::NoCanvas { .. })
        ));
    }

    #[test]
    fn hiding_the_main_panel_promotes_another() {
        let (_dir, mut story) = story();
        let chapter = story.create_panel(PanelKind::Chapter, "One").unwrap();
        let note = story.create_panel(PanelKind::Note, "Ideas").unwrap();
        assert_eq!(story.region_of(note), Some(Region::Right));

        story.set_visible(chapter, false).unwrap();
        assert_eq!(story.region_of(note), Some(Region::Main));
        assert_eq!(story.layout().tree.main.active(), Some(note));
        assert!(story.layout().tree.right.hidden);
    }

    #[test]
    fn edit_panel_applies_pin_location() {
        let (_dir, mut story) = story();
        story.create_panel(PanelKind::Chapter, "One").unwrap();
        let bob = story.create_panel(PanelKind::Character, "Bob").unwrap();
        story
            .edit_panel(bob, |attrs| {
                attrs.insert("pin_location".into(), Value::from("bottom"));
                attrs.insert("age".into(), Value::from("41"));
            })
            .unwrap();
        assert_eq!(story.region_of(bob), Some(Region::Bottom));
        assert_eq!(story.panel_attributes(bob).unwrap()["age"], "41");
    }
}
