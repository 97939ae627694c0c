//! Entity arena with explicit ownership indices.
//!
//! Panels are owned by the story; detail entities are owned by a panel or by
//! another detail, to any depth. Rather than nesting objects, every entity
//! lives flat in one map keyed by [`EntityId`] and ownership is recorded as an
//! `owner` back-reference plus an ordered child list per owner. Traversal,
//! embedding and cycle checks therefore cost the same at depth 2 or depth 20.
//!
//! Titles are unique per scope: panels per [`PanelKind`], details per
//! `(owner, DetailKind)` container, matching how they are keyed on disk.

use rustc_hash::FxHashMap;
use serde_json::Value;
use storydock_core::{AttributeMap, DetailKind, EntityId, EntityIdAllocator, PanelKind};

use crate::error::StoreError;
use crate::reconcile::reconcile_in_place;
use crate::schema::detail_fields;

/// Who owns an entity's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Top-level panels belong to the story itself.
    Story,
    Entity(EntityId),
}

/// Panel or detail discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Panel(PanelKind),
    Detail(DetailKind),
}

impl EntityKind {
    /// Detail kinds this entity may directly own.
    fn container_kinds(self) -> impl Iterator<Item = DetailKind> {
        DetailKind::ALL.into_iter().filter(move |child| match self {
            Self::Panel(kind) => child.allowed_under_panel(kind),
            Self::Detail(kind) => child.allowed_under_detail(kind),
        })
    }

    fn accepts(self, child: DetailKind) -> bool {
        match self {
            Self::Panel(kind) => child.allowed_under_panel(kind),
            Self::Detail(kind) => child.allowed_under_detail(kind),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Panel(kind) => kind.tag(),
            Self::Detail(kind) => kind.tag(),
        }
    }
}

/// One entity in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityNode {
    id: EntityId,
    kind: EntityKind,
    owner: Owner,
    title: String,
    attributes: AttributeMap,
}

impl EntityNode {
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Own attributes, without embedded children.
    #[must_use]
    pub const fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    #[must_use]
    pub const fn panel_kind(&self) -> Option<PanelKind> {
        match self.kind {
            EntityKind::Panel(kind) => Some(kind),
            EntityKind::Detail(_) => None,
        }
    }

    #[must_use]
    pub const fn detail_kind(&self) -> Option<DetailKind> {
        match self.kind {
            EntityKind::Detail(kind) => Some(kind),
            EntityKind::Panel(_) => None,
        }
    }

    /// The `visible` attribute, defaulting to `true` when absent or not a bool.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.attributes
            .get("visible")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}

/// What [`EntityStore::absorb`] did with an embedded document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbsorbReport {
    /// Detail entities created from embedded subtrees.
    pub created: usize,
    /// Embedding paths of children whose maps needed defaults filled in.
    pub repaired: Vec<String>,
    /// Embedded entries that could not become entities, with the reason.
    pub skipped: Vec<String>,
}

impl AbsorbReport {
    /// True when nothing was repaired or skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.repaired.is_empty() && self.skipped.is_empty()
    }
}

/// In-memory registry of panel and detail entities.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    nodes: FxHashMap<EntityId, EntityNode>,
    children: FxHashMap<EntityId, Vec<EntityId>>,
    /// Top-level panels in creation order.
    panels: Vec<EntityId>,
    ids: EntityIdAllocator,
}

fn normalize_title(title: &str) -> Result<String, StoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidTitle {
            title: title.to_owned(),
        });
    }
    Ok(trimmed.to_owned())
}

impl EntityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities, panels and details together.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityNode> {
        self.nodes.get(&id)
    }

    fn node(&self, id: EntityId) -> Result<&EntityNode, StoreError> {
        self.nodes.get(&id).ok_or(StoreError::UnknownEntity { id })
    }

    fn node_mut(&mut self, id: EntityId) -> Result<&mut EntityNode, StoreError> {
        self.nodes.get_mut(&id).ok_or(StoreError::UnknownEntity { id })
    }

    // ---------------------------------------------------------------------
    // Creation and deletion
    // ---------------------------------------------------------------------

    /// Register a new top-level panel.
    ///
    /// Rejects blank titles and titles already used by a panel of the same
    /// kind; nothing is mutated on rejection.
    pub fn create_panel(
        &mut self,
        kind: PanelKind,
        title: &str,
        mut attributes: AttributeMap,
    ) -> Result<EntityId, StoreError> {
        let title = normalize_title(title)?;
        if self.panel_by_title(kind, &title).is_some() {
            return Err(StoreError::DuplicateTitle {
                title,
                scope: format!("{kind} panels"),
            });
        }

        let id = self.ids.allocate();
        attributes.insert("title".to_owned(), Value::String(title.clone()));
        tracing::debug!(%id, %kind, title = %title, "panel created");
        self.nodes.insert(
            id,
            EntityNode {
                id,
                kind: EntityKind::Panel(kind),
                owner: Owner::Story,
                title,
                attributes,
            },
        );
        self.panels.push(id);
        Ok(id)
    }

    /// Register a detail entity under `owner`.
    pub fn create_detail(
        &mut self,
        owner: EntityId,
        kind: DetailKind,
        title: &str,
        mut attributes: AttributeMap,
    ) -> Result<EntityId, StoreError> {
        let owner_node = self.node(owner)?;
        if !owner_node.kind.accepts(kind) {
            return Err(StoreError::InvalidOwner {
                kind,
                owner: format!("{} {:?}", owner_node.kind.label(), owner_node.title),
            });
        }
        let title = normalize_title(title)?;
        if self.detail_by_title(owner, kind, &title).is_some() {
            return Err(StoreError::DuplicateTitle {
                scope: self.container_scope(owner, kind),
                title,
            });
        }

        let id = self.ids.allocate();
        attributes.insert("title".to_owned(), Value::String(title.clone()));
        tracing::debug!(%id, %owner, %kind, title = %title, "detail created");
        self.nodes.insert(
            id,
            EntityNode {
                id,
                kind: EntityKind::Detail(kind),
                owner: Owner::Entity(owner),
                title,
                attributes,
            },
        );
        self.children.entry(owner).or_default().push(id);
        Ok(id)
    }

    /// Remove an entity and every descendant.
    ///
    /// Returns the removed ids, the entity itself first.
    pub fn remove(&mut self, id: EntityId) -> Result<Vec<EntityId>, StoreError> {
        let owner = self.node(id)?.owner;
        let mut removed = vec![id];
        removed.extend(self.descendants(id));

        match owner {
            Owner::Story => self.panels.retain(|panel| *panel != id),
            Owner::Entity(parent) => {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|child| *child != id);
                }
            }
        }
        for gone in &removed {
            self.nodes.remove(gone);
            self.children.remove(gone);
        }
        tracing::debug!(%id, cascade = removed.len() - 1, "entity removed");
        Ok(removed)
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Change an entity's title, keeping it unique within its scope.
    pub fn rename(&mut self, id: EntityId, new_title: &str) -> Result<(), StoreError> {
        let node = self.node(id)?;
        let title = normalize_title(new_title)?;
        if title == node.title {
            return Ok(());
        }
        let clash = match (node.kind, node.owner) {
            (EntityKind::Panel(kind), _) => self
                .panel_by_title(kind, &title)
                .map(|_| format!("{kind} panels")),
            (EntityKind::Detail(kind), Owner::Entity(owner)) => self
                .detail_by_title(owner, kind, &title)
                .map(|_| self.container_scope(owner, kind)),
            (EntityKind::Detail(_), Owner::Story) => None,
        };
        if let Some(scope) = clash {
            return Err(StoreError::DuplicateTitle { title, scope });
        }

        let node = self.node_mut(id)?;
        tracing::debug!(%id, from = %node.title, to = %title, "entity renamed");
        node.attributes
            .insert("title".to_owned(), Value::String(title.clone()));
        node.title = title;
        Ok(())
    }

    /// Re-parent a detail entity under `new_owner`.
    ///
    /// Rejects moves that would make an entity its own ancestor, owners that
    /// may not hold this kind, and title clashes in the destination.
    pub fn move_detail(&mut self, id: EntityId, new_owner: EntityId) -> Result<(), StoreError> {
        let node = self.node(id)?;
        let (kind, old_owner) = match (node.kind, node.owner) {
            (EntityKind::Detail(kind), Owner::Entity(owner)) => (kind, owner),
            _ => return Err(StoreError::NotADetail { id }),
        };
        let title = node.title.clone();
        let target = self.node(new_owner)?;
        if old_owner == new_owner {
            return Ok(());
        }
        if new_owner == id || self.is_ancestor(id, new_owner) {
            return Err(StoreError::OwnershipCycle {
                id,
                owner: new_owner,
            });
        }
        if !target.kind.accepts(kind) {
            return Err(StoreError::InvalidOwner {
                kind,
                owner: format!("{} {:?}", target.kind.label(), target.title),
            });
        }
        if self.detail_by_title(new_owner, kind, &title).is_some() {
            return Err(StoreError::DuplicateTitle {
                scope: self.container_scope(new_owner, kind),
                title,
            });
        }

        if let Some(siblings) = self.children.get_mut(&old_owner) {
            siblings.retain(|child| *child != id);
        }
        self.children.entry(new_owner).or_default().push(id);
        self.node_mut(id)?.owner = Owner::Entity(new_owner);
        tracing::debug!(%id, from = %old_owner, to = %new_owner, "detail moved");
        Ok(())
    }

    /// Own attributes of an entity (embedded children excluded).
    pub fn attributes(&self, id: EntityId) -> Result<&AttributeMap, StoreError> {
        Ok(&self.node(id)?.attributes)
    }

    /// Mutable access to own attributes.
    ///
    /// `title` and child containers are rewritten from the arena on
    /// [`embed`](Self::embed), so edits to them here do not persist.
    pub fn attributes_mut(&mut self, id: EntityId) -> Result<&mut AttributeMap, StoreError> {
        Ok(&mut self.node_mut(id)?.attributes)
    }

    /// Set one attribute, returning the previous value.
    ///
    /// `title` (use [`rename`](Self::rename)) and child container keys are
    /// reserved.
    pub fn set_attribute(
        &mut self,
        id: EntityId,
        key: &str,
        value: Value,
    ) -> Result<Option<Value>, StoreError> {
        let node = self.node(id)?;
        let reserved =
            key == "title" || node.kind.container_kinds().any(|k| k.container_key() == key);
        if reserved {
            return Err(StoreError::ReservedKey {
                key: key.to_owned(),
            });
        }
        Ok(self.node_mut(id)?.attributes.insert(key.to_owned(), value))
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Top-level panels in creation order.
    #[must_use]
    pub fn panels(&self) -> &[EntityId] {
        &self.panels
    }

    #[must_use]
    pub fn panels_of_kind(&self, kind: PanelKind) -> Vec<EntityId> {
        self.panels
            .iter()
            .copied()
            .filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|node| node.kind == EntityKind::Panel(kind))
            })
            .collect()
    }

    #[must_use]
    pub fn panel_count(&self, kind: PanelKind) -> usize {
        self.panels_of_kind(kind).len()
    }

    #[must_use]
    pub fn panel_by_title(&self, kind: PanelKind, title: &str) -> Option<EntityId> {
        self.panels.iter().copied().find(|id| {
            self.nodes
                .get(id)
                .is_some_and(|node| node.kind == EntityKind::Panel(kind) && node.title == title)
        })
    }

    #[must_use]
    pub fn detail_by_title(&self, owner: EntityId, kind: DetailKind, title: &str) -> Option<EntityId> {
        self.children(owner).iter().copied().find(|id| {
            self.nodes
                .get(id)
                .is_some_and(|node| node.kind == EntityKind::Detail(kind) && node.title == title)
        })
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn children_of_kind(&self, id: EntityId, kind: DetailKind) -> Vec<EntityId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| {
                self.nodes
                    .get(child)
                    .is_some_and(|node| node.kind == EntityKind::Detail(kind))
            })
            .collect()
    }

    /// Every descendant in pre-order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack: Vec<EntityId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Whether `ancestor` appears on the owner chain of `id`.
    fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = self.nodes.get(&id).map(|node| node.owner);
        let mut hops = 0;
        while let Some(Owner::Entity(owner)) = current {
            if owner == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.nodes.len() {
                break;
            }
            current = self.nodes.get(&owner).map(|node| node.owner);
        }
        false
    }

    /// The panel at the top of `id`'s ownership chain (itself for panels).
    pub fn root_panel(&self, id: EntityId) -> Result<EntityId, StoreError> {
        let mut current = self.node(id)?;
        for _ in 0..=self.nodes.len() {
            match current.owner {
                Owner::Story => return Ok(current.id),
                Owner::Entity(owner) => current = self.node(owner)?,
            }
        }
        Err(StoreError::OwnershipCycle {
            id,
            owner: current.id,
        })
    }

    /// Chain of keys locating `id` inside its root panel's document, e.g.
    /// `["branches", "Main", "branches", "Side"]`. Empty for panels.
    pub fn embedding_path(&self, id: EntityId) -> Result<Vec<String>, StoreError> {
        let mut path = Vec::new();
        let mut current = self.node(id)?;
        for _ in 0..=self.nodes.len() {
            match (current.kind, current.owner) {
                (_, Owner::Story) => {
                    path.reverse();
                    return Ok(path);
                }
                (EntityKind::Detail(kind), Owner::Entity(owner)) => {
                    path.push(current.title.clone());
                    path.push(kind.container_key().to_owned());
                    current = self.node(owner)?;
                }
                (EntityKind::Panel(_), Owner::Entity(_)) => break,
            }
        }
        Err(StoreError::OwnershipCycle {
            id,
            owner: current.id,
        })
    }

    fn container_scope(&self, owner: EntityId, kind: DetailKind) -> String {
        match self.nodes.get(&owner) {
            Some(node) => format!(
                "{} {:?} {}",
                node.kind.label(),
                node.title,
                kind.container_key()
            ),
            None => kind.container_key().to_owned(),
        }
    }

    // ---------------------------------------------------------------------
    // Document embedding
    // ---------------------------------------------------------------------

    /// Build the document for `id`: its own attributes with every descendant
    /// embedded under `<container_key>.<title>`.
    ///
    /// Every container the entity may hold is written, empty or not.
    pub fn embed(&self, id: EntityId) -> Result<AttributeMap, StoreError> {
        let node = self.node(id)?;
        let mut doc = node.attributes.clone();
        doc.insert("title".to_owned(), Value::String(node.title.clone()));
        for kind in node.kind.container_kinds() {
            let mut container = AttributeMap::new();
            for child in self.children_of_kind(id, kind) {
                let child_doc = self.embed(child)?;
                if let Some(child_node) = self.nodes.get(&child) {
                    container.insert(child_node.title.clone(), Value::Object(child_doc));
                }
            }
            doc.insert(kind.container_key().to_owned(), Value::Object(container));
        }
        Ok(doc)
    }

    /// Replace `id`'s attributes and children with the contents of `doc`.
    ///
    /// Embedded subtrees become detail entities, each reconciled against its
    /// detail schema. Existing children of `id` are dropped first. Entries
    /// that cannot become entities (non-map values, blank or clashing titles)
    /// are reported in [`AbsorbReport::skipped`] instead of failing the load.
    pub fn absorb(&mut self, id: EntityId, doc: AttributeMap) -> Result<AbsorbReport, StoreError> {
        self.node(id)?;
        for child in self.children(id).to_vec() {
            self.remove(child)?;
        }
        let mut report = AbsorbReport::default();
        self.absorb_into(id, doc, &mut report)?;
        Ok(report)
    }

    fn absorb_into(
        &mut self,
        id: EntityId,
        mut doc: AttributeMap,
        report: &mut AbsorbReport,
    ) -> Result<(), StoreError> {
        let kind = self.node(id)?.kind;
        let mut pending = Vec::new();
        for child_kind in kind.container_kinds() {
            let key = child_kind.container_key();
            match doc.remove(key) {
                None => {}
                Some(Value::Object(entries)) => {
                    pending.extend(
                        entries
                            .into_iter()
                            .map(|(title, value)| (child_kind, title, value)),
                    );
                }
                Some(other) => {
                    report.skipped.push(format!(
                        "{}: container is {} not a mapping",
                        self.path_label(id, key),
                        type_name(&other)
                    ));
                }
            }
        }

        let node = self.node_mut(id)?;
        doc.insert("title".to_owned(), Value::String(node.title.clone()));
        node.attributes = doc;

        for (child_kind, title, value) in pending {
            let mut child_doc = match value {
                Value::Object(map) => map,
                other => {
                    report.skipped.push(format!(
                        "{}.{title}: entry is {} not a mapping",
                        self.path_label(id, child_kind.container_key()),
                        type_name(&other)
                    ));
                    continue;
                }
            };
            let filled = reconcile_in_place(&mut child_doc, &detail_fields(child_kind, &title));
            let child = match self.create_detail(id, child_kind, &title, AttributeMap::new()) {
                Ok(child) => child,
                Err(err) => {
                    report.skipped.push(format!(
                        "{}.{title}: {err}",
                        self.path_label(id, child_kind.container_key())
                    ));
                    continue;
                }
            };
            if !filled.is_empty() {
                report.repaired.push(format!(
                    "{}.{title}",
                    self.path_label(id, child_kind.container_key())
                ));
            }
            report.created += 1;
            self.absorb_into(child, child_doc, report)?;
        }
        Ok(())
    }

    fn path_label(&self, id: EntityId, key: &str) -> String {
        let mut parts = self.embedding_path(id).unwrap_or_default();
        parts.push(key.to_owned());
        parts.join(".")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
