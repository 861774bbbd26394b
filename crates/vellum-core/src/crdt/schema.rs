//! Loro document schema and core operations.
//!
//! Top-level collections:
//!
//! | key                | type  | contents                                   |
//! |--------------------|-------|--------------------------------------------|
//! | `objects`          | map   | object id -> object record map             |
//! | `containers`       | map   | container id -> container record map       |
//! | `root`             | list  | encoded child refs, z-order of the root    |
//! | `children:<id>`    | list  | encoded child refs of one container        |
//! | `views`            | map   | view id -> view record map                 |
//! | `view_order`       | list  | view ids in presentation order             |
//! | `styles`           | map   | style id -> style record map               |
//! | `palettes`         | map   | palette id -> palette record map           |
//! | `templates`        | map   | template id -> template record map         |
//! | `protos:<id>`      | list  | prototype object ids of one template       |
//! | `text:<id>`        | text  | rich-text buffer of one textbox            |
//! | `meta`             | map   | schema version, active palette             |
//! | `name`             | text  | collaborative document name                |

use std::collections::HashSet;

use loro::{
    CommitOptions, Container, ExportMode, LoroDoc, LoroList, LoroMap, LoroResult, LoroText,
    LoroValue, UndoManager, ValueOrContainer,
};

use super::convert::{
    container_from_loro, object_from_loro, palette_from_loro, style_from_loro, template_from_loro,
    view_from_loro,
};
use crate::id::{ContainerId, ObjectId, PaletteId, StyleId, TemplateId, TextId, ViewId};
use crate::model::{
    ChildRef, ContainerRecord, ObjectRecord, PaletteRecord, Scope, StyleRecord, TemplateRecord,
    ViewRecord,
};

/// Key for the objects map in the document.
pub const OBJECTS_KEY: &str = "objects";
/// Key for the containers map.
pub const CONTAINERS_KEY: &str = "containers";
/// Key for the root child-reference list.
pub const ROOT_KEY: &str = "root";
/// Key for the views map.
pub const VIEWS_KEY: &str = "views";
/// Key for the presentation-order list.
pub const VIEW_ORDER_KEY: &str = "view_order";
/// Key for the styles map.
pub const STYLES_KEY: &str = "styles";
/// Key for the palettes map.
pub const PALETTES_KEY: &str = "palettes";
/// Key for the templates map.
pub const TEMPLATES_KEY: &str = "templates";
/// Key for the document metadata map.
pub const META_KEY: &str = "meta";
/// Key for the document name.
pub const NAME_KEY: &str = "name";

/// Prefix of per-container child-reference lists.
pub const CHILDREN_PREFIX: &str = "children:";
/// Prefix of per-template prototype-id lists.
pub const PROTOS_PREFIX: &str = "protos:";
/// Prefix of rich-text buffers.
pub const TEXT_PREFIX: &str = "text:";

/// Origin attached to every commit issued by this document's operations,
/// so observers can tell local edits from remote imports.
pub const LOCAL_ORIGIN: &str = "scene-ops";
const INIT_ORIGIN: &str = "scene-init";

const META_SCHEMA_VERSION: &str = "schema_version";
const META_ACTIVE_PALETTE: &str = "active_palette";
pub(crate) const SCHEMA_VERSION: i64 = 1;

/// A CRDT-backed scene document for collaborative editing.
///
/// Wraps a `LoroDoc` and provides the object, container, view, style, and
/// template surface the rest of the crate builds on. Every mutating
/// operation commits exactly once, so concurrent observers see each
/// operation as one atomic change. An `UndoManager` tracks local edits.
pub struct SceneDocument {
    /// The underlying Loro document.
    doc: LoroDoc,
    /// Undo manager for local undo/redo.
    undo: UndoManager,
}

impl SceneDocument {
    /// Create a new empty scene document.
    pub fn new() -> Self {
        let doc = LoroDoc::new();
        let meta = doc.get_map(META_KEY);
        let _ = meta.insert(META_SCHEMA_VERSION, SCHEMA_VERSION);
        doc.commit_with(CommitOptions::new().origin(INIT_ORIGIN));
        let mut undo = UndoManager::new(&doc);
        undo.set_max_undo_steps(100);
        undo.set_merge_interval(300);
        Self { doc, undo }
    }

    /// Create a scene document from a snapshot.
    pub fn from_snapshot(bytes: &[u8]) -> LoroResult<Self> {
        let doc = LoroDoc::new();
        doc.import(bytes)?;
        let mut undo = UndoManager::new(&doc);
        undo.set_max_undo_steps(100);
        undo.set_merge_interval(300);
        Ok(Self { doc, undo })
    }

    /// Get the underlying LoroDoc.
    pub fn loro_doc(&self) -> &LoroDoc {
        &self.doc
    }

    /// Commit the pending transaction, attributed to this client.
    pub(crate) fn commit(&self) {
        self.doc.commit_with(CommitOptions::new().origin(LOCAL_ORIGIN));
    }

    // --- Collection handles ---

    pub(crate) fn objects_map(&self) -> LoroMap {
        self.doc.get_map(OBJECTS_KEY)
    }

    pub(crate) fn containers_map(&self) -> LoroMap {
        self.doc.get_map(CONTAINERS_KEY)
    }

    pub(crate) fn views_map(&self) -> LoroMap {
        self.doc.get_map(VIEWS_KEY)
    }

    pub(crate) fn styles_map(&self) -> LoroMap {
        self.doc.get_map(STYLES_KEY)
    }

    pub(crate) fn palettes_map(&self) -> LoroMap {
        self.doc.get_map(PALETTES_KEY)
    }

    pub(crate) fn templates_map(&self) -> LoroMap {
        self.doc.get_map(TEMPLATES_KEY)
    }

    pub(crate) fn meta_map(&self) -> LoroMap {
        self.doc.get_map(META_KEY)
    }

    pub(crate) fn root_list(&self) -> LoroList {
        self.doc.get_list(ROOT_KEY)
    }

    pub(crate) fn view_order_list(&self) -> LoroList {
        self.doc.get_list(VIEW_ORDER_KEY)
    }

    pub(crate) fn children_list(&self, id: &ContainerId) -> LoroList {
        self.doc.get_list(format!("{CHILDREN_PREFIX}{id}"))
    }

    pub(crate) fn protos_list(&self, id: &TemplateId) -> LoroList {
        self.doc.get_list(format!("{PROTOS_PREFIX}{id}"))
    }

    /// Ordered child-reference list of a sibling scope.
    pub(crate) fn scope_list(&self, scope: &Scope) -> LoroList {
        match scope {
            Scope::Root => self.root_list(),
            Scope::Container(id) => self.children_list(id),
        }
    }

    /// The collaborative rich-text buffer backing a textbox.
    pub fn text_buffer(&self, id: &TextId) -> LoroText {
        self.doc.get_text(format!("{TEXT_PREFIX}{id}"))
    }

    // --- Record-map handles (live containers, for narrowed field writes) ---

    pub(crate) fn object_map(&self, id: &ObjectId) -> Option<LoroMap> {
        nested_map(&self.objects_map(), id.as_str())
    }

    pub(crate) fn container_map(&self, id: &ContainerId) -> Option<LoroMap> {
        nested_map(&self.containers_map(), id.as_str())
    }

    pub(crate) fn view_map(&self, id: &ViewId) -> Option<LoroMap> {
        nested_map(&self.views_map(), id.as_str())
    }

    pub(crate) fn template_map(&self, id: &TemplateId) -> Option<LoroMap> {
        nested_map(&self.templates_map(), id.as_str())
    }

    // --- Record reads ---

    /// Read an object as stored, without resolving its prototype.
    pub fn object(&self, id: &ObjectId) -> Option<ObjectRecord> {
        let value = self.objects_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            if let Some(LoroValue::Map(entry)) = map.get(id.as_str()) {
                return object_from_loro(id, entry);
            }
        }
        None
    }

    /// All stored objects, in no particular order.
    pub fn all_objects(&self) -> Vec<ObjectRecord> {
        let value = self.objects_map().get_deep_value();
        let mut records = Vec::new();
        if let LoroValue::Map(map) = value {
            for (id, entry) in map.iter() {
                if let LoroValue::Map(entry) = entry {
                    if let Some(record) =
                        object_from_loro(&ObjectId::from_string(id.as_str()), entry)
                    {
                        records.push(record);
                    }
                }
            }
        }
        records
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.objects_map().len()
    }

    pub fn container(&self, id: &ContainerId) -> Option<ContainerRecord> {
        let value = self.containers_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            if let Some(LoroValue::Map(entry)) = map.get(id.as_str()) {
                return Some(container_from_loro(id, entry));
            }
        }
        None
    }

    pub fn all_containers(&self) -> Vec<ContainerRecord> {
        let value = self.containers_map().get_deep_value();
        let mut records = Vec::new();
        if let LoroValue::Map(map) = value {
            for (id, entry) in map.iter() {
                if let LoroValue::Map(entry) = entry {
                    records.push(container_from_loro(&ContainerId::from_string(id.as_str()), entry));
                }
            }
        }
        records
    }

    pub fn view(&self, id: &ViewId) -> Option<ViewRecord> {
        let value = self.views_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            if let Some(LoroValue::Map(entry)) = map.get(id.as_str()) {
                return view_from_loro(id, entry);
            }
        }
        None
    }

    /// View ids in presentation order.
    pub fn view_order(&self) -> Vec<ViewId> {
        let list = self.view_order_list();
        let mut ids = Vec::with_capacity(list.len());
        for i in 0..list.len() {
            if let Some(ValueOrContainer::Value(LoroValue::String(id))) = list.get(i) {
                ids.push(ViewId::from_string(id.to_string()));
            }
        }
        ids
    }

    /// All views, in presentation order.
    pub fn all_views(&self) -> Vec<ViewRecord> {
        self.view_order()
            .iter()
            .filter_map(|id| self.view(id))
            .collect()
    }

    pub fn style(&self, id: &StyleId) -> Option<StyleRecord> {
        let value = self.styles_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            if let Some(LoroValue::Map(entry)) = map.get(id.as_str()) {
                return style_from_loro(id, entry);
            }
        }
        None
    }

    pub fn all_styles(&self) -> Vec<StyleRecord> {
        let value = self.styles_map().get_deep_value();
        let mut records = Vec::new();
        if let LoroValue::Map(map) = value {
            for (id, entry) in map.iter() {
                if let LoroValue::Map(entry) = entry {
                    if let Some(record) = style_from_loro(&StyleId::from_string(id.as_str()), entry)
                    {
                        records.push(record);
                    }
                }
            }
        }
        records
    }

    pub fn palette(&self, id: &PaletteId) -> Option<PaletteRecord> {
        let value = self.palettes_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            if let Some(LoroValue::Map(entry)) = map.get(id.as_str()) {
                return palette_from_loro(id, entry);
            }
        }
        None
    }

    pub fn all_palettes(&self) -> Vec<PaletteRecord> {
        let value = self.palettes_map().get_deep_value();
        let mut records = Vec::new();
        if let LoroValue::Map(map) = value {
            for (id, entry) in map.iter() {
                if let LoroValue::Map(entry) = entry {
                    if let Some(record) =
                        palette_from_loro(&PaletteId::from_string(id.as_str()), entry)
                    {
                        records.push(record);
                    }
                }
            }
        }
        records
    }

    pub fn template(&self, id: &TemplateId) -> Option<TemplateRecord> {
        let value = self.templates_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            if let Some(LoroValue::Map(entry)) = map.get(id.as_str()) {
                return template_from_loro(id, entry);
            }
        }
        None
    }

    pub fn all_templates(&self) -> Vec<TemplateRecord> {
        self.template_ids()
            .iter()
            .filter_map(|id| self.template(id))
            .collect()
    }

    pub fn template_ids(&self) -> Vec<TemplateId> {
        let value = self.templates_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            map.keys()
                .map(|id| TemplateId::from_string(id.as_str()))
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Prototype ids tracked by one template, in template order.
    pub fn template_prototypes(&self, id: &TemplateId) -> Vec<ObjectId> {
        let list = self.protos_list(id);
        let mut ids = Vec::with_capacity(list.len());
        for i in 0..list.len() {
            if let Some(ValueOrContainer::Value(LoroValue::String(s))) = list.get(i) {
                ids.push(ObjectId::from_string(s.to_string()));
            }
        }
        ids
    }

    /// Every object id tracked as a prototype by any template.
    pub fn prototype_ids(&self) -> HashSet<ObjectId> {
        let mut ids = HashSet::new();
        for template in self.template_ids() {
            ids.extend(self.template_prototypes(&template));
        }
        ids
    }

    // --- Child-reference scopes ---

    /// Child references of the root scope, in z-order.
    pub fn root_refs(&self) -> Vec<ChildRef> {
        refs_of(&self.root_list())
    }

    /// Child references of a container, in z-order.
    pub fn children_refs(&self, id: &ContainerId) -> Vec<ChildRef> {
        refs_of(&self.children_list(id))
    }

    pub fn scope_refs(&self, scope: &Scope) -> Vec<ChildRef> {
        refs_of(&self.scope_list(scope))
    }

    /// The sibling scope an object record belongs to.
    pub(crate) fn scope_of(&self, record: &ObjectRecord) -> Scope {
        match &record.parent {
            Some(parent) => Scope::Container(parent.clone()),
            None => Scope::Root,
        }
    }

    // --- Document metadata ---

    pub fn schema_version(&self) -> i64 {
        let value = self.meta_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            if let Some(LoroValue::I64(version)) = map.get(META_SCHEMA_VERSION) {
                return *version;
            }
        }
        0
    }

    /// The palette styles currently resolve slot references against.
    pub fn active_palette_id(&self) -> Option<PaletteId> {
        let value = self.meta_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            if let Some(LoroValue::String(id)) = map.get(META_ACTIVE_PALETTE) {
                return Some(PaletteId::from_string(id.to_string()));
            }
        }
        None
    }

    pub(crate) fn write_active_palette(&self, id: &PaletteId) -> LoroResult<()> {
        self.meta_map().insert(META_ACTIVE_PALETTE, id.as_str())
    }

    pub(crate) fn clear_active_palette(&self) -> LoroResult<()> {
        let meta = self.meta_map();
        if meta.get(META_ACTIVE_PALETTE).is_some() {
            meta.delete(META_ACTIVE_PALETTE)?;
        }
        Ok(())
    }

    /// Get the document name.
    pub fn name(&self) -> String {
        let text = self.doc.get_text(NAME_KEY);
        text.to_string()
    }

    /// Set the document name.
    pub fn set_name(&mut self, name: &str) -> LoroResult<()> {
        let text = self.doc.get_text(NAME_KEY);
        let len = text.len_unicode();
        if len > 0 {
            text.delete(0, len)?;
        }
        text.insert(0, name)?;
        self.commit();
        Ok(())
    }

    // --- Rich-text buffers ---

    /// Full contents of a rich-text buffer.
    pub fn text_content(&self, id: &TextId) -> String {
        self.text_buffer(id).to_string()
    }

    pub fn text_len(&self, id: &TextId) -> usize {
        self.text_buffer(id).len_unicode()
    }

    /// Insert into a rich-text buffer at a unicode position.
    pub fn insert_text(&mut self, id: &TextId, pos: usize, content: &str) -> LoroResult<()> {
        self.text_buffer(id).insert(pos, content)?;
        self.commit();
        Ok(())
    }

    /// Delete a unicode range from a rich-text buffer.
    pub fn delete_text(&mut self, id: &TextId, pos: usize, len: usize) -> LoroResult<()> {
        self.text_buffer(id).delete(pos, len)?;
        self.commit();
        Ok(())
    }

    /// Replace the full contents of a rich-text buffer.
    pub fn set_text_content(&mut self, id: &TextId, content: &str) -> LoroResult<()> {
        let text = self.text_buffer(id);
        let len = text.len_unicode();
        if len > 0 {
            text.delete(0, len)?;
        }
        text.insert(0, content)?;
        self.commit();
        Ok(())
    }

    /// Empty a buffer without committing; the caller's operation commits.
    pub(crate) fn clear_text(&self, id: &TextId) -> LoroResult<()> {
        let text = self.text_buffer(id);
        let len = text.len_unicode();
        if len > 0 {
            text.delete(0, len)?;
        }
        Ok(())
    }

    // --- Sync ---

    /// Export the document as a snapshot (full state).
    pub fn export_snapshot(&self) -> Vec<u8> {
        self.doc.export(ExportMode::Snapshot).unwrap_or_default()
    }

    /// Export incremental updates since a version.
    pub fn export_updates(&self, since: &loro::VersionVector) -> Vec<u8> {
        self.doc.export(ExportMode::updates(since)).unwrap_or_default()
    }

    /// Import updates from another document.
    pub fn import(&mut self, bytes: &[u8]) -> LoroResult<()> {
        self.doc.import(bytes)?;
        Ok(())
    }

    /// Get the current version vector.
    pub fn version(&self) -> loro::VersionVector {
        self.doc.oplog_vv()
    }

    /// This client's peer id, for echo-suppression in sync layers.
    pub fn peer_id(&self) -> u64 {
        self.doc.peer_id()
    }

    // --- Undo/Redo API ---

    /// Undo the last change made by this peer.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.undo.undo().unwrap_or(false)
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.undo.redo().unwrap_or(false)
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Get the number of available undo steps.
    pub fn undo_count(&self) -> usize {
        self.undo.undo_count()
    }

    /// Get the number of available redo steps.
    pub fn redo_count(&self) -> usize {
        self.undo.redo_count()
    }

    /// Record a new checkpoint for undo grouping.
    /// All changes between checkpoints are grouped into a single undo step.
    pub fn record_checkpoint(&mut self) {
        let _ = self.undo.record_new_checkpoint();
    }

    /// Start a new undo group. All changes until `end_undo_group` will be
    /// undone together.
    pub fn start_undo_group(&mut self) {
        let _ = self.undo.group_start();
    }

    /// End the current undo group.
    pub fn end_undo_group(&mut self) {
        self.undo.group_end();
    }

    /// Clear undo/redo history.
    pub fn clear_undo_history(&self) {
        self.undo.clear();
    }
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SceneDocument {
    fn clone(&self) -> Self {
        // Note: Clone creates a new document with fresh undo history
        let bytes = self.export_snapshot();
        Self::from_snapshot(&bytes).unwrap_or_else(|_| Self::new())
    }
}

/// Live handle of a nested record map, when the entry exists and is a map.
pub(crate) fn nested_map(collection: &LoroMap, id: &str) -> Option<LoroMap> {
    match collection.get(id) {
        Some(ValueOrContainer::Container(Container::Map(map))) => Some(map),
        _ => None,
    }
}

/// Decode every child reference in a scope list, skipping malformed
/// entries.
pub(crate) fn refs_of(list: &LoroList) -> Vec<ChildRef> {
    let mut refs = Vec::with_capacity(list.len());
    for i in 0..list.len() {
        if let Some(ValueOrContainer::Value(LoroValue::String(s))) = list.get(i) {
            if let Some(child) = ChildRef::decode(s.as_ref()) {
                refs.push(child);
            }
        }
    }
    refs
}

/// Position of a child reference within a scope list.
pub(crate) fn ref_index(list: &LoroList, child: &ChildRef) -> Option<usize> {
    let encoded = child.encode();
    for i in 0..list.len() {
        if let Some(ValueOrContainer::Value(LoroValue::String(s))) = list.get(i) {
            if s.as_ref() == encoded.as_str() {
                return Some(i);
            }
        }
    }
    None
}

/// Insert a child reference at an index, clamped to the end.
pub(crate) fn insert_ref(
    list: &LoroList,
    index: Option<usize>,
    child: &ChildRef,
) -> LoroResult<()> {
    let encoded = child.encode();
    match index {
        Some(index) if index < list.len() => {
            list.insert(index, LoroValue::String(encoded.into()))?;
        }
        _ => {
            list.push(LoroValue::String(encoded.into()))?;
        }
    }
    Ok(())
}

/// Remove a child reference from a scope list. Returns whether it was
/// present.
pub(crate) fn remove_ref(list: &LoroList, child: &ChildRef) -> LoroResult<bool> {
    if let Some(index) = ref_index(list, child) {
        list.delete(index, 1)?;
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_schema_version() {
        let doc = SceneDocument::new();
        assert_eq!(doc.schema_version(), SCHEMA_VERSION);
        assert_eq!(doc.object_count(), 0);
        assert!(doc.root_refs().is_empty());
    }

    #[test]
    fn test_name_round_trip() {
        let mut doc = SceneDocument::new();
        assert_eq!(doc.name(), "");
        doc.set_name("Q3 review").unwrap();
        assert_eq!(doc.name(), "Q3 review");
        doc.set_name("Q4 review").unwrap();
        assert_eq!(doc.name(), "Q4 review");
    }

    #[test]
    fn test_text_buffer_ops() {
        let mut doc = SceneDocument::new();
        let id = TextId::from_string("t1");
        doc.set_text_content(&id, "hello").unwrap();
        assert_eq!(doc.text_content(&id), "hello");
        doc.insert_text(&id, 5, " world").unwrap();
        assert_eq!(doc.text_content(&id), "hello world");
        doc.delete_text(&id, 0, 6).unwrap();
        assert_eq!(doc.text_content(&id), "world");
        assert_eq!(doc.text_len(&id), 5);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut doc = SceneDocument::new();
        doc.set_name("deck").unwrap();
        let id = TextId::from_string("t1");
        doc.set_text_content(&id, "body").unwrap();

        let restored = SceneDocument::from_snapshot(&doc.export_snapshot()).unwrap();
        assert_eq!(restored.name(), "deck");
        assert_eq!(restored.text_content(&id), "body");
        assert_eq!(restored.schema_version(), SCHEMA_VERSION);
    }

    #[test]
    fn test_incremental_sync_between_documents() {
        let mut a = SceneDocument::new();
        let mut b = SceneDocument::from_snapshot(&a.export_snapshot()).unwrap();

        let since = b.version();
        a.set_name("shared").unwrap();
        b.import(&a.export_updates(&since)).unwrap();
        assert_eq!(b.name(), "shared");
    }

    #[test]
    fn test_undo_redo_name() {
        let mut doc = SceneDocument::new();
        doc.set_name("first").unwrap();
        assert!(doc.can_undo());

        assert!(doc.undo());
        assert_eq!(doc.name(), "");
        assert!(doc.can_redo());

        assert!(doc.redo());
        assert_eq!(doc.name(), "first");
    }

    #[test]
    fn test_schema_init_is_not_undoable() {
        let mut doc = SceneDocument::new();
        assert!(!doc.can_undo());
        assert!(!doc.undo());
        assert_eq!(doc.schema_version(), SCHEMA_VERSION);
    }

    #[test]
    fn test_clone_preserves_state_with_fresh_history() {
        let mut doc = SceneDocument::new();
        doc.set_name("original").unwrap();
        let copy = doc.clone();
        assert_eq!(copy.name(), "original");
        assert!(!copy.can_undo());
    }

    #[test]
    fn test_ref_scan_helpers() {
        let doc = SceneDocument::new();
        let list = doc.root_list();
        let a = ChildRef::Object(ObjectId::from_string("a"));
        let b = ChildRef::Container(ContainerId::from_string("b"));
        insert_ref(&list, None, &a).unwrap();
        insert_ref(&list, None, &b).unwrap();
        insert_ref(&list, Some(0), &ChildRef::Object(ObjectId::from_string("c"))).unwrap();
        doc.commit();

        assert_eq!(ref_index(&list, &a), Some(1));
        assert_eq!(ref_index(&list, &b), Some(2));
        assert!(remove_ref(&list, &a).unwrap());
        assert!(!remove_ref(&list, &a).unwrap());
        doc.commit();

        let refs = doc.root_refs();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1], b);
    }
}
