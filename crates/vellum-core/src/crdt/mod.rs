//! CRDT integration using Loro for collaborative editing.
//!
//! This module bridges the scene model and Loro's CRDT document.
//!
//! # Schema
//!
//! ```text
//! LoroDoc
//! ├── "name": LoroText (document name)
//! ├── "meta": LoroMap (schema version, active palette)
//! ├── "objects": LoroMap<ObjectId, LoroMap> (object records)
//! ├── "containers": LoroMap<ContainerId, LoroMap> (container records)
//! ├── "root": LoroList<String> (encoded child refs, root z-order)
//! ├── "children:<id>": LoroList<String> (child refs per container)
//! ├── "views": LoroMap<ViewId, LoroMap> (view records)
//! ├── "view_order": LoroList<String> (presentation order)
//! ├── "styles": LoroMap<StyleId, LoroMap> (style records)
//! ├── "palettes": LoroMap<PaletteId, LoroMap> (palette records)
//! ├── "templates": LoroMap<TemplateId, LoroMap> (template records)
//! ├── "protos:<id>": LoroList<String> (prototype ids per template)
//! └── "text:<id>": LoroText (rich-text buffer per textbox)
//! ```
//!
//! Record maps store one key per field, and updates write only the fields
//! they change, so concurrent edits to different fields of one record both
//! survive the merge.

mod convert;
mod schema;

pub use schema::{
    CHILDREN_PREFIX, CONTAINERS_KEY, LOCAL_ORIGIN, META_KEY, NAME_KEY, OBJECTS_KEY,
    PALETTES_KEY, PROTOS_PREFIX, ROOT_KEY, STYLES_KEY, SceneDocument, TEMPLATES_KEY, TEXT_PREFIX,
    VIEWS_KEY, VIEW_ORDER_KEY,
};

pub(crate) use convert::*;
pub(crate) use schema::{insert_ref, ref_index, remove_ref};

// Re-export Loro types that may be useful for collaboration
pub use loro::{ExportMode, VersionVector};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildRef, ObjectType};

    #[test]
    fn test_document_creation() {
        let doc = SceneDocument::new();
        assert_eq!(doc.object_count(), 0);
        assert!(doc.all_views().is_empty());
    }

    #[test]
    fn test_create_and_read_object() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::Rect, 100.0, 200.0, 50.0, 30.0, None, None, None)
            .unwrap();

        assert_eq!(doc.object_count(), 1);
        let record = doc.object(&id).unwrap();
        assert_eq!(record.object_type(), ObjectType::Rect);
        assert_eq!(record.position.unwrap().x, 100.0);
        assert_eq!(record.size.unwrap().height, 30.0);
        assert!(doc.root_refs().contains(&ChildRef::Object(id)));
    }

    #[test]
    fn test_delete_object() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::Ellipse, 0.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();
        assert_eq!(doc.object_count(), 1);

        doc.delete_object(&id).unwrap();
        assert_eq!(doc.object_count(), 0);
        assert!(doc.root_refs().is_empty());
    }

    #[test]
    fn test_z_order_manipulation() {
        let mut doc = SceneDocument::new();
        let id1 = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 50.0, 50.0, None, None, None)
            .unwrap();
        let id2 = doc
            .create_object(ObjectType::Rect, 25.0, 25.0, 50.0, 50.0, None, None, None)
            .unwrap();

        let order = doc.root_refs();
        assert_eq!(order[0], ChildRef::Object(id1.clone()));
        assert_eq!(order[1], ChildRef::Object(id2.clone()));

        assert!(doc.bring_to_front(&id1).unwrap());
        let order = doc.root_refs();
        assert_eq!(order[0], ChildRef::Object(id2.clone()));
        assert_eq!(order[1], ChildRef::Object(id1.clone()));

        assert!(doc.send_to_back(&id1).unwrap());
        let order = doc.root_refs();
        assert_eq!(order[0], ChildRef::Object(id1));
        assert_eq!(order[1], ChildRef::Object(id2));
    }

    #[test]
    fn test_export_import() {
        let mut doc = SceneDocument::new();
        doc.create_object(ObjectType::Rect, 10.0, 20.0, 100.0, 50.0, None, None, None)
            .unwrap();

        let bytes = doc.export_snapshot();
        let doc2 = SceneDocument::from_snapshot(&bytes).unwrap();
        assert_eq!(doc2.object_count(), 1);
        assert_eq!(doc2.root_refs().len(), 1);
    }

    #[test]
    fn test_undo_create_object() {
        let mut doc = SceneDocument::new();
        doc.create_object(ObjectType::Rect, 100.0, 200.0, 50.0, 30.0, None, None, None)
            .unwrap();

        assert_eq!(doc.object_count(), 1);
        assert!(doc.can_undo());

        assert!(doc.undo());
        assert_eq!(doc.object_count(), 0);
        assert!(doc.can_redo());

        assert!(doc.redo());
        assert_eq!(doc.object_count(), 1);
    }

    #[test]
    fn test_undo_delete_object() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();

        // Clear undo history so only the delete is tracked
        doc.clear_undo_history();

        doc.delete_object(&id).unwrap();
        assert_eq!(doc.object_count(), 0);

        assert!(doc.undo());
        assert_eq!(doc.object_count(), 1);
        assert_eq!(doc.root_refs().len(), 1);
    }

    #[test]
    fn test_concurrent_field_edits_both_survive() {
        let mut a = SceneDocument::new();
        let id = a
            .create_object(ObjectType::Rect, 0.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();
        let mut b = SceneDocument::from_snapshot(&a.export_snapshot()).unwrap();

        let seen_by_a = a.version();
        let seen_by_b = b.version();

        // Two clients edit different fields of the same record
        a.set_position(&id, 50.0, 60.0).unwrap();
        b.set_size(&id, 300.0, 200.0).unwrap();

        b.import(&a.export_updates(&seen_by_b)).unwrap();
        a.import(&b.export_updates(&seen_by_a)).unwrap();

        for doc in [&a, &b] {
            let record = doc.object(&id).unwrap();
            assert_eq!(record.position.unwrap().x, 50.0);
            assert_eq!(record.position.unwrap().y, 60.0);
            assert_eq!(record.size.unwrap().width, 300.0);
            assert_eq!(record.size.unwrap().height, 200.0);
        }
    }

    #[test]
    fn test_concurrent_inserts_both_survive() {
        let mut a = SceneDocument::new();
        let mut b = SceneDocument::from_snapshot(&a.export_snapshot()).unwrap();

        let seen_by_a = a.version();
        let seen_by_b = b.version();

        let id_a = a
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let id_b = b
            .create_object(ObjectType::Ellipse, 5.0, 5.0, 10.0, 10.0, None, None, None)
            .unwrap();

        b.import(&a.export_updates(&seen_by_b)).unwrap();
        a.import(&b.export_updates(&seen_by_a)).unwrap();

        for doc in [&a, &b] {
            assert_eq!(doc.object_count(), 2);
            let refs = doc.root_refs();
            assert!(refs.contains(&ChildRef::Object(id_a.clone())));
            assert!(refs.contains(&ChildRef::Object(id_b.clone())));
        }
        assert_eq!(a.root_refs(), b.root_refs());
    }
}
