//! Object lifecycle, geometry setters, and sibling z-order.

use kurbo::{Point, Rect, Size, Vec2};
use loro::LoroMap;

use crate::crdt::{
    delete_key, insert_ref, object_to_loro, ref_index, remove_ref, touch_record,
    write_object_patch, write_shape_field, write_text_field, SceneDocument, KEY_HEIGHT,
    KEY_HIDDEN, KEY_PARENT, KEY_PIVOT_X, KEY_PIVOT_Y, KEY_ROTATION, KEY_VIEW, KEY_WIDTH, KEY_X,
    KEY_Y,
};
use crate::error::{SceneError, SceneResult};
use crate::id::{ContainerId, ObjectId, TextId, ViewId};
use crate::model::{
    ChildRef, ObjectKind, ObjectPatch, ObjectRecord, ObjectType, Scope, ShapeStyleField,
    TextStyleField,
};
use crate::resolve::resolve_object;
use crate::transform::rotate_vec;

/// Offset applied to a duplicate when the caller does not pick one.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

enum Slot {
    Front,
    Back,
    Forward,
    Backward,
    Index(usize),
}

impl SceneDocument {
    /// Create an object of the given type at a local position. The scope
    /// reference lands at `index` within the parent scope, clamped to the
    /// end. A text box gets a fresh collaborative buffer; a line starts
    /// with a horizontal two-point path spanning its box.
    ///
    /// When `view` is set the position is relative to that view's origin.
    #[allow(clippy::too_many_arguments)]
    pub fn create_object(
        &mut self,
        ty: ObjectType,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        parent: Option<&ContainerId>,
        index: Option<usize>,
        view: Option<&ViewId>,
    ) -> SceneResult<ObjectId> {
        let mut kind = ObjectKind::empty(ty);
        match &mut kind {
            ObjectKind::TextBox { buffer } => *buffer = Some(TextId::generate()),
            ObjectKind::Line { points } => {
                *points = Some(vec![Point::new(0.0, h / 2.0), Point::new(w, h / 2.0)]);
            }
            _ => {}
        }
        let mut record = ObjectRecord::new(ObjectId::generate(), kind);
        record.parent = parent.cloned();
        record.view = view.cloned();
        record.position = Some(Point::new(x, y));
        record.size = Some(Size::new(w, h));
        self.add_object(record, index)
    }

    /// [`create_object`](Self::create_object) from a wire type tag, for
    /// tool palettes that carry the tag as a string.
    #[allow(clippy::too_many_arguments)]
    pub fn create_object_from_tag(
        &mut self,
        tag: &str,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        parent: Option<&ContainerId>,
        index: Option<usize>,
        view: Option<&ViewId>,
    ) -> SceneResult<ObjectId> {
        let ty: ObjectType = tag.parse()?;
        self.create_object(ty, x, y, w, h, parent, index, view)
    }

    /// Insert a prebuilt record. A dangling parent falls back to the root
    /// scope so the object stays reachable.
    pub fn add_object(
        &mut self,
        mut record: ObjectRecord,
        index: Option<usize>,
    ) -> SceneResult<ObjectId> {
        if let Some(view) = &record.view {
            if self.view_map(view).is_none() {
                return Err(SceneError::ViewNotFound(view.clone()));
            }
        }
        if let Some(parent) = &record.parent {
            if self.container_map(parent).is_none() {
                record.parent = None;
            }
        }
        self.insert_object_entry(&record, index)?;
        self.commit();
        Ok(record.id)
    }

    pub(crate) fn insert_object_entry(
        &self,
        record: &ObjectRecord,
        index: Option<usize>,
    ) -> SceneResult<()> {
        let map = self
            .objects_map()
            .insert_container(record.id.as_str(), LoroMap::new())?;
        object_to_loro(record, &map)?;
        let list = self.scope_list(&self.scope_of(record));
        insert_ref(&list, index, &ChildRef::Object(record.id.clone()))?;
        Ok(())
    }

    /// Apply a partial update. On an instance, present fields become local
    /// overrides; absent fields keep inheriting.
    pub fn update_object(&mut self, id: &ObjectId, patch: &ObjectPatch) -> SceneResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        write_object_patch(patch, &map)?;
        self.commit();
        Ok(())
    }

    pub fn set_position(&mut self, id: &ObjectId, x: f64, y: f64) -> SceneResult<()> {
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        map.insert(KEY_X, x)?;
        map.insert(KEY_Y, y)?;
        self.commit();
        Ok(())
    }

    pub fn set_size(&mut self, id: &ObjectId, w: f64, h: f64) -> SceneResult<()> {
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        map.insert(KEY_WIDTH, w)?;
        map.insert(KEY_HEIGHT, h)?;
        self.commit();
        Ok(())
    }

    /// Position and size in one step, from a local-space rectangle.
    pub fn set_bounds(&mut self, id: &ObjectId, bounds: Rect) -> SceneResult<()> {
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        map.insert(KEY_X, bounds.x0)?;
        map.insert(KEY_Y, bounds.y0)?;
        map.insert(KEY_WIDTH, bounds.width())?;
        map.insert(KEY_HEIGHT, bounds.height())?;
        self.commit();
        Ok(())
    }

    /// Set rotation in degrees, normalized to [0, 360). A concrete object
    /// rotated back to zero drops the field; an instance keeps an explicit
    /// zero so it stops inheriting.
    pub fn set_rotation(&mut self, id: &ObjectId, degrees: f64) -> SceneResult<()> {
        let Some(record) = self.object(id) else {
            return Ok(());
        };
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        let normalized = degrees.rem_euclid(360.0);
        if normalized == 0.0 && !record.ancestry.is_instance() {
            delete_key(&map, KEY_ROTATION)?;
        } else {
            map.insert(KEY_ROTATION, normalized)?;
        }
        self.commit();
        Ok(())
    }

    /// Move the rotation pivot without letting the rendered box jump: when
    /// the object is rotated, the stored position shifts to compensate.
    pub fn set_pivot(&mut self, id: &ObjectId, pivot: Point) -> SceneResult<()> {
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        if let Some(resolved) = resolve_object(self, id) {
            if resolved.rotation != 0.0 {
                let old = Vec2::new(resolved.pivot.x * resolved.w, resolved.pivot.y * resolved.h);
                let new = Vec2::new(pivot.x * resolved.w, pivot.y * resolved.h);
                let delta = new - old;
                let moved = rotate_vec(delta, resolved.rotation) - delta;
                if moved != Vec2::ZERO {
                    map.insert(KEY_X, resolved.x + moved.x)?;
                    map.insert(KEY_Y, resolved.y + moved.y)?;
                }
            }
        }
        map.insert(KEY_PIVOT_X, pivot.x)?;
        map.insert(KEY_PIVOT_Y, pivot.y)?;
        self.commit();
        Ok(())
    }

    /// Attach the object to a view, or detach it back to the global
    /// canvas. With `preserve_global_position` the stored position is
    /// rebased between the two origins so the object does not move on
    /// screen.
    pub fn set_view_association(
        &mut self,
        id: &ObjectId,
        view: Option<&ViewId>,
        preserve_global_position: bool,
    ) -> SceneResult<()> {
        let Some(record) = self.object(id) else {
            return Ok(());
        };
        if let Some(target) = view {
            if self.view_map(target).is_none() {
                return Err(SceneError::ViewNotFound(target.clone()));
            }
        }
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        if preserve_global_position {
            let origin_of = |id: &ViewId| {
                self.view(id)
                    .map(|view| view.origin().to_vec2())
                    .unwrap_or(Vec2::ZERO)
            };
            let old_origin = record.view.as_ref().map(&origin_of).unwrap_or(Vec2::ZERO);
            let new_origin = view.map(&origin_of).unwrap_or(Vec2::ZERO);
            if old_origin != new_origin {
                if let Some(resolved) = resolve_object(self, id) {
                    let local = Point::new(resolved.x, resolved.y) + old_origin - new_origin;
                    map.insert(KEY_X, local.x)?;
                    map.insert(KEY_Y, local.y)?;
                }
            }
        }
        match view {
            Some(target) => map.insert(KEY_VIEW, target.as_str())?,
            None => delete_key(&map, KEY_VIEW)?,
        }
        self.commit();
        Ok(())
    }

    /// Set one shape-style field as an inline override on the object.
    pub fn set_shape_style_field(
        &mut self,
        id: &ObjectId,
        field: ShapeStyleField,
    ) -> SceneResult<()> {
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        write_shape_field(&map, &field)?;
        self.commit();
        Ok(())
    }

    /// Set one text-style field as an inline override on the object.
    pub fn set_text_style_field(&mut self, id: &ObjectId, field: TextStyleField) -> SceneResult<()> {
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        write_text_field(&map, &field)?;
        self.commit();
        Ok(())
    }

    /// Delete an object. A placed template instance is hidden instead, so
    /// the template stays intact and the gesture can be undone per view.
    pub fn delete_object(&mut self, id: &ObjectId) -> SceneResult<()> {
        let Some(record) = self.object(id) else {
            return Ok(());
        };
        if record.is_template_instance() {
            if let Some(map) = self.object_map(id) {
                map.insert(KEY_HIDDEN, true)?;
                self.commit();
            }
            return Ok(());
        }
        self.remove_object_entry(&record)?;
        self.commit();
        Ok(())
    }

    /// Delete several objects as one undo step.
    pub fn delete_objects(&mut self, ids: &[ObjectId]) -> SceneResult<()> {
        let mut touched = false;
        for id in ids {
            let Some(record) = self.object(id) else {
                continue;
            };
            if record.is_template_instance() {
                if let Some(map) = self.object_map(id) {
                    map.insert(KEY_HIDDEN, true)?;
                    touched = true;
                }
                continue;
            }
            self.remove_object_entry(&record)?;
            touched = true;
        }
        if touched {
            self.commit();
        }
        Ok(())
    }

    /// Remove the record, its scope reference, any prototype tracking, and
    /// the text buffer it owns. Does not commit.
    pub(crate) fn remove_object_entry(&self, record: &ObjectRecord) -> SceneResult<()> {
        let list = self.scope_list(&self.scope_of(record));
        remove_ref(&list, &ChildRef::Object(record.id.clone()))?;
        for template in self.template_ids() {
            let protos = self.protos_list(&template);
            if let Some(index) = super::string_index(&protos, record.id.as_str()) {
                protos.delete(index, 1)?;
            }
        }
        if let ObjectKind::TextBox {
            buffer: Some(text),
        } = &record.kind
        {
            self.clear_text(text)?;
        }
        self.objects_map().delete(record.id.as_str())?;
        Ok(())
    }

    /// Reparent an object, keeping its stored local position. Pass `None`
    /// to lift it to the root scope. A dangling target falls back to the
    /// root as well.
    pub fn move_object(
        &mut self,
        id: &ObjectId,
        new_parent: Option<&ContainerId>,
        index: Option<usize>,
    ) -> SceneResult<()> {
        let Some(record) = self.object(id) else {
            return Ok(());
        };
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        let target = new_parent.filter(|parent| self.container_map(parent).is_some());
        let child = ChildRef::Object(record.id.clone());
        remove_ref(&self.scope_list(&self.scope_of(&record)), &child)?;
        match target {
            Some(parent) => map.insert(KEY_PARENT, parent.as_str())?,
            None => delete_key(&map, KEY_PARENT)?,
        }
        let scope = target
            .map(|parent| Scope::Container(parent.clone()))
            .unwrap_or(Scope::Root);
        insert_ref(&self.scope_list(&scope), index, &child)?;
        self.commit();
        Ok(())
    }

    /// Clone an object from its fully resolved state: the copy is concrete
    /// even when the source is an instance, and a text box gets its own
    /// buffer with the content copied over. The copy keeps the source's
    /// view; `target_view` only applies when the source has none. Returns
    /// `None` when the source is missing or cannot resolve.
    pub fn duplicate_object(
        &mut self,
        id: &ObjectId,
        offset: Option<Vec2>,
        target_view: Option<&ViewId>,
    ) -> SceneResult<Option<ObjectId>> {
        let Some(resolved) = resolve_object(self, id) else {
            return Ok(None);
        };
        let offset = offset.unwrap_or(DUPLICATE_OFFSET);

        let mut kind = resolved.kind.clone();
        if let ObjectKind::TextBox {
            buffer: Some(source),
        } = &resolved.kind
        {
            let copy = TextId::generate();
            let content = self.text_content(source);
            if !content.is_empty() {
                self.text_buffer(&copy).insert(0, &content)?;
            }
            kind = ObjectKind::TextBox { buffer: Some(copy) };
        }

        let mut record = ObjectRecord::new(ObjectId::generate(), kind);
        record.parent = resolved.parent.clone();
        record.view = resolved.view.clone().or_else(|| target_view.cloned());
        record.position = Some(Point::new(resolved.x + offset.x, resolved.y + offset.y));
        record.size = Some(Size::new(resolved.w, resolved.h));
        if resolved.rotation != 0.0 {
            record.rotation = Some(resolved.rotation);
        }
        if resolved.pivot != Point::new(0.5, 0.5) {
            record.pivot = Some(resolved.pivot);
        }
        if resolved.opacity != 1.0 {
            record.opacity = Some(resolved.opacity);
        }
        if !resolved.visible {
            record.visible = Some(false);
        }
        if resolved.locked {
            record.locked = Some(true);
        }
        record.name = resolved.name.clone();
        record.shape_style = resolved.shape_style.clone();
        record.text_style = resolved.text_style.clone();
        record.shape_overrides = resolved.shape_overrides.clone();
        record.text_overrides = resolved.text_overrides.clone();

        // the copy lands right above its source
        let list = self.scope_list(&self.scope_of(&record));
        let index = ref_index(&list, &ChildRef::Object(id.clone())).map(|i| i + 1);
        let new_id = self.add_object(record, index)?;
        Ok(Some(new_id))
    }

    // --- Sibling z-order ---

    fn reorder_ref(&mut self, id: &ObjectId, slot: Slot) -> SceneResult<bool> {
        let Some(record) = self.object(id) else {
            return Ok(false);
        };
        let list = self.scope_list(&self.scope_of(&record));
        let child = ChildRef::Object(record.id.clone());
        let Some(index) = ref_index(&list, &child) else {
            return Ok(false);
        };
        let len = list.len();
        let target = match slot {
            Slot::Front => len - 1,
            Slot::Back => 0,
            Slot::Forward => (index + 1).min(len - 1),
            Slot::Backward => index.saturating_sub(1),
            Slot::Index(i) => i.min(len - 1),
        };
        if target == index {
            return Ok(false);
        }
        list.delete(index, 1)?;
        insert_ref(&list, Some(target), &child)?;
        if let Some(map) = self.object_map(id) {
            touch_record(&map, record.object_type())?;
        }
        self.commit();
        Ok(true)
    }

    /// Move the object above all its siblings. Returns whether anything
    /// changed; the topmost object is left untouched.
    pub fn bring_to_front(&mut self, id: &ObjectId) -> SceneResult<bool> {
        self.reorder_ref(id, Slot::Front)
    }

    /// Move the object below all its siblings.
    pub fn send_to_back(&mut self, id: &ObjectId) -> SceneResult<bool> {
        self.reorder_ref(id, Slot::Back)
    }

    /// Swap the object with the sibling above it.
    pub fn bring_forward(&mut self, id: &ObjectId) -> SceneResult<bool> {
        self.reorder_ref(id, Slot::Forward)
    }

    /// Swap the object with the sibling below it.
    pub fn send_backward(&mut self, id: &ObjectId) -> SceneResult<bool> {
        self.reorder_ref(id, Slot::Backward)
    }

    /// Move the object to an exact index within its sibling scope, clamped
    /// to the scope length.
    pub fn reorder_object(&mut self, id: &ObjectId, index: usize) -> SceneResult<bool> {
        self.reorder_ref(id, Slot::Index(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ancestry;

    #[test]
    fn test_create_object_from_tag_rejects_unknown() {
        let mut doc = SceneDocument::new();
        let err = doc
            .create_object_from_tag("blob", 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap_err();
        assert!(matches!(err, SceneError::UnknownObjectType(tag) if tag == "blob"));
        assert_eq!(doc.object_count(), 0);
    }

    #[test]
    fn test_create_textbox_allocates_buffer() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::TextBox, 0.0, 0.0, 200.0, 100.0, None, None, None)
            .unwrap();
        let record = doc.object(&id).unwrap();
        let buffer = record.kind.text_buffer().cloned().unwrap();
        doc.insert_text(&buffer, 0, "hello").unwrap();
        assert_eq!(doc.text_content(&buffer), "hello");
    }

    #[test]
    fn test_create_line_spans_box_midline() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::Line, 0.0, 0.0, 200.0, 40.0, None, None, None)
            .unwrap();
        match &doc.object(&id).unwrap().kind {
            ObjectKind::Line { points } => {
                assert_eq!(
                    points,
                    &Some(vec![Point::new(0.0, 20.0), Point::new(200.0, 20.0)])
                );
            }
            other => panic!("expected a line kind, got {other:?}"),
        }
    }

    #[test]
    fn test_create_object_on_missing_view_fails() {
        let mut doc = SceneDocument::new();
        let ghost = ViewId::generate();
        let err = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, Some(&ghost))
            .unwrap_err();
        assert!(matches!(err, SceneError::ViewNotFound(id) if id == ghost));
    }

    #[test]
    fn test_setters_on_missing_object_are_noops() {
        let mut doc = SceneDocument::new();
        let ghost = ObjectId::generate();
        doc.set_position(&ghost, 1.0, 2.0).unwrap();
        doc.set_rotation(&ghost, 45.0).unwrap();
        doc.delete_object(&ghost).unwrap();
        assert_eq!(doc.object_count(), 0);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_set_rotation_normalizes_and_drops_zero() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        doc.set_rotation(&id, 450.0).unwrap();
        assert_eq!(doc.object(&id).unwrap().rotation, Some(90.0));
        doc.set_rotation(&id, -90.0).unwrap();
        assert_eq!(doc.object(&id).unwrap().rotation, Some(270.0));
        doc.set_rotation(&id, 360.0).unwrap();
        assert_eq!(doc.object(&id).unwrap().rotation, None);
    }

    #[test]
    fn test_set_rotation_zero_stays_on_instance() {
        let mut doc = SceneDocument::new();
        let proto = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        doc.set_rotation(&proto, 45.0).unwrap();
        let mut record = ObjectRecord::new(ObjectId::generate(), ObjectKind::empty(ObjectType::Rect));
        record.ancestry = Ancestry::InstanceOf(proto);
        let instance = doc.add_object(record, None).unwrap();

        doc.set_rotation(&instance, 0.0).unwrap();
        assert_eq!(doc.object(&instance).unwrap().rotation, Some(0.0));
        let resolved = resolve_object(&doc, &instance).unwrap();
        assert_eq!(resolved.rotation, 0.0);
    }

    #[test]
    fn test_set_pivot_compensates_position_under_rotation() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::Rect, 100.0, 100.0, 40.0, 20.0, None, None, None)
            .unwrap();
        doc.set_rotation(&id, 90.0).unwrap();
        doc.set_pivot(&id, Point::new(0.0, 0.0)).unwrap();

        // pivot moved from the center (20, 10) to the corner; under a 90
        // degree rotation the stored position absorbs R(d) - d
        let record = doc.object(&id).unwrap();
        let position = record.position.unwrap();
        assert!((position.x - (100.0 + 30.0)).abs() < 1e-9);
        assert!((position.y - (100.0 - 10.0)).abs() < 1e-9);
        assert_eq!(record.pivot, Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_set_pivot_without_rotation_leaves_position() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::Rect, 100.0, 100.0, 40.0, 20.0, None, None, None)
            .unwrap();
        doc.set_pivot(&id, Point::new(1.0, 1.0)).unwrap();
        let record = doc.object(&id).unwrap();
        assert_eq!(record.position, Some(Point::new(100.0, 100.0)));
        assert_eq!(record.pivot, Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_view_association_round_trip_preserves_global_position() {
        let mut doc = SceneDocument::new();
        let view = doc
            .create_view("Page", Some(Rect::new(300.0, 400.0, 1300.0, 1200.0)))
            .unwrap();
        let id = doc
            .create_object(ObjectType::Rect, 20.0, 30.0, 50.0, 50.0, None, None, Some(&view))
            .unwrap();
        let before = crate::transform::absolute_position(&doc, &resolve_object(&doc, &id).unwrap());

        doc.set_view_association(&id, None, true).unwrap();
        assert_eq!(doc.object(&id).unwrap().view, None);
        let floating = crate::transform::absolute_position(&doc, &resolve_object(&doc, &id).unwrap());
        assert_eq!(floating, before);
        assert_eq!(doc.object(&id).unwrap().position, Some(Point::new(320.0, 430.0)));

        doc.set_view_association(&id, Some(&view), true).unwrap();
        let rebound = crate::transform::absolute_position(&doc, &resolve_object(&doc, &id).unwrap());
        assert_eq!(rebound, before);
        assert_eq!(doc.object(&id).unwrap().position, Some(Point::new(20.0, 30.0)));
    }

    #[test]
    fn test_move_object_between_scopes() {
        let mut doc = SceneDocument::new();
        let group = doc.create_container(None, None).unwrap();
        let id = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();

        doc.move_object(&id, Some(&group), None).unwrap();
        assert_eq!(doc.object(&id).unwrap().parent, Some(group.clone()));
        assert!(doc.root_refs().iter().all(|r| r.object_id() != Some(&id)));
        assert_eq!(doc.children_refs(&group), vec![ChildRef::Object(id.clone())]);

        doc.move_object(&id, None, Some(0)).unwrap();
        assert_eq!(doc.object(&id).unwrap().parent, None);
        assert!(doc.children_refs(&group).is_empty());
        assert_eq!(doc.root_refs()[0], ChildRef::Object(id));
    }

    #[test]
    fn test_duplicate_expands_instance_to_concrete() {
        let mut doc = SceneDocument::new();
        let proto = doc
            .create_object(ObjectType::Rect, 10.0, 10.0, 60.0, 40.0, None, None, None)
            .unwrap();
        doc.set_shape_style_field(&proto, ShapeStyleField::StrokeWidth(Some(3.0)))
            .unwrap();
        let mut instance = ObjectRecord::new(ObjectId::generate(), ObjectKind::empty(ObjectType::Rect));
        instance.ancestry = Ancestry::InstanceOf(proto.clone());
        let instance = doc.add_object(instance, None).unwrap();

        let copy = doc.duplicate_object(&instance, None, None).unwrap().unwrap();
        let record = doc.object(&copy).unwrap();
        assert_eq!(record.ancestry, Ancestry::Concrete);
        assert_eq!(record.position, Some(Point::new(30.0, 30.0)));
        assert_eq!(record.size, Some(Size::new(60.0, 40.0)));
        assert_eq!(record.shape_overrides.stroke_width, Some(3.0));

        // the copy no longer follows the prototype
        doc.set_position(&proto, 500.0, 500.0).unwrap();
        assert_eq!(
            doc.object(&copy).unwrap().position,
            Some(Point::new(30.0, 30.0))
        );
    }

    #[test]
    fn test_duplicate_textbox_clones_buffer() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::TextBox, 0.0, 0.0, 200.0, 100.0, None, None, None)
            .unwrap();
        let buffer = doc.object(&id).unwrap().kind.text_buffer().cloned().unwrap();
        doc.set_text_content(&buffer, "agenda").unwrap();

        let copy = doc.duplicate_object(&id, None, None).unwrap().unwrap();
        let copy_buffer = doc
            .object(&copy)
            .unwrap()
            .kind
            .text_buffer()
            .cloned()
            .unwrap();
        assert_ne!(copy_buffer, buffer);
        assert_eq!(doc.text_content(&copy_buffer), "agenda");

        doc.insert_text(&buffer, 0, "my ").unwrap();
        assert_eq!(doc.text_content(&copy_buffer), "agenda");
    }

    #[test]
    fn test_delete_textbox_clears_buffer() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::TextBox, 0.0, 0.0, 200.0, 100.0, None, None, None)
            .unwrap();
        let buffer = doc.object(&id).unwrap().kind.text_buffer().cloned().unwrap();
        doc.set_text_content(&buffer, "draft").unwrap();

        doc.delete_object(&id).unwrap();
        assert!(doc.object(&id).is_none());
        assert_eq!(doc.text_content(&buffer), "");
    }

    #[test]
    fn test_duplicate_keeps_source_view_over_target() {
        let mut doc = SceneDocument::new();
        let home = doc.create_view("Home", None).unwrap();
        let active = doc.create_view("Active", None).unwrap();
        let paged = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, Some(&home))
            .unwrap();
        let floating = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();

        let copy = doc
            .duplicate_object(&paged, None, Some(&active))
            .unwrap()
            .unwrap();
        assert_eq!(doc.object(&copy).unwrap().view, Some(home));

        let copy = doc
            .duplicate_object(&floating, None, Some(&active))
            .unwrap()
            .unwrap();
        assert_eq!(doc.object(&copy).unwrap().view, Some(active));
    }

    #[test]
    fn test_duplicate_lands_above_source() {
        let mut doc = SceneDocument::new();
        let bottom = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let top = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let copy = doc.duplicate_object(&bottom, None, None).unwrap().unwrap();
        assert_eq!(
            doc.root_refs(),
            vec![
                ChildRef::Object(bottom),
                ChildRef::Object(copy),
                ChildRef::Object(top),
            ]
        );
    }

    #[test]
    fn test_z_boundary_is_idempotent() {
        let mut doc = SceneDocument::new();
        doc.create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let top = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();

        let before = doc.export_snapshot();
        assert!(!doc.bring_to_front(&top).unwrap());
        assert!(!doc.bring_forward(&top).unwrap());
        assert_eq!(doc.export_snapshot(), before);
    }

    #[test]
    fn test_forward_backward_step_one() {
        let mut doc = SceneDocument::new();
        let a = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let b = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let c = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();

        assert!(doc.bring_forward(&a).unwrap());
        assert_eq!(
            doc.root_refs(),
            vec![
                ChildRef::Object(b.clone()),
                ChildRef::Object(a.clone()),
                ChildRef::Object(c.clone()),
            ]
        );
        assert!(doc.send_backward(&c).unwrap());
        assert_eq!(
            doc.root_refs(),
            vec![ChildRef::Object(b), ChildRef::Object(c), ChildRef::Object(a)]
        );
    }

    #[test]
    fn test_reorder_object_to_index() {
        let mut doc = SceneDocument::new();
        let a = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let b = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let c = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();

        assert!(doc.reorder_object(&c, 0).unwrap());
        assert_eq!(
            doc.root_refs(),
            vec![
                ChildRef::Object(c.clone()),
                ChildRef::Object(a.clone()),
                ChildRef::Object(b.clone()),
            ]
        );
        assert!(!doc.reorder_object(&c, 0).unwrap());
        assert!(doc.reorder_object(&c, 99).unwrap());
        assert_eq!(
            doc.root_refs(),
            vec![ChildRef::Object(a), ChildRef::Object(b), ChildRef::Object(c)]
        );
    }

    #[test]
    fn test_delete_objects_single_undo_step() {
        let mut doc = SceneDocument::new();
        let a = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let b = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        doc.clear_undo_history();

        doc.delete_objects(&[a, b]).unwrap();
        assert_eq!(doc.object_count(), 0);
        assert!(doc.undo());
        assert_eq!(doc.object_count(), 2);
        assert!(!doc.can_undo());
    }
}
