//! Prototype resolution.
//!
//! Inheritance is exactly one level deep: an instance points at a
//! prototype and overlays every field it stores locally. Presence of the
//! stored field, not its value, decides whether an override applies. The
//! prototype's own ancestry is deliberately ignored, so chained data
//! resolves at the single level encountered instead of recursing.

use kurbo::Point;

use crate::crdt::{self, SceneDocument};
use crate::error::SceneResult;
use crate::id::ObjectId;
use crate::model::{Ancestry, ObjectRecord, ObjectType, ResolvedObject};

/// Resolve an object by id. Returns `None` for unknown ids and for
/// structurally incomplete objects.
pub fn resolve_object(doc: &SceneDocument, id: &ObjectId) -> Option<ResolvedObject> {
    let record = doc.object(id)?;
    resolve_record(doc, &record)
}

/// Resolve an already-loaded record.
///
/// An object that cannot produce both a position and a size, from its own
/// fields or its prototype's, is structurally incomplete and resolves to
/// `None` with a diagnostic warning. Template prototypes awaiting their
/// base fields hit this path routinely, so it is not an error.
pub fn resolve_record(doc: &SceneDocument, record: &ObjectRecord) -> Option<ResolvedObject> {
    let proto = match &record.ancestry {
        Ancestry::InstanceOf(id) => doc.object(id),
        Ancestry::Concrete => None,
    };

    let position = record.position.or(proto.as_ref().and_then(|p| p.position));
    let size = record.size.or(proto.as_ref().and_then(|p| p.size));
    let (Some(position), Some(size)) = (position, size) else {
        log::warn!("object {} has no position/size of its own or via a prototype", record.id);
        return None;
    };

    let kind = match &proto {
        Some(proto) => record.kind.merged_over(&proto.kind),
        None => record.kind.clone(),
    };

    // The named style references come from the prototype when one exists;
    // an instance's own references are never consulted.
    let (shape_style, text_style) = match &proto {
        Some(proto) => (proto.shape_style.clone(), proto.text_style.clone()),
        None => (record.shape_style.clone(), record.text_style.clone()),
    };
    let (shape_overrides, text_overrides) = match &proto {
        Some(proto) => (
            record.shape_overrides.merged_over(&proto.shape_overrides),
            record.text_overrides.merged_over(&proto.text_overrides),
        ),
        None => (record.shape_overrides.clone(), record.text_overrides.clone()),
    };

    let field = |own: Option<f64>, inherited: fn(&ObjectRecord) -> Option<f64>| {
        own.or(proto.as_ref().and_then(inherited))
    };

    Some(ResolvedObject {
        id: record.id.clone(),
        kind,
        prototype: record.ancestry.prototype().cloned(),
        parent: record
            .parent
            .clone()
            .or(proto.as_ref().and_then(|p| p.parent.clone())),
        view: record
            .view
            .clone()
            .or(proto.as_ref().and_then(|p| p.view.clone())),
        x: position.x,
        y: position.y,
        w: size.width,
        h: size.height,
        rotation: field(record.rotation, |p| p.rotation).unwrap_or(0.0),
        pivot: record
            .pivot
            .or(proto.as_ref().and_then(|p| p.pivot))
            .unwrap_or(Point::new(0.5, 0.5)),
        opacity: field(record.opacity, |p| p.opacity).unwrap_or(1.0),
        visible: record
            .visible
            .or(proto.as_ref().and_then(|p| p.visible))
            .unwrap_or(true),
        locked: record
            .locked
            .or(proto.as_ref().and_then(|p| p.locked))
            .unwrap_or(false),
        hidden: record
            .hidden
            .or(proto.as_ref().and_then(|p| p.hidden))
            .unwrap_or(false),
        name: record
            .name
            .clone()
            .or(proto.as_ref().and_then(|p| p.name.clone())),
        shape_style,
        text_style,
        shape_overrides,
        text_overrides,
    })
}

/// Property groups an instance can override independently of its
/// prototype. A group is "unlocked" when the instance stores it locally
/// and "locked" (inherited) otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyGroup {
    Position,
    Size,
    Rotation,
    Pivot,
    Opacity,
    ShapeStyle,
    TextStyle,
    CornerRadius,
    TypeSpecific,
}

impl SceneDocument {
    /// Whether the object stores the group locally instead of inheriting
    /// it. Unknown ids report `false`.
    pub fn group_overridden(&self, id: &ObjectId, group: PropertyGroup) -> bool {
        let Some(record) = self.object(id) else {
            return false;
        };
        match group {
            PropertyGroup::Position => record.position.is_some(),
            PropertyGroup::Size => record.size.is_some(),
            PropertyGroup::Rotation => record.rotation.is_some(),
            PropertyGroup::Pivot => record.pivot.is_some(),
            PropertyGroup::Opacity => record.opacity.is_some(),
            PropertyGroup::ShapeStyle => !record.shape_overrides.is_empty(),
            PropertyGroup::TextStyle => !record.text_overrides.is_empty(),
            PropertyGroup::CornerRadius => {
                record.kind.corner_radius().is_some()
                    || record.shape_overrides.corner_radius.is_some()
            }
            PropertyGroup::TypeSpecific => record.kind.has_local_fields(),
        }
    }

    /// Copy the currently resolved value of a group down onto the object
    /// as a local override. No-op for unknown or structurally incomplete
    /// objects.
    pub fn unlock_group(&mut self, id: &ObjectId, group: PropertyGroup) -> SceneResult<()> {
        let Some(resolved) = resolve_object(self, id) else {
            return Ok(());
        };
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        match group {
            PropertyGroup::Position => {
                map.insert(crdt::KEY_X, resolved.x)?;
                map.insert(crdt::KEY_Y, resolved.y)?;
            }
            PropertyGroup::Size => {
                map.insert(crdt::KEY_WIDTH, resolved.w)?;
                map.insert(crdt::KEY_HEIGHT, resolved.h)?;
            }
            PropertyGroup::Rotation => {
                map.insert(crdt::KEY_ROTATION, resolved.rotation)?;
            }
            PropertyGroup::Pivot => {
                map.insert(crdt::KEY_PIVOT_X, resolved.pivot.x)?;
                map.insert(crdt::KEY_PIVOT_Y, resolved.pivot.y)?;
            }
            PropertyGroup::Opacity => {
                map.insert(crdt::KEY_OPACITY, resolved.opacity)?;
            }
            PropertyGroup::ShapeStyle => {
                crdt::write_shape_fields(&resolved.shape_overrides, &map)?;
            }
            PropertyGroup::TextStyle => {
                crdt::write_text_fields(&resolved.text_overrides, &map)?;
            }
            PropertyGroup::CornerRadius => {
                let radius = crate::styles::corner_radius_of(self, &resolved);
                if resolved.object_type() == ObjectType::Rect {
                    map.insert(crdt::KEY_RADIUS, radius)?;
                } else {
                    map.insert(crdt::KEY_CORNER_RADIUS, radius)?;
                }
            }
            PropertyGroup::TypeSpecific => {
                crdt::write_kind_fields(&resolved.kind, &map)?;
            }
        }
        self.commit();
        Ok(())
    }

    /// Delete the group's locally stored fields, reverting the object to
    /// inheriting them. No-op for unknown objects.
    pub fn reset_group(&mut self, id: &ObjectId, group: PropertyGroup) -> SceneResult<()> {
        let Some(record) = self.object(id) else {
            return Ok(());
        };
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        match group {
            PropertyGroup::Position => {
                crdt::delete_key(&map, crdt::KEY_X)?;
                crdt::delete_key(&map, crdt::KEY_Y)?;
            }
            PropertyGroup::Size => {
                crdt::delete_key(&map, crdt::KEY_WIDTH)?;
                crdt::delete_key(&map, crdt::KEY_HEIGHT)?;
            }
            PropertyGroup::Rotation => {
                crdt::delete_key(&map, crdt::KEY_ROTATION)?;
            }
            PropertyGroup::Pivot => {
                crdt::delete_key(&map, crdt::KEY_PIVOT_X)?;
                crdt::delete_key(&map, crdt::KEY_PIVOT_Y)?;
            }
            PropertyGroup::Opacity => {
                crdt::delete_key(&map, crdt::KEY_OPACITY)?;
            }
            PropertyGroup::ShapeStyle => {
                for key in crdt::SHAPE_FIELD_KEYS {
                    crdt::delete_key(&map, key)?;
                }
            }
            PropertyGroup::TextStyle => {
                for key in crdt::TEXT_FIELD_KEYS {
                    crdt::delete_key(&map, key)?;
                }
            }
            PropertyGroup::CornerRadius => {
                crdt::delete_key(&map, crdt::KEY_RADIUS)?;
                crdt::delete_key(&map, crdt::KEY_CORNER_RADIUS)?;
            }
            PropertyGroup::TypeSpecific => {
                // The rich-text buffer reference is structural, not an
                // overridable payload field; it survives a reset.
                for key in crdt::payload_keys(record.object_type()) {
                    if *key != crdt::KEY_BUFFER {
                        crdt::delete_key(&map, key)?;
                    }
                }
            }
        }
        self.commit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use crate::model::{ObjectKind, ObjectPatch, Paint, ShapeStyleFields};

    fn proto_record() -> ObjectRecord {
        let mut record = ObjectRecord::new(
            ObjectId::generate(),
            ObjectKind::Rect { radius: Some(8.0) },
        );
        record.position = Some(Point::new(10.0, 20.0));
        record.size = Some(Size::new(100.0, 50.0));
        record.name = Some("Proto".to_string());
        record.shape_overrides = ShapeStyleFields {
            fill: Some(Paint::color("#ff0000")),
            ..ShapeStyleFields::default()
        };
        record
    }

    fn instance_record(proto: &ObjectId) -> ObjectRecord {
        let mut record = ObjectRecord::new(
            ObjectId::generate(),
            ObjectKind::empty(ObjectType::Rect),
        );
        record.ancestry = Ancestry::InstanceOf(proto.clone());
        record
    }

    #[test]
    fn test_concrete_resolution_defaults() {
        let mut doc = SceneDocument::new();
        let id = doc
            .create_object(ObjectType::Rect, 5.0, 6.0, 70.0, 80.0, None, None, None)
            .unwrap();

        let resolved = resolve_object(&doc, &id).unwrap();
        assert_eq!(resolved.x, 5.0);
        assert_eq!(resolved.w, 70.0);
        assert_eq!(resolved.rotation, 0.0);
        assert_eq!(resolved.pivot, Point::new(0.5, 0.5));
        assert_eq!(resolved.opacity, 1.0);
        assert!(resolved.visible);
        assert!(!resolved.locked);
        assert!(!resolved.hidden);
        assert!(resolved.prototype.is_none());
    }

    #[test]
    fn test_instance_inherits_prototype_fields() {
        let mut doc = SceneDocument::new();
        let proto = doc.add_object(proto_record(), None).unwrap();
        let instance = doc.add_object(instance_record(&proto), None).unwrap();

        let resolved = resolve_object(&doc, &instance).unwrap();
        assert_eq!(resolved.x, 10.0);
        assert_eq!(resolved.w, 100.0);
        assert_eq!(resolved.name.as_deref(), Some("Proto"));
        assert_eq!(resolved.kind, ObjectKind::Rect { radius: Some(8.0) });
        assert_eq!(resolved.shape_overrides.fill, Some(Paint::color("#ff0000")));
        assert_eq!(resolved.prototype.as_ref(), Some(&proto));
    }

    #[test]
    fn test_instance_local_field_wins() {
        let mut doc = SceneDocument::new();
        let proto = doc.add_object(proto_record(), None).unwrap();
        let mut record = instance_record(&proto);
        record.position = Some(Point::new(500.0, 500.0));
        let instance = doc.add_object(record, None).unwrap();

        let resolved = resolve_object(&doc, &instance).unwrap();
        assert_eq!(resolved.x, 500.0);
        // Size still inherited
        assert_eq!(resolved.w, 100.0);
    }

    #[test]
    fn test_structurally_incomplete_resolves_to_none() {
        let mut doc = SceneDocument::new();
        let record = ObjectRecord::new(ObjectId::generate(), ObjectKind::empty(ObjectType::Rect));
        let id = doc.add_object(record, None).unwrap();

        assert!(resolve_object(&doc, &id).is_none());
    }

    #[test]
    fn test_prototype_chain_is_not_followed() {
        let mut doc = SceneDocument::new();
        let grand = doc.add_object(proto_record(), None).unwrap();

        // Violating data: a prototype that is itself an instance
        let mut middle_record = instance_record(&grand);
        middle_record.position = Some(Point::new(1.0, 1.0));
        middle_record.size = Some(Size::new(2.0, 2.0));
        let middle = doc.add_object(middle_record, None).unwrap();

        let instance = doc.add_object(instance_record(&middle), None).unwrap();
        let resolved = resolve_object(&doc, &instance).unwrap();

        // The middle record's own fields apply; the grandparent's do not
        assert_eq!(resolved.x, 1.0);
        assert_eq!(resolved.w, 2.0);
        assert_eq!(resolved.name, None);
    }

    #[test]
    fn test_dangling_prototype_with_own_fields_still_resolves() {
        let mut doc = SceneDocument::new();
        let mut record = instance_record(&ObjectId::generate());
        record.position = Some(Point::new(3.0, 4.0));
        record.size = Some(Size::new(30.0, 40.0));
        let id = doc.add_object(record, None).unwrap();

        let resolved = resolve_object(&doc, &id).unwrap();
        assert_eq!(resolved.x, 3.0);
        assert_eq!(resolved.h, 40.0);
    }

    #[test]
    fn test_group_lock_cycle() {
        let mut doc = SceneDocument::new();
        let proto = doc.add_object(proto_record(), None).unwrap();
        let instance = doc.add_object(instance_record(&proto), None).unwrap();

        assert!(!doc.group_overridden(&instance, PropertyGroup::Position));

        doc.unlock_group(&instance, PropertyGroup::Position).unwrap();
        assert!(doc.group_overridden(&instance, PropertyGroup::Position));
        let stored = doc.object(&instance).unwrap();
        assert_eq!(stored.position, Some(Point::new(10.0, 20.0)));

        // A later prototype move no longer affects the unlocked instance
        doc.update_object(&proto, &ObjectPatch::position(999.0, 999.0))
            .unwrap();
        assert_eq!(resolve_object(&doc, &instance).unwrap().x, 10.0);

        doc.reset_group(&instance, PropertyGroup::Position).unwrap();
        assert!(!doc.group_overridden(&instance, PropertyGroup::Position));
        assert_eq!(resolve_object(&doc, &instance).unwrap().x, 999.0);
    }

    #[test]
    fn test_reset_shape_style_group() {
        let mut doc = SceneDocument::new();
        let mut record = proto_record();
        record.shape_overrides.stroke = Some(Paint::color("#00ff00"));
        let id = doc.add_object(record, None).unwrap();

        assert!(doc.group_overridden(&id, PropertyGroup::ShapeStyle));
        doc.reset_group(&id, PropertyGroup::ShapeStyle).unwrap();
        assert!(!doc.group_overridden(&id, PropertyGroup::ShapeStyle));
    }
}
