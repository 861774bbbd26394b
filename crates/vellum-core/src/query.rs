//! Spatial and z-order queries.
//!
//! Z-order is the depth-first walk of the child reference lists, root
//! order first, later entries on top. Template prototypes are authoring
//! metadata: they never show up in page enumeration or hit tests, and
//! appear in the full traversal only on request.

use std::collections::{HashMap, HashSet};

use kurbo::{Point, Rect};

use crate::crdt::SceneDocument;
use crate::id::{ContainerId, ObjectId, ViewId};
use crate::model::{ChildRef, ResolvedObject};
use crate::resolve::resolve_object;
use crate::transform::{absolute_bounds, bounds_intersect, bounds_within};

/// Fraction of the smaller bounding box two objects must share to count
/// as stacked.
pub const DEFAULT_STACK_OVERLAP: f64 = 0.5;

fn collect_scope(
    doc: &SceneDocument,
    refs: &[ChildRef],
    prototypes: &HashSet<ObjectId>,
    include_prototypes: bool,
    visited: &mut HashSet<ContainerId>,
    out: &mut Vec<ResolvedObject>,
) {
    for child in refs {
        match child {
            ChildRef::Object(id) => {
                if !include_prototypes && prototypes.contains(id) {
                    continue;
                }
                let Some(resolved) = resolve_object(doc, id) else {
                    continue;
                };
                if !resolved.visible {
                    continue;
                }
                out.push(resolved);
            }
            ChildRef::Container(id) => {
                if !visited.insert(id.clone()) {
                    continue;
                }
                let Some(container) = doc.container(id) else {
                    continue;
                };
                if !container.visible {
                    continue;
                }
                let children = doc.children_refs(id);
                collect_scope(doc, &children, prototypes, include_prototypes, visited, out);
            }
        }
    }
}

/// All resolvable objects in render order, back to front. Invisible
/// objects and the contents of invisible containers are skipped.
pub fn z_ordered(doc: &SceneDocument, include_prototypes: bool) -> Vec<ResolvedObject> {
    let prototypes = doc.prototype_ids();
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    let root = doc.root_refs();
    collect_scope(doc, &root, &prototypes, include_prototypes, &mut visited, &mut out);
    out
}

/// Objects visible on a view, in render order: objects associated with it,
/// plus floating objects whose bounds cross its rectangle. Instances
/// hidden on the view are left out.
pub fn objects_on_view(doc: &SceneDocument, view_id: &ViewId) -> Vec<ResolvedObject> {
    let Some(view) = doc.view(view_id) else {
        return Vec::new();
    };
    let view_rect = view.rect();
    z_ordered(doc, false)
        .into_iter()
        .filter(|object| {
            if object.hidden {
                return false;
            }
            match &object.view {
                Some(v) => v == view_id,
                None => bounds_intersect(absolute_bounds(doc, object), view_rect),
            }
        })
        .collect()
}

/// Hit test: objects whose absolute bounds contain the point, front to
/// back for selection priority.
pub fn objects_at_point(doc: &SceneDocument, point: Point) -> Vec<ResolvedObject> {
    let mut hits: Vec<ResolvedObject> = z_ordered(doc, false)
        .into_iter()
        .filter(|object| !object.hidden && absolute_bounds(doc, object).contains(point))
        .collect();
    hits.reverse();
    hits
}

/// Objects whose absolute bounds overlap the rectangle, in render order.
pub fn objects_in_rect(doc: &SceneDocument, rect: Rect) -> Vec<ResolvedObject> {
    z_ordered(doc, false)
        .into_iter()
        .filter(|object| !object.hidden && bounds_intersect(absolute_bounds(doc, object), rect))
        .collect()
}

/// Objects whose absolute bounds lie entirely inside the rectangle.
pub fn objects_contained_in_rect(doc: &SceneDocument, rect: Rect) -> Vec<ResolvedObject> {
    z_ordered(doc, false)
        .into_iter()
        .filter(|object| !object.hidden && bounds_within(absolute_bounds(doc, object), rect))
        .collect()
}

fn overlap_fraction(a: Rect, b: Rect) -> f64 {
    let overlap = a.intersect(b).area();
    let smaller = a.area().min(b.area());
    if smaller <= 0.0 {
        0.0
    } else {
        overlap / smaller
    }
}

/// Objects stacked on top of the given ones: unlocked, visible,
/// non-prototype objects overlapping a member by at least
/// [`DEFAULT_STACK_OVERLAP`] of the smaller box at a strictly higher
/// z-index, closed transitively. Drag logic moves these along.
pub fn stacked_objects(doc: &SceneDocument, ids: &[ObjectId]) -> Vec<ObjectId> {
    stacked_objects_with(doc, ids, DEFAULT_STACK_OVERLAP)
}

/// [`stacked_objects`] with a caller-chosen overlap fraction.
pub fn stacked_objects_with(
    doc: &SceneDocument,
    ids: &[ObjectId],
    min_overlap: f64,
) -> Vec<ObjectId> {
    let order = z_ordered(doc, false);
    let bounds: Vec<Rect> = order
        .iter()
        .map(|object| absolute_bounds(doc, object))
        .collect();
    let index_of: HashMap<&ObjectId, usize> = order
        .iter()
        .enumerate()
        .map(|(i, object)| (&object.id, i))
        .collect();

    let mut members: HashSet<usize> = ids.iter().filter_map(|id| index_of.get(id).copied()).collect();
    let mut changed = true;
    while changed {
        changed = false;
        for (i, object) in order.iter().enumerate() {
            if members.contains(&i) || object.locked || object.hidden {
                continue;
            }
            let covers_member = members
                .iter()
                .any(|&j| j < i && overlap_fraction(bounds[i], bounds[j]) >= min_overlap);
            if covers_member {
                members.insert(i);
                changed = true;
            }
        }
    }

    order
        .iter()
        .enumerate()
        .filter(|(i, object)| members.contains(i) && !ids.contains(&object.id))
        .map(|(_, object)| object.id.clone())
        .collect()
}

/// Union of the absolute bounds of everything in the document, prototypes
/// included. Used for fit-to-content.
pub fn content_bounds(doc: &SceneDocument) -> Option<Rect> {
    let mut result: Option<Rect> = None;
    for object in z_ordered(doc, true) {
        let bounds = absolute_bounds(doc, &object);
        result = Some(match result {
            Some(r) => r.union(bounds),
            None => bounds,
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectPatch, ObjectType};

    fn ids(objects: &[ResolvedObject]) -> Vec<ObjectId> {
        objects.iter().map(|o| o.id.clone()).collect()
    }

    #[test]
    fn test_z_order_depth_first() {
        let mut doc = SceneDocument::new();
        let a = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let group = doc.create_container(None, None).unwrap();
        let b = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, Some(&group), None, None)
            .unwrap();
        let c = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, Some(&group), None, None)
            .unwrap();
        let d = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();

        assert_eq!(ids(&z_ordered(&doc, false)), vec![a, b, c, d]);
    }

    #[test]
    fn test_invisible_container_hides_subtree() {
        let mut doc = SceneDocument::new();
        let group = doc.create_container(None, None).unwrap();
        doc.create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, Some(&group), None, None)
            .unwrap();
        let visible = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        doc.update_container(
            &group,
            &crate::model::ContainerPatch {
                visible: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(ids(&z_ordered(&doc, false)), vec![visible]);
    }

    #[test]
    fn test_invisible_object_skipped() {
        let mut doc = SceneDocument::new();
        let hidden = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let shown = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        doc.update_object(
            &hidden,
            &ObjectPatch {
                visible: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(ids(&z_ordered(&doc, false)), vec![shown]);
    }

    #[test]
    fn test_prototypes_excluded_unless_requested() {
        let mut doc = SceneDocument::new();
        let proto = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let plain = doc
            .create_object(ObjectType::Rect, 50.0, 50.0, 10.0, 10.0, None, None, None)
            .unwrap();
        let template = doc.create_template("Deck").unwrap();
        doc.add_prototype(&template, &proto).unwrap();

        assert_eq!(ids(&z_ordered(&doc, false)), vec![plain.clone()]);
        assert_eq!(ids(&z_ordered(&doc, true)), vec![proto.clone(), plain]);

        // Hit tests never see prototypes
        assert!(ids(&objects_at_point(&doc, Point::new(5.0, 5.0))).is_empty());
    }

    #[test]
    fn test_objects_on_view_membership() {
        let mut doc = SceneDocument::new();
        let page = doc
            .create_view("A", Some(Rect::new(0.0, 0.0, 1000.0, 800.0)))
            .unwrap();
        let other = doc
            .create_view("B", Some(Rect::new(2000.0, 0.0, 3000.0, 800.0)))
            .unwrap();

        let bound = doc
            .create_object(ObjectType::Rect, 10.0, 10.0, 100.0, 100.0, None, None, Some(&page))
            .unwrap();
        let floating = doc
            .create_object(ObjectType::Rect, 500.0, 500.0, 100.0, 100.0, None, None, None)
            .unwrap();
        let elsewhere = doc
            .create_object(ObjectType::Rect, 10.0, 10.0, 100.0, 100.0, None, None, Some(&other))
            .unwrap();
        let far_floating = doc
            .create_object(ObjectType::Rect, 5000.0, 5000.0, 100.0, 100.0, None, None, None)
            .unwrap();

        let on_page = ids(&objects_on_view(&doc, &page));
        assert_eq!(on_page, vec![bound, floating]);
        assert!(!on_page.contains(&elsewhere));
        assert!(!on_page.contains(&far_floating));
    }

    #[test]
    fn test_hit_test_front_to_back() {
        let mut doc = SceneDocument::new();
        let below = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();
        let above = doc
            .create_object(ObjectType::Rect, 50.0, 50.0, 100.0, 100.0, None, None, None)
            .unwrap();

        let hits = ids(&objects_at_point(&doc, Point::new(75.0, 75.0)));
        assert_eq!(hits, vec![above, below]);
    }

    #[test]
    fn test_rect_queries() {
        let mut doc = SceneDocument::new();
        let inside = doc
            .create_object(ObjectType::Rect, 10.0, 10.0, 50.0, 50.0, None, None, None)
            .unwrap();
        let crossing = doc
            .create_object(ObjectType::Rect, 150.0, 150.0, 100.0, 100.0, None, None, None)
            .unwrap();
        doc.create_object(ObjectType::Rect, 500.0, 500.0, 50.0, 50.0, None, None, None)
            .unwrap();

        let selection = Rect::new(0.0, 0.0, 200.0, 200.0);
        assert_eq!(
            ids(&objects_in_rect(&doc, selection)),
            vec![inside.clone(), crossing]
        );
        assert_eq!(ids(&objects_contained_in_rect(&doc, selection)), vec![inside]);
    }

    #[test]
    fn test_stacking_transitivity() {
        let mut doc = SceneDocument::new();
        let a = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();
        let b = doc
            .create_object(ObjectType::Rect, 40.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();
        let c = doc
            .create_object(ObjectType::Rect, 80.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();

        // C overlaps B by 60% but A by only 20%; it rides along through B
        assert_eq!(stacked_objects(&doc, &[a.clone()]), vec![b, c]);
    }

    #[test]
    fn test_stacking_ignores_locked_and_lower() {
        let mut doc = SceneDocument::new();
        let under = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();
        let target = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();
        let locked = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();
        doc.update_object(
            &locked,
            &ObjectPatch {
                locked: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        let stacked = stacked_objects(&doc, &[target]);
        assert!(!stacked.contains(&under));
        assert!(!stacked.contains(&locked));
    }

    #[test]
    fn test_content_bounds_union() {
        let mut doc = SceneDocument::new();
        assert!(content_bounds(&doc).is_none());

        doc.create_object(ObjectType::Rect, 0.0, 0.0, 100.0, 100.0, None, None, None)
            .unwrap();
        doc.create_object(ObjectType::Rect, 300.0, 300.0, 100.0, 100.0, None, None, None)
            .unwrap();

        let bounds = content_bounds(&doc).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 400.0, 400.0));
    }
}
