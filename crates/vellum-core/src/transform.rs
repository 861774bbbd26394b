//! Absolute coordinate transforms over the container hierarchy.
//!
//! Stored object positions are local: relative to the owning view's origin
//! when a view association exists, and expressed in the parent container's
//! frame when parented. These helpers walk the ancestry and produce
//! canvas-space positions, bounds, and accumulated transforms.
//!
//! Spatial predicates are plain axis-aligned tests on the unrotated local
//! box placed at the absolute origin. Rotation moves the origin through the
//! ancestor walk but is not folded into the box itself, so hit-testing,
//! marquee selection, and stacking all agree on the same rectangles.

use std::collections::HashMap;

use kurbo::{Point, Rect, Vec2};

use crate::crdt::SceneDocument;
use crate::id::ContainerId;
use crate::model::{ContainerRecord, ResolvedObject};

/// Ancestry walks stop after this many levels. Real documents never nest
/// containers this deep; reaching the limit means the child references
/// form a cycle.
pub(crate) const MAX_ANCESTRY_DEPTH: usize = 64;

/// Accumulated transform of an object in canvas space.
///
/// `rotation` is the object's own rotation plus every ancestor's, and the
/// scale factors are the products down the chain. The position already has
/// the full matrix walk applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteTransform {
    pub x: f64,
    pub y: f64,
    /// Total rotation in degrees, normalized to [0, 360).
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl AbsoluteTransform {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Map a point from a container's local frame into its parent frame:
/// scale, then rotate, then translate by the container position.
pub(crate) fn apply_container(container: &ContainerRecord, p: Point) -> Point {
    let sx = p.x * container.scale_x;
    let sy = p.y * container.scale_y;
    let theta = container.rotation.to_radians();
    let (sin, cos) = theta.sin_cos();
    Point::new(
        container.position.x + sx * cos - sy * sin,
        container.position.y + sx * sin + sy * cos,
    )
}

/// Rotate a vector by an angle in degrees.
pub(crate) fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Container-id to parent-container-id mapping, derived from the child
/// reference lists. Root-level containers have no entry.
pub(crate) fn container_parents(doc: &SceneDocument) -> HashMap<ContainerId, ContainerId> {
    let mut parents = HashMap::new();
    for container in doc.all_containers() {
        for child in doc.children_refs(&container.id) {
            if let Some(id) = child.container_id() {
                parents.insert(id.clone(), container.id.clone());
            }
        }
    }
    parents
}

/// Ancestor containers of an object, nearest first. Stops at the root, at
/// a dangling reference, or at [`MAX_ANCESTRY_DEPTH`].
fn ancestor_chain(doc: &SceneDocument, first: Option<&ContainerId>) -> Vec<ContainerRecord> {
    let mut chain = Vec::new();
    let Some(start) = first else {
        return chain;
    };
    let parents = container_parents(doc);
    let mut current = Some(start.clone());
    while let Some(id) = current {
        if chain.len() >= MAX_ANCESTRY_DEPTH {
            log::warn!("container ancestry deeper than {}, assuming a cycle at {}", MAX_ANCESTRY_DEPTH, id);
            break;
        }
        match doc.container(&id) {
            Some(record) => {
                current = parents.get(&id).cloned();
                chain.push(record);
            }
            None => break,
        }
    }
    chain
}

/// Full accumulated transform of a resolved object.
///
/// The view origin is added first when the object has a live view
/// association (a dangling view id degrades to floating). Then each
/// ancestor container maps the running point into its parent frame.
pub fn absolute_transform(doc: &SceneDocument, object: &ResolvedObject) -> AbsoluteTransform {
    let mut p = object.position();
    if let Some(view_id) = &object.view {
        if let Some(view) = doc.view(view_id) {
            p += view.origin().to_vec2();
        }
    }

    let mut rotation = object.rotation;
    let mut scale_x = 1.0;
    let mut scale_y = 1.0;
    for container in ancestor_chain(doc, object.parent.as_ref()) {
        p = apply_container(&container, p);
        rotation += container.rotation;
        scale_x *= container.scale_x;
        scale_y *= container.scale_y;
    }

    AbsoluteTransform {
        x: p.x,
        y: p.y,
        rotation: rotation.rem_euclid(360.0),
        scale_x,
        scale_y,
    }
}

/// Canvas-space position of a resolved object.
pub fn absolute_position(doc: &SceneDocument, object: &ResolvedObject) -> Point {
    absolute_transform(doc, object).position()
}

/// Canvas-space bounding box: the unrotated local box, scaled by the
/// accumulated ancestor scale, placed at the absolute origin.
pub fn absolute_bounds(doc: &SceneDocument, object: &ResolvedObject) -> Rect {
    let t = absolute_transform(doc, object);
    Rect::new(
        t.x,
        t.y,
        t.x + object.w * t.scale_x.abs(),
        t.y + object.h * t.scale_y.abs(),
    )
}

/// True when two rectangles overlap with positive area.
pub fn bounds_intersect(a: Rect, b: Rect) -> bool {
    a.intersect(b).area() > 0.0
}

/// True when `inner` lies entirely within `outer`.
pub fn bounds_within(inner: Rect, outer: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}
