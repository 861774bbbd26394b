//! Vellum Core Library
//!
//! Platform-agnostic scene graph, styling, and collaboration logic for the
//! Vellum presentation editor.

pub mod crdt;
pub mod error;
pub mod id;
pub mod model;
pub mod ops;
pub mod query;
pub mod resolve;
pub mod styles;
pub mod transform;

pub use crdt::SceneDocument;
pub use error::{SceneError, SceneResult};
pub use id::{ContainerId, ObjectId, PaletteId, StyleId, TemplateId, TextId, ViewId};
pub use model::{
    Ancestry, ChildRef, ObjectKind, ObjectPatch, ObjectRecord, ObjectType, ResolvedObject, Scope,
};
pub use ops::InstancePolicy;
pub use query::{objects_at_point, objects_in_rect, objects_on_view, stacked_objects, z_ordered};
pub use resolve::{resolve_object, PropertyGroup};
pub use styles::{resolve_shape_style, resolve_text_style, resolve_view_background};
pub use transform::{absolute_bounds, absolute_position, absolute_transform, AbsoluteTransform};
