//! Document data model.

mod container;
mod object;
mod style;
mod template;
mod view;

pub use container::{BlendMode, ContainerPatch, ContainerRecord};
pub use object::{
    Ancestry, ImageFit, ObjectKind, ObjectPatch, ObjectRecord, ObjectType, ResolvedObject,
};
pub use style::{
    DEFAULT_FILL, DEFAULT_FONT, DEFAULT_TEXT_FILL, Gradient, GradientSpec, GradientStop,
    LIBRARY_TEXT_SIZE, LineCap, LineJoin, OBJECT_TEXT_SIZE, Paint, PaletteRecord, PaletteSlot,
    ResolvedShadow, ResolvedShapeStyle, ResolvedStyle, ResolvedTextStyle, ShapeStyleField,
    ShapeStyleFields, StyleFields, StyleKind, StyleRecord, TextAlign, TextDecoration,
    TextStyleField, TextStyleFields,
};
pub use template::{GuideAxis, SnapGuide, TemplateRecord};
pub use view::{
    Background, BackgroundOverrides, DEFAULT_VIEW_SIZE, Transition, TransitionKind, ViewRecord,
};

use crate::id::{ContainerId, ObjectId};

/// Reference from a parent scope to one child. The order of these
/// references within a scope is the render z-order, later entries on top.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChildRef {
    Object(ObjectId),
    Container(ContainerId),
}

impl ChildRef {
    /// Stored wire form: `o:<id>` or `c:<id>`.
    pub fn encode(&self) -> String {
        match self {
            ChildRef::Object(id) => format!("o:{id}"),
            ChildRef::Container(id) => format!("c:{id}"),
        }
    }

    pub fn decode(raw: &str) -> Option<ChildRef> {
        let (kind, id) = raw.split_once(':')?;
        match kind {
            "o" => Some(ChildRef::Object(ObjectId::from_string(id))),
            "c" => Some(ChildRef::Container(ContainerId::from_string(id))),
            _ => None,
        }
    }

    pub fn object_id(&self) -> Option<&ObjectId> {
        match self {
            ChildRef::Object(id) => Some(id),
            ChildRef::Container(_) => None,
        }
    }

    pub fn container_id(&self) -> Option<&ContainerId> {
        match self {
            ChildRef::Object(_) => None,
            ChildRef::Container(id) => Some(id),
        }
    }
}

/// A sibling scope: the root order, or one container's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Root,
    Container(ContainerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_ref_round_trip() {
        let object = ChildRef::Object(ObjectId::from_string("ab12"));
        assert_eq!(object.encode(), "o:ab12");
        assert_eq!(ChildRef::decode("o:ab12"), Some(object));

        let container = ChildRef::Container(ContainerId::from_string("cd34"));
        assert_eq!(container.encode(), "c:cd34");
        assert_eq!(ChildRef::decode("c:cd34"), Some(container));
    }

    #[test]
    fn test_child_ref_decode_rejects_malformed() {
        assert_eq!(ChildRef::decode("ab12"), None);
        assert_eq!(ChildRef::decode("x:ab12"), None);
    }
}
