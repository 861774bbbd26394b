//! Object records, per-type payloads, and prototype ancestry.

use std::str::FromStr;

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::id::{ContainerId, ObjectId, StyleId, TextId, ViewId};
use crate::model::style::{ShapeStyleFields, TextStyleFields};

/// Type tag of an object, as stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Rect,
    Ellipse,
    Line,
    Path,
    Polygon,
    Text,
    TextBox,
    Image,
    Embed,
    Connector,
    QrCode,
    PollFrame,
    TableGrid,
}

impl ObjectType {
    pub const ALL: [ObjectType; 13] = [
        ObjectType::Rect,
        ObjectType::Ellipse,
        ObjectType::Line,
        ObjectType::Path,
        ObjectType::Polygon,
        ObjectType::Text,
        ObjectType::TextBox,
        ObjectType::Image,
        ObjectType::Embed,
        ObjectType::Connector,
        ObjectType::QrCode,
        ObjectType::PollFrame,
        ObjectType::TableGrid,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ObjectType::Rect => "rect",
            ObjectType::Ellipse => "ellipse",
            ObjectType::Line => "line",
            ObjectType::Path => "path",
            ObjectType::Polygon => "polygon",
            ObjectType::Text => "text",
            ObjectType::TextBox => "textbox",
            ObjectType::Image => "image",
            ObjectType::Embed => "embed",
            ObjectType::Connector => "connector",
            ObjectType::QrCode => "qrcode",
            ObjectType::PollFrame => "pollframe",
            ObjectType::TableGrid => "tablegrid",
        }
    }

    /// Whether objects of this type carry text the text-style engine
    /// applies to.
    pub fn has_text(self) -> bool {
        matches!(
            self,
            ObjectType::Text | ObjectType::TextBox | ObjectType::TableGrid
        )
    }
}

impl FromStr for ObjectType {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.tag() == s)
            .ok_or_else(|| SceneError::UnknownObjectType(s.to_string()))
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// How image content is scaled into its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    #[default]
    Cover,
    Contain,
    Fill,
    Tile,
}

impl ImageFit {
    pub fn tag(self) -> &'static str {
        match self {
            ImageFit::Cover => "cover",
            ImageFit::Contain => "contain",
            ImageFit::Fill => "fill",
            ImageFit::Tile => "tile",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        [
            ImageFit::Cover,
            ImageFit::Contain,
            ImageFit::Fill,
            ImageFit::Tile,
        ]
        .into_iter()
        .find(|f| f.tag() == tag)
    }
}

/// Per-type payload of an object. Every field is optional so an instance
/// can store only the payload fields it overrides; the variant itself is
/// the stored type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    Rect {
        /// Corner rounding in canvas units. Wins over any style-provided
        /// corner radius when set.
        radius: Option<f64>,
    },
    Ellipse,
    Line {
        /// Polyline vertices in local coordinates.
        points: Option<Vec<Point>>,
    },
    Path {
        points: Option<Vec<Point>>,
        closed: Option<bool>,
    },
    Polygon {
        sides: Option<u32>,
    },
    Text {
        content: Option<String>,
    },
    TextBox {
        /// Id of the collaborative rich-text buffer backing this box.
        buffer: Option<TextId>,
    },
    Image {
        source: Option<String>,
        fit: Option<ImageFit>,
    },
    Embed {
        url: Option<String>,
    },
    Connector {
        start: Option<ObjectId>,
        end: Option<ObjectId>,
        points: Option<Vec<Point>>,
    },
    QrCode {
        url: Option<String>,
    },
    PollFrame {
        poll: Option<String>,
    },
    TableGrid {
        rows: Option<u32>,
        cols: Option<u32>,
    },
}

impl ObjectKind {
    /// Payload with nothing set, for the given type tag.
    pub fn empty(ty: ObjectType) -> Self {
        match ty {
            ObjectType::Rect => ObjectKind::Rect { radius: None },
            ObjectType::Ellipse => ObjectKind::Ellipse,
            ObjectType::Line => ObjectKind::Line { points: None },
            ObjectType::Path => ObjectKind::Path {
                points: None,
                closed: None,
            },
            ObjectType::Polygon => ObjectKind::Polygon { sides: None },
            ObjectType::Text => ObjectKind::Text { content: None },
            ObjectType::TextBox => ObjectKind::TextBox { buffer: None },
            ObjectType::Image => ObjectKind::Image {
                source: None,
                fit: None,
            },
            ObjectType::Embed => ObjectKind::Embed { url: None },
            ObjectType::Connector => ObjectKind::Connector {
                start: None,
                end: None,
                points: None,
            },
            ObjectType::QrCode => ObjectKind::QrCode { url: None },
            ObjectType::PollFrame => ObjectKind::PollFrame { poll: None },
            ObjectType::TableGrid => ObjectKind::TableGrid {
                rows: None,
                cols: None,
            },
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectKind::Rect { .. } => ObjectType::Rect,
            ObjectKind::Ellipse => ObjectType::Ellipse,
            ObjectKind::Line { .. } => ObjectType::Line,
            ObjectKind::Path { .. } => ObjectType::Path,
            ObjectKind::Polygon { .. } => ObjectType::Polygon,
            ObjectKind::Text { .. } => ObjectType::Text,
            ObjectKind::TextBox { .. } => ObjectType::TextBox,
            ObjectKind::Image { .. } => ObjectType::Image,
            ObjectKind::Embed { .. } => ObjectType::Embed,
            ObjectKind::Connector { .. } => ObjectType::Connector,
            ObjectKind::QrCode { .. } => ObjectType::QrCode,
            ObjectKind::PollFrame { .. } => ObjectType::PollFrame,
            ObjectKind::TableGrid { .. } => ObjectType::TableGrid,
        }
    }

    /// Whether any payload field is locally present.
    pub fn has_local_fields(&self) -> bool {
        match self {
            ObjectKind::Rect { radius } => radius.is_some(),
            ObjectKind::Ellipse => false,
            ObjectKind::Line { points } => points.is_some(),
            ObjectKind::Path { points, closed } => points.is_some() || closed.is_some(),
            ObjectKind::Polygon { sides } => sides.is_some(),
            ObjectKind::Text { content } => content.is_some(),
            ObjectKind::TextBox { buffer } => buffer.is_some(),
            ObjectKind::Image { source, fit } => source.is_some() || fit.is_some(),
            ObjectKind::Embed { url } => url.is_some(),
            ObjectKind::Connector { start, end, points } => {
                start.is_some() || end.is_some() || points.is_some()
            }
            ObjectKind::QrCode { url } => url.is_some(),
            ObjectKind::PollFrame { poll } => poll.is_some(),
            ObjectKind::TableGrid { rows, cols } => rows.is_some() || cols.is_some(),
        }
    }

    /// Overlay of `self`'s present payload fields over `base`'s, field by
    /// field. If the two payloads are of different types (malformed data),
    /// `self` wins wholesale.
    pub fn merged_over(&self, base: &ObjectKind) -> ObjectKind {
        match (self, base) {
            (ObjectKind::Rect { radius }, ObjectKind::Rect { radius: b }) => ObjectKind::Rect {
                radius: radius.or(*b),
            },
            (ObjectKind::Ellipse, ObjectKind::Ellipse) => ObjectKind::Ellipse,
            (ObjectKind::Line { points }, ObjectKind::Line { points: b }) => ObjectKind::Line {
                points: points.clone().or_else(|| b.clone()),
            },
            (
                ObjectKind::Path { points, closed },
                ObjectKind::Path {
                    points: bp,
                    closed: bc,
                },
            ) => ObjectKind::Path {
                points: points.clone().or_else(|| bp.clone()),
                closed: closed.or(*bc),
            },
            (ObjectKind::Polygon { sides }, ObjectKind::Polygon { sides: b }) => {
                ObjectKind::Polygon { sides: sides.or(*b) }
            }
            (ObjectKind::Text { content }, ObjectKind::Text { content: b }) => ObjectKind::Text {
                content: content.clone().or_else(|| b.clone()),
            },
            (ObjectKind::TextBox { buffer }, ObjectKind::TextBox { buffer: b }) => {
                ObjectKind::TextBox {
                    buffer: buffer.clone().or_else(|| b.clone()),
                }
            }
            (
                ObjectKind::Image { source, fit },
                ObjectKind::Image {
                    source: bs,
                    fit: bf,
                },
            ) => ObjectKind::Image {
                source: source.clone().or_else(|| bs.clone()),
                fit: fit.or(*bf),
            },
            (ObjectKind::Embed { url }, ObjectKind::Embed { url: b }) => ObjectKind::Embed {
                url: url.clone().or_else(|| b.clone()),
            },
            (
                ObjectKind::Connector { start, end, points },
                ObjectKind::Connector {
                    start: bs,
                    end: be,
                    points: bp,
                },
            ) => ObjectKind::Connector {
                start: start.clone().or_else(|| bs.clone()),
                end: end.clone().or_else(|| be.clone()),
                points: points.clone().or_else(|| bp.clone()),
            },
            (ObjectKind::QrCode { url }, ObjectKind::QrCode { url: b }) => ObjectKind::QrCode {
                url: url.clone().or_else(|| b.clone()),
            },
            (ObjectKind::PollFrame { poll }, ObjectKind::PollFrame { poll: b }) => {
                ObjectKind::PollFrame {
                    poll: poll.clone().or_else(|| b.clone()),
                }
            }
            (
                ObjectKind::TableGrid { rows, cols },
                ObjectKind::TableGrid {
                    rows: br,
                    cols: bc,
                },
            ) => ObjectKind::TableGrid {
                rows: rows.or(*br),
                cols: cols.or(*bc),
            },
            (own, _) => own.clone(),
        }
    }

    /// Rich-text buffer id, for textbox payloads.
    pub fn text_buffer(&self) -> Option<&TextId> {
        match self {
            ObjectKind::TextBox { buffer } => buffer.as_ref(),
            _ => None,
        }
    }

    /// Locally stored corner radius, for rect payloads.
    pub fn corner_radius(&self) -> Option<f64> {
        match self {
            ObjectKind::Rect { radius } => *radius,
            _ => None,
        }
    }
}

/// Inheritance link of an object. Concrete objects own their fields; an
/// instance inherits every field it does not store locally from exactly
/// one prototype. Prototypes are always concrete, so a chain of
/// prototypes is unrepresentable here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ancestry {
    #[default]
    Concrete,
    InstanceOf(ObjectId),
}

impl Ancestry {
    pub fn is_instance(&self) -> bool {
        matches!(self, Ancestry::InstanceOf(_))
    }

    pub fn prototype(&self) -> Option<&ObjectId> {
        match self {
            Ancestry::Concrete => None,
            Ancestry::InstanceOf(id) => Some(id),
        }
    }
}

/// Stored form of an object. Optional fields are sparse: an instance keeps
/// `None` wherever it inherits from its prototype, and resolution fills
/// the gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub ancestry: Ancestry,
    /// Owning container, when not a direct child of the root order.
    pub parent: Option<ContainerId>,
    /// View association. When set, `position` is relative to that view's
    /// origin instead of global canvas space.
    pub view: Option<ViewId>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    /// Degrees, normalized to [0, 360). Absent means 0.
    pub rotation: Option<f64>,
    /// Rotation pivot as a fraction of the box, both axes in [0, 1].
    /// Absent means center.
    pub pivot: Option<Point>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    /// Presentation-only invisibility, used to hide a template instance on
    /// a single view.
    pub hidden: Option<bool>,
    pub name: Option<String>,
    pub shape_style: Option<StyleId>,
    pub text_style: Option<StyleId>,
    pub shape_overrides: ShapeStyleFields,
    pub text_overrides: TextStyleFields,
}

impl ObjectRecord {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            kind,
            ancestry: Ancestry::Concrete,
            parent: None,
            view: None,
            position: None,
            size: None,
            rotation: None,
            pivot: None,
            opacity: None,
            visible: None,
            locked: None,
            hidden: None,
            name: None,
            shape_style: None,
            text_style: None,
            shape_overrides: ShapeStyleFields::default(),
            text_overrides: TextStyleFields::default(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    /// Whether this object is a template placement: an instance bound to a
    /// view. Such objects are hidden instead of deleted.
    pub fn is_template_instance(&self) -> bool {
        self.ancestry.is_instance() && self.view.is_some()
    }
}

/// Partial update applied by [`update_object`](crate::crdt::SceneDocument::update_object).
/// Present fields become local values on the target (overrides, when the
/// target is an instance); absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub rotation: Option<f64>,
    pub pivot: Option<Point>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub hidden: Option<bool>,
    pub name: Option<String>,
    pub shape_style: Option<StyleId>,
    pub text_style: Option<StyleId>,
    /// Per-type payload fields to set; only the present fields of the
    /// payload are written.
    pub kind: Option<ObjectKind>,
    pub shape_overrides: Option<ShapeStyleFields>,
    pub text_overrides: Option<TextStyleFields>,
}

impl ObjectPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            position: Some(Point::new(x, y)),
            ..Default::default()
        }
    }

    pub fn size(w: f64, h: f64) -> Self {
        Self {
            size: Some(Size::new(w, h)),
            ..Default::default()
        }
    }
}

/// Fully expanded object: prototype fields overlaid by instance fields,
/// with structural defaults applied. This is what the transform, style,
/// and query engines consume.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Set when the stored object is an instance.
    pub prototype: Option<ObjectId>,
    pub parent: Option<ContainerId>,
    pub view: Option<ViewId>,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub rotation: f64,
    pub pivot: Point,
    pub opacity: f64,
    pub visible: bool,
    pub locked: bool,
    pub hidden: bool,
    pub name: Option<String>,
    /// Effective named style references. For an instance these are the
    /// prototype's, never the instance's own.
    pub shape_style: Option<StyleId>,
    pub text_style: Option<StyleId>,
    /// Inline overrides, prototype's overlaid by the instance's.
    pub shape_overrides: ShapeStyleFields,
    pub text_overrides: TextStyleFields,
}

impl ResolvedObject {
    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Local bounding box, before ancestry transforms.
    pub fn local_bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// Pivot point in local coordinates.
    pub fn pivot_offset(&self) -> Point {
        Point::new(self.pivot.x * self.w, self.pivot.y * self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_round_trip() {
        for ty in ObjectType::ALL {
            assert_eq!(ty.tag().parse::<ObjectType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_type_tag_is_an_error() {
        let err = "blob".parse::<ObjectType>().unwrap_err();
        assert!(matches!(err, SceneError::UnknownObjectType(tag) if tag == "blob"));
    }

    #[test]
    fn test_empty_payload_matches_type() {
        for ty in ObjectType::ALL {
            let kind = ObjectKind::empty(ty);
            assert_eq!(kind.object_type(), ty);
            assert!(!kind.has_local_fields());
        }
    }

    #[test]
    fn test_merged_over_is_per_field() {
        let proto = ObjectKind::Image {
            source: Some("assets/logo.png".to_string()),
            fit: Some(ImageFit::Contain),
        };
        let instance = ObjectKind::Image {
            source: None,
            fit: Some(ImageFit::Fill),
        };
        let merged = instance.merged_over(&proto);
        assert_eq!(
            merged,
            ObjectKind::Image {
                source: Some("assets/logo.png".to_string()),
                fit: Some(ImageFit::Fill),
            }
        );
    }

    #[test]
    fn test_merged_over_type_mismatch_keeps_own() {
        let own = ObjectKind::Rect { radius: Some(4.0) };
        let merged = own.merged_over(&ObjectKind::Ellipse);
        assert_eq!(merged, own);
    }

    #[test]
    fn test_template_instance_needs_proto_and_view() {
        let mut record = ObjectRecord::new(
            ObjectId::generate(),
            ObjectKind::empty(ObjectType::Rect),
        );
        assert!(!record.is_template_instance());

        record.ancestry = Ancestry::InstanceOf(ObjectId::generate());
        assert!(!record.is_template_instance());

        record.view = Some(ViewId::generate());
        assert!(record.is_template_instance());
    }
}
