//! Styles, palettes, and paint values.

use serde::{Deserialize, Serialize};

use crate::id::StyleId;

/// Fill used when nothing in a style chain sets one.
pub const DEFAULT_FILL: &str = "#e0e0e0";
/// Text color used when nothing sets one.
pub const DEFAULT_TEXT_FILL: &str = "#111111";
/// Font family used when nothing sets one.
pub const DEFAULT_FONT: &str = "Inter";
/// Baseline text size when resolving the appearance of an object.
pub const OBJECT_TEXT_SIZE: f64 = 64.0;
/// Baseline text size when resolving a style definition on its own.
pub const LIBRARY_TEXT_SIZE: f64 = 16.0;

/// One of the eight color slots of a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteSlot {
    Background,
    Text,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
}

impl PaletteSlot {
    pub const ALL: [PaletteSlot; 8] = [
        PaletteSlot::Background,
        PaletteSlot::Text,
        PaletteSlot::Accent1,
        PaletteSlot::Accent2,
        PaletteSlot::Accent3,
        PaletteSlot::Accent4,
        PaletteSlot::Accent5,
        PaletteSlot::Accent6,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            PaletteSlot::Background => "background",
            PaletteSlot::Text => "text",
            PaletteSlot::Accent1 => "accent1",
            PaletteSlot::Accent2 => "accent2",
            PaletteSlot::Accent3 => "accent3",
            PaletteSlot::Accent4 => "accent4",
            PaletteSlot::Accent5 => "accent5",
            PaletteSlot::Accent6 => "accent6",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.tag() == tag)
    }

    /// Position of the slot in a palette's color array.
    pub fn index(self) -> usize {
        match self {
            PaletteSlot::Background => 0,
            PaletteSlot::Text => 1,
            PaletteSlot::Accent1 => 2,
            PaletteSlot::Accent2 => 3,
            PaletteSlot::Accent3 => 4,
            PaletteSlot::Accent4 => 5,
            PaletteSlot::Accent5 => 6,
            PaletteSlot::Accent6 => 7,
        }
    }
}

/// Solid paint: either a literal color or a palette slot reference with an
/// optional opacity/tint adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Color(String),
    Slot {
        slot: PaletteSlot,
        opacity: Option<f64>,
        tint: Option<f64>,
    },
}

impl Paint {
    pub fn color(value: impl Into<String>) -> Self {
        Paint::Color(value.into())
    }

    pub fn slot(slot: PaletteSlot) -> Self {
        Paint::Slot {
            slot,
            opacity: None,
            tint: None,
        }
    }

    /// Stored wire form: the literal color itself, or `@slot[~opacity[~tint]]`.
    pub fn encode(&self) -> String {
        match self {
            Paint::Color(c) => c.clone(),
            Paint::Slot {
                slot,
                opacity,
                tint,
            } => {
                let mut out = format!("@{}", slot.tag());
                match (opacity, tint) {
                    (Some(o), Some(t)) => out.push_str(&format!("~{o}~{t}")),
                    (Some(o), None) => out.push_str(&format!("~{o}")),
                    (None, Some(t)) => out.push_str(&format!("~1~{t}")),
                    (None, None) => {}
                }
                out
            }
        }
    }

    /// Inverse of [`Paint::encode`]. Strings that do not parse as a slot
    /// reference read back as literals so nothing is lost.
    pub fn decode(raw: &str) -> Paint {
        let Some(rest) = raw.strip_prefix('@') else {
            return Paint::Color(raw.to_string());
        };
        let mut parts = rest.split('~');
        let slot_tag = parts.next().unwrap_or("");
        match PaletteSlot::from_tag(slot_tag) {
            Some(slot) => Paint::Slot {
                slot,
                opacity: parts.next().and_then(|p| p.parse().ok()),
                tint: parts.next().and_then(|p| p.parse().ok()),
            },
            None => Paint::Color(raw.to_string()),
        }
    }
}

/// One stop of a gradient ramp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
}

/// Linear gradient ramp. `angle` is in degrees, 0 pointing right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub angle: f64,
    pub stops: Vec<GradientStop>,
}

/// Gradient fill on a style: a palette gradient slot (1-4) or an inline
/// definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GradientSpec {
    Slot(u8),
    Inline(Gradient),
}

impl GradientSpec {
    /// Stored wire form: `@gradientN` for slots, JSON for inline ramps.
    pub fn encode(&self) -> String {
        match self {
            GradientSpec::Slot(n) => format!("@gradient{n}"),
            GradientSpec::Inline(g) => serde_json::to_string(g).unwrap_or_default(),
        }
    }

    pub fn decode(raw: &str) -> Option<GradientSpec> {
        if let Some(rest) = raw.strip_prefix("@gradient") {
            return rest
                .parse::<u8>()
                .ok()
                .filter(|n| (1..=4).contains(n))
                .map(GradientSpec::Slot);
        }
        serde_json::from_str(raw).ok().map(GradientSpec::Inline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn tag(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        [LineCap::Butt, LineCap::Round, LineCap::Square]
            .into_iter()
            .find(|c| c.tag() == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn tag(self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        [LineJoin::Miter, LineJoin::Round, LineJoin::Bevel]
            .into_iter()
            .find(|j| j.tag() == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn tag(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        [
            TextAlign::Left,
            TextAlign::Center,
            TextAlign::Right,
            TextAlign::Justify,
        ]
        .into_iter()
        .find(|a| a.tag() == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    Strike,
}

impl TextDecoration {
    pub fn tag(self) -> &'static str {
        match self {
            TextDecoration::None => "none",
            TextDecoration::Underline => "underline",
            TextDecoration::Strike => "strike",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        [
            TextDecoration::None,
            TextDecoration::Underline,
            TextDecoration::Strike,
        ]
        .into_iter()
        .find(|d| d.tag() == tag)
    }
}

/// Sparse shape paint fields. `None` means "not set at this level"; styles,
/// prototypes, and instances all layer these over one another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyleFields {
    pub fill: Option<Paint>,
    pub fill_gradient: Option<GradientSpec>,
    pub stroke: Option<Paint>,
    pub stroke_width: Option<f64>,
    pub dash: Option<Vec<f64>>,
    pub cap: Option<LineCap>,
    pub join: Option<LineJoin>,
    pub corner_radius: Option<f64>,
    pub shadow: Option<Paint>,
    pub shadow_blur: Option<f64>,
    pub shadow_dx: Option<f64>,
    pub shadow_dy: Option<f64>,
}

impl ShapeStyleFields {
    pub fn is_empty(&self) -> bool {
        self.fill.is_none()
            && self.fill_gradient.is_none()
            && self.stroke.is_none()
            && self.stroke_width.is_none()
            && self.dash.is_none()
            && self.cap.is_none()
            && self.join.is_none()
            && self.corner_radius.is_none()
            && self.shadow.is_none()
            && self.shadow_blur.is_none()
            && self.shadow_dx.is_none()
            && self.shadow_dy.is_none()
    }

    /// Overlay of `self`'s present fields over `base`'s.
    pub fn merged_over(&self, base: &Self) -> Self {
        Self {
            fill: self.fill.clone().or_else(|| base.fill.clone()),
            fill_gradient: self
                .fill_gradient
                .clone()
                .or_else(|| base.fill_gradient.clone()),
            stroke: self.stroke.clone().or_else(|| base.stroke.clone()),
            stroke_width: self.stroke_width.or(base.stroke_width),
            dash: self.dash.clone().or_else(|| base.dash.clone()),
            cap: self.cap.or(base.cap),
            join: self.join.or(base.join),
            corner_radius: self.corner_radius.or(base.corner_radius),
            shadow: self.shadow.clone().or_else(|| base.shadow.clone()),
            shadow_blur: self.shadow_blur.or(base.shadow_blur),
            shadow_dx: self.shadow_dx.or(base.shadow_dx),
            shadow_dy: self.shadow_dy.or(base.shadow_dy),
        }
    }
}

/// Sparse text appearance fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyleFields {
    pub fill: Option<Paint>,
    pub font: Option<String>,
    pub size: Option<f64>,
    pub weight: Option<u16>,
    pub italic: Option<bool>,
    pub decoration: Option<TextDecoration>,
    pub align: Option<TextAlign>,
    pub letter_spacing: Option<f64>,
    pub line_height: Option<f64>,
    pub bullet: Option<String>,
}

impl TextStyleFields {
    pub fn is_empty(&self) -> bool {
        self.fill.is_none()
            && self.font.is_none()
            && self.size.is_none()
            && self.weight.is_none()
            && self.italic.is_none()
            && self.decoration.is_none()
            && self.align.is_none()
            && self.letter_spacing.is_none()
            && self.line_height.is_none()
            && self.bullet.is_none()
    }

    /// Overlay of `self`'s present fields over `base`'s.
    pub fn merged_over(&self, base: &Self) -> Self {
        Self {
            fill: self.fill.clone().or_else(|| base.fill.clone()),
            font: self.font.clone().or_else(|| base.font.clone()),
            size: self.size.or(base.size),
            weight: self.weight.or(base.weight),
            italic: self.italic.or(base.italic),
            decoration: self.decoration.or(base.decoration),
            align: self.align.or(base.align),
            letter_spacing: self.letter_spacing.or(base.letter_spacing),
            line_height: self.line_height.or(base.line_height),
            bullet: self.bullet.clone().or_else(|| base.bullet.clone()),
        }
    }
}

/// One targeted shape override. A `None` payload deletes the override so
/// the field inherits again.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeStyleField {
    Fill(Option<Paint>),
    FillGradient(Option<GradientSpec>),
    Stroke(Option<Paint>),
    StrokeWidth(Option<f64>),
    Dash(Option<Vec<f64>>),
    Cap(Option<LineCap>),
    Join(Option<LineJoin>),
    CornerRadius(Option<f64>),
    Shadow(Option<Paint>),
    ShadowBlur(Option<f64>),
    ShadowDx(Option<f64>),
    ShadowDy(Option<f64>),
}

/// One targeted text override. A `None` payload deletes the override.
#[derive(Debug, Clone, PartialEq)]
pub enum TextStyleField {
    Fill(Option<Paint>),
    Font(Option<String>),
    Size(Option<f64>),
    Weight(Option<u16>),
    Italic(Option<bool>),
    Decoration(Option<TextDecoration>),
    Align(Option<TextAlign>),
    LetterSpacing(Option<f64>),
    LineHeight(Option<f64>),
    Bullet(Option<String>),
}

/// Whether a style definition carries shape or text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKind {
    Shape,
    Text,
}

/// Field payload of a style definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleFields {
    Shape(ShapeStyleFields),
    Text(TextStyleFields),
}

/// Named style definition. Styles form single-parent chains resolved from
/// the base-most ancestor down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRecord {
    pub id: StyleId,
    pub name: String,
    pub parent: Option<StyleId>,
    pub fields: StyleFields,
}

impl StyleRecord {
    pub fn shape(id: StyleId, name: impl Into<String>, fields: ShapeStyleFields) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            fields: StyleFields::Shape(fields),
        }
    }

    pub fn text(id: StyleId, name: impl Into<String>, fields: TextStyleFields) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            fields: StyleFields::Text(fields),
        }
    }

    pub fn kind(&self) -> StyleKind {
        match self.fields {
            StyleFields::Shape(_) => StyleKind::Shape,
            StyleFields::Text(_) => StyleKind::Text,
        }
    }

    pub fn shape_fields(&self) -> Option<&ShapeStyleFields> {
        match &self.fields {
            StyleFields::Shape(fields) => Some(fields),
            StyleFields::Text(_) => None,
        }
    }

    pub fn text_fields(&self) -> Option<&TextStyleFields> {
        match &self.fields {
            StyleFields::Shape(_) => None,
            StyleFields::Text(fields) => Some(fields),
        }
    }
}

/// Fully resolved shape paint, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedShapeStyle {
    pub fill: String,
    pub fill_gradient: Option<Gradient>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub dash: Option<Vec<f64>>,
    pub cap: LineCap,
    pub join: LineJoin,
    pub corner_radius: f64,
    pub shadow: Option<ResolvedShadow>,
}

impl Default for ResolvedShapeStyle {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL.to_string(),
            fill_gradient: None,
            stroke: None,
            stroke_width: 1.0,
            dash: None,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            corner_radius: 0.0,
            shadow: None,
        }
    }
}

impl ResolvedShapeStyle {
    /// Re-sparse form, used when resolved values are copied down onto an
    /// object as local overrides.
    pub fn to_fields(&self) -> ShapeStyleFields {
        ShapeStyleFields {
            fill: Some(Paint::Color(self.fill.clone())),
            fill_gradient: self
                .fill_gradient
                .clone()
                .map(GradientSpec::Inline),
            stroke: self.stroke.clone().map(Paint::Color),
            stroke_width: Some(self.stroke_width),
            dash: self.dash.clone(),
            cap: Some(self.cap),
            join: Some(self.join),
            corner_radius: Some(self.corner_radius),
            shadow: self.shadow.as_ref().map(|s| Paint::Color(s.color.clone())),
            shadow_blur: self.shadow.as_ref().map(|s| s.blur),
            shadow_dx: self.shadow.as_ref().map(|s| s.dx),
            shadow_dy: self.shadow.as_ref().map(|s| s.dy),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedShadow {
    pub color: String,
    pub blur: f64,
    pub dx: f64,
    pub dy: f64,
}

/// Fully resolved text appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTextStyle {
    pub fill: String,
    pub font: String,
    pub size: f64,
    pub weight: u16,
    pub italic: bool,
    pub decoration: TextDecoration,
    pub align: TextAlign,
    pub letter_spacing: f64,
    pub line_height: f64,
    pub bullet: Option<String>,
}

impl ResolvedTextStyle {
    /// Baseline for resolving the text appearance of an object.
    pub fn object_default() -> Self {
        Self {
            size: OBJECT_TEXT_SIZE,
            ..Self::library_default()
        }
    }

    /// Baseline for resolving a style definition on its own, as the style
    /// library shows it.
    pub fn library_default() -> Self {
        Self {
            fill: DEFAULT_TEXT_FILL.to_string(),
            font: DEFAULT_FONT.to_string(),
            size: LIBRARY_TEXT_SIZE,
            weight: 400,
            italic: false,
            decoration: TextDecoration::None,
            align: TextAlign::Left,
            letter_spacing: 0.0,
            line_height: 1.2,
            bullet: None,
        }
    }

    /// Re-sparse form, used when resolved values are copied down onto an
    /// object as local overrides.
    pub fn to_fields(&self) -> TextStyleFields {
        TextStyleFields {
            fill: Some(Paint::Color(self.fill.clone())),
            font: Some(self.font.clone()),
            size: Some(self.size),
            weight: Some(self.weight),
            italic: Some(self.italic),
            decoration: Some(self.decoration),
            align: Some(self.align),
            letter_spacing: Some(self.letter_spacing),
            line_height: Some(self.line_height),
            bullet: self.bullet.clone(),
        }
    }
}

/// Resolution output for a style definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResolvedStyle {
    Shape(ResolvedShapeStyle),
    Text(ResolvedTextStyle),
}

/// Named palette: eight color slots plus four reusable gradient ramps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteRecord {
    pub id: crate::id::PaletteId,
    pub name: String,
    pub colors: [String; 8],
    pub gradients: [Gradient; 4],
}

impl PaletteRecord {
    pub fn new(id: crate::id::PaletteId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            colors: [
                "#ffffff".to_string(),
                "#111111".to_string(),
                "#4363d8".to_string(),
                "#e6194b".to_string(),
                "#3cb44b".to_string(),
                "#ffe119".to_string(),
                "#f58231".to_string(),
                "#911eb4".to_string(),
            ],
            gradients: std::array::from_fn(|_| Gradient {
                angle: 0.0,
                stops: vec![
                    GradientStop {
                        offset: 0.0,
                        color: "#ffffff".to_string(),
                    },
                    GradientStop {
                        offset: 1.0,
                        color: "#111111".to_string(),
                    },
                ],
            }),
        }
    }

    /// Color of a slot.
    pub fn slot_color(&self, slot: PaletteSlot) -> &str {
        &self.colors[slot.index()]
    }

    /// Gradient ramp `n` (1-based, as slot references name them).
    pub fn gradient(&self, n: u8) -> Option<&Gradient> {
        self.gradients.get(usize::from(n).checked_sub(1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_literal_round_trip() {
        let paint = Paint::color("#ff8800");
        assert_eq!(paint.encode(), "#ff8800");
        assert_eq!(Paint::decode("#ff8800"), paint);
    }

    #[test]
    fn test_paint_slot_round_trip() {
        let paint = Paint::Slot {
            slot: PaletteSlot::Accent3,
            opacity: Some(0.5),
            tint: None,
        };
        assert_eq!(paint.encode(), "@accent3~0.5");
        assert_eq!(Paint::decode("@accent3~0.5"), paint);
    }

    #[test]
    fn test_paint_slot_with_tint() {
        let paint = Paint::Slot {
            slot: PaletteSlot::Text,
            opacity: None,
            tint: Some(-0.25),
        };
        let encoded = paint.encode();
        assert_eq!(encoded, "@text~1~-0.25");
        match Paint::decode(&encoded) {
            Paint::Slot { slot, tint, .. } => {
                assert_eq!(slot, PaletteSlot::Text);
                assert_eq!(tint, Some(-0.25));
            }
            other => panic!("expected slot paint, got {other:?}"),
        }
    }

    #[test]
    fn test_paint_unknown_slot_reads_as_literal() {
        assert_eq!(
            Paint::decode("@nonsense"),
            Paint::Color("@nonsense".to_string())
        );
    }

    #[test]
    fn test_gradient_spec_round_trip() {
        let slot = GradientSpec::Slot(2);
        assert_eq!(slot.encode(), "@gradient2");
        assert_eq!(GradientSpec::decode("@gradient2"), Some(slot));

        let inline = GradientSpec::Inline(Gradient {
            angle: 90.0,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: "#ffffff".to_string(),
                },
                GradientStop {
                    offset: 1.0,
                    color: "#000000".to_string(),
                },
            ],
        });
        let encoded = inline.encode();
        assert_eq!(GradientSpec::decode(&encoded), Some(inline));
    }

    #[test]
    fn test_gradient_slot_out_of_range_rejected() {
        assert_eq!(GradientSpec::decode("@gradient9"), None);
    }

    #[test]
    fn test_fields_merged_over_prefers_own() {
        let base = ShapeStyleFields {
            fill: Some(Paint::color("#ff0000")),
            stroke_width: Some(4.0),
            ..Default::default()
        };
        let own = ShapeStyleFields {
            fill: Some(Paint::color("#0000ff")),
            ..Default::default()
        };
        let merged = own.merged_over(&base);
        assert_eq!(merged.fill, Some(Paint::color("#0000ff")));
        assert_eq!(merged.stroke_width, Some(4.0));
    }

    #[test]
    fn test_text_size_defaults_differ() {
        assert_eq!(ResolvedTextStyle::object_default().size, 64.0);
        assert_eq!(ResolvedTextStyle::library_default().size, 16.0);
    }
}
