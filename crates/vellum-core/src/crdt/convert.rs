//! Conversion between model records and Loro values.
//!
//! Writers take a live [`LoroMap`] handle and store only the fields that
//! are present, so concurrent edits to sibling fields survive. Readers
//! take the deep-value form ([`LoroMapValue`]) and tolerate missing or
//! malformed entries instead of failing.

use kurbo::{Point, Size};
use loro::{LoroList, LoroMap, LoroMapValue, LoroResult, LoroValue};

use crate::id::{ContainerId, ObjectId, PaletteId, StyleId, TemplateId, TextId, ViewId};
use crate::model::{
    Ancestry, Background, BackgroundOverrides, BlendMode, ContainerPatch, ContainerRecord,
    Gradient, GradientSpec, ImageFit, LineCap, LineJoin, ObjectKind, ObjectPatch, ObjectRecord,
    ObjectType, Paint,
    PaletteRecord, ShapeStyleField, ShapeStyleFields, SnapGuide, StyleFields, StyleRecord,
    TextAlign, TextDecoration, TextStyleField, TextStyleFields, TemplateRecord, TransitionKind,
    ViewRecord,
};

// Common keys
pub(crate) const KEY_TYPE: &str = "type";
pub(crate) const KEY_PROTO: &str = "proto";
pub(crate) const KEY_PARENT: &str = "parent";
pub(crate) const KEY_VIEW: &str = "view";
pub(crate) const KEY_X: &str = "x";
pub(crate) const KEY_Y: &str = "y";
pub(crate) const KEY_WIDTH: &str = "width";
pub(crate) const KEY_HEIGHT: &str = "height";
pub(crate) const KEY_ROTATION: &str = "rotation";
pub(crate) const KEY_PIVOT_X: &str = "pivot_x";
pub(crate) const KEY_PIVOT_Y: &str = "pivot_y";
pub(crate) const KEY_OPACITY: &str = "opacity";
pub(crate) const KEY_VISIBLE: &str = "visible";
pub(crate) const KEY_LOCKED: &str = "locked";
pub(crate) const KEY_HIDDEN: &str = "hidden";
pub(crate) const KEY_NAME: &str = "name";
pub(crate) const KEY_SHAPE_STYLE: &str = "shape_style";
pub(crate) const KEY_TEXT_STYLE: &str = "text_style";

// Per-type payload keys
pub(crate) const KEY_RADIUS: &str = "radius";
const KEY_POINTS: &str = "points";
const KEY_CLOSED: &str = "closed";
const KEY_SIDES: &str = "sides";
const KEY_CONTENT: &str = "content";
pub(crate) const KEY_BUFFER: &str = "buffer";
const KEY_SOURCE: &str = "source";
const KEY_FIT: &str = "fit";
const KEY_URL: &str = "url";
const KEY_START: &str = "start";
const KEY_END: &str = "end";
const KEY_POLL: &str = "poll";
const KEY_ROWS: &str = "rows";
const KEY_COLS: &str = "cols";

// Shape style keys (style records and per-object overrides)
const KEY_FILL: &str = "fill";
const KEY_FILL_GRADIENT: &str = "fill_gradient";
const KEY_STROKE: &str = "stroke";
const KEY_STROKE_WIDTH: &str = "stroke_width";
const KEY_DASH: &str = "dash";
const KEY_CAP: &str = "cap";
const KEY_JOIN: &str = "join";
pub(crate) const KEY_CORNER_RADIUS: &str = "corner_radius";
const KEY_SHADOW: &str = "shadow";
const KEY_SHADOW_BLUR: &str = "shadow_blur";
const KEY_SHADOW_DX: &str = "shadow_dx";
const KEY_SHADOW_DY: &str = "shadow_dy";

// Text style keys
const KEY_TEXT_FILL: &str = "text_fill";
const KEY_FONT: &str = "font";
const KEY_FONT_SIZE: &str = "font_size";
const KEY_FONT_WEIGHT: &str = "font_weight";
const KEY_ITALIC: &str = "italic";
const KEY_DECORATION: &str = "decoration";
const KEY_ALIGN: &str = "align";
const KEY_LETTER_SPACING: &str = "letter_spacing";
const KEY_LINE_HEIGHT: &str = "line_height";
const KEY_BULLET: &str = "bullet";

// Style record keys
const KEY_STYLE_KIND: &str = "kind";
const STYLE_SHAPE: &str = "shape";
const STYLE_TEXT: &str = "text";

// View keys
const KEY_BG_COLOR: &str = "bg_color";
const KEY_BG_GRADIENT: &str = "bg_gradient";
const KEY_BG_IMAGE: &str = "bg_image";
const KEY_BG_FIT: &str = "bg_fit";
pub(crate) const KEY_TEMPLATE: &str = "template";
const KEY_OWN_COLOR: &str = "own_color";
const KEY_OWN_GRADIENT: &str = "own_gradient";
const KEY_OWN_IMAGE: &str = "own_image";
const KEY_OWN_FIT: &str = "own_fit";
pub(crate) const KEY_TRANSITION: &str = "transition";
pub(crate) const KEY_TRANSITION_MS: &str = "transition_ms";

// Container keys
const KEY_SCALE_X: &str = "scale_x";
const KEY_SCALE_Y: &str = "scale_y";
const KEY_BLEND: &str = "blend";

// Palette keys
const COLOR_KEYS: [&str; 8] = [
    "color_0", "color_1", "color_2", "color_3", "color_4", "color_5", "color_6", "color_7",
];
const GRADIENT_KEYS: [&str; 4] = ["gradient_0", "gradient_1", "gradient_2", "gradient_3"];

// Template keys
const KEY_GUIDES: &str = "guides";

pub(crate) const BACKGROUND_KEYS: [&str; 4] =
    [KEY_BG_COLOR, KEY_BG_GRADIENT, KEY_BG_IMAGE, KEY_BG_FIT];
pub(crate) const OVERRIDE_FLAG_KEYS: [&str; 4] =
    [KEY_OWN_COLOR, KEY_OWN_GRADIENT, KEY_OWN_IMAGE, KEY_OWN_FIT];
pub(crate) const SHAPE_FIELD_KEYS: [&str; 12] = [
    KEY_FILL,
    KEY_FILL_GRADIENT,
    KEY_STROKE,
    KEY_STROKE_WIDTH,
    KEY_DASH,
    KEY_CAP,
    KEY_JOIN,
    KEY_CORNER_RADIUS,
    KEY_SHADOW,
    KEY_SHADOW_BLUR,
    KEY_SHADOW_DX,
    KEY_SHADOW_DY,
];
pub(crate) const TEXT_FIELD_KEYS: [&str; 10] = [
    KEY_TEXT_FILL,
    KEY_FONT,
    KEY_FONT_SIZE,
    KEY_FONT_WEIGHT,
    KEY_ITALIC,
    KEY_DECORATION,
    KEY_ALIGN,
    KEY_LETTER_SPACING,
    KEY_LINE_HEIGHT,
    KEY_BULLET,
];

/// Map keys carrying per-type payload for the given object type.
pub(crate) fn payload_keys(ty: ObjectType) -> &'static [&'static str] {
    match ty {
        ObjectType::Rect => &[KEY_RADIUS],
        ObjectType::Ellipse => &[],
        ObjectType::Line => &[KEY_POINTS],
        ObjectType::Path => &[KEY_POINTS, KEY_CLOSED],
        ObjectType::Polygon => &[KEY_SIDES],
        ObjectType::Text => &[KEY_CONTENT],
        ObjectType::TextBox => &[KEY_BUFFER],
        ObjectType::Image => &[KEY_SOURCE, KEY_FIT],
        ObjectType::Embed => &[KEY_URL],
        ObjectType::Connector => &[KEY_START, KEY_END, KEY_POINTS],
        ObjectType::QrCode => &[KEY_URL],
        ObjectType::PollFrame => &[KEY_POLL],
        ObjectType::TableGrid => &[KEY_ROWS, KEY_COLS],
    }
}

// Helper functions to extract values from LoroMapValue (derefs to a map of
// String -> LoroValue)

fn get_double(map: &LoroMapValue, key: &str) -> Option<f64> {
    match map.get(key)? {
        LoroValue::Double(d) => Some(*d),
        LoroValue::I64(i) => Some(*i as f64),
        _ => None,
    }
}

fn get_i64(map: &LoroMapValue, key: &str) -> Option<i64> {
    match map.get(key)? {
        LoroValue::I64(i) => Some(*i),
        LoroValue::Double(d) => Some(*d as i64),
        _ => None,
    }
}

fn get_u32(map: &LoroMapValue, key: &str) -> Option<u32> {
    get_i64(map, key).and_then(|v| u32::try_from(v).ok())
}

fn get_string(map: &LoroMapValue, key: &str) -> Option<String> {
    match map.get(key)? {
        LoroValue::String(s) => Some(s.to_string()),
        _ => None,
    }
}

fn get_bool(map: &LoroMapValue, key: &str) -> Option<bool> {
    match map.get(key)? {
        LoroValue::Bool(b) => Some(*b),
        _ => None,
    }
}

fn number(value: &LoroValue) -> Option<f64> {
    match value {
        LoroValue::Double(d) => Some(*d),
        LoroValue::I64(i) => Some(*i as f64),
        _ => None,
    }
}

/// Delete a map key if present. Absent keys are left alone so the delete
/// never records a spurious op.
pub(crate) fn delete_key(map: &LoroMap, key: &str) -> LoroResult<()> {
    if map.get(key).is_some() {
        map.delete(key)?;
    }
    Ok(())
}

/// Store points as a list of `[x, y]` pairs.
pub(crate) fn write_points(map: &LoroMap, key: &str, points: &[Point]) -> LoroResult<()> {
    let list = map.insert_container(key, LoroList::new())?;
    for point in points {
        let pair = list.insert_container(list.len(), LoroList::new())?;
        pair.push(point.x)?;
        pair.push(point.y)?;
    }
    Ok(())
}

fn get_points(map: &LoroMapValue, key: &str) -> Option<Vec<Point>> {
    match map.get(key)? {
        LoroValue::List(list) => Some(
            list.iter()
                .filter_map(|entry| {
                    if let LoroValue::List(pair) = entry {
                        let x = number(pair.first()?)?;
                        let y = number(pair.get(1)?)?;
                        Some(Point::new(x, y))
                    } else {
                        None
                    }
                })
                .collect(),
        ),
        _ => None,
    }
}

fn get_string_list(map: &LoroMapValue, key: &str) -> Option<Vec<String>> {
    match map.get(key)? {
        LoroValue::List(list) => Some(
            list.iter()
                .filter_map(|entry| match entry {
                    LoroValue::String(s) => Some(s.to_string()),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn encode_dash(dash: &[f64]) -> String {
    dash.iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_dash(raw: &str) -> Option<Vec<f64>> {
    let values: Vec<f64> = raw
        .split_whitespace()
        .filter_map(|part| part.parse().ok())
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Write an object record. Only present fields are stored; the type tag is
/// always stored.
pub(crate) fn object_to_loro(record: &ObjectRecord, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_TYPE, record.object_type().tag())?;
    if let Ancestry::InstanceOf(proto) = &record.ancestry {
        map.insert(KEY_PROTO, proto.as_str())?;
    }
    if let Some(parent) = &record.parent {
        map.insert(KEY_PARENT, parent.as_str())?;
    }
    if let Some(view) = &record.view {
        map.insert(KEY_VIEW, view.as_str())?;
    }
    if let Some(position) = record.position {
        map.insert(KEY_X, position.x)?;
        map.insert(KEY_Y, position.y)?;
    }
    if let Some(size) = record.size {
        map.insert(KEY_WIDTH, size.width)?;
        map.insert(KEY_HEIGHT, size.height)?;
    }
    if let Some(rotation) = record.rotation {
        map.insert(KEY_ROTATION, rotation)?;
    }
    if let Some(pivot) = record.pivot {
        map.insert(KEY_PIVOT_X, pivot.x)?;
        map.insert(KEY_PIVOT_Y, pivot.y)?;
    }
    if let Some(opacity) = record.opacity {
        map.insert(KEY_OPACITY, opacity)?;
    }
    if let Some(visible) = record.visible {
        map.insert(KEY_VISIBLE, visible)?;
    }
    if let Some(locked) = record.locked {
        map.insert(KEY_LOCKED, locked)?;
    }
    if let Some(hidden) = record.hidden {
        map.insert(KEY_HIDDEN, hidden)?;
    }
    if let Some(name) = &record.name {
        map.insert(KEY_NAME, name.as_str())?;
    }
    if let Some(style) = &record.shape_style {
        map.insert(KEY_SHAPE_STYLE, style.as_str())?;
    }
    if let Some(style) = &record.text_style {
        map.insert(KEY_TEXT_STYLE, style.as_str())?;
    }
    write_kind_fields(&record.kind, map)?;
    write_shape_fields(&record.shape_overrides, map)?;
    write_text_fields(&record.text_overrides, map)?;
    Ok(())
}

/// Read an object record. Returns `None` when the type tag is missing or
/// unrecognized; every other field is optional.
pub(crate) fn object_from_loro(id: &ObjectId, map: &LoroMapValue) -> Option<ObjectRecord> {
    let ty: ObjectType = get_string(map, KEY_TYPE)?.parse().ok()?;
    let mut record = ObjectRecord::new(id.clone(), kind_from_loro(ty, map));
    record.ancestry = match get_string(map, KEY_PROTO) {
        Some(proto) => Ancestry::InstanceOf(ObjectId::from_string(proto)),
        None => Ancestry::Concrete,
    };
    record.parent = get_string(map, KEY_PARENT).map(ContainerId::from_string);
    record.view = get_string(map, KEY_VIEW).map(ViewId::from_string);
    record.position = match (get_double(map, KEY_X), get_double(map, KEY_Y)) {
        (Some(x), Some(y)) => Some(Point::new(x, y)),
        _ => None,
    };
    record.size = match (get_double(map, KEY_WIDTH), get_double(map, KEY_HEIGHT)) {
        (Some(w), Some(h)) => Some(Size::new(w, h)),
        _ => None,
    };
    record.rotation = get_double(map, KEY_ROTATION);
    record.pivot = match (get_double(map, KEY_PIVOT_X), get_double(map, KEY_PIVOT_Y)) {
        (Some(px), Some(py)) => Some(Point::new(px, py)),
        _ => None,
    };
    record.opacity = get_double(map, KEY_OPACITY);
    record.visible = get_bool(map, KEY_VISIBLE);
    record.locked = get_bool(map, KEY_LOCKED);
    record.hidden = get_bool(map, KEY_HIDDEN);
    record.name = get_string(map, KEY_NAME);
    record.shape_style = get_string(map, KEY_SHAPE_STYLE).map(StyleId::from_string);
    record.text_style = get_string(map, KEY_TEXT_STYLE).map(StyleId::from_string);
    record.shape_overrides = shape_fields_from_loro(map);
    record.text_overrides = text_fields_from_loro(map);
    Some(record)
}

/// Write the present payload fields of a kind, without touching the type
/// tag.
pub(crate) fn write_kind_fields(kind: &ObjectKind, map: &LoroMap) -> LoroResult<()> {
    match kind {
        ObjectKind::Rect { radius } => {
            if let Some(radius) = radius {
                map.insert(KEY_RADIUS, *radius)?;
            }
        }
        ObjectKind::Ellipse => {}
        ObjectKind::Line { points } => {
            if let Some(points) = points {
                write_points(map, KEY_POINTS, points)?;
            }
        }
        ObjectKind::Path { points, closed } => {
            if let Some(points) = points {
                write_points(map, KEY_POINTS, points)?;
            }
            if let Some(closed) = closed {
                map.insert(KEY_CLOSED, *closed)?;
            }
        }
        ObjectKind::Polygon { sides } => {
            if let Some(sides) = sides {
                map.insert(KEY_SIDES, i64::from(*sides))?;
            }
        }
        ObjectKind::Text { content } => {
            if let Some(content) = content {
                map.insert(KEY_CONTENT, content.as_str())?;
            }
        }
        ObjectKind::TextBox { buffer } => {
            if let Some(buffer) = buffer {
                map.insert(KEY_BUFFER, buffer.as_str())?;
            }
        }
        ObjectKind::Image { source, fit } => {
            if let Some(source) = source {
                map.insert(KEY_SOURCE, source.as_str())?;
            }
            if let Some(fit) = fit {
                map.insert(KEY_FIT, fit.tag())?;
            }
        }
        ObjectKind::Embed { url } => {
            if let Some(url) = url {
                map.insert(KEY_URL, url.as_str())?;
            }
        }
        ObjectKind::Connector { start, end, points } => {
            if let Some(start) = start {
                map.insert(KEY_START, start.as_str())?;
            }
            if let Some(end) = end {
                map.insert(KEY_END, end.as_str())?;
            }
            if let Some(points) = points {
                write_points(map, KEY_POINTS, points)?;
            }
        }
        ObjectKind::QrCode { url } => {
            if let Some(url) = url {
                map.insert(KEY_URL, url.as_str())?;
            }
        }
        ObjectKind::PollFrame { poll } => {
            if let Some(poll) = poll {
                map.insert(KEY_POLL, poll.as_str())?;
            }
        }
        ObjectKind::TableGrid { rows, cols } => {
            if let Some(rows) = rows {
                map.insert(KEY_ROWS, i64::from(*rows))?;
            }
            if let Some(cols) = cols {
                map.insert(KEY_COLS, i64::from(*cols))?;
            }
        }
    }
    Ok(())
}

pub(crate) fn kind_from_loro(ty: ObjectType, map: &LoroMapValue) -> ObjectKind {
    match ty {
        ObjectType::Rect => ObjectKind::Rect {
            radius: get_double(map, KEY_RADIUS),
        },
        ObjectType::Ellipse => ObjectKind::Ellipse,
        ObjectType::Line => ObjectKind::Line {
            points: get_points(map, KEY_POINTS),
        },
        ObjectType::Path => ObjectKind::Path {
            points: get_points(map, KEY_POINTS),
            closed: get_bool(map, KEY_CLOSED),
        },
        ObjectType::Polygon => ObjectKind::Polygon {
            sides: get_u32(map, KEY_SIDES),
        },
        ObjectType::Text => ObjectKind::Text {
            content: get_string(map, KEY_CONTENT),
        },
        ObjectType::TextBox => ObjectKind::TextBox {
            buffer: get_string(map, KEY_BUFFER).map(TextId::from_string),
        },
        ObjectType::Image => ObjectKind::Image {
            source: get_string(map, KEY_SOURCE),
            fit: get_string(map, KEY_FIT).and_then(|tag| ImageFit::from_tag(&tag)),
        },
        ObjectType::Embed => ObjectKind::Embed {
            url: get_string(map, KEY_URL),
        },
        ObjectType::Connector => ObjectKind::Connector {
            start: get_string(map, KEY_START).map(ObjectId::from_string),
            end: get_string(map, KEY_END).map(ObjectId::from_string),
            points: get_points(map, KEY_POINTS),
        },
        ObjectType::QrCode => ObjectKind::QrCode {
            url: get_string(map, KEY_URL),
        },
        ObjectType::PollFrame => ObjectKind::PollFrame {
            poll: get_string(map, KEY_POLL),
        },
        ObjectType::TableGrid => ObjectKind::TableGrid {
            rows: get_u32(map, KEY_ROWS),
            cols: get_u32(map, KEY_COLS),
        },
    }
}

/// Apply a partial update as narrowed field writes.
pub(crate) fn write_object_patch(patch: &ObjectPatch, map: &LoroMap) -> LoroResult<()> {
    if let Some(position) = patch.position {
        map.insert(KEY_X, position.x)?;
        map.insert(KEY_Y, position.y)?;
    }
    if let Some(size) = patch.size {
        map.insert(KEY_WIDTH, size.width)?;
        map.insert(KEY_HEIGHT, size.height)?;
    }
    if let Some(rotation) = patch.rotation {
        map.insert(KEY_ROTATION, rotation)?;
    }
    if let Some(pivot) = patch.pivot {
        map.insert(KEY_PIVOT_X, pivot.x)?;
        map.insert(KEY_PIVOT_Y, pivot.y)?;
    }
    if let Some(opacity) = patch.opacity {
        map.insert(KEY_OPACITY, opacity)?;
    }
    if let Some(visible) = patch.visible {
        map.insert(KEY_VISIBLE, visible)?;
    }
    if let Some(locked) = patch.locked {
        map.insert(KEY_LOCKED, locked)?;
    }
    if let Some(hidden) = patch.hidden {
        map.insert(KEY_HIDDEN, hidden)?;
    }
    if let Some(name) = &patch.name {
        map.insert(KEY_NAME, name.as_str())?;
    }
    if let Some(style) = &patch.shape_style {
        map.insert(KEY_SHAPE_STYLE, style.as_str())?;
    }
    if let Some(style) = &patch.text_style {
        map.insert(KEY_TEXT_STYLE, style.as_str())?;
    }
    if let Some(kind) = &patch.kind {
        write_kind_fields(kind, map)?;
    }
    if let Some(fields) = &patch.shape_overrides {
        write_shape_fields(fields, map)?;
    }
    if let Some(fields) = &patch.text_overrides {
        write_text_fields(fields, map)?;
    }
    Ok(())
}

/// Rewrite the type tag with its current value. Used as the observer-wake
/// touch after a reorder; changes nothing an observer reads.
pub(crate) fn touch_record(map: &LoroMap, ty: ObjectType) -> LoroResult<()> {
    map.insert(KEY_TYPE, ty.tag())
}

pub(crate) fn write_shape_fields(fields: &ShapeStyleFields, map: &LoroMap) -> LoroResult<()> {
    if let Some(fill) = &fields.fill {
        map.insert(KEY_FILL, fill.encode())?;
    }
    if let Some(gradient) = &fields.fill_gradient {
        map.insert(KEY_FILL_GRADIENT, gradient.encode())?;
    }
    if let Some(stroke) = &fields.stroke {
        map.insert(KEY_STROKE, stroke.encode())?;
    }
    if let Some(width) = fields.stroke_width {
        map.insert(KEY_STROKE_WIDTH, width)?;
    }
    if let Some(dash) = &fields.dash {
        map.insert(KEY_DASH, encode_dash(dash))?;
    }
    if let Some(cap) = fields.cap {
        map.insert(KEY_CAP, cap.tag())?;
    }
    if let Some(join) = fields.join {
        map.insert(KEY_JOIN, join.tag())?;
    }
    if let Some(radius) = fields.corner_radius {
        map.insert(KEY_CORNER_RADIUS, radius)?;
    }
    if let Some(shadow) = &fields.shadow {
        map.insert(KEY_SHADOW, shadow.encode())?;
    }
    if let Some(blur) = fields.shadow_blur {
        map.insert(KEY_SHADOW_BLUR, blur)?;
    }
    if let Some(dx) = fields.shadow_dx {
        map.insert(KEY_SHADOW_DX, dx)?;
    }
    if let Some(dy) = fields.shadow_dy {
        map.insert(KEY_SHADOW_DY, dy)?;
    }
    Ok(())
}

pub(crate) fn shape_fields_from_loro(map: &LoroMapValue) -> ShapeStyleFields {
    ShapeStyleFields {
        fill: get_string(map, KEY_FILL).map(|raw| Paint::decode(&raw)),
        fill_gradient: get_string(map, KEY_FILL_GRADIENT)
            .and_then(|raw| GradientSpec::decode(&raw)),
        stroke: get_string(map, KEY_STROKE).map(|raw| Paint::decode(&raw)),
        stroke_width: get_double(map, KEY_STROKE_WIDTH),
        dash: get_string(map, KEY_DASH).and_then(|raw| parse_dash(&raw)),
        cap: get_string(map, KEY_CAP).and_then(|tag| LineCap::from_tag(&tag)),
        join: get_string(map, KEY_JOIN).and_then(|tag| LineJoin::from_tag(&tag)),
        corner_radius: get_double(map, KEY_CORNER_RADIUS),
        shadow: get_string(map, KEY_SHADOW).map(|raw| Paint::decode(&raw)),
        shadow_blur: get_double(map, KEY_SHADOW_BLUR),
        shadow_dx: get_double(map, KEY_SHADOW_DX),
        shadow_dy: get_double(map, KEY_SHADOW_DY),
    }
}

pub(crate) fn write_text_fields(fields: &TextStyleFields, map: &LoroMap) -> LoroResult<()> {
    if let Some(fill) = &fields.fill {
        map.insert(KEY_TEXT_FILL, fill.encode())?;
    }
    if let Some(font) = &fields.font {
        map.insert(KEY_FONT, font.as_str())?;
    }
    if let Some(size) = fields.size {
        map.insert(KEY_FONT_SIZE, size)?;
    }
    if let Some(weight) = fields.weight {
        map.insert(KEY_FONT_WEIGHT, i64::from(weight))?;
    }
    if let Some(italic) = fields.italic {
        map.insert(KEY_ITALIC, italic)?;
    }
    if let Some(decoration) = fields.decoration {
        map.insert(KEY_DECORATION, decoration.tag())?;
    }
    if let Some(align) = fields.align {
        map.insert(KEY_ALIGN, align.tag())?;
    }
    if let Some(spacing) = fields.letter_spacing {
        map.insert(KEY_LETTER_SPACING, spacing)?;
    }
    if let Some(height) = fields.line_height {
        map.insert(KEY_LINE_HEIGHT, height)?;
    }
    if let Some(bullet) = &fields.bullet {
        map.insert(KEY_BULLET, bullet.as_str())?;
    }
    Ok(())
}

pub(crate) fn text_fields_from_loro(map: &LoroMapValue) -> TextStyleFields {
    TextStyleFields {
        fill: get_string(map, KEY_TEXT_FILL).map(|raw| Paint::decode(&raw)),
        font: get_string(map, KEY_FONT),
        size: get_double(map, KEY_FONT_SIZE),
        weight: get_i64(map, KEY_FONT_WEIGHT).and_then(|v| u16::try_from(v).ok()),
        italic: get_bool(map, KEY_ITALIC),
        decoration: get_string(map, KEY_DECORATION)
            .and_then(|tag| TextDecoration::from_tag(&tag)),
        align: get_string(map, KEY_ALIGN).and_then(|tag| TextAlign::from_tag(&tag)),
        letter_spacing: get_double(map, KEY_LETTER_SPACING),
        line_height: get_double(map, KEY_LINE_HEIGHT),
        bullet: get_string(map, KEY_BULLET),
    }
}

fn shape_field_entry(field: &ShapeStyleField) -> (&'static str, Option<LoroValue>) {
    match field {
        ShapeStyleField::Fill(v) => (KEY_FILL, v.as_ref().map(|p| p.encode().into())),
        ShapeStyleField::FillGradient(v) => {
            (KEY_FILL_GRADIENT, v.as_ref().map(|g| g.encode().into()))
        }
        ShapeStyleField::Stroke(v) => (KEY_STROKE, v.as_ref().map(|p| p.encode().into())),
        ShapeStyleField::StrokeWidth(v) => (KEY_STROKE_WIDTH, v.map(LoroValue::from)),
        ShapeStyleField::Dash(v) => (KEY_DASH, v.as_ref().map(|d| encode_dash(d).into())),
        ShapeStyleField::Cap(v) => (KEY_CAP, v.map(|c| c.tag().into())),
        ShapeStyleField::Join(v) => (KEY_JOIN, v.map(|j| j.tag().into())),
        ShapeStyleField::CornerRadius(v) => (KEY_CORNER_RADIUS, v.map(LoroValue::from)),
        ShapeStyleField::Shadow(v) => (KEY_SHADOW, v.as_ref().map(|p| p.encode().into())),
        ShapeStyleField::ShadowBlur(v) => (KEY_SHADOW_BLUR, v.map(LoroValue::from)),
        ShapeStyleField::ShadowDx(v) => (KEY_SHADOW_DX, v.map(LoroValue::from)),
        ShapeStyleField::ShadowDy(v) => (KEY_SHADOW_DY, v.map(LoroValue::from)),
    }
}

/// Apply one shape override: set the field, or delete it so it inherits
/// again.
pub(crate) fn write_shape_field(map: &LoroMap, field: &ShapeStyleField) -> LoroResult<()> {
    let (key, value) = shape_field_entry(field);
    match value {
        Some(value) => {
            map.insert(key, value)?;
        }
        None => delete_key(map, key)?,
    }
    Ok(())
}

fn text_field_entry(field: &TextStyleField) -> (&'static str, Option<LoroValue>) {
    match field {
        TextStyleField::Fill(v) => (KEY_TEXT_FILL, v.as_ref().map(|p| p.encode().into())),
        TextStyleField::Font(v) => (KEY_FONT, v.as_ref().map(|f| f.as_str().into())),
        TextStyleField::Size(v) => (KEY_FONT_SIZE, v.map(LoroValue::from)),
        TextStyleField::Weight(v) => (KEY_FONT_WEIGHT, v.map(|w| i64::from(w).into())),
        TextStyleField::Italic(v) => (KEY_ITALIC, v.map(LoroValue::from)),
        TextStyleField::Decoration(v) => (KEY_DECORATION, v.map(|d| d.tag().into())),
        TextStyleField::Align(v) => (KEY_ALIGN, v.map(|a| a.tag().into())),
        TextStyleField::LetterSpacing(v) => (KEY_LETTER_SPACING, v.map(LoroValue::from)),
        TextStyleField::LineHeight(v) => (KEY_LINE_HEIGHT, v.map(LoroValue::from)),
        TextStyleField::Bullet(v) => (KEY_BULLET, v.as_ref().map(|b| b.as_str().into())),
    }
}

/// Apply one text override: set the field, or delete it so it inherits
/// again.
pub(crate) fn write_text_field(map: &LoroMap, field: &TextStyleField) -> LoroResult<()> {
    let (key, value) = text_field_entry(field);
    match value {
        Some(value) => {
            map.insert(key, value)?;
        }
        None => delete_key(map, key)?,
    }
    Ok(())
}

pub(crate) fn write_background(background: &Background, map: &LoroMap) -> LoroResult<()> {
    if let Some(color) = &background.color {
        map.insert(KEY_BG_COLOR, color.encode())?;
    }
    if let Some(gradient) = &background.gradient {
        map.insert(KEY_BG_GRADIENT, gradient.encode())?;
    }
    if let Some(image) = &background.image {
        map.insert(KEY_BG_IMAGE, image.as_str())?;
    }
    if let Some(fit) = background.fit {
        map.insert(KEY_BG_FIT, fit.tag())?;
    }
    Ok(())
}

pub(crate) fn background_from_loro(map: &LoroMapValue) -> Background {
    Background {
        color: get_string(map, KEY_BG_COLOR).map(|raw| Paint::decode(&raw)),
        gradient: get_string(map, KEY_BG_GRADIENT).and_then(|raw| GradientSpec::decode(&raw)),
        image: get_string(map, KEY_BG_IMAGE),
        fit: get_string(map, KEY_BG_FIT).and_then(|tag| ImageFit::from_tag(&tag)),
    }
}

pub(crate) fn clear_background(map: &LoroMap) -> LoroResult<()> {
    for key in BACKGROUND_KEYS {
        delete_key(map, key)?;
    }
    Ok(())
}

pub(crate) fn write_background_overrides(
    flags: BackgroundOverrides,
    map: &LoroMap,
) -> LoroResult<()> {
    for (key, flag) in OVERRIDE_FLAG_KEYS
        .into_iter()
        .zip([flags.color, flags.gradient, flags.image, flags.fit])
    {
        if flag {
            map.insert(key, true)?;
        } else {
            delete_key(map, key)?;
        }
    }
    Ok(())
}

pub(crate) fn background_overrides_from_loro(map: &LoroMapValue) -> BackgroundOverrides {
    BackgroundOverrides {
        color: get_bool(map, KEY_OWN_COLOR).unwrap_or(false),
        gradient: get_bool(map, KEY_OWN_GRADIENT).unwrap_or(false),
        image: get_bool(map, KEY_OWN_IMAGE).unwrap_or(false),
        fit: get_bool(map, KEY_OWN_FIT).unwrap_or(false),
    }
}

pub(crate) fn clear_override_flags(map: &LoroMap) -> LoroResult<()> {
    for key in OVERRIDE_FLAG_KEYS {
        delete_key(map, key)?;
    }
    Ok(())
}

pub(crate) fn view_to_loro(view: &ViewRecord, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_NAME, view.name.as_str())?;
    map.insert(KEY_X, view.position.x)?;
    map.insert(KEY_Y, view.position.y)?;
    map.insert(KEY_WIDTH, view.size.width)?;
    map.insert(KEY_HEIGHT, view.size.height)?;
    write_background(&view.background, map)?;
    if let Some(template) = &view.template {
        map.insert(KEY_TEMPLATE, template.as_str())?;
    }
    write_background_overrides(view.background_overrides, map)?;
    map.insert(KEY_TRANSITION, view.transition.kind.tag())?;
    map.insert(KEY_TRANSITION_MS, i64::from(view.transition.duration_ms))?;
    if view.hidden {
        map.insert(KEY_HIDDEN, true)?;
    }
    Ok(())
}

pub(crate) fn view_from_loro(id: &ViewId, map: &LoroMapValue) -> Option<ViewRecord> {
    let mut view = ViewRecord::new(id.clone(), get_string(map, KEY_NAME)?);
    if let (Some(x), Some(y)) = (get_double(map, KEY_X), get_double(map, KEY_Y)) {
        view.position = Point::new(x, y);
    }
    if let (Some(w), Some(h)) = (get_double(map, KEY_WIDTH), get_double(map, KEY_HEIGHT)) {
        view.size = Size::new(w, h);
    }
    view.background = background_from_loro(map);
    view.template = get_string(map, KEY_TEMPLATE).map(TemplateId::from_string);
    view.background_overrides = background_overrides_from_loro(map);
    if let Some(kind) = get_string(map, KEY_TRANSITION).and_then(|tag| TransitionKind::from_tag(&tag))
    {
        view.transition.kind = kind;
    }
    if let Some(ms) = get_u32(map, KEY_TRANSITION_MS) {
        view.transition.duration_ms = ms;
    }
    view.hidden = get_bool(map, KEY_HIDDEN).unwrap_or(false);
    Some(view)
}

pub(crate) fn container_to_loro(container: &ContainerRecord, map: &LoroMap) -> LoroResult<()> {
    if let Some(name) = &container.name {
        map.insert(KEY_NAME, name.as_str())?;
    }
    map.insert(KEY_X, container.position.x)?;
    map.insert(KEY_Y, container.position.y)?;
    map.insert(KEY_ROTATION, container.rotation)?;
    map.insert(KEY_SCALE_X, container.scale_x)?;
    map.insert(KEY_SCALE_Y, container.scale_y)?;
    map.insert(KEY_OPACITY, container.opacity)?;
    map.insert(KEY_BLEND, container.blend.tag())?;
    map.insert(KEY_VISIBLE, container.visible)?;
    map.insert(KEY_LOCKED, container.locked)?;
    Ok(())
}

/// Narrowed container update: only the fields present in the patch are
/// written, so concurrent edits to sibling fields survive.
pub(crate) fn write_container_patch(patch: &ContainerPatch, map: &LoroMap) -> LoroResult<()> {
    if let Some(name) = &patch.name {
        map.insert(KEY_NAME, name.as_str())?;
    }
    if let Some(position) = patch.position {
        map.insert(KEY_X, position.x)?;
        map.insert(KEY_Y, position.y)?;
    }
    if let Some(rotation) = patch.rotation {
        map.insert(KEY_ROTATION, rotation)?;
    }
    if let Some(scale_x) = patch.scale_x {
        map.insert(KEY_SCALE_X, scale_x)?;
    }
    if let Some(scale_y) = patch.scale_y {
        map.insert(KEY_SCALE_Y, scale_y)?;
    }
    if let Some(opacity) = patch.opacity {
        map.insert(KEY_OPACITY, opacity)?;
    }
    if let Some(blend) = patch.blend {
        map.insert(KEY_BLEND, blend.tag())?;
    }
    if let Some(visible) = patch.visible {
        map.insert(KEY_VISIBLE, visible)?;
    }
    if let Some(locked) = patch.locked {
        map.insert(KEY_LOCKED, locked)?;
    }
    Ok(())
}

pub(crate) fn container_from_loro(id: &ContainerId, map: &LoroMapValue) -> ContainerRecord {
    let mut container = ContainerRecord::new(id.clone());
    container.name = get_string(map, KEY_NAME);
    if let Some(x) = get_double(map, KEY_X) {
        container.position.x = x;
    }
    if let Some(y) = get_double(map, KEY_Y) {
        container.position.y = y;
    }
    if let Some(rotation) = get_double(map, KEY_ROTATION) {
        container.rotation = rotation;
    }
    if let Some(scale_x) = get_double(map, KEY_SCALE_X) {
        container.scale_x = scale_x;
    }
    if let Some(scale_y) = get_double(map, KEY_SCALE_Y) {
        container.scale_y = scale_y;
    }
    if let Some(opacity) = get_double(map, KEY_OPACITY) {
        container.opacity = opacity;
    }
    if let Some(blend) = get_string(map, KEY_BLEND).and_then(|tag| BlendMode::from_tag(&tag)) {
        container.blend = blend;
    }
    if let Some(visible) = get_bool(map, KEY_VISIBLE) {
        container.visible = visible;
    }
    if let Some(locked) = get_bool(map, KEY_LOCKED) {
        container.locked = locked;
    }
    container
}

pub(crate) fn style_to_loro(style: &StyleRecord, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_NAME, style.name.as_str())?;
    if let Some(parent) = &style.parent {
        map.insert(KEY_PARENT, parent.as_str())?;
    }
    match &style.fields {
        StyleFields::Shape(fields) => {
            map.insert(KEY_STYLE_KIND, STYLE_SHAPE)?;
            write_shape_fields(fields, map)?;
        }
        StyleFields::Text(fields) => {
            map.insert(KEY_STYLE_KIND, STYLE_TEXT)?;
            write_text_fields(fields, map)?;
        }
    }
    Ok(())
}

pub(crate) fn style_from_loro(id: &StyleId, map: &LoroMapValue) -> Option<StyleRecord> {
    let name = get_string(map, KEY_NAME)?;
    let fields = match get_string(map, KEY_STYLE_KIND)?.as_str() {
        STYLE_SHAPE => StyleFields::Shape(shape_fields_from_loro(map)),
        STYLE_TEXT => StyleFields::Text(text_fields_from_loro(map)),
        _ => return None,
    };
    Some(StyleRecord {
        id: id.clone(),
        name,
        parent: get_string(map, KEY_PARENT).map(StyleId::from_string),
        fields,
    })
}

pub(crate) fn palette_to_loro(palette: &PaletteRecord, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_NAME, palette.name.as_str())?;
    for (key, color) in COLOR_KEYS.into_iter().zip(&palette.colors) {
        map.insert(key, color.as_str())?;
    }
    for (key, gradient) in GRADIENT_KEYS.into_iter().zip(&palette.gradients) {
        map.insert(key, serde_json::to_string(gradient).unwrap_or_default())?;
    }
    Ok(())
}

pub(crate) fn palette_from_loro(id: &PaletteId, map: &LoroMapValue) -> Option<PaletteRecord> {
    let mut palette = PaletteRecord::new(id.clone(), get_string(map, KEY_NAME)?);
    for (key, slot) in COLOR_KEYS.into_iter().zip(palette.colors.iter_mut()) {
        if let Some(color) = get_string(map, key) {
            *slot = color;
        }
    }
    for (key, slot) in GRADIENT_KEYS.into_iter().zip(palette.gradients.iter_mut()) {
        if let Some(gradient) = get_string(map, key)
            .and_then(|raw| serde_json::from_str::<Gradient>(&raw).ok())
        {
            *slot = gradient;
        }
    }
    Some(palette)
}

pub(crate) fn template_to_loro(template: &TemplateRecord, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_NAME, template.name.as_str())?;
    write_background(&template.background, map)?;
    write_guides(&template.guides, map)
}

pub(crate) fn write_guides(guides: &[SnapGuide], map: &LoroMap) -> LoroResult<()> {
    let list = map.insert_container(KEY_GUIDES, LoroList::new())?;
    for guide in guides {
        list.push(guide.encode())?;
    }
    Ok(())
}

pub(crate) fn template_from_loro(id: &TemplateId, map: &LoroMapValue) -> Option<TemplateRecord> {
    let mut template = TemplateRecord::new(id.clone(), get_string(map, KEY_NAME)?);
    template.background = background_from_loro(map);
    template.guides = get_string_list(map, KEY_GUIDES)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|raw| SnapGuide::decode(raw))
                .collect()
        })
        .unwrap_or_default();
    Some(template)
}
