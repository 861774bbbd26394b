//! Style and palette resolution.
//!
//! Appearance is layered: fixed defaults, then the named-style chain from
//! its base-most ancestor down, then inline overrides. For instances the
//! chain and overrides come pre-merged by prototype resolution. Paint
//! values may reference palette slots; the active palette substitutes its
//! current colors at resolution time.

use std::collections::HashSet;

use crate::crdt::SceneDocument;
use crate::id::{ObjectId, StyleId, ViewId};
use crate::model::{
    Background, Gradient, GradientSpec, Paint, PaletteRecord, ResolvedObject, ResolvedShadow,
    ResolvedShapeStyle, ResolvedStyle, ResolvedTextStyle, ShapeStyleFields, StyleFields,
    StyleKind, StyleRecord, TextStyleFields,
};

/// Style records from the base-most ancestor down to the referenced style.
/// Cycles terminate the walk with a warning; a dangling reference just
/// shortens the chain.
pub fn style_chain(doc: &SceneDocument, id: Option<&StyleId>) -> Vec<StyleRecord> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = id.cloned();
    while let Some(style_id) = current {
        if !seen.insert(style_id.clone()) {
            log::warn!("style chain contains a cycle at {}", style_id);
            break;
        }
        match doc.style(&style_id) {
            Some(record) => {
                current = record.parent.clone();
                chain.push(record);
            }
            None => break,
        }
    }
    chain.reverse();
    chain
}

/// The currently active palette, if one is set and still exists.
pub fn active_palette(doc: &SceneDocument) -> Option<PaletteRecord> {
    let id = doc.active_palette_id()?;
    doc.palette(&id)
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let rest = color.strip_prefix('#')?;
    if rest.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&rest[0..2], 16).ok()?;
    let g = u8::from_str_radix(&rest[2..4], 16).ok()?;
    let b = u8::from_str_radix(&rest[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Apply an opacity/tint adjustment to a `#rrggbb` color. Positive tint
/// moves toward white, negative toward black. Opacity below 1 appends an
/// alpha byte. Unparseable colors pass through unchanged.
pub(crate) fn adjust_color(color: &str, opacity: Option<f64>, tint: Option<f64>) -> String {
    let Some((mut r, mut g, mut b)) = parse_hex(color) else {
        return color.to_string();
    };
    if let Some(t) = tint {
        let t = t.clamp(-1.0, 1.0);
        let lerp = |c: u8| -> u8 {
            if t >= 0.0 {
                (c as f64 + (255.0 - c as f64) * t).round() as u8
            } else {
                (c as f64 * (1.0 + t)).round() as u8
            }
        };
        r = lerp(r);
        g = lerp(g);
        b = lerp(b);
    }
    match opacity {
        Some(o) if o < 1.0 => {
            let a = (o.clamp(0.0, 1.0) * 255.0).round() as u8;
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
        _ => format!("#{:02x}{:02x}{:02x}", r, g, b),
    }
}

/// Resolve a paint to a literal color. Slot references without an active
/// palette resolve to `None`, which callers treat as "keep the running
/// value".
pub(crate) fn resolve_paint(palette: Option<&PaletteRecord>, paint: &Paint) -> Option<String> {
    match paint {
        Paint::Color(c) => Some(c.clone()),
        Paint::Slot {
            slot,
            opacity,
            tint,
        } => palette.map(|p| adjust_color(p.slot_color(*slot), *opacity, *tint)),
    }
}

/// Resolve a gradient spec against the active palette.
pub(crate) fn resolve_gradient(
    palette: Option<&PaletteRecord>,
    spec: &GradientSpec,
) -> Option<Gradient> {
    match spec {
        GradientSpec::Inline(g) => Some(g.clone()),
        GradientSpec::Slot(n) => palette.and_then(|p| p.gradient(*n)).cloned(),
    }
}

fn apply_shape_fields(
    palette: Option<&PaletteRecord>,
    style: &mut ResolvedShapeStyle,
    fields: &ShapeStyleFields,
) {
    if let Some(paint) = &fields.fill {
        if let Some(color) = resolve_paint(palette, paint) {
            style.fill = color;
        }
    }
    if let Some(spec) = &fields.fill_gradient {
        if let Some(gradient) = resolve_gradient(palette, spec) {
            style.fill_gradient = Some(gradient);
        }
    }
    if let Some(paint) = &fields.stroke {
        if let Some(color) = resolve_paint(palette, paint) {
            style.stroke = Some(color);
        }
    }
    if let Some(width) = fields.stroke_width {
        style.stroke_width = width;
    }
    if let Some(dash) = &fields.dash {
        style.dash = Some(dash.clone());
    }
    if let Some(cap) = fields.cap {
        style.cap = cap;
    }
    if let Some(join) = fields.join {
        style.join = join;
    }
    if let Some(radius) = fields.corner_radius {
        style.corner_radius = radius;
    }
    let wants_shadow = fields.shadow.is_some()
        || fields.shadow_blur.is_some()
        || fields.shadow_dx.is_some()
        || fields.shadow_dy.is_some();
    if wants_shadow {
        let shadow = style.shadow.get_or_insert(ResolvedShadow {
            color: "#000000".to_string(),
            blur: 0.0,
            dx: 0.0,
            dy: 0.0,
        });
        if let Some(paint) = &fields.shadow {
            if let Some(color) = resolve_paint(palette, paint) {
                shadow.color = color;
            }
        }
        if let Some(blur) = fields.shadow_blur {
            shadow.blur = blur;
        }
        if let Some(dx) = fields.shadow_dx {
            shadow.dx = dx;
        }
        if let Some(dy) = fields.shadow_dy {
            shadow.dy = dy;
        }
    }
}

fn apply_text_fields(
    palette: Option<&PaletteRecord>,
    style: &mut ResolvedTextStyle,
    fields: &TextStyleFields,
) {
    if let Some(paint) = &fields.fill {
        if let Some(color) = resolve_paint(palette, paint) {
            style.fill = color;
        }
    }
    if let Some(font) = &fields.font {
        style.font = font.clone();
    }
    if let Some(size) = fields.size {
        style.size = size;
    }
    if let Some(weight) = fields.weight {
        style.weight = weight;
    }
    if let Some(italic) = fields.italic {
        style.italic = italic;
    }
    if let Some(decoration) = fields.decoration {
        style.decoration = decoration;
    }
    if let Some(align) = fields.align {
        style.align = align;
    }
    if let Some(spacing) = fields.letter_spacing {
        style.letter_spacing = spacing;
    }
    if let Some(height) = fields.line_height {
        style.line_height = height;
    }
    if let Some(bullet) = &fields.bullet {
        style.bullet = Some(bullet.clone());
    }
}

/// Fully resolved shape appearance of a resolved object.
pub fn resolve_shape_style_of(doc: &SceneDocument, object: &ResolvedObject) -> ResolvedShapeStyle {
    let palette = active_palette(doc);
    let mut style = ResolvedShapeStyle::default();
    for record in style_chain(doc, object.shape_style.as_ref()) {
        if let StyleFields::Shape(fields) = &record.fields {
            apply_shape_fields(palette.as_ref(), &mut style, fields);
        }
    }
    apply_shape_fields(palette.as_ref(), &mut style, &object.shape_overrides);
    style
}

/// Shape appearance by object id. Unknown or structurally incomplete
/// objects report the baseline defaults.
pub fn resolve_shape_style(doc: &SceneDocument, id: &ObjectId) -> ResolvedShapeStyle {
    match crate::resolve::resolve_object(doc, id) {
        Some(object) => resolve_shape_style_of(doc, &object),
        None => ResolvedShapeStyle::default(),
    }
}

/// Fully resolved text appearance of a resolved object. The baseline uses
/// the object text size.
pub fn resolve_text_style_of(doc: &SceneDocument, object: &ResolvedObject) -> ResolvedTextStyle {
    let palette = active_palette(doc);
    let mut style = ResolvedTextStyle::object_default();
    for record in style_chain(doc, object.text_style.as_ref()) {
        if let StyleFields::Text(fields) = &record.fields {
            apply_text_fields(palette.as_ref(), &mut style, fields);
        }
    }
    apply_text_fields(palette.as_ref(), &mut style, &object.text_overrides);
    style
}

/// Text appearance by object id.
pub fn resolve_text_style(doc: &SceneDocument, id: &ObjectId) -> ResolvedTextStyle {
    match crate::resolve::resolve_object(doc, id) {
        Some(object) => resolve_text_style_of(doc, &object),
        None => ResolvedTextStyle::object_default(),
    }
}

/// Resolve a style definition on its own, as the style library previews
/// it. Text styles use the library text size baseline, not the object one.
pub fn resolve_style_definition(doc: &SceneDocument, id: &StyleId) -> Option<ResolvedStyle> {
    let record = doc.style(id)?;
    let palette = active_palette(doc);
    let chain = style_chain(doc, Some(id));
    Some(match record.kind() {
        StyleKind::Shape => {
            let mut style = ResolvedShapeStyle::default();
            for entry in &chain {
                if let StyleFields::Shape(fields) = &entry.fields {
                    apply_shape_fields(palette.as_ref(), &mut style, fields);
                }
            }
            ResolvedStyle::Shape(style)
        }
        StyleKind::Text => {
            let mut style = ResolvedTextStyle::library_default();
            for entry in &chain {
                if let StyleFields::Text(fields) = &entry.fields {
                    apply_text_fields(palette.as_ref(), &mut style, fields);
                }
            }
            ResolvedStyle::Text(style)
        }
    })
}

/// Effective corner radius of an object. A radius stored on the rect
/// payload wins over anything from the style layers.
pub fn corner_radius_of(doc: &SceneDocument, object: &ResolvedObject) -> f64 {
    match object.kind.corner_radius() {
        Some(radius) => radius,
        None => resolve_shape_style_of(doc, object).corner_radius,
    }
}

/// Effective background of a view: its template's background with the
/// view's own fields layered over it wherever an override flag is set.
/// Without a template the view's own background is used as-is.
pub fn resolve_view_background(doc: &SceneDocument, id: &ViewId) -> Option<Background> {
    let view = doc.view(id)?;
    let template = view.template.as_ref().and_then(|t| doc.template(t));
    let Some(template) = template else {
        return Some(view.background);
    };

    let mut background = template.background;
    let own = view.background;
    let flags = view.background_overrides;
    if flags.color {
        background.color = own.color;
    }
    if flags.gradient {
        background.gradient = own.gradient;
    }
    if flags.image {
        background.image = own.image;
    }
    if flags.fit {
        background.fit = own.fit;
    }
    Some(background)
}
