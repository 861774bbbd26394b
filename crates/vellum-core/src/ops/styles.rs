//! Named-style and palette library management.

use loro::LoroMap;

use crate::crdt::{
    delete_key, palette_to_loro, style_to_loro, SceneDocument, KEY_SHAPE_STYLE, KEY_TEXT_STYLE,
};
use crate::error::SceneResult;
use crate::id::{ObjectId, PaletteId, StyleId};
use crate::model::{PaletteRecord, StyleRecord};

impl SceneDocument {
    /// Create or fully replace a named style. Fields absent from the
    /// record are absent from the stored style afterwards.
    pub fn upsert_style(&mut self, style: &StyleRecord) -> SceneResult<()> {
        let map = self
            .styles_map()
            .insert_container(style.id.as_str(), LoroMap::new())?;
        style_to_loro(style, &map)?;
        self.commit();
        Ok(())
    }

    /// Delete a named style. Objects and derived styles referencing it
    /// fall back to the running defaults at resolution time.
    pub fn delete_style(&mut self, id: &StyleId) -> SceneResult<()> {
        let styles = self.styles_map();
        if styles.get(id.as_str()).is_none() {
            return Ok(());
        }
        styles.delete(id.as_str())?;
        self.commit();
        Ok(())
    }

    /// Point an object at a named shape style, or clear the reference.
    pub fn set_object_shape_style(
        &mut self,
        id: &ObjectId,
        style: Option<&StyleId>,
    ) -> SceneResult<()> {
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        match style {
            Some(style) => map.insert(KEY_SHAPE_STYLE, style.as_str())?,
            None => delete_key(&map, KEY_SHAPE_STYLE)?,
        }
        self.commit();
        Ok(())
    }

    /// Point an object at a named text style, or clear the reference.
    pub fn set_object_text_style(
        &mut self,
        id: &ObjectId,
        style: Option<&StyleId>,
    ) -> SceneResult<()> {
        let Some(map) = self.object_map(id) else {
            return Ok(());
        };
        match style {
            Some(style) => map.insert(KEY_TEXT_STYLE, style.as_str())?,
            None => delete_key(&map, KEY_TEXT_STYLE)?,
        }
        self.commit();
        Ok(())
    }

    /// Create or fully replace a palette.
    pub fn upsert_palette(&mut self, palette: &PaletteRecord) -> SceneResult<()> {
        let map = self
            .palettes_map()
            .insert_container(palette.id.as_str(), LoroMap::new())?;
        palette_to_loro(palette, &map)?;
        self.commit();
        Ok(())
    }

    /// Delete a palette. If it was active, the document reverts to having
    /// no active palette and slot references stop resolving.
    pub fn delete_palette(&mut self, id: &PaletteId) -> SceneResult<()> {
        let palettes = self.palettes_map();
        if palettes.get(id.as_str()).is_none() {
            return Ok(());
        }
        palettes.delete(id.as_str())?;
        if self.active_palette_id().as_ref() == Some(id) {
            self.clear_active_palette()?;
        }
        self.commit();
        Ok(())
    }

    /// Switch the document's active palette. The id is written as given;
    /// a palette arriving later from another peer makes it resolve.
    pub fn set_active_palette(&mut self, id: Option<&PaletteId>) -> SceneResult<()> {
        match id {
            Some(id) => self.write_active_palette(id)?,
            None => self.clear_active_palette()?,
        }
        self.commit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ObjectType, Paint, ShapeStyleFields, DEFAULT_FILL,
    };
    use crate::styles::resolve_shape_style;

    #[test]
    fn test_upsert_style_replaces_whole_record() {
        let mut doc = SceneDocument::new();
        let id = StyleId::generate();
        let style = StyleRecord::shape(
            id.clone(),
            "Card",
            ShapeStyleFields {
                fill: Some(Paint::color("#112233")),
                stroke_width: Some(2.0),
                ..Default::default()
            },
        );
        doc.upsert_style(&style).unwrap();

        let thinner = StyleRecord::shape(
            id.clone(),
            "Card",
            ShapeStyleFields {
                stroke_width: Some(1.0),
                ..Default::default()
            },
        );
        doc.upsert_style(&thinner).unwrap();

        let stored = doc.style(&id).unwrap();
        assert_eq!(stored.shape_fields().and_then(|f| f.fill.clone()), None);
        assert_eq!(stored.shape_fields().and_then(|f| f.stroke_width), Some(1.0));
    }

    #[test]
    fn test_delete_style_falls_back_to_defaults() {
        let mut doc = SceneDocument::new();
        let id = StyleId::generate();
        let style = StyleRecord::shape(
            id.clone(),
            "Accent",
            ShapeStyleFields {
                fill: Some(Paint::color("#ff0000")),
                ..Default::default()
            },
        );
        doc.upsert_style(&style).unwrap();
        let object = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        doc.set_object_shape_style(&object, Some(&id)).unwrap();
        assert_eq!(
            resolve_shape_style(&doc, &object).fill,
            "#ff0000".to_string()
        );

        doc.delete_style(&id).unwrap();
        assert_eq!(resolve_shape_style(&doc, &object).fill, DEFAULT_FILL);
    }

    #[test]
    fn test_set_object_style_reference_round_trip() {
        let mut doc = SceneDocument::new();
        let style = StyleId::generate();
        let object = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();
        doc.set_object_shape_style(&object, Some(&style)).unwrap();
        assert_eq!(doc.object(&object).unwrap().shape_style, Some(style.clone()));
        doc.set_object_shape_style(&object, None).unwrap();
        assert_eq!(doc.object(&object).unwrap().shape_style, None);
    }

    #[test]
    fn test_delete_palette_clears_active() {
        let mut doc = SceneDocument::new();
        let palette = PaletteRecord::new(PaletteId::generate(), "Brand");
        doc.upsert_palette(&palette).unwrap();
        doc.set_active_palette(Some(&palette.id)).unwrap();
        assert_eq!(doc.active_palette_id(), Some(palette.id.clone()));

        doc.delete_palette(&palette.id).unwrap();
        assert_eq!(doc.active_palette_id(), None);
        assert!(doc.palette(&palette.id).is_none());
    }

    #[test]
    fn test_set_active_palette_accepts_unseen_id() {
        let mut doc = SceneDocument::new();
        let ghost = PaletteId::generate();
        doc.set_active_palette(Some(&ghost)).unwrap();
        assert_eq!(doc.active_palette_id(), Some(ghost));
        assert!(crate::styles::active_palette(&doc).is_none());
    }
}
