//! View lifecycle, presentation order, and page backgrounds.

use kurbo::{Point, Rect};
use loro::LoroMap;

use crate::crdt::{
    clear_background, clear_override_flags, delete_key, view_to_loro, write_background,
    write_background_overrides, SceneDocument, KEY_HEIGHT, KEY_HIDDEN, KEY_NAME, KEY_TRANSITION,
    KEY_TRANSITION_MS, KEY_WIDTH, KEY_X, KEY_Y,
};
use crate::error::SceneResult;
use crate::id::ViewId;
use crate::model::{Background, BackgroundOverrides, Transition, ViewRecord};

use super::{string_index, VIEW_GUTTER};

impl SceneDocument {
    /// Create a view and append it to the presentation order. Without an
    /// explicit rectangle the view lands below the previous one on the
    /// canvas, at the default size.
    pub fn create_view(&mut self, name: &str, rect: Option<Rect>) -> SceneResult<ViewId> {
        let id = ViewId::generate();
        let mut view = ViewRecord::new(id.clone(), name);
        match rect {
            Some(rect) => {
                view.position = rect.origin();
                view.size = rect.size();
            }
            None => {
                if let Some(last) = self.view_order().last().and_then(|last| self.view(last)) {
                    view.position = Point::new(
                        last.position.x,
                        last.position.y + last.size.height + VIEW_GUTTER,
                    );
                }
            }
        }
        let map = self
            .views_map()
            .insert_container(id.as_str(), LoroMap::new())?;
        view_to_loro(&view, &map)?;
        self.view_order_list().push(id.as_str())?;
        self.commit();
        Ok(id)
    }

    pub fn rename_view(&mut self, id: &ViewId, name: &str) -> SceneResult<()> {
        let Some(map) = self.view_map(id) else {
            return Ok(());
        };
        map.insert(KEY_NAME, name)?;
        self.commit();
        Ok(())
    }

    /// Move or resize the view on the canvas. Associated objects store
    /// view-relative positions, so the page content travels with it.
    pub fn set_view_rect(&mut self, id: &ViewId, rect: Rect) -> SceneResult<()> {
        let Some(map) = self.view_map(id) else {
            return Ok(());
        };
        map.insert(KEY_X, rect.x0)?;
        map.insert(KEY_Y, rect.y0)?;
        map.insert(KEY_WIDTH, rect.width())?;
        map.insert(KEY_HEIGHT, rect.height())?;
        self.commit();
        Ok(())
    }

    /// Skip or include the view when presenting. Hidden views keep their
    /// place in the order.
    pub fn set_view_hidden(&mut self, id: &ViewId, hidden: bool) -> SceneResult<()> {
        let Some(map) = self.view_map(id) else {
            return Ok(());
        };
        if hidden {
            map.insert(KEY_HIDDEN, true)?;
        } else {
            delete_key(&map, KEY_HIDDEN)?;
        }
        self.commit();
        Ok(())
    }

    pub fn set_view_transition(&mut self, id: &ViewId, transition: Transition) -> SceneResult<()> {
        let Some(map) = self.view_map(id) else {
            return Ok(());
        };
        map.insert(KEY_TRANSITION, transition.kind.tag())?;
        map.insert(KEY_TRANSITION_MS, i64::from(transition.duration_ms))?;
        self.commit();
        Ok(())
    }

    /// Replace the view's own background. With a template attached, the
    /// override flags are set for exactly the fields present here, so the
    /// template keeps supplying the rest.
    pub fn set_view_background(&mut self, id: &ViewId, background: &Background) -> SceneResult<()> {
        let Some(record) = self.view(id) else {
            return Ok(());
        };
        let Some(map) = self.view_map(id) else {
            return Ok(());
        };
        clear_background(&map)?;
        write_background(background, &map)?;
        if record.template.is_some() {
            let flags = BackgroundOverrides {
                color: background.color.is_some(),
                gradient: background.gradient.is_some(),
                image: background.image.is_some(),
                fit: background.fit.is_some(),
            };
            write_background_overrides(flags, &map)?;
        } else {
            clear_override_flags(&map)?;
        }
        self.commit();
        Ok(())
    }

    /// Move the view to an index in the presentation order, clamped to the
    /// end. Returns whether anything changed.
    pub fn reorder_view(&mut self, id: &ViewId, index: usize) -> SceneResult<bool> {
        let list = self.view_order_list();
        let Some(current) = string_index(&list, id.as_str()) else {
            return Ok(false);
        };
        let target = index.min(list.len() - 1);
        if target == current {
            return Ok(false);
        }
        list.delete(current, 1)?;
        if target < list.len() {
            list.insert(target, id.as_str())?;
        } else {
            list.push(id.as_str())?;
        }
        self.commit();
        Ok(true)
    }

    /// Delete a view. Template instances placed on it go with it; other
    /// associated objects keep their association and fall back to local
    /// coordinates.
    pub fn delete_view(&mut self, id: &ViewId) -> SceneResult<()> {
        if self.view_map(id).is_none() {
            return Ok(());
        }
        for record in self.all_objects() {
            if record.view.as_ref() == Some(id) && record.ancestry.is_instance() {
                self.remove_object_entry(&record)?;
            }
        }
        let list = self.view_order_list();
        if let Some(index) = string_index(&list, id.as_str()) {
            list.delete(index, 1)?;
        }
        self.views_map().delete(id.as_str())?;
        self.commit();
        Ok(())
    }
}
