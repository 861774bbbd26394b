//! Templates, prototypes, and per-view instances.
//!
//! A template tracks an ordered set of prototype objects. Applying a
//! template to a view synthesizes one instance per prototype: a sparse
//! object that stores nothing of its own and follows the prototype through
//! resolution. Instances are presentation furniture, they are hidden
//! rather than deleted and die with their view.

use std::collections::HashSet;

use kurbo::Point;
use loro::LoroMap;

use crate::crdt::{
    clear_background, clear_override_flags, delete_key, template_to_loro, write_background,
    write_guides, write_kind_fields, write_shape_fields, write_text_fields, SceneDocument,
    KEY_HEIGHT, KEY_HIDDEN, KEY_LOCKED, KEY_NAME, KEY_OPACITY, KEY_PIVOT_X, KEY_PIVOT_Y,
    KEY_PROTO, KEY_ROTATION, KEY_SHAPE_STYLE, KEY_TEMPLATE, KEY_TEXT_STYLE, KEY_VIEW,
    KEY_VISIBLE, KEY_WIDTH, KEY_X, KEY_Y,
};
use crate::error::{SceneError, SceneResult};
use crate::id::{ObjectId, TemplateId, TextId, ViewId};
use crate::model::{
    Ancestry, Background, ObjectKind, ObjectRecord, SnapGuide, TemplateRecord,
};
use crate::resolve::resolve_object;

use super::{string_index, InstancePolicy};

impl SceneDocument {
    pub fn create_template(&mut self, name: &str) -> SceneResult<TemplateId> {
        let record = TemplateRecord::new(TemplateId::generate(), name);
        let map = self
            .templates_map()
            .insert_container(record.id.as_str(), LoroMap::new())?;
        template_to_loro(&record, &map)?;
        self.commit();
        Ok(record.id)
    }

    pub fn rename_template(&mut self, id: &TemplateId, name: &str) -> SceneResult<()> {
        let Some(map) = self.template_map(id) else {
            return Ok(());
        };
        map.insert(KEY_NAME, name)?;
        self.commit();
        Ok(())
    }

    /// Replace the template background. Views on this template pick the
    /// change up through resolution; their own override flags still win.
    pub fn set_template_background(
        &mut self,
        id: &TemplateId,
        background: &Background,
    ) -> SceneResult<()> {
        let Some(map) = self.template_map(id) else {
            return Ok(());
        };
        clear_background(&map)?;
        write_background(background, &map)?;
        self.commit();
        Ok(())
    }

    pub fn set_template_guides(&mut self, id: &TemplateId, guides: &[SnapGuide]) -> SceneResult<()> {
        let Some(map) = self.template_map(id) else {
            return Ok(());
        };
        write_guides(guides, &map)?;
        self.commit();
        Ok(())
    }

    /// Track an object as a prototype of the template. The object loses
    /// its view association; prototypes live outside any page. Views
    /// already on this template receive an instance immediately.
    pub fn add_prototype(&mut self, template: &TemplateId, object: &ObjectId) -> SceneResult<()> {
        if self.template_map(template).is_none() {
            return Err(SceneError::TemplateNotFound(template.clone()));
        }
        let Some(record) = self.object(object) else {
            return Ok(());
        };
        if record.ancestry.is_instance() {
            return Err(SceneError::PrototypeFromInstance(object.clone()));
        }
        let list = self.protos_list(template);
        if string_index(&list, object.as_str()).is_none() {
            list.push(object.as_str())?;
        }
        if record.view.is_some() {
            if let Some(map) = self.object_map(object) {
                delete_key(&map, KEY_VIEW)?;
            }
        }
        for view in self.all_views() {
            if view.template.as_ref() == Some(template) {
                self.sync_template_instances(&view.id, template)?;
            }
        }
        self.commit();
        Ok(())
    }

    /// Attach a template to a view. The view's own background and override
    /// flags are reset so the template shows through, and one instance per
    /// prototype is synthesized. Re-applying the same template only fills
    /// in instances that are missing.
    pub fn apply_template(&mut self, view_id: &ViewId, template_id: &TemplateId) -> SceneResult<()> {
        let Some(view) = self.view(view_id) else {
            return Err(SceneError::ViewNotFound(view_id.clone()));
        };
        if self.template_map(template_id).is_none() {
            return Err(SceneError::TemplateNotFound(template_id.clone()));
        }
        if let Some(previous) = &view.template {
            if previous != template_id {
                self.remove_instances_on_view(view_id)?;
            }
        }
        let Some(map) = self.view_map(view_id) else {
            return Ok(());
        };
        map.insert(KEY_TEMPLATE, template_id.as_str())?;
        clear_background(&map)?;
        clear_override_flags(&map)?;
        self.sync_template_instances(view_id, template_id)?;
        self.commit();
        Ok(())
    }

    /// Detach the template from a view, with the instances either removed
    /// or kept as concrete page content.
    pub fn remove_template(&mut self, view_id: &ViewId, policy: InstancePolicy) -> SceneResult<()> {
        let Some(view) = self.view(view_id) else {
            return Ok(());
        };
        if view.template.is_none() {
            return Ok(());
        }
        match policy {
            InstancePolicy::Delete => self.remove_instances_on_view(view_id)?,
            InstancePolicy::Detach => self.detach_instances_on_view(view_id)?,
        }
        if let Some(map) = self.view_map(view_id) {
            delete_key(&map, KEY_TEMPLATE)?;
        }
        self.commit();
        Ok(())
    }

    /// Delete a template everywhere: detach it from its views with the
    /// given instance policy, stop tracking its prototypes, and with
    /// [`InstancePolicy::Delete`] remove the prototype objects too.
    pub fn delete_template(&mut self, id: &TemplateId, policy: InstancePolicy) -> SceneResult<()> {
        if self.template_map(id).is_none() {
            return Ok(());
        }
        for view in self.all_views() {
            if view.template.as_ref() == Some(id) {
                match policy {
                    InstancePolicy::Delete => self.remove_instances_on_view(&view.id)?,
                    InstancePolicy::Detach => self.detach_instances_on_view(&view.id)?,
                }
                if let Some(map) = self.view_map(&view.id) {
                    delete_key(&map, KEY_TEMPLATE)?;
                }
            }
        }
        let prototypes = self.template_prototypes(id);
        let list = self.protos_list(id);
        let len = list.len();
        if len > 0 {
            list.delete(0, len)?;
        }
        if policy == InstancePolicy::Delete {
            for proto in &prototypes {
                if let Some(record) = self.object(proto) {
                    self.remove_object_entry(&record)?;
                }
            }
        }
        self.templates_map().delete(id.as_str())?;
        self.commit();
        Ok(())
    }

    /// Delete a prototype object together with its tracking entry. Its
    /// instances are removed or detached per the policy, across every
    /// view.
    pub fn delete_prototype(&mut self, id: &ObjectId, policy: InstancePolicy) -> SceneResult<()> {
        let Some(record) = self.object(id) else {
            return Ok(());
        };
        let instances: Vec<ObjectRecord> = self
            .all_objects()
            .into_iter()
            .filter(|candidate| candidate.ancestry.prototype() == Some(id))
            .collect();
        for instance in &instances {
            match policy {
                InstancePolicy::Delete => self.remove_object_entry(instance)?,
                InstancePolicy::Detach => self.materialize_instance(instance)?,
            }
        }
        self.remove_object_entry(&record)?;
        self.commit();
        Ok(())
    }

    /// Hide or show the instance of one prototype on one view. This is the
    /// per-page escape hatch for unwanted template furniture.
    pub fn set_instance_hidden_on_view(
        &mut self,
        view: &ViewId,
        prototype: &ObjectId,
        hidden: bool,
    ) -> SceneResult<()> {
        let target = self.all_objects().into_iter().find(|record| {
            record.view.as_ref() == Some(view) && record.ancestry.prototype() == Some(prototype)
        });
        let Some(record) = target else {
            return Ok(());
        };
        let Some(map) = self.object_map(&record.id) else {
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

    /// One sparse instance per prototype the view does not have yet. Does
    /// not commit.
    fn sync_template_instances(&self, view: &ViewId, template: &TemplateId) -> SceneResult<()> {
        let existing: HashSet<ObjectId> = self
            .all_objects()
            .into_iter()
            .filter(|record| record.view.as_ref() == Some(view))
            .filter_map(|record| record.ancestry.prototype().cloned())
            .collect();
        for proto in self.template_prototypes(template) {
            if existing.contains(&proto) {
                continue;
            }
            let Some(source) = self.object(&proto) else {
                continue;
            };
            let mut record = ObjectRecord::new(
                ObjectId::generate(),
                ObjectKind::empty(source.object_type()),
            );
            record.ancestry = Ancestry::InstanceOf(proto);
            record.view = Some(view.clone());
            self.insert_object_entry(&record, None)?;
        }
        Ok(())
    }

    fn remove_instances_on_view(&self, view: &ViewId) -> SceneResult<()> {
        for record in self.all_objects() {
            if record.view.as_ref() == Some(view) && record.ancestry.is_instance() {
                self.remove_object_entry(&record)?;
            }
        }
        Ok(())
    }

    fn detach_instances_on_view(&self, view: &ViewId) -> SceneResult<()> {
        for record in self.all_objects() {
            if record.view.as_ref() == Some(view) && record.ancestry.is_instance() {
                self.materialize_instance(&record)?;
            }
        }
        Ok(())
    }

    /// Turn an instance into a concrete object: copy the resolved fields
    /// in, clone a shared text buffer, and cut the prototype link. Must
    /// run while the prototype still exists. Does not commit.
    pub(crate) fn materialize_instance(&self, record: &ObjectRecord) -> SceneResult<()> {
        let Some(resolved) = resolve_object(self, &record.id) else {
            // nothing inheritable to keep; just cut the link
            if let Some(map) = self.object_map(&record.id) {
                delete_key(&map, KEY_PROTO)?;
            }
            return Ok(());
        };
        let Some(map) = self.object_map(&record.id) else {
            return Ok(());
        };

        map.insert(KEY_X, resolved.x)?;
        map.insert(KEY_Y, resolved.y)?;
        map.insert(KEY_WIDTH, resolved.w)?;
        map.insert(KEY_HEIGHT, resolved.h)?;
        if resolved.rotation != 0.0 {
            map.insert(KEY_ROTATION, resolved.rotation)?;
        }
        if resolved.pivot != Point::new(0.5, 0.5) {
            map.insert(KEY_PIVOT_X, resolved.pivot.x)?;
            map.insert(KEY_PIVOT_Y, resolved.pivot.y)?;
        }
        if resolved.opacity != 1.0 {
            map.insert(KEY_OPACITY, resolved.opacity)?;
        }
        if !resolved.visible {
            map.insert(KEY_VISIBLE, false)?;
        }
        if resolved.locked {
            map.insert(KEY_LOCKED, true)?;
        }
        if let Some(name) = &resolved.name {
            map.insert(KEY_NAME, name.as_str())?;
        }
        if let Some(style) = &resolved.shape_style {
            map.insert(KEY_SHAPE_STYLE, style.as_str())?;
        }
        if let Some(style) = &resolved.text_style {
            map.insert(KEY_TEXT_STYLE, style.as_str())?;
        }

        let mut kind = resolved.kind.clone();
        if let ObjectKind::TextBox {
            buffer: Some(shared),
        } = &resolved.kind
        {
            let copy = TextId::generate();
            let content = self.text_content(shared);
            if !content.is_empty() {
                self.text_buffer(&copy).insert(0, &content)?;
            }
            kind = ObjectKind::TextBox { buffer: Some(copy) };
        }
        write_kind_fields(&kind, &map)?;
        write_shape_fields(&resolved.shape_overrides, &map)?;
        write_text_fields(&resolved.text_overrides, &map)?;

        delete_key(&map, KEY_PROTO)?;
        Ok(())
    }
}
