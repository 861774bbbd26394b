//! Container lifecycle and reparenting.

use std::collections::HashSet;

use loro::LoroMap;

use crate::crdt::{
    container_to_loro, insert_ref, remove_ref, write_container_patch, SceneDocument,
};
use crate::error::SceneResult;
use crate::id::ContainerId;
use crate::model::{ChildRef, ContainerPatch, ContainerRecord, Scope};
use crate::transform::container_parents;

impl SceneDocument {
    /// Create an empty container. A dangling parent falls back to the
    /// root scope.
    pub fn create_container(
        &mut self,
        parent: Option<&ContainerId>,
        index: Option<usize>,
    ) -> SceneResult<ContainerId> {
        let record = ContainerRecord::new(ContainerId::generate());
        let map = self
            .containers_map()
            .insert_container(record.id.as_str(), LoroMap::new())?;
        container_to_loro(&record, &map)?;
        let scope = parent
            .filter(|parent| self.container_map(parent).is_some())
            .map(|parent| Scope::Container(parent.clone()))
            .unwrap_or(Scope::Root);
        insert_ref(
            &self.scope_list(&scope),
            index,
            &ChildRef::Container(record.id.clone()),
        )?;
        self.commit();
        Ok(record.id)
    }

    /// Apply a partial update; only present fields are written.
    pub fn update_container(&mut self, id: &ContainerId, patch: &ContainerPatch) -> SceneResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let Some(map) = self.container_map(id) else {
            return Ok(());
        };
        write_container_patch(patch, &map)?;
        self.commit();
        Ok(())
    }

    /// Every container reachable below this one through child references.
    fn container_descendants(&self, id: &ContainerId) -> HashSet<ContainerId> {
        let mut out = HashSet::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            for child in self.children_refs(&current) {
                if let ChildRef::Container(child) = child {
                    if out.insert(child.clone()) {
                        stack.push(child);
                    }
                }
            }
        }
        out
    }

    /// Reparent a container. Refuses a move into itself or one of its own
    /// descendants; returns whether the move happened. Moving within the
    /// same parent reorders it among its siblings.
    pub fn move_container(
        &mut self,
        id: &ContainerId,
        new_parent: Option<&ContainerId>,
        index: Option<usize>,
    ) -> SceneResult<bool> {
        if self.container_map(id).is_none() {
            return Ok(false);
        }
        if let Some(target) = new_parent {
            if target == id || self.container_descendants(id).contains(target) {
                return Ok(false);
            }
        }
        let target = new_parent.filter(|parent| self.container_map(parent).is_some());
        let parents = container_parents(self);
        let old_scope = parents
            .get(id)
            .map(|parent| Scope::Container(parent.clone()))
            .unwrap_or(Scope::Root);
        let child = ChildRef::Container(id.clone());
        remove_ref(&self.scope_list(&old_scope), &child)?;
        let new_scope = target
            .map(|parent| Scope::Container(parent.clone()))
            .unwrap_or(Scope::Root);
        insert_ref(&self.scope_list(&new_scope), index, &child)?;
        self.commit();
        Ok(true)
    }

    /// Delete a container and everything below it: nested containers and
    /// all objects in the subtree.
    pub fn delete_container(&mut self, id: &ContainerId) -> SceneResult<()> {
        if self.container_map(id).is_none() {
            return Ok(());
        }
        let mut containers = vec![id.clone()];
        let mut objects = Vec::new();
        let mut i = 0;
        while i < containers.len() {
            for child in self.children_refs(&containers[i]) {
                match child {
                    ChildRef::Object(object) => objects.push(object),
                    ChildRef::Container(container) => {
                        if !containers.contains(&container) {
                            containers.push(container);
                        }
                    }
                }
            }
            i += 1;
        }

        for object in &objects {
            if let Some(record) = self.object(object) {
                self.remove_object_entry(&record)?;
            }
        }

        let parents = container_parents(self);
        let scope = parents
            .get(id)
            .map(|parent| Scope::Container(parent.clone()))
            .unwrap_or(Scope::Root);
        remove_ref(&self.scope_list(&scope), &ChildRef::Container(id.clone()))?;

        for container in &containers {
            let children = self.children_list(container);
            let len = children.len();
            if len > 0 {
                children.delete(0, len)?;
            }
            self.containers_map().delete(container.as_str())?;
        }
        self.commit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectType;

    #[test]
    fn test_move_container_refuses_cycle() {
        let mut doc = SceneDocument::new();
        let outer = doc.create_container(None, None).unwrap();
        let inner = doc.create_container(Some(&outer), None).unwrap();

        assert!(!doc.move_container(&outer, Some(&inner), None).unwrap());
        assert!(!doc.move_container(&outer, Some(&outer), None).unwrap());
        // the tree is untouched
        assert_eq!(doc.root_refs(), vec![ChildRef::Container(outer.clone())]);
        assert_eq!(doc.children_refs(&outer), vec![ChildRef::Container(inner)]);
    }

    #[test]
    fn test_move_container_reparents() {
        let mut doc = SceneDocument::new();
        let a = doc.create_container(None, None).unwrap();
        let b = doc.create_container(None, None).unwrap();

        assert!(doc.move_container(&b, Some(&a), None).unwrap());
        assert_eq!(doc.root_refs(), vec![ChildRef::Container(a.clone())]);
        assert_eq!(doc.children_refs(&a), vec![ChildRef::Container(b.clone())]);

        assert!(doc.move_container(&b, None, None).unwrap());
        assert!(doc.children_refs(&a).is_empty());
    }

    #[test]
    fn test_move_container_reorders_siblings() {
        let mut doc = SceneDocument::new();
        let a = doc.create_container(None, None).unwrap();
        let b = doc.create_container(None, None).unwrap();

        assert!(doc.move_container(&b, None, Some(0)).unwrap());
        assert_eq!(
            doc.root_refs(),
            vec![ChildRef::Container(b), ChildRef::Container(a)]
        );
    }

    #[test]
    fn test_delete_container_removes_subtree() {
        let mut doc = SceneDocument::new();
        let outer = doc.create_container(None, None).unwrap();
        let inner = doc.create_container(Some(&outer), None).unwrap();
        let nested = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, Some(&inner), None, None)
            .unwrap();
        let sibling = doc
            .create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, None, None, None)
            .unwrap();

        doc.delete_container(&outer).unwrap();
        assert!(doc.container(&outer).is_none());
        assert!(doc.container(&inner).is_none());
        assert!(doc.object(&nested).is_none());
        assert!(doc.object(&sibling).is_some());
        assert_eq!(doc.root_refs(), vec![ChildRef::Object(sibling)]);
    }

    #[test]
    fn test_delete_container_is_one_undo_step() {
        let mut doc = SceneDocument::new();
        let group = doc.create_container(None, None).unwrap();
        doc.create_object(ObjectType::Rect, 0.0, 0.0, 10.0, 10.0, Some(&group), None, None)
            .unwrap();
        doc.clear_undo_history();

        doc.delete_container(&group).unwrap();
        assert_eq!(doc.object_count(), 0);
        assert!(doc.undo());
        assert_eq!(doc.object_count(), 1);
        assert!(doc.container(&group).is_some());
        assert!(!doc.can_undo());
    }
}
