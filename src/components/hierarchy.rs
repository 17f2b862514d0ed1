//! Hierarchy-link components and tree operations.
//!
//! Parent/child wiring is stored as [`Guid`]s, not runtime handles, so a
//! saved subtree can be recreated with fresh entities and only the identity
//! remap changes. Both components opt out of template propagation: their
//! values are per-instance wiring, and a template's copy would reference the
//! template's own identities.
//!
//! The free functions keep the two directions consistent; use them instead
//! of editing the components directly.

use crate::component::Component;
use crate::guid::Guid;
use crate::world::World;
use crate::Entity;

/// Marks an entity as the child of another entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parent {
    pub parent: Guid,
}

crate::reflect_struct! {
    Parent {
        parent: Guid,
    }
}

impl Component for Parent {
    const NAME: &'static str = "Parent";
    const PROPAGATES: bool = false;

    fn remap_identities(&mut self, map: &mut dyn FnMut(Guid) -> Guid) {
        self.parent = map(self.parent);
    }
}

/// Ordered list of child entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children {
    pub children: Vec<Guid>,
}

impl Children {
    pub fn iter(&self) -> impl Iterator<Item = &Guid> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

crate::reflect_struct! {
    Children {
        children: Vec<Guid>,
    }
}

impl Component for Children {
    const NAME: &'static str = "Children";
    const PROPAGATES: bool = false;

    fn remap_identities(&mut self, map: &mut dyn FnMut(Guid) -> Guid) {
        for child in &mut self.children {
            *child = map(*child);
        }
    }
}

/// Makes `entity` a child of `parent`, updating both link directions.
///
/// # Panics
///
/// Panics if `entity == parent`.
pub fn set_parent(world: &mut World, entity: Entity, parent: Entity) {
    assert_ne!(entity, parent, "cannot parent {entity} to itself");

    let Some(parent_guid) = world.guid_of(parent) else {
        return;
    };
    let Some(entity_guid) = world.guid_of(entity) else {
        return;
    };

    // Detach from the old parent first
    if let Some(old_guid) = world.get::<Parent>(entity).map(|p| p.parent) {
        if old_guid == parent_guid {
            return;
        }
        if let Some(old_parent) = world.identities().try_entity(old_guid) {
            if let Some(children) = world.get_mut::<Children>(old_parent) {
                children.children.retain(|&g| g != entity_guid);
            }
        }
    }

    world.insert(entity, Parent { parent: parent_guid });

    if let Some(children) = world.get_mut::<Children>(parent) {
        if !children.children.contains(&entity_guid) {
            children.children.push(entity_guid);
        }
    } else {
        world.insert(
            parent,
            Children {
                children: vec![entity_guid],
            },
        );
    }
}

/// Removes the parent link from `entity` and the back-link from its parent.
pub fn remove_parent(world: &mut World, entity: Entity) {
    let Some(parent_comp) = world.remove::<Parent>(entity) else {
        return;
    };
    let Some(entity_guid) = world.guid_of(entity) else {
        return;
    };
    if let Some(parent) = world.identities().try_entity(parent_comp.parent) {
        if let Some(children) = world.get_mut::<Children>(parent) {
            children.children.retain(|&g| g != entity_guid);
        }
    }
}

/// Despawns an entity and all its descendants.
///
/// The entity is first unhooked from its parent's child list, then the
/// subtree is destroyed depth-first.
pub fn despawn_recursive(world: &mut World, entity: Entity) {
    remove_parent(world, entity);
    despawn_subtree(world, entity);
}

fn despawn_subtree(world: &mut World, entity: Entity) {
    let child_guids = world
        .remove::<Children>(entity)
        .map(|c| c.children)
        .unwrap_or_default();

    for guid in child_guids {
        if let Some(child) = world.identities().try_entity(guid) {
            despawn_subtree(world, child);
        }
    }

    world.despawn(entity);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parent_links_both_directions() {
        let mut world = World::new();
        let parent = world.spawn();
        let child = world.spawn();
        set_parent(&mut world, child, parent);

        let child_guid = world.guid_of(child).unwrap();
        let parent_guid = world.guid_of(parent).unwrap();
        assert_eq!(world.get::<Parent>(child).unwrap().parent, parent_guid);
        assert_eq!(
            world.get::<Children>(parent).unwrap().children,
            vec![child_guid]
        );
    }

    #[test]
    fn reparent_moves_child() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        let child = world.spawn();
        set_parent(&mut world, child, a);
        set_parent(&mut world, child, b);

        assert!(world.get::<Children>(a).unwrap().is_empty());
        assert_eq!(world.get::<Children>(b).unwrap().len(), 1);
        assert_eq!(
            world.get::<Parent>(child).unwrap().parent,
            world.guid_of(b).unwrap()
        );
    }

    #[test]
    fn remove_parent_unhooks_both_sides() {
        let mut world = World::new();
        let parent = world.spawn();
        let child = world.spawn();
        set_parent(&mut world, child, parent);
        remove_parent(&mut world, child);

        assert!(!world.has::<Parent>(child));
        assert!(world.get::<Children>(parent).unwrap().is_empty());
    }

    #[test]
    fn despawn_recursive_takes_whole_subtree() {
        let mut world = World::new();
        let root = world.spawn();
        let mid = world.spawn();
        let leaf = world.spawn();
        set_parent(&mut world, mid, root);
        set_parent(&mut world, leaf, mid);

        despawn_recursive(&mut world, mid);
        assert!(world.is_alive(root));
        assert!(!world.is_alive(mid));
        assert!(!world.is_alive(leaf));
        assert!(world.get::<Children>(root).unwrap().is_empty());
    }

    #[test]
    #[should_panic]
    fn self_parent_panics() {
        let mut world = World::new();
        let entity = world.spawn();
        set_parent(&mut world, entity, entity);
    }
}
