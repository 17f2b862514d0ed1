//! The entity-component store.
//!
//! [`World`] owns the entity allocator, one storage per component type, the
//! name-keyed component vtable registry, and the [`IdentityRegistry`]. Every
//! entity is paired with a stable identity at spawn and unpaired at despawn,
//! so the registry's two maps stay exact inverses of the live population.
//!
//! This is the collaborator surface the template engines are written
//! against: `spawn` / `spawn_with_identity` / `despawn`, typed
//! `insert` / `get` / `get_mut` / `has` / `remove`, and the dynamic by-name
//! paths through [`ComponentVTable`]s.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::component::{ApplyContext, Component, ComponentVTable};
use crate::entity::{Entity, EntityAllocator};
use crate::guid::Guid;
use crate::identity::IdentityRegistry;
use crate::serialize::DeserializeError;

trait ComponentStorage: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn remove_entity(&mut self, entity: Entity);
}

struct Storage<T> {
    items: HashMap<Entity, T>,
}

impl<T> Storage<T> {
    fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }
}

impl<T: Send + Sync + 'static> ComponentStorage for Storage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove_entity(&mut self, entity: Entity) {
        self.items.remove(&entity);
    }
}

/// Central container for entities, components, and identities.
#[derive(Default)]
pub struct World {
    entities: EntityAllocator,
    storages: HashMap<TypeId, Box<dyn ComponentStorage>>,
    vtables: Vec<ComponentVTable>,
    vtable_index: HashMap<&'static str, usize>,
    identities: IdentityRegistry,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // --- entities ----------------------------------------------------------

    /// Spawns a new entity with a freshly minted identity.
    pub fn spawn(&mut self) -> Entity {
        self.spawn_with_identity(Guid::generate())
    }

    /// Spawns a new entity registered under the given identity.
    pub fn spawn_with_identity(&mut self, guid: Guid) -> Entity {
        let entity = self.entities.allocate();
        self.identities.register(entity, guid);
        entity
    }

    /// Despawns an entity, dropping its components and identity pairing.
    ///
    /// Returns `false` for dead or stale handles.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        self.identities.unregister(entity);
        self.entities.deallocate(entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> u32 {
        self.entities.count()
    }

    /// Iterates over all live entities.
    pub fn iter_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_alive()
    }

    // --- identities --------------------------------------------------------

    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    /// Stable identity of a live entity.
    pub fn guid_of(&self, entity: Entity) -> Option<Guid> {
        self.identities.guid(entity)
    }

    /// Live entity carrying the given identity.
    pub fn entity_by_identity(&self, guid: Guid) -> Option<Entity> {
        self.identities.entity(guid)
    }

    // --- typed component access --------------------------------------------

    /// Registers a component type for the dynamic by-name paths.
    ///
    /// Typed access works without registration; template instantiation,
    /// propagation, and saving only see registered types.
    pub fn register_component<T: Component>(&mut self) {
        if self.vtable_index.contains_key(T::NAME) {
            return;
        }
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Storage::<T>::new()));
        let vtable = ComponentVTable::of::<T>();
        self.vtable_index.insert(vtable.name, self.vtables.len());
        self.vtables.push(vtable);
    }

    /// Attaches a component, replacing any existing value of that type.
    ///
    /// Inserting on a dead entity is logged and ignored.
    pub fn insert<T: Send + Sync + 'static>(&mut self, entity: Entity, value: T) {
        if !self.entities.is_alive(entity) {
            log::warn!("insert on dead {entity} ignored");
            return;
        }
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Storage::<T>::new()));
        let storage = storage
            .as_any_mut()
            .downcast_mut::<Storage<T>>()
            .unwrap_or_else(|| panic!("storage type confusion for {}", std::any::type_name::<T>()));
        storage.items.insert(entity, value);
    }

    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        self.storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<Storage<T>>()?
            .items
            .get(&entity)
    }

    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Storage<T>>()?
            .items
            .get_mut(&entity)
    }

    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Detaches and returns a component, if present.
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Storage<T>>()?
            .items
            .remove(&entity)
    }

    // --- dynamic (by-name) access ------------------------------------------

    /// Looks up the vtable registered under a component type name.
    pub fn vtable_by_name(&self, name: &str) -> Option<&ComponentVTable> {
        self.vtable_index
            .get(name)
            .map(|&index| &self.vtables[index])
    }

    /// All registered vtables, in registration order.
    pub fn vtables(&self) -> &[ComponentVTable] {
        &self.vtables
    }

    /// Deserializes and attaches a component by type name.
    ///
    /// Used by the scripting bridge and the template engines; honors the
    /// context's remap table, override flags, and asset-resolution request.
    pub fn apply_component_by_name(
        &mut self,
        name: &str,
        entity: Entity,
        doc: &serde_json::Value,
        ctx: &ApplyContext<'_>,
    ) -> Result<(), DeserializeError> {
        let vtable = *self
            .vtable_by_name(name)
            .ok_or_else(|| DeserializeError::UnknownComponent {
                type_name: name.to_owned(),
            })?;
        (vtable.apply)(self, entity, doc, ctx)
    }

    /// Serializes a component by type name, if the entity carries it.
    pub fn save_component_by_name(&self, name: &str, entity: Entity) -> Option<serde_json::Value> {
        let vtable = self.vtable_by_name(name)?;
        (vtable.save)(self, entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Name;

    #[test]
    fn spawn_registers_identity() {
        let mut world = World::new();
        let entity = world.spawn();
        let guid = world.guid_of(entity).unwrap();
        assert!(!guid.is_nil());
        assert_eq!(world.entity_by_identity(guid), Some(entity));
    }

    #[test]
    fn despawn_unregisters_identity_and_components() {
        let mut world = World::new();
        let entity = world.spawn();
        let guid = world.guid_of(entity).unwrap();
        world.insert(entity, Name::new("doomed"));

        assert!(world.despawn(entity));
        assert_eq!(world.identities().try_entity(guid), None);
        assert!(!world.has::<Name>(entity));
        assert!(!world.despawn(entity));
    }

    #[test]
    fn insert_get_remove() {
        let mut world = World::new();
        let entity = world.spawn();
        world.insert(entity, Name::new("thing"));
        assert_eq!(world.get::<Name>(entity).unwrap().value, "thing");

        world.get_mut::<Name>(entity).unwrap().value = "renamed".to_owned();
        assert_eq!(world.get::<Name>(entity).unwrap().value, "renamed");

        let removed = world.remove::<Name>(entity).unwrap();
        assert_eq!(removed.value, "renamed");
        assert!(!world.has::<Name>(entity));
    }

    #[test]
    fn insert_replaces_existing() {
        let mut world = World::new();
        let entity = world.spawn();
        world.insert(entity, Name::new("first"));
        world.insert(entity, Name::new("second"));
        assert_eq!(world.get::<Name>(entity).unwrap().value, "second");
    }

    #[test]
    fn insert_on_dead_entity_ignored() {
        let mut world = World::new();
        let entity = world.spawn();
        world.despawn(entity);
        world.insert(entity, Name::new("ghost"));
        assert!(!world.has::<Name>(entity));
    }

    #[test]
    fn stale_handle_does_not_reach_recycled_slot() {
        let mut world = World::new();
        let old = world.spawn();
        world.insert(old, Name::new("old"));
        world.despawn(old);

        let new = world.spawn();
        assert_eq!(new.index(), old.index());
        assert!(world.get::<Name>(old).is_none());
        assert!(world.get::<Name>(new).is_none());
    }

    #[test]
    fn vtable_lookup_by_name() {
        let mut world = World::new();
        world.register_component::<Name>();
        assert!(world.vtable_by_name("Name").is_some());
        assert!(world.vtable_by_name("NoSuch").is_none());
        assert_eq!(world.vtables().len(), 1);

        // Re-registration is a no-op
        world.register_component::<Name>();
        assert_eq!(world.vtables().len(), 1);
    }

    #[test]
    fn save_and_apply_by_name() {
        let mut world = World::new();
        world.register_component::<Name>();
        let entity = world.spawn();
        world.insert(entity, Name::new("Box"));

        let doc = world.save_component_by_name("Name", entity).unwrap();

        let target = world.spawn();
        let remap = std::collections::HashMap::new();
        let ctx = ApplyContext::instantiate(&remap, false, None);
        world
            .apply_component_by_name("Name", target, &doc, &ctx)
            .unwrap();
        assert_eq!(world.get::<Name>(target).unwrap().value, "Box");

        let err = world
            .apply_component_by_name("Unknown", target, &doc, &ctx)
            .unwrap_err();
        assert!(matches!(err, DeserializeError::UnknownComponent { .. }));
    }
}
