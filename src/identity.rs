//! Bidirectional entity ↔ identity mapping.
//!
//! Every live entity is registered here at creation and unregistered at
//! destruction, so serialized [`Guid`] references can be resolved back to
//! whatever runtime handle currently embodies that identity. The two maps are
//! exact inverses of each other at all times.
//!
//! Lookup misses log an error and return `None` instead of panicking:
//! hierarchy-link resolution runs on every instantiation and propagation and
//! one dangling reference must not abort the surrounding operation.

use std::collections::HashMap;

use crate::entity::Entity;
use crate::guid::Guid;

/// Two-way map between runtime entity handles and stable identities.
#[derive(Default)]
pub struct IdentityRegistry {
    entity_to_guid: HashMap<Entity, Guid>,
    guid_to_entity: HashMap<Guid, Entity>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity under the given identity.
    ///
    /// Re-registering either side replaces the old pairing; the stale inverse
    /// entries are removed so the maps stay exact inverses.
    pub fn register(&mut self, entity: Entity, guid: Guid) {
        if let Some(old_guid) = self.entity_to_guid.insert(entity, guid) {
            self.guid_to_entity.remove(&old_guid);
        }
        if let Some(old_entity) = self.guid_to_entity.insert(guid, entity) {
            if old_entity != entity {
                self.entity_to_guid.remove(&old_entity);
            }
        }
    }

    /// Removes the registration for an entity, if any.
    pub fn unregister(&mut self, entity: Entity) {
        if let Some(guid) = self.entity_to_guid.remove(&entity) {
            self.guid_to_entity.remove(&guid);
        }
    }

    /// Resolves an identity to the live entity carrying it.
    pub fn entity(&self, guid: Guid) -> Option<Entity> {
        let found = self.guid_to_entity.get(&guid).copied();
        if found.is_none() {
            log::error!("identity {guid} not found in registry");
        }
        found
    }

    /// Resolves an entity to its stable identity.
    pub fn guid(&self, entity: Entity) -> Option<Guid> {
        let found = self.entity_to_guid.get(&entity).copied();
        if found.is_none() {
            log::error!("{entity} not found in identity registry");
        }
        found
    }

    /// Like [`entity`](Self::entity) but silent on a miss (for probes where
    /// absence is an expected answer, not an error).
    pub fn try_entity(&self, guid: Guid) -> Option<Entity> {
        self.guid_to_entity.get(&guid).copied()
    }

    /// Number of registered pairings.
    pub fn len(&self) -> usize {
        self.entity_to_guid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_to_guid.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup_both_ways() {
        let mut registry = IdentityRegistry::new();
        let entity = Entity::new(0, 0);
        let guid = Guid::generate();

        registry.register(entity, guid);
        assert_eq!(registry.entity(guid), Some(entity));
        assert_eq!(registry.guid(entity), Some(guid));
    }

    #[test]
    fn unregister_removes_both_directions() {
        let mut registry = IdentityRegistry::new();
        let entity = Entity::new(0, 0);
        let guid = Guid::generate();

        registry.register(entity, guid);
        registry.unregister(entity);
        assert_eq!(registry.entity(guid), None);
        assert_eq!(registry.guid(entity), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn miss_returns_none() {
        let registry = IdentityRegistry::new();
        assert_eq!(registry.entity(Guid::generate()), None);
        assert_eq!(registry.guid(Entity::new(7, 0)), None);
    }

    #[test]
    fn reregister_keeps_maps_inverse() {
        let mut registry = IdentityRegistry::new();
        let e0 = Entity::new(0, 0);
        let e1 = Entity::new(1, 0);
        let g0 = Guid::generate();
        let g1 = Guid::generate();

        registry.register(e0, g0);
        // Same entity gets a new identity: g0 must no longer resolve
        registry.register(e0, g1);
        assert_eq!(registry.try_entity(g0), None);
        assert_eq!(registry.entity(g1), Some(e0));
        assert_eq!(registry.len(), 1);

        // Another entity takes over g1: e0 must no longer resolve
        registry.register(e1, g1);
        assert_eq!(registry.guid(e0), None);
        assert_eq!(registry.entity(g1), Some(e1));
        assert_eq!(registry.len(), 1);
    }
}
