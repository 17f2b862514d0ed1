//! Reflected scene components.
//!
//! The [`Component`] trait marks a reflected type as attachable to entities
//! and carries three opt-in capabilities, each detected explicitly by the
//! engines rather than assumed for every type:
//!
//! - [`remap_identities`](Component::remap_identities) — hierarchy-link
//!   components rewrite their embedded [`Guid`]s through the instantiation
//!   remap table before being stored
//! - [`override_flag`](Component::override_flag) — types that opt in to
//!   per-instance override protection return `Some(flag)`; template
//!   propagation skips instances whose flag is set and always overwrites
//!   types that return `None`
//! - [`resolve_assets`](Component::resolve_assets) — invoked only when a
//!   caller explicitly requests asset resolution, so sandboxed edit sessions
//!   stay inert
//!
//! [`ComponentVTable`] is the type-erased face of a component type, used by
//! the name-keyed dynamic paths (template instantiation, propagation, the
//! scripting bridge).

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::entity::Entity;
use crate::guid::Guid;
use crate::reflect::{self, Reflect, Resolver};
use crate::serialize::{self, DeserializeError};
use crate::world::World;

/// Trait for reflected components.
///
/// Any `Reflect + Default + Clone` type qualifies; the capability methods
/// default to no-ops so plain data components need only a `NAME`.
pub trait Component: Reflect + Default + Clone {
    /// Registry name for dynamic lookup; the key under `"components"` in
    /// template documents.
    const NAME: &'static str;

    /// Whether template propagation may overwrite this component in place.
    ///
    /// False for hierarchy links and the prefab link: their stored values
    /// are per-instance wiring, and a template's copy would point at the
    /// template's own identities.
    const PROPAGATES: bool = true;

    /// Rewrites every entity identity stored in this component.
    ///
    /// The default implementation is a no-op (no identity references).
    fn remap_identities(&mut self, _map: &mut dyn FnMut(Guid) -> Guid) {}

    /// `Some(flag)` if this type opts in to override protection.
    fn override_flag(&self) -> Option<bool> {
        None
    }

    /// Resolves external asset references into runtime payloads.
    ///
    /// Called only when the surrounding operation asked for asset
    /// resolution. The default implementation is a no-op.
    fn resolve_assets(&mut self, _assets: &dyn AssetResolver) {}
}

/// External asset lookup, keyed by stable identity.
///
/// Consumed, never implemented, by this crate: the hosting application
/// provides it, and only call sites that explicitly pass one resolve
/// anything.
pub trait AssetResolver {
    fn load_by_identity(&self, guid: Guid) -> Option<Arc<Vec<u8>>>;
}

/// Context threaded through every component application.
///
/// Explicit parameter, not ambient state: instantiation passes the pass-1
/// remap table, propagation sets `from_update` so override flags are
/// honored.
pub struct ApplyContext<'a> {
    /// Old-identity → new-identity table from instantiation pass 1.
    pub remap: Option<&'a HashMap<Guid, Guid>>,
    /// True when re-applying a template to an existing instance.
    pub from_update: bool,
    pub resolve_assets: bool,
    pub assets: Option<&'a dyn AssetResolver>,
}

impl<'a> ApplyContext<'a> {
    /// Context for a fresh instantiation with the given remap table.
    pub(crate) fn instantiate(
        remap: &'a HashMap<Guid, Guid>,
        resolve_assets: bool,
        assets: Option<&'a dyn AssetResolver>,
    ) -> Self {
        Self {
            remap: Some(remap),
            from_update: false,
            resolve_assets,
            assets,
        }
    }

    /// Context for in-place template propagation.
    pub(crate) fn update(resolve_assets: bool, assets: Option<&'a dyn AssetResolver>) -> Self {
        Self {
            remap: None,
            from_update: true,
            resolve_assets,
            assets,
        }
    }
}

/// Type-erased operations for one registered component type.
///
/// All fields are plain function pointers so vtables can be copied out of
/// the [`World`]'s registry before being invoked against it.
#[derive(Clone, Copy)]
pub struct ComponentVTable {
    pub name: &'static str,
    pub type_id: TypeId,
    pub descriptor: Resolver,
    /// Mirror of [`Component::PROPAGATES`].
    pub propagates: bool,
    pub(crate) apply: fn(&mut World, Entity, &JsonValue, &ApplyContext<'_>) -> Result<(), DeserializeError>,
    pub(crate) save: fn(&World, Entity) -> Option<JsonValue>,
    pub(crate) has: fn(&World, Entity) -> bool,
}

impl ComponentVTable {
    pub(crate) fn of<T: Component>() -> Self {
        Self {
            name: T::NAME,
            type_id: TypeId::of::<T>(),
            descriptor: T::descriptor,
            propagates: T::PROPAGATES,
            apply: apply_component::<T>,
            save: save_component::<T>,
            has: has_component::<T>,
        }
    }

    /// Returns whether the entity currently carries this component.
    pub fn has(&self, world: &World, entity: Entity) -> bool {
        (self.has)(world, entity)
    }
}

fn apply_component<T: Component>(
    world: &mut World,
    entity: Entity,
    doc: &JsonValue,
    ctx: &ApplyContext<'_>,
) -> Result<(), DeserializeError> {
    if ctx.from_update {
        if let Some(current) = world.get::<T>(entity) {
            if current.override_flag() == Some(true) {
                // Locally overridden: the template does not touch it.
                return Ok(());
            }
        }
    }

    let mut value = T::default();
    serialize::deserialize_value(reflect::resolve::<T>(), doc, &mut value)?;

    if let Some(remap) = ctx.remap {
        value.remap_identities(&mut |guid| remap.get(&guid).copied().unwrap_or(guid));
    }
    if ctx.resolve_assets {
        if let Some(assets) = ctx.assets {
            value.resolve_assets(assets);
        }
    }

    world.insert(entity, value);
    Ok(())
}

fn save_component<T: Component>(world: &World, entity: Entity) -> Option<JsonValue> {
    world
        .get::<T>(entity)
        .map(|component| serialize::serialize_value(reflect::resolve::<T>(), component))
}

fn has_component<T: Component>(world: &World, entity: Entity) -> bool {
    world.has::<T>(entity)
}
