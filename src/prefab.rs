//! Template documents: save and two-pass instantiation.
//!
//! A template is a serialized entity subtree:
//!
//! ```json
//! {
//!   "prefab_entities": [
//!     { "guid": "<hex>", "components": { "Name": { ... }, "Transform": { ... } } },
//!     { "guid": "<hex>", "components": { "Parent": { ... } } }
//!   ]
//! }
//! ```
//!
//! Hierarchy lives purely in `Parent`/`Children` component data. Saving
//! emits parent-then-subtree order, but readers must not rely on that: all
//! cross-references go by identity.
//!
//! Instantiation is two passes because hierarchy links reference identities
//! that do not exist as live entities when first encountered: pass 1 mints
//! every entity with a fresh identity and builds the old → new remap table,
//! pass 2 deserializes components and rewrites every embedded identity
//! through that table before anything is stored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::component::{ApplyContext, AssetResolver};
use crate::components::{Children, MeshRender, Name, Parent};
use crate::entity::Entity;
use crate::guid::Guid;
use crate::world::World;

/// On-disk template document: the serialized entity subtree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrefabDocument {
    /// Serialized entities; index 0 is the root.
    pub prefab_entities: Vec<PrefabEntityRecord>,
}

/// One entity node of a template document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrefabEntityRecord {
    /// The entity's identity at save time, as 32 hex digits.
    pub guid: String,
    /// Component documents keyed by registered type name.
    #[serde(default)]
    pub components: serde_json::Map<String, JsonValue>,
}

/// Per-call knobs for instantiation.
///
/// Asset resolution is opt-in: a sandboxed edit session passes the default
/// and stays inert, the live scene passes a resolver.
#[derive(Default)]
pub struct InstantiateOptions<'a> {
    pub resolve_assets: bool,
    pub assets: Option<&'a dyn AssetResolver>,
}

/// Parses a template from JSON text and instantiates it.
///
/// Unparseable text is a soft failure: logged, `None` returned.
pub fn instantiate_from_str(
    world: &mut World,
    json: &str,
    options: &InstantiateOptions<'_>,
) -> Option<Entity> {
    let doc: PrefabDocument = match serde_json::from_str(json) {
        Ok(doc) => doc,
        Err(e) => {
            log::error!("invalid template document: {e}");
            return None;
        }
    };
    instantiate(world, &doc, options)
}

/// Recreates the template's entity graph with fresh entities and identities.
///
/// Returns the root (the document's first node), or `None` for an empty
/// document. Unknown component names and malformed component values are
/// logged and skipped; they never abort the rest of the document.
pub fn instantiate(
    world: &mut World,
    doc: &PrefabDocument,
    options: &InstantiateOptions<'_>,
) -> Option<Entity> {
    if doc.prefab_entities.is_empty() {
        log::error!("template document has no entities");
        return None;
    }

    // Pass 1: mint every entity with a brand-new identity and record the
    // old → new mapping. Nothing is attached yet.
    let mut remap: HashMap<Guid, Guid> = HashMap::new();
    let mut spawned = Vec::with_capacity(doc.prefab_entities.len());
    for record in &doc.prefab_entities {
        let new_guid = Guid::generate();
        let entity = world.spawn_with_identity(new_guid);
        match record.guid.parse::<Guid>() {
            Ok(old_guid) => {
                remap.insert(old_guid, new_guid);
            }
            Err(e) => log::warn!("template entity has a malformed identity: {e}"),
        }
        spawned.push(entity);
    }

    // Pass 2: apply components. Every stored identity goes through the
    // remap table before it lands in the world; an un-remapped identity
    // would dangle or hit an unrelated entity from an earlier instantiation.
    let ctx = ApplyContext::instantiate(&remap, options.resolve_assets, options.assets);
    for (record, &entity) in doc.prefab_entities.iter().zip(&spawned) {
        for (name, component_doc) in &record.components {
            let Some(vtable) = world.vtable_by_name(name).copied() else {
                log::warn!("no component type registered under '{name}', skipping");
                continue;
            };
            if let Err(e) = (vtable.apply)(world, entity, component_doc, &ctx) {
                log::error!("failed to apply component '{name}': {e}");
            }
        }
    }

    // The root must come out parentless even if the source document carried
    // a stale parent link.
    let root = spawned[0];
    world.remove::<Parent>(root);

    rebuild_bone_index(world, root);

    Some(root)
}

/// Serializes an entity subtree into a template document.
///
/// Walks the root, then each child subtree through the identity registry.
/// Returns `None` for a dead handle.
pub fn save_entity(world: &World, root: Entity) -> Option<PrefabDocument> {
    if !world.is_alive(root) {
        log::error!("cannot save dead {root}");
        return None;
    }
    let mut records = Vec::new();
    save_recursive(world, root, &mut records);
    Some(PrefabDocument {
        prefab_entities: records,
    })
}

fn save_recursive(world: &World, entity: Entity, out: &mut Vec<PrefabEntityRecord>) {
    let guid = world.guid_of(entity).unwrap_or(Guid::NIL);

    let mut components = serde_json::Map::new();
    for vtable in world.vtables() {
        if let Some(doc) = (vtable.save)(world, entity) {
            components.insert(vtable.name.to_owned(), doc);
        }
    }
    out.push(PrefabEntityRecord {
        guid: guid.to_hex(),
        components,
    });

    let child_guids = world
        .get::<Children>(entity)
        .map(|c| c.children.clone())
        .unwrap_or_default();
    for child_guid in child_guids {
        match world.identities().entity(child_guid) {
            Some(child) => save_recursive(world, child, out),
            None => log::error!("child identity {child_guid} has no live entity, skipping"),
        }
    }
}

/// Rebuilds the root `MeshRender`'s name → identity index from the freshly
/// created subtree.
fn rebuild_bone_index(world: &mut World, root: Entity) {
    if !world.has::<MeshRender>(root) {
        return;
    }

    let mut index: HashMap<String, Guid> = HashMap::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if let (Some(name), Some(guid)) = (world.get::<Name>(entity), world.guid_of(entity)) {
            index.insert(name.value.clone(), guid);
        }
        if let Some(children) = world.get::<Children>(entity) {
            for &child_guid in &children.children {
                if let Some(child) = world.identities().try_entity(child_guid) {
                    stack.push(child);
                }
            }
        }
    }

    if let Some(render) = world.get_mut::<MeshRender>(root) {
        render.bone_map = index;
    }
}
