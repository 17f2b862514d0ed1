//! Template propagation to live instances.
//!
//! Two paths re-apply a template after it changed on disk:
//!
//! - [`refresh_instance`] rebuilds one instance wholesale: destroy, then
//!   re-instantiate, then restore the captured local fields. The
//!   destroy-before-recreate ordering is inherently fragile against entity
//!   slot reuse; the destroy happens as late as possible, immediately before
//!   minting the replacement, and the generational allocator at least makes
//!   stale handles detectable.
//! - [`propagate_to_instances`] updates every linked instance in place,
//!   component by component, honoring per-instance override flags. This
//!   never touches hierarchy links, so instance wiring survives.
//!
//! Instances are matched by their [`PrefabLink`] path after
//! canonicalization, so different spellings of the same file compare equal.

use crate::components::{
    despawn_recursive, set_parent, Name, Parent, PrefabLink, Transform,
};
use crate::entity::Entity;
use crate::prefab::{instantiate, InstantiateOptions, PrefabDocument};
use crate::world::World;

/// Destroys `into` and re-instantiates the template in its place.
///
/// When `keep_position` is set, the instance's name, transform position and
/// rotation, and parent link are captured before destruction and restored on
/// the new root. Returns the new root, or `None` if the template failed to
/// instantiate (the old instance is gone either way).
pub fn refresh_instance(
    world: &mut World,
    doc: &PrefabDocument,
    into: Entity,
    keep_position: bool,
    options: &InstantiateOptions<'_>,
) -> Option<Entity> {
    if !world.is_alive(into) {
        log::error!("cannot refresh dead {into}");
        return None;
    }

    let prev_name = world.get::<Name>(into).map(|n| n.value.clone());
    let prev_transform = world
        .get::<Transform>(into)
        .map(|t| (t.position, t.rotation));
    let prev_parent = world.get::<Parent>(into).map(|p| p.parent);

    // Destroy as late as possible, immediately before minting the
    // replacement, to narrow the slot-reuse window.
    despawn_recursive(world, into);

    let root = instantiate(world, doc, options)?;

    if keep_position {
        if let Some((position, rotation)) = prev_transform {
            if let Some(transform) = world.get_mut::<Transform>(root) {
                transform.position = position;
                transform.rotation = rotation;
                transform.dirty = true;
            }
        }
        if let Some(name) = prev_name {
            if let Some(current) = world.get_mut::<Name>(root) {
                current.value = name;
            }
        }
        if let Some(parent_guid) = prev_parent {
            if let Some(parent) = world.identities().try_entity(parent_guid) {
                set_parent(world, root, parent);
            }
        }
    }

    Some(root)
}

/// Re-applies the template root's components to every live instance linked
/// to `template_path`. Returns the number of instances updated.
///
/// Per component type: types that opt into the override capability are
/// skipped on instances whose flag is set and overwritten otherwise; types
/// without the capability are always overwritten; non-propagating types
/// (hierarchy links, the prefab link itself) are never touched.
pub fn propagate_to_instances(
    world: &mut World,
    doc: &PrefabDocument,
    template_path: &str,
    options: &InstantiateOptions<'_>,
) -> usize {
    let Some(root_record) = doc.prefab_entities.first() else {
        log::error!("template document has no entities, nothing to propagate");
        return 0;
    };

    let target = normalize_template_path(template_path);
    let instances: Vec<Entity> = world
        .iter_entities()
        .filter(|&entity| {
            world
                .get::<PrefabLink>(entity)
                .map(|link| normalize_template_path(&link.path) == target)
                .unwrap_or(false)
        })
        .collect();

    let ctx = crate::component::ApplyContext::update(options.resolve_assets, options.assets);
    let mut updated = 0;
    for entity in instances {
        for (name, component_doc) in &root_record.components {
            let Some(vtable) = world.vtable_by_name(name).copied() else {
                log::warn!("no component type registered under '{name}', skipping");
                continue;
            };
            if !vtable.propagates {
                continue;
            }
            if let Err(e) = (vtable.apply)(world, entity, component_doc, &ctx) {
                log::error!("failed to propagate component '{name}': {e}");
            }
        }
        updated += 1;
    }
    updated
}

/// Canonicalizes a template path for comparison: separators unified,
/// `.`/`..` segments resolved lexically, ASCII case folded.
pub fn normalize_template_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|&s| s != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut joined = segments.join("/");
    if absolute {
        joined.insert(0, '/');
    }
    joined.make_ascii_lowercase();
    joined
}
