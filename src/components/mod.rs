//! Standard reflected components.
//!
//! Call [`register_std_components`] on a fresh [`World`] so the dynamic
//! by-name paths (template instantiation, propagation, saving, the scripting
//! bridge) can see all of them.

mod hierarchy;
mod layer;
mod mesh_render;
mod name;
mod prefab_link;
mod sibling_index;
mod tag;
mod transform;

pub use hierarchy::{despawn_recursive, remove_parent, set_parent, Children, Parent};
pub use layer::Layer;
pub use mesh_render::MeshRender;
pub use name::Name;
pub use prefab_link::PrefabLink;
pub use sibling_index::SiblingIndex;
pub use tag::Tag;
pub use transform::Transform;

use crate::world::World;

/// Registers every standard component type on a world.
pub fn register_std_components(world: &mut World) {
    world.register_component::<Name>();
    world.register_component::<Transform>();
    world.register_component::<Layer>();
    world.register_component::<SiblingIndex>();
    world.register_component::<Tag>();
    world.register_component::<Parent>();
    world.register_component::<Children>();
    world.register_component::<PrefabLink>();
    world.register_component::<MeshRender>();
}
