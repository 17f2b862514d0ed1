use std::collections::HashMap;
use std::sync::Arc;

use crate::component::{AssetResolver, Component};
use crate::guid::Guid;

/// Renders a mesh asset with a material.
///
/// `mesh` and `material` are external asset identities; they are not entity
/// references and are never remapped. `bone_map` is the derived
/// name → entity-identity index rebuilt after instantiation, and its values
/// do remap with the entity graph. The resolved payload and the override
/// flag are runtime-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshRender {
    pub override_from_prefab: bool,
    pub mesh: Guid,
    pub material: Guid,
    pub bone_map: HashMap<String, Guid>,
    pub mesh_data: Option<Arc<Vec<u8>>>,
}

impl MeshRender {
    pub fn new(mesh: Guid, material: Guid) -> Self {
        Self {
            mesh,
            material,
            ..Default::default()
        }
    }
}

crate::reflect_struct! {
    MeshRender {
        mesh: Guid,
        material: Guid,
        bone_map: HashMap<String, Guid>,
    }
}

impl Component for MeshRender {
    const NAME: &'static str = "MeshRender";

    fn override_flag(&self) -> Option<bool> {
        Some(self.override_from_prefab)
    }

    fn remap_identities(&mut self, map: &mut dyn FnMut(Guid) -> Guid) {
        for guid in self.bone_map.values_mut() {
            *guid = map(*guid);
        }
    }

    fn resolve_assets(&mut self, assets: &dyn AssetResolver) {
        if self.mesh.is_nil() {
            self.mesh_data = None;
        } else {
            self.mesh_data = assets.load_by_identity(self.mesh);
        }
    }
}
