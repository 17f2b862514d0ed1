use glam::Vec3;

use crate::component::Component;

crate::reflect_struct! {
    Vec3 {
        x: f32,
        y: f32,
        z: f32,
    }
}

/// Local spatial state of an entity.
///
/// Serialized members are position, scale, rotation, and the dirty bit, in
/// that order. The override flag is runtime-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub override_from_prefab: bool,
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Vec3,
    /// Set whenever local state changes so derived world state gets rebuilt.
    pub dirty: bool,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            override_from_prefab: false,
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            dirty: false,
        }
    }
}

crate::reflect_struct! {
    Transform {
        position: Vec3,
        scale: Vec3,
        rotation: Vec3,
        dirty: bool,
    }
}

impl Component for Transform {
    const NAME: &'static str = "Transform";

    fn override_flag(&self) -> Option<bool> {
        Some(self.override_from_prefab)
    }
}
