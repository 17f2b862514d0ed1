use crate::component::Component;

/// Index into the scene's tag list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tag {
    pub override_from_prefab: bool,
    pub index: i32,
}

impl Tag {
    pub fn new(index: i32) -> Self {
        Self {
            override_from_prefab: false,
            index,
        }
    }
}

crate::reflect_struct! {
    Tag {
        override_from_prefab: bool,
        index: i32,
    }
}

impl Component for Tag {
    const NAME: &'static str = "Tag";

    fn override_flag(&self) -> Option<bool> {
        Some(self.override_from_prefab)
    }
}
