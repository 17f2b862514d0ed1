use crate::component::Component;

/// Display order among siblings; lower values come first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiblingIndex {
    pub override_from_prefab: bool,
    pub index: i32,
}

impl SiblingIndex {
    pub fn new(index: i32) -> Self {
        Self {
            override_from_prefab: false,
            index,
        }
    }
}

crate::reflect_struct! {
    SiblingIndex {
        override_from_prefab: bool,
        index: i32,
    }
}

impl Component for SiblingIndex {
    const NAME: &'static str = "SiblingIndex";

    fn override_flag(&self) -> Option<bool> {
        Some(self.override_from_prefab)
    }
}
