use crate::component::Component;

/// Display name for an entity.
///
/// Only `value` is part of the serialized layout; the override flag is
/// per-instance editor state and never reaches the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    pub override_from_prefab: bool,
    pub value: String,
}

impl Name {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            override_from_prefab: false,
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

crate::reflect_struct! {
    Name {
        value: String,
    }
}

impl Component for Name {
    const NAME: &'static str = "Name";

    fn override_flag(&self) -> Option<bool> {
        Some(self.override_from_prefab)
    }
}
