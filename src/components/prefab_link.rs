use crate::component::Component;

/// Marks a live instance as linked to a template file.
///
/// The stored path is compared after canonicalization (see
/// [`normalize_template_path`](crate::propagate::normalize_template_path)),
/// so two spellings of the same file match. Propagation never overwrites
/// this component in place — the link is what propagation selects by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefabLink {
    pub path: String,
}

impl PrefabLink {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

crate::reflect_struct! {
    PrefabLink {
        path: String,
    }
}

impl Component for PrefabLink {
    const NAME: &'static str = "PrefabLink";
    const PROPAGATES: bool = false;
}
