//! Process-wide descriptor registry.
//!
//! Maps both `TypeId` and type name to the descriptor singleton. Container
//! descriptors are created lazily on first resolve, so the tables are
//! guarded by a lock against two threads racing to install the same
//! descriptor; after first construction reads return the same `&'static`
//! reference forever. Descriptors are leaked on purpose — they live for the
//! process lifetime, which sidesteps teardown-ordering hazards at the cost
//! of a small, bounded, one-time allocation.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::Mutex;

use super::descriptor::TypeDescriptor;

#[derive(Default)]
struct RegistryInner {
    by_type: HashMap<TypeId, &'static TypeDescriptor>,
    by_name: HashMap<String, &'static TypeDescriptor>,
}

fn registry() -> &'static Mutex<RegistryInner> {
    static REGISTRY: OnceLock<Mutex<RegistryInner>> = OnceLock::new();
    REGISTRY.get_or_init(Default::default)
}

/// Returns the descriptor singleton for `T`, building and registering it on
/// first use.
///
/// The builder runs outside the lock because building a container descriptor
/// resolves its element type, which re-enters this function. If two threads
/// race past the first check, the loser's freshly built descriptor is
/// dropped and the winner's singleton is returned to both.
pub fn descriptor_of<T: 'static>(build: fn() -> TypeDescriptor) -> &'static TypeDescriptor {
    let type_id = TypeId::of::<T>();
    if let Some(desc) = registry().lock().by_type.get(&type_id).copied() {
        return desc;
    }

    let built = build();

    let mut inner = registry().lock();
    if let Some(desc) = inner.by_type.get(&type_id).copied() {
        return desc;
    }
    let desc: &'static TypeDescriptor = Box::leak(Box::new(built));
    inner.by_type.insert(type_id, desc);
    inner.by_name.insert(desc.name().to_owned(), desc);
    desc
}

/// Dynamic name-keyed descriptor lookup.
///
/// Only types that have been resolved at least once are found here; a
/// descriptor exists on this path exactly when some code path has already
/// asked for it by type.
pub fn resolve_by_name(name: &str) -> Option<&'static TypeDescriptor> {
    registry().lock().by_name.get(name).copied()
}

#[cfg(test)]
mod tests {
    use crate::reflect::resolve;

    #[test]
    fn resolve_returns_same_singleton() {
        let a = resolve::<i32>();
        let b = resolve::<i32>();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn resolve_by_name_after_resolve() {
        let by_type = resolve::<Vec<f64>>();
        let by_name = super::resolve_by_name("Vec<f64>").expect("registered on first resolve");
        assert!(std::ptr::eq(by_type, by_name));
    }

    #[test]
    fn resolve_by_name_unknown() {
        assert!(super::resolve_by_name("NoSuchTypeAnywhere").is_none());
    }
}
