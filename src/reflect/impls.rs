//! [`Reflect`] implementations for primitives and the generic containers.
//!
//! Container accessors are standalone generic functions instantiated per
//! element type and stored as plain function pointers, so a descriptor stays
//! a plain data object with no captured state.

use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::guid::Guid;
use crate::serialize::{self, DeserializeError};

use super::descriptor::{
    downcast_mut, downcast_ref, MapAccess, PairAccess, PrimitiveAccess, Reflect, SequenceAccess,
    SharedAccess, TypeDescriptor,
};
use super::registry;

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

fn json_signed(payload: &JsonValue) -> Option<i64> {
    payload
        .as_i64()
        .or_else(|| payload.as_u64().map(|v| v as i64))
        .or_else(|| payload.as_f64().map(|v| v as i64))
}

fn json_unsigned(payload: &JsonValue) -> Option<u64> {
    payload
        .as_u64()
        .or_else(|| payload.as_i64().map(|v| v as u64))
        .or_else(|| payload.as_f64().map(|v| v as u64))
}

macro_rules! signed_descriptor {
    ($ty:ty) => {
        impl Reflect for $ty {
            fn descriptor() -> &'static TypeDescriptor {
                registry::descriptor_of::<$ty>(|| {
                    TypeDescriptor::primitive(
                        stringify!($ty),
                        std::mem::size_of::<$ty>(),
                        PrimitiveAccess {
                            encode: |v: &dyn Any| JsonValue::from(*downcast_ref::<$ty>(v)),
                            decode: |payload, out| {
                                let n = json_signed(payload).ok_or_else(|| {
                                    DeserializeError::type_mismatch(
                                        stringify!($ty),
                                        "number",
                                        payload,
                                    )
                                })?;
                                *downcast_mut::<$ty>(out) = n as $ty;
                                Ok(())
                            },
                            display: |v: &dyn Any| downcast_ref::<$ty>(v).to_string(),
                        },
                    )
                })
            }
        }
    };
}

macro_rules! unsigned_descriptor {
    ($ty:ty) => {
        impl Reflect for $ty {
            fn descriptor() -> &'static TypeDescriptor {
                registry::descriptor_of::<$ty>(|| {
                    TypeDescriptor::primitive(
                        stringify!($ty),
                        std::mem::size_of::<$ty>(),
                        PrimitiveAccess {
                            encode: |v: &dyn Any| JsonValue::from(*downcast_ref::<$ty>(v)),
                            decode: |payload, out| {
                                let n = json_unsigned(payload).ok_or_else(|| {
                                    DeserializeError::type_mismatch(
                                        stringify!($ty),
                                        "number",
                                        payload,
                                    )
                                })?;
                                *downcast_mut::<$ty>(out) = n as $ty;
                                Ok(())
                            },
                            display: |v: &dyn Any| downcast_ref::<$ty>(v).to_string(),
                        },
                    )
                })
            }
        }
    };
}

macro_rules! float_descriptor {
    ($ty:ty) => {
        impl Reflect for $ty {
            fn descriptor() -> &'static TypeDescriptor {
                registry::descriptor_of::<$ty>(|| {
                    TypeDescriptor::primitive(
                        stringify!($ty),
                        std::mem::size_of::<$ty>(),
                        PrimitiveAccess {
                            encode: |v: &dyn Any| JsonValue::from(*downcast_ref::<$ty>(v)),
                            decode: |payload, out| {
                                let n = payload.as_f64().ok_or_else(|| {
                                    DeserializeError::type_mismatch(
                                        stringify!($ty),
                                        "number",
                                        payload,
                                    )
                                })?;
                                *downcast_mut::<$ty>(out) = n as $ty;
                                Ok(())
                            },
                            display: |v: &dyn Any| downcast_ref::<$ty>(v).to_string(),
                        },
                    )
                })
            }
        }
    };
}

signed_descriptor!(i32);
signed_descriptor!(i64);
unsigned_descriptor!(u32);
unsigned_descriptor!(u64);
float_descriptor!(f32);
float_descriptor!(f64);

impl Reflect for bool {
    fn descriptor() -> &'static TypeDescriptor {
        registry::descriptor_of::<bool>(|| {
            TypeDescriptor::primitive(
                "bool",
                std::mem::size_of::<bool>(),
                PrimitiveAccess {
                    encode: |v: &dyn Any| JsonValue::from(*downcast_ref::<bool>(v)),
                    decode: |payload, out| {
                        let b = payload.as_bool().ok_or_else(|| {
                            DeserializeError::type_mismatch("bool", "boolean", payload)
                        })?;
                        *downcast_mut::<bool>(out) = b;
                        Ok(())
                    },
                    display: |v: &dyn Any| downcast_ref::<bool>(v).to_string(),
                },
            )
        })
    }
}

impl Reflect for String {
    fn descriptor() -> &'static TypeDescriptor {
        registry::descriptor_of::<String>(|| {
            TypeDescriptor::text("String", std::mem::size_of::<String>())
        })
    }
}

impl Reflect for Guid {
    fn descriptor() -> &'static TypeDescriptor {
        registry::descriptor_of::<Guid>(|| {
            TypeDescriptor::identity("Guid", std::mem::size_of::<Guid>())
        })
    }
}

// ---------------------------------------------------------------------------
// Vec<T>
// ---------------------------------------------------------------------------

fn vec_len<T: 'static>(value: &dyn Any) -> usize {
    downcast_ref::<Vec<T>>(value).len()
}

fn vec_get<T: 'static>(value: &dyn Any, index: usize) -> &dyn Any {
    &downcast_ref::<Vec<T>>(value)[index]
}

fn vec_get_or_grow<T: Default + 'static>(value: &mut dyn Any, index: usize) -> &mut dyn Any {
    let vec = downcast_mut::<Vec<T>>(value);
    if index >= vec.len() {
        vec.resize_with(index + 1, T::default);
    }
    &mut vec[index]
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    fn descriptor() -> &'static TypeDescriptor {
        registry::descriptor_of::<Self>(|| {
            let elem = super::resolve::<T>();
            TypeDescriptor::sequence(
                format!("Vec<{}>", elem.name()),
                std::mem::size_of::<Self>(),
                SequenceAccess {
                    elem: <T as Reflect>::descriptor,
                    len: vec_len::<T>,
                    get: vec_get::<T>,
                    get_or_grow: vec_get_or_grow::<T>,
                },
            )
        })
    }
}

// ---------------------------------------------------------------------------
// HashMap<K, V>
// ---------------------------------------------------------------------------

fn map_len<K: 'static, V: 'static>(value: &dyn Any) -> usize
where
    K: Eq + Hash,
{
    downcast_ref::<HashMap<K, V>>(value).len()
}

fn map_entries<K, V>(value: &dyn Any) -> Vec<(&dyn Any, &dyn Any)>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    downcast_ref::<HashMap<K, V>>(value)
        .iter()
        .map(|(k, v)| (k as &dyn Any, v as &dyn Any))
        .collect()
}

fn map_insert<K, V>(
    value: &mut dyn Any,
    key_doc: &JsonValue,
    value_doc: &JsonValue,
) -> Result<(), DeserializeError>
where
    K: Reflect + Default + Eq + Hash,
    V: Reflect + Default,
{
    let mut key = K::default();
    serialize::deserialize_value(super::resolve::<K>(), key_doc, &mut key)?;
    let mut val = V::default();
    serialize::deserialize_value(super::resolve::<V>(), value_doc, &mut val)?;
    downcast_mut::<HashMap<K, V>>(value).insert(key, val);
    Ok(())
}

impl<K, V> Reflect for HashMap<K, V>
where
    K: Reflect + Default + Eq + Hash,
    V: Reflect + Default,
{
    fn descriptor() -> &'static TypeDescriptor {
        registry::descriptor_of::<Self>(|| {
            let key = super::resolve::<K>();
            let value = super::resolve::<V>();
            TypeDescriptor::map(
                format!("HashMap<{}, {}>", key.name(), value.name()),
                std::mem::size_of::<Self>(),
                MapAccess {
                    key: <K as Reflect>::descriptor,
                    value: <V as Reflect>::descriptor,
                    len: map_len::<K, V>,
                    entries: map_entries::<K, V>,
                    insert: map_insert::<K, V>,
                },
            )
        })
    }
}

// ---------------------------------------------------------------------------
// (A, B)
// ---------------------------------------------------------------------------

fn pair_first<A: 'static, B: 'static>(value: &dyn Any) -> &dyn Any {
    &downcast_ref::<(A, B)>(value).0
}

fn pair_second<A: 'static, B: 'static>(value: &dyn Any) -> &dyn Any {
    &downcast_ref::<(A, B)>(value).1
}

fn pair_first_mut<A: 'static, B: 'static>(value: &mut dyn Any) -> &mut dyn Any {
    &mut downcast_mut::<(A, B)>(value).0
}

fn pair_second_mut<A: 'static, B: 'static>(value: &mut dyn Any) -> &mut dyn Any {
    &mut downcast_mut::<(A, B)>(value).1
}

impl<A: Reflect, B: Reflect> Reflect for (A, B) {
    fn descriptor() -> &'static TypeDescriptor {
        registry::descriptor_of::<Self>(|| {
            let first = super::resolve::<A>();
            let second = super::resolve::<B>();
            TypeDescriptor::pair(
                format!("({}, {})", first.name(), second.name()),
                std::mem::size_of::<Self>(),
                PairAccess {
                    first: <A as Reflect>::descriptor,
                    second: <B as Reflect>::descriptor,
                    first_of: pair_first::<A, B>,
                    second_of: pair_second::<A, B>,
                    first_mut: pair_first_mut::<A, B>,
                    second_mut: pair_second_mut::<A, B>,
                },
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Option<Arc<T>>: shared, possibly-null reference
// ---------------------------------------------------------------------------

fn shared_get<T: 'static>(value: &dyn Any) -> Option<&dyn Any> {
    downcast_ref::<Option<Arc<T>>>(value)
        .as_deref()
        .map(|inner| inner as &dyn Any)
}

fn shared_clear<T: 'static>(value: &mut dyn Any) {
    *downcast_mut::<Option<Arc<T>>>(value) = None;
}

fn shared_emplace<T: Reflect + Default>(
    value: &mut dyn Any,
    doc: &JsonValue,
) -> Result<(), DeserializeError> {
    let mut inner = T::default();
    serialize::deserialize_value(super::resolve::<T>(), doc, &mut inner)?;
    *downcast_mut::<Option<Arc<T>>>(value) = Some(Arc::new(inner));
    Ok(())
}

impl<T: Reflect + Default> Reflect for Option<Arc<T>> {
    fn descriptor() -> &'static TypeDescriptor {
        registry::descriptor_of::<Self>(|| {
            let elem = super::resolve::<T>();
            TypeDescriptor::shared(
                format!("Shared<{}>", elem.name()),
                std::mem::size_of::<Self>(),
                SharedAccess {
                    elem: <T as Reflect>::descriptor,
                    get: shared_get::<T>,
                    clear: shared_clear::<T>,
                    emplace: shared_emplace::<T>,
                },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::resolve;
    use super::*;

    #[test]
    fn container_names_follow_elements() {
        assert_eq!(resolve::<Vec<i32>>().name(), "Vec<i32>");
        assert_eq!(
            resolve::<HashMap<String, u64>>().name(),
            "HashMap<String, u64>"
        );
        assert_eq!(resolve::<(f32, bool)>().name(), "(f32, bool)");
        assert_eq!(resolve::<Option<Arc<String>>>().name(), "Shared<String>");
        assert_eq!(resolve::<Vec<Vec<Guid>>>().name(), "Vec<Vec<Guid>>");
    }

    #[test]
    fn sizes_match_rust_layout() {
        assert_eq!(resolve::<i64>().size(), 8);
        assert_eq!(resolve::<bool>().size(), 1);
        assert_eq!(resolve::<Guid>().size(), 16);
        assert_eq!(
            resolve::<Vec<u32>>().size(),
            std::mem::size_of::<Vec<u32>>()
        );
    }
}
