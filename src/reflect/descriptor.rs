//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is a process-lifetime singleton describing one kind
//! of value: its globally unique name, its byte size, and — through the
//! per-kind accessors in [`DescriptorKind`] — how to reach into a value of
//! that kind held behind `&dyn Any`. The serialization engine in
//! [`serialize`](crate::serialize) is built entirely on these descriptors;
//! nothing there knows any concrete type.
//!
//! Descriptors never hold direct references to their element descriptors.
//! Members and container elements store a [`Resolver`] function instead, so
//! resolving a nested container type is deferred until first actual use.

use std::any::Any;

use serde_json::Value as JsonValue;

use crate::serialize::DeserializeError;

/// Resolves a child descriptor on demand.
pub type Resolver = fn() -> &'static TypeDescriptor;

/// Ties a Rust type to its runtime descriptor.
///
/// Implemented by the primitives, `String`, [`Guid`](crate::Guid),
/// [`Blob`](crate::Blob), `Vec<T>`, `HashMap<K, V>`, `(A, B)`,
/// `Option<Arc<T>>`, and every struct declared through
/// [`reflect_struct!`](crate::reflect_struct).
pub trait Reflect: Any + Send + Sync + 'static {
    /// Returns the descriptor singleton for this type, creating and
    /// registering it on first use.
    fn descriptor() -> &'static TypeDescriptor
    where
        Self: Sized;
}

/// Returns the descriptor singleton for `T`.
pub fn resolve<T: Reflect>() -> &'static TypeDescriptor {
    T::descriptor()
}

/// A runtime description of one kind of value.
pub struct TypeDescriptor {
    name: String,
    size: usize,
    kind: DescriptorKind,
}

impl TypeDescriptor {
    /// The globally unique type name (the `"type"` field on the wire).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// In-memory byte size of the described type.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn kind(&self) -> &DescriptorKind {
        &self.kind
    }

    pub fn primitive(name: impl Into<String>, size: usize, access: PrimitiveAccess) -> Self {
        Self {
            name: name.into(),
            size,
            kind: DescriptorKind::Primitive(access),
        }
    }

    pub fn text(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            kind: DescriptorKind::Text,
        }
    }

    pub fn structure(name: impl Into<String>, size: usize, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            size,
            kind: DescriptorKind::Struct(StructLayout { members }),
        }
    }

    pub fn sequence(name: impl Into<String>, size: usize, access: SequenceAccess) -> Self {
        Self {
            name: name.into(),
            size,
            kind: DescriptorKind::Sequence(access),
        }
    }

    pub fn map(name: impl Into<String>, size: usize, access: MapAccess) -> Self {
        Self {
            name: name.into(),
            size,
            kind: DescriptorKind::Map(access),
        }
    }

    pub fn pair(name: impl Into<String>, size: usize, access: PairAccess) -> Self {
        Self {
            name: name.into(),
            size,
            kind: DescriptorKind::Pair(access),
        }
    }

    pub fn shared(name: impl Into<String>, size: usize, access: SharedAccess) -> Self {
        Self {
            name: name.into(),
            size,
            kind: DescriptorKind::Shared(access),
        }
    }

    pub fn blob(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            kind: DescriptorKind::Blob,
        }
    }

    pub fn identity(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            kind: DescriptorKind::Identity,
        }
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeDescriptor({}, {} bytes)", self.name, self.size)
    }
}

/// The closed set of descriptor kinds.
pub enum DescriptorKind {
    /// Integers, floats, booleans. Direct textual encoding.
    Primitive(PrimitiveAccess),
    /// `String`. The JSON layer handles escaping of control characters.
    Text,
    /// Ordered, fixed member list; positional on the wire.
    Struct(StructLayout),
    /// Dynamically sized list (`Vec<T>`).
    Sequence(SequenceAccess),
    /// Associative map, encoded as an array of `[key, value]` pairs.
    Map(MapAccess),
    /// Two-element tuple.
    Pair(PairAccess),
    /// Shared, possibly-null reference (`Option<Arc<T>>`).
    Shared(SharedAccess),
    /// Untyped shared byte buffer with a length-prefix contract.
    Blob,
    /// 128-bit stable identity, encoded as a bare hex string.
    Identity,
}

/// Encode/decode/display hooks for a primitive type.
pub struct PrimitiveAccess {
    pub encode: fn(&dyn Any) -> JsonValue,
    pub decode: fn(&JsonValue, &mut dyn Any) -> Result<(), DeserializeError>,
    pub display: fn(&dyn Any) -> String,
}

/// Ordered member list of a struct descriptor.
pub struct StructLayout {
    members: Vec<Member>,
}

impl StructLayout {
    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

/// One registered struct member: name, child descriptor, and projections
/// from a struct instance to that one field.
pub struct Member {
    pub name: &'static str,
    pub ty: Resolver,
    pub get: fn(&dyn Any) -> &dyn Any,
    pub get_mut: fn(&mut dyn Any) -> &mut dyn Any,
}

/// Element access for sequence descriptors.
pub struct SequenceAccess {
    pub elem: Resolver,
    pub len: fn(&dyn Any) -> usize,
    pub get: fn(&dyn Any, usize) -> &dyn Any,
    /// Returns the element at `index`, growing the sequence with default
    /// values as needed.
    pub get_or_grow: fn(&mut dyn Any, usize) -> &mut dyn Any,
}

/// Entry access for associative-map descriptors.
pub struct MapAccess {
    pub key: Resolver,
    pub value: Resolver,
    pub len: fn(&dyn Any) -> usize,
    pub entries: fn(&dyn Any) -> Vec<(&dyn Any, &dyn Any)>,
    /// Deserializes one `[key, value]` entry and inserts it.
    pub insert: fn(&mut dyn Any, &JsonValue, &JsonValue) -> Result<(), DeserializeError>,
}

/// First/second projections for pair descriptors.
pub struct PairAccess {
    pub first: Resolver,
    pub second: Resolver,
    pub first_of: fn(&dyn Any) -> &dyn Any,
    pub second_of: fn(&dyn Any) -> &dyn Any,
    pub first_mut: fn(&mut dyn Any) -> &mut dyn Any,
    pub second_mut: fn(&mut dyn Any) -> &mut dyn Any,
}

/// Access for shared, possibly-null wrappers.
pub struct SharedAccess {
    pub elem: Resolver,
    pub get: fn(&dyn Any) -> Option<&dyn Any>,
    pub clear: fn(&mut dyn Any),
    /// Deserializes the child document into a fresh inner value and stores it.
    pub emplace: fn(&mut dyn Any, &JsonValue) -> Result<(), DeserializeError>,
}

/// Downcasts a type-erased value to `&T`.
///
/// Descriptors are only ever paired with values of their own type by the
/// engine and by generated accessors; a mismatch is an internal invariant
/// violation, so this panics rather than returning an error.
#[doc(hidden)]
pub fn downcast_ref<T: 'static>(value: &dyn Any) -> &T {
    value.downcast_ref::<T>().unwrap_or_else(|| {
        panic!(
            "descriptor applied to a value that is not a {}",
            std::any::type_name::<T>()
        )
    })
}

#[doc(hidden)]
pub fn downcast_mut<T: 'static>(value: &mut dyn Any) -> &mut T {
    value.downcast_mut::<T>().unwrap_or_else(|| {
        panic!(
            "descriptor applied to a value that is not a {}",
            std::any::type_name::<T>()
        )
    })
}

/// Declares the serialized member list of a struct and implements
/// [`Reflect`] for it.
///
/// Member order here is the positional wire order; it is fixed at
/// registration and never keyed by name. Fields of the struct that are not
/// listed stay runtime-only and never reach the wire.
///
/// ```ignore
/// reflect_struct! {
///     Health {
///         current: f32,
///         max: f32,
///     }
/// }
/// ```
#[macro_export]
macro_rules! reflect_struct {
    ($ty:ident { $($member:ident : $member_ty:ty),* $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            fn descriptor() -> &'static $crate::reflect::TypeDescriptor {
                $crate::reflect::registry::descriptor_of::<Self>(|| {
                    $crate::reflect::TypeDescriptor::structure(
                        stringify!($ty),
                        ::std::mem::size_of::<$ty>(),
                        vec![$({
                            fn get(obj: &dyn ::std::any::Any) -> &dyn ::std::any::Any {
                                &$crate::reflect::downcast_ref::<$ty>(obj).$member
                            }
                            fn get_mut(obj: &mut dyn ::std::any::Any) -> &mut dyn ::std::any::Any {
                                &mut $crate::reflect::downcast_mut::<$ty>(obj).$member
                            }
                            $crate::reflect::Member {
                                name: stringify!($member),
                                ty: <$member_ty as $crate::reflect::Reflect>::descriptor,
                                get,
                                get_mut,
                            }
                        }),*],
                    )
                })
            }
        }
    };
}
