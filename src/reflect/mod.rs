//! Runtime type description.
//!
//! This module provides:
//!
//! - [`TypeDescriptor`] / [`DescriptorKind`] — one runtime object per
//!   described type, with per-kind accessors over `&dyn Any`
//! - [`Reflect`] / [`resolve`] — the type → descriptor association
//! - [`registry`] — the lazy, lock-guarded descriptor singleton tables and
//!   the name-keyed dynamic lookup
//! - [`Blob`] — the untyped shared byte buffer
//! - [`reflect_struct!`](crate::reflect_struct) — declares a struct's
//!   serialized member list
//!
//! Descriptors know nothing about entities or worlds; the serialization
//! engine in [`serialize`](crate::serialize) drives them recursively.

mod blob;
mod descriptor;
mod impls;
pub mod registry;

pub use blob::Blob;
pub use descriptor::{
    downcast_mut, downcast_ref, resolve, DescriptorKind, MapAccess, Member, PairAccess,
    PrimitiveAccess, Reflect, Resolver, SequenceAccess, SharedAccess, StructLayout,
    TypeDescriptor,
};
pub use registry::resolve_by_name;
