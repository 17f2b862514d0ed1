//! # prefab-engine
//!
//! Runtime type reflection, component serialization, and prefab
//! instantiation for entity scenes.
//!
//! ## Core Types
//!
//! - [`TypeDescriptor`] — runtime description of one kind of value, with a
//!   process-wide lazy registry and name-keyed dynamic lookup
//! - [`Guid`] / [`IdentityRegistry`] — stable 128-bit identities and their
//!   pairing with runtime [`Entity`] handles
//! - [`World`] — entity-component store with typed and by-name access
//! - [`Component`] — reflected component trait with opt-in capabilities
//!   (identity remapping, override protection, asset resolution)
//!
//! ## Templates
//!
//! - [`PrefabDocument`] / [`save_entity`] / [`instantiate`] — serialized
//!   entity subtrees and the two-pass graph recreation that remaps every
//!   embedded identity
//! - [`refresh_instance`] / [`propagate_to_instances`] — re-applying a
//!   changed template to live instances, honoring per-instance override
//!   flags
//!
//! ## Serialization
//!
//! - [`serialize_value`] / [`deserialize_value`] / [`dump_value`] — the
//!   recursive wire engine over descriptor dispatch
//! - [`Format`] / [`encode`] / [`decode`] — byte-level document I/O
//!
//! See `DESIGN.md` for architecture decisions.

mod component;
pub mod components;
mod entity;
mod guid;
mod identity;
pub mod prefab;
pub mod propagate;
pub mod reflect;
pub mod serialize;
mod world;

pub use component::{ApplyContext, AssetResolver, Component, ComponentVTable};
pub use entity::Entity;
pub use guid::{Guid, ParseGuidError};
pub use identity::IdentityRegistry;
pub use prefab::{
    instantiate, instantiate_from_str, save_entity, InstantiateOptions, PrefabDocument,
    PrefabEntityRecord,
};
pub use propagate::{normalize_template_path, propagate_to_instances, refresh_instance};
pub use reflect::{resolve, resolve_by_name, Blob, DescriptorKind, Reflect, TypeDescriptor};
pub use serialize::{
    decode, deserialize_value, dump_value, encode, serialize_value, DeserializeError, Format,
    SerializeError,
};
pub use world::World;
