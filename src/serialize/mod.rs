//! Serialization of described values and whole documents.
//!
//! This module provides:
//!
//! - [`serialize_value`] / [`deserialize_value`] / [`dump_value`] — the
//!   recursive engine over descriptor dispatch
//! - [`SerializeError`] / [`DeserializeError`] — the value-level failure tier
//! - [`Format`] / [`encode`] / [`decode`] — byte-level document I/O

mod engine;
mod error;
mod format;

pub use engine::{deserialize_value, dump_value, serialize_value};
pub use error::{DeserializeError, SerializeError};
pub use format::{decode, encode, Format};
