//! Error types for value serialization and deserialization.

use std::fmt;

/// Errors that can occur while encoding documents.
#[derive(Debug)]
pub enum SerializeError {
    /// Format encoding error (JSON/RON).
    FormatError(String),
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormatError(msg) => write!(f, "format error: {msg}"),
        }
    }
}

impl std::error::Error for SerializeError {}

/// Errors raised by a descriptor's deserialize path.
///
/// These are the value-level failures of the two-tier policy: they abort the
/// one component being applied and are caught and logged by the per-component
/// call site, so sibling components and entities still go through.
#[derive(Debug)]
pub enum DeserializeError {
    /// The document does not have the JSON shape this descriptor expects.
    Malformed { type_name: String, reason: String },
    /// A payload held the wrong JSON type (e.g. non-numeric for a number).
    TypeMismatch {
        type_name: String,
        expected: &'static str,
        found: String,
    },
    /// A pair document whose array is not exactly two elements.
    PairArity { type_name: String, len: usize },
    /// A blob whose decoded length does not match its length prefix.
    BlobLength { prefix_len: u64, decoded_len: usize },
    /// An identity string that is not 32 hex digits.
    InvalidIdentity(String),
    /// A component type name with no registered vtable.
    UnknownComponent { type_name: String },
    /// Failure while deserializing one member of a struct.
    Member {
        owner: String,
        member: &'static str,
        source: Box<DeserializeError>,
    },
    /// Format decoding error (JSON/RON).
    FormatError(String),
}

impl DeserializeError {
    pub(crate) fn type_mismatch(
        type_name: &str,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Self::TypeMismatch {
            type_name: type_name.to_owned(),
            expected,
            found: summarize_json(found),
        }
    }
}

/// Short JSON shape description for error messages.
fn summarize_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_owned(),
        serde_json::Value::Bool(b) => format!("bool {b}"),
        serde_json::Value::Number(n) => format!("number {n}"),
        serde_json::Value::String(s) if s.len() <= 32 => format!("string {s:?}"),
        serde_json::Value::String(_) => "string".to_owned(),
        serde_json::Value::Array(a) => format!("array of {}", a.len()),
        serde_json::Value::Object(_) => "object".to_owned(),
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { type_name, reason } => {
                write!(f, "malformed document for '{type_name}': {reason}")
            }
            Self::TypeMismatch {
                type_name,
                expected,
                found,
            } => write!(
                f,
                "type mismatch for '{type_name}': expected {expected}, found {found}"
            ),
            Self::PairArity { type_name, len } => {
                write!(f, "'{type_name}' expects an array of size 2, got {len}")
            }
            Self::BlobLength {
                prefix_len,
                decoded_len,
            } => write!(
                f,
                "blob length mismatch: prefix says {prefix_len} payload bytes, decoded {decoded_len} total"
            ),
            Self::InvalidIdentity(s) => write!(f, "invalid identity string '{s}'"),
            Self::UnknownComponent { type_name } => {
                write!(f, "unknown component type '{type_name}'")
            }
            Self::Member {
                owner,
                member,
                source,
            } => write!(f, "member '{member}' of '{owner}': {source}"),
            Self::FormatError(msg) => write!(f, "format error: {msg}"),
        }
    }
}

impl std::error::Error for DeserializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Member { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
