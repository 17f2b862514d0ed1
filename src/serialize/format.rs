//! Byte-level encoding of whole documents.
//!
//! Template documents are JSON on disk; the optional `serialize-ron` feature
//! adds RON for tooling that prefers it. Both paths go through serde, so any
//! `Serialize`/`DeserializeOwned` document type works.

use super::error::{DeserializeError, SerializeError};

/// Supported document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Pretty-printed JSON, the canonical on-disk format.
    Json,
    /// RON (Rusty Object Notation).
    #[cfg(feature = "serialize-ron")]
    Ron,
}

/// Encodes a serde-serializable document to bytes in the given format.
pub fn encode<T: serde::Serialize>(value: &T, format: Format) -> Result<Vec<u8>, SerializeError> {
    match format {
        Format::Json => {
            serde_json::to_vec_pretty(value).map_err(|e| SerializeError::FormatError(e.to_string()))
        }
        #[cfg(feature = "serialize-ron")]
        Format::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .map(|s| s.into_bytes())
            .map_err(|e| SerializeError::FormatError(e.to_string())),
    }
}

/// Decodes bytes in the given format to a serde-deserializable document.
pub fn decode<T: serde::de::DeserializeOwned>(
    bytes: &[u8],
    format: Format,
) -> Result<T, DeserializeError> {
    match format {
        Format::Json => {
            serde_json::from_slice(bytes).map_err(|e| DeserializeError::FormatError(e.to_string()))
        }
        #[cfg(feature = "serialize-ron")]
        Format::Ron => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| DeserializeError::FormatError(e.to_string()))?;
            ron::from_str(text).map_err(|e| DeserializeError::FormatError(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefab::PrefabDocument;

    #[test]
    fn json_round_trip() {
        let json = r#"{ "prefab_entities": [ { "guid": "000102030405060708090a0b0c0d0e0f", "components": {} } ] }"#;
        let doc: PrefabDocument = decode(json.as_bytes(), Format::Json).unwrap();
        let bytes = encode(&doc, Format::Json).unwrap();
        let again: PrefabDocument = decode(&bytes, Format::Json).unwrap();
        assert_eq!(again.prefab_entities.len(), 1);
        assert_eq!(
            again.prefab_entities[0].guid,
            "000102030405060708090a0b0c0d0e0f"
        );
    }

    #[test]
    fn json_decode_garbage_fails() {
        let result: Result<PrefabDocument, _> = decode(b"{ not json", Format::Json);
        assert!(matches!(result, Err(DeserializeError::FormatError(_))));
    }
}
