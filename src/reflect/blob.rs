//! Opaque shared byte buffers.
//!
//! A [`Blob`] is the untyped escape hatch of the descriptor model: a
//! possibly-null, shared, length-prefixed byte payload. On the wire it is a
//! base64 string of `little-endian u64 payload length ‖ payload`; decoding
//! verifies that the decoded length matches the prefix exactly, which guards
//! against truncated or corrupted payloads.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::serialize::DeserializeError;

use super::descriptor::{Reflect, TypeDescriptor};
use super::registry;

/// Size of the little-endian length prefix, in bytes.
const LENGTH_PREFIX: usize = std::mem::size_of::<u64>();

/// An untyped, shared, possibly-null byte buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blob {
    data: Option<Arc<Vec<u8>>>,
}

impl Blob {
    /// Creates a blob owning the given payload.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            data: Some(Arc::new(bytes)),
        }
    }

    /// The null blob.
    pub fn null() -> Self {
        Self { data: None }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Payload bytes, or `None` for the null blob.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.data.as_ref().map(|arc| arc.as_slice())
    }

    /// Payload length in bytes; 0 for the null blob.
    pub fn len(&self) -> usize {
        self.data.as_ref().map(|arc| arc.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encodes as base64 over the length-prefixed payload. `None` for the
    /// null blob, which serializes as an explicit null marker instead.
    pub(crate) fn encode_text(&self) -> Option<String> {
        let bytes = self.data.as_ref()?;
        let mut framed = Vec::with_capacity(LENGTH_PREFIX + bytes.len());
        framed.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
        framed.extend_from_slice(bytes);
        Some(STANDARD.encode(framed))
    }

    /// Decodes a base64 payload, validating the length prefix.
    pub(crate) fn decode_text(text: &str) -> Result<Self, DeserializeError> {
        let decoded = STANDARD
            .decode(text)
            .map_err(|e| DeserializeError::Malformed {
                type_name: "Blob".to_owned(),
                reason: format!("invalid base64 payload: {e}"),
            })?;
        if decoded.len() < LENGTH_PREFIX {
            return Err(DeserializeError::BlobLength {
                prefix_len: 0,
                decoded_len: decoded.len(),
            });
        }
        let mut prefix = [0u8; LENGTH_PREFIX];
        prefix.copy_from_slice(&decoded[..LENGTH_PREFIX]);
        let payload_len = u64::from_le_bytes(prefix);
        if decoded.len() as u64 != LENGTH_PREFIX as u64 + payload_len {
            return Err(DeserializeError::BlobLength {
                prefix_len: payload_len,
                decoded_len: decoded.len(),
            });
        }
        Ok(Blob::new(decoded[LENGTH_PREFIX..].to_vec()))
    }
}

impl Reflect for Blob {
    fn descriptor() -> &'static TypeDescriptor {
        registry::descriptor_of::<Self>(|| {
            TypeDescriptor::blob("Blob", std::mem::size_of::<Blob>())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let blob = Blob::new(vec![1, 2, 3, 4, 5]);
        let text = blob.encode_text().unwrap();
        let back = Blob::decode_text(&text).unwrap();
        assert_eq!(back, blob);
        assert_eq!(back.bytes(), Some(&[1u8, 2, 3, 4, 5][..]));
    }

    #[test]
    fn empty_payload_round_trip() {
        let blob = Blob::new(Vec::new());
        let text = blob.encode_text().unwrap();
        let back = Blob::decode_text(&text).unwrap();
        assert!(back.is_empty());
        assert!(!back.is_null());
    }

    #[test]
    fn null_has_no_text() {
        assert!(Blob::null().encode_text().is_none());
        assert!(Blob::null().is_null());
    }

    #[test]
    fn length_prefix_mismatch_fails() {
        // Frame claims 100 bytes but carries 3
        let mut framed = 100u64.to_le_bytes().to_vec();
        framed.extend_from_slice(&[1, 2, 3]);
        let text = STANDARD.encode(framed);
        let err = Blob::decode_text(&text).unwrap_err();
        assert!(matches!(
            err,
            DeserializeError::BlobLength {
                prefix_len: 100,
                ..
            }
        ));
    }

    #[test]
    fn truncated_frame_fails() {
        let text = STANDARD.encode([1u8, 2, 3]); // shorter than the prefix itself
        assert!(Blob::decode_text(&text).is_err());
    }

    #[test]
    fn garbage_base64_fails() {
        assert!(Blob::decode_text("not//valid==base64!!").is_err());
    }
}
