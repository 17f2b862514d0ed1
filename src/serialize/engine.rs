//! The recursive wire engine.
//!
//! Turns any described value into a JSON document and back using nothing but
//! descriptor dispatch. The wire shape for a single value is
//! `{"type": "<Name>", "data": <payload>}`, with two exceptions carried over
//! from the persisted format: identities encode as a bare hex string, and
//! shared wrappers encode as `null` or the wrapped value's own document.
//!
//! On decode the embedded `"type"` string is informational only; shape
//! checking comes from the descriptor, and struct members bind positionally.

use std::any::Any;

use serde_json::{json, Value as JsonValue};

use crate::guid::Guid;
use crate::reflect::{Blob, DescriptorKind, TypeDescriptor};
use crate::reflect::{downcast_mut, downcast_ref};

use super::error::DeserializeError;

/// Serializes a value through its descriptor into a wire document.
pub fn serialize_value(desc: &TypeDescriptor, value: &dyn Any) -> JsonValue {
    match desc.kind() {
        DescriptorKind::Primitive(access) => envelope(desc, (access.encode)(value)),
        DescriptorKind::Text => {
            envelope(desc, JsonValue::String(downcast_ref::<String>(value).clone()))
        }
        DescriptorKind::Struct(layout) => {
            let data = layout
                .members()
                .iter()
                .map(|member| serialize_value((member.ty)(), (member.get)(value)))
                .collect();
            envelope(desc, JsonValue::Array(data))
        }
        DescriptorKind::Sequence(access) => {
            let elem = (access.elem)();
            let data = (0..(access.len)(value))
                .map(|index| serialize_value(elem, (access.get)(value, index)))
                .collect();
            envelope(desc, JsonValue::Array(data))
        }
        DescriptorKind::Map(access) => {
            let key = (access.key)();
            let val = (access.value)();
            let data = (access.entries)(value)
                .into_iter()
                .map(|(k, v)| {
                    JsonValue::Array(vec![serialize_value(key, k), serialize_value(val, v)])
                })
                .collect();
            envelope(desc, JsonValue::Array(data))
        }
        DescriptorKind::Pair(access) => {
            let data = vec![
                serialize_value((access.first)(), (access.first_of)(value)),
                serialize_value((access.second)(), (access.second_of)(value)),
            ];
            envelope(desc, JsonValue::Array(data))
        }
        DescriptorKind::Shared(access) => match (access.get)(value) {
            None => JsonValue::Null,
            Some(inner) => serialize_value((access.elem)(), inner),
        },
        DescriptorKind::Blob => match downcast_ref::<Blob>(value).encode_text() {
            None => JsonValue::Null,
            Some(text) => envelope(desc, JsonValue::String(text)),
        },
        DescriptorKind::Identity => JsonValue::String(downcast_ref::<Guid>(value).to_hex()),
    }
}

/// Deserializes a wire document through its descriptor into `out`.
///
/// `out` must hold a value of the descriptor's type; it is typically
/// default-constructed by the caller. Struct member-count drift is tolerated
/// with a logged warning (see the struct arm); everything else that does not
/// match the expected shape is an error.
pub fn deserialize_value(
    desc: &TypeDescriptor,
    doc: &JsonValue,
    out: &mut dyn Any,
) -> Result<(), DeserializeError> {
    match desc.kind() {
        DescriptorKind::Primitive(access) => {
            let payload = payload_of(desc, doc)?;
            (access.decode)(payload, out)
        }
        DescriptorKind::Text => {
            let payload = payload_of(desc, doc)?;
            let text = payload
                .as_str()
                .ok_or_else(|| DeserializeError::type_mismatch(desc.name(), "string", payload))?;
            *downcast_mut::<String>(out) = text.to_owned();
            Ok(())
        }
        DescriptorKind::Struct(layout) => {
            let payload = payload_of(desc, doc)?;
            let array = payload
                .as_array()
                .ok_or_else(|| DeserializeError::type_mismatch(desc.name(), "array", payload))?;
            let members = layout.members();
            if array.len() != members.len() {
                // Tolerated schema drift: bind positionally up to the shorter
                // length, leave the rest at their prior values.
                log::warn!(
                    "member count mismatch while deserializing '{}': expected {}, got {}",
                    desc.name(),
                    members.len(),
                    array.len()
                );
            }
            for (member, item) in members.iter().zip(array.iter()) {
                deserialize_value((member.ty)(), item, (member.get_mut)(out)).map_err(|e| {
                    DeserializeError::Member {
                        owner: desc.name().to_owned(),
                        member: member.name,
                        source: Box::new(e),
                    }
                })?;
            }
            Ok(())
        }
        DescriptorKind::Sequence(access) => {
            let payload = payload_of(desc, doc)?;
            let array = payload
                .as_array()
                .ok_or_else(|| DeserializeError::type_mismatch(desc.name(), "array", payload))?;
            let elem = (access.elem)();
            for (index, item) in array.iter().enumerate() {
                deserialize_value(elem, item, (access.get_or_grow)(out, index))?;
            }
            Ok(())
        }
        DescriptorKind::Map(access) => {
            let payload = payload_of(desc, doc)?;
            let array = payload
                .as_array()
                .ok_or_else(|| DeserializeError::type_mismatch(desc.name(), "array", payload))?;
            for item in array {
                let entry = item.as_array().filter(|e| e.len() == 2).ok_or_else(|| {
                    DeserializeError::type_mismatch(desc.name(), "[key, value] pair", item)
                })?;
                (access.insert)(out, &entry[0], &entry[1])?;
            }
            Ok(())
        }
        DescriptorKind::Pair(access) => {
            let payload = payload_of(desc, doc)?;
            let array = payload
                .as_array()
                .ok_or_else(|| DeserializeError::type_mismatch(desc.name(), "array", payload))?;
            if array.len() != 2 {
                return Err(DeserializeError::PairArity {
                    type_name: desc.name().to_owned(),
                    len: array.len(),
                });
            }
            deserialize_value((access.first)(), &array[0], (access.first_mut)(out))?;
            deserialize_value((access.second)(), &array[1], (access.second_mut)(out))
        }
        DescriptorKind::Shared(access) => {
            if doc.is_null() {
                (access.clear)(out);
                Ok(())
            } else {
                (access.emplace)(out, doc)
            }
        }
        DescriptorKind::Blob => {
            if doc.is_null() {
                *downcast_mut::<Blob>(out) = Blob::null();
                return Ok(());
            }
            let payload = payload_of(desc, doc)?;
            let text = payload.as_str().ok_or_else(|| {
                DeserializeError::type_mismatch(desc.name(), "base64 string", payload)
            })?;
            *downcast_mut::<Blob>(out) = Blob::decode_text(text)?;
            Ok(())
        }
        DescriptorKind::Identity => {
            let text = doc
                .as_str()
                .ok_or_else(|| DeserializeError::type_mismatch(desc.name(), "hex string", doc))?;
            let guid: Guid = text
                .parse()
                .map_err(|_| DeserializeError::InvalidIdentity(text.to_owned()))?;
            *downcast_mut::<Guid>(out) = guid;
            Ok(())
        }
    }
}

/// Renders an indented diagnostic view of a value.
pub fn dump_value(desc: &TypeDescriptor, value: &dyn Any) -> String {
    let mut out = String::new();
    dump_into(desc, value, 0, &mut out);
    out
}

fn dump_into(desc: &TypeDescriptor, value: &dyn Any, indent: usize, out: &mut String) {
    let pad = "    ".repeat(indent);
    match desc.kind() {
        DescriptorKind::Primitive(access) => {
            out.push_str(&format!("{}{{{}}}", desc.name(), (access.display)(value)));
        }
        DescriptorKind::Text => {
            out.push_str(&format!("String{{{:?}}}", downcast_ref::<String>(value)));
        }
        DescriptorKind::Struct(layout) => {
            out.push_str(&format!("{} {{\n", desc.name()));
            for member in layout.members() {
                out.push_str(&format!("{pad}    {} = ", member.name));
                dump_into((member.ty)(), (member.get)(value), indent + 1, out);
                out.push('\n');
            }
            out.push_str(&format!("{pad}}}"));
        }
        DescriptorKind::Sequence(access) => {
            let len = (access.len)(value);
            out.push_str(&format!("{} [\n", desc.name()));
            for index in 0..len {
                out.push_str(&format!("{pad}    [{index}] "));
                dump_into((access.elem)(), (access.get)(value, index), indent + 1, out);
                out.push('\n');
            }
            out.push_str(&format!("{pad}]"));
        }
        DescriptorKind::Map(access) => {
            out.push_str(&format!("{} {{\n", desc.name()));
            for (k, v) in (access.entries)(value) {
                out.push_str(&format!("{pad}    "));
                dump_into((access.key)(), k, indent + 1, out);
                out.push_str(": ");
                dump_into((access.value)(), v, indent + 1, out);
                out.push('\n');
            }
            out.push_str(&format!("{pad}}}"));
        }
        DescriptorKind::Pair(access) => {
            out.push('(');
            dump_into((access.first)(), (access.first_of)(value), indent, out);
            out.push_str(", ");
            dump_into((access.second)(), (access.second_of)(value), indent, out);
            out.push(')');
        }
        DescriptorKind::Shared(access) => match (access.get)(value) {
            None => out.push_str("null"),
            Some(inner) => dump_into((access.elem)(), inner, indent, out),
        },
        DescriptorKind::Blob => {
            let blob = downcast_ref::<Blob>(value);
            if blob.is_null() {
                out.push_str("null");
            } else {
                out.push_str(&format!("Blob{{{} bytes}}", blob.len()));
            }
        }
        DescriptorKind::Identity => {
            out.push_str(&downcast_ref::<Guid>(value).to_hex());
        }
    }
}

fn envelope(desc: &TypeDescriptor, payload: JsonValue) -> JsonValue {
    json!({ "type": desc.name(), "data": payload })
}

fn payload_of<'a>(
    desc: &TypeDescriptor,
    doc: &'a JsonValue,
) -> Result<&'a JsonValue, DeserializeError> {
    doc.as_object()
        .and_then(|obj| obj.get("data"))
        .ok_or_else(|| DeserializeError::Malformed {
            type_name: desc.name().to_owned(),
            reason: "expected an object with a 'data' member".to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::reflect::resolve;

    fn round_trip<T: crate::reflect::Reflect + Default + PartialEq + std::fmt::Debug>(value: T) {
        let doc = serialize_value(resolve::<T>(), &value);
        let mut restored = T::default();
        deserialize_value(resolve::<T>(), &doc, &mut restored).unwrap();
        assert_eq!(restored, value);
    }

    #[test]
    fn round_trip_primitives() {
        round_trip(42i32);
        round_trip(-7i64);
        round_trip(3_000_000_000u32);
        round_trip(u64::MAX);
        round_trip(1.5f32);
        round_trip(-2.25f64);
        round_trip(true);
        round_trip(false);
    }

    #[test]
    fn round_trip_strings() {
        round_trip(String::new());
        round_trip("hello".to_owned());
        round_trip("line\nbreak\ttab \"quoted\" \u{1}".to_owned());
    }

    #[test]
    fn round_trip_identity() {
        round_trip(Guid::NIL);
        round_trip(Guid::generate());
    }

    #[test]
    fn identity_is_bare_hex_string() {
        let guid = Guid::generate();
        let doc = serialize_value(resolve::<Guid>(), &guid);
        assert_eq!(doc, JsonValue::String(guid.to_hex()));
    }

    #[test]
    fn round_trip_sequences() {
        round_trip(Vec::<i32>::new());
        round_trip(vec![1u32, 2, 3]);
        round_trip(vec![vec![1.0f32], vec![], vec![2.0, 3.0]]);
        round_trip(vec![Guid::generate(), Guid::NIL]);
    }

    #[test]
    fn round_trip_maps() {
        round_trip(HashMap::<String, i32>::new());
        let mut map = HashMap::new();
        map.insert("one".to_owned(), 1i64);
        map.insert("two".to_owned(), 2);
        round_trip(map);
    }

    #[test]
    fn round_trip_pairs() {
        round_trip((1i32, "one".to_owned()));
        round_trip((Guid::generate(), 0.5f64));
    }

    #[test]
    fn round_trip_shared() {
        round_trip(Option::<Arc<String>>::None);
        round_trip(Some(Arc::new("shared".to_owned())));
    }

    #[test]
    fn round_trip_blob() {
        round_trip(Blob::null());
        round_trip(Blob::new(Vec::new()));
        round_trip(Blob::new((0u8..=255).collect()));
    }

    #[test]
    fn shared_null_is_explicit_marker() {
        let value: Option<Arc<i32>> = None;
        let doc = serialize_value(resolve::<Option<Arc<i32>>>(), &value);
        assert!(doc.is_null());
    }

    #[test]
    fn envelope_shape() {
        let doc = serialize_value(resolve::<i32>(), &5i32);
        assert_eq!(doc["type"], "i32");
        assert_eq!(doc["data"], 5);
    }

    #[test]
    fn primitive_decode_rejects_wrong_shape() {
        let mut out = 0i32;
        let doc = json!({ "type": "i32", "data": "not a number" });
        assert!(deserialize_value(resolve::<i32>(), &doc, &mut out).is_err());

        let doc = json!("no data member");
        assert!(deserialize_value(resolve::<i32>(), &doc, &mut out).is_err());
    }

    #[test]
    fn identity_decode_rejects_non_string() {
        let mut out = Guid::NIL;
        let doc = json!({ "type": "Guid", "data": 5 });
        assert!(deserialize_value(resolve::<Guid>(), &doc, &mut out).is_err());
        assert!(deserialize_value(resolve::<Guid>(), &json!("xyz"), &mut out).is_err());
    }

    #[test]
    fn pair_decode_rejects_wrong_arity() {
        let mut out = (0i32, 0i32);
        let one = serialize_value(resolve::<i32>(), &1i32);
        let doc = json!({ "type": "(i32, i32)", "data": [one] });
        let err = deserialize_value(resolve::<(i32, i32)>(), &doc, &mut out).unwrap_err();
        assert!(matches!(err, DeserializeError::PairArity { len: 1, .. }));
    }

    // --- struct drift -----------------------------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    struct ThreeFields {
        a: i32,
        b: String,
        c: f32,
    }

    crate::reflect_struct! {
        ThreeFields {
            a: i32,
            b: String,
            c: f32,
        }
    }

    #[test]
    fn round_trip_struct() {
        round_trip(ThreeFields {
            a: -3,
            b: "x".to_owned(),
            c: 0.25,
        });
    }

    #[test]
    fn struct_positional_wire_order() {
        let value = ThreeFields {
            a: 7,
            b: "seven".to_owned(),
            c: 7.5,
        };
        let doc = serialize_value(resolve::<ThreeFields>(), &value);
        let data = doc["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["data"], 7);
        assert_eq!(data[1]["data"], "seven");
    }

    #[test]
    fn struct_short_array_keeps_defaults() {
        // Two entries against three registered members: a warning, not an
        // error; the third member keeps its prior value.
        let doc = json!({
            "type": "ThreeFields",
            "data": [
                { "type": "i32", "data": 9 },
                { "type": "String", "data": "nine" },
            ]
        });
        let mut out = ThreeFields {
            c: 1.25,
            ..Default::default()
        };
        deserialize_value(resolve::<ThreeFields>(), &doc, &mut out).unwrap();
        assert_eq!(out.a, 9);
        assert_eq!(out.b, "nine");
        assert_eq!(out.c, 1.25);
    }

    #[test]
    fn struct_long_array_ignores_extras() {
        let doc = json!({
            "type": "ThreeFields",
            "data": [
                { "type": "i32", "data": 1 },
                { "type": "String", "data": "one" },
                { "type": "f32", "data": 1.0 },
                { "type": "i32", "data": 999 },
            ]
        });
        let mut out = ThreeFields::default();
        deserialize_value(resolve::<ThreeFields>(), &doc, &mut out).unwrap();
        assert_eq!(out.a, 1);
        assert_eq!(out.c, 1.0);
    }

    #[test]
    fn struct_member_error_carries_context() {
        let doc = json!({
            "type": "ThreeFields",
            "data": [
                { "type": "i32", "data": "bad" },
            ]
        });
        let mut out = ThreeFields::default();
        let err = deserialize_value(resolve::<ThreeFields>(), &doc, &mut out).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ThreeFields"));
        assert!(message.contains('a'));
    }

    #[test]
    fn dump_renders_struct_members() {
        let value = ThreeFields {
            a: 2,
            b: "two".to_owned(),
            c: 2.5,
        };
        let text = dump_value(resolve::<ThreeFields>(), &value);
        assert!(text.contains("ThreeFields"));
        assert!(text.contains("a = i32{2}"));
        assert!(text.contains("b = String{\"two\"}"));
    }
}
