//! Encode/decode rules between typed values and the JSON wire form.
//!
//! A field travels as an envelope:
//!
//! ```text
//! { "type": "<kind>"[, "container_type": "<hint>"], "value": <wire value> }
//! ```
//!
//! with `type` spelled `array_<kind>` for arrays. `uint64` values travel as
//! decimal strings because a JSON number cannot hold the full range without
//! precision loss in common readers. Complex and time-pair kinds travel as
//! two-element arrays.

use serde_json::{Map, Number, Value};

use crate::field::Field;
use crate::kind::{kind_of, ScalarKind};
use crate::value::{Complex, Scalar, ScalarArray, TimePair};

/// Prefix prepended to a kind name when it tags an array.
pub const ARRAY_PREFIX: &str = "array_";
/// Envelope key holding the kind name.
pub const TYPE_KEY: &str = "type";
/// Envelope key holding the container hint of an array.
pub const CONTAINER_KEY: &str = "container_type";
/// Envelope key holding the wire value.
pub const VALUE_KEY: &str = "value";

/// Encodes one value to its bare wire form (no envelope).
pub fn encode_scalar(value: &Scalar) -> Value {
    match value {
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Char8(c) => Value::from(i64::from(*c as i8)),
        Scalar::Char16(c) => Value::from(u64::from(*c)),
        Scalar::Char32(c) => Value::from(u64::from(*c)),
        Scalar::Uint8(v) => Value::from(u64::from(*v)),
        Scalar::Uint16(v) => Value::from(u64::from(*v)),
        Scalar::Uint32(v) => Value::from(u64::from(*v)),
        Scalar::Uint64(v) => Value::String(v.to_string()),
        Scalar::Int8(v) => Value::from(i64::from(*v)),
        Scalar::Int16(v) => Value::from(i64::from(*v)),
        Scalar::Int32(v) => Value::from(i64::from(*v)),
        Scalar::Int64(v) | Scalar::Epoch(v) => Value::from(*v),
        Scalar::Float32(v) => Value::from(f64::from(*v)),
        Scalar::Float64(v) => Value::from(*v),
        Scalar::Complex32(c) => Value::Array(vec![
            Value::from(f64::from(c.re)),
            Value::from(f64::from(c.im)),
        ]),
        Scalar::Complex64(c) => Value::Array(vec![Value::from(c.re), Value::from(c.im)]),
        Scalar::Timespec(t) | Scalar::Timeval(t) => {
            Value::Array(vec![Value::from(t.seconds), Value::from(t.fraction)])
        }
        other => match other.as_str() {
            Some(text) => Value::String(text.to_string()),
            None => Value::String(format!("unsupported-by-build-{}", other.kind())),
        },
    }
}

/// Encodes one value wrapped in its `{type, value}` envelope.
pub fn envelope(value: &Scalar) -> Value {
    let mut map = Map::new();
    map.insert(TYPE_KEY.to_string(), Value::from(value.kind().name()));
    map.insert(VALUE_KEY.to_string(), encode_scalar(value));
    Value::Object(map)
}

/// Encodes an array wrapped in its `{type, container_type, value}` envelope.
pub fn encode_array(values: &ScalarArray, container: Option<&str>) -> Value {
    let mut map = Map::new();
    map.insert(TYPE_KEY.to_string(), Value::from(values.kind().array_name()));
    if let Some(container) = container {
        map.insert(CONTAINER_KEY.to_string(), Value::from(container));
    }
    map.insert(
        VALUE_KEY.to_string(),
        Value::Array(values.items().iter().map(encode_scalar).collect()),
    );
    Value::Object(map)
}

/// Decodes one stored wire entry into a [`Field`].
///
/// Envelopes decode by their tag. Bare scalars are typed by shape alone;
/// bare arrays, bare objects, and `null` decode to [`Field::none`], as does a
/// scalar envelope whose value does not match its tag. Array elements that do
/// not match the tag decode to the kind's zero sentinel instead.
pub fn decode(entry: &Value) -> Field {
    match entry {
        Value::Object(map) => match (map.get(TYPE_KEY), map.get(VALUE_KEY)) {
            (Some(Value::String(tag)), Some(value)) => {
                decode_envelope(tag, value, map.get(CONTAINER_KEY))
            }
            _ => Field::none(),
        },
        Value::Array(_) | Value::Null => Field::none(),
        Value::Bool(b) => Field::scalar(Scalar::Bool(*b)),
        Value::String(s) => Field::scalar(Scalar::Cstr(s.clone())),
        Value::Number(n) => decode_bare_number(n),
    }
}

/// Whether a wire value has the shape of a field envelope.
pub fn is_envelope(entry: &Value) -> bool {
    let Some(map) = entry.as_object() else {
        return false;
    };
    matches!(map.get(TYPE_KEY), Some(Value::String(_)))
        && map.contains_key(VALUE_KEY)
        && map
            .keys()
            .all(|k| k == TYPE_KEY || k == VALUE_KEY || k == CONTAINER_KEY)
}

fn decode_envelope(tag: &str, value: &Value, container: Option<&Value>) -> Field {
    let Some(kind) = kind_of(tag) else {
        return Field::none();
    };
    if !tag.starts_with(ARRAY_PREFIX) {
        return decode_scalar(kind, value)
            .map(Field::scalar)
            .unwrap_or_else(Field::none);
    }
    let Some(elements) = value.as_array() else {
        return Field::none();
    };
    let items = elements
        .iter()
        .map(|element| decode_scalar(kind, element).unwrap_or_else(|| Scalar::zero(kind)))
        .collect();
    let container = container.and_then(Value::as_str).map(str::to_string);
    Field::array(ScalarArray::from_decoded(kind, items), container)
}

// Integers that fit int64 read as int64; only larger ones read as uint64.
fn decode_bare_number(n: &Number) -> Field {
    if let Some(i) = n.as_i64() {
        Field::scalar(Scalar::Int64(i))
    } else if let Some(u) = n.as_u64() {
        Field::scalar(Scalar::Uint64(u))
    } else if let Some(f) = n.as_f64() {
        Field::scalar(Scalar::Float64(f))
    } else {
        Field::none()
    }
}

/// Decodes a bare wire value as `kind`, or `None` when its shape does not match.
pub fn decode_scalar(kind: ScalarKind, value: &Value) -> Option<Scalar> {
    if !kind.is_supported() {
        // only the tag survives; whatever stands in for the payload is ignored
        return Some(Scalar::zero(kind));
    }
    if kind.is_text() {
        return value.as_str().and_then(|s| Scalar::text(kind, s));
    }
    let scalar = match kind {
        ScalarKind::Bool => Scalar::Bool(value.as_bool()?),
        ScalarKind::Char8 => Scalar::Char8(i8::try_from(value.as_i64()?).ok()? as u8),
        ScalarKind::Char16 => Scalar::Char16(u16::try_from(value.as_u64()?).ok()?),
        ScalarKind::Char32 => Scalar::Char32(u32::try_from(value.as_u64()?).ok()?),
        ScalarKind::Uint8 => Scalar::Uint8(u8::try_from(value.as_u64()?).ok()?),
        ScalarKind::Uint16 => Scalar::Uint16(u16::try_from(value.as_u64()?).ok()?),
        ScalarKind::Uint32 => Scalar::Uint32(u32::try_from(value.as_u64()?).ok()?),
        ScalarKind::Uint64 => Scalar::Uint64(value.as_str()?.parse().ok()?),
        ScalarKind::Int8 => Scalar::Int8(i8::try_from(value.as_i64()?).ok()?),
        ScalarKind::Int16 => Scalar::Int16(i16::try_from(value.as_i64()?).ok()?),
        ScalarKind::Int32 => Scalar::Int32(i32::try_from(value.as_i64()?).ok()?),
        ScalarKind::Int64 => Scalar::Int64(value.as_i64()?),
        ScalarKind::Epoch => Scalar::Epoch(value.as_i64()?),
        ScalarKind::Float32 => Scalar::Float32(value.as_f64()? as f32),
        ScalarKind::Float64 => Scalar::Float64(value.as_f64()?),
        ScalarKind::Complex32 => {
            let (re, im) = double_pair(value)?;
            Scalar::Complex32(Complex::new(re as f32, im as f32))
        }
        ScalarKind::Complex64 => {
            let (re, im) = double_pair(value)?;
            Scalar::Complex64(Complex::new(re, im))
        }
        ScalarKind::Timespec => Scalar::Timespec(int_pair(value)?),
        ScalarKind::Timeval => Scalar::Timeval(int_pair(value)?),
        other => Scalar::zero(other),
    };
    Some(scalar)
}

fn double_pair(value: &Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [a, b] => Some((a.as_f64()?, b.as_f64()?)),
        _ => None,
    }
}

fn int_pair(value: &Value) -> Option<TimePair> {
    match value.as_array()?.as_slice() {
        [a, b] => Some(TimePair::new(a.as_i64()?, b.as_i64()?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::KeyKind;
    use serde_json::json;

    #[test]
    fn uint64_travels_as_decimal_text() {
        let wire = envelope(&Scalar::Uint64(u64::MAX));
        assert_eq!(wire, json!({"type": "uint64", "value": "18446744073709551615"}));
        assert_eq!(decode(&wire).get::<u64>(), Some(u64::MAX));
    }

    #[test]
    fn char8_is_a_signed_code_unit() {
        let wire = envelope(&Scalar::Char8(0xFF));
        assert_eq!(wire["value"], json!(-1));
        assert_eq!(decode(&wire).as_scalar(), Some(&Scalar::Char8(0xFF)));
    }

    #[test]
    fn unsupported_kinds_keep_only_their_tag() {
        let wire = envelope(&Scalar::Float16E8m7);
        assert_eq!(
            wire,
            json!({"type": "float16_e8m7", "value": "unsupported-by-build-float16_e8m7"})
        );
        let field = decode(&wire);
        assert_eq!(field.kind, Some(ScalarKind::Float16E8m7));
        assert_eq!(field.as_scalar(), Some(&Scalar::Float16E8m7));
    }

    #[test]
    fn malformed_scalar_envelope_is_no_field() {
        let field = decode(&json!({"type": "int32", "value": "twelve"}));
        assert_eq!(field.key, KeyKind::None);
        assert_eq!(field.kind, None);

        let out_of_range = decode(&json!({"type": "uint8", "value": 300}));
        assert!(out_of_range.is_none());

        let short_pair = decode(&json!({"type": "timespec", "value": [1]}));
        assert!(short_pair.is_none());
    }

    #[test]
    fn unknown_tag_is_no_field() {
        assert!(decode(&json!({"type": "not_a_real_kind", "value": 1})).is_none());
        assert!(decode(&json!({"type": "array_nope", "value": [1]})).is_none());
    }

    #[test]
    fn array_tag_with_non_array_value_is_no_field() {
        assert!(decode(&json!({"type": "array_int32", "value": 3})).is_none());
    }

    #[test]
    fn bare_values_are_typed_by_shape() {
        assert_eq!(decode(&json!("x")).kind, Some(ScalarKind::Cstr));
        assert_eq!(decode(&json!(true)).kind, Some(ScalarKind::Bool));
        assert_eq!(decode(&json!(-4)).get::<i64>(), Some(-4));
        assert_eq!(decode(&json!(4)).kind, Some(ScalarKind::Int64));
        assert_eq!(decode(&json!(4)).get::<i64>(), Some(4));
        assert_eq!(decode(&json!(u64::MAX)).kind, Some(ScalarKind::Uint64));
        assert_eq!(decode(&json!(u64::MAX)).get::<u64>(), Some(u64::MAX));
        assert_eq!(decode(&json!(0.25)).get::<f64>(), Some(0.25));
        assert!(decode(&json!([1, 2])).is_none());
        assert!(decode(&json!({"a": 1})).is_none());
        assert!(decode(&Value::Null).is_none());
    }

    #[test]
    fn envelope_shape_detection() {
        assert!(is_envelope(&json!({"type": "int8", "value": 1})));
        assert!(is_envelope(
            &json!({"type": "array_int8", "container_type": "set", "value": []})
        ));
        assert!(!is_envelope(&json!({"type": "int8", "value": 1, "extra": 0})));
        assert!(!is_envelope(&json!({"type": 3, "value": 1})));
        assert!(!is_envelope(&json!("int8")));
    }
}
