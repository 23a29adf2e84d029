use crate::kind::ScalarKind;
use crate::value::{FromScalar, Scalar, ScalarArray};

/// What a name denotes inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// The name is not present (or its value could not be decoded).
    None,
    /// The name denotes a child section; use the section accessors.
    Section,
    /// The name denotes a scalar or array value.
    Value,
}

/// Decoded payload of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A single value.
    Scalar(Scalar),
    /// A homogeneous array.
    Array(ScalarArray),
}

/// Result of looking a name up in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// What the name denotes.
    pub key: KeyKind,
    /// Kind of the value as published; `None` unless `key` is [`KeyKind::Value`].
    pub kind: Option<ScalarKind>,
    /// Number of elements: 1 for scalars, the wire array length for arrays.
    pub count: usize,
    /// Container hint recorded with an array, if any.
    pub container: Option<String>,
    /// Decoded payload.
    pub data: Option<Payload>,
}

impl Field {
    /// A lookup that found nothing usable.
    pub fn none() -> Self {
        Self {
            key: KeyKind::None,
            kind: None,
            count: 0,
            container: None,
            data: None,
        }
    }

    /// A lookup that found a child section.
    pub fn section() -> Self {
        Self {
            key: KeyKind::Section,
            ..Self::none()
        }
    }

    /// A decoded single value.
    pub fn scalar(value: Scalar) -> Self {
        Self {
            key: KeyKind::Value,
            kind: Some(value.kind()),
            count: 1,
            container: None,
            data: Some(Payload::Scalar(value)),
        }
    }

    /// A decoded array.
    pub fn array(values: ScalarArray, container: Option<String>) -> Self {
        Self {
            key: KeyKind::Value,
            kind: Some(values.kind()),
            count: values.len(),
            container,
            data: Some(Payload::Array(values)),
        }
    }

    /// Whether the lookup found nothing usable.
    pub fn is_none(&self) -> bool {
        self.key == KeyKind::None
    }

    /// Whether the value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self.data, Some(Payload::Array(_)))
    }

    /// The single value, if this field holds one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.data {
            Some(Payload::Scalar(s)) => Some(s),
            _ => None,
        }
    }

    /// The array, if this field holds one.
    pub fn as_array(&self) -> Option<&ScalarArray> {
        match &self.data {
            Some(Payload::Array(a)) => Some(a),
            _ => None,
        }
    }

    /// The single value converted to `T`.
    pub fn get<T: FromScalar>(&self) -> Option<T> {
        self.as_scalar().and_then(T::from_scalar)
    }

    /// The array elements converted to `T`.
    pub fn get_array<T: FromScalar>(&self) -> Option<Vec<T>> {
        self.as_array().and_then(|array| array.to_vec())
    }
}
