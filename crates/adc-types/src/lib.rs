//! Scalar type taxonomy and wire codec for ADC telemetry documents.
//!
//! Every value stored in a document carries a [`ScalarKind`] tag so that bit
//! precision and the flavor of a string (path, json, yaml, …) survive a trip
//! through JSON. This crate owns the tag table, the value types, and the
//! encode/decode rules between them and the wire form.
//!
#![deny(missing_docs)]

/// Wire envelope encode/decode rules.
pub mod codec;
/// Error types for kind lookup and array assembly.
pub mod error;
/// Decoded field descriptions returned by document lookups.
pub mod field;
/// The scalar kind taxonomy and its name table.
pub mod kind;
/// Scalar and array value types.
pub mod value;

pub use codec::{
    decode, decode_scalar, encode_array, encode_scalar, envelope, is_envelope, ARRAY_PREFIX,
};
pub use error::{KindMismatch, UnknownKind};
pub use field::{Field, KeyKind, Payload};
pub use kind::{kind_of, name_of, ScalarKind, WireClass, UNKNOWN_KIND_NAME};
pub use value::{Complex, FromScalar, IntoScalar, Scalar, ScalarArray, TimePair};
