use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownKind;

/// Name reported for a missing or unrecognized kind.
pub const UNKNOWN_KIND_NAME: &str = "unknown";

/// JSON representation class used on the wire for one element of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireClass {
    /// JSON `null`.
    Null,
    /// JSON `true`/`false`.
    Bool,
    /// JSON integer in the signed 64-bit range.
    Int64,
    /// JSON integer in the unsigned 64-bit range.
    Uint64,
    /// JSON floating point number.
    Double,
    /// JSON string.
    String,
}

/// Closed taxonomy of scalar value types understood by ADC documents.
///
/// The serde name of each variant is its canonical wire name, the same string
/// [`ScalarKind::name`] returns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// Boolean.
    Bool,
    /// 8-bit character code unit.
    Char8,
    /// 16-bit character code unit.
    Char16,
    /// 32-bit character code point.
    Char32,
    /// Plain text string.
    Cstr,
    /// String holding serialized JSON.
    JsonStr,
    /// String holding YAML.
    YamlStr,
    /// String holding XML.
    XmlStr,
    /// JSON value carried as its serialized text.
    Json,
    /// String naming a file-system path.
    Path,
    /// String holding an exact decimal number of arbitrary precision.
    NumberStr,
    /// `u8`.
    Uint8,
    /// `u16`.
    Uint16,
    /// `u32`.
    Uint32,
    /// `u64`, carried on the wire as a decimal string.
    Uint64,
    /// `i8`.
    Int8,
    /// `i16`.
    Int16,
    /// `i32`.
    Int32,
    /// `i64`.
    Int64,
    /// 32-bit IEEE float.
    Float32,
    /// 64-bit IEEE float.
    Float64,
    /// 80-bit extended float.
    FloatExtended,
    /// 128-bit quad float.
    FloatQuad,
    /// 8-bit float, 4 exponent and 3 mantissa bits.
    Float8E4m3,
    /// 8-bit float, 5 exponent and 2 mantissa bits.
    Float8E5m2,
    /// 16-bit half float, 5 exponent and 10 mantissa bits.
    Float16E5m10,
    /// 16-bit brain float, 8 exponent and 7 mantissa bits.
    Float16E8m7,
    /// Complex of two `f32`.
    Complex32,
    /// Complex of two `f64`.
    Complex64,
    /// Complex of two extended floats.
    ComplexExtended,
    /// Complex of two quad floats.
    ComplexQuad,
    /// `(seconds, nanoseconds)` pair.
    Timespec,
    /// `(seconds, microseconds)` pair.
    Timeval,
    /// Seconds since the UNIX epoch.
    Epoch,
}

impl ScalarKind {
    /// Every kind, in declaration order.
    pub const ALL: [ScalarKind; 34] = [
        ScalarKind::Bool,
        ScalarKind::Char8,
        ScalarKind::Char16,
        ScalarKind::Char32,
        ScalarKind::Cstr,
        ScalarKind::JsonStr,
        ScalarKind::YamlStr,
        ScalarKind::XmlStr,
        ScalarKind::Json,
        ScalarKind::Path,
        ScalarKind::NumberStr,
        ScalarKind::Uint8,
        ScalarKind::Uint16,
        ScalarKind::Uint32,
        ScalarKind::Uint64,
        ScalarKind::Int8,
        ScalarKind::Int16,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::Float32,
        ScalarKind::Float64,
        ScalarKind::FloatExtended,
        ScalarKind::FloatQuad,
        ScalarKind::Float8E4m3,
        ScalarKind::Float8E5m2,
        ScalarKind::Float16E5m10,
        ScalarKind::Float16E8m7,
        ScalarKind::Complex32,
        ScalarKind::Complex64,
        ScalarKind::ComplexExtended,
        ScalarKind::ComplexQuad,
        ScalarKind::Timespec,
        ScalarKind::Timeval,
        ScalarKind::Epoch,
    ];

    /// Canonical wire name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Char8 => "char8",
            ScalarKind::Char16 => "char16",
            ScalarKind::Char32 => "char32",
            ScalarKind::Cstr => "cstr",
            ScalarKind::JsonStr => "json_str",
            ScalarKind::YamlStr => "yaml_str",
            ScalarKind::XmlStr => "xml_str",
            ScalarKind::Json => "json",
            ScalarKind::Path => "path",
            ScalarKind::NumberStr => "number_str",
            ScalarKind::Uint8 => "uint8",
            ScalarKind::Uint16 => "uint16",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::FloatExtended => "float_extended",
            ScalarKind::FloatQuad => "float_quad",
            ScalarKind::Float8E4m3 => "float8_e4m3",
            ScalarKind::Float8E5m2 => "float8_e5m2",
            ScalarKind::Float16E5m10 => "float16_e5m10",
            ScalarKind::Float16E8m7 => "float16_e8m7",
            ScalarKind::Complex32 => "complex32",
            ScalarKind::Complex64 => "complex64",
            ScalarKind::ComplexExtended => "complex_extended",
            ScalarKind::ComplexQuad => "complex_quad",
            ScalarKind::Timespec => "timespec",
            ScalarKind::Timeval => "timeval",
            ScalarKind::Epoch => "epoch",
        }
    }

    /// Looks up a kind by wire name, ignoring a leading `array_`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix(crate::codec::ARRAY_PREFIX).unwrap_or(name);
        let kind = match name {
            "bool" => ScalarKind::Bool,
            "char8" => ScalarKind::Char8,
            "char16" => ScalarKind::Char16,
            "char32" => ScalarKind::Char32,
            "cstr" => ScalarKind::Cstr,
            "json_str" => ScalarKind::JsonStr,
            "yaml_str" => ScalarKind::YamlStr,
            "xml_str" => ScalarKind::XmlStr,
            "json" => ScalarKind::Json,
            "path" => ScalarKind::Path,
            "number_str" => ScalarKind::NumberStr,
            "uint8" => ScalarKind::Uint8,
            "uint16" => ScalarKind::Uint16,
            "uint32" => ScalarKind::Uint32,
            "uint64" => ScalarKind::Uint64,
            "int8" => ScalarKind::Int8,
            "int16" => ScalarKind::Int16,
            "int32" => ScalarKind::Int32,
            "int64" => ScalarKind::Int64,
            "float32" => ScalarKind::Float32,
            "float64" => ScalarKind::Float64,
            "float_extended" => ScalarKind::FloatExtended,
            "float_quad" => ScalarKind::FloatQuad,
            "float8_e4m3" => ScalarKind::Float8E4m3,
            "float8_e5m2" => ScalarKind::Float8E5m2,
            "float16_e5m10" => ScalarKind::Float16E5m10,
            "float16_e8m7" => ScalarKind::Float16E8m7,
            "complex32" => ScalarKind::Complex32,
            "complex64" => ScalarKind::Complex64,
            "complex_extended" => ScalarKind::ComplexExtended,
            "complex_quad" => ScalarKind::ComplexQuad,
            "timespec" => ScalarKind::Timespec,
            "timeval" => ScalarKind::Timeval,
            "epoch" => ScalarKind::Epoch,
            _ => return None,
        };
        Some(kind)
    }

    /// Wire name used when the kind tags an array (`array_<name>`).
    pub fn array_name(self) -> String {
        format!("{}{}", crate::codec::ARRAY_PREFIX, self.name())
    }

    /// Whether payloads of this kind can be represented in this build.
    ///
    /// Extended, quad, and mini-float families have no native Rust type; their
    /// tags round-trip but their values are replaced by a diagnostic string.
    pub const fn is_supported(self) -> bool {
        !matches!(
            self,
            ScalarKind::FloatExtended
                | ScalarKind::FloatQuad
                | ScalarKind::Float8E4m3
                | ScalarKind::Float8E5m2
                | ScalarKind::Float16E5m10
                | ScalarKind::Float16E8m7
                | ScalarKind::ComplexExtended
                | ScalarKind::ComplexQuad
        )
    }

    /// Whether the kind is one of the opaque string flavors.
    pub const fn is_text(self) -> bool {
        matches!(
            self,
            ScalarKind::Cstr
                | ScalarKind::JsonStr
                | ScalarKind::YamlStr
                | ScalarKind::XmlStr
                | ScalarKind::Json
                | ScalarKind::Path
                | ScalarKind::NumberStr
        )
    }

    /// Whether one element is carried on the wire as a two-element array.
    pub const fn is_pair(self) -> bool {
        matches!(
            self,
            ScalarKind::Complex32
                | ScalarKind::Complex64
                | ScalarKind::Timespec
                | ScalarKind::Timeval
        )
    }

    /// Wire class of one element (of each half, for pair kinds).
    pub const fn wire_class(self) -> WireClass {
        if !self.is_supported() || self.is_text() {
            return WireClass::String;
        }
        match self {
            ScalarKind::Bool => WireClass::Bool,
            ScalarKind::Char8
            | ScalarKind::Int8
            | ScalarKind::Int16
            | ScalarKind::Int32
            | ScalarKind::Int64
            | ScalarKind::Timespec
            | ScalarKind::Timeval
            | ScalarKind::Epoch => WireClass::Int64,
            ScalarKind::Char16
            | ScalarKind::Char32
            | ScalarKind::Uint8
            | ScalarKind::Uint16
            | ScalarKind::Uint32 => WireClass::Uint64,
            ScalarKind::Uint64 => WireClass::String,
            ScalarKind::Float32
            | ScalarKind::Float64
            | ScalarKind::Complex32
            | ScalarKind::Complex64 => WireClass::Double,
            _ => WireClass::Null,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarKind::from_name(s).ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Name of a possibly-missing kind; `None` maps to [`UNKNOWN_KIND_NAME`].
pub fn name_of(kind: Option<ScalarKind>) -> &'static str {
    kind.map(ScalarKind::name).unwrap_or(UNKNOWN_KIND_NAME)
}

/// Kind for a wire name (with or without the `array_` prefix), if any.
pub fn kind_of(name: &str) -> Option<ScalarKind> {
    ScalarKind::from_name(name)
}
