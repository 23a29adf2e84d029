use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::KindMismatch;
use crate::kind::ScalarKind;

/// A complex number stored as `(re, im)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<T> {
    /// Real part.
    pub re: T,
    /// Imaginary part.
    pub im: T,
}

impl<T> Complex<T> {
    /// Creates a complex number from its parts.
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

/// A `(seconds, subseconds)` pair, as produced by `clock_gettime` (nanoseconds)
/// or `gettimeofday` (microseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimePair {
    /// Whole seconds.
    pub seconds: i64,
    /// Sub-second count; its unit depends on the tagging kind.
    pub fraction: i64,
}

impl TimePair {
    /// Creates a pair from its parts.
    pub const fn new(seconds: i64, fraction: i64) -> Self {
        Self { seconds, fraction }
    }

    /// `(seconds, nanoseconds)` for a duration since the epoch.
    pub fn nanos_of(elapsed: Duration) -> Self {
        Self::new(
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            i64::from(elapsed.subsec_nanos()),
        )
    }

    /// `(seconds, microseconds)` for a duration since the epoch.
    pub fn micros_of(elapsed: Duration) -> Self {
        Self::new(
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            i64::from(elapsed.subsec_micros()),
        )
    }

    /// Current wall-clock time as a timespec pair.
    pub fn timespec_now() -> Self {
        Self::nanos_of(since_epoch())
    }

    /// Current wall-clock time as a timeval pair.
    pub fn timeval_now() -> Self {
        Self::micros_of(since_epoch())
    }
}

fn since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// One typed scalar value: one arm per [`ScalarKind`].
///
/// Kinds this build cannot represent carry no payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Boolean.
    Bool(bool),
    /// 8-bit code unit.
    Char8(u8),
    /// 16-bit code unit.
    Char16(u16),
    /// 32-bit code point (not necessarily a valid `char`).
    Char32(u32),
    /// Plain text.
    Cstr(String),
    /// Serialized JSON text.
    JsonStr(String),
    /// YAML text.
    YamlStr(String),
    /// XML text.
    XmlStr(String),
    /// JSON value as serialized text.
    Json(String),
    /// File-system path.
    Path(String),
    /// Arbitrary precision decimal text.
    NumberStr(String),
    /// `u8`.
    Uint8(u8),
    /// `u16`.
    Uint16(u16),
    /// `u32`.
    Uint32(u32),
    /// `u64`.
    Uint64(u64),
    /// `i8`.
    Int8(i8),
    /// `i16`.
    Int16(i16),
    /// `i32`.
    Int32(i32),
    /// `i64`.
    Int64(i64),
    /// `f32`.
    Float32(f32),
    /// `f64`.
    Float64(f64),
    /// Extended float; no payload in this build.
    FloatExtended,
    /// Quad float; no payload in this build.
    FloatQuad,
    /// 8-bit e4m3 float; no payload in this build.
    Float8E4m3,
    /// 8-bit e5m2 float; no payload in this build.
    Float8E5m2,
    /// 16-bit half float; no payload in this build.
    Float16E5m10,
    /// 16-bit brain float; no payload in this build.
    Float16E8m7,
    /// Complex `f32`.
    Complex32(Complex<f32>),
    /// Complex `f64`.
    Complex64(Complex<f64>),
    /// Complex extended; no payload in this build.
    ComplexExtended,
    /// Complex quad; no payload in this build.
    ComplexQuad,
    /// `(seconds, nanoseconds)`.
    Timespec(TimePair),
    /// `(seconds, microseconds)`.
    Timeval(TimePair),
    /// Seconds since the UNIX epoch.
    Epoch(i64),
}

impl Scalar {
    /// Kind tag of this value.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Char8(_) => ScalarKind::Char8,
            Scalar::Char16(_) => ScalarKind::Char16,
            Scalar::Char32(_) => ScalarKind::Char32,
            Scalar::Cstr(_) => ScalarKind::Cstr,
            Scalar::JsonStr(_) => ScalarKind::JsonStr,
            Scalar::YamlStr(_) => ScalarKind::YamlStr,
            Scalar::XmlStr(_) => ScalarKind::XmlStr,
            Scalar::Json(_) => ScalarKind::Json,
            Scalar::Path(_) => ScalarKind::Path,
            Scalar::NumberStr(_) => ScalarKind::NumberStr,
            Scalar::Uint8(_) => ScalarKind::Uint8,
            Scalar::Uint16(_) => ScalarKind::Uint16,
            Scalar::Uint32(_) => ScalarKind::Uint32,
            Scalar::Uint64(_) => ScalarKind::Uint64,
            Scalar::Int8(_) => ScalarKind::Int8,
            Scalar::Int16(_) => ScalarKind::Int16,
            Scalar::Int32(_) => ScalarKind::Int32,
            Scalar::Int64(_) => ScalarKind::Int64,
            Scalar::Float32(_) => ScalarKind::Float32,
            Scalar::Float64(_) => ScalarKind::Float64,
            Scalar::FloatExtended => ScalarKind::FloatExtended,
            Scalar::FloatQuad => ScalarKind::FloatQuad,
            Scalar::Float8E4m3 => ScalarKind::Float8E4m3,
            Scalar::Float8E5m2 => ScalarKind::Float8E5m2,
            Scalar::Float16E5m10 => ScalarKind::Float16E5m10,
            Scalar::Float16E8m7 => ScalarKind::Float16E8m7,
            Scalar::Complex32(_) => ScalarKind::Complex32,
            Scalar::Complex64(_) => ScalarKind::Complex64,
            Scalar::ComplexExtended => ScalarKind::ComplexExtended,
            Scalar::ComplexQuad => ScalarKind::ComplexQuad,
            Scalar::Timespec(_) => ScalarKind::Timespec,
            Scalar::Timeval(_) => ScalarKind::Timeval,
            Scalar::Epoch(_) => ScalarKind::Epoch,
        }
    }

    /// The zero/false/empty sentinel for a kind.
    pub fn zero(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Scalar::Bool(false),
            ScalarKind::Char8 => Scalar::Char8(0),
            ScalarKind::Char16 => Scalar::Char16(0),
            ScalarKind::Char32 => Scalar::Char32(0),
            ScalarKind::Uint8 => Scalar::Uint8(0),
            ScalarKind::Uint16 => Scalar::Uint16(0),
            ScalarKind::Uint32 => Scalar::Uint32(0),
            ScalarKind::Uint64 => Scalar::Uint64(0),
            ScalarKind::Int8 => Scalar::Int8(0),
            ScalarKind::Int16 => Scalar::Int16(0),
            ScalarKind::Int32 => Scalar::Int32(0),
            ScalarKind::Int64 => Scalar::Int64(0),
            ScalarKind::Float32 => Scalar::Float32(0.0),
            ScalarKind::Float64 => Scalar::Float64(0.0),
            ScalarKind::Complex32 => Scalar::Complex32(Complex::default()),
            ScalarKind::Complex64 => Scalar::Complex64(Complex::default()),
            ScalarKind::Timespec => Scalar::Timespec(TimePair::default()),
            ScalarKind::Timeval => Scalar::Timeval(TimePair::default()),
            ScalarKind::Epoch => Scalar::Epoch(0),
            ScalarKind::FloatExtended => Scalar::FloatExtended,
            ScalarKind::FloatQuad => Scalar::FloatQuad,
            ScalarKind::Float8E4m3 => Scalar::Float8E4m3,
            ScalarKind::Float8E5m2 => Scalar::Float8E5m2,
            ScalarKind::Float16E5m10 => Scalar::Float16E5m10,
            ScalarKind::Float16E8m7 => Scalar::Float16E8m7,
            ScalarKind::ComplexExtended => Scalar::ComplexExtended,
            ScalarKind::ComplexQuad => Scalar::ComplexQuad,
            text => Scalar::text(text, String::new()).unwrap_or(Scalar::Cstr(String::new())),
        }
    }

    /// Wraps a string in the arm for a string-flavored kind.
    ///
    /// Returns `None` when `kind` is not one of the text kinds.
    pub fn text(kind: ScalarKind, value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let scalar = match kind {
            ScalarKind::Cstr => Scalar::Cstr(value),
            ScalarKind::JsonStr => Scalar::JsonStr(value),
            ScalarKind::YamlStr => Scalar::YamlStr(value),
            ScalarKind::XmlStr => Scalar::XmlStr(value),
            ScalarKind::Json => Scalar::Json(value),
            ScalarKind::Path => Scalar::Path(value),
            ScalarKind::NumberStr => Scalar::NumberStr(value),
            _ => return None,
        };
        Some(scalar)
    }

    /// Borrowed text of a string-flavored value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Cstr(s)
            | Scalar::JsonStr(s)
            | Scalar::YamlStr(s)
            | Scalar::XmlStr(s)
            | Scalar::Json(s)
            | Scalar::Path(s)
            | Scalar::NumberStr(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Char8(c) => write!(f, "{}", char::from(*c)),
            Scalar::Char16(c) => write!(f, "{c}"),
            Scalar::Char32(c) => write!(f, "{c}"),
            Scalar::Uint8(v) => write!(f, "{v}"),
            Scalar::Uint16(v) => write!(f, "{v}"),
            Scalar::Uint32(v) => write!(f, "{v}"),
            Scalar::Uint64(v) => write!(f, "{v}"),
            Scalar::Int8(v) => write!(f, "{v}"),
            Scalar::Int16(v) => write!(f, "{v}"),
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::Int64(v) | Scalar::Epoch(v) => write!(f, "{v}"),
            Scalar::Float32(v) => write!(f, "{v}"),
            Scalar::Float64(v) => write!(f, "{v}"),
            Scalar::Complex32(c) => write!(f, "{},i{}", c.re, c.im),
            Scalar::Complex64(c) => write!(f, "{},i{}", c.re, c.im),
            Scalar::Timespec(t) | Scalar::Timeval(t) => write!(f, "{},{}", t.seconds, t.fraction),
            other => match other.as_str() {
                Some(text) => f.write_str(text),
                None => write!(f, "unsupported-by-build-{}", other.kind()),
            },
        }
    }
}

/// A homogeneous array of scalars of one declared kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarArray {
    kind: ScalarKind,
    items: Vec<Scalar>,
}

impl ScalarArray {
    /// An empty array of `kind`.
    pub fn empty(kind: ScalarKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    /// Builds an array from native values; the kind follows `T`.
    pub fn from_values<T, I>(values: I) -> Self
    where
        T: IntoScalar,
        I: IntoIterator<Item = T>,
    {
        Self {
            kind: T::KIND,
            items: values.into_iter().map(IntoScalar::into_scalar).collect(),
        }
    }

    /// Builds an array of one string flavor.
    ///
    /// # Errors
    ///
    /// Returns [`KindMismatch`] when `kind` is not a string-flavored kind.
    pub fn text<I, S>(kind: ScalarKind, values: I) -> Result<Self, KindMismatch>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !kind.is_text() {
            return Err(KindMismatch {
                expected: kind,
                found: ScalarKind::Cstr,
            });
        }
        let items = values
            .into_iter()
            .filter_map(|s| Scalar::text(kind, s))
            .collect();
        Ok(Self { kind, items })
    }

    /// Builds a `char8` array from raw bytes; embedded NULs are kept.
    pub fn chars8(bytes: &[u8]) -> Self {
        Self {
            kind: ScalarKind::Char8,
            items: bytes.iter().copied().map(Scalar::Char8).collect(),
        }
    }

    /// Builds an array from already-tagged scalars.
    ///
    /// # Errors
    ///
    /// Returns [`KindMismatch`] for the first element whose kind differs from `kind`.
    pub fn from_scalars(kind: ScalarKind, items: Vec<Scalar>) -> Result<Self, KindMismatch> {
        if let Some(bad) = items.iter().find(|item| item.kind() != kind) {
            return Err(KindMismatch {
                expected: kind,
                found: bad.kind(),
            });
        }
        Ok(Self { kind, items })
    }

    /// Assembles an array whose elements the codec already produced for `kind`.
    pub(crate) fn from_decoded(kind: ScalarKind, items: Vec<Scalar>) -> Self {
        Self { kind, items }
    }

    /// Declared element kind.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The elements.
    pub fn items(&self) -> &[Scalar] {
        &self.items
    }

    /// Converts every element to `T`, or `None` if any element does not convert.
    pub fn to_vec<T: FromScalar>(&self) -> Option<Vec<T>> {
        self.items.iter().map(T::from_scalar).collect()
    }
}

impl fmt::Display for ScalarArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}

/// Native types that encode to exactly one [`ScalarKind`].
pub trait IntoScalar {
    /// Kind tag the value is stored under.
    const KIND: ScalarKind;

    /// Wraps the value in its [`Scalar`] arm.
    fn into_scalar(self) -> Scalar;
}

/// Native types that can be read back out of a [`Scalar`].
pub trait FromScalar: Sized {
    /// Extracts the value, or `None` when the arm does not hold a `Self`.
    fn from_scalar(scalar: &Scalar) -> Option<Self>;
}

macro_rules! native_scalar {
    ($ty:ty, $variant:ident $(, $alias:ident)*) => {
        impl IntoScalar for $ty {
            const KIND: ScalarKind = ScalarKind::$variant;

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }
        }

        impl FromScalar for $ty {
            fn from_scalar(scalar: &Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(v) $(| Scalar::$alias(v))* => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

native_scalar!(bool, Bool);
native_scalar!(u8, Uint8, Char8);
native_scalar!(u16, Uint16, Char16);
native_scalar!(u32, Uint32, Char32);
native_scalar!(u64, Uint64);
native_scalar!(i8, Int8);
native_scalar!(i16, Int16);
native_scalar!(i32, Int32);
native_scalar!(i64, Int64, Epoch);
native_scalar!(f32, Float32);
native_scalar!(f64, Float64);
native_scalar!(Complex<f32>, Complex32);
native_scalar!(Complex<f64>, Complex64);

impl IntoScalar for char {
    const KIND: ScalarKind = ScalarKind::Char32;

    fn into_scalar(self) -> Scalar {
        Scalar::Char32(u32::from(self))
    }
}

impl FromScalar for char {
    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Char8(c) => Some(char::from(*c)),
            Scalar::Char16(c) => char::from_u32(u32::from(*c)),
            Scalar::Char32(c) => char::from_u32(*c),
            _ => None,
        }
    }
}

impl IntoScalar for String {
    const KIND: ScalarKind = ScalarKind::Cstr;

    fn into_scalar(self) -> Scalar {
        Scalar::Cstr(self)
    }
}

impl IntoScalar for &str {
    const KIND: ScalarKind = ScalarKind::Cstr;

    fn into_scalar(self) -> Scalar {
        Scalar::Cstr(self.to_string())
    }
}

impl IntoScalar for &String {
    const KIND: ScalarKind = ScalarKind::Cstr;

    fn into_scalar(self) -> Scalar {
        Scalar::Cstr(self.clone())
    }
}

impl FromScalar for String {
    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        scalar.as_str().map(str::to_string)
    }
}

impl FromScalar for TimePair {
    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Timespec(t) | Scalar::Timeval(t) => Some(*t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinels_keep_their_kind() {
        for kind in ScalarKind::ALL {
            assert_eq!(Scalar::zero(kind).kind(), kind);
        }
    }

    #[test]
    fn from_scalars_rejects_mixed_kinds() {
        let err = ScalarArray::from_scalars(
            ScalarKind::Int32,
            vec![Scalar::Int32(1), Scalar::Int64(2)],
        )
        .unwrap_err();
        assert_eq!(err.expected, ScalarKind::Int32);
        assert_eq!(err.found, ScalarKind::Int64);
    }

    #[test]
    fn text_arrays_require_a_text_kind() {
        assert!(ScalarArray::text(ScalarKind::Float64, ["a"]).is_err());
        let paths = ScalarArray::text(ScalarKind::Path, ["/tmp", "/var"]).unwrap();
        assert_eq!(paths.kind(), ScalarKind::Path);
        assert_eq!(paths.to_vec::<String>().unwrap(), vec!["/tmp", "/var"]);
    }

    #[test]
    fn display_renders_diagnostic_text() {
        assert_eq!(Scalar::Complex64(Complex::new(1.5, -2.0)).to_string(), "1.5,i-2");
        assert_eq!(Scalar::Timeval(TimePair::new(10, 20)).to_string(), "10,20");
        assert_eq!(Scalar::Char8(b'A').to_string(), "A");
        assert_eq!(Scalar::FloatQuad.to_string(), "unsupported-by-build-float_quad");
        assert_eq!(ScalarArray::from_values([1u8, 2, 3]).to_string(), "[1, 2, 3]");
    }

    #[test]
    fn char_accessors_widen_code_units() {
        assert_eq!(char::from_scalar(&Scalar::Char16(0xA2)), Some('¢'));
        assert_eq!(char::from_scalar(&'猫'.into_scalar()), Some('猫'));
        assert_eq!(char::from_scalar(&Scalar::Char32(0xD800)), None);
    }
}
