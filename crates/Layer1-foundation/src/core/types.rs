//! Core Types - 파라미터 값 모델
//!
//! Every bound parameter value is one variant of the closed [`ParamValue`]
//! enumeration. The variant is chosen when the value is bound, and its
//! [`ParamType`] tag is what travels on the wire.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::{Error, Result};

// ============================================================================
// ParamType - 타입 태그
// ============================================================================

/// Payload-free type tag of a [`ParamValue`].
///
/// The numeric codes are part of the binary key layout and must never be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Null,
    String,
    Integer,
    Numeric,
    Boolean,
    Date,
    Array,
    Opaque,
}

impl ParamType {
    pub const ALL: [ParamType; 8] = [
        ParamType::Null,
        ParamType::String,
        ParamType::Integer,
        ParamType::Numeric,
        ParamType::Boolean,
        ParamType::Date,
        ParamType::Array,
        ParamType::Opaque,
    ];

    /// Wire code
    pub fn code(self) -> u8 {
        match self {
            ParamType::Null => 0,
            ParamType::String => 1,
            ParamType::Integer => 2,
            ParamType::Numeric => 3,
            ParamType::Boolean => 4,
            ParamType::Date => 5,
            ParamType::Array => 6,
            ParamType::Opaque => 7,
        }
    }

    /// Inverse of [`ParamType::code`]; unknown codes fail with `UnknownType`.
    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or(Error::UnknownType(code))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Null => "null",
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Numeric => "numeric",
            ParamType::Boolean => "boolean",
            ParamType::Date => "date",
            ParamType::Array => "array",
            ParamType::Opaque => "opaque",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ParamValue - 파라미터 값
// ============================================================================

/// A bound parameter value.
///
/// Equality is exact over type and value. `Numeric` compares by bit pattern,
/// except that every NaN is the same value, so `0.0 != -0.0` and
/// `NaN == NaN`. `Date` holds UTC epoch milliseconds.
#[derive(Debug, Clone, Default)]
pub enum ParamValue {
    #[default]
    Null,
    String(String),
    Integer(i64),
    Numeric(f64),
    Boolean(bool),
    Date(i64),
    Array(Vec<ParamValue>),
    Opaque(Vec<u8>),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Null => ParamType::Null,
            ParamValue::String(_) => ParamType::String,
            ParamValue::Integer(_) => ParamType::Integer,
            ParamValue::Numeric(_) => ParamType::Numeric,
            ParamValue::Boolean(_) => ParamType::Boolean,
            ParamValue::Date(_) => ParamType::Date,
            ParamValue::Array(_) => ParamType::Array,
            ParamValue::Opaque(_) => ParamType::Opaque,
        }
    }

    /// Empty value of the given type, filled in by the decoder
    pub fn empty_of(param_type: ParamType) -> Self {
        match param_type {
            ParamType::Null => ParamValue::Null,
            ParamType::String => ParamValue::String(String::new()),
            ParamType::Integer => ParamValue::Integer(0),
            ParamType::Numeric => ParamValue::Numeric(0.0),
            ParamType::Boolean => ParamValue::Boolean(false),
            ParamType::Date => ParamValue::Date(0),
            ParamType::Array => ParamValue::Array(Vec::new()),
            ParamType::Opaque => ParamValue::Opaque(Vec::new()),
        }
    }

    pub fn date(instant: DateTime<Utc>) -> Self {
        ParamValue::Date(instant.timestamp_millis())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            ParamValue::Date(millis) => Utc.timestamp_millis_opt(*millis).single(),
            _ => None,
        }
    }

    /// Bit pattern used for equality, hashing and the wire form
    pub fn numeric_bits(value: f64) -> u64 {
        if value.is_nan() {
            f64::NAN.to_bits()
        } else {
            value.to_bits()
        }
    }

    /// Deepest array nesting inside this value (scalars are depth 0)
    pub fn depth(&self) -> usize {
        match self {
            ParamValue::Array(items) => 1 + items.iter().map(ParamValue::depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        use ParamValue::*;

        match (self, other) {
            (Null, Null) => true,
            (String(a), String(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Numeric(a), Numeric(b)) => Self::numeric_bits(*a) == Self::numeric_bits(*b),
            (Boolean(a), Boolean(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Opaque(a), Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ParamValue {}

impl Hash for ParamValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use ParamValue::*;

        state.write_u8(self.param_type().code());

        match self {
            Null => {}
            String(s) => s.hash(state),
            Integer(i) => i.hash(state),
            Numeric(f) => Self::numeric_bits(*f).hash(state),
            Boolean(b) => b.hash(state),
            Date(millis) => millis.hash(state),
            Array(items) => {
                state.write_usize(items.len());
                for item in items {
                    item.hash(state);
                }
            }
            Opaque(bytes) => bytes.hash(state),
        }
    }
}

// ============================================================================
// From 구현
// ============================================================================

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Integer(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        ParamValue::Integer(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Numeric(f)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(instant: DateTime<Utc>) -> Self {
        ParamValue::date(instant)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        ParamValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

// ============================================================================
// Parameter - 이름 + 타입 + 값
// ============================================================================

/// One named parameter of a canonical parameter sequence.
///
/// The type is always derived from the value, so a `Parameter` can never
/// carry a tag that disagrees with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    value: ParamValue,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> ParamType {
        self.value.param_type()
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn into_parts(self) -> (String, ParamValue) {
        (self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_type_codes_round_trip() {
        for t in ParamType::ALL {
            assert_eq!(ParamType::from_code(t.code()).unwrap(), t);
        }
        assert!(matches!(ParamType::from_code(8), Err(Error::UnknownType(8))));
    }

    #[test]
    fn test_equality_is_exact_over_type() {
        assert_ne!(ParamValue::Integer(1), ParamValue::Numeric(1.0));
        assert_ne!(ParamValue::from("1"), ParamValue::Integer(1));
        assert_ne!(ParamValue::Date(0), ParamValue::Integer(0));
        assert_ne!(ParamValue::Null, ParamValue::from(""));
    }

    #[test]
    fn test_numeric_nan_and_signed_zero() {
        let nan_a = ParamValue::Numeric(f64::NAN);
        let nan_b = ParamValue::Numeric(-f64::NAN);
        assert_eq!(nan_a, nan_b);
        assert_eq!(hash_of(&nan_a), hash_of(&nan_b));

        assert_ne!(ParamValue::Numeric(0.0), ParamValue::Numeric(-0.0));
    }

    #[test]
    fn test_array_hash_matches_equality() {
        let a = ParamValue::from(vec![1i64, 2, 3]);
        let b = ParamValue::Array(vec![
            ParamValue::Integer(1),
            ParamValue::Integer(2),
            ParamValue::Integer(3),
        ]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_date_millis() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let value = ParamValue::from(instant);
        assert_eq!(value.param_type(), ParamType::Date);
        assert_eq!(value.as_datetime(), Some(instant));
    }

    #[test]
    fn test_depth() {
        assert_eq!(ParamValue::Integer(1).depth(), 0);
        assert_eq!(ParamValue::from(vec![1i64]).depth(), 1);
        let nested = ParamValue::Array(vec![ParamValue::from(vec![true]), ParamValue::Null]);
        assert_eq!(nested.depth(), 2);
    }

    #[test]
    fn test_parameter_type_follows_value() {
        let param = Parameter::new("ids", vec!["a", "b"]);
        assert_eq!(param.param_type(), ParamType::Array);
        assert_eq!(Parameter::new("x", None::<i64>).param_type(), ParamType::Null);
    }
}
