//! Literal values and field references used on the right-hand side of
//! comparisons and update operations.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::fmt;

use crate::error::{Error, Result};
use crate::json::non_finite_error;

/// Date format understood by the data service, e.g. `20170102T13:14:15.123+0000`
pub const DATE_FORMAT: &str = "%Y%m%dT%H:%M:%S%.3f%z";

/// A constant value in a query or update expression
#[derive(Debug, Clone)]
pub enum Literal {
    Int(i64),
    String(String),
    Double(f64),
    Bool(bool),
    Date(DateTime<FixedOffset>),
    /// Already-encoded JSON, emitted verbatim
    RawJson(Box<RawValue>),
    Null,
}

impl Literal {
    pub fn int(n: i64) -> Self {
        Self::Int(n)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// NaN and infinities have no JSON form; encoding a request that holds
    /// one fails with [`Error::Encoding`].
    pub fn double(n: f64) -> Self {
        Self::Double(n)
    }

    pub fn bool(v: bool) -> Self {
        Self::Bool(v)
    }

    pub fn date<Tz: TimeZone>(t: DateTime<Tz>) -> Self {
        Self::Date(t.fixed_offset())
    }

    /// Wrap an already-encoded JSON value. The text must be valid JSON.
    pub fn raw_json(json: impl Into<String>) -> Result<Self> {
        RawValue::from_string(json.into())
            .map(Self::RawJson)
            .map_err(|e| Error::encoding("raw JSON literal", e))
    }

    pub fn null() -> Self {
        Self::Null
    }

    pub fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Self> {
        values.into_iter().map(Self::Int).collect()
    }

    pub fn strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Vec<Self> {
        values.into_iter().map(Self::string).collect()
    }

    pub fn doubles(values: impl IntoIterator<Item = f64>) -> Vec<Self> {
        values.into_iter().map(Self::Double).collect()
    }

    pub fn bools(values: impl IntoIterator<Item = bool>) -> Vec<Self> {
        values.into_iter().map(Self::Bool).collect()
    }

    pub fn dates<Tz: TimeZone>(values: impl IntoIterator<Item = DateTime<Tz>>) -> Vec<Self> {
        values.into_iter().map(Self::date).collect()
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b && a.offset() == b.offset(),
            (Self::RawJson(a), Self::RawJson(b)) => a.get() == b.get(),
            (Self::Null, Self::Null) => true,
            _ => false,
        }
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::Double(d) if !d.is_finite() => Err(non_finite_error(*d)),
            Self::Double(d) => serializer.serialize_f64(*d),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            Self::RawJson(raw) => raw.serialize(serializer),
            Self::Null => serializer.serialize_unit(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::json::write_json(f, self)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// A `{"$valueof": field}` reference to another field of the same document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueOf {
    field: String,
}

impl ValueOf {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

/// Shorthand for [`ValueOf::new`]
pub fn value_of(field: impl Into<String>) -> ValueOf {
    ValueOf::new(field)
}

impl Serialize for ValueOf {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$valueof", &self.field)?;
        map.end()
    }
}

impl fmt::Display for ValueOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::json::write_json(f, self)
    }
}

/// Either a literal value or a reference to another field
#[derive(Debug, Clone, PartialEq)]
pub enum RValue {
    Literal(Literal),
    ValueOf(ValueOf),
}

impl RValue {
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            Self::ValueOf(_) => None,
        }
    }

    pub fn as_field_ref(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::ValueOf(v) => Some(v.field()),
        }
    }
}

impl Serialize for RValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Literal(lit) => lit.serialize(serializer),
            Self::ValueOf(v) => v.serialize(serializer),
        }
    }
}

impl fmt::Display for RValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => lit.fmt(f),
            Self::ValueOf(v) => v.fmt(f),
        }
    }
}

impl From<Literal> for RValue {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

impl From<ValueOf> for RValue {
    fn from(v: ValueOf) -> Self {
        Self::ValueOf(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::{json, Value};

    fn wire(v: &impl Serialize) -> String {
        serde_json::to_string(v).unwrap()
    }

    #[test]
    fn test_literal_wire_forms() {
        assert_eq!(wire(&Literal::int(1)), "1");
        assert_eq!(wire(&Literal::string("str")), "\"str\"");
        assert_eq!(wire(&Literal::double(123.123)), "123.123");
        assert_eq!(wire(&Literal::bool(true)), "true");
        assert_eq!(wire(&Literal::null()), "null");
    }

    #[test]
    fn test_literal_date_format() {
        let t = Utc.with_ymd_and_hms(2017, 1, 2, 13, 14, 15).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(wire(&Literal::date(t)), "\"20170102T13:14:15.123+0000\"");

        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let local = offset.with_ymd_and_hms(2018, 12, 31, 23, 0, 1).unwrap();
        assert_eq!(wire(&Literal::date(local)), "\"20181231T23:00:01.000+0530\"");
    }

    #[test]
    fn test_non_finite_double_is_not_encoded() {
        for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(serde_json::to_string(&Literal::double(n)).is_err());
            assert!(serde_json::to_string(&RValue::from(Literal::double(n))).is_err());
        }
        assert!(serde_json::to_string(&Literal::doubles([1.0, f64::NAN])).is_err());
        assert!(Literal::double(f64::NAN).to_string().starts_with("<unencodable"));
    }

    #[test]
    fn test_raw_json_is_verbatim() {
        let raw = Literal::raw_json(r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(wire(&raw), r#"{"a": [1, 2]}"#);
        assert_eq!(raw.to_string(), r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn test_raw_json_rejects_invalid_text() {
        let err = Literal::raw_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_literal_json_round_trip() {
        let cases = vec![
            (Literal::int(-42), json!(-42)),
            (Literal::string("hello"), json!("hello")),
            (Literal::double(0.5), json!(0.5)),
            (Literal::bool(false), json!(false)),
            (Literal::null(), Value::Null),
        ];
        for (lit, expected) in cases {
            let decoded: Value = serde_json::from_str(&wire(&lit)).unwrap();
            assert_eq!(decoded, expected, "literal {:?}", lit);
        }
    }

    #[test]
    fn test_list_helpers_keep_order() {
        assert_eq!(wire(&Literal::ints([3, 1, 2])), "[3,1,2]");
        assert_eq!(wire(&Literal::strings(["s1", "s2"])), r#"["s1","s2"]"#);
        assert_eq!(wire(&Literal::bools([true, false])), "[true,false]");
        assert_eq!(wire(&Literal::doubles([1.5])), "[1.5]");
    }

    #[test]
    fn test_literal_equality_is_tag_and_value() {
        assert_eq!(Literal::int(1), Literal::from(1_i64));
        assert_ne!(Literal::int(1), Literal::double(1.0));
        assert_ne!(Literal::string("1"), Literal::int(1));
        assert_eq!(
            Literal::raw_json("[1]").unwrap(),
            Literal::raw_json("[1]").unwrap()
        );
    }

    #[test]
    fn test_value_of() {
        let v = value_of("fld");
        assert_eq!(wire(&v), r#"{"$valueof":"fld"}"#);
        assert_eq!(v.to_string(), r#"{"$valueof":"fld"}"#);
    }

    #[test]
    fn test_rvalue_accessors() {
        let lit: RValue = Literal::string("fld").into();
        let field: RValue = value_of("fld").into();

        assert!(lit.is_literal());
        assert_eq!(lit.as_literal(), Some(&Literal::string("fld")));
        assert_eq!(lit.as_field_ref(), None);

        assert!(!field.is_literal());
        assert_eq!(field.as_literal(), None);
        assert_eq!(field.as_field_ref(), Some("fld"));

        assert_ne!(lit, field);
        assert_ne!(wire(&lit), wire(&field));
    }
}
