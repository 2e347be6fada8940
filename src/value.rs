//! The generic value space.

use std::collections::HashMap;

use crate::types::{Char, HighPrecNumber};

/// Any UBJSON value, for encoding and decoding without a schema.
///
/// `Int` is the abstract integer: it encodes with the smallest marker that
/// fits and is what every integer width decodes into. `NoOp` tokens decode
/// to `Null`. Object key order is not preserved and duplicate keys resolve
/// last-wins.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float32(f32),
    Float64(f64),
    Char(Char),
    HighPrecision(HighPrecNumber),
    Str(String),
    Array(Vec<AnyValue>),
    Object(HashMap<String, AnyValue>),
}

impl From<bool> for AnyValue {
    fn from(v: bool) -> Self {
        AnyValue::Bool(v)
    }
}

impl From<i64> for AnyValue {
    fn from(v: i64) -> Self {
        AnyValue::Int(v)
    }
}

impl From<f64> for AnyValue {
    fn from(v: f64) -> Self {
        AnyValue::Float64(v)
    }
}

impl From<&str> for AnyValue {
    fn from(v: &str) -> Self {
        AnyValue::Str(v.to_owned())
    }
}

impl From<String> for AnyValue {
    fn from(v: String) -> Self {
        AnyValue::Str(v)
    }
}

impl From<Char> for AnyValue {
    fn from(v: Char) -> Self {
        AnyValue::Char(v)
    }
}

impl From<HighPrecNumber> for AnyValue {
    fn from(v: HighPrecNumber) -> Self {
        AnyValue::HighPrecision(v)
    }
}

impl From<Vec<AnyValue>> for AnyValue {
    fn from(v: Vec<AnyValue>) -> Self {
        AnyValue::Array(v)
    }
}

impl From<HashMap<String, AnyValue>> for AnyValue {
    fn from(v: HashMap<String, AnyValue>) -> Self {
        AnyValue::Object(v)
    }
}
