// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Semantic type of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Number,
    Boolean,
    Binary,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::String => "String",
            ValueType::Integer => "Integer",
            ValueType::Number => "Number",
            ValueType::Boolean => "Boolean",
            ValueType::Binary => "Binary",
        };
        f.write_str(name)
    }
}

/// A single typed field value.
///
/// `Null` is compatible with every [`ValueType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Binary(Vec<u8>),
}

impl Value {
    /// The semantic type of this value, `None` for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(ValueType::Boolean),
            Value::Integer(_) => Some(ValueType::Integer),
            Value::Number(_) => Some(ValueType::Number),
            Value::String(_) => Some(ValueType::String),
            Value::Binary(_) => Some(ValueType::Binary),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value may occupy a field declared as `value_type`.
    pub fn conforms_to(&self, value_type: ValueType) -> bool {
        self.value_type().map_or(true, |t| t == value_type)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a YAML option value into a field value of the requested type.
    pub fn from_yaml(value: &serde_yaml::Value, value_type: ValueType) -> Option<Value> {
        use serde_yaml::Value as Yaml;

        match (value, value_type) {
            (Yaml::Null, _) => Some(Value::Null),
            (Yaml::Bool(b), ValueType::Boolean) => Some(Value::Boolean(*b)),
            (Yaml::Number(n), ValueType::Integer) => n.as_i64().map(Value::Integer),
            (Yaml::Number(n), ValueType::Number) => n.as_f64().map(Value::Number),
            (Yaml::String(s), ValueType::String) => Some(Value::String(s.clone())),
            (Yaml::String(s), ValueType::Integer) => s.trim().parse().ok().map(Value::Integer),
            (Yaml::String(s), ValueType::Number) => s.trim().parse().ok().map(Value::Number),
            (Yaml::String(s), ValueType::Binary) => Some(Value::Binary(s.as_bytes().to_vec())),
            (Yaml::Number(n), ValueType::String) => Some(Value::String(n.to_string())),
            (Yaml::Bool(b), ValueType::String) => Some(Value::String(b.to_string())),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("<null>"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Binary(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}
