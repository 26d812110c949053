// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::{RowMeta, Value};

/// One ordered tuple of values flowing through the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = value;
        }
    }

    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Checks that length and positional types match `meta`.
    pub fn conforms_to(&self, meta: &RowMeta) -> bool {
        self.0.len() == meta.size()
            && self
                .0
                .iter()
                .zip(meta.fields())
                .all(|(value, field)| value.conforms_to(field.value_type))
    }

    /// Looks up a value by field name through `meta`.
    pub fn value_of<'a>(&'a self, meta: &RowMeta, name: &str) -> Option<&'a Value> {
        meta.index_of(name).and_then(|i| self.0.get(i))
    }

    /// Renders the row as a JSON object keyed by field name.
    pub fn to_json(&self, meta: &RowMeta) -> serde_json::Value {
        let object = meta
            .fields()
            .iter()
            .zip(self.0.iter())
            .map(|(field, value)| {
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                (field.name.clone(), json)
            })
            .collect();
        serde_json::Value::Object(object)
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}
