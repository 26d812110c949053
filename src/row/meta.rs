// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::ValueType;

/// Descriptor of a single field: name, semantic type, length and precision.
///
/// Length and precision are informational; `-1` means "not specified".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default = "unspecified")]
    pub length: i32,
    #[serde(default = "unspecified")]
    pub precision: i32,
}

fn unspecified() -> i32 {
    -1
}

impl ValueMeta {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            length: -1,
            precision: -1,
        }
    }

    pub fn with_length(mut self, length: i32, precision: i32) -> Self {
        self.length = length;
        self.precision = precision;
        self
    }
}

impl Display for ValueMeta {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.value_type)?;
        if self.length >= 0 {
            write!(f, "({}", self.length)?;
            if self.precision >= 0 {
                write!(f, ", {}", self.precision)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Ordered layout of the rows of one stream segment.
///
/// A `RowMeta` is built once, wrapped in an `Arc` and shared by every row of
/// the segment. Transforms that change the layout derive a new meta instead
/// of mutating the shared one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMeta {
    fields: Vec<ValueMeta>,
}

impl RowMeta {
    pub fn new(fields: Vec<ValueMeta>) -> Self {
        Self { fields }
    }

    /// Number of fields
    pub fn size(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[ValueMeta] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&ValueMeta> {
        self.fields.get(index)
    }

    /// Position of the field called `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns a copy of this layout with `field` appended.
    pub fn with_field(&self, field: ValueMeta) -> Self {
        let mut fields = self.fields.clone();
        fields.push(field);
        Self { fields }
    }

    /// Returns a copy of this layout with the field at `index` replaced.
    pub fn with_replaced(&self, index: usize, field: ValueMeta) -> Self {
        let mut fields = self.fields.clone();
        if let Some(slot) = fields.get_mut(index) {
            *slot = field;
        }
        Self { fields }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl Display for RowMeta {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_of_and_size() {
        let meta = RowMeta::new(vec![
            ValueMeta::new("id", ValueType::Integer),
            ValueMeta::new("name", ValueType::String),
        ]);

        assert_eq!(meta.size(), 2);
        assert_eq!(meta.index_of("name"), Some(1));
        assert_eq!(meta.index_of("missing"), None);
    }

    #[test]
    fn test_with_field_leaves_original_untouched() {
        let meta = RowMeta::new(vec![ValueMeta::new("id", ValueType::Integer)]);
        let extended = meta.with_field(ValueMeta::new("flag", ValueType::Boolean));

        assert_eq!(meta.size(), 1);
        assert_eq!(extended.size(), 2);
        assert_eq!(extended.field_names(), vec!["id", "flag"]);
    }

    #[test]
    fn test_display_includes_length_and_precision() {
        let meta = RowMeta::new(vec![
            ValueMeta::new("amount", ValueType::Number).with_length(10, 2),
            ValueMeta::new("note", ValueType::String),
        ]);

        assert_eq!(meta.to_string(), "[amount Number(10, 2), note String]");
    }
}
