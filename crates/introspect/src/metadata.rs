// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Canonical field model
//!
//! Every backend maps its catalog rows into [`RawField`]. By the time a value of
//! this type exists, the backend's nullability and default encodings have been
//! resolved; nothing engine-specific leaks through.
//!
//! Type names are kept exactly as the backend reports them. Normalizing types
//! across engines is left to the consumer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a column accepts NULL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nullability {
    Yes,
    No,
}

impl Nullability {
    /// Map an `IS_NULLABLE` style `'YES'` / `'NO'` value
    pub fn from_is_nullable(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("yes") {
            Nullability::Yes
        } else {
            Nullability::No
        }
    }

    /// Map a NOT NULL flag (true means the column rejects NULL)
    pub fn from_not_null(not_null: bool) -> Self {
        if not_null {
            Nullability::No
        } else {
            Nullability::Yes
        }
    }

    pub fn is_nullable(self) -> bool {
        matches!(self, Nullability::Yes)
    }
}

impl fmt::Display for Nullability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nullability::Yes => f.write_str("Yes"),
            Nullability::No => f.write_str("No"),
        }
    }
}

/// One row of normalized column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    /// Column name
    pub field: String,
    /// Backend-reported data type name
    #[serde(rename = "type")]
    pub data_type: String,
    /// Nullability
    pub null: Nullability,
    /// Default expression exactly as the backend reports it
    pub default: Option<String>,
    /// Column comment, empty when unsupported or unset
    pub comment: String,
}

impl RawField {
    /// Create a non-nullable field with no default and no comment
    pub fn new(field: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            data_type: data_type.into(),
            null: Nullability::No,
            default: None,
            comment: String::new(),
        }
    }

    /// Builder method: set nullability
    pub fn with_null(mut self, null: Nullability) -> Self {
        self.null = null;
        self
    }

    /// Builder method: set default expression
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.null.is_nullable()
    }
}

/// A table together with its fields in ordinal order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table or view name
    pub name: String,
    /// Columns in declared order
    pub fields: Vec<RawField>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, fields: Vec<RawField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Get a field by column name
    pub fn get_field(&self, name: &str) -> Option<&RawField> {
        self.fields.iter().find(|f| f.field == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullability_from_is_nullable() {
        assert_eq!(Nullability::from_is_nullable("YES"), Nullability::Yes);
        assert_eq!(Nullability::from_is_nullable("yes"), Nullability::Yes);
        assert_eq!(Nullability::from_is_nullable("NO"), Nullability::No);
        assert_eq!(Nullability::from_is_nullable(""), Nullability::No);
    }

    #[test]
    fn test_nullability_from_not_null_flag_is_inverted() {
        assert_eq!(Nullability::from_not_null(true), Nullability::No);
        assert_eq!(Nullability::from_not_null(false), Nullability::Yes);
    }

    #[test]
    fn test_raw_field_builder() {
        let field = RawField::new("status", "varchar")
            .with_null(Nullability::Yes)
            .with_default(Some("'draft'".to_string()))
            .with_comment("Publication state");

        assert_eq!(field.field, "status");
        assert_eq!(field.data_type, "varchar");
        assert!(field.is_nullable());
        assert_eq!(field.default.as_deref(), Some("'draft'"));
        assert_eq!(field.comment, "Publication state");
    }

    #[test]
    fn test_raw_field_serializes_canonical_shape() {
        let field = RawField::new("id", "int");
        let json = serde_json::to_value(&field).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "field": "id",
                "type": "int",
                "null": "No",
                "default": null,
                "comment": ""
            })
        );
    }

    #[test]
    fn test_table_schema_get_field() {
        let table = TableSchema::new(
            "users",
            vec![RawField::new("id", "int"), RawField::new("email", "text")],
        );

        assert_eq!(table.get_field("email").map(|f| f.data_type.as_str()), Some("text"));
        assert!(table.get_field("missing").is_none());
    }
}
