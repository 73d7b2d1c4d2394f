// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Introspection-specific test helpers and custom assertions

use std::collections::BTreeSet;

use schema_introspect::{Nullability, RawField};

/// Custom assertion helpers for introspection results
pub struct FieldAssertions;

impl FieldAssertions {
    /// Assert that a field has the given properties
    pub fn assert_field(
        field: &RawField,
        name: &str,
        data_type: &str,
        null: Nullability,
        default: Option<&str>,
    ) {
        assert_eq!(field.field, name, "Field name mismatch");
        assert_eq!(field.data_type, data_type, "Type mismatch for '{}'", name);
        assert_eq!(field.null, null, "Nullability mismatch for '{}'", name);
        assert_eq!(
            field.default.as_deref(),
            default,
            "Default mismatch for '{}'",
            name
        );
    }

    /// Assert that fields come back with exactly these names, in this order
    pub fn assert_field_names(fields: &[RawField], expected: &[&str]) {
        let actual: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(actual, expected, "Field names or order mismatch");
    }

    /// Assert that two table lists hold the same names, ignoring order
    pub fn assert_same_tables(actual: &[String], expected: &[&str]) {
        let actual_set: BTreeSet<&str> = actual.iter().map(String::as_str).collect();
        let expected_set: BTreeSet<&str> = expected.iter().copied().collect();

        assert_eq!(actual.len(), actual_set.len(), "Duplicate table names: {:?}", actual);
        assert_eq!(actual_set, expected_set, "Table set mismatch");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_same_tables_ignores_order() {
        let actual = vec!["b".to_string(), "a".to_string()];
        FieldAssertions::assert_same_tables(&actual, &["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "Duplicate table names")]
    fn test_assert_same_tables_rejects_duplicates() {
        let actual = vec!["a".to_string(), "a".to_string()];
        FieldAssertions::assert_same_tables(&actual, &["a"]);
    }
}
