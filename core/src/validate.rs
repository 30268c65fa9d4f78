//! Structural validation of table definitions.
//!
//! Validates the invariants of the schema model before any statement is
//! rendered against the engine: non-empty identifier names, at least one
//! column, unique column names, and at most one primary key. Identifier
//! checking doubles as the injection guard for the statement layer — only
//! validated names ever reach rendered SQL.
//!
//! # Examples
//!
//! ```
//! use member_store_core::*;
//!
//! let table = TableDefinition::new(vec![
//!     ColumnDefinition::primary_key("entity", "int"),
//!     ColumnDefinition::new("favorite_color", "text"),
//! ]);
//! assert!(validate_table("ktulu", &table).is_empty());
//!
//! // Invalid: two primary keys
//! let bad = TableDefinition::new(vec![
//!     ColumnDefinition::primary_key("a", "int"),
//!     ColumnDefinition::primary_key("b", "int"),
//! ]);
//! assert!(!validate_table("ktulu", &bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::TableDefinition;

/// Table definition validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Table name is empty.
    #[error("table name cannot be empty")]
    EmptyTableName,
    /// Table name contains characters outside `[A-Za-z0-9_]` or starts
    /// with a digit.
    #[error("invalid table name: {0}")]
    InvalidTableName(String),
    /// Definition declares no columns.
    #[error("table must define at least one column")]
    NoColumns,
    /// A column name is empty or not a valid identifier.
    #[error("invalid column name: {0:?}")]
    InvalidColumnName(String),
    /// Two columns share the same name.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),
    /// More than one column carries the primary-key flag; composite
    /// primary keys are not representable in this model.
    #[error("multiple primary key columns: {0}")]
    MultiplePrimaryKeys(String),
}

/// Returns whether a name is a valid identifier for rendered SQL:
/// non-empty, alphanumeric or underscore, not starting with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validates a table name together with its definition.
///
/// Checks the name, column count, column identifiers, column uniqueness,
/// and the single-primary-key invariant. Returns all problems found;
/// an empty vector means the definition is structurally sound.
pub fn validate_table(name: &str, definition: &TableDefinition) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push(ValidationError::EmptyTableName);
    } else if !is_valid_identifier(name) {
        errors.push(ValidationError::InvalidTableName(name.to_string()));
    }

    if definition.columns.is_empty() {
        errors.push(ValidationError::NoColumns);
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut key: Option<&str> = None;
    for column in &definition.columns {
        if !is_valid_identifier(&column.name) {
            errors.push(ValidationError::InvalidColumnName(column.name.clone()));
            continue;
        }
        if !seen.insert(&column.name) {
            errors.push(ValidationError::DuplicateColumn(column.name.clone()));
        }
        if column.is_primary_key {
            if let Some(first) = key {
                errors.push(ValidationError::MultiplePrimaryKeys(format!(
                    "{first}, {}",
                    column.name
                )));
            } else {
                key = Some(&column.name);
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnDefinition;

    fn valid() -> TableDefinition {
        TableDefinition::new(vec![
            ColumnDefinition::primary_key("key", "text"),
            ColumnDefinition::new("value", "text"),
        ])
    }

    #[test]
    fn test_valid_table() {
        assert!(validate_table("kv", &valid()).is_empty());
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_valid_identifier("npcs"));
        assert!(is_valid_identifier("npcs_"));
        assert!(is_valid_identifier("_hidden2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("drop;--"));
        assert!(!is_valid_identifier("a b"));
    }

    #[test]
    fn test_empty_name() {
        let errors = validate_table("", &valid());
        assert!(errors.contains(&ValidationError::EmptyTableName));
    }

    #[test]
    fn test_no_columns() {
        let errors = validate_table("kv", &TableDefinition::default());
        assert_eq!(errors, vec![ValidationError::NoColumns]);
    }

    #[test]
    fn test_duplicate_column() {
        let table = TableDefinition::new(vec![
            ColumnDefinition::new("a", "int"),
            ColumnDefinition::new("a", "text"),
        ]);
        let errors = validate_table("t", &table);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateColumn(_))));
    }

    #[test]
    fn test_multiple_primary_keys() {
        let table = TableDefinition::new(vec![
            ColumnDefinition::primary_key("a", "int"),
            ColumnDefinition::primary_key("b", "int"),
        ]);
        let errors = validate_table("t", &table);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MultiplePrimaryKeys(_))));
    }

    #[test]
    fn test_invalid_column_name() {
        let table = TableDefinition::new(vec![ColumnDefinition::new("bad name", "int")]);
        let errors = validate_table("t", &table);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidColumnName(_))));
    }
}
