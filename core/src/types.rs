//! Schema model types for the member store.
//!
//! This module defines the structural model of the relational store: columns,
//! tables, and the table catalog. The types are designed for serialization
//! with [`serde`] so the owning membership component can embed catalog
//! snapshots in replicated configuration entries, and they round-trip exactly
//! through the SQLite introspection layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single column of a table: name, declared type, and primary-key flag.
///
/// The declared type is an opaque, engine-recognized keyword (e.g. `int`,
/// `text`); this model does not interpret it. At most one column per table
/// may carry the primary-key flag — composite primary keys are an explicit
/// limitation of the model.
///
/// # Examples
///
/// ```
/// use member_store_core::ColumnDefinition;
///
/// let key = ColumnDefinition::primary_key("entity", "int");
/// assert!(key.is_primary_key);
///
/// let name = ColumnDefinition::new("name", "text");
/// assert!(!name.is_primary_key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name; a non-empty identifier, unique within its table.
    pub name: String,
    /// Declared type keyword as the engine stores it (e.g. "int", "text").
    pub column_type: String,
    /// Whether this column is the table's primary key.
    pub is_primary_key: bool,
}

impl ColumnDefinition {
    /// Creates an ordinary (non-key) column.
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            is_primary_key: false,
        }
    }

    /// Creates a primary-key column.
    pub fn primary_key(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            is_primary_key: true,
        }
    }
}

/// An ordered sequence of columns describing one table.
///
/// Column order is significant and equal to column-creation order as the
/// engine stores it; introspection reproduces it exactly, and newly added
/// columns always append at the end.
///
/// # Examples
///
/// ```
/// use member_store_core::{ColumnDefinition, TableDefinition};
///
/// let table = TableDefinition::new(vec![
///     ColumnDefinition::primary_key("entity", "int"),
///     ColumnDefinition::new("name", "text"),
/// ]);
///
/// assert!(table.has_column("name"));
/// assert_eq!(table.primary_key().unwrap().name, "entity");
/// assert_eq!(table.column_names(), vec!["entity", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Columns in creation order.
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    /// Creates a table definition from columns in creation order.
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self { columns }
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns whether a column with the given name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Returns the primary-key column, if one is declared.
    pub fn primary_key(&self) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    /// Returns the column names in creation order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns a copy of this definition with the named column removed,
    /// preserving the order of the surviving columns.
    pub fn without_column(&self, name: &str) -> TableDefinition {
        TableDefinition {
            columns: self
                .columns
                .iter()
                .filter(|c| c.name != name)
                .cloned()
                .collect(),
        }
    }
}

/// The table catalog: a mapping from table name to table definition.
///
/// Produced fresh on every introspection call — it is a view of the live
/// catalog, never cached state. `BTreeMap` keeps iteration order
/// deterministic, so two snapshots of an unchanged store compare equal.
pub type TableDefinitions = BTreeMap<String, TableDefinition>;
