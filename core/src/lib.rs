//! Core schema model for the cluster member store.
//!
//! This crate defines the structural model of the file-backed relational
//! store that records cluster configuration:
//!
//! - [`ColumnDefinition`] — one column: name, declared type keyword, and
//!   primary-key flag.
//! - [`TableDefinition`] — an ordered sequence of columns; order equals
//!   column-creation order as the engine stores it.
//! - [`TableDefinitions`] — the table catalog, keyed by table name.
//!
//! Validation ([`validate_table`]) catches structural errors — empty or
//! invalid identifiers, duplicate columns, multiple primary keys — before a
//! definition is ever rendered into SQL by the storage layer.
//!
//! Composite primary keys are not representable: a column carries a single
//! boolean flag, and definitions with more than one flagged column are
//! rejected by validation.
//!
//! # Example
//!
//! ```
//! use member_store_core::*;
//!
//! let npcs = TableDefinition::new(vec![
//!     ColumnDefinition::primary_key("entity", "int"),
//!     ColumnDefinition::new("name", "text"),
//!     ColumnDefinition::new("job", "text"),
//! ]);
//!
//! assert!(validate_table("npcs", &npcs).is_empty());
//! assert_eq!(npcs.primary_key().unwrap().name, "entity");
//! assert_eq!(npcs.without_column("job").column_names(), vec!["entity", "name"]);
//! ```

mod types;
mod validate;

pub use types::{ColumnDefinition, TableDefinition, TableDefinitions};
pub use validate::{ValidationError, is_valid_identifier, validate_table};
