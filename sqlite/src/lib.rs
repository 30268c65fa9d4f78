//! SQLite-backed schema migration and introspection for the cluster
//! member store.
//!
//! This crate is the persistence layer a distributed consensus component
//! uses to record structural configuration — tables, columns, rows — in a
//! local SQLite file. The file itself is exchanged between cluster members
//! as a consistency-bearing artifact (e.g. as a snapshot), so every
//! operation here guarantees more than logical correctness: for any
//! sequence of operations, the serialized file is byte-identical to one
//! produced by hand-issuing the equivalent statements in the same order.
//!
//! # Architecture
//!
//! - **`store`** — [`MemberStore`]: the owned connection handle and the
//!   migration engine (create/rename table, add/destroy column, snapshot)
//! - **`introspect`** — catalog reconstruction from the live file
//! - **`statement`** — the closed set of rendered DDL statement kinds
//! - **`error`** — unified error type
//!
//! # Quick start
//!
//! ```no_run
//! use member_store_core::{ColumnDefinition, TableDefinition};
//! use member_store_sqlite::MemberStore;
//!
//! let mut store = MemberStore::open("members.db").unwrap();
//!
//! store.create_table(
//!     "npcs",
//!     &TableDefinition::new(vec![
//!         ColumnDefinition::primary_key("entity", "int"),
//!         ColumnDefinition::new("name", "text"),
//!         ColumnDefinition::new("job", "text"),
//!     ]),
//! ).unwrap();
//!
//! store.destroy_column("npcs", "job").unwrap();
//!
//! let catalog = store.describe_tables().unwrap();
//! assert_eq!(catalog["npcs"].column_names(), vec!["entity", "name"]);
//!
//! // Raw bytes of the store, for snapshot exchange.
//! let snapshot = store.snapshot().unwrap();
//! ```
//!
//! # No-op semantics
//!
//! `rename_table`, `add_column`, and `destroy_column` are *safe no-ops*
//! when their preconditions are unmet: they issue zero statements, leave
//! the file byte-identical, and return `Ok(())`. `create_table` fails
//! loudly instead, since creation has no natural skip semantics.

mod error;
mod introspect;
mod statement;
mod store;

pub use error::{Result, StoreError};
pub use statement::{DestroyColumnPlan, Statement};
pub use store::MemberStore;
