//! The member store: connection handle and migration engine.
//!
//! [`MemberStore`] owns one open SQLite session bound to one file path and
//! exposes the structural mutations the owning membership component issues
//! when applying replicated configuration changes: create table, rename
//! table, add column, destroy column, plus catalog introspection and the
//! byte-exact snapshot primitive.
//!
//! Every mutator is either fully applied and committed or leaves the file
//! byte-identical to its pre-call state. Rename, add-column, and
//! destroy-column define *safe no-op* semantics: an unmet precondition
//! (missing table, blank or colliding target name, missing column) issues
//! zero statements and returns `Ok(())`. Table creation fails loudly
//! instead — creation has no natural skip semantics.
//!
//! # Example
//!
//! ```no_run
//! use member_store_core::{ColumnDefinition, TableDefinition};
//! use member_store_sqlite::MemberStore;
//!
//! let mut store = MemberStore::open("members.db").unwrap();
//!
//! store.create_table(
//!     "kv",
//!     &TableDefinition::new(vec![
//!         ColumnDefinition::primary_key("key", "text"),
//!         ColumnDefinition::new("value", "text"),
//!     ]),
//! ).unwrap();
//!
//! let catalog = store.describe_tables().unwrap();
//! assert!(catalog.contains_key("kv"));
//! ```

use std::path::Path;

use member_store_core::{
    ColumnDefinition, TableDefinition, TableDefinitions, is_valid_identifier, validate_table,
};
use rusqlite::{Connection, MAIN_DB};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::introspect;
use crate::statement::{DestroyColumnPlan, Statement};

/// An owned handle to one file-backed member store.
///
/// Opening binds the handle to a path, creating an empty store if the file
/// does not exist. The handle is the sole mutator of that file for its
/// lifetime; the underlying session is released when the handle drops,
/// on every exit path. All operations run synchronously on the calling
/// thread — there is no internal parallelism, and serializing concurrent
/// callers is the owner's responsibility.
pub struct MemberStore {
    conn: Connection,
}

impl MemberStore {
    /// Opens the store at the given path, creating a new empty store if no
    /// file exists there yet.
    ///
    /// No statements are issued at open: the file only ever reflects the
    /// caller's operations, because its raw bytes are compared across the
    /// cluster as a consistency artifact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the engine cannot open or create
    /// the file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "Opened member store");
        Ok(Self { conn })
    }

    /// Opens an in-memory store, mainly for tests and embedding.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Builds the table catalog from the live store.
    ///
    /// Pure read; safe to call at any time. An empty store yields an empty
    /// mapping, and two calls against an unchanged file return equal
    /// catalogs. Column order matches creation order, minus destroyed
    /// columns, with any added column appended at the end.
    pub fn describe_tables(&self) -> Result<TableDefinitions> {
        introspect::describe_tables(&self.conn)
    }

    /// Creates a new table with the given columns in order.
    ///
    /// Unlike the other mutators this fails loudly: a structurally invalid
    /// definition returns [`StoreError::InvalidDefinition`] before any
    /// statement is issued, and an engine rejection (such as a duplicate
    /// table name) propagates as [`StoreError::Database`].
    pub fn create_table(&mut self, name: &str, definition: &TableDefinition) -> Result<()> {
        let errors = validate_table(name, definition);
        if !errors.is_empty() {
            let reasons = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::InvalidDefinition(reasons));
        }
        execute(
            &self.conn,
            &Statement::CreateTable {
                table: name.to_string(),
                definition: definition.clone(),
            },
        )
    }

    /// Renames a table.
    ///
    /// Safe no-op — zero statements, byte-identical file — unless `old`
    /// names an existing table, `new` is a non-empty valid identifier, and
    /// `new` does not already name a table. Atomic by virtue of being a
    /// single statement.
    pub fn rename_table(&mut self, old: &str, new: &str) -> Result<()> {
        if !introspect::table_exists(&self.conn, old)? {
            debug!(table = %old, "Rename source missing; no-op");
            return Ok(());
        }
        if !is_valid_identifier(new) {
            debug!(table = %new, "Rename target not a valid identifier; no-op");
            return Ok(());
        }
        if introspect::table_exists(&self.conn, new)? {
            debug!(table = %new, "Rename target already exists; no-op");
            return Ok(());
        }
        execute(
            &self.conn,
            &Statement::RenameTable {
                old: old.to_string(),
                new: new.to_string(),
            },
        )
    }

    /// Appends a column to the end of a table's column order.
    ///
    /// Safe no-op if the table does not exist or the column name is not a
    /// valid identifier. Pre-existing rows take the engine's default value
    /// for the new column (null, absent an explicit default).
    ///
    /// Precondition: the column must not be marked primary key — a key
    /// column added to a table with existing rows cannot preserve the
    /// uniqueness and non-null guarantees. The rendered statement never
    /// emits `PRIMARY KEY` for an added column.
    pub fn add_column(&mut self, table: &str, column: &ColumnDefinition) -> Result<()> {
        if !introspect::table_exists(&self.conn, table)? {
            debug!(table = %table, "Add-column table missing; no-op");
            return Ok(());
        }
        if !is_valid_identifier(&column.name) {
            debug!(column = %column.name, "Added column name not a valid identifier; no-op");
            return Ok(());
        }
        execute(
            &self.conn,
            &Statement::AddColumn {
                table: table.to_string(),
                column: column.clone(),
            },
        )
    }

    /// Removes a column from a table.
    ///
    /// Safe no-op if the table or the column does not exist. Otherwise runs
    /// the recreate-table protocol as one atomic transaction: copy the
    /// surviving columns into a transient table, drop and recreate the
    /// original under its own name with the original column order and
    /// primary-key flag minus the removed column, copy the rows back, drop
    /// the transient table, commit. Row values and row order are preserved
    /// exactly. If any step fails the transaction rolls back and the file
    /// returns to its pre-call state.
    pub fn destroy_column(&mut self, table: &str, column: &str) -> Result<()> {
        if !introspect::table_exists(&self.conn, table)? {
            debug!(table = %table, "Destroy-column table missing; no-op");
            return Ok(());
        }
        let definition = introspect::describe_table(&self.conn, table)?;
        if !definition.has_column(column) {
            debug!(table = %table, column = %column, "Destroy-column column missing; no-op");
            return Ok(());
        }

        let plan = DestroyColumnPlan::new(table, &definition, column);
        // Dropping the transaction without commit rolls every step back.
        let tx = self.conn.transaction()?;
        for statement in plan.statements() {
            execute(&tx, statement)?;
        }
        tx.commit()?;
        debug!(table = %table, column = %column, "Destroyed column");
        Ok(())
    }

    /// Serializes the main database to its raw file bytes.
    ///
    /// This is the consistency artifact the owning distributed system
    /// exchanges as a snapshot: two stores built by the same statement
    /// sequence serialize to identical bytes.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let data = self.conn.serialize(MAIN_DB)?;
        Ok(data.to_vec())
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the store and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

/// Submits one rendered data-definition statement to the engine.
///
/// Engine-level failures surface to the caller unchanged; this layer never
/// retries (the engine is local and deterministic, so an identical failing
/// statement fails identically).
fn execute(conn: &Connection, statement: &Statement) -> Result<()> {
    let sql = statement.render();
    debug!(sql = %sql, "Executing statement");
    conn.execute(&sql, [])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npcs() -> TableDefinition {
        TableDefinition::new(vec![
            ColumnDefinition::primary_key("entity", "int"),
            ColumnDefinition::new("name", "text"),
            ColumnDefinition::new("job", "text"),
        ])
    }

    #[test]
    fn test_describe_empty_store() {
        let store = MemberStore::open_in_memory().unwrap();
        assert!(store.describe_tables().unwrap().is_empty());
    }

    #[test]
    fn test_create_then_describe() {
        let mut store = MemberStore::open_in_memory().unwrap();
        store.create_table("npcs", &npcs()).unwrap();

        let catalog = store.describe_tables().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog["npcs"], npcs());
    }

    #[test]
    fn test_create_invalid_definition() {
        let mut store = MemberStore::open_in_memory().unwrap();
        let two_keys = TableDefinition::new(vec![
            ColumnDefinition::primary_key("a", "int"),
            ColumnDefinition::primary_key("b", "int"),
        ]);
        let err = store.create_table("t", &two_keys).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDefinition(_)));
        assert!(store.describe_tables().unwrap().is_empty());
    }

    #[test]
    fn test_create_duplicate_table_fails_loudly() {
        let mut store = MemberStore::open_in_memory().unwrap();
        store.create_table("npcs", &npcs()).unwrap();
        let err = store.create_table("npcs", &npcs()).unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_rename_missing_table_is_noop() {
        let mut store = MemberStore::open_in_memory().unwrap();
        store.rename_table("foo", "bar").unwrap();
        assert!(store.describe_tables().unwrap().is_empty());
    }

    #[test]
    fn test_rename_preserves_definition() {
        let mut store = MemberStore::open_in_memory().unwrap();
        store.create_table("npcs", &npcs()).unwrap();
        store.rename_table("npcs", "people").unwrap();

        let catalog = store.describe_tables().unwrap();
        assert!(!catalog.contains_key("npcs"));
        assert_eq!(catalog["people"], npcs());
    }

    #[test]
    fn test_add_column_appends() {
        let mut store = MemberStore::open_in_memory().unwrap();
        store.create_table("npcs", &npcs()).unwrap();
        store
            .add_column("npcs", &ColumnDefinition::new("hp", "int"))
            .unwrap();

        let catalog = store.describe_tables().unwrap();
        assert_eq!(
            catalog["npcs"].column_names(),
            vec!["entity", "name", "job", "hp"]
        );
    }

    #[test]
    fn test_destroy_column_preserves_rows() {
        let mut store = MemberStore::open_in_memory().unwrap();
        store.create_table("npcs", &npcs()).unwrap();
        store
            .connection()
            .execute_batch(
                "INSERT INTO npcs VALUES (1, 'Alex', 'Armorer');\
                 INSERT INTO npcs VALUES (2, 'Bob', 'Banker');",
            )
            .unwrap();

        store.destroy_column("npcs", "job").unwrap();

        let catalog = store.describe_tables().unwrap();
        assert_eq!(catalog["npcs"].column_names(), vec!["entity", "name"]);
        assert!(catalog["npcs"].column("entity").unwrap().is_primary_key);

        let rows: Vec<(i64, String)> = store
            .connection()
            .prepare("SELECT entity, name FROM npcs")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(rows, vec![(1, "Alex".to_string()), (2, "Bob".to_string())]);
    }

    #[test]
    fn test_destroy_missing_column_is_noop() {
        let mut store = MemberStore::open_in_memory().unwrap();
        store.create_table("npcs", &npcs()).unwrap();
        store.destroy_column("npcs", "magic").unwrap();
        assert_eq!(store.describe_tables().unwrap()["npcs"], npcs());
    }

    #[test]
    fn test_snapshot_deterministic_for_same_statements() {
        let mut a = MemberStore::open_in_memory().unwrap();
        let mut b = MemberStore::open_in_memory().unwrap();
        a.create_table("npcs", &npcs()).unwrap();
        b.create_table("npcs", &npcs()).unwrap();
        assert_eq!(a.snapshot().unwrap(), b.snapshot().unwrap());
    }
}
