//! Data-definition statement rendering.
//!
//! The store never concatenates caller strings into SQL directly. Every
//! structural mutation is expressed as one of a closed set of [`Statement`]
//! kinds, built from validated identifiers and rendered here. This keeps the
//! statement shape auditable, which matters more than usual: the serialized
//! database file is exchanged between cluster members as a consistency
//! artifact, so the rendered text must match the equivalent hand-issued
//! statement byte for byte.
//!
//! Column destruction has no single-statement form in SQLite's DDL, so it is
//! expressed as a [`DestroyColumnPlan`]: the exact ordered statement sequence
//! that recreates the table without the removed column, executed by the store
//! inside one transaction.

use member_store_core::{ColumnDefinition, TableDefinition};

/// One data-definition statement against the store.
///
/// Each variant renders to exactly one SQL statement via
/// [`render`](Self::render). Identifier validation happens before a
/// `Statement` is constructed; rendering itself never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Declare a new table with the given columns in order.
    CreateTable {
        table: String,
        definition: TableDefinition,
    },
    /// Rename an existing table.
    RenameTable { old: String, new: String },
    /// Append one column to the end of a table's column order.
    AddColumn {
        table: String,
        column: ColumnDefinition,
    },
    /// Declare the transient holding table used by the recreate protocol.
    /// Temporary, so it never appears in the serialized main database.
    CreateTransientTable {
        table: String,
        columns: Vec<String>,
    },
    /// Copy the named columns of every row from one table into another,
    /// preserving row order.
    CopyColumns {
        from: String,
        to: String,
        columns: Vec<String>,
    },
    /// Drop a table.
    DropTable { table: String },
}

impl Statement {
    /// Renders the statement to its exact SQL text.
    pub fn render(&self) -> String {
        match self {
            Statement::CreateTable { table, definition } => {
                format!(
                    "CREATE TABLE {table} ({})",
                    render_column_list(&definition.columns)
                )
            }
            Statement::RenameTable { old, new } => {
                format!("ALTER TABLE {old} RENAME TO {new}")
            }
            Statement::AddColumn { table, column } => {
                format!(
                    "ALTER TABLE {table} ADD COLUMN {} {}",
                    column.name, column.column_type
                )
            }
            Statement::CreateTransientTable { table, columns } => {
                format!("CREATE TEMPORARY TABLE {table}({})", columns.join(","))
            }
            Statement::CopyColumns { from, to, columns } => {
                format!("INSERT INTO {to} SELECT {} FROM {from}", columns.join(","))
            }
            Statement::DropTable { table } => {
                format!("DROP TABLE {table}")
            }
        }
    }
}

/// Renders `name type[ PRIMARY KEY]` for each column, joined with `", "`.
fn render_column_list(columns: &[ColumnDefinition]) -> String {
    columns
        .iter()
        .map(|c| {
            if c.is_primary_key {
                format!("{} {} PRIMARY KEY", c.name, c.column_type)
            } else {
                format!("{} {}", c.name, c.column_type)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// The ordered statement sequence that removes one column from a table.
///
/// SQLite's DDL provides no drop-column primitive that leaves the file in
/// the same state as a hand-written recreate script, so the plan spells the
/// script out: copy the surviving columns into a transient table, drop and
/// recreate the original without the removed column, copy the rows back,
/// and drop the transient table. The store executes the plan inside a
/// single transaction; any failing step rolls the whole sequence back.
#[derive(Debug, Clone)]
pub struct DestroyColumnPlan {
    statements: Vec<Statement>,
}

impl DestroyColumnPlan {
    /// Builds the plan for removing `column` from `table`, given the
    /// table's current definition. The caller has already verified that
    /// the column is a member of the definition.
    pub fn new(table: &str, definition: &TableDefinition, column: &str) -> Self {
        let transient = format!("{table}_");
        let survivors = definition.without_column(column);
        let names: Vec<String> = survivors
            .columns
            .iter()
            .map(|c| c.name.clone())
            .collect();

        let statements = vec![
            Statement::CreateTransientTable {
                table: transient.clone(),
                columns: names.clone(),
            },
            Statement::CopyColumns {
                from: table.to_string(),
                to: transient.clone(),
                columns: names.clone(),
            },
            Statement::DropTable {
                table: table.to_string(),
            },
            Statement::CreateTable {
                table: table.to_string(),
                definition: survivors,
            },
            Statement::CopyColumns {
                from: transient.clone(),
                to: table.to_string(),
                columns: names,
            },
            Statement::DropTable { table: transient },
        ];

        Self { statements }
    }

    /// The plan's statements in execution order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}
