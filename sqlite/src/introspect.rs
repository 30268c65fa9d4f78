//! Read-only schema introspection.
//!
//! Reconstructs the [`TableDefinitions`] catalog from the live SQLite
//! catalog: user tables are enumerated from `sqlite_master`, and each
//! table's columns are read from `pragma_table_info` in storage order.
//!
//! One subtlety: `pragma_table_info` reports declared types with the
//! engine's canonicalized keyword casing (`text` comes back as `TEXT`),
//! while the file itself records the declared spelling verbatim in the
//! `sqlite_master.sql` text. The migration engine re-renders definitions
//! obtained here, and a re-rendered statement must match the hand-issued
//! original byte for byte, so column types are recovered from the recorded
//! `CREATE TABLE` text and `pragma_table_info` supplies order and key
//! membership.
//!
//! Everything here is a pure read; the migration engine also leans on
//! [`table_exists`] and [`describe_table`] for its precondition checks.

use std::collections::HashMap;

use member_store_core::{ColumnDefinition, TableDefinition, TableDefinitions};
use rusqlite::Connection;

use crate::error::Result;

/// Keywords that open a table-level constraint clause inside a
/// `CREATE TABLE` body.
const TABLE_CONSTRAINTS: &[&str] = &["PRIMARY", "UNIQUE", "CHECK", "FOREIGN", "CONSTRAINT"];

/// Keywords that end a column's type tokens and start its constraints.
const COLUMN_CONSTRAINTS: &[&str] = &[
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "CHECK",
    "DEFAULT",
    "COLLATE",
    "REFERENCES",
    "GENERATED",
    "AS",
];

/// Checks whether a user table with the given name exists.
pub(crate) fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let count: i64 = stmt.query_row([name], |row| row.get(0))?;
    Ok(count > 0)
}

/// Reads one table's structural descriptor in column-creation order.
///
/// Declared types carry the spelling recorded in the file, not the
/// engine's canonicalized keyword.
pub(crate) fn describe_table(conn: &Connection, name: &str) -> Result<TableDefinition> {
    let sql: Option<String> = conn
        .prepare("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1")?
        .query_row([name], |row| row.get(0))?;
    let declared = sql.as_deref().map(declared_column_types).unwrap_or_default();

    let mut stmt =
        conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt
        .query_map([name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                // `pk` is the 1-based position within the primary key,
                // or 0 for non-key columns.
                row.get::<_, i64>(2)? > 0,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let columns = columns
        .into_iter()
        .map(|(name, reported, is_primary_key)| {
            let column_type = declared.get(&name).cloned().unwrap_or(reported);
            ColumnDefinition {
                name,
                column_type,
                is_primary_key,
            }
        })
        .collect();
    Ok(TableDefinition::new(columns))
}

/// Builds the full table catalog from the live store.
///
/// Enumerates user-defined tables (the engine's own `sqlite_%` tables are
/// excluded) and describes each one. Deterministic: two calls against an
/// unchanged file return equal catalogs, and an empty store yields an
/// empty mapping.
pub(crate) fn describe_tables(conn: &Connection) -> Result<TableDefinitions> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut catalog = TableDefinitions::new();
    for name in names {
        let definition = describe_table(conn, &name)?;
        catalog.insert(name, definition);
    }
    Ok(catalog)
}

/// Extracts each column's declared type spelling from a `CREATE TABLE`
/// statement as recorded in `sqlite_master.sql`.
///
/// The engine keeps the statement text verbatim (extending it in place for
/// `ALTER TABLE ... ADD COLUMN`), so the spellings found here are exactly
/// what a re-rendered definition must reproduce. A column declared without
/// a type maps to an empty string.
fn declared_column_types(sql: &str) -> HashMap<String, String> {
    let mut types = HashMap::new();
    let (Some(open), Some(close)) = (sql.find('('), sql.rfind(')')) else {
        return types;
    };
    if close <= open {
        return types;
    }

    for item in split_top_level(&sql[open + 1..close]) {
        let tokens: Vec<&str> = item.split_whitespace().collect();
        let Some(&first) = tokens.first() else {
            continue;
        };
        if TABLE_CONSTRAINTS.contains(&first.to_ascii_uppercase().as_str()) {
            continue;
        }
        let name = first.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']' | '\''));
        let type_tokens: Vec<&str> = tokens[1..]
            .iter()
            .copied()
            .take_while(|t| !COLUMN_CONSTRAINTS.contains(&t.to_ascii_uppercase().as_str()))
            .collect();
        types.insert(name.to_string(), type_tokens.join(" "));
    }
    types
}

/// Splits a `CREATE TABLE` body on commas outside parentheses and quotes.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in body.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    items.push(body[start..i].trim());
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    items.push(body[start..].trim());
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE kv (key text PRIMARY KEY, value text);\
             CREATE TABLE quests (npc int, quest int);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_table_exists() {
        let conn = seeded();
        assert!(table_exists(&conn, "kv").unwrap());
        assert!(!table_exists(&conn, "npcs").unwrap());
    }

    #[test]
    fn test_describe_table_order_and_key() {
        let conn = seeded();
        let kv = describe_table(&conn, "kv").unwrap();
        assert_eq!(kv.column_names(), vec!["key", "value"]);
        assert!(kv.column("key").unwrap().is_primary_key);
        assert!(!kv.column("value").unwrap().is_primary_key);
        assert_eq!(kv.column("value").unwrap().column_type, "text");
    }

    #[test]
    fn test_describe_table_keeps_declared_type_spelling() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE mixed (a INTEGER PRIMARY KEY, b VarChar(12), c text, d int)",
        )
        .unwrap();

        let mixed = describe_table(&conn, "mixed").unwrap();
        assert_eq!(mixed.column("a").unwrap().column_type, "INTEGER");
        assert_eq!(mixed.column("b").unwrap().column_type, "VarChar(12)");
        assert_eq!(mixed.column("c").unwrap().column_type, "text");
        assert_eq!(mixed.column("d").unwrap().column_type, "int");
    }

    #[test]
    fn test_describe_table_sees_added_column_spelling() {
        let conn = seeded();
        conn.execute_batch("ALTER TABLE quests ADD COLUMN reward int")
            .unwrap();
        let quests = describe_table(&conn, "quests").unwrap();
        assert_eq!(quests.column("reward").unwrap().column_type, "int");
    }

    #[test]
    fn test_declared_column_types_parsing() {
        let types =
            declared_column_types("CREATE TABLE npcs (entity int PRIMARY KEY, name text, job text)");
        assert_eq!(types["entity"], "int");
        assert_eq!(types["name"], "text");
        assert_eq!(types["job"], "text");
    }

    #[test]
    fn test_declared_column_types_multi_token_and_constraints() {
        let types = declared_column_types(
            "CREATE TABLE t (a varchar(10) NOT NULL, b unsigned big int, c, \
             d text DEFAULT 'x,y', PRIMARY KEY (a))",
        );
        assert_eq!(types["a"], "varchar(10)");
        assert_eq!(types["b"], "unsigned big int");
        assert_eq!(types["c"], "");
        assert_eq!(types["d"], "text");
        assert_eq!(types.len(), 4);
    }

    #[test]
    fn test_describe_tables_excludes_internal() {
        let conn = seeded();
        // AUTOINCREMENT forces the sqlite_sequence internal table into
        // existence alongside the user tables.
        conn.execute_batch("CREATE TABLE seq (id INTEGER PRIMARY KEY AUTOINCREMENT)")
            .unwrap();
        conn.execute("INSERT INTO seq DEFAULT VALUES", []).unwrap();

        let catalog = describe_tables(&conn).unwrap();
        let names: Vec<&str> = catalog.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["kv", "quests", "seq"]);
    }

    #[test]
    fn test_describe_tables_empty_store() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(describe_tables(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_describe_tables_deterministic() {
        let conn = seeded();
        assert_eq!(
            describe_tables(&conn).unwrap(),
            describe_tables(&conn).unwrap()
        );
    }
}
