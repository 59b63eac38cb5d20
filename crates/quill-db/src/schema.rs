//! Embedded static schema.
//!
//! The schema ships inside the binary via `include_str!`. Initialization is
//! destructive: existing `user` and `post` tables are dropped and recreated.
//! It is exposed through the server's `init-db` command for first-time setup
//! and test fixtures, and never runs as part of request serving.

use rusqlite::Connection;
use thiserror::Error;

/// The full schema: drops and recreates every table.
const SCHEMA: &str = include_str!("schema.sql");

/// Errors that can occur during schema initialization.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A SQL statement in the schema failed.
    #[error("schema initialization failed: {0}")]
    ExecutionFailed(#[from] rusqlite::Error),
}

/// Drops all existing tables and recreates them from the embedded schema.
///
/// Runs inside a single transaction, so a failure leaves the previous
/// tables intact.
///
/// # Errors
///
/// Returns [`SchemaError::ExecutionFailed`] if any statement fails.
pub fn init_schema(conn: &Connection) -> Result<(), SchemaError> {
    tracing::info!("initializing database schema (destructive)");

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .expect("should prepare table query");
        stmt.query_map([], |row| row.get(0))
            .expect("should run table query")
            .map(|r| r.expect("should read table name"))
            .collect()
    }

    #[test]
    fn init_creates_user_and_post_tables() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        init_schema(&conn).expect("schema init should succeed");

        assert_eq!(table_names(&conn), vec!["post", "user"]);
    }

    #[test]
    fn init_is_destructive_and_repeatable() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        init_schema(&conn).expect("first init should succeed");

        conn.execute(
            "INSERT INTO user (username, password) VALUES ('alice', 'hash')",
            [],
        )
        .expect("should insert user");

        init_schema(&conn).expect("second init should succeed");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))
            .expect("should count users");
        assert_eq!(count, 0, "reinitialization should wipe existing rows");
    }

    #[test]
    fn post_created_defaults_to_current_timestamp() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        init_schema(&conn).expect("schema init should succeed");

        conn.execute(
            "INSERT INTO user (username, password) VALUES ('alice', 'hash')",
            [],
        )
        .expect("should insert user");
        conn.execute(
            "INSERT INTO post (author_id, title, body) VALUES (1, 't', 'b')",
            [],
        )
        .expect("should insert post");

        let created: String = conn
            .query_row("SELECT created FROM post WHERE id = 1", [], |row| {
                row.get(0)
            })
            .expect("should read created column");
        assert!(!created.is_empty(), "created should be populated");
    }
}
