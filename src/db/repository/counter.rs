use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// Name of the shared call-code sequence counter.
pub const PASSWORD_COUNTER: &str = "password_seq";

/// Atomically increment a named counter and return the new value.
///
/// One SQL statement, so two concurrent admissions can never observe the
/// same sequence number. Counters start at 0 and only ever grow.
pub fn next_counter_value(conn: &Connection, name: &str) -> Result<i64, DatabaseError> {
    let value = conn.query_row(
        "INSERT INTO counters (name, value) VALUES (?1, 1)
         ON CONFLICT(name) DO UPDATE SET value = value + 1
         RETURNING value",
        params![name],
        |row| row.get(0),
    )?;
    Ok(value)
}

/// Read a counter without incrementing (0 if it was never used).
pub fn current_counter_value(conn: &Connection, name: &str) -> Result<i64, DatabaseError> {
    let value = conn
        .query_row(
            "SELECT value FROM counters WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(value)
}
