use rusqlite::Connection;

/// Initialize the database schema, creating tables if they don't exist.
///
/// Values are stored as text so that hand-edited or damaged rows surface as
/// corrupt state instead of being coerced by `SQLite`.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS check_state (
            key         TEXT    PRIMARY KEY,
            value       TEXT    NOT NULL,
            updated_at  TEXT    NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_check_state_updated_at ON check_state(updated_at);",
    )?;
    Ok(())
}
