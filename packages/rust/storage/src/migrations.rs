//! SQL migration definitions for the folio location database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: locations",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Location reports, one row per POST
CREATE TABLE IF NOT EXISTS locations (
    id             TEXT PRIMARY KEY,
    device_id      TEXT,
    device_name    TEXT,
    model          TEXT,
    battery_level  REAL,
    latitude       REAL,
    longitude      REAL,
    accuracy       REAL,
    recorded_at    TEXT NOT NULL,
    payload_json   TEXT NOT NULL
);

-- recorded_at is fixed-width RFC 3339 UTC, so text order is time order
CREATE INDEX IF NOT EXISTS idx_locations_recorded_at ON locations(recorded_at);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
