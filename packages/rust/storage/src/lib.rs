//! libSQL storage for device location reports (local file mode).
//!
//! The [`LocationStore`] struct wraps a libSQL database holding one row per
//! report. The full report is kept as JSON so unknown fields survive; the
//! commonly queried fields are split into columns.

mod migrations;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database, params};
use tracing::{debug, info};
use uuid::Uuid;

use folio_shared::{FolioError, LocationRecord, Result};

/// Storage handle wrapping a libSQL database.
pub struct LocationStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

fn storage_err(e: impl std::fmt::Display) -> FolioError {
    FolioError::Storage(e.to_string())
}

/// Fixed-width UTC timestamp, so lexical order matches time order.
fn timestamp_key(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl LocationStore {
    /// Open or create a database at `path`, applying pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| FolioError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;

        let store = Self { db, conn };
        store.run_migrations().await?;
        info!(path = %path.display(), "location store ready");
        Ok(store)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        FolioError::Storage(format!("migration v{} failed: {e}", migration.version))
                    })?;
            }
        }
        Ok(())
    }

    /// Current schema version, or 0 before the first migration.
    async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => match rows.next().await {
                Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
                _ => 0,
            },
            Err(_) => 0,
        }
    }

    // -----------------------------------------------------------------------
    // Location operations
    // -----------------------------------------------------------------------

    /// Store one report. Returns the generated row id.
    pub async fn insert_location(&self, record: &LocationRecord) -> Result<String> {
        let id = Uuid::now_v7().to_string();
        let payload = serde_json::to_string(record).map_err(storage_err)?;
        let fix = record.location_data.as_ref();

        self.conn
            .execute(
                "INSERT INTO locations (id, device_id, device_name, model, battery_level,
                                        latitude, longitude, accuracy, recorded_at, payload_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id.as_str(),
                    record.device_id.as_deref(),
                    record.name.as_deref(),
                    record.model.as_deref(),
                    record.battery_level,
                    fix.and_then(|f| f.latitude),
                    fix.and_then(|f| f.longitude),
                    fix.and_then(|f| f.accuracy),
                    timestamp_key(&record.timestamp),
                    payload
                ],
            )
            .await
            .map_err(storage_err)?;

        debug!(%id, device = ?record.device_id, "stored location");
        Ok(id)
    }

    /// The most recent report by timestamp.
    pub async fn latest(&self) -> Result<Option<LocationRecord>> {
        let mut records = self
            .query_payloads(
                "SELECT payload_json FROM locations ORDER BY recorded_at DESC, id DESC LIMIT 1",
                None,
            )
            .await?;
        Ok(records.pop())
    }

    /// Reports at or after `cutoff`, newest first.
    pub async fn history_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<LocationRecord>> {
        self.query_payloads(
            "SELECT payload_json FROM locations WHERE recorded_at >= ?1
             ORDER BY recorded_at DESC, id DESC",
            Some(timestamp_key(&cutoff)),
        )
        .await
    }

    /// Total number of stored reports.
    pub async fn count(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM locations", params![])
            .await
            .map_err(storage_err)?;

        match rows.next().await.map_err(storage_err)? {
            Some(row) => row
                .get::<i64>(0)
                .map(|n| n.max(0) as u64)
                .map_err(storage_err),
            None => Ok(0),
        }
    }

    async fn query_payloads(&self, sql: &str, cutoff: Option<String>) -> Result<Vec<LocationRecord>> {
        let mut rows = match cutoff {
            Some(cutoff) => self.conn.query(sql, params![cutoff]).await,
            None => self.conn.query(sql, params![]).await,
        }
        .map_err(storage_err)?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            let payload = row.get::<String>(0).map_err(storage_err)?;
            let record: LocationRecord = serde_json::from_str(&payload)
                .map_err(|e| FolioError::Storage(format!("corrupt location payload: {e}")))?;
            records.push(record);
        }
        Ok(records)
    }
}
