//! Location reports posted by a tracked device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One location report. Unknown fields are kept in `extra` and round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_data: Option<LocationFix>,
    /// When the report was recorded; defaults to receipt time.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Position portion of a report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationFix {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_old: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_timestamp: Option<i64>,
}

impl LocationRecord {
    /// `(latitude, longitude)` when both are reported.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let fix = self.location_data.as_ref()?;
        Some((fix.latitude?, fix.longitude?))
    }
}

/// Drop near-duplicate reports.
///
/// Input is expected newest first. The first report with coordinates is kept;
/// after that a report is kept only when its latitude or longitude differs from
/// the last kept report by more than `min_delta` degrees. Reports without
/// coordinates are skipped.
pub fn filter_significant(records: Vec<LocationRecord>, min_delta: f64) -> Vec<LocationRecord> {
    let mut kept = Vec::new();
    let mut last: Option<(f64, f64)> = None;

    for record in records {
        let Some((lat, lon)) = record.coordinates() else {
            continue;
        };

        let moved = match last {
            None => true,
            Some((last_lat, last_lon)) => {
                (lat - last_lat).abs() > min_delta || (lon - last_lon).abs() > min_delta
            }
        };

        if moved {
            last = Some((lat, lon));
            kept.push(record);
        }
    }

    kept
}
