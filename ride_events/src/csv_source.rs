//! Lenient CSV readers for the fleet tool's deployment and ride exports.
//!
//! ## What this does
//! - Resolves the export's required column headers up front. A missing
//!   header invalidates the whole upload ([`Error::MissingColumn`]).
//! - Coerces each field best-effort: an uncoercible optional field becomes
//!   `None`; a row that yields neither an identity key nor a creation
//!   timestamp is skipped (it could not be keyed, stored, or matched).
//!   Row-level problems never abort the pass.
//! - Returns the kept rows plus an [`IngestReport`] of what was dropped.
//!
//! Timestamps accept RFC3339 as well as the space-separated
//! `YYYY-MM-DD HH:MM:SS[.fff]` shape the export tool emits.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use tracing::warn;
use uuid::Uuid;

use crate::errors::Error;
use crate::models::{DeploymentEvent, RideEvent};

/// Counters for one CSV read.
///
/// All counters are additive for the processed upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Data rows the reader saw (excluding the header).
    pub rows_read: usize,
    /// Rows kept after coercion.
    pub rows_kept: usize,
    /// Rows dropped for lacking a usable identity key or creation timestamp.
    pub rows_skipped: usize,
    /// Optional fields that were present but failed coercion and were nulled.
    pub fields_nulled: usize,
}

fn column(headers: &StringRecord, name: &str) -> Result<usize, Error> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> Option<&'r str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse the timestamp shapes the export emits.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    None
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

fn coerce_f64(raw: Option<&str>, report: &mut IngestReport) -> Option<f64> {
    match raw {
        None => None,
        Some(s) => match s.parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                report.fields_nulled += 1;
                None
            }
        },
    }
}

/// Read deployment events from CSV bytes.
///
/// Required columns: `Uuid`, `Created Date`, `Created Time`, `Action Type`,
/// `Action State`, `Charger Lat`, `Charger Lng`,
/// `Vehicle Type Scooter or Bike`.
pub fn read_deployments<R: Read>(reader: R) -> Result<(Vec<DeploymentEvent>, IngestReport), Error> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv.headers()?.clone();
    let c_uuid = column(&headers, "Uuid")?;
    let c_date = column(&headers, "Created Date")?;
    let c_time = column(&headers, "Created Time")?;
    let c_action = column(&headers, "Action Type")?;
    let c_state = column(&headers, "Action State")?;
    let c_lat = column(&headers, "Charger Lat")?;
    let c_lng = column(&headers, "Charger Lng")?;
    let c_model = column(&headers, "Vehicle Type Scooter or Bike")?;

    let mut events = Vec::new();
    let mut report = IngestReport::default();
    for (row, record) in csv.records().enumerate() {
        report.rows_read += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(row, error = %e, "unreadable deployment row, skipping");
                report.rows_skipped += 1;
                continue;
            }
        };

        let uuid = field(&record, c_uuid).and_then(|s| Uuid::parse_str(s).ok());
        let deployed_at = field(&record, c_time).and_then(parse_timestamp);
        let (Some(uuid), Some(deployed_at)) = (uuid, deployed_at) else {
            warn!(row, "deployment row without identity key or timestamp, skipping");
            report.rows_skipped += 1;
            continue;
        };

        let raw_date = field(&record, c_date);
        let deployed_on = raw_date.and_then(parse_date).unwrap_or_else(|| {
            if raw_date.is_some() {
                report.fields_nulled += 1;
            }
            deployed_at.date_naive()
        });
        let lat = coerce_f64(field(&record, c_lat), &mut report);
        let lng = coerce_f64(field(&record, c_lng), &mut report);

        events.push(DeploymentEvent {
            uuid,
            deployed_at,
            deployed_on,
            action_type: field(&record, c_action).unwrap_or_default().to_string(),
            action_state: field(&record, c_state).unwrap_or_default().to_string(),
            lat,
            lng,
            vehicle_model: field(&record, c_model).map(str::to_string),
        });
        report.rows_kept += 1;
    }
    Ok((events, report))
}

/// Read ride events from CSV bytes.
///
/// Required columns: `Uuid`, `Created Time`, `Vehicle Type Scooter or Bike`.
pub fn read_rides<R: Read>(reader: R) -> Result<(Vec<RideEvent>, IngestReport), Error> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv.headers()?.clone();
    let c_uuid = column(&headers, "Uuid")?;
    let c_time = column(&headers, "Created Time")?;
    let c_model = column(&headers, "Vehicle Type Scooter or Bike")?;

    let mut events = Vec::new();
    let mut report = IngestReport::default();
    for (row, record) in csv.records().enumerate() {
        report.rows_read += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(row, error = %e, "unreadable ride row, skipping");
                report.rows_skipped += 1;
                continue;
            }
        };

        let uuid = field(&record, c_uuid).and_then(|s| Uuid::parse_str(s).ok());
        let started_at = field(&record, c_time).and_then(parse_timestamp);
        let (Some(uuid), Some(started_at)) = (uuid, started_at) else {
            warn!(row, "ride row without identity key or timestamp, skipping");
            report.rows_skipped += 1;
            continue;
        };

        events.push(RideEvent {
            uuid,
            started_at,
            vehicle_model: field(&record, c_model).map(str::to_string),
        });
        report.rows_kept += 1;
    }
    Ok((events, report))
}

/// Read deployment events from a CSV file on disk.
pub fn read_deployments_path(
    path: impl AsRef<Path>,
) -> Result<(Vec<DeploymentEvent>, IngestReport), Error> {
    read_deployments(std::fs::File::open(path.as_ref())?)
}

/// Read ride events from a CSV file on disk.
pub fn read_rides_path(path: impl AsRef<Path>) -> Result<(Vec<RideEvent>, IngestReport), Error> {
    read_rides(std::fs::File::open(path.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DEP_HEADER: &str = "Uuid,Created Date,Created Time,Action Type,Action State,Charger Lat,Charger Lng,Vehicle Type Scooter or Bike";

    fn uuid(n: u128) -> String {
        Uuid::from_u128(n).to_string()
    }

    #[test]
    fn parses_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 10:00"), Some(expected));
        assert!(parse_timestamp("2024-01-01 10:00:00.250").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn reads_deployments_and_counts() {
        let csv = format!(
            "{DEP_HEADER}\n\
             {},2024-01-01,2024-01-01 10:00:00,deploy,completed,59.437,24.7536,scooter-v2\n\
             ,2024-01-02,2024-01-02 11:00:00,deploy,completed,59.44,24.75,scooter-v2\n\
             {},2024-01-03,2024-01-03 12:00:00,deploy,completed,not-a-lat,24.76,\n",
            uuid(1),
            uuid(2),
        );
        let (events, report) = read_deployments(csv.as_bytes()).unwrap();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_kept, 2);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.fields_nulled, 1);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].uuid, Uuid::from_u128(1));
        assert_eq!(events[0].lat, Some(59.437));
        assert_eq!(events[0].vehicle_model.as_deref(), Some("scooter-v2"));
        assert_eq!(events[1].lat, None);
        assert_eq!(events[1].vehicle_model, None);
    }

    #[test]
    fn derives_date_from_timestamp_when_blank() {
        let csv = format!(
            "{DEP_HEADER}\n{},,2024-02-05 08:30:00,deploy,completed,1.0,2.0,bike\n",
            uuid(7),
        );
        let (events, report) = read_deployments(csv.as_bytes()).unwrap();
        assert_eq!(events[0].deployed_on, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
        // a blank date is absent, not a coercion failure
        assert_eq!(report.fields_nulled, 0);
    }

    #[test]
    fn missing_header_is_an_error() {
        let csv = "Uuid,Created Date,Created Time,Action Type,Charger Lat,Charger Lng,Vehicle Type Scooter or Bike\n";
        let err = read_deployments(csv.as_bytes()).unwrap_err();
        match err {
            Error::MissingColumn(name) => assert_eq!(name, "Action State"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn reads_rides() {
        let csv = format!(
            "Uuid,Created Time,Vehicle Type Scooter or Bike\n\
             {},2024-01-01 12:00:00,scooter-v2\n\
             not-a-uuid,2024-01-01 13:00:00,scooter-v2\n",
            uuid(1),
        );
        let (rides, report) = read_rides(csv.as_bytes()).unwrap();
        assert_eq!(rides.len(), 1);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(
            rides[0].started_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
        );
    }
}
