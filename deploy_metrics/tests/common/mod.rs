#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use deploy_metrics::db;
use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_events::models::{DeploymentEvent, RideEvent};
use tempfile::TempDir;
use uuid::Uuid;

pub struct TestDb {
    _dir: TempDir, // keep alive for the life of the test
    pub path: PathBuf,
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("test.db");
    let conn = db::open_store(&path).expect("open store");
    (TestDb { _dir: dir, path }, conn)
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    n: i64,
}

pub fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
    let row: CountRow = diesel::sql_query(format!("SELECT COUNT(*) AS n FROM {table}"))
        .get_result(conn)
        .expect("count");
    row.n
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

pub fn deployment(uuid: u128, deployed_at: DateTime<Utc>) -> DeploymentEvent {
    DeploymentEvent {
        uuid: Uuid::from_u128(uuid),
        deployed_at,
        deployed_on: deployed_at.date_naive(),
        action_type: "deploy".into(),
        action_state: "completed".into(),
        lat: Some(0.005),
        lng: Some(0.005),
        vehicle_model: Some("scooter-v2".into()),
    }
}

pub fn ride(uuid: u128, started_at: DateTime<Utc>) -> RideEvent {
    RideEvent {
        uuid: Uuid::from_u128(uuid),
        started_at,
        vehicle_model: Some("scooter-v2".into()),
    }
}
