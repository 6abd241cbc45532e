//! Record store: idempotent bulk insert and stable loads.
//!
//! ## What this does
//! - UPSERTs uploaded deployment/ride events with `INSERT OR IGNORE` on the
//!   composite primary key, so re-uploading the same export (or overlapping
//!   exports) accumulates without duplicates.
//! - Loads full table contents in a stable (timestamp, uuid) order for the
//!   analysis pass.
//!
//! ## Transactions
//! Each upsert batch runs inside a single `BEGIN IMMEDIATE` transaction via
//! [`SqliteConnection::immediate_transaction`]: either the whole upload
//! lands or none of it.

use diesel::prelude::*;
use diesel::{SqliteConnection, insert_or_ignore_into};
use ride_events::models::{DeploymentEvent, RideEvent};
use tracing::info;

use crate::models::{DeploymentRow, NewDeploymentRow, NewRideRow, RideRow};
use crate::schema::{deployments, rides};

// Keeps each statement well under SQLite's bind-variable limit.
const INSERT_CHUNK: usize = 256;

/// Outcome of one upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreReport {
    /// Rows newly inserted.
    pub inserted: usize,
    /// Rows ignored because their key already existed.
    pub ignored: usize,
}

/// Insert deployment events, silently skipping keys already present.
pub fn upsert_deployments(
    conn: &mut SqliteConnection,
    events: &[DeploymentEvent],
) -> anyhow::Result<StoreReport> {
    let rows: Vec<NewDeploymentRow> = events.iter().map(NewDeploymentRow::from).collect();
    let inserted = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let mut n = 0;
        for chunk in rows.chunks(INSERT_CHUNK) {
            n += insert_or_ignore_into(deployments::table)
                .values(chunk)
                .execute(conn)?;
        }
        Ok(n)
    })?;
    let report = StoreReport {
        inserted,
        ignored: events.len().saturating_sub(inserted),
    };
    info!(inserted = report.inserted, ignored = report.ignored, "deployments upsert");
    Ok(report)
}

/// Insert ride events, silently skipping keys already present.
pub fn upsert_rides(
    conn: &mut SqliteConnection,
    events: &[RideEvent],
) -> anyhow::Result<StoreReport> {
    let rows: Vec<NewRideRow> = events.iter().map(NewRideRow::from).collect();
    let inserted = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let mut n = 0;
        for chunk in rows.chunks(INSERT_CHUNK) {
            n += insert_or_ignore_into(rides::table)
                .values(chunk)
                .execute(conn)?;
        }
        Ok(n)
    })?;
    let report = StoreReport {
        inserted,
        ignored: events.len().saturating_sub(inserted),
    };
    info!(inserted = report.inserted, ignored = report.ignored, "rides upsert");
    Ok(report)
}

/// Load all deployment events in (deployed_at, uuid) order.
pub fn load_deployments(conn: &mut SqliteConnection) -> anyhow::Result<Vec<DeploymentEvent>> {
    let rows: Vec<DeploymentRow> = deployments::table
        .order((deployments::deployed_at.asc(), deployments::uuid.asc()))
        .select(DeploymentRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().filter_map(DeploymentRow::into_event).collect())
}

/// Load all ride events in (started_at, uuid) order.
pub fn load_rides(conn: &mut SqliteConnection) -> anyhow::Result<Vec<RideEvent>> {
    let rows: Vec<RideRow> = rides::table
        .order((rides::started_at.asc(), rides::uuid.asc()))
        .select(RideRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().filter_map(RideRow::into_event).collect())
}
