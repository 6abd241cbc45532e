//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`] for use with Diesel's Queryable/Insertable APIs:
//! - [`crate::schema::deployments`] — one row per deployment event
//! - [`crate::schema::rides`] — one row per ride event
//!
//! Timestamps persist as RFC3339 UTC TEXT (which also sorts
//! chronologically); conversion to and from the canonical chrono-backed
//! event models happens here. Loading is permissive: a row whose stored
//! values no longer parse converts to `None` and is dropped by the loaders
//! rather than failing the pass.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use diesel::prelude::*;
use ride_events::models::{DeploymentEvent, RideEvent};
use uuid::Uuid;

use crate::schema::{deployments, rides};

/// A row in [`crate::schema::deployments`].
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = deployments, check_for_backend(diesel::sqlite::Sqlite))]
pub struct DeploymentRow {
    /// Vehicle identity (UUID text). First half of the primary key.
    pub uuid: String,
    /// Creation timestamp, RFC3339 UTC. Second half of the primary key.
    pub deployed_at: String,
    /// Creation date, `YYYY-MM-DD`.
    pub deployed_on: String,
    /// Action recorded by the fleet tool.
    pub action_type: String,
    /// Action state.
    pub action_state: String,
    /// Latitude, when the export carried one.
    pub lat: Option<f64>,
    /// Longitude, when the export carried one.
    pub lng: Option<f64>,
    /// Vehicle model tag.
    pub vehicle_model: Option<String>,
}

/// Insertable form of [`DeploymentRow`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deployments)]
pub struct NewDeploymentRow {
    /// Vehicle identity (UUID text).
    pub uuid: String,
    /// Creation timestamp, RFC3339 UTC.
    pub deployed_at: String,
    /// Creation date, `YYYY-MM-DD`.
    pub deployed_on: String,
    /// Action recorded by the fleet tool.
    pub action_type: String,
    /// Action state.
    pub action_state: String,
    /// Latitude, when known.
    pub lat: Option<f64>,
    /// Longitude, when known.
    pub lng: Option<f64>,
    /// Vehicle model tag.
    pub vehicle_model: Option<String>,
}

/// A row in [`crate::schema::rides`].
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rides, check_for_backend(diesel::sqlite::Sqlite))]
pub struct RideRow {
    /// Vehicle identity (UUID text). First half of the primary key.
    pub uuid: String,
    /// Ride start timestamp, RFC3339 UTC. Second half of the primary key.
    pub started_at: String,
    /// Vehicle model tag.
    pub vehicle_model: Option<String>,
}

/// Insertable form of [`RideRow`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rides)]
pub struct NewRideRow {
    /// Vehicle identity (UUID text).
    pub uuid: String,
    /// Ride start timestamp, RFC3339 UTC.
    pub started_at: String,
    /// Vehicle model tag.
    pub vehicle_model: Option<String>,
}

fn to_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn from_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl From<&DeploymentEvent> for NewDeploymentRow {
    fn from(event: &DeploymentEvent) -> Self {
        Self {
            uuid: event.uuid.to_string(),
            deployed_at: to_rfc3339(event.deployed_at),
            deployed_on: event.deployed_on.to_string(),
            action_type: event.action_type.clone(),
            action_state: event.action_state.clone(),
            lat: event.lat,
            lng: event.lng,
            vehicle_model: event.vehicle_model.clone(),
        }
    }
}

impl From<&RideEvent> for NewRideRow {
    fn from(event: &RideEvent) -> Self {
        Self {
            uuid: event.uuid.to_string(),
            started_at: to_rfc3339(event.started_at),
            vehicle_model: event.vehicle_model.clone(),
        }
    }
}

impl DeploymentRow {
    /// Convert back to the canonical event model.
    ///
    /// `None` when the stored identity or timestamp no longer parses; a
    /// malformed date column falls back to the timestamp's date.
    pub fn into_event(self) -> Option<DeploymentEvent> {
        let uuid = Uuid::parse_str(&self.uuid).ok()?;
        let deployed_at = from_rfc3339(&self.deployed_at)?;
        let deployed_on = NaiveDate::parse_from_str(&self.deployed_on, "%Y-%m-%d")
            .unwrap_or_else(|_| deployed_at.date_naive());
        Some(DeploymentEvent {
            uuid,
            deployed_at,
            deployed_on,
            action_type: self.action_type,
            action_state: self.action_state,
            lat: self.lat,
            lng: self.lng,
            vehicle_model: self.vehicle_model,
        })
    }
}

impl RideRow {
    /// Convert back to the canonical event model; `None` when the stored
    /// identity or timestamp no longer parses.
    pub fn into_event(self) -> Option<RideEvent> {
        Some(RideEvent {
            uuid: Uuid::parse_str(&self.uuid).ok()?,
            started_at: from_rfc3339(&self.started_at)?,
            vehicle_model: self.vehicle_model,
        })
    }
}
