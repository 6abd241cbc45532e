//! Canonical in-memory representation of a ride event.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single ride event: a rental beginning at some point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct RideEvent {
    /// Vehicle identity; the same key space as
    /// [`DeploymentEvent`](crate::models::DeploymentEvent).
    pub uuid: Uuid,

    /// Ride start timestamp (UTC).
    pub started_at: DateTime<Utc>,

    /// Vehicle model tag, when the export carries one.
    pub vehicle_model: Option<String>,
}
