//! Canonical in-memory representation of a vehicle deployment event.
//!
//! This struct is the standard shape for deployment rows regardless of where
//! they came from (fresh CSV upload or the persistent store).

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A single vehicle deployment event.
///
/// Optional fields survive ingest even when the export left them blank or
/// uncoercible; downstream stages treat them as absent rather than failing.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentEvent {
    /// Vehicle identity. Shared key space with [`RideEvent`](crate::models::RideEvent):
    /// first-ride matching joins on this value.
    pub uuid: Uuid,

    /// Creation timestamp (UTC).
    pub deployed_at: DateTime<Utc>,

    /// Creation date as reported by the export, derived from `deployed_at`
    /// when the export's date column is blank or malformed.
    pub deployed_on: NaiveDate,

    /// Action recorded by the fleet tool (e.g., "deploy", "pickup").
    pub action_type: String,

    /// State of the action (e.g., "completed", "cancelled").
    pub action_state: String,

    /// Latitude of the deployment point. Not all rows carry coordinates.
    pub lat: Option<f64>,

    /// Longitude of the deployment point.
    pub lng: Option<f64>,

    /// Vehicle model tag (e.g., scooter vs. bike model). Not all providers
    /// fill this in.
    pub vehicle_model: Option<String>,
}

impl DeploymentEvent {
    /// Whether this event can participate in first-ride matching: a
    /// completed "deploy" action. Comparison trims and ignores ASCII case.
    pub fn is_eligible(&self) -> bool {
        self.action_type.trim().eq_ignore_ascii_case("deploy")
            && self.action_state.trim().eq_ignore_ascii_case("completed")
    }
}
