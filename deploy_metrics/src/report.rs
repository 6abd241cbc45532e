//! Analysis pipeline: explicit request parameters in, derived tables out.
//!
//! [`run_analysis`] is a pure function over its inputs, with no session or
//! widget state behind it: eligibility filter, then zone attribution, then
//! first-ride matching, then the date filter and aggregation. Derived tables
//! are rebuilt from scratch on every call; nothing here touches the store.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use ride_events::models::{DeploymentEvent, RideEvent, Zone};

use crate::matching;
use crate::metrics::{self, HistogramBucket, Kpis, ModelStat, ZoneStat, ZoneThresholds};
use crate::zones;

/// Request validation failures.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The supplied date range is inverted.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Requested range start.
        start: NaiveDate,
        /// Requested range end.
        end: NaiveDate,
    },
}

/// Inclusive date range over deployment dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a validated inclusive range.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AnalysisError> {
        if start > end {
            return Err(AnalysisError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Parameters of one analysis pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisRequest {
    /// Optional inclusive filter on the deployment date.
    pub date_range: Option<DateRange>,
}

/// One row of the per-deployment first-ride table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentOutcome {
    /// Vehicle identity.
    pub uuid: Uuid,
    /// Deployment date.
    pub deployed_on: NaiveDate,
    /// Deployment timestamp.
    pub deployed_at: DateTime<Utc>,
    /// Start of the first qualifying ride.
    pub first_ride_at: DateTime<Utc>,
    /// Zone the deployment was attributed to, if any.
    pub zone: Option<String>,
    /// Vehicle model tag, if any.
    pub vehicle_model: Option<String>,
    /// Time to first ride. Exposed to renderers through `hours`.
    #[serde(skip)]
    pub elapsed: TimeDelta,
    /// Time to first ride in hours.
    pub hours: f64,
}

/// A map-ready deployment point that never saw a ride.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoRidePoint {
    /// Vehicle identity.
    pub uuid: Uuid,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Zone the deployment was attributed to, if any.
    pub zone: Option<String>,
}

/// Map-ready bundle: unmatched deployment points plus zone polygons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// Deployments in the filter window with no qualifying ride and known
    /// coordinates.
    pub points: Vec<NoRidePoint>,
    /// Zone polygons, in feature order.
    pub zones: Vec<Zone>,
}

/// Everything the presentation layer renders for one request.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    /// Scalar KPI block for the filter window.
    pub kpis: Kpis,
    /// Matched per-deployment outcomes, in deployment order.
    pub first_rides: Vec<DeploymentOutcome>,
    /// Histogram of hours to first ride in 5-hour buckets.
    pub histogram: Vec<HistogramBucket>,
    /// Mean hours per vehicle model, ascending.
    pub model_stats: Vec<ModelStat>,
    /// Per-zone summary, slowest zones first.
    pub zone_stats: Vec<ZoneStat>,
    /// Color-scale thresholds over the defined zone means.
    pub zone_thresholds: Option<ZoneThresholds>,
    /// Unmatched deployments plus zone polygons for spatial display.
    pub map_view: MapView,
}

/// Run one full analysis pass.
///
/// Matching happens before the date filter: the window restricts which
/// deployments are reported, not which rides may answer them.
pub fn run_analysis(
    deployments: &[DeploymentEvent],
    rides: &[RideEvent],
    zone_set: &[Zone],
    request: &AnalysisRequest,
) -> DashboardReport {
    let eligible: Vec<DeploymentEvent> = deployments
        .iter()
        .filter(|dep| dep.is_eligible())
        .cloned()
        .collect();
    let zone_names = zones::attribute_zones(zone_set, &eligible);
    let outcome = matching::match_first_rides(&eligible, rides);

    let in_window = |dep: &DeploymentEvent| {
        request
            .date_range
            .is_none_or(|range| range.contains(dep.deployed_at.date_naive()))
    };

    let mut first_rides = Vec::new();
    let mut window_zones: Vec<Option<String>> = Vec::new();
    for m in &outcome.matched {
        let dep = &eligible[m.deployment_idx];
        if !in_window(dep) {
            continue;
        }
        window_zones.push(zone_names[m.deployment_idx].clone());
        first_rides.push(DeploymentOutcome {
            uuid: dep.uuid,
            deployed_on: dep.deployed_on,
            deployed_at: dep.deployed_at,
            first_ride_at: m.ride_time,
            zone: zone_names[m.deployment_idx].clone(),
            // the deployment's tag wins; the matched ride's tag fills gaps
            vehicle_model: dep.vehicle_model.clone().or_else(|| m.ride_model.clone()),
            elapsed: m.elapsed,
            hours: m.hours,
        });
    }

    let mut points = Vec::new();
    let mut no_ride_count = 0;
    for &idx in &outcome.no_ride {
        let dep = &eligible[idx];
        if !in_window(dep) {
            continue;
        }
        no_ride_count += 1;
        window_zones.push(zone_names[idx].clone());
        if let (Some(lat), Some(lng)) = (dep.lat, dep.lng) {
            points.push(NoRidePoint {
                uuid: dep.uuid,
                lat,
                lng,
                zone: zone_names[idx].clone(),
            });
        }
    }

    let hours: Vec<f64> = first_rides.iter().map(|row| row.hours).collect();
    let kpis = Kpis {
        total_deployments: first_rides.len() + no_ride_count,
        no_ride_count,
        mean_hours: metrics::mean(&hours),
    };

    let model_records: Vec<(String, f64)> = first_rides
        .iter()
        .filter_map(|row| row.vehicle_model.clone().map(|model| (model, row.hours)))
        .collect();
    let matched_zones: Vec<(Option<String>, f64)> = first_rides
        .iter()
        .map(|row| (row.zone.clone(), row.hours))
        .collect();
    let zone_stats = metrics::zone_stats(&window_zones, &matched_zones);
    let zone_thresholds = metrics::zone_thresholds(&zone_stats);

    info!(
        total = kpis.total_deployments,
        matched = first_rides.len(),
        no_ride = no_ride_count,
        "analysis pass complete"
    );

    DashboardReport {
        kpis,
        histogram: metrics::histogram(&hours),
        model_stats: metrics::model_means(&model_records),
        zone_stats,
        zone_thresholds,
        first_rides,
        map_view: MapView {
            points,
            zones: zone_set.to_vec(),
        },
    }
}
