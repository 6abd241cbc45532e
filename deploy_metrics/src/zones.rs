//! Spatial zone attribution.
//!
//! Zones arrive as WGS84 polygons. Membership is decided against the zone
//! grown by a fixed 50 m tolerance (GPS jitter at the zone edge): both sides
//! are projected into the spherical-Mercator plane and a point counts as
//! inside when its Euclidean distance to the zone geometry is at most the
//! tolerance. Distance to a containing polygon is zero, so buffering only
//! ever grows coverage, and a point exactly on the unbuffered boundary is
//! always covered.
//!
//! When buffered zones overlap, the first zone in feature order wins.

use geo::{Coord, EuclideanDistance, MapCoords, MultiPolygon, Point};
use ride_events::models::{DeploymentEvent, Zone};

/// Buffer applied around zone boundaries, in Mercator meters.
pub const ZONE_BUFFER_METERS: f64 = 50.0;

const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Project a WGS84 coordinate into the spherical-Mercator plane (meters).
fn to_mercator(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: EARTH_RADIUS_METERS * c.x.to_radians(),
        y: EARTH_RADIUS_METERS
            * (std::f64::consts::FRAC_PI_4 + c.y.to_radians() / 2.0).tan().ln(),
    }
}

/// A zone reprojected into the Mercator plane for membership tests.
#[derive(Debug, Clone)]
pub struct ProjectedZone {
    /// Zone name, as named in the source feature collection.
    pub name: String,
    boundary: MultiPolygon<f64>,
}

impl ProjectedZone {
    fn covers(&self, point: Point<f64>) -> bool {
        point.euclidean_distance(&self.boundary) <= ZONE_BUFFER_METERS
    }
}

/// Project all zones, preserving feature order (the overlap tie-break).
pub fn project_zones(zones: &[Zone]) -> Vec<ProjectedZone> {
    zones
        .iter()
        .map(|zone| ProjectedZone {
            name: zone.name.clone(),
            boundary: zone.boundary.map_coords(to_mercator),
        })
        .collect()
}

/// Assign a geographic point to the first buffered zone covering it.
pub fn assign_zone(zones: &[ProjectedZone], lat: f64, lng: f64) -> Option<&str> {
    let point = Point::from(to_mercator(Coord { x: lng, y: lat }));
    zones
        .iter()
        .find(|zone| zone.covers(point))
        .map(|zone| zone.name.as_str())
}

/// Attribute every deployment to a zone name, or `None` when unassigned.
///
/// Deployments without coordinates are unassigned; a point far from every
/// zone is unassigned, not an error.
pub fn attribute_zones(zones: &[Zone], deployments: &[DeploymentEvent]) -> Vec<Option<String>> {
    let projected = project_zones(zones);
    deployments
        .iter()
        .map(|dep| match (dep.lat, dep.lng) {
            (Some(lat), Some(lng)) => assign_zone(&projected, lat, lng).map(str::to_string),
            _ => None,
        })
        .collect()
}
