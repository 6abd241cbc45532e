//! Named operational zones.

use geo::MultiPolygon;
use serde::Serialize;

/// A named operational zone in geographic (WGS84) coordinates.
///
/// Single polygons are widened to a one-element multi-polygon at parse time
/// so membership tests have one shape to deal with. Zones keep the order of
/// their source feature collection; that order is the tie-break when
/// buffered zones overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    /// Zone name, from the feature's `name` property.
    pub name: String,

    /// Zone boundary in geographic coordinates.
    pub boundary: MultiPolygon<f64>,
}
