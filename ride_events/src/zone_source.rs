//! GeoJSON reader for deployment zones.
//!
//! The zone document is a FeatureCollection whose features carry a `name`
//! property and a Polygon or MultiPolygon geometry. Features with other
//! geometry types are skipped with a warning; an unnamed feature gets a
//! positional fallback name so it still shows up in reports.

use geo::MultiPolygon;
use geojson::{FeatureCollection, GeoJson};
use tracing::warn;

use crate::errors::Error;
use crate::models::Zone;

/// Parse a GeoJSON document into zones, preserving feature order.
pub fn read_zones(text: &str) -> Result<Vec<Zone>, Error> {
    let geojson: GeoJson = text.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;

    let mut zones = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("name"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("zone-{index}"));

        let Some(geometry) = feature.geometry else {
            warn!(feature = index, zone = %name, "zone feature has no geometry, skipping");
            continue;
        };
        match geo::Geometry::<f64>::try_from(geometry) {
            Ok(geo::Geometry::Polygon(polygon)) => zones.push(Zone {
                name,
                boundary: MultiPolygon(vec![polygon]),
            }),
            Ok(geo::Geometry::MultiPolygon(boundary)) => zones.push(Zone { name, boundary }),
            Ok(_) | Err(_) => {
                warn!(feature = index, zone = %name, "zone feature is not polygonal, skipping");
            }
        }
    }
    Ok(zones)
}
