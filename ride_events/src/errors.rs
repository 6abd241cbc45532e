use thiserror::Error;

/// The unified error type for the `ride_events` crate.
///
/// Row- and field-level data problems are not errors: the readers degrade
/// them to skips or `None` fields and count them in their reports. Only
/// failures that invalidate a whole upload surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// A required column is missing from an uploaded CSV header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The CSV reader failed outside of row-level recovery.
    #[error("CSV error")]
    Csv(#[from] csv::Error),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The zone document could not be parsed as GeoJSON.
    #[error("GeoJSON error")]
    GeoJson(#[from] geojson::Error),
}
