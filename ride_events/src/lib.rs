//! Input side of the deployment → first-ride pipeline: canonical event and
//! zone models plus lenient readers for the fleet tool's CSV exports and the
//! deployment-zone GeoJSON.

pub mod csv_source;
pub mod errors;
pub mod models;
pub mod zone_source;

pub use errors::Error;
