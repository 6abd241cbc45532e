//! Canonical in-memory models shared across the pipeline.

pub mod deployment;
pub mod ride;
pub mod zone;

pub use deployment::DeploymentEvent;
pub use ride::RideEvent;
pub use zone::Zone;
