// ABOUTME: Cloud SQL replication toolkit library root
// ABOUTME: SQL Admin façade plus source preflight checks and dump utilities

pub mod admin;
pub mod dump;
pub mod error;
pub mod source;

pub use admin::{Credentials, InstanceBody, NewInstance, Replica, SourceRepresentation, SqlAdminClient};
pub use error::ReplicatorError;
