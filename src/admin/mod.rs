// ABOUTME: SQL Admin API façade module
// ABOUTME: Request-body defaulting, the HTTP client, and response models

pub mod bodies;
pub mod client;
pub mod models;

pub use bodies::{import_body, InstanceBody, NewInstance, Replica, SourceRepresentation};
pub use client::{Credentials, SqlAdminClient, SQL_ADMIN_BASE_URL};
pub use models::{DatabaseInstance, IpMapping, Operation};
