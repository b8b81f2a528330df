// ABOUTME: Custom error types for the replication toolkit
// ABOUTME: Domain conditions surfaced by SQL Admin API responses

use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum ReplicatorError {
    /// The named instance does not exist on the SQL Admin service (HTTP 404).
    InstanceNotFound(String),
    /// A field the caller relies on is absent from the response document.
    MissingField(&'static str),
    /// The address list is present but carries no OUTGOING entry.
    NoOutgoingAddress,
    /// A database version outside the supported set was requested.
    UnsupportedVersion(String),
}

impl fmt::Display for ReplicatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReplicatorError::InstanceNotFound(name) => {
                write!(f, "Cloud SQL instance {} not found", name)
            }
            ReplicatorError::MissingField(field) => {
                write!(f, "{} not found in response", field)
            }
            ReplicatorError::NoOutgoingAddress => {
                write!(f, "No outgoing IP address found")
            }
            ReplicatorError::UnsupportedVersion(version) => {
                write!(f, "Unsupported database version: {}", version)
            }
        }
    }
}

impl std::error::Error for ReplicatorError {}
