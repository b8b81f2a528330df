// ABOUTME: Data structures for SQL Admin API response documents
// ABOUTME: Deserialized instance descriptions and operation status

use serde::Deserialize;

use crate::error::ReplicatorError;

const OUTGOING: &str = "OUTGOING";

/// One entry of an instance's address list.
#[derive(Debug, Clone, Deserialize)]
pub struct IpMapping {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "ipAddress")]
    pub ip_address: Option<String>,
}

/// Description of a Cloud SQL instance as returned by `instances.get`.
/// The address list stays `Option` so a response without the field is
/// distinguishable from one with an empty list.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseInstance {
    pub name: Option<String>,
    #[serde(rename = "ipAddresses")]
    pub ip_addresses: Option<Vec<IpMapping>>,
    #[serde(rename = "serviceAccountEmailAddress")]
    pub service_account_email_address: Option<String>,
}

impl DatabaseInstance {
    fn first_outgoing(&self) -> Option<&IpMapping> {
        // First OUTGOING entry in list order wins when several exist.
        self.ip_addresses
            .as_deref()
            .and_then(|addresses| addresses.iter().find(|a| a.kind == OUTGOING))
    }

    /// Strict extraction: the address list and an OUTGOING entry must both
    /// be present, each absence a distinct failure.
    pub fn outgoing_ip(&self) -> Result<&str, ReplicatorError> {
        let addresses = self
            .ip_addresses
            .as_deref()
            .ok_or(ReplicatorError::MissingField("ipAddresses"))?;
        let outgoing = addresses
            .iter()
            .find(|a| a.kind == OUTGOING)
            .ok_or(ReplicatorError::NoOutgoingAddress)?;
        outgoing
            .ip_address
            .as_deref()
            .ok_or(ReplicatorError::MissingField("ipAddress"))
    }

    /// Lenient extraction: never fails, a missing half is simply `None`.
    pub fn ip_and_service_account(&self) -> (Option<String>, Option<String>) {
        let ip = self
            .first_outgoing()
            .and_then(|outgoing| outgoing.ip_address.clone());
        (ip, self.service_account_email_address.clone())
    }
}

/// Status document of a long-running SQL Admin operation.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub status: Option<String>,
}

impl Operation {
    pub const DONE: &'static str = "DONE";

    pub fn is_done(&self) -> bool {
        self.status.as_deref() == Some(Self::DONE)
    }
}
