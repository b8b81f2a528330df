// ABOUTME: HTTP client for the SQL Admin provisioning API
// ABOUTME: Handles instance insert/import/get and operation status checks

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::bodies::{import_body, InstanceBody, NewInstance, Replica, SourceRepresentation};
use super::models::{DatabaseInstance, Operation};
use crate::error::ReplicatorError;

pub const SQL_ADMIN_BASE_URL: &str = "https://sqladmin.googleapis.com/sql/v1beta4";

/// Bearer credentials for the SQL Admin service. Resolution and refresh
/// belong to the caller; this crate only attaches the token per request.
#[derive(Debug, Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

pub struct SqlAdminClient {
    client: Client,
    base_url: String,
    project: String,
    credentials: Credentials,
}

impl SqlAdminClient {
    pub fn new(project: impl Into<String>, credentials: Credentials) -> Result<Self> {
        Self::with_base_url(SQL_ADMIN_BASE_URL.to_string(), project, credentials)
    }

    pub fn with_base_url(
        base_url: String,
        project: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            project: project.into(),
            credentials,
        })
    }

    /// Provisions a plain Cloud SQL instance via `instances.insert`.
    /// Returns the raw operation response unmodified.
    pub async fn create_instance(&self, body: InstanceBody<NewInstance>) -> Result<Value> {
        self.insert(body.resolve()?).await
    }

    /// Registers a source representation of an external master. Same
    /// endpoint as `create_instance`, different default document.
    pub async fn create_source_representation(
        &self,
        body: InstanceBody<SourceRepresentation>,
    ) -> Result<Value> {
        self.insert(body.resolve()?).await
    }

    /// Provisions a replica of an already registered master.
    pub async fn create_replica_instance(&self, body: InstanceBody<Replica>) -> Result<Value> {
        self.insert(body.resolve()?).await
    }

    async fn insert(&self, body: Value) -> Result<Value> {
        let url = format!("{}/projects/{}/instances", self.base_url, self.project);
        debug!(
            name = body.get("name").and_then(serde_json::Value::as_str).unwrap_or(""),
            "inserting instance"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.token)
            .json(&body)
            .send()
            .await
            .context("Failed to send instance insert request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Instance insert failed with status {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse insert response")
    }

    /// Imports a SQL dump into the named instance via `instances.import`.
    pub async fn import_sql_database(
        &self,
        instance: &str,
        import_file_uri: &str,
    ) -> Result<Value> {
        let url = format!(
            "{}/projects/{}/instances/{}/import",
            self.base_url, self.project, instance
        );
        debug!(instance, uri = import_file_uri, "importing SQL dump");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.token)
            .json(&import_body(import_file_uri))
            .send()
            .await
            .context("Failed to send import request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Import failed with status {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse import response")
    }

    /// Single status check against `operations.get`; true iff the
    /// operation has reached DONE. Polling loops belong to the caller.
    pub async fn operation_done(&self, operation: &str) -> Result<bool> {
        let url = format!(
            "{}/projects/{}/operations/{}",
            self.base_url, self.project, operation
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials.token)
            .send()
            .await
            .context("Failed to get operation status")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Operation status check failed with status {}: {}", status, body);
        }

        let status: Operation = response
            .json()
            .await
            .context("Failed to parse operation status")?;

        Ok(status.is_done())
    }

    /// Fetches the instance description. A 404 from the service becomes
    /// `ReplicatorError::InstanceNotFound`; every other failure is passed
    /// through as-is.
    pub async fn get_instance(&self, instance: &str) -> Result<DatabaseInstance> {
        let url = format!(
            "{}/projects/{}/instances/{}",
            self.base_url, self.project, instance
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials.token)
            .send()
            .await
            .context("Failed to get instance description")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ReplicatorError::InstanceNotFound(instance.to_string()).into());
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Instance get failed with status {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse instance description")
    }

    /// Strict convenience: fetch the instance and require an OUTGOING
    /// address in its description.
    pub async fn outgoing_ip_of_instance(&self, instance: &str) -> Result<String> {
        let described = self.get_instance(instance).await?;
        let ip = described.outgoing_ip()?.to_string();
        Ok(ip)
    }

    /// Lenient convenience: fetch the instance and return whichever of
    /// the outgoing IP and service account its description carries.
    pub async fn ip_and_service_account(
        &self,
        instance: &str,
    ) -> Result<(Option<String>, Option<String>)> {
        let described = self.get_instance(instance).await?;
        Ok(described.ip_and_service_account())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SqlAdminClient::new("test-project", Credentials::bearer("token"));
        assert!(client.is_ok());
    }
}
