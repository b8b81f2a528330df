// ABOUTME: Preflight checks against the external MySQL master
// ABOUTME: Verifies version, GTID mode, and SSL before replication setup

use anyhow::{Context, Result};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySqlPool, Row};

/// Connection to the external master used to verify replication
/// requirements before any Cloud SQL resource is provisioned.
pub struct SourceDatabase {
    pool: MySqlPool,
}

impl SourceDatabase {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect(url)
            .await
            .context("Failed to connect to source MySQL server")?;
        Ok(Self { pool })
    }

    pub async fn server_version(&self) -> Result<String> {
        sqlx::query_scalar("SELECT VERSION()")
            .fetch_one(&self.pool)
            .await
            .context("Failed to query server version")
    }

    /// Replication into Cloud SQL supports 5.6 and 5.7 masters only.
    pub async fn is_supported_version(&self) -> Result<bool> {
        let version = self.server_version().await?;
        Ok(version_is_supported(&version))
    }

    pub async fn gtid_mode_on(&self) -> Result<bool> {
        let mode: String = sqlx::query_scalar("SELECT @@GLOBAL.gtid_mode")
            .fetch_one(&self.pool)
            .await
            .context("Failed to query GTID mode")?;
        Ok(mode == "ON")
    }

    pub async fn ssl_in_use(&self) -> Result<bool> {
        let row = sqlx::query("SHOW STATUS LIKE 'Ssl_cipher'")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query SSL status")?;
        match row {
            Some(row) => {
                let cipher: String = row.try_get("Value")?;
                Ok(!cipher.is_empty())
            }
            None => Ok(false),
        }
    }

    /// Views in the given schema. mysqldump re-creates views as tables
    /// when seeding a replica, so the dump must skip them.
    pub async fn views(&self, database: &str) -> Result<Vec<String>> {
        sqlx::query_scalar(
            "SELECT table_name FROM information_schema.views WHERE table_schema = ?",
        )
        .bind(database)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list views")
    }
}

/// True for 5.6 and 5.7 servers. The version string carries a build
/// suffix ("5.7.34-log"), so only the major.minor prefix is inspected.
pub fn version_is_supported(version: &str) -> bool {
    let mut parts = version.split('.');
    matches!(
        (parts.next(), parts.next()),
        (Some("5"), Some("6")) | (Some("5"), Some("7"))
    )
}
