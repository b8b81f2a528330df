// ABOUTME: mysqldump argument assembly and the dump upload pipeline
// ABOUTME: Streams mysqldump through gzip into a Cloud Storage bucket

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Connection coordinates of the server being dumped.
#[derive(Debug, Clone)]
pub struct DumpTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Schemas to dump; empty means `--all-databases`.
    pub databases: Vec<String>,
    pub ssl_ca: Option<PathBuf>,
    pub ssl_cert: Option<PathBuf>,
    pub ssl_key: Option<PathBuf>,
    /// `db.view` entries excluded via `--ignore-table`. Views must not be
    /// dumped when seeding a replica; see `SourceDatabase::views`.
    pub ignore_tables: Vec<String>,
}

fn base_args(target: &DumpTarget, options: &DumpOptions) -> Vec<String> {
    let mut args = vec![
        "-h".to_string(),
        target.host.clone(),
        "-P".to_string(),
        target.port.to_string(),
        "-u".to_string(),
        target.user.clone(),
        format!("--password={}", target.password),
    ];

    if options.databases.is_empty() {
        args.push("--all-databases".to_string());
    } else {
        args.push("--databases".to_string());
        args.extend(options.databases.iter().cloned());
    }

    if let Some(ca) = &options.ssl_ca {
        args.push("--ssl-ca".to_string());
        args.push(ca.display().to_string());
    }
    if let Some(cert) = &options.ssl_cert {
        args.push("--ssl-cert".to_string());
        args.push(cert.display().to_string());
    }
    if let Some(key) = &options.ssl_key {
        args.push("--ssl-key".to_string());
        args.push(key.display().to_string());
    }

    args
}

/// Argument vector for a replica-seeding dump. The flag set pins binlog
/// coordinates (`--master-data=1`, `--set-gtid-purged=on`) so the dump
/// can bootstrap a Cloud SQL replica.
pub fn replica_dump_args(target: &DumpTarget, options: &DumpOptions) -> Vec<String> {
    let mut args = base_args(target, options);
    args.extend(
        [
            "--skip-comments",
            "--hex-blob",
            "--skip-triggers",
            "--master-data=1",
            "--order-by-primary",
            "--no-autocommit",
            "--default-character-set=utf8",
            "--single-transaction",
            "--set-gtid-purged=on",
        ]
        .map(String::from),
    );
    for entry in &options.ignore_tables {
        args.push(format!("--ignore-table={}", entry));
    }
    args
}

/// Argument vector for a plain dump of an externally managed server,
/// without replication coordinates.
pub fn plain_dump_args(target: &DumpTarget, options: &DumpOptions) -> Vec<String> {
    let mut args = base_args(target, options);
    args.extend(
        [
            "--single-transaction",
            "--flush-privileges",
            "--hex-blob",
            "--skip-triggers",
            "--default-character-set=utf8",
        ]
        .map(String::from),
    );
    args
}

/// Runs `mysqldump | gzip | gsutil cp - <bucket_url>`. Only process exit
/// statuses are checked; the caller is responsible for verifying the
/// object actually landed in the bucket.
pub async fn dump_to_bucket(args: &[String], bucket_url: &str) -> Result<()> {
    let mysqldump = which::which("mysqldump").context("mysqldump not found on PATH")?;
    let gzip = which::which("gzip").context("gzip not found on PATH")?;
    let gsutil = which::which("gsutil").context("gsutil not found on PATH")?;

    info!(bucket_url, "streaming SQL dump to bucket");

    let mut dump = Command::new(mysqldump)
        .args(args)
        .stdout(Stdio::piped())
        .spawn()
        .context("Failed to spawn mysqldump")?;
    let dump_stdout: Stdio = dump
        .stdout
        .take()
        .context("mysqldump stdout not captured")?
        .try_into()
        .context("Failed to wire mysqldump stdout")?;

    let mut compress = Command::new(gzip)
        .stdin(dump_stdout)
        .stdout(Stdio::piped())
        .spawn()
        .context("Failed to spawn gzip")?;
    let compress_stdout: Stdio = compress
        .stdout
        .take()
        .context("gzip stdout not captured")?
        .try_into()
        .context("Failed to wire gzip stdout")?;

    let mut upload = Command::new(gsutil)
        .args(["cp", "-", bucket_url])
        .stdin(compress_stdout)
        .spawn()
        .context("Failed to spawn gsutil")?;

    let dump_status = dump.wait().await.context("mysqldump did not run")?;
    if !dump_status.success() {
        bail!("mysqldump exited with {}", dump_status);
    }
    let compress_status = compress.wait().await.context("gzip did not run")?;
    if !compress_status.success() {
        bail!("gzip exited with {}", compress_status);
    }
    let upload_status = upload.wait().await.context("gsutil did not run")?;
    if !upload_status.success() {
        bail!("gsutil upload to {} exited with {}", bucket_url, upload_status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> DumpTarget {
        DumpTarget {
            host: "203.0.113.10".to_string(),
            port: 3306,
            user: "repl".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_replica_args_pin_replication_coordinates() {
        let args = replica_dump_args(&target(), &DumpOptions::default());
        assert!(args.contains(&"--master-data=1".to_string()));
        assert!(args.contains(&"--set-gtid-purged=on".to_string()));
        assert!(args.contains(&"--single-transaction".to_string()));
        assert!(args.contains(&"--all-databases".to_string()));
        assert!(args.contains(&"--password=secret".to_string()));
    }

    #[test]
    fn test_plain_args_omit_replication_coordinates() {
        let args = plain_dump_args(&target(), &DumpOptions::default());
        assert!(args.contains(&"--flush-privileges".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--master-data")));
        assert!(!args.iter().any(|a| a.starts_with("--set-gtid-purged")));
    }

    #[test]
    fn test_named_databases_listed_separately() {
        let options = DumpOptions {
            databases: vec!["shop".to_string(), "billing".to_string()],
            ..Default::default()
        };
        let args = plain_dump_args(&target(), &options);
        let flag = args.iter().position(|a| a == "--databases").unwrap();
        assert_eq!(args[flag + 1], "shop");
        assert_eq!(args[flag + 2], "billing");
        assert!(!args.contains(&"--all-databases".to_string()));
    }

    #[test]
    fn test_views_become_ignore_table_entries() {
        let options = DumpOptions {
            databases: vec!["shop".to_string()],
            ignore_tables: vec!["shop.orders_view".to_string()],
            ..Default::default()
        };
        let args = replica_dump_args(&target(), &options);
        assert!(args.contains(&"--ignore-table=shop.orders_view".to_string()));
    }

    #[test]
    fn test_ssl_flags_take_paths() {
        let options = DumpOptions {
            ssl_ca: Some(PathBuf::from("/certs/ca.pem")),
            ssl_cert: Some(PathBuf::from("/certs/client.pem")),
            ssl_key: Some(PathBuf::from("/certs/client-key.pem")),
            ..Default::default()
        };
        let args = plain_dump_args(&target(), &options);
        let flag = args.iter().position(|a| a == "--ssl-ca").unwrap();
        assert_eq!(args[flag + 1], "/certs/ca.pem");
        assert!(args.contains(&"--ssl-cert".to_string()));
        assert!(args.contains(&"--ssl-key".to_string()));
    }
}
