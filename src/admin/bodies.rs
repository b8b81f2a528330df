// ABOUTME: Request-body construction for SQL Admin instance operations
// ABOUTME: Resolves caller overrides or builds documented default documents

use rand::distributions::{Alphanumeric, DistString};
use serde_json::{json, Value};

use crate::error::ReplicatorError;

pub const DEFAULT_DATABASE_VERSION: &str = "MYSQL_5_7";
pub const DEFAULT_TIER: &str = "db-n1-standard-2";
pub const DEFAULT_REGION: &str = "us-central1";
pub const DEFAULT_REPLICATION_PORT: u16 = 3306;

pub const SUPPORTED_VERSIONS: [&str; 2] = ["MYSQL_5_6", "MYSQL_5_7"];

pub const INSTANCE_NAME_PREFIX: &str = "cloudsql-db";
pub const SOURCE_NAME_PREFIX: &str = "external-mysql-representation";
pub const REPLICA_NAME_PREFIX: &str = "cloudsql-replica";

const NAME_TOKEN_LEN: usize = 12;

/// Builds the default insert document for one action kind.
pub trait BuildBody {
    fn build(self) -> Result<Value, ReplicatorError>;
}

/// Body for an `instances.insert` call: either a caller-supplied document
/// used verbatim, or per-field parameters expanded into the default
/// document. The override is all-or-nothing; when `Explicit` is given,
/// every per-field parameter is ignored.
#[derive(Debug, Clone)]
pub enum InstanceBody<P> {
    Explicit(Value),
    Defaulted(P),
}

impl<P: BuildBody> InstanceBody<P> {
    pub fn resolve(self) -> Result<Value, ReplicatorError> {
        match self {
            InstanceBody::Explicit(body) => Ok(body),
            InstanceBody::Defaulted(params) => params.build(),
        }
    }
}

/// Parameters for a plain second-generation instance.
#[derive(Debug, Clone, Default)]
pub struct NewInstance {
    pub name: Option<String>,
}

impl BuildBody for NewInstance {
    fn build(self) -> Result<Value, ReplicatorError> {
        let name = self
            .name
            .unwrap_or_else(|| generated_name(INSTANCE_NAME_PREFIX));
        Ok(json!({
            "name": name,
            "settings": {
                "tier": DEFAULT_TIER,
            },
        }))
    }
}

/// Parameters for a source representation of an external master.
#[derive(Debug, Clone)]
pub struct SourceRepresentation {
    pub ip_address: String,
    pub port: u16,
    pub database_version: Option<String>,
    pub region: Option<String>,
    pub name: Option<String>,
}

impl SourceRepresentation {
    pub fn new(ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            port: DEFAULT_REPLICATION_PORT,
            database_version: None,
            region: None,
            name: None,
        }
    }
}

impl BuildBody for SourceRepresentation {
    fn build(self) -> Result<Value, ReplicatorError> {
        let version = self
            .database_version
            .unwrap_or_else(|| DEFAULT_DATABASE_VERSION.to_string());
        if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
            return Err(ReplicatorError::UnsupportedVersion(version));
        }
        let name = self.name.unwrap_or_else(|| generated_name(SOURCE_NAME_PREFIX));
        let region = self.region.unwrap_or_else(|| DEFAULT_REGION.to_string());
        Ok(json!({
            "name": name,
            "databaseVersion": version,
            "region": region,
            "onPremisesConfiguration": {
                "kind": "sql#onPremisesConfiguration",
                "hostPort": format!("{}:{}", self.ip_address, self.port),
            },
        }))
    }
}

/// Parameters for a replica of an already registered master.
#[derive(Debug, Clone)]
pub struct Replica {
    pub master_instance_name: String,
    pub dumpfile_path: String,
    pub username: String,
    pub password: String,
    pub name: Option<String>,
}

impl BuildBody for Replica {
    fn build(self) -> Result<Value, ReplicatorError> {
        let name = self
            .name
            .unwrap_or_else(|| generated_name(REPLICA_NAME_PREFIX));
        Ok(json!({
            "name": name,
            "settings": {
                "tier": DEFAULT_TIER,
            },
            "databaseVersion": DEFAULT_DATABASE_VERSION,
            "masterInstanceName": self.master_instance_name,
            "region": DEFAULT_REGION,
            "replicaConfiguration": {
                "mysqlReplicaConfiguration": {
                    "dumpFilePath": self.dumpfile_path,
                    "username": self.username,
                    "password": self.password,
                },
            },
        }))
    }
}

/// Body for an `instances.import` call. No defaulting; every field comes
/// from the caller.
pub fn import_body(import_file_uri: &str) -> Value {
    json!({
        "importContext": {
            "kind": "sql#importContext",
            "fileType": "SQL",
            "uri": import_file_uri,
        },
    })
}

/// Generates `<prefix>-<random token>`. Uniqueness is probabilistic only;
/// caller-supplied names are never checked for collisions.
fn generated_name(prefix: &str) -> String {
    let token = Alphanumeric
        .sample_string(&mut rand::thread_rng(), NAME_TOKEN_LEN)
        .to_lowercase();
    format!("{}-{}", prefix, token)
}
