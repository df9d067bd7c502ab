//! Spec fragments shared by every KubeDB database kind.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of all KubeDB resources.
pub const KUBEDB_GROUP: &str = "kubedb.com";

/// API version served by this admission server.
pub const KUBEDB_VERSION: &str = "v1alpha1";

/// Persistent volume claim template for database storage.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    /// Name of the StorageClass used to provision volumes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,

    /// Volume access modes (e.g. ReadWriteOnce).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_modes: Vec<String>,

    /// Resource requests for the claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<StorageResources>,
}

impl StorageSpec {
    /// Requested storage size, if any.
    pub fn requested_storage(&self) -> Option<&str> {
        self.resources
            .as_ref()
            .and_then(|r| r.requests.get("storage"))
            .map(String::as_str)
    }
}

/// Resource requests of a storage claim.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageResources {
    #[serde(default)]
    pub requests: BTreeMap<String, String>,
}

/// Reference to a Secret in the resource namespace.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub secret_name: String,
}

/// Monitoring agent configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSpec {
    /// Agent type (`prometheus.io/builtin` or `prometheus.io/coreos-operator`).
    pub agent: String,

    /// Prometheus specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusSpec>,
}

/// Prometheus scrape settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusSpec {
    /// Namespace of the Prometheus ServiceMonitor (CoreOS operator only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Labels selecting the Prometheus instance (CoreOS operator only).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Scrape interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    /// Metrics port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

/// Initialization source for a new database.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitSpec {
    /// Script volume used to seed the database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_source: Option<serde_json::Value>,

    /// Snapshot to restore from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_source: Option<SnapshotSourceSpec>,

    /// WAL archive to restore from (Postgres only).
    #[serde(default, rename = "postgresWAL", skip_serializing_if = "Option::is_none")]
    pub postgres_wal: Option<SnapshotStorageSpec>,
}

/// Reference to a Snapshot object.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSourceSpec {
    #[serde(default)]
    pub namespace: Option<String>,
    pub name: String,
}

/// Object-store location used for archives and snapshots.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStorageSpec {
    /// Secret holding the object-store credentials.
    #[serde(default)]
    pub storage_secret_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<BucketSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcs: Option<BucketSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<BucketSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift: Option<BucketSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<serde_json::Value>,
}

impl SnapshotStorageSpec {
    /// Whether any backend other than S3 is configured.
    pub fn has_non_s3_backend(&self) -> bool {
        self.gcs.is_some() || self.azure.is_some() || self.swift.is_some() || self.local.is_some()
    }
}

/// Periodic snapshots taken by the operator.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupScheduleSpec {
    /// Standard cron expression, e.g. `@every 6h` or `0 */6 * * *`.
    #[serde(default)]
    pub cron_expression: String,

    #[serde(flatten)]
    pub storage: SnapshotStorageSpec,
}

/// Bucket location inside an object store.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// DatabasePhase represents the lifecycle phase of a running database.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum DatabasePhase {
    /// Database objects are being created.
    #[default]
    Creating,
    /// Data is being restored from an init source.
    Initializing,
    /// Database is serving traffic.
    Running,
    /// Database was deleted and its data kept in a DormantDatabase.
    Paused,
    /// Reconciliation failed.
    Failed,
}

impl std::fmt::Display for DatabasePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabasePhase::Creating => write!(f, "Creating"),
            DatabasePhase::Initializing => write!(f, "Initializing"),
            DatabasePhase::Running => write!(f, "Running"),
            DatabasePhase::Paused => write!(f, "Paused"),
            DatabasePhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Status shared by all database kinds.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<DatabasePhase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// The generation most recently observed by the operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}
