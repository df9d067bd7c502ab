//! Database Custom Resource Definitions guarded by the admission server.
//!
//! Every kind carries `spec.doNotPause`: while it is set, deleting the
//! resource (which pauses the database into a DormantDatabase) is refused.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{
    BackupScheduleSpec, DatabaseStatus, InitSpec, MonitorSpec, SecretRef, SnapshotStorageSpec,
    StorageSpec,
};

/// Postgres is a custom resource for PostgreSQL servers.
///
/// Example:
/// ```yaml
/// apiVersion: kubedb.com/v1alpha1
/// kind: Postgres
/// metadata:
///   name: quick-postgres
/// spec:
///   version: "9.6"
///   standby: hot
///   storage:
///     storageClassName: standard
///     resources:
///       requests:
///         storage: 50Mi
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "kubedb.com",
    version = "v1alpha1",
    kind = "Postgres",
    plural = "postgreses",
    shortname = "pg",
    status = "DatabaseStatus",
    namespaced,
    printcolumn = r#"{"name":"Version", "type":"string", "jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Status", "type":"string", "jsonPath":".status.phase"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PostgresSpec {
    /// Postgres server version.
    #[serde(default)]
    pub version: String,

    /// Number of instances (primary plus standbys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Standby mode: `hot` or `warm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standby: Option<String>,

    /// Streaming replication mode. Only `asynchronous` is supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<String>,

    /// Continuous WAL archiving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archiver: Option<PostgresArchiverSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_schedule: Option<BackupScheduleSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_secret: Option<SecretRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<InitSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorSpec>,

    /// Blocks deletion while set.
    #[serde(default)]
    pub do_not_pause: bool,
}

/// WAL archiver for Postgres.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostgresArchiverSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<SnapshotStorageSpec>,
}

/// MySQL is a custom resource for MySQL servers.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "kubedb.com",
    version = "v1alpha1",
    kind = "MySQL",
    plural = "mysqls",
    shortname = "my",
    status = "DatabaseStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct MySQLSpec {
    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_secret: Option<SecretRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<InitSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorSpec>,

    #[serde(default)]
    pub do_not_pause: bool,
}

/// MongoDB is a custom resource for MongoDB servers.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "kubedb.com",
    version = "v1alpha1",
    kind = "MongoDB",
    plural = "mongodbs",
    shortname = "mg",
    status = "DatabaseStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct MongoDBSpec {
    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_secret: Option<SecretRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<InitSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorSpec>,

    #[serde(default)]
    pub do_not_pause: bool,
}

/// Redis is a custom resource for Redis servers.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "kubedb.com",
    version = "v1alpha1",
    kind = "Redis",
    plural = "redises",
    shortname = "rd",
    status = "DatabaseStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct RedisSpec {
    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorSpec>,

    #[serde(default)]
    pub do_not_pause: bool,
}

/// Memcached is a custom resource for Memcached servers.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "kubedb.com",
    version = "v1alpha1",
    kind = "Memcached",
    plural = "memcacheds",
    shortname = "mc",
    status = "DatabaseStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct MemcachedSpec {
    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorSpec>,

    #[serde(default)]
    pub do_not_pause: bool,
}

/// Elasticsearch is a custom resource for Elasticsearch clusters.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "kubedb.com",
    version = "v1alpha1",
    kind = "Elasticsearch",
    plural = "elasticsearches",
    shortname = "es",
    status = "DatabaseStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchSpec {
    #[serde(default)]
    pub version: String,

    /// Node count when no dedicated topology is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Dedicated master/data/client node groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<ElasticsearchTopology>,

    #[serde(default, rename = "enableSSL")]
    pub enable_ssl: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_secret: Option<SecretRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_secret: Option<SecretRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<InitSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorSpec>,

    #[serde(default)]
    pub do_not_pause: bool,
}

/// Node groups of a dedicated Elasticsearch topology.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchTopology {
    pub master: ElasticsearchNode,
    pub data: ElasticsearchNode,
    pub client: ElasticsearchNode,
}

impl ElasticsearchTopology {
    /// Node groups paired with their role names.
    pub fn nodes(&self) -> [(&'static str, &ElasticsearchNode); 3] {
        [
            ("master", &self.master),
            ("data", &self.data),
            ("client", &self.client),
        ]
    }
}

/// A single Elasticsearch node group.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Name prefix of the node group's StatefulSet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,
}
