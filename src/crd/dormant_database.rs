//! DormantDatabase Custom Resource Definition.
//!
//! A DormantDatabase is created by the operator when a database is deleted
//! (paused). It keeps the original object so the database can be resumed, or
//! wiped out for good. Users never create these directly.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::database::{
    ElasticsearchSpec, MemcachedSpec, MongoDBSpec, MySQLSpec, PostgresSpec, RedisSpec,
};

/// DormantDatabase holds the last known state of a paused database.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "kubedb.com",
    version = "v1alpha1",
    kind = "DormantDatabase",
    plural = "dormantdatabases",
    shortname = "drmn",
    status = "DormantDatabaseStatus",
    namespaced,
    printcolumn = r#"{"name":"Status", "type":"string", "jsonPath":".status.phase"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DormantDatabaseSpec {
    /// Request that all data of the paused database be deleted.
    #[serde(default)]
    pub wipe_out: bool,

    /// Request that the paused database be recreated.
    #[serde(default)]
    pub resume: bool,

    /// The database object this DormantDatabase was created from.
    pub origin: Origin,
}

/// Snapshot of the original database object.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub metadata: OriginMeta,
    pub spec: OriginSpec,
}

/// Subset of the original object's metadata.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OriginMeta {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Spec of the original database; exactly one field is set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OriginSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch: Option<ElasticsearchSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mysql: Option<MySQLSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongodb: Option<MongoDBSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memcached: Option<MemcachedSpec>,
}

/// Lifecycle phase of a DormantDatabase.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum DormantDatabasePhase {
    /// The database is being paused.
    #[default]
    Pausing,
    /// The database is paused; data is retained.
    Paused,
    /// Data is being deleted.
    WipingOut,
    /// All data has been deleted; the DormantDatabase may be removed.
    WipedOut,
    /// The database is being recreated.
    Resuming,
    /// The last operation failed.
    Failed,
}

impl std::fmt::Display for DormantDatabasePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DormantDatabasePhase::Pausing => write!(f, "Pausing"),
            DormantDatabasePhase::Paused => write!(f, "Paused"),
            DormantDatabasePhase::WipingOut => write!(f, "WipingOut"),
            DormantDatabasePhase::WipedOut => write!(f, "WipedOut"),
            DormantDatabasePhase::Resuming => write!(f, "Resuming"),
            DormantDatabasePhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Status of a DormantDatabase.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DormantDatabaseStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<DormantDatabasePhase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// RFC 3339 time at which the database was paused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_time: Option<String>,

    /// RFC 3339 time at which the data was wiped out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiped_out_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}
