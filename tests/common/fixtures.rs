//! Test fixtures and builder patterns for KubeDB admission tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use kube::core::ErrorResponse;
use serde_json::{Map, Value, json};

use kubedb_admission::crd::{KUBEDB_GROUP, KUBEDB_VERSION};
use kubedb_admission::error::Error;
use kubedb_admission::webhooks::{
    ActorClassifier, AdmissionEngine, AdmissionRequest, Clients, ClusterLookup, Document,
    Identity, Operation, ResourceKind, ResourceStore, StoreError,
};

pub const OPERATOR_NAMESPACE: &str = "kube-system";
pub const OPERATOR_ACCOUNT: &str = "kubedb-operator";
pub const NAMESPACE: &str = "demo";

/// Builder for KubeDB resource documents.
///
/// # Example
/// ```
/// let postgres = ResourceBuilder::new(ResourceKind::Postgres, "quick-postgres")
///     .version("9.6")
///     .do_not_pause(true)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct ResourceBuilder {
    kind: ResourceKind,
    name: String,
    namespace: String,
    labels: BTreeMap<String, String>,
    spec: Map<String, Value>,
    status: Option<Value>,
}

impl ResourceBuilder {
    /// Create a new builder with the given kind and name.
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: NAMESPACE.to_string(),
            labels: BTreeMap::new(),
            spec: Map::new(),
            status: None,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn version(self, version: &str) -> Self {
        self.spec("version", json!(version))
    }

    pub fn do_not_pause(self, do_not_pause: bool) -> Self {
        self.spec("doNotPause", json!(do_not_pause))
    }

    pub fn replicas(self, replicas: i32) -> Self {
        self.spec("replicas", json!(replicas))
    }

    pub fn storage(self, class: &str, size: &str) -> Self {
        self.spec(
            "storage",
            json!({
                "storageClassName": class,
                "accessModes": ["ReadWriteOnce"],
                "resources": {"requests": {"storage": size}}
            }),
        )
    }

    pub fn database_secret(self, name: &str) -> Self {
        self.spec("databaseSecret", json!({"secretName": name}))
    }

    /// Set an arbitrary top-level spec field.
    pub fn spec(mut self, key: &str, value: Value) -> Self {
        self.spec.insert(key.to_string(), value);
        self
    }

    pub fn phase(mut self, phase: &str) -> Self {
        self.status = Some(json!({"phase": phase}));
        self
    }

    pub fn build(self) -> Document {
        let mut document = json!({
            "apiVersion": format!("{KUBEDB_GROUP}/{KUBEDB_VERSION}"),
            "kind": self.kind.as_str(),
            "metadata": {
                "name": self.name,
                "namespace": self.namespace,
                "labels": self.labels,
            },
            "spec": self.spec,
        });
        if let (Some(status), Some(object)) = (self.status, document.as_object_mut()) {
            object.insert("status".to_string(), status);
        }
        document
    }
}

/// A dormant database wrapping a paused Postgres.
pub fn dormant_database(name: &str, wipe_out: bool, phase: &str) -> Document {
    let origin = json!({
        "metadata": {"name": name, "namespace": NAMESPACE},
        "spec": {"postgres": {"version": "9.6", "storage": {"storageClassName": "standard"}}}
    });
    ResourceBuilder::new(ResourceKind::DormantDatabase, name)
        .spec("wipeOut", json!(wipe_out))
        .spec("origin", origin)
        .phase(phase)
        .build()
}

/// The operator's service account identity.
pub fn operator() -> Identity {
    Identity::new(
        format!("system:serviceaccount:{OPERATOR_NAMESPACE}:{OPERATOR_ACCOUNT}"),
        [
            "system:serviceaccounts",
            "system:serviceaccounts:kube-system",
            "system:authenticated",
        ],
    )
}

/// A cluster administrator; powerful, but not the operator.
pub fn user() -> Identity {
    Identity::new("minikube-user", ["system:masters", "system:authenticated"])
}

pub fn classifier() -> Arc<ActorClassifier> {
    Arc::new(
        ActorClassifier::new(OPERATOR_NAMESPACE, OPERATOR_ACCOUNT)
            .with_group("system:serviceaccounts"),
    )
}

/// A request for `kind`, named after the object it carries.
pub fn request(kind: ResourceKind, operation: Operation, actor: Identity, name: &str) -> AdmissionRequest {
    AdmissionRequest::new(KUBEDB_GROUP, kind.as_str(), operation, actor).named(NAMESPACE, name)
}

pub fn create(kind: ResourceKind, actor: Identity, object: Document) -> AdmissionRequest {
    let name = object_name(&object);
    request(kind, Operation::Create, actor, &name).with_object(object)
}

pub fn update(kind: ResourceKind, actor: Identity, old: Document, new: Document) -> AdmissionRequest {
    let name = object_name(&old);
    request(kind, Operation::Update, actor, &name)
        .with_old_object(old)
        .with_object(new)
}

pub fn delete(kind: ResourceKind, actor: Identity, name: &str) -> AdmissionRequest {
    request(kind, Operation::Delete, actor, name)
}

fn object_name(object: &Document) -> String {
    object
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// An initialized engine for a built-in kind.
pub async fn engine(kind: ResourceKind, store: MemoryStore, lookup: MemoryLookup) -> AdmissionEngine {
    let engine = AdmissionEngine::new(Arc::new(kind.registration()), classifier());
    engine
        .initialize_with(Clients::new(Arc::new(store), Arc::new(lookup)))
        .await;
    engine
}

/// In-memory `ResourceStore`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    objects: BTreeMap<(String, String), Document>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `object` under its own namespace and name.
    pub fn with(mut self, object: Document) -> Self {
        let namespace = object
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.objects.insert((namespace, object_name(&object)), object);
        self
    }

    /// Every read fails with a server error.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Document, StoreError> {
        if self.unavailable {
            return Err(StoreError::Fetch {
                kind: "object".to_string(),
                name: name.to_string(),
                source: Error::Kube(kube::Error::Api(ErrorResponse {
                    status: "Failure".to_string(),
                    message: "the server is currently unable to handle the request".to_string(),
                    reason: "ServiceUnavailable".to_string(),
                    code: 503,
                })),
            });
        }
        self.objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "object".to_string(),
                name: name.to_string(),
            })
    }
}

/// In-memory `ClusterLookup`.
#[derive(Clone, Debug, Default)]
pub struct MemoryLookup {
    secrets: BTreeSet<(String, String)>,
    storage_classes: BTreeSet<String>,
}

impl MemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cluster with the `standard` storage class and a `db-auth` secret.
    pub fn standard() -> Self {
        Self::new()
            .storage_class("standard")
            .secret(NAMESPACE, "db-auth")
    }

    pub fn secret(mut self, namespace: &str, name: &str) -> Self {
        self.secrets.insert((namespace.to_string(), name.to_string()));
        self
    }

    pub fn storage_class(mut self, name: &str) -> Self {
        self.storage_classes.insert(name.to_string());
        self
    }
}

#[async_trait]
impl ClusterLookup for MemoryLookup {
    async fn secret_exists(&self, namespace: &str, name: &str) -> Result<bool, StoreError> {
        Ok(self.secrets.contains(&(namespace.to_string(), name.to_string())))
    }

    async fn storage_class_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.storage_classes.contains(name))
    }
}
