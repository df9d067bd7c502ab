//! Read access to the cluster used while deciding.
//!
//! - `ResourceStore`: fetches the persisted state of the governed kind
//! - `ClusterLookup`: existence checks for objects a resource references
//!
//! Both are traits so decisions can be exercised against in-memory state.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::api::storage::v1::StorageClass;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client};
use thiserror::Error;

use super::request::Document;
use crate::error::Error;

/// Failure reading from the cluster.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The object does not exist.
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    /// Any other read failure.
    #[error("failed to read {kind} \"{name}\": {source}")]
    Fetch {
        kind: String,
        name: String,
        #[source]
        source: Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    fn from_kube(kind: &str, name: &str, err: kube::Error) -> Self {
        let err = Error::from(err);
        if err.is_not_found() {
            StoreError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            }
        } else {
            StoreError::Fetch {
                kind: kind.to_string(),
                name: name.to_string(),
                source: err,
            }
        }
    }
}

/// Persisted state of the governed resource kind.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<Document, StoreError>;
}

/// Existence checks for referenced objects.
#[async_trait]
pub trait ClusterLookup: Send + Sync {
    async fn secret_exists(&self, namespace: &str, name: &str) -> Result<bool, StoreError>;
    async fn storage_class_exists(&self, name: &str) -> Result<bool, StoreError>;
}

/// Downstream clients of one engine.
#[derive(Clone)]
pub struct Clients {
    pub store: Arc<dyn ResourceStore>,
    pub lookup: Arc<dyn ClusterLookup>,
}

impl Clients {
    pub fn new(store: Arc<dyn ResourceStore>, lookup: Arc<dyn ClusterLookup>) -> Self {
        Self { store, lookup }
    }

    /// Clients backed by the Kubernetes API for the given kind.
    pub fn from_client(client: Client, gvk: &GroupVersionKind, plural: &str) -> Self {
        Self {
            store: Arc::new(KubeResourceStore::new(client.clone(), gvk, plural)),
            lookup: Arc::new(KubeClusterLookup::new(client)),
        }
    }
}

/// `ResourceStore` reading a custom resource through the API server.
pub struct KubeResourceStore {
    client: Client,
    resource: ApiResource,
}

impl KubeResourceStore {
    pub fn new(client: Client, gvk: &GroupVersionKind, plural: &str) -> Self {
        Self {
            client,
            resource: ApiResource::from_gvk_with_plural(gvk, plural),
        }
    }
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Document, StoreError> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &self.resource);
        let object = api
            .get(name)
            .await
            .map_err(|e| StoreError::from_kube(&self.resource.kind, name, e))?;

        serde_json::to_value(&object).map_err(|e| StoreError::Fetch {
            kind: self.resource.kind.clone(),
            name: name.to_string(),
            source: Error::from(e),
        })
    }
}

/// `ClusterLookup` backed by the API server.
pub struct KubeClusterLookup {
    client: Client,
}

impl KubeClusterLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterLookup for KubeClusterLookup {
    async fn secret_exists(&self, namespace: &str, name: &str) -> Result<bool, StoreError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        match api.get_metadata_opt(name).await {
            Ok(found) => Ok(found.is_some()),
            Err(e) => Err(StoreError::from_kube("secret", name, e)),
        }
    }

    async fn storage_class_exists(&self, name: &str) -> Result<bool, StoreError> {
        let api: Api<StorageClass> = Api::all(self.client.clone());
        match api.get_metadata_opt(name).await {
            Ok(found) => Ok(found.is_some()),
            Err(e) => Err(StoreError::from_kube("storageclass", name, e)),
        }
    }
}
