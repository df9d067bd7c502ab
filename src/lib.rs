//! kubedb-admission library crate
//!
//! Admission control for KubeDB resources: decides whether a proposed
//! create, update or delete of a database resource may proceed.

pub mod config;
pub mod crd;
pub mod error;
pub mod health;
pub mod validators;
pub mod webhooks;

pub use config::AdmissionConfig;
pub use error::{Error, Result};
pub use health::HealthState;
pub use webhooks::{
    AdmissionEngine, KindRegistry, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT,
    WebhookError, run_webhook_server,
};

use std::sync::Arc;

use kube::Client;
use tracing::info;

use webhooks::ActorClassifier;

/// Create one engine per registered kind, all sharing `classifier`.
pub fn build_engines(
    registry: &KindRegistry,
    classifier: ActorClassifier,
) -> Vec<Arc<AdmissionEngine>> {
    let classifier = Arc::new(classifier);
    registry
        .iter()
        .map(|registration| {
            Arc::new(AdmissionEngine::new(
                registration.clone(),
                classifier.clone(),
            ))
        })
        .collect()
}

/// Wire every engine to the cluster, then mark the server ready.
pub async fn initialize_engines(
    engines: &[Arc<AdmissionEngine>],
    client: Client,
    health: Option<&HealthState>,
) {
    for engine in engines {
        engine.initialize(client.clone()).await;
    }
    info!(kinds = engines.len(), "Admission engines initialized");

    if let Some(health) = health {
        health.set_ready(true).await;
    }
}
