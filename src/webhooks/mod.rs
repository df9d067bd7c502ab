//! Webhook module for validating admission requests.
//!
//! This module decides KubeDB admission requests in tiers, stopping at the
//! first denial:
//! - Lifecycle (DELETE): persisted state must allow deletion
//! - Immutability (UPDATE): protected fields must not change
//! - Semantic validation (CREATE/UPDATE): the kind validator must accept the object
//!
//! The operator's own service account bypasses lifecycle and immutability.

pub mod actor;
pub mod decision;
pub mod engine;
pub mod policies;
pub mod registry;
pub mod request;
mod server;
pub mod store;

pub use actor::{ActorClass, ActorClassifier, Identity};
pub use decision::{Decision, FailureKind, ResponseClass};
pub use engine::AdmissionEngine;
pub use registry::{CreatePolicy, KindRegistration, KindRegistry, ResourceKind};
pub use request::{AdmissionRequest, Document, Operation};
pub use server::{
    WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError, WebhookState,
    create_webhook_router, handle_review, render, run_webhook_server, webhook_path,
};
pub use store::{Clients, ClusterLookup, ResourceStore, StoreError};
