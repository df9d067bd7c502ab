//! Admission webhook server.
//!
//! Provides one HTTPS endpoint per governed kind, `/validate-<plural>`.
//!
//! To enable webhooks:
//! 1. Deploy cert-manager for TLS certificates
//! 2. Create a ValidatingWebhookConfiguration pointing each kind at its path
//! 3. Mount the TLS certificate secret to the pod at /etc/webhook/certs/
//!
//! The webhook server starts automatically when certificates are present.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use axum_server::tls_rustls::RustlsConfig;
use kube::core::DynamicObject;
use kube::core::admission::{
    AdmissionRequest as ReviewRequest, AdmissionResponse, AdmissionReview,
};
use thiserror::Error;
use tracing::{debug, error, info};

use super::decision::{Decision, FailureKind};
use super::engine::AdmissionEngine;
use super::request::AdmissionRequest;
use crate::health::HealthState;

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;

/// Shared state for one kind's webhook handler
pub struct WebhookState {
    pub engine: Arc<AdmissionEngine>,
    pub health: Option<Arc<HealthState>>,
}

impl WebhookState {
    pub fn new(engine: Arc<AdmissionEngine>, health: Option<Arc<HealthState>>) -> Self {
        Self { engine, health }
    }
}

/// Path the webhook for `plural` is served on.
pub fn webhook_path(plural: &str) -> String {
    format!("/validate-{plural}")
}

/// Create the webhook router with one route per engine
pub fn create_webhook_router(
    engines: &[Arc<AdmissionEngine>],
    health: Option<Arc<HealthState>>,
) -> Router {
    engines.iter().fold(Router::new(), |router, engine| {
        let path = webhook_path(&engine.registration().plural);
        let state = Arc::new(WebhookState::new(engine.clone(), health.clone()));
        router.route(&path, post(validate).with_state(state))
    })
}

async fn validate(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(handle_review(&state, review).await))
}

/// Decide one AdmissionReview and render the response review.
pub async fn handle_review(
    state: &WebhookState,
    review: AdmissionReview<DynamicObject>,
) -> AdmissionReview<DynamicObject> {
    let review_request: ReviewRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return AdmissionResponse::invalid(format!("Invalid AdmissionReview: {e}"))
                .into_review();
        }
    };

    let request = match AdmissionRequest::try_from(&review_request) {
        Ok(request) => request,
        Err(e) => {
            error!(uid = %review_request.uid, error = %e, "Failed to decode admission objects");
            let decision = Decision::deny(
                FailureKind::InvalidRequest,
                format!("failed to decode request objects: {e}"),
            );
            return render(&review_request, &decision);
        }
    };

    debug!(
        uid = %request.uid,
        kind = %request.kind,
        operation = %request.operation,
        namespace = %request.namespace,
        name = %request.name,
        "Processing admission request"
    );

    let start = Instant::now();
    let decision = state.engine.decide(&request).await;

    if let Some(health) = &state.health
        && state.engine.governs(&request)
    {
        health.metrics.record_decision(
            &request.kind,
            request.operation.as_str(),
            decision.outcome(),
            start.elapsed().as_secs_f64(),
        );
    }

    render(&review_request, &decision)
}

/// Render a decision as the AdmissionReview response.
///
/// Denials carry the response class as the status code and reason.
pub fn render(
    request: &ReviewRequest<DynamicObject>,
    decision: &Decision,
) -> AdmissionReview<DynamicObject> {
    let response = AdmissionResponse::from(request);
    let Some(class) = decision.class() else {
        return response.into_review();
    };

    let mut response = response.deny(decision.message().unwrap_or_default());
    response.result.code = class.code();
    response.result.reason = class.reason().to_string();
    response.into_review()
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(#[source] std::io::Error),

    /// Server error
    #[error("Webhook server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0 on `port` and serves a `/validate-<plural>` endpoint per
/// engine. TLS certificates are loaded from the paths specified (PEM format).
pub async fn run_webhook_server(
    engines: Vec<Arc<AdmissionEngine>>,
    health: Option<Arc<HealthState>>,
    port: u16,
    cert_path: &str,
    key_path: &str,
) -> Result<(), WebhookError> {
    let app = create_webhook_router(&engines, health);

    let config = RustlsConfig::from_pem_file(PathBuf::from(cert_path), PathBuf::from(key_path))
        .await
        .map_err(WebhookError::TlsConfig)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, kinds = engines.len(), "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
        .map_err(WebhookError::Server)?;

    Ok(())
}
