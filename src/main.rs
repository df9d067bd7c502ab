//! kubedb-admission - validating admission webhooks for KubeDB resources.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Reads configuration from the environment
//! - Creates the Kubernetes client and wires one admission engine per kind
//! - Starts the health server, and the webhook server when certificates exist

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use kube::Client;
use tokio::signal;
use tracing::{error, info};

use kubedb_admission::health::{HealthState, run_health_server};
use kubedb_admission::{
    AdmissionConfig, KindRegistry, build_engines, initialize_engines, run_webhook_server,
};

/// Grace period for in-flight admission requests to complete during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kubedb_admission=info".parse()?)
                .add_directive("kube=info".parse()?),
        )
        .json()
        .init();

    info!("Starting kubedb-admission");

    let config = AdmissionConfig::from_env()?;
    let classifier = config.classifier();
    info!(
        operator = %classifier.operator_username(),
        group = ?config.operator_group,
        "Loaded configuration"
    );

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Start health server immediately so liveness probes pass while connecting
    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    let registry = KindRegistry::builtin();
    let engines = build_engines(&registry, classifier);

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");
    initialize_engines(&engines, client, Some(&health_state)).await;

    // Optionally start webhook server if certificates are available
    let webhook_handle =
        if Path::new(&config.cert_path).exists() && Path::new(&config.key_path).exists() {
            info!("TLS certificates found, starting webhook server");
            let health_state = health_state.clone();
            let config = config.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = run_webhook_server(
                    engines,
                    Some(health_state),
                    config.webhook_port,
                    &config.cert_path,
                    &config.key_path,
                )
                .await
                {
                    error!("Webhook server error: {}", e);
                }
            }))
        } else {
            info!(
                cert_path = %config.cert_path,
                "Webhook certificates not found, webhook server disabled"
            );
            None
        };

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        result = async {
            match webhook_handle {
                Some(handle) => handle.await,
                None => std::future::pending().await,
            }
        } => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready so the API server stops routing requests here
            health_state.set_ready(false).await;
            info!("Marked admission server as not ready");

            info!(
                "Waiting {}s for in-flight admission requests to complete...",
                SHUTDOWN_GRACE_PERIOD_SECS
            );
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("Admission server stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the server cannot shut down
/// gracefully without them.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
