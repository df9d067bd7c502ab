//! Start-up configuration read from the environment.

use tracing::warn;

use crate::error::{Error, Result};
use crate::webhooks::actor::{ActorClassifier, SERVICE_ACCOUNTS_GROUP};
use crate::webhooks::{WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT};

/// Service account the operator runs as unless overridden.
pub const DEFAULT_OPERATOR_SERVICE_ACCOUNT: &str = "kubedb-operator";
/// Default health/metrics port
pub const HEALTH_PORT: u16 = 8080;

/// Resolved admission server configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmissionConfig {
    pub operator_service_account: String,
    pub operator_namespace: String,
    /// Group the operator must also belong to; `None` disables the check.
    pub operator_group: Option<String>,
    pub webhook_port: u16,
    pub health_port: u16,
    pub cert_path: String,
    pub key_path: String,
}

impl AdmissionConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let operator_namespace = lookup("OPERATOR_NAMESPACE")
            .or_else(|| lookup("POD_NAMESPACE"))
            .unwrap_or_else(|| {
                warn!("OPERATOR_NAMESPACE and POD_NAMESPACE not set, using 'default'");
                "default".to_string()
            });

        let operator_group = match lookup("OPERATOR_GROUP") {
            Some(group) if group.is_empty() => None,
            Some(group) => Some(group),
            None => Some(SERVICE_ACCOUNTS_GROUP.to_string()),
        };

        Ok(Self {
            operator_service_account: lookup("OPERATOR_SERVICE_ACCOUNT")
                .unwrap_or_else(|| DEFAULT_OPERATOR_SERVICE_ACCOUNT.to_string()),
            operator_namespace,
            operator_group,
            webhook_port: parse_port(&lookup, "WEBHOOK_PORT", WEBHOOK_PORT)?,
            health_port: parse_port(&lookup, "HEALTH_PORT", HEALTH_PORT)?,
            cert_path: lookup("WEBHOOK_CERT_PATH").unwrap_or_else(|| WEBHOOK_CERT_PATH.to_string()),
            key_path: lookup("WEBHOOK_KEY_PATH").unwrap_or_else(|| WEBHOOK_KEY_PATH.to_string()),
        })
    }

    /// Classifier recognizing the configured operator identity.
    pub fn classifier(&self) -> ActorClassifier {
        let classifier =
            ActorClassifier::new(&self.operator_namespace, &self.operator_service_account);
        match &self.operator_group {
            Some(group) => classifier.with_group(group.clone()),
            None => classifier,
        }
    }
}

fn parse_port(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u16) -> Result<u16> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e| Error::Config(format!("{key}={value:?}: {e}"))),
    }
}
