//! Checks shared by every database kind.

use super::ValidationError;
use crate::crd::{BackupScheduleSpec, MonitorSpec, SecretRef, SnapshotStorageSpec, StorageSpec};
use crate::webhooks::store::ClusterLookup;

/// Prometheus scraping handled by the operator itself.
pub const AGENT_PROMETHEUS_BUILTIN: &str = "prometheus.io/builtin";

/// Prometheus scraping through the CoreOS prometheus-operator.
pub const AGENT_COREOS_PROMETHEUS: &str = "prometheus.io/coreos-operator";

/// The version must be set and supported.
pub fn validate_version(kind: &str, version: &str, supported: &[&str]) -> Result<(), ValidationError> {
    if version.is_empty() {
        return Err(ValidationError::rejected(format!(
            "spec.version is missing in {kind}"
        )));
    }
    if !supported.contains(&version) {
        return Err(ValidationError::rejected(format!(
            "KubeDB doesn't support {kind} version: {version}"
        )));
    }
    Ok(())
}

/// Storage needs an existing StorageClass and a positive size request.
pub async fn validate_storage(
    lookup: &dyn ClusterLookup,
    storage: Option<&StorageSpec>,
) -> Result<(), ValidationError> {
    let Some(storage) = storage else {
        return Ok(());
    };

    let Some(class) = storage.storage_class_name.as_deref().filter(|c| !c.is_empty()) else {
        return Err(ValidationError::rejected(
            "spec.storage.storageClassName is missing",
        ));
    };
    if !lookup.storage_class_exists(class).await? {
        return Err(ValidationError::rejected(format!(
            "spec.storage.storageClassName \"{class}\" not found"
        )));
    }

    match storage.requested_storage() {
        None => Err(ValidationError::rejected("missing ResourceStorage request")),
        Some(quantity) if !quantity_is_positive(quantity) => {
            Err(ValidationError::rejected("invalid ResourceStorage request"))
        }
        Some(_) => Ok(()),
    }
}

/// A referenced secret must exist in the resource namespace.
pub async fn validate_secret(
    lookup: &dyn ClusterLookup,
    namespace: &str,
    field: &str,
    secret: Option<&SecretRef>,
) -> Result<(), ValidationError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    if secret.secret_name.is_empty() {
        return Err(ValidationError::rejected(format!(
            "{field}.secretName is missing"
        )));
    }
    if !lookup.secret_exists(namespace, &secret.secret_name).await? {
        return Err(ValidationError::rejected(format!(
            "secret \"{}\" referenced by {field} not found in namespace \"{namespace}\"",
            secret.secret_name
        )));
    }
    Ok(())
}

/// The monitoring agent must be known and fully configured.
pub fn validate_monitor(monitor: Option<&MonitorSpec>) -> Result<(), ValidationError> {
    let Some(monitor) = monitor else {
        return Ok(());
    };

    match monitor.agent.as_str() {
        "" => Err(ValidationError::rejected("spec.monitor.agent is missing")),
        AGENT_PROMETHEUS_BUILTIN => Ok(()),
        AGENT_COREOS_PROMETHEUS => {
            let Some(prometheus) = monitor.prometheus.as_ref() else {
                return Err(ValidationError::rejected(
                    "spec.monitor.prometheus is required for agent prometheus.io/coreos-operator",
                ));
            };
            if prometheus.namespace.as_deref().is_none_or(str::is_empty) {
                return Err(ValidationError::rejected(
                    "spec.monitor.prometheus.namespace is missing",
                ));
            }
            if prometheus.labels.is_empty() {
                return Err(ValidationError::rejected(
                    "spec.monitor.prometheus.labels is missing",
                ));
            }
            Ok(())
        }
        other => Err(ValidationError::rejected(format!(
            "invalid monitor agent \"{other}\""
        ))),
    }
}

/// Object-store location for archives and WAL restores.
///
/// Only S3 is supported as a backend.
pub async fn validate_snapshot_storage(
    lookup: &dyn ClusterLookup,
    namespace: &str,
    field: &str,
    storage: &SnapshotStorageSpec,
) -> Result<(), ValidationError> {
    if storage.storage_secret_name.is_empty() {
        return Err(ValidationError::rejected(format!(
            "{field}.storageSecretName is missing"
        )));
    }
    if storage.s3.is_none() {
        return Err(ValidationError::rejected(format!(
            "no storage provider is configured in {field}"
        )));
    }
    if storage.has_non_s3_backend() {
        return Err(ValidationError::rejected(format!(
            "invalid storage provider is configured in {field}"
        )));
    }
    if !lookup.secret_exists(namespace, &storage.storage_secret_name).await? {
        return Err(ValidationError::rejected(format!(
            "secret \"{}\" referenced by {field} not found in namespace \"{namespace}\"",
            storage.storage_secret_name
        )));
    }
    Ok(())
}

/// Periodic backups need a schedule and a usable snapshot location.
pub async fn validate_backup_schedule(
    lookup: &dyn ClusterLookup,
    namespace: &str,
    schedule: &BackupScheduleSpec,
) -> Result<(), ValidationError> {
    if schedule.cron_expression.trim().is_empty() {
        return Err(ValidationError::rejected(
            "spec.backupSchedule.cronExpression is missing",
        ));
    }
    validate_snapshot_storage(lookup, namespace, "spec.backupSchedule", &schedule.storage).await
}

/// Whether a Kubernetes quantity such as `50Mi` or `1.5G` is greater than zero.
fn quantity_is_positive(quantity: &str) -> bool {
    let number: String = quantity
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '+' || *c == '-')
        .collect();
    number.parse::<f64>().is_ok_and(|n| n > 0.0)
}
