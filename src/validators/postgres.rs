//! Postgres validation.

use async_trait::async_trait;

use super::common::{
    validate_backup_schedule, validate_monitor, validate_secret, validate_snapshot_storage,
    validate_storage, validate_version,
};
use super::{KindValidator, ValidationError, decode};
use crate::crd::Postgres;
use crate::webhooks::request::Document;
use crate::webhooks::store::ClusterLookup;

/// Supported Postgres server versions.
pub const POSTGRES_VERSIONS: &[&str] = &["9.6", "9.6.6"];

const STANDBY_MODES: &[&str] = &["hot", "warm"];
const STREAMING_MODES: &[&str] = &["asynchronous"];

/// Validates Postgres objects.
#[derive(Clone, Debug, Default)]
pub struct PostgresValidator;

#[async_trait]
impl KindValidator for PostgresValidator {
    async fn validate(
        &self,
        object: &Document,
        lookup: &dyn ClusterLookup,
    ) -> Result<(), ValidationError> {
        let pg: Postgres = decode("Postgres", object)?;
        let namespace = pg.metadata.namespace.as_deref().unwrap_or_default();
        let spec = &pg.spec;

        validate_version("Postgres", &spec.version, POSTGRES_VERSIONS)?;
        validate_storage(lookup, spec.storage.as_ref()).await?;

        if let Some(standby) = spec.standby.as_deref().filter(|s| !s.is_empty())
            && !STANDBY_MODES.contains(&standby.to_lowercase().as_str())
        {
            return Err(ValidationError::rejected(format!(
                "spec.standby \"{standby}\" invalid"
            )));
        }

        // synchronous streaming is not available yet
        if let Some(streaming) = spec.streaming.as_deref().filter(|s| !s.is_empty())
            && !STREAMING_MODES.contains(&streaming.to_lowercase().as_str())
        {
            return Err(ValidationError::rejected(format!(
                "spec.streaming \"{streaming}\" invalid"
            )));
        }

        if let Some(storage) = spec.archiver.as_ref().and_then(|a| a.storage.as_ref()) {
            validate_snapshot_storage(lookup, namespace, "spec.archiver.storage", storage).await?;
        }

        validate_secret(
            lookup,
            namespace,
            "spec.databaseSecret",
            spec.database_secret.as_ref(),
        )
        .await?;

        if let Some(wal) = spec.init.as_ref().and_then(|i| i.postgres_wal.as_ref()) {
            validate_snapshot_storage(lookup, namespace, "spec.init.postgresWAL", wal).await?;
        }

        if let Some(schedule) = &spec.backup_schedule {
            validate_backup_schedule(lookup, namespace, schedule).await?;
        }

        validate_monitor(spec.monitor.as_ref())
    }
}
