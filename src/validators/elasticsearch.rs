//! Elasticsearch validation.

use async_trait::async_trait;

use super::common::{validate_monitor, validate_secret, validate_storage, validate_version};
use super::{KindValidator, ValidationError, decode};
use crate::crd::Elasticsearch;
use crate::webhooks::request::Document;
use crate::webhooks::store::ClusterLookup;

/// Supported Elasticsearch versions.
pub const ELASTICSEARCH_VERSIONS: &[&str] = &["5.6", "5.6.4"];

/// Validates Elasticsearch objects.
#[derive(Clone, Debug, Default)]
pub struct ElasticsearchValidator;

#[async_trait]
impl KindValidator for ElasticsearchValidator {
    async fn validate(
        &self,
        object: &Document,
        lookup: &dyn ClusterLookup,
    ) -> Result<(), ValidationError> {
        let es: Elasticsearch = decode("Elasticsearch", object)?;
        let namespace = es.metadata.namespace.as_deref().unwrap_or_default();
        let spec = &es.spec;

        validate_version("Elasticsearch", &spec.version, ELASTICSEARCH_VERSIONS)?;

        match &spec.topology {
            Some(topology) => {
                for (role, node) in topology.nodes() {
                    if node.replicas.is_some_and(|r| r < 1) {
                        return Err(ValidationError::rejected(format!(
                            "spec.topology.{role}.replicas must be greater than zero"
                        )));
                    }
                    validate_storage(lookup, node.storage.as_ref()).await?;
                }
            }
            None => {
                if spec.replicas.is_some_and(|r| r < 1) {
                    return Err(ValidationError::rejected(
                        "spec.replicas must be greater than zero",
                    ));
                }
                validate_storage(lookup, spec.storage.as_ref()).await?;
            }
        }

        validate_secret(
            lookup,
            namespace,
            "spec.databaseSecret",
            spec.database_secret.as_ref(),
        )
        .await?;

        if spec.enable_ssl {
            validate_secret(
                lookup,
                namespace,
                "spec.certificateSecret",
                spec.certificate_secret.as_ref(),
            )
            .await?;
        }

        validate_monitor(spec.monitor.as_ref())
    }
}
