//! Validation of the single-node database kinds.

use async_trait::async_trait;

use super::common::{validate_monitor, validate_secret, validate_storage, validate_version};
use super::{KindValidator, ValidationError, decode};
use crate::crd::{Memcached, MongoDB, MySQL, Redis};
use crate::webhooks::request::Document;
use crate::webhooks::store::ClusterLookup;

pub const MYSQL_VERSIONS: &[&str] = &["8.0", "8"];
pub const MONGODB_VERSIONS: &[&str] = &["3.4", "3.6"];
pub const REDIS_VERSIONS: &[&str] = &["4", "4.0", "4.0.6"];
pub const MEMCACHED_VERSIONS: &[&str] = &["1.5.4"];

fn validate_replicas(replicas: Option<i32>) -> Result<(), ValidationError> {
    match replicas {
        Some(r) if r < 1 => Err(ValidationError::rejected(format!(
            "spec.replicas \"{r}\" invalid. Value must be greater than zero"
        ))),
        _ => Ok(()),
    }
}

#[derive(Clone, Debug, Default)]
pub struct MySQLValidator;

#[async_trait]
impl KindValidator for MySQLValidator {
    async fn validate(
        &self,
        object: &Document,
        lookup: &dyn ClusterLookup,
    ) -> Result<(), ValidationError> {
        let db: MySQL = decode("MySQL", object)?;
        let namespace = db.metadata.namespace.as_deref().unwrap_or_default();

        validate_version("MySQL", &db.spec.version, MYSQL_VERSIONS)?;
        validate_replicas(db.spec.replicas)?;
        validate_storage(lookup, db.spec.storage.as_ref()).await?;
        validate_secret(
            lookup,
            namespace,
            "spec.databaseSecret",
            db.spec.database_secret.as_ref(),
        )
        .await?;
        validate_monitor(db.spec.monitor.as_ref())
    }
}

#[derive(Clone, Debug, Default)]
pub struct MongoDBValidator;

#[async_trait]
impl KindValidator for MongoDBValidator {
    async fn validate(
        &self,
        object: &Document,
        lookup: &dyn ClusterLookup,
    ) -> Result<(), ValidationError> {
        let db: MongoDB = decode("MongoDB", object)?;
        let namespace = db.metadata.namespace.as_deref().unwrap_or_default();

        validate_version("MongoDB", &db.spec.version, MONGODB_VERSIONS)?;
        validate_replicas(db.spec.replicas)?;
        validate_storage(lookup, db.spec.storage.as_ref()).await?;
        validate_secret(
            lookup,
            namespace,
            "spec.databaseSecret",
            db.spec.database_secret.as_ref(),
        )
        .await?;
        validate_monitor(db.spec.monitor.as_ref())
    }
}

#[derive(Clone, Debug, Default)]
pub struct RedisValidator;

#[async_trait]
impl KindValidator for RedisValidator {
    async fn validate(
        &self,
        object: &Document,
        lookup: &dyn ClusterLookup,
    ) -> Result<(), ValidationError> {
        let db: Redis = decode("Redis", object)?;

        validate_version("Redis", &db.spec.version, REDIS_VERSIONS)?;
        validate_replicas(db.spec.replicas)?;
        validate_storage(lookup, db.spec.storage.as_ref()).await?;
        validate_monitor(db.spec.monitor.as_ref())
    }
}

/// Memcached keeps no state, so there is no storage or secret to check.
#[derive(Clone, Debug, Default)]
pub struct MemcachedValidator;

#[async_trait]
impl KindValidator for MemcachedValidator {
    async fn validate(
        &self,
        object: &Document,
        _lookup: &dyn ClusterLookup,
    ) -> Result<(), ValidationError> {
        let db: Memcached = decode("Memcached", object)?;

        validate_version("Memcached", &db.spec.version, MEMCACHED_VERSIONS)?;
        validate_replicas(db.spec.replicas)?;
        validate_monitor(db.spec.monitor.as_ref())
    }
}
