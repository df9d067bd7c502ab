//! Kind-specific semantic validators.
//!
//! The decision engine invokes a validator on the proposed object of CREATE
//! and UPDATE requests. A validator may read the cluster through
//! [`ClusterLookup`] (secret and storage class existence) and returns a single
//! pass/fail with a message the engine passes through verbatim.
//!
//! ## Architecture
//!
//! - `common`: checks shared by all database kinds (version, storage, secrets, monitor)
//! - `database`: MySQL, MongoDB, Redis and Memcached
//! - `postgres`: Postgres (standby, streaming, WAL archiver)
//! - `elasticsearch`: Elasticsearch (topology, TLS certificate secret)

mod common;
mod database;
mod elasticsearch;
mod postgres;

pub use database::{MemcachedValidator, MongoDBValidator, MySQLValidator, RedisValidator};
pub use elasticsearch::ElasticsearchValidator;
pub use postgres::PostgresValidator;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::webhooks::request::Document;
use crate::webhooks::store::{ClusterLookup, StoreError};

/// Why a validator did not accept an object.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The object is well-formed but not acceptable.
    #[error("{0}")]
    Rejected(String),

    /// The object does not match the kind's schema.
    #[error("invalid {kind} object: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A referenced object could not be read.
    #[error(transparent)]
    Lookup(#[from] StoreError),
}

impl ValidationError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ValidationError::Rejected(message.into())
    }
}

/// Semantic validation of one resource kind.
#[async_trait]
pub trait KindValidator: Send + Sync {
    async fn validate(
        &self,
        object: &Document,
        lookup: &dyn ClusterLookup,
    ) -> Result<(), ValidationError>;
}

/// Decode a document into the typed resource of `kind`.
fn decode<T: DeserializeOwned>(kind: &'static str, object: &Document) -> Result<T, ValidationError> {
    serde_json::from_value(object.clone()).map_err(|source| ValidationError::Decode { kind, source })
}
