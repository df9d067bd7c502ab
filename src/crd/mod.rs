//! Custom Resource Definitions for KubeDB resources.
//!
//! - Database kinds (`Postgres`, `MySQL`, `MongoDB`, `Redis`, `Memcached`,
//!   `Elasticsearch`) created by users
//! - `DormantDatabase`: created by the operator when a database is paused

mod common;
mod database;
mod dormant_database;

pub use common::*;
pub use database::*;
pub use dormant_database::*;
