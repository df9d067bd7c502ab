//! Per-kind admission registrations.
//!
//! A registration bundles everything the decision engine needs to know about
//! one resource kind: its protected field paths, how deletes are guarded,
//! who may create it and which validator runs on proposed objects. The table
//! is built once at startup and shared read-only between engines.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use kube::api::GroupVersionKind;

use super::decision::ResponseClass;
use super::policies::{ImmutabilityPolicy, LifecycleGuard};
use crate::crd::{DormantDatabasePhase, KUBEDB_GROUP, KUBEDB_VERSION};
use crate::validators::{
    ElasticsearchValidator, KindValidator, MemcachedValidator, MongoDBValidator, MySQLValidator,
    PostgresValidator, RedisValidator,
};

/// The pause flag shared by every database kind.
pub const DO_NOT_PAUSE_PATH: &str = "spec.doNotPause";

const ELASTICSEARCH_PATHS: &[&str] = &[
    "spec.version",
    "spec.topology.*.prefix",
    "spec.enableSSL",
    "spec.certificateSecret",
    "spec.databaseSecret",
    "spec.storage",
    "spec.nodeSelector",
    "spec.init",
];

const POSTGRES_PATHS: &[&str] = &[
    "spec.version",
    "spec.standby",
    "spec.streaming",
    "spec.archiver",
    "spec.databaseSecret",
    "spec.storage",
    "spec.nodeSelector",
    "spec.init",
];

const MYSQL_PATHS: &[&str] = &[
    "spec.version",
    "spec.storage",
    "spec.databaseSecret",
    "spec.nodeSelector",
    "spec.init",
];

const MONGODB_PATHS: &[&str] = MYSQL_PATHS;

const REDIS_PATHS: &[&str] = &["spec.version", "spec.storage", "spec.nodeSelector"];

const MEMCACHED_PATHS: &[&str] = &["spec.version", "spec.nodeSelector"];

const DORMANT_DATABASE_PATHS: &[&str] = &["spec.origin"];

/// Built-in KubeDB kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Elasticsearch,
    Postgres,
    MySQL,
    MongoDB,
    Redis,
    Memcached,
    DormantDatabase,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Elasticsearch,
        ResourceKind::Postgres,
        ResourceKind::MySQL,
        ResourceKind::MongoDB,
        ResourceKind::Redis,
        ResourceKind::Memcached,
        ResourceKind::DormantDatabase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Elasticsearch => "Elasticsearch",
            ResourceKind::Postgres => "Postgres",
            ResourceKind::MySQL => "MySQL",
            ResourceKind::MongoDB => "MongoDB",
            ResourceKind::Redis => "Redis",
            ResourceKind::Memcached => "Memcached",
            ResourceKind::DormantDatabase => "DormantDatabase",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Elasticsearch => "elasticsearches",
            ResourceKind::Postgres => "postgreses",
            ResourceKind::MySQL => "mysqls",
            ResourceKind::MongoDB => "mongodbs",
            ResourceKind::Redis => "redises",
            ResourceKind::Memcached => "memcacheds",
            ResourceKind::DormantDatabase => "dormantdatabases",
        }
    }

    /// The built-in registration of this kind.
    pub fn registration(&self) -> KindRegistration {
        let base = || KindRegistration::new(KUBEDB_GROUP, KUBEDB_VERSION, self.as_str(), self.plural());
        let database = |paths: &[&str], validator: Arc<dyn KindValidator>| {
            base()
                .with_immutable_paths(paths)
                .with_delete_guard(LifecycleGuard::pause_protection(DO_NOT_PAUSE_PATH))
                .with_validator(validator)
        };

        match self {
            ResourceKind::Elasticsearch => {
                database(ELASTICSEARCH_PATHS, Arc::new(ElasticsearchValidator))
            }
            ResourceKind::Postgres => database(POSTGRES_PATHS, Arc::new(PostgresValidator)),
            ResourceKind::MySQL => database(MYSQL_PATHS, Arc::new(MySQLValidator)),
            ResourceKind::MongoDB => database(MONGODB_PATHS, Arc::new(MongoDBValidator)),
            ResourceKind::Redis => database(REDIS_PATHS, Arc::new(RedisValidator)),
            ResourceKind::Memcached => database(MEMCACHED_PATHS, Arc::new(MemcachedValidator)),
            // Dormant databases are created by the operator when a database is
            // paused, and can only be deleted once wiped out.
            ResourceKind::DormantDatabase => base()
                .with_display_name("dormant_database")
                .with_immutable_paths(DORMANT_DATABASE_PATHS)
                .with_delete_guard(LifecycleGuard::terminal_phase(
                    "status.phase",
                    &DormantDatabasePhase::WipedOut.to_string(),
                    "set spec.wipeOut true",
                ))
                .with_create_policy(CreatePolicy::OperatorOnly(ResponseClass::BadRequest)),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may create objects of a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreatePolicy {
    /// Anyone, subject to the kind validator.
    Validate,
    /// Only the operator; anyone else is refused with the given class.
    OperatorOnly(ResponseClass),
}

/// Everything the engine knows about one kind.
#[derive(Clone)]
pub struct KindRegistration {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    /// Name used for the kind in denial messages.
    pub display_name: String,
    pub immutability: ImmutabilityPolicy,
    pub delete_guard: Option<LifecycleGuard>,
    pub create_policy: CreatePolicy,
    pub validator: Option<Arc<dyn KindValidator>>,
}

impl KindRegistration {
    /// A kind with only structural immutability, no guard and no validator.
    pub fn new(group: &str, version: &str, kind: &str, plural: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
            plural: plural.to_string(),
            display_name: kind.to_lowercase(),
            immutability: ImmutabilityPolicy::default(),
            delete_guard: None,
            create_policy: CreatePolicy::Validate,
            validator: None,
        }
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = name.to_string();
        self
    }

    pub fn with_immutable_paths(mut self, paths: &[&str]) -> Self {
        self.immutability = ImmutabilityPolicy::new(paths);
        self
    }

    pub fn with_delete_guard(mut self, guard: LifecycleGuard) -> Self {
        self.delete_guard = Some(guard);
        self
    }

    pub fn with_create_policy(mut self, policy: CreatePolicy) -> Self {
        self.create_policy = policy;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn KindValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }

    /// Whether a request for `group`/`kind` targets this registration.
    pub fn matches(&self, group: &str, kind: &str) -> bool {
        self.group == group && self.kind == kind
    }
}

impl fmt::Debug for KindRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindRegistration")
            .field("group", &self.group)
            .field("version", &self.version)
            .field("kind", &self.kind)
            .field("plural", &self.plural)
            .field("display_name", &self.display_name)
            .field("immutability", &self.immutability)
            .field("delete_guard", &self.delete_guard)
            .field("create_policy", &self.create_policy)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Registrations keyed by `(group, kind)`.
#[derive(Clone, Debug, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<(String, String), Arc<KindRegistration>>,
}

impl KindRegistry {
    /// The built-in KubeDB kinds.
    pub fn builtin() -> Self {
        ResourceKind::ALL
            .iter()
            .fold(Self::default(), |registry, kind| {
                registry.with(kind.registration())
            })
    }

    /// Add or replace a registration.
    pub fn with(mut self, registration: KindRegistration) -> Self {
        let key = (registration.group.clone(), registration.kind.clone());
        self.kinds.insert(key, Arc::new(registration));
        self
    }

    pub fn get(&self, group: &str, kind: &str) -> Option<Arc<KindRegistration>> {
        self.kinds
            .get(&(group.to_string(), kind.to_string()))
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<KindRegistration>> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
