//! Classification of the requesting identity.
//!
//! The operator runs under a designated service account. Kubernetes
//! authenticates service accounts as `system:serviceaccount:<namespace>:<name>`
//! and places them in the `system:serviceaccounts` group.

use std::collections::BTreeSet;

use k8s_openapi::api::authentication::v1::UserInfo;

/// Group every service account belongs to.
pub const SERVICE_ACCOUNTS_GROUP: &str = "system:serviceaccounts";

/// The authenticated identity behind a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub groups: BTreeSet<String>,
}

impl Identity {
    pub fn new<I, S>(username: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&UserInfo> for Identity {
    fn from(info: &UserInfo) -> Self {
        Self {
            username: info.username.clone().unwrap_or_default(),
            groups: info.groups.iter().flatten().cloned().collect(),
        }
    }
}

/// Whether an actor may bypass user-facing policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorClass {
    Operator,
    User,
}

impl std::fmt::Display for ActorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorClass::Operator => write!(f, "operator"),
            ActorClass::User => write!(f, "user"),
        }
    }
}

/// Decides whether an identity is the trusted operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorClassifier {
    operator_username: String,
    required_group: Option<String>,
}

impl ActorClassifier {
    /// Trust the service account `name` in `namespace`.
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            operator_username: format!("system:serviceaccount:{namespace}:{name}"),
            required_group: None,
        }
    }

    /// Additionally require membership in `group`.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.required_group = Some(group.into());
        self
    }

    pub fn operator_username(&self) -> &str {
        &self.operator_username
    }

    pub fn classify(&self, identity: &Identity) -> ActorClass {
        let name_matches = identity.username == self.operator_username;
        let group_matches = self
            .required_group
            .as_ref()
            .is_none_or(|group| identity.groups.contains(group));

        if name_matches && group_matches {
            ActorClass::Operator
        } else {
            ActorClass::User
        }
    }
}
