//! The admission request as seen by the decision engine.

use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest as ReviewRequest, Operation as ReviewOperation};
use serde_json::Value;

use super::actor::Identity;

/// Resource documents are ordered, semi-structured JSON values.
pub type Document = Value;

/// The mutation being attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Connect => "CONNECT",
        }
    }

    /// Whether the engine ever governs this operation.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update | Operation::Delete)
    }
}

impl From<&ReviewOperation> for Operation {
    fn from(op: &ReviewOperation) -> Self {
        match op {
            ReviewOperation::Create => Operation::Create,
            ReviewOperation::Update => Operation::Update,
            ReviewOperation::Delete => Operation::Delete,
            ReviewOperation::Connect => Operation::Connect,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proposed mutation of a managed resource.
#[derive(Clone, Debug, PartialEq)]
pub struct AdmissionRequest {
    pub uid: String,
    pub group: String,
    pub kind: String,
    pub sub_resource: Option<String>,
    pub operation: Operation,
    pub namespace: String,
    pub name: String,
    pub actor: Identity,
    /// Proposed state (CREATE/UPDATE).
    pub object: Option<Document>,
    /// Prior state (UPDATE). Not trusted on DELETE.
    pub old_object: Option<Document>,
    pub dry_run: bool,
}

impl AdmissionRequest {
    /// A request with no objects, owned by `actor`.
    pub fn new(group: &str, kind: &str, operation: Operation, actor: Identity) -> Self {
        Self {
            uid: String::new(),
            group: group.to_string(),
            kind: kind.to_string(),
            sub_resource: None,
            operation,
            namespace: String::new(),
            name: String::new(),
            actor,
            object: None,
            old_object: None,
            dry_run: false,
        }
    }

    pub fn named(mut self, namespace: &str, name: &str) -> Self {
        self.namespace = namespace.to_string();
        self.name = name.to_string();
        self
    }

    pub fn with_object(mut self, object: Document) -> Self {
        self.object = Some(object);
        self
    }

    pub fn with_old_object(mut self, object: Document) -> Self {
        self.old_object = Some(object);
        self
    }

    pub fn with_sub_resource(mut self, sub_resource: &str) -> Self {
        self.sub_resource = Some(sub_resource.to_string());
        self
    }
}

impl TryFrom<&ReviewRequest<DynamicObject>> for AdmissionRequest {
    type Error = serde_json::Error;

    fn try_from(req: &ReviewRequest<DynamicObject>) -> Result<Self, Self::Error> {
        let object = req.object.as_ref().map(serde_json::to_value).transpose()?;
        let old_object = req.old_object.as_ref().map(serde_json::to_value).transpose()?;

        Ok(Self {
            uid: req.uid.clone(),
            group: req.kind.group.clone(),
            kind: req.kind.kind.clone(),
            sub_resource: req.sub_resource.clone().filter(|s| !s.is_empty()),
            operation: Operation::from(&req.operation),
            namespace: req.namespace.clone().unwrap_or_default(),
            name: req.name.clone(),
            actor: Identity::from(&req.user_info),
            object,
            old_object,
            dry_run: req.dry_run,
        })
    }
}
