//! The admission decision engine.
//!
//! One engine governs one registered kind. For every request it runs, in
//! order and short-circuiting on the first denial:
//!
//! 1. Scope filter: foreign kinds, sub-resources and CONNECT are allowed untouched
//! 2. Readiness: without wired clients every request is denied
//! 3. DELETE: lifecycle guard over the persisted object (operator bypasses)
//! 4. CREATE: create policy, then the kind validator
//! 5. UPDATE: immutable paths (operator bypasses), then the kind validator

use std::sync::Arc;

use kube::Client;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::actor::{ActorClass, ActorClassifier};
use super::decision::{Decision, FailureKind, ResponseClass};
use super::policies::GuardVerdict;
use super::registry::{CreatePolicy, KindRegistration};
use super::request::{AdmissionRequest, Document, Operation};
use super::store::Clients;
use crate::validators::ValidationError;

/// Decides admission requests for one kind.
pub struct AdmissionEngine {
    registration: Arc<KindRegistration>,
    classifier: Arc<ActorClassifier>,
    clients: RwLock<Option<Clients>>,
}

impl AdmissionEngine {
    /// An engine that denies everything until initialized.
    pub fn new(registration: Arc<KindRegistration>, classifier: Arc<ActorClassifier>) -> Self {
        Self {
            registration,
            classifier,
            clients: RwLock::new(None),
        }
    }

    /// Wire the engine to the cluster. Calling again replaces the clients.
    pub async fn initialize(&self, client: Client) {
        let clients =
            Clients::from_client(client, &self.registration.gvk(), &self.registration.plural);
        self.initialize_with(clients).await;
    }

    /// Wire the engine to explicit clients.
    pub async fn initialize_with(&self, clients: Clients) {
        *self.clients.write().await = Some(clients);
        debug!(kind = %self.registration.kind, "Admission engine initialized");
    }

    pub async fn is_initialized(&self) -> bool {
        self.clients.read().await.is_some()
    }

    pub fn registration(&self) -> &KindRegistration {
        &self.registration
    }

    /// Whether the request is in scope for this engine.
    pub fn governs(&self, request: &AdmissionRequest) -> bool {
        request.operation.is_mutation()
            && request.sub_resource.is_none()
            && self.registration.matches(&request.group, &request.kind)
    }

    /// Decide whether `request` is admissible.
    pub async fn decide(&self, request: &AdmissionRequest) -> Decision {
        if !self.governs(request) {
            return Decision::allow();
        }

        let clients = self.clients.read().await;
        let decision = match clients.as_ref() {
            None => Decision::not_ready(),
            Some(clients) => {
                let actor = self.classifier.classify(&request.actor);
                match request.operation {
                    Operation::Delete => self.admit_delete(request, actor, clients).await,
                    Operation::Create => self.admit_create(request, actor, clients).await,
                    Operation::Update => self.admit_update(request, actor, clients).await,
                    Operation::Connect => Decision::allow(),
                }
            }
        };

        log_decision(request, &decision);
        decision
    }

    async fn admit_delete(
        &self,
        request: &AdmissionRequest,
        actor: ActorClass,
        clients: &Clients,
    ) -> Decision {
        if actor == ActorClass::Operator {
            return Decision::allow();
        }
        let Some(guard) = &self.registration.delete_guard else {
            return Decision::allow();
        };

        // The object embedded in a DELETE request is not trusted.
        let current = match clients.store.get(&request.namespace, &request.name).await {
            Ok(object) => Some(object),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Decision::deny(FailureKind::FetchFailure, e.to_string()),
        };

        let label = &self.registration.display_name;
        match guard.evaluate(label, &request.name, current.as_ref()) {
            GuardVerdict::Permitted => Decision::allow(),
            GuardVerdict::Blocked(message) => Decision::deny(FailureKind::LifecycleBlocked, message),
        }
    }

    async fn admit_create(
        &self,
        request: &AdmissionRequest,
        actor: ActorClass,
        clients: &Clients,
    ) -> Decision {
        if let CreatePolicy::OperatorOnly(class) = self.registration.create_policy
            && actor != ActorClass::Operator
        {
            return Decision::deny(
                FailureKind::UnauthorizedActor(class),
                format!(
                    "user can't create object with kind {}",
                    self.registration.kind.to_lowercase()
                ),
            );
        }

        let Some(object) = &request.object else {
            return Decision::deny(FailureKind::InvalidRequest, "missing object in CREATE request");
        };
        self.validate(object, clients).await
    }

    async fn admit_update(
        &self,
        request: &AdmissionRequest,
        actor: ActorClass,
        clients: &Clients,
    ) -> Decision {
        let (Some(object), Some(old_object)) = (&request.object, &request.old_object) else {
            return Decision::deny(
                FailureKind::InvalidRequest,
                "missing object or oldObject in UPDATE request",
            );
        };

        if actor != ActorClass::Operator {
            let policy = &self.registration.immutability;
            let violated = policy.check(old_object, object);
            if !violated.is_empty() {
                return Decision::deny(
                    FailureKind::PreconditionViolation,
                    policy.violation_message(&violated),
                );
            }
        }

        self.validate(object, clients).await
    }

    async fn validate(&self, object: &Document, clients: &Clients) -> Decision {
        let Some(validator) = &self.registration.validator else {
            return Decision::allow();
        };

        match validator.validate(object, clients.lookup.as_ref()).await {
            Ok(()) => Decision::allow(),
            Err(ValidationError::Rejected(message)) => {
                Decision::deny(FailureKind::SemanticValidationFailure, message)
            }
            Err(e @ ValidationError::Decode { .. }) => {
                Decision::deny(FailureKind::InvalidRequest, e.to_string())
            }
            Err(ValidationError::Lookup(e)) => {
                Decision::deny(FailureKind::FetchFailure, e.to_string())
            }
        }
    }
}

fn log_decision(request: &AdmissionRequest, decision: &Decision) {
    let reason = decision.outcome();
    let message = decision.message().unwrap_or_default();
    match decision.class() {
        None => info!(
            uid = %request.uid,
            kind = %request.kind,
            operation = %request.operation,
            namespace = %request.namespace,
            name = %request.name,
            "Admission request allowed"
        ),
        Some(ResponseClass::InternalError) => error!(
            uid = %request.uid,
            kind = %request.kind,
            operation = %request.operation,
            namespace = %request.namespace,
            name = %request.name,
            reason,
            message,
            "Admission request could not be evaluated"
        ),
        Some(_) => warn!(
            uid = %request.uid,
            kind = %request.kind,
            operation = %request.operation,
            namespace = %request.namespace,
            name = %request.name,
            reason,
            message,
            "Admission request denied"
        ),
    }
}
