//! Admission decisions and their failure taxonomy.

use std::fmt;

/// Response class a denial is rendered as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseClass {
    /// The user can correct the request and retry.
    BadRequest,
    /// The request violates policy.
    Forbidden,
    /// The server could not evaluate the request.
    InternalError,
}

impl ResponseClass {
    /// HTTP status code of the rendered status.
    pub fn code(&self) -> u16 {
        match self {
            ResponseClass::BadRequest => 400,
            ResponseClass::Forbidden => 403,
            ResponseClass::InternalError => 500,
        }
    }

    /// Kubernetes `StatusReason` of the rendered status.
    pub fn reason(&self) -> &'static str {
        match self {
            ResponseClass::BadRequest => "BadRequest",
            ResponseClass::Forbidden => "Forbidden",
            ResponseClass::InternalError => "InternalError",
        }
    }
}

/// Why a request was denied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The engine's clients are not wired up yet.
    NotReady,
    /// Reading the resource or a referenced object failed.
    FetchFailure,
    /// The request is malformed (missing or undecodable objects).
    InvalidRequest,
    /// One or more immutable field paths changed.
    PreconditionViolation,
    /// The kind's validator rejected the object.
    SemanticValidationFailure,
    /// A non-operator attempted an operator-only action.
    UnauthorizedActor(ResponseClass),
    /// A lifecycle guard blocks deletion.
    LifecycleBlocked,
}

impl FailureKind {
    pub fn class(&self) -> ResponseClass {
        match self {
            FailureKind::NotReady | FailureKind::FetchFailure => ResponseClass::InternalError,
            FailureKind::InvalidRequest | FailureKind::LifecycleBlocked => ResponseClass::BadRequest,
            FailureKind::PreconditionViolation | FailureKind::SemanticValidationFailure => {
                ResponseClass::Forbidden
            }
            FailureKind::UnauthorizedActor(class) => *class,
        }
    }

    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotReady => "NotReady",
            FailureKind::FetchFailure => "FetchFailure",
            FailureKind::InvalidRequest => "InvalidRequest",
            FailureKind::PreconditionViolation => "PreconditionViolation",
            FailureKind::SemanticValidationFailure => "SemanticValidationFailure",
            FailureKind::UnauthorizedActor(_) => "UnauthorizedActor",
            FailureKind::LifecycleBlocked => "LifecycleBlocked",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verdict rendered for one admission request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    allowed: bool,
    failure: Option<FailureKind>,
    message: Option<String>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            failure: None,
            message: None,
        }
    }

    pub fn deny(failure: FailureKind, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            failure: Some(failure),
            message: Some(message.into()),
        }
    }

    pub fn not_ready() -> Self {
        Self::deny(FailureKind::NotReady, "not initialized")
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn class(&self) -> Option<ResponseClass> {
        self.failure.map(|f| f.class())
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Label for metrics: `allowed` or the failure kind.
    pub fn outcome(&self) -> &'static str {
        self.failure.map_or("allowed", |f| f.as_str())
    }
}
