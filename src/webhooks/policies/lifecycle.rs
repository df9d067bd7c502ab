//! Delete protection policy.
//!
//! Enforced on DELETE operations made by anyone but the operator.
//!
//! A guard inspects the resource as currently persisted (never the object
//! embedded in the DELETE request) and blocks deletion until the resource
//! reaches a safe state.

use serde_json::Value;

use super::field_path::FieldPath;

/// Outcome of a guard evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardVerdict {
    Permitted,
    /// Blocked; the message says how to unblock it.
    Blocked(String),
}

/// A per-kind predicate over persisted state gating deletes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleGuard {
    /// Delete is refused while the boolean at `flag` is true.
    PauseProtection { flag: FieldPath },
    /// Delete is refused until the value at `phase` equals `terminal`.
    TerminalPhase {
        phase: FieldPath,
        terminal: String,
        /// What the user must do to reach the terminal phase.
        remediation: String,
    },
}

impl LifecycleGuard {
    pub fn pause_protection(flag: &str) -> Self {
        Self::PauseProtection {
            flag: FieldPath::new(flag),
        }
    }

    pub fn terminal_phase(phase: &str, terminal: &str, remediation: &str) -> Self {
        Self::TerminalPhase {
            phase: FieldPath::new(phase),
            terminal: terminal.to_string(),
            remediation: remediation.to_string(),
        }
    }

    /// Evaluate against the current state of `kind`/`name`.
    ///
    /// `None` means the resource no longer exists, which is always permitted.
    pub fn evaluate(&self, kind: &str, name: &str, current: Option<&Value>) -> GuardVerdict {
        let Some(current) = current else {
            return GuardVerdict::Permitted;
        };

        match self {
            LifecycleGuard::PauseProtection { flag } => {
                if flag.lookup(current).and_then(Value::as_bool).unwrap_or(false) {
                    GuardVerdict::Blocked(format!(
                        "{} \"{}\" can't be paused. To continue delete, unset {} and retry",
                        kind.to_lowercase(),
                        name,
                        flag
                    ))
                } else {
                    GuardVerdict::Permitted
                }
            }
            LifecycleGuard::TerminalPhase {
                phase,
                terminal,
                remediation,
            } => {
                let reached = phase.lookup(current).and_then(Value::as_str) == Some(terminal.as_str());
                if reached {
                    GuardVerdict::Permitted
                } else {
                    GuardVerdict::Blocked(format!(
                        "{} \"{}\" can't be deleted. To continue delete, {} and retry",
                        kind.to_lowercase(),
                        name,
                        remediation
                    ))
                }
            }
        }
    }
}
