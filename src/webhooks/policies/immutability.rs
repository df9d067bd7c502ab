//! Immutability validation policy.
//!
//! Enforced on UPDATE operations made by anyone but the operator.
//!
//! Validates:
//! - `apiVersion`, `kind`, `metadata.name` and `metadata.namespace` never change
//! - The `spec` fields a kind declares immutable never change

use serde_json::Value;

use super::field_path::FieldPath;
use super::patch::Patch;

/// Paths protected for every kind.
pub const STRUCTURAL_PATHS: [&str; 4] = ["apiVersion", "kind", "metadata.name", "metadata.namespace"];

/// Ordered list of protected field paths for one resource kind.
#[derive(Clone, Debug)]
pub struct ImmutabilityPolicy {
    protected: Vec<FieldPath>,
}

impl Default for ImmutabilityPolicy {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl ImmutabilityPolicy {
    /// Create a policy protecting the structural keys plus `spec_paths`.
    pub fn new(spec_paths: &[&str]) -> Self {
        let protected = STRUCTURAL_PATHS
            .iter()
            .chain(spec_paths)
            .map(|path| FieldPath::new(*path))
            .collect();
        Self { protected }
    }

    /// Every protected path, structural keys first.
    pub fn protected_paths(&self) -> &[FieldPath] {
        &self.protected
    }

    /// Return every protected path changed between `old` and `new`.
    pub fn check(&self, old: &Value, new: &Value) -> Vec<FieldPath> {
        let patch = Patch::diff(old, new);
        if patch.is_empty() {
            return Vec::new();
        }

        tracing::trace!(patch = %patch.to_json(), "Computed update patch");

        self.protected
            .iter()
            .filter(|path| path.is_changed_in(&patch))
            .cloned()
            .collect()
    }

    /// Human-readable denial naming the violated paths and all protected ones.
    pub fn violation_message(&self, violated: &[FieldPath]) -> String {
        let violated = violated
            .iter()
            .map(FieldPath::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let protected = self
            .protected
            .iter()
            .map(FieldPath::as_str)
            .collect::<Vec<_>>()
            .join("\n\t");
        format!(
            "immutable fields changed: {violated}. The following fields cannot be modified:\n\t{protected}"
        )
    }
}
