//! Admission policies for KubeDB resources.
//!
//! - Immutability: protected field paths on UPDATE (non-operator actors)
//! - Lifecycle: delete protection on DELETE (non-operator actors)
//!
//! Both work on the generic document form of a resource, so they apply to any
//! registered kind.

pub mod field_path;
pub mod immutability;
pub mod lifecycle;
pub mod patch;

pub use field_path::{FieldPath, WILDCARD};
pub use immutability::{ImmutabilityPolicy, STRUCTURAL_PATHS};
pub use lifecycle::{GuardVerdict, LifecycleGuard};
pub use patch::{Patch, PatchNode};
