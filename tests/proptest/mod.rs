// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::string_slice
)]

//! Property-based tests for kubedb-admission.
//!
//! Uses proptest to generate random documents and verify the invariants of
//! the patch differ and the policies built on it.

#[path = "../common/mod.rs"]
mod common;

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use common::fixtures::{ResourceBuilder, dormant_database};
use kubedb_admission::webhooks::ResourceKind;
use kubedb_admission::webhooks::policies::{
    FieldPath, GuardVerdict, LifecycleGuard, Patch, STRUCTURAL_PATHS,
};

/// Strategy for generating any built-in kind.
fn any_kind() -> impl Strategy<Value = ResourceKind> {
    prop::sample::select(ResourceKind::ALL.to_vec())
}

/// Strategy for generating object keys.
fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,7}"
}

/// Strategy for generating arbitrary JSON documents, a few levels deep.
fn any_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(key(), inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strategy for generating JSON objects.
fn any_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key(), any_json(), 0..8)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

/// A representative document of `kind` with every protected field set.
fn sample(kind: ResourceKind) -> Value {
    if kind == ResourceKind::DormantDatabase {
        return dormant_database("sample", false, "Paused");
    }
    ResourceBuilder::new(kind, "sample")
        .version("1")
        .storage("standard", "1Gi")
        .database_secret("db-auth")
        .spec("nodeSelector", json!({"disktype": "ssd"}))
        .spec("init", json!({"scriptSource": {"configMap": {"name": "init"}}}))
        .spec("standby", json!("hot"))
        .spec("streaming", json!("asynchronous"))
        .spec("archiver", json!({"storage": {"storageSecretName": "s3"}}))
        .spec("enableSSL", json!(false))
        .spec("certificateSecret", json!({"secretName": "certs"}))
        .spec(
            "topology",
            json!({
                "master": {"replicas": 1, "prefix": "master"},
                "data": {"replicas": 1, "prefix": "data"},
                "client": {"replicas": 1, "prefix": "client"}
            }),
        )
        .do_not_pause(true)
        .build()
}

/// Replace the value at a dotted path without wildcards.
fn set_path(document: &mut Value, path: &str, value: Value) {
    let mut target = document;
    for segment in path.split('.') {
        target = &mut target[segment];
    }
    *target = value;
}

/// Rebuild every object in `value` with its keys in reverse order.
fn reverse_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut reversed = Map::new();
            for (k, v) in map.iter().rev() {
                reversed.insert(k.clone(), reverse_keys(v));
            }
            Value::Object(reversed)
        }
        Value::Array(items) => Value::Array(items.iter().map(reverse_keys).collect()),
        other => other.clone(),
    }
}

proptest! {
    /// Property: Diffing a document against itself yields an empty patch.
    #[test]
    fn test_identical_documents_empty_patch(doc in any_object()) {
        prop_assert!(Patch::diff(&doc, &doc).is_empty());
    }

    /// Property: Key order is not a change.
    #[test]
    fn test_key_order_irrelevant(doc in any_object()) {
        let reordered = reverse_keys(&doc);
        prop_assert!(Patch::diff(&doc, &reordered).is_empty());
    }

    /// Property: Documents that differ always produce a non-empty patch.
    #[test]
    fn test_different_documents_nonempty_patch(old in any_object(), new in any_object()) {
        prop_assume!(old != new);
        prop_assert!(!Patch::diff(&old, &new).is_empty());
    }

    /// Property: An unchanged object never violates immutability.
    #[test]
    fn test_noop_update_never_violates(kind in any_kind()) {
        let registration = kind.registration();
        let doc = sample(kind);
        prop_assert!(registration.immutability.check(&doc, &doc).is_empty());
    }

    /// Property: Changing one protected path is flagged as exactly that path.
    #[test]
    fn test_single_protected_change_flagged(
        kind in any_kind(),
        index in any::<prop::sample::Index>(),
        replacement in "[a-z]{1,8}",
    ) {
        let registration = kind.registration();
        let paths: Vec<&FieldPath> = registration
            .immutability
            .protected_paths()
            .iter()
            .filter(|p| !p.segments().iter().any(|s| s == "*"))
            .filter(|p| !STRUCTURAL_PATHS.contains(&p.as_str()))
            .collect();
        let path = index.get(&paths);

        let old = sample(kind);
        let mut new = old.clone();
        set_path(&mut new, path.as_str(), json!(format!("changed-{replacement}")));

        let violated = registration.immutability.check(&old, &new);
        prop_assert_eq!(violated, vec![(*path).clone()]);
    }

    /// Property: Unprotected spec fields and status can change freely.
    #[test]
    fn test_unprotected_change_allowed(
        kind in any_kind(),
        replicas in 0..10i64,
        phase in "[A-Z][a-z]{2,10}",
        label in key(),
    ) {
        let registration = kind.registration();
        let old = sample(kind);
        let mut new = old.clone();
        new["spec"]["replicas"] = json!(replicas);
        new["spec"]["doNotPause"] = json!(false);
        new["status"]["phase"] = json!(phase);
        new["metadata"]["labels"][label] = json!("x");

        prop_assert!(registration.immutability.check(&old, &new).is_empty());
    }

    /// Property: A wildcard path flags a change under any member, and never a
    /// change to a sibling field of that member.
    #[test]
    fn test_wildcard_member_and_sibling(
        member in prop::sample::select(vec!["master", "data", "client"]),
        prefix in "[a-z]{1,8}",
        replicas in 2..10i64,
    ) {
        let registration = ResourceKind::Elasticsearch.registration();
        let wildcard = FieldPath::new("spec.topology.*.prefix");
        let old = sample(ResourceKind::Elasticsearch);

        let mut renamed = old.clone();
        renamed["spec"]["topology"][member]["prefix"] = json!(format!("{member}-{prefix}"));
        prop_assert_eq!(registration.immutability.check(&old, &renamed), vec![wildcard]);

        let mut scaled = old.clone();
        scaled["spec"]["topology"][member]["replicas"] = json!(replicas);
        prop_assert!(registration.immutability.check(&old, &scaled).is_empty());
    }

    /// Property: Pause protection blocks deletion exactly when the flag is set.
    #[test]
    fn test_pause_protection(flag in any::<bool>(), name in key()) {
        let guard = LifecycleGuard::pause_protection("spec.doNotPause");
        let current = json!({"spec": {"doNotPause": flag}});

        let verdict = guard.evaluate("Redis", &name, Some(&current));
        prop_assert_eq!(matches!(verdict, GuardVerdict::Blocked(_)), flag);
        prop_assert!(matches!(guard.evaluate("Redis", &name, None), GuardVerdict::Permitted));
    }

    /// Property: A dormant database may only be deleted once wiped out.
    #[test]
    fn test_terminal_phase(
        phase in prop::sample::select(vec![
            "Pausing", "Paused", "WipingOut", "WipedOut", "Resuming", "Failed",
        ]),
    ) {
        let registration = ResourceKind::DormantDatabase.registration();
        let guard = registration.delete_guard.unwrap();
        let current = dormant_database("pg", true, phase);

        let verdict = guard.evaluate("DormantDatabase", "pg", Some(&current));
        prop_assert_eq!(matches!(verdict, GuardVerdict::Permitted), phase == "WipedOut");
    }
}
