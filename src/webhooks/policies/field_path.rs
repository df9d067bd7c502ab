//! Dotted field paths and the check of whether a patch touched them.
//!
//! A path such as `spec.topology.*.prefix` is split on `.`; a `*` segment
//! stands for every member of the collection at that position.

use std::fmt;

use serde_json::Value;

use super::patch::{Patch, PatchNode};

/// Segment matching every member of a collection.
pub const WILDCARD: &str = "*";

/// A declared location in a resource document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether `patch` changes anything at this path.
    pub fn is_changed_in(&self, patch: &Patch) -> bool {
        !unchanged_in_fields(&self.segments, patch.fields())
    }

    /// Resolve the value at this path. Wildcards never resolve.
    pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(document, |value, segment| {
            if segment == WILDCARD {
                return None;
            }
            match value {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            }
        })
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Walk one mapping level of the patch.
fn unchanged_in_fields(
    segments: &[String],
    fields: &std::collections::BTreeMap<String, PatchNode>,
) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return true;
    };

    if head == WILDCARD {
        // A trailing wildcard is satisfied by the parent's presence alone.
        return rest.is_empty() || fields.values().all(|node| unchanged_in_node(rest, node));
    }

    match fields.get(head) {
        None => true,
        Some(_) if rest.is_empty() => false,
        Some(node) => unchanged_in_node(rest, node),
    }
}

/// Walk one sequence level of the patch. Named segments address elements by index.
fn unchanged_in_elements(
    segments: &[String],
    elements: &std::collections::BTreeMap<usize, PatchNode>,
) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return true;
    };

    if head == WILDCARD {
        return rest.is_empty() || elements.values().all(|node| unchanged_in_node(rest, node));
    }

    let Ok(index) = head.parse::<usize>() else {
        return true;
    };
    match elements.get(&index) {
        None => true,
        Some(_) if rest.is_empty() => false,
        Some(node) => unchanged_in_node(rest, node),
    }
}

fn unchanged_in_node(segments: &[String], node: &PatchNode) -> bool {
    match node {
        PatchNode::Fields(fields) => unchanged_in_fields(segments, fields),
        PatchNode::Elements(elements) => unchanged_in_elements(segments, elements),
        PatchNode::Replaced(value) => unchanged_in_value(segments, value),
        PatchNode::Deleted => false,
    }
}

/// Walk a subtree the patch sets wholesale. Only paths that exist in it changed.
fn unchanged_in_value(segments: &[String], value: &Value) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return true;
    };

    let child = match value {
        Value::Object(map) if head == WILDCARD => {
            return rest.is_empty() || map.values().all(|v| unchanged_in_value(rest, v));
        }
        Value::Array(items) if head == WILDCARD => {
            return rest.is_empty() || items.iter().all(|v| unchanged_in_value(rest, v));
        }
        Value::Object(map) => map.get(head),
        Value::Array(items) => head.parse::<usize>().ok().and_then(|i| items.get(i)),
        // A scalar replaced a mapping the path descends into.
        _ => return false,
    };

    match child {
        None => true,
        Some(_) if rest.is_empty() => false,
        Some(child) => unchanged_in_value(rest, child),
    }
}
