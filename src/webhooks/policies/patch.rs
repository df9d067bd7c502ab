//! Merge-patch computation between two revisions of a resource document.
//!
//! The patch describes exactly the fields that differ between revisions.
//! Values are compared structurally, so re-marshaled or reordered documents
//! that are semantically equal produce an empty patch.
//!
//! Unlike a plain JSON merge patch, sequences of equal length are diffed
//! element by element. This lets a wildcard path such as
//! `spec.members.*.role` distinguish a changed `role` from a changed sibling.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A single changed location in a patch.
#[derive(Clone, Debug, PartialEq)]
pub enum PatchNode {
    /// The field was removed.
    Deleted,
    /// The field was added, or its value replaced wholesale.
    Replaced(Value),
    /// Some fields of a mapping changed.
    Fields(BTreeMap<String, PatchNode>),
    /// Some elements of a sequence changed; its length did not.
    Elements(BTreeMap<usize, PatchNode>),
}

impl PatchNode {
    /// Render as a JSON merge patch fragment.
    ///
    /// Element-wise changes render as an object keyed by index, since RFC 7386
    /// has no notation for them.
    pub fn to_json(&self) -> Value {
        match self {
            PatchNode::Deleted => Value::Null,
            PatchNode::Replaced(value) => value.clone(),
            PatchNode::Fields(fields) => fields_to_json(fields),
            PatchNode::Elements(elements) => Value::Object(
                elements
                    .iter()
                    .map(|(index, node)| (index.to_string(), node.to_json()))
                    .collect(),
            ),
        }
    }
}

fn fields_to_json(fields: &BTreeMap<String, PatchNode>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, node)| (key.clone(), node.to_json()))
            .collect(),
    )
}

/// The set of changes between two documents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    root: BTreeMap<String, PatchNode>,
}

/// Which kinds of change a diff pass records.
#[derive(Clone, Copy)]
struct DiffMode {
    changes: bool,
    deletions: bool,
}

const CHANGES_ONLY: DiffMode = DiffMode {
    changes: true,
    deletions: false,
};

const DELETIONS_ONLY: DiffMode = DiffMode {
    changes: false,
    deletions: true,
};

impl Patch {
    /// Compute the patch that turns `original` into `modified`.
    ///
    /// Equivalent to a three-way merge patch in which `original` is also the
    /// current live state.
    pub fn diff(original: &Value, modified: &Value) -> Self {
        Self::three_way(original, modified, original)
    }

    /// Compute a three-way merge patch.
    ///
    /// Additions and changes are taken from `current` -> `modified`; deletions
    /// from `original` -> `modified`, so fields another writer added to
    /// `current` are left alone.
    pub fn three_way(original: &Value, modified: &Value, current: &Value) -> Self {
        let empty = Map::new();
        let original = original.as_object().unwrap_or(&empty);
        let modified = modified.as_object().unwrap_or(&empty);
        let current = current.as_object().unwrap_or(&empty);

        let delta = diff_maps(current, modified, CHANGES_ONLY);
        let deletions = diff_maps(original, modified, DELETIONS_ONLY);

        Self {
            root: merge_fields(delta, deletions),
        }
    }

    /// Whether the documents were equal.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Top level of the patch.
    pub fn fields(&self) -> &BTreeMap<String, PatchNode> {
        &self.root
    }

    /// Render as a JSON merge patch, for logging.
    pub fn to_json(&self) -> Value {
        fields_to_json(&self.root)
    }
}

fn diff_maps(from: &Map<String, Value>, to: &Map<String, Value>, mode: DiffMode) -> BTreeMap<String, PatchNode> {
    let mut out = BTreeMap::new();

    if mode.deletions {
        for key in from.keys() {
            if !to.contains_key(key) {
                out.insert(key.clone(), PatchNode::Deleted);
            }
        }
    }

    for (key, new) in to {
        let node = match from.get(key) {
            None if mode.changes => Some(PatchNode::Replaced(new.clone())),
            None => None,
            Some(old) => diff_values(old, new, mode),
        };
        if let Some(node) = node {
            out.insert(key.clone(), node);
        }
    }

    out
}

fn diff_values(old: &Value, new: &Value, mode: DiffMode) -> Option<PatchNode> {
    if old == new {
        return None;
    }

    match (old, new) {
        (Value::Object(old), Value::Object(new)) => {
            let fields = diff_maps(old, new, mode);
            (!fields.is_empty()).then_some(PatchNode::Fields(fields))
        }
        (Value::Array(old), Value::Array(new)) if old.len() == new.len() => {
            let elements: BTreeMap<usize, PatchNode> = old
                .iter()
                .zip(new)
                .enumerate()
                .filter_map(|(index, (o, n))| diff_values(o, n, mode).map(|node| (index, node)))
                .collect();
            (!elements.is_empty()).then_some(PatchNode::Elements(elements))
        }
        _ if mode.changes => Some(PatchNode::Replaced(new.clone())),
        _ => None,
    }
}

fn merge_fields(
    mut delta: BTreeMap<String, PatchNode>,
    deletions: BTreeMap<String, PatchNode>,
) -> BTreeMap<String, PatchNode> {
    for (key, deleted) in deletions {
        let merged = match delta.remove(&key) {
            None => deleted,
            Some(existing) => merge_nodes(existing, deleted),
        };
        delta.insert(key, merged);
    }
    delta
}

fn merge_nodes(delta: PatchNode, deletions: PatchNode) -> PatchNode {
    match (delta, deletions) {
        (PatchNode::Fields(d), PatchNode::Fields(r)) => PatchNode::Fields(merge_fields(d, r)),
        (PatchNode::Elements(mut d), PatchNode::Elements(r)) => {
            for (index, deleted) in r {
                let merged = match d.remove(&index) {
                    None => deleted,
                    Some(existing) => merge_nodes(existing, deleted),
                };
                d.insert(index, merged);
            }
            PatchNode::Elements(d)
        }
        // A replacement already covers anything deleted underneath it.
        (delta, _) => delta,
    }
}
