//! Merge resolver
//!
//! Turns a comparison result plus user decisions into a merged tree. The
//! input tree is never modified, so resolution can be re-run every time a
//! single decision changes.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::compare::{ComparisonResult, Payload, Status};
use crate::error::{Error, Result};
use crate::model::{validate, Attributes, ObjectId, ObjectKind, SchemaObject};

/// How the user chose to resolve one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    UseLeft,
    UseRight,
    Manual(ManualValue),
}

/// A hand-written replacement value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManualValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

/// Decisions keyed by result node id
pub type Decisions = HashMap<ObjectId, Decision>;

/// Where the final value of a merged node came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSource {
    /// The comparator's merge value, no decision involved
    Default,
    Left,
    Right,
    Manual,
    /// The node is not part of the merged model
    Dropped,
}

/// One node of the merged tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedNode {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub name: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Payload>,
    pub source: ValueSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MergedNode>,
}

/// Fully resolved counterpart of a comparison result tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedTree {
    pub root: MergedNode,
}

impl MergedTree {
    /// Depth-first iteration over all merged nodes
    pub fn nodes(&self) -> impl Iterator<Item = &MergedNode> {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn find(&self, id: &ObjectId) -> Option<&MergedNode> {
        self.nodes().find(|node| &node.id == id)
    }

    /// Build the deployable model: dropped nodes and their subtrees are pruned
    ///
    /// A dropped node never has a kept descendant, see [`resolve`].
    pub fn to_schema(&self) -> Result<Option<SchemaObject>> {
        let Some(tree) = materialize(&self.root) else {
            return Ok(None);
        };
        validate(&tree)?;
        Ok(Some(tree))
    }
}

fn materialize(node: &MergedNode) -> Option<SchemaObject> {
    let value = node.value.as_ref()?;

    Some(SchemaObject {
        id: value.id.clone(),
        name: value.name.clone(),
        kind: node.kind,
        attributes: value.attributes.clone(),
        children: node.children.iter().filter_map(materialize).collect(),
    })
}

/// Ids of conflict nodes that have no decision, in tree order
pub fn unresolved_conflicts(result: &ComparisonResult, decisions: &Decisions) -> Vec<ObjectId> {
    result
        .nodes()
        .filter(|node| node.status == Status::Conflict && !decisions.contains_key(&node.id))
        .map(|node| node.id.clone())
        .collect()
}

/// Resolve every node of a comparison result
///
/// Fails with [`Error::UnresolvedConflict`] for the first conflict (in tree
/// order) that has no decision. Nothing is ever resolved partially.
///
/// Keeping a one-sided object also keeps its one-sided ancestors, even
/// when they were dropped by default or by an explicit decision.
pub fn resolve(result: &ComparisonResult, decisions: &Decisions) -> Result<MergedTree> {
    let known: HashSet<&ObjectId> = result.nodes().map(|node| &node.id).collect();
    for id in decisions.keys().filter(|id| !known.contains(id)) {
        tracing::warn!(id = %id, "Ignoring decision for unknown node");
    }

    let root = resolve_node(result, decisions, None)?;

    tracing::debug!(decisions = decisions.len(), "Merge resolved");

    Ok(MergedTree { root })
}

fn resolve_node(
    node: &ComparisonResult,
    decisions: &Decisions,
    inherited: Option<&Decision>,
) -> Result<MergedNode> {
    let one_sided = matches!(node.status, Status::LeftOnly | Status::RightOnly);
    let explicit = decisions.get(&node.id);
    let decision = explicit.or(if one_sided { inherited } else { None });

    let (value, source) = match decision {
        Some(Decision::UseLeft) => pick(&node.left_value, ValueSource::Left),
        Some(Decision::UseRight) => pick(&node.right_value, ValueSource::Right),
        Some(Decision::Manual(manual)) => (Some(manual_payload(node, manual)), ValueSource::Manual),
        None if node.status == Status::Conflict => {
            return Err(Error::UnresolvedConflict(node.id.clone()));
        }
        None => pick(&node.merge_value, ValueSource::Default),
    };

    // Keep/drop choices on a one-sided object carry over to its one-sided subtree
    let passed_down = match decision {
        Some(choice @ (Decision::UseLeft | Decision::UseRight)) if one_sided => Some(choice),
        _ if one_sided => inherited,
        _ => None,
    };

    let children = node
        .children
        .iter()
        .map(|child| resolve_node(child, decisions, passed_down))
        .collect::<Result<Vec<_>>>()?;

    // A kept descendant needs its one-sided ancestors in the merged model
    let (value, source) = match value {
        None if one_sided && children.iter().any(|child| child.value.is_some()) => {
            tracing::debug!(id = %node.id, "Keeping one-sided object for a kept descendant");
            match node.status {
                Status::LeftOnly => pick(&node.left_value, ValueSource::Left),
                _ => pick(&node.right_value, ValueSource::Right),
            }
        }
        _ => (value, source),
    };

    let status = match node.status {
        Status::Conflict => Status::Different,
        other => other,
    };

    Ok(MergedNode {
        id: node.id.clone(),
        kind: node.kind,
        name: value
            .as_ref()
            .map(|payload| payload.name.clone())
            .unwrap_or_else(|| node.name.clone()),
        status,
        value,
        source,
        children,
    })
}

fn pick(value: &Option<Payload>, source: ValueSource) -> (Option<Payload>, ValueSource) {
    match value {
        Some(payload) => (Some(payload.clone()), source),
        None => (None, ValueSource::Dropped),
    }
}

fn manual_payload(node: &ComparisonResult, manual: &ManualValue) -> Payload {
    let existing = node.right_value.as_ref().or(node.left_value.as_ref());

    Payload {
        id: existing
            .map(|payload| payload.id.clone())
            .unwrap_or_else(|| node.id.clone()),
        name: manual
            .name
            .clone()
            .or_else(|| existing.map(|payload| payload.name.clone()))
            .unwrap_or_else(|| node.name.clone()),
        attributes: manual.attributes.clone(),
    }
}
