//! Comparison result tree

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Attributes, ObjectId, ObjectKind, ObjectPath, SchemaObject};

/// Outcome of comparing one object across the two models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Equal,
    Different,
    LeftOnly,
    RightOnly,
    Conflict,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Equal,
        Status::Different,
        Status::LeftOnly,
        Status::RightOnly,
        Status::Conflict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Equal => "equal",
            Status::Different => "different",
            Status::LeftOnly => "left-only",
            Status::RightOnly => "right-only",
            Status::Conflict => "conflict",
        }
    }

    /// Anything other than `equal`
    pub fn is_change(&self) -> bool {
        !matches!(self, Status::Equal)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The side-specific content of an object: its identity and attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Payload {
    pub fn of(object: &SchemaObject) -> Self {
        Self {
            id: object.id.clone(),
            name: object.name.clone(),
            attributes: object.attributes.clone(),
        }
    }
}

/// How a single attribute differs between the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeChange {
    /// Only the left side has a value
    OnlyLeft,
    /// Only the right side has a value
    OnlyRight,
    /// Both sides have different values and there is no common ancestor
    Changed,
    /// Left moved away from the common ancestor, right did not
    LeftChanged,
    /// Right moved away from the common ancestor, left did not
    RightChanged,
    /// Both sides moved away from the common ancestor in different ways
    Conflicting,
}

/// Explanation attached to a result node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChangeNote {
    Renamed { from: String, to: String },
    Moved { from: ObjectPath, to: ObjectPath },
    Attribute { key: String, change: AttributeChange },
}

/// One node of the comparison result tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub name: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_value: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_value: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_value: Option<Payload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<ChangeNote>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComparisonResult>,
}

impl ComparisonResult {
    /// Depth-first, parent-before-children iteration over the tree
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes { stack: vec![self] }
    }

    /// Find a node by result id
    pub fn find(&self, id: &ObjectId) -> Option<&ComparisonResult> {
        self.nodes().find(|node| &node.id == id)
    }

    /// Ids of all nodes with status `conflict`, in tree order
    pub fn conflict_ids(&self) -> Vec<ObjectId> {
        self.nodes()
            .filter(|node| node.status == Status::Conflict)
            .map(|node| node.id.clone())
            .collect()
    }

    /// Per-status node counts
    pub fn summary(&self) -> ComparisonSummary {
        ComparisonSummary::of(self)
    }
}

/// Iterator returned by [`ComparisonResult::nodes`]
pub struct Nodes<'a> {
    stack: Vec<&'a ComparisonResult>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a ComparisonResult;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Node counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub equal: usize,
    pub different: usize,
    pub left_only: usize,
    pub right_only: usize,
    pub conflict: usize,
}

impl ComparisonSummary {
    pub fn of(tree: &ComparisonResult) -> Self {
        let mut summary = Self::default();
        for node in tree.nodes() {
            match node.status {
                Status::Equal => summary.equal += 1,
                Status::Different => summary.different += 1,
                Status::LeftOnly => summary.left_only += 1,
                Status::RightOnly => summary.right_only += 1,
                Status::Conflict => summary.conflict += 1,
            }
        }
        summary
    }

    /// Nodes that are not `equal`
    pub fn changed(&self) -> usize {
        self.different + self.left_only + self.right_only + self.conflict
    }

    pub fn total(&self) -> usize {
        self.equal + self.changed()
    }
}
