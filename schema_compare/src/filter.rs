//! Status and text filtering of comparison results
//!
//! A node survives when it matches, or when something below it matches.
//! Ancestors kept only for context have their own children filtered too.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::compare::{ComparisonResult, Status};

/// Which statuses a filter lets through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "filter", content = "status")]
pub enum StatusFilter {
    #[default]
    All,
    /// Every status except `equal`
    Changed,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Changed => status.is_change(),
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let filter = match s.trim().to_lowercase().as_str() {
            "all" => StatusFilter::All,
            "changed" => StatusFilter::Changed,
            "equal" => StatusFilter::Only(Status::Equal),
            "different" => StatusFilter::Only(Status::Different),
            "left-only" => StatusFilter::Only(Status::LeftOnly),
            "right-only" => StatusFilter::Only(Status::RightOnly),
            "conflict" => StatusFilter::Only(Status::Conflict),
            other => return Err(format!("Unknown status filter: {}", other)),
        };
        Ok(filter)
    }
}

/// Reduce a result tree to the nodes matching `status` and `query`
///
/// Returns `None` when nothing in the tree matches.
pub fn filter(
    tree: &ComparisonResult,
    status: StatusFilter,
    query: &str,
) -> Option<ComparisonResult> {
    let query = query.to_lowercase();
    filter_node(tree, status, &query)
}

fn filter_node(node: &ComparisonResult, status: StatusFilter, query: &str) -> Option<ComparisonResult> {
    let children: Vec<ComparisonResult> = node
        .children
        .iter()
        .filter_map(|child| filter_node(child, status, query))
        .collect();

    let matches_itself =
        status.matches(node.status) && (query.is_empty() || node.name.to_lowercase().contains(query));

    if !matches_itself && children.is_empty() {
        return None;
    }

    Some(ComparisonResult {
        children,
        ..node.clone_shallow()
    })
}

impl ComparisonResult {
    /// Copy of this node without its children
    fn clone_shallow(&self) -> ComparisonResult {
        ComparisonResult {
            id: self.id.clone(),
            kind: self.kind,
            name: self.name.clone(),
            status: self.status,
            left_value: self.left_value.clone(),
            right_value: self.right_value.clone(),
            merge_value: self.merge_value.clone(),
            notes: self.notes.clone(),
            children: Vec::new(),
        }
    }
}
