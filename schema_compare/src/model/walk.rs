//! Tree traversal and validation

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::MalformedTree;
use crate::model::types::{ObjectId, SchemaObject};

/// Ids from the root down to an object, inclusive
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectPath(Vec<ObjectId>);

impl ObjectPath {
    pub fn root(id: &ObjectId) -> Self {
        Self(vec![id.clone()])
    }

    /// Path of a child below this one
    pub fn join(&self, id: &ObjectId) -> Self {
        let mut segments = self.0.clone();
        segments.push(id.clone());
        Self(segments)
    }

    /// Id of the parent object, if any
    pub fn parent(&self) -> Option<&ObjectId> {
        match self.0.len() {
            0 | 1 => None,
            len => self.0.get(len - 2),
        }
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[ObjectId] {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

/// Lazy depth-first, parent-before-children traversal of a model tree
pub struct Walk<'a> {
    stack: Vec<(ObjectPath, &'a SchemaObject)>,
}

/// Walk a tree; each call starts a fresh traversal
pub fn walk(tree: &SchemaObject) -> Walk<'_> {
    Walk {
        stack: vec![(ObjectPath::root(&tree.id), tree)],
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (ObjectPath, &'a SchemaObject);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, object) = self.stack.pop()?;

        // Reverse push keeps siblings in their original order
        for child in object.children.iter().rev() {
            self.stack.push((path.join(&child.id), child));
        }

        Some((path, object))
    }
}

/// Check the structural invariants every compared tree must satisfy
pub fn validate(tree: &SchemaObject) -> std::result::Result<(), MalformedTree> {
    let mut seen = HashSet::new();

    for (_, object) in walk(tree) {
        if !seen.insert(&object.id) {
            return Err(MalformedTree::DuplicateId(object.id.clone()));
        }

        if !object.children.is_empty() && !object.kind.supports_children() {
            return Err(MalformedTree::ChildrenOnLeaf {
                id: object.id.clone(),
                kind: object.kind.to_string(),
            });
        }
    }

    Ok(())
}
