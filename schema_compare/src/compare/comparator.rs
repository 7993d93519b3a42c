//! Model comparator
//!
//! Walks a left (source) and right (target) model tree and produces a
//! [`ComparisonResult`] tree. Children of a matched pair are matched by id,
//! then by move detection, then by name and kind, and finally by rename
//! similarity. Excluded object kinds are pruned before any matching happens.

use std::collections::{HashMap, HashSet};

use crate::compare::result::{AttributeChange, ChangeNote, ComparisonResult, Payload, Status};
use crate::error::Result;
use crate::model::{validate, ObjectId, ObjectKind, ObjectPath, SchemaObject};
use crate::options::{CompareSettings, ComparisonOptions};
use crate::utils::text::{non_null, normalize_key, similarity, Sensitivity};

/// Configured comparator; cheap to build, reusable across runs
#[derive(Debug, Clone)]
pub struct Comparator<'a> {
    options: ComparisonOptions,
    settings: CompareSettings,
    base: Option<&'a SchemaObject>,
}

impl<'a> Comparator<'a> {
    /// Create a comparator for the given options with default settings
    pub fn new(options: &ComparisonOptions) -> Self {
        Self {
            options: *options,
            settings: CompareSettings::default(),
            base: None,
        }
    }

    /// Override the rename and conflict heuristics
    pub fn with_settings(mut self, settings: CompareSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Compare against a common ancestor, enabling three-way classification
    pub fn with_base(mut self, base: Option<&'a SchemaObject>) -> Self {
        self.base = base;
        self
    }

    /// Compare two model trees; either side may be absent
    pub fn compare<'t>(
        &'t self,
        left: Option<&'t SchemaObject>,
        right: Option<&'t SchemaObject>,
    ) -> Result<ComparisonResult> {
        for tree in [self.base, left, right].into_iter().flatten() {
            validate(tree)?;
        }

        tracing::debug!(
            left = left.map(|tree| tree.name.as_str()),
            right = right.map(|tree| tree.name.as_str()),
            three_way = self.base.is_some(),
            "Comparing models"
        );

        let pass = Pass {
            options: self.options,
            settings: self.settings,
            sensitivity: self.options.sensitivity(),
            left: TreeIndex::build(left, &self.options),
            right: TreeIndex::build(right, &self.options),
            base: self.base.map(|base| TreeIndex::build(Some(base), &self.options)),
        };

        let result = match (left, right) {
            (Some(left), Some(right)) => pass.pair(
                left,
                right,
                ObjectPath::root(&left.id),
                ObjectPath::root(&right.id),
                false,
            ),
            (Some(left), None) => pass.one_sided(left, ObjectPath::root(&left.id), Side::Left),
            (None, Some(right)) => pass.one_sided(right, ObjectPath::root(&right.id), Side::Right),
            (None, None) => ComparisonResult {
                id: ObjectId::new("root"),
                kind: ObjectKind::Model,
                name: String::new(),
                status: Status::Equal,
                left_value: None,
                right_value: None,
                merge_value: None,
                notes: Vec::new(),
                children: Vec::new(),
            },
        };

        let summary = result.summary();
        tracing::debug!(
            equal = summary.equal,
            different = summary.different,
            left_only = summary.left_only,
            right_only = summary.right_only,
            conflict = summary.conflict,
            "Comparison finished"
        );

        Ok(result)
    }
}

/// Location of every traversable object of one tree
struct TreeIndex<'t> {
    entries: HashMap<&'t ObjectId, IndexEntry<'t>>,
}

struct IndexEntry<'t> {
    object: &'t SchemaObject,
    path: ObjectPath,
}

impl<'t> TreeIndex<'t> {
    fn build(tree: Option<&'t SchemaObject>, options: &ComparisonOptions) -> Self {
        let mut entries = HashMap::new();
        if let Some(root) = tree {
            Self::insert(root, ObjectPath::root(&root.id), options, &mut entries);
        }
        Self { entries }
    }

    fn insert(
        object: &'t SchemaObject,
        path: ObjectPath,
        options: &ComparisonOptions,
        entries: &mut HashMap<&'t ObjectId, IndexEntry<'t>>,
    ) {
        for child in object.children.iter().filter(|c| options.includes_object(c)) {
            Self::insert(child, path.join(&child.id), options, entries);
        }
        entries.insert(&object.id, IndexEntry { object, path });
    }

    fn get(&self, id: &ObjectId) -> Option<&IndexEntry<'t>> {
        self.entries.get(id)
    }

    fn contains(&self, id: &ObjectId) -> bool {
        self.entries.contains_key(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug, Default)]
struct AttributeDiff {
    notes: Vec<ChangeNote>,
    conflicting: bool,
    /// Keys where only the left side moved away from the ancestor
    left_changed: Vec<String>,
}

/// State of a single comparator run
struct Pass<'t> {
    options: ComparisonOptions,
    settings: CompareSettings,
    sensitivity: Sensitivity,
    left: TreeIndex<'t>,
    right: TreeIndex<'t>,
    base: Option<TreeIndex<'t>>,
}

impl<'t> Pass<'t> {
    fn included(&self, children: &'t [SchemaObject]) -> Vec<&'t SchemaObject> {
        children
            .iter()
            .filter(|child| self.options.includes_object(child))
            .collect()
    }

    /// The left object lives elsewhere in the right tree and is reported there
    fn moved_in_right(&self, left: &SchemaObject) -> bool {
        self.options.detect_moved_objects
            && self
                .right
                .get(&left.id)
                .is_some_and(|entry| entry.object.kind == left.kind)
    }

    /// Left counterpart of a right object that was moved from another parent
    fn moved_from_left(&self, right: &SchemaObject) -> Option<&IndexEntry<'t>> {
        if !self.options.detect_moved_objects {
            return None;
        }
        self.left
            .get(&right.id)
            .filter(|entry| entry.object.kind == right.kind)
    }

    fn base_for(&self, left: &SchemaObject, right: &SchemaObject) -> Option<&'t SchemaObject> {
        let base = self.base.as_ref()?;
        base.get(&left.id)
            .or_else(|| base.get(&right.id))
            .map(|entry| entry.object)
            .filter(|object| object.kind == left.kind)
    }

    /// Compare a matched pair and its subtree
    fn pair(
        &self,
        left: &'t SchemaObject,
        right: &'t SchemaObject,
        left_path: ObjectPath,
        right_path: ObjectPath,
        moved: bool,
    ) -> ComparisonResult {
        let mut notes = Vec::new();

        if !self.sensitivity.text_eq(&left.name, &right.name) {
            notes.push(ChangeNote::Renamed {
                from: left.name.clone(),
                to: right.name.clone(),
            });
        }

        if moved {
            tracing::trace!(id = %left.id, from = %left_path, to = %right_path, "Detected moved object");
            notes.push(ChangeNote::Moved {
                from: left_path.clone(),
                to: right_path.clone(),
            });
        }

        let base = self.base_for(left, right);
        let diff = self.diff_attributes(left, right, base);
        notes.extend(diff.notes.iter().cloned());

        let children = if left.kind.supports_children() || right.kind.supports_children() {
            self.children(left, right, &left_path, &right_path)
        } else {
            Vec::new()
        };

        let own = if diff.conflicting {
            Status::Conflict
        } else if notes.is_empty() {
            Status::Equal
        } else {
            Status::Different
        };

        // Containers only ever pick up `different` from their descendants
        let status = if own == Status::Equal && children.iter().any(|c| c.status.is_change()) {
            Status::Different
        } else {
            own
        };

        let merge_value = match status {
            Status::Conflict => None,
            _ => Some(self.merged_payload(left, right, base, &diff)),
        };

        ComparisonResult {
            id: left.id.clone(),
            kind: left.kind,
            name: left.name.clone(),
            status,
            left_value: Some(Payload::of(left)),
            right_value: Some(Payload::of(right)),
            merge_value,
            notes,
            children,
        }
    }

    /// Report an object present on one side only, with its subtree
    fn one_sided(&self, object: &'t SchemaObject, path: ObjectPath, side: Side) -> ComparisonResult {
        let mut children = Vec::new();

        for child in self.included(&object.children) {
            let child_path = path.join(&child.id);
            match side {
                Side::Left => {
                    if !self.moved_in_right(child) {
                        children.push(self.one_sided(child, child_path, Side::Left));
                    }
                }
                Side::Right => match self.moved_from_left(child) {
                    Some(entry) => children.push(self.pair(
                        entry.object,
                        child,
                        entry.path.clone(),
                        child_path,
                        true,
                    )),
                    None => children.push(self.one_sided(child, child_path, Side::Right)),
                },
            }
        }

        let payload = Payload::of(object);

        match side {
            Side::Left => ComparisonResult {
                id: object.id.clone(),
                kind: object.kind,
                name: object.name.clone(),
                status: Status::LeftOnly,
                left_value: Some(payload),
                right_value: None,
                merge_value: None,
                notes: Vec::new(),
                children,
            },
            Side::Right => {
                // Keep result ids unique when the id spaces of both trees overlap
                let id = if self.left.contains(&object.id) {
                    ObjectId::new(format!("right:{}", object.id))
                } else {
                    object.id.clone()
                };

                ComparisonResult {
                    id,
                    kind: object.kind,
                    name: object.name.clone(),
                    status: Status::RightOnly,
                    left_value: None,
                    right_value: Some(payload.clone()),
                    merge_value: Some(payload),
                    notes: Vec::new(),
                    children,
                }
            }
        }
    }

    /// Match and compare the included children of a matched pair
    fn children(
        &self,
        left: &'t SchemaObject,
        right: &'t SchemaObject,
        left_path: &ObjectPath,
        right_path: &ObjectPath,
    ) -> Vec<ComparisonResult> {
        let lefts = self.included(&left.children);
        let rights = self.included(&right.children);

        let mut left_slots: Vec<Option<usize>> = vec![None; lefts.len()];
        let mut left_moved = vec![false; lefts.len()];
        let mut right_taken = vec![false; rights.len()];
        let mut right_moved: Vec<Option<&IndexEntry<'t>>> = vec![None; rights.len()];

        // Id continuity
        let right_by_id: HashMap<&ObjectId, usize> = rights
            .iter()
            .enumerate()
            .map(|(j, object)| (&object.id, j))
            .collect();

        for (i, &object) in lefts.iter().enumerate() {
            if let Some(&j) = right_by_id.get(&object.id) {
                if rights[j].kind == object.kind && !right_taken[j] {
                    left_slots[i] = Some(j);
                    right_taken[j] = true;
                }
            }
        }

        // Moves across parents
        for (i, &object) in lefts.iter().enumerate() {
            if left_slots[i].is_none() && self.moved_in_right(object) {
                left_moved[i] = true;
            }
        }
        for (j, &object) in rights.iter().enumerate() {
            if !right_taken[j] {
                if let Some(entry) = self.moved_from_left(object) {
                    right_moved[j] = Some(entry);
                    right_taken[j] = true;
                }
            }
        }

        // Name and kind, for trees without shared lineage
        for (i, &object) in lefts.iter().enumerate() {
            if left_slots[i].is_some() || left_moved[i] {
                continue;
            }
            let candidate = (0..rights.len()).find(|&j| {
                !right_taken[j]
                    && rights[j].kind == object.kind
                    && self.sensitivity.text_eq(&rights[j].name, &object.name)
            });
            if let Some(j) = candidate {
                left_slots[i] = Some(j);
                right_taken[j] = true;
            }
        }

        if self.options.detect_renamed_objects {
            self.pair_renames(&lefts, &rights, &mut left_slots, &left_moved, &mut right_taken);
        }

        let mut results = Vec::with_capacity(lefts.len() + rights.len());

        for (i, &object) in lefts.iter().enumerate() {
            if left_moved[i] {
                continue;
            }
            let path = left_path.join(&object.id);
            let result = match left_slots[i] {
                Some(j) => self.pair(object, rights[j], path, right_path.join(&rights[j].id), false),
                None => self.one_sided(object, path, Side::Left),
            };
            results.push(result);
        }

        // Right-only and moved objects follow, in right order
        for (j, &object) in rights.iter().enumerate() {
            let path = right_path.join(&object.id);
            if let Some(entry) = right_moved[j] {
                results.push(self.pair(entry.object, object, entry.path.clone(), path, true));
            } else if !right_taken[j] {
                results.push(self.one_sided(object, path, Side::Right));
            }
        }

        results
    }

    /// Greedily pair leftover same-kind siblings by name similarity
    fn pair_renames(
        &self,
        lefts: &[&'t SchemaObject],
        rights: &[&'t SchemaObject],
        left_slots: &mut [Option<usize>],
        left_moved: &[bool],
        right_taken: &mut [bool],
    ) {
        let fold = Sensitivity {
            ignore_case: true,
            ignore_whitespace: self.options.ignore_whitespace,
        };

        let mut candidates = Vec::new();
        for (i, &left) in lefts.iter().enumerate() {
            if left_slots[i].is_some() || left_moved[i] {
                continue;
            }
            let left_name = fold.normalize(&left.name);
            for (j, &right) in rights.iter().enumerate() {
                if right_taken[j] || right.kind != left.kind {
                    continue;
                }
                let score = similarity(&left_name, &fold.normalize(&right.name));
                if score >= self.settings.rename_threshold {
                    candidates.push((score, i, j));
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });

        for (score, i, j) in candidates {
            if left_slots[i].is_some() || right_taken[j] {
                continue;
            }
            tracing::trace!(
                from = %lefts[i].name,
                to = %rights[j].name,
                score,
                "Detected renamed object"
            );
            left_slots[i] = Some(j);
            right_taken[j] = true;
        }
    }

    /// Classify every enabled attribute of a matched pair
    fn diff_attributes(
        &self,
        left: &SchemaObject,
        right: &SchemaObject,
        base: Option<&SchemaObject>,
    ) -> AttributeDiff {
        let mut diff = AttributeDiff::default();
        let mut seen = HashSet::new();
        let mut both_sided = 0;

        let keys = left
            .attributes
            .keys()
            .chain(right.attributes.keys())
            .filter(|key| seen.insert(normalize_key(key)));

        for key in keys {
            if !self.options.includes_attribute(left.kind, key) {
                continue;
            }

            let left_value = non_null(left.attribute(key));
            let right_value = non_null(right.attribute(key));
            if self.sensitivity.option_eq(left_value, right_value) {
                continue;
            }

            let change = match base {
                Some(base) => {
                    let base_value = non_null(base.attribute(key));
                    if self.sensitivity.option_eq(left_value, base_value) {
                        AttributeChange::RightChanged
                    } else if self.sensitivity.option_eq(right_value, base_value) {
                        diff.left_changed.push(key.clone());
                        AttributeChange::LeftChanged
                    } else {
                        diff.conflicting = true;
                        AttributeChange::Conflicting
                    }
                }
                None => match (left_value, right_value) {
                    (Some(_), None) => AttributeChange::OnlyLeft,
                    (None, Some(_)) => AttributeChange::OnlyRight,
                    _ => {
                        both_sided += 1;
                        AttributeChange::Changed
                    }
                },
            };

            diff.notes.push(ChangeNote::Attribute {
                key: key.clone(),
                change,
            });
        }

        if base.is_none() && both_sided >= self.settings.conflict_field_threshold.max(1) {
            diff.conflicting = true;
        }

        diff
    }

    /// Default merge value: the target, with left-only edits folded in when an ancestor is known
    fn merged_payload(
        &self,
        left: &SchemaObject,
        right: &SchemaObject,
        base: Option<&SchemaObject>,
        diff: &AttributeDiff,
    ) -> Payload {
        let mut payload = Payload::of(right);
        let Some(base) = base else {
            return payload;
        };

        for key in &diff.left_changed {
            let wanted = normalize_key(key);
            match non_null(left.attribute(key)) {
                Some(value) => {
                    let slot = payload
                        .attributes
                        .iter_mut()
                        .find(|(name, _)| normalize_key(name) == wanted)
                        .map(|(_, slot)| slot);
                    match slot {
                        Some(slot) => *slot = value.clone(),
                        None => {
                            payload.attributes.insert(key.clone(), value.clone());
                        }
                    }
                }
                None => payload.attributes.retain(|name, _| normalize_key(name) != wanted),
            }
        }

        if self.sensitivity.text_eq(&base.name, &right.name)
            && !self.sensitivity.text_eq(&left.name, &right.name)
        {
            payload.name = left.name.clone();
        }

        payload
    }
}
