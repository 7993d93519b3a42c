//! Comparison options, presets and profile selection
//!
//! Every flag is independent: all combinations are valid and no option
//! validation takes place. Unknown keys are ignored so that newer front ends
//! can talk to older cores.

use schema_compare_macros::OptionFlags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{ObjectKind, SchemaObject};
use crate::utils::text::{normalize_key, Sensitivity};

/// Flags deciding which object and attribute categories take part in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, OptionFlags)]
#[serde(rename_all = "camelCase", default)]
pub struct ComparisonOptions {
    // Sensitivity
    pub ignore_case: bool,
    pub ignore_whitespace: bool,

    // Structure
    pub compare_tables: bool,
    pub compare_columns: bool,
    pub compare_data_types: bool,
    pub compare_nullability: bool,
    pub compare_default_values: bool,
    pub compare_relationships: bool,

    // Keys and constraints
    pub compare_primary_keys: bool,
    pub compare_foreign_keys: bool,
    pub compare_unique_constraints: bool,
    pub compare_check_constraints: bool,

    // Indexes and performance
    pub compare_indexes: bool,
    pub compare_triggers: bool,

    // Metadata
    pub compare_comments: bool,
    pub compare_descriptions: bool,

    // Procedures
    pub compare_stored_procedures: bool,
    pub compare_functions: bool,
    pub compare_views: bool,

    // Smart detection
    pub detect_renamed_objects: bool,
    pub detect_moved_objects: bool,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Preset::Complete.options()
    }
}

/// Attribute categories that options can switch off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeCategory {
    DataType,
    Nullability,
    DefaultValue,
    Comment,
    Description,
    General,
}

impl AttributeCategory {
    /// Classify an attribute key of an object of the given kind
    ///
    /// A bare `type` is the data type of columns and domains only; on keys
    /// and constraints it names the flavour instead.
    pub fn of(kind: ObjectKind, key: &str) -> Self {
        match normalize_key(key).as_str() {
            "datatype" | "physicaldatatype" | "logicaldatatype" | "columntype" | "sqltype"
            | "length" | "precision" | "scale" => AttributeCategory::DataType,
            "type" if matches!(kind, ObjectKind::Attribute | ObjectKind::Domain) => {
                AttributeCategory::DataType
            }
            "nullable" | "null" | "nulloption" | "notnull" | "isnullable" => {
                AttributeCategory::Nullability
            }
            "default" | "defaultvalue" => AttributeCategory::DefaultValue,
            "comment" | "comments" => AttributeCategory::Comment,
            "description" | "definitionnote" | "note" | "notes" => AttributeCategory::Description,
            _ => AttributeCategory::General,
        }
    }
}

/// Flavour of a key or constraint object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFlavor {
    Primary,
    Foreign,
    Unique,
    Check,
}

fn key_flavor(object: &SchemaObject, fallback: KeyFlavor) -> KeyFlavor {
    let Some(value) = object.text_attribute(&["key_type", "constraint_type", "type"]) else {
        return fallback;
    };

    match normalize_key(&value).as_str() {
        "pk" | "primary" | "primarykey" => KeyFlavor::Primary,
        "fk" | "foreign" | "foreignkey" | "references" => KeyFlavor::Foreign,
        "ak" | "unique" | "uniquekey" | "alternate" | "alternatekey" => KeyFlavor::Unique,
        "check" | "ck" => KeyFlavor::Check,
        _ => fallback,
    }
}

impl ComparisonOptions {
    /// String folding implied by the sensitivity flags
    pub fn sensitivity(&self) -> Sensitivity {
        Sensitivity {
            ignore_case: self.ignore_case,
            ignore_whitespace: self.ignore_whitespace,
        }
    }

    /// Whether an object (and therefore its subtree) takes part in traversal
    pub fn includes_object(&self, object: &SchemaObject) -> bool {
        match object.kind {
            ObjectKind::Entity => self.compare_tables,
            ObjectKind::Attribute => self.compare_columns,
            ObjectKind::Relationship => self.compare_relationships,
            ObjectKind::Key => self.includes_key(key_flavor(object, KeyFlavor::Primary)),
            ObjectKind::Constraint => self.includes_key(key_flavor(object, KeyFlavor::Check)),
            ObjectKind::Index => self.compare_indexes,
            ObjectKind::Trigger => self.compare_triggers,
            ObjectKind::View => self.compare_views,
            ObjectKind::Procedure => self.compare_stored_procedures,
            ObjectKind::Function => self.compare_functions,
            ObjectKind::Annotation => self.compare_comments,
            ObjectKind::Model
            | ObjectKind::SubjectArea
            | ObjectKind::Domain
            | ObjectKind::Diagram
            | ObjectKind::Sequence
            | ObjectKind::Synonym
            | ObjectKind::Package
            | ObjectKind::Type
            | ObjectKind::Schema => true,
        }
    }

    fn includes_key(&self, flavor: KeyFlavor) -> bool {
        match flavor {
            KeyFlavor::Primary => self.compare_primary_keys,
            KeyFlavor::Foreign => self.compare_foreign_keys,
            KeyFlavor::Unique => self.compare_unique_constraints,
            KeyFlavor::Check => self.compare_check_constraints,
        }
    }

    /// Whether an attribute key of an object of `kind` is compared at all
    pub fn includes_attribute(&self, kind: ObjectKind, key: &str) -> bool {
        match AttributeCategory::of(kind, key) {
            AttributeCategory::DataType => self.compare_data_types,
            AttributeCategory::Nullability => self.compare_nullability,
            AttributeCategory::DefaultValue => self.compare_default_values,
            AttributeCategory::Comment => self.compare_comments,
            AttributeCategory::Description => self.compare_descriptions,
            AttributeCategory::General => true,
        }
    }
}

/// Named option bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Complete,
    Structure,
    Basic,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Complete, Preset::Structure, Preset::Basic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Complete => "complete",
            Preset::Structure => "structure",
            Preset::Basic => "basic",
        }
    }

    /// The fixed option set of this preset
    pub fn options(&self) -> ComparisonOptions {
        match self {
            Preset::Complete => ComparisonOptions {
                ignore_case: false,
                ignore_whitespace: false,
                compare_tables: true,
                compare_columns: true,
                compare_data_types: true,
                compare_nullability: true,
                compare_default_values: true,
                compare_relationships: true,
                compare_primary_keys: true,
                compare_foreign_keys: true,
                compare_unique_constraints: true,
                compare_check_constraints: true,
                compare_indexes: true,
                compare_triggers: true,
                compare_comments: true,
                compare_descriptions: true,
                compare_stored_procedures: true,
                compare_functions: true,
                compare_views: true,
                detect_renamed_objects: true,
                detect_moved_objects: true,
            },
            Preset::Structure => ComparisonOptions {
                ignore_case: true,
                ignore_whitespace: true,
                compare_tables: true,
                compare_columns: true,
                compare_data_types: true,
                compare_nullability: true,
                compare_default_values: true,
                compare_relationships: true,
                compare_primary_keys: true,
                compare_foreign_keys: true,
                compare_unique_constraints: true,
                compare_check_constraints: true,
                compare_indexes: true,
                compare_triggers: false,
                compare_comments: false,
                compare_descriptions: false,
                compare_stored_procedures: false,
                compare_functions: false,
                compare_views: false,
                detect_renamed_objects: true,
                detect_moved_objects: false,
            },
            Preset::Basic => ComparisonOptions {
                ignore_case: true,
                ignore_whitespace: true,
                compare_tables: true,
                compare_columns: true,
                compare_data_types: true,
                compare_nullability: true,
                compare_default_values: false,
                compare_relationships: false,
                compare_primary_keys: true,
                compare_foreign_keys: false,
                compare_unique_constraints: false,
                compare_check_constraints: false,
                compare_indexes: false,
                compare_triggers: false,
                compare_comments: false,
                compare_descriptions: false,
                compare_stored_procedures: false,
                compare_functions: false,
                compare_views: false,
                detect_renamed_objects: false,
                detect_moved_objects: false,
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "complete" => Ok(Preset::Complete),
            "structure" => Ok(Preset::Structure),
            "basic" => Ok(Preset::Basic),
            other => Err(format!("Unknown preset: {}", other)),
        }
    }
}

/// The option set a user has picked: a preset, or a hand-edited set
///
/// Editing any flag moves the selection to `Custom` and it stays there, even
/// when the edited set equals a preset again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "profile", content = "options")]
pub enum SelectedProfile {
    Preset(Preset),
    Custom(ComparisonOptions),
}

impl Default for SelectedProfile {
    fn default() -> Self {
        SelectedProfile::Preset(Preset::Complete)
    }
}

impl SelectedProfile {
    /// Display name: the preset name or `custom`
    pub fn name(&self) -> &'static str {
        match self {
            SelectedProfile::Preset(preset) => preset.as_str(),
            SelectedProfile::Custom(_) => "custom",
        }
    }

    /// The effective option set
    pub fn options(&self) -> ComparisonOptions {
        match self {
            SelectedProfile::Preset(preset) => preset.options(),
            SelectedProfile::Custom(options) => *options,
        }
    }

    /// Overwrite the whole option set with a preset
    pub fn select(&mut self, preset: Preset) {
        *self = SelectedProfile::Preset(preset);
    }

    /// Flip one flag by key; unknown keys are ignored and return `false`
    pub fn toggle(&mut self, key: &str) -> bool {
        let mut options = self.options();
        let Some(current) = options.flag(key) else {
            return false;
        };
        options.set_flag(key, !current);
        *self = SelectedProfile::Custom(options);
        true
    }

    /// Set one flag by key; unknown keys are ignored and return `false`
    pub fn set(&mut self, key: &str, value: bool) -> bool {
        let mut options = self.options();
        if !options.set_flag(key, value) {
            return false;
        }
        *self = SelectedProfile::Custom(options);
        true
    }
}

/// Tunable parameters of the matching and conflict heuristics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSettings {
    /// Minimum name similarity for a rename pairing
    pub rename_threshold: f64,
    /// Number of both-sided attribute changes that make a two-way pair a conflict
    pub conflict_field_threshold: usize,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            rename_threshold: 0.8,
            conflict_field_threshold: 2,
        }
    }
}
