//! Change script generation interface
//!
//! Script generators turn a merged tree into dialect-specific change text.
//! Implementations live outside this crate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::merge::MergedTree;

/// Target SQL dialect of a change script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
    SqlServer,
    Oracle,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "oracle",
        };
        f.write_str(name)
    }
}

/// Consumer of merge results producing a change script
pub trait ScriptGenerator {
    fn generate_script(&self, merged: &MergedTree, dialect: Dialect) -> Result<String>;
}
