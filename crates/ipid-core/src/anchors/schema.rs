use crate::compose::Policy;
use crate::model::Group;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A versioned table of anchor patterns, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorTableDef {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub anchors: Vec<AnchorDef>,
    /// Per-field accumulation policy overrides, keyed by field name.
    #[serde(default)]
    pub policies: BTreeMap<String, Policy>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    /// Opens a field and closes every other section.
    #[default]
    Section,
    /// Captures a value directly from the page; never acts as a boundary.
    Capture,
}

/// A single anchor. Exactly one of `phrase` or `pattern` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorDef {
    pub name: String,
    pub group: Group,
    #[serde(default)]
    pub kind: AnchorKind,
    /// Literal heading text; word gaps match any whitespace, apostrophes
    /// match both typographic forms, a trailing `?` or `:` is absorbed.
    #[serde(default)]
    pub phrase: Option<String>,
    /// Raw regular expression, matched case-insensitively.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Upper-case captured values.
    #[serde(default)]
    pub uppercase: bool,
    #[serde(default)]
    pub note: Option<String>,
}
