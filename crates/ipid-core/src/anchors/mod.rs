pub mod builtin;
pub mod schema;

pub use schema::{AnchorDef, AnchorKind, AnchorTableDef};

use crate::compose::PolicyMap;
use crate::error::IpidError;
use crate::model::{Field, Group};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::path::Path;

/// An anchor with its compiled pattern.
#[derive(Debug, Clone)]
pub struct CompiledAnchor {
    pub name: String,
    pub group: Group,
    pub kind: AnchorKind,
    /// Document field fed by this anchor; `None` for boundary-only sections.
    pub field: Option<Field>,
    pub regex: Regex,
    pub uppercase: bool,
    pub note: Option<String>,
    /// Alternation of every other section anchor. Only set on sections.
    closing: Option<Regex>,
}

impl CompiledAnchor {
    /// Pattern matching any section boundary other than this anchor.
    pub fn closing(&self) -> Option<&Regex> {
        self.closing.as_ref()
    }
}

/// Immutable, validated anchor table. Build it once and share it by reference.
#[derive(Debug, Clone)]
pub struct AnchorTable {
    name: String,
    version: String,
    description: Option<String>,
    anchors: Vec<CompiledAnchor>,
    policies: PolicyMap,
}

impl AnchorTable {
    /// Validate a table definition and compile its patterns.
    pub fn compile(def: &AnchorTableDef) -> Result<AnchorTable, IpidError> {
        validate_anchor_table(def)?;

        let mut policies = PolicyMap::default();
        for (name, policy) in &def.policies {
            // validated above
            if let Some(field) = Field::from_name(name) {
                policies.set(field, *policy);
            }
        }

        let sources: Vec<String> = def.anchors.iter().map(pattern_source).collect();
        let mut anchors = Vec::with_capacity(def.anchors.len());

        for (i, anchor) in def.anchors.iter().enumerate() {
            let regex = build_regex(&anchor.name, &sources[i])?;

            let closing = if anchor.kind == AnchorKind::Section {
                let others: Vec<String> = def
                    .anchors
                    .iter()
                    .enumerate()
                    .filter(|(j, a)| *j != i && a.kind == AnchorKind::Section)
                    .map(|(j, _)| format!("(?:{})", sources[j]))
                    .collect();
                if others.is_empty() {
                    None
                } else {
                    Some(build_regex(&anchor.name, &others.join("|"))?)
                }
            } else {
                None
            };

            anchors.push(CompiledAnchor {
                name: anchor.name.clone(),
                group: anchor.group,
                kind: anchor.kind,
                field: Field::from_name(&anchor.name),
                regex,
                uppercase: anchor.uppercase,
                note: anchor.note.clone(),
                closing,
            });
        }

        Ok(AnchorTable {
            name: def.name.clone(),
            version: def.version.clone(),
            description: def.description.clone(),
            anchors,
            policies,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn policies(&self) -> &PolicyMap {
        &self.policies
    }

    pub fn anchors(&self) -> &[CompiledAnchor] {
        &self.anchors
    }

    pub fn get(&self, name: &str) -> Option<&CompiledAnchor> {
        self.anchors.iter().find(|a| a.name == name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &CompiledAnchor> {
        self.anchors
            .iter()
            .filter(|a| a.kind == AnchorKind::Section)
    }

    pub fn captures(&self) -> impl Iterator<Item = &CompiledAnchor> {
        self.anchors
            .iter()
            .filter(|a| a.kind == AnchorKind::Capture)
    }
}

/// Load and compile an anchor table from a JSON file.
pub fn load_anchor_table(path: &Path) -> Result<AnchorTable, IpidError> {
    let content = std::fs::read_to_string(path).map_err(|e| IpidError::AnchorTableLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let def: AnchorTableDef =
        serde_json::from_str(&content).map_err(|e| IpidError::AnchorTableLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    AnchorTable::compile(&def)
}

/// Parse and compile an anchor table from a JSON string.
pub fn parse_anchor_table_str(json: &str) -> Result<AnchorTable, IpidError> {
    let def: AnchorTableDef = serde_json::from_str(json)?;
    AnchorTable::compile(&def)
}

/// Validate that an anchor table definition is well-formed.
pub fn validate_anchor_table(def: &AnchorTableDef) -> Result<(), IpidError> {
    if def.anchors.is_empty() {
        return Err(IpidError::AnchorTableInvalid(
            "anchors must not be empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for anchor in &def.anchors {
        if anchor.name.trim().is_empty() {
            return Err(IpidError::AnchorTableInvalid(
                "anchor name must not be empty".into(),
            ));
        }

        if !seen.insert(anchor.name.as_str()) {
            return Err(IpidError::AnchorTableInvalid(format!(
                "duplicate anchor name '{}'",
                anchor.name
            )));
        }

        match (&anchor.phrase, &anchor.pattern) {
            (Some(_), Some(_)) => {
                return Err(IpidError::AnchorTableInvalid(format!(
                    "anchor '{}' sets both phrase and pattern",
                    anchor.name
                )))
            }
            (None, None) => {
                return Err(IpidError::AnchorTableInvalid(format!(
                    "anchor '{}' needs a phrase or a pattern",
                    anchor.name
                )))
            }
            (Some(p), None) | (None, Some(p)) if p.trim().is_empty() => {
                return Err(IpidError::AnchorTableInvalid(format!(
                    "anchor '{}' has an empty phrase or pattern",
                    anchor.name
                )))
            }
            _ => {}
        }

        match Field::from_name(&anchor.name) {
            Some(field) if field.group() != anchor.group => {
                return Err(IpidError::AnchorTableInvalid(format!(
                    "anchor '{}' belongs to group '{}', not '{}'",
                    anchor.name,
                    field.group(),
                    anchor.group
                )));
            }
            Some(field) if field.is_list() && anchor.kind == AnchorKind::Section => {
                return Err(IpidError::AnchorTableInvalid(format!(
                    "list field '{}' can only be fed by a capture anchor",
                    anchor.name
                )));
            }
            None if anchor.kind == AnchorKind::Capture => {
                return Err(IpidError::AnchorTableInvalid(format!(
                    "capture anchor '{}' does not name a document field",
                    anchor.name
                )));
            }
            _ => {}
        }
    }

    for name in def.policies.keys() {
        match Field::from_name(name) {
            None => {
                return Err(IpidError::AnchorTableInvalid(format!(
                    "policy for unknown field '{}'",
                    name
                )))
            }
            Some(field) if field.is_list() => {
                return Err(IpidError::AnchorTableInvalid(format!(
                    "field '{}' is a list; its policy cannot be changed",
                    name
                )))
            }
            _ => {}
        }
    }

    Ok(())
}

fn pattern_source(anchor: &AnchorDef) -> String {
    match (&anchor.phrase, &anchor.pattern) {
        (Some(phrase), _) => phrase_to_pattern(phrase),
        (None, Some(pattern)) => pattern.clone(),
        (None, None) => String::new(),
    }
}

/// Turn a heading phrase into a pattern tolerant to layout whitespace.
pub fn phrase_to_pattern(phrase: &str) -> String {
    let words: Vec<String> = phrase
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| match c {
                    '\'' | '’' => "['’]".to_string(),
                    _ => regex::escape(c.encode_utf8(&mut [0; 4])),
                })
                .collect()
        })
        .collect();
    format!(r"{}(?:\s*[?:])?", words.join(r"\s+"))
}

fn build_regex(name: &str, pattern: &str) -> Result<Regex, IpidError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| IpidError::Pattern {
            name: name.to_string(),
            source,
        })
}
