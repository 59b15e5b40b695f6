//! Data model for page annotations — independent of the markup they apply to.

use anyhow::{Context, Result};
use serde::Deserialize;

/// One source line to highlight and the reason it is highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WitnessRepr")]
pub struct Witness {
    /// Element id of the rendered line
    pub id: String,
    /// Human-readable reason, shown in brackets after the line
    pub reason: String,
}

impl Witness {
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// A called function and the page that defines it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "FunctionLinkRepr")]
pub struct FunctionLink {
    /// Name as it appears in the code text
    pub name: String,
    /// Base name of the definition page (the extension is appended on render)
    pub target: String,
}

impl FunctionLink {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// Everything needed to annotate one rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageAnnotations {
    /// First line of the displayed excerpt. Carried along, not used for matching.
    pub start_line: Option<u32>,
    pub witnesses: Vec<Witness>,
    pub functions: Vec<FunctionLink>,
}

impl PageAnnotations {
    /// Parse annotations from a JSON document.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("invalid annotations JSON")
    }

    pub fn is_empty(&self) -> bool {
        self.witnesses.is_empty() && self.functions.is_empty()
    }
}

// Entries are accepted either as `[a, b]` pairs or as named objects.

#[derive(Deserialize)]
#[serde(untagged)]
enum WitnessRepr {
    Pair(String, String),
    Named { id: String, reason: String },
}

impl From<WitnessRepr> for Witness {
    fn from(repr: WitnessRepr) -> Self {
        match repr {
            WitnessRepr::Pair(id, reason) | WitnessRepr::Named { id, reason } => {
                Witness { id, reason }
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FunctionLinkRepr {
    Pair(String, String),
    Named { name: String, target: String },
}

impl From<FunctionLinkRepr> for FunctionLink {
    fn from(repr: FunctionLinkRepr) -> Self {
        match repr {
            FunctionLinkRepr::Pair(name, target) | FunctionLinkRepr::Named { name, target } => {
                FunctionLink { name, target }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pair_entries() {
        let json = r#"{
            "start_line": 10,
            "witnesses": [["l12", "allocates"], ["l14", "frees"]],
            "functions": [["archive_read", "archive_read"]]
        }"#;
        let ann = PageAnnotations::from_json(json).unwrap();
        assert_eq!(ann.start_line, Some(10));
        assert_eq!(
            ann.witnesses,
            vec![Witness::new("l12", "allocates"), Witness::new("l14", "frees")]
        );
        assert_eq!(
            ann.functions,
            vec![FunctionLink::new("archive_read", "archive_read")]
        );
    }

    #[test]
    fn parses_named_entries() {
        let json = r#"{
            "witnesses": [{"id": "l3", "reason": "escapes"}],
            "functions": [{"name": "cleanup", "target": "cleanup_fn"}]
        }"#;
        let ann = PageAnnotations::from_json(json).unwrap();
        assert_eq!(ann.start_line, None);
        assert_eq!(ann.witnesses[0], Witness::new("l3", "escapes"));
        assert_eq!(ann.functions[0], FunctionLink::new("cleanup", "cleanup_fn"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let ann = PageAnnotations::from_json("{}").unwrap();
        assert!(ann.is_empty());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(PageAnnotations::from_json(r#"{"witness": []}"#).is_err());
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(PageAnnotations::from_json(r#"{"witnesses": [["only-id"]]}"#).is_err());
    }
}
