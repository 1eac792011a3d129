//! Ordered route tables.
//!
//! # Responsibilities
//! - Pair compiled patterns with target modules
//! - Optionally reshape captured values before they reach the module
//! - Find the first entry matching a path
//!
//! # Design Decisions
//! - Table order is match priority, the table author lists specific routes first
//! - Linear scan (tables hold tens of entries)
//! - Immutable once built, shared via `Arc`

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::routing::error::RouteError;
use crate::routing::pattern::RoutePattern;

/// Raw bindings captured from the path.
pub type Captures = BTreeMap<String, String>;

/// Parameters handed to a module.
pub type Params = BTreeMap<String, ParamValue>;

/// A parameter value: a single string, or a list for repeated query keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    /// The value as a single string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::List(_) => None,
        }
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        ParamValue::List(v)
    }
}

/// Reshapes captured bindings into module parameters.
pub type ParamsMapper = Box<dyn Fn(&Captures) -> Params + Send + Sync>;

/// A single route: pattern, target module and optional mapper.
pub struct RouteEntry {
    pattern: RoutePattern,
    module: String,
    mapper: Option<ParamsMapper>,
}

impl RouteEntry {
    /// Compile `template` into an entry targeting `module`.
    pub fn new(template: &str, module: impl Into<String>) -> Result<Self, RouteError> {
        let module = module.into();
        let pattern = RoutePattern::compile(template).map_err(|source| RouteError::Pattern {
            table: String::new(),
            module: module.clone(),
            source,
        })?;
        Ok(Self {
            pattern,
            module,
            mapper: None,
        })
    }

    /// Compile an entry whose captures are reshaped by `mapper`.
    pub fn with_mapper<F>(template: &str, module: impl Into<String>, mapper: F) -> Result<Self, RouteError>
    where
        F: Fn(&Captures) -> Params + Send + Sync + 'static,
    {
        let mut entry = Self::new(template, module)?;
        entry.mapper = Some(Box::new(mapper));
        Ok(entry)
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn has_mapper(&self) -> bool {
        self.mapper.is_some()
    }

    /// Match the path, returning module parameters on success.
    pub fn match_path<S: AsRef<str>>(&self, path: &[S]) -> Option<Params> {
        let captures = self.pattern.match_segments(path)?;
        Some(match &self.mapper {
            Some(mapper) => mapper(&captures),
            None => captures
                .into_iter()
                .map(|(k, v)| (k, ParamValue::Text(v)))
                .collect(),
        })
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern.template())
            .field("module", &self.module)
            .field("mapper", &self.mapper.is_some())
            .finish()
    }
}

/// An ordered list of routes for one domain.
#[derive(Debug)]
pub struct RouteTable {
    name: String,
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table from entries in priority order.
    pub fn new(name: impl Into<String>, entries: Vec<RouteEntry>) -> Self {
        let name = name.into();
        let table = Self { name, entries };
        if !table.has_catch_all() {
            tracing::warn!(
                table = %table.name,
                "Route table has no trailing catch-all, unmatched paths will use the fallback module"
            );
        }
        table
    }

    /// Build a table from fallible entries, tagging errors with the table name.
    pub fn try_from_entries<I>(name: impl Into<String>, entries: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = Result<RouteEntry, RouteError>>,
    {
        let name = name.into();
        let entries = entries
            .into_iter()
            .map(|entry| {
                entry.map_err(|RouteError::Pattern { module, source, .. }| RouteError::Pattern {
                    table: name.clone(),
                    module,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, entries))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the last entry matches every path.
    pub fn has_catch_all(&self) -> bool {
        self.entries
            .last()
            .is_some_and(|entry| entry.pattern.is_catch_all())
    }

    /// First entry matching the path, with its parameters.
    pub fn first_match<S: AsRef<str>>(&self, path: &[S]) -> Option<(&RouteEntry, Params)> {
        self.entries
            .iter()
            .find_map(|entry| entry.match_path(path).map(|params| (entry, params)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::error::PatternError;
    use crate::routing::pattern::WILDCARD_KEY;

    #[test]
    fn test_passthrough_params() {
        let entry = RouteEntry::new("/artist/:artistID", "Artist").unwrap();
        let params = entry.match_path(&["artist", "banksy"]).unwrap();
        assert_eq!(params.get("artistID"), Some(&ParamValue::from("banksy")));
    }

    #[test]
    fn test_mapper_reshapes_captures() {
        let entry = RouteEntry::with_mapper("/*", "LiveAuction", |captures| {
            let mut params = Params::new();
            if let Some(slug) = captures.get(WILDCARD_KEY) {
                params.insert("slug".into(), slug.as_str().into());
            }
            params
        })
        .unwrap();

        let params = entry.match_path(&["shared-live-mocktion"]).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("slug"), Some(&ParamValue::from("shared-live-mocktion")));
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new(
            "test",
            vec![
                RouteEntry::new("/fair/:id/artworks", "FairArtworks").unwrap(),
                RouteEntry::new("/*", "WebView").unwrap(),
            ],
        );
        let (entry, params) = table.first_match(&["fair", "123", "artworks"]).unwrap();
        assert_eq!(entry.module(), "FairArtworks");
        assert_eq!(params.get("id"), Some(&ParamValue::from("123")));

        let (entry, _) = table.first_match(&["fair", "123"]).unwrap();
        assert_eq!(entry.module(), "WebView");
    }

    #[test]
    fn test_catch_all_detection() {
        let with = RouteTable::new("a", vec![RouteEntry::new("/*", "WebView").unwrap()]);
        assert!(with.has_catch_all());

        let without = RouteTable::new("b", vec![RouteEntry::new("/docs/*", "Docs").unwrap()]);
        assert!(!without.has_catch_all());
        assert!(without.first_match(&["other"]).is_none());
    }

    #[test]
    fn test_errors_name_table_and_module() {
        let err = RouteTable::try_from_entries(
            "marketplace",
            vec![
                RouteEntry::new("/sales", "Sales"),
                RouteEntry::new("/*/broken", "Broken"),
            ],
        )
        .unwrap_err();

        match err {
            RouteError::Pattern { table, module, source } => {
                assert_eq!(table, "marketplace");
                assert_eq!(module, "Broken");
                assert!(matches!(source, PatternError::WildcardNotLast { .. }));
            }
        }
    }

    #[test]
    fn test_param_value_serializes_untagged() {
        let mut params = Params::new();
        params.insert("id".into(), "1".into());
        params.insert("tag".into(), vec!["a".to_string(), "b".to_string()].into());
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"id":"1","tag":["a","b"]}"#);
    }
}
