use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// English and Turkish labels for one source category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLabels {
    pub en: String,
    pub tr: String,
}

/// Static bilingual lookup keyed by the category text found on the source site.
///
/// Lookups are exact: `"postgresql"` or `" PostgreSQL"` do not match `"PostgreSQL"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable {
    entries: BTreeMap<String, CategoryLabels>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, source: impl Into<String>, en: impl Into<String>, tr: impl Into<String>) {
        self.entries.insert(
            source.into(),
            CategoryLabels {
                en: en.into(),
                tr: tr.into(),
            },
        );
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn labels(&self, source: &str) -> Option<&CategoryLabels> {
        self.entries.get(source)
    }

    /// Translated label, or `source` unchanged when the table has no entry.
    pub fn translate<'a>(&'a self, source: &'a str) -> &'a str {
        self.entries
            .get(source)
            .map(|labels| labels.tr.as_str())
            .unwrap_or(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let mut table = Self::new();
        table.insert("PostgreSQL", "PostgreSQL", "PostgreSQL");
        table.insert("Company Updates", "Company Updates", "Şirket Güncellemeleri");
        table
    }
}
