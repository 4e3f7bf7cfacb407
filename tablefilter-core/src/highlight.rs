//! Row to filter button highlighting

use crate::ordering::FilterCatalog;
use crate::record::Record;
use serde::Serialize;
use std::collections::BTreeSet;

/// (field, value) pairs of the buttons to mark
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HighlightSet {
    pairs: BTreeSet<(String, String)>,
}

impl HighlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, field: &str, value: &str) -> bool {
        // BTreeSet<(String, String)> cannot be looked up with borrowed parts
        self.pairs.iter().any(|(f, v)| f == field && v == value)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }
}

/// Buttons matching a selected row's values
///
/// A value containing a comma marks one button per comma-separated token;
/// any other value marks the button with exactly that text. Tokens are only
/// trimmed when `trim` is set. An empty row yields an empty set.
pub fn highlight(row: &Record, catalog: &FilterCatalog, trim: bool) -> HighlightSet {
    let mut pairs = BTreeSet::new();
    for (field, value) in row.fields() {
        if value.contains(',') {
            for token in value.split(',') {
                let token = if trim { token.trim() } else { token };
                if catalog.has_button(field, token) {
                    pairs.insert((field.to_string(), token.to_string()));
                }
            }
        } else if catalog.has_button(field, value) {
            pairs.insert((field.to_string(), value.to_string()));
        }
    }
    HighlightSet { pairs }
}
