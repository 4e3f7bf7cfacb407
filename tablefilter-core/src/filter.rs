//! Filter selection
//!
//! OR within a field, AND across fields. A record that lacks a selected
//! field is never excluded by it.

use crate::record::Record;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Currently chosen filter values, per field
///
/// A field never maps to an empty set; removing the last value removes the
/// field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSelection {
    active: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut active: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (field, value) in pairs {
            active.entry(field.into()).or_default().insert(value.into());
        }
        FilterSelection { active }
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_active(&self, field: &str, value: &str) -> bool {
        self.active
            .get(field)
            .map(|values| values.contains(value))
            .unwrap_or(false)
    }

    pub fn values(&self, field: &str) -> Option<&BTreeSet<String>> {
        self.active.get(field)
    }

    /// Selected fields in name order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.active.keys().map(String::as_str)
    }

    /// Number of active (field, value) pairs
    pub fn active_count(&self) -> usize {
        self.active.values().map(BTreeSet::len).sum()
    }

    /// Selection with (field, value) flipped
    pub fn toggled(&self, field: &str, value: &str) -> Self {
        let mut next = self.clone();
        let values = next.active.entry(field.to_string()).or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        if values.is_empty() {
            next.active.remove(field);
        }
        next
    }

    /// Selection with every value of one field deactivated
    pub fn with_field_cleared(&self, field: &str) -> Self {
        let mut next = self.clone();
        next.active.remove(field);
        next
    }

    /// Selection with nothing active
    pub fn cleared(&self) -> Self {
        Self::default()
    }

    /// Whether the record passes every selected field
    ///
    /// An absent field passes; a null field matches no selected value.
    pub fn matches(&self, record: &Record) -> bool {
        self.active
            .iter()
            .all(|(field, values)| match record.lookup(field) {
                None => true,
                Some(value) => value.is_some_and(|v| values.contains(v)),
            })
    }
}
