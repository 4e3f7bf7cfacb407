//! Ordering descriptor and filter catalog
//!
//! The descriptor is the only source of filter groups, keys and button
//! values. Nothing here is derived from which values the data happens to
//! contain. Parsing only checks the JSON shape; `FilterCatalog::build` is
//! the one place a descriptor is validated.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Externally supplied grouping and ordering metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingDescriptor {
    #[serde(default)]
    pub keys_order: Vec<String>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub buttons_order: BTreeMap<String, Vec<String>>,
}

/// A named group of filter keys as written in the descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub keys: Vec<String>,
}

impl OrderingDescriptor {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse ordering descriptor")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ordering descriptor: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("invalid ordering in {}", path.display()))
    }

    /// Validate the descriptor for structural errors
    pub fn validate(&self) -> Result<()> {
        let mut seen_keys = HashSet::new();
        for key in &self.keys_order {
            if !seen_keys.insert(key.as_str()) {
                anyhow::bail!("keysOrder lists '{}' more than once", key);
            }
        }

        for (key, values) in &self.buttons_order {
            let mut seen = HashSet::new();
            for value in values {
                if !seen.insert(value.as_str()) {
                    anyhow::bail!("buttonsOrder['{}'] lists '{}' more than once", key, value);
                }
            }
        }

        for group in &self.groups {
            for key in &group.keys {
                if !self.buttons_order.contains_key(key) {
                    anyhow::bail!(
                        "group '{}' names key '{}' which has no buttonsOrder entry",
                        group.name,
                        key
                    );
                }
                if !self.keys_order.is_empty() && !seen_keys.contains(key.as_str()) {
                    tracing::warn!(group = %group.name, key = %key, "filter key missing from keysOrder");
                }
            }
        }

        Ok(())
    }
}

/// A record field with its ordered button values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterKey {
    pub field: String,
    pub values: Vec<String>,
}

/// A named category of filter keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterGroup {
    pub name: String,
    pub keys: Vec<FilterKey>,
}

/// One filter button in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button<'a> {
    pub group: &'a str,
    pub field: &'a str,
    pub value: &'a str,
}

/// All filter groups built from a validated descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCatalog {
    groups: Vec<FilterGroup>,
}

impl FilterCatalog {
    pub fn build(descriptor: &OrderingDescriptor) -> Result<Self> {
        descriptor.validate()?;

        let groups = descriptor
            .groups
            .iter()
            .map(|group| FilterGroup {
                name: group.name.clone(),
                keys: group
                    .keys
                    .iter()
                    .map(|key| FilterKey {
                        field: key.clone(),
                        values: descriptor
                            .buttons_order
                            .get(key)
                            .cloned()
                            .unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        Ok(FilterCatalog { groups })
    }

    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    /// Every button, groups then keys then values, in descriptor order
    pub fn buttons(&self) -> impl Iterator<Item = Button<'_>> {
        self.groups.iter().flat_map(|group| {
            group.keys.iter().flat_map(move |key| {
                key.values.iter().map(move |value| Button {
                    group: &group.name,
                    field: &key.field,
                    value,
                })
            })
        })
    }

    pub fn has_button(&self, field: &str, value: &str) -> bool {
        self.key(field)
            .map(|k| k.values.iter().any(|v| v == value))
            .unwrap_or(false)
    }

    pub fn key(&self, field: &str) -> Option<&FilterKey> {
        self.groups
            .iter()
            .flat_map(|g| g.keys.iter())
            .find(|k| k.field == field)
    }

    /// Filter fields in catalog order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.keys.iter().map(|k| k.field.as_str()))
    }
}
