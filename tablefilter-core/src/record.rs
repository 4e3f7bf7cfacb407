//! Records and datasets
//!
//! Global invariants enforced:
//! - Field values are always strings once loaded
//! - A missing field is distinct from an empty one
//! - Datasets are never mutated after loading

use anyhow::{Context, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The two record collections shown side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Papers,
    Tools,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Papers, DatasetKind::Tools];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Papers => "papers",
            DatasetKind::Tools => "tools",
        }
    }

    pub fn table_id(&self) -> &'static str {
        match self {
            DatasetKind::Papers => "papers-table",
            DatasetKind::Tools => "tools-table",
        }
    }

    pub fn tab_id(&self) -> &'static str {
        match self {
            DatasetKind::Papers => "research-tab",
            DatasetKind::Tools => "tools-tab",
        }
    }

    pub fn count_id(&self) -> &'static str {
        match self {
            DatasetKind::Papers => "research-count",
            DatasetKind::Tools => "tools-count",
        }
    }

    pub fn no_data_id(&self) -> &'static str {
        match self {
            DatasetKind::Papers => "no-data-message",
            DatasetKind::Tools => "no-data-message-tools",
        }
    }

    /// Column used when no header click targets this table
    pub fn default_sort_key(&self) -> &'static str {
        match self {
            DatasetKind::Papers => "Author",
            DatasetKind::Tools => "Name",
        }
    }

    pub fn item_singular(&self) -> &'static str {
        match self {
            DatasetKind::Papers => "paper",
            DatasetKind::Tools => "tool",
        }
    }

    pub fn item_plural(&self) -> &'static str {
        match self {
            DatasetKind::Papers => "papers",
            DatasetKind::Tools => "tools",
        }
    }

    pub fn tab_label(&self) -> &'static str {
        match self {
            DatasetKind::Papers => "Research Papers",
            DatasetKind::Tools => "Practice Tools",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DatasetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "papers" | "paper" | "research" | "papers-table" | "research-tab" => {
                Ok(DatasetKind::Papers)
            }
            "tools" | "tool" | "tools-table" | "tools-tab" => Ok(DatasetKind::Tools),
            other => anyhow::bail!("unknown table '{}' (expected 'papers' or 'tools')", other),
        }
    }
}

/// One papers or tools entry: field name to string value
///
/// A field present as JSON `null` is kept: it is neither absent nor equal to
/// any filter value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Option<String>>,
}

impl Record {
    /// Build a record from (field, value) pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Record {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    /// String value of a field; `None` when absent or null
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    /// `None` when the field is absent, `Some(None)` when it is null
    pub fn lookup(&self, field: &str) -> Option<Option<&str>> {
        self.fields.get(field).map(|v| v.as_deref())
    }

    /// Value for display; missing and null fields render as empty text
    pub fn display(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Non-null fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of string fields")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Record, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut fields = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
            match value {
                serde_json::Value::Null => {
                    fields.insert(key, None);
                }
                serde_json::Value::String(s) => {
                    fields.insert(key, Some(s));
                }
                // Numbers and booleans keep their JSON spelling ("Year": 2020 -> "2020")
                serde_json::Value::Number(n) => {
                    fields.insert(key, Some(n.to_string()));
                }
                serde_json::Value::Bool(b) => {
                    fields.insert(key, Some(b.to_string()));
                }
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(de::Error::custom(format!(
                        "field '{}' must be a string, number or boolean",
                        key
                    )));
                }
            }
        }
        Ok(Record { fields })
    }
}

/// An ordered, immutable collection of records of one kind
#[derive(Debug, Clone)]
pub struct Dataset {
    kind: DatasetKind,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(kind: DatasetKind, records: Vec<Record>) -> Self {
        Dataset { kind, records }
    }

    pub fn empty(kind: DatasetKind) -> Self {
        Dataset::new(kind, Vec::new())
    }

    /// Parse a JSON array of objects
    pub fn from_json(kind: DatasetKind, json: &str) -> Result<Self> {
        let records: Vec<Record> = serde_json::from_str(json)
            .with_context(|| format!("failed to parse {} collection", kind))?;
        Ok(Dataset::new(kind, records))
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if at least one record carries the field
    pub fn has_field(&self, field: &str) -> bool {
        self.records.iter().any(|r| r.has_field(field))
    }
}
