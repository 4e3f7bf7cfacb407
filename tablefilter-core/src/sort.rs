//! Sorting and the single global sort column
//!
//! Global invariants enforced:
//! - At most one sort column is live across both tables
//! - Sorting is stable; descending keeps ties in input order
//! - Only `Year` compares numerically

use crate::record::{DatasetKind, Record};
use serde::Serialize;
use std::cmp::Ordering;

/// The one column compared as an integer
pub const NUMERIC_COLUMN: &str = "Year";

/// (table, column, direction) of the last header click
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub table: DatasetKind,
    pub column: String,
    pub ascending: bool,
}

/// The live sort column, if any header has been clicked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SortState {
    spec: Option<SortSpec>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec(table: DatasetKind, column: &str, ascending: bool) -> Self {
        SortState {
            spec: Some(SortSpec {
                table,
                column: column.to_string(),
                ascending,
            }),
        }
    }

    /// Column and direction used when rendering the given table
    pub fn effective(&self, kind: DatasetKind) -> (&str, bool) {
        match &self.spec {
            Some(spec) if spec.table == kind => (spec.column.as_str(), spec.ascending),
            _ => (kind.default_sort_key(), true),
        }
    }

    /// State after a header click: same column flips, anything else starts ascending
    pub fn clicked(&self, table: DatasetKind, column: &str) -> Self {
        match &self.spec {
            Some(spec) if spec.table == table && spec.column == column => {
                Self::with_spec(table, column, !spec.ascending)
            }
            _ => Self::with_spec(table, column, true),
        }
    }

    /// Header indicator for a column of a table
    pub fn indicator(&self, table: DatasetKind, column: &Column) -> SortIndicator {
        let Some(field) = column.sort_field else {
            return SortIndicator::None;
        };
        match &self.spec {
            Some(spec) if spec.table == table && spec.column == field => {
                if spec.ascending {
                    SortIndicator::Ascending
                } else {
                    SortIndicator::Descending
                }
            }
            _ => SortIndicator::Sortable,
        }
    }
}

/// Header state as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortIndicator {
    Ascending,
    Descending,
    Sortable,
    None,
}

impl SortIndicator {
    pub fn arrow(&self) -> &'static str {
        match self {
            SortIndicator::Ascending => "↑",
            SortIndicator::Descending => "↓",
            SortIndicator::Sortable => "↑↓",
            SortIndicator::None => "",
        }
    }
}

/// How a cell is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Text,
    Doi,
    Link,
}

/// One table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub header: &'static str,
    pub field: &'static str,
    /// Field sorted on header click; `None` for unsortable columns
    pub sort_field: Option<&'static str>,
    pub cell: CellKind,
}

const fn text(header: &'static str, field: &'static str) -> Column {
    Column {
        header,
        field,
        sort_field: Some(field),
        cell: CellKind::Text,
    }
}

const PAPER_COLUMNS: &[Column] = &[
    text("Author", "Author"),
    text("Year", "Year"),
    text("Title", "Title"),
    Column {
        header: "DOI",
        field: "DOI_URL",
        sort_field: None,
        cell: CellKind::Doi,
    },
    text("Activity", "Activity_note"),
    text("Timing", "Timing_note"),
    text("Outcome", "Outcome_note"),
];

const TOOL_COLUMNS: &[Column] = &[
    text("Name", "Name"),
    text("Provider", "Provider"),
    Column {
        header: "Link",
        field: "Link",
        sort_field: None,
        cell: CellKind::Link,
    },
    text("Activity", "Activity_note"),
    text("Timing", "Timing_note"),
];

/// Column layout of a table
pub fn columns(kind: DatasetKind) -> &'static [Column] {
    match kind {
        DatasetKind::Papers => PAPER_COLUMNS,
        DatasetKind::Tools => TOOL_COLUMNS,
    }
}

/// Resolve a column given by field name or header label to its sort field
pub fn sortable_field(kind: DatasetKind, name: &str) -> Option<&'static str> {
    columns(kind)
        .iter()
        .find(|c| c.field.eq_ignore_ascii_case(name) || c.header.eq_ignore_ascii_case(name))
        .and_then(|c| c.sort_field)
}

/// Leading integer of a string, like JavaScript's `parseInt`; 0 when none
pub fn parse_leading_int(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add((b - b'0') as i64));
    if negative {
        -value
    } else {
        value
    }
}

/// Compare two records on one column, ascending
pub fn compare(a: &Record, b: &Record, column: &str) -> Ordering {
    let value_a = a.display(column);
    let value_b = b.display(column);
    if column == NUMERIC_COLUMN {
        parse_leading_int(value_a).cmp(&parse_leading_int(value_b))
    } else {
        value_a.to_lowercase().cmp(&value_b.to_lowercase())
    }
}

/// Stable sort of record references
pub fn sort_records(rows: &mut [&Record], column: &str, ascending: bool) {
    rows.sort_by(|a, b| {
        let ord = compare(a, b, column);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}
