//! Explicit view state and the actions that change it
//!
//! Global invariants enforced:
//! - State is never read back out of rendered output
//! - `apply` is pure: it returns a new state and leaves the old one intact
//! - Every action except header clicks and row selection clears the highlight

use crate::config::ViewOptions;
use crate::filter::FilterSelection;
use crate::highlight::{highlight, HighlightSet};
use crate::load::DataStore;
use crate::query::query;
use crate::record::DatasetKind;
use crate::sort::{sortable_field, SortState};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Everything the user has chosen so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub selection: FilterSelection,
    pub sort: SortState,
    pub active_tab: DatasetKind,
    pub highlighted: HighlightSet,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            selection: FilterSelection::new(),
            sort: SortState::new(),
            active_tab: DatasetKind::Papers,
            highlighted: HighlightSet::new(),
        }
    }
}

/// A single user interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Filter button click
    ToggleFilter { field: String, value: String },
    /// Filter key label click: deactivate every button of that key
    ClearField { field: String },
    /// Reset button
    Reset,
    /// Column header click
    ClickHeader { table: DatasetKind, column: String },
    SwitchTab(DatasetKind),
    /// Row click; `row` indexes the table as currently rendered
    SelectRow { table: DatasetKind, row: usize },
    /// Click outside both tables
    ClearHighlight,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State after one action
    pub fn apply(&self, action: &Action, store: &DataStore, options: &ViewOptions) -> Result<Self> {
        let mut next = self.clone();
        match action {
            Action::ToggleFilter { field, value } => {
                next.selection = self.selection.toggled(field, value);
                next.highlighted = HighlightSet::new();
            }
            Action::ClearField { field } => {
                next.selection = self.selection.with_field_cleared(field);
                next.highlighted = HighlightSet::new();
            }
            Action::Reset => {
                next.selection = self.selection.cleared();
                next.highlighted = HighlightSet::new();
            }
            Action::ClickHeader { table, column } => {
                // Unsortable columns (DOI, Link) ignore clicks
                if let Some(field) = sortable_field(*table, column) {
                    next.sort = self.sort.clicked(*table, field);
                }
            }
            Action::SwitchTab(kind) => {
                next.active_tab = *kind;
                next.highlighted = HighlightSet::new();
            }
            Action::SelectRow { table, row } => {
                let rows = query(store.dataset(*table), &self.selection, &self.sort);
                let record = rows.get(*row).with_context(|| {
                    format!(
                        "row {} is out of range ({} {} shown)",
                        row,
                        rows.len(),
                        table.item_plural()
                    )
                })?;
                next.highlighted = match &store.catalog {
                    Some(catalog) => highlight(record, catalog, options.trim_highlight_tokens),
                    None => HighlightSet::new(),
                };
            }
            Action::ClearHighlight => {
                next.highlighted = HighlightSet::new();
            }
        }
        Ok(next)
    }

    /// Apply actions in order, stopping at the first error
    pub fn apply_all<'a, I>(&self, actions: I, store: &DataStore, options: &ViewOptions) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Action>,
    {
        actions
            .into_iter()
            .try_fold(self.clone(), |state, action| {
                state
                    .apply(action, store, options)
                    .with_context(|| format!("failed to apply '{}'", action))
            })
    }
}

/// Split `field=value`, keeping any further `=` in the value
pub fn parse_filter_pair(s: &str) -> Result<(String, String)> {
    let (field, value) = s
        .split_once('=')
        .with_context(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    let field = field.trim();
    if field.is_empty() {
        anyhow::bail!("filter field must not be empty in '{}'", s);
    }
    Ok((field.to_string(), value.to_string()))
}

impl FromStr for Action {
    type Err = anyhow::Error;

    /// One command per line:
    /// `toggle FIELD=VALUE`, `clear FIELD`, `reset`, `sort TABLE COLUMN`,
    /// `tab TABLE`, `select TABLE ROW`, `unselect`
    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let action = match command.to_ascii_lowercase().as_str() {
            "toggle" => {
                let (field, value) = parse_filter_pair(rest)?;
                Action::ToggleFilter { field, value }
            }
            "clear" => {
                if rest.is_empty() {
                    anyhow::bail!("'clear' needs a filter field");
                }
                Action::ClearField {
                    field: rest.to_string(),
                }
            }
            "reset" => Action::Reset,
            "sort" => {
                let (table, column) = rest
                    .split_once(char::is_whitespace)
                    .context("'sort' needs a table and a column")?;
                Action::ClickHeader {
                    table: table.parse()?,
                    column: column.trim().to_string(),
                }
            }
            "tab" => Action::SwitchTab(rest.parse()?),
            "select" => {
                let (table, row) = rest
                    .split_once(char::is_whitespace)
                    .context("'select' needs a table and a row index")?;
                Action::SelectRow {
                    table: table.parse()?,
                    row: row
                        .trim()
                        .parse()
                        .with_context(|| format!("invalid row index '{}'", row.trim()))?,
                }
            }
            "unselect" => Action::ClearHighlight,
            other => anyhow::bail!("unknown action '{}'", other),
        };
        Ok(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ToggleFilter { field, value } => write!(f, "toggle {}={}", field, value),
            Action::ClearField { field } => write!(f, "clear {}", field),
            Action::Reset => f.write_str("reset"),
            Action::ClickHeader { table, column } => write!(f, "sort {} {}", table, column),
            Action::SwitchTab(kind) => write!(f, "tab {}", kind),
            Action::SelectRow { table, row } => write!(f, "select {} {}", table, row),
            Action::ClearHighlight => f.write_str("unselect"),
        }
    }
}
