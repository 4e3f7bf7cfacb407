//! Full recomputation of what the user sees
//!
//! Query engine, then tables, then button availability, on every call.

use crate::availability::{button_states, ButtonState, ButtonStatus};
use crate::config::ViewOptions;
use crate::load::DataStore;
use crate::ordering::FilterCatalog;
use crate::query::{query, ResultCount};
use crate::record::{DatasetKind, Record};
use crate::sort::{columns, Column, SortIndicator};
use crate::state::ViewState;
use serde::Serialize;

/// One column header with its sort indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    #[serde(flatten)]
    pub column: Column,
    pub indicator: SortIndicator,
}

/// One rendered table
#[derive(Debug, Clone, Serialize)]
pub struct TableView<'a> {
    pub kind: DatasetKind,
    pub count: ResultCount,
    pub label: String,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<&'a Record>,
}

/// Buttons of one filter key
#[derive(Debug, Clone, Serialize)]
pub struct KeyView {
    pub field: String,
    pub buttons: Vec<ButtonStatus>,
}

/// Keys of one filter group
#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub name: String,
    pub keys: Vec<KeyView>,
}

/// Both tables and every filter button for one state
#[derive(Debug, Clone, Serialize)]
pub struct View<'a> {
    pub active_tab: DatasetKind,
    pub papers: TableView<'a>,
    pub tools: TableView<'a>,
    /// Empty when no ordering descriptor was loaded
    pub filters: Vec<GroupView>,
}

impl<'a> View<'a> {
    pub fn compute(store: &'a DataStore, state: &ViewState, options: &ViewOptions) -> Self {
        let papers = table_view(store, state, DatasetKind::Papers);
        let tools = table_view(store, state, DatasetKind::Tools);
        let filters = match &store.catalog {
            Some(catalog) => group_views(catalog, store, state, options),
            None => Vec::new(),
        };
        View {
            active_tab: state.active_tab,
            papers,
            tools,
            filters,
        }
    }

    pub fn table(&self, kind: DatasetKind) -> &TableView<'a> {
        match kind {
            DatasetKind::Papers => &self.papers,
            DatasetKind::Tools => &self.tools,
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &ButtonStatus> {
        self.filters
            .iter()
            .flat_map(|g| g.keys.iter().flat_map(|k| k.buttons.iter()))
    }

    pub fn button(&self, field: &str, value: &str) -> Option<&ButtonStatus> {
        self.buttons().find(|b| b.field == field && b.value == value)
    }

    pub fn disabled_count(&self) -> usize {
        self.buttons()
            .filter(|b| b.state == ButtonState::Disabled)
            .count()
    }
}

fn table_view<'a>(store: &'a DataStore, state: &ViewState, kind: DatasetKind) -> TableView<'a> {
    let dataset = store.dataset(kind);
    let rows = query(dataset, &state.selection, &state.sort);
    let count = ResultCount {
        kind,
        shown: rows.len(),
        total: dataset.len(),
    };
    let headers = columns(kind)
        .iter()
        .map(|column| HeaderView {
            column: *column,
            indicator: state.sort.indicator(kind, column),
        })
        .collect();
    TableView {
        kind,
        label: count.label(),
        count,
        headers,
        rows,
    }
}

fn group_views(
    catalog: &FilterCatalog,
    store: &DataStore,
    state: &ViewState,
    options: &ViewOptions,
) -> Vec<GroupView> {
    let mut statuses = button_states(
        catalog,
        &state.selection,
        store,
        state.active_tab,
        &options.inert,
    )
    .into_iter();

    catalog
        .groups()
        .iter()
        .map(|group| GroupView {
            name: group.name.clone(),
            keys: group
                .keys
                .iter()
                .map(|key| KeyView {
                    field: key.field.clone(),
                    buttons: statuses
                        .by_ref()
                        .take(key.values.len())
                        .map(|mut status| {
                            status.highlighted =
                                state.highlighted.contains(&status.field, &status.value);
                            status
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}
