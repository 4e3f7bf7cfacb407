//! Filter button availability
//!
//! Every button is re-evaluated on every state change by simulating its
//! toggle against both datasets. No memoization.

use crate::filter::FilterSelection;
use crate::load::DataStore;
use crate::ordering::FilterCatalog;
use crate::query::count_matches;
use crate::record::{Dataset, DatasetKind};
use serde::Serialize;
use std::collections::BTreeSet;

/// Title shown on an active filter that is inert on the tools tab
pub const NOT_APPLICABLE_TITLE: &str = "This filter does not apply to Practice Tools";

/// Fields flagged "not applicable" on the tools tab unless configured otherwise
pub const DEFAULT_NOT_APPLICABLE_ON_TOOLS: &[&str] = &[
    "Meeting Task",
    "Team Size",
    "Meeting Duration",
    "Meeting Environment",
    "Outcome",
];

/// Button state after the availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Enabled,
    Disabled,
    NotApplicable,
}

impl ButtonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonState::Enabled => "enabled",
            ButtonState::Disabled => "disabled",
            ButtonState::NotApplicable => "not_applicable",
        }
    }
}

/// Filter fields that are inert while the tools tab is visible
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InertFields {
    fields: BTreeSet<String>,
}

impl InertFields {
    pub fn fixed<S: AsRef<str>>(fields: &[S]) -> Self {
        InertFields {
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
        }
    }

    pub fn defaults() -> Self {
        Self::fixed(DEFAULT_NOT_APPLICABLE_ON_TOOLS)
    }

    /// Catalog fields that no tool record carries
    pub fn derive_from(tools: &Dataset, catalog: &FilterCatalog) -> Self {
        InertFields {
            fields: catalog
                .fields()
                .filter(|field| !tools.has_field(field))
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

/// Combined result count across both datasets if (field, value) were toggled
pub fn simulated_total(
    field: &str,
    value: &str,
    selection: &FilterSelection,
    store: &DataStore,
) -> usize {
    let hypothetical = selection.toggled(field, value);
    store
        .datasets()
        .iter()
        .map(|dataset| count_matches(dataset, &hypothetical))
        .sum()
}

/// Whether toggling (field, value) would leave both tables empty
///
/// An active button is never disabled so it can always be switched off.
pub fn is_button_disabled(
    field: &str,
    value: &str,
    selection: &FilterSelection,
    store: &DataStore,
) -> bool {
    !selection.is_active(field, value) && simulated_total(field, value, selection, store) == 0
}

pub fn button_state(
    field: &str,
    value: &str,
    selection: &FilterSelection,
    store: &DataStore,
    active_tab: DatasetKind,
    inert: &InertFields,
) -> ButtonState {
    if is_button_disabled(field, value, selection, store) {
        ButtonState::Disabled
    } else if inert.contains(field)
        && active_tab == DatasetKind::Tools
        && selection.is_active(field, value)
    {
        ButtonState::NotApplicable
    } else {
        ButtonState::Enabled
    }
}

/// Full state of one filter button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonStatus {
    pub group: String,
    pub field: String,
    pub value: String,
    pub active: bool,
    pub state: ButtonState,
    pub highlighted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// State of every catalog button, in canonical order
pub fn button_states(
    catalog: &FilterCatalog,
    selection: &FilterSelection,
    store: &DataStore,
    active_tab: DatasetKind,
    inert: &InertFields,
) -> Vec<ButtonStatus> {
    catalog
        .buttons()
        .map(|button| {
            let state = button_state(
                button.field,
                button.value,
                selection,
                store,
                active_tab,
                inert,
            );
            ButtonStatus {
                group: button.group.to_string(),
                field: button.field.to_string(),
                value: button.value.to_string(),
                active: selection.is_active(button.field, button.value),
                state,
                highlighted: false,
                title: (state == ButtonState::NotApplicable)
                    .then(|| NOT_APPLICABLE_TITLE.to_string()),
            }
        })
        .collect()
}
