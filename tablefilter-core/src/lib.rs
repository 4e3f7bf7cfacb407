//! tablefilter core library - filter, sort and render the research papers and practice tools tables

#![deny(warnings)]

// Global invariants enforced in this crate:
// - No global mutable state; view state is an explicit value
// - Source datasets are never mutated
// - Every state change recomputes both tables and every button from scratch
// - Identical input yields byte-for-byte identical output

pub mod availability;
pub mod config;
pub mod filter;
pub mod highlight;
pub mod html;
pub mod load;
pub mod ordering;
pub mod query;
pub mod record;
pub mod report;
pub mod sort;
pub mod state;
pub mod view;

pub use config::{ResolvedConfig, ViewOptions};
pub use filter::FilterSelection;
pub use load::{DataSources, DataStore};
pub use record::{Dataset, DatasetKind, Record};
pub use report::{render_json, render_text};
pub use sort::{SortSpec, SortState};
pub use state::{Action, ViewState};
pub use view::View;

use std::path::Path;

/// Loaded data plus the settings needed to compute views over it
pub struct Session {
    pub config: ResolvedConfig,
    pub store: DataStore,
    pub options: ViewOptions,
}

impl Session {
    pub fn new(config: ResolvedConfig, store: DataStore) -> Self {
        let options = config.view_options(&store);
        Session {
            config,
            store,
            options,
        }
    }

    /// Apply an action to a state
    pub fn apply(&self, state: &ViewState, action: &Action) -> anyhow::Result<ViewState> {
        state.apply(action, &self.store, &self.options)
    }

    /// Recompute the full view for a state
    pub fn view(&self, state: &ViewState) -> View<'_> {
        View::compute(&self.store, state, &self.options)
    }
}

/// Open a data directory with its configuration
///
/// With `strict` set, a failed collection load is returned as an error.
/// Otherwise the failure is logged and the session starts with no data.
pub fn open(data_dir: &Path, config_path: Option<&Path>, strict: bool) -> anyhow::Result<Session> {
    let config = config::load_and_resolve(data_dir, config_path)?;
    let sources = config.sources(data_dir);
    let store = if strict {
        load::load(&sources)?
    } else {
        load::load_or_empty(&sources)
    };
    Ok(Session::new(config, store))
}
