//! Loading the two collections and the ordering descriptor
//!
//! All three resources are read concurrently and the store is only built
//! once every read has finished. A failure on either collection aborts the
//! whole load. The ordering descriptor is optional: without it the tables
//! still render but no filters exist.

use crate::ordering::{FilterCatalog, OrderingDescriptor};
use crate::record::{Dataset, DatasetKind};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_PAPERS_FILE: &str = "data-research.json";
pub const DEFAULT_TOOLS_FILE: &str = "data-tools.json";
pub const DEFAULT_ORDERING_FILE: &str = "ordering.json";

/// Locations of the three resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub papers: PathBuf,
    pub tools: PathBuf,
    pub ordering: PathBuf,
}

impl DataSources {
    /// Standard file names inside a data directory
    pub fn in_dir(dir: &Path) -> Self {
        DataSources {
            papers: dir.join(DEFAULT_PAPERS_FILE),
            tools: dir.join(DEFAULT_TOOLS_FILE),
            ordering: dir.join(DEFAULT_ORDERING_FILE),
        }
    }
}

/// The immutable session data
#[derive(Debug, Clone)]
pub struct DataStore {
    pub papers: Dataset,
    pub tools: Dataset,
    pub ordering: Option<OrderingDescriptor>,
    pub catalog: Option<FilterCatalog>,
}

impl DataStore {
    pub fn new(papers: Dataset, tools: Dataset, ordering: Option<OrderingDescriptor>) -> Self {
        let catalog = match &ordering {
            Some(descriptor) => match FilterCatalog::build(descriptor) {
                Ok(catalog) => Some(catalog),
                Err(e) => {
                    tracing::error!("invalid ordering descriptor, filters will not be created: {:#}", e);
                    None
                }
            },
            None => {
                tracing::error!("ordering data is missing, filters will not be created");
                None
            }
        };
        DataStore {
            papers,
            tools,
            ordering,
            catalog,
        }
    }

    /// Store for a page whose load failed: no rows, no filters
    pub fn empty() -> Self {
        DataStore {
            papers: Dataset::empty(DatasetKind::Papers),
            tools: Dataset::empty(DatasetKind::Tools),
            ordering: None,
            catalog: None,
        }
    }

    pub fn dataset(&self, kind: DatasetKind) -> &Dataset {
        match kind {
            DatasetKind::Papers => &self.papers,
            DatasetKind::Tools => &self.tools,
        }
    }

    pub fn datasets(&self) -> [&Dataset; 2] {
        [&self.papers, &self.tools]
    }
}

fn read_dataset(kind: DatasetKind, path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {} data: {}", kind, path.display()))?;
    Dataset::from_json(kind, &content).with_context(|| format!("in {}", path.display()))
}

fn read_ordering(path: &Path) -> Option<OrderingDescriptor> {
    if !path.exists() {
        tracing::warn!(
            "could not load ordering data from {}, using default ordering",
            path.display()
        );
        return None;
    }
    match OrderingDescriptor::load(path) {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            tracing::error!("error loading ordering data: {:#}", e);
            None
        }
    }
}

/// Load both collections and the ordering descriptor
pub fn load(sources: &DataSources) -> Result<DataStore> {
    let ((papers, tools), ordering) = rayon::join(
        || {
            rayon::join(
                || read_dataset(DatasetKind::Papers, &sources.papers),
                || read_dataset(DatasetKind::Tools, &sources.tools),
            )
        },
        || read_ordering(&sources.ordering),
    );
    let papers = papers?;
    let tools = tools?;

    tracing::info!("data loaded successfully");
    tracing::info!(items = papers.len(), "research data");
    tracing::info!(items = tools.len(), "tools data");
    tracing::debug!(present = ordering.is_some(), "ordering data");

    Ok(DataStore::new(papers, tools, ordering))
}

/// Load, or log the failure and fall back to an empty store
pub fn load_or_empty(sources: &DataSources) -> DataStore {
    match load(sources) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("error loading JSON data: {:#}", e);
            DataStore::empty()
        }
    }
}
