//! Query engine: filter then sort one dataset
//!
//! Pure functions over borrowed data. Source datasets are never reordered;
//! results are fresh vectors of references.

use crate::filter::FilterSelection;
use crate::record::{Dataset, DatasetKind, Record};
use crate::sort::{sort_records, SortState};
use serde::Serialize;

/// Filtered and sorted rows of one dataset
pub fn query<'a>(
    dataset: &'a Dataset,
    selection: &FilterSelection,
    sort: &SortState,
) -> Vec<&'a Record> {
    let mut rows: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|record| selection.matches(record))
        .collect();
    let (column, ascending) = sort.effective(dataset.kind());
    sort_records(&mut rows, column, ascending);
    rows
}

/// Number of records passing the selection
pub fn count_matches(dataset: &Dataset, selection: &FilterSelection) -> usize {
    dataset
        .records()
        .iter()
        .filter(|record| selection.matches(record))
        .count()
}

/// Shown / total counts for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultCount {
    pub kind: DatasetKind,
    pub shown: usize,
    pub total: usize,
}

impl ResultCount {
    pub fn label(&self) -> String {
        if self.shown == 0 {
            format!("No {}s found", self.kind.item_singular())
        } else if self.shown == self.total {
            format!("Showing all {} {}", self.shown, self.kind.item_plural())
        } else {
            format!(
                "Showing {} of {} {}",
                self.shown,
                self.total,
                self.kind.item_plural()
            )
        }
    }
}
