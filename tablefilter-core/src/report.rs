//! Text and JSON output
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::availability::ButtonState;
use crate::record::DatasetKind;
use crate::sort::SortIndicator;
use crate::view::{TableView, View};

const CELL_WIDTH: usize = 24;

/// Render a view as text output
pub fn render_text(view: &View<'_>) -> String {
    let mut output = String::new();

    for kind in DatasetKind::ALL {
        let table = view.table(kind);
        let marker = if view.active_tab == kind { "*" } else { " " };
        output.push_str(&format!(
            "{} {} ({})\n",
            marker,
            kind.tab_label(),
            table.label
        ));
        render_table_text(table, &mut output);
        output.push('\n');
    }

    if view.filters.is_empty() {
        output.push_str("Filters: none (no ordering data)\n");
        return output;
    }

    output.push_str("Filters:\n");
    for group in &view.filters {
        output.push_str(&format!("  {}\n", group.name));
        for key in &group.keys {
            let buttons = key
                .buttons
                .iter()
                .map(|b| {
                    let mut text = b.value.clone();
                    if b.active {
                        text = format!("[{}]", text);
                    }
                    match b.state {
                        ButtonState::Enabled => {}
                        ButtonState::Disabled => text.push_str(" (disabled)"),
                        ButtonState::NotApplicable => text.push_str(" (n/a)"),
                    }
                    if b.highlighted {
                        text.push_str(" <");
                    }
                    text
                })
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("    {}: {}\n", key.field, buttons));
        }
    }

    output
}

fn render_table_text(table: &TableView<'_>, output: &mut String) {
    let header = table
        .headers
        .iter()
        .map(|h| {
            let label = match h.indicator {
                SortIndicator::Ascending | SortIndicator::Descending => {
                    format!("{} {}", h.column.header, h.indicator.arrow())
                }
                SortIndicator::Sortable | SortIndicator::None => h.column.header.to_string(),
            };
            truncate_or_pad(&label, CELL_WIDTH)
        })
        .collect::<Vec<_>>()
        .join(" ");
    output.push_str(header.trim_end());
    output.push('\n');

    if table.rows.is_empty() {
        output.push_str(&format!("  No {}s found\n", table.kind.item_singular()));
        return;
    }

    for record in &table.rows {
        let line = table
            .headers
            .iter()
            .map(|h| truncate_or_pad(record.display(h.column.field), CELL_WIDTH))
            .collect::<Vec<_>>()
            .join(" ");
        output.push_str(line.trim_end());
        output.push('\n');
    }
}

/// Render a view as JSON output
pub fn render_json(view: &View<'_>) -> String {
    serde_json::to_string_pretty(view).unwrap_or_else(|_| "{}".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewOptions;
    use crate::load::DataStore;
    use crate::ordering::OrderingDescriptor;
    use crate::record::{Dataset, Record};
    use crate::state::ViewState;

    fn store() -> DataStore {
        let papers = Dataset::new(
            DatasetKind::Papers,
            vec![Record::from_pairs([
                ("Author", "Smith"),
                ("Year", "2020"),
                ("Title", "A very long title that will not fit in one cell"),
                ("Outcome", "Positive"),
            ])],
        );
        let tools = Dataset::new(DatasetKind::Tools, Vec::new());
        let ordering = OrderingDescriptor::from_json(
            r#"{"groups": [{"name": "Results", "keys": ["Outcome"]}],
                "buttonsOrder": {"Outcome": ["Positive", "Negative"]}}"#,
        )
        .unwrap();
        DataStore::new(papers, tools, Some(ordering))
    }

    #[test]
    fn test_text_output() {
        let store = store();
        let state = ViewState::new();
        let view = View::compute(&store, &state, &ViewOptions::default());
        let text = render_text(&view);

        assert!(text.contains("* Research Papers (Showing all 1 papers)"));
        assert!(text.contains("  Practice Tools (No tools found)"));
        assert!(text.contains("A very long title tha..."));
        assert!(text.contains("  No tools found"));
        assert!(text.contains("    Outcome: Positive, Negative (disabled)"));
    }

    #[test]
    fn test_text_output_is_deterministic() {
        let store = store();
        let state = ViewState::new();
        let options = ViewOptions::default();
        let first = render_text(&View::compute(&store, &state, &options));
        let second = render_text(&View::compute(&store, &state, &options));
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_output() {
        let store = store();
        let state = ViewState::new();
        let view = View::compute(&store, &state, &ViewOptions::default());
        let value: serde_json::Value = serde_json::from_str(&render_json(&view)).unwrap();
        assert_eq!(value["active_tab"], "papers");
        assert_eq!(value["papers"]["count"]["shown"], 1);
        assert_eq!(value["papers"]["rows"][0]["Author"], "Smith");
        assert_eq!(value["filters"][0]["keys"][0]["buttons"][1]["state"], "disabled");
    }

    #[test]
    fn test_truncate_or_pad_handles_multibyte() {
        assert_eq!(truncate_or_pad("Müller", 8), "Müller  ");
        assert_eq!(truncate_or_pad("Müllerstraße", 8), "Mülle...");
    }
}
