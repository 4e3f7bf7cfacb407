//! End-to-end scenarios: load a data directory, click around, render

use std::fs;
use std::path::PathBuf;
use tablefilter_core::availability::{ButtonState, NOT_APPLICABLE_TITLE};
use tablefilter_core::html::render_html;
use tablefilter_core::sort::SortIndicator;
use tablefilter_core::{open, render_json, render_text, Action, DatasetKind, Session, ViewState};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn session() -> Session {
    open(&fixture_path("meetings"), None, true).unwrap()
}

fn run(session: &Session, script: &[&str]) -> ViewState {
    let actions: Vec<Action> = script.iter().map(|line| line.parse().unwrap()).collect();
    ViewState::new()
        .apply_all(&actions, &session.store, &session.options)
        .unwrap()
}

fn column(rows: &[&tablefilter_core::Record], field: &str) -> Vec<String> {
    rows.iter().map(|r| r.display(field).to_string()).collect()
}

#[test]
fn test_initial_load_sorts_by_default_keys() {
    let session = session();
    let view = session.view(&ViewState::new());

    assert_eq!(
        column(&view.papers.rows, "Author"),
        vec!["Adams", "baker", "Jones", "Smith"]
    );
    assert_eq!(
        column(&view.tools.rows, "Name"),
        vec!["mentimeter", "Miro", "Parabol"]
    );
    assert_eq!(view.papers.label, "Showing all 4 papers");
    assert_eq!(view.tools.label, "Showing all 3 tools");
}

#[test]
fn test_outcome_filter_scenario() {
    let session = session();
    let state = run(&session, &["toggle Outcome=Positive"]);
    let view = session.view(&state);

    // Tools have no Outcome field and all pass
    assert_eq!(view.tools.rows.len(), 3);
    assert_eq!(column(&view.papers.rows, "Author"), vec!["Adams", "Smith"]);
    assert_eq!(view.papers.label, "Showing 2 of 4 papers");
}

#[test]
fn test_reset_scenario() {
    let session = session();
    let state = run(
        &session,
        &["toggle Outcome=Positive", "toggle Team Size=Small", "reset"],
    );
    let view = session.view(&state);

    assert_eq!(view.papers.label, "Showing all 4 papers");
    assert_eq!(view.tools.label, "Showing all 3 tools");
    assert!(view.buttons().all(|b| !b.active));

    // Only a value that matches nothing in either collection stays disabled
    let disabled: Vec<(&str, &str)> = view
        .buttons()
        .filter(|b| b.state == ButtonState::Disabled)
        .map(|b| (b.field.as_str(), b.value.as_str()))
        .collect();
    assert_eq!(disabled, vec![("Activity", "Voting")]);
}

#[test]
fn test_disabled_buttons_follow_selection() {
    let session = session();
    let state = run(&session, &["toggle Activity=Reflection"]);
    let view = session.view(&state);

    // Reflection: Adams (After) and Parabol (After)
    assert_eq!(
        view.button("Timing", "Before").unwrap().state,
        ButtonState::Disabled
    );
    assert_eq!(
        view.button("Timing", "After").unwrap().state,
        ButtonState::Enabled
    );
    // Active buttons stay clickable
    assert_eq!(
        view.button("Activity", "Reflection").unwrap().state,
        ButtonState::Enabled
    );
    // Adding a second Activity widens the selection
    assert_eq!(
        view.button("Activity", "Agenda").unwrap().state,
        ButtonState::Enabled
    );
}

#[test]
fn test_not_applicable_on_tools_tab() {
    let session = session();
    let state = run(&session, &["toggle Outcome=Positive", "tab tools"]);
    let view = session.view(&state);

    let positive = view.button("Outcome", "Positive").unwrap();
    assert_eq!(positive.state, ButtonState::NotApplicable);
    assert_eq!(positive.title.as_deref(), Some(NOT_APPLICABLE_TITLE));

    let back = session
        .apply(&state, &Action::SwitchTab(DatasetKind::Papers))
        .unwrap();
    let view = session.view(&back);
    assert_eq!(
        view.button("Outcome", "Positive").unwrap().state,
        ButtonState::Enabled
    );
}

#[test]
fn test_sort_header_clicks() {
    let session = session();
    let state = run(&session, &["sort papers Year"]);
    let view = session.view(&state);
    assert_eq!(
        column(&view.papers.rows, "Author"),
        vec!["baker", "Jones", "Smith", "Adams"]
    );
    assert_eq!(view.papers.headers[1].indicator, SortIndicator::Ascending);

    let state = run(&session, &["sort papers Year", "sort papers Year"]);
    let view = session.view(&state);
    assert_eq!(
        column(&view.papers.rows, "Author"),
        vec!["Adams", "Smith", "Jones", "baker"]
    );
    assert_eq!(view.papers.headers[1].indicator, SortIndicator::Descending);
}

#[test]
fn test_sorting_tools_resets_papers_to_default() {
    let session = session();
    let state = run(&session, &["sort papers Year", "sort tools Provider"]);
    let view = session.view(&state);
    assert_eq!(
        column(&view.papers.rows, "Author"),
        vec!["Adams", "baker", "Jones", "Smith"]
    );
    assert!(view
        .papers
        .headers
        .iter()
        .all(|h| h.indicator != SortIndicator::Ascending));
}

#[test]
fn test_sort_survives_filtering() {
    let session = session();
    let state = run(&session, &["sort papers Year", "toggle Team Size=Small"]);
    let view = session.view(&state);
    assert_eq!(column(&view.papers.rows, "Author"), vec!["Smith", "Adams"]);
}

#[test]
fn test_row_selection_highlights_buttons() {
    let session = session();
    // Default order: Adams, baker, Jones, Smith
    let state = run(&session, &["select papers 2"]);
    let view = session.view(&state);

    let highlighted: Vec<(&str, &str)> = view
        .buttons()
        .filter(|b| b.highlighted)
        .map(|b| (b.field.as_str(), b.value.as_str()))
        .collect();
    assert_eq!(
        highlighted,
        vec![
            ("Meeting Task", "Decide"),
            ("Meeting Task", "Brainstorm"),
            ("Team Size", "Large"),
            ("Activity", "Check-in"),
            ("Timing", "During"),
            ("Outcome", "Mixed"),
        ]
    );

    let cleared = run(&session, &["select papers 2", "unselect"]);
    assert!(session.view(&cleared).buttons().all(|b| !b.highlighted));
}

#[test]
fn test_clear_field_deactivates_key() {
    let session = session();
    let state = run(
        &session,
        &[
            "toggle Team Size=Small",
            "toggle Team Size=Large",
            "toggle Outcome=Positive",
            "clear Team Size",
        ],
    );
    assert!(state.selection.values("Team Size").is_none());
    assert!(state.selection.is_active("Outcome", "Positive"));
}

#[test]
fn test_missing_ordering_renders_tables_without_filters() {
    let session = open(&fixture_path("no-ordering"), None, true).unwrap();
    assert!(session.store.catalog.is_none());

    let view = session.view(&ViewState::new());
    assert!(view.filters.is_empty());
    assert_eq!(view.papers.rows.len(), 4);

    let text = render_text(&view);
    assert!(text.contains("Filters: none"));
    let html = render_html(&view, &session.options);
    assert!(!html.contains("filter-group-container"));
    assert!(html.contains(r#"id="papers-table""#));
}

#[test]
fn test_failed_load_without_strict_gives_empty_page() {
    let temp = TempDir::new().unwrap();
    fs::copy(
        fixture_path("meetings").join("data-research.json"),
        temp.path().join("data-research.json"),
    )
    .unwrap();
    fs::write(temp.path().join("data-tools.json"), "[{broken").unwrap();

    assert!(open(temp.path(), None, true).is_err());

    let session = open(temp.path(), None, false).unwrap();
    let view = session.view(&ViewState::new());
    assert!(view.papers.rows.is_empty());
    assert!(view.tools.rows.is_empty());
    assert_eq!(view.papers.label, "No papers found");
}

#[test]
fn test_config_overrides_files_and_inert_fields() {
    let temp = TempDir::new().unwrap();
    for name in ["data-research.json", "data-tools.json", "ordering.json"] {
        fs::copy(fixture_path("meetings").join(name), temp.path().join(name)).unwrap();
    }
    fs::rename(
        temp.path().join("data-tools.json"),
        temp.path().join("tools.json"),
    )
    .unwrap();
    fs::write(
        temp.path().join(".tablefilterrc.json"),
        r#"{"tools": "tools.json", "derive_not_applicable": true}"#,
    )
    .unwrap();

    let session = open(temp.path(), None, true).unwrap();
    assert_eq!(session.store.tools.len(), 3);
    assert_eq!(
        session.options.inert.iter().collect::<Vec<_>>(),
        vec!["Meeting Task", "Outcome", "Team Size"]
    );
}

#[test]
fn test_html_page_reflects_state() {
    let session = session();
    let state = run(
        &session,
        &["toggle Outcome=Positive", "sort papers Year", "select papers 0"],
    );
    let view = session.view(&state);
    let html = render_html(&view, &session.options);

    assert!(html.contains(
        r#"<button class="filter-btn active hover-highlight" data-inert-on-tools="This filter does not apply to Practice Tools">Positive</button>"#
    ));
    assert!(html.contains(r#"<button class="filter-btn button-disabled" disabled>Voting</button>"#));
    assert!(html.contains(r#"<th class="is-sorted" data-column="Year">Year ↑</th>"#));
    assert!(html.contains(r#"<span class="sort-arrows">↑↓</span>"#));
    assert!(html.contains(r#"<th class="not-sortable">DOI</th>"#));
    assert!(html.contains(">10.1000/agenda.2020.01<"));
    assert!(html.contains(">https://www.parabol.co/...<"));
    assert!(html.contains(r#"<div class="result-count" id="research-count">Showing 2 of 4 papers</div>"#));
    assert!(html.contains(r#"<section class="tab-content active" id="research-tab">"#));
}

#[test]
fn test_html_tab_switch_restyles_inert_filters() {
    let session = session();
    let on_papers = run(&session, &["toggle Outcome=Positive", "toggle Activity=Agenda"]);
    let html = render_html(&session.view(&on_papers), &session.options);

    // Rendered for the papers tab: marked for the script, not yet styled
    assert!(html.contains(
        r#"<button class="filter-btn active" data-inert-on-tools="This filter does not apply to Practice Tools">Positive</button>"#
    ));
    assert!(html.contains(r#"<button class="filter-btn">Mixed</button>"#));
    // Activity is not an inert field
    assert!(html.contains(r#"<button class="filter-btn active">Agenda</button>"#));
    assert!(html.contains("classList.add('filter-not-applicable')"));
    assert!(html.contains("classList.remove('filter-not-applicable')"));
    assert!(html.contains("getAttribute('data-inert-on-tools')"));

    let on_tools = run(
        &session,
        &["toggle Outcome=Positive", "toggle Activity=Agenda", "tab tools"],
    );
    let html = render_html(&session.view(&on_tools), &session.options);
    assert!(html.contains(
        r#"<button class="filter-btn active filter-not-applicable" title="This filter does not apply to Practice Tools" data-inert-on-tools="This filter does not apply to Practice Tools">Positive</button>"#
    ));
    assert!(html.contains(r#"<section class="tab-content active" id="tools-tab">"#));
}

#[test]
fn test_html_has_no_inert_reset_control() {
    let session = session();
    let state = run(&session, &["toggle Outcome=Positive"]);
    let html = render_html(&session.view(&state), &session.options);
    assert!(!html.contains("reset-filters-btn"));
    assert!(!html.contains(">Reset filters<"));
}

#[test]
fn test_null_field_is_excluded_by_filter_on_that_field() {
    let temp = TempDir::new().unwrap();
    for name in ["data-tools.json", "ordering.json"] {
        fs::copy(fixture_path("meetings").join(name), temp.path().join(name)).unwrap();
    }
    fs::write(
        temp.path().join("data-research.json"),
        r#"[{"Author": "A", "Outcome": null}, {"Author": "B", "Outcome": "Negative"}]"#,
    )
    .unwrap();

    let session = open(temp.path(), None, true).unwrap();
    let state = run(&session, &["toggle Outcome=Positive"]);
    let view = session.view(&state);
    assert_eq!(view.papers.label, "No papers found");

    let view = session.view(&ViewState::new());
    assert_eq!(column(&view.papers.rows, "Outcome"), vec!["", "Negative"]);
}

#[test]
fn test_html_shortens_non_doi_links() {
    let session = session();
    let html = render_html(&session.view(&ViewState::new()), &session.options);
    assert!(html.contains(">https://example.org/proceeding...<"));
    assert!(html.contains(r#"<div class="no-data" id="no-data-message">"#));
}

#[test]
fn test_json_output_is_deterministic() {
    let session = session();
    let state = run(&session, &["toggle Timing=During", "tab tools"]);
    let first = render_json(&session.view(&state));
    let second = render_json(&session.view(&state));
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["active_tab"], "tools");
    assert_eq!(value["tools"]["count"]["shown"], 1);
}
