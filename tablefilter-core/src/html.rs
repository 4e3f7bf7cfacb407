//! HTML page generation
//!
//! Generates a self-contained page with embedded CSS and a small script for
//! tab switching and hiding the title bar on scroll. Filtering, sorting and
//! highlighting are already applied: the page shows one view state. Filter
//! buttons only display that state and there is no reset control.
//!
//! Switching tabs in the browser is the one state change the page handles
//! itself. Active buttons of inert fields carry `data-inert-on-tools` with
//! their title, and the script toggles `filter-not-applicable` from it.

use crate::availability::{ButtonState, NOT_APPLICABLE_TITLE};
use crate::config::ViewOptions;
use crate::record::{DatasetKind, Record};
use crate::sort::{CellKind, SortIndicator};
use crate::view::{GroupView, TableView, View};

const DOI_PREFIX: &str = "https://doi.org/";

/// Render a view as an HTML page
pub fn render_html(view: &View<'_>, options: &ViewOptions) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Research Papers and Practice Tools</title>
    <style>{css}</style>
</head>
<body>
    {title_bar}
    <div class="container">
        {filters}
        {tabs}
        {papers}
        {tools}
        {footer}
    </div>
    <script>{js}</script>
</body>
</html>"#,
        css = inline_css(),
        js = inline_javascript(),
        title_bar = render_title_bar(),
        filters = render_filters(&view.filters, options),
        tabs = render_tabs(view.active_tab),
        papers = render_tab_content(&view.papers, view.active_tab, options),
        tools = render_tab_content(&view.tools, view.active_tab, options),
        footer = render_footer(),
    )
}

/// Inline CSS styles
fn inline_css() -> &'static str {
    r#"
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    line-height: 1.5;
    color: #111827;
    background: #ffffff;
}

#title-bar {
    position: sticky;
    top: 0;
    z-index: 10;
    padding: 1rem 2rem;
    background: #1f2937;
    color: #f9fafb;
    transition: transform 0.2s ease;
}

.container {
    max-width: 1400px;
    margin: 0 auto;
    padding: 2rem;
}

/* Filters */
#filters {
    display: flex;
    flex-wrap: wrap;
    gap: 1.5rem;
    margin-bottom: 1.5rem;
}

.filter-group-container {
    flex: 1 1 300px;
}

.filter-group-name {
    font-size: 1rem;
    margin-bottom: 0.5rem;
}

.filter-group {
    display: flex;
    flex-wrap: wrap;
    align-items: center;
    gap: 0.25rem;
    margin-bottom: 0.5rem;
}

.filter-key {
    font-weight: 600;
    font-size: 0.875rem;
    margin-right: 0.5rem;
    cursor: pointer;
}

.filter-btn {
    padding: 0.25rem 0.75rem;
    border: 1px solid #d1d5db;
    border-radius: 4px;
    background: #f9fafb;
    font-size: 0.8125rem;
    cursor: pointer;
}

.filter-btn.active {
    background: #2563eb;
    border-color: #2563eb;
    color: #ffffff;
}

.filter-btn.button-disabled {
    opacity: 0.4;
    cursor: not-allowed;
}

.filter-btn.filter-not-applicable {
    background: #e5e7eb;
    border-style: dashed;
    color: #6b7280;
}

.filter-btn.hover-highlight {
    outline: 2px solid #f59e0b;
}

/* Tabs */
.tabs {
    display: flex;
    gap: 0.5rem;
    border-bottom: 2px solid #e5e7eb;
    margin-bottom: 1rem;
}

.tab-btn {
    padding: 0.5rem 1rem;
    border: none;
    background: none;
    font-size: 1rem;
    cursor: pointer;
}

.tab-btn.active {
    border-bottom: 2px solid #2563eb;
    font-weight: 600;
}

.tab-content {
    display: none;
}

.tab-content.active {
    display: block;
}

.result-count {
    color: #6b7280;
    font-size: 0.875rem;
    margin-bottom: 0.5rem;
}

/* Tables */
table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.875rem;
}

th, td {
    padding: 0.5rem;
    text-align: left;
    border-bottom: 1px solid #e5e7eb;
    vertical-align: top;
}

th {
    background: #f3f4f6;
    user-select: none;
}

th.is-sortable, th.is-sorted {
    cursor: pointer;
}

th.not-sortable {
    opacity: 0.7;
}

.sort-arrows {
    color: #9ca3af;
}

.no-data {
    display: none;
    padding: 1rem;
    color: #6b7280;
}

.no-data.visible {
    display: block;
}

footer {
    margin-top: 2rem;
    color: #9ca3af;
    font-size: 0.75rem;
}
"#
}

/// Inline JavaScript: tab switching and title bar hiding only
fn inline_javascript() -> &'static str {
    r#"
(function() {
    function markInertFilters(tabName) {
        document.querySelectorAll('.filter-btn[data-inert-on-tools]').forEach(function(btn) {
            if (tabName === 'tools-tab') {
                btn.classList.add('filter-not-applicable');
                btn.setAttribute('title', btn.getAttribute('data-inert-on-tools'));
            } else {
                btn.classList.remove('filter-not-applicable');
                btn.removeAttribute('title');
            }
        });
    }

    document.querySelectorAll('.tab-btn').forEach(function(btn) {
        btn.addEventListener('click', function() {
            var tabName = btn.getAttribute('data-tab');
            document.querySelectorAll('.tab-content').forEach(function(tab) {
                tab.classList.remove('active');
            });
            document.querySelectorAll('.tab-btn').forEach(function(other) {
                other.classList.remove('active');
            });
            document.getElementById(tabName).classList.add('active');
            btn.classList.add('active');
            document.querySelectorAll('.filter-btn.hover-highlight').forEach(function(other) {
                other.classList.remove('hover-highlight');
            });
            markInertFilters(tabName);
        });
    });

    var titleBar = document.getElementById('title-bar');
    window.addEventListener('scroll', function() {
        titleBar.style.transform = window.scrollY > 35 ? 'translateY(-100%)' : '';
    });
})();
"#
}

fn render_title_bar() -> String {
    r#"<div id="title-bar">
        <h1>Research Papers and Practice Tools</h1>
    </div>"#
        .to_string()
}

/// Render filter groups, or nothing when no ordering data was loaded
fn render_filters(groups: &[GroupView], options: &ViewOptions) -> String {
    if groups.is_empty() {
        return String::new();
    }

    let groups_html: String = groups
        .iter()
        .map(|group| {
            let keys: String = group
                .keys
                .iter()
                .map(|key| {
                    let buttons: String = key
                        .buttons
                        .iter()
                        .map(|b| {
                            let mut classes = vec!["filter-btn"];
                            if b.active {
                                classes.push("active");
                            }
                            match b.state {
                                ButtonState::Enabled => {}
                                ButtonState::Disabled => classes.push("button-disabled"),
                                ButtonState::NotApplicable => classes.push("filter-not-applicable"),
                            }
                            if b.highlighted {
                                classes.push("hover-highlight");
                            }
                            let title = b
                                .title
                                .as_ref()
                                .map(|t| format!(r#" title="{}""#, html_escape(t)))
                                .unwrap_or_default();
                            let inert = if b.active && options.inert.contains(&b.field) {
                                format!(r#" data-inert-on-tools="{}""#, html_escape(NOT_APPLICABLE_TITLE))
                            } else {
                                String::new()
                            };
                            let disabled = if b.state == ButtonState::Disabled {
                                " disabled"
                            } else {
                                ""
                            };
                            format!(
                                r#"<button class="{classes}"{title}{inert}{disabled}>{value}</button>"#,
                                classes = classes.join(" "),
                                title = title,
                                inert = inert,
                                disabled = disabled,
                                value = html_escape(&b.value),
                            )
                        })
                        .collect();
                    format!(
                        r#"<div class="filter-group"><span class="filter-key">{field}</span>{buttons}</div>"#,
                        field = html_escape(&key.field),
                        buttons = buttons,
                    )
                })
                .collect();
            format!(
                r#"<div class="filter-group-container"><h3 class="filter-group-name">{name}</h3>{keys}</div>"#,
                name = html_escape(&group.name),
                keys = keys,
            )
        })
        .collect();

    format!(r#"<section id="filters">{}</section>"#, groups_html)
}

fn render_tabs(active: DatasetKind) -> String {
    let buttons: String = DatasetKind::ALL
        .iter()
        .map(|kind| {
            format!(
                r#"<button class="tab-btn{active}" data-tab="{tab}">{label}</button>"#,
                active = if *kind == active { " active" } else { "" },
                tab = kind.tab_id(),
                label = kind.tab_label(),
            )
        })
        .collect();
    format!(r#"<nav class="tabs">{}</nav>"#, buttons)
}

fn render_tab_content(table: &TableView<'_>, active: DatasetKind, options: &ViewOptions) -> String {
    let kind = table.kind;
    format!(
        r#"<section class="tab-content{active}" id="{tab}">
        <div class="result-count" id="{count_id}">{label}</div>
        {table}
        <div class="no-data{visible}" id="{no_data_id}">No {plural} match the selected filters.</div>
    </section>"#,
        active = if kind == active { " active" } else { "" },
        tab = kind.tab_id(),
        count_id = kind.count_id(),
        label = html_escape(&table.label),
        table = render_table(table, options),
        visible = if table.rows.is_empty() { " visible" } else { "" },
        no_data_id = kind.no_data_id(),
        plural = kind.item_plural(),
    )
}

/// Render one table with header indicators and rows
fn render_table(table: &TableView<'_>, options: &ViewOptions) -> String {
    let headers: String = table
        .headers
        .iter()
        .map(|h| {
            let label = html_escape(h.column.header);
            match h.indicator {
                SortIndicator::Ascending | SortIndicator::Descending => format!(
                    r#"<th class="is-sorted" data-column="{field}">{label} {arrow}</th>"#,
                    field = html_escape(h.column.field),
                    label = label,
                    arrow = h.indicator.arrow(),
                ),
                SortIndicator::Sortable => format!(
                    r#"<th class="is-sortable" data-column="{field}">{label} <span class="sort-arrows">{arrows}</span></th>"#,
                    field = html_escape(h.column.field),
                    label = label,
                    arrows = h.indicator.arrow(),
                ),
                SortIndicator::None => format!(r#"<th class="not-sortable">{}</th>"#, label),
            }
        })
        .collect();

    let rows: String = table
        .rows
        .iter()
        .map(|record| {
            let cells: String = table
                .headers
                .iter()
                .map(|h| render_cell(record, h.column.field, h.column.cell, options))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();

    format!(
        r#"<table id="{id}">
            <thead><tr>{headers}</tr></thead>
            <tbody>{rows}</tbody>
        </table>"#,
        id = table.kind.table_id(),
        headers = headers,
        rows = rows,
    )
}

fn render_cell(record: &Record, field: &str, cell: CellKind, options: &ViewOptions) -> String {
    let value = record.display(field);
    match cell {
        CellKind::Text => format!("<td>{}</td>", html_escape(value)),
        CellKind::Doi => format!(
            r#"<td><a href="{href}" target="_blank">{text}</a></td>"#,
            href = html_escape(value),
            text = html_escape(&doi_display(value, options.doi_display_chars)),
        ),
        CellKind::Link => format!(
            r#"<td><a href="{href}" target="_blank">{text}</a></td>"#,
            href = html_escape(value),
            text = html_escape(&link_display(value, options.link_display_chars)),
        ),
    }
}

/// DOI without the doi.org prefix, or the first `max_chars` of any other link
pub fn doi_display(url: &str, max_chars: usize) -> String {
    match url.strip_prefix(DOI_PREFIX) {
        Some(doi) => doi.to_string(),
        None => link_display(url, max_chars),
    }
}

/// First `max_chars` of a link followed by an ellipsis
pub fn link_display(url: &str, max_chars: usize) -> String {
    let kept: String = url.chars().take(max_chars).collect();
    format!("{}...", kept)
}

/// Render footer
fn render_footer() -> String {
    r#"<footer>
    <p>Generated by tablefilter</p>
</footer>"#
        .to_string()
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
