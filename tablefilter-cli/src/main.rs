//! tablefilter CLI - render filtered and sorted papers/tools tables

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Logs go to stderr; stdout carries only rendered output

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tablefilter_core::config::{self, InertFieldSource};
use tablefilter_core::html::render_html;
use tablefilter_core::state::parse_filter_pair;
use tablefilter_core::{render_json, render_text, Action, DatasetKind, Session, ViewState};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

#[derive(Parser)]
#[command(name = "tablefilter")]
#[command(about = "Filter, sort and render the research papers and practice tools tables")]
#[command(version = env!("TABLEFILTER_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct DataArgs {
    /// Directory holding the papers, tools and ordering JSON files
    data_dir: PathBuf,

    /// Path to config file (default: auto-discover in the data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail instead of rendering an empty page when a collection cannot be loaded
    #[arg(long)]
    strict: bool,
}

#[derive(clap::Args)]
struct StateArgs {
    /// Active filter as FIELD=VALUE (repeatable)
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    filters: Vec<String>,

    /// Sort column as TABLE:COLUMN, e.g. papers:Year
    #[arg(long, value_name = "TABLE:COLUMN")]
    sort: Option<String>,

    /// Sort descending (requires --sort)
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Visible tab
    #[arg(long, default_value = "papers")]
    tab: TabArg,

    /// Highlight the filters of a rendered row, as TABLE:INDEX
    #[arg(long, value_name = "TABLE:INDEX")]
    select: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render both tables and the filter buttons for one state
    Render {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        state: StateArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Output file path (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay actions, one per line, printing the view after each
    Session {
        #[command(flatten)]
        data: DataArgs,

        /// File of actions (default: stdin)
        #[arg(long)]
        script: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the availability of every filter button
    Buttons {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        state: StateArgs,
    },
    /// Validate or show a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without loading data
    Validate {
        /// Data directory searched for a config file (default: current directory)
        data_dir: Option<PathBuf>,

        /// Path to config file (default: auto-discover in the data directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Data directory searched for a config file (default: current directory)
        data_dir: Option<PathBuf>,

        /// Path to config file (default: auto-discover in the data directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum TabArg {
    Papers,
    Tools,
}

impl From<TabArg> for DatasetKind {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Papers => DatasetKind::Papers,
            TabArg::Tools => DatasetKind::Tools,
        }
    }
}

/// Install the tracing subscriber; RUST_LOG overrides the default level
fn start_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let subscriber = Registry::default().with(
        fmt::layer()
            .without_time()
            .with_writer(std::io::stderr)
            .with_filter(filter),
    );
    tracing::subscriber::set_global_default(subscriber)
        .context("unable to set global tracing subscriber")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    start_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            data,
            state,
            format,
            output,
        } => {
            let session = open_session(&data)?;
            let view_state = build_state(&session, &state)?;
            let view = session.view(&view_state);

            let rendered = match format {
                OutputFormat::Text => render_text(&view),
                OutputFormat::Json => render_json(&view),
                OutputFormat::Html => render_html(&view, &session.options),
            };

            match output {
                Some(path) => {
                    write_output(&path, &rendered)?;
                    tracing::info!("wrote {}", path.display());
                }
                None => print!("{}", ensure_trailing_newline(rendered)),
            }
        }
        Commands::Session {
            data,
            script,
            format,
        } => {
            if matches!(format, OutputFormat::Html) {
                anyhow::bail!("HTML format is not supported for sessions; use render --format html");
            }
            let session = open_session(&data)?;
            let lines: Vec<String> = match &script {
                Some(path) => {
                    let file = std::fs::File::open(path)
                        .with_context(|| format!("failed to open script: {}", path.display()))?;
                    BufReader::new(file)
                        .lines()
                        .collect::<Result<_, _>>()
                        .with_context(|| format!("failed to read script: {}", path.display()))?
                }
                None => std::io::stdin()
                    .lock()
                    .lines()
                    .collect::<Result<_, _>>()
                    .context("failed to read actions from stdin")?,
            };
            let stdout = std::io::stdout();
            run_session(&session, &lines, format, &mut stdout.lock())?;
        }
        Commands::Buttons { data, state } => {
            let session = open_session(&data)?;
            let view_state = build_state(&session, &state)?;
            let view = session.view(&view_state);

            if view.filters.is_empty() {
                println!("No filters (ordering data missing)");
                return Ok(());
            }

            println!(
                "{:<24} {:<24} {:<8} {:<16} {}",
                "FIELD", "VALUE", "ACTIVE", "STATE", "HIGHLIGHT"
            );
            for button in view.buttons() {
                println!(
                    "{:<24} {:<24} {:<8} {:<16} {}",
                    button.field,
                    button.value,
                    if button.active { "yes" } else { "no" },
                    button.state.as_str(),
                    if button.highlighted { "yes" } else { "" },
                );
            }
            println!(
                "\n{} of {} buttons disabled",
                view.disabled_count(),
                view.buttons().count()
            );
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { data_dir, path } => {
                match resolve_config(data_dir, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { data_dir, path } => {
                let resolved =
                    resolve_config(data_dir, path.as_deref()).context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!();
                println!("Data files:");
                println!("  papers: {}", resolved.papers_file);
                println!("  tools: {}", resolved.tools_file);
                println!("  ordering: {}", resolved.ordering_file);
                println!();
                println!("Filters:");
                match &resolved.inert_fields {
                    InertFieldSource::Fixed(fields) => {
                        println!("  not applicable on tools: {}", fields.join(", "))
                    }
                    InertFieldSource::Derived => {
                        println!("  not applicable on tools: derived from tools data")
                    }
                }
                println!("  trim highlight tokens: {}", resolved.trim_highlight_tokens);
                println!();
                println!("Display:");
                println!("  link chars: {}", resolved.link_display_chars);
                println!("  doi chars: {}", resolved.doi_display_chars);
            }
        },
    }

    Ok(())
}

/// Resolve configuration the way `render` does, from a data directory
fn resolve_config(
    data_dir: Option<PathBuf>,
    path: Option<&Path>,
) -> anyhow::Result<config::ResolvedConfig> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    config::load_and_resolve(&data_dir, path)
}

fn open_session(data: &DataArgs) -> anyhow::Result<Session> {
    if !data.data_dir.is_dir() {
        anyhow::bail!("Data directory does not exist: {}", data.data_dir.display());
    }
    let session = tablefilter_core::open(&data.data_dir, data.config.as_deref(), data.strict)?;
    if let Some(config_path) = &session.config.config_path {
        tracing::info!("using config: {}", config_path.display());
    }
    Ok(session)
}

/// Turn state flags into the clicks that produce that state
fn state_actions(args: &StateArgs) -> anyhow::Result<Vec<Action>> {
    let mut actions = Vec::new();

    let mut seen = std::collections::BTreeSet::new();
    for raw in &args.filters {
        let (field, value) = parse_filter_pair(raw)?;
        // A repeated flag must not toggle the filter back off
        if seen.insert((field.clone(), value.clone())) {
            actions.push(Action::ToggleFilter { field, value });
        }
    }

    actions.push(Action::SwitchTab(args.tab.into()));

    if let Some(sort) = &args.sort {
        let (table, column) = split_target(sort, "TABLE:COLUMN")?;
        let header = Action::ClickHeader {
            table,
            column: column.to_string(),
        };
        actions.push(header.clone());
        if args.desc {
            actions.push(header);
        }
    }

    if let Some(select) = &args.select {
        let (table, index) = split_target(select, "TABLE:INDEX")?;
        let row = index
            .parse()
            .with_context(|| format!("invalid row index '{}'", index))?;
        actions.push(Action::SelectRow { table, row });
    }

    Ok(actions)
}

fn split_target<'a>(raw: &'a str, expected: &str) -> anyhow::Result<(DatasetKind, &'a str)> {
    let (table, rest) = raw
        .split_once(':')
        .with_context(|| format!("expected {}, got '{}'", expected, raw))?;
    Ok((table.parse()?, rest.trim()))
}

fn build_state(session: &Session, args: &StateArgs) -> anyhow::Result<ViewState> {
    let actions = state_actions(args)?;
    if let Some(Action::ClickHeader { table, column }) = actions
        .iter()
        .find(|a| matches!(a, Action::ClickHeader { .. }))
    {
        if tablefilter_core::sort::sortable_field(*table, column).is_none() {
            anyhow::bail!("column '{}' of the {} table is not sortable", column, table);
        }
    }
    ViewState::new().apply_all(&actions, &session.store, &session.options)
}

/// Actions of a session script with their 1-based line numbers
///
/// Blank lines and `#` comments are skipped.
fn parse_script(lines: &[String]) -> anyhow::Result<Vec<(usize, Action)>> {
    let mut actions = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let action: Action = line
            .parse()
            .with_context(|| format!("line {}: invalid action", index + 1))?;
        actions.push((index + 1, action));
    }
    Ok(actions)
}

fn run_session(
    session: &Session,
    lines: &[String],
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let actions = parse_script(lines)?;
    if actions.is_empty() {
        tracing::warn!("no actions given");
        return Ok(());
    }

    let mut state = ViewState::new();
    for (position, (number, action)) in actions.iter().enumerate() {
        state = session
            .apply(&state, action)
            .with_context(|| format!("line {}: failed to apply '{}'", number, action))?;
        tracing::debug!(%action, "applied");

        let view = session.view(&state);
        match format {
            OutputFormat::Json => writeln!(out, "{}", render_json(&view))?,
            OutputFormat::Text | OutputFormat::Html => {
                if position > 0 {
                    writeln!(out)?;
                }
                writeln!(out, "> {}", action)?;
                write!(out, "{}", render_text(&view))?;
            }
        }
    }
    Ok(())
}

fn ensure_trailing_newline(mut s: String) -> String {
    if !s.ends_with('\n') {
        s.push('\n');
    }
    s
}

/// Write output to file with atomic write pattern
fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("tests")
            .join("fixtures")
            .join("meetings")
    }

    fn session() -> Session {
        tablefilter_core::open(&fixture_dir(), None, true).unwrap()
    }

    fn state_args(filters: &[&str], sort: Option<&str>, desc: bool) -> StateArgs {
        StateArgs {
            filters: filters.iter().map(|f| f.to_string()).collect(),
            sort: sort.map(str::to_string),
            desc,
            tab: TabArg::Papers,
            select: None,
        }
    }

    fn lines(script: &[&str]) -> Vec<String> {
        script.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_repeated_filter_flag_toggles_once() {
        let args = state_args(&["Outcome=Positive", "Outcome=Positive"], None, false);
        let actions = state_actions(&args).unwrap();
        let toggles = actions
            .iter()
            .filter(|a| matches!(a, Action::ToggleFilter { .. }))
            .count();
        assert_eq!(toggles, 1);

        let state = build_state(&session(), &args).unwrap();
        assert!(state.selection.is_active("Outcome", "Positive"));
    }

    #[test]
    fn test_desc_clicks_header_twice() {
        let actions = state_actions(&state_args(&[], Some("papers:Year"), true)).unwrap();
        let clicks: Vec<&Action> = actions
            .iter()
            .filter(|a| matches!(a, Action::ClickHeader { .. }))
            .collect();
        assert_eq!(clicks.len(), 2);

        let state = build_state(&session(), &state_args(&[], Some("papers:Year"), true)).unwrap();
        assert_eq!(
            state.sort.effective(DatasetKind::Papers),
            ("Year", false)
        );
    }

    #[test]
    fn test_desc_requires_sort() {
        assert!(Cli::try_parse_from(["tablefilter", "render", "data", "--desc"]).is_err());
        assert!(
            Cli::try_parse_from(["tablefilter", "render", "data", "--sort", "papers:Year", "--desc"])
                .is_ok()
        );
    }

    #[test]
    fn test_sort_on_unsortable_column_rejected() {
        let session = session();
        for target in ["papers:DOI", "tools:Link"] {
            let err = build_state(&session, &state_args(&[], Some(target), false)).unwrap_err();
            assert!(format!("{:#}", err).contains("not sortable"), "{}", target);
        }
        assert!(state_actions(&state_args(&[], Some("papers-Year"), false)).is_err());
    }

    #[test]
    fn test_script_skips_blank_lines_and_comments() {
        let script = lines(&["# set up", "", "toggle Outcome=Positive", "   ", "  # sort", "sort papers Year"]);
        let actions = parse_script(&script).unwrap();
        let numbers: Vec<usize> = actions.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![3, 6]);
    }

    #[test]
    fn test_script_parse_error_names_line() {
        let script = lines(&["reset", "", "jump papers"]);
        let err = parse_script(&script).unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
    }

    #[test]
    fn test_session_apply_error_names_line() {
        let script = lines(&["toggle Outcome=Positive", "select papers 9"]);
        let mut out = Vec::new();
        let err = run_session(&session(), &script, OutputFormat::Text, &mut out).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("line 2"), "{}", message);
        assert!(message.contains("select papers 9"), "{}", message);
    }

    #[test]
    fn test_session_prints_view_after_each_action() {
        let script = lines(&["# filters", "toggle Outcome=Positive", "reset"]);
        let mut out = Vec::new();
        run_session(&session(), &script, OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("> toggle Outcome=Positive\n"));
        assert!(text.contains("Showing 2 of 4 papers"));
        assert!(text.contains("\n\n> reset\n"));
        assert!(text.contains("Showing all 4 papers"));
    }

    #[test]
    fn test_config_commands_discover_in_data_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".tablefilterrc.json"),
            r#"{"papers": "papers.json"}"#,
        )
        .unwrap();

        let resolved = resolve_config(Some(temp.path().to_path_buf()), None).unwrap();
        assert_eq!(resolved.papers_file, "papers.json");
        assert_eq!(
            resolved.config_path,
            Some(temp.path().join(".tablefilterrc.json"))
        );

        let cli = Cli::try_parse_from(["tablefilter", "config", "show", "some/dir"]).unwrap();
        match cli.command {
            Commands::Config {
                action: ConfigAction::Show { data_dir, path },
            } => {
                assert_eq!(data_dir, Some(PathBuf::from("some/dir")));
                assert!(path.is_none());
            }
            _ => panic!("expected config show"),
        }
    }
}
