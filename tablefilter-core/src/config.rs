//! Configuration file support for tablefilter
//!
//! Loads data-directory configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.tablefilterrc.json` in the data directory
//! 3. `tablefilter.config.json` in the data directory
//!
//! All fields are optional.

use crate::availability::{InertFields, DEFAULT_NOT_APPLICABLE_ON_TOOLS};
use crate::load::{
    DataSources, DataStore, DEFAULT_ORDERING_FILE, DEFAULT_PAPERS_FILE, DEFAULT_TOOLS_FILE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_LINK_DISPLAY_CHARS: usize = 50;
const DEFAULT_DOI_DISPLAY_CHARS: usize = 30;

/// tablefilter configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    /// Papers collection, relative to the data directory (default: data-research.json)
    #[serde(default)]
    pub papers: Option<String>,

    /// Tools collection, relative to the data directory (default: data-tools.json)
    #[serde(default)]
    pub tools: Option<String>,

    /// Ordering descriptor, relative to the data directory (default: ordering.json)
    #[serde(default)]
    pub ordering: Option<String>,

    /// Filter fields shown as "not applicable" on the tools tab
    #[serde(default)]
    pub not_applicable_on_tools: Option<Vec<String>>,

    /// Derive the not-applicable fields from the tools data instead
    #[serde(default)]
    pub derive_not_applicable: bool,

    /// Trim whitespace around comma-split values when highlighting
    #[serde(default)]
    pub trim_highlight_tokens: bool,

    /// Characters of a tool link shown before the ellipsis (default: 50)
    #[serde(default)]
    pub link_display_chars: Option<usize>,

    /// Characters of a non-doi.org paper link shown before the ellipsis (default: 30)
    #[serde(default)]
    pub doi_display_chars: Option<usize>,
}

/// Where the not-applicable fields come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InertFieldSource {
    Fixed(Vec<String>),
    Derived,
}

/// Resolved configuration with defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub papers_file: String,
    pub tools_file: String,
    pub ordering_file: String,
    pub inert_fields: InertFieldSource,
    pub trim_highlight_tokens: bool,
    pub link_display_chars: usize,
    pub doi_display_chars: usize,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

/// Settings consumed while computing and rendering a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub inert: InertFields,
    pub trim_highlight_tokens: bool,
    pub link_display_chars: usize,
    pub doi_display_chars: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        ViewOptions {
            inert: InertFields::defaults(),
            trim_highlight_tokens: false,
            link_display_chars: DEFAULT_LINK_DISPLAY_CHARS,
            doi_display_chars: DEFAULT_DOI_DISPLAY_CHARS,
        }
    }
}

impl TableConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("papers", &self.papers),
            ("tools", &self.tools),
            ("ordering", &self.ordering),
        ] {
            if let Some(v) = value {
                if v.trim().is_empty() {
                    anyhow::bail!("{} must not be empty", name);
                }
            }
        }

        for (name, value) in [
            ("link_display_chars", self.link_display_chars),
            ("doi_display_chars", self.doi_display_chars),
        ] {
            if value == Some(0) {
                anyhow::bail!("{} must be positive (got 0)", name);
            }
        }

        if self.derive_not_applicable && self.not_applicable_on_tools.is_some() {
            anyhow::bail!("not_applicable_on_tools cannot be combined with derive_not_applicable");
        }

        if let Some(ref fields) = self.not_applicable_on_tools {
            if fields.iter().any(|f| f.trim().is_empty()) {
                anyhow::bail!("not_applicable_on_tools must not contain empty field names");
            }
        }

        Ok(())
    }

    /// Resolve config into a form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let inert_fields = if self.derive_not_applicable {
            InertFieldSource::Derived
        } else {
            InertFieldSource::Fixed(self.not_applicable_on_tools.clone().unwrap_or_else(|| {
                DEFAULT_NOT_APPLICABLE_ON_TOOLS
                    .iter()
                    .map(|f| f.to_string())
                    .collect()
            }))
        };

        Ok(ResolvedConfig {
            papers_file: self
                .papers
                .clone()
                .unwrap_or_else(|| DEFAULT_PAPERS_FILE.to_string()),
            tools_file: self
                .tools
                .clone()
                .unwrap_or_else(|| DEFAULT_TOOLS_FILE.to_string()),
            ordering_file: self
                .ordering
                .clone()
                .unwrap_or_else(|| DEFAULT_ORDERING_FILE.to_string()),
            inert_fields,
            trim_highlight_tokens: self.trim_highlight_tokens,
            link_display_chars: self.link_display_chars.unwrap_or(DEFAULT_LINK_DISPLAY_CHARS),
            doi_display_chars: self.doi_display_chars.unwrap_or(DEFAULT_DOI_DISPLAY_CHARS),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Resource paths inside a data directory
    pub fn sources(&self, data_dir: &Path) -> DataSources {
        DataSources {
            papers: data_dir.join(&self.papers_file),
            tools: data_dir.join(&self.tools_file),
            ordering: data_dir.join(&self.ordering_file),
        }
    }

    /// View settings for a loaded store
    pub fn view_options(&self, store: &DataStore) -> ViewOptions {
        let inert = match (&self.inert_fields, &store.catalog) {
            (InertFieldSource::Fixed(fields), _) => InertFields::fixed(fields),
            (InertFieldSource::Derived, Some(catalog)) => {
                InertFields::derive_from(&store.tools, catalog)
            }
            (InertFieldSource::Derived, None) => InertFields::default(),
        };
        ViewOptions {
            inert,
            trim_highlight_tokens: self.trim_highlight_tokens,
            link_display_chars: self.link_display_chars,
            doi_display_chars: self.doi_display_chars,
        }
    }
}

/// Discover and load a config file from the data directory
///
/// Search order:
/// 1. `.tablefilterrc.json`
/// 2. `tablefilter.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(data_dir: &Path) -> Result<Option<(TableConfig, PathBuf)>> {
    for name in [".tablefilterrc.json", "tablefilter.config.json"] {
        let path = data_dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<TableConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: TableConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a data directory
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the data directory.
/// Returns default config if nothing is found.
pub fn load_and_resolve(data_dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(data_dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (TableConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
