//! Configuration file and settings resolution.
//!
//! Settings come from three places, highest precedence first: command-line
//! flags, the TOML config file, built-in defaults.
//!
//! ```toml
//! vars = "group_vars/all.yml"
//! rules = ["lint/deprecations.yml", "lint/required.yml"]
//! format = "text"
//! color = true
//! strict = false
//! ```
//!
//! Relative paths in the file are relative to the file's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "varlint.toml";

/// How the report is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no {0} given; pass --{0} or set `{0}` in the configuration file")]
    Missing(&'static str),
}

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub vars: Option<PathBuf>,
    pub rules: Vec<PathBuf>,
    pub format: OutputFormat,
    pub color: bool,
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vars: None,
            rules: Vec::new(),
            format: OutputFormat::Text,
            color: true,
            strict: false,
        }
    }
}

impl Config {
    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file, anchoring relative paths at
    /// the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Load the explicit config file if given, else `varlint.toml` in
    /// `dir` if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading configuration");
            return Self::from_file(path);
        }

        let implicit = dir.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            tracing::debug!(path = %implicit.display(), "loading configuration");
            return Self::from_file(&implicit);
        }

        Ok(Self::default())
    }

    fn relative_to(self, base: &Path) -> Self {
        Self {
            vars: self.vars.map(|p| base.join(p)),
            rules: self.rules.into_iter().map(|p| base.join(p)).collect(),
            ..self
        }
    }
}

/// Command-line overrides, as parsed by clap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub vars: Option<PathBuf>,
    pub rules: Vec<PathBuf>,
    pub format: Option<OutputFormat>,
    pub no_color: bool,
    pub strict: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub vars: PathBuf,
    pub rules: Vec<PathBuf>,
    pub format: OutputFormat,
    pub color: bool,
    pub strict: bool,
}

impl Settings {
    /// Merge flags over config. Rule files given on the command line
    /// replace those in the config rather than adding to them.
    pub fn resolve(overrides: Overrides, config: Config) -> Result<Self, ConfigError> {
        let vars = overrides
            .vars
            .or(config.vars)
            .ok_or(ConfigError::Missing("vars"))?;

        let rules = if overrides.rules.is_empty() {
            config.rules
        } else {
            overrides.rules
        };
        if rules.is_empty() {
            return Err(ConfigError::Missing("rules"));
        }

        Ok(Self {
            vars,
            rules,
            format: overrides.format.unwrap_or(config.format),
            color: config.color && !overrides.no_color,
            strict: config.strict || overrides.strict,
        })
    }
}
