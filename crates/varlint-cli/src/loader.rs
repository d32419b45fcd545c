//! Reading variable and rule files from disk.

use std::fs;
use std::path::{Path, PathBuf};

use varlint_types::Value;

use crate::rules::{Rule, RuleError, parse_rules};
use crate::template::{self, TemplateError};

/// On-disk document formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.yml` and `.yaml` are YAML; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: variables must be a mapping at the top level, got {got}", path.display())]
    NotAMapping { path: PathBuf, got: &'static str },

    #[error("{}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error("{}: {source}", path.display())]
    Rules {
        path: PathBuf,
        #[source]
        source: RuleError,
    },
}

/// Parse document text in the given format.
///
/// `path` only labels errors.
pub fn parse_document(text: &str, format: Format, path: &Path) -> Result<Value, LoadError> {
    match format {
        Format::Yaml => {
            let yaml_error = |source| LoadError::Yaml {
                path: path.to_path_buf(),
                source,
            };
            // `<<: *anchor` merge keys are folded in before conversion
            let mut document: serde_yaml::Value = serde_yaml::from_str(text).map_err(yaml_error)?;
            document.apply_merge().map_err(yaml_error)?;
            serde_yaml::from_value(document).map_err(yaml_error)
        }
        Format::Json => serde_json::from_str(text).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a variables file. The top level must be a mapping.
pub fn load_vars(path: &Path) -> Result<Value, LoadError> {
    let text = read(path)?;
    let vars = parse_document(&text, Format::from_path(path), path)?;

    if !vars.is_mapping() {
        return Err(LoadError::NotAMapping {
            path: path.to_path_buf(),
            got: vars.type_name(),
        });
    }

    tracing::debug!(path = %path.display(), variables = vars.keys().count(), "loaded variables");
    Ok(vars)
}

/// Load one rule file, rendering `{{ }}` placeholders against `vars` first.
pub fn load_rules(path: &Path, vars: &Value) -> Result<Vec<Rule>, LoadError> {
    let text = read(path)?;
    let rendered = template::render(&text, vars).map_err(|source| LoadError::Template {
        path: path.to_path_buf(),
        source,
    })?;

    let document = parse_document(&rendered, Format::from_path(path), path)?;
    let rules = parse_rules(&document).map_err(|source| LoadError::Rules {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), rules = rules.len(), "loaded rules");
    Ok(rules)
}

/// Load several rule files and concatenate their rules in order.
pub fn load_rule_files<P: AsRef<Path>>(paths: &[P], vars: &Value) -> Result<Vec<Rule>, LoadError> {
    let mut rules = Vec::new();
    for path in paths {
        rules.extend(load_rules(path.as_ref(), vars)?);
    }
    Ok(rules)
}
