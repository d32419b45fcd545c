//! varlint: lint automation variables against declarative rules.
//!
//! Rules live in YAML or JSON files:
//!
//! ```yaml
//! - deprecated:
//!     path: kong_applications.*.backend.address
//!     when: item is search('dockerhost')
//!     msg: use "lvh.me" instead of "dockerhost"!
//! ```
//!
//! Each rule selects variables with a wildcard path, optionally narrows
//! them with a predicate expression, and reports what is left.

pub mod cli;
pub mod config;
pub mod lint;
pub mod loader;
pub mod report;
pub mod rules;
pub mod template;

pub use cli::{Cli, ERROR_EXIT_CODE, Outcome, outcome, run};
pub use config::{Config, ConfigError, OutputFormat, Settings};
pub use lint::{LintError, LintReport, Linter};
pub use loader::LoadError;
pub use report::{JsonReporter, Reporter, TextReporter};
pub use rules::{Rule, RuleError};
pub use template::TemplateError;
