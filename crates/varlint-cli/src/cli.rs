//! Command-line arguments and the top-level run.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use varlint_kernel::ExprPredicate;

use crate::config::{Config, OutputFormat, Overrides, Settings};
use crate::lint::{LintReport, Linter};
use crate::loader;
use crate::report;

/// Validate a variable tree against declarative lint rules.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "varlint", version, about)]
pub struct Cli {
    /// Variables file (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub vars: Option<PathBuf>,

    /// Rule file; repeat to apply several in order
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: Vec<PathBuf>,

    /// Configuration file [default: ./varlint.toml if present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Fail on informational issues too
    #[arg(long)]
    pub strict: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            vars: self.vars.clone(),
            rules: self.rules.clone(),
            format: self.format,
            no_color: self.no_color,
            strict: self.strict,
        }
    }
}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Passed => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::from(1),
        }
    }
}

/// Exit code for runs that could not complete.
pub const ERROR_EXIT_CODE: u8 = 2;

/// Decide whether a report fails the run.
pub fn outcome(report: &LintReport, strict: bool) -> Outcome {
    if report.has_fatal() || (strict && !report.is_clean()) {
        Outcome::Failed
    } else {
        Outcome::Passed
    }
}

/// Load everything, lint, and write the report to `out`.
///
/// `dir` is where `varlint.toml` is looked for when no `--config` is given.
pub fn run(cli: &Cli, dir: &Path, out: &mut dyn Write) -> Result<Outcome> {
    let config =
        Config::discover(cli.config.as_deref(), dir).context("Failed to load configuration")?;
    let settings = Settings::resolve(cli.overrides(), config)?;
    tracing::debug!(?settings, "resolved settings");

    let vars = loader::load_vars(&settings.vars).context("Failed to load variables")?;
    let rules =
        loader::load_rule_files(&settings.rules, &vars).context("Failed to load rules")?;

    let predicate = ExprPredicate::new();
    let report = Linter::new(&predicate)
        .lint(&rules, &vars)
        .context("Lint run failed")?;

    tracing::info!(
        rules = rules.len(),
        issues = report.issues.len(),
        fatal = report.fatal_count(),
        inspected = report.inspected,
        "lint complete"
    );

    report::reporter(settings.format, settings.color)
        .report(&report, out)
        .context("Failed to write report")?;

    Ok(outcome(&report, settings.strict))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use varlint_types::{Issue, RuleKind};

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_rules() {
        let cli = Cli::try_parse_from([
            "varlint", "--vars", "v.yml", "--rules", "a.yml", "--rules", "b.yml", "--format",
            "json", "--no-color", "--strict",
        ])
        .unwrap();
        assert_eq!(cli.vars, Some(PathBuf::from("v.yml")));
        assert_eq!(cli.rules, vec![PathBuf::from("a.yml"), PathBuf::from("b.yml")]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(cli.no_color);
        assert!(cli.strict);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["varlint", "--format", "xml"]).is_err());
    }

    #[test]
    fn outcome_rules() {
        let clean = LintReport::default();
        assert_eq!(outcome(&clean, true), Outcome::Passed);

        let mut info = LintReport::default();
        info.issues.push(Issue::new(RuleKind::Deprecated, "a", "old"));
        assert_eq!(outcome(&info, false), Outcome::Passed);
        assert_eq!(outcome(&info, true), Outcome::Failed);

        let mut fatal = LintReport::default();
        fatal.issues.push(Issue::new(RuleKind::Required, "a", "missing"));
        assert_eq!(outcome(&fatal, false), Outcome::Failed);
    }
}
