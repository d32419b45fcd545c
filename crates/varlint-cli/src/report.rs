//! Writing lint reports for humans and machines.

use std::io::{self, Write};

use owo_colors::{OwoColorize, Style};
use varlint_types::{Issue, RuleKind, Severity};

use crate::config::OutputFormat;
use crate::lint::LintReport;

/// Something that can write a [`LintReport`].
pub trait Reporter {
    fn report(&self, report: &LintReport, out: &mut dyn Write) -> io::Result<()>;
}

/// Build the reporter for an output format.
pub fn reporter(format: OutputFormat, color: bool) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Text => Box::new(TextReporter::new(color)),
        OutputFormat::Json => Box::new(JsonReporter),
    }
}

/// Banner printed above the issues of a rule.
pub fn banner(kind: RuleKind) -> &'static str {
    match kind {
        RuleKind::Deprecated => "DEPRECATION NOTICE",
        RuleKind::Suspicious => "SUSPICIOUS VALUE",
        RuleKind::Required => "MISSING REQUIRED VARIABLE",
        RuleKind::Invalid => "INVALID VALUE",
    }
}

/// Plain text, one block per rule:
///
/// ```text
/// [DEPRECATION NOTICE] stop using foo!
/// - foo
///
/// 1 issue(s) (0 fatal) in 2 inspected variable(s)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReporter {
    color: bool,
}

impl TextReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn write_styled(&self, out: &mut dyn Write, text: &str, style: Style) -> io::Result<()> {
        if self.color {
            write!(out, "{}", text.style(style))
        } else {
            write!(out, "{text}")
        }
    }

    fn banner_style(kind: RuleKind) -> Style {
        match kind.severity() {
            Severity::Info => Style::new().yellow().bold(),
            Severity::Fatal => Style::new().red().bold(),
        }
    }

    fn write_group(&self, group: &[Issue], out: &mut dyn Write) -> io::Result<()> {
        let mut current: Option<&str> = None;

        for issue in group {
            // Captures can make messages differ within one rule
            if current != Some(issue.msg.as_str()) {
                if current.is_some() {
                    writeln!(out)?;
                }
                let line = format!("[{}] {}", banner(issue.kind), issue.msg);
                self.write_styled(out, &line, Self::banner_style(issue.kind))?;
                writeln!(out)?;
                current = Some(issue.msg.as_str());
            }
            write!(out, "- ")?;
            self.write_styled(out, &issue.path, Style::new().cyan())?;
            writeln!(out)?;
        }

        writeln!(out)
    }
}

impl Reporter for TextReporter {
    fn report(&self, report: &LintReport, out: &mut dyn Write) -> io::Result<()> {
        for group in report.by_rule() {
            self.write_group(group, out)?;
        }

        let summary = format!(
            "{} issue(s) ({} fatal) in {} inspected variable(s)",
            report.issues.len(),
            report.fatal_count(),
            report.inspected
        );
        let style = if report.has_fatal() {
            Style::new().red()
        } else if report.is_clean() {
            Style::new().green()
        } else {
            Style::new().yellow()
        };
        self.write_styled(out, &summary, style)?;
        writeln!(out)
    }
}

/// Pretty-printed JSON of the whole report.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, report: &LintReport, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)
    }
}
