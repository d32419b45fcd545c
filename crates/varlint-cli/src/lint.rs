//! Running rules against a variable tree.

use std::ops::Range;

use serde::Serialize;
use varlint_kernel::{Predicate, PredicateError, Query};
use varlint_types::{Issue, RuleKind, SelectionItem, Value};

use crate::rules::Rule;

/// A rule's condition failed to evaluate.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error("rule #{rule} ({kind} {path}): {source}")]
    Predicate {
        rule: usize,
        kind: RuleKind,
        path: String,
        #[source]
        source: PredicateError,
    },
}

/// Everything a lint run found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LintReport {
    pub issues: Vec<Issue>,
    /// Selection items resolved across all rules, matched or not.
    pub inspected: usize,
    /// Issue ranges, one per rule that produced issues.
    #[serde(skip)]
    groups: Vec<Range<usize>>,
}

impl LintReport {
    pub fn has_fatal(&self) -> bool {
        self.issues.iter().any(Issue::is_fatal)
    }

    pub fn fatal_count(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_fatal()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues grouped by the rule that raised them, in rule order.
    /// Rules without issues are skipped.
    pub fn by_rule(&self) -> impl Iterator<Item = &[Issue]> {
        self.groups.iter().map(|range| &self.issues[range.clone()])
    }

    /// Paths reported by rules of one kind.
    pub fn paths(&self, kind: RuleKind) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.kind == kind)
            .map(|issue| issue.path.as_str())
            .collect()
    }

    fn push_group(&mut self, issues: Vec<Issue>) {
        if issues.is_empty() {
            return;
        }
        let start = self.issues.len();
        self.issues.extend(issues);
        self.groups.push(start..self.issues.len());
    }
}

/// Applies rules to variable trees with a given predicate evaluator.
pub struct Linter<'p> {
    predicate: &'p dyn Predicate,
}

impl<'p> Linter<'p> {
    pub fn new(predicate: &'p dyn Predicate) -> Self {
        Self { predicate }
    }

    /// Run every rule in order.
    pub fn lint(&self, rules: &[Rule], vars: &Value) -> Result<LintReport, LintError> {
        let mut report = LintReport::default();

        for (index, rule) in rules.iter().enumerate() {
            let (inspected, issues) = self.check(rule, vars).map_err(|source| {
                LintError::Predicate {
                    rule: index,
                    kind: rule.kind,
                    path: rule.path.to_string(),
                    source,
                }
            })?;

            tracing::debug!(
                rule = index,
                kind = %rule.kind,
                path = %rule.path,
                inspected,
                issues = issues.len(),
                "rule checked"
            );

            report.inspected += inspected;
            report.push_group(issues);
        }

        Ok(report)
    }

    fn check(&self, rule: &Rule, vars: &Value) -> Result<(usize, Vec<Issue>), PredicateError> {
        let query = Query::new(vars, self.predicate).select(rule.path.clone());
        let query = match &rule.when {
            Some(when) => query.filter(when.as_str()),
            None => query,
        };

        let wanted: fn(&SelectionItem) -> bool = match rule.kind {
            RuleKind::Deprecated | RuleKind::Suspicious | RuleKind::Invalid => {
                SelectionItem::is_defined
            }
            RuleKind::Required => |item| !item.is_defined(),
        };

        let (inspected, selected) = query.commit_counted()?;
        let issues = selected
            .into_iter()
            .filter(wanted)
            .map(|item| {
                let msg = substitute(&rule.msg, &item.captures);
                Issue::new(rule.kind, item.path, msg)
            })
            .collect();

        Ok((inspected, issues))
    }
}

/// Replace `$1`..`$9` with the matching capture.
///
/// References past the last capture are left as written.
pub fn substitute(msg: &str, captures: &[String]) -> String {
    let mut out = String::with_capacity(msg.len());
    let mut chars = msg.chars().peekable();

    while let Some(c) = chars.next() {
        let capture = match (c, chars.peek()) {
            ('$', Some(d @ '1'..='9')) => d
                .to_digit(10)
                .and_then(|n| captures.get(n as usize - 1)),
            _ => None,
        };
        match capture {
            Some(capture) => {
                out.push_str(capture);
                chars.next();
            }
            None => out.push(c),
        }
    }
    out
}
