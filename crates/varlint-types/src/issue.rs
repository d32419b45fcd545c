//! Rule kinds, severities and the issues rules produce.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How bad an issue is.
///
/// `Info` issues are reported but do not fail a run; `Fatal` ones do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// The kind of a rule, which fixes what a match means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// The variable still exists but should not be used any more.
    Deprecated,
    /// The variable holds a value that is probably a mistake.
    Suspicious,
    /// The variable must exist.
    Required,
    /// The variable holds a value that is not allowed.
    Invalid,
}

impl RuleKind {
    pub const ALL: [RuleKind; 4] = [
        RuleKind::Deprecated,
        RuleKind::Suspicious,
        RuleKind::Required,
        RuleKind::Invalid,
    ];

    pub fn severity(self) -> Severity {
        match self {
            RuleKind::Deprecated | RuleKind::Suspicious => Severity::Info,
            RuleKind::Required | RuleKind::Invalid => Severity::Fatal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Deprecated => "deprecated",
            RuleKind::Suspicious => "suspicious",
            RuleKind::Required => "required",
            RuleKind::Invalid => "invalid",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule kind: {0}")]
pub struct UnknownRuleKind(pub String);

impl FromStr for RuleKind {
    type Err = UnknownRuleKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownRuleKind(s.to_string()))
    }
}

/// A single problem found in a variable tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub severity: Severity,
    pub path: String,
    pub msg: String,
}

impl Issue {
    pub fn new(kind: RuleKind, path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            path: path.into(),
            msg: msg.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}
