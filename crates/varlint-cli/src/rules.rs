//! Rule definitions and their validation.
//!
//! A rule document is a list of single-key mappings; the key names the
//! rule kind and the value holds its arguments:
//!
//! ```yaml
//! - deprecated:
//!     path: secrets.jfrog.*
//!     msg: 'rename to "artifactory_$1"'
//! - invalid:
//!     path: token
//!     when: 'item =~ "\\s"'
//!     msg: no whitespace allowed
//! ```

use varlint_kernel::PathExpr;
use varlint_types::{RuleKind, UnknownRuleKind, Value};

/// A validated lint rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub kind: RuleKind,
    pub path: PathExpr,
    pub msg: String,
    /// Predicate expression narrowing which items the rule reports.
    pub when: Option<String>,
}

impl Rule {
    pub fn new(kind: RuleKind, path: impl Into<PathExpr>, msg: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            msg: msg.into(),
            when: None,
        }
    }

    /// Attach a condition.
    pub fn when(mut self, expression: impl Into<String>) -> Self {
        self.when = Some(expression.into());
        self
    }
}

/// Problems with a rule document. `index` is the zero-based position of
/// the offending rule in its document.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("rule document must be a list of rules, got {0}")]
    NotAList(&'static str),

    #[error("rule #{index}: expected a mapping with exactly one rule kind, got {got}")]
    Shape { index: usize, got: String },

    #[error("rule #{index}: {source}")]
    UnknownKind {
        index: usize,
        #[source]
        source: UnknownRuleKind,
    },

    #[error("rule #{index} ({kind}): arguments must be a mapping, got {got}")]
    Arguments {
        index: usize,
        kind: RuleKind,
        got: &'static str,
    },

    #[error("rule #{index} ({kind}): `{field}` is required")]
    MissingField {
        index: usize,
        kind: RuleKind,
        field: &'static str,
    },

    #[error("rule #{index} ({kind}): `{field}` must be a string, got {got}")]
    FieldType {
        index: usize,
        kind: RuleKind,
        field: String,
        got: &'static str,
    },

    #[error("rule #{index} ({kind}): unknown field `{field}`")]
    UnknownField {
        index: usize,
        kind: RuleKind,
        field: String,
    },
}

const FIELDS: [&str; 3] = ["path", "msg", "when"];

/// Parse and validate every rule in a document.
pub fn parse_rules(document: &Value) -> Result<Vec<Rule>, RuleError> {
    let Value::Array(entries) = document else {
        return Err(RuleError::NotAList(document.type_name()));
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_rule(index, entry))
        .collect()
}

fn parse_rule(index: usize, entry: &Value) -> Result<Rule, RuleError> {
    let (name, args) = match entry {
        Value::Object(fields) if fields.len() == 1 => (&fields[0].0, &fields[0].1),
        Value::Object(fields) => {
            return Err(RuleError::Shape {
                index,
                got: format!("{} keys", fields.len()),
            });
        }
        other => {
            return Err(RuleError::Shape {
                index,
                got: other.type_name().to_string(),
            });
        }
    };

    let kind: RuleKind = name
        .parse()
        .map_err(|source| RuleError::UnknownKind { index, source })?;

    let Value::Object(fields) = args else {
        return Err(RuleError::Arguments {
            index,
            kind,
            got: args.type_name(),
        });
    };

    if let Some((field, _)) = fields.iter().find(|(k, _)| !FIELDS.contains(&k.as_str())) {
        return Err(RuleError::UnknownField {
            index,
            kind,
            field: field.clone(),
        });
    }

    let string_field = |field: &'static str| -> Result<Option<String>, RuleError> {
        match args.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(RuleError::FieldType {
                index,
                kind,
                field: field.to_string(),
                got: other.type_name(),
            }),
        }
    };
    let required = |field: &'static str| -> Result<String, RuleError> {
        string_field(field)?.ok_or(RuleError::MissingField { index, kind, field })
    };

    let path = required("path")?;
    let msg = required("msg")?;
    let when = string_field("when")?;

    if kind == RuleKind::Invalid && when.is_none() {
        return Err(RuleError::MissingField {
            index,
            kind,
            field: "when",
        });
    }

    Ok(Rule {
        kind,
        path: PathExpr::parse(&path),
        msg,
        when,
    })
}
