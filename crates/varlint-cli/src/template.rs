//! `{{ dotted.path }}` substitution in rule files.
//!
//! Placeholders resolve against the variable tree through the same path
//! resolver rules use. Strings are inserted verbatim; any other value is
//! inserted as compact JSON.

use varlint_kernel::{PathExpr, over};
use varlint_types::{Value, value_to_json};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("undefined variable in template: {0}")]
    Undefined(String),

    #[error("`{expression}` matches {matches} variables; templates need exactly one")]
    Ambiguous { expression: String, matches: usize },

    #[error("unterminated `{{{{` at byte {offset}")]
    Unterminated { offset: usize },
}

/// Render every placeholder in `source`.
pub fn render(source: &str, vars: &Value) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);

        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            return Err(TemplateError::Unterminated {
                offset: source.len() - rest.len() + start,
            });
        };

        let expression = after_open[..end].trim();
        out.push_str(&lookup(expression, vars)?);
        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

fn lookup(expression: &str, vars: &Value) -> Result<String, TemplateError> {
    if expression.is_empty() {
        return Err(TemplateError::Undefined(String::new()));
    }

    let path = PathExpr::parse(expression);
    let mut items = over(&path, vars);
    if items.len() > 1 {
        return Err(TemplateError::Ambiguous {
            expression: expression.to_string(),
            matches: items.len(),
        });
    }

    match items.pop().and_then(|item| item.value) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Ok(value_to_json(&other).to_string()),
        None => Err(TemplateError::Undefined(expression.to_string())),
    }
}
