//! The predicate capability queries filter with.
//!
//! The query pipeline never interprets expressions itself. It hands each
//! expression, plus the variables bound for the current item, to a
//! [`Predicate`] supplied by the caller. [`crate::expr::ExprPredicate`] is
//! the built-in implementation; any closure with the right shape works too.

use varlint_types::Value;

/// Variables visible to a predicate expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    /// The matched value; the empty string when the path is absent.
    pub item: Value,
    /// Keys chosen at each wildcard of the path expression.
    pub captures: Vec<String>,
}

impl Bindings {
    pub fn new(item: Value, captures: Vec<String>) -> Self {
        Self { item, captures }
    }
}

/// Errors raised while evaluating a predicate expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredicateError {
    /// The expression could not be parsed.
    #[error("syntax error in `{expression}`:\n{message}")]
    Syntax { expression: String, message: String },
    /// The expression names a variable that is not bound.
    #[error("undefined variable: {0}")]
    Undefined(String),
    /// `x is <name>` with a test that does not exist.
    #[error("unknown test: {0}")]
    UnknownTest(String),
    /// Type mismatch for an operator or test.
    #[error("type error: expected {expected}, got {got}")]
    Type { expected: &'static str, got: String },
    /// A regex operand failed to compile.
    #[error("regex error: {0}")]
    Regex(String),
}

/// Evaluates a boolean expression against bound variables.
///
/// Implementations must not have side effects on the tree being queried.
pub trait Predicate {
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<bool, PredicateError>;
}

impl<F> Predicate for F
where
    F: Fn(&str, &Bindings) -> Result<bool, PredicateError>,
{
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<bool, PredicateError> {
        self(expression, bindings)
    }
}
