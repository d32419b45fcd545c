//! The built-in predicate language.
//!
//! A small Jinja-flavoured boolean expression language:
//!
//! ```text
//! item == "foo"
//! item is search("dockerhost")
//! captures[0] == "db" and item.port > 1024
//! item is not none
//! ```
//!
//! Parsed expressions are cached per [`ExprPredicate`], so filtering many
//! items with the same rule parses once.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub use ast::{BinaryOp, Expr};
pub use eval::{Evaluator, is_truthy};
pub use parser::{ParseError, parse, render_errors};

use crate::predicate::{Bindings, Predicate, PredicateError};

/// [`Predicate`] backed by the expression language in this module.
#[derive(Debug, Default)]
pub struct ExprPredicate {
    cache: RefCell<HashMap<String, Rc<Expr>>>,
}

impl ExprPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an expression, reusing an earlier parse when possible.
    pub fn compile(&self, expression: &str) -> Result<Rc<Expr>, PredicateError> {
        if let Some(expr) = self.cache.borrow().get(expression) {
            return Ok(Rc::clone(expr));
        }

        let expr = parse(expression).map_err(|errors| PredicateError::Syntax {
            expression: expression.to_string(),
            message: render_errors(expression, &errors),
        })?;
        tracing::trace!(expression, "compiled predicate");

        let expr = Rc::new(expr);
        self.cache
            .borrow_mut()
            .insert(expression.to_string(), Rc::clone(&expr));
        Ok(expr)
    }
}

impl Predicate for ExprPredicate {
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<bool, PredicateError> {
        let expr = self.compile(expression)?;
        Evaluator::new(bindings).eval_bool(&expr)
    }
}
