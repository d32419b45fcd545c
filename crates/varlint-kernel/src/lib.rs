//! varlint-kernel: the core of varlint.
//!
//! This crate provides:
//!
//! - **Paths**: dotted path expressions with `*` wildcards
//! - **Resolver**: expands a path expression over a variable tree ([`over`])
//! - **Query**: a lazy select / filter / invert pipeline over the tree
//! - **Predicates**: the evaluator capability queries filter with, plus a
//!   built-in expression language (lexed with logos, parsed with chumsky)

pub mod expr;
pub mod path;
pub mod predicate;
pub mod query;
pub mod resolve;

pub use expr::ExprPredicate;
pub use path::{PathExpr, Segment, WILDCARD};
pub use predicate::{Bindings, Predicate, PredicateError};
pub use query::{Query, Stage};
pub use resolve::over;
