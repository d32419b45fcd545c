//! Syntax tree for predicate expressions.

use std::fmt;

use varlint_types::Value;

/// A parsed predicate expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `"foo"`, `42`, `true`, `none`
    Literal(Value),
    /// `item`, `captures`
    Ident(String),
    /// `[a, b]`
    List(Vec<Expr>),
    /// `target[key]` or `target.key`
    Index { target: Box<Expr>, key: Box<Expr> },
    /// `not x`
    Not(Box<Expr>),
    /// `left op right`
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// `subject is [not] name[(args)]`
    Test {
        subject: Box<Expr>,
        name: String,
        args: Vec<Expr>,
        negated: bool,
    },
}

/// Binary operators, loosest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    /// `=~` unanchored regex search
    Match,
    /// `!~`
    NotMatch,
    /// `haystack contains needle`
    Contains,
    /// `needle in haystack`
    In,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Or => write!(f, "or"),
            BinaryOp::And => write!(f, "and"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::LtEq => write!(f, "<="),
            BinaryOp::GtEq => write!(f, ">="),
            BinaryOp::Match => write!(f, "=~"),
            BinaryOp::NotMatch => write!(f, "!~"),
            BinaryOp::Contains => write!(f, "contains"),
            BinaryOp::In => write!(f, "in"),
        }
    }
}
