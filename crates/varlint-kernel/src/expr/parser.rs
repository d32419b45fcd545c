//! Parser for predicate expressions.
//!
//! Transforms a token stream from the lexer into an [`Expr`].
//! Uses chumsky for parser combinators.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use chumsky::{input::ValueInput, prelude::*};
use varlint_types::Value;

use super::ast::{BinaryOp, Expr};
use super::lexer::{self, Token};

/// Span type used throughout the parser.
pub type Span = SimpleSpan;

/// Parse error with location and context.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: Range<usize>,
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {:?}", self.message, self.span)
    }
}

impl std::error::Error for ParseError {}

/// Parse a predicate expression.
pub fn parse(source: &str) -> Result<Expr, Vec<ParseError>> {
    // Tokenize with logos
    let tokens = lexer::tokenize(source).map_err(|errs| {
        errs.into_iter()
            .map(|e| ParseError {
                span: e.span,
                message: format!("unexpected input: {}", e.text),
            })
            .collect::<Vec<_>>()
    })?;

    let mut tokens: Vec<(Token, Span)> = tokens
        .into_iter()
        .map(|spanned| (spanned.token, (spanned.span.start..spanned.span.end).into()))
        .collect();
    keys_after_dot(source, &mut tokens);

    // End-of-input span
    let end_span: Span = (source.len()..source.len()).into();

    let parser = expr_parser().then_ignore(end());
    let result = parser.parse(tokens.as_slice().map(end_span, |(t, s)| (t, s)));

    result.into_result().map_err(|errs| {
        errs.into_iter()
            .map(|e| ParseError {
                span: e.span().start..e.span().end,
                message: e.to_string(),
            })
            .collect()
    })
}

/// Turn word keywords that directly follow `.` back into identifiers, so
/// `item.in` or `item.None` name keys with their exact spelling.
fn keys_after_dot(source: &str, tokens: &mut [(Token, Span)]) {
    let mut after_dot = false;
    for (token, span) in tokens.iter_mut() {
        if after_dot && !matches!(token, Token::Ident(_)) {
            let word = source.get(span.start..span.end).unwrap_or_default();
            if word.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
                *token = Token::Ident(word.to_string());
            }
        }
        after_dot = *token == Token::Dot;
    }
}

/// Render parse errors against their source for humans.
pub fn render_errors(source: &str, errors: &[ParseError]) -> String {
    let mut out = Vec::new();
    for error in errors {
        let report = Report::build(ReportKind::Error, error.span.clone())
            .with_config(Config::default().with_color(false))
            .with_message(&error.message)
            .with_label(Label::new(error.span.clone()).with_message("here"))
            .finish();
        // Writing into a Vec cannot fail.
        let _ = report.write(Source::from(source), &mut out);
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ═══════════════════════════════════════════════════════════════════════════
// Parser Combinators - generic over input type
// ═══════════════════════════════════════════════════════════════════════════

/// Expression parser.
///
/// Grammar, loosest first:
///   or      = and { "or" and }
///   and     = not { "and" not }
///   not     = { "not" } compare
///   compare = test [ comp_op test ]
///   test    = postfix [ "is" ["not"] name [ "(" args ")" ] ]
///   postfix = atom { "." key | "[" or "]" }
///   atom    = literal | ident | list | "(" or ")"
fn expr_parser<'tokens, I>(
) -> impl Parser<'tokens, I, Expr, extra::Err<Rich<'tokens, Token, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    recursive(|expr| {
        let ident = select! { Token::Ident(name) => name }.labelled("identifier");

        let list = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(Expr::List)
            .labelled("list");

        let atom = choice((
            literal_parser().map(Expr::Literal),
            ident.clone().map(Expr::Ident),
            list,
            expr.clone()
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        ))
        .boxed();

        // `.key` is sugar for `["key"]`
        let accessor = choice((
            just(Token::Dot)
                .ignore_then(ident)
                .map(|name| Expr::Literal(Value::String(name))),
            expr.clone()
                .delimited_by(just(Token::LBracket), just(Token::RBracket)),
        ));

        let postfix = atom
            .foldl(accessor.repeated(), |target, key| Expr::Index {
                target: Box::new(target),
                key: Box::new(key),
            })
            .boxed();

        // `none` lexes as a keyword but is also a test name
        let test_name = select! {
            Token::Ident(name) => name,
            Token::Null => "none".to_string(),
        }
        .labelled("test name");

        let test_args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let test = postfix
            .then(
                just(Token::Is)
                    .ignore_then(just(Token::Not).or_not())
                    .then(test_name)
                    .then(test_args.or_not())
                    .or_not(),
            )
            .map(|(subject, test)| match test {
                Some(((negated, name), args)) => Expr::Test {
                    subject: Box::new(subject),
                    name,
                    args: args.unwrap_or_default(),
                    negated: negated.is_some(),
                },
                None => subject,
            })
            .boxed();

        let comparison_op = select! {
            Token::EqEq => BinaryOp::Eq,
            Token::NotEq => BinaryOp::NotEq,
            Token::Lt => BinaryOp::Lt,
            Token::Gt => BinaryOp::Gt,
            Token::LtEq => BinaryOp::LtEq,
            Token::GtEq => BinaryOp::GtEq,
            Token::Match => BinaryOp::Match,
            Token::NotMatch => BinaryOp::NotMatch,
            Token::Contains => BinaryOp::Contains,
            Token::In => BinaryOp::In,
        };

        // compare: test [ comp_op test ]
        let compare = test
            .clone()
            .then(comparison_op.then(test).or_not())
            .map(|(left, maybe_op)| match maybe_op {
                Some((op, right)) => Expr::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                None => left,
            })
            .boxed();

        // not: { "not" } compare
        let negation = just(Token::Not)
            .repeated()
            .foldr(compare, |_, operand| Expr::Not(Box::new(operand)))
            .boxed();

        // and: not { "and" not }
        let and_expr = negation.clone().foldl(
            just(Token::And).ignore_then(negation).repeated(),
            |left, right| Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
            },
        );

        // or: and { "or" and }
        and_expr
            .clone()
            .foldl(
                just(Token::Or).ignore_then(and_expr).repeated(),
                |left, right| Expr::Binary {
                    left: Box::new(left),
                    op: BinaryOp::Or,
                    right: Box::new(right),
                },
            )
            .labelled("expression")
    })
}

/// Literal value parser.
fn literal_parser<'tokens, I>(
) -> impl Parser<'tokens, I, Value, extra::Err<Rich<'tokens, Token, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    select! {
        Token::True => Value::Bool(true),
        Token::False => Value::Bool(false),
        Token::Null => Value::Null,
        Token::Int(n) => Value::Int(n),
        Token::Float(f) => Value::Float(f),
        Token::String(s) => Value::String(s),
    }
    .labelled("literal")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Ident(name.into()))
    }

    fn string(s: &str) -> Box<Expr> {
        Box::new(Expr::Literal(Value::String(s.into())))
    }

    #[test]
    fn parse_equality() {
        assert_eq!(
            parse(r#"item == "foo""#).unwrap(),
            Expr::Binary {
                left: ident("item"),
                op: BinaryOp::Eq,
                right: string("foo"),
            }
        );
    }

    #[test]
    fn parse_bare_identifier() {
        assert_eq!(parse("item").unwrap(), Expr::Ident("item".into()));
    }

    #[test]
    fn parse_test_with_argument() {
        assert_eq!(
            parse(r#"item is search("dockerhost")"#).unwrap(),
            Expr::Test {
                subject: ident("item"),
                name: "search".into(),
                args: vec![Expr::Literal(Value::String("dockerhost".into()))],
                negated: false,
            }
        );
    }

    #[test]
    fn parse_negated_test_without_arguments() {
        assert_eq!(
            parse("item is not none").unwrap(),
            Expr::Test {
                subject: ident("item"),
                name: "none".into(),
                args: vec![],
                negated: true,
            }
        );
    }

    #[test]
    fn parse_subscripts() {
        assert_eq!(
            parse("captures[0]").unwrap(),
            Expr::Index {
                target: ident("captures"),
                key: Box::new(Expr::Literal(Value::Int(0))),
            }
        );
        assert_eq!(
            parse("item.backend.port").unwrap(),
            Expr::Index {
                target: Box::new(Expr::Index {
                    target: ident("item"),
                    key: string("backend"),
                }),
                key: string("port"),
            }
        );
    }

    #[test]
    fn keywords_after_dot_are_keys() {
        for key in ["in", "is", "not", "and", "or", "contains", "true", "None", "null"] {
            assert_eq!(
                parse(&format!("item.{key}")).unwrap(),
                Expr::Index {
                    target: ident("item"),
                    key: string(key),
                },
                "item.{key}"
            );
        }
    }

    #[test]
    fn keyword_key_still_leaves_operators_alone() {
        assert_eq!(
            parse(r#"item.in in ["a"]"#).unwrap(),
            Expr::Binary {
                left: Box::new(Expr::Index {
                    target: ident("item"),
                    key: string("in"),
                }),
                op: BinaryOp::In,
                right: Box::new(Expr::List(vec![Expr::Literal(Value::String("a".into()))])),
            }
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("item == 1 or item == 2 and item == 3").unwrap();
        let Expr::Binary { op, right, .. } = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn not_applies_to_whole_comparison() {
        let expr = parse(r#"not item == "x""#).unwrap();
        let Expr::Not(inner) = expr else {
            panic!("expected negation");
        };
        assert!(matches!(*inner, Expr::Binary { op: BinaryOp::Eq, .. }));
    }

    #[test]
    fn parse_list_and_membership() {
        assert_eq!(
            parse(r#"item in ["a", "b",]"#).unwrap(),
            Expr::Binary {
                left: ident("item"),
                op: BinaryOp::In,
                right: Box::new(Expr::List(vec![
                    Expr::Literal(Value::String("a".into())),
                    Expr::Literal(Value::String("b".into())),
                ])),
            }
        );
    }

    #[test]
    fn parenthesized_grouping() {
        let expr = parse("(item == 1 or item == 2) and true").unwrap();
        let Expr::Binary { op, left, .. } = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinaryOp::And);
        assert!(matches!(*left, Expr::Binary { op: BinaryOp::Or, .. }));
    }

    #[test]
    fn dangling_operator_is_an_error() {
        let errors = parse("item ==").unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn trailing_tokens_are_an_error() {
        assert!(parse("item item").is_err());
    }

    #[test]
    fn lexer_errors_surface_as_parse_errors() {
        let errors = parse("item @ 1").unwrap_err();
        assert_eq!(errors[0].span, 5..6);
        assert!(errors[0].message.contains('@'));
    }

    #[test]
    fn rendered_errors_mention_message() {
        let errors = parse("item @ 1").unwrap_err();
        let rendered = render_errors("item @ 1", &errors);
        assert!(rendered.contains("unexpected input: @"));
    }
}
