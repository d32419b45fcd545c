//! Evaluation of predicate expressions.
//!
//! The evaluator reduces an [`Expr`] to a [`Value`] with only two names in
//! scope: `item` and `captures`. Anything else is an undefined variable.

use std::cmp::Ordering;

use regex::Regex;
use varlint_types::Value;

use super::ast::{BinaryOp, Expr};
use crate::predicate::{Bindings, PredicateError};

/// Result type for evaluation.
pub type EvalResult<T> = Result<T, PredicateError>;

/// Expression evaluator over a set of bindings.
pub struct Evaluator<'a> {
    bindings: &'a Bindings,
}

impl<'a> Evaluator<'a> {
    pub fn new(bindings: &'a Bindings) -> Self {
        Self { bindings }
    }

    /// Evaluate an expression to a value.
    pub fn eval(&self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => self.eval_ident(name),
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Expr::Index { target, key } => {
                let target = self.eval(target)?;
                let key = self.eval(key)?;
                Ok(index(&target, &key))
            }
            Expr::Not(operand) => Ok(Value::Bool(!is_truthy(&self.eval(operand)?))),
            Expr::Binary { left, op, right } => self.eval_binary_op(left, *op, right),
            Expr::Test {
                subject,
                name,
                args,
                negated,
            } => {
                let subject = self.eval(subject)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let passed = run_test(name, &subject, &args)?;
                Ok(Value::Bool(passed != *negated))
            }
        }
    }

    /// Evaluate an expression and reduce it to a boolean verdict.
    pub fn eval_bool(&self, expr: &Expr) -> EvalResult<bool> {
        self.eval(expr).map(|value| is_truthy(&value))
    }

    fn eval_ident(&self, name: &str) -> EvalResult<Value> {
        match name {
            "item" => Ok(self.bindings.item.clone()),
            "captures" => Ok(Value::Array(
                self.bindings
                    .captures
                    .iter()
                    .map(|c| Value::String(c.clone()))
                    .collect(),
            )),
            other => Err(PredicateError::Undefined(other.to_string())),
        }
    }

    fn eval_binary_op(&self, left: &Expr, op: BinaryOp, right: &Expr) -> EvalResult<Value> {
        match op {
            // Short-circuit logical operators
            BinaryOp::And => {
                let left_val = self.eval(left)?;
                if !is_truthy(&left_val) {
                    return Ok(left_val);
                }
                self.eval(right)
            }
            BinaryOp::Or => {
                let left_val = self.eval(left)?;
                if is_truthy(&left_val) {
                    return Ok(left_val);
                }
                self.eval(right)
            }
            _ => {
                let left_val = self.eval(left)?;
                let right_val = self.eval(right)?;
                let result = match op {
                    BinaryOp::Eq => values_equal(&left_val, &right_val),
                    BinaryOp::NotEq => !values_equal(&left_val, &right_val),
                    BinaryOp::Lt => compare_values(&left_val, &right_val)?.is_lt(),
                    BinaryOp::Gt => compare_values(&left_val, &right_val)?.is_gt(),
                    BinaryOp::LtEq => compare_values(&left_val, &right_val)?.is_le(),
                    BinaryOp::GtEq => compare_values(&left_val, &right_val)?.is_ge(),
                    BinaryOp::Match => regex_search(&left_val, &right_val)?,
                    BinaryOp::NotMatch => !regex_search(&left_val, &right_val)?,
                    BinaryOp::Contains => contains(&left_val, &right_val)?,
                    BinaryOp::In => contains(&right_val, &left_val)?,
                    BinaryOp::And | BinaryOp::Or => unreachable!(),
                };
                Ok(Value::Bool(result))
            }
        }
    }
}

/// Subscript a value. Missing keys and out-of-range indexes give null.
fn index(target: &Value, key: &Value) -> Value {
    match (target, key) {
        (Value::Object(_), Value::String(k)) => target.get(k).cloned().unwrap_or(Value::Null),
        (Value::Array(items), Value::Int(i)) => {
            let len = items.len() as i64;
            let idx = if *i < 0 { len + i } else { *i };
            usize::try_from(idx)
                .ok()
                .and_then(|idx| items.get(idx))
                .cloned()
                .unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

/// Check if a value is "truthy".
///
/// - `null` → false
/// - `false` → false
/// - `0`, `0.0` → false
/// - `""` → false
/// - `[]`, `{}` → false
/// - Everything else → true
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Check if two values are equal.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => int_equals_float(*a, *b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        // Objects compare by content, regardless of key order
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, av)| right.get(k).is_some_and(|bv| values_equal(av, bv)))
        }
        _ => left == right,
    }
}

/// Exact comparison: the float must be integral and within `i64` range.
fn int_equals_float(int: i64, float: f64) -> bool {
    float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 && float as i64 == int
}

/// Compare two values for ordering.
fn compare_values(left: &Value, right: &Value) -> EvalResult<Ordering> {
    let nan = || PredicateError::Type {
        expected: "comparable numbers",
        got: "NaN".into(),
    };
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).ok_or_else(nan),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b).ok_or_else(nan),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)).ok_or_else(nan),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        _ => Err(PredicateError::Type {
            expected: "comparable types (numbers or strings)",
            got: format!("{} vs {}", left.type_name(), right.type_name()),
        }),
    }
}

/// `haystack contains needle`.
fn contains(haystack: &Value, needle: &Value) -> EvalResult<bool> {
    match (haystack, needle) {
        (Value::String(h), Value::String(n)) => Ok(h.contains(n.as_str())),
        (Value::Array(items), _) => Ok(items.iter().any(|item| values_equal(item, needle))),
        (Value::Object(_), Value::String(key)) => Ok(haystack.get(key).is_some()),
        _ => Err(PredicateError::Type {
            expected: "string, array or object to search in",
            got: format!("{} contains {}", haystack.type_name(), needle.type_name()),
        }),
    }
}

fn expect_str<'v>(value: &'v Value, what: &'static str) -> EvalResult<&'v str> {
    value.as_str().ok_or_else(|| PredicateError::Type {
        expected: what,
        got: value.type_name().to_string(),
    })
}

fn compile(pattern: &str) -> EvalResult<Regex> {
    Regex::new(pattern).map_err(|e| PredicateError::Regex(e.to_string()))
}

/// Unanchored regex search of `pattern` in `text`.
fn regex_search(text: &Value, pattern: &Value) -> EvalResult<bool> {
    let text = expect_str(text, "string")?;
    let pattern = expect_str(pattern, "string (regex pattern)")?;
    Ok(compile(pattern)?.is_match(text))
}

/// The single string argument a test like `search(...)` takes.
fn single_str_arg<'v>(name: &str, args: &'v [Value]) -> EvalResult<&'v str> {
    match args {
        [arg] => expect_str(arg, "string argument"),
        _ => Err(PredicateError::Type {
            expected: "exactly one argument",
            got: format!("{} arguments to `{name}`", args.len()),
        }),
    }
}

/// Run an `is` test.
fn run_test(name: &str, subject: &Value, args: &[Value]) -> EvalResult<bool> {
    match name {
        "none" => Ok(matches!(subject, Value::Null)),
        "defined" => Ok(!matches!(subject, Value::Null)),
        "empty" => Ok(match subject {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(fields) => fields.is_empty(),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => false,
        }),
        "string" => Ok(matches!(subject, Value::String(_))),
        "number" => Ok(matches!(subject, Value::Int(_) | Value::Float(_))),
        "boolean" => Ok(matches!(subject, Value::Bool(_))),
        "mapping" => Ok(matches!(subject, Value::Object(_))),
        "sequence" => Ok(matches!(subject, Value::Array(_))),
        "search" => {
            let pattern = single_str_arg(name, args)?;
            Ok(compile(pattern)?.is_match(expect_str(subject, "string")?))
        }
        "match" => {
            let pattern = single_str_arg(name, args)?;
            let text = expect_str(subject, "string")?;
            Ok(compile(pattern)?.find(text).is_some_and(|m| m.start() == 0))
        }
        "startswith" => {
            let prefix = single_str_arg(name, args)?;
            Ok(expect_str(subject, "string")?.starts_with(prefix))
        }
        "endswith" => {
            let suffix = single_str_arg(name, args)?;
            Ok(expect_str(subject, "string")?.ends_with(suffix))
        }
        other => Err(PredicateError::UnknownTest(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse;
    use rstest::rstest;

    fn eval_with(source: &str, item: Value, captures: &[&str]) -> EvalResult<bool> {
        let bindings = Bindings::new(item, captures.iter().map(|c| c.to_string()).collect());
        let expr = parse(source).unwrap();
        Evaluator::new(&bindings).eval_bool(&expr)
    }

    fn eval_str(source: &str, item: &str) -> EvalResult<bool> {
        eval_with(source, Value::String(item.into()), &[])
    }

    #[rstest]
    #[case::eq(r#"item == "foo""#, "foo", true)]
    #[case::eq_miss(r#"item == "foo""#, "bar", false)]
    #[case::not_eq(r#"item != "foo""#, "bar", true)]
    #[case::contains(r#"item contains "dockerhost""#, "http://dockerhost:9090", true)]
    #[case::contains_miss(r#"item contains "dockerhost""#, "http://lvh.me:8080", false)]
    #[case::regex(r#"item =~ "^http://""#, "http://x", true)]
    #[case::not_regex(r#"item !~ "^https""#, "http://x", true)]
    #[case::search(r#"item is search("dockerhost")"#, "http://dockerhost:9090", true)]
    #[case::match_anchored(r#"item is match("dockerhost")"#, "http://dockerhost:9090", false)]
    #[case::match_start(r#"item is match("http")"#, "http://dockerhost:9090", true)]
    #[case::not_search(r#"item is not search("lvh")"#, "http://dockerhost", true)]
    #[case::startswith(r#"item is startswith("http")"#, "http://x", true)]
    #[case::endswith(r#"item is endswith(":80")"#, "http://x:8080", false)]
    #[case::empty_string("item is empty", "", true)]
    #[case::truthy_string("item", "x", true)]
    #[case::falsy_string("item", "", false)]
    #[case::not("not item", "", true)]
    #[case::string_test("item is string", "x", true)]
    #[case::in_list(r#"item in ["a", "b"]"#, "b", true)]
    #[case::in_string(r#"item in "abc""#, "bc", true)]
    #[case::or(r#"item == "a" or item == "b""#, "b", true)]
    #[case::and(r#"item != "" and item != "b""#, "b", false)]
    #[case::ordering(r#"item < "b""#, "a", true)]
    fn string_predicates(#[case] source: &str, #[case] item: &str, #[case] expected: bool) {
        assert_eq!(eval_str(source, item), Ok(expected));
    }

    #[rstest]
    #[case::int_eq("item == 80", Value::Int(80), true)]
    #[case::int_float_eq("item == 80.0", Value::Int(80), true)]
    #[case::float_int_eq("item == 80", Value::Float(80.0), true)]
    #[case::tiny_float_is_not_zero("item == 0.0", Value::Float(1e-20), false)]
    #[case::half_is_not_zero("item == 0", Value::Float(0.5), false)]
    #[case::large_int_keeps_precision("item == 10000000000000001", Value::Float(1e16), false)]
    #[case::large_int_exact("item == 10000000000000000", Value::Float(1e16), true)]
    #[case::gt("item > 1024", Value::Int(80), false)]
    #[case::ge("item >= 80", Value::Int(80), true)]
    #[case::zero_is_falsy("item", Value::Int(0), false)]
    #[case::number_test("item is number", Value::Float(1.5), true)]
    #[case::none_test("item is none", Value::Null, true)]
    #[case::defined_test("item is defined", Value::Null, false)]
    #[case::bool_test("item is boolean", Value::Bool(false), true)]
    #[case::bool_eq("item == false", Value::Bool(false), true)]
    fn scalar_predicates(#[case] source: &str, #[case] item: Value, #[case] expected: bool) {
        assert_eq!(eval_with(source, item, &[]), Ok(expected));
    }

    #[test]
    fn attribute_and_subscript_access() {
        let item = Value::from(serde_json::json!({
            "backend": { "port": 8080, "hosts": ["a", "b"] }
        }));
        assert_eq!(eval_with("item.backend.port == 8080", item.clone(), &[]), Ok(true));
        assert_eq!(eval_with(r#"item["backend"]["hosts"][-1] == "b""#, item.clone(), &[]), Ok(true));
        assert_eq!(eval_with("item.backend.missing is none", item.clone(), &[]), Ok(true));
        assert_eq!(eval_with(r#"item.backend contains "port""#, item.clone(), &[]), Ok(true));
        assert_eq!(eval_with("item is mapping", item, &[]), Ok(true));
    }

    #[test]
    fn keys_named_like_keywords() {
        let item = Value::from(serde_json::json!({ "is": 1, "in": ["a"], "None": true }));
        assert_eq!(eval_with("item.is == 1", item.clone(), &[]), Ok(true));
        assert_eq!(eval_with(r#""a" in item.in"#, item.clone(), &[]), Ok(true));
        assert_eq!(eval_with("item.None", item, &[]), Ok(true));
    }

    #[test]
    fn captures_are_strings() {
        assert_eq!(
            eval_with(r#"captures[0] == "web" and captures[1] == "port""#, Value::Null, &["web", "port"]),
            Ok(true)
        );
        assert_eq!(eval_with("captures[5] is none", Value::Null, &["web"]), Ok(true));
        assert_eq!(eval_with(r#""web" in captures"#, Value::Null, &["web"]), Ok(true));
    }

    #[test]
    fn short_circuit_skips_errors() {
        assert_eq!(eval_str(r#"item == "x" or undefined_thing"#, "x"), Ok(true));
        assert_eq!(eval_str(r#"item == "y" and undefined_thing"#, "x"), Ok(false));
    }

    #[test]
    fn object_equality_ignores_key_order() {
        let item = Value::from(serde_json::json!({ "a": 1, "b": 2 }));
        let other = Value::from(serde_json::json!({ "b": 2, "a": 1 }));
        assert!(values_equal(&item, &other));
    }

    #[test]
    fn undefined_identifier_is_an_error() {
        assert_eq!(
            eval_str("hostvars == 1", "x"),
            Err(PredicateError::Undefined("hostvars".into()))
        );
    }

    #[test]
    fn unknown_test_is_an_error() {
        assert_eq!(
            eval_str("item is frobnicated", "x"),
            Err(PredicateError::UnknownTest("frobnicated".into()))
        );
    }

    #[test]
    fn type_errors() {
        assert!(matches!(
            eval_with("item < 1", Value::String("a".into()), &[]),
            Err(PredicateError::Type { .. })
        ));
        assert!(matches!(
            eval_with(r#"item is search("x")"#, Value::Int(1), &[]),
            Err(PredicateError::Type { .. })
        ));
        assert!(matches!(
            eval_str("item is search()", "x"),
            Err(PredicateError::Type { .. })
        ));
        assert!(matches!(
            eval_with("item contains 1", Value::Int(10), &[]),
            Err(PredicateError::Type { .. })
        ));
    }

    #[test]
    fn bad_regex_is_an_error() {
        assert!(matches!(
            eval_str(r#"item =~ "[""#, "x"),
            Err(PredicateError::Regex(_))
        ));
    }
}
