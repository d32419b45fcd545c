//! Path resolution over a variable tree.
//!
//! [`over`] walks a [`PathExpr`] through a tree and yields one
//! [`SelectionItem`] per concrete path the expression covers:
//!
//! - Literal segments descend into the named key.
//! - Wildcard segments branch over every key present at that level.
//! - A missing key, or a value that is not an object, does not prune the
//!   branch. Descent continues on a not-found cursor so the terminal item
//!   still carries the full path, with no value.
//!
//! Resolution is total: it never fails and never allocates more than the
//! output it returns plus one path buffer.

use varlint_types::{SelectionItem, Value};

use crate::path::{PathExpr, Segment};

/// Where descent currently stands.
#[derive(Clone, Copy)]
enum Cursor<'a> {
    Found(&'a Value),
    /// Stepped past a missing key or a non-object value.
    Missing,
}

/// Resolve a path expression against a tree.
///
/// Items come out depth-first, keys in document order, so with several
/// wildcards the outer one varies slowest.
pub fn over<'a>(expr: &'a PathExpr, tree: &'a Value) -> Vec<SelectionItem> {
    let mut out = Vec::new();
    let mut visited = Vec::with_capacity(expr.len());
    descend(expr, expr.segments(), Cursor::Found(tree), &mut visited, &mut out);
    out
}

fn descend<'a>(
    expr: &'a PathExpr,
    remaining: &'a [Segment],
    cursor: Cursor<'a>,
    visited: &mut Vec<&'a str>,
    out: &mut Vec<SelectionItem>,
) {
    let Some((segment, rest)) = remaining.split_first() else {
        out.push(emit(expr, cursor, visited));
        return;
    };

    match (cursor, segment) {
        (Cursor::Found(Value::Object(fields)), Segment::Wildcard) => {
            for (key, child) in fields {
                visited.push(key);
                descend(expr, rest, Cursor::Found(child), visited, out);
                visited.pop();
            }
        }
        (Cursor::Found(Value::Object(fields)), Segment::Key(key)) => {
            let next = fields
                .iter()
                .find(|(k, _)| k == key)
                .map_or(Cursor::Missing, |(_, child)| Cursor::Found(child));
            visited.push(key);
            descend(expr, rest, next, visited, out);
            visited.pop();
        }
        // Scalars, arrays, null and the not-found cursor cannot be walked
        // into. Keep going so the item is still emitted.
        (_, segment) => {
            visited.push(segment.as_str());
            descend(expr, rest, Cursor::Missing, visited, out);
            visited.pop();
        }
    }
}

fn emit(expr: &PathExpr, cursor: Cursor<'_>, visited: &[&str]) -> SelectionItem {
    // `visited` has exactly one entry per expression segment.
    let captures = expr
        .segments()
        .iter()
        .zip(visited)
        .filter(|(segment, _)| segment.is_wildcard())
        .map(|(_, name)| (*name).to_string())
        .collect();

    let value = match cursor {
        Cursor::Found(value) => Some(value.clone()),
        Cursor::Missing => None,
    };

    SelectionItem::new(visited.join("."), value, captures)
}
