//! Property tests for path resolution.

use std::collections::BTreeMap;

use proptest::prelude::*;
use varlint_kernel::{PathExpr, over};
use varlint_types::Value;

const MAX_WIDTH: usize = 4;

fn key() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

fn object(fields: BTreeMap<String, Value>) -> Value {
    Value::Object(fields.into_iter().collect())
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        "[a-z ]{0,8}".prop_map(Value::String),
    ]
}

/// Two levels of objects with arbitrary leaves underneath.
fn two_level_tree() -> impl Strategy<Value = Value> {
    let inner = prop::collection::btree_map(key(), leaf(), 0..=MAX_WIDTH).prop_map(object);
    prop::collection::btree_map(key(), inner, 0..=MAX_WIDTH).prop_map(object)
}

/// Trees where some branches are scalars instead of objects.
fn ragged_tree() -> impl Strategy<Value = Value> {
    let inner = prop_oneof![
        leaf(),
        prop::collection::btree_map(key(), leaf(), 0..=MAX_WIDTH).prop_map(object),
    ];
    prop::collection::btree_map(key(), inner, 0..=MAX_WIDTH).prop_map(object)
}

fn path_expr() -> impl Strategy<Value = PathExpr> {
    let segment = prop_oneof![Just("*".to_string()), key()];
    prop::collection::vec(segment, 1..=3).prop_map(|segments| PathExpr::parse(&segments.join(".")))
}

fn width(value: &Value) -> usize {
    match value {
        Value::Object(fields) => fields.len(),
        _ => 0,
    }
}

proptest! {
    #[test]
    fn resolution_is_deterministic(tree in ragged_tree(), expr in path_expr()) {
        prop_assert_eq!(over(&expr, &tree), over(&expr, &tree));
    }

    #[test]
    fn literal_paths_yield_exactly_one_item(tree in ragged_tree(), a in key(), b in key()) {
        let expr = PathExpr::parse(&format!("{a}.{b}"));
        let items = over(&expr, &tree);
        prop_assert_eq!(items.len(), 1);
        prop_assert_eq!(&items[0].path, &format!("{a}.{b}"));
        prop_assert!(items[0].captures.is_empty());
    }

    #[test]
    fn captures_match_wildcard_count(tree in ragged_tree(), expr in path_expr()) {
        for item in over(&expr, &tree) {
            prop_assert_eq!(item.captures.len(), expr.wildcard_count());
            prop_assert_eq!(item.path.split('.').count(), expr.len());
        }
    }

    #[test]
    fn double_wildcard_counts_grandchildren(tree in two_level_tree()) {
        let expected: usize = match &tree {
            Value::Object(fields) => fields.iter().map(|(_, child)| width(child)).sum(),
            _ => 0,
        };
        let items = over(&PathExpr::parse("*.*"), &tree);
        prop_assert_eq!(items.len(), expected);
        prop_assert!(items.iter().all(|item| item.is_defined()));
    }

    #[test]
    fn wildcard_then_literal_keeps_every_branch(tree in ragged_tree(), leaf_key in key()) {
        let expr = PathExpr::parse(&format!("*.{leaf_key}"));
        let items = over(&expr, &tree);
        prop_assert_eq!(items.len(), width(&tree));
        for item in &items {
            let found = tree
                .get(&item.captures[0])
                .and_then(|child| child.get(&leaf_key));
            prop_assert_eq!(item.value.as_ref(), found);
        }
    }
}
