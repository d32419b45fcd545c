//! End-to-end query tests through the public API with the built-in
//! expression language.

use rstest::rstest;
use serde_json::json;
use varlint_kernel::{ExprPredicate, Query};
use varlint_types::Value;

fn paths(tree: serde_json::Value, build: impl Fn(Query<'_>) -> Query<'_>) -> Vec<String> {
    let tree = Value::from(tree);
    let predicate = ExprPredicate::new();
    build(Query::new(&tree, &predicate))
        .commit()
        .unwrap()
        .into_iter()
        .map(|item| item.path)
        .collect()
}

fn kong_applications() -> serde_json::Value {
    json!({
        "kong_applications": {
            "bridge-career": { "backend": { "address": "http://dockerhost:9090" } },
            "bridge-learn": {},
            "bridge-talent": { "backend": { "address": "http://lvh.me:8080" } }
        }
    })
}

// =============================================================================
// SELECT / FILTER / INVERT
// =============================================================================

#[rstest]
#[case::search(r#"item is search("foo")"#, &["a"])]
#[case::equality(r#"item == "bar""#, &["b"])]
#[case::nothing_matches(r#"item == "baz""#, &[])]
#[case::everything_matches("item is string", &["a", "b"])]
fn filter_over_top_level(#[case] expression: &str, #[case] expected: &[&str]) {
    let got = paths(json!({ "a": "foo", "b": "bar" }), |q| {
        q.select("*").filter(expression)
    });
    assert_eq!(got, expected);
}

#[test]
fn filter_with_no_selection_is_empty() {
    let got = paths(json!({}), |q| q.select("*").filter(r#"item is search("foo")"#));
    assert!(got.is_empty());
}

#[test]
fn invert_after_filter() {
    let got = paths(json!({ "a": "foo", "b": "bar" }), |q| {
        q.select("*").filter(r#"item == "foo""#).invert()
    });
    assert_eq!(got, vec!["b"]);
}

#[test]
fn invert_of_absent_path_is_empty() {
    let got = paths(json!({ "a": "foo", "b": "bar" }), |q| q.select("blah").invert());
    assert!(got.is_empty());
}

#[test]
fn invert_without_filter_is_empty() {
    let got = paths(json!({ "a": "foo", "b": "bar" }), |q| q.select("*").invert());
    assert!(got.is_empty());
}

// =============================================================================
// DEEP PATHS
// =============================================================================

#[test]
fn wildcard_filter_finds_dockerhost() {
    let got = paths(kong_applications(), |q| {
        q.select("kong_applications.*.backend.address")
            .filter("item is search('dockerhost')")
    });
    assert_eq!(got, vec!["kong_applications.bridge-career.backend.address"]);
}

#[test]
fn absent_paths_survive_select() {
    let got = paths(kong_applications(), |q| q.select("kong_applications.*.backend.address"));
    assert_eq!(
        got,
        vec![
            "kong_applications.bridge-career.backend.address",
            "kong_applications.bridge-learn.backend.address",
            "kong_applications.bridge-talent.backend.address",
        ]
    );
}

#[test]
fn absent_paths_filter_as_empty_string() {
    let got = paths(kong_applications(), |q| {
        q.select("kong_applications.*.backend.address").filter(r#"item == """#)
    });
    assert_eq!(got, vec!["kong_applications.bridge-learn.backend.address"]);
}

#[test]
fn captures_drive_filters() {
    let got = paths(kong_applications(), |q| {
        q.select("kong_applications.*.backend")
            .filter(r#"captures[0] is endswith("talent")"#)
    });
    assert_eq!(got, vec!["kong_applications.bridge-talent.backend"]);
}

#[test]
fn commit_keeps_captures() {
    let tree = Value::from(kong_applications());
    let predicate = ExprPredicate::new();
    let items = Query::new(&tree, &predicate)
        .select("kong_applications.*.backend.address")
        .filter("item is defined and item != ''")
        .commit()
        .unwrap();
    let captures: Vec<_> = items.iter().map(|i| i.captures.clone()).collect();
    assert_eq!(
        captures,
        vec![vec!["bridge-career".to_string()], vec!["bridge-talent".to_string()]]
    );
}

#[test]
fn later_select_discards_earlier_stages() {
    let got = paths(json!({ "a": "foo", "b": "bar" }), |q| {
        q.select("*").filter("false").select("a")
    });
    assert_eq!(got, vec!["a"]);
}
