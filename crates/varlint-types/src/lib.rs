//! varlint-types: pure data shared by the varlint crates.
//!
//! - [`Value`]: the variable tree being validated
//! - [`SelectionItem`]: one resolution of a path expression
//! - [`Issue`], [`RuleKind`], [`Severity`]: what rules report

pub mod issue;
pub mod selection;
pub mod value;

pub use issue::{Issue, RuleKind, Severity, UnknownRuleKind};
pub use selection::SelectionItem;
pub use value::{json_to_value, value_to_json, Value};
