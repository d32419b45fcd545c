//! Lazy, chainable queries over a variable tree.
//!
//! A [`Query`] records stages and runs nothing until [`Query::commit`]:
//!
//! ```ignore
//! let hits = Query::new(&tree, &predicate)
//!     .select("apps.*.address")
//!     .filter(r#"item is search("dockerhost")"#)
//!     .commit()?;
//! ```
//!
//! Every chain method returns a new query and leaves the receiver as it
//! was, so a partially built query can be branched and reused.

use std::fmt;

use varlint_types::{SelectionItem, Value};

use crate::path::PathExpr;
use crate::predicate::{Bindings, Predicate, PredicateError};
use crate::resolve::over;

/// One recorded step of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Replace the working items with the resolution of a path.
    Select(PathExpr),
    /// Set each item's selection to the predicate's verdict.
    Filter(String),
    /// Flip each item's selection.
    Invert,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Select(path) => write!(f, "select({path})"),
            Stage::Filter(expr) => write!(f, "filter({expr})"),
            Stage::Invert => write!(f, "invert()"),
        }
    }
}

/// An item flowing between stages. `selected: None` counts as selected.
#[derive(Debug, Clone, PartialEq)]
struct WorkingItem {
    item: SelectionItem,
    selected: Option<bool>,
}

impl WorkingItem {
    fn is_selected(&self) -> bool {
        self.selected.unwrap_or(true)
    }
}

/// A deferred pipeline of stages bound to a tree and a predicate.
#[derive(Clone)]
pub struct Query<'a> {
    tree: &'a Value,
    predicate: &'a dyn Predicate,
    stages: Vec<Stage>,
}

impl<'a> Query<'a> {
    /// Create an empty query over `tree`, filtering with `predicate`.
    pub fn new(tree: &'a Value, predicate: &'a dyn Predicate) -> Self {
        Self {
            tree,
            predicate,
            stages: Vec::new(),
        }
    }

    /// Seed the working items from a path expression.
    ///
    /// Discards whatever earlier stages produced.
    pub fn select(&self, path: impl Into<PathExpr>) -> Self {
        self.with_stage(Stage::Select(path.into()))
    }

    /// Keep the items for which `expression` holds.
    ///
    /// The expression sees `item` (the value, or "" when absent) and
    /// `captures`. A later filter overrides an earlier one's verdict.
    pub fn filter(&self, expression: impl Into<String>) -> Self {
        self.with_stage(Stage::Filter(expression.into()))
    }

    /// Swap selected and unselected items.
    pub fn invert(&self) -> Self {
        self.with_stage(Stage::Invert)
    }

    /// The stages recorded so far, in order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage and return the selected items.
    ///
    /// Predicate errors abort the run; nothing partial is returned.
    pub fn commit(&self) -> Result<Vec<SelectionItem>, PredicateError> {
        self.commit_counted().map(|(_, items)| items)
    }

    /// Like [`Query::commit`], also returning how many items the last
    /// select stage resolved before any filtering.
    pub fn commit_counted(&self) -> Result<(usize, Vec<SelectionItem>), PredicateError> {
        tracing::debug!(stages = self.stages.len(), "committing query");

        let (items, resolved) =
            self.stages
                .iter()
                .try_fold((None, 0), |(items, resolved), stage| {
                    let output = self.apply(stage, items)?;
                    let resolved = match stage {
                        Stage::Select(_) => output.len(),
                        _ => resolved,
                    };
                    Ok::<_, PredicateError>((Some(output), resolved))
                })?;

        let selected = items
            .unwrap_or_default()
            .into_iter()
            .filter(WorkingItem::is_selected)
            .map(|working| working.item)
            .collect();
        Ok((resolved, selected))
    }

    fn with_stage(&self, stage: Stage) -> Self {
        let mut stages = self.stages.clone();
        stages.push(stage);
        Self {
            tree: self.tree,
            predicate: self.predicate,
            stages,
        }
    }

    fn apply(
        &self,
        stage: &Stage,
        input: Option<Vec<WorkingItem>>,
    ) -> Result<Vec<WorkingItem>, PredicateError> {
        let output = match stage {
            Stage::Select(path) => over(path, self.tree)
                .into_iter()
                .map(|item| WorkingItem {
                    item,
                    selected: None,
                })
                .collect::<Vec<_>>(),
            Stage::Filter(expression) => input
                .unwrap_or_default()
                .into_iter()
                .map(|working| -> Result<WorkingItem, PredicateError> {
                    let bindings = Bindings::new(
                        working.item.predicate_value(),
                        working.item.captures.clone(),
                    );
                    let verdict = self.predicate.evaluate(expression, &bindings)?;
                    Ok(WorkingItem {
                        item: working.item,
                        selected: Some(verdict),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Stage::Invert => input
                .unwrap_or_default()
                .into_iter()
                .map(|working| WorkingItem {
                    selected: Some(!working.is_selected()),
                    item: working.item,
                })
                .collect::<Vec<_>>(),
        };

        tracing::trace!(%stage, items = output.len(), "query stage applied");
        Ok(output)
    }
}

impl fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("stages", &self.stages)
            .finish_non_exhaustive()
    }
}
