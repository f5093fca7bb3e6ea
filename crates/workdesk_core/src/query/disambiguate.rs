//! Update-target selection for requests without an explicit id.
//!
//! # Responsibility
//! - Run a fuzzy keyword/time lookup and branch on its cardinality.
//!
//! # Invariants
//! - No ranking beyond the store's ordering: exactly one candidate is the
//!   only outcome that yields a target.
//! - The time context is read leniently; an unknown tag adds no restriction.

use crate::model::work_item::{TimeRange, WorkItemId, WorkItemSummary};
use crate::query::filter::{build_filter, QueryFilter};
use crate::repo::work_item_repo::{RepoResult, WorkItemRepository};
use chrono::NaiveDate;
use log::info;

/// Outcome of resolving an update target from fuzzy hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disambiguation {
    /// Exactly one candidate matched.
    Unique(WorkItemId),
    NoMatch,
    /// Summaries of every candidate, in lookup order.
    Ambiguous(Vec<String>),
}

/// Applies the cardinality policy to an already-fetched candidate list.
pub fn disambiguate(candidates: &[WorkItemSummary]) -> Disambiguation {
    match candidates {
        [] => Disambiguation::NoMatch,
        [only] => Disambiguation::Unique(only.id),
        many => Disambiguation::Ambiguous(many.iter().map(|item| item.summary.clone()).collect()),
    }
}

/// Looks up candidates by `keyword`/`time_context` and disambiguates them.
///
/// Store failures propagate unchanged.
pub fn find_update_target<R: WorkItemRepository + ?Sized>(
    repo: &R,
    owner_id: &str,
    keyword: Option<&str>,
    time_context: Option<&str>,
    today: NaiveDate,
) -> RepoResult<Disambiguation> {
    let filter = QueryFilter {
        keyword: keyword.map(str::to_string),
        time_range: time_context.and_then(TimeRange::from_tag_lenient),
        ..QueryFilter::default()
    };
    let candidates = repo.find_work_items(&build_filter(&filter, owner_id, today))?;
    let outcome = disambiguate(&candidates);

    info!(
        "event=update_target module=query status={} candidates={}",
        match &outcome {
            Disambiguation::Unique(_) => "unique",
            Disambiguation::NoMatch => "no_match",
            Disambiguation::Ambiguous(_) => "ambiguous",
        },
        candidates.len()
    );
    Ok(outcome)
}
