//! Work item use-case service.
//!
//! # Responsibility
//! - Provide record/query/smart-query/update entry points for callers.
//! - Route update requests without an id through target disambiguation.
//!
//! # Invariants
//! - Validation runs before any store access.
//! - Every call is scoped to the caller's owner id.
//! - Store failures are propagated unchanged; nothing is retried.

use crate::model::work_item::{
    validate_owner, NewWorkItem, WorkItemChanges, WorkItemId, WorkItemSummary,
    WorkItemValidationError,
};
use crate::query::disambiguate::{find_update_target, Disambiguation};
use crate::query::filter::{build_filter, QueryFilter};
use crate::query::intent::{IntentParser, ParsedIntent};
use crate::repo::work_item_repo::{RepoError, WorkItemRepository};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error surfaced to request handlers.
#[derive(Debug)]
pub enum WorkItemServiceError {
    /// Malformed input; rejected before touching the store.
    Validation(WorkItemValidationError),
    /// No owner-scoped item matched. `item_id` is set for explicit targets.
    NotFound { item_id: Option<WorkItemId> },
    /// Several items matched an update's fuzzy hints.
    Ambiguous { candidates: Vec<String> },
    /// Store failure, passed through as-is.
    Repo(RepoError),
}

impl Display for WorkItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { item_id: Some(id) } => {
                write!(f, "work item {id} not found or not owned by caller")
            }
            Self::NotFound { item_id: None } => {
                write!(f, "no work item matches the given description")
            }
            Self::Ambiguous { candidates } => write!(
                f,
                "several work items match, give a more specific description or an id: {}",
                candidates.join(", ")
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WorkItemValidationError> for WorkItemServiceError {
    fn from(value: WorkItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for WorkItemServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, WorkItemServiceError>;

/// Update request. Without `item_id`, the target is looked up by
/// `keyword` and `time_context`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Original instruction text; kept for traceability only.
    pub user_input: Option<String>,
    pub item_id: Option<WorkItemId>,
    pub keyword: Option<String>,
    /// Loose time-range tag such as `today`; unknown tags add no restriction.
    pub time_context: Option<String>,
    pub changes: WorkItemChanges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(WorkItemId),
    /// The request carried no field assignments; nothing was written.
    NoChanges,
}

/// Parsed intent together with the items it selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartQueryResult {
    pub intent: ParsedIntent,
    pub items: Vec<WorkItemSummary>,
}

/// Use-case facade over a work item repository.
pub struct WorkItemService<R: WorkItemRepository> {
    repo: R,
    parser: &'static IntentParser,
}

impl<R: WorkItemRepository> WorkItemService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            parser: IntentParser::shared(),
        }
    }

    /// Records a new work item and returns its id.
    pub fn record(&self, owner_id: &str, item: &NewWorkItem) -> ServiceResult<WorkItemId> {
        validate_owner(owner_id)?;
        item.validate()?;

        let id = self.repo.create_work_item(owner_id, item)?;
        info!(
            "event=work_item_record module=service status=ok type={}",
            item.item_type
        );
        Ok(id)
    }

    /// Runs a structured lookup, capped at 20 rows.
    pub fn query(
        &self,
        owner_id: &str,
        filter: &QueryFilter,
        today: NaiveDate,
    ) -> ServiceResult<Vec<WorkItemSummary>> {
        validate_owner(owner_id)?;

        let items = self
            .repo
            .find_work_items(&build_filter(filter, owner_id, today))?;
        info!(
            "event=work_item_query module=service status=ok count={}",
            items.len()
        );
        Ok(items)
    }

    /// Parses free text into tags and a keyword, then runs the lookup.
    pub fn smart_query(
        &self,
        owner_id: &str,
        text: &str,
        today: NaiveDate,
    ) -> ServiceResult<SmartQueryResult> {
        let intent = self.parser.parse(text);
        let items = self.query(owner_id, &QueryFilter::from(&intent), today)?;
        Ok(SmartQueryResult { intent, items })
    }

    /// Applies field changes to one item, resolving the target if needed.
    ///
    /// # Errors
    /// - `Validation` for an out-of-range priority or an empty owner.
    /// - `NotFound` when no owner-scoped item matches.
    /// - `Ambiguous` when fuzzy hints match more than one item.
    pub fn update(
        &self,
        owner_id: &str,
        request: &UpdateRequest,
        today: NaiveDate,
    ) -> ServiceResult<UpdateOutcome> {
        validate_owner(owner_id)?;
        request.changes.validate()?;

        let changes = request.changes.clone().normalized();
        if changes.is_empty() {
            return Ok(UpdateOutcome::NoChanges);
        }

        let target = match request.item_id {
            Some(id) => id,
            None => self.resolve_target(owner_id, request, today)?,
        };

        let changed = self.repo.update_work_item(target, owner_id, &changes)?;
        if changed == 0 {
            warn!("event=work_item_update module=service status=not_found");
            return Err(WorkItemServiceError::NotFound {
                item_id: Some(target),
            });
        }

        info!("event=work_item_update module=service status=ok");
        Ok(UpdateOutcome::Updated(target))
    }

    /// Probes the store.
    pub fn health(&self) -> ServiceResult<()> {
        self.repo.ping()?;
        Ok(())
    }

    fn resolve_target(
        &self,
        owner_id: &str,
        request: &UpdateRequest,
        today: NaiveDate,
    ) -> ServiceResult<WorkItemId> {
        let outcome = find_update_target(
            &self.repo,
            owner_id,
            request.keyword.as_deref(),
            request.time_context.as_deref(),
            today,
        )?;

        match outcome {
            Disambiguation::Unique(id) => Ok(id),
            Disambiguation::NoMatch => Err(WorkItemServiceError::NotFound { item_id: None }),
            Disambiguation::Ambiguous(candidates) => {
                Err(WorkItemServiceError::Ambiguous { candidates })
            }
        }
    }
}
