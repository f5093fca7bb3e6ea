//! Core domain logic for Workdesk.
//!
//! Records, queries and updates owner-scoped work items, resolving loose
//! natural-language hints into deterministic, parameterized lookups.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod owner;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, WorkdeskConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::work_item::{
    ItemStatus, ItemType, NewWorkItem, TimeRange, WorkItem, WorkItemChanges, WorkItemId,
    WorkItemSummary, WorkItemValidationError,
};
pub use owner::{owner_id_from_headers, DEFAULT_OWNER_ID};
pub use query::date_range::{resolve_date_range, DateRange};
pub use query::disambiguate::{disambiguate, find_update_target, Disambiguation};
pub use query::filter::{
    build_filter, DateField, DateMatch, Predicate, PredicateSet, QueryFilter, RESULT_LIMIT,
};
pub use query::intent::{parse_intent, IntentParser, ParsedIntent};
pub use repo::work_item_repo::{
    RepoError, RepoResult, SqliteWorkItemRepository, WorkItemRepository,
};
pub use service::work_item_service::{
    ServiceResult, SmartQueryResult, UpdateOutcome, UpdateRequest, WorkItemService,
    WorkItemServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
