//! Filter assembly for owner-scoped work item lookups.
//!
//! # Responsibility
//! - Turn structured or parsed query hints into a conjunctive predicate set.
//! - Decide which date fields participate for each time-range tag.
//!
//! # Invariants
//! - Every `PredicateSet` carries its owner scope; it cannot be built
//!   without one.
//! - Predicates are AND-combined. Alternatives inside one predicate (keyword
//!   over summary/content, date over several fields) are OR-combined.
//! - Lookups return at most `RESULT_LIMIT` rows, ordered by due date
//!   ascending with undated items last, then creation time descending.

use crate::model::work_item::{ItemStatus, ItemType, TimeRange, WorkItemId};
use crate::query::date_range::DateRange;
use crate::query::intent::ParsedIntent;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

/// Hard cap on rows returned by one lookup.
pub const RESULT_LIMIT: u32 = 20;

/// Structured lookup request. Every field is optional and additive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub item_id: Option<WorkItemId>,
    pub project_name: Option<String>,
    pub item_type: Option<ItemType>,
    pub status: Option<ItemStatus>,
    pub keyword: Option<String>,
    pub time_range: Option<TimeRange>,
}

impl From<&ParsedIntent> for QueryFilter {
    fn from(intent: &ParsedIntent) -> Self {
        Self {
            item_type: intent.item_type,
            status: intent.status,
            keyword: intent.keyword.clone(),
            time_range: intent.time_range,
            ..Self::default()
        }
    }
}

/// Date column a time window may be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    /// Calendar day of the creation timestamp.
    CreatedAt,
    DueDate,
    StartDate,
}

/// Inclusive day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMatch {
    On(NaiveDate),
    Between { start: NaiveDate, end: NaiveDate },
}

impl DateMatch {
    /// Collapses a resolved range; a single-day range becomes `On`.
    pub fn from_range(range: DateRange) -> Option<Self> {
        match range.as_tuple() {
            (Some(start), Some(end)) if start == end => Some(Self::On(start)),
            (Some(start), Some(end)) => Some(Self::Between { start, end }),
            _ => None,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        match *self {
            Self::On(target) => day == target,
            Self::Between { start, end } => start <= day && day <= end,
        }
    }
}

/// One conjunct of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    IdEquals(WorkItemId),
    /// Case-insensitive substring on `project_name`.
    ProjectContains(String),
    TypeEquals(ItemType),
    StatusEquals(ItemStatus),
    /// Case-insensitive substring on `summary` OR `content`.
    KeywordContains(String),
    /// Any of `fields` falls inside `window`.
    DateWithin {
        fields: &'static [DateField],
        window: DateMatch,
    },
}

/// Owner-scoped conjunctive predicate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSet {
    owner_id: String,
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    /// Creates a set with only the mandatory owner conjunct.
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            predicates: Vec::new(),
        }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn limit(&self) -> u32 {
        RESULT_LIMIT
    }
}

impl TimeRange {
    /// Date fields checked when filtering by this tag.
    ///
    /// - `recent` casts a wide net: created, due or started in range.
    /// - `past_week` / `past_month` mean "created in the past N".
    /// - Calendar tags look at due and start dates.
    /// - `all` adds no date predicate.
    pub fn date_fields(self) -> &'static [DateField] {
        match self {
            Self::Recent => &[DateField::CreatedAt, DateField::DueDate, DateField::StartDate],
            Self::PastWeek | Self::PastMonth => &[DateField::CreatedAt],
            Self::Today | Self::Tomorrow | Self::ThisWeek | Self::NextWeek | Self::ThisMonth => {
                &[DateField::DueDate, DateField::StartDate]
            }
            Self::All => &[],
        }
    }
}

/// Builds the predicate set for `filter`, scoped to `owner_id`.
pub fn build_filter(filter: &QueryFilter, owner_id: &str, today: NaiveDate) -> PredicateSet {
    let mut set = PredicateSet::for_owner(owner_id);

    if let Some(id) = filter.item_id {
        set = set.with(Predicate::IdEquals(id));
    }
    if let Some(project) = non_blank(filter.project_name.as_deref()) {
        set = set.with(Predicate::ProjectContains(project.to_string()));
    }
    if let Some(kind) = filter.item_type {
        set = set.with(Predicate::TypeEquals(kind));
    }
    if let Some(status) = filter.status {
        set = set.with(Predicate::StatusEquals(status));
    }
    if let Some(keyword) = non_blank(filter.keyword.as_deref()) {
        set = set.with(Predicate::KeywordContains(keyword.to_string()));
    }
    if let Some(range) = filter.time_range {
        let fields = range.date_fields();
        if let Some(window) = DateMatch::from_range(range.resolve(today)) {
            if !fields.is_empty() {
                set = set.with(Predicate::DateWithin { fields, window });
            }
        }
    }

    debug!(
        "event=filter_build module=query status=ok predicates={} time_range={}",
        set.predicates().len(),
        filter.time_range.map_or("none", TimeRange::as_str)
    );
    set
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
