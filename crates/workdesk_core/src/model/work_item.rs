//! Work item domain model.
//!
//! # Responsibility
//! - Define the closed vocabularies shared by callers, parser and store.
//! - Define the record, projection and write-request shapes for work items.
//! - Validate client-supplied fields before they reach persistence.
//!
//! # Invariants
//! - Wire strings of `ItemType`, `ItemStatus` and `TimeRange` are fixed.
//! - `id`, `created_at` and `updated_at` are assigned by the store only.
//! - `priority`, when set, is within `1..=5` (1 = most urgent).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier assigned by the store at insert time.
pub type WorkItemId = Uuid;

/// Highest urgency accepted for `priority`.
pub const PRIORITY_MIN: u8 = 1;
/// Lowest urgency accepted for `priority`.
pub const PRIORITY_MAX: u8 = 5;

/// Category of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Task,
    Meeting,
    Issue,
    Idea,
    Note,
    /// Never produced by text parsing; only set explicitly.
    Other,
}

impl ItemType {
    pub const ALL: [ItemType; 6] = [
        ItemType::Task,
        ItemType::Meeting,
        ItemType::Issue,
        ItemType::Idea,
        ItemType::Note,
        ItemType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Meeting => "meeting",
            Self::Issue => "issue",
            Self::Idea => "idea",
            Self::Note => "note",
            Self::Other => "other",
        }
    }
}

/// Lifecycle state of a work item. Absent status means "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Todo,
    InProgress,
    Completed,
    /// Never produced by text parsing; only set explicitly.
    Resolved,
    Cancelled,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 5] = [
        ItemStatus::Todo,
        ItemStatus::InProgress,
        ItemStatus::Completed,
        ItemStatus::Resolved,
        ItemStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Symbolic relative calendar window.
///
/// `Recent` and `PastWeek` resolve to the same interval but select
/// different date fields when filtering; they are intentionally distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Today,
    Tomorrow,
    ThisWeek,
    NextWeek,
    ThisMonth,
    Recent,
    PastWeek,
    PastMonth,
    All,
}

impl TimeRange {
    pub const ALL: [TimeRange; 9] = [
        TimeRange::Today,
        TimeRange::Tomorrow,
        TimeRange::ThisWeek,
        TimeRange::NextWeek,
        TimeRange::ThisMonth,
        TimeRange::Recent,
        TimeRange::PastWeek,
        TimeRange::PastMonth,
        TimeRange::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::ThisWeek => "this_week",
            Self::NextWeek => "next_week",
            Self::ThisMonth => "this_month",
            Self::Recent => "recent",
            Self::PastWeek => "past_week",
            Self::PastMonth => "past_month",
            Self::All => "all",
        }
    }

    /// Maps a free-form tag to a time range, treating unknown tags as absent.
    ///
    /// Used where a tag arrives as loose text (e.g. an update's time
    /// context); an unknown tag means "no date restriction", never an error.
    pub fn from_tag_lenient(tag: &str) -> Option<Self> {
        tag.trim().to_ascii_lowercase().parse().ok()
    }
}

/// Error for strict parsing of a closed vocabulary value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub vocabulary: &'static str,
    pub value: String,
}

impl Display for UnknownVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.vocabulary, self.value)
    }
}

impl Error for UnknownVariant {}

macro_rules! impl_closed_vocabulary {
    ($ty:ident, $name:literal) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .into_iter()
                    .find(|variant| variant.as_str() == value)
                    .ok_or_else(|| UnknownVariant {
                        vocabulary: $name,
                        value: value.to_string(),
                    })
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_closed_vocabulary!(ItemType, "item type");
impl_closed_vocabulary!(ItemStatus, "item status");
impl_closed_vocabulary!(TimeRange, "time range");

/// Validation failures for client-supplied work item fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItemValidationError {
    /// `summary` is empty or whitespace only.
    EmptySummary,
    /// `priority` is outside `1..=5`.
    PriorityOutOfRange(u8),
    /// `owner_id` is empty or whitespace only.
    EmptyOwner,
}

impl Display for WorkItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySummary => write!(f, "summary must not be empty"),
            Self::PriorityOutOfRange(value) => write!(
                f,
                "priority must be between {PRIORITY_MIN} and {PRIORITY_MAX}, got {value}"
            ),
            Self::EmptyOwner => write!(f, "owner id must not be empty"),
        }
    }
}

impl Error for WorkItemValidationError {}

/// Checks an optional priority against the accepted `1..=5` range.
pub fn validate_priority(priority: Option<u8>) -> Result<(), WorkItemValidationError> {
    match priority {
        Some(value) if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&value) => {
            Err(WorkItemValidationError::PriorityOutOfRange(value))
        }
        _ => Ok(()),
    }
}

/// Checks that an owner identity is usable as a tenancy scope.
pub fn validate_owner(owner_id: &str) -> Result<(), WorkItemValidationError> {
    if owner_id.trim().is_empty() {
        return Err(WorkItemValidationError::EmptyOwner);
    }
    Ok(())
}

/// Full persisted work item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub owner_id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub status: Option<ItemStatus>,
    pub summary: String,
    /// Raw user input the item was recorded from.
    pub content: Option<String>,
    pub project_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub priority: Option<u8>,
    pub tags: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Lookup projection returned by filtered queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemSummary {
    pub id: WorkItemId,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub summary: String,
    pub project_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<ItemStatus>,
    pub priority: Option<u8>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Display for WorkItemSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID: {} | type: {} | summary: {}",
            self.id, self.item_type, self.summary
        )?;
        if let Some(project) = &self.project_name {
            write!(f, " | project: {project}")?;
        }
        if let Some(status) = self.status {
            write!(f, " | status: {status}")?;
        }
        if let Some(priority) = self.priority {
            write!(f, " | priority: {priority}")?;
        }
        if let Some(due) = self.due_date {
            write!(f, " | due: {due}")?;
        }
        Ok(())
    }
}

/// Request to record a new work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkItem {
    /// Original user text, stored as the item body.
    pub content: Option<String>,
    pub item_type: ItemType,
    pub summary: String,
    pub project_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub status: Option<ItemStatus>,
    pub priority: Option<u8>,
    pub tags: Vec<String>,
}

impl NewWorkItem {
    /// Creates a request with only the required fields set.
    pub fn new(item_type: ItemType, summary: impl Into<String>) -> Self {
        Self {
            content: None,
            item_type,
            summary: summary.into(),
            project_name: None,
            due_date: None,
            start_date: None,
            status: None,
            priority: None,
            tags: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), WorkItemValidationError> {
        if self.summary.trim().is_empty() {
            return Err(WorkItemValidationError::EmptySummary);
        }
        validate_priority(self.priority)
    }
}

/// Field assignments for an update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemChanges {
    pub status: Option<ItemStatus>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<u8>,
    pub summary: Option<String>,
    pub content: Option<String>,
}

impl WorkItemChanges {
    /// Drops blank text assignments, which callers use to mean "not provided".
    pub fn normalized(mut self) -> Self {
        self.summary = self.summary.filter(|value| !value.trim().is_empty());
        self.content = self.content.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.summary.is_none()
            && self.content.is_none()
    }

    pub fn validate(&self) -> Result<(), WorkItemValidationError> {
        validate_priority(self.priority)
    }
}
