//! Work item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped create/get/find/update over `work_items`.
//! - Compile predicate sets into parameterized SQL.
//!
//! # Invariants
//! - Every statement binds `owner_id`; no row is visible across owners.
//! - Caller values are always bound, never interpolated into SQL text.
//! - Text matching folds case with `unicode_lower` on both sides.
//! - `created_at`/`updated_at` are written by SQL only.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::work_item::{
    validate_owner, ItemStatus, ItemType, NewWorkItem, WorkItem, WorkItemChanges, WorkItemId,
    WorkItemSummary, WorkItemValidationError,
};
use crate::query::filter::{DateField, DateMatch, Predicate, PredicateSet};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOW_SQL: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now', 'localtime')";

const SUMMARY_SELECT_SQL: &str = "SELECT
    id,
    type,
    summary,
    project_name,
    due_date,
    status,
    priority,
    created_at,
    updated_at
FROM work_items";

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    type,
    status,
    summary,
    content,
    project_name,
    due_date,
    start_date,
    priority,
    tags,
    created_at,
    updated_at
FROM work_items";

const ORDER_BY_SQL: &str =
    " ORDER BY due_date IS NULL, due_date ASC, created_at DESC, rowid DESC LIMIT ?";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for work item persistence and lookups.
#[derive(Debug)]
pub enum RepoError {
    Validation(WorkItemValidationError),
    Db(DbError),
    InvalidData(String),
    /// Connection has not been migrated to the schema this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted work item: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WorkItemValidationError> for RepoError {
    fn from(value: WorkItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract consumed by the query core and services.
pub trait WorkItemRepository {
    /// Inserts a new item and returns the store-assigned id.
    fn create_work_item(&self, owner_id: &str, item: &NewWorkItem) -> RepoResult<WorkItemId>;
    fn get_work_item(&self, id: WorkItemId, owner_id: &str) -> RepoResult<Option<WorkItem>>;
    /// Runs an owner-scoped lookup, capped at the set's limit.
    fn find_work_items(&self, filter: &PredicateSet) -> RepoResult<Vec<WorkItemSummary>>;
    /// Applies `changes` and refreshes `updated_at`. Returns affected rows;
    /// `0` means no such id for this owner.
    fn update_work_item(
        &self,
        id: WorkItemId,
        owner_id: &str,
        changes: &WorkItemChanges,
    ) -> RepoResult<usize>;
    /// Round-trips a trivial statement to prove the store is reachable.
    fn ping(&self) -> RepoResult<()>;
}

/// SQLite-backed work item repository.
pub struct SqliteWorkItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkItemRepository<'conn> {
    /// Wraps a connection opened through `open_db`/`open_db_in_memory`.
    ///
    /// Rejects connections that were not migrated to the current schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_table: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'work_items'
            );",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Err(RepoError::MissingRequiredTable("work_items"));
        }

        Ok(Self { conn })
    }
}

impl WorkItemRepository for SqliteWorkItemRepository<'_> {
    fn create_work_item(&self, owner_id: &str, item: &NewWorkItem) -> RepoResult<WorkItemId> {
        validate_owner(owner_id)?;
        item.validate()?;

        let id = Uuid::new_v4();
        let tags = encode_tags(&item.tags)?;
        self.conn.execute(
            "INSERT INTO work_items (
                id,
                owner_id,
                type,
                status,
                summary,
                content,
                project_name,
                due_date,
                start_date,
                priority,
                tags
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                id.to_string(),
                owner_id,
                item.item_type.as_str(),
                item.status.map(ItemStatus::as_str),
                item.summary.trim(),
                item.content.as_deref(),
                item.project_name.as_deref(),
                item.due_date,
                item.start_date,
                item.priority,
                tags,
            ],
        )?;

        Ok(id)
    }

    fn get_work_item(&self, id: WorkItemId, owner_id: &str) -> RepoResult<Option<WorkItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1 AND owner_id = ?2;"))?;
        let mut rows = stmt.query(params![id.to_string(), owner_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_item_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_work_items(&self, filter: &PredicateSet) -> RepoResult<Vec<WorkItemSummary>> {
        let mut sql = format!("{SUMMARY_SELECT_SQL} WHERE owner_id = ?");
        let mut bind_values = vec![Value::Text(filter.owner_id().to_string())];

        for predicate in filter.predicates() {
            push_predicate(&mut sql, &mut bind_values, predicate);
        }

        sql.push_str(ORDER_BY_SQL);
        bind_values.push(Value::Integer(i64::from(filter.limit())));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_summary_row(row)?);
        }

        Ok(items)
    }

    fn update_work_item(
        &self,
        id: WorkItemId,
        owner_id: &str,
        changes: &WorkItemChanges,
    ) -> RepoResult<usize> {
        changes.validate()?;

        let updated_at = format!("updated_at = {NOW_SQL}");
        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = changes.status {
            assignments.push("status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(due_date) = changes.due_date {
            assignments.push("due_date = ?");
            bind_values.push(Value::Text(due_date.to_string()));
        }
        if let Some(priority) = changes.priority {
            assignments.push("priority = ?");
            bind_values.push(Value::Integer(i64::from(priority)));
        }
        if let Some(summary) = &changes.summary {
            assignments.push("summary = ?");
            bind_values.push(Value::Text(summary.trim().to_string()));
        }
        if let Some(content) = &changes.content {
            assignments.push("content = ?");
            bind_values.push(Value::Text(content.clone()));
        }

        assignments.push(updated_at.as_str());
        bind_values.push(Value::Text(id.to_string()));
        bind_values.push(Value::Text(owner_id.to_string()));

        let sql = format!(
            "UPDATE work_items SET {} WHERE id = ? AND owner_id = ?;",
            assignments.join(", ")
        );
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }

    fn ping(&self) -> RepoResult<()> {
        self.conn
            .query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn push_predicate(sql: &mut String, bind_values: &mut Vec<Value>, predicate: &Predicate) {
    match predicate {
        Predicate::IdEquals(id) => {
            sql.push_str(" AND id = ?");
            bind_values.push(Value::Text(id.to_string()));
        }
        Predicate::ProjectContains(project) => {
            sql.push_str(
                " AND instr(unicode_lower(COALESCE(project_name, '')), unicode_lower(?)) > 0",
            );
            bind_values.push(Value::Text(project.clone()));
        }
        Predicate::TypeEquals(kind) => {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }
        Predicate::StatusEquals(status) => {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        Predicate::KeywordContains(keyword) => {
            sql.push_str(
                " AND (instr(unicode_lower(summary), unicode_lower(?)) > 0
                    OR instr(unicode_lower(COALESCE(content, '')), unicode_lower(?)) > 0)",
            );
            bind_values.push(Value::Text(keyword.clone()));
            bind_values.push(Value::Text(keyword.clone()));
        }
        Predicate::DateWithin { fields, window } => {
            let clauses = fields
                .iter()
                .map(|field| {
                    let column = date_column(*field);
                    match window {
                        DateMatch::On(day) => {
                            bind_values.push(Value::Text(day.to_string()));
                            format!("{column} = ?")
                        }
                        DateMatch::Between { start, end } => {
                            bind_values.push(Value::Text(start.to_string()));
                            bind_values.push(Value::Text(end.to_string()));
                            format!("{column} BETWEEN ? AND ?")
                        }
                    }
                })
                .collect::<Vec<_>>();
            sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
        }
    }
}

fn date_column(field: DateField) -> &'static str {
    match field {
        DateField::CreatedAt => "date(created_at)",
        DateField::DueDate => "due_date",
        DateField::StartDate => "start_date",
    }
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<WorkItemSummary> {
    Ok(WorkItemSummary {
        id: parse_id(row)?,
        item_type: parse_type(row)?,
        summary: row.get("summary")?,
        project_name: row.get("project_name")?,
        due_date: row.get("due_date")?,
        status: parse_status(row)?,
        priority: row.get("priority")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<WorkItem> {
    Ok(WorkItem {
        id: parse_id(row)?,
        owner_id: row.get("owner_id")?,
        item_type: parse_type(row)?,
        status: parse_status(row)?,
        summary: row.get("summary")?,
        content: row.get("content")?,
        project_name: row.get("project_name")?,
        due_date: row.get("due_date")?,
        start_date: row.get("start_date")?,
        priority: row.get("priority")?,
        tags: decode_tags(row.get("tags")?)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_id(row: &Row<'_>) -> RepoResult<WorkItemId> {
    let id_text: String = row.get("id")?;
    Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid id value `{id_text}` in work_items.id"))
    })
}

fn parse_type(row: &Row<'_>) -> RepoResult<ItemType> {
    let type_text: String = row.get("type")?;
    type_text
        .parse()
        .map_err(|_| RepoError::InvalidData(format!("invalid type `{type_text}` in work_items.type")))
}

fn parse_status(row: &Row<'_>) -> RepoResult<Option<ItemStatus>> {
    match row.get::<_, Option<String>>("status")? {
        Some(value) => value.parse().map(Some).map_err(|_| {
            RepoError::InvalidData(format!("invalid status `{value}` in work_items.status"))
        }),
        None => Ok(None),
    }
}

fn encode_tags(tags: &[String]) -> RepoResult<Option<String>> {
    if tags.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(tags)
        .map(Some)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode tags: {err}")))
}

fn decode_tags(raw: Option<String>) -> RepoResult<Vec<String>> {
    match raw {
        Some(text) => serde_json::from_str(&text)
            .map_err(|err| RepoError::InvalidData(format!("invalid tags json in work_items.tags: {err}"))),
        None => Ok(Vec::new()),
    }
}
