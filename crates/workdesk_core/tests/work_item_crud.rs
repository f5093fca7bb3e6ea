use chrono::NaiveDate;
use rusqlite::{params, Connection};
use workdesk_core::db::migrations::latest_version;
use workdesk_core::db::open_db_in_memory;
use workdesk_core::{
    ItemStatus, ItemType, NewWorkItem, RepoError, SqliteWorkItemRepository, WorkItemChanges,
    WorkItemRepository, WorkItemValidationError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_meeting() -> NewWorkItem {
    NewWorkItem {
        content: Some("明天下午3点有个重要的项目会议，需要准备演示文稿".to_string()),
        project_name: Some("Work Manager".to_string()),
        due_date: Some(date(2024, 6, 13)),
        start_date: Some(date(2024, 6, 13)),
        status: Some(ItemStatus::Todo),
        priority: Some(2),
        tags: vec!["会议".to_string(), "演示".to_string()],
        ..NewWorkItem::new(ItemType::Meeting, "项目会议 - 准备演示文稿")
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWorkItemRepository::try_new(&conn).unwrap();

    let id = repo.create_work_item("alice", &sample_meeting()).unwrap();
    let loaded = repo.get_work_item(id, "alice").unwrap().unwrap();

    assert_eq!(loaded.id, id);
    assert_eq!(loaded.owner_id, "alice");
    assert_eq!(loaded.item_type, ItemType::Meeting);
    assert_eq!(loaded.status, Some(ItemStatus::Todo));
    assert_eq!(loaded.summary, "项目会议 - 准备演示文稿");
    assert_eq!(loaded.project_name.as_deref(), Some("Work Manager"));
    assert_eq!(loaded.due_date, Some(date(2024, 6, 13)));
    assert_eq!(loaded.start_date, Some(date(2024, 6, 13)));
    assert_eq!(loaded.priority, Some(2));
    assert_eq!(loaded.tags, vec!["会议".to_string(), "演示".to_string()]);
    assert_eq!(loaded.created_at, loaded.updated_at);
}

#[test]
fn minimal_item_has_no_optional_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWorkItemRepository::try_new(&conn).unwrap();

    let id = repo
        .create_work_item("alice", &NewWorkItem::new(ItemType::Idea, "batch edit"))
        .unwrap();
    let loaded = repo.get_work_item(id, "alice").unwrap().unwrap();

    assert_eq!(loaded.status, None);
    assert_eq!(loaded.content, None);
    assert_eq!(loaded.priority, None);
    assert!(loaded.tags.is_empty());
}

#[test]
fn items_are_invisible_to_other_owners() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWorkItemRepository::try_new(&conn).unwrap();

    let id = repo.create_work_item("alice", &sample_meeting()).unwrap();

    assert!(repo.get_work_item(id, "bob").unwrap().is_none());
    let changes = WorkItemChanges {
        status: Some(ItemStatus::Cancelled),
        ..WorkItemChanges::default()
    };
    assert_eq!(repo.update_work_item(id, "bob", &changes).unwrap(), 0);

    let loaded = repo.get_work_item(id, "alice").unwrap().unwrap();
    assert_eq!(loaded.status, Some(ItemStatus::Todo));
}

#[test]
fn update_applies_fields_and_refreshes_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWorkItemRepository::try_new(&conn).unwrap();

    let id = repo.create_work_item("alice", &sample_meeting()).unwrap();
    conn.execute(
        "UPDATE work_items SET created_at = ?1, updated_at = ?1 WHERE id = ?2;",
        params!["2024-01-01 08:00:00", id.to_string()],
    )
    .unwrap();

    let changes = WorkItemChanges {
        status: Some(ItemStatus::Completed),
        due_date: Some(date(2024, 7, 1)),
        priority: Some(1),
        summary: Some("项目会议（已改期）".to_string()),
        content: Some("moved to July".to_string()),
    };
    assert_eq!(repo.update_work_item(id, "alice", &changes).unwrap(), 1);

    let loaded = repo.get_work_item(id, "alice").unwrap().unwrap();
    assert_eq!(loaded.status, Some(ItemStatus::Completed));
    assert_eq!(loaded.due_date, Some(date(2024, 7, 1)));
    assert_eq!(loaded.priority, Some(1));
    assert_eq!(loaded.summary, "项目会议（已改期）");
    assert_eq!(loaded.content.as_deref(), Some("moved to July"));
    assert_eq!(loaded.created_at, date(2024, 1, 1).and_hms_opt(8, 0, 0).unwrap());
    assert!(loaded.updated_at > loaded.created_at);
}

#[test]
fn update_of_unknown_id_affects_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWorkItemRepository::try_new(&conn).unwrap();

    let changes = WorkItemChanges {
        priority: Some(3),
        ..WorkItemChanges::default()
    };
    assert_eq!(
        repo.update_work_item(uuid::Uuid::new_v4(), "alice", &changes)
            .unwrap(),
        0
    );
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWorkItemRepository::try_new(&conn).unwrap();

    let mut invalid = sample_meeting();
    invalid.priority = Some(0);
    let create_err = repo.create_work_item("alice", &invalid).unwrap_err();
    assert!(matches!(
        create_err,
        RepoError::Validation(WorkItemValidationError::PriorityOutOfRange(0))
    ));

    let blank = NewWorkItem::new(ItemType::Task, "  ");
    let blank_err = repo.create_work_item("alice", &blank).unwrap_err();
    assert!(matches!(
        blank_err,
        RepoError::Validation(WorkItemValidationError::EmptySummary)
    ));

    let no_owner = repo.create_work_item(" ", &sample_meeting()).unwrap_err();
    assert!(matches!(
        no_owner,
        RepoError::Validation(WorkItemValidationError::EmptyOwner)
    ));

    let id = repo.create_work_item("alice", &sample_meeting()).unwrap();
    let changes = WorkItemChanges {
        priority: Some(6),
        ..WorkItemChanges::default()
    };
    let update_err = repo.update_work_item(id, "alice", &changes).unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
}

#[test]
fn invalid_persisted_tags_are_reported() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWorkItemRepository::try_new(&conn).unwrap();

    let id = repo.create_work_item("alice", &sample_meeting()).unwrap();
    conn.execute(
        "UPDATE work_items SET tags = 'not json' WHERE id = ?1;",
        [id.to_string()],
    )
    .unwrap();

    let err = repo.get_work_item(id, "alice").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn ping_succeeds_on_open_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWorkItemRepository::try_new(&conn).unwrap();
    repo.ping().unwrap();
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteWorkItemRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_work_items_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteWorkItemRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("work_items"))
    ));
}
