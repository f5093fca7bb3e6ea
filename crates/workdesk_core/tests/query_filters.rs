use chrono::NaiveDate;
use rusqlite::{params, Connection};
use workdesk_core::db::open_db_in_memory;
use workdesk_core::{
    build_filter, ItemStatus, ItemType, NewWorkItem, QueryFilter, SqliteWorkItemRepository,
    TimeRange, WorkItemId, WorkItemRepository, WorkItemService, RESULT_LIMIT,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// 2024-06-12 is a Wednesday.
fn today() -> NaiveDate {
    date(2024, 6, 12)
}

struct Fixture {
    conn: Connection,
}

impl Fixture {
    fn new() -> Self {
        Self {
            conn: open_db_in_memory().unwrap(),
        }
    }

    fn repo(&self) -> SqliteWorkItemRepository<'_> {
        SqliteWorkItemRepository::try_new(&self.conn).unwrap()
    }

    fn insert(&self, owner: &str, item: NewWorkItem, created_at: &str) -> WorkItemId {
        let id = self.repo().create_work_item(owner, &item).unwrap();
        self.conn
            .execute(
                "UPDATE work_items SET created_at = ?1, updated_at = ?1 WHERE id = ?2;",
                params![created_at, id.to_string()],
            )
            .unwrap();
        id
    }

    fn find(&self, owner: &str, filter: &QueryFilter) -> Vec<WorkItemId> {
        self.repo()
            .find_work_items(&build_filter(filter, owner, today()))
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect()
    }
}

fn task(summary: &str) -> NewWorkItem {
    NewWorkItem::new(ItemType::Task, summary)
}

fn due(summary: &str, due_date: NaiveDate) -> NewWorkItem {
    NewWorkItem {
        due_date: Some(due_date),
        ..task(summary)
    }
}

fn with_range(time_range: TimeRange) -> QueryFilter {
    QueryFilter {
        time_range: Some(time_range),
        ..QueryFilter::default()
    }
}

#[test]
fn identical_filters_never_cross_owners() {
    let fixture = Fixture::new();
    let alice = fixture.insert("alice", task("shared name"), "2024-06-10 09:00:00");
    let bob = fixture.insert("bob", task("shared name"), "2024-06-10 09:00:00");

    let filter = QueryFilter {
        keyword: Some("shared".to_string()),
        ..QueryFilter::default()
    };
    assert_eq!(fixture.find("alice", &filter), vec![alice]);
    assert_eq!(fixture.find("bob", &filter), vec![bob]);
    assert!(fixture.find("carol", &QueryFilter::default()).is_empty());
}

#[test]
fn past_week_only_inspects_creation_date() {
    let fixture = Fixture::new();
    let due_in_range = fixture.insert(
        "alice",
        due("old item due soon", date(2024, 6, 10)),
        "2024-05-01 09:00:00",
    );
    let created_in_range = fixture.insert(
        "alice",
        due("new item due later", date(2024, 8, 1)),
        "2024-06-10 09:00:00",
    );

    let found = fixture.find("alice", &with_range(TimeRange::PastWeek));
    assert_eq!(found, vec![created_in_range]);
    assert!(!found.contains(&due_in_range));
}

#[test]
fn past_month_uses_thirty_day_creation_window() {
    let fixture = Fixture::new();
    let inside = fixture.insert("alice", task("inside"), "2024-05-13 23:59:59");
    fixture.insert("alice", task("outside"), "2024-05-12 12:00:00");

    assert_eq!(
        fixture.find("alice", &with_range(TimeRange::PastMonth)),
        vec![inside]
    );
}

#[test]
fn recent_matches_creation_due_or_start_date() {
    let fixture = Fixture::new();
    let created = fixture.insert("alice", task("just created"), "2024-06-11 10:00:00");
    let due_soon = fixture.insert(
        "alice",
        due("old but due", date(2024, 6, 12)),
        "2024-04-01 10:00:00",
    );
    let started = fixture.insert(
        "alice",
        NewWorkItem {
            start_date: Some(date(2024, 6, 5)),
            ..task("old but started")
        },
        "2024-04-01 10:00:00",
    );
    fixture.insert("alice", task("stale"), "2024-04-01 10:00:00");

    let mut found = fixture.find("alice", &with_range(TimeRange::Recent));
    found.sort();
    let mut expected = vec![created, due_soon, started];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn today_matches_due_or_start_date_but_not_creation() {
    let fixture = Fixture::new();
    let due_today = fixture.insert("alice", due("due today", today()), "2024-06-01 10:00:00");
    let starts_today = fixture.insert(
        "alice",
        NewWorkItem {
            start_date: Some(today()),
            ..task("starts today")
        },
        "2024-06-01 10:00:00",
    );
    fixture.insert("alice", task("created today"), "2024-06-12 08:00:00");

    let mut found = fixture.find("alice", &with_range(TimeRange::Today));
    found.sort();
    let mut expected = vec![due_today, starts_today];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn this_week_bounds_are_monday_through_sunday() {
    let fixture = Fixture::new();
    let monday = fixture.insert("alice", due("monday", date(2024, 6, 10)), "2024-06-01 10:00:00");
    let sunday = fixture.insert("alice", due("sunday", date(2024, 6, 16)), "2024-06-01 10:00:00");
    fixture.insert("alice", due("prev sunday", date(2024, 6, 9)), "2024-06-01 10:00:00");
    fixture.insert("alice", due("next monday", date(2024, 6, 17)), "2024-06-01 10:00:00");

    assert_eq!(
        fixture.find("alice", &with_range(TimeRange::ThisWeek)),
        vec![monday, sunday]
    );
}

#[test]
fn all_adds_no_date_restriction() {
    let fixture = Fixture::new();
    fixture.insert("alice", task("undated"), "2020-01-01 10:00:00");
    fixture.insert("alice", due("far future", date(2030, 1, 1)), "2024-06-01 10:00:00");

    assert_eq!(fixture.find("alice", &with_range(TimeRange::All)).len(), 2);
}

#[test]
fn keyword_matches_summary_or_content_case_insensitively() {
    let fixture = Fixture::new();
    let in_summary = fixture.insert("alice", task("Weekly REPORT"), "2024-06-01 10:00:00");
    let in_content = fixture.insert(
        "alice",
        NewWorkItem {
            content: Some("draft the report outline".to_string()),
            ..task("outline")
        },
        "2024-06-01 09:00:00",
    );
    fixture.insert("alice", task("unrelated"), "2024-06-01 08:00:00");

    let filter = QueryFilter {
        keyword: Some("Report".to_string()),
        ..QueryFilter::default()
    };
    assert_eq!(fixture.find("alice", &filter), vec![in_summary, in_content]);
}

#[test]
fn keyword_and_project_fold_non_ascii_case() {
    let fixture = Fixture::new();
    let report = fixture.insert(
        "alice",
        NewWorkItem {
            project_name: Some("Équipe СЕВЕР".to_string()),
            ..task("ÉTUDE Отчёт")
        },
        "2024-06-01 10:00:00",
    );
    fixture.insert("alice", task("etude otchet"), "2024-06-01 09:00:00");

    for keyword in ["отчёт", "ОТЧЁТ", "étude", "Étude"] {
        let filter = QueryFilter {
            keyword: Some(keyword.to_string()),
            ..QueryFilter::default()
        };
        assert_eq!(fixture.find("alice", &filter), vec![report], "keyword {keyword}");
    }

    let by_project = QueryFilter {
        project_name: Some("équipe север".to_string()),
        ..QueryFilter::default()
    };
    assert_eq!(fixture.find("alice", &by_project), vec![report]);
}

#[test]
fn smart_query_finds_items_by_their_own_title() {
    let fixture = Fixture::new();
    let accented = fixture.insert("alice", task("ÉTUDE Отчёт"), "2024-06-01 10:00:00");
    let versioned = fixture.insert("alice", task("v1.2发布"), "2024-06-01 10:00:00");
    let service = WorkItemService::new(fixture.repo());

    let result = service.smart_query("alice", "ÉTUDE", today()).unwrap();
    assert_eq!(result.intent.keyword.as_deref(), Some("étude"));
    let ids: Vec<WorkItemId> = result.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![accented]);

    let result = service.smart_query("alice", "v1.2发布", today()).unwrap();
    let ids: Vec<WorkItemId> = result.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![versioned]);
}

#[test]
fn project_type_status_and_id_filters_combine() {
    let fixture = Fixture::new();
    let wanted = fixture.insert(
        "alice",
        NewWorkItem {
            project_name: Some("Work Manager".to_string()),
            status: Some(ItemStatus::InProgress),
            ..task("auth module")
        },
        "2024-06-01 10:00:00",
    );
    fixture.insert(
        "alice",
        NewWorkItem {
            project_name: Some("Work Manager".to_string()),
            status: Some(ItemStatus::Completed),
            ..task("done module")
        },
        "2024-06-01 10:00:00",
    );
    fixture.insert(
        "alice",
        NewWorkItem {
            project_name: Some("Work Manager".to_string()),
            status: Some(ItemStatus::InProgress),
            ..NewWorkItem::new(ItemType::Meeting, "sync")
        },
        "2024-06-01 10:00:00",
    );

    let filter = QueryFilter {
        project_name: Some("work man".to_string()),
        item_type: Some(ItemType::Task),
        status: Some(ItemStatus::InProgress),
        ..QueryFilter::default()
    };
    assert_eq!(fixture.find("alice", &filter), vec![wanted]);

    let by_id = QueryFilter {
        item_id: Some(wanted),
        ..QueryFilter::default()
    };
    assert_eq!(fixture.find("alice", &by_id), vec![wanted]);
    assert!(fixture.find("bob", &by_id).is_empty());
}

#[test]
fn results_are_capped_and_ordered_by_due_date_then_newest() {
    let fixture = Fixture::new();
    let mut dated = Vec::new();
    let mut undated = Vec::new();

    for i in 0..25u32 {
        let created_at = format!("2024-06-01 10:{i:02}:00");
        if i < 15 {
            let id = fixture.insert("alice", due("dated", date(2024, 7, 15 - i)), &created_at);
            dated.push((15 - i, id));
        } else {
            undated.push(fixture.insert("alice", task("undated"), &created_at));
        }
    }

    let found = fixture.find("alice", &QueryFilter::default());
    assert_eq!(found.len(), RESULT_LIMIT as usize);

    dated.sort_by_key(|(day, _)| *day);
    let mut expected: Vec<WorkItemId> = dated.into_iter().map(|(_, id)| id).collect();
    expected.extend(undated.iter().rev().take(5));
    assert_eq!(found, expected);
}

#[test]
fn equal_due_dates_put_most_recently_created_first() {
    let fixture = Fixture::new();
    let older = fixture.insert("alice", due("older", date(2024, 7, 1)), "2024-06-01 09:00:00");
    let newer = fixture.insert("alice", due("newer", date(2024, 7, 1)), "2024-06-02 09:00:00");

    assert_eq!(
        fixture.find("alice", &QueryFilter::default()),
        vec![newer, older]
    );
}
