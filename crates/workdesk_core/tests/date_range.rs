use chrono::NaiveDate;
use workdesk_core::{resolve_date_range, DateRange, TimeRange};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// 2024-12-18 is a Wednesday.
fn today() -> NaiveDate {
    date(2024, 12, 18)
}

#[test]
fn every_tag_matches_the_policy_table() {
    let cases = [
        ("today", Some(date(2024, 12, 18)), Some(date(2024, 12, 18))),
        ("tomorrow", Some(date(2024, 12, 19)), Some(date(2024, 12, 19))),
        ("this_week", Some(date(2024, 12, 16)), Some(date(2024, 12, 22))),
        ("next_week", Some(date(2024, 12, 23)), Some(date(2024, 12, 29))),
        ("this_month", Some(date(2024, 12, 1)), Some(date(2024, 12, 31))),
        ("recent", Some(date(2024, 12, 11)), Some(date(2024, 12, 18))),
        ("past_week", Some(date(2024, 12, 11)), Some(date(2024, 12, 18))),
        ("past_month", Some(date(2024, 11, 18)), Some(date(2024, 12, 18))),
        ("all", None, None),
    ];

    for (tag, start, end) in cases {
        assert_eq!(
            resolve_date_range(tag, today()).as_tuple(),
            (start, end),
            "tag {tag}"
        );
    }
}

#[test]
fn this_month_in_december_rolls_over_year_boundary() {
    let range = TimeRange::ThisMonth.resolve(date(2023, 12, 31));
    assert_eq!(range, DateRange::between(date(2023, 12, 1), date(2023, 12, 31)));
}

#[test]
fn next_week_from_sunday_starts_the_following_day() {
    let range = TimeRange::NextWeek.resolve(date(2024, 12, 22));
    assert_eq!(range, DateRange::between(date(2024, 12, 23), date(2024, 12, 29)));
}

#[test]
fn tomorrow_crosses_year_end() {
    let range = TimeRange::Tomorrow.resolve(date(2024, 12, 31));
    assert_eq!(range, DateRange::single_day(date(2025, 1, 1)));
}

#[test]
fn recent_and_past_week_share_an_interval() {
    assert_eq!(
        TimeRange::Recent.resolve(today()),
        TimeRange::PastWeek.resolve(today())
    );
}

#[test]
fn unknown_tags_degrade_to_no_restriction() {
    for tag in ["", "someday", "last_year", "this week"] {
        assert!(resolve_date_range(tag, today()).is_unbounded(), "tag {tag:?}");
    }
}

#[test]
fn resolution_is_deterministic_for_fixed_today() {
    for range in TimeRange::ALL {
        assert_eq!(range.resolve(today()), range.resolve(today()));
    }
}
