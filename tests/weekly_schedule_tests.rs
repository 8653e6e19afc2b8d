use proptest::prelude::*;
use school_schedule::{
    ClockTime, SchoolDay, TimetableEntry, format_summary, group_by_day, summarize_day,
};

fn entry(subject: &str, day: SchoolDay, start: &str, end: &str) -> TimetableEntry {
    TimetableEntry::parse(subject, day, start, end, "Main Hall").unwrap()
}

fn times(entries: &[TimetableEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| format!("{}-{}", e.start_time, e.end_time))
        .collect()
}

#[test]
fn groups_and_sorts_sample_week() {
    let week = group_by_day(vec![
        entry("Science", SchoolDay::Wednesday, "11:00", "12:00"),
        entry("Maths", SchoolDay::Monday, "09:00", "10:30"),
        entry("Reading", SchoolDay::Monday, "08:00", "08:50"),
    ])
    .unwrap();

    assert_eq!(
        times(week.day(SchoolDay::Monday)),
        vec!["08:00-08:50", "09:00-10:30"]
    );
    assert_eq!(times(week.day(SchoolDay::Wednesday)), vec!["11:00-12:00"]);
    for day in [SchoolDay::Tuesday, SchoolDay::Thursday, SchoolDay::Friday] {
        assert!(week.day(day).is_empty(), "{day} should be empty");
    }
}

#[test]
fn summary_strings_match_display_format() {
    let day = vec![
        entry("Maths", SchoolDay::Monday, "9:00", "10:30"),
        entry("English", SchoolDay::Monday, "11:00", "11:50"),
    ];
    let summary = summarize_day(&day).unwrap();
    assert_eq!(summary.class_count, 2);
    assert_eq!(summary.total_minutes, 140);
    assert_eq!(
        format_summary(summary.class_count, summary.total_minutes),
        "2h 20m • 2 Subjects"
    );

    let even = vec![
        entry("Maths", SchoolDay::Monday, "9:00", "10:00"),
        entry("English", SchoolDay::Monday, "10:00", "11:00"),
    ];
    assert_eq!(summarize_day(&even).unwrap().label(), "2 hrs • 2 Subjects");
}

#[test]
fn summarize_day_rejects_inverted_entry() {
    let mut bad = entry("Maths", SchoolDay::Monday, "9:00", "10:00");
    bad.start_time = ClockTime::from_hm(11, 0).unwrap();
    let err = summarize_day(&[bad]).unwrap_err();
    assert_eq!(err.kind(), "invalid_time_range");
}

#[test]
fn day_views_cover_every_day_with_labels() {
    let week = group_by_day(vec![entry("Art", SchoolDay::Friday, "13:00", "14:15")]).unwrap();
    let views = week.day_views();
    assert_eq!(views.len(), 5);
    assert_eq!(views[0].day, SchoolDay::Monday);
    assert_eq!(views[0].label, "0 hrs • 0 Subjects");
    assert_eq!(views[4].label, "1h 15m • 1 Subjects");
}

#[test]
fn grouped_week_serializes_with_all_days() {
    let week = group_by_day(vec![entry("Art", SchoolDay::Friday, "13:00", "14:15")]).unwrap();
    let json = serde_json::to_value(&week).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 5);
    assert_eq!(json["friday"][0]["subject_name"], "Art");
    assert_eq!(json["monday"], serde_json::json!([]));
}

fn entry_strategy() -> impl Strategy<Value = TimetableEntry> {
    (0usize..5, 7u32 * 60..17 * 60, 10u32..120, 0u8..4).prop_map(|(day, start, len, subject)| {
        let start_time = ClockTime::from_hm(start / 60, start % 60).unwrap();
        let end = start + len;
        let end_time = ClockTime::from_hm(end / 60, end % 60).unwrap();
        TimetableEntry::new(
            format!("Subject {subject}"),
            SchoolDay::ALL[day],
            start_time,
            end_time,
            "R",
        )
        .unwrap()
    })
}

proptest! {
    #[test]
    fn grouping_is_deterministic_and_sorted(entries in prop::collection::vec(entry_strategy(), 0..30)) {
        let first = group_by_day(entries.clone()).unwrap();
        let second = group_by_day(entries.clone()).unwrap();
        prop_assert_eq!(&first, &second);

        let mut total = 0;
        for (day, day_entries) in first.iter() {
            total += day_entries.len();
            prop_assert!(day_entries.iter().all(|e| e.weekday == day));
            prop_assert!(day_entries.windows(2).all(|w| w[0].start_time <= w[1].start_time));
        }
        prop_assert_eq!(total, entries.len());
        prop_assert_eq!(first.week_summary().class_count, entries.len());
    }

    #[test]
    fn order_of_distinct_start_times_does_not_matter(mut entries in prop::collection::vec(entry_strategy(), 0..20)) {
        entries.sort_by_key(|e| (e.weekday, e.start_time));
        entries.dedup_by_key(|e| (e.weekday, e.start_time));
        let forward = group_by_day(entries.clone()).unwrap();
        entries.reverse();
        let backward = group_by_day(entries).unwrap();
        prop_assert_eq!(forward, backward);
    }
}
