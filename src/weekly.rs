//! Weekly timetable aggregation: bucket entries by school day, order each
//! day chronologically and total the teaching time.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timetable::{SchoolDay, TimetableEntry, TimetableError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub class_count: usize,
    pub total_minutes: u32,
}

impl DaySummary {
    pub fn label(&self) -> String {
        format_summary(self.class_count, self.total_minutes)
    }

    fn tally(entries: &[TimetableEntry]) -> Self {
        Self {
            class_count: entries.len(),
            total_minutes: entries.iter().map(TimetableEntry::duration_minutes).sum(),
        }
    }
}

/// Timetable entries grouped per school day. All five days are always
/// present; each day is sorted by start time, ties keeping input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: BTreeMap<SchoolDay, Vec<TimetableEntry>>,
}

/// One day of the week as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayView {
    pub day: SchoolDay,
    pub entries: Vec<TimetableEntry>,
    pub summary: DaySummary,
    pub label: String,
}

pub fn group_by_day<I>(entries: I) -> Result<WeeklySchedule, TimetableError>
where
    I: IntoIterator<Item = TimetableEntry>,
{
    let mut days: BTreeMap<SchoolDay, Vec<TimetableEntry>> = SchoolDay::ALL
        .iter()
        .map(|day| (*day, Vec::new()))
        .collect();

    for entry in entries {
        entry.validate()?;
        days.entry(entry.weekday).or_default().push(entry);
    }

    for day_entries in days.values_mut() {
        // sort_by_key is stable
        day_entries.sort_by_key(|entry| entry.start_time);
    }

    Ok(WeeklySchedule { days })
}

/// Class count and summed duration for one day's entries. Overlapping
/// entries are counted independently.
pub fn summarize_day(day_entries: &[TimetableEntry]) -> Result<DaySummary, TimetableError> {
    for entry in day_entries {
        entry.validate()?;
    }
    Ok(DaySummary::tally(day_entries))
}

/// Renders "2h 20m • 2 Subjects", or "2 hrs • 2 Subjects" on a whole hour.
pub fn format_summary(class_count: usize, total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if minutes > 0 {
        format!("{hours}h {minutes}m • {class_count} Subjects")
    } else {
        format!("{hours} hrs • {class_count} Subjects")
    }
}

impl WeeklySchedule {
    pub fn day(&self, day: SchoolDay) -> &[TimetableEntry] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (SchoolDay, &[TimetableEntry])> + '_ {
        self.days.iter().map(|(day, entries)| (*day, entries.as_slice()))
    }

    pub fn summary(&self, day: SchoolDay) -> DaySummary {
        DaySummary::tally(self.day(day))
    }

    pub fn week_summary(&self) -> DaySummary {
        self.iter()
            .map(|(_, entries)| DaySummary::tally(entries))
            .fold(DaySummary::default(), |acc, day| DaySummary {
                class_count: acc.class_count + day.class_count,
                total_minutes: acc.total_minutes + day.total_minutes,
            })
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }

    pub fn day_views(&self) -> Vec<DayView> {
        self.iter()
            .map(|(day, entries)| {
                let summary = DaySummary::tally(entries);
                DayView {
                    day,
                    entries: entries.to_vec(),
                    summary,
                    label: summary.label(),
                }
            })
            .collect()
    }

    /// Flattens the week into one row per entry, in day then start order.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut days: Vec<&str> = Vec::new();
        let mut starts: Vec<String> = Vec::new();
        let mut ends: Vec<String> = Vec::new();
        let mut subjects: Vec<&str> = Vec::new();
        let mut rooms: Vec<&str> = Vec::new();
        let mut minutes: Vec<i64> = Vec::new();

        for (day, entries) in self.iter() {
            for entry in entries {
                days.push(day.as_str());
                starts.push(entry.start_time.to_string());
                ends.push(entry.end_time.to_string());
                subjects.push(entry.subject_name.as_str());
                rooms.push(entry.room.as_str());
                minutes.push(i64::from(entry.duration_minutes()));
            }
        }

        let columns: Vec<Column> = vec![
            Series::new(PlSmallStr::from_static("day"), days).into_column(),
            Series::new(PlSmallStr::from_static("start"), starts).into_column(),
            Series::new(PlSmallStr::from_static("end"), ends).into_column(),
            Series::new(PlSmallStr::from_static("subject"), subjects).into_column(),
            Series::new(PlSmallStr::from_static("room"), rooms).into_column(),
            Series::new(PlSmallStr::from_static("minutes"), minutes).into_column(),
        ];
        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(subject: &str, day: SchoolDay, start: &str, end: &str) -> TimetableEntry {
        TimetableEntry::parse(subject, day, start, end, "R1").unwrap()
    }

    #[test]
    fn every_day_present_even_when_empty() {
        let week = group_by_day(Vec::new()).unwrap();
        assert!(week.is_empty());
        assert_eq!(week.iter().count(), 5);
        assert_eq!(week.summary(SchoolDay::Friday), DaySummary::default());
    }

    #[test]
    fn sorts_across_hour_boundary() {
        let week = group_by_day(vec![
            entry("Physics", SchoolDay::Monday, "10:30", "11:30"),
            entry("English", SchoolDay::Monday, "9:00", "10:00"),
        ])
        .unwrap();
        let subjects: Vec<_> = week
            .day(SchoolDay::Monday)
            .iter()
            .map(|e| e.subject_name.as_str())
            .collect();
        assert_eq!(subjects, vec!["English", "Physics"]);
    }

    #[test]
    fn equal_start_times_keep_input_order() {
        let week = group_by_day(vec![
            entry("B", SchoolDay::Tuesday, "9:00", "9:45"),
            entry("A", SchoolDay::Tuesday, "9:00", "10:00"),
        ])
        .unwrap();
        assert_eq!(week.day(SchoolDay::Tuesday)[0].subject_name, "B");
        assert_eq!(week.day(SchoolDay::Tuesday)[1].subject_name, "A");
    }

    #[test]
    fn invalid_entry_fails_the_whole_grouping() {
        let mut bad = entry("Music", SchoolDay::Friday, "9:00", "10:00");
        bad.end_time = bad.start_time;
        let err = group_by_day(vec![bad]).unwrap_err();
        assert_eq!(err.kind(), "invalid_time_range");
    }

    #[test]
    fn overlapping_entries_are_summed_independently() {
        let day = vec![
            entry("Lab", SchoolDay::Wednesday, "9:00", "11:00"),
            entry("Tutorial", SchoolDay::Wednesday, "10:00", "11:00"),
        ];
        let summary = summarize_day(&day).unwrap();
        assert_eq!(summary.class_count, 2);
        assert_eq!(summary.total_minutes, 180);
    }

    #[test]
    fn format_summary_variants() {
        assert_eq!(format_summary(2, 140), "2h 20m • 2 Subjects");
        assert_eq!(format_summary(2, 120), "2 hrs • 2 Subjects");
        assert_eq!(format_summary(1, 45), "0h 45m • 1 Subjects");
        assert_eq!(format_summary(0, 0), "0 hrs • 0 Subjects");
    }

    #[test]
    fn week_summary_totals_all_days() {
        let week = group_by_day(vec![
            entry("A", SchoolDay::Monday, "8:00", "8:50"),
            entry("B", SchoolDay::Thursday, "13:00", "14:30"),
        ])
        .unwrap();
        let total = week.week_summary();
        assert_eq!(total.class_count, 2);
        assert_eq!(total.total_minutes, 140);
    }

    #[test]
    fn dataframe_has_one_row_per_entry() {
        let week = group_by_day(vec![
            entry("A", SchoolDay::Friday, "8:00", "8:50"),
            entry("B", SchoolDay::Monday, "13:00", "14:30"),
        ])
        .unwrap();
        let df = week.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 6);
        let days = df.column("day").unwrap().str().unwrap();
        assert_eq!(days.get(0), Some("Monday"));
        assert_eq!(days.get(1), Some("Friday"));
    }
}
