use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimetableError {
    #[error("{subject} on {day}: start {start} must be before end {end}")]
    InvalidTimeRange {
        subject: String,
        day: SchoolDay,
        start: ClockTime,
        end: ClockTime,
    },
    #[error("invalid time of day '{0}' (expected H:MM or HH:MM)")]
    InvalidTime(String),
    #[error("invalid school day '{0}' (expected Monday through Friday)")]
    InvalidDay(String),
}

impl TimetableError {
    pub fn kind(&self) -> &'static str {
        match self {
            TimetableError::InvalidTimeRange { .. } => "invalid_time_range",
            TimetableError::InvalidTime(_) => "invalid_time",
            TimetableError::InvalidDay(_) => "invalid_day",
        }
    }
}

/// One of the five teaching days. Ordering follows the school week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 5] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolDay::Monday => "Monday",
            SchoolDay::Tuesday => "Tuesday",
            SchoolDay::Wednesday => "Wednesday",
            SchoolDay::Thursday => "Thursday",
            SchoolDay::Friday => "Friday",
        }
    }

    pub fn to_weekday(self) -> Weekday {
        match self {
            SchoolDay::Monday => Weekday::Mon,
            SchoolDay::Tuesday => Weekday::Tue,
            SchoolDay::Wednesday => Weekday::Wed,
            SchoolDay::Thursday => Weekday::Thu,
            SchoolDay::Friday => Weekday::Fri,
        }
    }
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<Weekday> for SchoolDay {
    type Error = TimetableError;

    fn try_from(value: Weekday) -> Result<Self, Self::Error> {
        match value {
            Weekday::Mon => Ok(SchoolDay::Monday),
            Weekday::Tue => Ok(SchoolDay::Tuesday),
            Weekday::Wed => Ok(SchoolDay::Wednesday),
            Weekday::Thu => Ok(SchoolDay::Thursday),
            Weekday::Fri => Ok(SchoolDay::Friday),
            Weekday::Sat | Weekday::Sun => Err(TimetableError::InvalidDay(value.to_string())),
        }
    }
}

impl FromStr for SchoolDay {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts both "mon" and "monday", in any case
        let weekday = s
            .trim()
            .parse::<Weekday>()
            .map_err(|_| TimetableError::InvalidDay(s.to_string()))?;
        SchoolDay::try_from(weekday)
    }
}

/// Wall-clock time of day, held as minutes since midnight so that "9:00"
/// sorts before "10:30".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self::from)
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(&self) -> u32 {
        self.minutes_since_midnight() / 60
    }

    pub fn minute(&self) -> u32 {
        self.minutes_since_midnight() % 60
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(value: NaiveTime) -> Self {
        Self((value.hour() * 60 + value.minute()) as u16)
    }
}

impl FromStr for ClockTime {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(ClockTime::from)
            .map_err(|_| TimetableError::InvalidTime(s.to_string()))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimetableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// A single class meeting in a student's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub subject_name: String,
    pub weekday: SchoolDay,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default)]
    pub room: String,
}

impl TimetableEntry {
    pub fn new(
        subject_name: impl Into<String>,
        weekday: SchoolDay,
        start_time: ClockTime,
        end_time: ClockTime,
        room: impl Into<String>,
    ) -> Result<Self, TimetableError> {
        let entry = Self {
            subject_name: subject_name.into(),
            weekday,
            start_time,
            end_time,
            room: room.into(),
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Convenience constructor taking textual times such as "9:00".
    pub fn parse(
        subject_name: impl Into<String>,
        weekday: SchoolDay,
        start_time: &str,
        end_time: &str,
        room: impl Into<String>,
    ) -> Result<Self, TimetableError> {
        Self::new(
            subject_name,
            weekday,
            start_time.parse()?,
            end_time.parse()?,
            room,
        )
    }

    /// Entries arriving through serde skip [`TimetableEntry::new`], so the
    /// aggregator re-checks them here.
    pub fn validate(&self) -> Result<(), TimetableError> {
        if self.start_time >= self.end_time {
            return Err(TimetableError::InvalidTimeRange {
                subject: self.subject_name.clone(),
                day: self.weekday,
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_time
            .minutes_since_midnight()
            .saturating_sub(self.start_time.minutes_since_midnight())
    }
}
