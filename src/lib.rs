pub mod config;
pub mod enrollment;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod section;
pub(crate) mod section_validation;
pub mod timetable;
pub mod weekly;

pub use config::{ConfigError, ServiceConfig};
pub use enrollment::{EnrollmentError, derive_status, enroll, set_status, unenroll};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    MemoryStore, PersistenceError, SchoolSnapshot, SectionStore, TimetableStore,
    load_snapshot_from_json, load_timetables_from_csv, save_snapshot_to_json,
    save_timetables_to_csv,
};
pub use section::{NewSection, Section, SectionStatus, StudentId};
pub use section_validation::SectionValidationError;
pub use timetable::{ClockTime, SchoolDay, TimetableEntry, TimetableError};
pub use weekly::{DaySummary, DayView, WeeklySchedule, format_summary, group_by_day, summarize_day};
