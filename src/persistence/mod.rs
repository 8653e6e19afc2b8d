use crate::enrollment::EnrollmentError;
use crate::section::Section;
use crate::section_validation::{self, SectionValidationError};
use crate::timetable::{TimetableEntry, TimetableError};
use std::io;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("section {0} not found")]
    SectionNotFound(Uuid),
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
    #[error(transparent)]
    Timetable(#[from] TimetableError),
}

impl From<SectionValidationError> for PersistenceError {
    fn from(value: SectionValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Pure section transition applied inside [`SectionStore::update_section`].
pub type SectionUpdate<'a> = &'a dyn Fn(&Section) -> Result<Section, EnrollmentError>;

/// Record store for sections.
///
/// `update_section` is the only mutation path for an existing section: the
/// read, the transition and the write happen under one lock or transaction,
/// so two concurrent enrollments can never both take the last seat.
pub trait SectionStore: Send + Sync {
    fn insert_section(&self, section: &Section) -> PersistenceResult<()>;
    fn get_section(&self, id: Uuid) -> PersistenceResult<Option<Section>>;
    fn list_sections(&self) -> PersistenceResult<Vec<Section>>;
    fn delete_section(&self, id: Uuid) -> PersistenceResult<bool>;
    fn update_section(&self, id: Uuid, update: SectionUpdate<'_>) -> PersistenceResult<Section>;
}

/// Per-student timetable entries.
pub trait TimetableStore: Send + Sync {
    fn timetable_for_student(&self, student_id: &str) -> PersistenceResult<Vec<TimetableEntry>>;
    fn replace_timetable(
        &self,
        student_id: &str,
        entries: &[TimetableEntry],
    ) -> PersistenceResult<()>;
}

pub fn validate_sections(sections: &[Section]) -> PersistenceResult<()> {
    section_validation::validate_section_collection(sections)?;
    Ok(())
}

pub fn validate_entries(entries: &[TimetableEntry]) -> PersistenceResult<()> {
    for entry in entries {
        entry.validate()?;
    }
    Ok(())
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    SchoolSnapshot, load_snapshot_from_json, load_timetables_from_csv, save_snapshot_to_json,
    save_timetables_to_csv,
};
pub use memory::MemoryStore;
