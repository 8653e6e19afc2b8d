use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::section_validation::{self, SectionValidationError};

pub type StudentId = String;

/// Enrollment state of a section.
///
/// `Active` and `Full` are derived from the roster; `Inactive` is an
/// administrative state that survives enroll/unenroll calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Active,
    Inactive,
    Full,
}

impl SectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionStatus::Active => "active",
            SectionStatus::Inactive => "inactive",
            SectionStatus::Full => "full",
        }
    }
}

impl fmt::Display for SectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(SectionStatus::Active),
            "inactive" => Ok(SectionStatus::Inactive),
            "full" => Ok(SectionStatus::Full),
            other => Err(format!("unknown section status '{other}'")),
        }
    }
}

/// A scheduled class with an instructor, a room, a weekly slot list and a
/// bounded roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub section_name: String,
    pub section_code: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub room: String,
    /// Free-text slot descriptors such as "Monday 9:00-10:30", kept in
    /// insertion order.
    #[serde(default)]
    pub schedule: Vec<String>,
    pub max_students: u32,
    #[serde(default)]
    pub enrolled_students: Vec<StudentId>,
    pub status: SectionStatus,
}

/// Caller-supplied fields for creating a section. The id, roster and status
/// are assigned by [`Section::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSection {
    pub section_name: String,
    pub section_code: String,
    pub instructor_id: String,
    pub instructor_name: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub schedule: Vec<String>,
    pub max_students: u32,
    /// Create the section administratively closed.
    #[serde(default)]
    pub inactive: bool,
}

impl NewSection {
    pub fn new(
        section_name: impl Into<String>,
        section_code: impl Into<String>,
        max_students: u32,
    ) -> Self {
        Self {
            section_name: section_name.into(),
            section_code: section_code.into(),
            instructor_id: String::new(),
            instructor_name: String::new(),
            room: String::new(),
            schedule: Vec::new(),
            max_students,
            inactive: false,
        }
    }

    pub fn with_instructor(
        mut self,
        instructor_id: impl Into<String>,
        instructor_name: impl Into<String>,
    ) -> Self {
        self.instructor_id = instructor_id.into();
        self.instructor_name = instructor_name.into();
        self
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = room.into();
        self
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.schedule.push(slot.into());
        self
    }
}

impl Section {
    /// Builds a section with an empty roster and a fresh id.
    pub fn create(new: NewSection) -> Result<Self, SectionValidationError> {
        let status = if new.inactive {
            SectionStatus::Inactive
        } else {
            SectionStatus::Active
        };
        let section = Self {
            id: Uuid::new_v4(),
            section_name: new.section_name,
            section_code: new.section_code,
            instructor_id: new.instructor_id,
            instructor_name: new.instructor_name,
            room: new.room,
            schedule: new.schedule,
            max_students: new.max_students,
            enrolled_students: Vec::new(),
            status,
        };
        section_validation::validate_section(&section)?;
        Ok(section)
    }

    pub fn enrolled_count(&self) -> usize {
        self.enrolled_students.len()
    }

    pub fn available_seats(&self) -> u32 {
        (self.max_students as usize).saturating_sub(self.enrolled_count()) as u32
    }

    pub fn is_full(&self) -> bool {
        self.enrolled_count() >= self.max_students as usize
    }

    pub fn is_enrolled(&self, student_id: &str) -> bool {
        self.enrolled_students.iter().any(|s| s == student_id)
    }
}
