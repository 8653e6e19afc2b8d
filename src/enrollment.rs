//! Capacity and status rules for section rosters.
//!
//! Every operation takes the current [`Section`] by reference and returns a
//! new one; the input is never modified. Persisting the result is up to the
//! caller, which must make the read-modify-write atomic (see
//! [`crate::persistence::SectionStore::update_section`]).

use thiserror::Error;
use tracing::debug;

use crate::section::{Section, SectionStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentError {
    #[error("section {section_code} is full ({max_students} students)")]
    CapacityExceeded {
        section_code: String,
        max_students: u32,
    },
    #[error("section {section_code} is inactive")]
    SectionInactive { section_code: String },
    #[error("student {student_id} is already enrolled in section {section_code}")]
    DuplicateEnrollment {
        section_code: String,
        student_id: String,
    },
    #[error("student {student_id} is not enrolled in section {section_code}")]
    NotEnrolled {
        section_code: String,
        student_id: String,
    },
}

impl EnrollmentError {
    /// Stable snake_case name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            EnrollmentError::CapacityExceeded { .. } => "capacity_exceeded",
            EnrollmentError::SectionInactive { .. } => "section_inactive",
            EnrollmentError::DuplicateEnrollment { .. } => "duplicate_enrollment",
            EnrollmentError::NotEnrolled { .. } => "not_enrolled",
        }
    }
}

/// Status implied by the roster, given the status the section had before.
///
/// `Inactive` is sticky; otherwise the section is `Full` exactly when the
/// roster has reached capacity.
pub fn derive_status(previous: SectionStatus, enrolled: usize, max_students: u32) -> SectionStatus {
    if previous == SectionStatus::Inactive {
        return SectionStatus::Inactive;
    }
    if enrolled >= max_students as usize {
        SectionStatus::Full
    } else {
        SectionStatus::Active
    }
}

pub fn enroll(section: &Section, student_id: &str) -> Result<Section, EnrollmentError> {
    if let Err(err) = check_enroll(section, student_id) {
        debug!(
            section = %section.section_code,
            student = student_id,
            kind = err.kind(),
            "enrollment rejected"
        );
        return Err(err);
    }

    let mut updated = section.clone();
    updated.enrolled_students.push(student_id.to_string());
    updated.status = derive_status(
        updated.status,
        updated.enrolled_students.len(),
        updated.max_students,
    );
    debug!(
        section = %updated.section_code,
        student = student_id,
        enrolled = updated.enrolled_students.len(),
        status = %updated.status,
        "student enrolled"
    );
    Ok(updated)
}

fn check_enroll(section: &Section, student_id: &str) -> Result<(), EnrollmentError> {
    if section.status == SectionStatus::Inactive {
        return Err(EnrollmentError::SectionInactive {
            section_code: section.section_code.clone(),
        });
    }
    if section.is_enrolled(student_id) {
        return Err(EnrollmentError::DuplicateEnrollment {
            section_code: section.section_code.clone(),
            student_id: student_id.to_string(),
        });
    }
    if section.is_full() {
        return Err(EnrollmentError::CapacityExceeded {
            section_code: section.section_code.clone(),
            max_students: section.max_students,
        });
    }
    Ok(())
}

pub fn unenroll(section: &Section, student_id: &str) -> Result<Section, EnrollmentError> {
    let Some(position) = section
        .enrolled_students
        .iter()
        .position(|s| s == student_id)
    else {
        debug!(
            section = %section.section_code,
            student = student_id,
            "unenroll rejected: not on roster"
        );
        return Err(EnrollmentError::NotEnrolled {
            section_code: section.section_code.clone(),
            student_id: student_id.to_string(),
        });
    };

    let mut updated = section.clone();
    updated.enrolled_students.remove(position);
    updated.status = derive_status(
        updated.status,
        updated.enrolled_students.len(),
        updated.max_students,
    );
    debug!(
        section = %updated.section_code,
        student = student_id,
        enrolled = updated.enrolled_students.len(),
        status = %updated.status,
        "student unenrolled"
    );
    Ok(updated)
}

/// Administrative status override.
///
/// `Inactive` is stored as given. `Active` and `Full` both lift an
/// inactive state and re-derive the label from the roster, so a section is
/// never labelled full with free seats or active with none.
pub fn set_status(section: &Section, new_status: SectionStatus) -> Section {
    let mut updated = section.clone();
    updated.status = match new_status {
        SectionStatus::Inactive => SectionStatus::Inactive,
        SectionStatus::Active | SectionStatus::Full => derive_status(
            SectionStatus::Active,
            updated.enrolled_students.len(),
            updated.max_students,
        ),
    };
    debug!(
        section = %updated.section_code,
        requested = %new_status,
        status = %updated.status,
        "section status set"
    );
    updated
}
