use crate::section::{Section, SectionStatus};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SectionValidationError {
    message: String,
}

impl SectionValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn validate_section(section: &Section) -> Result<(), SectionValidationError> {
    if section.section_name.trim().is_empty() {
        return Err(SectionValidationError::new(format!(
            "section {} requires a non-empty section_name",
            section.id
        )));
    }
    if section.section_code.trim().is_empty() {
        return Err(SectionValidationError::new(format!(
            "section {} requires a non-empty section_code",
            section.id
        )));
    }
    if section.max_students == 0 {
        return Err(SectionValidationError::new(format!(
            "section {} has invalid max_students 0 (must be positive)",
            section.section_code
        )));
    }

    let mut seen = HashSet::with_capacity(section.enrolled_students.len());
    for student in &section.enrolled_students {
        if student.trim().is_empty() {
            return Err(SectionValidationError::new(format!(
                "section {} has an empty student id on its roster",
                section.section_code
            )));
        }
        if !seen.insert(student.as_str()) {
            return Err(SectionValidationError::new(format!(
                "section {} lists student {} more than once",
                section.section_code, student
            )));
        }
    }

    let count = section.enrolled_students.len();
    let capacity = section.max_students as usize;
    if count > capacity {
        return Err(SectionValidationError::new(format!(
            "section {} has {} students enrolled but max_students is {}",
            section.section_code, count, capacity
        )));
    }

    match section.status {
        SectionStatus::Inactive => {}
        SectionStatus::Full if count != capacity => {
            return Err(SectionValidationError::new(format!(
                "section {} is marked full with {} of {} seats taken",
                section.section_code, count, capacity
            )));
        }
        SectionStatus::Active if count == capacity => {
            return Err(SectionValidationError::new(format!(
                "section {} is marked active but all {} seats are taken",
                section.section_code, capacity
            )));
        }
        SectionStatus::Full | SectionStatus::Active => {}
    }

    Ok(())
}

pub fn validate_section_collection(sections: &[Section]) -> Result<(), SectionValidationError> {
    let mut seen_ids: HashSet<Uuid> = HashSet::with_capacity(sections.len());
    for section in sections {
        if !seen_ids.insert(section.id) {
            return Err(SectionValidationError::new(format!(
                "duplicate section id {}",
                section.id
            )));
        }
        validate_section(section)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::NewSection;

    fn sample(max: u32) -> Section {
        Section::create(NewSection::new("Biology", "BIO-9", max)).unwrap()
    }

    #[test]
    fn duplicate_roster_entry_is_rejected() {
        let mut section = sample(5);
        section.enrolled_students = vec!["s1".into(), "s1".into()];
        let err = validate_section(&section).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn roster_over_capacity_is_rejected() {
        let mut section = sample(1);
        section.enrolled_students = vec!["s1".into(), "s2".into()];
        section.status = SectionStatus::Inactive;
        assert!(validate_section(&section).is_err());
    }

    #[test]
    fn status_must_match_roster() {
        let mut section = sample(1);
        section.enrolled_students = vec!["s1".into()];
        assert!(validate_section(&section).is_err());
        section.status = SectionStatus::Full;
        assert!(validate_section(&section).is_ok());
        section.enrolled_students.clear();
        assert!(validate_section(&section).is_err());
    }

    #[test]
    fn duplicate_ids_in_collection_are_rejected() {
        let section = sample(3);
        let err = validate_section_collection(&[section.clone(), section]).unwrap_err();
        assert!(err.to_string().starts_with("duplicate section id"));
    }
}
