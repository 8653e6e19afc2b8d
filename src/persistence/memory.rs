use super::{
    PersistenceError, PersistenceResult, SchoolSnapshot, SectionStore, SectionUpdate,
    TimetableStore,
};
use crate::section::{Section, StudentId};
use crate::section_validation;
use crate::timetable::TimetableEntry;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    sections: RwLock<HashMap<Uuid, Section>>,
    timetables: RwLock<BTreeMap<StudentId, Vec<TimetableEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: SchoolSnapshot) -> PersistenceResult<Self> {
        let store = Self::new();
        store.restore(snapshot)?;
        Ok(store)
    }

    pub fn snapshot(&self) -> SchoolSnapshot {
        let mut sections: Vec<Section> = self.sections.read().values().cloned().collect();
        sort_sections(&mut sections);
        SchoolSnapshot {
            sections,
            timetables: self.timetables.read().clone(),
        }
    }

    /// Replaces all contents with the snapshot.
    pub fn restore(&self, snapshot: SchoolSnapshot) -> PersistenceResult<()> {
        snapshot.validate()?;
        let mut sections = self.sections.write();
        let mut timetables = self.timetables.write();
        *sections = snapshot
            .sections
            .into_iter()
            .map(|section| (section.id, section))
            .collect();
        *timetables = snapshot.timetables;
        Ok(())
    }

    pub fn find_by_code(&self, section_code: &str) -> Option<Section> {
        self.sections
            .read()
            .values()
            .find(|section| section.section_code.eq_ignore_ascii_case(section_code))
            .cloned()
    }
}

pub(crate) fn sort_sections(sections: &mut [Section]) {
    sections.sort_by(|a, b| {
        a.section_code
            .cmp(&b.section_code)
            .then_with(|| a.id.cmp(&b.id))
    });
}

impl SectionStore for MemoryStore {
    fn insert_section(&self, section: &Section) -> PersistenceResult<()> {
        section_validation::validate_section(section)?;
        let mut sections = self.sections.write();
        if sections.contains_key(&section.id) {
            return Err(PersistenceError::InvalidData(format!(
                "section {} already exists",
                section.id
            )));
        }
        sections.insert(section.id, section.clone());
        Ok(())
    }

    fn get_section(&self, id: Uuid) -> PersistenceResult<Option<Section>> {
        Ok(self.sections.read().get(&id).cloned())
    }

    fn list_sections(&self) -> PersistenceResult<Vec<Section>> {
        let mut sections: Vec<Section> = self.sections.read().values().cloned().collect();
        sort_sections(&mut sections);
        Ok(sections)
    }

    fn delete_section(&self, id: Uuid) -> PersistenceResult<bool> {
        Ok(self.sections.write().remove(&id).is_some())
    }

    fn update_section(&self, id: Uuid, update: SectionUpdate<'_>) -> PersistenceResult<Section> {
        let mut sections = self.sections.write();
        let current = sections
            .get(&id)
            .ok_or(PersistenceError::SectionNotFound(id))?;
        let updated = update(current)?;
        section_validation::validate_section(&updated)?;
        sections.insert(id, updated.clone());
        Ok(updated)
    }
}

impl TimetableStore for MemoryStore {
    fn timetable_for_student(&self, student_id: &str) -> PersistenceResult<Vec<TimetableEntry>> {
        Ok(self
            .timetables
            .read()
            .get(student_id)
            .cloned()
            .unwrap_or_default())
    }

    fn replace_timetable(
        &self,
        student_id: &str,
        entries: &[TimetableEntry],
    ) -> PersistenceResult<()> {
        super::validate_entries(entries)?;
        self.timetables
            .write()
            .insert(student_id.to_string(), entries.to_vec());
        Ok(())
    }
}
