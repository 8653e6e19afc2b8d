use super::{PersistenceError, PersistenceResult};
use crate::section::{Section, StudentId};
use crate::timetable::{SchoolDay, TimetableEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Everything the record store holds, as written to a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolSnapshot {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub timetables: BTreeMap<StudentId, Vec<TimetableEntry>>,
}

impl SchoolSnapshot {
    pub fn validate(&self) -> PersistenceResult<()> {
        super::validate_sections(&self.sections)?;
        for entries in self.timetables.values() {
            super::validate_entries(entries)?;
        }
        Ok(())
    }
}

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &SchoolSnapshot,
    path: P,
) -> PersistenceResult<()> {
    snapshot.validate()?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<SchoolSnapshot> {
    let file = File::open(path)?;
    let snapshot: SchoolSnapshot = serde_json::from_reader(file)?;
    snapshot.validate()?;
    Ok(snapshot)
}

#[derive(Debug, Serialize, Deserialize)]
struct TimetableCsvRecord {
    student_id: String,
    weekday: String,
    start_time: String,
    end_time: String,
    subject_name: String,
    #[serde(default)]
    room: String,
}

impl TimetableCsvRecord {
    fn from_entry(student_id: &str, entry: &TimetableEntry) -> Self {
        Self {
            student_id: student_id.to_string(),
            weekday: entry.weekday.as_str().to_string(),
            start_time: entry.start_time.to_string(),
            end_time: entry.end_time.to_string(),
            subject_name: entry.subject_name.clone(),
            room: entry.room.clone(),
        }
    }

    fn into_entry(self) -> PersistenceResult<(StudentId, TimetableEntry)> {
        if self.student_id.trim().is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "timetable row for '{}' has no student_id",
                self.subject_name
            )));
        }
        let weekday: SchoolDay = self.weekday.parse()?;
        let entry = TimetableEntry::new(
            self.subject_name,
            weekday,
            self.start_time.parse()?,
            self.end_time.parse()?,
            self.room,
        )?;
        Ok((self.student_id.trim().to_string(), entry))
    }
}

/// Writes one row per entry, students in id order.
pub fn save_timetables_to_csv<P: AsRef<Path>>(
    timetables: &BTreeMap<StudentId, Vec<TimetableEntry>>,
    path: P,
) -> PersistenceResult<()> {
    for entries in timetables.values() {
        super::validate_entries(entries)?;
    }
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (student_id, entries) in timetables {
        for entry in entries {
            writer.serialize(TimetableCsvRecord::from_entry(student_id, entry))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Reads rows back into per-student lists, keeping file order within each
/// student.
pub fn load_timetables_from_csv<P: AsRef<Path>>(
    path: P,
) -> PersistenceResult<BTreeMap<StudentId, Vec<TimetableEntry>>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut timetables: BTreeMap<StudentId, Vec<TimetableEntry>> = BTreeMap::new();
    for record in reader.deserialize::<TimetableCsvRecord>() {
        let (student_id, entry) = record?.into_entry()?;
        timetables.entry(student_id).or_default().push(entry);
    }
    Ok(timetables)
}
