#![cfg(feature = "sqlite")]

use school_schedule::{
    NewSection, PersistenceError, SchoolDay, Section, SectionStatus, SectionStore, SqliteStore,
    TimetableEntry, TimetableStore, enroll, unenroll,
};
use std::sync::Arc;
use std::thread;
use tempfile::NamedTempFile;

fn new_section(max: u32) -> Section {
    Section::create(
        NewSection::new("Computer Science", "CS-150", max)
            .with_instructor("t-3", "A. Lindqvist")
            .with_room("Lab 1"),
    )
    .unwrap()
}

#[test]
fn sections_survive_reopen() {
    let file = NamedTempFile::new().unwrap();
    let section = new_section(2);
    {
        let store = SqliteStore::new(file.path()).unwrap();
        store.insert_section(&section).unwrap();
        store
            .update_section(section.id, &|s| enroll(s, "s-1"))
            .unwrap();
        store
            .update_section(section.id, &|s| enroll(s, "s-2"))
            .unwrap();
    }

    let reopened = SqliteStore::new(file.path()).unwrap();
    let loaded = reopened.get_section(section.id).unwrap().unwrap();
    assert_eq!(loaded.enrolled_students, vec!["s-1", "s-2"]);
    assert_eq!(loaded.status, SectionStatus::Full);
    assert_eq!(reopened.list_sections().unwrap().len(), 1);
}

#[test]
fn rejected_update_does_not_write() {
    let store = SqliteStore::in_memory().unwrap();
    let section = new_section(1);
    store.insert_section(&section).unwrap();
    store
        .update_section(section.id, &|s| enroll(s, "s-1"))
        .unwrap();

    let err = store
        .update_section(section.id, &|s| enroll(s, "s-2"))
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Enrollment(_)));
    let err = store
        .update_section(section.id, &|s| unenroll(s, "s-9"))
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Enrollment(_)));

    let stored = store.get_section(section.id).unwrap().unwrap();
    assert_eq!(stored.enrolled_students, vec!["s-1"]);
}

#[test]
fn duplicate_insert_and_delete() {
    let store = SqliteStore::in_memory().unwrap();
    let section = new_section(4);
    store.insert_section(&section).unwrap();
    assert!(matches!(
        store.insert_section(&section),
        Err(PersistenceError::InvalidData(_))
    ));
    assert!(store.delete_section(section.id).unwrap());
    assert!(!store.delete_section(section.id).unwrap());
    assert!(store.get_section(section.id).unwrap().is_none());
}

#[test]
fn concurrent_enrollments_never_overfill() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let section = new_section(5);
    let id = section.id;
    store.insert_section(&section).unwrap();

    let handles: Vec<_> = (0..20)
        .map(|n| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let student = format!("s-{n}");
                store.update_section(id, &|s| enroll(s, &student)).is_ok()
            })
        })
        .collect();
    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    let stored = store.get_section(id).unwrap().unwrap();
    assert_eq!(accepted, 5);
    assert_eq!(stored.enrolled_count(), 5);
    assert_eq!(stored.status, SectionStatus::Full);
}

#[test]
fn timetable_replace_keeps_order() {
    let store = SqliteStore::in_memory().unwrap();
    let entries = vec![
        TimetableEntry::parse("Biology", SchoolDay::Thursday, "13:00", "14:00", "Lab 2").unwrap(),
        TimetableEntry::parse("French", SchoolDay::Monday, "9:00", "9:45", "C1").unwrap(),
    ];
    store.replace_timetable("s-1", &entries).unwrap();
    assert_eq!(store.timetable_for_student("s-1").unwrap(), entries);

    store.replace_timetable("s-1", &entries[1..]).unwrap();
    assert_eq!(store.timetable_for_student("s-1").unwrap(), entries[1..].to_vec());
    assert!(store.timetable_for_student("s-2").unwrap().is_empty());
}
