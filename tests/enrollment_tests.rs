use proptest::prelude::*;
use school_schedule::{
    EnrollmentError, NewSection, Section, SectionStatus, enroll, set_status, unenroll,
};

fn section_with(max: u32, enrolled: usize) -> Section {
    let mut section = Section::create(
        NewSection::new("Geometry", "MATH-201-B", max)
            .with_instructor("t-42", "L. Moreau")
            .with_room("Room 14")
            .with_slot("Monday 9:00-10:30")
            .with_slot("Wednesday 9:00-10:30"),
    )
    .unwrap();
    for n in 0..enrolled {
        section = enroll(&section, &format!("student-{n}")).unwrap();
    }
    section
}

#[test]
fn twenty_nine_of_thirty_fills_then_reopens() {
    let section = section_with(30, 29);
    assert_eq!(section.status, SectionStatus::Active);

    let full = enroll(&section, "late-joiner").unwrap();
    assert_eq!(full.enrolled_count(), 30);
    assert_eq!(full.status, SectionStatus::Full);
    assert_eq!(full.available_seats(), 0);

    let reopened = unenroll(&full, "student-3").unwrap();
    assert_eq!(reopened.enrolled_count(), 29);
    assert_eq!(reopened.status, SectionStatus::Active);
}

#[test]
fn enrolling_into_full_section_fails_and_changes_nothing() {
    let full = section_with(2, 2);
    let err = enroll(&full, "extra").unwrap_err();
    assert_eq!(
        err,
        EnrollmentError::CapacityExceeded {
            section_code: "MATH-201-B".into(),
            max_students: 2,
        }
    );
    assert_eq!(full.enrolled_count(), 2);
    assert_eq!(full.status, SectionStatus::Full);
}

#[test]
fn duplicate_enrollment_fails_and_changes_nothing() {
    let section = section_with(5, 1);
    let before = section.clone();
    let err = enroll(&section, "student-0").unwrap_err();
    assert!(matches!(err, EnrollmentError::DuplicateEnrollment { ref student_id, .. } if student_id == "student-0"));
    assert_eq!(section, before);
}

#[test]
fn inactive_section_rejects_enrollment_and_stays_inactive() {
    let section = set_status(&section_with(10, 3), SectionStatus::Inactive);
    let err = enroll(&section, "newcomer").unwrap_err();
    assert!(matches!(err, EnrollmentError::SectionInactive { .. }));
    assert_eq!(section.status, SectionStatus::Inactive);

    let after_unenroll = unenroll(&section, "student-1").unwrap();
    assert_eq!(after_unenroll.status, SectionStatus::Inactive);
    assert_eq!(after_unenroll.enrolled_count(), 2);
}

#[test]
fn reactivated_section_accepts_students_again() {
    let inactive = set_status(&section_with(3, 1), SectionStatus::Inactive);
    let active = set_status(&inactive, SectionStatus::Active);
    assert_eq!(active.status, SectionStatus::Active);
    let enrolled = enroll(&active, "returning").unwrap();
    assert_eq!(enrolled.enrolled_count(), 2);
}

#[test]
fn unenroll_preserves_roster_order() {
    let section = section_with(5, 4);
    let section = unenroll(&section, "student-1").unwrap();
    assert_eq!(
        section.enrolled_students,
        vec!["student-0", "student-2", "student-3"]
    );
}

#[derive(Debug, Clone)]
enum Op {
    Enroll(u8),
    Unenroll(u8),
    Deactivate,
    Activate,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u8..12).prop_map(Op::Enroll),
        3 => (0u8..12).prop_map(Op::Unenroll),
        1 => Just(Op::Deactivate),
        1 => Just(Op::Activate),
    ]
}

proptest! {
    #[test]
    fn roster_never_exceeds_capacity(max in 1u32..8, ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut section = Section::create(NewSection::new("Prop", "PROP-1", max)).unwrap();
        for op in ops {
            let previous = section.clone();
            let result = match op {
                Op::Enroll(n) => enroll(&section, &format!("s{n}")),
                Op::Unenroll(n) => unenroll(&section, &format!("s{n}")),
                Op::Deactivate => Ok(set_status(&section, SectionStatus::Inactive)),
                Op::Activate => Ok(set_status(&section, SectionStatus::Active)),
            };
            match result {
                Ok(next) => section = next,
                Err(_) => prop_assert_eq!(&section, &previous),
            }

            let count = section.enrolled_students.len();
            prop_assert!(count <= max as usize);
            let mut unique = section.enrolled_students.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), count);
            if section.status != SectionStatus::Inactive {
                prop_assert_eq!(section.status == SectionStatus::Full, count == max as usize);
            }
        }
    }
}
