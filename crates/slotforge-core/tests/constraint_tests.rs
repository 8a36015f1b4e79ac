mod common;

use common::{small_college, CatalogBuilder};
use slotforge_core::catalog::{Catalog, ClassroomId, OccurrenceId, SectionId, TeacherId};
use slotforge_core::constraints::{ConstraintModel, HardViolation};
use slotforge_core::schedule::Schedule;
use slotforge_protocol::config::PenaltyWeights;
use std::sync::Arc;

fn model(catalog: Catalog) -> (Arc<Catalog>, ConstraintModel) {
    let catalog = Arc::new(catalog);
    let model = ConstraintModel::new(catalog.clone(), &PenaltyWeights::default());
    (catalog, model)
}

/// Three MATH sessions for S1 by teacher B in room R40 on Tuesday.
fn clean(catalog: &Catalog) -> Schedule {
    let mut s = Schedule::empty(catalog);
    for i in 0..3u8 {
        s.assign(OccurrenceId(i as u32), TeacherId(1), ClassroomId(0), 1, i);
    }
    s
}

#[test]
fn test_clean_schedule_has_no_violations() {
    let (catalog, model) = model(small_college().catalog());
    let s = clean(&catalog);
    assert!(model.violates_hard(&s).is_empty());
    assert!(model.fitness(&s).is_feasible());
}

#[test]
fn test_unassigned_occurrence_is_reported() {
    let (catalog, model) = model(small_college().catalog());
    let mut s = clean(&catalog);
    s.unassign(OccurrenceId(2));
    assert_eq!(
        model.violates_hard(&s),
        vec![HardViolation::Unassigned { occurrence: OccurrenceId(2) }]
    );
}

#[test]
fn test_teacher_unavailability() {
    let (catalog, model) = model(small_college().catalog());
    let mut s = clean(&catalog);
    // Teacher A is blocked on Monday, first slot.
    s.assign(OccurrenceId(0), TeacherId(0), ClassroomId(0), 0, 0);

    let v = model.violates_hard(&s);
    assert_eq!(v.len(), 1);
    assert!(matches!(v[0], HardViolation::TeacherUnavailable { teacher: TeacherId(0), .. }));
    assert!(!v[0].is_structural());
}

#[test]
fn test_section_and_room_clash() {
    let (catalog, model) = model(small_college().catalog());
    let mut s = clean(&catalog);
    s.assign(OccurrenceId(1), TeacherId(0), ClassroomId(0), 1, 0);

    let v = model.violates_hard(&s);
    assert!(v.iter().any(|x| matches!(x, HardViolation::SectionClash { section: SectionId(0), .. })));
    assert!(v.iter().any(|x| matches!(x, HardViolation::ClassroomClash { classroom: ClassroomId(0), .. })));
    assert!(!v.iter().any(|x| matches!(x, HardViolation::TeacherClash { .. })));
}

#[test]
fn test_out_of_grid_and_unknown_resources_are_structural() {
    let (catalog, model) = model(small_college().catalog());
    let mut s = clean(&catalog);
    s.assign(OccurrenceId(0), TeacherId(1), ClassroomId(0), 9, 0);
    s.assign(OccurrenceId(1), TeacherId(7), ClassroomId(0), 1, 1);

    let v = model.violates_hard(&s);
    assert!(v.iter().any(|x| matches!(x, HardViolation::OutOfGrid { day: 9, .. })));
    assert!(v.iter().any(|x| matches!(x, HardViolation::UnknownResource { .. })));
    assert!(v.iter().all(|x| x.is_structural()));
}

#[test]
fn test_lab_capacity_and_mapping_rules() {
    let catalog = CatalogBuilder::new()
        .teacher("A", 10)
        .teacher("OUTSIDER", 10)
        .subject("CHEM", 1, true)
        .section("S1", 50)
        .room("SMALL", 20, false)
        .room("LAB", 60, true)
        .teaches("A", "CHEM")
        .catalog();
    let (catalog, model) = model(catalog);

    let mut s = Schedule::empty(&catalog);
    s.assign(OccurrenceId(0), TeacherId(1), ClassroomId(0), 0, 0);

    let v = model.violates_hard(&s);
    assert!(v.contains(&HardViolation::LabMismatch {
        occurrence: OccurrenceId(0),
        classroom: ClassroomId(0)
    }));
    assert!(v.contains(&HardViolation::OverCapacity {
        occurrence: OccurrenceId(0),
        classroom: ClassroomId(0),
        capacity: 20,
        strength: 50
    }));
    assert!(v.contains(&HardViolation::UnmappedTeacher {
        occurrence: OccurrenceId(0),
        teacher: TeacherId(1)
    }));
}

#[test]
fn test_any_feasible_outranks_any_infeasible() {
    let catalog = CatalogBuilder::new()
        .teacher("A", 20)
        .subject("MATH", 3, false)
        .section("S1", 30)
        .room("R1", 40, false)
        .teaches("A", "MATH")
        .duty_days("A", &["Monday"])
        .prefers_slots("A", &[1])
        .catalog();
    let (catalog, model) = model(catalog);

    // Worst possible soft profile, still feasible: off-duty, unpreferred, gapped.
    let mut bad_soft = Schedule::empty(&catalog);
    bad_soft.assign(OccurrenceId(0), TeacherId(0), ClassroomId(0), 4, 1);
    bad_soft.assign(OccurrenceId(1), TeacherId(0), ClassroomId(0), 4, 3);
    bad_soft.assign(OccurrenceId(2), TeacherId(0), ClassroomId(0), 4, 6);

    // Perfect soft profile, one clash.
    let mut clash = Schedule::empty(&catalog);
    clash.assign(OccurrenceId(0), TeacherId(0), ClassroomId(0), 0, 0);
    clash.assign(OccurrenceId(1), TeacherId(0), ClassroomId(0), 0, 0);
    clash.assign(OccurrenceId(2), TeacherId(0), ClassroomId(0), 0, 1);

    let f_soft = model.fitness(&bad_soft);
    let f_clash = model.fitness(&clash);
    assert!(f_soft.is_feasible());
    assert!(f_soft.soft_penalty > 0.0);
    assert!(!f_clash.is_feasible());
    assert!(f_soft.score > f_clash.score);
}

#[test]
fn test_soft_penalty_rewards_preferences() {
    let catalog = small_college().prefers_slots("B", &[1, 2, 3]).catalog();
    let (catalog, model) = model(catalog);

    let preferred = clean(&catalog);
    let mut scattered = Schedule::empty(&catalog);
    scattered.assign(OccurrenceId(0), TeacherId(1), ClassroomId(0), 1, 0);
    scattered.assign(OccurrenceId(1), TeacherId(1), ClassroomId(0), 1, 4);
    scattered.assign(OccurrenceId(2), TeacherId(1), ClassroomId(0), 1, 6);

    assert_eq!(model.soft_penalty(&preferred), 0.0);
    assert!(model.soft_penalty(&scattered) > 0.0);
    assert!(model.fitness(&preferred).score > model.fitness(&scattered).score);
}
