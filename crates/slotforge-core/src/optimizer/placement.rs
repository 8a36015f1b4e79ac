use crate::catalog::{Catalog, ClassroomId, OccurrenceId, TeacherId};
use crate::constraints::Occupancy;
use crate::schedule::Assignment;
use fastrand::Rng;

/// Picks a teacher, room and slot for one occurrence against the current
/// occupancy.
///
/// Tries for a clash-free, capacity-respecting placement first. When none is
/// found within `attempts` candidate slots it still returns an in-grid
/// assignment with a mapped teacher, leaving the clash for the search to
/// repair.
pub fn place(
    catalog: &Catalog,
    occ: OccurrenceId,
    occupancy: &Occupancy,
    attempts: usize,
    rng: &mut Rng,
) -> Assignment {
    let info = catalog.occurrences[occ.index()];
    let req = catalog.requirement_of(occ);

    let candidates = req.candidate_teachers();
    let mut teachers: Vec<TeacherId> = candidates
        .iter()
        .copied()
        .filter(|&t| occupancy.teacher_load(t) < catalog.teachers[t.index()].max_weekly_hours)
        .collect();
    if teachers.is_empty() {
        teachers = candidates.to_vec();
    }
    rng.shuffle(&mut teachers);

    let rooms = &req.suitable_rooms;
    let slot_count = catalog.grid.slot_count();
    let periods = catalog.grid.period_count().max(1);

    let mut slots: Vec<usize> = (0..slot_count).collect();
    rng.shuffle(&mut slots);

    let mut probed = 0;
    for &slot in &slots {
        if occupancy.section_at(info.section, slot) > 0 {
            continue;
        }
        for &teacher in &teachers {
            if occupancy.teacher_at(teacher, slot) > 0
                || catalog.teachers[teacher.index()].is_unavailable(slot)
            {
                continue;
            }
            probed += 1;
            if !rooms.is_empty() {
                let offset = rng.usize(0..rooms.len());
                let free_room = (0..rooms.len())
                    .map(|i| rooms[(offset + i) % rooms.len()])
                    .find(|&r| occupancy.room_at(r, slot) == 0);
                if let Some(room) = free_room {
                    return at(teacher, room, slot, periods);
                }
            }
        }
        if probed >= attempts.max(1) {
            break;
        }
    }

    // Fallback: keep the section and teacher availability rules if possible.
    let teacher = teachers
        .first()
        .copied()
        .or_else(|| req.mapped_teachers.first().copied())
        .unwrap_or_default();
    let room = if rooms.is_empty() {
        ClassroomId::from(rng.usize(0..catalog.classrooms.len().max(1)))
    } else {
        rooms[rng.usize(0..rooms.len())]
    };
    let slot = slots
        .iter()
        .copied()
        .find(|&s| {
            occupancy.section_at(info.section, s) == 0
                && !catalog.teachers[teacher.index()].is_unavailable(s)
        })
        .or_else(|| slots.first().copied())
        .unwrap_or(0);

    at(teacher, room, slot, periods)
}

#[inline(always)]
fn at(teacher: TeacherId, classroom: ClassroomId, slot: usize, periods: usize) -> Assignment {
    Assignment {
        teacher,
        classroom,
        day: (slot / periods) as u8,
        period: (slot % periods) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotforge_protocol::catalog::*;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot {
            teachers: vec![
                TeacherRecord {
                    id: "T1".into(),
                    department_id: None,
                    max_weekly_hours: 1,
                    duty_days: vec![],
                },
                TeacherRecord {
                    id: "T2".into(),
                    department_id: None,
                    max_weekly_hours: 10,
                    duty_days: vec![],
                },
            ],
            subjects: vec![SubjectRecord {
                id: "BIO-LAB".into(),
                department_id: None,
                weekly_quota: 2,
                is_lab: true,
            }],
            sections: vec![SectionRecord {
                id: "A".into(),
                department_id: None,
                student_strength: 25,
            }],
            classrooms: vec![
                ClassroomRecord {
                    id: "R1".into(),
                    department_id: None,
                    capacity: 60,
                    is_lab: false,
                },
                ClassroomRecord {
                    id: "L1".into(),
                    department_id: None,
                    capacity: 30,
                    is_lab: true,
                },
            ],
            mappings: vec![
                MappingRecord {
                    subject_id: "BIO-LAB".into(),
                    teacher_id: "T1".into(),
                    section_id: None,
                    is_primary: false,
                },
                MappingRecord {
                    subject_id: "BIO-LAB".into(),
                    teacher_id: "T2".into(),
                    section_id: None,
                    is_primary: false,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_placement_respects_labs_and_occupancy() {
        let catalog = Catalog::from_snapshot(&snapshot()).unwrap();
        let mut rng = Rng::with_seed(7);
        let mut occupancy = Occupancy::new(&catalog);

        let first = place(&catalog, OccurrenceId(0), &occupancy, 24, &mut rng);
        occupancy.add(&catalog, OccurrenceId(0), &first);
        let second = place(&catalog, OccurrenceId(1), &occupancy, 24, &mut rng);

        assert_eq!(first.classroom, ClassroomId(1));
        assert_eq!(second.classroom, ClassroomId(1));
        assert_ne!((first.day, first.period), (second.day, second.period));
    }

    #[test]
    fn test_placement_skips_teachers_at_cap() {
        let catalog = Catalog::from_snapshot(&snapshot()).unwrap();
        let mut occupancy = Occupancy::new(&catalog);
        occupancy.add(
            &catalog,
            OccurrenceId(0),
            &Assignment {
                teacher: TeacherId(0),
                classroom: ClassroomId(1),
                day: 0,
                period: 0,
            },
        );

        for seed in 0..20 {
            let mut rng = Rng::with_seed(seed);
            let a = place(&catalog, OccurrenceId(1), &occupancy, 24, &mut rng);
            assert_eq!(a.teacher, TeacherId(1));
        }
    }
}
