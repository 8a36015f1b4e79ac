use crate::catalog::{Catalog, ClassroomId, OccurrenceId, SectionId, TeacherId};
use crate::schedule::Schedule;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardViolation {
    /// An occurrence with no assignment (coverage hole).
    Unassigned { occurrence: OccurrenceId },
    /// Day or period outside the slot grid.
    OutOfGrid {
        occurrence: OccurrenceId,
        day: u8,
        period: u8,
    },
    /// Teacher or classroom index not present in the catalog.
    UnknownResource { occurrence: OccurrenceId },
    /// Teacher is not mapped to this subject/section (or not the pinned one).
    UnmappedTeacher {
        occurrence: OccurrenceId,
        teacher: TeacherId,
    },
    TeacherClash {
        teacher: TeacherId,
        day: u8,
        period: u8,
        occurrence: OccurrenceId,
        with: OccurrenceId,
    },
    ClassroomClash {
        classroom: ClassroomId,
        day: u8,
        period: u8,
        occurrence: OccurrenceId,
        with: OccurrenceId,
    },
    SectionClash {
        section: SectionId,
        day: u8,
        period: u8,
        occurrence: OccurrenceId,
        with: OccurrenceId,
    },
    LabMismatch {
        occurrence: OccurrenceId,
        classroom: ClassroomId,
    },
    OverCapacity {
        occurrence: OccurrenceId,
        classroom: ClassroomId,
        capacity: u32,
        strength: u32,
    },
    TeacherUnavailable {
        occurrence: OccurrenceId,
        teacher: TeacherId,
        day: u8,
        period: u8,
    },
    TeacherOverloaded {
        teacher: TeacherId,
        assigned: u32,
        cap: u32,
    },
}

impl HardViolation {
    /// Contribution to the hard violation count. Overload counts every
    /// session above the cap.
    pub fn weight(&self) -> usize {
        match self {
            HardViolation::TeacherOverloaded { assigned, cap, .. } => {
                assigned.saturating_sub(*cap) as usize
            }
            _ => 1,
        }
    }

    /// Breaches the schedule's shape rather than a scheduling rule. These
    /// can never be emitted, not even with a warning.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            HardViolation::Unassigned { .. }
                | HardViolation::OutOfGrid { .. }
                | HardViolation::UnknownResource { .. }
                | HardViolation::UnmappedTeacher { .. }
        )
    }

    /// Occurrences directly responsible for the violation.
    pub fn occurrences(&self) -> Vec<OccurrenceId> {
        match *self {
            HardViolation::TeacherClash { occurrence, with, .. }
            | HardViolation::ClassroomClash { occurrence, with, .. }
            | HardViolation::SectionClash { occurrence, with, .. } => vec![occurrence, with],
            HardViolation::Unassigned { occurrence }
            | HardViolation::OutOfGrid { occurrence, .. }
            | HardViolation::UnknownResource { occurrence }
            | HardViolation::UnmappedTeacher { occurrence, .. }
            | HardViolation::LabMismatch { occurrence, .. }
            | HardViolation::OverCapacity { occurrence, .. }
            | HardViolation::TeacherUnavailable { occurrence, .. } => vec![occurrence],
            HardViolation::TeacherOverloaded { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for HardViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardViolation::Unassigned { occurrence } => {
                write!(f, "occurrence {} is unassigned", occurrence.0)
            }
            HardViolation::OutOfGrid { occurrence, day, period } => write!(
                f,
                "occurrence {} placed outside the grid at day {} period {}",
                occurrence.0, day, period
            ),
            HardViolation::UnknownResource { occurrence } => {
                write!(f, "occurrence {} names an unknown teacher or room", occurrence.0)
            }
            HardViolation::UnmappedTeacher { occurrence, teacher } => write!(
                f,
                "occurrence {} taught by unmapped teacher #{}",
                occurrence.0, teacher.0
            ),
            HardViolation::TeacherClash { teacher, day, period, occurrence, with } => write!(
                f,
                "teacher #{} double-booked at day {} period {} (occurrences {} and {})",
                teacher.0, day, period, with.0, occurrence.0
            ),
            HardViolation::ClassroomClash { classroom, day, period, occurrence, with } => write!(
                f,
                "classroom #{} double-booked at day {} period {} (occurrences {} and {})",
                classroom.0, day, period, with.0, occurrence.0
            ),
            HardViolation::SectionClash { section, day, period, occurrence, with } => write!(
                f,
                "section #{} double-booked at day {} period {} (occurrences {} and {})",
                section.0, day, period, with.0, occurrence.0
            ),
            HardViolation::LabMismatch { occurrence, classroom } => write!(
                f,
                "lab occurrence {} placed in non-lab classroom #{}",
                occurrence.0, classroom.0
            ),
            HardViolation::OverCapacity { occurrence, classroom, capacity, strength } => write!(
                f,
                "occurrence {} has {} students in classroom #{} of capacity {}",
                occurrence.0, strength, classroom.0, capacity
            ),
            HardViolation::TeacherUnavailable { occurrence, teacher, day, period } => write!(
                f,
                "occurrence {} puts teacher #{} in unavailable slot day {} period {}",
                occurrence.0, teacher.0, day, period
            ),
            HardViolation::TeacherOverloaded { teacher, assigned, cap } => write!(
                f,
                "teacher #{} has {} sessions over a cap of {}",
                teacher.0, assigned, cap
            ),
        }
    }
}

/// Walks every hard rule once, handing each violation to `sink`.
pub(crate) fn scan<F: FnMut(HardViolation)>(catalog: &Catalog, schedule: &Schedule, mut sink: F) {
    let slots = catalog.grid.slot_count();
    let mut teacher_first: Vec<Option<OccurrenceId>> = vec![None; catalog.teachers.len() * slots];
    let mut room_first: Vec<Option<OccurrenceId>> = vec![None; catalog.classrooms.len() * slots];
    let mut section_first: Vec<Option<OccurrenceId>> = vec![None; catalog.sections.len() * slots];
    let mut load = vec![0u32; catalog.teachers.len()];

    for (occ, assignment) in schedule.iter() {
        let Some(a) = assignment else {
            sink(HardViolation::Unassigned { occurrence: occ });
            continue;
        };
        let Some(info) = catalog.occurrences.get(occ.index()) else {
            continue;
        };
        let (Some(teacher), Some(room)) = (
            catalog.teachers.get(a.teacher.index()),
            catalog.classrooms.get(a.classroom.index()),
        ) else {
            sink(HardViolation::UnknownResource { occurrence: occ });
            continue;
        };

        load[a.teacher.index()] += 1;

        let req = &catalog.requirements[info.requirement.index()];
        let allowed = match req.fixed_teacher {
            Some(t) => t == a.teacher,
            None => req.mapped_teachers.contains(&a.teacher),
        };
        if !allowed {
            sink(HardViolation::UnmappedTeacher {
                occurrence: occ,
                teacher: a.teacher,
            });
        }

        let subject = &catalog.subjects[info.subject.index()];
        let section = &catalog.sections[info.section.index()];
        if subject.is_lab && !room.is_lab {
            sink(HardViolation::LabMismatch {
                occurrence: occ,
                classroom: a.classroom,
            });
        }
        if room.capacity < section.student_strength {
            sink(HardViolation::OverCapacity {
                occurrence: occ,
                classroom: a.classroom,
                capacity: room.capacity,
                strength: section.student_strength,
            });
        }

        let Some(slot) = catalog.grid.slot_index(a.day, a.period) else {
            sink(HardViolation::OutOfGrid {
                occurrence: occ,
                day: a.day,
                period: a.period,
            });
            continue;
        };

        if teacher.is_unavailable(slot) {
            sink(HardViolation::TeacherUnavailable {
                occurrence: occ,
                teacher: a.teacher,
                day: a.day,
                period: a.period,
            });
        }

        let t_cell = &mut teacher_first[a.teacher.index() * slots + slot];
        match *t_cell {
            Some(with) => sink(HardViolation::TeacherClash {
                teacher: a.teacher,
                day: a.day,
                period: a.period,
                occurrence: occ,
                with,
            }),
            None => *t_cell = Some(occ),
        }

        let r_cell = &mut room_first[a.classroom.index() * slots + slot];
        match *r_cell {
            Some(with) => sink(HardViolation::ClassroomClash {
                classroom: a.classroom,
                day: a.day,
                period: a.period,
                occurrence: occ,
                with,
            }),
            None => *r_cell = Some(occ),
        }

        let s_cell = &mut section_first[info.section.index() * slots + slot];
        match *s_cell {
            Some(with) => sink(HardViolation::SectionClash {
                section: info.section,
                day: a.day,
                period: a.period,
                occurrence: occ,
                with,
            }),
            None => *s_cell = Some(occ),
        }
    }

    for (t, &assigned) in load.iter().enumerate() {
        let cap = catalog.teachers[t].max_weekly_hours;
        if assigned > cap {
            sink(HardViolation::TeacherOverloaded {
                teacher: TeacherId::from(t),
                assigned,
                cap,
            });
        }
    }
}
