use crate::catalog::{Catalog, OccurrenceId, SectionId, TeacherId};
use crate::schedule::{Assignment, Schedule};

/// Per-slot usage counters for teachers, rooms and sections.
///
/// Flattened as `resource * slot_count + slot`. Assignments outside the
/// grid or naming unknown resources only touch the counters they can.
#[derive(Debug, Clone)]
pub struct Occupancy {
    slots: usize,
    teacher: Vec<u16>,
    room: Vec<u16>,
    section: Vec<u16>,
    teacher_load: Vec<u32>,
}

impl Occupancy {
    pub fn new(catalog: &Catalog) -> Self {
        let slots = catalog.grid.slot_count();
        Self {
            slots,
            teacher: vec![0; catalog.teachers.len() * slots],
            room: vec![0; catalog.classrooms.len() * slots],
            section: vec![0; catalog.sections.len() * slots],
            teacher_load: vec![0; catalog.teachers.len()],
        }
    }

    pub fn from_schedule(catalog: &Catalog, schedule: &Schedule) -> Self {
        let mut occ = Self::new(catalog);
        for (id, a) in schedule.iter() {
            if let Some(a) = a {
                occ.add(catalog, id, a);
            }
        }
        occ
    }

    pub fn add(&mut self, catalog: &Catalog, occ: OccurrenceId, a: &Assignment) {
        self.apply(catalog, occ, a, true);
    }

    pub fn remove(&mut self, catalog: &Catalog, occ: OccurrenceId, a: &Assignment) {
        self.apply(catalog, occ, a, false);
    }

    fn apply(&mut self, catalog: &Catalog, occ: OccurrenceId, a: &Assignment, add: bool) {
        let bump = |v: &mut u16| {
            if add {
                *v += 1;
            } else {
                *v = v.saturating_sub(1);
            }
        };

        if let Some(load) = self.teacher_load.get_mut(a.teacher.index()) {
            if add {
                *load += 1;
            } else {
                *load = load.saturating_sub(1);
            }
        }

        let Some(slot) = catalog.grid.slot_index(a.day, a.period) else {
            return;
        };
        let section = catalog.occurrences[occ.index()].section;

        if let Some(v) = self.teacher.get_mut(a.teacher.index() * self.slots + slot) {
            bump(v);
        }
        if let Some(v) = self.room.get_mut(a.classroom.index() * self.slots + slot) {
            bump(v);
        }
        if let Some(v) = self.section.get_mut(section.index() * self.slots + slot) {
            bump(v);
        }
    }

    #[inline(always)]
    pub fn teacher_at(&self, teacher: TeacherId, slot: usize) -> u16 {
        self.teacher
            .get(teacher.index() * self.slots + slot)
            .copied()
            .unwrap_or(0)
    }

    #[inline(always)]
    pub fn room_at(&self, room: crate::catalog::ClassroomId, slot: usize) -> u16 {
        self.room.get(room.index() * self.slots + slot).copied().unwrap_or(0)
    }

    #[inline(always)]
    pub fn section_at(&self, section: SectionId, slot: usize) -> u16 {
        self.section
            .get(section.index() * self.slots + slot)
            .copied()
            .unwrap_or(0)
    }

    #[inline(always)]
    pub fn teacher_load(&self, teacher: TeacherId) -> u32 {
        self.teacher_load.get(teacher.index()).copied().unwrap_or(0)
    }

    /// True when placing `a` for a session of `section` would not share a
    /// slot with anything already counted.
    pub fn is_free(&self, catalog: &Catalog, section: SectionId, a: &Assignment) -> bool {
        match catalog.grid.slot_index(a.day, a.period) {
            Some(slot) => {
                self.teacher_at(a.teacher, slot) == 0
                    && self.room_at(a.classroom, slot) == 0
                    && self.section_at(section, slot) == 0
            }
            None => false,
        }
    }
}
