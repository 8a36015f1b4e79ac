use crate::catalog::{Catalog, ClassroomId, OccurrenceId, SectionId, TeacherId};
use serde::{Deserialize, Serialize};

/// Where and by whom one occurrence is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub teacher: TeacherId,
    pub classroom: ClassroomId,
    pub day: u8,
    pub period: u8,
}

/// A candidate timetable: one slot per occurrence, addressed by `OccurrenceId`.
///
/// `Clone` is a full value copy. Nothing inside is shared, so a mutated clone
/// never reaches back into its source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schedule {
    assignments: Vec<Option<Assignment>>,
}

impl Schedule {
    pub fn empty(catalog: &Catalog) -> Self {
        Self {
            assignments: vec![None; catalog.occurrence_count()],
        }
    }

    /// Records an assignment without checking it. Legality is the
    /// constraint model's job; ids outside the schedule are ignored.
    #[inline(always)]
    pub fn assign(
        &mut self,
        occ: OccurrenceId,
        teacher: TeacherId,
        classroom: ClassroomId,
        day: u8,
        period: u8,
    ) {
        self.set(
            occ,
            Assignment {
                teacher,
                classroom,
                day,
                period,
            },
        );
    }

    #[inline(always)]
    pub fn set(&mut self, occ: OccurrenceId, assignment: Assignment) {
        if let Some(slot) = self.assignments.get_mut(occ.index()) {
            *slot = Some(assignment);
        }
    }

    #[inline(always)]
    pub fn unassign(&mut self, occ: OccurrenceId) {
        if let Some(slot) = self.assignments.get_mut(occ.index()) {
            *slot = None;
        }
    }

    #[inline(always)]
    pub fn get(&self, occ: OccurrenceId) -> Option<&Assignment> {
        self.assignments.get(occ.index()).and_then(|a| a.as_ref())
    }

    /// `(day, period)` of an occurrence, if assigned.
    #[inline(always)]
    pub fn slot_of(&self, occ: OccurrenceId) -> Option<(u8, u8)> {
        self.get(occ).map(|a| (a.day, a.period))
    }

    pub fn occurrences_for<'a>(
        &'a self,
        catalog: &'a Catalog,
        section: SectionId,
    ) -> impl Iterator<Item = (OccurrenceId, Option<&'a Assignment>)> + 'a {
        catalog
            .section_occurrences
            .get(section.index())
            .into_iter()
            .flatten()
            .map(move |&occ| (occ, self.get(occ)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (OccurrenceId, Option<&Assignment>)> {
        self.assignments
            .iter()
            .enumerate()
            .map(|(i, a)| (OccurrenceId::from(i), a.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn assigned_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.assignments.iter().all(|a| a.is_some())
    }

    /// Swaps the day/period of two occurrences, keeping teacher and room.
    pub fn swap_slots(&mut self, a: OccurrenceId, b: OccurrenceId) {
        let (Some(&x), Some(&y)) = (self.get(a), self.get(b)) else {
            return;
        };
        self.set(
            a,
            Assignment {
                day: y.day,
                period: y.period,
                ..x
            },
        );
        self.set(
            b,
            Assignment {
                day: x.day,
                period: x.period,
                ..y
            },
        );
    }
}
