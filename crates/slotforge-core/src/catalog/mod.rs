pub mod loader;
pub mod types;

pub use self::loader::{CatalogSource, InMemorySource, JsonFileSource};
pub use self::types::*;

use crate::error::{EngineError, EngineResult, ResourceKind};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use slotforge_protocol::catalog::{CatalogSnapshot, UnavailableSlot};
use slotforge_protocol::job::FixedAssignment;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

/// Per-kind counts of a snapshot, for the caller's readiness gating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub departments: usize,
    pub teachers: usize,
    pub subjects: usize,
    pub sections: usize,
    pub classrooms: usize,
    pub mappings: usize,
}

impl ResourceStatus {
    pub fn of(snapshot: &CatalogSnapshot) -> Self {
        Self {
            departments: snapshot.departments.len(),
            teachers: snapshot.teachers.len(),
            subjects: snapshot.subjects.len(),
            sections: snapshot.sections.len(),
            classrooms: snapshot.classrooms.len(),
            mappings: snapshot.mappings.len(),
        }
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Teachers => self.teachers,
            ResourceKind::Subjects => self.subjects,
            ResourceKind::Sections => self.sections,
            ResourceKind::Classrooms => self.classrooms,
            ResourceKind::Mappings => self.mappings,
        }
    }

    pub fn missing(&self) -> Vec<ResourceKind> {
        ResourceKind::iter().filter(|&k| self.count(k) == 0).collect()
    }

    pub fn is_ready(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Validated, index-addressed view of one college's scheduling inputs.
///
/// Built once per run from an owned [`CatalogSnapshot`] and never mutated
/// while a search is in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub departments: Vec<Department>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub sections: Vec<Section>,
    pub classrooms: Vec<Classroom>,
    pub requirements: Vec<Requirement>,
    pub occurrences: Vec<Occurrence>,
    pub grid: SlotGrid,
    /// Occurrences grouped by section, indexed by `SectionId`.
    pub section_occurrences: Vec<Vec<OccurrenceId>>,
    pub status: ResourceStatus,
}

impl Catalog {
    /// Pulls a fresh snapshot from `source` and validates it.
    pub fn load(source: &dyn CatalogSource, college_scope: &str) -> EngineResult<Self> {
        let snapshot = source.snapshot(college_scope)?;
        Self::from_snapshot(&snapshot)
    }

    pub fn from_snapshot(snapshot: &CatalogSnapshot) -> EngineResult<Self> {
        let status = ResourceStatus::of(snapshot);
        if let Some(&kind) = status.missing().first() {
            return Err(EngineError::incomplete(kind, format!("no {} found", kind)));
        }

        let grid = build_grid(snapshot)?;

        let departments = snapshot
            .departments
            .iter()
            .map(|d| Department {
                id: d.id.clone(),
                name: d.name.clone(),
                code: d.code.clone(),
            })
            .collect();

        // --- Teachers ---
        let teacher_ids = index_ids(snapshot.teachers.iter().map(|t| t.id.as_str()), "teacher")?;
        let mut teachers = Vec::with_capacity(snapshot.teachers.len());
        for t in &snapshot.teachers {
            let cap = positive(t.max_weekly_hours, "max_weekly_hours", &t.id)?;
            let duty_days = if t.duty_days.is_empty() {
                vec![true; grid.day_count()]
            } else {
                day_mask(&grid, &t.duty_days, &t.id)?
            };
            teachers.push(Teacher {
                id: t.id.clone(),
                department: t.department_id.clone(),
                max_weekly_hours: cap,
                unavailable: vec![false; grid.slot_count()],
                preferred_periods: Vec::new(),
                preferred_days: Vec::new(),
                duty_days,
            });
        }

        for pref in &snapshot.preferences {
            let &tid = teacher_ids.get(pref.teacher_id.as_str()).ok_or_else(|| {
                EngineError::Validation(format!(
                    "preference references unknown teacher '{}'",
                    pref.teacher_id
                ))
            })?;
            let teacher = &mut teachers[tid];

            if !pref.preferred_time_slots.is_empty() {
                let mut mask = vec![false; grid.period_count()];
                for &slot_id in &pref.preferred_time_slots {
                    mask[period_of(&grid, slot_id, &pref.teacher_id)?] = true;
                }
                teacher.preferred_periods = mask;
            }
            if !pref.preferred_days.is_empty() {
                teacher.preferred_days = day_mask(&grid, &pref.preferred_days, &pref.teacher_id)?;
            }
            for blocked in &pref.unavailable_slots {
                match blocked {
                    UnavailableSlot::Every(slot_id) => {
                        let p = period_of(&grid, *slot_id, &pref.teacher_id)?;
                        for d in 0..grid.day_count() {
                            teacher.unavailable[d * grid.period_count() + p] = true;
                        }
                    }
                    UnavailableSlot::On { day, time_slot } => {
                        let d = grid.day_index(day).ok_or_else(|| unknown_day(day, &pref.teacher_id))?;
                        let p = period_of(&grid, *time_slot, &pref.teacher_id)?;
                        teacher.unavailable[d * grid.period_count() + p] = true;
                    }
                }
            }
        }

        // --- Subjects, sections, classrooms ---
        let subject_ids = index_ids(snapshot.subjects.iter().map(|s| s.id.as_str()), "subject")?;
        let subjects = snapshot
            .subjects
            .iter()
            .map(|s| {
                Ok(Subject {
                    id: s.id.clone(),
                    department: s.department_id.clone(),
                    weekly_quota: positive(s.weekly_quota, "weekly_quota", &s.id)?,
                    is_lab: s.is_lab,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let section_ids = index_ids(snapshot.sections.iter().map(|s| s.id.as_str()), "section")?;
        let sections = snapshot
            .sections
            .iter()
            .map(|s| {
                Ok(Section {
                    id: s.id.clone(),
                    department: s.department_id.clone(),
                    student_strength: positive(s.student_strength, "student_strength", &s.id)?,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        index_ids(snapshot.classrooms.iter().map(|c| c.id.as_str()), "classroom")?;
        let classrooms = snapshot
            .classrooms
            .iter()
            .map(|c| {
                Ok(Classroom {
                    id: c.id.clone(),
                    department: c.department_id.clone(),
                    capacity: positive(c.capacity, "capacity", &c.id)?,
                    is_lab: c.is_lab,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        // --- Mappings -> requirements ---
        // BTreeMap keeps requirement order independent of input order quirks.
        let mut pairs: BTreeMap<(usize, usize), Vec<(usize, bool)>> = BTreeMap::new();
        for m in &snapshot.mappings {
            let &s = subject_ids.get(m.subject_id.as_str()).ok_or_else(|| {
                EngineError::Validation(format!("mapping references unknown subject '{}'", m.subject_id))
            })?;
            let &t = teacher_ids.get(m.teacher_id.as_str()).ok_or_else(|| {
                EngineError::Validation(format!("mapping references unknown teacher '{}'", m.teacher_id))
            })?;
            let targets: Vec<usize> = match &m.section_id {
                Some(sec) => vec![*section_ids.get(sec.as_str()).ok_or_else(|| {
                    EngineError::Validation(format!("mapping references unknown section '{}'", sec))
                })?],
                None => (0..sections.len()).collect(),
            };
            for sec in targets {
                let entry = pairs.entry((s, sec)).or_default();
                match entry.iter_mut().find(|(tid, _)| *tid == t) {
                    Some(existing) => existing.1 |= m.is_primary,
                    None => entry.push((t, m.is_primary)),
                }
            }
        }

        if let Some(unmapped) = subjects
            .iter()
            .enumerate()
            .find(|(i, _)| !pairs.keys().any(|&(s, _)| s == *i))
        {
            return Err(EngineError::incomplete(
                ResourceKind::Mappings,
                format!("subject '{}' has no teacher mapping", unmapped.1.id),
            ));
        }

        let mut requirements = Vec::with_capacity(pairs.len());
        let mut occurrences = Vec::new();
        let mut section_occurrences = vec![Vec::new(); sections.len()];

        for ((s, sec), teachers_for_pair) in pairs {
            let subject = &subjects[s];
            let section = &sections[sec];

            let mapped_teachers: Vec<TeacherId> =
                teachers_for_pair.iter().map(|&(t, _)| TeacherId::from(t)).collect();
            let primaries: Vec<TeacherId> = teachers_for_pair
                .iter()
                .filter(|(_, p)| *p)
                .map(|&(t, _)| TeacherId::from(t))
                .collect();
            let eligible_teachers = if primaries.is_empty() {
                mapped_teachers.clone()
            } else {
                primaries
            };

            let suitable_rooms = suitable_rooms(&classrooms, subject, section);
            if suitable_rooms.is_empty() {
                warn!(
                    "Catalog: no classroom fits subject '{}' for section '{}' (lab={}, strength={})",
                    subject.id, section.id, subject.is_lab, section.student_strength
                );
            }

            let rid = RequirementId::from(requirements.len());
            let first_occurrence = OccurrenceId::from(occurrences.len());
            for ordinal in 0..subject.weekly_quota {
                let occ = OccurrenceId::from(occurrences.len());
                occurrences.push(Occurrence {
                    requirement: rid,
                    subject: SubjectId::from(s),
                    section: SectionId::from(sec),
                    ordinal,
                });
                section_occurrences[sec].push(occ);
            }

            requirements.push(Requirement {
                subject: SubjectId::from(s),
                section: SectionId::from(sec),
                mapped_teachers,
                eligible_teachers,
                fixed_teacher: None,
                suitable_rooms,
                quota: subject.weekly_quota,
                first_occurrence,
            });
        }

        let catalog = Catalog {
            departments,
            teachers,
            subjects,
            sections,
            classrooms,
            requirements,
            occurrences,
            grid,
            section_occurrences,
            status,
        };
        catalog.log_load_warnings();

        debug!(
            "Catalog: {} requirements, {} occurrences over {} slots",
            catalog.requirements.len(),
            catalog.occurrences.len(),
            catalog.grid.slot_count()
        );
        Ok(catalog)
    }

    /// Pins teachers for specific subject/section pairs.
    pub fn with_fixed_assignments(mut self, fixed: &[FixedAssignment]) -> EngineResult<Self> {
        for f in fixed {
            let rid = self
                .find_requirement(&f.subject_id, &f.section_id)
                .ok_or_else(|| {
                    EngineError::Validation(format!(
                        "fixed assignment targets unmapped pair ({}, {})",
                        f.subject_id, f.section_id
                    ))
                })?;
            let req = &mut self.requirements[rid.index()];
            let teacher = req
                .mapped_teachers
                .iter()
                .copied()
                .find(|t| self.teachers[t.index()].id == f.teacher_id)
                .ok_or_else(|| {
                    EngineError::Validation(format!(
                        "teacher '{}' is not mapped to ({}, {})",
                        f.teacher_id, f.subject_id, f.section_id
                    ))
                })?;
            req.fixed_teacher = Some(teacher);
        }
        Ok(self)
    }

    pub fn find_requirement(&self, subject_id: &str, section_id: &str) -> Option<RequirementId> {
        self.requirements
            .iter()
            .position(|r| {
                self.subjects[r.subject.index()].id == subject_id
                    && self.sections[r.section.index()].id == section_id
            })
            .map(RequirementId::from)
    }

    pub fn teacher_index(&self, id: &str) -> Option<TeacherId> {
        self.teachers.iter().position(|t| t.id == id).map(TeacherId::from)
    }

    pub fn section_index(&self, id: &str) -> Option<SectionId> {
        self.sections.iter().position(|s| s.id == id).map(SectionId::from)
    }

    /// Per-kind counts of the snapshot this catalog was built from.
    pub fn resource_status(&self) -> ResourceStatus {
        self.status
    }

    #[inline(always)]
    pub fn requirement_of(&self, occ: OccurrenceId) -> &Requirement {
        &self.requirements[self.occurrences[occ.index()].requirement.index()]
    }

    #[inline(always)]
    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }

    fn log_load_warnings(&self) {
        let demand = self.occurrences.len();
        let capacity: u64 = self.teachers.iter().map(|t| t.max_weekly_hours as u64).sum();
        if demand as u64 > capacity {
            warn!(
                "Catalog: {} weekly sessions exceed combined teacher capacity of {}",
                demand, capacity
            );
        }
        for (sec, occs) in self.section_occurrences.iter().enumerate() {
            if occs.len() > self.grid.slot_count() {
                warn!(
                    "Catalog: section '{}' needs {} sessions but the week has {} slots",
                    self.sections[sec].id,
                    occs.len(),
                    self.grid.slot_count()
                );
            }
        }
    }
}

fn build_grid(snapshot: &CatalogSnapshot) -> EngineResult<SlotGrid> {
    let rec = &snapshot.slot_grid;
    if rec.days.is_empty() || rec.time_slots.is_empty() {
        return Err(EngineError::Validation(
            "slot grid needs at least one day and one time slot".into(),
        ));
    }
    if rec.days.len() > u8::MAX as usize || rec.time_slots.len() > u8::MAX as usize {
        return Err(EngineError::Validation(format!(
            "slot grid too large ({} days x {} slots)",
            rec.days.len(),
            rec.time_slots.len()
        )));
    }
    index_ids(rec.days.iter().map(|d| d.as_str()), "day")?;

    let mut seen = fnv::FnvHashSet::default();
    for ts in &rec.time_slots {
        if !seen.insert(ts.id) {
            return Err(EngineError::Validation(format!("duplicate time slot id {}", ts.id)));
        }
    }

    Ok(SlotGrid {
        days: rec.days.clone(),
        periods: rec
            .time_slots
            .iter()
            .map(|ts| TimeSlot {
                id: ts.id,
                label: ts.label.clone(),
            })
            .collect(),
    })
}

fn index_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    what: &str,
) -> EngineResult<FnvHashMap<&'a str, usize>> {
    let mut map = FnvHashMap::default();
    for (i, id) in ids.enumerate() {
        if map.insert(id, i).is_some() {
            return Err(EngineError::Validation(format!("duplicate {} id '{}'", what, id)));
        }
    }
    Ok(map)
}

fn positive(value: i64, field: &str, owner: &str) -> EngineResult<u32> {
    if value <= 0 || value > u32::MAX as i64 {
        return Err(EngineError::Validation(format!(
            "{} of '{}' must be a positive integer, got {}",
            field, owner, value
        )));
    }
    Ok(value as u32)
}

fn period_of(grid: &SlotGrid, slot_id: u32, owner: &str) -> EngineResult<usize> {
    grid.period_index(slot_id).ok_or_else(|| {
        EngineError::Validation(format!("'{}' references unknown time slot {}", owner, slot_id))
    })
}

fn unknown_day(day: &str, owner: &str) -> EngineError {
    EngineError::Validation(format!("'{}' references unknown day '{}'", owner, day))
}

fn day_mask(grid: &SlotGrid, days: &[String], owner: &str) -> EngineResult<Vec<bool>> {
    let mut mask = vec![false; grid.day_count()];
    for day in days {
        let d = grid.day_index(day).ok_or_else(|| unknown_day(day, owner))?;
        mask[d] = true;
    }
    Ok(mask)
}

/// Rooms a requirement may use. Lab subjects need lab rooms; other subjects
/// prefer ordinary rooms and only fall back to labs when none fit.
fn suitable_rooms(classrooms: &[Classroom], subject: &Subject, section: &Section) -> Vec<ClassroomId> {
    let fits = |c: &&Classroom| c.capacity >= section.student_strength;
    let pick = |want_lab: bool| -> Vec<ClassroomId> {
        classrooms
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_lab == want_lab)
            .filter(|(_, c)| fits(c))
            .map(|(i, _)| ClassroomId::from(i))
            .collect()
    };

    if subject.is_lab {
        pick(true)
    } else {
        let ordinary = pick(false);
        if ordinary.is_empty() {
            pick(true)
        } else {
            ordinary
        }
    }
}
