#![allow(dead_code)]

use slotforge_core::catalog::{Catalog, InMemorySource};
use slotforge_protocol::catalog::*;
use slotforge_protocol::config::EngineConfig;

pub const SCOPE: &str = "test-college";

/// Builder for catalog snapshots to keep test setup short.
#[derive(Default)]
pub struct CatalogBuilder {
    snap: CatalogSnapshot,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        let mut b = Self::default();
        b.snap.departments.push(DepartmentRecord {
            id: "D1".into(),
            name: "Sciences".into(),
            code: "SCI".into(),
        });
        b
    }

    pub fn teacher(mut self, id: &str, max_weekly_hours: i64) -> Self {
        self.snap.teachers.push(TeacherRecord {
            id: id.into(),
            department_id: Some("D1".into()),
            max_weekly_hours,
            duty_days: vec![],
        });
        self
    }

    pub fn duty_days(mut self, teacher: &str, days: &[&str]) -> Self {
        if let Some(t) = self.snap.teachers.iter_mut().find(|t| t.id == teacher) {
            t.duty_days = days.iter().map(|d| d.to_string()).collect();
        }
        self
    }

    pub fn subject(mut self, id: &str, weekly_quota: i64, is_lab: bool) -> Self {
        self.snap.subjects.push(SubjectRecord {
            id: id.into(),
            department_id: Some("D1".into()),
            weekly_quota,
            is_lab,
        });
        self
    }

    pub fn section(mut self, id: &str, student_strength: i64) -> Self {
        self.snap.sections.push(SectionRecord {
            id: id.into(),
            department_id: Some("D1".into()),
            student_strength,
        });
        self
    }

    pub fn room(mut self, id: &str, capacity: i64, is_lab: bool) -> Self {
        self.snap.classrooms.push(ClassroomRecord {
            id: id.into(),
            department_id: Some("D1".into()),
            capacity,
            is_lab,
        });
        self
    }

    /// Maps a teacher to a subject for every section.
    pub fn teaches(self, teacher: &str, subject: &str) -> Self {
        self.mapping(teacher, subject, None, true)
    }

    pub fn mapping(mut self, teacher: &str, subject: &str, section: Option<&str>, is_primary: bool) -> Self {
        self.snap.mappings.push(MappingRecord {
            subject_id: subject.into(),
            teacher_id: teacher.into(),
            section_id: section.map(|s| s.to_string()),
            is_primary,
        });
        self
    }

    pub fn unavailable(mut self, teacher: &str, day: &str, time_slot: u32) -> Self {
        self.preference(teacher).unavailable_slots.push(UnavailableSlot::On {
            day: day.into(),
            time_slot,
        });
        self
    }

    pub fn prefers_slots(mut self, teacher: &str, slots: &[u32]) -> Self {
        self.preference(teacher).preferred_time_slots = slots.to_vec();
        self
    }

    pub fn grid(mut self, days: &[&str], slots: u32) -> Self {
        self.snap.slot_grid = SlotGridRecord {
            days: days.iter().map(|d| d.to_string()).collect(),
            time_slots: (1..=slots)
                .map(|id| TimeSlotRecord {
                    id,
                    label: format!("P{}", id),
                })
                .collect(),
        };
        self
    }

    fn preference(&mut self, teacher: &str) -> &mut PreferenceRecord {
        let pos = match self.snap.preferences.iter().position(|p| p.teacher_id == teacher) {
            Some(p) => p,
            None => {
                self.snap.preferences.push(PreferenceRecord {
                    teacher_id: teacher.into(),
                    preferred_time_slots: vec![],
                    preferred_days: vec![],
                    unavailable_slots: vec![],
                });
                self.snap.preferences.len() - 1
            }
        };
        &mut self.snap.preferences[pos]
    }

    pub fn build(self) -> CatalogSnapshot {
        self.snap
    }

    pub fn catalog(self) -> Catalog {
        Catalog::from_snapshot(&self.snap).expect("test catalog should be valid")
    }

    pub fn source(self) -> InMemorySource {
        InMemorySource::with_scope(SCOPE, self.snap)
    }
}

/// Two teachers, one subject of three weekly sessions, one section, two rooms.
/// Teacher A cannot take the first Monday slot.
pub fn small_college() -> CatalogBuilder {
    CatalogBuilder::new()
        .teacher("A", 20)
        .teacher("B", 10)
        .subject("MATH", 3, false)
        .section("S1", 30)
        .room("R40", 40, false)
        .room("R50", 50, false)
        .teaches("A", "MATH")
        .teaches("B", "MATH")
        .unavailable("A", "Monday", 1)
}

/// A mid-sized college with labs, several sections and shared teachers.
pub fn busy_college() -> CatalogBuilder {
    CatalogBuilder::new()
        .teacher("T-MATH", 20)
        .teacher("T-PHY", 20)
        .teacher("T-CHEM", 20)
        .teacher("T-ENG", 20)
        .subject("MATH", 4, false)
        .subject("PHY", 3, false)
        .subject("CHEM-LAB", 2, true)
        .subject("ENG", 3, false)
        .section("CS-A", 40)
        .section("CS-B", 35)
        .section("EE-A", 30)
        .room("R101", 45, false)
        .room("R102", 45, false)
        .room("R103", 40, false)
        .room("LAB1", 45, true)
        .teaches("T-MATH", "MATH")
        .teaches("T-PHY", "PHY")
        .teaches("T-CHEM", "CHEM-LAB")
        .teaches("T-ENG", "ENG")
        .unavailable("T-MATH", "Friday", 7)
        .prefers_slots("T-ENG", &[1, 2, 3])
}

/// Small, fast search settings for tests.
pub fn quick_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.search.population_size = 16;
    config.search.patience = 5;
    config
}
