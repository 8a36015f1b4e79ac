use serde::{Deserialize, Serialize};

pub const DEFAULT_WORKING_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

pub const DEFAULT_TIME_SLOTS: [(u32, &str); 7] = [
    (1, "9:00 - 9:55"),
    (2, "9:55 - 10:50"),
    (3, "11:10 - 12:05"),
    (4, "12:05 - 1:00"),
    (5, "1:20 - 2:15"),
    (6, "2:15 - 3:10"),
    (7, "3:30 - 4:25"),
];

/// Everything the engine needs to know about one college, as exported by the
/// administrative application at the moment a run is requested.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub departments: Vec<DepartmentRecord>,
    #[serde(default)]
    pub teachers: Vec<TeacherRecord>,
    #[serde(default)]
    pub subjects: Vec<SubjectRecord>,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
    #[serde(default)]
    pub classrooms: Vec<ClassroomRecord>,
    #[serde(default)]
    pub mappings: Vec<MappingRecord>,
    #[serde(default)]
    pub preferences: Vec<PreferenceRecord>,
    #[serde(default)]
    pub slot_grid: SlotGridRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentRecord {
    pub id: String,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeacherRecord {
    pub id: String,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default = "default_weekly_hours")]
    pub max_weekly_hours: i64,
    /// Days the teacher is on duty. Empty means every working day.
    #[serde(default)]
    pub duty_days: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectRecord {
    pub id: String,
    #[serde(default)]
    pub department_id: Option<String>,
    pub weekly_quota: i64,
    #[serde(default)]
    pub is_lab: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionRecord {
    pub id: String,
    #[serde(default)]
    pub department_id: Option<String>,
    pub student_strength: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassroomRecord {
    pub id: String,
    #[serde(default)]
    pub department_id: Option<String>,
    pub capacity: i64,
    #[serde(default)]
    pub is_lab: bool,
}

/// A subject-teacher-section mapping. A mapping without a section applies
/// to every section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingRecord {
    pub subject_id: String,
    pub teacher_id: String,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PreferenceRecord {
    pub teacher_id: String,
    #[serde(default)]
    pub preferred_time_slots: Vec<u32>,
    #[serde(default)]
    pub preferred_days: Vec<String>,
    #[serde(default)]
    pub unavailable_slots: Vec<UnavailableSlot>,
}

/// An unavailable slot is either a bare time-slot id (blocked on every day)
/// or a specific day/time-slot pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UnavailableSlot {
    Every(u32),
    On { day: String, time_slot: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlotRecord {
    pub id: u32,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlotGridRecord {
    pub days: Vec<String>,
    pub time_slots: Vec<TimeSlotRecord>,
}

impl Default for SlotGridRecord {
    fn default() -> Self {
        Self {
            days: DEFAULT_WORKING_DAYS.iter().map(|d| d.to_string()).collect(),
            time_slots: DEFAULT_TIME_SLOTS
                .iter()
                .map(|&(id, label)| TimeSlotRecord {
                    id,
                    label: label.to_string(),
                })
                .collect(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_weekly_hours() -> i64 {
    20
}
