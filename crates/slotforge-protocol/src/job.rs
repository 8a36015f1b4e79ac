use crate::catalog::CatalogSnapshot;
use crate::config::EngineConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

pub const MIN_GENERATIONS: u32 = 1;
pub const MAX_GENERATIONS: u32 = 200;

/// Identifier of the single week produced by a run.
pub const WEEK_KEY: &str = "Week 1";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GenerateRequest {
    pub name: String,
    pub academic_year: String,
    #[serde(default)]
    pub semester: String,
    pub total_generations: u32,
    /// Overrides `SearchParams::seed` when present.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Overrides `SearchParams::max_time_secs` when present.
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
    #[serde(default)]
    pub fixed_assignments: Vec<FixedAssignment>,
}

impl GenerateRequest {
    pub fn new(name: &str, academic_year: &str, semester: &str, total_generations: u32) -> Self {
        Self {
            name: name.to_string(),
            academic_year: academic_year.to_string(),
            semester: semester.to_string(),
            total_generations,
            seed: None,
            time_limit_secs: None,
            fixed_assignments: Vec::new(),
        }
    }

    pub fn clamped_generations(&self) -> u32 {
        self.total_generations.clamp(MIN_GENERATIONS, MAX_GENERATIONS)
    }
}

/// Pins the teacher who delivers every occurrence of a subject for a section.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FixedAssignment {
    pub subject_id: String,
    pub section_id: String,
    pub teacher_id: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    CompletedWithWarnings,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::CompletedWithWarnings | JobStatus::Failed
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TimetableEntry {
    pub time_slot: u32,
    pub subject_id: String,
    pub teacher_id: String,
    pub classroom_id: String,
}

/// section id -> entries for one day, sorted by time slot. Sections keep
/// catalog order.
pub type DaySchedule = IndexMap<String, Vec<TimetableEntry>>;
/// day name -> sections, in working-day order.
pub type WeekSchedule = IndexMap<String, DaySchedule>;
/// week id -> days.
pub type TimetableData = BTreeMap<String, WeekSchedule>;
/// resource id -> day x slot matrix, `true` meaning free.
pub type AvailabilityMatrix = BTreeMap<String, Vec<Vec<bool>>>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimetableOutput {
    pub id: String,
    pub name: String,
    pub academic_year: String,
    pub semester: String,
    pub status: JobStatus,
    pub fitness_score: Option<f64>,
    pub timetable_data: TimetableData,
    #[serde(default)]
    pub hard_violations: usize,
    #[serde(default)]
    pub soft_penalty: f64,
    #[serde(default)]
    pub generations_run: u32,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub teacher_availability: AvailabilityMatrix,
    #[serde(default)]
    pub classroom_availability: AvailabilityMatrix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobIdentifier {
    pub hash: String,
}

impl JobIdentifier {
    /// Deterministic fingerprint of everything that shapes the search landscape.
    pub fn from_parts(
        catalog: &CatalogSnapshot,
        request: &GenerateRequest,
        config: &EngineConfig,
    ) -> Self {
        let mut hasher = Sha256::new();

        hasher.update(serde_json::to_string(catalog).unwrap_or_default().as_bytes());
        hasher.update(serde_json::to_string(request).unwrap_or_default().as_bytes());
        hasher.update(serde_json::to_string(config).unwrap_or_default().as_bytes());

        Self {
            hash: hex::encode(hasher.finalize()),
        }
    }

    pub fn short(&self) -> &str {
        &self.hash[..self.hash.len().min(12)]
    }
}
