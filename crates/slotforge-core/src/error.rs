use crate::constraints::HardViolation;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// Resource kinds whose absence blocks a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Teachers,
    Subjects,
    Sections,
    Classrooms,
    Mappings,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Incomplete resources: {kind} ({detail})")]
    IncompleteResources { kind: ResourceKind, detail: String },

    #[error("Catalog scope '{0}' not found")]
    UnknownScope(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Generation cancelled after {generations} generation(s)")]
    Cancelled { generations: u32 },

    #[error("Emitted schedule breaks {} invariant(s); first: {}", .0.len(), .0.first().map(|v| v.to_string()).unwrap_or_default())]
    InternalInvariant(Vec<HardViolation>),

    #[error("Job cannot move from {from} to {to}")]
    InvalidTransition {
        from: slotforge_protocol::job::JobStatus,
        to: slotforge_protocol::job::JobStatus,
    },

    #[error("Job worker crashed: {0}")]
    WorkerPanic(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn incomplete(kind: ResourceKind, detail: impl Into<String>) -> Self {
        EngineError::IncompleteResources {
            kind,
            detail: detail.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Non-fatal outcomes attached to a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobWarning {
    /// The budget ran out before any candidate reached zero hard violations.
    InfeasibleTimeout { hard_violations: usize },
    /// The caller's wall-clock limit stopped the search early.
    TimeLimitReached { generations: u32 },
}

impl std::fmt::Display for JobWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobWarning::InfeasibleTimeout { hard_violations } => write!(
                f,
                "infeasible: best schedule still has {} hard violation(s)",
                hard_violations
            ),
            JobWarning::TimeLimitReached { generations } => write!(
                f,
                "time limit reached after {} generation(s)",
                generations
            ),
        }
    }
}
