use crate::catalog::{Catalog, CatalogSource};
use crate::constraints::{ConstraintModel, HardViolation};
use crate::error::{EngineError, EngineResult, JobWarning};
use crate::optimizer::{
    CancelToken, Optimizer, ProgressCallback, SearchOptions, SearchOutcome, SilentProgress,
    StopReason,
};
use crate::output;
use crate::schedule::Schedule;
use slotforge_protocol::catalog::CatalogSnapshot;
use slotforge_protocol::config::EngineConfig;
use slotforge_protocol::job::{GenerateRequest, JobIdentifier, JobStatus, TimetableOutput};
use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// Lifecycle of one generation request.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub id: String,
    pub request: GenerateRequest,
    status: JobStatus,
    pub warnings: Vec<JobWarning>,
}

impl GenerationJob {
    pub fn new(id: impl Into<String>, request: GenerateRequest) -> Self {
        Self {
            id: id.into(),
            request,
            status: JobStatus::Pending,
            warnings: Vec::new(),
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Moves the job along `Pending -> Running -> terminal`. Anything else is
    /// rejected and leaves the status untouched.
    pub fn transition(&mut self, to: JobStatus) -> EngineResult<()> {
        let legal = match (self.status, to) {
            (JobStatus::Pending, JobStatus::Running) => true,
            (JobStatus::Pending, JobStatus::Failed) => true,
            (JobStatus::Running, t) => t.is_terminal(),
            _ => false,
        };
        if !legal {
            return Err(EngineError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// What a finished job hands back to the caller.
#[derive(Debug)]
pub struct JobReport {
    pub job: GenerationJob,
    pub output: TimetableOutput,
    /// Present exactly when the job failed.
    pub error: Option<EngineError>,
    /// Best score per generation, empty when the search never ran.
    pub history: Vec<f64>,
}

impl JobReport {
    pub fn status(&self) -> JobStatus {
        self.job.status()
    }
}

#[derive(Debug, Clone)]
pub struct JobController {
    config: EngineConfig,
}

impl JobController {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one job to a terminal state on the calling thread. Never leaves
    /// the job `Running`.
    pub fn run(
        &self,
        source: &dyn CatalogSource,
        college_scope: &str,
        request: &GenerateRequest,
        cancel: &CancelToken,
        callback: &dyn ProgressCallback,
    ) -> JobReport {
        let snapshot = source.snapshot(college_scope);
        let id = JobIdentifier::from_parts(
            snapshot.as_ref().unwrap_or(&CatalogSnapshot::default()),
            request,
            &self.config,
        );

        let mut job = GenerationJob::new(id.short(), request.clone());
        if let Err(e) = job.transition(JobStatus::Running) {
            return self.fail(job, e, Vec::new());
        }
        info!(
            "Job {}: generating '{}' for {} (up to {} generations)",
            job.id,
            request.name,
            college_scope,
            request.clamped_generations()
        );

        let prepared = snapshot.and_then(|snap| {
            let catalog = Catalog::from_snapshot(&snap)?.with_fixed_assignments(&request.fixed_assignments)?;
            Ok(Arc::new(ConstraintModel::new(Arc::new(catalog), &self.config.weights)))
        });
        let model = match prepared {
            Ok(m) => m,
            Err(e) => return self.fail(job, e, Vec::new()),
        };

        let options = SearchOptions::from_request(&self.config, request);
        let seed = request.seed.or(self.config.search.seed);
        let outcome = match Optimizer::new(model.clone(), options).run(seed, cancel, callback) {
            Ok(o) => o,
            Err(e) => return self.fail(job, e, Vec::new()),
        };

        if outcome.stop_reason == StopReason::Cancelled {
            let e = EngineError::Cancelled {
                generations: outcome.generations_run,
            };
            return self.fail(job, e, outcome.history);
        }

        self.finish(job, &model, outcome)
    }

    /// Runs a job on its own worker thread.
    pub fn spawn(
        &self,
        source: Arc<dyn CatalogSource>,
        college_scope: &str,
        request: GenerateRequest,
    ) -> JobHandle {
        let cancel = CancelToken::new();
        let controller = self.clone();
        let scope = college_scope.to_string();
        let token = cancel.clone();
        let fallback = request.clone();

        let handle = thread::spawn(move || {
            controller.run(source.as_ref(), &scope, &request, &token, &SilentProgress)
        });

        JobHandle {
            handle,
            cancel,
            request: fallback,
        }
    }

    fn finish(&self, mut job: GenerationJob, model: &ConstraintModel, outcome: SearchOutcome) -> JobReport {
        let catalog = model.catalog();
        let best = &outcome.best;
        let violations = model.violates_hard(&best.schedule);
        let fitness = model.fitness(&best.schedule);

        if let Err(e) = check_invariants(
            catalog,
            &best.schedule,
            &violations,
            best.fitness.map(|f| f.hard_violations),
        ) {
            return self.fail(job, e, outcome.history);
        }

        if outcome.stop_reason == StopReason::TimeLimit {
            job.warnings.push(JobWarning::TimeLimitReached {
                generations: outcome.generations_run,
            });
        }
        let status = if violations.is_empty() {
            JobStatus::Completed
        } else {
            warn!(
                "Job {}: no feasible schedule found, best keeps {} hard violation(s)",
                job.id, fitness.hard_violations
            );
            job.warnings.push(JobWarning::InfeasibleTimeout {
                hard_violations: fitness.hard_violations,
            });
            JobStatus::CompletedWithWarnings
        };
        if let Err(e) = job.transition(status) {
            return self.fail(job, e, outcome.history);
        }

        info!(
            "Job {}: {} with score {:.2} after {} generation(s)",
            job.id,
            status,
            fitness.score,
            outcome.generations_run
        );

        let output = TimetableOutput {
            id: job.id.clone(),
            name: job.request.name.clone(),
            academic_year: job.request.academic_year.clone(),
            semester: job.request.semester.clone(),
            status,
            fitness_score: Some(fitness.score),
            timetable_data: output::render_timetable(catalog, &best.schedule),
            hard_violations: fitness.hard_violations,
            soft_penalty: fitness.soft_penalty,
            generations_run: outcome.generations_run,
            warnings: job.warnings.iter().map(|w| w.to_string()).collect(),
            error: None,
            teacher_availability: output::teacher_availability(catalog, &best.schedule),
            classroom_availability: output::lab_availability(catalog, &best.schedule),
        };

        JobReport {
            job,
            output,
            error: None,
            history: outcome.history,
        }
    }

    fn fail(&self, mut job: GenerationJob, err: EngineError, history: Vec<f64>) -> JobReport {
        error!("Job {}: failed: {}", job.id, err);
        if !job.status().is_terminal() {
            job.status = JobStatus::Failed;
        }
        let output = failed_output(&job.id, &job.request, &err);
        JobReport {
            job,
            output,
            error: Some(err),
            history,
        }
    }
}

/// Shape checks on the schedule about to be emitted. A hard violation of a
/// scheduling rule is reported through warnings; a broken schedule shape, a
/// coverage hole, or a violation count that disagrees with the search's own
/// fitness is not.
fn check_invariants(
    catalog: &Catalog,
    schedule: &Schedule,
    violations: &[HardViolation],
    reported_hard: Option<usize>,
) -> EngineResult<()> {
    let structural: Vec<HardViolation> = violations.iter().filter(|v| v.is_structural()).cloned().collect();
    if !structural.is_empty() {
        return Err(EngineError::InternalInvariant(structural));
    }

    let counted: usize = violations.iter().map(|v| v.weight()).sum();
    if reported_hard.is_some_and(|h| h != counted) {
        return Err(EngineError::InternalInvariant(violations.to_vec()));
    }

    let uncovered: Vec<HardViolation> = catalog
        .requirements
        .iter()
        .flat_map(|r| r.occurrences())
        .filter(|&occ| schedule.get(occ).is_none())
        .map(|occurrence| HardViolation::Unassigned { occurrence })
        .collect();
    if !uncovered.is_empty() || schedule.len() != catalog.occurrence_count() {
        return Err(EngineError::InternalInvariant(uncovered));
    }
    Ok(())
}

fn failed_output(id: &str, request: &GenerateRequest, err: &EngineError) -> TimetableOutput {
    TimetableOutput {
        id: id.to_string(),
        name: request.name.clone(),
        academic_year: request.academic_year.clone(),
        semester: request.semester.clone(),
        status: JobStatus::Failed,
        fitness_score: None,
        timetable_data: Default::default(),
        hard_violations: 0,
        soft_penalty: 0.0,
        generations_run: match err {
            EngineError::Cancelled { generations } => *generations,
            _ => 0,
        },
        warnings: Vec::new(),
        error: Some(err.to_string()),
        teacher_availability: Default::default(),
        classroom_availability: Default::default(),
    }
}

/// A job running on a worker thread.
pub struct JobHandle {
    handle: JoinHandle<JobReport>,
    cancel: CancelToken,
    request: GenerateRequest,
}

impl JobHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker. A crashed worker still yields a `Failed` report.
    pub fn join(self) -> JobReport {
        match self.handle.join() {
            Ok(report) => report,
            Err(payload) => {
                let err = EngineError::WorkerPanic(panic_message(payload));
                error!("Job worker crashed: {}", err);
                let mut job = GenerationJob::new("unknown", self.request);
                job.status = JobStatus::Failed;
                let output = failed_output(&job.id, &job.request, &err);
                JobReport {
                    job,
                    output,
                    error: Some(err),
                    history: Vec::new(),
                }
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
