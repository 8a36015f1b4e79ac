use crate::reports;
use clap::Args;
use slotforge_core::catalog::loader::load_snapshot_from_file;
use slotforge_core::catalog::JsonFileSource;
use slotforge_core::constraints::Fitness;
use slotforge_core::job::JobController;
use slotforge_core::optimizer::{CancelToken, ProgressCallback};
use slotforge_protocol::config::EngineConfig;
use slotforge_protocol::job::{FixedAssignment, GenerateRequest, JobStatus};
use std::fs;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub config: EngineConfig,

    /// Catalog snapshot (JSON) to schedule.
    #[arg(short = 'c', long)]
    pub catalog: String,

    /// College scope recorded in the logs.
    #[arg(long, default_value = "default")]
    pub scope: String,

    #[arg(short = 'n', long, default_value = "Timetable")]
    pub name: String,

    #[arg(short = 'y', long)]
    pub academic_year: String,

    #[arg(long, default_value = "")]
    pub semester: String,

    #[arg(short = 'g', long, default_value_t = 50)]
    pub generations: u32,

    /// Pins a teacher as SUBJECT:SECTION:TEACHER. Repeatable.
    #[arg(long = "pin", value_parser = parse_pin)]
    pub pins: Vec<FixedAssignment>,

    /// Writes the timetable JSON here instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Prints per-section grids after the summary.
    #[arg(long, default_value_t = false)]
    pub grid: bool,
}

fn parse_pin(raw: &str) -> Result<FixedAssignment, String> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [subject, section, teacher] if !subject.is_empty() && !section.is_empty() && !teacher.is_empty() => {
            Ok(FixedAssignment {
                subject_id: subject.to_string(),
                section_id: section.to_string(),
                teacher_id: teacher.to_string(),
            })
        }
        _ => Err(format!("expected SUBJECT:SECTION:TEACHER, got '{}'", raw)),
    }
}

struct CliLogger;
impl ProgressCallback for CliLogger {
    fn on_progress(&self, generation: u32, best: &Fitness, elapsed: Duration) -> bool {
        info!(
            "Gen {:3} | Best: {:.2} | Hard: {} | Soft: {:.1} | {:.1}s",
            generation,
            best.score,
            best.hard_violations,
            best.soft_penalty,
            elapsed.as_secs_f32()
        );
        true
    }
}

/// Returns the process exit code.
pub fn run(args: GenerateArgs, config: EngineConfig) -> i32 {
    let controller = match JobController::new(config) {
        Ok(c) => c,
        Err(e) => {
            error!("❌ {}", e);
            return 1;
        }
    };

    let mut request = GenerateRequest::new(
        &args.name,
        &args.academic_year,
        &args.semester,
        args.generations,
    );
    request.fixed_assignments = args.pins.clone();

    info!("📂 Loading catalog: {}", args.catalog);
    let source = JsonFileSource::file(&args.catalog);
    let report = controller.run(&source, &args.scope, &request, &CancelToken::new(), &CliLogger);

    reports::print_job_summary(&report);
    if args.grid && report.status() != JobStatus::Failed {
        let periods = load_snapshot_from_file(&args.catalog)
            .map(|snap| snap.slot_grid.time_slots)
            .unwrap_or_default();
        reports::print_section_grids(&report.output, &periods);
    }
    for w in &report.job.warnings {
        warn!("⚠️  {}", w);
    }

    let json = match serde_json::to_string_pretty(&report.output) {
        Ok(j) => j,
        Err(e) => {
            error!("❌ Failed to serialize timetable: {}", e);
            return 1;
        }
    };
    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, json) {
                error!("❌ Failed to write {}: {}", path, e);
                return 1;
            }
            info!("💾 Timetable written to {}", path);
        }
        None => println!("{}", json),
    }

    match report.status() {
        JobStatus::Failed => {
            if let Some(e) = &report.error {
                error!("❌ {}", e);
            }
            1
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("MATH:S1:B").unwrap();
        assert_eq!(pin.subject_id, "MATH");
        assert_eq!(pin.section_id, "S1");
        assert_eq!(pin.teacher_id, "B");

        assert!(parse_pin("MATH:S1").is_err());
        assert!(parse_pin("MATH::B").is_err());
        assert!(parse_pin("A:B:C:D").is_err());
    }
}
