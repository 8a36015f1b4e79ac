use crate::reports;
use clap::Args;
use slotforge_core::catalog::loader::load_snapshot_from_file;
use slotforge_core::catalog::{Catalog, ResourceStatus};
use tracing::{error, info};

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Catalog snapshot (JSON) to inspect.
    #[arg(short = 'c', long)]
    pub catalog: String,
}

/// Prints resource counts and whether a generation run can start.
pub fn run(args: StatusArgs) -> i32 {
    let snapshot = match load_snapshot_from_file(&args.catalog) {
        Ok(s) => s,
        Err(e) => {
            error!("❌ Failed to load {}: {}", args.catalog, e);
            return 1;
        }
    };

    let status = ResourceStatus::of(&snapshot);
    reports::print_resource_status(&status);

    if !status.is_ready() {
        let missing: Vec<String> = status.missing().iter().map(|k| k.to_string()).collect();
        error!("❌ Not ready, missing: {}", missing.join(", "));
        return 1;
    }

    match Catalog::from_snapshot(&snapshot) {
        Ok(catalog) => {
            info!(
                "✅ Ready: {} session(s) to place across {} section(s)",
                catalog.occurrence_count(),
                status.sections
            );
            0
        }
        Err(e) => {
            error!("❌ {}", e);
            1
        }
    }
}
