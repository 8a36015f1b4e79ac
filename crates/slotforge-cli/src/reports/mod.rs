mod grid;
mod tables;

pub use self::grid::print_sections as print_section_grids;
pub use self::tables::{job_summary as print_job_summary, resource_status as print_resource_status};
