use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use slotforge_core::catalog::ResourceStatus;
use slotforge_core::error::ResourceKind;
use slotforge_core::job::JobReport;
use slotforge_protocol::job::JobStatus;
use strum::IntoEnumIterator;

pub fn job_summary(report: &JobReport) {
    let out = &report.output;
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Job").add_attribute(Attribute::Bold),
        Cell::new("Status"),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Hard").fg(Color::Red),
        Cell::new("Soft"),
        Cell::new("Gens"),
        Cell::new("Sessions"),
    ]);
    for i in 2..=6 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    let status_color = match out.status {
        JobStatus::Completed => Color::Green,
        JobStatus::CompletedWithWarnings => Color::Yellow,
        _ => Color::Red,
    };
    let sessions: usize = out
        .timetable_data
        .values()
        .flat_map(|w| w.values())
        .flat_map(|d| d.values())
        .map(|entries| entries.len())
        .sum();

    table.add_row(vec![
        Cell::new(&out.id).add_attribute(Attribute::Bold),
        Cell::new(out.status).fg(status_color),
        Cell::new(
            out.fitness_score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "-".into()),
        )
        .fg(Color::Cyan),
        Cell::new(out.hard_violations).fg(Color::Red),
        Cell::new(format!("{:.1}", out.soft_penalty)),
        Cell::new(out.generations_run),
        Cell::new(sessions),
    ]);
    println!("\n{}", table);

    if let (Some(first), Some(last)) = (report.history.first(), report.history.last()) {
        println!(
            "Best score: {:.2} -> {:.2} over {} generation(s)",
            first,
            last,
            report.history.len().saturating_sub(1)
        );
    }
}

pub fn resource_status(status: &ResourceStatus) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Resource").add_attribute(Attribute::Bold),
        Cell::new("Count"),
        Cell::new("Ready"),
    ]);
    if let Some(col) = table.column_mut(1) {
        col.set_cell_alignment(CellAlignment::Right);
    }

    table.add_row(vec![
        Cell::new("departments"),
        Cell::new(status.departments),
        Cell::new("optional"),
    ]);
    for kind in ResourceKind::iter() {
        let count = status.count(kind);
        let ready = if count > 0 {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("MISSING").fg(Color::Red)
        };
        table.add_row(vec![Cell::new(kind), Cell::new(count), ready]);
    }
    println!("\n{}", table);
}
