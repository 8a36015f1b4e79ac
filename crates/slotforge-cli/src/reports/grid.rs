use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use slotforge_protocol::catalog::TimeSlotRecord;
use slotforge_protocol::job::{TimetableOutput, WeekSchedule};
use std::collections::BTreeSet;

/// One table per section: time slots down, days across, both in grid order.
///
/// `periods` is the catalog's slot grid. When it is empty the rows fall back
/// to the slot ids that appear in the timetable.
pub fn print_sections(output: &TimetableOutput, periods: &[TimeSlotRecord]) {
    for (week_id, week) in &output.timetable_data {
        let rows = if periods.is_empty() {
            slots_in_use(week)
        } else {
            periods.to_vec()
        };

        let sections = week.values().next().map(|d| d.keys().collect::<Vec<_>>());
        for section in sections.unwrap_or_default() {
            println!("\n{} | Section {}", week_id, section);
            println!("{}", section_table(week, &rows, section));
        }
    }
}

fn slots_in_use(week: &WeekSchedule) -> Vec<TimeSlotRecord> {
    let ids: BTreeSet<u32> = week
        .values()
        .flat_map(|d| d.values())
        .flatten()
        .map(|e| e.time_slot)
        .collect();
    ids.into_iter()
        .map(|id| TimeSlotRecord {
            id,
            label: id.to_string(),
        })
        .collect()
}

fn section_table(week: &WeekSchedule, rows: &[TimeSlotRecord], section: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    let mut header = vec![Cell::new("Slot").add_attribute(Attribute::Bold)];
    header.extend(week.keys().map(|d| Cell::new(d).add_attribute(Attribute::Bold)));
    table.add_row(header);

    for slot in rows {
        let mut row = vec![Cell::new(&slot.label)];
        for sections in week.values() {
            let label = sections
                .get(section)
                .and_then(|entries| entries.iter().find(|e| e.time_slot == slot.id))
                .map(|e| format!("{}\n{} @ {}", e.subject_id, e.teacher_id, e.classroom_id))
                .unwrap_or_default();
            row.push(Cell::new(label).set_alignment(CellAlignment::Center));
        }
        table.add_row(row);
    }
    table
}
