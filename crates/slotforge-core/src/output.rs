use crate::catalog::Catalog;
use crate::schedule::Schedule;
use slotforge_protocol::job::{
    AvailabilityMatrix, DaySchedule, TimetableData, TimetableEntry, WeekSchedule, WEEK_KEY,
};

/// Pivots a schedule into week -> day -> section -> entries.
///
/// Every working day and every section is present, possibly with no entries,
/// keyed in grid day order and catalog section order.
/// Entries within a day are sorted by period position.
pub fn render_timetable(catalog: &Catalog, schedule: &Schedule) -> TimetableData {
    let days = catalog.grid.day_count();
    let mut grid: Vec<Vec<Vec<(u8, TimetableEntry)>>> =
        vec![vec![Vec::new(); catalog.sections.len()]; days];

    for (occ, a) in schedule.iter() {
        let Some(a) = a else { continue };
        let Some(info) = catalog.occurrences.get(occ.index()) else {
            continue;
        };
        let (Some(period), Some(teacher), Some(room)) = (
            catalog.grid.periods.get(a.period as usize),
            catalog.teachers.get(a.teacher.index()),
            catalog.classrooms.get(a.classroom.index()),
        ) else {
            continue;
        };
        let Some(day) = grid.get_mut(a.day as usize) else {
            continue;
        };
        day[info.section.index()].push((
            a.period,
            TimetableEntry {
                time_slot: period.id,
                subject_id: catalog.subjects[info.subject.index()].id.clone(),
                teacher_id: teacher.id.clone(),
                classroom_id: room.id.clone(),
            },
        ));
    }

    let mut week = WeekSchedule::new();
    for (d, sections) in grid.into_iter().enumerate() {
        let mut day = DaySchedule::new();
        for (s, mut entries) in sections.into_iter().enumerate() {
            entries.sort_by_key(|(p, _)| *p);
            day.insert(
                catalog.sections[s].id.clone(),
                entries.into_iter().map(|(_, e)| e).collect(),
            );
        }
        week.insert(catalog.grid.days[d].clone(), day);
    }

    let mut data = TimetableData::new();
    data.insert(WEEK_KEY.to_string(), week);
    data
}

/// Day x period matrix per teacher, `true` where the teacher is free and
/// available.
pub fn teacher_availability(catalog: &Catalog, schedule: &Schedule) -> AvailabilityMatrix {
    let mut free = vec![free_grid(catalog); catalog.teachers.len()];
    for (t, teacher) in catalog.teachers.iter().enumerate() {
        for (d, row) in free[t].iter_mut().enumerate() {
            for (p, cell) in row.iter_mut().enumerate() {
                if teacher.is_unavailable(d * catalog.grid.period_count() + p) {
                    *cell = false;
                }
            }
        }
    }
    for (_, a) in schedule.iter() {
        if let Some(a) = a {
            mark_busy(&mut free, a.teacher.index(), a.day, a.period);
        }
    }

    catalog
        .teachers
        .iter()
        .map(|t| t.id.clone())
        .zip(free)
        .collect()
}

/// Day x period matrix per lab classroom, `true` where the lab is free.
pub fn lab_availability(catalog: &Catalog, schedule: &Schedule) -> AvailabilityMatrix {
    let mut free = vec![free_grid(catalog); catalog.classrooms.len()];
    for (_, a) in schedule.iter() {
        if let Some(a) = a {
            mark_busy(&mut free, a.classroom.index(), a.day, a.period);
        }
    }

    catalog
        .classrooms
        .iter()
        .zip(free)
        .filter(|(c, _)| c.is_lab)
        .map(|(c, m)| (c.id.clone(), m))
        .collect()
}

fn free_grid(catalog: &Catalog) -> Vec<Vec<bool>> {
    vec![vec![true; catalog.grid.period_count()]; catalog.grid.day_count()]
}

fn mark_busy(matrices: &mut [Vec<Vec<bool>>], resource: usize, day: u8, period: u8) {
    if let Some(cell) = matrices
        .get_mut(resource)
        .and_then(|m| m.get_mut(day as usize))
        .and_then(|row| row.get_mut(period as usize))
    {
        *cell = false;
    }
}
