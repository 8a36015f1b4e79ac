use crate::catalog::{Catalog, OccurrenceId, SectionId};
use crate::constraints::Occupancy;
use crate::optimizer::placement::place;
use crate::schedule::{Assignment, Schedule};
use fastrand::Rng;

/// Floor on the reassignment probability of an occurrence involved in a
/// hard violation.
pub const CONFLICT_MUTATION_RATE: f64 = 0.5;

/// Cost-guided reassignment. `costs[occ]` is the number of hard violations the
/// occurrence takes part in; conflicted occurrences are far more likely to be
/// moved. Returns how many genes changed.
pub fn reassign(
    catalog: &Catalog,
    schedule: &mut Schedule,
    costs: &[u32],
    rate: f64,
    attempts: usize,
    rng: &mut Rng,
) -> usize {
    let mut occupancy = Occupancy::from_schedule(catalog, schedule);
    let conflict_rate = rate.max(CONFLICT_MUTATION_RATE);
    let mut changed = 0;

    for i in 0..schedule.len() {
        let occ = OccurrenceId::from(i);
        let p = if costs.get(i).copied().unwrap_or(0) > 0 {
            conflict_rate
        } else {
            rate
        };
        if rng.f64() >= p {
            continue;
        }

        let old = schedule.get(occ).copied();
        if let Some(old) = &old {
            occupancy.remove(catalog, occ, old);
        }
        let new = place(catalog, occ, &occupancy, attempts, rng);
        occupancy.add(catalog, occ, &new);
        schedule.set(occ, new);

        if old != Some(new) {
            changed += 1;
        }
    }

    changed
}

/// Swaps the time slots of two sessions of one random section. The swap is
/// kept only if neither moved session lands on a clash or an unavailable
/// slot.
pub fn swap_within_section(catalog: &Catalog, schedule: &mut Schedule, rng: &mut Rng) -> bool {
    let candidates: Vec<usize> = catalog
        .section_occurrences
        .iter()
        .enumerate()
        .filter(|(_, occs)| occs.len() >= 2)
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return false;
    }

    let sec = candidates[rng.usize(0..candidates.len())];
    let occs = &catalog.section_occurrences[sec];
    let i = rng.usize(0..occs.len());
    let mut j = rng.usize(0..occs.len() - 1);
    if j >= i {
        j += 1;
    }
    let (x, y) = (occs[i], occs[j]);

    let (Some(&a), Some(&b)) = (schedule.get(x), schedule.get(y)) else {
        return false;
    };
    if (a.day, a.period) == (b.day, b.period) {
        return false;
    }

    let mut occupancy = Occupancy::from_schedule(catalog, schedule);
    occupancy.remove(catalog, x, &a);
    occupancy.remove(catalog, y, &b);

    let a2 = Assignment { day: b.day, period: b.period, ..a };
    let b2 = Assignment { day: a.day, period: a.period, ..b };
    let section = SectionId::from(sec);

    if !fits(catalog, &occupancy, section, &a2) {
        return false;
    }
    occupancy.add(catalog, x, &a2);
    if !fits(catalog, &occupancy, section, &b2) {
        return false;
    }

    schedule.swap_slots(x, y);
    true
}

fn fits(catalog: &Catalog, occupancy: &Occupancy, section: SectionId, a: &Assignment) -> bool {
    let available = catalog
        .grid
        .slot_index(a.day, a.period)
        .zip(catalog.teachers.get(a.teacher.index()))
        .is_some_and(|(slot, t)| !t.is_unavailable(slot));
    available && occupancy.is_free(catalog, section, a)
}
