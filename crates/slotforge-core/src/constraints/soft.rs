use crate::catalog::Catalog;
use crate::schedule::Schedule;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};
use slotforge_protocol::config::PenaltyWeights;

/// Weighted soft penalty split by component. Every term is non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftBreakdown {
    pub unpreferred_slot: f64,
    pub unpreferred_day: f64,
    pub non_duty_day: f64,
    pub gaps: f64,
}

impl SoftBreakdown {
    pub fn total(&self) -> f64 {
        self.unpreferred_slot + self.unpreferred_day + self.non_duty_day + self.gaps
    }
}

pub(crate) fn breakdown(catalog: &Catalog, weights: &PenaltyWeights, schedule: &Schedule) -> SoftBreakdown {
    let days = catalog.grid.day_count();
    let periods = catalog.grid.period_count();
    let mut out = SoftBreakdown::default();

    // Occupied periods per (teacher, day), for the gap term.
    let mut busy = vec![false; catalog.teachers.len() * days * periods];

    for (_, a) in schedule.iter() {
        let Some(a) = a else { continue };
        let Some(teacher) = catalog.teachers.get(a.teacher.index()) else {
            continue;
        };
        let (d, p) = (a.day as usize, a.period as usize);
        if d >= days || p >= periods {
            continue;
        }

        if teacher.prefers_period(p) == Some(false) {
            out.unpreferred_slot += weights.penalty_unpreferred_slot;
        }
        if teacher.prefers_day(d) == Some(false) {
            out.unpreferred_day += weights.penalty_unpreferred_day;
        }
        if !teacher.on_duty(d) {
            out.non_duty_day += weights.penalty_non_duty_day;
        }
        busy[(a.teacher.index() * days + d) * periods + p] = true;
    }

    let mut idle = 0usize;
    for row in busy.chunks(periods.max(1)) {
        if let MinMaxResult::MinMax(first, last) = row.iter().positions(|&b| b).minmax() {
            let used = row[first..=last].iter().filter(|&&b| b).count();
            idle += (last - first + 1) - used;
        }
    }
    out.gaps = idle as f64 * weights.penalty_gap_per_slot;

    out
}

/// Largest soft penalty any schedule over `catalog` can accrue.
pub(crate) fn upper_bound(catalog: &Catalog, weights: &PenaltyWeights) -> f64 {
    let occurrences = catalog.occurrence_count() as f64;
    let per_occurrence =
        weights.penalty_unpreferred_slot + weights.penalty_unpreferred_day + weights.penalty_non_duty_day;
    let max_gaps_per_day = catalog.grid.period_count().saturating_sub(2) as f64;
    let teacher_days = (catalog.teachers.len() * catalog.grid.day_count()) as f64;

    occurrences * per_occurrence + teacher_days * max_gaps_per_day * weights.penalty_gap_per_slot
}
