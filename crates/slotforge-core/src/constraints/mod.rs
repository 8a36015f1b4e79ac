pub mod hard;
pub mod occupancy;
pub mod soft;

pub use self::hard::HardViolation;
pub use self::occupancy::Occupancy;
pub use self::soft::SoftBreakdown;

use crate::catalog::Catalog;
use crate::schedule::Schedule;
use serde::{Deserialize, Serialize};
use slotforge_protocol::config::PenaltyWeights;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Score of one candidate. Higher `score` is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    pub score: f64,
    pub hard_violations: usize,
    pub soft_penalty: f64,
}

impl Fitness {
    #[inline(always)]
    pub fn is_feasible(&self) -> bool {
        self.hard_violations == 0
    }

    /// `Less` means `self` ranks ahead of `other`.
    pub fn rank_cmp(&self, other: &Fitness) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then(self.hard_violations.cmp(&other.hard_violations))
            .then(self.soft_penalty.total_cmp(&other.soft_penalty))
    }
}

/// Evaluates schedules against one catalog. Pure and shareable across threads.
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    catalog: Arc<Catalog>,
    weights: PenaltyWeights,
    hard_weight: f64,
    max_soft: f64,
}

impl ConstraintModel {
    pub fn new(catalog: Arc<Catalog>, weights: &PenaltyWeights) -> Self {
        let max_soft = soft::upper_bound(&catalog, weights);
        let floor = 10.0 * weights.soft_weight * (max_soft + 1.0);
        let hard_weight = weights.hard_weight.max(floor);

        if hard_weight > weights.hard_weight {
            debug!(
                "Constraints: raising hard weight {} -> {} (max soft penalty {})",
                weights.hard_weight, hard_weight, max_soft
            );
        }

        Self {
            catalog,
            weights: weights.clone(),
            hard_weight,
            max_soft,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn effective_hard_weight(&self) -> f64 {
        self.hard_weight
    }

    pub fn max_soft_penalty(&self) -> f64 {
        self.max_soft
    }

    /// Every hard rule the schedule breaks. Empty means valid.
    pub fn violates_hard(&self, schedule: &Schedule) -> Vec<HardViolation> {
        let mut out = Vec::new();
        hard::scan(&self.catalog, schedule, |v| out.push(v));
        out
    }

    /// Weighted violation count, without collecting the violations.
    pub fn hard_count(&self, schedule: &Schedule) -> usize {
        let mut count = 0;
        hard::scan(&self.catalog, schedule, |v| count += v.weight());
        count
    }

    pub fn soft_penalty(&self, schedule: &Schedule) -> f64 {
        self.soft_breakdown(schedule).total()
    }

    pub fn soft_breakdown(&self, schedule: &Schedule) -> SoftBreakdown {
        soft::breakdown(&self.catalog, &self.weights, schedule)
    }

    pub fn fitness(&self, schedule: &Schedule) -> Fitness {
        let hard = self.hard_count(schedule);
        let soft = self.soft_penalty(schedule);
        Fitness {
            score: self.weights.base_score
                - hard as f64 * self.hard_weight
                - soft * self.weights.soft_weight,
            hard_violations: hard,
            soft_penalty: soft,
        }
    }

    /// Number of hard violations each occurrence takes part in, indexed by
    /// `OccurrenceId`. Drives cost-guided mutation.
    pub fn occurrence_costs(&self, schedule: &Schedule) -> Vec<u32> {
        let mut costs = vec![0u32; schedule.len()];
        hard::scan(&self.catalog, schedule, |v| {
            for occ in v.occurrences() {
                if let Some(c) = costs.get_mut(occ.index()) {
                    *c += 1;
                }
            }
        });
        costs
    }
}
