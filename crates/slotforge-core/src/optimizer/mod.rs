pub mod crossover;
pub mod evaluation;
pub mod initialization;
pub mod mutation;
pub mod placement;
pub mod runner;
pub mod selection;

pub use self::runner::{
    CancelToken, Optimizer, ProgressCallback, SearchOptions, SearchOutcome, SilentProgress,
    StopReason,
};

use crate::constraints::Fitness;
use crate::schedule::Schedule;
use std::cmp::Ordering;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SearchPhase {
    Initializing,
    Evaluating,
    Selecting,
    Recombining,
    Mutating,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct Individual {
    pub schedule: Schedule,
    /// `None` until the next evaluation pass.
    pub fitness: Option<Fitness>,
    /// Generation in which this candidate was created.
    pub born: u32,
}

impl Individual {
    pub fn new(schedule: Schedule, born: u32) -> Self {
        Self {
            schedule,
            fitness: None,
            born,
        }
    }

    /// Ranking order: better fitness first, then the older candidate.
    /// Unevaluated candidates sort last.
    pub fn rank_cmp(&self, other: &Individual) -> Ordering {
        match (&self.fitness, &other.fitness) {
            (Some(a), Some(b)) => a.rank_cmp(b).then(self.born.cmp(&other.born)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.born.cmp(&other.born),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    pub generation: u32,
    pub members: Vec<Individual>,
}

impl Population {
    pub fn new(generation: u32, members: Vec<Individual>) -> Self {
        Self {
            generation,
            members,
        }
    }

    /// Member indices from best to worst.
    pub fn ranked(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by(|&a, &b| self.members[a].rank_cmp(&self.members[b]));
        order
    }

    pub fn best(&self) -> Option<&Individual> {
        self.members
            .iter()
            .filter(|m| m.fitness.is_some())
            .min_by(|a, b| a.rank_cmp(b))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
