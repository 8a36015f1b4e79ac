use crate::constraints::{ConstraintModel, Fitness};
use crate::error::{EngineError, EngineResult};
use crate::optimizer::crossover::recombine;
use crate::optimizer::evaluation::evaluate;
use crate::optimizer::initialization::random_schedule;
use crate::optimizer::mutation::{reassign, swap_within_section};
use crate::optimizer::selection::select;
use crate::optimizer::{Individual, Population, SearchPhase};
use fastrand::Rng;
use slotforge_protocol::config::EngineConfig;
use slotforge_protocol::job::{GenerateRequest, MAX_GENERATIONS, MIN_GENERATIONS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use strum_macros::Display;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct SearchOptions {
    #[builder(default = 60)]
    pub population_size: usize,
    #[builder(default = 0.1)]
    pub elite_fraction: f64,
    #[builder(default = 3)]
    pub tournament_size: usize,
    #[builder(default = 0.9)]
    pub crossover_rate: f64,
    #[builder(default = 0.03)]
    pub mutation_rate: f64,
    #[builder(default = 0.1)]
    pub swap_mutation_rate: f64,
    #[builder(default = 10)]
    pub patience: usize,
    #[builder(default = 5.0)]
    pub plateau_threshold: f64,
    #[builder(default = 24)]
    pub placement_attempts: usize,
    /// Clamped to `[MIN_GENERATIONS, MAX_GENERATIONS]` when the search runs.
    #[builder(default = 50)]
    pub generations: u32,
    #[builder(default)]
    pub max_time: Option<Duration>,
}

impl SearchOptions {
    /// Request fields override their config counterparts.
    pub fn from_request(config: &EngineConfig, request: &GenerateRequest) -> Self {
        let mut opts = Self::from(config);
        opts.generations = request.clamped_generations();
        if let Some(secs) = request.time_limit_secs {
            opts.max_time = Some(Duration::from_secs(secs));
        }
        opts
    }
}

impl From<&EngineConfig> for SearchOptions {
    fn from(cfg: &EngineConfig) -> Self {
        let s = &cfg.search;
        Self {
            population_size: s.population_size,
            elite_fraction: s.elite_fraction,
            tournament_size: s.tournament_size,
            crossover_rate: s.crossover_rate,
            mutation_rate: s.mutation_rate,
            swap_mutation_rate: s.swap_mutation_rate,
            patience: s.patience,
            plateau_threshold: s.plateau_threshold,
            placement_attempts: s.placement_attempts,
            generations: MAX_GENERATIONS,
            max_time: s.max_time_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StopReason {
    BudgetExhausted,
    Converged,
    TimeLimit,
    Cancelled,
    CallbackStopped,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best candidate over every generation, not just the last one.
    pub best: Individual,
    pub generations_run: u32,
    pub stop_reason: StopReason,
    /// Best score after each generation, starting with the initial population.
    pub history: Vec<f64>,
}

/// Cooperative stop flag, checked at the top of every generation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub trait ProgressCallback: Send + Sync {
    /// Called after every generation. Returning `false` stops the search.
    fn on_progress(&self, generation: u32, best: &Fitness, elapsed: Duration) -> bool;
}

pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_progress(&self, _generation: u32, _best: &Fitness, _elapsed: Duration) -> bool {
        true
    }
}

pub struct Optimizer {
    model: Arc<ConstraintModel>,
    options: SearchOptions,
}

impl Optimizer {
    pub fn new(model: Arc<ConstraintModel>, options: SearchOptions) -> Self {
        Self { model, options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn run(
        &self,
        seed: Option<u64>,
        cancel: &CancelToken,
        callback: &dyn ProgressCallback,
    ) -> EngineResult<SearchOutcome> {
        let opts = &self.options;
        let catalog = self.model.catalog().clone();
        let size = opts.population_size.max(2);
        let budget = opts.generations.clamp(MIN_GENERATIONS, MAX_GENERATIONS);

        let mut rng = match seed {
            Some(s) => Rng::with_seed(s),
            None => Rng::new(),
        };
        let start = Instant::now();

        // 1. Initial population
        debug!("Search: {} {} candidates", SearchPhase::Initializing, size);
        let members = (0..size)
            .map(|_| Individual::new(random_schedule(&catalog, opts.placement_attempts, &mut rng), 0))
            .collect();
        let mut population = Population::new(0, members);
        debug!("Search: gen 0 {}", SearchPhase::Evaluating);
        evaluate(&self.model, &mut population);

        let mut best = population
            .best()
            .cloned()
            .ok_or_else(|| EngineError::Config("population is empty".into()))?;
        let mut history = vec![score_of(&best)];
        let mut stale = 0;
        let mut generations_run = 0;
        let mut stop_reason = StopReason::BudgetExhausted;

        // 2. Generations
        for generation in 1..=budget {
            if cancel.is_cancelled() {
                stop_reason = StopReason::Cancelled;
                break;
            }
            if let Some(limit) = opts.max_time {
                if start.elapsed() >= limit {
                    stop_reason = StopReason::TimeLimit;
                    break;
                }
            }

            debug!("Search: gen {} {}", generation, SearchPhase::Selecting);
            let selection = select(
                &population,
                size,
                opts.elite_fraction,
                opts.tournament_size,
                &mut rng,
            );

            debug!(
                "Search: gen {} {} {} pair(s)",
                generation,
                SearchPhase::Recombining,
                selection.parents.len()
            );
            let mut offspring: Vec<Individual> = selection
                .parents
                .iter()
                .map(|&(a, b)| {
                    let (pa, pb) = (&population.members[a], &population.members[b]);
                    let schedule = if rng.f64() < opts.crossover_rate {
                        recombine(&catalog, &pa.schedule, &pb.schedule, &mut rng)
                    } else {
                        pa.schedule.clone()
                    };
                    Individual::new(schedule, generation)
                })
                .collect();

            debug!("Search: gen {} {}", generation, SearchPhase::Mutating);
            for child in &mut offspring {
                let costs = self.model.occurrence_costs(&child.schedule);
                reassign(
                    &catalog,
                    &mut child.schedule,
                    &costs,
                    opts.mutation_rate,
                    opts.placement_attempts,
                    &mut rng,
                );
                if rng.f64() < opts.swap_mutation_rate {
                    swap_within_section(&catalog, &mut child.schedule, &mut rng);
                }
            }

            let mut next = selection.elites;
            next.append(&mut offspring);
            population = Population::new(generation, next);
            debug!("Search: gen {} {}", generation, SearchPhase::Evaluating);
            evaluate(&self.model, &mut population);
            generations_run = generation;

            let improved = match population.best() {
                Some(candidate) if candidate.rank_cmp(&best).is_lt() => {
                    let gained = score_of(candidate) > score_of(&best);
                    best = candidate.clone();
                    gained
                }
                _ => false,
            };
            if improved {
                stale = 0;
            } else {
                stale += 1;
            }
            history.push(score_of(&best));

            let fitness = best.fitness.unwrap_or(Fitness {
                score: f64::NEG_INFINITY,
                hard_violations: usize::MAX,
                soft_penalty: f64::INFINITY,
            });
            if fitness.is_feasible()
                && fitness.soft_penalty < opts.plateau_threshold
                && stale >= opts.patience
            {
                stop_reason = StopReason::Converged;
                break;
            }

            if !callback.on_progress(generation, &fitness, start.elapsed()) {
                stop_reason = StopReason::CallbackStopped;
                break;
            }
        }

        info!(
            "Search: {} after {} generation(s) ({}), best score {:.2}",
            SearchPhase::Terminated,
            generations_run,
            stop_reason,
            score_of(&best)
        );

        Ok(SearchOutcome {
            best,
            generations_run,
            stop_reason,
            history,
        })
    }
}

fn score_of(individual: &Individual) -> f64 {
    individual
        .fitness
        .map(|f| f.score)
        .unwrap_or(f64::NEG_INFINITY)
}
