use crate::optimizer::{Individual, Population};
use fastrand::Rng;

/// Survivors of one selection step: elites pass through untouched, parents
/// feed recombination.
#[derive(Debug, Clone)]
pub struct Selection {
    pub elites: Vec<Individual>,
    /// Indices into the population, two per child to breed.
    pub parents: Vec<(usize, usize)>,
}

pub fn elite_count(population_size: usize, elite_fraction: f64) -> usize {
    let n = (population_size as f64 * elite_fraction).round() as usize;
    n.clamp(1, population_size.max(1))
}

/// Elitism followed by tournament selection. Expects an evaluated population.
pub fn select(
    population: &Population,
    target_size: usize,
    elite_fraction: f64,
    tournament_size: usize,
    rng: &mut Rng,
) -> Selection {
    let ranked = population.ranked();
    let elites: Vec<Individual> = ranked
        .iter()
        .take(elite_count(target_size, elite_fraction).min(ranked.len()))
        .map(|&i| population.members[i].clone())
        .collect();

    let children = target_size.saturating_sub(elites.len());
    let parents = (0..children)
        .map(|_| {
            (
                tournament(population, tournament_size, rng),
                tournament(population, tournament_size, rng),
            )
        })
        .collect();

    Selection { elites, parents }
}

/// Best of `k` members drawn with replacement.
pub fn tournament(population: &Population, k: usize, rng: &mut Rng) -> usize {
    let n = population.members.len();
    let mut best = rng.usize(0..n.max(1));
    for _ in 1..k.max(1) {
        let challenger = rng.usize(0..n.max(1));
        if population.members[challenger].rank_cmp(&population.members[best]).is_lt() {
            best = challenger;
        }
    }
    best
}
