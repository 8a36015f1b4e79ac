use crate::constraints::ConstraintModel;
use crate::optimizer::Population;
use rayon::prelude::*;

/// Scores every member still missing a fitness. Members are independent, so
/// the pass runs on the rayon pool; the result does not depend on thread
/// scheduling.
pub fn evaluate(model: &ConstraintModel, population: &mut Population) -> usize {
    population
        .members
        .par_iter_mut()
        .filter(|m| m.fitness.is_none())
        .map(|m| {
            m.fitness = Some(model.fitness(&m.schedule));
        })
        .count()
}
