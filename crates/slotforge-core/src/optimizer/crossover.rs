use crate::catalog::Catalog;
use crate::constraints::Occupancy;
use crate::schedule::{Assignment, Schedule};
use fastrand::Rng;

/// Section-wise recombination of two parents.
///
/// Each section draws its genes either uniformly or from a single cut point.
/// A gene from `second` is only taken when it does not clash with what the
/// child already holds and keeps its teacher under cap; otherwise the gene of
/// `first` is used. Every occurrence therefore ends up assigned exactly once.
pub fn recombine(catalog: &Catalog, first: &Schedule, second: &Schedule, rng: &mut Rng) -> Schedule {
    let mut child = Schedule::empty(catalog);
    let mut occupancy = Occupancy::new(catalog);

    for (sec, occs) in catalog.section_occurrences.iter().enumerate() {
        let cut_point = rng.bool();
        let cut = rng.usize(0..=occs.len());

        for (i, &occ) in occs.iter().enumerate() {
            let from_second = if cut_point { i >= cut } else { rng.bool() };

            let a = first.get(occ).copied();
            let b = second.get(occ).copied();

            let chosen = match (a, b) {
                (Some(a), Some(b)) if from_second && b != a => {
                    if accepts(catalog, &occupancy, sec, &b) {
                        Some(b)
                    } else {
                        Some(a)
                    }
                }
                (Some(a), _) => Some(a),
                (None, b) => b,
            };

            if let Some(gene) = chosen {
                occupancy.add(catalog, occ, &gene);
                child.set(occ, gene);
            }
        }
    }

    child
}

fn accepts(catalog: &Catalog, occupancy: &Occupancy, section: usize, gene: &Assignment) -> bool {
    let Some(teacher) = catalog.teachers.get(gene.teacher.index()) else {
        return false;
    };
    occupancy.is_free(catalog, section.into(), gene)
        && occupancy.teacher_load(gene.teacher) < teacher.max_weekly_hours
}
