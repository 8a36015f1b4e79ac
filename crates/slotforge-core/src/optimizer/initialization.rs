use crate::catalog::{Catalog, OccurrenceId};
use crate::constraints::Occupancy;
use crate::optimizer::placement::place;
use crate::schedule::Schedule;
use fastrand::Rng;

/// Builds one complete random schedule.
///
/// Occurrences with the fewest options go first (pinned teacher, few rooms,
/// labs), with a random tiebreak so the population stays diverse.
pub fn random_schedule(catalog: &Catalog, attempts: usize, rng: &mut Rng) -> Schedule {
    let mut ranked: Vec<(OccurrenceId, (usize, usize, u64))> = (0..catalog.occurrence_count())
        .map(|i| {
            let occ = OccurrenceId::from(i);
            let req = catalog.requirement_of(occ);
            (
                occ,
                (req.suitable_rooms.len(), req.candidate_teachers().len(), rng.u64(..)),
            )
        })
        .collect();
    ranked.sort_by_key(|&(_, key)| key);

    let mut schedule = Schedule::empty(catalog);
    let mut occupancy = Occupancy::new(catalog);

    for (occ, _) in ranked {
        let a = place(catalog, occ, &occupancy, attempts, rng);
        occupancy.add(catalog, occ, &a);
        schedule.set(occ, a);
    }

    schedule
}
