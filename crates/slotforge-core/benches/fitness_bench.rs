use criterion::{criterion_group, criterion_main, Criterion};
use slotforge_core::catalog::Catalog;
use slotforge_core::constraints::ConstraintModel;
use slotforge_core::optimizer::initialization::random_schedule;
use slotforge_core::optimizer::mutation::reassign;
use slotforge_protocol::catalog::*;
use slotforge_protocol::config::PenaltyWeights;
use std::hint::black_box;
use std::sync::Arc;

fn setup_catalog() -> Catalog {
    let mut snap = CatalogSnapshot::default();
    for t in 0..12 {
        snap.teachers.push(TeacherRecord {
            id: format!("T{}", t),
            department_id: None,
            max_weekly_hours: 24,
            duty_days: vec![],
        });
    }
    for s in 0..8 {
        snap.subjects.push(SubjectRecord {
            id: format!("SUB{}", s),
            department_id: None,
            weekly_quota: 3 + (s % 3) as i64,
            is_lab: s % 4 == 3,
        });
        // Two teachers per subject, first one primary.
        for k in 0..2 {
            snap.mappings.push(MappingRecord {
                subject_id: format!("SUB{}", s),
                teacher_id: format!("T{}", (s + k * 5) % 12),
                section_id: None,
                is_primary: k == 0,
            });
        }
    }
    for s in 0..6 {
        snap.sections.push(SectionRecord {
            id: format!("S{}", s),
            department_id: None,
            student_strength: 40,
        });
    }
    for r in 0..8 {
        snap.classrooms.push(ClassroomRecord {
            id: format!("R{}", r),
            department_id: None,
            capacity: 60,
            is_lab: r >= 6,
        });
    }
    snap.preferences.push(PreferenceRecord {
        teacher_id: "T0".into(),
        preferred_time_slots: vec![1, 2, 3],
        preferred_days: vec!["Monday".into(), "Tuesday".into()],
        unavailable_slots: vec![UnavailableSlot::Every(7)],
    });

    Catalog::from_snapshot(&snap).expect("bench catalog is valid")
}

fn criterion_benchmark(c: &mut Criterion) {
    let catalog = Arc::new(setup_catalog());
    let model = ConstraintModel::new(catalog.clone(), &PenaltyWeights::default());
    let mut rng = fastrand::Rng::with_seed(42);
    let schedule = random_schedule(&catalog, 24, &mut rng);

    let mut group = c.benchmark_group("Fitness");

    group.bench_function("fitness_full", |b| b.iter(|| model.fitness(black_box(&schedule))));

    group.bench_function("hard_count", |b| b.iter(|| model.hard_count(black_box(&schedule))));

    group.bench_function("soft_penalty", |b| {
        b.iter(|| model.soft_penalty(black_box(&schedule)))
    });

    group.bench_function("random_schedule", |b| {
        b.iter(|| random_schedule(black_box(&catalog), 24, &mut rng))
    });

    group.bench_function("mutate_and_rescore", |b| {
        let costs = model.occurrence_costs(&schedule);
        b.iter(|| {
            let mut s = schedule.clone();
            reassign(&catalog, &mut s, &costs, 0.05, 24, &mut rng);
            black_box(model.fitness(&s))
        })
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
