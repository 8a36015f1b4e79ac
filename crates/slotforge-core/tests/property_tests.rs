mod common;

use common::{quick_config, CatalogBuilder, SCOPE};
use proptest::prelude::*;
use slotforge_core::catalog::Catalog;
use slotforge_core::constraints::ConstraintModel;
use slotforge_core::job::JobController;
use slotforge_core::optimizer::initialization::random_schedule;
use slotforge_core::optimizer::{CancelToken, SilentProgress};
use slotforge_protocol::catalog::DEFAULT_WORKING_DAYS;
use slotforge_protocol::config::PenaltyWeights;
use slotforge_protocol::job::{GenerateRequest, JobStatus, WEEK_KEY};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Per-subject knobs. Subject i is taught by teacher i.
#[derive(Debug, Clone)]
struct Course {
    quota: i64,
    lab: bool,
    /// Weekly-hour cap minus the teacher's total load, so 0 is a binding cap.
    cap_slack: i64,
    /// (day index, time slot id) pairs the teacher cannot take.
    unavailable: Vec<(usize, u32)>,
}

#[derive(Debug, Clone)]
struct College {
    sections: usize,
    subjects: Vec<Course>,
    strength: i64,
}

impl College {
    fn cap(&self, i: usize) -> i64 {
        let c = &self.subjects[i];
        c.quota * self.sections as i64 + c.cap_slack
    }

    fn builder(&self) -> CatalogBuilder {
        let mut b = CatalogBuilder::new();
        for (i, c) in self.subjects.iter().enumerate() {
            let teacher = format!("T{}", i);
            b = b
                .teacher(&teacher, self.cap(i))
                .subject(&format!("SUB{}", i), c.quota, c.lab)
                .teaches(&teacher, &format!("SUB{}", i));
            for &(day, slot) in &c.unavailable {
                b = b.unavailable(&teacher, DEFAULT_WORKING_DAYS[day], slot);
            }
        }
        for s in 0..self.sections {
            b = b.section(&format!("S{}", s), self.strength);
        }
        for r in 0..=self.sections {
            b = b.room(&format!("R{}", r), 50, false);
        }
        b.room("LAB1", 50, true).room("LAB2", 50, true)
    }

    fn course(&self, subject_id: &str) -> Option<&Course> {
        let i = subject_id.trim_start_matches("SUB").parse::<usize>().ok()?;
        self.subjects.get(i)
    }
}

prop_compose! {
    fn arb_course()(
        quota in 1..=3i64,
        lab in any::<bool>(),
        cap_slack in 0..=2i64,
        unavailable in prop::collection::vec((0..5usize, 1..=7u32), 0..=4),
    ) -> Course {
        Course { quota, lab, cap_slack, unavailable }
    }
}

prop_compose! {
    fn arb_college()(
        sections in 1..=3usize,
        subjects in prop::collection::vec(arb_course(), 1..=4),
        strength in 10..=40i64,
    ) -> College {
        College { sections, subjects, strength }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_initial_schedules_are_structurally_sound(college in arb_college(), seed in any::<u64>()) {
        let catalog = Arc::new(college.builder().catalog());
        let model = ConstraintModel::new(catalog.clone(), &PenaltyWeights::default());
        let mut rng = fastrand::Rng::with_seed(seed);

        let schedule = random_schedule(&catalog, 24, &mut rng);
        prop_assert!(schedule.is_complete());
        prop_assert!(model.violates_hard(&schedule).iter().all(|v| !v.is_structural()));
        prop_assert!(model.soft_penalty(&schedule) >= 0.0);
    }

    #[test]
    fn prop_emitted_timetables_hold_every_invariant(college in arb_college(), seed in any::<u64>()) {
        let source = college.builder().source();
        let mut request = GenerateRequest::new("prop", "2024-25", "odd", 20);
        request.seed = Some(seed);

        let report = JobController::new(quick_config())
            .unwrap()
            .run(&source, SCOPE, &request, &CancelToken::new(), &SilentProgress);
        prop_assert_eq!(report.status(), JobStatus::Completed);

        let week = &report.output.timetable_data[WEEK_KEY];
        let mut teacher_slots = HashSet::new();
        let mut room_slots = HashSet::new();
        let mut section_slots = HashSet::new();
        let mut sessions = 0usize;
        let mut load: HashMap<String, i64> = HashMap::new();

        for (day, sections) in week {
            let day_index = DEFAULT_WORKING_DAYS.iter().position(|d| *d == day.as_str());
            prop_assert!(day_index.is_some());
            for (section, entries) in sections {
                for e in entries {
                    sessions += 1;
                    prop_assert!(teacher_slots.insert((day.clone(), e.time_slot, e.teacher_id.clone())));
                    prop_assert!(room_slots.insert((day.clone(), e.time_slot, e.classroom_id.clone())));
                    prop_assert!(section_slots.insert((day.clone(), e.time_slot, section.clone())));
                    prop_assert_eq!(e.teacher_id.trim_start_matches('T'), e.subject_id.trim_start_matches("SUB"));

                    let course = college.course(&e.subject_id).unwrap();
                    prop_assert_eq!(course.lab, e.classroom_id.starts_with("LAB"));
                    prop_assert!(
                        !course.unavailable.contains(&(day_index.unwrap_or(0), e.time_slot)),
                        "{} placed in unavailable {} slot {}", e.teacher_id, day, e.time_slot
                    );
                    *load.entry(e.teacher_id.clone()).or_default() += 1;
                }
            }
        }

        for (teacher, assigned) in &load {
            let i: usize = teacher.trim_start_matches('T').parse().unwrap();
            prop_assert!(*assigned <= college.cap(i), "{} over cap: {} > {}", teacher, assigned, college.cap(i));
        }

        let quota: i64 = college.subjects.iter().map(|c| c.quota).sum();
        prop_assert_eq!(sessions as i64, quota * college.sections as i64);
    }

    #[test]
    fn prop_fitness_is_pure(college in arb_college(), seed in any::<u64>()) {
        let catalog: Arc<Catalog> = Arc::new(college.builder().catalog());
        let model = ConstraintModel::new(catalog.clone(), &PenaltyWeights::default());
        let schedule = random_schedule(&catalog, 24, &mut fastrand::Rng::with_seed(seed));

        let before = schedule.clone();
        let a = model.fitness(&schedule);
        let b = model.fitness(&schedule);
        prop_assert_eq!(a, b);
        prop_assert_eq!(schedule, before);
    }
}
