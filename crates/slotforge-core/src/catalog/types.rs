use serde::{Deserialize, Serialize};

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            #[inline(always)]
            fn from(i: usize) -> Self {
                Self(i as u32)
            }
        }
    };
}

index_type!(TeacherId);
index_type!(SubjectId);
index_type!(SectionId);
index_type!(ClassroomId);
index_type!(RequirementId);
index_type!(
    /// One required weekly session. Dense, `0..catalog.occurrences.len()`.
    OccurrenceId
);

#[derive(Debug, Clone, PartialEq)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Teacher {
    pub id: String,
    pub department: Option<String>,
    pub max_weekly_hours: u32,
    /// Indexed by grid slot.
    pub unavailable: Vec<bool>,
    /// Indexed by period. Empty when the teacher expressed no slot preference.
    pub preferred_periods: Vec<bool>,
    /// Indexed by day. Empty when the teacher expressed no day preference.
    pub preferred_days: Vec<bool>,
    /// Indexed by day.
    pub duty_days: Vec<bool>,
}

impl Teacher {
    #[inline(always)]
    pub fn is_unavailable(&self, slot: usize) -> bool {
        self.unavailable.get(slot).copied().unwrap_or(false)
    }

    #[inline(always)]
    pub fn prefers_period(&self, period: usize) -> Option<bool> {
        if self.preferred_periods.is_empty() {
            None
        } else {
            Some(self.preferred_periods.get(period).copied().unwrap_or(false))
        }
    }

    #[inline(always)]
    pub fn prefers_day(&self, day: usize) -> Option<bool> {
        if self.preferred_days.is_empty() {
            None
        } else {
            Some(self.preferred_days.get(day).copied().unwrap_or(false))
        }
    }

    #[inline(always)]
    pub fn on_duty(&self, day: usize) -> bool {
        self.duty_days.get(day).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: String,
    pub department: Option<String>,
    pub weekly_quota: u32,
    pub is_lab: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub department: Option<String>,
    pub student_strength: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classroom {
    pub id: String,
    pub department: Option<String>,
    pub capacity: u32,
    pub is_lab: bool,
}

/// Everything needed to place the `quota` occurrences of one subject for one
/// section.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub subject: SubjectId,
    pub section: SectionId,
    /// Every teacher mapped to this subject/section.
    pub mapped_teachers: Vec<TeacherId>,
    /// The teachers the search draws from: primaries when any are flagged.
    pub eligible_teachers: Vec<TeacherId>,
    pub fixed_teacher: Option<TeacherId>,
    /// Classrooms that satisfy lab and capacity rules, preferred kind first.
    pub suitable_rooms: Vec<ClassroomId>,
    pub quota: u32,
    pub first_occurrence: OccurrenceId,
}

impl Requirement {
    pub fn candidate_teachers(&self) -> &[TeacherId] {
        match &self.fixed_teacher {
            Some(t) => std::slice::from_ref(t),
            None => &self.eligible_teachers,
        }
    }

    pub fn occurrences(&self) -> impl Iterator<Item = OccurrenceId> {
        let start = self.first_occurrence.0;
        (start..start + self.quota).map(OccurrenceId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub requirement: RequirementId,
    pub subject: SubjectId,
    pub section: SectionId,
    /// 0-based position among the requirement's occurrences.
    pub ordinal: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: u32,
    pub label: String,
}

/// The institution-wide week: ordered days by ordered periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    pub days: Vec<String>,
    pub periods: Vec<TimeSlot>,
}

impl SlotGrid {
    #[inline(always)]
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    #[inline(always)]
    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    #[inline(always)]
    pub fn slot_count(&self) -> usize {
        self.days.len() * self.periods.len()
    }

    /// Flat slot index, `None` when the pair falls outside the grid.
    #[inline(always)]
    pub fn slot_index(&self, day: u8, period: u8) -> Option<usize> {
        let (d, p) = (day as usize, period as usize);
        if d < self.days.len() && p < self.periods.len() {
            Some(d * self.periods.len() + p)
        } else {
            None
        }
    }

    pub fn day_index(&self, name: &str) -> Option<usize> {
        self.days.iter().position(|d| d.eq_ignore_ascii_case(name))
    }

    pub fn period_index(&self, slot_id: u32) -> Option<usize> {
        self.periods.iter().position(|p| p.id == slot_id)
    }
}
