use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    #[command(flatten)]
    #[serde(default)]
    pub search: SearchParams,
    #[command(flatten)]
    #[serde(default)]
    pub weights: PenaltyWeights,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 60)]
    pub population_size: usize,
    #[arg(long, default_value_t = 0.1)]
    pub elite_fraction: f64,
    #[arg(long, default_value_t = 3)]
    pub tournament_size: usize,
    #[arg(long, default_value_t = 0.9)]
    pub crossover_rate: f64,
    /// Per-occurrence reassignment probability.
    #[arg(long, default_value_t = 0.03)]
    pub mutation_rate: f64,
    /// Per-individual probability of swapping two slots inside one section.
    #[arg(long, default_value_t = 0.1)]
    pub swap_mutation_rate: f64,
    #[arg(long, default_value_t = 10)]
    pub patience: usize,
    #[arg(long, default_value_t = 5.0)]
    pub plateau_threshold: f64,
    #[arg(long, default_value_t = 24)]
    pub placement_attempts: usize,
    #[arg(long)]
    pub max_time_secs: Option<u64>,
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            population_size: 60,
            elite_fraction: 0.1,
            tournament_size: 3,
            crossover_rate: 0.9,
            mutation_rate: 0.03,
            swap_mutation_rate: 0.1,
            patience: 10,
            plateau_threshold: 5.0,
            placement_attempts: 24,
            max_time_secs: None,
            seed: None,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PenaltyWeights {
    #[arg(long, default_value_t = 1000.0)]
    pub base_score: f64,
    /// Floor for the per-violation weight; raised automatically when the
    /// catalog's soft penalty could otherwise outweigh a violation.
    #[arg(long, default_value_t = 1000.0)]
    pub hard_weight: f64,
    #[arg(long, default_value_t = 1.0)]
    pub soft_weight: f64,

    // === PREFERENCES ===
    #[arg(long, default_value_t = 5.0)]
    pub penalty_unpreferred_slot: f64,
    #[arg(long, default_value_t = 3.0)]
    pub penalty_unpreferred_day: f64,
    #[arg(long, default_value_t = 40.0)]
    pub penalty_non_duty_day: f64,

    // === COMPACTNESS ===
    #[arg(long, default_value_t = 2.0)]
    pub penalty_gap_per_slot: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            base_score: 1000.0,
            hard_weight: 1000.0,
            soft_weight: 1.0,
            penalty_unpreferred_slot: 5.0,
            penalty_unpreferred_day: 3.0,
            penalty_non_duty_day: 40.0,
            penalty_gap_per_slot: 2.0,
        }
    }
}

impl EngineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config JSON: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let s = &self.search;
        if s.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if s.tournament_size == 0 {
            return Err("tournament_size must be at least 1".into());
        }
        for (name, v) in [
            ("elite_fraction", s.elite_fraction),
            ("crossover_rate", s.crossover_rate),
            ("mutation_rate", s.mutation_rate),
            ("swap_mutation_rate", s.swap_mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("{} must be within [0, 1], got {}", name, v));
            }
        }

        let w = &self.weights;
        for (name, v) in [
            ("hard_weight", w.hard_weight),
            ("soft_weight", w.soft_weight),
            ("penalty_unpreferred_slot", w.penalty_unpreferred_slot),
            ("penalty_unpreferred_day", w.penalty_unpreferred_day),
            ("penalty_non_duty_day", w.penalty_non_duty_day),
            ("penalty_gap_per_slot", w.penalty_gap_per_slot),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, v));
            }
        }
        Ok(())
    }

    /// Overwrites fields with values the user typed on the command line,
    /// leaving file-provided values for everything left at its default.
    pub fn merge_from_cli(&mut self, cli: &EngineConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(search.population_size);
        update_if_present!(search.elite_fraction);
        update_if_present!(search.tournament_size);
        update_if_present!(search.crossover_rate);
        update_if_present!(search.mutation_rate);
        update_if_present!(search.swap_mutation_rate);
        update_if_present!(search.patience);
        update_if_present!(search.plateau_threshold);
        update_if_present!(search.placement_attempts);
        update_if_present!(search.max_time_secs);
        update_if_present!(search.seed);

        update_if_present!(weights.base_score);
        update_if_present!(weights.hard_weight);
        update_if_present!(weights.soft_weight);
        update_if_present!(weights.penalty_unpreferred_slot);
        update_if_present!(weights.penalty_unpreferred_day);
        update_if_present!(weights.penalty_non_duty_day);
        update_if_present!(weights.penalty_gap_per_slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"weights": {"penalty_gap_per_slot": 9.0}}"#).unwrap();
        assert_eq!(cfg.weights.penalty_gap_per_slot, 9.0);
        assert_eq!(cfg.weights.hard_weight, 1000.0);
        assert_eq!(cfg.search, SearchParams::default());
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        let mut cfg = EngineConfig::default();
        cfg.search.mutation_rate = 1.5;
        assert!(cfg.validate().unwrap_err().contains("mutation_rate"));

        let mut cfg = EngineConfig::default();
        cfg.search.population_size = 1;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.weights.soft_weight = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"search": {{"population_size": 12, "seed": 7}}}}"#).unwrap();

        let cfg = EngineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(cfg.search.population_size, 12);
        assert_eq!(cfg.search.seed, Some(7));
        assert_eq!(cfg.search.patience, 10);
    }

    #[test]
    fn test_load_from_missing_file_is_an_error() {
        let err = EngineConfig::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.contains("Failed to read"));
    }
}
