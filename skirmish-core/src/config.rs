use serde::{Deserialize, Serialize};

use crate::constants::{
    ELITE_COUNT, GENERATION_LIMIT_DEFAULT, MUTATION_RATE_DEFAULT, POPULATION_SIZE_DEFAULT,
};
use crate::fitness::FitnessModel;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    #[default]
    Elitist,
    Roulette,
}

/// Smallest population the elitist scheme can fill: four elites, two elite
/// children and four fresh genomes.
pub const MIN_POPULATION: usize = ELITE_COUNT * 2 + 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generation_limit: u32,
    pub matches_per_individual: u32,
    pub mutation_rate: f64,
    pub selection: SelectionStrategy,
    pub fitness: FitnessModel,
    pub seed: u32,
    #[serde(default = "default_best_record_name")]
    pub best_record_name: String,
}

fn default_best_record_name() -> String {
    "genome_v1".to_string()
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: POPULATION_SIZE_DEFAULT,
            generation_limit: GENERATION_LIMIT_DEFAULT,
            matches_per_individual: 1,
            mutation_rate: MUTATION_RATE_DEFAULT,
            selection: SelectionStrategy::Elitist,
            fitness: FitnessModel::Tiered,
            seed: 0xDEAD_BEEF,
            best_record_name: default_best_record_name(),
        }
    }
}

impl EvolutionConfig {
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "elitist" => Some(Self::default()),
            "roulette" => Some(Self {
                selection: SelectionStrategy::Roulette,
                fitness: FitnessModel::Proportional,
                ..Self::default()
            }),
            "smoke" => Some(Self {
                population_size: MIN_POPULATION,
                generation_limit: 3,
                ..Self::default()
            }),
            _ => None,
        }
    }

    pub fn clamp(&mut self) {
        self.population_size = self.population_size.clamp(MIN_POPULATION, 1_000);
        self.generation_limit = self.generation_limit.clamp(1, 100_000);
        self.matches_per_individual = self.matches_per_individual.clamp(1, 1_000);
        self.mutation_rate = self.mutation_rate.clamp(0.0, 1.0);
        if self.best_record_name.trim().is_empty() {
            self.best_record_name = default_best_record_name();
        }
    }
}
