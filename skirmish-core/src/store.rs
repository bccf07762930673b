//! Persistence contract for the evolutionary run and per-map knowledge.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::fitness::FitnessModel;
use crate::genome::{Genome, MatchStats};
use crate::items::ItemSpot;

/// One persisted genome: statistics plus genes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeRecord {
    pub deaths: u32,
    pub kills: u32,
    pub damage_given: u32,
    pub damage_taken: u32,
    pub genes: Vec<u32>,
}

impl GenomeRecord {
    pub fn from_genome(genome: &Genome) -> Self {
        Self {
            deaths: genome.stats.deaths,
            kills: genome.stats.kills,
            damage_given: genome.stats.damage_given,
            damage_taken: genome.stats.damage_taken,
            genes: genome.genes().to_vec(),
        }
    }

    pub fn into_genome(self, model: FitnessModel) -> Genome {
        let mut genome = Genome::new(self.genes, model);
        genome.stats = MatchStats {
            kills: self.kills,
            deaths: self.deaths,
            damage_given: self.damage_given,
            damage_taken: self.damage_taken,
        };
        genome
    }
}

/// Position of the run: which generation, which individual is under
/// evaluation, and how many of its matches are done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub generation: u32,
    pub individual: usize,
    pub match_index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub cursor: Cursor,
    pub genomes: Vec<GenomeRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchivedGenome {
    pub position: usize,
    pub kills: u32,
    pub deaths: u32,
    pub damage_given: u32,
    pub damage_taken: u32,
    pub fitness: f64,
}

/// Final results of one generation, written before selection replaces it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationArchive {
    pub generation: u32,
    pub entries: Vec<ArchivedGenome>,
}

impl GenerationArchive {
    pub fn capture(generation: u32, population: &[Genome]) -> Self {
        Self {
            generation,
            entries: population
                .iter()
                .enumerate()
                .map(|(position, genome)| ArchivedGenome {
                    position,
                    kills: genome.stats.kills,
                    deaths: genome.stats.deaths,
                    damage_given: genome.stats.damage_given,
                    damage_taken: genome.stats.damage_taken,
                    fitness: genome.fitness(),
                })
                .collect(),
        }
    }
}

pub trait GenomeStore {
    /// `Ok(None)` when nothing has been persisted yet.
    fn load_population(&self) -> Result<Option<PopulationRecord>, StoreError>;
    fn store_population(&self, record: &PopulationRecord) -> Result<(), StoreError>;
    fn load_best_individual(&self, name: &str) -> Result<Option<GenomeRecord>, StoreError>;
    fn store_best_individual(&self, name: &str, record: &GenomeRecord) -> Result<(), StoreError>;
    fn archive_generation(&self, archive: &GenerationArchive) -> Result<(), StoreError>;
}

/// Known pickup locations, keyed by map name.
pub trait MapKnowledgeStore {
    fn load_items(&self, map: &str) -> Result<Vec<ItemSpot>, StoreError>;
    fn store_items(&self, map: &str, items: &[ItemSpot]) -> Result<(), StoreError>;
}

#[derive(Default)]
struct MemoryState {
    population: Option<PopulationRecord>,
    best: BTreeMap<String, GenomeRecord>,
    archives: Vec<GenerationArchive>,
    items: BTreeMap<String, Vec<ItemSpot>>,
}

/// Process-local store, used by tests and dry runs.
#[derive(Default)]
pub struct MemoryGenomeStore {
    state: Mutex<MemoryState>,
}

impl MemoryGenomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn archives(&self) -> Vec<GenerationArchive> {
        self.lock().map(|s| s.archives.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl GenomeStore for MemoryGenomeStore {
    fn load_population(&self) -> Result<Option<PopulationRecord>, StoreError> {
        Ok(self.lock()?.population.clone())
    }

    fn store_population(&self, record: &PopulationRecord) -> Result<(), StoreError> {
        self.lock()?.population = Some(record.clone());
        Ok(())
    }

    fn load_best_individual(&self, name: &str) -> Result<Option<GenomeRecord>, StoreError> {
        Ok(self.lock()?.best.get(name).cloned())
    }

    fn store_best_individual(&self, name: &str, record: &GenomeRecord) -> Result<(), StoreError> {
        self.lock()?.best.insert(name.to_string(), record.clone());
        Ok(())
    }

    fn archive_generation(&self, archive: &GenerationArchive) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.archives.retain(|a| a.generation != archive.generation);
        state.archives.push(archive.clone());
        Ok(())
    }
}

impl MapKnowledgeStore for MemoryGenomeStore {
    fn load_items(&self, map: &str) -> Result<Vec<ItemSpot>, StoreError> {
        Ok(self.lock()?.items.get(map).cloned().unwrap_or_default())
    }

    fn store_items(&self, map: &str, items: &[ItemSpot]) -> Result<(), StoreError> {
        self.lock()?.items.insert(map.to_string(), items.to_vec());
        Ok(())
    }
}
