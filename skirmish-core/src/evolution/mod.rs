//! Generational search over genomes, persisted between matches.

mod operators;
mod selection;

pub use operators::{mutate, mutation_chance, uniform_crossover};

use crate::config::{EvolutionConfig, SelectionStrategy};
use crate::constants::CHROMOSOME_LEN;
use crate::error::{EngineError, GenomeError, StoreError};
use crate::genome::Genome;
use crate::rng::SeededRng;
use crate::store::{Cursor, GenerationArchive, GenomeRecord, GenomeStore, PopulationRecord};

/// Mixes the configured seed with the run position, so a process resuming
/// mid-run does not replay the stream of the previous one.
pub fn run_seed(base: u32, cursor: Cursor) -> u32 {
    base ^ cursor.generation.wrapping_mul(0x9E37_79B9)
        ^ (cursor.individual as u32).wrapping_mul(0x85EB_CA6B)
        ^ cursor.match_index.wrapping_mul(0xC2B2_AE35)
}

#[derive(Clone, Debug, PartialEq)]
pub enum GenerationOutcome {
    /// Selection produced the next generation.
    Advanced { generation: u32 },
    /// The generation limit was hit; the best genome was recorded and the run
    /// starts over with random genomes.
    Restarted { best_position: usize, best_fitness: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchEnd {
    pub fitness: f64,
    pub cursor: Cursor,
    pub generation: Option<GenerationOutcome>,
}

pub struct EvolutionEngine {
    config: EvolutionConfig,
    population: Vec<Genome>,
    cursor: Cursor,
}

impl EvolutionEngine {
    /// Fresh random population at generation zero.
    pub fn new(mut config: EvolutionConfig, rng: &mut SeededRng) -> Self {
        config.clamp();
        let mut engine = Self {
            config,
            population: Vec::new(),
            cursor: Cursor::default(),
        };
        engine.randomize(rng);
        engine
    }

    /// Restores the run from `store`, falling back to a fresh population when
    /// nothing usable is persisted, then completes a finished generation.
    pub fn resume(
        mut config: EvolutionConfig,
        store: &dyn GenomeStore,
        rng: &mut SeededRng,
    ) -> Result<Self, EngineError> {
        config.clamp();
        let mut engine = Self {
            config,
            population: Vec::new(),
            cursor: Cursor::default(),
        };
        if !engine.load(store) {
            tracing::info!(
                population = engine.config.population_size,
                "no prior population, starting a fresh run"
            );
            engine.randomize(rng);
        }
        engine.complete_generation(store, rng)?;
        Ok(engine)
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn current(&self) -> &Genome {
        &self.population[self.current_index()]
    }

    pub fn current_mut(&mut self) -> &mut Genome {
        let index = self.current_index();
        &mut self.population[index]
    }

    fn current_index(&self) -> usize {
        self.cursor.individual.min(self.population.len().saturating_sub(1))
    }

    /// Display name encoding generation and individual, e.g. `TX-V307`.
    pub fn agent_name(&self, prefix: &str) -> String {
        format!(
            "{prefix}{}{:02}",
            self.cursor.generation, self.cursor.individual
        )
    }

    pub fn randomize(&mut self, rng: &mut SeededRng) {
        self.population = (0..self.config.population_size)
            .map(|_| Genome::random(rng, self.config.fitness))
            .collect();
        self.cursor = Cursor::default();
    }

    /// Returns `false` when the store has nothing for us or its content does
    /// not fit the configured population; the caller then randomizes.
    pub fn load(&mut self, store: &dyn GenomeStore) -> bool {
        let record = match store.load_population() {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(error = %err, "population load failed, starting fresh");
                return false;
            }
        };
        if record.genomes.len() != self.config.population_size {
            tracing::warn!(
                stored = record.genomes.len(),
                expected = self.config.population_size,
                "stored population has the wrong size, starting fresh"
            );
            return false;
        }
        if let Some(bad) = record.genomes.iter().find(|g| g.genes.len() != CHROMOSOME_LEN) {
            tracing::warn!(
                stored = bad.genes.len(),
                expected = CHROMOSOME_LEN,
                "stored genome has the wrong gene count, starting fresh"
            );
            return false;
        }
        let model = self.config.fitness;
        self.population = record
            .genomes
            .into_iter()
            .map(|g| g.into_genome(model))
            .collect();
        self.cursor = record.cursor;
        true
    }

    pub fn store(&self, store: &dyn GenomeStore) -> Result<(), StoreError> {
        store.store_population(&PopulationRecord {
            cursor: self.cursor,
            genomes: self.population.iter().map(GenomeRecord::from_genome).collect(),
        })
    }

    pub fn selection(&mut self, rng: &mut SeededRng) -> Result<(), GenomeError> {
        let rate = self.config.mutation_rate;
        self.population = match self.config.selection {
            SelectionStrategy::Elitist => {
                selection::elitist(&self.population, rate, self.config.fitness, rng)?
            }
            SelectionStrategy::Roulette => selection::roulette(&self.population, rate, rng)?,
        };
        Ok(())
    }

    /// Closes one match of the current individual, moves the cursors, rolls the
    /// generation over when every individual has played, and persists.
    pub fn finish_match(
        &mut self,
        store: &dyn GenomeStore,
        rng: &mut SeededRng,
    ) -> Result<MatchEnd, EngineError> {
        let fitness = self.current().fitness();
        self.cursor.match_index += 1;
        if self.cursor.match_index >= self.config.matches_per_individual {
            self.cursor.match_index = 0;
            self.cursor.individual += 1;
        }
        let generation = self.complete_generation(store, rng)?;
        self.store(store)?;
        Ok(MatchEnd {
            fitness,
            cursor: self.cursor,
            generation,
        })
    }

    /// No-op until the individual cursor has run past the population.
    pub fn complete_generation(
        &mut self,
        store: &dyn GenomeStore,
        rng: &mut SeededRng,
    ) -> Result<Option<GenerationOutcome>, EngineError> {
        if self.cursor.individual < self.population.len() {
            return Ok(None);
        }

        let finished = self.cursor.generation;
        store.archive_generation(&GenerationArchive::capture(finished, &self.population))?;
        self.cursor.generation += 1;

        if self.cursor.generation >= self.config.generation_limit {
            let (best_position, best_fitness) = self.best();
            let record = GenomeRecord::from_genome(&self.population[best_position]);
            store.store_best_individual(&self.config.best_record_name, &record)?;
            tracing::info!(
                generation = finished,
                best_position,
                best_fitness,
                name = %self.config.best_record_name,
                "generation limit reached, best genome recorded; restarting run"
            );
            self.randomize(rng);
            return Ok(Some(GenerationOutcome::Restarted {
                best_position,
                best_fitness,
            }));
        }

        self.cursor.individual = 0;
        self.cursor.match_index = 0;
        self.selection(rng)?;
        tracing::info!(generation = self.cursor.generation, "advanced to next generation");
        Ok(Some(GenerationOutcome::Advanced {
            generation: self.cursor.generation,
        }))
    }

    /// Highest fitness; ties go to the later position.
    pub fn best(&self) -> (usize, f64) {
        let mut best = (0, f64::NEG_INFINITY);
        for (i, genome) in self.population.iter().enumerate() {
            let fitness = genome.fitness();
            if fitness >= best.1 {
                best = (i, fitness);
            }
        }
        best
    }
}
