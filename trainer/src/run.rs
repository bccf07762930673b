//! Offline driver over a persisted evolutionary run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skirmish_core::rng::SeededRng;
use skirmish_core::store::{ArchivedGenome, Cursor, GenerationArchive, GenomeRecord};
use skirmish_core::evolution::run_seed;
use skirmish_core::{EvolutionConfig, EvolutionEngine, GenomeStore, MatchEnd};
use skirmish_store::SqliteGenomeStore;

/// Statistics of one finished match, as a host would report them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    pub kills: u32,
    pub deaths: u32,
    pub damage_given: u32,
    pub damage_taken: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunStatus {
    pub cursor: Cursor,
    pub agent_name: String,
    pub population: Vec<ArchivedGenome>,
    pub best_position: usize,
    pub best_fitness: f64,
    pub recorded_best: Vec<String>,
}

pub struct TrainingRun {
    store: SqliteGenomeStore,
    engine: EvolutionEngine,
    rng: SeededRng,
}

impl TrainingRun {
    pub fn open(data_dir: &Path, config: EvolutionConfig) -> Result<Self> {
        let store = SqliteGenomeStore::open(data_dir)
            .with_context(|| format!("failed to open store in {}", data_dir.display()))?;
        let cursor = store
            .load_population()
            .ok()
            .flatten()
            .map(|record| record.cursor)
            .unwrap_or_default();
        let mut rng = SeededRng::new(run_seed(config.seed, cursor));
        let engine = EvolutionEngine::resume(config, &store, &mut rng)
            .context("failed to resume evolutionary run")?;
        engine
            .store(&store)
            .context("failed to persist resumed population")?;
        Ok(Self { store, engine, rng })
    }

    pub fn engine(&self) -> &EvolutionEngine {
        &self.engine
    }

    pub fn store(&self) -> &SqliteGenomeStore {
        &self.store
    }

    pub fn status(&self, name_prefix: &str) -> Result<RunStatus> {
        let cursor = self.engine.cursor();
        let (best_position, best_fitness) = self.engine.best();
        Ok(RunStatus {
            cursor,
            agent_name: self.engine.agent_name(name_prefix),
            population: GenerationArchive::capture(cursor.generation, self.engine.population())
                .entries,
            best_position,
            best_fitness,
            recorded_best: self.store.best_names().context("failed to list best records")?,
        })
    }

    /// Credits the current individual with `report` and moves the run on,
    /// exactly as the agent does when a match ends.
    pub fn record(&mut self, report: MatchReport) -> Result<MatchEnd> {
        let stats = &mut self.engine.current_mut().stats;
        stats.kills = stats.kills.saturating_add(report.kills);
        stats.deaths = stats.deaths.saturating_add(report.deaths);
        stats.record_damage_given(report.damage_given);
        stats.record_damage_taken(report.damage_taken);

        let end = self
            .engine
            .finish_match(&self.store, &mut self.rng)
            .context("failed to finish match")?;
        tracing::info!(
            fitness = end.fitness,
            generation = end.cursor.generation,
            individual = end.cursor.individual,
            "match recorded"
        );
        Ok(end)
    }

    /// The stored best individual; `None` uses the configured record name.
    pub fn best(&self, name: Option<&str>) -> Result<Option<GenomeRecord>> {
        let name = name.unwrap_or(self.engine.config().best_record_name.as_str());
        self.store
            .load_best_individual(name)
            .with_context(|| format!("failed to load best individual '{name}'"))
    }

    /// Writes `generation-NNNN.json` per archived generation into `out_dir`.
    pub fn export(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
        let archives = self.store.archives().context("failed to read archives")?;
        let mut written = Vec::with_capacity(archives.len());
        for archive in &archives {
            let path = out_dir.join(format!("generation-{:04}.json", archive.generation));
            fs::write(&path, serde_json::to_vec_pretty(archive)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }

    /// Throws away the in-progress population and starts over at generation
    /// zero. Archives and best records survive.
    pub fn reset(&mut self) -> Result<()> {
        self.store
            .reset_population()
            .context("failed to reset population")?;
        let config = self.engine.config().clone();
        self.rng = SeededRng::new(run_seed(config.seed, Cursor::default()));
        self.engine = EvolutionEngine::new(config, &mut self.rng);
        self.engine
            .store(&self.store)
            .context("failed to persist fresh population")?;
        Ok(())
    }
}
