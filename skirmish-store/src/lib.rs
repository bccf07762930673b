mod db;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    time::{SystemTime, UNIX_EPOCH},
};

use rusqlite::{params, Connection, OptionalExtension};
use skirmish_core::items::ItemSpot;
use skirmish_core::store::{
    Cursor, GenerationArchive, GenomeRecord, GenomeStore, MapKnowledgeStore, PopulationRecord,
};
use skirmish_core::StoreError;

pub const DB_FILE: &str = "skirmish.db";

/// SQLite-backed store for the evolutionary run and per-map item knowledge.
///
/// Genes live one row per slot so records of any chromosome length round
/// trip; archives are kept as JSON blobs since they are only ever read back
/// whole.
pub struct SqliteGenomeStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

fn backend(what: &'static str) -> impl Fn(rusqlite::Error) -> StoreError {
    move |e| StoreError::Backend(format!("{what}: {e}"))
}

pub(crate) fn now_unix_s() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl SqliteGenomeStore {
    /// Open (or create) `{data_dir}/skirmish.db`.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|e| {
            StoreError::Backend(format!(
                "failed to create data dir {}: {e}",
                data_dir.display()
            ))
        })?;

        let path = data_dir.join(DB_FILE);
        let conn = Connection::open(&path).map_err(|e| {
            StoreError::Backend(format!("failed to open SQLite at {}: {e}", path.display()))
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;
             PRAGMA synchronous=NORMAL;",
        )
        .map_err(backend("failed to set pragmas"))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS run_state (
                id           INTEGER PRIMARY KEY CHECK (id = 1),
                generation   INTEGER NOT NULL,
                individual   INTEGER NOT NULL,
                match_index  INTEGER NOT NULL,
                updated_at   INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS population (
                position      INTEGER PRIMARY KEY,
                deaths        INTEGER NOT NULL,
                kills         INTEGER NOT NULL,
                damage_given  INTEGER NOT NULL,
                damage_taken  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS population_genes (
                position  INTEGER NOT NULL,
                slot      INTEGER NOT NULL,
                value     INTEGER NOT NULL,
                PRIMARY KEY (position, slot)
             );
             CREATE TABLE IF NOT EXISTS best_individuals (
                name          TEXT PRIMARY KEY,
                deaths        INTEGER NOT NULL,
                kills         INTEGER NOT NULL,
                damage_given  INTEGER NOT NULL,
                damage_taken  INTEGER NOT NULL,
                recorded_at   INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS best_genes (
                name   TEXT NOT NULL,
                slot   INTEGER NOT NULL,
                value  INTEGER NOT NULL,
                PRIMARY KEY (name, slot)
             );
             CREATE TABLE IF NOT EXISTS generation_archive (
                generation   INTEGER PRIMARY KEY,
                entries      TEXT NOT NULL,
                archived_at  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS items (
                map      TEXT NOT NULL,
                item_id  TEXT NOT NULL,
                kind     TEXT NOT NULL,
                x        REAL NOT NULL,
                y        REAL NOT NULL,
                z        REAL NOT NULL,
                PRIMARY KEY (map, item_id)
             );",
        )
        .map_err(backend("failed to create schema"))?;

        tracing::debug!(path = %path.display(), "genome store opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".to_string()))
    }

    /// Every archived generation, oldest first.
    pub fn archives(&self) -> Result<Vec<GenerationArchive>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT generation, entries FROM generation_archive ORDER BY generation ASC")
            .map_err(backend("failed to prepare archive query"))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
            .map_err(backend("failed to read archives"))?;

        let mut archives = Vec::new();
        for row in rows {
            let (generation, entries) = row.map_err(backend("failed to parse archive row"))?;
            let entries = serde_json::from_str(&entries).map_err(|e| {
                StoreError::Corrupt(format!("archive of generation {generation}: {e}"))
            })?;
            archives.push(GenerationArchive {
                generation: generation as u32,
                entries,
            });
        }
        Ok(archives)
    }

    /// Names under which best individuals were recorded.
    pub fn best_names(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT name FROM best_individuals ORDER BY recorded_at ASC, name ASC")
            .map_err(backend("failed to prepare best query"))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(backend("failed to read best names"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(backend("failed to parse best name"))
    }

    /// Drops the in-progress population and cursors. Archives, best records
    /// and item knowledge are kept.
    pub fn reset_population(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "DELETE FROM population_genes;
             DELETE FROM population;
             DELETE FROM run_state;",
        )
        .map_err(backend("failed to reset population"))?;
        tracing::warn!("population state discarded");
        Ok(())
    }
}

impl GenomeStore for SqliteGenomeStore {
    fn load_population(&self) -> Result<Option<PopulationRecord>, StoreError> {
        let conn = self.lock()?;
        let cursor = conn
            .query_row(
                "SELECT generation, individual, match_index FROM run_state WHERE id = 1",
                [],
                |row| {
                    Ok(Cursor {
                        generation: row.get::<_, i64>(0)? as u32,
                        individual: row.get::<_, i64>(1)? as usize,
                        match_index: row.get::<_, i64>(2)? as u32,
                    })
                },
            )
            .optional()
            .map_err(backend("failed to read run state"))?;
        let Some(cursor) = cursor else {
            return Ok(None);
        };

        let genomes = db::read_population(&conn)?;
        if genomes.is_empty() {
            return Ok(None);
        }
        Ok(Some(PopulationRecord { cursor, genomes }))
    }

    fn store_population(&self, record: &PopulationRecord) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(backend("failed to begin population write"))?;
        tx.execute(
            "INSERT INTO run_state (id, generation, individual, match_index, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                generation = excluded.generation,
                individual = excluded.individual,
                match_index = excluded.match_index,
                updated_at = excluded.updated_at",
            params![
                record.cursor.generation as i64,
                record.cursor.individual as i64,
                record.cursor.match_index as i64,
                now_unix_s(),
            ],
        )
        .map_err(backend("failed to write run state"))?;
        db::replace_population(&tx, &record.genomes)?;
        tx.commit().map_err(backend("failed to commit population"))?;
        Ok(())
    }

    fn load_best_individual(&self, name: &str) -> Result<Option<GenomeRecord>, StoreError> {
        let conn = self.lock()?;
        db::read_best(&conn, name)
    }

    fn store_best_individual(&self, name: &str, record: &GenomeRecord) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(backend("failed to begin best write"))?;
        db::replace_best(&tx, name, record)?;
        tx.commit().map_err(backend("failed to commit best individual"))?;
        tracing::info!(name, kills = record.kills, deaths = record.deaths, "best individual stored");
        Ok(())
    }

    fn archive_generation(&self, archive: &GenerationArchive) -> Result<(), StoreError> {
        let entries = serde_json::to_string(&archive.entries)
            .map_err(|e| StoreError::Corrupt(format!("failed to serialize archive: {e}")))?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO generation_archive (generation, entries, archived_at)
             VALUES (?1, ?2, ?3)",
            params![archive.generation as i64, entries, now_unix_s()],
        )
        .map_err(backend("failed to archive generation"))?;
        Ok(())
    }
}

impl MapKnowledgeStore for SqliteGenomeStore {
    fn load_items(&self, map: &str) -> Result<Vec<ItemSpot>, StoreError> {
        let conn = self.lock()?;
        db::read_items(&conn, map)
    }

    fn store_items(&self, map: &str, items: &[ItemSpot]) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(backend("failed to begin item write"))?;
        db::replace_items(&tx, map, items)?;
        tx.commit().map_err(backend("failed to commit items"))?;
        Ok(())
    }
}
