use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};
use skirmish_core::geometry::Location;
use skirmish_core::items::{ItemId, ItemKind, ItemSpot};
use skirmish_core::store::GenomeRecord;
use skirmish_core::StoreError;

use super::{backend, now_unix_s};

/// Stats columns of `population` / `best_individuals`, genes still empty.
fn stats_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<GenomeRecord> {
    Ok(GenomeRecord {
        deaths: row.get::<_, i64>(offset)? as u32,
        kills: row.get::<_, i64>(offset + 1)? as u32,
        damage_given: row.get::<_, i64>(offset + 2)? as u32,
        damage_taken: row.get::<_, i64>(offset + 3)? as u32,
        genes: Vec::new(),
    })
}

/// Slots must run 0..n without holes.
fn assemble_genes(owner: &str, slots: Vec<(i64, i64)>) -> Result<Vec<u32>, StoreError> {
    let mut genes = Vec::with_capacity(slots.len());
    for (expected, (slot, value)) in slots.into_iter().enumerate() {
        if slot != expected as i64 {
            return Err(StoreError::Corrupt(format!(
                "{owner}: gene slot {slot} where {expected} was expected"
            )));
        }
        if value < 0 {
            return Err(StoreError::Corrupt(format!("{owner}: negative gene {value} in slot {slot}")));
        }
        genes.push(value as u32);
    }
    Ok(genes)
}

pub(super) fn read_population(conn: &Connection) -> Result<Vec<GenomeRecord>, StoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT position, deaths, kills, damage_given, damage_taken
             FROM population ORDER BY position ASC",
        )
        .map_err(backend("failed to prepare population query"))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, stats_row(row, 1)?)))
        .map_err(backend("failed to read population"))?;
    let mut records = BTreeMap::new();
    for row in rows {
        let (position, record) = row.map_err(backend("failed to parse population row"))?;
        records.insert(position, record);
    }

    let mut stmt = conn
        .prepare("SELECT position, slot, value FROM population_genes ORDER BY position ASC, slot ASC")
        .map_err(backend("failed to prepare gene query"))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
        })
        .map_err(backend("failed to read genes"))?;
    let mut slots: BTreeMap<i64, Vec<(i64, i64)>> = BTreeMap::new();
    for row in rows {
        let (position, slot, value) = row.map_err(backend("failed to parse gene row"))?;
        slots.entry(position).or_default().push((slot, value));
    }

    let mut genomes = Vec::with_capacity(records.len());
    for (expected, (position, mut record)) in records.into_iter().enumerate() {
        if position != expected as i64 {
            return Err(StoreError::Corrupt(format!(
                "population position {position} where {expected} was expected"
            )));
        }
        let owner = format!("genome {position}");
        record.genes = assemble_genes(&owner, slots.remove(&position).unwrap_or_default())?;
        genomes.push(record);
    }
    Ok(genomes)
}

pub(super) fn replace_population(conn: &Connection, genomes: &[GenomeRecord]) -> Result<(), StoreError> {
    conn.execute_batch("DELETE FROM population_genes; DELETE FROM population;")
        .map_err(backend("failed to clear population"))?;

    let mut insert = conn
        .prepare(
            "INSERT INTO population (position, deaths, kills, damage_given, damage_taken)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(backend("failed to prepare population insert"))?;
    let mut insert_gene = conn
        .prepare("INSERT INTO population_genes (position, slot, value) VALUES (?1, ?2, ?3)")
        .map_err(backend("failed to prepare gene insert"))?;

    for (position, genome) in genomes.iter().enumerate() {
        insert
            .execute(params![
                position as i64,
                genome.deaths as i64,
                genome.kills as i64,
                genome.damage_given as i64,
                genome.damage_taken as i64,
            ])
            .map_err(backend("insert genome failed"))?;
        for (slot, value) in genome.genes.iter().enumerate() {
            insert_gene
                .execute(params![position as i64, slot as i64, *value as i64])
                .map_err(backend("insert gene failed"))?;
        }
    }
    Ok(())
}

pub(super) fn read_best(conn: &Connection, name: &str) -> Result<Option<GenomeRecord>, StoreError> {
    let record = conn
        .query_row(
            "SELECT deaths, kills, damage_given, damage_taken FROM best_individuals WHERE name = ?1",
            params![name],
            |row| stats_row(row, 0),
        )
        .optional()
        .map_err(backend("failed to read best individual"))?;
    let Some(mut record) = record else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare("SELECT slot, value FROM best_genes WHERE name = ?1 ORDER BY slot ASC")
        .map_err(backend("failed to prepare best gene query"))?;
    let rows = stmt
        .query_map(params![name], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
        .map_err(backend("failed to read best genes"))?;
    let slots = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(backend("failed to parse best gene"))?;
    record.genes = assemble_genes(name, slots)?;
    Ok(Some(record))
}

pub(super) fn replace_best(conn: &Connection, name: &str, record: &GenomeRecord) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO best_individuals
            (name, deaths, kills, damage_given, damage_taken, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            name,
            record.deaths as i64,
            record.kills as i64,
            record.damage_given as i64,
            record.damage_taken as i64,
            now_unix_s(),
        ],
    )
    .map_err(backend("insert best individual failed"))?;
    conn.execute("DELETE FROM best_genes WHERE name = ?1", params![name])
        .map_err(backend("failed to clear best genes"))?;

    let mut insert_gene = conn
        .prepare("INSERT INTO best_genes (name, slot, value) VALUES (?1, ?2, ?3)")
        .map_err(backend("failed to prepare best gene insert"))?;
    for (slot, value) in record.genes.iter().enumerate() {
        insert_gene
            .execute(params![name, slot as i64, *value as i64])
            .map_err(backend("insert best gene failed"))?;
    }
    Ok(())
}

pub(super) fn read_items(conn: &Connection, map: &str) -> Result<Vec<ItemSpot>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT item_id, kind, x, y, z FROM items WHERE map = ?1 ORDER BY item_id ASC")
        .map_err(backend("failed to prepare item query"))?;
    let rows = stmt
        .query_map(params![map], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                Location::new(row.get(2)?, row.get(3)?, row.get(4)?),
            ))
        })
        .map_err(backend("failed to read items"))?;

    let mut items = Vec::new();
    for row in rows {
        let (id, kind, location) = row.map_err(backend("failed to parse item row"))?;
        let kind: ItemKind = match serde_json::from_str(&kind) {
            Ok(kind) => kind,
            Err(e) => {
                tracing::warn!(map, item = %id, error = %e, "skipping item with unreadable kind");
                continue;
            }
        };
        items.push(ItemSpot {
            id: ItemId(id),
            kind,
            location,
        });
    }
    Ok(items)
}

pub(super) fn replace_items(conn: &Connection, map: &str, items: &[ItemSpot]) -> Result<(), StoreError> {
    conn.execute("DELETE FROM items WHERE map = ?1", params![map])
        .map_err(backend("failed to clear items"))?;
    let mut insert = conn
        .prepare(
            "INSERT OR REPLACE INTO items (map, item_id, kind, x, y, z)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(backend("failed to prepare item insert"))?;
    for item in items {
        let kind = serde_json::to_string(&item.kind)
            .map_err(|e| StoreError::Corrupt(format!("failed to serialize item kind: {e}")))?;
        insert
            .execute(params![
                map,
                item.id.0,
                kind,
                item.location.x,
                item.location.y,
                item.location.z,
            ])
            .map_err(backend("insert item failed"))?;
    }
    Ok(())
}
