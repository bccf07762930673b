//! Offline arbiter evaluation on hand-written fight situations.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skirmish_core::arbiter::{behave, Standing};
use skirmish_core::arsenal::{self, Band};
use skirmish_core::belief::EnemyBelief;
use skirmish_core::constants::CHROMOSOME_LEN;
use skirmish_core::fitness::FitnessModel;
use skirmish_core::items::{Loadout, WeaponKind, WeaponSet};
use skirmish_core::{Genome, PrimaryState, SecondaryState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armament {
    pub weapon: WeaponKind,
    pub ammo: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    #[serde(default = "full_health")]
    pub health: i32,
    #[serde(default)]
    pub armor: i32,
    #[serde(default = "starting_weapons")]
    pub weapons: Vec<WeaponKind>,
}

impl Default for EnemyView {
    fn default() -> Self {
        Self {
            health: full_health(),
            armor: 0,
            weapons: starting_weapons(),
        }
    }
}

impl EnemyView {
    fn belief(&self) -> EnemyBelief {
        EnemyBelief {
            health: self.health,
            armor: self.armor,
            weapons: self.weapons.iter().copied().collect::<WeaponSet>(),
            ..EnemyBelief::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    pub primary: PrimaryState,
    pub secondary: SecondaryState,
}

/// One situation: a genome, our state, what we believe about the opponent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub genes: Vec<u32>,
    pub health: i32,
    #[serde(default)]
    pub armor: i32,
    #[serde(default)]
    pub weapons: Vec<Armament>,
    #[serde(default)]
    pub enemy: EnemyView,
    /// Present only while the opponent is visible.
    #[serde(default)]
    pub enemy_distance: Option<f64>,
    /// Seconds since the opponent was last observed.
    #[serde(default = "never_seen")]
    pub elapsed: f64,
    #[serde(default)]
    pub expect: Option<Expectation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub primary: PrimaryState,
    pub secondary: SecondaryState,
    pub ordinals: [u8; 3],
    pub maximum_profit: u8,
    pub offensive_band: Band,
    pub defensive_band: Band,
    /// `None` when the scenario carries no expectation.
    pub matches: Option<bool>,
}

fn full_health() -> i32 {
    100
}

fn starting_weapons() -> Vec<WeaponKind> {
    WeaponSet::starting().iter().collect()
}

fn never_seen() -> f64 {
    f64::MAX
}

pub fn evaluate(scenario: &Scenario) -> Result<ScenarioReport> {
    if scenario.genes.len() != CHROMOSOME_LEN {
        bail!(
            "scenario '{}' has {} genes, expected {}",
            scenario.name,
            scenario.genes.len(),
            CHROMOSOME_LEN
        );
    }
    let genome = Genome::new(scenario.genes.clone(), FitnessModel::default());
    let loadout = scenario
        .weapons
        .iter()
        .fold(Loadout::default(), |loadout, a| loadout.with(a.weapon, a.ammo));
    let belief = scenario.enemy.belief();

    let comparison = arsenal::compare(loadout.loaded(), belief.weapons);
    let standing = Standing {
        health: scenario.health,
        total: scenario.health + scenario.armor,
        enemy_health: belief.health,
        enemy_total: belief.total(),
        enemy_distance: scenario.enemy_distance,
        elapsed: scenario.elapsed,
    };
    let (primary, secondary) = behave(&genome, &comparison, &standing);

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        primary,
        secondary,
        ordinals: comparison.ordinals,
        maximum_profit: comparison.maximum_profit,
        offensive_band: comparison.offensive_band,
        defensive_band: comparison.defensive_band,
        matches: scenario
            .expect
            .map(|e| e.primary == primary && e.secondary == secondary),
    })
}

/// A file holds one scenario or an array of them. Unnamed scenarios take the
/// file stem.
pub fn load_file(path: &Path) -> Result<Vec<Scenario>> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_slice(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let parsed = if value.is_array() {
        serde_json::from_value::<Vec<Scenario>>(value)
    } else {
        serde_json::from_value::<Scenario>(value).map(|s| vec![s])
    };
    let mut scenarios =
        parsed.with_context(|| format!("invalid scenario in {}", path.display()))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let many = scenarios.len() > 1;
    for (i, scenario) in scenarios.iter_mut().enumerate() {
        if scenario.name.is_empty() {
            scenario.name = if many { format!("{stem}#{i}") } else { stem.clone() };
        }
    }
    Ok(scenarios)
}

/// `*.json` files directly inside `dir`, sorted by name.
pub fn scenario_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Evaluates a single file, or every scenario file of a directory in
/// parallel. Reports keep file order.
pub fn evaluate_path(path: &Path, jobs: Option<usize>) -> Result<Vec<ScenarioReport>> {
    if !path.is_dir() {
        return load_file(path)?.iter().map(evaluate).collect();
    }

    let files = scenario_files(path)?;
    tracing::debug!(count = files.len(), dir = %path.display(), "evaluating scenario directory");
    let run_one = |file: &PathBuf| -> Result<Vec<ScenarioReport>> {
        load_file(file)?.iter().map(evaluate).collect()
    };

    let results: Vec<Result<Vec<ScenarioReport>>> = if let Some(jobs) = jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| files.par_iter().map(run_one).collect())
    } else {
        files.par_iter().map(run_one).collect()
    };

    let mut reports = Vec::new();
    for result in results {
        reports.extend(result?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bands 600/1200/2000, health thresholds 40/90, stale intel after 5s.
    fn genes() -> Vec<u32> {
        let mut genes = vec![50; CHROMOSOME_LEN];
        genes[0] = 600;
        genes[1] = 1_200;
        genes[2] = 2_000;
        genes[12] = 40;
        genes[13] = 90;
        genes[14] = 10;
        genes[15] = 30;
        genes[16] = 30;
        genes[17] = 30;
        genes[18] = 30;
        genes[19] = 5;
        genes
    }

    fn scenario(health: i32) -> Scenario {
        Scenario {
            name: "s".to_string(),
            genes: genes(),
            health,
            armor: 0,
            weapons: vec![Armament {
                weapon: WeaponKind::AssaultRifle,
                ammo: 50,
            }],
            enemy: EnemyView::default(),
            enemy_distance: None,
            elapsed: never_seen(),
            expect: None,
        }
    }

    #[test]
    fn short_genome_is_rejected() {
        let mut s = scenario(100);
        s.genes.truncate(10);
        let err = evaluate(&s).unwrap_err().to_string();
        assert!(err.contains("has 10 genes"));
    }

    #[test]
    fn report_matches_the_decision_table() {
        let s = scenario(100);
        let report = evaluate(&s).unwrap();

        let genome = Genome::new(genes(), FitnessModel::default());
        let loadout = Loadout::default().with(WeaponKind::AssaultRifle, 50);
        let belief = EnemyView::default().belief();
        let comparison = arsenal::compare(loadout.loaded(), belief.weapons);
        let expected = behave(
            &genome,
            &comparison,
            &Standing {
                health: 100,
                total: 100,
                enemy_health: 100,
                enemy_total: 100,
                enemy_distance: None,
                elapsed: f64::MAX,
            },
        );
        assert_eq!((report.primary, report.secondary), expected);
        assert_eq!(report.maximum_profit, comparison.maximum_profit);
        assert_eq!(report.matches, None);
    }

    #[test]
    fn visible_opponent_at_critical_health_means_retreat() {
        let mut s = scenario(10);
        s.enemy.health = 150;
        s.enemy_distance = Some(800.0);
        let report = evaluate(&s).unwrap();
        assert_eq!(report.primary, PrimaryState::Retreat);
    }

    #[test]
    fn expectation_is_checked() {
        let mut s = scenario(10);
        s.enemy.health = 150;
        s.enemy_distance = Some(800.0);
        s.expect = Some(Expectation {
            primary: PrimaryState::Camp,
            secondary: SecondaryState::Disabled,
        });
        assert_eq!(evaluate(&s).unwrap().matches, Some(false));
    }

    #[test]
    fn file_may_hold_an_array_and_names_default_to_the_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duel.json");
        let mut unnamed = scenario(100);
        unnamed.name.clear();
        fs::write(&path, serde_json::to_vec(&vec![unnamed.clone(), unnamed]).unwrap()).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "duel#0");
        assert_eq!(loaded[1].name, "duel#1");
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("min.json");
        let json = serde_json::json!({ "genes": genes(), "health": 100 });
        fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded[0].name, "min");
        assert_eq!(loaded[0].enemy, EnemyView::default());
        assert_eq!(loaded[0].elapsed, f64::MAX);
    }

    #[test]
    fn directory_reports_follow_file_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b", "a", "c"] {
            let mut s = scenario(100);
            s.name = name.to_string();
            fs::write(
                dir.path().join(format!("{name}.json")),
                serde_json::to_vec(&s).unwrap(),
            )
            .unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let reports = evaluate_path(dir.path(), Some(2)).unwrap();
        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
