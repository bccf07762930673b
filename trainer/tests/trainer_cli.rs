use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use skirmish_core::store::GenomeRecord;
use skirmish_core::{EvolutionConfig, GenerationOutcome};
use skirmish_trainer::{evaluate_path, MatchReport, ScenarioReport, TrainingRun};

fn repo_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn trainer(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skirmish-trainer"))
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--preset")
        .arg("smoke")
        .args(args)
        .env_remove("SKIRMISH_SEED")
        .output()
        .expect("failed to spawn skirmish-trainer")
}

#[test]
fn bundled_scenarios_meet_their_expectations() {
    let reports = evaluate_path(&repo_path("scenarios"), None).unwrap();
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert_eq!(report.matches, Some(true), "{report:?}");
    }
}

#[test]
fn smoke_run_records_a_best_individual_at_the_limit() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = EvolutionConfig::preset("smoke").unwrap();
    let matches = cfg.population_size * cfg.generation_limit as usize;

    let mut run = TrainingRun::open(dir.path(), cfg).unwrap();
    let mut restarted = None;
    for i in 0..matches {
        let end = run
            .record(MatchReport {
                kills: (i % 4) as u32,
                deaths: 1,
                damage_given: 100,
                damage_taken: 50,
            })
            .unwrap();
        if let Some(GenerationOutcome::Restarted { best_position, .. }) = end.generation {
            restarted = Some(best_position);
        }
    }

    assert!(restarted.is_some());
    assert_eq!(run.engine().cursor().generation, 0);
    assert!(run.best(None).unwrap().is_some());
    assert_eq!(run.store().archives().unwrap().len(), 3);
}

#[test]
fn cli_records_and_reports_status() {
    let dir = tempfile::tempdir().unwrap();

    let out = trainer(dir.path(), &["record", "--kills", "2", "--deaths", "1"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = trainer(dir.path(), &["status"]);
    assert!(out.status.success());
    let status: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(status["cursor"]["individual"], 1);
    assert_eq!(status["population"][0]["kills"], 2);
    assert_eq!(status["agent_name"], "TX-V001");
}

#[test]
fn cli_best_fails_cleanly_when_nothing_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let out = trainer(dir.path(), &["best"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no best individual recorded"));
}

#[test]
fn cli_best_prints_the_recorded_genome() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = EvolutionConfig::preset("smoke").unwrap();
    let matches = cfg.population_size * cfg.generation_limit as usize;
    {
        let mut run = TrainingRun::open(dir.path(), cfg).unwrap();
        for _ in 0..matches {
            run.record(MatchReport::default()).unwrap();
        }
    }

    let out = trainer(dir.path(), &["best"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let record: GenomeRecord = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(record.genes.len(), skirmish_core::constants::CHROMOSOME_LEN);
}

#[test]
fn cli_decide_prints_reports() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = repo_path("scenarios/cornered.json");
    let out = trainer(dir.path(), &["decide", "--scenario", scenario.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let reports: Vec<ScenarioReport> = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(reports[0].name, "cornered");
}

#[test]
fn cli_rejects_unknown_preset() {
    let dir = tempfile::tempdir().unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_skirmish-trainer"))
        .args(["--preset", "turbo", "show-config"])
        .arg("--data-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown preset 'turbo'"));
}
