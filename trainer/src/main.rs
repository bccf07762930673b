use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use skirmish_core::GenerationOutcome;
use skirmish_trainer::config::{load_config, resolve_data_dir};
use skirmish_trainer::{evaluate_path, MatchReport, TrainingRun};

#[derive(Parser)]
#[command(
    name = "skirmish-trainer",
    about = "Inspect and drive the evolutionary run of the duel agent offline"
)]
struct Cli {
    /// Store directory (default: $SKIRMISH_DATA_DIR or ./skirmish-data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a named preset instead of config file
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print run cursors and per-genome fitness
    Status {
        /// Agent name prefix
        #[arg(long, default_value = "TX-V")]
        prefix: String,
    },

    /// Credit one finished match to the current individual and advance
    Record {
        #[arg(long, default_value = "0")]
        kills: u32,

        #[arg(long, default_value = "0")]
        deaths: u32,

        #[arg(long, default_value = "0")]
        damage_given: u32,

        #[arg(long, default_value = "0")]
        damage_taken: u32,
    },

    /// Print the stored best individual
    Best {
        /// Record name (default: the configured one)
        #[arg(long)]
        name: Option<String>,
    },

    /// Write every archived generation as JSON
    Export {
        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },

    /// Discard the in-progress population and start a fresh run
    Reset,

    /// Evaluate the arbiter on scenario files
    Decide {
        /// Scenario file or directory of *.json files
        #[arg(long)]
        scenario: PathBuf,

        /// Parallel jobs (default: all cores)
        #[arg(long)]
        jobs: Option<usize>,
    },

    /// Print the effective evolution config
    ShowConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref(), cli.preset.as_deref())?;
    let data_dir = resolve_data_dir(cli.data_dir);

    match cli.command {
        Command::Status { prefix } => {
            let run = TrainingRun::open(&data_dir, cfg)?;
            let status = run.status(&prefix)?;
            eprintln!(
                "{} generation={} individual={} match={} best={}@{:.3}",
                status.agent_name,
                status.cursor.generation,
                status.cursor.individual,
                status.cursor.match_index,
                status.best_position,
                status.best_fitness,
            );
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Command::Record {
            kills,
            deaths,
            damage_given,
            damage_taken,
        } => {
            let mut run = TrainingRun::open(&data_dir, cfg)?;
            let end = run.record(MatchReport {
                kills,
                deaths,
                damage_given,
                damage_taken,
            })?;
            eprintln!(
                "fitness={:.3} next: generation={} individual={} match={}",
                end.fitness, end.cursor.generation, end.cursor.individual, end.cursor.match_index,
            );
            match end.generation {
                Some(GenerationOutcome::Advanced { generation }) => {
                    eprintln!("generation complete, now at {generation}");
                }
                Some(GenerationOutcome::Restarted {
                    best_position,
                    best_fitness,
                }) => {
                    eprintln!(
                        "generation limit reached: best #{best_position} fitness={best_fitness:.3} recorded, run restarted"
                    );
                }
                None => {}
            }
        }

        Command::Best { name } => {
            let run = TrainingRun::open(&data_dir, cfg)?;
            let record = run.best(name.as_deref())?.ok_or_else(|| {
                anyhow!(
                    "no best individual recorded under '{}'",
                    name.as_deref()
                        .unwrap_or(run.engine().config().best_record_name.as_str())
                )
            })?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Command::Export { out } => {
            let run = TrainingRun::open(&data_dir, cfg)?;
            let written = run.export(&out)?;
            eprintln!("{} generation(s) written to {}", written.len(), out.display());
        }

        Command::Reset => {
            let mut run = TrainingRun::open(&data_dir, cfg)?;
            run.reset()?;
            eprintln!(
                "fresh population of {} in {}",
                run.engine().population().len(),
                run.store().path().display()
            );
        }

        Command::Decide { scenario, jobs } => {
            let reports = evaluate_path(&scenario, jobs)?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
            let failed: Vec<&str> = reports
                .iter()
                .filter(|r| r.matches == Some(false))
                .map(|r| r.name.as_str())
                .collect();
            if !failed.is_empty() {
                bail!("{} scenario(s) disagree with their expectation: {}", failed.len(), failed.join(", "));
            }
        }

        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }

    Ok(())
}
