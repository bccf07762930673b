pub mod config;
pub mod run;
pub mod scenario;

pub use run::{MatchReport, RunStatus, TrainingRun};
pub use scenario::{evaluate, evaluate_path, Scenario, ScenarioReport};
