pub mod agent;
pub mod arbiter;
pub mod arsenal;
pub mod belief;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod engagement;
pub mod error;
pub mod events;
pub mod evolution;
pub mod fitness;
pub mod genome;
pub mod geometry;
pub mod items;
pub mod priority;
pub mod rng;
pub mod states;
pub mod store;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::Agent;
pub use arbiter::{ArbiterDecision, BehaviorArbiter};
pub use config::{EvolutionConfig, SelectionStrategy};
pub use error::{EngineError, GenomeError, StoreError};
pub use events::{AgentEvent, EventQueue, EventSender};
pub use evolution::{EvolutionEngine, GenerationOutcome, MatchEnd};
pub use genome::Genome;
pub use states::{PrimaryState, SecondaryState, StateMachine};
pub use store::{GenomeStore, MapKnowledgeStore, MemoryGenomeStore};
pub use world::{Actuators, Tick, WorldSnapshot};
