//! The per-match driver a host embeds: owns the evolutionary run, the belief
//! about the opponent and every piece of per-tick state.

use crate::arbiter::{ArbiterDecision, BehaviorArbiter};
use crate::belief::EnemyBelief;
use crate::catalog::ItemRegistry;
use crate::config::EvolutionConfig;
use crate::constants::NOISE_FOCUS_REACH;
use crate::error::EngineError;
use crate::events::{AgentEvent, EventQueue, EventSender};
use crate::evolution::{run_seed, EvolutionEngine, MatchEnd};
use crate::genome::Genome;
use crate::geometry::{focus_from_yaw, Location};
use crate::items::{ItemId, ItemKind, ItemSpot};
use crate::rng::SeededRng;
use crate::states::{PrimaryState, SecondaryState, StateMachine};
use crate::store::{GenomeStore, MapKnowledgeStore};
use crate::world::{Actuators, Tick, WorldSnapshot};

pub struct Agent {
    engine: EvolutionEngine,
    rng: SeededRng,
    belief: EnemyBelief,
    arbiter: BehaviorArbiter,
    machine: StateMachine,
    registry: ItemRegistry,
    events: EventQueue,
    /// Opponent position while in sight.
    enemy: Option<Location>,
    primary: PrimaryState,
    secondary: SecondaryState,
    map: String,
}

impl Agent {
    pub fn new(engine: EvolutionEngine, rng: SeededRng) -> Self {
        Self {
            engine,
            rng,
            belief: EnemyBelief::default(),
            arbiter: BehaviorArbiter::new(),
            machine: StateMachine::new(),
            registry: ItemRegistry::new(),
            events: EventQueue::new(),
            enemy: None,
            primary: PrimaryState::default(),
            secondary: SecondaryState::default(),
            map: String::new(),
        }
    }

    /// Picks the run up where the store left it.
    pub fn resume(config: EvolutionConfig, store: &dyn GenomeStore) -> Result<Self, EngineError> {
        let cursor = store
            .load_population()
            .ok()
            .flatten()
            .map(|record| record.cursor)
            .unwrap_or_default();
        let mut rng = SeededRng::new(run_seed(config.seed, cursor));
        let engine = EvolutionEngine::resume(config, store, &mut rng)?;
        Ok(Self::new(engine, rng))
    }

    /// Resets per-match state and loads what we know about `map`. A failed
    /// load only costs us the remembered item locations.
    pub fn begin_match(&mut self, map: &str, maps: &dyn MapKnowledgeStore) {
        self.registry = match ItemRegistry::load(map, maps) {
            Ok(registry) => registry,
            Err(err) => {
                tracing::warn!(map, error = %err, "item registry load failed");
                ItemRegistry::new()
            }
        };
        self.map = map.to_string();
        self.belief.reset();
        self.arbiter.reset();
        self.machine = StateMachine::new();
        self.enemy = None;
        self.primary = PrimaryState::default();
        self.secondary = SecondaryState::default();
        self.events.drain();
        tracing::info!(
            map,
            agent = %self.agent_name("TX-V"),
            items = self.registry.len(),
            "match started"
        );
    }

    /// Handle for threads delivering perception callbacks.
    pub fn events(&self) -> EventSender {
        self.events.sender()
    }

    pub fn engine(&self) -> &EvolutionEngine {
        &self.engine
    }

    pub fn genome(&self) -> &Genome {
        self.engine.current()
    }

    pub fn belief(&self) -> &EnemyBelief {
        &self.belief
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn states(&self) -> (PrimaryState, SecondaryState) {
        (self.primary, self.secondary)
    }

    pub fn agent_name(&self, prefix: &str) -> String {
        self.engine.agent_name(prefix)
    }

    /// One control step: apply queued events, decide, then pick a weapon,
    /// move and shoot.
    pub fn tick(&mut self, snapshot: &WorldSnapshot, act: &mut Actuators<'_>) -> ArbiterDecision {
        for event in self.events.drain() {
            self.apply(event, snapshot, act);
        }

        let decision = self.decide(snapshot);
        let tick = Tick {
            snapshot,
            genome: self.engine.current(),
            belief: &self.belief,
            enemy: self.enemy,
            catalog: &self.registry,
        };
        self.machine
            .switch_to_best_weapon(decision.primary, &tick, decision.blow_combo(), act.weaponry);
        self.machine.execute_movement(
            decision.primary,
            decision.secondary,
            decision.forced_destination,
            decision.facing,
            &tick,
            act,
            &mut self.rng,
        );
        self.machine
            .engage(decision.primary, &tick, decision.special_target, act.weaponry);
        self.arbiter.reset_temp_info();
        decision
    }

    /// Runs the arbiter alone and remembers the chosen states.
    pub fn decide(&mut self, snapshot: &WorldSnapshot) -> ArbiterDecision {
        let tick = Tick {
            snapshot,
            genome: self.engine.current(),
            belief: &self.belief,
            enemy: self.enemy,
            catalog: &self.registry,
        };
        let decision = self.arbiter.decide(&tick);
        if (decision.primary, decision.secondary) != (self.primary, self.secondary) {
            tracing::debug!(
                from = %self.primary,
                to = %decision.primary,
                secondary = %decision.secondary,
                "state change"
            );
        }
        self.primary = decision.primary;
        self.secondary = decision.secondary;
        decision
    }

    pub fn apply(&mut self, event: AgentEvent, snapshot: &WorldSnapshot, act: &mut Actuators<'_>) {
        let now = snapshot.time;
        let me = snapshot.location;
        match event {
            AgentEvent::EnemySeen {
                name,
                location,
                weapon,
            } => {
                if self.belief.name.is_empty() {
                    self.belief.name = name;
                }
                self.on_enemy_updated(location, weapon.as_deref(), now);
            }
            AgentEvent::EnemyUpdated { location, weapon } => {
                self.on_enemy_updated(location, weapon.as_deref(), now)
            }
            AgentEvent::EnemyLost => self.on_enemy_lost(),
            AgentEvent::IncomingProjectile {
                class_name,
                location,
            } => self.arbiter.incoming_projectile(&class_name, location, self.enemy),
            AgentEvent::DamageTaken { amount, direct } => self.on_damage_taken(amount, direct, act),
            AgentEvent::DamageDealt {
                amount,
                damage_type,
            } => self.on_damage_dealt(amount, &damage_type),
            AgentEvent::NoiseHeard { yaw } => {
                let focus = focus_from_yaw(&me, yaw, NOISE_FOCUS_REACH);
                self.machine.hear_noise(focus, now, self.enemy.is_some(), act);
            }
            AgentEvent::PickupHeard {
                kind,
                location,
                yaw,
            } => self.on_pickup_heard(kind, location, yaw, snapshot, act),
            AgentEvent::ItemSeen(spot) => self.on_item_seen(spot),
            AgentEvent::ItemTaken { id } => self.on_item_spawned(&id, false),
            AgentEvent::ItemSpawned { id } => self.on_item_spawned(&id, true),
            AgentEvent::Killed => self.on_kill(),
            AgentEvent::Died => self.on_death(act),
            AgentEvent::OpponentJoined { name } => self.belief.name = name,
            AgentEvent::OpponentLeft => {
                self.belief.erase_name();
                self.belief.reset();
                self.enemy = None;
            }
            AgentEvent::DestinationReached => {
                self.machine
                    .destination_reached(self.primary, self.secondary, &me, act)
            }
            AgentEvent::Stuck => {
                tracing::debug!(primary = %self.primary, "stuck");
                self.machine.bot_stuck(self.primary, self.secondary, act);
            }
        }
    }

    pub fn on_enemy_updated(&mut self, location: Location, weapon: Option<&str>, now: f64) {
        self.enemy = Some(location);
        self.belief.update_location(Some(location), now);
        if let Some(class_name) = weapon {
            self.belief.update_weapon(class_name);
        }
    }

    pub fn on_enemy_lost(&mut self) {
        self.enemy = None;
        self.machine.enemy_lost();
    }

    pub fn on_damage_taken(&mut self, amount: u32, direct: bool, act: &mut Actuators<'_>) {
        self.engine.current_mut().stats.record_damage_taken(amount);
        self.machine.damaged(direct, self.enemy.is_some(), act);
    }

    pub fn on_damage_dealt(&mut self, amount: u32, damage_type: &str) {
        self.engine.current_mut().stats.record_damage_given(amount);
        self.belief.hit(i32::try_from(amount).unwrap_or(i32::MAX));
        self.machine.damage_dealt(damage_type);
    }

    fn on_pickup_heard(
        &mut self,
        kind: ItemKind,
        location: Location,
        yaw: f64,
        snapshot: &WorldSnapshot,
        act: &mut Actuators<'_>,
    ) {
        let me = snapshot.location;
        self.belief.hear_pickup(kind, location, &me, snapshot.time);
        let focus = focus_from_yaw(&me, yaw, NOISE_FOCUS_REACH);
        self.machine
            .hear_pickup(&location, &me, focus, snapshot.time, self.enemy.is_some(), act);
    }

    pub fn on_item_seen(&mut self, spot: ItemSpot) {
        let id = spot.id.clone();
        if self.registry.observe(spot) {
            tracing::debug!(map = %self.map, item = %id.0, "new item location");
        }
    }

    pub fn on_item_spawned(&mut self, id: &ItemId, spawned: bool) {
        self.registry.set_spawned(id, spawned);
    }

    pub fn on_kill(&mut self) {
        self.engine.current_mut().stats.record_kill();
        self.belief.reset();
        self.enemy = None;
    }

    pub fn on_death(&mut self, act: &mut Actuators<'_>) {
        self.engine.current_mut().stats.record_death();
        self.machine.died(self.primary, self.secondary, act);
        self.enemy = None;
    }

    /// Persists what was learned about the map, then closes the match for
    /// the current genome, which may roll the generation over.
    pub fn on_match_end(
        &mut self,
        store: &dyn GenomeStore,
        maps: &dyn MapKnowledgeStore,
    ) -> Result<MatchEnd, EngineError> {
        if !self.map.is_empty() {
            self.registry.save(&self.map, maps)?;
        }
        let stats = self.engine.current().stats;
        let end = self.engine.finish_match(store, &mut self.rng)?;
        tracing::info!(
            kills = stats.kills,
            deaths = stats.deaths,
            fitness = end.fitness,
            generation = end.cursor.generation,
            individual = end.cursor.individual,
            "match finished"
        );
        self.belief.reset();
        self.enemy = None;
        Ok(end)
    }
}
