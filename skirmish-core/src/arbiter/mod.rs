//! Per-tick strategy selection.

mod decision;


pub use decision::{behave, estimate_profile, Standing};

use serde::{Deserialize, Serialize};

use crate::arsenal::{self, ArsenalComparison};
use crate::constants::COMBO_RADIUS;
use crate::engagement::{SpecialTarget, TargetKind};
use crate::geometry::Location;
use crate::priority::destination_priority;
use crate::states::{PrimaryState, SecondaryState};
use crate::world::Tick;

const SHOCK_PROJECTILE: &str = "XWeapons.ShockProjectile";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArbiterDecision {
    pub primary: PrimaryState,
    pub secondary: SecondaryState,
    pub forced_destination: Option<Location>,
    pub facing: Option<Location>,
    pub special_target: Option<SpecialTarget>,
}

impl ArbiterDecision {
    pub fn blow_combo(&self) -> bool {
        matches!(
            self.special_target,
            Some(SpecialTarget {
                kind: TargetKind::Combo,
                ..
            })
        )
    }
}

/// Holds the aim points that outlive a single decision: a shock core seen
/// near the opponent, and the blind-fire spot chosen on the last tick.
#[derive(Clone, Debug, Default)]
pub struct BehaviorArbiter {
    combo: Option<Location>,
    spam: Option<Location>,
}

impl BehaviorArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decide(&mut self, tick: &Tick<'_>) -> ArbiterDecision {
        let comparison = arsenal::compare(tick.snapshot.loadout.loaded(), tick.belief.weapons);
        let (primary, secondary) = behave(tick.genome, &comparison, &standing(tick));

        self.spam = spam_spot(tick);
        let decision = ArbiterDecision {
            primary,
            secondary,
            forced_destination: estimate_destination(tick),
            facing: tick.enemy,
            special_target: self.estimate_target(),
        };
        tracing::debug!(
            %primary,
            %secondary,
            profit = comparison.maximum_profit,
            forced = decision.forced_destination.is_some(),
            "decision"
        );
        decision
    }

    pub fn compare(&self, tick: &Tick<'_>) -> ArsenalComparison {
        arsenal::compare(tick.snapshot.loadout.loaded(), tick.belief.weapons)
    }

    /// A pending combo wins over blind fire.
    pub fn estimate_target(&self) -> Option<SpecialTarget> {
        if let Some(location) = self.combo {
            return Some(SpecialTarget {
                location,
                kind: TargetKind::Combo,
            });
        }
        self.spam.map(|location| SpecialTarget {
            location,
            kind: TargetKind::Spam,
        })
    }

    /// Marks a shock core passing close to the opponent (or to the blind-fire
    /// spot) as detonatable.
    pub fn incoming_projectile(&mut self, class_name: &str, location: Location, enemy: Option<Location>) {
        if class_name != SHOCK_PROJECTILE {
            return;
        }
        if let Some(point) = enemy.or(self.spam) {
            if point.distance(&location) < COMBO_RADIUS {
                self.combo = Some(location);
            }
        }
    }

    /// Called once the tick has acted on its decision.
    pub fn reset_temp_info(&mut self) {
        self.combo = None;
    }

    pub fn reset(&mut self) {
        self.combo = None;
        self.spam = None;
    }
}

fn standing(tick: &Tick<'_>) -> Standing {
    Standing {
        health: tick.snapshot.health,
        total: tick.snapshot.total(),
        enemy_health: tick.belief.health,
        enemy_total: tick.belief.total(),
        enemy_distance: tick.enemy_distance(),
        elapsed: tick.belief.elapsed(tick.now()),
    }
}

/// Remembered opponent position worth firing at blind.
fn spam_spot(tick: &Tick<'_>) -> Option<Location> {
    if tick.enemy.is_some() || tick.belief.elapsed(tick.now()) >= tick.genome.stale_intel() {
        return None;
    }
    tick.belief.last_location
}

/// Remembered pickup worth a detour. With the opponent in sight only a
/// super shield qualifies; otherwise shields are considered first, then
/// weapons, nearer winning among equal priorities.
pub fn estimate_destination(tick: &Tick<'_>) -> Option<Location> {
    use crate::items::ItemKind;

    let loadout = &tick.snapshot.loadout;
    let mut maximum = 0;
    let mut destination = None;

    for spot in tick.catalog.spawned(&|k: ItemKind| k.is_armor()) {
        let priority = destination_priority(tick.genome, spot.kind, loadout);
        if priority > maximum {
            maximum = priority;
            if tick.enemy.is_none() || spot.kind == ItemKind::SuperShield {
                destination = Some(spot.location);
            }
        }
    }

    if tick.enemy.is_some() || destination.is_some() {
        return destination;
    }

    let mut nearest = f64::INFINITY;
    for spot in tick.catalog.spawned(&|k: ItemKind| k.weapon().is_some()) {
        let priority = destination_priority(tick.genome, spot.kind, loadout);
        let distance = tick.snapshot.distance_to(&spot.location);
        if priority > maximum || (priority == maximum && priority > 0 && distance < nearest) {
            maximum = priority;
            nearest = distance;
            destination = Some(spot.location);
        }
    }
    destination
}
