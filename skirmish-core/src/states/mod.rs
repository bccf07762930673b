//! Movement behaviour for the primary strategies and their overlays.
//!
//! The coordinator owns every piece of scratch state shared between variants,
//! so each variant works off `&mut StateMachine` rather than globals.

mod primary;
mod secondary;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DESTINATION_REACHED_RADIUS, REACTIVE_FACING_TIMEOUT, SELF_PICKUP_RADIUS};
use crate::engagement::{self, CombatFlags, Ranges, SpecialTarget};
use crate::geometry::Location;
use crate::rng::SeededRng;
use crate::world::{Actuators, Locomotion, Ray, RayScan, Tick, Weaponry};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryState {
    Attack,
    Retreat,
    #[default]
    Hunt,
    Greedy,
    Camp,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryState {
    #[default]
    Disabled,
    DefensiveProfile,
    OffensiveProfile,
    PickupWeapon,
    PickupAmmo,
    PickupHealth,
    CriticalHealth,
    CriticalWeaponry,
}

impl fmt::Display for PrimaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for SecondaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementOutcome {
    Done,
    /// Preconditions unmet; the primary state moves this tick instead.
    NotApplicable,
}

/// Recently chosen destinations, oldest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisitedSpots {
    spots: VecDeque<Location>,
}

impl VisitedSpots {
    pub fn contains(&self, spot: &Location) -> bool {
        self.spots.contains(spot)
    }

    /// Appends `spot`, first dropping the oldest entry when `cap` is reached.
    /// Each state passes its own cap while sharing one history.
    pub fn record(&mut self, spot: Location, cap: usize) {
        if self.spots.len() >= cap {
            self.spots.pop_front();
        }
        self.spots.push_back(spot);
    }

    pub fn clear(&mut self) {
        self.spots.clear();
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.spots.iter()
    }
}

/// Scratch shared by every state variant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateContext {
    /// Forced destination currently being followed.
    pub destination: Option<Location>,
    /// Destination owned by whichever overlay is active.
    pub secondary_destination: Option<Location>,
    /// Destination a primary state picked for itself.
    pub state_driven_destination: Option<Location>,
    pub visited: VisitedSpots,
    pub current_facing: Option<Location>,
    /// Set while a reactive turn (noise, pickup) holds the focus.
    pub rotation_time: Option<f64>,
    pub flags: CombatFlags,
    pub crouched: bool,
    pub moving: bool,
}

impl StateContext {
    fn stand_up(&mut self, motion: &mut dyn Locomotion) {
        if self.crouched {
            motion.set_crouch(false);
            self.crouched = false;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StateMachine {
    ctx: StateContext,
    /// Attack: which side the blind strafe goes next.
    pendulum: bool,
    /// Greedy: priority of the item currently pursued.
    execution_priority: i32,
    /// Retreat: shield gun recharging.
    reloading: bool,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &StateContext {
        &self.ctx
    }

    pub fn flags(&self) -> CombatFlags {
        self.ctx.flags
    }

    pub fn execution_priority(&self) -> i32 {
        self.execution_priority
    }

    /// Runs the overlay first unless a forced destination overrides it; falls
    /// back to the primary behaviour when the overlay does not apply. Facing is
    /// reconciled afterwards.
    pub fn execute_movement(
        &mut self,
        primary: PrimaryState,
        secondary: SecondaryState,
        forced: Option<Location>,
        facing: Option<Location>,
        tick: &Tick<'_>,
        act: &mut Actuators<'_>,
        rng: &mut SeededRng,
    ) {
        let mut fallback = false;
        if secondary != SecondaryState::Disabled && forced.is_none() {
            if self.attempt_secondary(secondary, tick, act) == MovementOutcome::NotApplicable {
                tracing::trace!(%secondary, %primary, "overlay not applicable");
                fallback = true;
            }
        }

        if secondary == SecondaryState::Disabled || forced.is_some() || fallback {
            match forced {
                Some(dest) => {
                    if self.ctx.destination != Some(dest) || !act.navigation.is_executing() {
                        self.ctx.destination = Some(dest);
                        act.travel(&tick.me(), &dest);
                    }
                }
                None => self.drive_primary(primary, facing, tick, act, rng),
            }
        }

        self.update_facing(facing, tick.now(), act);
    }

    fn update_facing(&mut self, facing: Option<Location>, now: f64, act: &mut Actuators<'_>) {
        match facing {
            Some(focus) => {
                if self.ctx.current_facing != Some(focus) {
                    act.navigation.set_facing(Some(focus));
                    self.ctx.current_facing = Some(focus);
                    self.ctx.rotation_time = None;
                }
            }
            None => {
                if let Some(started) = self.ctx.rotation_time {
                    if (started - now).abs() >= REACTIVE_FACING_TIMEOUT {
                        act.navigation.set_facing(None);
                        self.ctx.rotation_time = None;
                    }
                } else if self.ctx.current_facing.is_some() {
                    act.navigation.set_facing(None);
                    self.ctx.current_facing = None;
                }
            }
        }
    }

    pub fn switch_to_best_weapon(
        &mut self,
        primary: PrimaryState,
        tick: &Tick<'_>,
        blow_combo: bool,
        weaponry: &mut dyn Weaponry,
    ) {
        let loadout = &tick.snapshot.loadout;
        if primary == PrimaryState::Retreat {
            engagement::retreat_switch(
                tick.genome,
                loadout,
                &mut self.ctx.flags,
                &mut self.reloading,
                blow_combo,
                weaponry,
            );
        } else {
            engagement::switch_to_best_weapon(tick.genome, loadout, &mut self.ctx.flags, blow_combo, weaponry);
        }
    }

    pub fn engage(
        &mut self,
        primary: PrimaryState,
        tick: &Tick<'_>,
        target: Option<SpecialTarget>,
        weaponry: &mut dyn Weaponry,
    ) {
        let ranges = Ranges::of(tick.genome);
        let me = tick.me();
        let loadout = &tick.snapshot.loadout;
        if primary == PrimaryState::Retreat {
            engagement::retreat_engage(&ranges, &me, loadout, tick.enemy, target, &mut self.ctx.flags, weaponry);
        } else {
            engagement::engage(&ranges, &me, loadout, tick.enemy, target, &mut self.ctx.flags, weaponry);
        }
    }

    /// Path finished. Clears the forced destination when we are on it and
    /// frees whichever state owned the path.
    pub fn destination_reached(
        &mut self,
        primary: PrimaryState,
        secondary: SecondaryState,
        me: &Location,
        act: &mut Actuators<'_>,
    ) {
        if let Some(dest) = self.ctx.destination {
            if me.distance(&dest) < DESTINATION_REACHED_RADIUS {
                self.ctx.destination = None;
            }
        }
        if primary == PrimaryState::Greedy {
            self.execution_priority = 0;
        }
        act.navigation.stop();
        if secondary != SecondaryState::Disabled {
            self.ctx.secondary_destination = None;
        } else {
            self.ctx.state_driven_destination = None;
        }
    }

    pub fn stop_execution(&mut self, primary: PrimaryState, secondary: SecondaryState, act: &mut Actuators<'_>) {
        if primary == PrimaryState::Greedy {
            self.execution_priority = 0;
        }
        act.navigation.stop();
        if secondary != SecondaryState::Disabled {
            self.ctx.secondary_destination = None;
        }
        self.ctx.destination = None;
        self.ctx.current_facing = None;
        self.ctx.rotation_time = None;
        self.ctx.flags = CombatFlags::default();
        self.ctx.visited.clear();
    }

    pub fn bot_stuck(&mut self, primary: PrimaryState, secondary: SecondaryState, act: &mut Actuators<'_>) {
        self.stop_execution(primary, secondary, act);
        act.navigation.set_facing(None);
    }

    /// Death also forgets the crouch.
    pub fn died(&mut self, primary: PrimaryState, secondary: SecondaryState, act: &mut Actuators<'_>) {
        self.stop_execution(primary, secondary, act);
        self.ctx.crouched = false;
    }

    /// Turns toward a sound when the opponent is out of sight.
    pub fn hear_noise(&mut self, focus: Location, now: f64, enemy_visible: bool, act: &mut Actuators<'_>) {
        if enemy_visible {
            return;
        }
        if act.navigation.is_executing() {
            act.navigation.set_facing(Some(focus));
        } else {
            act.locomotion.stop();
            act.locomotion.turn_to(focus);
        }
        self.ctx.rotation_time = Some(now);
    }

    /// Same reaction as a noise, ignoring pickups right next to us.
    pub fn hear_pickup(
        &mut self,
        item_location: &Location,
        me: &Location,
        focus: Location,
        now: f64,
        enemy_visible: bool,
        act: &mut Actuators<'_>,
    ) {
        if me.distance(item_location) > SELF_PICKUP_RADIUS {
            self.hear_noise(focus, now, enemy_visible, act);
        }
    }

    /// Shot by someone we cannot see: stop and turn around.
    pub fn damaged(&mut self, direct: bool, enemy_visible: bool, act: &mut Actuators<'_>) {
        if !direct || enemy_visible {
            return;
        }
        if act.navigation.is_executing() {
            act.navigation.stop();
        } else {
            act.locomotion.stop();
        }
        act.locomotion.turn_horizontal(180.0);
    }

    pub fn damage_dealt(&mut self, damage_type: &str) {
        if engagement::is_precision_hit(damage_type) {
            self.ctx.flags.sniper_or_shock_hit = true;
        }
    }

    pub fn enemy_lost(&mut self) {
        self.ctx.flags.sniper_or_shock_hit = false;
    }

    /// Obstacle avoidance from the three forward probes: walk on when they
    /// are clear, otherwise turn away from whatever blocks.
    pub fn reactive_movement(&mut self, rays: &RayScan, motion: &mut dyn Locomotion) {
        let north = rays.blocked(Ray::North);
        let north_east = rays.blocked(Ray::NorthEast);
        let north_west = rays.blocked(Ray::NorthWest);

        let turn = match (north, north_west, north_east) {
            (false, false, false) | (false, true, true) => None,
            (true, true, true) => Some(90.0),
            (true, true, false) | (true, false, false) | (false, true, false) => Some(30.0),
            (true, false, true) | (false, false, true) => Some(-30.0),
        };

        match turn {
            None => {
                motion.move_forward();
                self.ctx.moving = true;
            }
            Some(degrees) => {
                if self.ctx.moving {
                    motion.stop();
                    self.ctx.moving = false;
                }
                motion.turn_horizontal(degrees);
            }
        }
    }
}
