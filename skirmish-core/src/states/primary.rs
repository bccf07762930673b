use super::{PrimaryState, StateMachine, VisitedSpots};
use crate::constants::{
    DODGE_CLEARANCE, FRESH_INTEL_WINDOW, GREEDY_HISTORY, HUNT_HISTORY, HUNT_WANDER_HISTORY,
    RETREAT_HISTORY, RETREAT_WANDER_HISTORY, STALE_INTEL_WINDOW, STRAFE_CLEARANCE, STRAFE_DISTANCE,
};
use crate::geometry::{nearest, Location};
use crate::priority::item_priority;
use crate::rng::SeededRng;
use crate::world::{Actuators, Direction, Ray, Tick};

/// Area farthest from the threat among those closer to us than to it.
pub(crate) fn best_run_zone(areas: &[Location], threat: &Location, me: &Location) -> Option<Location> {
    let mut best = None;
    let mut farthest = 0.0;
    for area in areas {
        let from_threat = threat.distance(area);
        if from_threat > farthest && me.distance(area) < from_threat {
            farthest = from_threat;
            best = Some(*area);
        }
    }
    best
}

/// Uniform pick among areas not in the history, or among all areas when
/// every one of them was visited recently.
pub(crate) fn random_area(areas: &[Location], visited: &VisitedSpots, rng: &mut SeededRng) -> Option<Location> {
    let fresh: Vec<Location> = areas.iter().copied().filter(|a| !visited.contains(a)).collect();
    let pool = if fresh.is_empty() { areas.to_vec() } else { fresh };
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.next_int(pool.len() as u32) as usize])
}

impl StateMachine {
    pub(super) fn drive_primary(
        &mut self,
        primary: PrimaryState,
        facing: Option<Location>,
        tick: &Tick<'_>,
        act: &mut Actuators<'_>,
        rng: &mut SeededRng,
    ) {
        if primary != PrimaryState::Camp {
            self.ctx.stand_up(act.locomotion);
        }
        match primary {
            PrimaryState::Attack => self.attack(facing, tick, act, rng),
            PrimaryState::Retreat => self.retreat(tick, act, rng),
            PrimaryState::Hunt => self.hunt(tick, act, rng),
            PrimaryState::Greedy => self.greedy(tick, act),
            PrimaryState::Camp => self.camp(act),
        }
    }

    fn attack(&mut self, facing: Option<Location>, tick: &Tick<'_>, act: &mut Actuators<'_>, rng: &mut SeededRng) {
        if act.navigation.is_executing() {
            act.navigation.stop();
        }
        let Some(rays) = tick.snapshot.rays.as_ref() else {
            return;
        };
        let me = tick.me();
        let east = rays.clearance(Ray::East, &me);
        let west = rays.clearance(Ray::West, &me);
        let motion = &mut *act.locomotion;

        let Some(enemy) = tick.enemy else {
            // Blind: swing side to side.
            if !self.pendulum {
                if west > STRAFE_CLEARANCE {
                    motion.strafe_left(STRAFE_DISTANCE, None);
                } else {
                    motion.strafe_right(STRAFE_DISTANCE, None);
                }
            } else if east > STRAFE_CLEARANCE {
                motion.strafe_right(STRAFE_DISTANCE, None);
            } else {
                motion.strafe_left(STRAFE_DISTANCE, None);
            }
            self.pendulum = !self.pendulum;
            return;
        };

        let focus = Some(facing.unwrap_or(enemy));
        match rng.next_int(100) {
            0..=29 => {
                if west > STRAFE_CLEARANCE {
                    motion.strafe_left(STRAFE_DISTANCE, focus);
                } else {
                    motion.strafe_right(STRAFE_DISTANCE, focus);
                }
            }
            30..=59 => {
                if east > STRAFE_CLEARANCE {
                    motion.strafe_right(STRAFE_DISTANCE, focus);
                } else {
                    motion.strafe_left(STRAFE_DISTANCE, focus);
                }
            }
            60..=79 => motion.dodge(if west > DODGE_CLEARANCE { Direction::Left } else { Direction::Right }),
            _ => motion.dodge(if east > DODGE_CLEARANCE { Direction::Right } else { Direction::Left }),
        }
    }

    fn retreat(&mut self, tick: &Tick<'_>, act: &mut Actuators<'_>, rng: &mut SeededRng) {
        let me = tick.me();
        let threat = tick.enemy.or(tick.belief.last_location);
        if let Some(threat) = threat {
            if tick.belief.elapsed(tick.now()) < FRESH_INTEL_WINDOW {
                let zone = best_run_zone(act.navigation.areas(), &threat, &me);
                if let Some(zone) = zone.filter(|z| Some(*z) != self.ctx.state_driven_destination) {
                    self.ctx.visited.record(zone, RETREAT_HISTORY);
                    self.ctx.state_driven_destination = Some(zone);
                    act.travel(&me, &zone);
                }
            }
        }

        if !act.navigation.is_executing() {
            self.wander(tick, act, rng, RETREAT_WANDER_HISTORY);
        }
    }

    fn hunt(&mut self, tick: &Tick<'_>, act: &mut Actuators<'_>, rng: &mut SeededRng) {
        let me = tick.me();
        if let Some(last) = tick.belief.last_location {
            if Some(last) != self.ctx.state_driven_destination {
                let elapsed = tick.belief.elapsed(tick.now());
                if elapsed < FRESH_INTEL_WINDOW {
                    self.ctx.state_driven_destination = Some(last);
                } else if elapsed < STALE_INTEL_WINDOW {
                    let areas = act.navigation.areas();
                    if let Some(i) = nearest(areas, &last) {
                        self.ctx.state_driven_destination = Some(areas[i]);
                    }
                }
                if let Some(dest) = self.ctx.state_driven_destination {
                    if !self.ctx.visited.contains(&dest) {
                        self.ctx.visited.record(dest, HUNT_HISTORY);
                        act.travel(&me, &dest);
                    }
                }
            }
        }

        if !act.navigation.is_executing() {
            self.wander(tick, act, rng, HUNT_WANDER_HISTORY);
        }
    }

    /// Heads to a random important area; without any, falls back to
    /// probe-driven wandering.
    fn wander(&mut self, tick: &Tick<'_>, act: &mut Actuators<'_>, rng: &mut SeededRng, history: usize) {
        let Some(dest) = random_area(act.navigation.areas(), &self.ctx.visited, rng) else {
            if let Some(rays) = tick.snapshot.rays.as_ref() {
                self.reactive_movement(rays, act.locomotion);
            }
            return;
        };
        self.ctx.visited.record(dest, history);
        self.ctx.state_driven_destination = Some(dest);
        if self.ctx.moving {
            act.locomotion.stop();
            self.ctx.moving = false;
        }
        act.travel(&tick.me(), &dest);
    }

    fn greedy(&mut self, tick: &Tick<'_>, act: &mut Actuators<'_>) {
        let snapshot = tick.snapshot;
        let me = tick.me();

        let mut best: Option<(i32, f64, Location)> = None;
        for item in &snapshot.visible_items {
            let priority = item_priority(item.kind, snapshot.health, &snapshot.loadout);
            let distance = me.distance(&item.location);
            let better = match best {
                None => priority > -1,
                Some((p, d, _)) => priority > p || (priority == p && distance < d),
            };
            if better {
                best = Some((priority, distance, item.location));
            }
        }
        if let Some((priority, _, location)) = best {
            if priority > self.execution_priority {
                self.execution_priority = priority;
                act.travel(&me, &location);
            }
        }

        if !act.navigation.is_executing() {
            let node = act
                .navigation
                .path_nodes()
                .iter()
                .filter(|n| !self.ctx.visited.contains(n))
                .min_by(|a, b| me.distance(a).total_cmp(&me.distance(b)))
                .copied();
            if let Some(node) = node {
                self.ctx.visited.record(node, GREEDY_HISTORY);
                self.execution_priority = 1;
                act.travel(&me, &node);
            }
        }
    }

    /// Holds position crouched; only reactive facing moves us.
    fn camp(&mut self, act: &mut Actuators<'_>) {
        if act.navigation.is_executing() {
            act.navigation.stop();
        }
        if !self.ctx.crouched {
            act.locomotion.stop();
            act.locomotion.set_crouch(true);
            self.ctx.crouched = true;
        }
    }
}
