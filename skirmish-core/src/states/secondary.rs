use super::{MovementOutcome, SecondaryState, StateMachine};
use crate::constants::{BACKOFF_CLEARANCE, OFFENSIVE_CLOSE_IN_RADIUS};
use crate::geometry::Location;
use crate::items::ItemKind;
use crate::world::{Actuators, Direction, Ray, Tick};

impl StateMachine {
    pub(super) fn attempt_secondary(
        &mut self,
        secondary: SecondaryState,
        tick: &Tick<'_>,
        act: &mut Actuators<'_>,
    ) -> MovementOutcome {
        self.ctx.stand_up(act.locomotion);
        match secondary {
            SecondaryState::Disabled => MovementOutcome::NotApplicable,
            SecondaryState::OffensiveProfile => self.close_in(tick, act),
            SecondaryState::DefensiveProfile => back_off(tick, act),
            SecondaryState::PickupWeapon => {
                self.visible_pickup(tick, act, |k| k.weapon().is_some())
            }
            SecondaryState::PickupAmmo => {
                self.visible_pickup(tick, act, |k| matches!(k, ItemKind::Ammo(_)))
            }
            SecondaryState::PickupHealth => self.visible_pickup(tick, act, ItemKind::is_health),
            SecondaryState::CriticalHealth => self.critical_health(tick, act),
            SecondaryState::CriticalWeaponry => self.critical_weaponry(tick, act),
        }
    }

    fn close_in(&mut self, tick: &Tick<'_>, act: &mut Actuators<'_>) -> MovementOutcome {
        let Some(enemy) = tick.enemy else {
            act.locomotion.stop();
            return MovementOutcome::NotApplicable;
        };
        if tick.snapshot.distance_to(&enemy) < OFFENSIVE_CLOSE_IN_RADIUS {
            if act.navigation.is_executing() {
                act.navigation.stop();
            }
            act.locomotion.move_to(enemy);
        } else {
            let drifted = self
                .ctx
                .secondary_destination
                .map_or(true, |d| enemy.distance(&d) > OFFENSIVE_CLOSE_IN_RADIUS);
            if drifted {
                self.ctx.secondary_destination = Some(enemy);
                act.travel(&tick.me(), &enemy);
            }
        }
        MovementOutcome::Done
    }

    /// Nearest visible item of a kind; keeps an earlier pick until it is reached.
    fn visible_pickup(
        &mut self,
        tick: &Tick<'_>,
        act: &mut Actuators<'_>,
        filter: impl Fn(ItemKind) -> bool,
    ) -> MovementOutcome {
        if self.ctx.secondary_destination.is_none() {
            let Some(dest) = tick.snapshot.nearest_visible(filter) else {
                return MovementOutcome::NotApplicable;
            };
            self.head_for(dest, tick, act);
        }
        MovementOutcome::Done
    }

    fn critical_health(&mut self, tick: &Tick<'_>, act: &mut Actuators<'_>) -> MovementOutcome {
        if self.ctx.secondary_destination.is_some() {
            return MovementOutcome::Done;
        }
        let me = tick.me();
        let catalog = tick.catalog;
        let knows_packs = catalog
            .known_items()
            .iter()
            .any(|spot| spot.kind == ItemKind::HealthPack);
        // Big packs cap at 100, so above that only vials help.
        let wanted = if tick.snapshot.health < 100 && knows_packs {
            ItemKind::HealthPack
        } else {
            ItemKind::MiniHealth
        };
        let dest = nearest_spot(
            catalog.spawned(&|k: ItemKind| k == wanted).into_iter().map(|s| s.location),
            &me,
        );
        match dest {
            Some(dest) => {
                self.head_for(dest, tick, act);
                MovementOutcome::Done
            }
            None => MovementOutcome::NotApplicable,
        }
    }

    fn critical_weaponry(&mut self, tick: &Tick<'_>, act: &mut Actuators<'_>) -> MovementOutcome {
        if self.ctx.secondary_destination.is_some() {
            return MovementOutcome::Done;
        }
        let spawned = tick.catalog.spawned(&|k: ItemKind| k.weapon().is_some());
        match nearest_spot(spawned.into_iter().map(|s| s.location), &tick.me()) {
            Some(dest) => {
                self.head_for(dest, tick, act);
                MovementOutcome::Done
            }
            None => MovementOutcome::NotApplicable,
        }
    }

    fn head_for(&mut self, dest: Location, tick: &Tick<'_>, act: &mut Actuators<'_>) {
        self.ctx.secondary_destination = Some(dest);
        act.travel(&tick.me(), &dest);
    }
}

fn nearest_spot(spots: impl Iterator<Item = Location>, me: &Location) -> Option<Location> {
    spots.min_by(|a, b| me.distance(a).total_cmp(&me.distance(b)))
}

/// Gives ground while facing the opponent: straight back if there is room,
/// otherwise the roomier back diagonal, otherwise the roomier side.
fn back_off(tick: &Tick<'_>, act: &mut Actuators<'_>) -> MovementOutcome {
    let Some(enemy) = tick.enemy else {
        return MovementOutcome::NotApplicable;
    };
    if act.navigation.is_executing() {
        act.navigation.stop();
    }
    let Some(rays) = tick.snapshot.rays.as_ref() else {
        return MovementOutcome::Done;
    };
    let me = tick.me();
    let motion = &mut *act.locomotion;

    if rays.clearance(Ray::South, &me) >= BACKOFF_CLEARANCE {
        motion.strafe_to(rays.end(Ray::South), enemy);
        return MovementOutcome::Done;
    }

    let flanks = [(Ray::SouthWest, Ray::SouthEast), (Ray::West, Ray::East)];
    for (left, right) in flanks {
        let l = rays.clearance(left, &me);
        let r = rays.clearance(right, &me);
        if l > BACKOFF_CLEARANCE || r > BACKOFF_CLEARANCE {
            let pick = if l > r { left } else { right };
            motion.strafe_to(rays.end(pick), enemy);
            return MovementOutcome::Done;
        }
    }

    motion.move_forward();
    motion.dodge(Direction::Forward);
    MovementOutcome::Done
}
