//! Weapon choice and fire-mode selection.

use serde::{Deserialize, Serialize};

use crate::constants::{COMBO_MIN_SHOCK_AMMO, HEIGHT_THRESHOLD, SHIELD_GUN_RELOADED_AMMO};
use crate::genome::Genome;
use crate::geometry::{height_band, HeightBand, Location};
use crate::items::{Loadout, WeaponKind};
use crate::world::Weaponry;

/// Damage types that mark a long-range exchange.
const PRECISION_DAMAGE_TYPES: [&str; 2] = ["XWeapons.DamTypeShockBeam", "XWeapons.DamTypeSniperShot"];

pub fn is_precision_hit(damage_type: &str) -> bool {
    PRECISION_DAMAGE_TYPES.contains(&damage_type)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CombatFlags {
    /// We just landed a beam or sniper hit; answer with the shock rifle.
    pub sniper_or_shock_hit: bool,
    pub use_shock_rifle: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A shock core close to the opponent, detonated with a primary shot.
    Combo,
    /// A remembered opponent position fired at blind.
    Spam,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecialTarget {
    pub location: Location,
    pub kind: TargetKind,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FireCommand {
    Primary,
    Secondary,
    /// Secondary mode held for the given number of seconds.
    Charged(f64),
    Hold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ranges {
    pub near: f64,
    pub medium: f64,
    pub far: f64,
}

impl Ranges {
    pub fn of(genome: &Genome) -> Self {
        Self {
            near: genome.near_range(),
            medium: genome.medium_range(),
            far: genome.far_range(),
        }
    }
}

/// Fire mode for shooting at a point we cannot see.
pub fn spam_fire(weapon: WeaponKind, distance: f64, height: HeightBand, r: &Ranges) -> FireCommand {
    use FireCommand::*;
    match weapon {
        WeaponKind::AssaultRifle if distance < r.near => Charged(1.0),
        WeaponKind::AssaultRifle if distance < r.medium => Charged(2.0),
        WeaponKind::AssaultRifle => Charged(3.0),
        WeaponKind::BioRifle if distance < r.near => Charged(1.5),
        WeaponKind::BioRifle => Charged(3.0),
        WeaponKind::LinkGun | WeaponKind::RocketLauncher => Primary,
        WeaponKind::FlakCannon => flak(distance, height, r, false),
        WeaponKind::ShockRifle => Secondary,
        WeaponKind::ShieldGun | WeaponKind::Minigun | WeaponKind::SniperRifle => Hold,
    }
}

/// Fire mode for a visible opponent.
pub fn visible_fire(
    weapon: WeaponKind,
    distance: f64,
    height: HeightBand,
    r: &Ranges,
    secondary_ammo: u32,
) -> FireCommand {
    use FireCommand::*;
    match weapon {
        WeaponKind::AssaultRifle if secondary_ammo > 0 => Primary,
        WeaponKind::AssaultRifle if distance < r.near => Charged(2.0),
        WeaponKind::AssaultRifle => Charged(3.0),
        WeaponKind::BioRifle if distance < r.near => Primary,
        WeaponKind::BioRifle => Charged(3.0),
        WeaponKind::LinkGun if distance < r.medium => Secondary,
        WeaponKind::LinkGun => Primary,
        WeaponKind::Minigun if distance >= r.far => Secondary,
        WeaponKind::Minigun => Primary,
        WeaponKind::FlakCannon => flak(distance, height, r, true),
        WeaponKind::ShieldGun
        | WeaponKind::RocketLauncher
        | WeaponKind::ShockRifle
        | WeaponKind::SniperRifle => Primary,
    }
}

// Flak lobs its secondary shell over height differences past close range.
fn flak(distance: f64, height: HeightBand, r: &Ranges, visible: bool) -> FireCommand {
    use FireCommand::*;
    if distance < r.near || distance >= r.far {
        return Primary;
    }
    if distance < r.medium {
        return match height {
            HeightBand::Level if visible && distance >= r.medium / 2.0 => Secondary,
            HeightBand::Level => Primary,
            HeightBand::Below if visible => Primary,
            _ => Secondary,
        };
    }
    match height {
        HeightBand::Above => Secondary,
        _ => Primary,
    }
}

fn fire(command: FireCommand, target: Location, weaponry: &mut dyn Weaponry) {
    match command {
        FireCommand::Primary => weaponry.shoot_primary(target),
        FireCommand::Secondary => weaponry.shoot_secondary(target),
        FireCommand::Charged(seconds) => weaponry.shoot_secondary_charged(target, seconds),
        FireCommand::Hold => weaponry.stop_shooting(),
    }
}

fn equip(loadout: &Loadout, kind: WeaponKind, weaponry: &mut dyn Weaponry) {
    if loadout.current != Some(kind) {
        weaponry.change_weapon(kind);
    }
}

/// Loaded weapon with the highest genome weight; zero weights never win.
pub fn best_weapon(genome: &Genome, loadout: &Loadout) -> Option<WeaponKind> {
    let mut best = None;
    let mut maximum = 0;
    for kind in loadout.loaded().iter() {
        let weight = genome.weapon_weight(kind);
        if weight > maximum {
            maximum = weight;
            best = Some(kind);
        }
    }
    best
}

pub fn switch_to_best_weapon(
    genome: &Genome,
    loadout: &Loadout,
    flags: &mut CombatFlags,
    blow_combo: bool,
    weaponry: &mut dyn Weaponry,
) {
    if flags.sniper_or_shock_hit && loadout.is_loaded(WeaponKind::ShockRifle) {
        equip(loadout, WeaponKind::ShockRifle, weaponry);
        flags.use_shock_rifle = true;
    } else if blow_combo
        && loadout.has_weapon(WeaponKind::ShockRifle)
        && loadout.ammo(WeaponKind::ShockRifle) >= COMBO_MIN_SHOCK_AMMO
    {
        equip(loadout, WeaponKind::ShockRifle, weaponry);
    } else if let Some(kind) = best_weapon(genome, loadout) {
        equip(loadout, kind, weaponry);
    }
    flags.sniper_or_shock_hit = false;
}

/// While retreating the shield gun stays out until its charge runs dry, and
/// only comes back once it has recharged past the reload mark.
pub fn retreat_switch(
    genome: &Genome,
    loadout: &Loadout,
    flags: &mut CombatFlags,
    reloading: &mut bool,
    blow_combo: bool,
    weaponry: &mut dyn Weaponry,
) {
    let charge = loadout.ammo(WeaponKind::ShieldGun);
    if charge > SHIELD_GUN_RELOADED_AMMO {
        *reloading = false;
    }
    if charge > 0 && !*reloading {
        equip(loadout, WeaponKind::ShieldGun, weaponry);
    } else {
        *reloading = true;
        switch_to_best_weapon(genome, loadout, flags, blow_combo, weaponry);
    }
}

pub fn engage(
    ranges: &Ranges,
    me: &Location,
    loadout: &Loadout,
    enemy: Option<Location>,
    target: Option<SpecialTarget>,
    flags: &mut CombatFlags,
    weaponry: &mut dyn Weaponry,
) {
    if let Some(weapon) = loadout.current {
        if let Some(t) = target {
            match t.kind {
                TargetKind::Combo => weaponry.shoot_primary(t.location),
                TargetKind::Spam => {
                    let height = height_band(me, &t.location, HEIGHT_THRESHOLD);
                    fire(spam_fire(weapon, me.distance(&t.location), height, ranges), t.location, weaponry);
                }
            }
        }
        if let Some(e) = enemy {
            let height = height_band(me, &e, HEIGHT_THRESHOLD);
            let command = visible_fire(weapon, me.distance(&e), height, ranges, loadout.secondary(weapon));
            fire(command, e, weaponry);
        }
    }
    if enemy.is_none() && target.is_none() {
        weaponry.stop_shooting();
    }
    flags.use_shock_rifle = false;
}

/// Retreating with the shield gun out raises the shield toward the threat.
pub fn retreat_engage(
    ranges: &Ranges,
    me: &Location,
    loadout: &Loadout,
    enemy: Option<Location>,
    target: Option<SpecialTarget>,
    flags: &mut CombatFlags,
    weaponry: &mut dyn Weaponry,
) {
    let threat = enemy.or(target.map(|t| t.location));
    match threat {
        Some(point) if loadout.current == Some(WeaponKind::ShieldGun) => {
            weaponry.shoot_secondary(point);
            flags.use_shock_rifle = false;
        }
        Some(_) => engage(ranges, me, loadout, enemy, target, flags, weaponry),
        None => {
            weaponry.stop_shooting();
            flags.use_shock_rifle = false;
        }
    }
}
