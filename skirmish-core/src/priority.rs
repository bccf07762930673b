//! Item scoring tables.
//!
//! Two independent tables exist: a fixed one used when sweeping visible items
//! (`item_priority`), and a genome-weighted one used to pick a remembered
//! pickup worth a detour (`destination_priority`). Both return `-1` for items
//! that should never be considered.

use crate::genome::{slot, Genome};
use crate::items::{ItemKind, Loadout, WeaponKind};

pub const NOT_CONSIDERED: i32 = -1;

#[derive(Clone, Copy)]
enum HealthBracket {
    Critical,
    Hurt,
    Healthy,
    Boosted,
}

fn bracket(health: i32) -> HealthBracket {
    if health < 70 {
        HealthBracket::Critical
    } else if health < 100 {
        HealthBracket::Hurt
    } else if health < 150 {
        HealthBracket::Healthy
    } else {
        HealthBracket::Boosted
    }
}

/// Fixed priority of a visible item given our health and weaponry.
pub fn item_priority(kind: ItemKind, health: i32, loadout: &Loadout) -> i32 {
    use HealthBracket::*;

    let b = bracket(health);
    match kind {
        ItemKind::MiniHealth => match b {
            Critical => 90,
            Hurt => 65,
            Healthy => 75,
            Boosted => 65,
        },
        ItemKind::HealthPack => match b {
            Critical => 95,
            Hurt => 75,
            Healthy | Boosted => 0,
        },
        ItemKind::SuperShield => 99,
        ItemKind::Shield => match b {
            Critical => 85,
            _ => 98,
        },
        ItemKind::DamageAmplifier => 100,
        ItemKind::Adrenaline => 40,
        ItemKind::Ammo(_) => 20,
        ItemKind::Weapon(weapon) => weapon_priority(weapon, b, loadout),
        ItemKind::Unknown => NOT_CONSIDERED,
    }
}

fn weapon_priority(weapon: WeaponKind, b: HealthBracket, loadout: &Loadout) -> i32 {
    // Columns: critical, hurt, healthy, boosted; missing vs already loaded.
    let (missing, loaded): ([i32; 4], [i32; 4]) = match weapon {
        WeaponKind::BioRifle => ([50, 55, 60, 60], [25, 25, 35, 35]),
        WeaponKind::LinkGun => ([55, 60, 65, 70], [30, 35, 40, 45]),
        WeaponKind::Minigun => ([65, 80, 80, 80], [40, 55, 55, 55]),
        WeaponKind::FlakCannon => ([70, 85, 85, 85], [45, 60, 60, 60]),
        WeaponKind::RocketLauncher => ([60, 70, 70, 75], [35, 45, 45, 50]),
        WeaponKind::ShockRifle => ([80, 95, 95, 95], [55, 80, 80, 80]),
        WeaponKind::SniperRifle => ([75, 90, 90, 90], [50, 65, 65, 65]),
        WeaponKind::ShieldGun | WeaponKind::AssaultRifle => return NOT_CONSIDERED,
    };
    let column = b as usize;
    if loadout.is_loaded(weapon) {
        loaded[column]
    } else {
        missing[column]
    }
}

/// Genome-weighted priority of a remembered pickup.
pub fn destination_priority(genome: &Genome, kind: ItemKind, loadout: &Loadout) -> i32 {
    match kind {
        ItemKind::SuperShield => genome.priority(slot::SUPER_SHIELD_PRIORITY),
        ItemKind::Shield => genome.priority(slot::SHIELD_PRIORITY),
        ItemKind::Weapon(WeaponKind::SniperRifle) if !loadout.is_loaded(WeaponKind::SniperRifle) => {
            genome.priority(slot::LONG_RANGE_PRIORITY)
        }
        ItemKind::Weapon(WeaponKind::ShockRifle) if !loadout.is_loaded(WeaponKind::ShockRifle) => {
            genome.priority(slot::SHOCK_PRIORITY)
        }
        ItemKind::Weapon(WeaponKind::FlakCannon | WeaponKind::RocketLauncher)
            if !loadout.has_weapon(WeaponKind::FlakCannon)
                && !loadout.has_weapon(WeaponKind::RocketLauncher) =>
        {
            genome.priority(slot::HEAVY_PRIORITY)
        }
        ItemKind::Weapon(WeaponKind::Minigun) if !loadout.has_weapon(WeaponKind::Minigun) => {
            genome.priority(slot::MINIGUN_PRIORITY)
        }
        _ => NOT_CONSIDERED,
    }
}
