//! Per-band comparison of our loaded weapons against the opponent's believed
//! inventory.

use serde::{Deserialize, Serialize};

use crate::items::{WeaponKind, WeaponSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Close,
    Medium,
    Far,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Close, Band::Medium, Band::Far];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArsenalComparison {
    pub own: [u32; 3],
    pub enemy: [u32; 3],
    /// 1 (far worse) ..= 5 (far better), indexed by `Band`.
    pub ordinals: [u8; 3],
    pub maximum_profit: u8,
    /// First band reaching `maximum_profit`.
    pub offensive_band: Band,
    /// Last band reaching `maximum_profit`.
    pub defensive_band: Band,
}

impl ArsenalComparison {
    pub fn ordinal(&self, band: Band) -> u8 {
        self.ordinals[band.index()]
    }
}

pub fn compare(own_loaded: WeaponSet, enemy: WeaponSet) -> ArsenalComparison {
    let own = [close_score(own_loaded), medium_own(own_loaded), far_score(own_loaded)];
    let theirs = [close_score(enemy), medium_enemy(enemy), far_score(enemy)];

    let mut ordinals = [0u8; 3];
    for band in Band::ALL {
        let i = band.index();
        ordinals[i] = ordinal(own[i] as i32 - theirs[i] as i32);
    }

    let maximum_profit = ordinals.iter().copied().max().unwrap_or(1);
    let offensive_band = Band::ALL
        .into_iter()
        .find(|b| ordinals[b.index()] == maximum_profit)
        .unwrap_or(Band::Close);
    let defensive_band = Band::ALL
        .into_iter()
        .rev()
        .find(|b| ordinals[b.index()] == maximum_profit)
        .unwrap_or(Band::Far);

    ArsenalComparison {
        own,
        enemy: theirs,
        ordinals,
        maximum_profit,
        offensive_band,
        defensive_band,
    }
}

pub fn ordinal(diff: i32) -> u8 {
    match diff {
        -10..=10 => 3,
        11..=30 => 4,
        d if d > 30 => 5,
        -30..=-11 => 2,
        _ => 1,
    }
}

fn explosive(set: WeaponSet) -> bool {
    set.contains(WeaponKind::FlakCannon) || set.contains(WeaponKind::RocketLauncher)
}

fn close_score(set: WeaponSet) -> u32 {
    let sustained = set.contains(WeaponKind::LinkGun) || set.contains(WeaponKind::Minigun);
    match (explosive(set), sustained) {
        (true, true) => 100,
        (true, false) => 90,
        (false, true) => 50,
        (false, false) => 0,
    }
}

fn far_score(set: WeaponSet) -> u32 {
    let sniper = set.contains(WeaponKind::SniperRifle);
    let shock = set.contains(WeaponKind::ShockRifle);
    if sniper && shock {
        100
    } else if sniper {
        90
    } else if shock {
        80
    } else if set.contains(WeaponKind::Minigun) {
        40
    } else {
        0
    }
}

fn medium_own(set: WeaponSet) -> u32 {
    let shock = set.contains(WeaponKind::ShockRifle);
    let mini = set.contains(WeaponKind::Minigun);
    let sniper = set.contains(WeaponKind::SniperRifle);
    if explosive(set) {
        return match (shock, mini, sniper) {
            (true, true, _) => 100,
            (true, false, _) => 95,
            (false, true, _) => 90,
            (false, false, true) => 85,
            _ => 80,
        };
    }
    match (shock, sniper, mini) {
        (true, true, true) => 80,
        (true, true, false) => 75,
        (true, false, true) => 60,
        (true, false, false) => 50,
        (false, true, true) => 40,
        (false, true, false) => 10,
        (false, false, true) => 30,
        (false, false, false) => 0,
    }
}

fn medium_enemy(set: WeaponSet) -> u32 {
    let shock = set.contains(WeaponKind::ShockRifle);
    let mini = set.contains(WeaponKind::Minigun);
    let sniper = set.contains(WeaponKind::SniperRifle);
    if explosive(set) {
        return match (shock, mini, sniper) {
            (true, true, _) => 100,
            (true, false, _) => 90,
            (false, true, _) => 80,
            (false, false, true) => 70,
            _ => 60,
        };
    }
    match (shock, sniper, mini) {
        (true, true, true) => 90,
        (true, true, false) => 60,
        (true, false, true) => 55,
        (true, false, false) => 50,
        (false, true, true) => 40,
        (false, true, false) => 10,
        (false, false, true) => 30,
        (false, false, false) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(kinds: &[WeaponKind]) -> WeaponSet {
        kinds.iter().copied().collect()
    }

    #[test]
    fn ordinal_bands() {
        assert_eq!(ordinal(0), 3);
        assert_eq!(ordinal(10), 3);
        assert_eq!(ordinal(-10), 3);
        assert_eq!(ordinal(11), 4);
        assert_eq!(ordinal(30), 4);
        assert_eq!(ordinal(31), 5);
        assert_eq!(ordinal(-11), 2);
        assert_eq!(ordinal(-30), 2);
        assert_eq!(ordinal(-31), 1);
    }

    #[test]
    fn stacked_loadout_dominates_starting_weapons() {
        let own = set(&[
            WeaponKind::FlakCannon,
            WeaponKind::Minigun,
            WeaponKind::ShockRifle,
            WeaponKind::SniperRifle,
        ]);
        let cmp = compare(own, WeaponSet::starting());
        assert_eq!(cmp.own, [100, 100, 100]);
        assert_eq!(cmp.enemy, [0, 0, 0]);
        assert_eq!(cmp.ordinals, [5, 5, 5]);
        assert_eq!(cmp.maximum_profit, 5);
        assert_eq!(cmp.offensive_band, Band::Close);
        assert_eq!(cmp.defensive_band, Band::Far);
    }

    #[test]
    fn enemy_minigun_counts_at_range() {
        let cmp = compare(WeaponSet::starting(), set(&[WeaponKind::Minigun]));
        assert_eq!(cmp.enemy[Band::Far.index()], 40);
        assert_eq!(cmp.ordinal(Band::Far), 1);
    }

    #[test]
    fn offensive_and_defensive_bands_split_on_plateau() {
        // Close: 90 vs 0, medium: 80 vs 0, far: 0 vs 0.
        let cmp = compare(set(&[WeaponKind::RocketLauncher]), WeaponSet::starting());
        assert_eq!(cmp.ordinals, [5, 5, 3]);
        assert_eq!(cmp.offensive_band, Band::Close);
        assert_eq!(cmp.defensive_band, Band::Medium);
    }

    #[test]
    fn own_and_enemy_medium_tables_differ() {
        let both = set(&[WeaponKind::ShockRifle, WeaponKind::SniperRifle, WeaponKind::Minigun]);
        let cmp = compare(both, both);
        assert_eq!(cmp.own[Band::Medium.index()], 80);
        assert_eq!(cmp.enemy[Band::Medium.index()], 90);
        assert_eq!(cmp.ordinal(Band::Medium), 3);
    }
}
