use serde::{Deserialize, Serialize};

use crate::constants::{
    BELIEF_ARMOR_MAX, BELIEF_HEALTH_INITIAL, BELIEF_HEALTH_MAX, BELIEF_HEALTH_PACK_CAP,
    HEALTH_PACK_POINTS, HEALTH_VIAL_POINTS, SELF_PICKUP_RADIUS, SHIELD_PACK_POINTS,
    SUPER_SHIELD_PACK_POINTS,
};
use crate::geometry::Location;
use crate::items::{ItemKind, WeaponKind, WeaponSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthPickup {
    Vial,
    Pack,
}

/// Best guess of the opponent's state. Only explicit updates change it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyBelief {
    pub health: i32,
    pub armor: i32,
    pub weapons: WeaponSet,
    pub last_location: Option<Location>,
    /// Game time of the last observation, `-1.0` if never observed.
    pub last_seen: f64,
    pub name: String,
}

impl Default for EnemyBelief {
    fn default() -> Self {
        Self {
            health: BELIEF_HEALTH_INITIAL,
            armor: 0,
            weapons: WeaponSet::starting(),
            last_location: None,
            last_seen: -1.0,
            name: String::new(),
        }
    }
}

impl EnemyBelief {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn total(&self) -> i32 {
        self.health + self.armor
    }

    pub fn has_weapon(&self, kind: WeaponKind) -> bool {
        self.weapons.contains(kind)
    }

    /// A `None` location means the observation carried no position; the
    /// timestamp then falls back to "never".
    pub fn update_location(&mut self, location: Option<Location>, time: f64) {
        match location {
            Some(loc) => {
                self.last_location = Some(loc);
                self.last_seen = time;
            }
            None => {
                self.last_location = None;
                self.last_seen = -1.0;
            }
        }
    }

    /// Seconds since the last observation; infinite when never observed.
    pub fn elapsed(&self, now: f64) -> f64 {
        if self.last_seen < 0.0 {
            f64::INFINITY
        } else {
            (now - self.last_seen).abs()
        }
    }

    /// Armor soaks damage first; what is left comes off health.
    pub fn hit(&mut self, damage: i32) {
        let soaked = self.armor - damage;
        if soaked >= 0 {
            self.armor = soaked;
        } else {
            self.armor = 0;
            self.health = (self.health + soaked).max(0);
        }
    }

    pub fn increase_health(&mut self, pickup: HealthPickup) {
        match pickup {
            HealthPickup::Vial => {
                self.health = (self.health + HEALTH_VIAL_POINTS).min(BELIEF_HEALTH_MAX);
            }
            HealthPickup::Pack => {
                if self.health < BELIEF_HEALTH_PACK_CAP {
                    self.health = (self.health + HEALTH_PACK_POINTS).min(BELIEF_HEALTH_PACK_CAP);
                }
            }
        }
    }

    pub fn increase_armor(&mut self, points: i32) {
        self.armor = (self.armor + points).min(BELIEF_ARMOR_MAX);
    }

    /// Records the weapon the opponent was seen holding. Unknown classes are
    /// ignored.
    pub fn update_weapon(&mut self, class_name: &str) {
        if let Some(kind) = WeaponKind::from_class_name(class_name) {
            self.weapons.insert(kind);
        }
    }

    /// Applies a pickup the opponent was heard taking. Pickups within
    /// `SELF_PICKUP_RADIUS` of us are our own and ignored. Returns whether
    /// the belief changed.
    pub fn hear_pickup(
        &mut self,
        kind: ItemKind,
        item_location: Location,
        self_location: &Location,
        time: f64,
    ) -> bool {
        if self_location.distance(&item_location) <= SELF_PICKUP_RADIUS {
            return false;
        }
        match kind {
            ItemKind::Shield => self.increase_armor(SHIELD_PACK_POINTS),
            ItemKind::SuperShield => self.increase_armor(SUPER_SHIELD_PACK_POINTS),
            ItemKind::HealthPack => self.increase_health(HealthPickup::Pack),
            ItemKind::MiniHealth => self.increase_health(HealthPickup::Vial),
            ItemKind::Weapon(weapon) => self.weapons.insert(weapon),
            _ => {}
        }
        self.update_location(Some(item_location), time);
        true
    }

    /// Back to defaults, keeping the opponent's name.
    pub fn reset(&mut self) {
        let name = std::mem::take(&mut self.name);
        *self = Self::new(name);
    }

    pub fn erase_name(&mut self) {
        self.name.clear();
    }
}
