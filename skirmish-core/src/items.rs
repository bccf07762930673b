use serde::{Deserialize, Serialize};

use crate::constants::WEAPON_CATEGORIES;
use crate::geometry::Location;

/// Weapon categories in genome order. The lightning gun shares the sniper slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    ShieldGun,
    AssaultRifle,
    BioRifle,
    LinkGun,
    Minigun,
    FlakCannon,
    RocketLauncher,
    ShockRifle,
    SniperRifle,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; WEAPON_CATEGORIES] = [
        WeaponKind::ShieldGun,
        WeaponKind::AssaultRifle,
        WeaponKind::BioRifle,
        WeaponKind::LinkGun,
        WeaponKind::Minigun,
        WeaponKind::FlakCannon,
        WeaponKind::RocketLauncher,
        WeaponKind::ShockRifle,
        WeaponKind::SniperRifle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Maps an engine weapon class (`XWeapons.FlakCannon`) to its category.
    pub fn from_class_name(name: &str) -> Option<Self> {
        let short = name.rsplit('.').next().unwrap_or(name);
        let short = short.strip_suffix("Pickup").unwrap_or(short);
        match short {
            "ShieldGun" => Some(Self::ShieldGun),
            "AssaultRifle" => Some(Self::AssaultRifle),
            "BioRifle" => Some(Self::BioRifle),
            "LinkGun" => Some(Self::LinkGun),
            "Minigun" => Some(Self::Minigun),
            "FlakCannon" => Some(Self::FlakCannon),
            "RocketLauncher" => Some(Self::RocketLauncher),
            "ShockRifle" => Some(Self::ShockRifle),
            "SniperRifle" | "LightningGun" | "ONSLightningGun" => Some(Self::SniperRifle),
            _ => None,
        }
    }

    pub fn is_explosive(self) -> bool {
        matches!(self, Self::FlakCannon | Self::RocketLauncher)
    }
}

/// Possession flags for the nine categories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSet(u16);

impl WeaponSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Shield gun and assault rifle, which every player spawns with.
    pub fn starting() -> Self {
        let mut set = Self::empty();
        set.insert(WeaponKind::ShieldGun);
        set.insert(WeaponKind::AssaultRifle);
        set
    }

    pub fn contains(&self, kind: WeaponKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    pub fn insert(&mut self, kind: WeaponKind) {
        self.0 |= 1 << kind.index();
    }

    pub fn iter(&self) -> impl Iterator<Item = WeaponKind> + '_ {
        WeaponKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

impl FromIterator<WeaponKind> for WeaponSet {
    fn from_iter<I: IntoIterator<Item = WeaponKind>>(iter: I) -> Self {
        let mut set = Self::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "weapon")]
pub enum ItemKind {
    MiniHealth,
    HealthPack,
    SuperShield,
    Shield,
    DamageAmplifier,
    Adrenaline,
    Ammo(WeaponKind),
    Weapon(WeaponKind),
    Unknown,
}

impl ItemKind {
    /// Maps an engine pickup class (`XPickups.ShieldPack`, `XWeapons.MinigunPickup`,
    /// `XWeapons.FlakAmmoPickup`) to an item kind.
    pub fn from_pickup_class(name: &str) -> Self {
        let short = name.rsplit('.').next().unwrap_or(name);
        match short {
            "MiniHealthPack" => return Self::MiniHealth,
            "HealthPack" => return Self::HealthPack,
            "SuperShieldPack" => return Self::SuperShield,
            "ShieldPack" => return Self::Shield,
            "UDamagePack" => return Self::DamageAmplifier,
            "AdrenalinePickup" => return Self::Adrenaline,
            _ => {}
        }
        if let Some(weapon) = short.strip_suffix("AmmoPickup") {
            return ammo_owner(weapon).map_or(Self::Unknown, Self::Ammo);
        }
        WeaponKind::from_class_name(short).map_or(Self::Unknown, Self::Weapon)
    }

    pub fn is_armor(self) -> bool {
        matches!(self, Self::SuperShield | Self::Shield)
    }

    pub fn is_health(self) -> bool {
        matches!(self, Self::MiniHealth | Self::HealthPack)
    }

    pub fn weapon(self) -> Option<WeaponKind> {
        match self {
            Self::Weapon(kind) => Some(kind),
            _ => None,
        }
    }
}

fn ammo_owner(prefix: &str) -> Option<WeaponKind> {
    match prefix {
        "Assault" => Some(WeaponKind::AssaultRifle),
        "Bio" => Some(WeaponKind::BioRifle),
        "Link" => Some(WeaponKind::LinkGun),
        "Minigun" => Some(WeaponKind::Minigun),
        "Flak" => Some(WeaponKind::FlakCannon),
        "Rocket" => Some(WeaponKind::RocketLauncher),
        "ShockRifle" | "Shock" => Some(WeaponKind::ShockRifle),
        "Sniper" | "Lightning" => Some(WeaponKind::SniperRifle),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A pickup point on the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSpot {
    pub id: ItemId,
    pub kind: ItemKind,
    pub location: Location,
}

/// Own weaponry as reported by the host each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub owned: WeaponSet,
    pub primary_ammo: [u32; WEAPON_CATEGORIES],
    pub secondary_ammo: [u32; WEAPON_CATEGORIES],
    pub current: Option<WeaponKind>,
}

impl Loadout {
    pub fn has_weapon(&self, kind: WeaponKind) -> bool {
        self.owned.contains(kind)
    }

    pub fn ammo(&self, kind: WeaponKind) -> u32 {
        self.primary_ammo[kind.index()]
    }

    pub fn secondary(&self, kind: WeaponKind) -> u32 {
        self.secondary_ammo[kind.index()]
    }

    /// Owned and holding primary ammunition.
    pub fn is_loaded(&self, kind: WeaponKind) -> bool {
        self.has_weapon(kind) && self.ammo(kind) > 0
    }

    pub fn loaded(&self) -> WeaponSet {
        WeaponKind::ALL
            .into_iter()
            .filter(|k| self.is_loaded(*k))
            .collect()
    }

    /// Adds a weapon with the given primary ammo; handy for hosts and tests.
    pub fn with(mut self, kind: WeaponKind, ammo: u32) -> Self {
        self.owned.insert(kind);
        self.primary_ammo[kind.index()] = ammo;
        self
    }

    pub fn holding(mut self, kind: WeaponKind) -> Self {
        self.current = Some(kind);
        self
    }
}
