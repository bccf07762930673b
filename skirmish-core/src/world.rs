//! What the host hands the agent every tick, and the actuator/collaborator
//! seams the agent drives.

use serde::{Deserialize, Serialize};

use crate::belief::EnemyBelief;
use crate::genome::Genome;
use crate::geometry::Location;
use crate::items::{ItemId, ItemKind, ItemSpot, Loadout, WeaponKind};

/// The eight horizontal probes cast around the agent, clockwise from its heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ray {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Ray {
    pub const ALL: [Ray; 8] = [
        Ray::North,
        Ray::NorthEast,
        Ray::East,
        Ray::SouthEast,
        Ray::South,
        Ray::SouthWest,
        Ray::West,
        Ray::NorthWest,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    pub end: Location,
    /// The probe touched geometry before reaching full length.
    pub blocked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RayScan {
    pub hits: [RayHit; 8],
}

impl RayScan {
    pub fn hit(&self, ray: Ray) -> &RayHit {
        &self.hits[ray as usize]
    }

    pub fn end(&self, ray: Ray) -> Location {
        self.hit(ray).end
    }

    pub fn clearance(&self, ray: Ray, from: &Location) -> f64 {
        from.distance(&self.hit(ray).end)
    }

    pub fn blocked(&self, ray: Ray) -> bool {
        self.hit(ray).blocked
    }

    /// Unobstructed scan with every ray `reach` units long. Headings are
    /// axis-aligned: north is +x, east is +y.
    pub fn open(origin: Location, reach: f64) -> Self {
        let diag = reach / std::f64::consts::SQRT_2;
        let offsets = [
            (reach, 0.0),
            (diag, diag),
            (0.0, reach),
            (-diag, diag),
            (-reach, 0.0),
            (-diag, -diag),
            (0.0, -reach),
            (diag, -diag),
        ];
        let hits = offsets.map(|(dx, dy)| RayHit {
            end: Location::new(origin.x + dx, origin.y + dy, origin.z),
            blocked: false,
        });
        Self { hits }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: f64,
    pub self_id: String,
    pub health: i32,
    pub armor: i32,
    pub location: Location,
    pub loadout: Loadout,
    /// `None` until the host has its probes set up.
    #[serde(default)]
    pub rays: Option<RayScan>,
    #[serde(default)]
    pub visible_items: Vec<ItemSpot>,
}

impl WorldSnapshot {
    pub fn total(&self) -> i32 {
        self.health + self.armor
    }

    pub fn distance_to(&self, point: &Location) -> f64 {
        self.location.distance(point)
    }

    /// Location of the nearest visible item matching `filter`.
    pub fn nearest_visible(&self, filter: impl Fn(ItemKind) -> bool) -> Option<Location> {
        self.visible_items
            .iter()
            .filter(|spot| filter(spot.kind))
            .map(|spot| spot.location)
            .min_by(|a, b| self.distance_to(a).total_cmp(&self.distance_to(b)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathHandle(pub u64);

pub trait NavigationService {
    /// `None` when no route exists.
    fn compute_path(&mut self, from: &Location, to: &Location) -> Option<PathHandle>;
    fn follow(&mut self, path: PathHandle);
    fn is_executing(&self) -> bool;
    fn stop(&mut self);
    fn set_facing(&mut self, focus: Option<Location>);
    /// Strategically important spots (pickups, chokepoints) on the map.
    fn areas(&self) -> &[Location];
    fn path_nodes(&self) -> &[Location];
}

pub trait Locomotion {
    fn strafe_left(&mut self, distance: f64, facing: Option<Location>);
    fn strafe_right(&mut self, distance: f64, facing: Option<Location>);
    fn strafe_to(&mut self, point: Location, facing: Location);
    fn dodge(&mut self, direction: Direction);
    fn move_to(&mut self, point: Location);
    fn move_forward(&mut self);
    fn turn_to(&mut self, point: Location);
    fn turn_horizontal(&mut self, degrees: f64);
    fn stop(&mut self);
    fn set_crouch(&mut self, crouch: bool);
}

pub trait Weaponry {
    fn change_weapon(&mut self, kind: WeaponKind);
    fn shoot_primary(&mut self, target: Location);
    fn shoot_secondary(&mut self, target: Location);
    fn shoot_secondary_charged(&mut self, target: Location, seconds: f64);
    fn stop_shooting(&mut self);
}

pub trait ItemCatalog {
    fn known_items(&self) -> &[ItemSpot];
    fn is_spawned(&self, id: &ItemId) -> bool;

    /// Known, currently spawned items matching `filter`.
    fn spawned(&self, filter: &dyn Fn(ItemKind) -> bool) -> Vec<&ItemSpot> {
        self.known_items()
            .iter()
            .filter(|spot| filter(spot.kind) && self.is_spawned(&spot.id))
            .collect()
    }
}

/// Read-only inputs shared by every decision in one tick.
#[derive(Clone, Copy)]
pub struct Tick<'a> {
    pub snapshot: &'a WorldSnapshot,
    pub genome: &'a Genome,
    pub belief: &'a EnemyBelief,
    /// Location of the opponent when currently visible.
    pub enemy: Option<Location>,
    pub catalog: &'a dyn ItemCatalog,
}

impl Tick<'_> {
    pub fn now(&self) -> f64 {
        self.snapshot.time
    }

    pub fn me(&self) -> Location {
        self.snapshot.location
    }

    pub fn enemy_distance(&self) -> Option<f64> {
        self.enemy.map(|e| self.snapshot.distance_to(&e))
    }
}

/// Borrowed actuators for one tick.
pub struct Actuators<'a> {
    pub navigation: &'a mut dyn NavigationService,
    pub locomotion: &'a mut dyn Locomotion,
    pub weaponry: &'a mut dyn Weaponry,
}

impl Actuators<'_> {
    /// Plans to `to` and follows it, interrupting any path in progress.
    pub fn travel(&mut self, from: &Location, to: &Location) -> bool {
        let Some(path) = self.navigation.compute_path(from, to) else {
            tracing::debug!(?to, "no path");
            return false;
        };
        if self.navigation.is_executing() {
            self.navigation.stop();
        }
        self.navigation.follow(path);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_scan_reaches_full_length() {
        let origin = Location::new(10.0, 20.0, 0.0);
        let scan = RayScan::open(origin, 300.0);
        for ray in Ray::ALL {
            assert!((scan.clearance(ray, &origin) - 300.0).abs() < 1e-9);
            assert!(!scan.blocked(ray));
        }
        assert_eq!(scan.end(Ray::West), Location::new(10.0, -280.0, 0.0));
    }

    #[test]
    fn nearest_visible_filters_by_kind() {
        let snapshot = WorldSnapshot {
            visible_items: vec![
                ItemSpot {
                    id: "a".into(),
                    kind: ItemKind::HealthPack,
                    location: Location::new(500.0, 0.0, 0.0),
                },
                ItemSpot {
                    id: "b".into(),
                    kind: ItemKind::Weapon(WeaponKind::Minigun),
                    location: Location::new(50.0, 0.0, 0.0),
                },
                ItemSpot {
                    id: "c".into(),
                    kind: ItemKind::MiniHealth,
                    location: Location::new(100.0, 0.0, 0.0),
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            snapshot.nearest_visible(ItemKind::is_health),
            Some(Location::new(100.0, 0.0, 0.0))
        );
        assert_eq!(snapshot.nearest_visible(|k| matches!(k, ItemKind::Ammo(_))), None);
    }
}
