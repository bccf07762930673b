//! Recording doubles for the actuator traits.

use crate::geometry::Location;
use crate::items::{ItemId, ItemSpot, WeaponKind};
use crate::world::{Actuators, Direction, ItemCatalog, Locomotion, NavigationService, PathHandle, Weaponry};

#[derive(Clone, Debug, PartialEq)]
pub enum NavCall {
    Follow(Location),
    Stop,
    Facing(Option<Location>),
}

#[derive(Default)]
pub struct RecordingNavigation {
    pub calls: Vec<NavCall>,
    pub executing: bool,
    pub areas: Vec<Location>,
    pub nodes: Vec<Location>,
    /// Destinations for which planning fails.
    pub unreachable: Vec<Location>,
    planned: Vec<Location>,
}

impl RecordingNavigation {
    pub fn with_areas(areas: Vec<Location>) -> Self {
        Self {
            areas,
            ..Self::default()
        }
    }

    pub fn followed(&self) -> Vec<Location> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                NavCall::Follow(to) => Some(*to),
                _ => None,
            })
            .collect()
    }
}

impl NavigationService for RecordingNavigation {
    fn compute_path(&mut self, _from: &Location, to: &Location) -> Option<PathHandle> {
        if self.unreachable.contains(to) {
            return None;
        }
        self.planned.push(*to);
        Some(PathHandle(self.planned.len() as u64 - 1))
    }

    fn follow(&mut self, path: PathHandle) {
        let to = self.planned[path.0 as usize];
        self.calls.push(NavCall::Follow(to));
        self.executing = true;
    }

    fn is_executing(&self) -> bool {
        self.executing
    }

    fn stop(&mut self) {
        self.calls.push(NavCall::Stop);
        self.executing = false;
    }

    fn set_facing(&mut self, focus: Option<Location>) {
        self.calls.push(NavCall::Facing(focus));
    }

    fn areas(&self) -> &[Location] {
        &self.areas
    }

    fn path_nodes(&self) -> &[Location] {
        &self.nodes
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MoveCall {
    StrafeLeft(f64, Option<Location>),
    StrafeRight(f64, Option<Location>),
    StrafeTo(Location, Location),
    Dodge(Direction),
    MoveTo(Location),
    Forward,
    TurnTo(Location),
    Turn(f64),
    Stop,
    Crouch(bool),
}

#[derive(Default)]
pub struct RecordingLocomotion {
    pub calls: Vec<MoveCall>,
}

impl Locomotion for RecordingLocomotion {
    fn strafe_left(&mut self, distance: f64, facing: Option<Location>) {
        self.calls.push(MoveCall::StrafeLeft(distance, facing));
    }

    fn strafe_right(&mut self, distance: f64, facing: Option<Location>) {
        self.calls.push(MoveCall::StrafeRight(distance, facing));
    }

    fn strafe_to(&mut self, point: Location, facing: Location) {
        self.calls.push(MoveCall::StrafeTo(point, facing));
    }

    fn dodge(&mut self, direction: Direction) {
        self.calls.push(MoveCall::Dodge(direction));
    }

    fn move_to(&mut self, point: Location) {
        self.calls.push(MoveCall::MoveTo(point));
    }

    fn move_forward(&mut self) {
        self.calls.push(MoveCall::Forward);
    }

    fn turn_to(&mut self, point: Location) {
        self.calls.push(MoveCall::TurnTo(point));
    }

    fn turn_horizontal(&mut self, degrees: f64) {
        self.calls.push(MoveCall::Turn(degrees));
    }

    fn stop(&mut self) {
        self.calls.push(MoveCall::Stop);
    }

    fn set_crouch(&mut self, crouch: bool) {
        self.calls.push(MoveCall::Crouch(crouch));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GunCall {
    Change(WeaponKind),
    Primary(Location),
    Secondary(Location),
    Charged(Location, f64),
    Stop,
}

#[derive(Default)]
pub struct RecordingWeaponry {
    pub calls: Vec<GunCall>,
}

impl Weaponry for RecordingWeaponry {
    fn change_weapon(&mut self, kind: WeaponKind) {
        self.calls.push(GunCall::Change(kind));
    }

    fn shoot_primary(&mut self, target: Location) {
        self.calls.push(GunCall::Primary(target));
    }

    fn shoot_secondary(&mut self, target: Location) {
        self.calls.push(GunCall::Secondary(target));
    }

    fn shoot_secondary_charged(&mut self, target: Location, seconds: f64) {
        self.calls.push(GunCall::Charged(target, seconds));
    }

    fn stop_shooting(&mut self) {
        self.calls.push(GunCall::Stop);
    }
}

#[derive(Default)]
pub struct Rig {
    pub nav: RecordingNavigation,
    pub motion: RecordingLocomotion,
    pub guns: RecordingWeaponry,
}

impl Rig {
    pub fn actuators(&mut self) -> Actuators<'_> {
        Actuators {
            navigation: &mut self.nav,
            locomotion: &mut self.motion,
            weaponry: &mut self.guns,
        }
    }
}

/// Catalog where every listed item is spawned unless named in `taken`.
#[derive(Default)]
pub struct FixedCatalog {
    pub items: Vec<ItemSpot>,
    pub taken: Vec<ItemId>,
}

impl ItemCatalog for FixedCatalog {
    fn known_items(&self) -> &[ItemSpot] {
        &self.items
    }

    fn is_spawned(&self, id: &ItemId) -> bool {
        !self.taken.contains(id)
    }
}
