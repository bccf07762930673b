use super::primary::{best_run_zone, random_area};
use super::*;
use crate::belief::EnemyBelief;
use crate::constants::CHROMOSOME_LEN;
use crate::fitness::FitnessModel;
use crate::genome::{slot, Genome};
use crate::items::{ItemId, ItemKind, ItemSpot};
use crate::testing::{FixedCatalog, MoveCall, NavCall, Rig};
use crate::world::{Direction, WorldSnapshot};

const ORIGIN: Location = Location::new(0.0, 0.0, 0.0);

fn at(x: f64, y: f64) -> Location {
    Location::new(x, y, 0.0)
}

fn spot(id: &str, kind: ItemKind, location: Location) -> ItemSpot {
    ItemSpot {
        id: ItemId::from(id),
        kind,
        location,
    }
}

struct Scene {
    snapshot: WorldSnapshot,
    genome: Genome,
    belief: EnemyBelief,
    catalog: FixedCatalog,
}

impl Scene {
    fn new() -> Self {
        let mut genes = vec![50; CHROMOSOME_LEN];
        genes[slot::NEAR_RANGE] = 100;
        genes[slot::MEDIUM_RANGE] = 500;
        genes[slot::FAR_RANGE] = 1000;
        Self {
            snapshot: WorldSnapshot {
                time: 10.0,
                health: 100,
                ..WorldSnapshot::default()
            },
            genome: Genome::new(genes, FitnessModel::Tiered),
            belief: EnemyBelief::default(),
            catalog: FixedCatalog::default(),
        }
    }

    fn with_open_rays(mut self) -> Self {
        self.snapshot.rays = Some(RayScan::open(self.snapshot.location, 1_000.0));
        self
    }

    fn tick(&self, enemy: Option<Location>) -> Tick<'_> {
        Tick {
            snapshot: &self.snapshot,
            genome: &self.genome,
            belief: &self.belief,
            enemy,
            catalog: &self.catalog,
        }
    }
}

fn step(
    machine: &mut StateMachine,
    scene: &Scene,
    rig: &mut Rig,
    primary: PrimaryState,
    secondary: SecondaryState,
    enemy: Option<Location>,
) {
    let mut rng = SeededRng::new(7);
    machine.execute_movement(
        primary,
        secondary,
        None,
        enemy,
        &scene.tick(enemy),
        &mut rig.actuators(),
        &mut rng,
    );
}

#[test]
fn visited_history_drops_oldest_at_cap() {
    let mut visited = VisitedSpots::default();
    visited.record(at(1.0, 0.0), 2);
    visited.record(at(2.0, 0.0), 2);
    visited.record(at(3.0, 0.0), 2);
    assert_eq!(visited.len(), 2);
    assert!(!visited.contains(&at(1.0, 0.0)));
    assert!(visited.contains(&at(3.0, 0.0)));

    visited.record(at(4.0, 0.0), 1);
    assert_eq!(visited.iter().copied().collect::<Vec<_>>(), vec![at(3.0, 0.0), at(4.0, 0.0)]);
}

#[test]
fn run_zone_keeps_us_between_area_and_threat() {
    let areas = [at(600.0, 0.0), at(-700.0, 0.0), at(300.0, 0.0)];
    assert_eq!(best_run_zone(&areas, &at(-500.0, 0.0), &ORIGIN), Some(at(600.0, 0.0)));
    assert_eq!(best_run_zone(&[at(-600.0, 0.0)], &at(-500.0, 0.0), &ORIGIN), None);
}

#[test]
fn random_area_prefers_unvisited_spots() {
    let areas = [at(1.0, 0.0), at(2.0, 0.0)];
    let mut visited = VisitedSpots::default();
    visited.record(at(1.0, 0.0), 6);
    let mut rng = SeededRng::new(3);
    for _ in 0..10 {
        assert_eq!(random_area(&areas, &visited, &mut rng), Some(at(2.0, 0.0)));
    }
    visited.record(at(2.0, 0.0), 6);
    assert!(random_area(&areas, &visited, &mut rng).is_some());
    assert_eq!(random_area(&[], &visited, &mut rng), None);
}

#[test]
fn forced_destination_overrides_the_overlay() {
    let scene = Scene::new();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();
    let mut rng = SeededRng::new(1);
    let dest = at(800.0, 0.0);

    for _ in 0..2 {
        machine.execute_movement(
            PrimaryState::Hunt,
            SecondaryState::PickupHealth,
            Some(dest),
            None,
            &scene.tick(None),
            &mut rig.actuators(),
            &mut rng,
        );
    }
    assert_eq!(rig.nav.followed(), vec![dest]);
    assert_eq!(machine.context().destination, Some(dest));
    assert!(machine.context().secondary_destination.is_none());
}

#[test]
fn inapplicable_overlay_falls_back_to_primary() {
    let mut scene = Scene::new();
    let last = at(700.0, 100.0);
    scene.belief.update_location(Some(last), 8.0);
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Hunt, SecondaryState::OffensiveProfile, None);

    assert_eq!(rig.motion.calls, vec![MoveCall::Stop]);
    assert_eq!(rig.nav.followed(), vec![last]);
    assert_eq!(machine.context().state_driven_destination, Some(last));
}

#[test]
fn hunt_on_stale_intel_checks_the_nearest_area() {
    let mut scene = Scene::new();
    scene.snapshot.time = 15.0;
    scene.belief.update_location(Some(at(900.0, 0.0)), 0.0);
    let mut rig = Rig::default();
    rig.nav.areas = vec![at(100.0, 0.0), at(1_000.0, 0.0)];
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Hunt, SecondaryState::Disabled, None);
    assert_eq!(rig.nav.followed(), vec![at(1_000.0, 0.0)]);
}

#[test]
fn hunt_without_intel_wanders_between_areas() {
    let scene = Scene::new();
    let mut rig = Rig::default();
    rig.nav.areas = vec![at(100.0, 0.0), at(200.0, 0.0), at(300.0, 0.0)];
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Hunt, SecondaryState::Disabled, None);
    let followed = rig.nav.followed();
    assert_eq!(followed.len(), 1);
    assert!(rig.nav.areas.contains(&followed[0]));
    assert_eq!(machine.context().visited.len(), 1);
}

#[test]
fn wandering_without_areas_uses_the_probes() {
    let scene = Scene::new().with_open_rays();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Hunt, SecondaryState::Disabled, None);
    assert_eq!(rig.motion.calls, vec![MoveCall::Forward]);
    assert!(machine.context().moving);
}

#[test]
fn retreat_runs_away_from_fresh_threat() {
    let mut scene = Scene::new();
    let threat = at(-500.0, 0.0);
    scene.belief.update_location(Some(threat), 10.0);
    let mut rig = Rig::default();
    rig.nav.areas = vec![at(600.0, 0.0), at(-700.0, 0.0), at(300.0, 0.0)];
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Retreat, SecondaryState::Disabled, None);
    assert_eq!(rig.nav.followed(), vec![at(600.0, 0.0)]);
}

#[test]
fn blind_attack_swings_like_a_pendulum() {
    let scene = Scene::new().with_open_rays();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Attack, SecondaryState::Disabled, None);
    step(&mut machine, &scene, &mut rig, PrimaryState::Attack, SecondaryState::Disabled, None);
    assert_eq!(
        rig.motion.calls,
        vec![MoveCall::StrafeLeft(200.0, None), MoveCall::StrafeRight(200.0, None)]
    );
}

#[test]
fn visible_attack_strafes_or_dodges_facing_the_enemy() {
    let scene = Scene::new().with_open_rays();
    let enemy = at(500.0, 0.0);
    let mut rig = Rig::default();
    rig.nav.executing = true;
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Attack, SecondaryState::Disabled, Some(enemy));

    assert_eq!(rig.nav.calls, vec![NavCall::Stop, NavCall::Facing(Some(enemy))]);
    assert_eq!(rig.motion.calls.len(), 1);
    match &rig.motion.calls[0] {
        MoveCall::StrafeLeft(d, focus) | MoveCall::StrafeRight(d, focus) => {
            assert_eq!(*d, 200.0);
            assert_eq!(*focus, Some(enemy));
        }
        MoveCall::Dodge(dir) => assert!(matches!(dir, Direction::Left | Direction::Right)),
        other => panic!("unexpected move {other:?}"),
    }
}

#[test]
fn camp_crouches_once_and_other_states_stand_up() {
    let scene = Scene::new();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Camp, SecondaryState::Disabled, None);
    step(&mut machine, &scene, &mut rig, PrimaryState::Camp, SecondaryState::Disabled, None);
    assert!(machine.context().crouched);
    step(&mut machine, &scene, &mut rig, PrimaryState::Hunt, SecondaryState::Disabled, None);

    assert_eq!(
        rig.motion.calls,
        vec![MoveCall::Stop, MoveCall::Crouch(true), MoveCall::Crouch(false)]
    );
    assert!(!machine.context().crouched);
}

#[test]
fn greedy_chases_the_best_visible_item() {
    let mut scene = Scene::new();
    scene.snapshot.health = 50;
    scene.snapshot.visible_items = vec![
        spot("vial", ItemKind::MiniHealth, at(300.0, 0.0)),
        spot("pack", ItemKind::HealthPack, at(500.0, 0.0)),
    ];
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Greedy, SecondaryState::Disabled, None);
    step(&mut machine, &scene, &mut rig, PrimaryState::Greedy, SecondaryState::Disabled, None);
    assert_eq!(rig.nav.followed(), vec![at(500.0, 0.0)]);
    assert_eq!(machine.execution_priority(), 95);
}

#[test]
fn greedy_walks_to_nearest_unvisited_node() {
    let scene = Scene::new();
    let mut rig = Rig::default();
    rig.nav.nodes = vec![at(100.0, 0.0), at(50.0, 0.0), at(400.0, 0.0)];
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Greedy, SecondaryState::Disabled, None);
    rig.nav.executing = false;
    step(&mut machine, &scene, &mut rig, PrimaryState::Greedy, SecondaryState::Disabled, None);

    assert_eq!(rig.nav.followed(), vec![at(50.0, 0.0), at(100.0, 0.0)]);
    assert_eq!(machine.execution_priority(), 1);
}

#[test]
fn offensive_profile_closes_in() {
    let scene = Scene::new();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    let near = at(300.0, 0.0);
    step(&mut machine, &scene, &mut rig, PrimaryState::Attack, SecondaryState::OffensiveProfile, Some(near));
    assert_eq!(rig.motion.calls, vec![MoveCall::MoveTo(near)]);

    let far = at(2_000.0, 0.0);
    step(&mut machine, &scene, &mut rig, PrimaryState::Attack, SecondaryState::OffensiveProfile, Some(far));
    step(&mut machine, &scene, &mut rig, PrimaryState::Attack, SecondaryState::OffensiveProfile, Some(at(2_100.0, 0.0)));
    assert_eq!(rig.nav.followed(), vec![far]);
}

#[test]
fn defensive_profile_backs_straight_off_when_there_is_room() {
    let scene = Scene::new().with_open_rays();
    let enemy = at(300.0, 0.0);
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Attack, SecondaryState::DefensiveProfile, Some(enemy));
    assert_eq!(rig.motion.calls, vec![MoveCall::StrafeTo(at(-1_000.0, 0.0), enemy)]);
}

#[test]
fn defensive_profile_picks_the_roomier_flank() {
    let mut scene = Scene::new();
    let mut rays = RayScan::open(ORIGIN, 1_000.0);
    rays.hits[Ray::South as usize].end = at(-100.0, 0.0);
    rays.hits[Ray::SouthWest as usize].end = at(-100.0, -100.0);
    rays.hits[Ray::SouthEast as usize].end = at(-100.0, 100.0);
    rays.hits[Ray::West as usize].end = at(0.0, -300.0);
    rays.hits[Ray::East as usize].end = at(0.0, 700.0);
    scene.snapshot.rays = Some(rays.clone());
    let enemy = at(300.0, 0.0);
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Attack, SecondaryState::DefensiveProfile, Some(enemy));
    assert_eq!(rig.motion.calls, vec![MoveCall::StrafeTo(at(0.0, 700.0), enemy)]);

    rays.hits[Ray::East as usize].end = at(0.0, 100.0);
    scene.snapshot.rays = Some(rays);
    rig.motion.calls.clear();
    step(&mut machine, &scene, &mut rig, PrimaryState::Attack, SecondaryState::DefensiveProfile, Some(enemy));
    assert_eq!(rig.motion.calls, vec![MoveCall::Forward, MoveCall::Dodge(Direction::Forward)]);
}

#[test]
fn critical_health_heads_for_the_nearest_spawned_pack() {
    let mut scene = Scene::new();
    scene.snapshot.health = 80;
    scene.catalog.items = vec![
        spot("far-pack", ItemKind::HealthPack, at(900.0, 0.0)),
        spot("near-pack", ItemKind::HealthPack, at(300.0, 0.0)),
        spot("vial", ItemKind::MiniHealth, at(100.0, 0.0)),
    ];
    scene.catalog.taken = vec![ItemId::from("near-pack")];
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Retreat, SecondaryState::CriticalHealth, None);
    assert_eq!(rig.nav.followed(), vec![at(900.0, 0.0)]);
    assert_eq!(machine.context().secondary_destination, Some(at(900.0, 0.0)));

    let mut healthy = Scene::new();
    healthy.snapshot.health = 150;
    healthy.catalog.items = scene.catalog.items.clone();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();
    step(&mut machine, &healthy, &mut rig, PrimaryState::Retreat, SecondaryState::CriticalHealth, None);
    assert_eq!(rig.nav.followed(), vec![at(100.0, 0.0)]);
}

#[test]
fn critical_weaponry_without_known_weapons_falls_back() {
    let scene = Scene::new();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Camp, SecondaryState::CriticalWeaponry, None);
    assert!(rig.nav.followed().is_empty());
    assert!(rig.motion.calls.contains(&MoveCall::Crouch(true)));
}

#[test]
fn pickup_weapon_needs_a_visible_weapon() {
    let mut scene = Scene::new();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();
    step(&mut machine, &scene, &mut rig, PrimaryState::Camp, SecondaryState::PickupWeapon, None);
    assert!(machine.context().secondary_destination.is_none());

    scene.snapshot.visible_items = vec![spot(
        "flak",
        ItemKind::Weapon(crate::items::WeaponKind::FlakCannon),
        at(250.0, 0.0),
    )];
    step(&mut machine, &scene, &mut rig, PrimaryState::Camp, SecondaryState::PickupWeapon, None);
    assert_eq!(rig.nav.followed(), vec![at(250.0, 0.0)]);
}

#[test]
fn reaching_the_forced_destination_clears_it() {
    let scene = Scene::new();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();
    let mut rng = SeededRng::new(1);
    let dest = at(30.0, 0.0);
    machine.execute_movement(
        PrimaryState::Greedy,
        SecondaryState::Disabled,
        Some(dest),
        None,
        &scene.tick(None),
        &mut rig.actuators(),
        &mut rng,
    );

    machine.destination_reached(PrimaryState::Greedy, SecondaryState::Disabled, &ORIGIN, &mut rig.actuators());
    assert!(machine.context().destination.is_none());
    assert_eq!(machine.execution_priority(), 0);
    assert_eq!(rig.nav.calls.last(), Some(&NavCall::Stop));
}

#[test]
fn noise_turns_us_until_the_reactive_facing_expires() {
    let mut scene = Scene::new();
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();
    let noise = at(0.0, 500.0);

    machine.hear_noise(noise, 10.0, true, &mut rig.actuators());
    assert!(rig.motion.calls.is_empty());

    machine.hear_noise(noise, 10.0, false, &mut rig.actuators());
    assert_eq!(rig.motion.calls, vec![MoveCall::Stop, MoveCall::TurnTo(noise)]);
    assert_eq!(machine.context().rotation_time, Some(10.0));

    scene.snapshot.time = 11.0;
    step(&mut machine, &scene, &mut rig, PrimaryState::Camp, SecondaryState::Disabled, None);
    assert!(rig.nav.calls.is_empty());

    scene.snapshot.time = 12.5;
    step(&mut machine, &scene, &mut rig, PrimaryState::Camp, SecondaryState::Disabled, None);
    assert_eq!(rig.nav.calls, vec![NavCall::Facing(None)]);
    assert!(machine.context().rotation_time.is_none());
}

#[test]
fn own_pickups_are_not_turned_towards() {
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();
    rig.nav.executing = true;

    let item = at(100.0, 0.0);
    machine.hear_pickup(&item, &ORIGIN, item, 3.0, false, &mut rig.actuators());
    assert!(rig.nav.calls.is_empty());

    let item = at(900.0, 0.0);
    machine.hear_pickup(&item, &ORIGIN, item, 3.0, false, &mut rig.actuators());
    assert_eq!(rig.nav.calls, vec![NavCall::Facing(Some(item))]);
}

#[test]
fn direct_damage_from_the_dark_turns_us_around() {
    let mut rig = Rig::default();
    let mut machine = StateMachine::new();

    machine.damaged(false, false, &mut rig.actuators());
    machine.damaged(true, true, &mut rig.actuators());
    assert!(rig.motion.calls.is_empty());

    rig.nav.executing = true;
    machine.damaged(true, false, &mut rig.actuators());
    assert_eq!(rig.nav.calls, vec![NavCall::Stop]);
    assert_eq!(rig.motion.calls, vec![MoveCall::Turn(180.0)]);
}

#[test]
fn precision_hits_raise_the_shock_flag_until_the_enemy_is_lost() {
    let mut machine = StateMachine::new();
    machine.damage_dealt("XWeapons.DamTypeFlakChunk");
    assert!(!machine.flags().sniper_or_shock_hit);
    machine.damage_dealt("XWeapons.DamTypeSniperShot");
    assert!(machine.flags().sniper_or_shock_hit);
    machine.enemy_lost();
    assert!(!machine.flags().sniper_or_shock_hit);
}

#[test]
fn stuck_and_death_reset_scratch() {
    let scene = Scene::new();
    let mut rig = Rig::default();
    rig.nav.areas = vec![at(100.0, 0.0)];
    let mut machine = StateMachine::new();

    step(&mut machine, &scene, &mut rig, PrimaryState::Hunt, SecondaryState::Disabled, None);
    assert_eq!(machine.context().visited.len(), 1);
    machine.bot_stuck(PrimaryState::Hunt, SecondaryState::Disabled, &mut rig.actuators());
    assert!(machine.context().visited.is_empty());
    assert_eq!(rig.nav.calls.last(), Some(&NavCall::Facing(None)));

    step(&mut machine, &scene, &mut rig, PrimaryState::Camp, SecondaryState::Disabled, None);
    assert!(machine.context().crouched);
    machine.died(PrimaryState::Camp, SecondaryState::Disabled, &mut rig.actuators());
    assert!(!machine.context().crouched);
    assert!(machine.context().destination.is_none());
}

#[test]
fn reactive_movement_turns_away_from_blocked_probes() {
    let mut machine = StateMachine::new();
    let mut motion = crate::testing::RecordingLocomotion::default();
    let mut rays = RayScan::open(ORIGIN, 500.0);

    machine.reactive_movement(&rays, &mut motion);
    rays.hits[Ray::North as usize].blocked = true;
    machine.reactive_movement(&rays, &mut motion);
    rays.hits[Ray::NorthEast as usize].blocked = true;
    rays.hits[Ray::NorthWest as usize].blocked = true;
    machine.reactive_movement(&rays, &mut motion);
    rays.hits[Ray::North as usize].blocked = false;
    rays.hits[Ray::NorthWest as usize].blocked = false;
    machine.reactive_movement(&rays, &mut motion);

    assert_eq!(
        motion.calls,
        vec![
            MoveCall::Forward,
            MoveCall::Stop,
            MoveCall::Turn(30.0),
            MoveCall::Turn(90.0),
            MoveCall::Turn(-30.0),
        ]
    );
}
