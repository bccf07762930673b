pub const CHROMOSOME_LEN: usize = 26;
pub const WEAPON_CATEGORIES: usize = 9;

pub const POPULATION_SIZE_DEFAULT: usize = 30;
pub const GENERATION_LIMIT_DEFAULT: u32 = 50;
pub const ELITE_COUNT: usize = 4;
pub const MUTATION_RATE_DEFAULT: f64 = 0.1;
pub const ROULETTE_CROSSOVER_PROBABILITY: f64 = 0.9;
pub const ROULETTE_SCALE: f64 = 10.0;
pub const SECOND_CHILD_BEST_PARTNER_PROBABILITY: f64 = 0.33;

pub const BELIEF_HEALTH_INITIAL: i32 = 100;
pub const BELIEF_HEALTH_MAX: i32 = 199;
pub const BELIEF_HEALTH_PACK_CAP: i32 = 100;
pub const BELIEF_ARMOR_MAX: i32 = 150;
pub const HEALTH_VIAL_POINTS: i32 = 5;
pub const HEALTH_PACK_POINTS: i32 = 25;
pub const SHIELD_PACK_POINTS: i32 = 50;
pub const SUPER_SHIELD_PACK_POINTS: i32 = 100;
/// Pickups heard closer than this are assumed to be our own.
pub const SELF_PICKUP_RADIUS: f64 = 200.0;

pub const HEIGHT_THRESHOLD: f64 = 200.0;
pub const COMBO_RADIUS: f64 = 600.0;
pub const OFFENSIVE_CLOSE_IN_RADIUS: f64 = 600.0;
pub const DESTINATION_REACHED_RADIUS: f64 = 50.0;

pub const FRESH_INTEL_WINDOW: f64 = 10.0;
pub const STALE_INTEL_WINDOW: f64 = 20.0;
pub const REACTIVE_FACING_TIMEOUT: f64 = 2.0;
pub const NOISE_FOCUS_REACH: f64 = 500.0;

pub const STRAFE_DISTANCE: f64 = 200.0;
pub const STRAFE_CLEARANCE: f64 = 200.0;
pub const DODGE_CLEARANCE: f64 = 400.0;
pub const BACKOFF_CLEARANCE: f64 = 400.0;

pub const RETREAT_HISTORY: usize = 1;
pub const RETREAT_WANDER_HISTORY: usize = 2;
pub const HUNT_HISTORY: usize = 1;
pub const HUNT_WANDER_HISTORY: usize = 6;
pub const GREEDY_HISTORY: usize = 5;

pub const SHIELD_GUN_RELOADED_AMMO: u32 = 50;
pub const COMBO_MIN_SHOCK_AMMO: u32 = 5;
