use serde::{Deserialize, Serialize};

use crate::constants::CHROMOSOME_LEN;
use crate::fitness::FitnessModel;
use crate::items::WeaponKind;
use crate::rng::SeededRng;

/// Semantic slots of the chromosome.
pub mod slot {
    pub const NEAR_RANGE: usize = 0;
    pub const MEDIUM_RANGE: usize = 1;
    pub const FAR_RANGE: usize = 2;
    /// First of nine weapon-advantage weights, in `WeaponKind` order.
    pub const WEAPON_WEIGHTS: usize = 3;
    pub const LOW_HEALTH: usize = 12;
    pub const MID_HEALTH: usize = 13;
    pub const RISK_LOW_HEALTH: usize = 14;
    pub const RISK_MID_AHEAD: usize = 15;
    pub const RISK_MID_EVEN: usize = 16;
    pub const RISK_HIGH_AHEAD: usize = 17;
    pub const RISK_HIGH_EVEN: usize = 18;
    pub const STALE_INTEL: usize = 19;
    pub const SUPER_SHIELD_PRIORITY: usize = 20;
    pub const SHIELD_PRIORITY: usize = 21;
    pub const LONG_RANGE_PRIORITY: usize = 22;
    pub const SHOCK_PRIORITY: usize = 23;
    pub const HEAVY_PRIORITY: usize = 24;
    pub const MINIGUN_PRIORITY: usize = 25;
}

/// Statistics accumulated while one genome is being evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub kills: u32,
    pub deaths: u32,
    pub damage_given: u32,
    pub damage_taken: u32,
}

impl MatchStats {
    pub fn record_kill(&mut self) {
        self.kills += 1;
    }

    pub fn record_death(&mut self) {
        self.deaths += 1;
    }

    pub fn record_damage_given(&mut self, amount: u32) {
        self.damage_given = self.damage_given.saturating_add(amount);
    }

    pub fn record_damage_taken(&mut self, amount: u32) {
        self.damage_taken = self.damage_taken.saturating_add(amount);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn balance(&self) -> i64 {
        self.kills as i64 - self.deaths as i64
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    genes: Vec<u32>,
    #[serde(default)]
    pub stats: MatchStats,
    #[serde(default)]
    pub model: FitnessModel,
}

impl Genome {
    pub fn new(genes: Vec<u32>, model: FitnessModel) -> Self {
        Self {
            genes,
            stats: MatchStats::default(),
            model,
        }
    }

    /// Draws every slot from its documented range, keeping the distance bands
    /// and health thresholds ordered.
    pub fn random(rng: &mut SeededRng, model: FitnessModel) -> Self {
        let mut genes = vec![0; CHROMOSOME_LEN];
        genes[slot::NEAR_RANGE] = rng.range_inclusive(0, 1_200);
        genes[slot::MEDIUM_RANGE] = rng.range_inclusive(genes[slot::NEAR_RANGE], 2_000);
        genes[slot::FAR_RANGE] = rng.range_inclusive(genes[slot::MEDIUM_RANGE], 2_800);
        for weight in &mut genes[slot::WEAPON_WEIGHTS..slot::LOW_HEALTH] {
            *weight = rng.range_inclusive(0, 100);
        }
        genes[slot::LOW_HEALTH] = rng.range_inclusive(0, 100);
        genes[slot::MID_HEALTH] = rng.range_inclusive(genes[slot::LOW_HEALTH], 160);
        genes[slot::RISK_LOW_HEALTH] = rng.range_inclusive(5, 30);
        genes[slot::RISK_MID_AHEAD] = rng.range_inclusive(15, 80);
        genes[slot::RISK_MID_EVEN] = rng.range_inclusive(15, 60);
        genes[slot::RISK_HIGH_AHEAD] = rng.range_inclusive(10, 120);
        genes[slot::RISK_HIGH_EVEN] = rng.range_inclusive(20, 100);
        genes[slot::STALE_INTEL] = rng.range_inclusive(3, 9);
        for weight in &mut genes[slot::SUPER_SHIELD_PRIORITY..CHROMOSOME_LEN] {
            *weight = rng.range_inclusive(0, 100);
        }
        Self::new(genes, model)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn genes(&self) -> &[u32] {
        &self.genes
    }

    /// Panics when `index` is outside the chromosome.
    pub fn gene(&self, index: usize) -> u32 {
        self.genes[index]
    }

    /// Panics when `index` is outside the chromosome.
    pub fn set_gene(&mut self, index: usize, value: u32) {
        self.genes[index] = value;
    }

    pub fn fitness(&self) -> f64 {
        self.model.evaluate(&self.stats)
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Same genes, fresh statistics.
    pub fn offspring_clone(&self) -> Self {
        Self::new(self.genes.clone(), self.model)
    }

    /// Restores `near <= medium <= far` and `low <= mid` health thresholds after
    /// crossover or mutation may have broken them.
    pub fn normalize(&mut self) {
        if self.genes.len() < CHROMOSOME_LEN {
            return;
        }
        self.genes[slot::NEAR_RANGE..=slot::FAR_RANGE].sort_unstable();
        if self.genes[slot::MID_HEALTH] < self.genes[slot::LOW_HEALTH] {
            self.genes.swap(slot::LOW_HEALTH, slot::MID_HEALTH);
        }
    }

    pub fn near_range(&self) -> f64 {
        self.gene(slot::NEAR_RANGE) as f64
    }

    pub fn medium_range(&self) -> f64 {
        self.gene(slot::MEDIUM_RANGE) as f64
    }

    pub fn far_range(&self) -> f64 {
        self.gene(slot::FAR_RANGE) as f64
    }

    pub fn weapon_weight(&self, kind: WeaponKind) -> u32 {
        self.gene(slot::WEAPON_WEIGHTS + kind.index())
    }

    pub fn low_health(&self) -> i32 {
        self.gene(slot::LOW_HEALTH) as i32
    }

    pub fn mid_health(&self) -> i32 {
        self.gene(slot::MID_HEALTH) as i32
    }

    pub fn risk(&self, slot: usize) -> i32 {
        debug_assert!((slot::RISK_LOW_HEALTH..=slot::RISK_HIGH_EVEN).contains(&slot));
        self.gene(slot) as i32
    }

    pub fn stale_intel(&self) -> f64 {
        self.gene(slot::STALE_INTEL) as f64
    }

    pub fn priority(&self, slot: usize) -> i32 {
        debug_assert!((slot::SUPER_SHIELD_PRIORITY..CHROMOSOME_LEN).contains(&slot));
        self.gene(slot) as i32
    }
}
