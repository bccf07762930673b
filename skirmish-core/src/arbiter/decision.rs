//! The primary/secondary decision table.

use crate::arsenal::{ArsenalComparison, Band};
use crate::genome::{slot, Genome};
use crate::states::{PrimaryState as P, SecondaryState as S};

/// Everything the table branches on.
#[derive(Clone, Copy, Debug)]
pub struct Standing {
    pub health: i32,
    pub total: i32,
    pub enemy_health: i32,
    pub enemy_total: i32,
    /// Distance to the opponent when visible.
    pub enemy_distance: Option<f64>,
    /// Seconds since the opponent was last observed.
    pub elapsed: f64,
}

/// Positioning overlay keeping us in `band`, or `Disabled` when our arsenal
/// advantage is below `risk` or we are already where we want to be.
pub fn estimate_profile(genome: &Genome, distance: f64, maximum_profit: u8, risk: u8, band: Band) -> S {
    if maximum_profit < risk {
        return S::Disabled;
    }
    let near = genome.near_range();
    let medium = genome.medium_range();
    let far = genome.far_range();
    match band {
        Band::Close if distance > near / 2.0 => S::OffensiveProfile,
        Band::Medium if distance > far => S::OffensiveProfile,
        Band::Medium if distance < medium / 3.0 => S::DefensiveProfile,
        Band::Far if distance < far / 2.0 => S::DefensiveProfile,
        _ => S::Disabled,
    }
}

pub fn behave(genome: &Genome, arsenal: &ArsenalComparison, s: &Standing) -> (P, S) {
    let profit = arsenal.maximum_profit;
    let fresh = s.elapsed < genome.stale_intel();

    // Engage with a profile when the opponent is visible, else `hidden`.
    let fight = |risk: u8, band: Band, hidden: (P, S)| match s.enemy_distance {
        Some(d) => (P::Attack, estimate_profile(genome, d, profit, risk, band)),
        None => hidden,
    };
    // Retreat on sight, else pick by intel freshness.
    let flee = |fresh_pick: (P, S), stale_pick: (P, S)| match s.enemy_distance {
        Some(_) => (P::Retreat, S::Disabled),
        None if fresh => fresh_pick,
        None => stale_pick,
    };
    let by_intel = |fresh_pick: (P, S), stale_pick: (P, S)| if fresh { fresh_pick } else { stale_pick };

    let offensive = arsenal.offensive_band;
    let defensive = arsenal.defensive_band;

    if s.health < genome.low_health() {
        if s.enemy_health < s.health + genome.risk(slot::RISK_LOW_HEALTH) {
            match profit {
                3 => fight(3, defensive, by_intel((P::Camp, S::Disabled), (P::Hunt, S::PickupHealth))),
                p if p > 3 => fight(3, offensive, by_intel((P::Hunt, S::Disabled), (P::Hunt, S::PickupHealth))),
                _ => flee((P::Retreat, S::Disabled), (P::Greedy, S::Disabled)),
            }
        } else {
            flee((P::Retreat, S::CriticalHealth), (P::Retreat, S::CriticalHealth))
        }
    } else if s.health < genome.mid_health() {
        if s.enemy_total + genome.risk(slot::RISK_MID_AHEAD) < s.total {
            match profit {
                p if p >= 3 => fight(3, offensive, by_intel((P::Hunt, S::Disabled), (P::Hunt, S::PickupHealth))),
                2 => fight(2, offensive, by_intel((P::Retreat, S::Disabled), (P::Greedy, S::CriticalWeaponry))),
                _ => flee((P::Retreat, S::CriticalWeaponry), (P::Greedy, S::CriticalWeaponry)),
            }
        } else if s.enemy_total < s.total + genome.risk(slot::RISK_MID_EVEN) {
            match profit {
                p if p >= 3 => fight(3, defensive, by_intel((P::Hunt, S::Disabled), (P::Hunt, S::PickupHealth))),
                2 => fight(2, offensive, by_intel((P::Retreat, S::Disabled), (P::Greedy, S::Disabled))),
                _ => flee((P::Retreat, S::CriticalWeaponry), (P::Greedy, S::CriticalWeaponry)),
            }
        } else {
            flee((P::Retreat, S::CriticalHealth), (P::Greedy, S::CriticalHealth))
        }
    } else if s.enemy_total + genome.risk(slot::RISK_HIGH_AHEAD) < s.total {
        match profit {
            p if p >= 2 => fight(2, offensive, (P::Hunt, S::Disabled)),
            _ => flee((P::Retreat, S::CriticalWeaponry), (P::Greedy, S::CriticalWeaponry)),
        }
    } else if s.enemy_total < s.total + genome.risk(slot::RISK_HIGH_EVEN) {
        match profit {
            p if p >= 3 => fight(3, defensive, (P::Hunt, S::Disabled)),
            2 => fight(2, defensive, by_intel((P::Retreat, S::Disabled), (P::Greedy, S::Disabled))),
            _ => flee((P::Retreat, S::CriticalWeaponry), (P::Greedy, S::CriticalWeaponry)),
        }
    } else {
        match profit {
            p if p >= 4 => fight(4, defensive, by_intel((P::Camp, S::Disabled), (P::Hunt, S::PickupHealth))),
            3 => fight(3, defensive, by_intel((P::Retreat, S::CriticalHealth), (P::Retreat, S::PickupHealth))),
            _ => (P::Retreat, S::Disabled),
        }
    }
}
