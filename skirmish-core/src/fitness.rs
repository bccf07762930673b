use serde::{Deserialize, Serialize};

use crate::genome::MatchStats;

/// Scalar fitness from match statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessModel {
    /// Rewards a positive kill balance in steps, with the damage ratio as a
    /// tie-breaker inside each step.
    #[default]
    Tiered,
    Proportional,
}

impl FitnessModel {
    pub fn evaluate(self, stats: &MatchStats) -> f64 {
        match self {
            Self::Tiered => tiered(stats),
            Self::Proportional => proportional(stats),
        }
    }
}

fn damage_ratio(stats: &MatchStats) -> f64 {
    // No damage taken means no penalty term at all.
    if stats.damage_taken > 0 {
        stats.damage_given as f64 / stats.damage_taken as f64
    } else {
        0.0
    }
}

fn tiered(stats: &MatchStats) -> f64 {
    let balance = stats.balance();
    if balance < 0 {
        if stats.kills == 0 {
            1.0 / stats.deaths as f64
        } else {
            stats.kills as f64 / stats.deaths as f64
        }
    } else if balance == 0 {
        1.5 + damage_ratio(stats)
    } else if balance == 1 {
        3.0 + damage_ratio(stats)
    } else {
        (2 * stats.kills as i64 - stats.deaths as i64) as f64 + damage_ratio(stats)
    }
}

fn proportional(stats: &MatchStats) -> f64 {
    let balance = stats.balance();
    if balance < 0 {
        stats.kills as f64 / stats.deaths as f64
    } else {
        (balance + 1) as f64
    }
}
