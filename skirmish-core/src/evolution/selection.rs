use crate::config::MIN_POPULATION;
use crate::constants::{
    ELITE_COUNT, ROULETTE_CROSSOVER_PROBABILITY, ROULETTE_SCALE,
    SECOND_CHILD_BEST_PARTNER_PROBABILITY,
};
use crate::error::GenomeError;
use crate::fitness::FitnessModel;
use crate::genome::Genome;
use crate::rng::SeededRng;

use super::operators::{mutate, mutation_chance, uniform_crossover};

fn breed(
    a: &Genome,
    b: &Genome,
    rate: f64,
    rng: &mut SeededRng,
) -> Result<Genome, GenomeError> {
    let mut child = uniform_crossover(a, b, rng)?;
    let chance = mutation_chance(&child);
    mutate(&mut child, chance, rate, rng);
    child.normalize();
    Ok(child)
}

/// Keeps the four fittest, breeds the rest and replaces the four worst with
/// fresh random genomes.
pub fn elitist(
    population: &[Genome],
    rate: f64,
    model: FitnessModel,
    rng: &mut SeededRng,
) -> Result<Vec<Genome>, GenomeError> {
    let n = population.len();
    if n < MIN_POPULATION {
        return Err(GenomeError::PopulationTooSmall {
            size: n,
            min: MIN_POPULATION,
        });
    }

    let mut sorted = population.to_vec();
    sorted.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));

    let mut next: Vec<Genome> = Vec::with_capacity(n);
    for rank in 1..=ELITE_COUNT {
        let mut elite = sorted[n - rank].clone();
        elite.reset_stats();
        next.push(elite);
    }

    let partner = rng.range_inclusive(1, 3) as usize;
    let first = breed(&next[0], &next[partner], rate, rng)?;
    next.push(first);

    let partner = if rng.chance(SECOND_CHILD_BEST_PARTNER_PROBABILITY) {
        0
    } else {
        rng.range_inclusive(2, 3) as usize
    };
    let second = breed(&next[1], &next[partner], rate, rng)?;
    next.push(second);

    for individual in (ELITE_COUNT..=n - 7).rev() {
        let partner = distinct_index(individual, n, rng);
        let child = breed(&sorted[individual], &sorted[partner], rate, rng)?;
        next.push(child);
    }

    while next.len() < n {
        next.push(Genome::random(rng, model));
    }
    Ok(next)
}

/// Fitness-proportional survival with 90% crossover, 10% verbatim copy.
pub fn roulette(
    population: &[Genome],
    rate: f64,
    rng: &mut SeededRng,
) -> Result<Vec<Genome>, GenomeError> {
    let n = population.len();
    if n < 2 {
        return Err(GenomeError::PopulationTooSmall { size: n, min: 2 });
    }

    let wheel = Wheel::build(population);
    let mut next = Vec::with_capacity(n);
    for _ in 0..n {
        let a = wheel.spin(rng);
        if rng.chance(ROULETTE_CROSSOVER_PROBABILITY) {
            let b = wheel.spin_other(a, rng);
            next.push(breed(&population[a], &population[b], rate, rng)?);
        } else {
            next.push(population[a].offspring_clone());
        }
    }
    Ok(next)
}

/// Uniform index in `[0, n)` other than `exclude`.
fn distinct_index(exclude: usize, n: usize, rng: &mut SeededRng) -> usize {
    debug_assert!(n > 1);
    let offset = 1 + rng.next_int(n as u32 - 1) as usize;
    (exclude + offset) % n
}

/// Cumulative ladder of fitness scaled by ten and rounded.
struct Wheel {
    ladder: Vec<u64>,
}

const MAX_RESPINS: usize = 64;

impl Wheel {
    fn build(population: &[Genome]) -> Self {
        let mut total = 0u64;
        let ladder = population
            .iter()
            .map(|g| {
                total += (g.fitness().max(0.0) * ROULETTE_SCALE).round() as u64;
                total
            })
            .collect();
        Self { ladder }
    }

    fn total(&self) -> u64 {
        self.ladder.last().copied().unwrap_or(0)
    }

    fn spin(&self, rng: &mut SeededRng) -> usize {
        let total = self.total();
        if total == 0 {
            return rng.next_int(self.ladder.len() as u32) as usize;
        }
        let dice = (rng.next_f64() * (total + 1) as f64) as u64;
        self.ladder
            .iter()
            .position(|step| dice <= *step)
            .unwrap_or(self.ladder.len() - 1)
    }

    fn spin_other(&self, exclude: usize, rng: &mut SeededRng) -> usize {
        for _ in 0..MAX_RESPINS {
            let pick = self.spin(rng);
            if pick != exclude {
                return pick;
            }
        }
        // One genome owns the whole wheel.
        distinct_index(exclude, self.ladder.len(), rng)
    }
}
