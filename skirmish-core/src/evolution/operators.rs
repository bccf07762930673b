use crate::error::GenomeError;
use crate::genome::Genome;
use crate::rng::SeededRng;

/// Uniform crossover: every gene comes from either parent with equal odds.
///
/// Parents of different length point at a configuration bug and are rejected.
pub fn uniform_crossover(
    a: &Genome,
    b: &Genome,
    rng: &mut SeededRng,
) -> Result<Genome, GenomeError> {
    if a.len() != b.len() {
        return Err(GenomeError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let genes = a
        .genes()
        .iter()
        .zip(b.genes())
        .map(|(x, y)| if rng.coin() { *x } else { *y })
        .collect();
    Ok(Genome::new(genes, a.model))
}

/// Perturbs each gene with probability `chance` by `rate` of its value, up or
/// down with equal odds. Values never drop below zero.
pub fn mutate(genome: &mut Genome, chance: f64, rate: f64, rng: &mut SeededRng) {
    for locus in 0..genome.len() {
        if !rng.chance(chance) {
            continue;
        }
        let value = genome.gene(locus);
        let delta = (rate * value as f64) as u32;
        let mutated = if rng.coin() {
            value.saturating_add(delta)
        } else {
            value.saturating_sub(delta)
        };
        genome.set_gene(locus, mutated);
    }
}

pub fn mutation_chance(genome: &Genome) -> f64 {
    if genome.is_empty() {
        0.0
    } else {
        1.0 / genome.len() as f64
    }
}
