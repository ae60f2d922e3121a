use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::domain::types::{Bounds, Coordinate, Customer};
use crate::evaluation::fitness::{evaluate, CostModel};

/// One candidate set of facility sites together with its velocity and the
/// best sites it has visited so far.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec<Coordinate>,
    pub velocity: Vec<Coordinate>,
    pub best_position: Vec<Coordinate>,
    pub best_score: f64,
    /// Per-particle stream so the parallel sweep stays reproducible.
    pub rng: ChaCha8Rng,
}

/// Frozen copy of the swarm's best sites. Particles only ever read this during
/// a sweep; a new snapshot replaces it once the sweep is done.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalBest {
    pub position: Vec<Coordinate>,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct Swarm {
    pub particles: Vec<Particle>,
    pub global_best: GlobalBest,
}

fn sample_in(bounds: &Bounds, rng: &mut ChaCha8Rng) -> Coordinate {
    // lo + span * u rather than gen_range, which panics on an empty or NaN range.
    // The clamp absorbs rounding past the upper edge.
    bounds.clamp(Coordinate {
        lat: bounds.min.lat + (bounds.max.lat - bounds.min.lat) * rng.gen::<f64>(),
        lon: bounds.min.lon + (bounds.max.lon - bounds.min.lon) * rng.gen::<f64>(),
    })
}

fn sample_velocity(rng: &mut ChaCha8Rng) -> Coordinate {
    Coordinate {
        lat: rng.gen_range(-1.0..=1.0),
        lon: rng.gen_range(-1.0..=1.0),
    }
}

impl Swarm {
    /// Draws `n_particles` particles uniformly inside `bounds`, scores them,
    /// and takes the best one as the initial global best.
    pub fn initialize(
        n_particles: usize,
        n_facilities: usize,
        bounds: &Bounds,
        customers: &[Customer],
        cost: &CostModel,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut particles: Vec<Particle> = (0..n_particles)
            .map(|_| {
                let position: Vec<Coordinate> =
                    (0..n_facilities).map(|_| sample_in(bounds, rng)).collect();
                let velocity: Vec<Coordinate> =
                    (0..n_facilities).map(|_| sample_velocity(rng)).collect();
                Particle {
                    best_position: position.clone(),
                    position,
                    velocity,
                    best_score: f64::INFINITY,
                    rng: ChaCha8Rng::seed_from_u64(rng.gen()),
                }
            })
            .collect();

        particles.par_iter_mut().for_each(|p| {
            p.best_score = evaluate(&p.position, customers, cost).total_cost;
        });

        let global_best = best_of(&particles).unwrap_or(GlobalBest {
            position: Vec::new(),
            score: f64::INFINITY,
        });
        debug!(
            "Initialized {} particles, best initial score {:.2}",
            particles.len(),
            global_best.score
        );

        Self {
            particles,
            global_best,
        }
    }

    /// Builds a new snapshot if some personal best now strictly beats the
    /// current global best. Must only be called between sweeps.
    pub fn refresh_global_best(&mut self) -> bool {
        match best_of(&self.particles) {
            Some(candidate) if candidate.score < self.global_best.score => {
                self.global_best = candidate;
                true
            }
            _ => false,
        }
    }
}

/// Lowest personal best in the swarm; the first particle wins ties.
fn best_of(particles: &[Particle]) -> Option<GlobalBest> {
    particles
        .iter()
        .fold(None::<&Particle>, |best, p| match best {
            Some(b) if b.best_score <= p.best_score => Some(b),
            Some(b) if p.best_score.is_nan() => Some(b),
            _ => Some(p),
        })
        .map(|p| GlobalBest {
            position: p.best_position.clone(),
            score: p.best_score,
        })
}
