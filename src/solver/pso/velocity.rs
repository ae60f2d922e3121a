use rand::Rng;

use super::swarm::{GlobalBest, Particle};
use crate::domain::types::{Bounds, Coordinate};

/// Weights of the three velocity terms for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityWeights {
    pub inertia: f64,
    pub cognitive: f64,
    pub social: f64,
}

/// `v = w*v + c1*U1*(pbest - x) + c2*U2*(gbest - x)`
///
/// U1 and U2 are fresh uniform [0, 1) draws for every component of every
/// facility, taken from the particle's own stream.
pub fn update_velocity(particle: &mut Particle, global: &GlobalBest, weights: &VelocityWeights) {
    let Particle {
        position,
        velocity,
        best_position,
        rng,
        ..
    } = particle;

    for (i, v) in velocity.iter_mut().enumerate() {
        let x = position[i];
        let pbest = best_position[i];
        let gbest = global.position[i];

        let (r1_lat, r1_lon): (f64, f64) = (rng.gen(), rng.gen());
        let (r2_lat, r2_lon): (f64, f64) = (rng.gen(), rng.gen());

        *v = Coordinate {
            lat: weights.inertia * v.lat
                + weights.cognitive * r1_lat * (pbest.lat - x.lat)
                + weights.social * r2_lat * (gbest.lat - x.lat),
            lon: weights.inertia * v.lon
                + weights.cognitive * r1_lon * (pbest.lon - x.lon)
                + weights.social * r2_lon * (gbest.lon - x.lon),
        };
    }
}

/// Moves the particle by its velocity and clamps each site into `bounds`.
/// The velocity is left as is, even for clamped sites.
pub fn move_particle(particle: &mut Particle, bounds: &Bounds) {
    for (x, v) in particle.position.iter_mut().zip(&particle.velocity) {
        *x = bounds.clamp(Coordinate {
            lat: x.lat + v.lat,
            lon: x.lon + v.lon,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn particle(position: Vec<Coordinate>, velocity: Vec<Coordinate>) -> Particle {
        Particle {
            best_position: position.clone(),
            position,
            velocity,
            best_score: 0.0,
            rng: ChaCha8Rng::seed_from_u64(5),
        }
    }

    fn bounds() -> Bounds {
        Bounds {
            min: Coordinate::new(0.0, 0.0),
            max: Coordinate::new(10.0, 10.0),
        }
    }

    #[test]
    fn pure_inertia_scales_velocity() {
        let mut p = particle(
            vec![Coordinate::new(5.0, 5.0)],
            vec![Coordinate::new(1.0, -0.5)],
        );
        let global = GlobalBest {
            position: vec![Coordinate::new(5.0, 5.0)],
            score: 0.0,
        };
        let weights = VelocityWeights {
            inertia: 0.5,
            cognitive: 2.0,
            social: 2.0,
        };
        update_velocity(&mut p, &global, &weights);
        // pbest == gbest == x, so only the inertia term remains
        assert_eq!(p.velocity, vec![Coordinate::new(0.5, -0.25)]);
    }

    #[test]
    fn social_pull_points_towards_global_best() {
        let mut p = particle(
            vec![Coordinate::new(2.0, 2.0), Coordinate::new(8.0, 8.0)],
            vec![Coordinate::default(); 2],
        );
        let global = GlobalBest {
            position: vec![Coordinate::new(4.0, 3.0), Coordinate::new(6.0, 7.0)],
            score: 0.0,
        };
        let weights = VelocityWeights {
            inertia: 0.9,
            cognitive: 2.0,
            social: 2.0,
        };
        update_velocity(&mut p, &global, &weights);

        let v = &p.velocity;
        assert!(v[0].lat >= 0.0 && v[0].lat <= 4.0);
        assert!(v[0].lon >= 0.0 && v[0].lon <= 2.0);
        assert!(v[1].lat <= 0.0 && v[1].lat >= -4.0);
        assert!(v[1].lon <= 0.0 && v[1].lon >= -2.0);
    }

    #[test]
    fn random_factors_differ_per_component() {
        let mut p = particle(
            vec![Coordinate::new(0.0, 0.0); 4],
            vec![Coordinate::default(); 4],
        );
        let global = GlobalBest {
            position: vec![Coordinate::new(1.0, 1.0); 4],
            score: 0.0,
        };
        let weights = VelocityWeights {
            inertia: 0.0,
            cognitive: 0.0,
            social: 1.0,
        };
        update_velocity(&mut p, &global, &weights);

        // Velocity equals U2 exactly here; a shared scalar would make all equal.
        let lats: Vec<f64> = p.velocity.iter().map(|v| v.lat).collect();
        assert!(lats.windows(2).any(|w| w[0] != w[1]));
        assert!(p.velocity.iter().any(|v| v.lat != v.lon));
    }

    #[test]
    fn move_clamps_but_keeps_velocity() {
        let mut p = particle(
            vec![Coordinate::new(9.0, 1.0)],
            vec![Coordinate::new(3.0, -4.0)],
        );
        move_particle(&mut p, &bounds());
        assert_eq!(p.position, vec![Coordinate::new(10.0, 0.0)]);
        assert_eq!(p.velocity, vec![Coordinate::new(3.0, -4.0)]);
    }

    #[test]
    fn move_inside_bounds_is_plain_addition() {
        let mut p = particle(
            vec![Coordinate::new(4.0, 4.0)],
            vec![Coordinate::new(0.5, 1.5)],
        );
        move_particle(&mut p, &bounds());
        assert_eq!(p.position, vec![Coordinate::new(4.5, 5.5)]);
    }
}
