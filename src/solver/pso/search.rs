use std::error::Error;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, span, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::swarm::{GlobalBest, Swarm};
use super::velocity::{move_particle, update_velocity, VelocityWeights};
use crate::config::{PsoParams, RunConfig};
use crate::domain::types::{Bounds, Customer, IterationRecord};
use crate::evaluation::fitness::{evaluate, CostModel};
use crate::fixtures::data_generator::load_customers;
use crate::output::report::{print_summary, save_results};
use crate::solver::result::{materialize, OptimizationResult};
use crate::utils::decay_inertia;

/// Initialize tracing and environment
fn init_tracing_and_env() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE)
                .pretty(),
        )
        .try_init()?;
    Ok(())
}

/// Particle swarm search over facility sites.
///
/// The random stream is injected at construction so runs can be replayed.
pub struct SwarmOptimizer {
    params: PsoParams,
    rng: ChaCha8Rng,
}

impl SwarmOptimizer {
    pub fn new(params: PsoParams, rng: ChaCha8Rng) -> Self {
        Self { params, rng }
    }

    /// Seeds from `params.seed`, or from OS entropy when unset.
    pub fn from_params(params: PsoParams) -> Self {
        let rng = match params.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(params, rng)
    }

    pub fn params(&self) -> &PsoParams {
        &self.params
    }

    /// Runs until `n_iterations` sweeps are done or the wall-clock budget is
    /// exceeded, whichever comes first.
    ///
    /// Inputs are not validated here; an empty customer set or zero facilities
    /// produce meaningless numbers rather than an error. Use
    /// [`PsoParams::validate`] and the loaders in `fixtures` first.
    pub fn optimize(&mut self, customers: &[Customer]) -> OptimizationResult {
        let started_at = Instant::now();
        let params = self.params.clone();
        let cost = CostModel::from(&params);
        let bounds = Bounds::from_customers(customers);

        let mut swarm = {
            let span = span!(Level::INFO, "initialize_swarm");
            let _guard = span.enter();
            Swarm::initialize(
                params.n_particles,
                params.n_facilities,
                &bounds,
                customers,
                &cost,
                &mut self.rng,
            )
        };
        info!(
            "Initial global best: {:.2} ({} particles, {} facilities)",
            swarm.global_best.score, params.n_particles, params.n_facilities
        );

        let mut inertia = params.inertia_weight;
        let mut history: Vec<IterationRecord> =
            Vec::with_capacity(params.n_iterations.min(1024));

        let loop_span = span!(
            Level::INFO,
            "main_search_loop",
            total_iterations = params.n_iterations
        );
        let _loop_guard = loop_span.enter();

        for iteration in 0..params.n_iterations {
            if started_at.elapsed().as_secs_f64() > params.max_run_time_seconds {
                info!(
                    "Time budget of {}s exhausted after {} iterations",
                    params.max_run_time_seconds, iteration
                );
                break;
            }

            let weights = VelocityWeights {
                inertia,
                cognitive: params.cognitive_coefficient,
                social: params.social_coefficient,
            };
            perform_iteration(iteration, &mut swarm, customers, &bounds, &cost, &weights);

            inertia = decay_inertia(inertia);
            history.push(IterationRecord {
                iteration,
                best_score: swarm.global_best.score,
                elapsed_seconds: started_at.elapsed().as_secs_f64(),
            });
        }

        materialize(
            &swarm.global_best,
            customers,
            &cost,
            history,
            params.n_iterations,
            started_at,
        )
    }
}

/// One sweep over the swarm.
///
/// Every particle reads the same frozen global best; the swarm's best is only
/// recomputed after the whole sweep has finished.
fn perform_iteration(
    iteration: usize,
    swarm: &mut Swarm,
    customers: &[Customer],
    bounds: &Bounds,
    cost: &CostModel,
    weights: &VelocityWeights,
) {
    let iter_span = span!(Level::DEBUG, "iteration", iter = iteration);
    let _iter_guard = iter_span.enter();

    let global: &GlobalBest = &swarm.global_best;
    swarm.particles.par_iter_mut().for_each(|particle| {
        update_velocity(particle, global, weights);
        move_particle(particle, bounds);

        let score = evaluate(&particle.position, customers, cost).total_cost;
        if score < particle.best_score {
            particle.best_position.clone_from(&particle.position);
            particle.best_score = score;
        }
    });

    if swarm.refresh_global_best() {
        info!(
            "New best at iteration {}: cost = {:.2}",
            iteration, swarm.global_best.score
        );
    } else {
        debug!(
            "No improvement at iteration {} (best {:.2}, inertia {:.3})",
            iteration, swarm.global_best.score, weights.inertia
        );
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing_and_env()?;
    let config = RunConfig::from_env()?;

    let customers = {
        let span = span!(Level::INFO, "setup");
        let _guard = span.enter();
        load_customers(config.customer_csv_path.as_deref(), config.params.seed)?
    };

    info!(
        "Starting PSO with {} customers, {} facilities, {} particles, {} iterations",
        customers.len(),
        config.params.n_facilities,
        config.params.n_particles,
        config.params.n_iterations
    );

    let mut optimizer = SwarmOptimizer::from_params(config.params.clone());
    let result = optimizer.optimize(&customers);

    print_summary(&result);
    save_results(&result, &config.output_dir)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customers() -> Vec<Customer> {
        vec![
            Customer::new("C1", 30.0, 40.0, -75.0),
            Customer::new("C2", 45.0, 40.2, -74.8),
            Customer::new("C3", 25.0, 41.0, -73.2),
            Customer::new("C4", 50.0, 41.1, -73.0),
            Customer::new("C5", 20.0, 40.6, -74.0),
            Customer::new("C6", 35.0, 39.8, -73.5),
        ]
    }

    fn params() -> PsoParams {
        PsoParams {
            n_facilities: 2,
            facility_capacity: 120.0,
            fixed_cost: 200.0,
            cost_per_km: 1.0,
            units_per_load: 20.0,
            n_particles: 12,
            n_iterations: 25,
            max_run_time_seconds: 60.0,
            seed: Some(42),
            ..PsoParams::default()
        }
    }

    #[test]
    fn history_is_monotone_and_complete() {
        let result = SwarmOptimizer::from_params(params()).optimize(&customers());

        assert_eq!(result.completed_iterations, 25);
        assert_eq!(result.history.len(), 25);
        for (i, record) in result.history.iter().enumerate() {
            assert_eq!(record.iteration, i);
        }
        assert!(result
            .history
            .windows(2)
            .all(|w| w[1].best_score <= w[0].best_score));
        assert!(result
            .history
            .windows(2)
            .all(|w| w[1].elapsed_seconds >= w[0].elapsed_seconds));
    }

    #[test]
    fn final_cost_matches_last_best_score() {
        let result = SwarmOptimizer::from_params(params()).optimize(&customers());
        let last = result.history.last().map(|r| r.best_score);
        assert_eq!(Some(result.total_cost), last);
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let a = SwarmOptimizer::from_params(params()).optimize(&customers());
        let b = SwarmOptimizer::from_params(params()).optimize(&customers());

        assert_eq!(a.total_cost, b.total_cost);
        assert_eq!(a.facility_locations, b.facility_locations);
        assert_eq!(a.assignments, b.assignments);
        let scores_a: Vec<f64> = a.history.iter().map(|r| r.best_score).collect();
        let scores_b: Vec<f64> = b.history.iter().map(|r| r.best_score).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn zero_iterations_returns_initial_best() {
        let params = PsoParams {
            n_iterations: 0,
            ..params()
        };
        let customers = customers();

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let swarm = Swarm::initialize(
            params.n_particles,
            params.n_facilities,
            &Bounds::from_customers(&customers),
            &customers,
            &CostModel::from(&params),
            &mut rng,
        );

        let result = SwarmOptimizer::from_params(params).optimize(&customers);
        assert_eq!(result.completed_iterations, 0);
        assert!(result.history.is_empty());
        assert_eq!(result.total_cost, swarm.global_best.score);
        let sites: Vec<(f64, f64)> = result
            .facility_locations
            .iter()
            .map(|f| (f.lat, f.lon))
            .collect();
        let expected: Vec<(f64, f64)> = swarm
            .global_best
            .position
            .iter()
            .map(|c| (c.lat, c.lon))
            .collect();
        assert_eq!(sites, expected);
    }
}
