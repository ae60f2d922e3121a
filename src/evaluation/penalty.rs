use crate::config::constant::{LOAD_BALANCE_WEIGHT, UNASSIGNED_PENALTY};
use crate::utils::population_std_dev;

pub fn unassigned_penalty(unassigned: usize) -> f64 {
    (unassigned as f64) * UNASSIGNED_PENALTY
}

/// Penalises uneven demand across facilities: `100 * stddev(usage)`.
///
/// Zero when there is a single facility or every facility carries the same load.
pub fn load_balance_penalty(facility_usage: &[f64]) -> f64 {
    if facility_usage.len() < 2 {
        return 0.0;
    }
    let first = facility_usage[0];
    if facility_usage.iter().all(|&u| u == first) {
        return 0.0;
    }

    population_std_dev(facility_usage) * LOAD_BALANCE_WEIGHT
}
