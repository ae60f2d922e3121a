use crate::config::constant::{INERTIA_DECAY, INERTIA_FLOOR};

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Number of shipments needed for `demand`; partial loads count as a full one.
pub fn loads_for(demand: f64, units_per_load: f64) -> f64 {
    (demand / units_per_load).ceil()
}

pub fn decay_inertia(inertia: f64) -> f64 {
    (inertia * INERTIA_DECAY).max(INERTIA_FLOOR)
}
