use serde::{Deserialize, Serialize};

use crate::config::PsoParams;
use crate::distance::haversine::distance_between;
use crate::domain::types::{Assignment, Coordinate, Customer};
use crate::evaluation::penalty::{load_balance_penalty, unassigned_penalty};
use crate::utils::loads_for;

/// The cost side of the problem, split out of `PsoParams` so the evaluator
/// does not see swarm settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub facility_capacity: f64,
    pub fixed_cost: f64,
    pub cost_per_km: f64,
    pub units_per_load: f64,
}

impl From<&PsoParams> for CostModel {
    fn from(params: &PsoParams) -> Self {
        Self {
            facility_capacity: params.facility_capacity,
            fixed_cost: params.fixed_cost,
            cost_per_km: params.cost_per_km,
            units_per_load: params.units_per_load,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub total_cost: f64,
    pub assignment: Assignment,
    /// Cumulative assigned demand per facility.
    pub facility_usage: Vec<f64>,
}

impl Evaluation {
    pub fn unassigned_count(&self) -> usize {
        self.assignment.iter().filter(|a| a.is_none()).count()
    }
}

/// Scores a set of facility sites against the customers.
///
/// Customers are visited in slice order and each goes to the nearest facility
/// that still has room. This is greedy and order dependent: on distance ties
/// the lower facility index wins, and customers late in the slice are the ones
/// stranded once capacity runs out. For a fixed slice order the result is
/// deterministic.
///
/// Cost = transport (km * cost_per_km * loads) + 1,000,000 per unassigned
/// customer + `fixed_cost` per facility with positive usage + 100 * stddev of
/// facility usage.
pub fn evaluate(facilities: &[Coordinate], customers: &[Customer], cost: &CostModel) -> Evaluation {
    let mut facility_usage = vec![0.0; facilities.len()];
    let mut assignment: Assignment = Vec::with_capacity(customers.len());
    let mut transport_cost = 0.0;
    let mut unassigned = 0;

    let mut order: Vec<usize> = (0..facilities.len()).collect();
    let mut distances = vec![0.0; facilities.len()];

    for customer in customers {
        for (d, facility) in distances.iter_mut().zip(facilities) {
            *d = distance_between(&customer.location, facility);
        }
        order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]).then(a.cmp(&b)));

        let chosen = order
            .iter()
            .copied()
            .find(|&f| facility_usage[f] + customer.demand <= cost.facility_capacity);

        match chosen {
            Some(f) => {
                facility_usage[f] += customer.demand;
                transport_cost += distances[f]
                    * cost.cost_per_km
                    * loads_for(customer.demand, cost.units_per_load);
            }
            None => unassigned += 1,
        }
        assignment.push(chosen);
    }

    let opened = facility_usage.iter().filter(|&&u| u > 0.0).count();
    let total_cost = transport_cost
        + unassigned_penalty(unassigned)
        + (opened as f64) * cost.fixed_cost
        + load_balance_penalty(&facility_usage);

    Evaluation {
        total_cost,
        assignment,
        facility_usage,
    }
}
