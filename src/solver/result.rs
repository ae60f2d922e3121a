use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::domain::types::{Customer, IterationRecord};
use crate::evaluation::fitness::{evaluate, CostModel};
use crate::solver::pso::swarm::GlobalBest;

/// How the run ended. The heuristic never fails outright; these only tell a
/// full run apart from one cut short by the time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Completed,
    TimeLimited,
}

impl SolveStatus {
    /// The single status string older consumers of this solver expect.
    pub fn label(&self) -> &'static str {
        "Optimal"
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Completed => write!(f, "{} (all iterations)", self.label()),
            SolveStatus::TimeLimited => write!(f, "{} (time limit reached)", self.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityLocation {
    #[serde(rename = "FacilityID")]
    pub facility_id: String,
    #[serde(rename = "Latitude")]
    pub lat: f64,
    #[serde(rename = "Longitude")]
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAssignment {
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    #[serde(rename = "FacilityID")]
    pub facility_id: Option<String>,
    #[serde(rename = "Demand")]
    pub demand: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityUsage {
    #[serde(rename = "FacilityID")]
    pub facility_id: String,
    #[serde(rename = "AssignedDemand")]
    pub assigned_demand: f64,
    #[serde(rename = "Utilization")]
    pub utilization: f64,
    #[serde(rename = "Customers")]
    pub customers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub status: SolveStatus,
    pub total_cost: f64,
    pub facility_locations: Vec<FacilityLocation>,
    pub assignments: Vec<CustomerAssignment>,
    pub facility_usage: Vec<FacilityUsage>,
    pub history: Vec<IterationRecord>,
    pub completed_iterations: usize,
    pub requested_iterations: usize,
    pub unassigned_customers: usize,
    pub total_time_seconds: f64,
}

pub fn facility_id(index: usize) -> String {
    format!("FAC{}", index + 1)
}

/// Turns the final global best into output records.
///
/// Runs one fresh evaluation of the best sites to recover the assignment;
/// nothing else is computed.
pub fn materialize(
    global_best: &GlobalBest,
    customers: &[Customer],
    cost: &CostModel,
    history: Vec<IterationRecord>,
    requested_iterations: usize,
    started_at: Instant,
) -> OptimizationResult {
    let evaluation = evaluate(&global_best.position, customers, cost);

    let facility_locations = global_best
        .position
        .iter()
        .enumerate()
        .map(|(i, c)| FacilityLocation {
            facility_id: facility_id(i),
            lat: c.lat,
            lon: c.lon,
        })
        .collect();

    let assignments = customers
        .iter()
        .zip(&evaluation.assignment)
        .map(|(customer, facility)| CustomerAssignment {
            customer_id: customer.id.clone(),
            facility_id: facility.map(facility_id),
            demand: customer.demand,
        })
        .collect();

    let facility_usage = evaluation
        .facility_usage
        .iter()
        .enumerate()
        .map(|(i, &used)| FacilityUsage {
            facility_id: facility_id(i),
            assigned_demand: used,
            utilization: used / cost.facility_capacity,
            customers: evaluation
                .assignment
                .iter()
                .filter(|a| **a == Some(i))
                .count(),
        })
        .collect();

    let completed_iterations = history.len();
    let status = if completed_iterations < requested_iterations {
        SolveStatus::TimeLimited
    } else {
        SolveStatus::Completed
    };

    OptimizationResult {
        status,
        total_cost: evaluation.total_cost,
        facility_locations,
        assignments,
        facility_usage,
        history,
        completed_iterations,
        requested_iterations,
        unassigned_customers: evaluation.unassigned_count(),
        total_time_seconds: started_at.elapsed().as_secs_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Coordinate;

    fn cost() -> CostModel {
        CostModel {
            facility_capacity: 100.0,
            fixed_cost: 10.0,
            cost_per_km: 1.0,
            units_per_load: 50.0,
        }
    }

    fn customers() -> Vec<Customer> {
        vec![
            Customer::new("north", 60.0, 1.0, 0.0),
            Customer::new("south", 30.0, -1.0, 0.0),
            Customer::new("huge", 500.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn records_use_synthetic_facility_ids() {
        let best = GlobalBest {
            position: vec![Coordinate::new(0.9, 0.0), Coordinate::new(-0.9, 0.0)],
            score: 0.0,
        };
        let result = materialize(&best, &customers(), &cost(), vec![], 0, Instant::now());

        let ids: Vec<&str> = result
            .facility_locations
            .iter()
            .map(|f| f.facility_id.as_str())
            .collect();
        assert_eq!(ids, ["FAC1", "FAC2"]);
        assert_eq!(result.facility_locations[1].lat, -0.9);

        assert_eq!(result.assignments[0].facility_id.as_deref(), Some("FAC1"));
        assert_eq!(result.assignments[1].facility_id.as_deref(), Some("FAC2"));
        assert_eq!(result.assignments[2].facility_id, None);
        assert_eq!(result.assignments[2].demand, 500.0);
        assert_eq!(result.unassigned_customers, 1);
    }

    #[test]
    fn usage_reports_demand_and_utilization() {
        let best = GlobalBest {
            position: vec![Coordinate::new(0.9, 0.0), Coordinate::new(-0.9, 0.0)],
            score: 0.0,
        };
        let result = materialize(&best, &customers(), &cost(), vec![], 0, Instant::now());

        assert_eq!(result.facility_usage[0].assigned_demand, 60.0);
        assert_eq!(result.facility_usage[0].utilization, 0.6);
        assert_eq!(result.facility_usage[0].customers, 1);
        assert_eq!(result.facility_usage[1].assigned_demand, 30.0);
    }

    #[test]
    fn cost_comes_from_fresh_evaluation() {
        let best = GlobalBest {
            position: vec![Coordinate::new(0.0, 0.0)],
            score: -1.0,
        };
        let result = materialize(&best, &customers()[..2], &cost(), vec![], 0, Instant::now());
        let expected = evaluate(&best.position, &customers()[..2], &cost()).total_cost;
        assert_eq!(result.total_cost, expected);
    }

    #[test]
    fn status_reflects_truncation() {
        let best = GlobalBest {
            position: vec![Coordinate::new(0.0, 0.0)],
            score: 0.0,
        };
        let history = vec![IterationRecord {
            iteration: 0,
            best_score: 1.0,
            elapsed_seconds: 0.1,
        }];
        let cut = materialize(&best, &customers(), &cost(), history.clone(), 5, Instant::now());
        assert_eq!(cut.status, SolveStatus::TimeLimited);
        assert_eq!(cut.completed_iterations, 1);

        let full = materialize(&best, &customers(), &cost(), history, 1, Instant::now());
        assert_eq!(full.status, SolveStatus::Completed);
        assert_eq!(full.status.label(), "Optimal");
        assert_eq!(cut.status.label(), "Optimal");
    }
}
