use std::error::Error;
use std::fs;
use std::path::Path;

use colored::*;
use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::solver::result::{OptimizationResult, SolveStatus};

fn save_to_csv<T: Serialize>(rows: &[T], path: &Path) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the record sets as CSV plus the whole result as `summary.json`.
pub fn save_results(result: &OptimizationResult, dir: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;

    save_to_csv(&result.facility_locations, &dir.join("facility_locations.csv"))?;
    save_to_csv(&result.assignments, &dir.join("assignments.csv"))?;
    save_to_csv(&result.facility_usage, &dir.join("facility_usage.csv"))?;
    save_to_csv(&result.history, &dir.join("history.csv"))?;

    let summary = serde_json::to_string_pretty(result)?;
    fs::write(dir.join("summary.json"), summary)?;

    info!("Results written to {}", dir.display());
    Ok(())
}

pub fn print_summary(result: &OptimizationResult) {
    let status = match result.status {
        SolveStatus::Completed => result.status.to_string().green(),
        SolveStatus::TimeLimited => result.status.to_string().yellow(),
    };

    println!("{}", "PSO facility location".bold());
    println!("  Status:       {}", status);
    println!(
        "  Total cost:   {}",
        format!("{:.2}", result.total_cost).bold()
    );
    println!(
        "  Iterations:   {}/{}",
        result.completed_iterations, result.requested_iterations
    );
    println!("  Total time:   {:.2} seconds", result.total_time_seconds);

    if result.unassigned_customers > 0 {
        println!(
            "  {}",
            format!(
                "{} customer(s) could not be assigned within capacity",
                result.unassigned_customers
            )
            .red()
        );
    }

    println!("{}", "Facilities".bold());
    for (site, usage) in result.facility_locations.iter().zip(&result.facility_usage) {
        println!(
            "  {:<6} ({:>9.4}, {:>10.4})  demand {:>10.1}  utilization {:>5.1}%  customers {}",
            site.facility_id.cyan(),
            site.lat,
            site.lon,
            usage.assigned_demand,
            usage.utilization * 100.0,
            usage.customers
        );
    }
}
