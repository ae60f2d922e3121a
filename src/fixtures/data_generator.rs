use std::collections::HashSet;
use std::error::Error;
use std::path::Path;

use csv::{ReaderBuilder, Writer};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::constant::{SEED, SYNTHETIC_CUSTOMER_COUNT};
use crate::domain::types::{Bounds, Coordinate, Customer};

/// One row of the customer table, with the column names of the upload template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    #[serde(rename = "Demand")]
    pub demand: f64,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

impl From<CustomerRecord> for Customer {
    fn from(r: CustomerRecord) -> Self {
        Customer::new(r.customer_id, r.demand, r.latitude, r.longitude)
    }
}

impl From<&Customer> for CustomerRecord {
    fn from(c: &Customer) -> Self {
        Self {
            customer_id: c.id.clone(),
            demand: c.demand,
            latitude: c.location.lat,
            longitude: c.location.lon,
        }
    }
}

/// Reads a `CustomerID,Demand,Latitude,Longitude` table and validates it.
pub fn read_customers_from_csv(csv_path: &Path) -> Result<Vec<Customer>, Box<dyn Error>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(csv_path)?;

    let mut customers = Vec::new();
    for (idx, row) in reader.deserialize::<CustomerRecord>().enumerate() {
        let record = row.map_err(|e| format!("row {}: {}", idx + 1, e))?;
        customers.push(Customer::from(record));
    }

    validate_customers(&customers)?;
    info!(
        "Loaded {} customers from {}",
        customers.len(),
        csv_path.display()
    );
    Ok(customers)
}

/// Boundary checks the optimizer relies on but never performs itself.
pub fn validate_customers(customers: &[Customer]) -> Result<(), Box<dyn Error>> {
    if customers.is_empty() {
        return Err("customer table is empty".into());
    }

    let mut seen = HashSet::new();
    for c in customers {
        if !seen.insert(c.id.as_str()) {
            return Err(format!("duplicate customer id {:?}", c.id).into());
        }
        if !(c.demand.is_finite() && c.demand >= 0.0) {
            return Err(format!("customer {:?} has invalid demand {}", c.id, c.demand).into());
        }
        if !(-90.0..=90.0).contains(&c.location.lat) {
            return Err(format!(
                "customer {:?} has latitude {} outside [-90, 90]",
                c.id, c.location.lat
            )
            .into());
        }
        if !(-180.0..=180.0).contains(&c.location.lon) {
            return Err(format!(
                "customer {:?} has longitude {} outside [-180, 180]",
                c.id, c.location.lon
            )
            .into());
        }
    }
    Ok(())
}

/// Contiguous US, the default area for synthetic instances.
pub fn default_region() -> Bounds {
    Bounds {
        min: Coordinate::new(25.0, -124.0),
        max: Coordinate::new(49.0, -67.0),
    }
}

/// Generates `count` customers uniformly inside `region` with demands in
/// [500, 5000].
pub fn generate_random_customers(count: usize, region: &Bounds, seed: u64) -> Vec<Customer> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let lat = rng.gen_range(region.min.lat..=region.max.lat);
            let lon = rng.gen_range(region.min.lon..=region.max.lon);
            let demand = rng.gen_range(500..=5_000) as f64;
            Customer::new(format!("CUST{:03}", i + 1), demand, lat, lon)
        })
        .collect()
}

/// Loads customers from `csv_path`, or generates a seeded synthetic set when no
/// path is configured.
pub fn load_customers(
    csv_path: Option<&Path>,
    seed: Option<u64>,
) -> Result<Vec<Customer>, Box<dyn Error>> {
    match csv_path {
        Some(path) => read_customers_from_csv(path),
        None => {
            let seed = seed.unwrap_or(SEED);
            warn!(
                "No customer table given, generating {} synthetic customers (seed {})",
                SYNTHETIC_CUSTOMER_COUNT, seed
            );
            let customers =
                generate_random_customers(SYNTHETIC_CUSTOMER_COUNT, &default_region(), seed);
            let total_demand: f64 = customers.iter().map(|c| c.demand).sum();
            debug!("Synthetic total demand: {}", total_demand);
            Ok(customers)
        }
    }
}

/// Writes a small sample table users can fill in.
pub fn write_customer_template(path: &Path) -> Result<(), Box<dyn Error>> {
    let sample = [
        Customer::new("CUST001", 1_200.0, 40.7128, -74.0060),
        Customer::new("CUST002", 800.0, 34.0522, -118.2437),
        Customer::new("CUST003", 2_500.0, 41.8781, -87.6298),
        Customer::new("CUST004", 1_750.0, 29.7604, -95.3698),
        Customer::new("CUST005", 950.0, 33.4484, -112.0740),
    ];

    let mut wtr = Writer::from_path(path)?;
    for c in &sample {
        wtr.serialize(CustomerRecord::from(c))?;
    }
    wtr.flush()?;
    info!("Wrote customer template to {}", path.display());
    Ok(())
}
