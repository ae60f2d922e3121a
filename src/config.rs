use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub mod constant {
    pub const N_FACILITIES: usize = 3;
    pub const FACILITY_CAPACITY: f64 = 100_000.0;
    pub const FIXED_COST: f64 = 500_000.0;
    pub const COST_PER_KM: f64 = 1.0;
    pub const UNITS_PER_LOAD: f64 = 100.0;
    pub const N_PARTICLES: usize = 30;
    pub const N_ITERATIONS: usize = 100;
    pub const MAX_RUN_TIME_SECONDS: f64 = 10.0;
    pub const INERTIA_WEIGHT: f64 = 0.9;
    pub const COGNITIVE_COEFFICIENT: f64 = 2.0;
    pub const SOCIAL_COEFFICIENT: f64 = 2.0;

    /// Cost added for every customer no facility has room for.
    pub const UNASSIGNED_PENALTY: f64 = 1_000_000.0;
    /// Multiplier on the std-dev of facility usage.
    pub const LOAD_BALANCE_WEIGHT: f64 = 100.0;
    pub const INERTIA_DECAY: f64 = 0.99;
    pub const INERTIA_FLOOR: f64 = 0.4;
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    pub const SEED: u64 = 64;
    pub const SYNTHETIC_CUSTOMER_COUNT: usize = 50;
    pub const OUTPUT_DIR: &str = "pso_output";
}

use constant::*;

/// Parameters of one optimisation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsoParams {
    pub n_facilities: usize,
    pub facility_capacity: f64,
    pub fixed_cost: f64,
    pub cost_per_km: f64,
    pub units_per_load: f64,
    pub n_particles: usize,
    pub n_iterations: usize,
    pub max_run_time_seconds: f64,
    pub inertia_weight: f64,
    pub cognitive_coefficient: f64,
    pub social_coefficient: f64,
    /// `None` seeds the swarm from OS entropy.
    pub seed: Option<u64>,
}

impl Default for PsoParams {
    fn default() -> Self {
        Self {
            n_facilities: N_FACILITIES,
            facility_capacity: FACILITY_CAPACITY,
            fixed_cost: FIXED_COST,
            cost_per_km: COST_PER_KM,
            units_per_load: UNITS_PER_LOAD,
            n_particles: N_PARTICLES,
            n_iterations: N_ITERATIONS,
            max_run_time_seconds: MAX_RUN_TIME_SECONDS,
            inertia_weight: INERTIA_WEIGHT,
            cognitive_coefficient: COGNITIVE_COEFFICIENT,
            social_coefficient: SOCIAL_COEFFICIENT,
            seed: Some(SEED),
        }
    }
}

impl PsoParams {
    /// Rejects parameter sets the optimizer cannot run on.
    ///
    /// The optimizer itself never checks its inputs, so this has to be called
    /// before handing the parameters over.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.n_facilities == 0 {
            return Err("n_facilities must be at least 1".into());
        }
        if self.n_particles == 0 {
            return Err("n_particles must be at least 1".into());
        }
        if !(self.facility_capacity.is_finite() && self.facility_capacity > 0.0) {
            return Err(format!(
                "facility_capacity must be positive, got {}",
                self.facility_capacity
            )
            .into());
        }
        if !(self.units_per_load.is_finite() && self.units_per_load > 0.0) {
            return Err(format!(
                "units_per_load must be positive, got {}",
                self.units_per_load
            )
            .into());
        }
        for (name, value) in [
            ("fixed_cost", self.fixed_cost),
            ("cost_per_km", self.cost_per_km),
            ("max_run_time_seconds", self.max_run_time_seconds),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("{name} must be finite and non-negative, got {value}").into());
            }
        }
        for (name, value) in [
            ("inertia_weight", self.inertia_weight),
            ("cognitive_coefficient", self.cognitive_coefficient),
            ("social_coefficient", self.social_coefficient),
        ] {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}").into());
            }
        }
        Ok(())
    }

    /// Loads parameters from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &str) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)?;
        let params: PsoParams = serde_json::from_str(&content)?;
        Ok(params)
    }

    /// Applies `PSO_<PARAM>` environment overrides on top of `self`.
    pub fn apply_env_overrides(&mut self) -> Result<(), Box<dyn Error>> {
        override_from_env("PSO_N_FACILITIES", &mut self.n_facilities)?;
        override_from_env("PSO_FACILITY_CAPACITY", &mut self.facility_capacity)?;
        override_from_env("PSO_FIXED_COST", &mut self.fixed_cost)?;
        override_from_env("PSO_COST_PER_KM", &mut self.cost_per_km)?;
        override_from_env("PSO_UNITS_PER_LOAD", &mut self.units_per_load)?;
        override_from_env("PSO_N_PARTICLES", &mut self.n_particles)?;
        override_from_env("PSO_N_ITERATIONS", &mut self.n_iterations)?;
        override_from_env("PSO_MAX_RUN_TIME_SECONDS", &mut self.max_run_time_seconds)?;
        override_from_env("PSO_INERTIA_WEIGHT", &mut self.inertia_weight)?;
        override_from_env("PSO_COGNITIVE_COEFFICIENT", &mut self.cognitive_coefficient)?;
        override_from_env("PSO_SOCIAL_COEFFICIENT", &mut self.social_coefficient)?;

        if let Ok(raw) = env::var("PSO_SEED") {
            self.seed = match raw.trim() {
                "" | "none" | "random" => None,
                value => Some(value.parse::<u64>().map_err(|e| format!("PSO_SEED: {e}"))?),
            };
        }
        Ok(())
    }
}

fn override_from_env<T>(key: &str, target: &mut T) -> Result<(), Box<dyn Error>>
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    if let Ok(raw) = env::var(key) {
        let value = raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("{key}={raw:?}: {e}"))?;
        debug!("{} overridden from environment: {:?}", key, value);
        *target = value;
    }
    Ok(())
}

/// Everything the binary needs to know before it starts solving.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub params: PsoParams,
    pub customer_csv_path: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Reads `.env` and the process environment.
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        dotenv().ok();

        let mut params = match env::var("PSO_PARAMS_PATH") {
            Ok(path) => {
                info!("Loading PSO parameters from {}", path);
                PsoParams::from_json_file(&path)?
            }
            Err(_) => {
                info!("PSO_PARAMS_PATH not set, using default parameters");
                PsoParams::default()
            }
        };
        params.apply_env_overrides()?;
        params.validate()?;

        let customer_csv_path = match env::var("CUSTOMER_CSV_PATH") {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => {
                warn!("CUSTOMER_CSV_PATH not set, synthetic customers will be generated");
                None
            }
        };

        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(OUTPUT_DIR));

        Ok(Self {
            params,
            customer_csv_path,
            output_dir,
        })
    }
}
