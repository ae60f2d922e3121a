pub mod config;
pub mod distance;
pub mod domain;
pub mod evaluation;
pub mod fixtures;
pub mod output;
pub mod solver;
pub mod utils;
