pub mod pso;
pub mod result;
