pub mod search;
pub mod swarm;
pub mod velocity;

pub use search::*;
pub use swarm::*;
pub use velocity::*;
