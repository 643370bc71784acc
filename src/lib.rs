//! Lorenz attractor particle simulation running on its own tick thread,
//! exchanging state with a host through a triple-buffered snapshot
//! channel and a bounded injection queue.

pub mod config;
pub mod constants;
pub mod error;
pub mod injection;
pub mod particle;
pub mod runtime;
pub mod simulation;
pub mod snapshot;

pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use particle::Particle;
pub use runtime::SimulationHandle;
pub use snapshot::Snapshot;
