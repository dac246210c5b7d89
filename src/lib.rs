pub mod config;
pub mod error;
pub mod logic;
pub mod math;
pub mod ui;

pub use config::SimParams;
pub use error::PendulumError;
pub use logic::{Coupling, PendulumState, PendulumSystem, Trajectory, G};
pub use math::{Matrix3, Vector3};
