//! NScope-Simulation: Synthetic acquisition source for development and tests
//!
//! Generates a multichannel stream with a tone, Gaussian noise and a periodic
//! trigger pulse, behind the same boundary a live acquisition source exposes.

pub mod simulator;

pub use simulator::{SimulatedSource, SimulatorConfig};
