//! Intracranial pressure and cerebral arterial compliance simulation.
//!
//! This crate implements the simplified lumped-parameter model of Ursino & Lodi,
//! "A simple mathematical model of the interaction between intracranial pressure
//! and cerebral hemodynamics", J. Appl. Physiol. 82(4), 1997.
//! Cerebral hemodynamics are treated as an electrical circuit: pressures are
//! voltages, flows are currents, and vessel beds are resistors and capacitors.
//! Autoregulation adjusts the arterial compliance through a sigmoidal feedback on
//! cerebral blood flow.
//!
//! - [`HemodynamicIntegrator`] owns the state (time, ICP, arterial compliance)
//!   and advances it one explicit Euler step at a time.
//! - [`physiology`] holds the model equations as free functions.
//! - [`PatientConfig`] and [`InitialConditions`] describe the simulated patient.
//! - [`DrivingSignals`] and [`Drive`] supply the external inputs.
//! - [`simulate`] runs an integrator over many steps and records the trajectory.
//! - [`units`] defines the dimensioned quantities and clinical unit conversions.

mod config;
mod drive;
mod error;
mod integrator;
mod observer;
mod state;

pub mod physiology;
pub mod simulate;
pub mod units;

pub use config::{CapillaryModel, InitialConditions, PatientConfig};
pub use drive::{Drive, DrivingSignals};
pub use error::{ConfigError, StepError};
pub use integrator::HemodynamicIntegrator;
pub use observer::Observer;
pub use state::{Derivation, HemodynamicState, StateRate};
