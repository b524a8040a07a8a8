use uom::si::f64::{Pressure, Time, Volume, VolumeRate};

use crate::units::{Compliance, ComplianceRate, HydraulicResistance, PressureRate};

/// Simulated time and the two state variables of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemodynamicState {
    /// Time elapsed since the integrator was created.
    pub time: Time,

    /// Intracranial pressure.
    pub icp: Pressure,

    /// Compliance of the arterial cerebrovascular bed.
    pub arterial_compliance: Compliance,
}

impl HemodynamicState {
    /// Returns the state reached after one explicit Euler step.
    ///
    /// ```text
    /// ICP(t + dt) = ICP(t) + dICP/dt · dt
    /// Ca(t + dt)  = Ca(t)  + dCa/dt  · dt
    /// ```
    #[must_use]
    pub fn step(&self, rate: StateRate, dt: Time) -> Self {
        Self {
            time: self.time + dt,
            icp: self.icp + rate.icp * dt,
            arterial_compliance: self.arterial_compliance + rate.arterial_compliance * dt,
        }
    }
}

/// Time derivatives of the state variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateRate {
    /// Rate of change of intracranial pressure.
    pub icp: PressureRate,

    /// Rate of change of arterial compliance driven by autoregulation.
    pub arterial_compliance: ComplianceRate,
}

/// Every intermediate of one evaluation of the model equations.
///
/// Produced by [`HemodynamicIntegrator::derive`] and returned from each step,
/// so callers can inspect flow and resistance alongside the state trajectory.
///
/// [`HemodynamicIntegrator::derive`]: crate::HemodynamicIntegrator::derive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivation {
    /// Blood volume stored in the large and middle pial arteries.
    pub arterial_blood_volume: Volume,

    /// Resistance of the arterial bed at that volume.
    pub arterial_resistance: HydraulicResistance,

    /// Pressure at the capillary node.
    pub capillary_pressure: Pressure,

    /// Blood flow through the arterial bed.
    pub cerebral_blood_flow: VolumeRate,

    /// Time derivatives applied by the step.
    pub rate: StateRate,
}
