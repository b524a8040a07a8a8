//! Algebraic and differential relations of the cerebral hemodynamics model.
//!
//! These are the equations of Ursino & Lodi (1997), Appendix B, written as free
//! functions. Each takes every constant it needs as an explicit argument so it
//! can be evaluated and tested on its own.
//! [`HemodynamicIntegrator`] chains them in the order they appear here.
//!
//! [`HemodynamicIntegrator`]: crate::HemodynamicIntegrator

use std::cmp::Ordering;

use uom::si::f64::{Pressure, Time, Volume, VolumeRate};

use crate::{
    config::CapillaryModel,
    units::{
        Compliance, ComplianceRate, ElastanceCoefficient, HydraulicResistance, PressureRate,
        ResistanceCoefficient,
    },
};

/// Blood volume of the arterial cerebrovascular bed.
///
/// ```text
/// Va = Ca · (Pa − ICP)
/// ```
#[must_use]
pub fn arterial_blood_volume(
    compliance: Compliance,
    arterial_pressure: Pressure,
    icp: Pressure,
) -> Volume {
    compliance * (arterial_pressure - icp)
}

/// Resistance of the arterial cerebrovascular bed.
///
/// A Hagen-Poiseuille law in which resistance scales with the inverse fourth
/// power of vessel radius, i.e. the inverse square of blood volume:
///
/// ```text
/// Ra = kR · Can² / Va²
/// ```
///
/// Strictly decreasing in `Va` for positive volumes.
#[must_use]
pub fn arterial_resistance(
    volume: Volume,
    coefficient: ResistanceCoefficient,
    basal_compliance: Compliance,
) -> HydraulicResistance {
    coefficient * basal_compliance * basal_compliance / (volume * volume)
}

/// Pressure in the cerebral capillaries.
///
/// [`CapillaryModel::Simplified`] balances the arterial and proximal venous
/// branches only:
///
/// ```text
/// Pc = (Pa·Rpv + ICP·Ra) / (Rpv + Ra)
/// ```
///
/// [`CapillaryModel::WithCsfFormation`] also keeps the CSF formation branch
/// through `Rf`:
///
/// ```text
/// Pc = (ICP·Rpv·Ra + ICP·Rf·Ra + Rf·Rpv·Pa) / (Ra·Rpv + Ra·Rf + Rpv·Rf)
/// ```
#[must_use]
pub fn capillary_pressure(
    model: CapillaryModel,
    arterial_pressure: Pressure,
    icp: Pressure,
    arterial_resistance: HydraulicResistance,
    proximal_venous_resistance: HydraulicResistance,
    csf_formation_resistance: HydraulicResistance,
) -> Pressure {
    let ra = arterial_resistance;
    let rpv = proximal_venous_resistance;

    match model {
        CapillaryModel::Simplified => (arterial_pressure * rpv + icp * ra) / (rpv + ra),
        CapillaryModel::WithCsfFormation => {
            let rf = csf_formation_resistance;
            (icp * rpv * ra + icp * rf * ra + arterial_pressure * rf * rpv)
                / (ra * rpv + ra * rf + rpv * rf)
        }
    }
}

/// Cerebral blood flow through the arterial bed, by Ohm's law.
///
/// ```text
/// q = (Pa − Pc) / Ra
/// ```
#[must_use]
pub fn cerebral_blood_flow(
    arterial_pressure: Pressure,
    capillary_pressure: Pressure,
    arterial_resistance: HydraulicResistance,
) -> VolumeRate {
    (arterial_pressure - capillary_pressure) / arterial_resistance
}

/// Fractional deviation of blood flow from its basal value, `(q − qn) / qn`.
#[must_use]
pub fn normalized_flow(cbf: VolumeRate, basal_cbf: VolumeRate) -> f64 {
    ((cbf - basal_cbf) / basal_cbf).value
}

/// Compliance the autoregulation drives towards for a given flow deviation.
///
/// The sigmoid is centered on the basal compliance `Can`. Its amplitude `ΔCa`
/// is `upper_bound` when flow is below basal and `lower_bound` when above,
/// with slope constant `kσ = ΔCa / 4`:
///
/// ```text
/// σ(x) = [(Can + ΔCa/2) + (Can − ΔCa/2)·exp(G·x/kσ)] / [1 + exp(G·x/kσ)]
/// ```
///
/// The target therefore stays within `(Can − lower/2, Can + upper/2)` and
/// equals `Can` when `x = 0`.
#[must_use]
pub fn autoregulation_target(
    normalized_flow: f64,
    basal_compliance: Compliance,
    upper_bound: Compliance,
    lower_bound: Compliance,
    gain: Compliance,
) -> Compliance {
    let amplitude = match normalized_flow.partial_cmp(&0.0) {
        Some(Ordering::Less) => upper_bound,
        // NaN falls through and propagates via the exponent.
        Some(Ordering::Greater) | None => lower_bound,
        // Zero deviation sits at the sigmoid midpoint for either amplitude.
        Some(Ordering::Equal) => return basal_compliance,
    };

    let high = basal_compliance + amplitude * 0.5;
    let low = basal_compliance - amplitude * 0.5;
    let exponent = (gain * normalized_flow / (amplitude * 0.25)).value;

    // Same curve, arranged so the exponential never overflows.
    if exponent > 0.0 {
        let decay = (-exponent).exp();
        (high * decay + low) / (1.0 + decay)
    } else {
        let growth = exponent.exp();
        (high + low * growth) / (1.0 + growth)
    }
}

/// First-order relaxation of the compliance towards its autoregulation target.
///
/// ```text
/// dCa/dt = (σ − Ca) / τ
/// ```
#[must_use]
pub fn compliance_rate(
    target: Compliance,
    compliance: Compliance,
    time_constant: Time,
) -> ComplianceRate {
    (target - compliance) / time_constant
}

/// Terms of the intracranial volume balance used by [`icp_rate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcpBalance {
    /// Current intracranial pressure.
    pub icp: Pressure,
    /// Current arterial compliance.
    pub compliance: Compliance,
    /// Rate of change of the arterial compliance.
    pub compliance_rate: ComplianceRate,
    /// Systemic arterial pressure.
    pub arterial_pressure: Pressure,
    /// Rate of change of the arterial pressure.
    pub arterial_pressure_rate: PressureRate,
    /// Pressure at the capillary node.
    pub capillary_pressure: Pressure,
    /// Pressure in the dural venous sinuses.
    pub venous_sinus_pressure: Pressure,
    /// Externally injected CSF; negative for withdrawal.
    pub csf_injection_rate: VolumeRate,
}

/// Time derivative of intracranial pressure.
///
/// The bracket is the net volume inflow into the craniospinal space, and the
/// leading factor the nonlinear intracranial elastance:
///
/// ```text
/// dICP/dt = kE·ICP / (1 + Ca·kE·ICP)
///         · [Ca·dPa/dt + dCa/dt·(Pa − ICP) + (Pc − ICP)/Rf − (ICP − Pvs)/Ro + I]
/// ```
#[must_use]
pub fn icp_rate(
    balance: &IcpBalance,
    elastance_coefficient: ElastanceCoefficient,
    csf_formation_resistance: HydraulicResistance,
    csf_outflow_resistance: HydraulicResistance,
) -> PressureRate {
    let IcpBalance {
        icp,
        compliance,
        compliance_rate,
        arterial_pressure,
        arterial_pressure_rate,
        capillary_pressure,
        venous_sinus_pressure,
        csf_injection_rate,
    } = *balance;

    let arterial_stretch: VolumeRate = compliance * arterial_pressure_rate;
    let compliance_change: VolumeRate = compliance_rate * (arterial_pressure - icp);
    let csf_formation: VolumeRate = (capillary_pressure - icp) / csf_formation_resistance;
    let csf_outflow: VolumeRate = (icp - venous_sinus_pressure) / csf_outflow_resistance;
    let net_inflow =
        arterial_stretch + compliance_change + csf_formation - csf_outflow + csf_injection_rate;

    let stiffness = elastance_coefficient * icp;
    let damping = 1.0 + (compliance * stiffness).value;

    stiffness / damping * net_inflow
}
