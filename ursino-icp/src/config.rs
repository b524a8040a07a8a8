use uom::si::f64::{Pressure, Time, VolumeRate};

use crate::{
    error::ConfigError,
    units::{Clinical, Compliance, ElastanceCoefficient, HydraulicResistance, ResistanceCoefficient},
};

/// Physiological constants describing one simulated patient.
///
/// The [`Default`] values are the basal parameters reported by Ursino & Lodi
/// (1997), Table 1.
/// Fields are validated when the record is handed to
/// [`HemodynamicIntegrator::new`]: every constant must be strictly positive and
/// finite, and the upper sigmoid bound must exceed the lower one.
///
/// The basal arterial compliance is not part of this record.
/// It is always the initial compliance given in [`InitialConditions`].
///
/// [`HemodynamicIntegrator::new`]: crate::HemodynamicIntegrator::new
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatientConfig {
    /// Resistance met by CSF just before reabsorption at venous sinus pressure.
    pub csf_outflow_resistance: HydraulicResistance,

    /// Resistance of the proximal venous cerebrovascular bed.
    pub proximal_venous_resistance: HydraulicResistance,

    /// Resistance met by newly formed CSF.
    pub csf_formation_resistance: HydraulicResistance,

    /// Amplitude of the autoregulation sigmoid when flow is below basal
    /// (vasodilation side).
    pub sigmoid_upper_bound: Compliance,

    /// Amplitude of the autoregulation sigmoid when flow is above basal
    /// (vasoconstriction side).
    pub sigmoid_lower_bound: Compliance,

    /// Intracranial elastance coefficient (Avezaat et al.).
    pub elastance_coefficient: ElastanceCoefficient,

    /// Hagen-Poiseuille proportionality constant of the arterial bed.
    pub arterial_resistance_coefficient: ResistanceCoefficient,

    /// Time constant of the compliance autoregulation.
    pub autoregulation_time_constant: Time,

    /// Basal cerebral blood flow.
    ///
    /// Named `q_n` in the paper.
    pub basal_cbf: VolumeRate,

    /// Compliance change per 100 % change in cerebral blood flow.
    pub autoregulation_gain: Compliance,

    /// Which capillary pressure relation to use.
    pub capillary_model: CapillaryModel,
}

impl PatientConfig {
    /// Parameters producing self-sustained Lundberg A waves.
    ///
    /// Identical to the defaults except for a high CSF outflow resistance
    /// (6.32e3 mmHg·s/ml) and a high elastance coefficient (0.23 /ml).
    #[must_use]
    pub fn lundberg_a_waves() -> Self {
        Self {
            csf_outflow_resistance: HydraulicResistance::clinical(6.32e3),
            elastance_coefficient: ElastanceCoefficient::clinical(0.23),
            ..Self::default()
        }
    }

    /// Checks the constants against the model's requirements.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSigmoidBounds`] if the upper sigmoid
    /// bound does not exceed the lower one, whatever their signs. Otherwise
    /// returns [`ConfigError::NotStrictlyPositive`] naming the first constant
    /// that is not strictly positive and finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sigmoid_upper_bound <= self.sigmoid_lower_bound {
            return Err(ConfigError::InvalidSigmoidBounds {
                high: self.sigmoid_upper_bound.in_clinical(),
                low: self.sigmoid_lower_bound.in_clinical(),
            });
        }

        let checks = [
            ("csf_outflow_resistance", self.csf_outflow_resistance.value),
            (
                "proximal_venous_resistance",
                self.proximal_venous_resistance.value,
            ),
            ("csf_formation_resistance", self.csf_formation_resistance.value),
            ("sigmoid_upper_bound", self.sigmoid_upper_bound.value),
            ("sigmoid_lower_bound", self.sigmoid_lower_bound.value),
            ("elastance_coefficient", self.elastance_coefficient.value),
            (
                "arterial_resistance_coefficient",
                self.arterial_resistance_coefficient.value,
            ),
            (
                "autoregulation_time_constant",
                self.autoregulation_time_constant.value,
            ),
            ("basal_cbf", self.basal_cbf.value),
            ("autoregulation_gain", self.autoregulation_gain.value),
        ];

        for (parameter, value) in checks {
            strictly_positive(parameter, value)?;
        }

        Ok(())
    }
}

impl Default for PatientConfig {
    fn default() -> Self {
        Self {
            csf_outflow_resistance: HydraulicResistance::clinical(526.3),
            proximal_venous_resistance: HydraulicResistance::clinical(1.24),
            csf_formation_resistance: HydraulicResistance::clinical(2.38e3),
            sigmoid_upper_bound: Compliance::clinical(0.75),
            sigmoid_lower_bound: Compliance::clinical(0.075),
            elastance_coefficient: ElastanceCoefficient::clinical(0.11),
            arterial_resistance_coefficient: ResistanceCoefficient::clinical(4.91e4),
            autoregulation_time_constant: Time::clinical(20.0),
            basal_cbf: VolumeRate::clinical(12.5),
            autoregulation_gain: Compliance::clinical(1.5),
            capillary_model: CapillaryModel::default(),
        }
    }
}

/// Relation used to compute capillary pressure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CapillaryModel {
    /// Neglects the flow diverted into CSF formation.
    ///
    /// This is the form recommended by the model's authors.
    #[default]
    Simplified,

    /// Keeps the CSF formation branch in the capillary node balance.
    WithCsfFormation,
}

/// State the integrator starts from.
///
/// The initial compliance also becomes the patient's basal compliance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialConditions {
    /// Intracranial pressure at time zero.
    pub icp: Pressure,

    /// Arterial compliance at time zero, and the centre of the
    /// autoregulation sigmoid.
    pub arterial_compliance: Compliance,
}

impl InitialConditions {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.icp.value.is_finite() {
            return Err(ConfigError::NotFinite {
                parameter: "initial icp",
            });
        }
        strictly_positive(
            "initial arterial_compliance",
            self.arterial_compliance.value,
        )
    }
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            icp: Pressure::clinical(9.5),
            arterial_compliance: Compliance::clinical(0.15),
        }
    }
}

fn strictly_positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotStrictlyPositive { parameter })
    }
}
