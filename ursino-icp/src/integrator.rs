use log::{debug, trace, warn};
use uom::si::f64::{Pressure, Time, Volume, VolumeRate};

use crate::{
    config::{InitialConditions, PatientConfig},
    drive::DrivingSignals,
    error::{ConfigError, StepError},
    physiology::{self, IcpBalance},
    state::{Derivation, HemodynamicState, StateRate},
    units::{Clinical, Compliance, ComplianceRate, HydraulicResistance, PressureRate},
};

/// Simulates intracranial pressure and arterial compliance for one patient.
///
/// The integrator owns the current [`HemodynamicState`] and an immutable
/// [`PatientConfig`]. Each call to [`step`](Self::step) evaluates the model
/// equations on the current state and the supplied [`DrivingSignals`], then
/// advances the state with a single explicit Euler step.
///
/// The derivation methods evaluate one link of the equation chain on the
/// current state without changing it.
///
/// # Example
///
/// ```
/// use ursino_icp::{
///     DrivingSignals, HemodynamicIntegrator, InitialConditions, PatientConfig,
///     units::Clinical,
/// };
/// use uom::si::f64::Time;
///
/// let mut integrator =
///     HemodynamicIntegrator::new(PatientConfig::default(), InitialConditions::default())?;
///
/// let dt = Time::clinical(0.1);
/// for _ in 0..100 {
///     integrator.step(dt, &DrivingSignals::default())?;
/// }
///
/// assert!((integrator.time().in_clinical() - 10.0).abs() < 1e-9);
/// assert!((integrator.icp().in_clinical() - 9.5).abs() < 0.1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HemodynamicIntegrator {
    patient: PatientConfig,
    basal_compliance: Compliance,
    state: HemodynamicState,
}

impl HemodynamicIntegrator {
    /// Creates an integrator at time zero.
    ///
    /// The initial compliance is also the patient's basal compliance.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a constant is not strictly positive, the
    /// upper sigmoid bound does not exceed the lower one, or the initial
    /// conditions are invalid.
    pub fn new(patient: PatientConfig, initial: InitialConditions) -> Result<Self, ConfigError> {
        patient.validate()?;
        initial.validate()?;

        debug!(
            "patient created: icp={:.3} {}, compliance={:.4} {}",
            initial.icp.in_clinical(),
            Pressure::UNIT,
            initial.arterial_compliance.in_clinical(),
            Compliance::UNIT,
        );

        Ok(Self {
            patient,
            basal_compliance: initial.arterial_compliance,
            state: HemodynamicState {
                time: Time::clinical(0.0),
                icp: initial.icp,
                arterial_compliance: initial.arterial_compliance,
            },
        })
    }

    /// Simulated time elapsed since creation.
    #[must_use]
    pub fn time(&self) -> Time {
        self.state.time
    }

    /// Current intracranial pressure.
    #[must_use]
    pub fn icp(&self) -> Pressure {
        self.state.icp
    }

    /// Current arterial compliance.
    #[must_use]
    pub fn arterial_compliance(&self) -> Compliance {
        self.state.arterial_compliance
    }

    /// Current time and state variables.
    #[must_use]
    pub fn state(&self) -> HemodynamicState {
        self.state
    }

    /// Constants the integrator was built with.
    #[must_use]
    pub fn patient(&self) -> &PatientConfig {
        &self.patient
    }

    /// Compliance the autoregulation sigmoid is centered on.
    #[must_use]
    pub fn basal_compliance(&self) -> Compliance {
        self.basal_compliance
    }

    /// Range of compliances the autoregulation can drive towards.
    ///
    /// Returns `(Can − lower/2, Can + upper/2)`. The model is physically
    /// meaningful while the compliance stays inside it, but the integrator
    /// does not enforce it.
    #[must_use]
    pub fn compliance_envelope(&self) -> (Compliance, Compliance) {
        (
            self.basal_compliance - self.patient.sigmoid_lower_bound * 0.5,
            self.basal_compliance + self.patient.sigmoid_upper_bound * 0.5,
        )
    }

    /// Blood volume of the arterial bed at the given arterial pressure.
    #[must_use]
    pub fn arterial_blood_volume(&self, arterial_pressure: Pressure) -> Volume {
        physiology::arterial_blood_volume(
            self.state.arterial_compliance,
            arterial_pressure,
            self.state.icp,
        )
    }

    /// Resistance of the arterial bed holding the given blood volume.
    #[must_use]
    pub fn arterial_resistance(&self, arterial_blood_volume: Volume) -> HydraulicResistance {
        physiology::arterial_resistance(
            arterial_blood_volume,
            self.patient.arterial_resistance_coefficient,
            self.basal_compliance,
        )
    }

    /// Capillary pressure downstream of the arterial bed.
    #[must_use]
    pub fn capillary_pressure(
        &self,
        arterial_pressure: Pressure,
        arterial_resistance: HydraulicResistance,
    ) -> Pressure {
        physiology::capillary_pressure(
            self.patient.capillary_model,
            arterial_pressure,
            self.state.icp,
            arterial_resistance,
            self.patient.proximal_venous_resistance,
            self.patient.csf_formation_resistance,
        )
    }

    /// Cerebral blood flow across the arterial bed.
    #[must_use]
    pub fn cerebral_blood_flow(
        &self,
        arterial_pressure: Pressure,
        capillary_pressure: Pressure,
        arterial_resistance: HydraulicResistance,
    ) -> VolumeRate {
        physiology::cerebral_blood_flow(arterial_pressure, capillary_pressure, arterial_resistance)
    }

    /// Rate at which autoregulation changes the arterial compliance.
    ///
    /// Flow above basal drives the compliance down (vasoconstriction), flow
    /// below basal drives it up (vasodilation), and basal flow leaves the
    /// basal compliance unchanged.
    #[must_use]
    pub fn arterial_compliance_rate(&self, cbf: VolumeRate) -> ComplianceRate {
        let target = physiology::autoregulation_target(
            physiology::normalized_flow(cbf, self.patient.basal_cbf),
            self.basal_compliance,
            self.patient.sigmoid_upper_bound,
            self.patient.sigmoid_lower_bound,
            self.patient.autoregulation_gain,
        );

        physiology::compliance_rate(
            target,
            self.state.arterial_compliance,
            self.patient.autoregulation_time_constant,
        )
    }

    /// Rate of change of intracranial pressure.
    #[must_use]
    pub fn icp_rate(
        &self,
        signals: &DrivingSignals,
        compliance_rate: ComplianceRate,
        capillary_pressure: Pressure,
    ) -> PressureRate {
        let balance = IcpBalance {
            icp: self.state.icp,
            compliance: self.state.arterial_compliance,
            compliance_rate,
            arterial_pressure: signals.arterial_pressure,
            arterial_pressure_rate: signals.arterial_pressure_rate,
            capillary_pressure,
            venous_sinus_pressure: signals.venous_sinus_pressure,
            csf_injection_rate: signals.csf_injection_rate,
        };

        physiology::icp_rate(
            &balance,
            self.patient.elastance_coefficient,
            self.patient.csf_formation_resistance,
            self.patient.csf_outflow_resistance,
        )
    }

    /// Evaluates the full equation chain on the current state.
    #[must_use]
    pub fn derive(&self, signals: &DrivingSignals) -> Derivation {
        let arterial_pressure = signals.arterial_pressure;

        let arterial_blood_volume = self.arterial_blood_volume(arterial_pressure);
        let arterial_resistance = self.arterial_resistance(arterial_blood_volume);
        let capillary_pressure = self.capillary_pressure(arterial_pressure, arterial_resistance);
        let cerebral_blood_flow =
            self.cerebral_blood_flow(arterial_pressure, capillary_pressure, arterial_resistance);
        let compliance_rate = self.arterial_compliance_rate(cerebral_blood_flow);
        let icp_rate = self.icp_rate(signals, compliance_rate, capillary_pressure);

        Derivation {
            arterial_blood_volume,
            arterial_resistance,
            capillary_pressure,
            cerebral_blood_flow,
            rate: StateRate {
                icp: icp_rate,
                arterial_compliance: compliance_rate,
            },
        }
    }

    /// Advances the simulation by `dt` with one explicit Euler step.
    ///
    /// All rates are computed from the state before the step, then time, ICP,
    /// and compliance are replaced together. Returns the derivation the step
    /// used.
    ///
    /// Stability is the caller's responsibility. A step at least as long as
    /// the autoregulation time constant is accepted but logged as a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidTimestep`] if `dt` is not positive and
    /// finite. The state is left untouched.
    pub fn step(&mut self, dt: Time, signals: &DrivingSignals) -> Result<Derivation, StepError> {
        check_timestep(dt)?;
        self.warn_if_coarse(dt);
        Ok(self.advance(dt, signals))
    }

    /// Applies one Euler step with a timestep already accepted by
    /// [`check_timestep`].
    pub(crate) fn advance(&mut self, dt: Time, signals: &DrivingSignals) -> Derivation {
        let derivation = self.derive(signals);
        self.state = self.state.step(derivation.rate, dt);

        trace!(
            "t={:.3} s: icp={:.4} mmHg, compliance={:.5} ml/mmHg, cbf={:.3} ml/s",
            self.state.time.in_clinical(),
            self.state.icp.in_clinical(),
            self.state.arterial_compliance.in_clinical(),
            derivation.cerebral_blood_flow.in_clinical(),
        );

        derivation
    }

    pub(crate) fn warn_if_coarse(&self, dt: Time) {
        if dt >= self.patient.autoregulation_time_constant {
            warn!(
                "timestep of {} s is not shorter than the autoregulation time constant; \
                 the compliance will overshoot",
                dt.in_clinical()
            );
        }
    }
}

/// Accepts only positive, finite timesteps.
pub(crate) fn check_timestep(dt: Time) -> Result<(), StepError> {
    let seconds = dt.in_clinical();
    if seconds.is_finite() && seconds > 0.0 {
        Ok(())
    } else {
        Err(StepError::InvalidTimestep { seconds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::config::CapillaryModel;

    fn default_integrator() -> HemodynamicIntegrator {
        HemodynamicIntegrator::new(PatientConfig::default(), InitialConditions::default())
            .expect("defaults are valid")
    }

    #[test]
    fn starts_at_time_zero_with_initial_state() {
        let integrator = default_integrator();

        assert_eq!(integrator.time().in_clinical(), 0.0);
        assert_relative_eq!(integrator.icp().in_clinical(), 9.5, max_relative = 1e-12);
        assert_relative_eq!(
            integrator.arterial_compliance().in_clinical(),
            0.15,
            max_relative = 1e-12
        );
        assert_eq!(integrator.basal_compliance(), integrator.arterial_compliance());
    }

    #[test]
    fn sigmoid_bounds_must_be_ordered() {
        for (high, low) in [(0.3, 0.3), (0.075, 0.75), (0.1, 0.100_000_1)] {
            let patient = PatientConfig {
                sigmoid_upper_bound: Compliance::clinical(high),
                sigmoid_lower_bound: Compliance::clinical(low),
                ..PatientConfig::default()
            };

            let result = HemodynamicIntegrator::new(patient, InitialConditions::default());
            assert!(
                matches!(result, Err(ConfigError::InvalidSigmoidBounds { .. })),
                "bounds high={high}, low={low} should be rejected"
            );
        }
    }

    #[test]
    fn basal_compliance_follows_initial_compliance() {
        let integrator = HemodynamicIntegrator::new(
            PatientConfig::default(),
            InitialConditions {
                arterial_compliance: Compliance::clinical(0.2),
                ..InitialConditions::default()
            },
        )
        .unwrap();

        assert_relative_eq!(
            integrator.basal_compliance().in_clinical(),
            0.2,
            max_relative = 1e-12
        );

        let (low, high) = integrator.compliance_envelope();
        assert_relative_eq!(low.in_clinical(), 0.2 - 0.0375, max_relative = 1e-12);
        assert_relative_eq!(high.in_clinical(), 0.2 + 0.375, max_relative = 1e-12);
    }

    #[test]
    fn derivation_chain_at_defaults() {
        let integrator = default_integrator();
        let derivation = integrator.derive(&DrivingSignals::default());

        assert_relative_eq!(
            derivation.arterial_blood_volume.in_clinical(),
            13.575,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            derivation.arterial_resistance.in_clinical(),
            5.994_932_999_603_187,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            derivation.capillary_pressure.in_clinical(),
            25.010_855_457_286_876,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            derivation.cerebral_blood_flow.in_clinical(),
            12.508_754_401_037_802,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            derivation.rate.arterial_compliance.in_clinical(),
            -5.251_266_982_596_730_4e-5,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            derivation.rate.icp.in_clinical(),
            -0.004_413_463_855_814_422,
            max_relative = 1e-6
        );
    }

    #[test]
    fn no_compliance_drive_at_basal_flow() {
        let integrator = default_integrator();
        let rate = integrator.arterial_compliance_rate(integrator.patient().basal_cbf);

        assert_relative_eq!(rate.in_clinical(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn flow_deviation_drives_compliance_against_it() {
        let integrator = default_integrator();

        let above = integrator.arterial_compliance_rate(VolumeRate::clinical(15.0));
        let below = integrator.arterial_compliance_rate(VolumeRate::clinical(10.0));

        assert!(above.value < 0.0, "high flow should constrict");
        assert!(below.value > 0.0, "low flow should dilate");
    }

    #[test]
    fn injection_strictly_raises_icp_rate() {
        let integrator = default_integrator();
        let derivation = integrator.derive(&DrivingSignals::default());

        let rate_with = |ml_per_s: f64| {
            let signals = DrivingSignals {
                csf_injection_rate: VolumeRate::clinical(ml_per_s),
                ..DrivingSignals::default()
            };
            integrator
                .icp_rate(
                    &signals,
                    derivation.rate.arterial_compliance,
                    derivation.capillary_pressure,
                )
                .in_clinical()
        };

        assert_relative_eq!(rate_with(-0.1), -0.094_752_776_585_444_86, max_relative = 1e-6);
        assert_relative_eq!(rate_with(0.1), 0.085_925_848_873_816_02, max_relative = 1e-6);
        assert!(rate_with(-0.1) < rate_with(0.0));
        assert!(rate_with(0.0) < rate_with(0.1));
        assert!(rate_with(0.1) < rate_with(0.1 + 1e-6));
    }

    #[test]
    fn single_step_matches_reference() {
        let mut integrator = default_integrator();

        integrator
            .step(Time::clinical(0.1), &DrivingSignals::default())
            .unwrap();

        assert_relative_eq!(integrator.time().in_clinical(), 0.1, max_relative = 1e-12);
        assert_relative_eq!(
            integrator.icp().in_clinical(),
            9.499_558_653_614_418,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            integrator.arterial_compliance().in_clinical(),
            0.149_994_748_733_017_4,
            max_relative = 1e-9
        );
    }

    #[test]
    fn step_uses_rates_from_the_previous_state() {
        let mut integrator = default_integrator();
        let before = integrator.state();
        let signals = DrivingSignals {
            csf_injection_rate: VolumeRate::clinical(0.2),
            ..DrivingSignals::default()
        };
        let dt = Time::clinical(0.05);

        let expected = before.step(integrator.derive(&signals).rate, dt);
        let derivation = integrator.step(dt, &signals).unwrap();

        assert_eq!(integrator.state(), expected);
        assert_eq!(before.step(derivation.rate, dt), expected);
    }

    #[test]
    fn time_is_steps_times_timestep() {
        let mut integrator = default_integrator();
        let dt = Time::clinical(0.01);
        let signals = |time: Time| DrivingSignals {
            arterial_pressure: Pressure::clinical(100.0 + 20.0 * time.in_clinical().sin()),
            csf_injection_rate: VolumeRate::clinical(0.05),
            ..DrivingSignals::default()
        };

        for _ in 0..1000 {
            let now = integrator.time();
            integrator.step(dt, &signals(now)).unwrap();
        }

        assert_relative_eq!(integrator.time().in_clinical(), 10.0, max_relative = 1e-9);
    }

    #[test]
    fn invalid_timesteps_are_rejected_without_side_effects() {
        let mut integrator = default_integrator();
        let before = integrator.state();

        for seconds in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let result = integrator.step(Time::clinical(seconds), &DrivingSignals::default());
            assert!(
                matches!(result, Err(StepError::InvalidTimestep { .. })),
                "dt = {seconds} should be rejected"
            );
            assert_eq!(integrator.state(), before);
        }
    }

    #[test]
    fn long_timesteps_are_accepted() {
        let mut integrator = default_integrator();

        assert!(
            integrator
                .step(Time::clinical(30.0), &DrivingSignals::default())
                .is_ok()
        );
        assert_relative_eq!(integrator.time().in_clinical(), 30.0, max_relative = 1e-12);
    }

    #[test]
    fn capillary_model_changes_the_derivation() {
        let full = HemodynamicIntegrator::new(
            PatientConfig {
                capillary_model: CapillaryModel::WithCsfFormation,
                ..PatientConfig::default()
            },
            InitialConditions::default(),
        )
        .unwrap();

        let simplified = default_integrator().derive(&DrivingSignals::default());
        let unabridged = full.derive(&DrivingSignals::default());

        assert!(unabridged.capillary_pressure < simplified.capillary_pressure);
        assert_relative_eq!(
            unabridged.capillary_pressure.in_clinical(),
            simplified.capillary_pressure.in_clinical(),
            max_relative = 1e-2
        );
    }
}
