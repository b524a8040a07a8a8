//! Multi-minute scenarios exercising the integrator end to end.

use approx::assert_relative_eq;
use uom::si::f64::{Pressure, Time, VolumeRate};
use ursino_icp::{
    DrivingSignals, HemodynamicIntegrator, InitialConditions, PatientConfig, simulate,
    units::{Clinical, PressureRate},
};

fn integrator(patient: PatientConfig) -> HemodynamicIntegrator {
    HemodynamicIntegrator::new(patient, InitialConditions::default()).expect("valid patient")
}

/// Arterial pressure oscillating around 100 mmHg, with a small CSF infusion.
fn oscillating_drive(time: Time) -> DrivingSignals {
    let t = time.in_clinical();
    DrivingSignals {
        arterial_pressure: Pressure::clinical(100.0 + 10.0 * (0.5 * t).sin()),
        arterial_pressure_rate: PressureRate::clinical(5.0 * (0.5 * t).cos()),
        venous_sinus_pressure: Pressure::clinical(6.0),
        csf_injection_rate: VolumeRate::clinical(0.05),
    }
}

/// Final (ICP, compliance) in clinical units after integrating for 20 s.
fn final_state(dt: f64) -> (f64, f64) {
    let mut integrator = integrator(PatientConfig::default());
    let dt = Time::clinical(dt);
    let steps = simulate::steps_for(Time::clinical(20.0), dt).unwrap();

    simulate::run(&mut integrator, &oscillating_drive, dt, steps, ()).unwrap();

    (
        integrator.icp().in_clinical(),
        integrator.arterial_compliance().in_clinical(),
    )
}

#[test]
fn defaults_are_near_a_fixed_point() {
    let mut integrator = integrator(PatientConfig::default());
    let signals = DrivingSignals::default();

    let derivation = integrator.derive(&signals);
    assert!(derivation.rate.icp.in_clinical().abs() < 0.01);
    assert!(derivation.rate.arterial_compliance.in_clinical().abs() < 1e-4);

    let trajectory =
        simulate::run_unobserved(&mut integrator, &signals, Time::clinical(0.1), 1000).unwrap();

    for state in &trajectory.states {
        assert_relative_eq!(state.icp.in_clinical(), 9.5, epsilon = 0.1);
        assert_relative_eq!(state.arterial_compliance.in_clinical(), 0.15, epsilon = 1e-3);
    }
}

#[test]
fn euler_error_shrinks_linearly_with_timestep() {
    let (reference_icp, reference_compliance) = final_state(0.000_5);
    assert_relative_eq!(reference_icp, 10.3134, epsilon = 1e-3);

    let (coarse_icp, coarse_compliance) = final_state(0.1);
    let (fine_icp, fine_compliance) = final_state(0.05);

    let coarse_error = (coarse_icp - reference_icp).abs();
    let fine_error = (fine_icp - reference_icp).abs();
    assert!(coarse_error < 0.1, "coarse error {coarse_error}");
    assert!(fine_error < coarse_error);

    // Halving the step halves the error of a first-order method.
    let ratio = coarse_error / fine_error;
    assert!((1.8..2.2).contains(&ratio), "ICP error ratio {ratio}");

    let ratio = (coarse_compliance - reference_compliance).abs()
        / (fine_compliance - reference_compliance).abs();
    assert!((1.8..2.2).contains(&ratio), "compliance error ratio {ratio}");
}

#[test]
fn csf_injection_raises_icp_and_removal_lowers_it() {
    let dt = Time::clinical(0.1);

    let icp_after_minute = |ml_per_s: f64| {
        let mut integrator = integrator(PatientConfig::default());
        let signals = DrivingSignals {
            csf_injection_rate: VolumeRate::clinical(ml_per_s),
            ..DrivingSignals::default()
        };
        simulate::run_unobserved(&mut integrator, &signals, dt, 600).unwrap();
        (
            integrator.icp().in_clinical(),
            integrator.arterial_compliance().in_clinical(),
        )
    };

    let (infused_icp, infused_compliance) = icp_after_minute(0.1);
    let (drained_icp, drained_compliance) = icp_after_minute(-0.1);

    assert_relative_eq!(infused_icp, 18.787, epsilon = 0.05);
    assert_relative_eq!(drained_icp, 4.885, epsilon = 0.05);

    // Raised ICP lowers perfusion, so autoregulation dilates, and vice versa.
    assert!(infused_compliance > 0.15);
    assert!(drained_compliance < 0.15);
}

#[test]
fn hypertension_constricts_the_arterial_bed() {
    let mut integrator = integrator(PatientConfig::default());
    let signals = DrivingSignals::steady(Pressure::clinical(120.0), Pressure::clinical(6.0));

    let derivation = integrator.derive(&signals);
    assert_relative_eq!(derivation.cerebral_blood_flow.in_clinical(), 21.0, epsilon = 0.01);

    simulate::run_unobserved(&mut integrator, &signals, Time::clinical(0.1), 600).unwrap();

    let (low, _) = integrator.compliance_envelope();
    assert!(integrator.arterial_compliance() < integrator.basal_compliance());
    assert!(integrator.arterial_compliance() > low);
    assert_relative_eq!(integrator.icp().in_clinical(), 6.642, epsilon = 0.01);
}

#[test]
fn lundberg_preset_sustains_plateau_waves() {
    let mut integrator = integrator(PatientConfig::lundberg_a_waves());
    let dt = Time::clinical(0.01);
    let steps = simulate::steps_for(Time::clinical(2000.0), dt).unwrap();

    let mut lowest = f64::INFINITY;
    let mut highest = f64::NEG_INFINITY;
    simulate::run(
        &mut integrator,
        &DrivingSignals::default(),
        dt,
        steps,
        |event: &simulate::Event| {
            // Skip the initial transient.
            if event.state.time.in_clinical() > 1000.0 {
                let icp = event.state.icp.in_clinical();
                lowest = lowest.min(icp);
                highest = highest.max(icp);
            }
            None
        },
    )
    .unwrap();

    assert_relative_eq!(integrator.time().in_clinical(), 2000.0, max_relative = 1e-9);
    assert!(
        highest - lowest > 10.0,
        "expected sustained oscillations, ICP ranged {lowest}..{highest} mmHg"
    );
    assert!(lowest > 15.0 && highest < 80.0);
}
