//! # Lundberg A waves
//!
//! Simulates a patient with poor CSF reabsorption and a stiff craniospinal
//! space under constant arterial and venous sinus pressures. With these
//! parameters the interaction between autoregulation and ICP becomes unstable
//! and settles into self-sustained plateau waves.
//!
//! The trajectory is written to stdout as CSV, one row per simulated second.
//!
//! ## Running the Example
//!
//! ```sh
//! RUST_LOG=info cargo run --example lundberg_waves > waves.csv
//! ```

use std::io::{self, BufWriter, Write};

use log::info;
use uom::si::f64::Time;
use ursino_icp::{
    DrivingSignals, HemodynamicIntegrator, InitialConditions, PatientConfig,
    simulate::{self, Event},
    units::Clinical,
};

/// Simulated duration, in seconds.
const DURATION: f64 = 2000.0;

/// Integration timestep, in seconds.
const TIMESTEP: f64 = 0.01;

/// Steps between written rows.
const ROW_EVERY: usize = 100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let patient = PatientConfig::lundberg_a_waves();
    let mut integrator = HemodynamicIntegrator::new(patient, InitialConditions::default())?;

    let dt = Time::clinical(TIMESTEP);
    let steps = simulate::steps_for(Time::clinical(DURATION), dt)?;
    info!("simulating {DURATION} s in {steps} steps of {TIMESTEP} s");

    let mut out = BufWriter::new(io::stdout().lock());
    writeln!(out, "time_s,icp_mmhg,compliance_ml_per_mmhg")?;

    let mut write_error = None;
    let trajectory = simulate::run(
        &mut integrator,
        &DrivingSignals::default(),
        dt,
        steps,
        |event: &Event| {
            if event.step % ROW_EVERY != 0 {
                return None;
            }
            let row = writeln!(
                out,
                "{:.2},{:.4},{:.6}",
                event.state.time.in_clinical(),
                event.state.icp.in_clinical(),
                event.state.arterial_compliance.in_clinical(),
            );
            match row {
                Ok(()) => None,
                Err(error) => {
                    write_error = Some(error);
                    Some(simulate::Action::StopEarly)
                }
            }
        },
    )?;

    if let Some(error) = write_error {
        return Err(error.into());
    }
    out.flush()?;

    let (lowest, highest) = trajectory
        .icp_series()
        .filter(|(time, _)| time.in_clinical() > DURATION / 2.0)
        .map(|(_, icp)| icp.in_clinical())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), icp| {
            (lo.min(icp), hi.max(icp))
        });
    info!("ICP over the second half ranged {lowest:.1}..{highest:.1} mmHg");

    Ok(())
}
