//! Fixed-step runs of a [`HemodynamicIntegrator`].
//!
//! A run samples a [`Drive`] at the integrator's current time, steps the
//! integrator forward with explicit Euler, and records every state:
//!
//! ```text
//! state_{n+1} = state_n + rate(state_n, signals(t_n)) * dt
//! ```
//!
//! # Example
//!
//! ```
//! use ursino_icp::{
//!     DrivingSignals, HemodynamicIntegrator, InitialConditions, PatientConfig,
//!     simulate, units::Clinical,
//! };
//! use uom::si::f64::Time;
//!
//! let mut integrator =
//!     HemodynamicIntegrator::new(PatientConfig::default(), InitialConditions::default())?;
//! let dt = Time::clinical(0.1);
//! let steps = simulate::steps_for(Time::clinical(60.0), dt)?;
//!
//! let trajectory =
//!     simulate::run_unobserved(&mut integrator, &DrivingSignals::default(), dt, steps)?;
//!
//! assert_eq!(trajectory.states.len(), steps + 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod action;
mod event;
mod trajectory;

pub use action::Action;
pub use event::Event;
pub use trajectory::{Status, Trajectory};

use log::{debug, warn};
use uom::si::f64::Time;

use crate::{
    drive::Drive,
    error::StepError,
    integrator::{HemodynamicIntegrator, check_timestep},
    observer::Observer,
    state::HemodynamicState,
    units::Clinical,
};

/// Upper bound on the states reserved before a run starts.
const RESERVED_STATES: usize = 1 << 16;

/// Steps `integrator` forward `steps` times, sampling `drive` before each step.
///
/// # Algorithm
///
/// 1. Record the initial state and emit it as step 0.
/// 2. For each step:
///    - Sample the drive at the integrator's current time.
///    - Step the integrator by `dt`.
///    - Record the new state and emit an [`Event`] with the derivation used.
///    - If the observer returns [`Action::StopEarly`], terminate.
/// 3. Return the trajectory.
///
/// The integrator is left at the last recorded state, so runs can be chained.
/// A `dt` at least as long as the autoregulation time constant is logged once
/// per run.
///
/// # Errors
///
/// Returns [`StepError::InvalidTimestep`] if `dt` is not positive and finite,
/// before any step is taken.
pub fn run<D, Obs>(
    integrator: &mut HemodynamicIntegrator,
    drive: &D,
    dt: Time,
    steps: usize,
    mut observer: Obs,
) -> Result<Trajectory, StepError>
where
    D: Drive + ?Sized,
    Obs: Observer,
{
    check_timestep(dt)?;
    integrator.warn_if_coarse(dt);

    let mut envelope = EnvelopeWatch::new(integrator);
    let initial = integrator.state();

    let mut states = Vec::with_capacity(steps.saturating_add(1).min(RESERVED_STATES));
    states.push(initial);

    let event = Event {
        step: 0,
        state: initial,
        derivation: None,
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(finish(states, Status::StoppedByObserver, 0));
    }

    for step in 1..=steps {
        let signals = drive.signals_at(integrator.time());
        let derivation = integrator.advance(dt, &signals);
        let state = integrator.state();

        envelope.check(&state);
        states.push(state);

        let event = Event {
            step,
            state,
            derivation: Some(derivation),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(finish(states, Status::StoppedByObserver, step));
        }
    }

    Ok(finish(states, Status::Complete, steps))
}

/// Runs without observation.
///
/// This is a convenience wrapper around [`run`] that discards events.
///
/// # Errors
///
/// Returns [`StepError::InvalidTimestep`] if `dt` is not positive and finite.
pub fn run_unobserved<D>(
    integrator: &mut HemodynamicIntegrator,
    drive: &D,
    dt: Time,
    steps: usize,
) -> Result<Trajectory, StepError>
where
    D: Drive + ?Sized,
{
    run(integrator, drive, dt, steps, ())
}

/// Number of `dt` steps needed to cover `duration`.
///
/// Rounds up, ignoring floating-point noise below a billionth of a step, so
/// `steps_for(2000 s, 0.01 s)` is exactly 200 000.
///
/// # Errors
///
/// Returns [`StepError::InvalidTimestep`] if `dt` is not positive and finite,
/// and [`StepError::InvalidDuration`] if `duration` is not finite or the step
/// count does not fit in a `usize`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn steps_for(duration: Time, dt: Time) -> Result<usize, StepError> {
    check_timestep(dt)?;

    let seconds = duration.in_clinical();
    let steps = ((duration / dt).value - 1e-9).ceil();
    if !seconds.is_finite() || steps >= usize::MAX as f64 {
        return Err(StepError::InvalidDuration { seconds });
    }

    Ok(if steps > 0.0 { steps as usize } else { 0 })
}

fn finish(states: Vec<HemodynamicState>, status: Status, steps: usize) -> Trajectory {
    if let Some(last) = states.last() {
        debug!(
            "run finished ({status:?}) after {steps} steps at t={:.3} s: icp={:.4} mmHg",
            last.time.in_clinical(),
            last.icp.in_clinical(),
        );
    }

    Trajectory {
        status,
        states,
        steps,
    }
}

/// Logs when the compliance crosses the autoregulation envelope.
struct EnvelopeWatch {
    low: f64,
    high: f64,
    outside: bool,
}

impl EnvelopeWatch {
    fn new(integrator: &HemodynamicIntegrator) -> Self {
        let (low, high) = integrator.compliance_envelope();
        let mut watch = Self {
            low: low.in_clinical(),
            high: high.in_clinical(),
            outside: false,
        };
        watch.check(&integrator.state());
        watch
    }

    fn check(&mut self, state: &HemodynamicState) {
        let compliance = state.arterial_compliance.in_clinical();
        let outside = !(self.low < compliance && compliance < self.high);

        if outside && !self.outside {
            warn!(
                "t={:.3} s: compliance {compliance:.5} ml/mmHg left the autoregulation envelope \
                 ({:.5}, {:.5})",
                state.time.in_clinical(),
                self.low,
                self.high,
            );
        } else if !outside && self.outside {
            debug!(
                "t={:.3} s: compliance back inside the autoregulation envelope",
                state.time.in_clinical()
            );
        }
        self.outside = outside;
    }
}
