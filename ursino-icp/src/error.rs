use thiserror::Error;

/// Errors that can occur when building a [`HemodynamicIntegrator`].
///
/// Values are reported in clinical units.
///
/// [`HemodynamicIntegrator`]: crate::HemodynamicIntegrator
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// The upper autoregulation sigmoid bound does not exceed the lower one.
    #[error("upper sigmoid bound ({high} ml/mmHg) must exceed the lower bound ({low} ml/mmHg)")]
    InvalidSigmoidBounds { high: f64, low: f64 },

    /// A constant (or the initial compliance) is zero, negative, or not finite.
    #[error("`{parameter}` must be strictly positive and finite")]
    NotStrictlyPositive { parameter: &'static str },

    /// An initial condition is not finite.
    #[error("`{parameter}` must be finite")]
    NotFinite { parameter: &'static str },
}

/// Errors that can occur when stepping a [`HemodynamicIntegrator`] or
/// planning a run.
///
/// A rejected step leaves the integrator state unchanged.
///
/// [`HemodynamicIntegrator`]: crate::HemodynamicIntegrator
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StepError {
    /// The timestep is zero, negative, or not finite.
    #[error("timestep must be positive and finite, got {seconds} s")]
    InvalidTimestep { seconds: f64 },

    /// The run duration is not finite, or needs more steps than fit in a `usize`.
    #[error("duration of {seconds} s cannot be covered by a countable number of steps")]
    InvalidDuration { seconds: f64 },
}
