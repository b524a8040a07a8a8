//! External signals driving the model.
//!
//! The model does not generate its inputs. A caller supplies arterial pressure,
//! its rate of change, venous sinus pressure, and the CSF injection rate for
//! every step, either directly as [`DrivingSignals`] or through a [`Drive`]
//! that produces them as a function of simulated time.

use uom::{
    ConstZero,
    si::f64::{Pressure, Time, VolumeRate},
};

use crate::units::{Clinical, PressureRate};

/// Driving signals sampled at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivingSignals {
    /// Systemic arterial pressure.
    pub arterial_pressure: Pressure,

    /// Time derivative of the systemic arterial pressure.
    pub arterial_pressure_rate: PressureRate,

    /// Pressure in the dural venous sinuses.
    pub venous_sinus_pressure: Pressure,

    /// Volume rate of CSF injected (positive) or withdrawn (negative).
    pub csf_injection_rate: VolumeRate,
}

impl DrivingSignals {
    /// Constant pressures with no arterial pressure change and no injection.
    #[must_use]
    pub fn steady(arterial_pressure: Pressure, venous_sinus_pressure: Pressure) -> Self {
        Self {
            arterial_pressure,
            arterial_pressure_rate: PressureRate::ZERO,
            venous_sinus_pressure,
            csf_injection_rate: VolumeRate::ZERO,
        }
    }
}

/// Arterial pressure of 100 mmHg and venous sinus pressure of 6 mmHg, held
/// constant, without CSF injection.
impl Default for DrivingSignals {
    fn default() -> Self {
        Self::steady(Pressure::clinical(100.0), Pressure::clinical(6.0))
    }
}

/// A source of driving signals over simulated time.
///
/// [`DrivingSignals`] is itself a constant drive, and any
/// `Fn(Time) -> DrivingSignals` closure is a time-varying one.
pub trait Drive {
    /// Returns the signals at simulated time `time`.
    fn signals_at(&self, time: Time) -> DrivingSignals;
}

impl Drive for DrivingSignals {
    fn signals_at(&self, _time: Time) -> DrivingSignals {
        *self
    }
}

impl<F> Drive for F
where
    F: Fn(Time) -> DrivingSignals,
{
    fn signals_at(&self, time: Time) -> DrivingSignals {
        self(time)
    }
}
