use uom::si::f64::{Pressure, Time};

use crate::state::HemodynamicState;

/// Indicates how a run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Completed all requested steps.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// How the run terminated.
    pub status: Status,

    /// State after each step, starting with the initial state.
    pub states: Vec<HemodynamicState>,

    /// Number of integration steps completed.
    pub steps: usize,
}

impl Trajectory {
    /// The last recorded state.
    #[must_use]
    pub fn last(&self) -> Option<&HemodynamicState> {
        self.states.last()
    }

    /// Iterates over `(time, icp)` pairs, for plotting or export.
    pub fn icp_series(&self) -> impl Iterator<Item = (Time, Pressure)> + '_ {
        self.states.iter().map(|state| (state.time, state.icp))
    }
}
