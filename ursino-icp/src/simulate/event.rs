use crate::state::{Derivation, HemodynamicState};

/// Event emitted for each recorded state of a run.
///
/// Step 0 is the initial state, before any integration.
/// Steps 1..N follow each integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// The step number (0 for the initial state).
    pub step: usize,

    /// State after this step.
    pub state: HemodynamicState,

    /// Equations evaluated to reach this state, `None` for step 0.
    pub derivation: Option<Derivation>,
}
