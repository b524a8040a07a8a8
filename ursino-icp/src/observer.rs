use crate::simulate::{Action, Event};

/// Watches a [`simulate::run`](crate::simulate::run) one step at a time.
///
/// The observer sees the initial state as step 0, then every stepped state
/// together with the derivation that produced it. Returning
/// `Some(Action::StopEarly)` ends the run with the state just observed as its
/// last entry; `None` keeps stepping.
///
/// Closures taking `&Event` implement `Observer`, and `()` never intervenes.
pub trait Observer {
    /// Observes one recorded state and optionally stops the run.
    fn observe(&mut self, event: &Event) -> Option<Action>;
}

impl<F> Observer for F
where
    F: FnMut(&Event) -> Option<Action>,
{
    fn observe(&mut self, event: &Event) -> Option<Action> {
        self(event)
    }
}

impl Observer for () {
    fn observe(&mut self, _event: &Event) -> Option<Action> {
        None
    }
}
