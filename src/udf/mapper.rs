//! Event to action mapping.

use super::action::{DomainAction, ViewEvent};

/// Translates view events into domain actions.
///
/// Must be a pure function of the event: the same event always yields the
/// same action, or consistently `None`. Returning `None` filters the event
/// out before it reaches domain logic.
pub trait EventActionMap {
    type Event: ViewEvent;
    type Action: DomainAction;

    fn map(&self, event: &Self::Event) -> Option<Self::Action>;
}
