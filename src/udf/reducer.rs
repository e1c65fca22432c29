//! Domain state to view state projection.

use super::state::{DomainState, ViewState};

/// Reduces a domain state into the view state rendered by the UI.
///
/// Must be total over every reachable domain state and free of side effects.
/// Failures carried in the domain state are mapped to a renderable view state
/// here rather than surfaced to the view.
pub trait ViewStateReducer {
    type Domain: DomainState;
    type View: ViewState;

    fn reduce(&self, state: &Self::Domain) -> Self::View;
}
