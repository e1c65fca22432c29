//! Unidirectional data flow (UDF) primitives.
//!
//! # Architecture
//!
//! ```text
//! ViewEvent ──→ EventActionMap ──→ DomainAction ──→ Interactor
//!                                                       │
//!    View ←── ViewState ←── ViewStateReducer ←── DomainState
//! ```
//!
//! - **EventActionMap**: pure filter/translation of UI events into actions
//! - **Interactor**: owns domain state and side effects, publishes state
//! - **ViewStateReducer**: pure projection of domain state for rendering
//! - **ViewModel**: composes the three on the UI context

mod action;
mod any_view_model;
mod interactor;
mod mapper;
mod publisher;
mod reducer;
mod router;
mod runtime;
mod state;
mod view_model;

pub use action::{DomainAction, ViewEvent};
pub use any_view_model::AnyViewModel;
pub use interactor::{ActionHandler, AsyncInteractor, Interactor, InteractorError, StateHandle};
pub use mapper::EventActionMap;
pub use publisher::{SignalPublisher, StatePublisher, Subscription};
pub use reducer::ViewStateReducer;
pub use router::NavigationRouter;
pub use runtime::UiContext;
pub use state::{DomainState, ViewState};
pub use view_model::{ComposedViewModel, NotifyPolicy, Observation, ViewModel};
