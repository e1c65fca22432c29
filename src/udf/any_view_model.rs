use std::rc::{Rc, Weak};

use super::action::ViewEvent;
use super::state::ViewState;
use super::view_model::{ObserverList, Observation, ViewModel};

/// Type-erased view model.
///
/// Hides the concrete view model type behind a uniform interface so views
/// can be handed test doubles. Forwards state reads and events, and re-emits
/// each upstream change notification exactly once.
pub struct AnyViewModel<S: ViewState, E: ViewEvent> {
    inner: Rc<dyn ViewModel<State = S, Event = E>>,
    observers: Rc<ObserverList<S>>,
    _upstream: Observation,
}

impl<S: ViewState, E: ViewEvent> AnyViewModel<S, E> {
    pub fn new<V>(view_model: V) -> Self
    where
        V: ViewModel<State = S, Event = E> + 'static,
    {
        let inner: Rc<dyn ViewModel<State = S, Event = E>> = Rc::new(view_model);
        let observers = ObserverList::new();

        let downstream: Weak<ObserverList<S>> = Rc::downgrade(&observers);
        let upstream = inner.observe(Box::new(move |state: &S| {
            if let Some(observers) = downstream.upgrade() {
                observers.notify(state);
            }
        }));

        Self {
            inner,
            observers,
            _upstream: upstream,
        }
    }
}

impl<S: ViewState, E: ViewEvent> ViewModel for AnyViewModel<S, E> {
    type State = S;
    type Event = E;

    fn view_state(&self) -> S {
        self.inner.view_state()
    }

    fn handle(&self, event: E) {
        self.inner.handle(event);
    }

    fn observe(&self, observer: Box<dyn FnMut(&S)>) -> Observation {
        self.observers.add(observer)
    }
}
