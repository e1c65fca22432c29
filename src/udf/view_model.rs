//! View models: the composition root of a single UI surface.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::action::ViewEvent;
use super::interactor::Interactor;
use super::mapper::EventActionMap;
use super::reducer::ViewStateReducer;
use super::runtime::UiContext;
use super::state::ViewState;

/// Contract between a view and its view model.
pub trait ViewModel {
    type State: ViewState;
    type Event: ViewEvent;

    /// The most recently reduced view state.
    fn view_state(&self) -> Self::State;

    /// Handle an event sent from the view.
    fn handle(&self, event: Self::Event);

    /// Register a change observer. Dropping the returned `Observation`
    /// unsubscribes.
    fn observe(&self, observer: Box<dyn FnMut(&Self::State)>) -> Observation;
}

/// When a view model notifies observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// Skip notifications when the reduced view state is unchanged.
    #[default]
    DistinctOnly,
    /// Notify once per domain state emission.
    Always,
}

type Callback<S> = Rc<RefCell<Box<dyn FnMut(&S)>>>;

/// Observer list shared by view model implementations.
pub(crate) struct ObserverList<S> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Callback<S>)>>,
}

impl<S: 'static> ObserverList<S> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn add(self: &Rc<Self>, observer: Box<dyn FnMut(&S)>) -> Observation {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(observer))));

        let list: Weak<Self> = Rc::downgrade(self);
        Observation::new(move || {
            if let Some(list) = list.upgrade() {
                list.entries.borrow_mut().retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Call every observer once with `state`.
    ///
    /// Works on a snapshot, so observers may subscribe or unsubscribe from
    /// inside the callback.
    pub(crate) fn notify(&self, state: &S) {
        let snapshot: Vec<Callback<S>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            match callback.try_borrow_mut() {
                Ok(mut f) => f(state),
                Err(_) => tracing::warn!("Re-entrant view state notification skipped"),
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Handle for an active observer registration.
#[must_use = "dropping an Observation unsubscribes immediately"]
pub struct Observation {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Observation {
    /// An observation that runs `cancel` when dropped.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

struct Core<S> {
    view_state: RefCell<S>,
    observers: Rc<ObserverList<S>>,
    policy: NotifyPolicy,
    live: Cell<bool>,
}

impl<S: ViewState> Core<S> {
    fn apply(&self, next: S) {
        if self.policy == NotifyPolicy::DistinctOnly && *self.view_state.borrow() == next {
            tracing::trace!("View state unchanged, notification skipped");
            return;
        }
        *self.view_state.borrow_mut() = next.clone();
        self.observers.notify(&next);
    }
}

/// View model composed from an event map, an interactor and a reducer.
///
/// Lives on a `UiContext`. The binding task holds only a weak reference to
/// the view model's state and is aborted when the view model is dropped, so
/// no emission reaches a torn-down view.
pub struct ComposedViewModel<I, M, R>
where
    I: Interactor,
    M: EventActionMap<Action = I::Action>,
    R: ViewStateReducer<Domain = I::State>,
{
    core: Rc<Core<R::View>>,
    interactor: Arc<I>,
    mapper: M,
    binding: JoinHandle<()>,
}

impl<I, M, R> ComposedViewModel<I, M, R>
where
    I: Interactor,
    M: EventActionMap<Action = I::Action> + 'static,
    R: ViewStateReducer<Domain = I::State> + 'static,
{
    pub fn new(ui: &UiContext, interactor: Arc<I>, mapper: M, reducer: R) -> Self {
        Self::with_policy(ui, interactor, mapper, reducer, NotifyPolicy::default())
    }

    pub fn with_policy(
        ui: &UiContext,
        interactor: Arc<I>,
        mapper: M,
        reducer: R,
        policy: NotifyPolicy,
    ) -> Self {
        // The replayed current state seeds the view state and is not
        // reported to observers.
        let mut states = interactor.subscribe();
        let current = states
            .try_next()
            .unwrap_or_else(|| interactor.current_state());
        let core = Rc::new(Core {
            view_state: RefCell::new(reducer.reduce(&current)),
            observers: ObserverList::new(),
            policy,
            live: Cell::new(true),
        });

        let weak = Rc::downgrade(&core);
        let binding = ui.spawn(async move {
            while let Some(domain) = states.next().await {
                let Some(core) = weak.upgrade() else {
                    return;
                };
                core.apply(reducer.reduce(&domain));
            }
            if let Some(core) = weak.upgrade() {
                core.live.set(false);
                tracing::error!(
                    interactor = std::any::type_name::<I>(),
                    "Interactor state stream ended, view state frozen"
                );
            }
        });

        Self {
            core,
            interactor,
            mapper,
            binding,
        }
    }

    /// False once the interactor's state stream has terminated.
    pub fn is_live(&self) -> bool {
        self.core.live.get()
    }

    pub fn interactor(&self) -> &Arc<I> {
        &self.interactor
    }

    pub fn observer_count(&self) -> usize {
        self.core.observers.len()
    }
}

impl<I, M, R> ViewModel for ComposedViewModel<I, M, R>
where
    I: Interactor,
    M: EventActionMap<Action = I::Action> + 'static,
    R: ViewStateReducer<Domain = I::State> + 'static,
{
    type State = R::View;
    type Event = M::Event;

    fn view_state(&self) -> R::View {
        self.core.view_state.borrow().clone()
    }

    fn handle(&self, event: M::Event) {
        let Some(action) = self.mapper.map(&event) else {
            tracing::trace!(
                event = std::any::type_name::<M::Event>(),
                "Event mapped to no action"
            );
            return;
        };
        if let Err(err) = self.interactor.dispatch(action) {
            tracing::error!(error = %err, "Failed to dispatch action");
        }
    }

    fn observe(&self, observer: Box<dyn FnMut(&R::View)>) -> Observation {
        self.core.observers.add(observer)
    }
}

impl<I, M, R> Drop for ComposedViewModel<I, M, R>
where
    I: Interactor,
    M: EventActionMap<Action = I::Action>,
    R: ViewStateReducer<Domain = I::State>,
{
    fn drop(&mut self) {
        self.binding.abort();
    }
}
