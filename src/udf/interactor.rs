//! Interactors: domain state machines driven by dispatched actions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use super::action::DomainAction;
use super::publisher::{SignalPublisher, StatePublisher, Subscription};
use super::state::DomainState;

/// Errors returned to callers of an interactor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractorError {
    /// The action stream has ended; the interactor no longer processes actions.
    #[error("Interactor terminated, action dropped")]
    Terminated,
}

/// Owns domain state and side effects behind a stream-based contract.
pub trait Interactor: 'static {
    type State: DomainState;
    type Action: DomainAction;

    /// Enqueue an action without blocking the caller.
    ///
    /// Actions from one producer are processed in dispatch order, one at a
    /// time.
    ///
    /// # Errors
    /// Returns `InteractorError::Terminated` once the interactor is inert.
    fn dispatch(&self, action: Self::Action) -> Result<(), InteractorError>;

    /// The latest published state.
    fn current_state(&self) -> Self::State;

    /// Subscribe to state transitions. The current state is delivered first.
    fn subscribe(&self) -> Subscription<Self::State>;
}

/// Read/write access to the interactor's state while an action is handled.
///
/// Every `emit` is published immediately, so a handler can surface
/// intermediate states (e.g. loading) before a side effect completes.
pub struct StateHandle<'a, S> {
    publisher: &'a StatePublisher<S>,
}

impl<S: DomainState> StateHandle<'_, S> {
    pub fn state(&self) -> S {
        self.publisher.current()
    }

    pub fn emit(&self, state: S) {
        self.publisher.send(state);
    }

    /// Emit a copy of the current state modified by `f`.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        let mut next = self.publisher.current();
        f(&mut next);
        self.publisher.send(next);
    }
}

/// Business logic run by an `AsyncInteractor` for each action.
#[async_trait]
pub trait ActionHandler: Send + Sync + 'static {
    type State: DomainState;
    type Action: DomainAction;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Process one action, emitting new states through `state`.
    async fn handle(
        &self,
        action: Self::Action,
        state: &StateHandle<'_, Self::State>,
    ) -> Result<(), Self::Error>;

    /// Convert a transient failure into an error-bearing state.
    ///
    /// `None` leaves the state untouched; the error is still published on
    /// the failure channel.
    fn recover(&self, _state: &Self::State, _error: &Self::Error) -> Option<Self::State> {
        None
    }

    /// Whether `error` ends the action stream for good.
    ///
    /// A fatal error finishes the state stream and makes the interactor
    /// inert. Default: no error is fatal.
    fn is_fatal(&self, _error: &Self::Error) -> bool {
        false
    }
}

/// Interactor that processes actions sequentially on a spawned Tokio task.
///
/// The task exits when the interactor is dropped or shut down (after draining
/// queued actions) or when the handler reports a fatal error; either way the
/// state and failure streams finish.
pub struct AsyncInteractor<H: ActionHandler> {
    /// `None` after `shutdown`; dropping the sender lets the task drain and exit.
    actions: Mutex<Option<mpsc::UnboundedSender<H::Action>>>,
    states: StatePublisher<H::State>,
    failures: SignalPublisher<Arc<H::Error>>,
    terminated: Arc<AtomicBool>,
}

impl<H: ActionHandler> AsyncInteractor<H> {
    /// Start the interactor with `initial` as its first state.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(handler: H, initial: H::State) -> Self {
        let (actions, receiver) = mpsc::unbounded_channel();
        let states = StatePublisher::new(initial);
        let failures = SignalPublisher::new();
        let terminated = Arc::new(AtomicBool::new(false));

        tokio::spawn(run_handler(
            handler,
            receiver,
            states.clone(),
            failures.clone(),
            Arc::clone(&terminated),
        ));

        Self {
            actions: Mutex::new(Some(actions)),
            states,
            failures,
            terminated,
        }
    }

    /// Subscribe to handler failures. No replay.
    pub fn subscribe_failures(&self) -> Subscription<Arc<H::Error>> {
        self.failures.subscribe()
    }

    /// Stop accepting actions. Already queued actions are still processed.
    pub fn shutdown(&self) {
        if self.actions.lock().take().is_some() {
            tracing::debug!(handler = std::any::type_name::<H>(), "Interactor shut down");
        }
    }

    /// True once the processing task has stopped and the streams have
    /// finished. After `shutdown` this stays false until the queue drains.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl<H: ActionHandler> Interactor for AsyncInteractor<H> {
    type State = H::State;
    type Action = H::Action;

    fn dispatch(&self, action: H::Action) -> Result<(), InteractorError> {
        let actions = self.actions.lock();
        let Some(sender) = actions.as_ref() else {
            return Err(InteractorError::Terminated);
        };
        sender.send(action).map_err(|_| {
            tracing::error!(
                handler = std::any::type_name::<H>(),
                "Dispatch to terminated interactor"
            );
            InteractorError::Terminated
        })
    }

    fn current_state(&self) -> H::State {
        self.states.current()
    }

    fn subscribe(&self) -> Subscription<H::State> {
        self.states.subscribe()
    }
}

/// Owns the task's end of the streams. Dropping it, on a normal exit or
/// while a panicking handler unwinds, ends the interactor: the queue is
/// closed, `terminated` is set and both publishers finish.
struct Teardown<H: ActionHandler> {
    receiver: mpsc::UnboundedReceiver<H::Action>,
    states: StatePublisher<H::State>,
    failures: SignalPublisher<Arc<H::Error>>,
    terminated: Arc<AtomicBool>,
}

impl<H: ActionHandler> Drop for Teardown<H> {
    fn drop(&mut self) {
        let name = std::any::type_name::<H>();
        if std::thread::panicking() {
            tracing::error!(handler = name, "Interactor handler panicked, stream terminated");
        }
        self.receiver.close();
        self.terminated.store(true, Ordering::SeqCst);
        self.states.finish();
        self.failures.finish();
        tracing::debug!(handler = name, "Interactor stopped");
    }
}

async fn run_handler<H: ActionHandler>(
    handler: H,
    receiver: mpsc::UnboundedReceiver<H::Action>,
    states: StatePublisher<H::State>,
    failures: SignalPublisher<Arc<H::Error>>,
    terminated: Arc<AtomicBool>,
) {
    let name = std::any::type_name::<H>();
    tracing::debug!(handler = name, "Interactor started");

    let mut task = Teardown::<H> {
        receiver,
        states,
        failures,
        terminated,
    };

    while let Some(action) = task.receiver.recv().await {
        let handle = StateHandle {
            publisher: &task.states,
        };
        let Err(error) = handler.handle(action, &handle).await else {
            continue;
        };

        if handler.is_fatal(&error) {
            tracing::error!(handler = name, error = %error, "Fatal interactor failure, stream terminated");
            task.failures.send(Arc::new(error));
            break;
        }

        tracing::warn!(handler = name, error = %error, "Interactor action failed");
        if let Some(recovered) = handler.recover(&task.states.current(), &error) {
            task.states.send(recovered);
        }
        task.failures.send(Arc::new(error));
    }
}
