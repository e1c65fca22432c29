//! Shared test utilities and fixtures.

#![allow(dead_code, unused_imports)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use entropy_core::udf::{
    ActionHandler, DomainAction, DomainState, EventActionMap, Interactor, InteractorError,
    StateHandle, StatePublisher, Subscription, ViewEvent, ViewModel, ViewState, ViewStateReducer,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CounterState {
    pub count: i64,
    pub error: Option<String>,
}

impl DomainState for CounterState {}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterAction {
    Increment,
    Decrement,
    /// Re-emits the current state unchanged.
    Touch,
    Fail,
    Crash,
}

impl DomainAction for CounterAction {}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterEvent {
    Plus,
    Minus,
    Refresh,
    /// Has no domain meaning; the mapper ignores it.
    Scroll,
    Break,
    Explode,
}

impl ViewEvent for CounterEvent {}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterView {
    pub text: String,
}

impl ViewState for CounterView {}

pub struct CounterMap;

impl EventActionMap for CounterMap {
    type Event = CounterEvent;
    type Action = CounterAction;

    fn map(&self, event: &CounterEvent) -> Option<CounterAction> {
        match event {
            CounterEvent::Plus => Some(CounterAction::Increment),
            CounterEvent::Minus => Some(CounterAction::Decrement),
            CounterEvent::Refresh => Some(CounterAction::Touch),
            CounterEvent::Scroll => None,
            CounterEvent::Break => Some(CounterAction::Fail),
            CounterEvent::Explode => Some(CounterAction::Crash),
        }
    }
}

pub struct CounterReducer;

impl ViewStateReducer for CounterReducer {
    type Domain = CounterState;
    type View = CounterView;

    fn reduce(&self, state: &CounterState) -> CounterView {
        let text = match &state.error {
            Some(error) => format!("error: {}", error),
            None => format!("count: {}", state.count),
        };
        CounterView { text }
    }
}

pub fn view(text: &str) -> CounterView {
    CounterView {
        text: text.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("corrupted counter")]
    Corrupted,
}

pub struct CounterHandler;

#[async_trait]
impl ActionHandler for CounterHandler {
    type State = CounterState;
    type Action = CounterAction;
    type Error = CounterError;

    async fn handle(
        &self,
        action: CounterAction,
        state: &StateHandle<'_, CounterState>,
    ) -> Result<(), CounterError> {
        match action {
            CounterAction::Increment => state.update(|s| {
                s.count += 1;
                s.error = None;
            }),
            CounterAction::Decrement => state.update(|s| {
                s.count -= 1;
                s.error = None;
            }),
            CounterAction::Touch => state.emit(state.state()),
            CounterAction::Fail => return Err(CounterError::Unavailable),
            CounterAction::Crash => return Err(CounterError::Corrupted),
        }
        Ok(())
    }

    fn recover(&self, state: &CounterState, error: &CounterError) -> Option<CounterState> {
        Some(CounterState {
            count: state.count,
            error: Some(error.to_string()),
        })
    }

    fn is_fatal(&self, error: &CounterError) -> bool {
        matches!(error, CounterError::Corrupted)
    }
}

/// Interactor test double: records dispatched actions and publishes only
/// what the test sends through `states`.
pub struct ManualInteractor {
    pub states: StatePublisher<CounterState>,
    pub dispatched: Mutex<Vec<CounterAction>>,
}

impl ManualInteractor {
    pub fn new(initial: CounterState) -> Self {
        Self {
            states: StatePublisher::new(initial),
            dispatched: Mutex::new(Vec::new()),
        }
    }

    pub fn emit_count(&self, count: i64) {
        self.states.send(CounterState { count, error: None });
    }
}

impl Interactor for ManualInteractor {
    type State = CounterState;
    type Action = CounterAction;

    fn dispatch(&self, action: CounterAction) -> Result<(), InteractorError> {
        if self.states.is_finished() {
            return Err(InteractorError::Terminated);
        }
        self.dispatched.lock().push(action);
        Ok(())
    }

    fn current_state(&self) -> CounterState {
        self.states.current()
    }

    fn subscribe(&self) -> Subscription<CounterState> {
        self.states.subscribe()
    }
}

/// Counts notifications and remembers the last view state delivered.
#[derive(Clone)]
pub struct Recorder<S> {
    pub seen: Rc<RefCell<Vec<S>>>,
}

impl<S: Clone + 'static> Recorder<S> {
    pub fn new() -> Self {
        Self {
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn callback(&self) -> Box<dyn FnMut(&S)> {
        let seen = Rc::clone(&self.seen);
        Box::new(move |state: &S| seen.borrow_mut().push(state.clone()))
    }

    pub fn count(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn all(&self) -> Vec<S> {
        self.seen.borrow().clone()
    }
}

/// Poll `condition` until it holds, giving spawned tasks time to run.
/// Returns false after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Let pending tasks run for a short while.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
