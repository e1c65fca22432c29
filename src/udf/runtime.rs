//! The UI-affine executor.

use std::future::Future;

use tokio::task::{JoinHandle, LocalSet};

/// Single-threaded context on which view models live.
///
/// View models are `!Send` and bind to interactors through tasks spawned
/// here, so view state is only ever read or mutated on the thread driving
/// this context. Interactor emissions are marshalled in over channels.
pub struct UiContext {
    local: LocalSet,
}

impl Default for UiContext {
    fn default() -> Self {
        Self::new()
    }
}

impl UiContext {
    pub fn new() -> Self {
        Self {
            local: LocalSet::new(),
        }
    }

    /// Spawn a task onto the UI context.
    ///
    /// The task makes progress only while the context is being driven by
    /// `run_until`.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        self.local.spawn_local(future)
    }

    /// Drive the UI context until `future` completes.
    ///
    /// Must be awaited from within a Tokio runtime.
    pub async fn run_until<F: Future>(&self, future: F) -> F::Output {
        self.local.run_until(future).await
    }
}
