//! Push-based publishers backing interactor streams.
//!
//! Each subscriber owns an unbounded channel; publishing fans a clone of the
//! value out to every live subscriber under one lock, so all subscribers
//! observe emissions in the same order and none is dropped or coalesced.
//! Subscribers whose receiving side was dropped are pruned on the next send.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Receiving side of a publisher.
///
/// Yields `None` once the publisher has finished.
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Wait for the next emission.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Take an already delivered emission without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.receiver.poll_recv(cx)
    }
}

struct Observers<T> {
    senders: Vec<mpsc::UnboundedSender<T>>,
    finished: bool,
}

impl<T: Clone> Observers<T> {
    fn new() -> Self {
        Self {
            senders: Vec::new(),
            finished: false,
        }
    }

    fn attach(&mut self, replay: Option<T>) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(value) = replay {
            let _ = tx.send(value);
        }
        // A finished publisher hands out a subscription that ends right
        // after the replayed value.
        if !self.finished {
            self.senders.push(tx);
        }
        Subscription { receiver: rx }
    }

    fn broadcast(&mut self, value: &T) {
        self.senders.retain(|tx| tx.send(value.clone()).is_ok());
    }

    fn finish(&mut self) {
        self.finished = true;
        self.senders.clear();
    }
}

struct StateInner<T> {
    current: T,
    observers: Observers<T>,
}

/// Publisher with replay-latest semantics.
///
/// Holds the most recent value; every new subscription immediately receives
/// it before any later emission.
pub struct StatePublisher<T> {
    inner: Arc<Mutex<StateInner<T>>>,
}

impl<T> Clone for StatePublisher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> StatePublisher<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StateInner {
                current: initial,
                observers: Observers::new(),
            })),
        }
    }

    /// Get a clone of the latest value.
    pub fn current(&self) -> T {
        self.inner.lock().current.clone()
    }

    /// Subscribe, receiving the latest value first.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut inner = self.inner.lock();
        let replay = inner.current.clone();
        inner.observers.attach(Some(replay))
    }

    /// Store `value` as the latest and deliver it to all subscribers.
    ///
    /// Ignored after `finish`.
    pub fn send(&self, value: T) {
        let mut inner = self.inner.lock();
        if inner.observers.finished {
            tracing::trace!("Send on finished state publisher ignored");
            return;
        }
        inner.observers.broadcast(&value);
        inner.current = value;
    }

    /// Complete the stream: current subscriptions end after draining.
    pub fn finish(&self) {
        self.inner.lock().observers.finish();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.lock().observers.finished
    }

    /// Number of subscribers that have not been pruned yet.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().observers.senders.len()
    }
}

/// Publisher without replay: subscribers only see values sent after they
/// subscribed.
pub struct SignalPublisher<T> {
    inner: Arc<Mutex<Observers<T>>>,
}

impl<T> Clone for SignalPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Default for SignalPublisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> SignalPublisher<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Observers::new())),
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        self.inner.lock().attach(None)
    }

    pub fn send(&self, value: T) {
        let mut observers = self.inner.lock();
        if !observers.finished {
            observers.broadcast(&value);
        }
    }

    pub fn finish(&self) {
        self.inner.lock().finish();
    }
}
