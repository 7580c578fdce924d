//! Event publishing/subscription abstraction (mechanics only).
//!
//! Delivery is at-least-once and best-effort: the hosted store is the source
//! of truth, the bus only fans decisions out to consumers (notifier, realtime
//! stream). Consumers must tolerate duplicates.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// Receiving end handed out by [`EventBus::subscribe`]. Every subscription
/// sees every message published after it was created.
///
/// Meant to be drained by a single thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message. `None` once the bus has been dropped
    /// and everything queued was consumed.
    pub fn recv(&self) -> Option<M> {
        self.receiver.recv().ok()
    }

    /// Next queued message, without blocking.
    pub fn try_recv(&self) -> Option<M> {
        self.receiver.try_recv().ok()
    }
}

pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    /// Fan `message` out to every live subscriber. Returns how many received
    /// it; zero is not an error.
    fn publish(&self, message: M) -> Result<usize, Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<usize, Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
