//! Actors and the span-carrying channels between them.

use tokio::sync::mpsc;
use tracing::Span;

pub mod config_watcher;
pub mod panel;
pub mod poller;
pub mod reactor;

/// Event sender that tags every event with the span it was sent from, so the
/// receiving actor's handling shows up under the send site in traces.
pub struct Sender<E> {
    tx: mpsc::UnboundedSender<(Span, E)>,
}

impl<E> Clone for Sender<E> {
    fn clone(&self) -> Self { Sender { tx: self.tx.clone() } }
}

impl<E> Sender<E> {
    pub fn send(&self, event: E) -> Result<(), mpsc::error::SendError<E>> {
        self.tx
            .send((Span::current(), event))
            .map_err(|mpsc::error::SendError((_, event))| mpsc::error::SendError(event))
    }

    pub fn try_send(&self, event: E) -> Result<(), mpsc::error::SendError<E>> { self.send(event) }
}

pub struct Receiver<E> {
    rx: mpsc::UnboundedReceiver<(Span, E)>,
}

impl<E> Receiver<E> {
    pub async fn recv(&mut self) -> Option<(Span, E)> { self.rx.recv().await }
}

pub fn channel<E>() -> (Sender<E>, Receiver<E>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender { tx }, Receiver { rx })
}
