use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// A paired sender/receiver over `T`, mirroring `gameroom::Channel<T>`.
/// One `Channel` drives one direction of the suspension protocol between
/// an orchestrator task and whoever is driving the trainable policy from
/// outside.
pub struct Channel<T> {
    pub tx: UnboundedSender<T>,
    pub rx: UnboundedReceiver<T>,
}

impl<T> Channel<T> {
    pub fn pair() -> (UnboundedSender<T>, UnboundedReceiver<T>) {
        tokio::sync::mpsc::unbounded_channel()
    }
}
