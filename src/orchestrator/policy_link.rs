use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::message::{ModelInput, ModelOutput};

/// The orchestrator task's half of the suspension protocol with whatever
/// is driving the trainable policy from outside the task (the registry's
/// caller). Sending a `ModelInput` and awaiting the matching `ModelOutput`
/// is how the task "suspends" on the policy seat's turn, mirroring
/// `gameroom::Room`'s `ask()` writing to one channel and reading from its
/// paired partner.
pub struct PolicyLink {
    pub requests: UnboundedSender<ModelInput>,
    pub replies: UnboundedReceiver<ModelOutput>,
}

impl PolicyLink {
    /// Sends `input` and waits for the paired reply. Returns `None` if the
    /// caller dropped its end of the channel, which the task treats as an
    /// unrecoverable disconnection — the registry will have observed the
    /// same and torn the game down.
    pub async fn ask(&mut self, input: ModelInput) -> Option<ModelOutput> {
        self.requests.send(input).ok()?;
        self.replies.recv().await
    }
}
