use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::agent::AgentId;
use crate::message::{GameConfig, ModelInput, ModelOutput, TerminalState};
use crate::opponent::OpponentAdapter;
use crate::orchestrator::{run_to_end, Channel, OrchestratorError, PolicyLink};

/// Identifies one in-flight or finished game. Opaque and stable for the
/// life of the process; never reused even after a game is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameId(pub u64);

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "game-{}", self.0)
    }
}

/// Failures surfaced by registry operations. `GameNotFound` is returned as
/// `anyhow::Result` directly from most calls, matching
/// `hosting::Casino::close`'s `.ok_or_else(|| anyhow::anyhow!(...))`; this
/// variant exists for the one caller (`execute`) that needs to distinguish
/// "no such game" from a protocol error inside an otherwise-healthy one.
#[derive(Debug)]
pub enum RegistryError {
    GameNotFound(GameId),
    Orchestrator(OrchestratorError),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::GameNotFound(id) => write!(f, "no such game: {id}"),
            RegistryError::Orchestrator(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RegistryError {}

struct GameHandle {
    requests: tokio::sync::mpsc::UnboundedReceiver<ModelInput>,
    replies: tokio::sync::mpsc::UnboundedSender<ModelOutput>,
    join: JoinHandle<TerminalState>,
    policy_seat: AgentId,
}

/// Multiplexes many concurrent game rollouts, one `tokio::task` per game.
/// Grounded directly on `hosting::Casino`/`RoomHandle` (an async
/// `RwLock<HashMap<_, _>>` of spawned-task handles, paired unbounded
/// channels per game, a synthetic terminal result if a task dies before
/// producing its first request) and
/// `original_source/src/engine/engine_api.py::EngineAPI` (per-game
/// input/output queue pair, `game_exists`, raising on an unknown id).
pub struct Registry {
    games: RwLock<HashMap<GameId, GameHandle>>,
    next_id: AtomicU64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self { games: RwLock::new(HashMap::new()), next_id: AtomicU64::new(0) }
    }

    /// Spawns a new game: assembles one `OpponentAdapter` per non-policy
    /// seat via `make_opponent`, spawns the orchestrator task, and returns
    /// its id together with the first `ModelInput` addressed to the
    /// trainable policy seat. If the task panics or errors before ever
    /// asking the policy seat anything (e.g. a misconfigured `GameConfig`),
    /// a synthetic terminal error is reported instead of hanging the
    /// caller forever, mirroring `Casino::start`'s equivalent guard.
    pub async fn create(
        &self,
        config: GameConfig,
        make_opponent: impl Fn() -> Box<dyn OpponentAdapter> + Send + 'static,
    ) -> anyhow::Result<(GameId, ModelInput)> {
        let policy_seat = config.policy_seat;

        let opponents = (0..crate::N)
            .map(AgentId)
            .filter(|id| *id != policy_seat)
            .map(|id| (id, make_opponent()))
            .collect();

        let (request_tx, request_rx) = Channel::<ModelInput>::pair();
        let (reply_tx, reply_rx) = Channel::<ModelOutput>::pair();
        let link = PolicyLink { requests: request_tx, replies: reply_rx };

        let id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let join = tokio::spawn(run_to_end(id.0, config, link, opponents));

        let mut handle = GameHandle { requests: request_rx, replies: reply_tx, join, policy_seat };

        let first_input = match handle.requests.recv().await {
            Some(input) => input,
            None => {
                let outcome = (&mut handle.join).await;
                anyhow::bail!(
                    "game ended before asking the trainable policy anything: {:?}",
                    outcome
                );
            }
        };

        self.games.write().await.insert(id, handle);
        log::info!("opened {}", id);
        Ok((id, first_input))
    }

    /// Delivers the trainable policy's response to its last `ModelInput`
    /// and returns either the next `ModelInput` or the game's
    /// `TerminalState` if that response ended the game.
    pub async fn execute(
        &self,
        id: GameId,
        response: ModelOutput,
    ) -> Result<std::result::Result<ModelInput, TerminalState>, RegistryError> {
        let mut games = self.games.write().await;
        let handle = games.get_mut(&id).ok_or(RegistryError::GameNotFound(id))?;

        handle
            .replies
            .send(response)
            .map_err(|_| RegistryError::GameNotFound(id))?;

        tokio::select! {
            next = handle.requests.recv() => {
                match next {
                    Some(input) => Ok(Ok(input)),
                    None => {
                        let handle = games.remove(&id).expect("checked above");
                        let outcome = handle.join.await;
                        log::info!("closed {}", id);
                        finish(outcome)
                    }
                }
            }
        }
    }

    pub async fn game_exists(&self, id: GameId) -> bool {
        self.games.read().await.contains_key(&id)
    }

    pub async fn get_trainable_role(&self, id: GameId) -> Option<AgentId> {
        self.games.read().await.get(&id).map(|h| h.policy_seat)
    }

    /// Tears a game down early: aborts its task and removes it from the
    /// registry. Grounded on `Casino::close`'s `rooms.write().await
    /// .remove(&id)`.
    pub async fn finalize(&self, id: GameId) -> anyhow::Result<()> {
        let mut games = self.games.write().await;
        let handle = games
            .remove(&id)
            .ok_or_else(|| anyhow::anyhow!("no such game: {id}"))?;
        handle.join.abort();
        log::info!("finalized {}", id);
        Ok(())
    }
}

fn finish(
    outcome: Result<TerminalState, tokio::task::JoinError>,
) -> Result<std::result::Result<ModelInput, TerminalState>, RegistryError> {
    match outcome {
        Ok(terminal) => Ok(Err(terminal)),
        Err(join_err) => Err(RegistryError::Orchestrator(OrchestratorError::Protocol(format!(
            "orchestrator task panicked: {join_err}"
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opponent::RandomOpponent;

    #[tokio::test]
    async fn create_returns_the_first_request_for_the_policy_seat() {
        let registry = Registry::new();
        let config = GameConfig { seed: Some(99), policy_seat: AgentId(0), ..GameConfig::default() };
        let (id, input) = registry
            .create(config, || Box::new(RandomOpponent))
            .await
            .unwrap();
        assert_eq!(input.agent, AgentId(0));
        assert!(registry.game_exists(id).await);
    }

    #[tokio::test]
    async fn execute_against_unknown_game_errors() {
        let registry = Registry::new();
        let result = registry
            .execute(GameId(404), ModelOutput { raw: "{}".into() })
            .await;
        assert!(matches!(result, Err(RegistryError::GameNotFound(_))));
    }
}
