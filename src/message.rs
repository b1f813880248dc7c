use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentId;
use crate::role::Team;
use crate::schema::Tool;

/// Caller-supplied configuration for `Registry::create`. The only public
/// configuration surface this crate exposes: no env vars or argv are read
/// inside the core, matching the spec's exclusion of CLI/config loaders as
/// external entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Which seat is the trainable policy. All other seats are driven by
    /// the supplied `OpponentAdapter`.
    pub policy_seat: AgentId,
    /// RNG seed for role assignment and deck shuffling. `None` means
    /// non-reproducible.
    pub seed: Option<u64>,
    pub total_sabotage: usize,
    pub total_security: usize,
    pub promotion_threshold: u32,
    /// Probability the policy seat is Bernoulli-sampled onto the Impostor
    /// team at setup, biasing training data toward minority-team rollouts
    /// for sample efficiency. `0.0` (the default) assigns roles uniformly
    /// with no bias. Not a fairness knob: see `DESIGN.md`.
    pub impostor_oversample_prob: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            policy_seat: AgentId(0),
            seed: None,
            total_sabotage: 17,
            total_security: 6,
            promotion_threshold: crate::DEFAULT_PROMOTION_THRESHOLD,
            impostor_oversample_prob: 0.0,
        }
    }
}

/// One decision request handed to whichever agent's turn it is: either the
/// trainable policy (via the registry's output channel) or an
/// `OpponentAdapter`. Carries the full history snapshot the agent is
/// entitled to see, the tool it must invoke, and the narrowed set of agent
/// ids it may legally target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInput {
    pub game_id: u64,
    pub agent: AgentId,
    pub history: Vec<crate::history::HistoryItem>,
    pub tool_schema: Value,
    pub eligible_ids: Vec<AgentId>,
}

/// A model's (opponent's or policy's) raw response to a `ModelInput`,
/// before parsing. Mirrors the wire shape an LLM function-calling API
/// returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOutput {
    pub raw: String,
}

/// An opponent's or the policy's parsed decision: which tool it invoked
/// and with what arguments, post-validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallTarget {
    pub tool_name: String,
    pub arguments: Value,
}

impl ToolCallTarget {
    pub fn tool(&self) -> Option<Tool> {
        use Tool::*;
        [
            PresidentPickChancellor,
            VoteChancellorYesNo,
            PresidentChooseCardToDiscard,
            ChancellorPlayPolicy,
            ChooseAgentToEject,
            AskAgentIfWantsToSpeak,
            AgentResponseToQuestion,
        ]
        .into_iter()
        .find(|tool| tool.name() == self.tool_name)
    }
}

/// The final message published on a game's output channel once the game
/// has ended. `winning_team`/`winners` are `None`/empty only on an
/// error-terminated game (§7): a clean win always names both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalState {
    pub game_id: u64,
    /// Every agent on the winning team, per `_get_winners()` in the
    /// original engine — not just the trainable policy.
    pub winners: Vec<AgentId>,
    pub winning_team: Option<Team>,
    /// `1.0` if the trainable policy's seat is on `winners`, `0.0`
    /// otherwise, `-1.0` on any of the error terminations in §7.
    pub reward: f64,
    pub sabotage_cards_played: u32,
    pub security_cards_played: u32,
    pub promotion_occurred: bool,
    pub rounds_played: u32,
    /// Diagnostic payload; carries an `"error"` key on error terminations,
    /// empty object on a clean win.
    pub metadata: Value,
}
