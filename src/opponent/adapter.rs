use crate::agent::AgentId;
use crate::history::HistoryItem;
use crate::message::ToolCallTarget;
use crate::schema::Tool;

/// Failure returned by an `OpponentAdapter` after it has exhausted its
/// retries. Distinct from a single transient error, which the adapter is
/// expected to retry internally before ever surfacing one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpponentError {
    /// The opponent could not produce a valid tool call after repeated
    /// attempts (e.g. a flaky backend, or a model that keeps emitting
    /// malformed JSON).
    Unavailable { agent: AgentId, attempts: u32 },
}

impl std::fmt::Display for OpponentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpponentError::Unavailable { agent, attempts } => {
                write!(f, "opponent {agent} unavailable after {attempts} attempt(s)")
            }
        }
    }
}

impl std::error::Error for OpponentError {}

/// The object-safe interface the orchestrator calls into for every seat
/// not occupied by the trainable policy. Mirrors `gameroom::Player`'s
/// `async fn decide(&mut self, recall: &Recall) -> Action` shape, adapted
/// to this crate's tool-call vocabulary; `#[async_trait]` is required here
/// for the same reason it's required there — a bare `async fn` in a trait
/// isn't object-safe, and the orchestrator holds a `Vec<Box<dyn
/// OpponentAdapter>>`.
#[async_trait::async_trait]
pub trait OpponentAdapter: Send {
    /// Produces this opponent's next tool call given its private history,
    /// the tool it must invoke, and the agent ids it may legally name.
    /// Implementations are responsible for retrying transient failures
    /// internally (matching a real LLM client's own retry policy) and
    /// returning `OpponentError::Unavailable` only once retries are
    /// exhausted. The orchestrator treats a first successful tool call as
    /// authoritative — it may discard any further output from the same
    /// turn, but that truncation is a safety net, not a contract opponents
    /// should rely on.
    async fn decide(
        &mut self,
        agent: AgentId,
        history: &[HistoryItem],
        allowed_tool: Tool,
        eligible_ids: &[AgentId],
    ) -> Result<ToolCallTarget, OpponentError>;
}
