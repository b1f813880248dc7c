use crate::agent::AgentId;

/// Failures the orchestrator can produce while driving a single game.
/// Represented as a plain enum rather than via `thiserror` — the teacher
/// corpus never reaches for it, propagating `anyhow::Error` at its
/// boundaries and matching on concrete enums internally (e.g.
/// `gameroom::room.rs`'s `anyhow::anyhow!(...)` for "no next hand
/// available").
#[derive(Debug)]
pub enum OrchestratorError {
    /// A tool call was well-formed JSON naming a known tool, but its
    /// arguments didn't satisfy the current round's narrowed schema (wrong
    /// card index, an agent id outside `eligible_ids`, the wrong tool for
    /// the phase).
    Protocol(String),
    /// A tool call, or an internal lookup, named an `AgentId` not seated at
    /// this table.
    AgentNotFound(AgentId),
    /// An opponent exhausted its retries without producing a valid call.
    OpponentUnavailable(AgentId),
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorError::Protocol(detail) => write!(f, "protocol violation: {detail}"),
            OrchestratorError::AgentNotFound(id) => write!(f, "no such agent: {id}"),
            OrchestratorError::OpponentUnavailable(id) => {
                write!(f, "opponent {id} unavailable")
            }
        }
    }
}

impl std::error::Error for OrchestratorError {}

impl From<crate::opponent::OpponentError> for OrchestratorError {
    fn from(err: crate::opponent::OpponentError) -> Self {
        match err {
            crate::opponent::OpponentError::Unavailable { agent, .. } => {
                OrchestratorError::OpponentUnavailable(agent)
            }
        }
    }
}
