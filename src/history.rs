use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentId;

/// One entry in an agent's private conversation record. Grounded on
/// `original_source/src/models.py`'s `MessageHistory` discriminated union
/// (`UserInput | ToolFeedback | AssistantResponse`): a single opaque
/// "prompt or invocation" blob would lose the distinction opponents and the
/// trainable policy both need between what they were told, what they said,
/// and what came back from calling a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "history_type", rename_all = "snake_case")]
pub enum HistoryItem {
    /// A prompt the orchestrator handed to the agent, e.g. a round
    /// narration or a directed question.
    UserPrompt { content: String },
    /// The agent's own tool call: its chain-of-thought `reasoning` plus the
    /// tool it invoked and the arguments it passed.
    AssistantTurn {
        reasoning: String,
        tool_name: String,
        arguments: Value,
    },
    /// The result of executing a tool call the agent made, echoed back as
    /// the next turn's context.
    ToolFeedback {
        tool_call_id: String,
        tool_name: String,
        output: Value,
    },
}

/// The full private conversation record kept for one agent across a game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentHistory {
    pub agent: Option<AgentId>,
    items: Vec<HistoryItem>,
}

impl AgentHistory {
    pub fn new(agent: AgentId) -> Self {
        Self { agent: Some(agent), items: Vec::new() }
    }

    pub fn push(&mut self, item: HistoryItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_append_order() {
        let mut history = AgentHistory::new(AgentId(0));
        history.push(HistoryItem::UserPrompt { content: "round begins".into() });
        history.push(HistoryItem::AssistantTurn {
            reasoning: "I should nominate agent 1".into(),
            tool_name: "president-pick-chancellor".into(),
            arguments: serde_json::json!({ "agent_id": 1 }),
        });
        assert_eq!(history.items().len(), 2);
        assert!(matches!(history.items()[0], HistoryItem::UserPrompt { .. }));
    }
}
