use rand::seq::IndexedRandom;

use super::adapter::{OpponentAdapter, OpponentError};
use crate::agent::AgentId;
use crate::history::HistoryItem;
use crate::message::ToolCallTarget;
use crate::schema::Tool;

/// A demo/test opponent that picks uniformly at random among whatever the
/// tool's shape allows, never fails, and ignores history entirely.
/// Grounded on `gameroom/players/fish.rs`'s `Fish`, which picks uniformly
/// from `recall.head().legal()` rather than reasoning about the game at
/// all. This is a test fixture, not a stand-in for a real LLM opponent.
pub struct RandomOpponent;

#[async_trait::async_trait]
impl OpponentAdapter for RandomOpponent {
    async fn decide(
        &mut self,
        _agent: AgentId,
        _history: &[HistoryItem],
        allowed_tool: Tool,
        eligible_ids: &[AgentId],
    ) -> Result<ToolCallTarget, OpponentError> {
        let mut rng = rand::rng();
        let arguments = match allowed_tool {
            Tool::PresidentPickChancellor | Tool::ChooseAgentToEject => {
                let target = eligible_ids.choose(&mut rng).copied().unwrap_or(AgentId(0));
                serde_json::json!({ "reasoning": "random choice", "agent_id": target.0 })
            }
            Tool::VoteChancellorYesNo => {
                let yes: bool = rand::random();
                serde_json::json!({ "reasoning": "random choice", "vote": yes })
            }
            Tool::PresidentChooseCardToDiscard | Tool::ChancellorPlayPolicy => {
                let index = *[0usize, 1].choose(&mut rng).unwrap_or(&0);
                serde_json::json!({ "reasoning": "random choice", "card_index": index })
            }
            Tool::AskAgentIfWantsToSpeak => {
                let wants: bool = rand::random();
                serde_json::json!({ "reasoning": "random choice", "wants_to_speak": wants })
            }
            Tool::AgentResponseToQuestion => {
                serde_json::json!({ "reasoning": "random choice", "response": "I have nothing to add." })
            }
        };
        Ok(ToolCallTarget { tool_name: allowed_tool.name().to_string(), arguments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_returns_a_call_for_the_requested_tool() {
        let mut opponent = RandomOpponent;
        let ids = [AgentId(1), AgentId(2)];
        let call = opponent
            .decide(AgentId(0), &[], Tool::VoteChancellorYesNo, &ids)
            .await
            .unwrap();
        assert_eq!(call.tool_name, Tool::VoteChancellorYesNo.name());
    }
}
