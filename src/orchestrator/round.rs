use std::collections::HashMap;

use crate::agent::AgentId;
use crate::history::HistoryItem;
use crate::message::{ModelInput, ToolCallTarget};
use crate::opponent::OpponentAdapter;
use crate::schema::Tool;

use super::error::OrchestratorError;
use super::policy_link::PolicyLink;
use super::state::GameState;

pub type Opponents = HashMap<AgentId, Box<dyn OpponentAdapter>>;

/// Asks whichever agent is named for their next tool call, suspending on
/// the suspension-protocol channel if it's the trainable policy's turn, or
/// calling straight into the matching `OpponentAdapter` otherwise. Records
/// the prompt and the resulting turn into that agent's private history.
pub async fn ask_tool_call(
    state: &mut GameState,
    policy_link: &mut PolicyLink,
    opponents: &mut Opponents,
    agent: AgentId,
    tool: Tool,
    eligible_ids: &[AgentId],
    prompt: String,
) -> Result<ToolCallTarget, OrchestratorError> {
    let is_policy = state
        .agent(agent)
        .map(|a| a.is_policy)
        .ok_or(OrchestratorError::AgentNotFound(agent))?;

    let history = state
        .histories
        .get_mut(&agent)
        .ok_or(OrchestratorError::AgentNotFound(agent))?;
    history.push(HistoryItem::UserPrompt { content: prompt });
    let snapshot = history.items().to_vec();

    let target = if is_policy {
        let input = ModelInput {
            game_id: state.game_id,
            agent,
            history: snapshot,
            tool_schema: tool.build_schema(Some(eligible_ids)),
            eligible_ids: eligible_ids.to_vec(),
        };
        let output = policy_link
            .ask(input)
            .await
            .ok_or_else(|| OrchestratorError::Protocol("policy channel disconnected".into()))?;
        crate::parser::parse(&output.raw)
            .map_err(|err| OrchestratorError::Protocol(err.to_string()))?
    } else {
        let adapter = opponents
            .get_mut(&agent)
            .ok_or(OrchestratorError::AgentNotFound(agent))?;
        adapter.decide(agent, &snapshot, tool, eligible_ids).await?
    };

    if target.tool_name != tool.name() {
        return Err(OrchestratorError::Protocol(format!(
            "expected tool `{}`, got `{}`",
            tool.name(),
            target.tool_name
        )));
    }

    let history = state.histories.get_mut(&agent).expect("history present for seated agent");
    history.push(HistoryItem::AssistantTurn {
        reasoning: target
            .arguments
            .get("reasoning")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        tool_name: target.tool_name.clone(),
        arguments: target.arguments.clone(),
    });

    Ok(target)
}

/// Asks every agent in `agents` for the same `tool` concurrently, fanning
/// out to opponent tasks with `futures::future::join_all` and querying the
/// trainable policy seat (if present) sequentially over the suspension
/// channel, since only one request may be in flight on that channel at a
/// time. Appropriate only when the agents' decisions don't depend on one
/// another within the same phase — a simultaneous vote, or the "does this
/// agent want to speak" poll that opens a discourse pass. `eligible_ids`
/// is taken per-agent (e.g. "every seat but yourself") rather than as one
/// shared slice, since who may be named often depends on who's asking.
/// Mirrors the teacher's fan-out-then-join discipline in
/// `gameroom`/`hosting`, built on the `futures` crate already in its
/// dependency graph.
pub async fn ask_tool_calls_concurrently(
    state: &mut GameState,
    policy_link: &mut PolicyLink,
    opponents: &mut Opponents,
    agents: &[AgentId],
    tool: Tool,
    eligible_ids: impl Fn(AgentId) -> Vec<AgentId>,
    prompt: impl Fn(AgentId) -> String,
) -> Result<Vec<(AgentId, ToolCallTarget)>, OrchestratorError> {
    let policy_seat = state.seats.iter().find(|a| a.is_policy).map(|a| a.id);

    let mut snapshots = HashMap::with_capacity(agents.len());
    let mut eligibility = HashMap::with_capacity(agents.len());
    for &agent in agents {
        let history = state
            .histories
            .get_mut(&agent)
            .ok_or(OrchestratorError::AgentNotFound(agent))?;
        history.push(HistoryItem::UserPrompt { content: prompt(agent) });
        snapshots.insert(agent, history.items().to_vec());
        eligibility.insert(agent, eligible_ids(agent));
    }

    let opponent_futures = opponents.iter_mut().filter(|(id, _)| {
        agents.contains(id) && Some(**id) != policy_seat
    }).map(|(id, adapter)| {
        let snapshot = snapshots.get(id).cloned().unwrap_or_default();
        let eligible = eligibility.get(id).cloned().unwrap_or_default();
        let id = *id;
        async move {
            let result = adapter.decide(id, &snapshot, tool, &eligible).await;
            (id, result.map_err(OrchestratorError::from))
        }
    });
    let mut results: HashMap<AgentId, Result<ToolCallTarget, OrchestratorError>> =
        futures::future::join_all(opponent_futures).await.into_iter().collect();

    if let Some(policy_agent) = policy_seat.filter(|id| agents.contains(id)) {
        let snapshot = snapshots.get(&policy_agent).cloned().unwrap_or_default();
        let eligible = eligibility.get(&policy_agent).cloned().unwrap_or_default();
        let input = ModelInput {
            game_id: state.game_id,
            agent: policy_agent,
            history: snapshot,
            tool_schema: tool.build_schema(Some(&eligible)),
            eligible_ids: eligible,
        };
        let outcome = match policy_link.ask(input).await {
            Some(output) => crate::parser::parse(&output.raw)
                .map_err(|err| OrchestratorError::Protocol(err.to_string())),
            None => Err(OrchestratorError::Protocol("policy channel disconnected".into())),
        };
        results.insert(policy_agent, outcome);
    }

    let mut ordered = Vec::with_capacity(agents.len());
    for &agent in agents {
        let target = results
            .remove(&agent)
            .expect("every requested agent has a recorded result")?;
        if target.tool_name != tool.name() {
            return Err(OrchestratorError::Protocol(format!(
                "expected tool `{}`, got `{}`",
                tool.name(),
                target.tool_name
            )));
        }
        let history = state.histories.get_mut(&agent).expect("history present for seated agent");
        history.push(HistoryItem::AssistantTurn {
            reasoning: target
                .arguments
                .get("reasoning")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            tool_name: target.tool_name.clone(),
            arguments: target.arguments.clone(),
        });
        ordered.push((agent, target));
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::GameConfig;
    use crate::opponent::RandomOpponent;

    fn opponents_for(state: &GameState) -> Opponents {
        state
            .seats
            .iter()
            .filter(|a| !a.is_policy)
            .map(|a| (a.id, Box::new(RandomOpponent) as Box<dyn OpponentAdapter>))
            .collect()
    }

    #[tokio::test]
    async fn opponent_tool_call_matches_requested_tool() {
        let config = GameConfig { seed: Some(1), ..GameConfig::default() };
        let mut state = GameState::new(0, &config);
        let mut opponents = opponents_for(&state);
        let (tx, _rx_req_unused) = tokio::sync::mpsc::unbounded_channel();
        let (_tx_reply_unused, rx) = tokio::sync::mpsc::unbounded_channel();
        let mut link = PolicyLink { requests: tx, replies: rx };

        let target = state.seats.iter().find(|a| !a.is_policy).unwrap().id;
        let eligible = state.other_ids(target);
        let result = ask_tool_call(
            &mut state,
            &mut link,
            &mut opponents,
            target,
            Tool::VoteChancellorYesNo,
            &eligible,
            "cast your vote".into(),
        )
        .await
        .unwrap();
        assert_eq!(result.tool_name, Tool::VoteChancellorYesNo.name());
    }

    #[tokio::test]
    async fn concurrent_fan_out_covers_every_requested_agent() {
        let config = GameConfig { seed: Some(2), ..GameConfig::default() };
        let mut state = GameState::new(0, &config);
        let mut opponents = opponents_for(&state);
        let (tx, _rx_req_unused) = tokio::sync::mpsc::unbounded_channel();
        let (_tx_reply_unused, rx) = tokio::sync::mpsc::unbounded_channel();
        let mut link = PolicyLink { requests: tx, replies: rx };

        let agents: Vec<_> = state.seats.iter().filter(|a| !a.is_policy).map(|a| a.id).collect();
        let results = ask_tool_calls_concurrently(
            &mut state,
            &mut link,
            &mut opponents,
            &agents,
            Tool::VoteChancellorYesNo,
            |_| Vec::new(),
            |_| "vote now".to_string(),
        )
        .await
        .unwrap();
        assert_eq!(results.len(), agents.len());
    }
}
