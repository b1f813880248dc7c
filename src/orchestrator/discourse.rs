use std::collections::HashMap;

use rand::seq::SliceRandom;

use crate::agent::AgentId;
use crate::event::Event;
use crate::schema::Tool;

use super::error::OrchestratorError;
use super::policy_link::PolicyLink;
use super::round::{ask_tool_call, ask_tool_calls_concurrently, Opponents};
use super::state::GameState;

/// Runs one discourse pass. Every seat is first polled concurrently for
/// whether it wants to speak — opponents fanned out, the trainable policy
/// queried once, separately, since only one request may be in flight on
/// its channel at a time — then the seats that opted in are delivered in a
/// freshly shuffled order, each optionally followed by a synchronous
/// directed question. Grounded on
/// `original_source/src/engine/engine.py::_discourse`, which polls every
/// player for whether they want to speak before `random.shuffle`-ing the
/// ones who did; querying the poll concurrently and the policy seat
/// outside that fan-out is this crate's own addition, required so two
/// opponent tasks never race to push onto the same suspension channel as
/// the policy seat.
pub async fn run_discourse(
    state: &mut GameState,
    policy_link: &mut PolicyLink,
    opponents: &mut Opponents,
) -> Result<(), OrchestratorError> {
    let seats: Vec<AgentId> = state.seats.iter().map(|a| a.id).collect();

    // Precomputed so the eligibility closure below owns its data instead of
    // re-borrowing `state`, which is already held `&mut` by the call.
    let eligibility: HashMap<AgentId, Vec<AgentId>> = seats
        .iter()
        .map(|&id| (id, seats.iter().copied().filter(|other| *other != id).collect()))
        .collect();

    let polls = ask_tool_calls_concurrently(
        state,
        policy_link,
        opponents,
        &seats,
        Tool::AskAgentIfWantsToSpeak,
        move |agent| eligibility.get(&agent).cloned().unwrap_or_default(),
        |_| "It's a good time to speak up if you have something to say.".into(),
    )
    .await?;

    let mut speakers: Vec<(AgentId, Option<AgentId>)> = polls
        .into_iter()
        .filter_map(|(speaker, call)| {
            let wants_to_speak =
                call.arguments.get("wants_to_speak").and_then(|v| v.as_bool()).unwrap_or(false);
            if !wants_to_speak {
                return None;
            }
            let directed_to = call
                .arguments
                .get("directed_to")
                .and_then(|v| v.as_u64())
                .map(|id| AgentId(id as usize))
                .filter(|target| *target != speaker);
            Some((speaker, directed_to))
        })
        .collect();
    speakers.shuffle(&mut rand::rng());

    for (speaker, directed_to) in speakers {
        state.log.append_public(Event::DiscourseRemark { speaker, addressed_to: directed_to });

        if let Some(target) = directed_to {
            if state.agent(target).is_some() {
                let answer = ask_tool_call(
                    state,
                    policy_link,
                    opponents,
                    target,
                    Tool::AgentResponseToQuestion,
                    &[],
                    format!("Agent {speaker} directed a question at you."),
                )
                .await?;
                let response = answer
                    .arguments
                    .get("response")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                state.log.append_public(Event::DirectedAnswer {
                    asker: speaker,
                    responder: target,
                    response,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::GameConfig;
    use crate::message::ToolCallTarget;
    use crate::opponent::{OpponentAdapter, OpponentError};
    use crate::history::HistoryItem;

    /// Always wants to speak and always directs its question at the lowest
    /// other agent id, answering with a fixed string when asked back.
    struct ChattyOpponent;

    #[async_trait::async_trait]
    impl OpponentAdapter for ChattyOpponent {
        async fn decide(
            &mut self,
            _agent: AgentId,
            _history: &[HistoryItem],
            allowed_tool: Tool,
            eligible_ids: &[AgentId],
        ) -> Result<ToolCallTarget, OpponentError> {
            let arguments = match allowed_tool {
                Tool::AskAgentIfWantsToSpeak => {
                    let target = eligible_ids.iter().min().copied().unwrap_or(AgentId(0));
                    serde_json::json!({
                        "reasoning": "chatty",
                        "wants_to_speak": true,
                        "directed_to": target.0,
                    })
                }
                Tool::AgentResponseToQuestion => {
                    serde_json::json!({ "reasoning": "chatty", "response": "noted, thanks" })
                }
                other => serde_json::json!({ "reasoning": "chatty", "tool": other.name() }),
            };
            Ok(ToolCallTarget { tool_name: allowed_tool.name().to_string(), arguments })
        }
    }

    #[tokio::test]
    async fn a_directed_question_is_immediately_followed_by_its_public_answer() {
        let config = GameConfig { seed: Some(9), ..GameConfig::default() };
        let mut state = GameState::new(0, &config);
        let mut opponents: Opponents = state
            .seats
            .iter()
            .filter(|a| !a.is_policy)
            .map(|a| (a.id, Box::new(ChattyOpponent) as Box<dyn OpponentAdapter>))
            .collect();
        let (tx, mut rx_req) = tokio::sync::mpsc::unbounded_channel();
        let (tx_reply, rx) = tokio::sync::mpsc::unbounded_channel();
        let mut link = PolicyLink { requests: tx, replies: rx };

        // Drives the trainable policy seat's half of the suspension
        // protocol for this test: always declines to speak, so the
        // scripted `ChattyOpponent` seats are the only ones whose
        // directed-question/answer pairs need checking below.
        let driver = tokio::spawn(async move {
            while let Some(input) = rx_req.recv().await {
                let name = input.tool_schema["function"]["name"].as_str().unwrap_or_default();
                let args = if name == Tool::AskAgentIfWantsToSpeak.name() {
                    serde_json::json!({ "reasoning": "pass", "wants_to_speak": false })
                } else {
                    serde_json::json!({ "reasoning": "pass", "response": "no comment" })
                };
                let raw = serde_json::json!({ "tool_name": name, "arguments": args }).to_string();
                if tx_reply.send(crate::message::ModelOutput { raw }).is_err() {
                    break;
                }
            }
        });

        run_discourse(&mut state, &mut link, &mut opponents).await.unwrap();
        driver.abort();

        let any_seat = state.seats[0].id;
        let snapshot = state.log.snapshot_for(any_seat);
        let remark_then_answer = snapshot.windows(2).any(|pair| {
            matches!(pair[0], Event::DiscourseRemark { addressed_to: Some(_), .. })
                && matches!(pair[1], Event::DirectedAnswer { .. })
        });
        assert!(remark_then_answer, "expected a DiscourseRemark immediately followed by its DirectedAnswer");
    }
}
