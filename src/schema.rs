use serde_json::{json, Map, Value};

use crate::agent::AgentId;

/// The fixed tool vocabulary an opponent or the trainable policy may be
/// offered, one variant per OpenAI-style function tool. Names and
/// descriptions are grounded in
/// `original_source/src/tools/tools.py`. `ChooseAgentToEject` is part of
/// the vocabulary but is never offered by the round loop today — see
/// `DESIGN.md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    PresidentPickChancellor,
    VoteChancellorYesNo,
    PresidentChooseCardToDiscard,
    ChancellorPlayPolicy,
    ChooseAgentToEject,
    AskAgentIfWantsToSpeak,
    AgentResponseToQuestion,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::PresidentPickChancellor => "president-pick-chancellor",
            Tool::VoteChancellorYesNo => "vote-chancellor-yes-no",
            Tool::PresidentChooseCardToDiscard => "president-choose-card-to-discard",
            Tool::ChancellorPlayPolicy => "chancellor-play-policy",
            Tool::ChooseAgentToEject => "choose-agent-to-vote-out",
            Tool::AskAgentIfWantsToSpeak => "ask-agent-if-wants-to-speak",
            Tool::AgentResponseToQuestion => "agent-response-to-question-tool",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Tool::PresidentPickChancellor => {
                "As the captain, nominate one other living agent to serve as your first mate for this round."
            }
            Tool::VoteChancellorYesNo => {
                "Cast your vote on whether the nominated captain/first mate pair should be seated."
            }
            Tool::PresidentChooseCardToDiscard => {
                "As the captain, inspect the policy cards you were dealt and discard exactly one, passing the rest to your first mate."
            }
            Tool::ChancellorPlayPolicy => {
                "As the first mate, choose which of the remaining policy cards to put into play."
            }
            Tool::ChooseAgentToEject => {
                "Nominate an agent you suspect is an impostor to be voted out of the game."
            }
            Tool::AskAgentIfWantsToSpeak => {
                "Decide whether you want to speak next during this discourse round, optionally directing a question at another agent."
            }
            Tool::AgentResponseToQuestion => {
                "Respond to a question another agent directed at you during discourse."
            }
        }
    }

    /// The OpenAI function-calling JSON schema for this tool, with
    /// `eligible_ids` (when given) narrowing any agent-id parameter's
    /// `enum` to only the ids currently allowed to be named. `reasoning`
    /// is spliced in as the schema's first required string property,
    /// following `original_source/src/engine/protocol.py`'s
    /// `add_reasoning_to_tool_schema` exactly.
    pub fn build_schema(&self, eligible_ids: Option<&[AgentId]>) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        match self {
            Tool::PresidentPickChancellor | Tool::ChooseAgentToEject => {
                properties.insert("agent_id".into(), agent_id_param(eligible_ids));
                required.push("agent_id".to_string());
            }
            Tool::VoteChancellorYesNo => {
                properties.insert(
                    "vote".into(),
                    json!({ "type": "boolean", "description": "true to vote yes, false to vote no" }),
                );
                required.push("vote".to_string());
            }
            Tool::PresidentChooseCardToDiscard | Tool::ChancellorPlayPolicy => {
                properties.insert(
                    "card_index".into(),
                    json!({
                        "type": "integer",
                        "description": "zero-based index into the hand you were dealt",
                        "minimum": 0,
                    }),
                );
                required.push("card_index".to_string());
            }
            Tool::AskAgentIfWantsToSpeak => {
                properties.insert(
                    "wants_to_speak".into(),
                    json!({ "type": "boolean" }),
                );
                properties.insert(
                    "directed_to".into(),
                    agent_id_param(eligible_ids),
                );
                required.push("wants_to_speak".to_string());
            }
            Tool::AgentResponseToQuestion => {
                properties.insert(
                    "response".into(),
                    json!({ "type": "string", "description": "your spoken response" }),
                );
                required.push("response".to_string());
            }
        }

        add_reasoning_to_tool_schema(&mut properties, &mut required);

        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "strict": true,
                "parameters": {
                    "type": "object",
                    "properties": Value::Object(properties),
                    "required": required,
                    "additionalProperties": false,
                }
            }
        })
    }
}

fn agent_id_param(eligible_ids: Option<&[AgentId]>) -> Value {
    let mut param = json!({
        "type": "integer",
        "description": "id of the agent to target",
    });
    if let Some(ids) = eligible_ids {
        param["enum"] = Value::Array(ids.iter().map(|id| json!(id.0)).collect());
    }
    param
}

/// Splices a required `reasoning: string` property in as the first key of
/// `properties` and the first entry of `required`, matching
/// `add_reasoning_to_tool_schema` in the original Python implementation: a
/// model forced to emit JSON key-by-key writes its reasoning before
/// committing to an action.
fn add_reasoning_to_tool_schema(properties: &mut Map<String, Value>, required: &mut Vec<String>) {
    let mut spliced = Map::with_capacity(properties.len() + 1);
    spliced.insert(
        "reasoning".to_string(),
        json!({
            "type": "string",
            "description": "brief chain-of-thought justifying the action chosen below",
        }),
    );
    spliced.extend(std::mem::take(properties));
    *properties = spliced;

    let mut spliced_required = Vec::with_capacity(required.len() + 1);
    spliced_required.push("reasoning".to_string());
    spliced_required.extend(std::mem::take(required));
    *required = spliced_required;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasoning_is_spliced_first() {
        let schema = Tool::VoteChancellorYesNo.build_schema(None);
        let params = &schema["function"]["parameters"];
        let keys: Vec<&String> = params["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "reasoning");
        assert_eq!(params["required"][0], "reasoning");
        assert_eq!(params["additionalProperties"], false);
    }

    #[test]
    fn eligible_ids_narrow_the_enum() {
        let ids = [AgentId(1), AgentId(3)];
        let schema = Tool::PresidentPickChancellor.build_schema(Some(&ids));
        let enum_values = schema["function"]["parameters"]["properties"]["agent_id"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(enum_values, &vec![json!(1), json!(3)]);
    }
}
