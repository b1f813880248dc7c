use serde_json::Value;

use crate::message::ToolCallTarget;

/// Failure modes for parsing a raw model response into a `ToolCallTarget`.
/// Grounded on
/// `original_source/src/engine/external_agent_response_parser.py`'s
/// `ExternalAgentResponseParser.parse`, transliterated rather than copied:
/// the Python original catches `json.JSONDecodeError` broadly and raises
/// bare `ValueError`s; Rust expresses the same three failure shapes as
/// distinct, matchable variants instead of one exception type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The raw payload was not well-formed JSON.
    MalformedJson(String),
    /// The payload was valid JSON but had no `tool_name` field, or it was
    /// not a string.
    MissingToolName,
    /// `tool_name` did not match any tool in the vocabulary.
    UnknownTool(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MalformedJson(detail) => write!(f, "malformed JSON response: {detail}"),
            ParseError::MissingToolName => write!(f, "response is missing a `tool_name` field"),
            ParseError::UnknownTool(name) => write!(f, "unknown tool name: {name}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a raw model response string into a `ToolCallTarget`. Requires
/// well-formed JSON and a `tool_name` field naming one of the tools in
/// `crate::schema::Tool`; everything else under `arguments` is left
/// unvalidated here — narrowed-schema argument validation happens when the
/// orchestrator tries to apply the call against the current round state.
pub fn parse(raw: &str) -> Result<ToolCallTarget, ParseError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| ParseError::MalformedJson(err.to_string()))?;

    let tool_name = value
        .get("tool_name")
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingToolName)?
        .to_string();

    let target = ToolCallTarget {
        tool_name: tool_name.clone(),
        arguments: value.get("arguments").cloned().unwrap_or(Value::Null),
    };

    if target.tool().is_none() {
        return Err(ParseError::UnknownTool(tool_name));
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse("not json"), Err(ParseError::MalformedJson(_))));
    }

    #[test]
    fn rejects_missing_tool_name() {
        assert_eq!(parse(r#"{"arguments": {}}"#), Err(ParseError::MissingToolName));
    }

    #[test]
    fn rejects_unknown_tool_name() {
        assert_eq!(
            parse(r#"{"tool_name": "do-something-else", "arguments": {}}"#),
            Err(ParseError::UnknownTool("do-something-else".to_string())),
        );
    }

    #[test]
    fn parses_a_well_formed_call() {
        let target = parse(
            r#"{"tool_name": "vote-chancellor-yes-no", "arguments": {"vote": true, "reasoning": "trust"}}"#,
        )
        .unwrap();
        assert_eq!(target.tool_name, "vote-chancellor-yes-no");
        assert_eq!(target.arguments["vote"], true);
    }
}
