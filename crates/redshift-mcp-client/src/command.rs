//! Parsing of raw model replies into commands.

use serde_json::{Map, Value};

use crate::error::ClientError;

/// Placeholder when the model omits an answer.
pub const NO_ANSWER: &str = "No answer provided.";

/// A parsed model reply. Exactly one variant per reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// The model chose a tool.
    ToolInvocation {
        tool: String,
        args: Map<String, Value>,
    },
    /// The model answered directly.
    DirectAnswer { answer: String },
}

/// Parse a raw model reply into a [`Command`].
///
/// Tolerates a markdown code fence with an optional `json` language tag.
/// A `tool` field holding a non-empty string selects tool invocation;
/// null, absent, or empty means a direct answer. Anything else, or text
/// that is not a JSON object, is a malformed reply carrying the raw text
/// for diagnostics.
pub fn parse(raw: &str) -> Result<Command, ClientError> {
    let mut text = raw.trim();
    if text.starts_with("```") {
        text = text.trim_matches('`').trim();
        if let Some(prefix) = text.get(..4) {
            if prefix.eq_ignore_ascii_case("json") {
                text = text[4..].trim_start();
            }
        }
    }

    let value: Value = serde_json::from_str(text).map_err(|_| malformed(raw))?;
    let Value::Object(object) = value else {
        return Err(malformed(raw));
    };

    match object.get("tool") {
        Some(Value::String(tool)) if !tool.is_empty() => {
            let args = match object.get("args") {
                Some(Value::Object(args)) => args.clone(),
                _ => Map::new(),
            };
            Ok(Command::ToolInvocation {
                tool: tool.clone(),
                args,
            })
        }
        // Empty-string tool lands here via the guard above.
        None | Some(Value::Null) | Some(Value::String(_)) => {
            let answer = object
                .get("answer")
                .and_then(Value::as_str)
                .unwrap_or(NO_ANSWER)
                .to_string();
            Ok(Command::DirectAnswer { answer })
        }
        Some(_) => Err(malformed(raw)),
    }
}

fn malformed(raw: &str) -> ClientError {
    ClientError::MalformedReply {
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_ok(raw: &str) -> Command {
        parse(raw).expect("reply should parse")
    }

    #[test]
    fn plain_tool_invocation() {
        let command = parse_ok(r#"{"tool": "query", "args": {"sql": "SELECT 1"}}"#);
        match command {
            Command::ToolInvocation { tool, args } => {
                assert_eq!(tool, "query");
                assert_eq!(args.get("sql"), Some(&json!("SELECT 1")));
            }
            other => panic!("expected tool invocation, got {:?}", other),
        }
    }

    #[test]
    fn fenced_reply_with_json_tag() {
        let raw = "```json\n{\"tool\": null, \"answer\": \"Four tables.\"}\n```";
        assert_eq!(
            parse_ok(raw),
            Command::DirectAnswer {
                answer: "Four tables.".to_string()
            }
        );
    }

    #[test]
    fn fenced_reply_with_uppercase_tag() {
        let raw = "```JSON\n{\"tool\": null, \"answer\": \"ok\"}\n```";
        assert_eq!(
            parse_ok(raw),
            Command::DirectAnswer {
                answer: "ok".to_string()
            }
        );
    }

    #[test]
    fn fenced_reply_without_tag() {
        let raw = "```\n{\"tool\": \"get_table_schema\", \"args\": {\"table_name\": \"users\"}}\n```";
        match parse_ok(raw) {
            Command::ToolInvocation { tool, .. } => assert_eq!(tool, "get_table_schema"),
            other => panic!("expected tool invocation, got {:?}", other),
        }
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let raw = "  \n {\"tool\": null, \"answer\": \"hi\"} \n ";
        assert_eq!(
            parse_ok(raw),
            Command::DirectAnswer {
                answer: "hi".to_string()
            }
        );
    }

    #[test]
    fn missing_answer_uses_placeholder() {
        assert_eq!(
            parse_ok(r#"{"tool": null}"#),
            Command::DirectAnswer {
                answer: NO_ANSWER.to_string()
            }
        );
    }

    #[test]
    fn absent_tool_field_is_direct_answer() {
        assert_eq!(
            parse_ok(r#"{"answer": "just text"}"#),
            Command::DirectAnswer {
                answer: "just text".to_string()
            }
        );
    }

    #[test]
    fn empty_string_tool_is_direct_answer() {
        assert_eq!(
            parse_ok(r#"{"tool": "", "answer": "nothing to run"}"#),
            Command::DirectAnswer {
                answer: "nothing to run".to_string()
            }
        );
    }

    #[test]
    fn missing_args_defaults_to_empty_map() {
        match parse_ok(r#"{"tool": "query"}"#) {
            Command::ToolInvocation { args, .. } => assert!(args.is_empty()),
            other => panic!("expected tool invocation, got {:?}", other),
        }
    }

    #[test]
    fn extra_arg_keys_survive() {
        let raw = r#"{"tool": "query", "args": {"sql": "SELECT 1", "limit": 10}}"#;
        match parse_ok(raw) {
            Command::ToolInvocation { args, .. } => {
                assert_eq!(args.get("limit"), Some(&json!(10)));
            }
            other => panic!("expected tool invocation, got {:?}", other),
        }
    }

    #[test]
    fn prose_is_malformed() {
        let err = parse("hello world").unwrap_err();
        match err {
            ClientError::MalformedReply { raw } => assert_eq!(raw, "hello world"),
            other => panic!("expected malformed reply, got {:?}", other),
        }
    }

    #[test]
    fn non_object_json_is_malformed() {
        assert!(matches!(
            parse(r#"["tool", "query"]"#),
            Err(ClientError::MalformedReply { .. })
        ));
    }

    #[test]
    fn numeric_tool_field_is_malformed() {
        assert!(matches!(
            parse(r#"{"tool": 3}"#),
            Err(ClientError::MalformedReply { .. })
        ));
    }

    #[test]
    fn empty_fenced_block_is_malformed() {
        assert!(matches!(
            parse("```json```"),
            Err(ClientError::MalformedReply { .. })
        ));
    }
}
