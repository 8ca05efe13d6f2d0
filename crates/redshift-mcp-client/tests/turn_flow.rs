//! Full-turn tests: canned model replies against a faked MCP server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use redshift_mcp_client::chat::ChatEngine;
use redshift_mcp_client::error::ClientError;
use redshift_mcp_client::llm::CompletionOracle;
use redshift_mcp_client::session::{McpTransport, Session};
use redshift_mcp_core::protocol::{CallToolResponse, JsonRpcRequest, JsonRpcResponse};

/// Records every tools/call params object the server saw.
#[derive(Default)]
struct Recorded {
    calls: Mutex<Vec<Value>>,
}

/// In-process stand-in for the MCP server, keyed on request method.
struct FakeServer {
    recorded: Arc<Recorded>,
    call_reply: Value,
    resources_fail: bool,
}

#[async_trait]
impl McpTransport for FakeServer {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, ClientError> {
        let id = request.id.clone();
        let result = match request.method.as_str() {
            "initialize" => json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "serverInfo": {"name": "fake-redshift", "version": "0.0.0"},
            }),
            "initialized" => json!({}),
            "tools/list" => json!({"tools": [
                {
                    "name": "get_table_schema",
                    "description": "Get column names and types for one table",
                    "inputSchema": {
                        "type": "object",
                        "properties": {"table_name": {"type": "string"}},
                        "required": ["table_name"],
                    },
                },
                {
                    "name": "query",
                    "description": "Run read-only SQL",
                    "inputSchema": {
                        "type": "object",
                        "properties": {"sql": {"type": "string"}},
                        "required": ["sql"],
                    },
                },
            ]}),
            "resources/list" => {
                if self.resources_fail {
                    return Ok(JsonRpcResponse::error(id, -32603, "catalog offline"));
                }
                json!({"resources": [{
                    "uri": "redshift://tables",
                    "mimeType": "application/json",
                    "name": "Redshift Tables",
                }]})
            }
            "tools/call" => {
                let params = request.params.clone().unwrap_or(Value::Null);
                self.recorded.calls.lock().unwrap().push(params);
                self.call_reply.clone()
            }
            other => return Ok(JsonRpcResponse::error(id, -32601, format!("no {other}"))),
        };
        Ok(JsonRpcResponse::success(id, result))
    }
}

/// Oracle that always answers with the same canned text.
struct CannedOracle {
    reply: String,
}

#[async_trait]
impl CompletionOracle for CannedOracle {
    async fn complete(&self, _prompt: &str) -> Result<String, ClientError> {
        Ok(self.reply.clone())
    }
}

/// Oracle that also keeps every prompt it was sent.
struct RecordingOracle {
    prompts: Arc<Mutex<Vec<String>>>,
    reply: String,
}

#[async_trait]
impl CompletionOracle for RecordingOracle {
    async fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

fn success_reply(payload: Value) -> Value {
    serde_json::to_value(CallToolResponse::json(payload)).unwrap()
}

async fn connected_engine(
    oracle_reply: &str,
    call_reply: Value,
) -> (ChatEngine<CannedOracle>, Arc<Recorded>) {
    let recorded = Arc::new(Recorded::default());
    let transport = FakeServer {
        recorded: Arc::clone(&recorded),
        call_reply,
        resources_fail: false,
    };
    let mut session = Session::new(Box::new(transport));
    session.connect().await.expect("connect should succeed");
    let engine = ChatEngine::new(
        session,
        CannedOracle {
            reply: oracle_reply.to_string(),
        },
    );
    (engine, recorded)
}

#[tokio::test]
async fn fenced_reply_is_repaired_and_dispatched() {
    let reply = "```json\n{\"tool\":\"get_table_schema\",\"args\":{\"name\":\"orders\"}}\n```";
    let (mut engine, recorded) =
        connected_engine(reply, success_reply(json!({"columns": []}))).await;

    let transcript = engine.process_query("describe orders").await.unwrap();

    assert!(transcript.contains("[Executing get_table_schema]"));
    assert!(transcript.contains("[Result]"));

    let calls = recorded.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["name"], json!("get_table_schema"));
    assert_eq!(calls[0]["arguments"], json!({"table_name": "orders"}));
}

#[tokio::test]
async fn query_alias_is_rewritten_to_sql() {
    let reply = r#"{"tool": "query", "args": {"query": "SELECT * FROM nope"}}"#;
    let error_reply = serde_json::to_value(CallToolResponse::error(
        "relation \"nope\" does not exist",
    ))
    .unwrap();
    let (mut engine, recorded) = connected_engine(reply, error_reply).await;

    let transcript = engine.process_query("select from nope").await.unwrap();

    assert!(transcript.contains("[Executing query]"));
    assert!(transcript.contains("Error executing tool query: relation \"nope\" does not exist"));
    assert!(!transcript.contains("[Result]"));

    let calls = recorded.calls.lock().unwrap();
    assert_eq!(calls[0]["arguments"], json!({"sql": "SELECT * FROM nope"}));
}

#[tokio::test]
async fn direct_answer_skips_tool_execution() {
    let reply = r#"{"tool": null, "answer": "There are 5 tables."}"#;
    let (mut engine, recorded) = connected_engine(reply, success_reply(json!([]))).await;

    let answer = engine.process_query("how many tables?").await.unwrap();

    assert_eq!(answer, "There are 5 tables.");
    assert!(recorded.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn prose_reply_surfaces_as_malformed() {
    let (mut engine, recorded) =
        connected_engine("hello world", success_reply(json!([]))).await;

    let err = engine.process_query("hi").await.unwrap_err();

    match err {
        ClientError::MalformedReply { raw } => assert_eq!(raw, "hello world"),
        other => panic!("expected malformed reply, got {:?}", other),
    }
    assert!(recorded.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_tool_is_still_sent_to_server() {
    let reply = r#"{"tool": "describe_cluster", "args": {}}"#;
    let (mut engine, recorded) =
        connected_engine(reply, success_reply(json!({"nodes": 2}))).await;

    let transcript = engine.process_query("cluster info").await.unwrap();

    assert!(transcript.contains("[Executing describe_cluster]"));
    let calls = recorded.calls.lock().unwrap();
    assert_eq!(calls[0]["name"], json!("describe_cluster"));
}

#[tokio::test]
async fn empty_tool_content_renders_placeholder() {
    let reply = r#"{"tool": "query", "args": {"sql": "SELECT 1"}}"#;
    let empty = serde_json::to_value(CallToolResponse {
        content: vec![],
        is_error: Some(false),
    })
    .unwrap();
    let (mut engine, _recorded) = connected_engine(reply, empty).await;

    let transcript = engine.process_query("one").await.unwrap();

    assert!(transcript.contains("No results returned from tool."));
}

#[tokio::test]
async fn resource_listing_failure_propagates() {
    let recorded = Arc::new(Recorded::default());
    let transport = FakeServer {
        recorded: Arc::clone(&recorded),
        call_reply: success_reply(json!([])),
        resources_fail: true,
    };
    let mut session = Session::new(Box::new(transport));
    session.connect().await.unwrap();
    let mut engine = ChatEngine::new(
        session,
        CannedOracle {
            reply: r#"{"tool": null, "answer": "unreached"}"#.to_string(),
        },
    );

    let err = engine.process_query("anything").await.unwrap_err();

    assert!(matches!(err, ClientError::Rpc { code: -32603, .. }));
    assert!(recorded.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn prompt_grounds_the_live_catalog() {
    let recorded = Arc::new(Recorded::default());
    let transport = FakeServer {
        recorded: Arc::clone(&recorded),
        call_reply: success_reply(json!([])),
        resources_fail: false,
    };
    let mut session = Session::new(Box::new(transport));
    session.connect().await.unwrap();

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let oracle = RecordingOracle {
        prompts: Arc::clone(&prompts),
        reply: r#"{"tool": null, "answer": "ok"}"#.to_string(),
    };
    let mut engine = ChatEngine::new(session, oracle);

    engine.process_query("how many tables?").await.unwrap();

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("- get_table_schema(table_name: string)"));
    assert!(prompt.contains("- query(sql: string)"));
    assert!(prompt.contains(
        "- \"redshift://tables\" (use with resolve_resource(uri=\"redshift://tables\"))"
    ));
    assert!(prompt.ends_with("User: how many tables?"));
}

#[tokio::test]
async fn disconnected_engine_fails_fast() {
    let recorded = Arc::new(Recorded::default());
    let transport = FakeServer {
        recorded: Arc::clone(&recorded),
        call_reply: success_reply(json!([])),
        resources_fail: false,
    };
    let session = Session::new(Box::new(transport));
    let mut engine = ChatEngine::new(
        session,
        CannedOracle {
            reply: r#"{"tool": null, "answer": "unreached"}"#.to_string(),
        },
    );

    let err = engine.process_query("anything").await.unwrap_err();

    assert!(matches!(err, ClientError::NotConnected));
}
