//! Grounding prompt construction for the completion oracle.

use redshift_mcp_core::protocol::ToolDefinition;

/// Render the instruction template sent to the model: one
/// `name(param: type, ...)` line per tool, the resource URI list, the
/// two accepted response shapes, and the user's verbatim query.
///
/// The JSON shapes shown here are a contract with the command parser.
/// The `tool`, `args`, and `answer` field names must change in both
/// places or neither.
pub fn build(user_query: &str, tools: &[ToolDefinition], resources: &[String]) -> String {
    let tool_descriptions = tools.iter().map(tool_line).collect::<Vec<_>>().join("\n");
    let resource_descriptions = resources
        .iter()
        .map(|uri| format!("- \"{uri}\" (use with resolve_resource(uri=\"{uri}\"))"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a helpful assistant with access to the following tools:

{tool_descriptions}

You also have access to the following resources:
{resource_descriptions}

To retrieve a resource, use the `resolve_resource` tool with a URI like so:
{{
  "tool": "resolve_resource",
  "args": {{
    "uri": "redshift://tables"
  }}
}}

When responding to a query, respond ONLY in JSON like this:
{{
  "tool": "tool_name",
  "args": {{
    "arg1": "value1",
    "arg2": "value2"
  }}
}}

If no tool is needed, respond with:
{{
  "tool": null,
  "answer": "Direct response goes here."
}}

User: {user_query}"#
    )
}

/// One prompt line per tool, parameters in the schema's declared order.
fn tool_line(tool: &ToolDefinition) -> String {
    let params = tool
        .input_schema
        .get("properties")
        .and_then(|properties| properties.as_object())
        .map(|properties| {
            properties
                .iter()
                .map(|(name, schema)| {
                    let kind = schema
                        .get("type")
                        .and_then(|value| value.as_str())
                        .unwrap_or("any");
                    format!("{name}: {kind}")
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    format!("- {}({params})", tool.name)
}
