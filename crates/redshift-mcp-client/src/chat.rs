//! One query turn: ground, complete, parse, repair, dispatch.

use colored::Colorize;
use serde_json::{Map, Value};

use redshift_mcp_core::protocol::ToolContent;

use crate::command::{self, Command};
use crate::error::ClientError;
use crate::llm::CompletionOracle;
use crate::normalize;
use crate::prompt;
use crate::session::Session;

/// Shown when a tool call succeeds but returns no content.
const EMPTY_RESULT: &str = "No results returned from tool.";

/// Drives the query pipeline against a session and a completion oracle.
pub struct ChatEngine<O: CompletionOracle> {
    session: Session,
    oracle: O,
}

impl<O: CompletionOracle> ChatEngine<O> {
    pub fn new(session: Session, oracle: O) -> Self {
        Self { session, oracle }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Run one full turn: build the grounding prompt from the live
    /// catalog, ask the oracle, parse its reply, and either return the
    /// direct answer or dispatch the chosen tool.
    ///
    /// Catalog refresh failures propagate instead of degrading to an
    /// empty listing; a stale prompt would just teach the model the
    /// wrong tools.
    pub async fn process_query(&mut self, user_query: &str) -> Result<String, ClientError> {
        if !self.session.is_connected() {
            return Err(ClientError::NotConnected);
        }
        tracing::info!(query = user_query, "processing query");

        if self.session.tools().is_empty() {
            self.session.refresh_tools().await?;
        }
        let resources: Vec<String> = self
            .session
            .list_resources()
            .await?
            .into_iter()
            .map(|resource| resource.uri)
            .collect();

        let prompt = prompt::build(user_query, self.session.tools(), &resources);
        tracing::info!("sending prompt to model");
        let raw = self.oracle.complete(&prompt).await?;
        tracing::debug!(%raw, "model reply");

        match command::parse(&raw)? {
            Command::DirectAnswer { answer } => {
                tracing::info!("returning direct answer");
                Ok(answer)
            }
            Command::ToolInvocation { tool, args } => Ok(self.invoke_tool(&tool, args).await),
        }
    }

    /// Dispatch one tool call and format the outcome as a transcript.
    ///
    /// An unknown tool name is logged but still sent; the server is the
    /// authority on its own registry and the local catalog may be stale.
    async fn invoke_tool(&mut self, tool: &str, args: Map<String, Value>) -> String {
        if !self.session.tools().iter().any(|known| known.name == tool) {
            tracing::warn!(tool, "tool missing from local catalog, sending anyway");
        }

        let args = normalize::normalize(tool, args);
        tracing::info!(tool, args = %serde_json::Value::Object(args.clone()), "executing tool call");

        let mut transcript = vec![format!("\n{}", format!("[Executing {tool}]").blue())];
        match self.session.call_tool(tool, Value::Object(args)).await {
            Ok(result) => {
                let text = first_content_text(&result.content)
                    .unwrap_or_else(|| EMPTY_RESULT.to_string());
                if result.is_error.unwrap_or(false) {
                    tracing::error!(tool, error = %text, "tool reported failure");
                    transcript.push(format!(
                        "{} Error executing tool {tool}: {text}",
                        "[Error]".red()
                    ));
                } else {
                    tracing::debug!(tool, "tool call succeeded");
                    transcript.push(format!("{}", "[Result]".cyan()));
                    transcript.push(format!("{text}\n"));
                }
            }
            Err(error) => {
                tracing::error!(tool, %error, "tool call failed");
                transcript.push(format!(
                    "{} Error executing tool {tool}: {error}",
                    "[Error]".red()
                ));
            }
        }
        transcript.join("\n")
    }
}

/// Render the first content item for display.
fn first_content_text(content: &[ToolContent]) -> Option<String> {
    match content.first()? {
        ToolContent::Text { text } => Some(text.clone()),
        ToolContent::Json { json } => {
            // Only the pretty-printing is optional; the payload itself
            // always renders.
            Some(serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string()))
        }
    }
}
