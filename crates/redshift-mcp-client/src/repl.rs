//! Interactive chat loop.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::ChatEngine;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::llm::CompletionOracle;

const COMMANDS: &[(&str, &str)] = &[
    ("help", "Show available commands"),
    ("quit", "Exit the application"),
    ("exit", "Exit the application"),
    ("tools", "List available tools"),
    ("reconnect", "Reconnect to the server"),
];

/// Run the interactive loop until `quit`, `exit`, or end of input.
///
/// Commands are matched case-insensitively before anything is sent to
/// the model. A failed turn prints a one-line error and the loop keeps
/// going; only losing stdin ends the session.
pub async fn run<O: CompletionOracle>(
    mut engine: ChatEngine<O>,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    println!("\n{}", "=== Redshift Database Client with Gemini ===".green());
    println!(
        "{}",
        format!("Model: {} | Server: {}", config.model, config.server_url).cyan()
    );
    println!(
        "{}",
        "Type your database queries or questions. Type 'help' for commands or 'quit' to exit."
            .cyan()
    );

    println!("\n{}", "Connecting to Redshift server...".yellow());
    match engine.session_mut().connect().await {
        Ok(()) => println!("{}", "Connected successfully!".green()),
        Err(error) => {
            tracing::error!(%error, "initial connection failed");
            println!(
                "{}",
                "Failed to connect to server. Use 'reconnect' command.".red()
            );
        }
    }

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("\nQuery> ") {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(query);
                match query.to_lowercase().as_str() {
                    "quit" | "exit" => {
                        println!("{}", "Goodbye!".green());
                        break;
                    }
                    "help" => print_help(),
                    "tools" => show_tools(&mut engine).await,
                    "reconnect" => reconnect(&mut engine).await,
                    _ => run_query(&mut engine, query).await,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("\n{}", "Operation cancelled. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(error) => {
                tracing::error!(%error, "readline failed");
                println!("\n{} {error}", "Error:".red());
                break;
            }
        }
    }

    println!("\n{}", "Thank you for using Redshift Database Client!".cyan());
    Ok(())
}

fn print_help() {
    println!("\n{}", "Available commands:".cyan());
    for (name, description) in COMMANDS {
        println!("  {}: {description}", name.green());
    }
}

async fn show_tools<O: CompletionOracle>(engine: &mut ChatEngine<O>) {
    if !engine.session().is_connected() {
        println!("{}", "Not connected to server. Use 'reconnect' first.".red());
        return;
    }
    match engine.session_mut().refresh_tools().await {
        Ok(tools) => {
            println!("\n{}", "Available tools:".cyan());
            for tool in tools {
                let description = tool.description.as_deref().unwrap_or("");
                println!("  {}: {description}", tool.name.green());
            }
        }
        Err(error) => println!("{} {error}", "Error:".red()),
    }
}

async fn reconnect<O: CompletionOracle>(engine: &mut ChatEngine<O>) {
    println!("{}", "Reconnecting to server...".cyan());
    match engine.session_mut().reconnect().await {
        Ok(()) => println!("{}", "Successfully reconnected!".green()),
        Err(error) => {
            tracing::error!(%error, "reconnection failed");
            println!("{}", "Reconnection failed. Check logs for details.".red());
        }
    }
}

/// Run one query turn, cancellable with ctrl-c without ending the loop.
async fn run_query<O: CompletionOracle>(engine: &mut ChatEngine<O>, query: &str) {
    if !engine.session().is_connected() {
        println!("{}", "Not connected to server. Use 'reconnect' first.".red());
        return;
    }
    println!("{}", "Processing your query...".cyan());
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\n{}", "Operation cancelled. Type 'quit' to exit.".yellow());
        }
        result = engine.process_query(query) => match result {
            Ok(response) => println!("{response}"),
            Err(error) => {
                if let ClientError::MalformedReply { raw } = &error {
                    tracing::debug!(%raw, "unparseable model reply");
                }
                println!("{} {error}", "Error:".red());
            }
        },
    }
}
