use clap::Parser;

use redshift_mcp_client::config::{ClientConfig, DEFAULT_MODEL, DEFAULT_SERVER_URL};
use redshift_mcp_client::session::{HttpTransport, Session};
use redshift_mcp_client::{ChatEngine, ClientError, GeminiClient, repl};

#[derive(Parser, Debug)]
#[command(
    name = "redshift-chat",
    version,
    about = "Interactive Gemini chat over the Redshift MCP server"
)]
struct Cli {
    /// Gemini model used to pick tools and answer
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// MCP server endpoint
    #[arg(long, env = "MCP_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let api_key =
        std::env::var("GEMINI_API_KEY").map_err(|_| ClientError::MissingEnv("GEMINI_API_KEY"))?;
    let config = ClientConfig {
        api_key,
        model: cli.model,
        server_url: cli.server,
    };

    let oracle = GeminiClient::new(config.api_key.clone(), config.model.clone())?;
    let transport = HttpTransport::new(config.server_url.clone())?;
    let engine = ChatEngine::new(Session::new(Box::new(transport)), oracle);

    repl::run(engine, &config).await
}
