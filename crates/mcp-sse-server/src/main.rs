//! MCP SSE server: entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use mcp_sse_server::config::{load_config, resolve_content_root};
use mcp_sse_server::transport::ENDPOINTS;
use mcp_sse_server::{Builtins, Invoker, ProtocolHandler, ServerConfig, SessionManager};

#[derive(Parser)]
#[command(
    name = "mcp-sse-server",
    about = "MCP server over Server-Sent Events with resources, tools and prompts",
    version
)]
struct Cli {
    /// Configuration file path (TOML).
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory holding logs/, docs/ and text/; overrides the configuration.
    #[arg(long, global = true)]
    content_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP/SSE server (default).
    Serve {
        /// Listen address; defaults to HOST:PORT from the configuration.
        #[arg(long)]
        addr: Option<String>,
    },

    /// Print the server info document.
    Info,

    /// Build the registry and report what it holds.
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    config.content_root = resolve_content_root(cli.content_root.as_deref(), &config);
    if !config.content_root.is_dir() {
        tracing::warn!(
            "Content root {} is not a directory; file resources will not be found",
            config.content_root.display()
        );
    }

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.addr());
            serve(config, &addr).await?;
        }

        Commands::Info => {
            let registry = Builtins::from_config(config)?.build_registry()?;
            let info = registry.server_info(&ENDPOINTS);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Validate => {
            println!("Content root: {}", config.content_root.display());
            match Builtins::from_config(config)?.build_registry() {
                Ok(registry) => {
                    println!("Registry is valid");
                    println!("  Resources: {}", registry.list_resources().len());
                    println!("  Templates: {}", registry.list_resource_templates().len());
                    println!("  Tools: {}", registry.list_tools().len());
                    println!("  Prompts: {}", registry.list_prompts().len());
                }
                Err(e) => {
                    eprintln!("Invalid registry: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "sse")]
async fn serve(config: ServerConfig, addr: &str) -> anyhow::Result<()> {
    let invoker = Invoker::with_deadline(config.invocation_timeout());
    let sessions = Arc::new(
        SessionManager::new(config.session_buffer)
            .with_send_timeout(config.session_send_timeout()),
    );
    let registry = Builtins::from_config(config)?.build_registry()?.into_shared();

    let handler = ProtocolHandler::new(registry, invoker);
    let transport = mcp_sse_server::SseTransport::new(handler, sessions);
    transport.run(addr).await?;
    Ok(())
}

#[cfg(not(feature = "sse"))]
async fn serve(_config: ServerConfig, _addr: &str) -> anyhow::Result<()> {
    anyhow::bail!("this build has no HTTP transport; rebuild with the `sse` feature")
}
