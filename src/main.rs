//! Appserver MCP - MCP and HTTP gateway for the Appserver business-intelligence backend

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appserver_mcp::api::{self, AppState};
use appserver_mcp::config::Config;
use appserver_mcp::mcp::{self, AppserverServer};
use appserver_mcp::service;

#[derive(Parser)]
#[command(name = "appserver-mcp")]
#[command(about = "MCP and HTTP gateway for the Appserver business-intelligence backend")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (includes MCP at /mcp)
    Serve {
        /// Port to listen on (default: server.http_port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Disable MCP endpoint
        #[arg(long)]
        no_mcp: bool,
    },

    /// Start the MCP server (stdio mode for desktop clients)
    Mcp,

    /// Print server version and model status
    About,

    /// Validate the config and check that the Appserver is reachable
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout belongs to the stdio MCP transport
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("appserver_mcp={},tower_http=debug", log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment
    let _ = dotenvy::dotenv();

    // Load config
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Serve { port, no_mcp } => {
            config.validate()?;
            let port = port.unwrap_or(config.server.http_port);
            let (appserver, angles) = service::connect(&config)?;
            let state = AppState::new(appserver, angles, config.server.environment.clone());

            tracing::info!("Starting HTTP server on port {}", port);

            let ct = CancellationToken::new();
            let router = if no_mcp {
                api::create_router(state)
            } else {
                api::create_router_with_mcp(state, ct.clone())
            };

            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

            println!("Appserver MCP server running at http://localhost:{}", port);
            println!("  Backend:  {}", config.appserver.base_url);
            println!("  API Docs: http://localhost:{}/api/docs", port);
            if !no_mcp {
                println!("  MCP:      http://localhost:{}/mcp", port);
            }
            println!("  Health:   http://localhost:{}/api/health", port);

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    tokio::signal::ctrl_c().await.ok();
                    tracing::info!("Shutting down...");
                    ct.cancel();
                })
                .await?;
        }

        Commands::Mcp => {
            config.validate()?;
            let (appserver, angles) = service::connect(&config)?;

            tracing::info!("Starting MCP server (stdio mode)");

            let server = AppserverServer::new(appserver, angles);
            mcp::serve_stdio(server).await?;
        }

        Commands::About => {
            config.validate()?;
            let (appserver, _) = service::connect(&config)?;
            let about = appserver.about().await?;
            let stats = about.statistics();

            println!("Appserver {}", about.app_server_version);
            println!("==================");
            println!(
                "Models: {} ({} up, {} down, {} real-time)",
                stats.total_models, stats.models_up, stats.models_down, stats.real_time_models
            );
            println!();
            for model in &about.models {
                println!("• {} v{} [{}]", model.model_id, model.version, model.status);
            }
        }

        Commands::Check => {
            config.validate()?;
            println!("✓ Config is valid");

            let (appserver, _) = service::connect(&config)?;
            let status = appserver.server_status().await;
            if status != "Healthy" {
                anyhow::bail!("Appserver at {} is not healthy: {}", config.appserver.base_url, status);
            }
            println!("✓ Appserver at {} is {}", config.appserver.base_url, status);
        }
    }

    Ok(())
}
