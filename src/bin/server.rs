//! HTTP server binary for the Messenger Remote API
//!
//! Starts the REST service that remote-controls automated Messenger browser
//! sessions.
//!
//! # Usage
//!
//! ```bash
//! messenger-remote-server --port 5000 --host ::
//! ```
//!
//! # API Endpoints
//!
//! - `POST /api/messenger/login`: start a login flow, mints the session token
//! - `POST /api/messenger/{token}/confirmLogin`: submit a confirmation code
//! - `POST /api/messenger/{token}/send`: send a message
//! - `GET /api/messenger/{token}/status`: poll the session status
//! - `GET /api/messenger/{token}/keepAlive`: refresh the session expiry
//! - `GET /ping`: health check

use std::sync::Arc;

use clap::Parser;
use messenger_remote::{Settings, server::app, session::SessionRegistry, spawn_sweeper, utils::version};

/// HTTP server for the Messenger Remote API
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "::")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    // Load configuration
    let settings = match Settings::from_env() {
        Ok(mut settings) => {
            // Override with CLI arguments
            settings.server.host = cli.host.clone();
            settings.server.port = cli.port;
            settings
        }
        Err(e) => {
            tracing::warn!(
                "Failed to load settings from environment: {}. Using defaults.",
                e
            );
            let mut settings = Settings::default();
            settings.server.host = cli.host.clone();
            settings.server.port = cli.port;
            settings
        }
    };

    tracing::info!("Starting Messenger Remote API v{}", version::get_version());

    let registry = Arc::new(SessionRegistry::new(settings.clone()));
    let sweeper = spawn_sweeper(Arc::clone(&registry), settings.sweep_interval());

    let app = app::create_app_with_registry(Arc::clone(&registry), settings.clone());

    let addr = bind_address(&cli.host, cli.port).await?;
    tracing::info!(
        "Messenger Remote API v{} listening on {}",
        version::get_version(),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    // drain the registry so every browser session is torn down
    sweeper.abort();
    registry.shutdown().await;

    Ok(())
}

/// Resolve the listen address. `::` prefers IPv6-any but falls back to
/// 0.0.0.0 on hosts without IPv6; anything else must be a literal IP.
async fn bind_address(host: &str, port: u16) -> anyhow::Result<std::net::SocketAddr> {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

    match host {
        "::" => {
            let addr = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port);
            match tokio::net::TcpListener::bind(addr).await {
                Ok(_) => Ok(addr),
                Err(e) => {
                    tracing::warn!(
                        "Could not listen on [::]:{} (Caused by {}), falling back to 0.0.0.0",
                        port,
                        e
                    );
                    Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))
                }
            }
        }
        _ => match host.parse::<IpAddr>() {
            Ok(ip) => Ok(SocketAddr::new(ip, port)),
            Err(_) => anyhow::bail!(
                "Invalid host address: {}. Use '::' for IPv6 or '0.0.0.0' for IPv4",
                host
            ),
        },
    }
}
