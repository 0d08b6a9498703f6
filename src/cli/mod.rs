use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::auth::{generate_jwt, Claims};
use crate::config::{self, AppConfig};
use crate::routes;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "orgadmin")]
#[command(about = "Organization administration API - roles, users and organizations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides ORGADMIN_PORT)")]
        port: Option<u16>,
        #[arg(long, default_value = "0.0.0.0", help = "Address to bind")]
        bind: String,
    },

    #[command(about = "Mint a bearer token signed with JWT_SECRET")]
    Token {
        #[arg(long, help = "Token subject (user name)")]
        subject: String,
        #[arg(long, help = "Tenant the subject belongs to")]
        tenant: String,
        #[arg(long, default_value = "admin", help = "Access level (admin or root for API access)")]
        access: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::config().clone();

    match cli.command.unwrap_or(Commands::Serve { port: None, bind: "0.0.0.0".to_string() }) {
        Commands::Serve { port, bind } => serve(config, port, &bind).await,
        Commands::Token { subject, tenant, access } => {
            let claims = Claims::new(subject, tenant, access, config.security.jwt_expiry_hours);
            let token = generate_jwt(&claims, &config.security.jwt_secret)?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, port: Option<u16>, bind: &str) -> anyhow::Result<()> {
    let port = port.unwrap_or(config.api.port);
    tracing::info!("Starting organization admin API in {:?} mode", config.environment);

    let state = AppState::from_config(config).await?;
    let app = routes::app(state);

    let bind_addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. A signal listener that fails to install never
/// resolves, so the server keeps running.
async fn wait_for_signal<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::error!("failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
