use anyhow::Context;
use clap::Parser;
use duet_server::{ServerState, args::Args, router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = Args::parse();

    let state = ServerState::new(args.config());
    let listener = TcpListener::bind(args.host)
        .await
        .with_context(|| format!("bind {}", args.host))?;
    info!(addr = %args.host, "duet signaling server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    Ok(())
}
