use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webrelay::config::{Credentials, Settings};
use webrelay::errors::RelayError;
use webrelay::server::{self, CommandQueue};
use webrelay::session::Session;

const EXIT_SUCCESS: i32 = 0;

#[tokio::main]
async fn main() {
    let settings = Settings::parse();

    if let Err(err) = init_logging(&settings) {
        eprintln!("Failed to initialize logging: {err:#}");
        std::process::exit(1);
    }

    match run(settings).await {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            std::process::exit(exit_code_for(&err));
        }
    }
}

async fn run(settings: Settings) -> Result<()> {
    // Credentials are a startup precondition: fail before any browser
    // session exists.
    let credentials = Credentials::from_env()?;

    let session = Session::ensure(&settings, &credentials).await?;

    let (queue, rx) = CommandQueue::new(32);
    let worker = tokio::spawn(server::run_worker(session, rx));
    let app = server::router(queue);

    let addr = SocketAddr::from(([127, 0, 0, 1], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("daemon ready at http://{addr}/command");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("command server failed")?;

    // The server owned the last queue sender; once it returns the
    // worker drains any in-flight job and hands the session back.
    info!("shutting down");
    let session = worker.await.context("command worker panicked")?;
    session.close().await?;
    info!("session closed");
    Ok(())
}

fn init_logging(settings: &Settings) -> Result<()> {
    let log_path = settings.log_path();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(log_file)),
        )
        .init();
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    result = interrupt => {
                        if let Err(err) = result {
                            error!("Failed to listen for interrupt: {err}");
                        }
                    }
                    _ = terminate.recv() => {}
                }
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {err}");
                if let Err(err) = interrupt.await {
                    error!("Failed to listen for interrupt: {err}");
                }
            }
        }
    }

    #[cfg(not(unix))]
    if let Err(err) = interrupt.await {
        error!("Failed to listen for interrupt: {err}");
    }

    info!("received shutdown signal");
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RelayError>() {
        Some(relay_err) => relay_err.exit_code(),
        None => 1,
    }
}
