//! HTTP command endpoint and the single-worker queue behind it.
//!
//! Handlers never touch the browser session directly: they enqueue
//! into a bounded channel consumed by one worker task that owns the
//! session, so concurrent requests cannot interleave driver traffic
//! against the one browser tab.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::dispatch;
use crate::session::Session;

const MISSING_COMMAND: &str = r#"Missing "command" field."#;

/// One command awaiting dispatch, with its reply slot
pub struct CommandJob {
    pub name: String,
    pub reply: oneshot::Sender<bool>,
}

/// Sender half of the single-worker command queue
#[derive(Clone)]
pub struct CommandQueue {
    tx: mpsc::Sender<CommandJob>,
}

impl CommandQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<CommandJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue a command and wait for the worker's verdict.
    pub async fn submit(&self, name: String) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = CommandJob {
            name,
            reply: reply_tx,
        };
        if self.tx.send(job).await.is_err() {
            error!("command worker is gone");
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }
}

/// Consume commands one at a time against the session.
///
/// Returns the session when the queue closes so shutdown can close it
/// after the in-flight command finishes.
pub async fn run_worker(session: Session, mut rx: mpsc::Receiver<CommandJob>) -> Session {
    while let Some(job) = rx.recv().await {
        let outcome = dispatch::click_automation(session.client(), &job.name).await;
        let _ = job.reply.send(outcome);
    }
    session
}

pub fn router(queue: CommandQueue) -> Router {
    // The contract is 404 for anything but POST /command, including
    // other methods on the command path.
    Router::new()
        .route("/command", post(handle_command).fallback(not_found))
        .fallback(not_found)
        .with_state(queue)
}

#[derive(Deserialize)]
struct CommandRequest {
    command: Option<String>,
}

/// Pull a usable command name out of a request body. Unparseable
/// bodies and blank names are both treated as missing.
pub(crate) fn extract_command(body: &str) -> Option<String> {
    let request: CommandRequest = serde_json::from_str(body).ok()?;
    let command = request.command?.trim().to_string();
    if command.is_empty() { None } else { Some(command) }
}

async fn handle_command(
    State(queue): State<CommandQueue>,
    body: String,
) -> (StatusCode, &'static str) {
    let Some(command) = extract_command(&body) else {
        return (StatusCode::BAD_REQUEST, MISSING_COMMAND);
    };

    info!(%command, "received command");
    if queue.submit(command).await {
        (StatusCode::OK, "Clicked")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to click")
    }
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
