// Integration tests for the HTTP command contract.
//
// The router is served on an ephemeral port in front of a scripted
// worker instead of a live browser session, so these run without a
// WebDriver. The wire contract they assert is the daemon's whole
// external surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use webrelay::server::{CommandQueue, router};

/// Serve the router on an ephemeral port; `handler` plays the worker.
async fn spawn_server<F>(mut handler: F) -> String
where
    F: FnMut(&str) -> bool + Send + 'static,
{
    let (queue, mut rx) = CommandQueue::new(8);
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let outcome = handler(&job.name);
            let _ = job.reply.send(outcome);
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    let app = router(queue);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_known_command_round_trip() {
    let base = spawn_server(|name| name == "Good Night").await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/command"))
        .body(r#"{"command": "Good Night"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "Clicked");
}

#[tokio::test]
async fn test_unknown_command_reports_failure_without_crashing() {
    let base = spawn_server(|name| name == "Good Night").await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/command"))
        .body(r#"{"command": "No Such Card"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    assert_eq!(response.text().await.unwrap(), "Failed to click");

    // Liveness under bad input: the daemon keeps serving.
    let response = client
        .post(format!("{base}/command"))
        .body(r#"{"command": "Good Night"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_whitespace_only_command_is_a_bad_request() {
    let base = spawn_server(|_| true).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/command"))
        .body(r#"{"command": "  "}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(response.text().await.unwrap(), r#"Missing "command" field."#);
}

#[tokio::test]
async fn test_missing_field_and_malformed_bodies_are_bad_requests() {
    let base = spawn_server(|_| true).await;
    let client = reqwest::Client::new();

    for body in ["{}", "not json", ""] {
        let response = client
            .post(format!("{base}/command"))
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "body: {body:?}");
        assert_eq!(response.text().await.unwrap(), r#"Missing "command" field."#);
    }
}

#[tokio::test]
async fn test_other_paths_and_methods_are_not_found() {
    let base = spawn_server(|_| true).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "Not Found");

    let response = client
        .get(format!("{base}/command"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = client
        .post(format!("{base}/other"))
        .body(r#"{"command": "Good Night"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_repeating_a_successful_command_succeeds_again() {
    let base = spawn_server(|name| name == "Good Night").await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let response = client
            .post(format!("{base}/command"))
            .body(r#"{"command": "Good Night"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "Clicked");
    }
}

#[tokio::test]
async fn test_concurrent_requests_are_dispatched_one_at_a_time() {
    let (queue, mut rx) = CommandQueue::new(8);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let observed_overlap = Arc::new(AtomicUsize::new(0));

    let worker_in_flight = in_flight.clone();
    let worker_overlap = observed_overlap.clone();
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let now = worker_in_flight.fetch_add(1, Ordering::SeqCst);
            if now > 0 {
                worker_overlap.fetch_add(1, Ordering::SeqCst);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            worker_in_flight.fetch_sub(1, Ordering::SeqCst);
            let _ = job.reply.send(true);
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(queue);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let post = |body: &'static str| {
        let client = client.clone();
        let url = format!("http://{addr}/command");
        async move { client.post(url).body(body).send().await.unwrap().status() }
    };

    let (first, second) = tokio::join!(
        post(r#"{"command": "Good Night"}"#),
        post(r#"{"command": "Movie Time"}"#)
    );

    assert_eq!(first, 200);
    assert_eq!(second, 200);
    assert_eq!(observed_overlap.load(Ordering::SeqCst), 0);
}
