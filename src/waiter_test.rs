// Unit tests for the polling waiter

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

#[tokio::test]
async fn test_immediate_success_returns_the_value() {
    let result = wait_until(Duration::from_secs(1), || async move { Some(42) }).await;
    assert_eq!(result.unwrap(), 42);
}

#[tokio::test]
async fn test_eventual_success_after_a_few_polls() {
    let calls = AtomicUsize::new(0);
    let calls = &calls;
    let result = wait_until(Duration::from_secs(5), || async move {
        if calls.fetch_add(1, Ordering::SeqCst) >= 2 {
            Some("ready")
        } else {
            None
        }
    })
    .await;

    assert_eq!(result.unwrap(), "ready");
    assert!(calls.load(Ordering::SeqCst) >= 3);
}

#[tokio::test]
async fn test_times_out_when_the_predicate_never_holds() {
    let result = wait_until(Duration::from_millis(300), || async move { None::<()> }).await;
    assert!(matches!(result, Err(RelayError::Timeout(_))));
}

#[tokio::test]
async fn test_timeout_reports_the_configured_bound() {
    let timeout = Duration::from_millis(50);
    let err = wait_until(timeout, || async move { None::<()> })
        .await
        .unwrap_err();
    match err {
        RelayError::Timeout(reported) => assert_eq!(reported, timeout),
        other => panic!("expected Timeout, got {other:?}"),
    }
}
