//! Error pipeline behavior through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ledgerline_common::error::{ErrorCode, ErrorContext, ErrorReporter, NormalizedError};
use ledgerline_common::retry::with_retry;

#[tokio::test]
async fn retried_operations_report_only_their_final_failure() {
    let reporter = Arc::new(ErrorReporter::new());
    let attempts = Arc::new(AtomicUsize::new(0));

    let counter = attempts.clone();
    let outcome: Result<(), _> = with_retry(
        move || {
            let counter = counter.clone();
            async move {
                let _ = counter.fetch_add(1, Ordering::SeqCst);
                Err(NormalizedError::from_response(503, None, None))
            }
        },
        2,
        Duration::from_millis(1),
    )
    .await;

    let error = outcome.expect_err("exhausted");
    let reported = reporter.report(error, &ErrorContext::new("sync", "POST sync/run"));

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(reported.code, ErrorCode::ServiceUnavailable);
    assert_eq!(reporter.recent_errors().len(), 1);
}

#[test]
fn reported_errors_keep_their_identity_through_the_reporter() {
    let reporter = ErrorReporter::new();
    let original = NormalizedError::from_response(409, None, Some("req-42".into()));

    let reported = reporter.report(original.clone(), &ErrorContext::new("sales", "PUT sales/quotes/7"));

    assert_eq!(reported.status, original.status);
    assert_eq!(reported.code, original.code);
    assert_eq!(reported.request_id, original.request_id);
    assert_eq!(reported.timestamp, original.timestamp);
}
