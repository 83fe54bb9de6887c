//! Property-Based Tests for the Request Gateway
//!
//! Tests the following invariants:
//! - Deduplication: N concurrent calls with one request id run the operation once
//!   and every caller sees the same value
//! - Retry bound: a retryable failure is attempted at most `max_attempts` times
//! - Client errors are never retried
//! - The in-flight registry is empty once every caller has returned

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use proptest::prelude::*;

use pathwise_client::gateway::{RequestError, RequestGateway, RetryPolicy};

// ============================================================================
// Helpers
// ============================================================================

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

fn gateway(max_attempts: u32) -> RequestGateway {
    RequestGateway::new(RetryPolicy::new(max_attempts, Duration::from_millis(10)))
}

fn arb_request_id() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(:[a-z0-9]{1,6}){0,3}"
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_concurrent_same_id_runs_once(
        request_id in arb_request_id(),
        callers in 1usize..16,
        latency_ms in 1u64..200,
        value in any::<u32>(),
    ) {
        let runtime = paused_runtime();
        let gateway = gateway(3);
        let invocations = Arc::new(AtomicUsize::new(0));

        let results = runtime.block_on(async {
            let calls = (0..callers).map(|_| {
                let invocations = Arc::clone(&invocations);
                gateway.execute(&request_id, move || {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    async move {
                        tokio::time::sleep(Duration::from_millis(latency_ms)).await;
                        Ok::<_, RequestError>(value)
                    }
                })
            });
            join_all(calls).await
        });

        prop_assert_eq!(invocations.load(Ordering::SeqCst), 1);
        prop_assert_eq!(results.len(), callers);
        for result in results {
            prop_assert_eq!(result, Ok(value));
        }
        prop_assert_eq!(gateway.in_flight_count(), 0);
    }

    #[test]
    fn prop_retryable_failures_bounded_by_policy(
        max_attempts in 1u32..6,
        failures in 0usize..8,
    ) {
        let runtime = paused_runtime();
        let gateway = gateway(max_attempts);
        let attempts = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&attempts);
        let result = runtime.block_on(gateway.execute("topics:beginner", move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < failures {
                    Err(RequestError::Network("connection reset".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        }));

        let allowed = max_attempts as usize;
        prop_assert_eq!(attempts.load(Ordering::SeqCst), (failures + 1).min(allowed));
        prop_assert_eq!(result.is_ok(), failures < allowed);
        prop_assert_eq!(gateway.in_flight_count(), 0);
    }

    #[test]
    fn prop_client_errors_not_retried(
        status in 400u16..500,
        max_attempts in 1u32..6,
    ) {
        let runtime = paused_runtime();
        let gateway = gateway(max_attempts);
        let attempts = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&attempts);
        let result = runtime.block_on(gateway.execute("progress:toggle", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(RequestError::from_status(status, "rejected")) }
        }));

        prop_assert_eq!(attempts.load(Ordering::SeqCst), 1);
        let is_client_error = matches!(result, Err(RequestError::Client { .. }));
        prop_assert!(is_client_error);
    }
}
