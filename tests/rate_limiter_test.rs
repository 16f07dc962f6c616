//! Tests for [`RateLimiter`]: per-client sliding window.

use std::sync::Arc;
use std::time::Duration;

use switchyard::limiter::{Admission, RateLimitConfig, RateLimiter};
use tokio::sync::Barrier;

fn limiter(limit: usize, window_secs: u64) -> RateLimiter {
    RateLimiter::new(
        &RateLimitConfig::new()
            .limit(limit)
            .window(Duration::from_secs(window_secs)),
    )
}

async fn advance_secs(secs: u64) {
    tokio::time::advance(Duration::from_secs(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn two_per_minute_scenario() {
    let limiter = limiter(2, 60);

    let mut results = Vec::new();
    results.push(limiter.allow("A")); // t=0
    advance_secs(1).await;
    results.push(limiter.allow("A")); // t=1
    advance_secs(1).await;
    results.push(limiter.allow("A")); // t=2
    assert_eq!(results, [true, true, false]);

    advance_secs(59).await; // t=61
    assert!(limiter.allow("A"));
}

#[tokio::test(start_paused = true)]
async fn exactly_limit_admitted_within_window() {
    let limiter = limiter(5, 10);
    let admitted = (0..8).filter(|_| limiter.allow("k")).count();
    assert_eq!(admitted, 5);
}

#[tokio::test(start_paused = true)]
async fn slot_frees_once_earliest_call_leaves_window() {
    let limiter = limiter(2, 10);
    assert!(limiter.allow("k")); // t=0
    advance_secs(4).await;
    assert!(limiter.allow("k")); // t=4
    assert!(!limiter.allow("k"));

    advance_secs(5).await; // t=9: t=0 still inside
    assert!(!limiter.allow("k"));

    advance_secs(1).await; // t=10: t=0 falls out
    assert!(limiter.allow("k"));
    assert!(!limiter.allow("k"));
}

#[tokio::test(start_paused = true)]
async fn rejections_do_not_extend_window() {
    let limiter = limiter(1, 10);
    assert!(limiter.allow("k"));
    for _ in 0..5 {
        advance_secs(1).await;
        assert!(!limiter.allow("k"));
    }
    advance_secs(5).await; // t=10
    assert!(limiter.allow("k"));
}

#[tokio::test(start_paused = true)]
async fn rejection_reports_retry_after() {
    let limiter = limiter(1, 60);
    assert!(limiter.allow("k"));
    advance_secs(20).await;

    assert_eq!(
        limiter.acquire("k"),
        Admission::Rejected {
            retry_after: Some(Duration::from_secs(40))
        }
    );
}

#[tokio::test(start_paused = true)]
async fn remaining_recovers_after_window() {
    let limiter = limiter(3, 10);
    limiter.allow("k");
    limiter.allow("k");
    assert_eq!(limiter.remaining("k"), 1);

    advance_secs(11).await;
    assert_eq!(limiter.remaining("k"), 3);
}

#[test]
fn clients_do_not_share_windows() {
    let limiter = limiter(1, 60);
    assert!(limiter.allow("10.0.0.1:5000"));
    assert!(limiter.allow("10.0.0.2:5000"));
    assert!(!limiter.allow("10.0.0.1:5000"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_slot_goes_to_exactly_one_caller() {
    let limiter = Arc::new(limiter(2, 60));

    for round in 0..50 {
        let key = format!("B-{round}");
        assert!(limiter.allow(&key));

        let barrier = Arc::new(Barrier::new(2));
        let mut handles = Vec::new();
        for _ in 0..2 {
            let limiter = Arc::clone(&limiter);
            let barrier = Arc::clone(&barrier);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                limiter.allow(&key)
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1, "round {round}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_burst_never_overshoots() {
    let limiter = Arc::new(limiter(5, 60));
    let barrier = Arc::new(Barrier::new(32));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let limiter = Arc::clone(&limiter);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            limiter.allow("burst")
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 5);
}
