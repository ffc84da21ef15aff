//! # Authorization Flows
//!
//! Transaction service → event bus → authentication service → event bus →
//! transaction service, with both services running as tasks.

use super::fixtures::{eventually, token_of_len, Harness};
use csms_authentication::StaticTokenStore;
use csms_transactions::{AuthorizationError, CorrelationId};
use shared_bus::{BusEvent, EventFilter, EventPublisher, EventSubscriber, EventTopic};
use shared_types::{AuthenticationResponse, AuthenticationStatus};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn scenario_store() -> StaticTokenStore {
    StaticTokenStore::new()
        .with_token(token_of_len(19), true)
        .with_token(token_of_len(20), true)
        .with_token(token_of_len(50), false)
}

// =============================================================================
// OUTCOMES
// =============================================================================

#[tokio::test]
async fn test_outcome_scenarios() {
    let harness = Harness::new(scenario_store(), TIMEOUT);

    let cases = [
        (Some(token_of_len(19)), AuthenticationStatus::Invalid),
        (Some(token_of_len(20)), AuthenticationStatus::Accepted),
        (Some(token_of_len(50)), AuthenticationStatus::Rejected),
        (Some(token_of_len(80)), AuthenticationStatus::Unknown),
        (None, AuthenticationStatus::Invalid),
    ];

    for (token, expected) in cases {
        let outcome = harness.handler.authorize("station-1", token.clone()).await;
        assert_eq!(outcome, Ok(expected), "token {token:?}");
    }

    assert_eq!(harness.registry.pending_count(), 0);
    assert_eq!(harness.registry.stats().snapshot().completed, 5);
}

#[tokio::test]
async fn test_seeded_store_decisions() {
    let harness = Harness::new(StaticTokenStore::seeded(), TIMEOUT);

    let accepted = harness
        .handler
        .authorize("station-1", Some("driverABC-1234567890".into()))
        .await;
    let rejected = harness
        .handler
        .authorize(
            "station-1",
            Some("DISABLED_suspended-account-driver-token-abc".into()),
        )
        .await;

    assert_eq!(accepted, Ok(AuthenticationStatus::Accepted));
    assert_eq!(rejected, Ok(AuthenticationStatus::Rejected));
}

// =============================================================================
// FAILURE PATHS
// =============================================================================

#[tokio::test]
async fn test_no_consumer_is_publish_failure() {
    let harness = Harness::without_consumer(TIMEOUT);

    let outcome = harness
        .handler
        .authorize("station-1", Some(token_of_len(20)))
        .await;

    assert!(matches!(outcome, Err(AuthorizationError::Internal(_))));
    assert_eq!(harness.registry.pending_count(), 0);
}

#[tokio::test]
async fn test_silent_consumer_times_out_and_cleans_up() {
    let harness = Harness::without_consumer(Duration::from_millis(100));
    // Subscribed, never answers.
    let _silent = harness
        .bus
        .subscribe(EventFilter::topics(vec![EventTopic::AuthRequest]));

    let outcome = harness
        .handler
        .authorize("station-1", Some(token_of_len(20)))
        .await;

    assert_eq!(
        outcome,
        Err(AuthorizationError::Timeout(Duration::from_millis(100)))
    );
    assert_eq!(harness.registry.pending_count(), 0);
    assert_eq!(harness.registry.stats().snapshot().timeouts, 1);
}

#[tokio::test]
async fn test_late_reply_after_timeout_is_stale() {
    let harness = Harness::without_consumer(Duration::from_millis(50));
    let mut requests = harness
        .bus
        .subscribe(EventFilter::topics(vec![EventTopic::AuthRequest]));

    let outcome = harness
        .handler
        .authorize("station-1", Some(token_of_len(20)))
        .await;
    assert!(matches!(outcome, Err(AuthorizationError::Timeout(_))));

    // Answer only now.
    let request = requests.recv().await.unwrap().decode_request().unwrap();
    let late = AuthenticationResponse::new(request.reply_id(), AuthenticationStatus::Accepted);
    harness.bus.publish(BusEvent::response(&late).unwrap()).await;

    let registry = Arc::clone(&harness.registry);
    assert!(eventually(|| registry.stats().snapshot().stale_replies == 1).await);
    assert_eq!(registry.pending_count(), 0);
}

// =============================================================================
// STRAY AND DUPLICATE REPLIES
// =============================================================================

#[tokio::test]
async fn test_unknown_reply_is_ignored() {
    let harness = Harness::new(scenario_store(), TIMEOUT);

    for request_id in [CorrelationId::new().to_string(), "not-a-uuid".to_string()] {
        let stray = AuthenticationResponse::new(request_id, AuthenticationStatus::Accepted);
        harness.bus.publish(BusEvent::response(&stray).unwrap()).await;
    }

    let registry = Arc::clone(&harness.registry);
    assert!(eventually(|| registry.stats().snapshot().stale_replies == 2).await);

    // The exchange keeps working.
    let outcome = harness
        .handler
        .authorize("station-1", Some(token_of_len(50)))
        .await;
    assert_eq!(outcome, Ok(AuthenticationStatus::Rejected));
}

#[tokio::test]
async fn test_duplicate_replies_settle_once() {
    let mut harness = Harness::new(scenario_store(), TIMEOUT);
    harness.add_consumer(scenario_store());

    let outcome = harness
        .handler
        .authorize("station-1", Some(token_of_len(20)))
        .await;
    assert_eq!(outcome, Ok(AuthenticationStatus::Accepted));

    let registry = Arc::clone(&harness.registry);
    assert!(eventually(|| registry.stats().snapshot().stale_replies == 1).await);
    assert_eq!(registry.stats().snapshot().completed, 1);
}

#[tokio::test]
async fn test_malformed_request_does_not_stop_consumer() {
    let harness = Harness::new(scenario_store(), TIMEOUT);

    harness
        .bus
        .publish(BusEvent::raw(
            EventTopic::AuthRequest,
            "junk",
            b"{not json".to_vec(),
        ))
        .await;

    let outcome = harness
        .handler
        .authorize("station-1", Some(token_of_len(20)))
        .await;
    assert_eq!(outcome, Ok(AuthenticationStatus::Accepted));
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_get_their_own_outcome() {
    const CALLS: usize = 50;

    let token = |i: usize| format!("concurrent-driver-token-{i:04}");
    let expected = |i: usize| match i % 3 {
        0 => AuthenticationStatus::Accepted,
        1 => AuthenticationStatus::Rejected,
        _ => AuthenticationStatus::Unknown,
    };

    let store: StaticTokenStore = (0..CALLS)
        .filter(|i| i % 3 != 2)
        .fold(StaticTokenStore::new(), |store, i| {
            store.with_token(token(i), i % 3 == 0)
        });
    let harness = Harness::new(store, TIMEOUT);

    let calls: Vec<_> = (0..CALLS)
        .map(|i| {
            let handler = Arc::clone(&harness.handler);
            let driver = token(i);
            tokio::spawn(async move {
                let outcome = handler.authorize(&format!("station-{i}"), Some(driver)).await;
                (i, outcome)
            })
        })
        .collect();

    for call in calls {
        let (i, outcome) = call.await.unwrap();
        assert_eq!(outcome, Ok(expected(i)), "call {i}");
    }

    assert_eq!(harness.registry.pending_count(), 0);
    assert_eq!(harness.registry.stats().snapshot().completed, CALLS as u64);
}
