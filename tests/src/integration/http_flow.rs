//! # HTTP Flow
//!
//! `POST /api/v1/transaction/authorize` through the router, over the real
//! bus, answered by a running authentication consumer.

use super::fixtures::token_of_len;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use csms_authentication::{AuthenticationConsumer, AuthenticationService, StaticTokenStore};
use csms_transactions::{
    EventBusReceiver, EventBusSender, ResponseListener, TransactionConfig, TransactionService,
    AUTHORIZE_PATH,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use tower::ServiceExt;

fn wired_service(with_consumer: bool) -> TransactionService {
    let bus = Arc::new(InMemoryEventBus::new());
    let sender = Arc::new(EventBusSender::new(Arc::clone(&bus)));
    let service = TransactionService::new(TransactionConfig::default(), sender).unwrap();

    let receiver = Arc::new(EventBusReceiver::new(bus.as_ref()));
    tokio::spawn(ResponseListener::new(service.registry(), receiver).run());

    if with_consumer {
        let store = StaticTokenStore::seeded().with_token(token_of_len(50), false);
        let authentication = Arc::new(AuthenticationService::with_default_validation(store));
        tokio::spawn(AuthenticationConsumer::new(authentication, bus).run());
    }

    service
}

async fn post_authorize(service: &TransactionService, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(AUTHORIZE_PATH)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = service.router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_http_outcomes() {
    let service = wired_service(true);

    let cases = [
        (json!("driverABC-1234567890"), "ACCEPTED"),
        (json!(token_of_len(50)), "REJECTED"),
        (json!(token_of_len(80)), "UNKNOWN"),
        (json!("short"), "INVALID"),
        (Value::Null, "INVALID"),
    ];

    for (id, expected) in cases {
        let (status, body) = post_authorize(
            &service,
            json!({"stationUuid": "st-1", "driverIdentifier": {"id": id}}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"authenticationStatus": expected}), "id {id}");
    }

    assert_eq!(service.registry().pending_count(), 0);
}

#[tokio::test]
async fn test_http_missing_driver_is_invalid() {
    let service = wired_service(true);

    let (status, body) = post_authorize(&service, json!({"stationUuid": "st-1"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"authenticationStatus": "INVALID"}));
}

#[tokio::test]
async fn test_http_without_consumer_is_internal_error() {
    let service = wired_service(false);

    let (status, body) = post_authorize(
        &service,
        json!({"stationUuid": "st-1", "driverIdentifier": {"id": "driverABC-1234567890"}}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("auth-request"));
    assert_eq!(service.registry().pending_count(), 0);
}
