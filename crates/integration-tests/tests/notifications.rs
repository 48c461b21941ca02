//! Integration tests for failure notices.
//!
//! A failed call must produce exactly one danger notice carrying the server's
//! message, and a successful call none.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use appetit_client::{MemoryNotifier, NoticeLevel, Request, surface};
use appetit_integration_tests::FixtureApi;
use axum::http::Method;
use serde_json::json;

#[tokio::test]
async fn test_failure_yields_one_notice_with_detail() {
    let api = FixtureApi::builder()
        .json(
            Method::POST,
            "/promo/validate",
            400,
            &json!({"detail": "Promocode expired"}),
        )
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let notifier = MemoryNotifier::new();

    let result = surface(
        client
            .dispatch(None, Request::post("/promo/validate").with_body(json!({"code": "OLD"})))
            .await,
        &notifier,
    );

    assert!(result.is_err());
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Danger);
    assert_eq!(notices[0].message, "Promocode expired");
}

#[tokio::test]
async fn test_failure_without_detail_notices_status() {
    let api = FixtureApi::builder()
        .text(Method::GET, "/admin/banners", 503, "Service Unavailable")
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let notifier = MemoryNotifier::new();

    let result = surface(client.list_banners(None).await, &notifier);

    assert_eq!(result.unwrap_err().status(), Some(503));
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "HTTP 503");
}

#[tokio::test]
async fn test_success_yields_no_notice() {
    let api = FixtureApi::builder()
        .json(Method::GET, "/menu/categories", 200, &json!([{"id": 1, "name": "Soups", "sort": 0}]))
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let notifier = MemoryNotifier::new();

    let categories = surface(client.list_categories(None).await, &notifier).unwrap();

    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Soups");
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn test_each_failed_call_notices_once() {
    let api = FixtureApi::builder()
        .json(Method::GET, "/orders", 401, &json!({"detail": "Not authenticated"}))
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let notifier = MemoryNotifier::new();

    for _ in 0..3 {
        let _ = surface(client.list_orders(None).await, &notifier);
    }

    let notices = notifier.notices();
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|n| n.message == "Not authenticated"));
    assert_eq!(api.requests_to("/orders").len(), 3);
}
