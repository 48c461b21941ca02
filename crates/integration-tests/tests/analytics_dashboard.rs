//! Integration tests for the analytics dashboard and export.
//!
//! The dashboard issues its five report calls together and keeps each
//! outcome separate. The export needs all five, and shows every failure.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use appetit_client::{AnalyticsFilter, MemoryNotifier, NoticeLevel, Session, surface};
use appetit_core::{AnalyticsPeriod, Fulfillment, Money};
use appetit_integration_tests::{FixtureApi, FixtureBuilder};
use axum::http::Method;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};

const SUMMARY: &str = "/admin/analytics";
const DISHES: &str = "/admin/analytics/dish-popularity";
const PERIODS: &str = "/admin/analytics/orders-by-period";
const REPEAT: &str = "/admin/analytics/repeat-customers";
const MARKETING: &str = "/admin/analytics/marketing-metrics";

fn summary() -> Value {
    json!({
        "total_orders": 42,
        "total_revenue": 125_000.0,
        "average_order": 2976.19,
        "active_users": 17,
        "utm_sources": [{"source": "instagram", "count": 12}],
        "order_status": [{"status": "DELIVERED", "count": 40}]
    })
}

fn dishes() -> Value {
    json!([{"id": 9, "name": "Plov", "total_qty": 30, "total_revenue": 75000.0, "avg_price": 2500.0}])
}

fn periods() -> Value {
    json!([{"period": "2024-03-01", "orders": 5, "revenue": 14500.0}])
}

fn repeat() -> Value {
    json!({"repeat_customers": 6, "repeat_rate": 35.3})
}

fn marketing() -> Value {
    json!({"cac": 1200.0, "ltv": 9800.0, "roas": 3.1, "conversion_rate": 4.2, "total_spend": 50000.0, "total_installs": 310})
}

fn all_reports() -> FixtureBuilder {
    FixtureApi::builder()
        .json(Method::GET, SUMMARY, 200, &summary())
        .json(Method::GET, DISHES, 200, &dishes())
        .json(Method::GET, PERIODS, 200, &periods())
        .json(Method::GET, REPEAT, 200, &repeat())
        .json(Method::GET, MARKETING, 200, &marketing())
}

fn march() -> AnalyticsFilter {
    AnalyticsFilter {
        from: NaiveDate::from_ymd_opt(2024, 3, 1),
        to: NaiveDate::from_ymd_opt(2024, 3, 31),
        period: AnalyticsPeriod::Week,
        fulfillment: Some(Fulfillment::Delivery),
        ..AnalyticsFilter::default()
    }
}

fn admin() -> Session {
    Session::new("tok-admin", Some("admin".to_owned()))
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_loads_all_five_reports() {
    let api = all_reports().start().await.unwrap();
    let client = api.client().unwrap();

    let dashboard = client.load_dashboard(Some(&admin()), &march()).await;

    assert_eq!(dashboard.failures(), 0);
    let summary = dashboard.summary.unwrap();
    assert_eq!(summary.total_orders, 42);
    assert_eq!(summary.total_revenue, Money::parse("125000").unwrap());
    assert_eq!(dashboard.dish_popularity.unwrap()[0].name, "Plov");
    assert_eq!(dashboard.orders_by_period.unwrap()[0].orders, 5);
    assert_eq!(dashboard.repeat_customers.unwrap().repeat_customers, 6);
    assert_eq!(dashboard.marketing_metrics.unwrap().total_installs, 310);

    assert_eq!(api.requests().len(), 5);
    assert!(
        api.requests()
            .iter()
            .all(|r| r.authorization.as_deref() == Some("Bearer tok-admin"))
    );
}

#[tokio::test]
async fn test_dashboard_failure_is_isolated() {
    let api = all_reports()
        .json(Method::GET, REPEAT, 500, &json!({"detail": "Repeat report unavailable"}))
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let notifier = MemoryNotifier::new();

    let dashboard = client.load_dashboard(Some(&admin()), &march()).await;
    assert_eq!(dashboard.failures(), 1);

    let summary = surface(dashboard.summary, &notifier);
    let dishes = surface(dashboard.dish_popularity, &notifier);
    let periods = surface(dashboard.orders_by_period, &notifier);
    let repeat = surface(dashboard.repeat_customers, &notifier);
    let marketing = surface(dashboard.marketing_metrics, &notifier);

    assert!(summary.is_ok());
    assert!(dishes.is_ok());
    assert!(periods.is_ok());
    assert!(marketing.is_ok());
    assert_eq!(repeat.unwrap_err().status(), Some(500));

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Repeat report unavailable");
}

#[tokio::test]
async fn test_dashboard_passes_filters_as_query() {
    let api = all_reports().start().await.unwrap();
    let client = api.client().unwrap();

    let _ = client.load_dashboard(Some(&admin()), &march()).await;

    let query = |path| api.requests_to(path)[0].query.clone().unwrap_or_default();
    assert_eq!(query(SUMMARY), "from=2024-03-01&to=2024-03-31");
    assert_eq!(
        query(DISHES),
        "sort_by=qty&order=desc&limit=50&from=2024-03-01&to=2024-03-31&type=delivery"
    );
    assert_eq!(query(PERIODS), "period=week&from=2024-03-01&to=2024-03-31");
    assert_eq!(query(REPEAT), "from=2024-03-01&to=2024-03-31");
    assert_eq!(query(MARKETING), "from=2024-03-01&to=2024-03-31");
}

#[tokio::test]
async fn test_dashboard_without_range_sends_no_dates() {
    let api = all_reports().start().await.unwrap();
    let client = api.client().unwrap();

    let _ = client
        .load_dashboard(Some(&admin()), &AnalyticsFilter::default())
        .await;

    assert_eq!(api.requests_to(SUMMARY)[0].query, None);
    assert_eq!(
        api.requests_to(PERIODS)[0].query.as_deref(),
        Some("period=day")
    );
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_keeps_raw_reports() {
    let api = all_reports().start().await.unwrap();
    let client = api.client().unwrap();
    let exported_at = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();

    let notifier = MemoryNotifier::new();

    let export = client
        .export_analytics(Some(&admin()), &march(), exported_at)
        .await
        .complete(&notifier)
        .unwrap();

    assert!(notifier.notices().is_empty());

    assert_eq!(export.summary, summary());
    assert_eq!(export.dish_popularity, dishes());
    assert_eq!(export.orders_by_period, periods());
    assert_eq!(export.repeat_customers, repeat());
    assert_eq!(export.marketing_metrics, marketing());
    assert_eq!(export.file_name(), "appetit_analytics_2024-03-01_to_2024-03-31.json");

    // Daily buckets and the wide dish list, whatever the filter says.
    assert_eq!(
        api.requests_to(PERIODS)[0].query.as_deref(),
        Some("period=day&from=2024-03-01&to=2024-03-31")
    );
    assert_eq!(
        api.requests_to(DISHES)[0].query.as_deref(),
        Some("limit=1000&from=2024-03-01&to=2024-03-31")
    );
}

#[tokio::test]
async fn test_export_fails_when_any_report_fails() {
    let api = all_reports()
        .text(Method::GET, MARKETING, 504, "Gateway Timeout")
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();

    let notifier = MemoryNotifier::new();

    let err = client
        .export_analytics(Some(&admin()), &march(), Utc::now())
        .await
        .complete(&notifier)
        .unwrap_err();

    assert_eq!(err.status(), Some(504));
    assert_eq!(err.to_string(), "HTTP 504");
    assert_eq!(api.requests().len(), 5);
    assert_eq!(notifier.notices().len(), 1);
}

#[tokio::test]
async fn test_export_notices_every_failed_report() {
    let api = all_reports()
        .json(Method::GET, DISHES, 500, &json!({"detail": "Dish report unavailable"}))
        .json(Method::GET, MARKETING, 500, &json!({"detail": "Marketing report unavailable"}))
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let notifier = MemoryNotifier::new();

    let reports = client
        .export_analytics(Some(&admin()), &march(), Utc::now())
        .await;
    assert_eq!(reports.failures(), 2);

    let err = reports.complete(&notifier).unwrap_err();

    assert_eq!(err.to_string(), "Dish report unavailable");
    let messages: Vec<String> = notifier.notices().into_iter().map(|n| n.message).collect();
    assert_eq!(
        messages,
        ["Dish report unavailable", "Marketing report unavailable"]
    );
    assert!(
        notifier
            .notices()
            .iter()
            .all(|n| n.level == NoticeLevel::Danger)
    );
}

#[tokio::test]
async fn test_dashboard_reads_null_metrics_as_zero() {
    let api = all_reports()
        .json(
            Method::GET,
            MARKETING,
            200,
            &json!({"cac": null, "ltv": null, "roas": null, "total_installs": 12}),
        )
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();

    let dashboard = client
        .load_dashboard(Some(&admin()), &AnalyticsFilter::default())
        .await;

    assert_eq!(dashboard.failures(), 0);
    let marketing = dashboard.marketing_metrics.unwrap();
    assert_eq!(marketing.cac, Money::ZERO);
    assert_eq!(marketing.total_installs, 12);
}
