//! Admin analytics: reports, the five-report dashboard, and JSON export.
//!
//! The dashboard and the export both fire the same five GET calls at once
//! and keep each outcome separate. The dashboard renders whatever loaded;
//! the export is written only when all five succeed.

use appetit_core::{
    AnalyticsPeriod, DishSortField, Fulfillment, MenuItemId, Money, SortOrder,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::dispatcher::{ApiClient, Request};
use crate::error::ClientError;
use crate::notify::{Notifier, surface};
use crate::session::Session;

/// Rows requested for the dashboard's dish popularity table.
pub const DASHBOARD_DISH_LIMIT: u32 = 50;

/// Rows requested for the dish popularity export.
pub const EXPORT_DISH_LIMIT: u32 = 1000;

/// Filters shared by every analytics report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyticsFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub period: AnalyticsPeriod,
    pub fulfillment: Option<Fulfillment>,
    pub sort_by: DishSortField,
    pub order: SortOrder,
}

impl AnalyticsFilter {
    fn with_range(&self, request: Request) -> Request {
        request
            .with_optional_query("from", self.from)
            .with_optional_query("to", self.to)
    }

    fn summary_request(&self) -> Request {
        self.with_range(Request::get("/admin/analytics"))
    }

    fn dish_popularity_request(&self) -> Request {
        let request = Request::get("/admin/analytics/dish-popularity")
            .with_query("sort_by", self.sort_by)
            .with_query("order", self.order)
            .with_query("limit", DASHBOARD_DISH_LIMIT);
        self.with_range(request)
            .with_optional_query("type", self.fulfillment)
    }

    fn export_dish_request(&self) -> Request {
        let request =
            Request::get("/admin/analytics/dish-popularity").with_query("limit", EXPORT_DISH_LIMIT);
        self.with_range(request)
    }

    fn orders_by_period_request(&self, period: AnalyticsPeriod) -> Request {
        let request = Request::get("/admin/analytics/orders-by-period").with_query("period", period);
        self.with_range(request)
    }

    fn repeat_customers_request(&self) -> Request {
        self.with_range(Request::get("/admin/analytics/repeat-customers"))
    }

    fn marketing_metrics_request(&self) -> Request {
        self.with_range(Request::get("/admin/analytics/marketing-metrics"))
    }
}

/// Reports send `null` for numbers they have no data for; read those as zero.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Orders attributed to one UTM source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmSourceCount {
    #[serde(default)]
    pub source: Option<String>,
    pub count: u64,
}

/// Orders in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Headline numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_orders: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_revenue: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_order: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_users: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub utm_sources: Vec<UtmSourceCount>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_status: Vec<StatusCount>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_orders: Vec<Value>,
}

/// One row of the dish popularity report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishStat {
    #[serde(default)]
    pub id: Option<MenuItemId>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_qty: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_revenue: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_price: Money,
}

/// Orders and revenue in one period bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub period: String,
    pub orders: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue: Money,
}

/// Repeat customer report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepeatCustomers {
    #[serde(default, deserialize_with = "null_as_default")]
    pub repeat_customers: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repeat_rate: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Acquisition and retention metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingMetrics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cac: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ltv: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roas: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conversion_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_spend: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_installs: u64,
}

/// GA4 Measurement Protocol test event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ga4TestEvent {
    pub event_name: String,
    pub client_id: String,
    pub parameters: Map<String, Value>,
}

/// The five dashboard reports, each with its own outcome.
#[derive(Debug)]
pub struct Dashboard {
    pub summary: Result<AnalyticsSummary, ClientError>,
    pub dish_popularity: Result<Vec<DishStat>, ClientError>,
    pub orders_by_period: Result<Vec<PeriodBucket>, ClientError>,
    pub repeat_customers: Result<RepeatCustomers, ClientError>,
    pub marketing_metrics: Result<MarketingMetrics, ClientError>,
}

impl Dashboard {
    /// Number of reports that failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        [
            self.summary.is_err(),
            self.dish_popularity.is_err(),
            self.orders_by_period.is_err(),
            self.repeat_customers.is_err(),
            self.marketing_metrics.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// Date range recorded in an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPeriod {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Everything the analytics export writes to disk. Reports are kept exactly
/// as the backend returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsExport {
    pub export_date: DateTime<Utc>,
    pub period: ExportPeriod,
    pub summary: Value,
    pub dish_popularity: Value,
    pub orders_by_period: Value,
    pub repeat_customers: Value,
    pub marketing_metrics: Value,
}

/// The five raw export reports, each with its own outcome.
#[derive(Debug)]
pub struct ExportReports {
    pub export_date: DateTime<Utc>,
    pub period: ExportPeriod,
    pub summary: Result<Value, ClientError>,
    pub dish_popularity: Result<Value, ClientError>,
    pub orders_by_period: Result<Value, ClientError>,
    pub repeat_customers: Result<Value, ClientError>,
    pub marketing_metrics: Result<Value, ClientError>,
}

impl ExportReports {
    /// Number of reports that failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        [
            self.summary.is_err(),
            self.dish_popularity.is_err(),
            self.orders_by_period.is_err(),
            self.repeat_customers.is_err(),
            self.marketing_metrics.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }

    /// Assemble the export document, showing every failed report once.
    ///
    /// # Errors
    ///
    /// Returns the first failed report's error, after all failures have
    /// been shown through `notifier`.
    pub fn complete(self, notifier: &dyn Notifier) -> Result<AnalyticsExport, ClientError> {
        let summary = surface(self.summary, notifier);
        let dish_popularity = surface(self.dish_popularity, notifier);
        let orders_by_period = surface(self.orders_by_period, notifier);
        let repeat_customers = surface(self.repeat_customers, notifier);
        let marketing_metrics = surface(self.marketing_metrics, notifier);

        Ok(AnalyticsExport {
            export_date: self.export_date,
            period: self.period,
            summary: summary?,
            dish_popularity: dish_popularity?,
            orders_by_period: orders_by_period?,
            repeat_customers: repeat_customers?,
            marketing_metrics: marketing_metrics?,
        })
    }
}

impl AnalyticsExport {
    /// `appetit_analytics_<from|all>_to_<to|now>.json`
    #[must_use]
    pub fn file_name(&self) -> String {
        let from = self
            .period
            .from
            .map_or_else(|| "all".to_owned(), |d| d.to_string());
        let to = self
            .period
            .to
            .map_or_else(|| "now".to_owned(), |d| d.to_string());
        format!("appetit_analytics_{from}_to_{to}.json")
    }
}

impl ApiClient {
    /// Headline numbers for the filtered range.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn analytics_summary(
        &self,
        session: Option<&Session>,
        filter: &AnalyticsFilter,
    ) -> Result<AnalyticsSummary, ClientError> {
        self.call(session, filter.summary_request()).await
    }

    /// Dish popularity, sorted and filtered.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn dish_popularity(
        &self,
        session: Option<&Session>,
        filter: &AnalyticsFilter,
    ) -> Result<Vec<DishStat>, ClientError> {
        self.call(session, filter.dish_popularity_request()).await
    }

    /// Orders grouped by the filter's period.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn orders_by_period(
        &self,
        session: Option<&Session>,
        filter: &AnalyticsFilter,
    ) -> Result<Vec<PeriodBucket>, ClientError> {
        self.call(session, filter.orders_by_period_request(filter.period))
            .await
    }

    /// Repeat customer report.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn repeat_customers(
        &self,
        session: Option<&Session>,
        filter: &AnalyticsFilter,
    ) -> Result<RepeatCustomers, ClientError> {
        self.call(session, filter.repeat_customers_request()).await
    }

    /// Marketing metrics.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn marketing_metrics(
        &self,
        session: Option<&Session>,
        filter: &AnalyticsFilter,
    ) -> Result<MarketingMetrics, ClientError> {
        self.call(session, filter.marketing_metrics_request()).await
    }

    /// Send a GA4 test event (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, event), fields(event_name = %event.event_name))]
    pub async fn send_ga4_test_event(
        &self,
        session: Option<&Session>,
        event: &Ga4TestEvent,
    ) -> Result<Value, ClientError> {
        self.dispatch(
            session,
            Request::post("/admin/analytics/ga4/test").json(event)?,
        )
        .await
    }

    /// Load all five reports concurrently.
    ///
    /// Never fails as a whole; inspect each field.
    #[instrument(skip(self, session))]
    pub async fn load_dashboard(
        &self,
        session: Option<&Session>,
        filter: &AnalyticsFilter,
    ) -> Dashboard {
        let (summary, dish_popularity, orders_by_period, repeat_customers, marketing_metrics) = futures::join!(
            self.analytics_summary(session, filter),
            self.dish_popularity(session, filter),
            self.orders_by_period(session, filter),
            self.repeat_customers(session, filter),
            self.marketing_metrics(session, filter),
        );

        let dashboard = Dashboard {
            summary,
            dish_popularity,
            orders_by_period,
            repeat_customers,
            marketing_metrics,
        };
        info!(failures = dashboard.failures(), "Dashboard loaded");
        dashboard
    }

    /// Fetch the five raw reports for export concurrently.
    ///
    /// The export always uses daily buckets and ignores sorting and the
    /// fulfillment filter. Never fails as a whole; see
    /// [`ExportReports::complete`].
    #[instrument(skip(self, session))]
    pub async fn export_analytics(
        &self,
        session: Option<&Session>,
        filter: &AnalyticsFilter,
        export_date: DateTime<Utc>,
    ) -> ExportReports {
        let (summary, dish_popularity, orders_by_period, repeat_customers, marketing_metrics) = futures::join!(
            self.dispatch(session, filter.summary_request()),
            self.dispatch(session, filter.export_dish_request()),
            self.dispatch(session, filter.orders_by_period_request(AnalyticsPeriod::Day)),
            self.dispatch(session, filter.repeat_customers_request()),
            self.dispatch(session, filter.marketing_metrics_request()),
        );

        let reports = ExportReports {
            export_date,
            period: ExportPeriod {
                from: filter.from,
                to: filter.to,
            },
            summary,
            dish_popularity,
            orders_by_period,
            repeat_customers,
            marketing_metrics,
        };
        info!(failures = reports.failures(), "Export reports fetched");
        reports
    }
}

/// Parse GA4 event parameters typed by the user. Blank input is `{}`.
///
/// # Errors
///
/// Returns an error if the input is not a JSON object.
pub fn parse_ga4_parameters(raw: &str) -> Result<Map<String, Value>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str(raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    const BASE: &str = "http://localhost:8000/api/v1";

    fn empty_export(export_date: DateTime<Utc>, filter: &AnalyticsFilter) -> AnalyticsExport {
        AnalyticsExport {
            export_date,
            period: ExportPeriod {
                from: filter.from,
                to: filter.to,
            },
            summary: json!({}),
            dish_popularity: json!([]),
            orders_by_period: json!([]),
            repeat_customers: json!({}),
            marketing_metrics: json!({}),
        }
    }

    fn url(request: &Request) -> String {
        let query = request
            .query()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        if query.is_empty() {
            format!("{BASE}{}", request.path())
        } else {
            format!("{BASE}{}?{query}", request.path())
        }
    }

    fn ranged() -> AnalyticsFilter {
        AnalyticsFilter {
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 31),
            fulfillment: Some(Fulfillment::Delivery),
            ..AnalyticsFilter::default()
        }
    }

    #[test]
    fn test_unfiltered_requests_have_no_range() {
        let filter = AnalyticsFilter::default();
        assert_eq!(url(&filter.summary_request()), format!("{BASE}/admin/analytics"));
        assert_eq!(
            url(&filter.dish_popularity_request()),
            format!("{BASE}/admin/analytics/dish-popularity?sort_by=qty&order=desc&limit=50")
        );
        assert_eq!(
            url(&filter.orders_by_period_request(filter.period)),
            format!("{BASE}/admin/analytics/orders-by-period?period=day")
        );
    }

    #[test]
    fn test_ranged_requests() {
        let filter = ranged();
        assert_eq!(
            url(&filter.repeat_customers_request()),
            format!("{BASE}/admin/analytics/repeat-customers?from=2024-01-01&to=2024-01-31")
        );
        assert_eq!(
            url(&filter.dish_popularity_request()),
            format!(
                "{BASE}/admin/analytics/dish-popularity?sort_by=qty&order=desc&limit=50&from=2024-01-01&to=2024-01-31&type=delivery"
            )
        );
        assert_eq!(
            url(&filter.export_dish_request()),
            format!("{BASE}/admin/analytics/dish-popularity?limit=1000&from=2024-01-01&to=2024-01-31")
        );
    }

    #[test]
    fn test_export_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        assert_eq!(
            empty_export(at, &AnalyticsFilter::default()).file_name(),
            "appetit_analytics_all_to_now.json"
        );
        assert_eq!(
            empty_export(at, &ranged()).file_name(),
            "appetit_analytics_2024-01-01_to_2024-01-31.json"
        );
    }

    #[test]
    fn test_export_document_keys() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let doc = serde_json::to_value(empty_export(at, &AnalyticsFilter::default())).unwrap();

        for key in [
            "exportDate",
            "period",
            "summary",
            "dishPopularity",
            "ordersByPeriod",
            "repeatCustomers",
            "marketingMetrics",
        ] {
            assert!(doc.get(key).is_some(), "missing {key}");
        }
        assert_eq!(doc["period"], json!({"from": null, "to": null}));
    }

    #[test]
    fn test_ga4_parameters() {
        assert!(parse_ga4_parameters("  ").unwrap().is_empty());
        assert_eq!(
            parse_ga4_parameters(r#"{"currency": "KZT", "value": 25.5}"#).unwrap()["currency"],
            "KZT"
        );
        assert!(parse_ga4_parameters("[1]").is_err());
    }

    #[test]
    fn test_null_numbers_read_as_zero() {
        let metrics: MarketingMetrics = serde_json::from_value(json!({
            "cac": null,
            "ltv": 9800.0,
            "roas": null,
            "conversion_rate": null,
            "total_spend": null,
            "total_installs": null
        }))
        .unwrap();
        assert_eq!(metrics.cac, Money::ZERO);
        assert_eq!(metrics.ltv.to_string(), "9800.00");
        assert!(metrics.roas.abs() < f64::EPSILON);
        assert_eq!(metrics.total_installs, 0);

        let summary: AnalyticsSummary = serde_json::from_value(
            json!({"total_orders": null, "average_order": null, "utm_sources": null}),
        )
        .unwrap();
        assert_eq!(summary, AnalyticsSummary::default());

        let dish: DishStat =
            serde_json::from_value(json!({"name": "Plov", "total_qty": 4, "avg_price": null})).unwrap();
        assert_eq!(dish.avg_price, Money::ZERO);
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        let summary: AnalyticsSummary =
            serde_json::from_value(json!({"total_orders": 3, "total_revenue": 82.5})).unwrap();
        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_revenue.to_string(), "82.50");
        assert!(summary.utm_sources.is_empty());
    }
}
