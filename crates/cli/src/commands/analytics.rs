//! Analytics reports, the dashboard, export, and the saved filter preset.

use std::io::Write;
use std::path::PathBuf;

use appetit_client::{
    AnalyticsFilter, AnalyticsFilterPreset, AnalyticsSummary, DishStat,
    Ga4TestEvent, MarketingMetrics, Notice, PeriodBucket, RepeatCustomers, load_preset,
    parse_ga4_parameters, save_preset, surface,
};
use appetit_core::{AnalyticsPeriod, DishSortField, Fulfillment, SortOrder};
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use super::{CliError, CommandResult, Context, or_dash};

const DASHBOARD_REPORTS: usize = 5;

#[derive(Subcommand)]
pub enum AnalyticsCommands {
    /// Headline numbers
    Summary(FilterArgs),

    /// Dish popularity ranking
    Dishes(FilterArgs),

    /// Orders and revenue per period
    Periods(FilterArgs),

    /// Repeat customer report
    Repeat(FilterArgs),

    /// Marketing metrics
    Marketing(FilterArgs),

    /// Load all five reports at once
    Dashboard(FilterArgs),

    /// Write all five raw reports to a JSON file
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Directory to write the export into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Send a GA4 test event (admin)
    Ga4 {
        #[arg(long, default_value = "test_event")]
        event: String,

        #[arg(long, default_value = "appetit-cli")]
        client_id: String,

        /// Event parameters as a JSON object
        #[arg(long, default_value = "")]
        params: String,
    },

    /// Remember the given filters
    SavePreset(FilterArgs),

    /// Show the remembered filters
    ShowPreset,
}

#[derive(Args, Default)]
pub struct FilterArgs {
    /// Start from the saved preset; other flags override it
    #[arg(long)]
    preset: bool,

    /// First day (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// day, week or month
    #[arg(long)]
    period: Option<AnalyticsPeriod>,

    /// delivery or pickup
    #[arg(long)]
    fulfillment: Option<Fulfillment>,

    /// qty, revenue, orders, avg_price or name
    #[arg(long)]
    sort_by: Option<DishSortField>,

    /// asc or desc
    #[arg(long)]
    order: Option<SortOrder>,
}

impl FilterArgs {
    fn resolve(&self, ctx: &Context) -> Result<AnalyticsFilter, CliError> {
        let mut filter = if self.preset {
            match load_preset(&ctx.store)? {
                Some(preset) => preset.to_filter(),
                None => {
                    ctx.notify(Notice::warning("No saved preset, using defaults"));
                    AnalyticsFilter::default()
                }
            }
        } else {
            AnalyticsFilter::default()
        };

        if self.from.is_some() {
            filter.from = self.from;
        }
        if self.to.is_some() {
            filter.to = self.to;
        }
        if let Some(period) = self.period {
            filter.period = period;
        }
        if self.fulfillment.is_some() {
            filter.fulfillment = self.fulfillment;
        }
        if let Some(sort_by) = self.sort_by {
            filter.sort_by = sort_by;
        }
        if let Some(order) = self.order {
            filter.order = order;
        }
        Ok(filter)
    }
}

/// Run an analytics command.
///
/// # Errors
///
/// Returns an error if a request fails or the preset cannot be read or
/// written.
pub async fn run(ctx: &Context, command: AnalyticsCommands) -> CommandResult {
    match command {
        AnalyticsCommands::Summary(args) => {
            let filter = args.resolve(ctx)?;
            let summary = ctx.surface(ctx.client.analytics_summary(ctx.session(), &filter).await)?;
            ctx.render(&summary, write_summary)
        }
        AnalyticsCommands::Dishes(args) => {
            let filter = args.resolve(ctx)?;
            let dishes = ctx.surface(ctx.client.dish_popularity(ctx.session(), &filter).await)?;
            ctx.render(&dishes, |out, dishes| write_dishes(out, dishes))
        }
        AnalyticsCommands::Periods(args) => {
            let filter = args.resolve(ctx)?;
            let buckets = ctx.surface(ctx.client.orders_by_period(ctx.session(), &filter).await)?;
            ctx.render(&buckets, |out, buckets| write_periods(out, buckets))
        }
        AnalyticsCommands::Repeat(args) => {
            let filter = args.resolve(ctx)?;
            let repeat = ctx.surface(ctx.client.repeat_customers(ctx.session(), &filter).await)?;
            ctx.render(&repeat, write_repeat)
        }
        AnalyticsCommands::Marketing(args) => {
            let filter = args.resolve(ctx)?;
            let metrics = ctx.surface(ctx.client.marketing_metrics(ctx.session(), &filter).await)?;
            ctx.render(&metrics, write_marketing)
        }
        AnalyticsCommands::Dashboard(args) => dashboard(ctx, &args.resolve(ctx)?).await,
        AnalyticsCommands::Export { filter, out_dir } => {
            let filter = filter.resolve(ctx)?;
            let export = ctx
                .client
                .export_analytics(ctx.session(), &filter, Utc::now())
                .await
                .complete(&ctx.notifier)?;
            let path = out_dir.join(export.file_name());
            std::fs::write(&path, serde_json::to_vec_pretty(&export)?)?;
            info!(path = %path.display(), "Analytics exported");
            ctx.done(&format!("Exported to {}", path.display()), &json!({"path": path}))
        }
        AnalyticsCommands::Ga4 {
            event,
            client_id,
            params,
        } => {
            let parameters = parse_ga4_parameters(&params)
                .map_err(|e| CliError::Input(format!("Parameters must be a JSON object: {e}")))?;
            let event = Ga4TestEvent {
                event_name: event,
                client_id,
                parameters,
            };
            let response = ctx.surface(ctx.client.send_ga4_test_event(ctx.session(), &event).await)?;
            ctx.done(&format!("GA4 event '{}' sent", event.event_name), &response)
        }
        AnalyticsCommands::SavePreset(args) => {
            let filter = args.resolve(ctx)?;
            let preset = AnalyticsFilterPreset::capture(&filter, Utc::now());
            save_preset(&ctx.store, &preset)?;
            ctx.done("Filter preset saved", &preset)
        }
        AnalyticsCommands::ShowPreset => match load_preset(&ctx.store)? {
            Some(preset) => ctx.render(&preset, |out, preset| {
                let filter = preset.to_filter();
                writeln!(out, "saved at:    {}", preset.saved_at.to_rfc3339())?;
                writeln!(out, "from:        {}", date_or_dash(filter.from))?;
                writeln!(out, "to:          {}", date_or_dash(filter.to))?;
                writeln!(out, "period:      {}", filter.period)?;
                writeln!(
                    out,
                    "fulfillment: {}",
                    or_dash(filter.fulfillment.as_ref().map(Fulfillment::as_str))
                )?;
                writeln!(out, "dishes by:   {} {}", filter.sort_by, filter.order)
            }),
            None => {
                ctx.notify(Notice::info("No saved preset"));
                Ok(())
            }
        },
    }
}

async fn dashboard(ctx: &Context, filter: &AnalyticsFilter) -> CommandResult {
    let dashboard = ctx.client.load_dashboard(ctx.session(), filter).await;
    let failures = dashboard.failures();

    let summary = surface(dashboard.summary, &ctx.notifier).ok();
    let dishes = surface(dashboard.dish_popularity, &ctx.notifier).ok();
    let periods = surface(dashboard.orders_by_period, &ctx.notifier).ok();
    let repeat = surface(dashboard.repeat_customers, &ctx.notifier).ok();
    let marketing = surface(dashboard.marketing_metrics, &ctx.notifier).ok();

    if ctx.json {
        let value = json!({
            "summary": section(summary.as_ref())?,
            "dish_popularity": section(dishes.as_ref())?,
            "orders_by_period": section(periods.as_ref())?,
            "repeat_customers": section(repeat.as_ref())?,
            "marketing_metrics": section(marketing.as_ref())?,
        });
        ctx.render(&value, |_, _| Ok(()))?;
        return partial(failures);
    }

    let mut out = std::io::stdout().lock();
    if let Some(summary) = &summary {
        writeln!(out, "== Summary")?;
        write_summary(&mut out, summary)?;
    }
    if let Some(dishes) = &dishes {
        writeln!(out, "== Dish popularity")?;
        write_dishes(&mut out, dishes)?;
    }
    if let Some(periods) = &periods {
        writeln!(out, "== Orders by {}", filter.period)?;
        write_periods(&mut out, periods)?;
    }
    if let Some(repeat) = &repeat {
        writeln!(out, "== Repeat customers")?;
        write_repeat(&mut out, repeat)?;
    }
    if let Some(marketing) = &marketing {
        writeln!(out, "== Marketing")?;
        write_marketing(&mut out, marketing)?;
    }
    if failures > 0 {
        writeln!(out, "{failures} of {DASHBOARD_REPORTS} reports failed to load")?;
    }
    partial(failures)
}

/// Fail the command when any dashboard report failed to load.
fn partial(failed: usize) -> CommandResult {
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::Partial {
            failed,
            total: DASHBOARD_REPORTS,
        })
    }
}

/// A loaded report, or `null` when it failed.
fn section<T: Serialize>(report: Option<&T>) -> Result<Value, serde_json::Error> {
    report.map_or(Ok(Value::Null), serde_json::to_value)
}

fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_owned(), |d| d.to_string())
}

fn write_summary(out: &mut dyn Write, summary: &AnalyticsSummary) -> std::io::Result<()> {
    writeln!(out, "orders:        {}", summary.total_orders)?;
    writeln!(out, "revenue:       {}", summary.total_revenue)?;
    writeln!(out, "average order: {}", summary.average_order)?;
    writeln!(out, "active users:  {}", summary.active_users)?;
    for status in &summary.order_status {
        writeln!(out, "  {:<10} {}", status.status, status.count)?;
    }
    for source in &summary.utm_sources {
        writeln!(out, "  utm {:<16} {}", or_dash(source.source.as_deref()), source.count)?;
    }
    Ok(())
}

fn write_dishes(out: &mut dyn Write, dishes: &[DishStat]) -> std::io::Result<()> {
    if dishes.is_empty() {
        return writeln!(out, "No dish sales in range.");
    }
    for dish in dishes {
        writeln!(
            out,
            "{:<32} {:>6} {:>12} {:>10}",
            dish.name,
            dish.total_qty,
            dish.total_revenue.to_string(),
            dish.avg_price.to_string()
        )?;
    }
    Ok(())
}

fn write_periods(out: &mut dyn Write, buckets: &[PeriodBucket]) -> std::io::Result<()> {
    if buckets.is_empty() {
        return writeln!(out, "No orders in range.");
    }
    for bucket in buckets {
        writeln!(
            out,
            "{:<12} {:>6} {:>12}",
            bucket.period,
            bucket.orders,
            bucket.revenue.to_string()
        )?;
    }
    Ok(())
}

fn write_repeat(out: &mut dyn Write, repeat: &RepeatCustomers) -> std::io::Result<()> {
    writeln!(out, "repeat customers: {}", repeat.repeat_customers)?;
    writeln!(out, "repeat rate:      {:.1}%", repeat.repeat_rate)
}

fn write_marketing(out: &mut dyn Write, metrics: &MarketingMetrics) -> std::io::Result<()> {
    writeln!(out, "CAC:             {}", metrics.cac)?;
    writeln!(out, "LTV:             {}", metrics.ltv)?;
    writeln!(out, "ROAS:            {:.2}", metrics.roas)?;
    writeln!(out, "conversion rate: {:.2}%", metrics.conversion_rate)?;
    writeln!(out, "total spend:     {}", metrics.total_spend)?;
    writeln!(out, "installs:        {}", metrics.total_installs)
}
