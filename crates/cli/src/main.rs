//! Appetit CLI - Test harness for the food-ordering REST API.
//!
//! # Usage
//!
//! ```bash
//! # Log in; the session is remembered in the state file
//! appetit auth login admin@appetit.kz --password secret
//!
//! # Browse the menu and fill the cart
//! appetit menu items
//! appetit cart add 12 --qty 2
//! appetit cart show
//!
//! # Check a promocode against a subtotal
//! appetit promo validate SAVE10 --subtotal 50.00
//!
//! # Load the analytics dashboard for March
//! appetit analytics dashboard --from 2024-03-01 --to 2024-03-31
//! ```
//!
//! # Commands
//!
//! - `auth` - Register, log in and out, verify contacts
//! - `menu` - Categories and menu items
//! - `cart` - The caller's cart
//! - `orders` - Place, inspect, and advance orders
//! - `promo` - Promocodes
//! - `integrations` - SMS, email, push, devices, and maps
//! - `analytics` - Reports, dashboard, export, filter preset
//! - `banners` - App banners
//! - `hours` - Business hours and emergency closure
//!
//! # Environment
//!
//! - `APPETIT_API_BASE` - API base URL (default `http://localhost:8000/api/v1`)
//! - `APPETIT_STATE_FILE` - Where the session and preset are kept
//! - `APPETIT_HTTP_TIMEOUT_SECS` - Optional request timeout
//! - `APPETIT_LOG_JSON` - Emit JSON logs
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Error tracking
//! - `RUST_LOG` - Log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use appetit_client::{ApiClient, ClientConfig, FileStore, SessionStore, surface};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::analytics::AnalyticsCommands;
use commands::auth::AuthCommands;
use commands::banners::BannerCommands;
use commands::cart::CartCommands;
use commands::hours::HoursCommands;
use commands::integrations::IntegrationCommands;
use commands::menu::MenuCommands;
use commands::orders::OrderCommands;
use commands::promo::PromoCommands;
use commands::{CliError, Context, TerminalNotifier};

#[derive(Parser)]
#[command(name = "appetit")]
#[command(author, version, about = "Appetit API test harness")]
struct Cli {
    /// API base URL, overriding `APPETIT_API_BASE`
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// State file, overriding `APPETIT_STATE_FILE`
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    /// Print responses as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Accounts and the remembered session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Categories and menu items
    Menu {
        #[command(subcommand)]
        command: MenuCommands,
    },
    /// The caller's cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// Orders
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// Promocodes
    Promo {
        #[command(subcommand)]
        command: PromoCommands,
    },
    /// Third-party integrations
    Integrations {
        #[command(subcommand)]
        command: IntegrationCommands,
    },
    /// Analytics reports
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommands,
    },
    /// App banners
    Banners {
        #[command(subcommand)]
        command: BannerCommands,
    },
    /// Business hours
    Hours {
        #[command(subcommand)]
        command: HoursCommands,
    },
}

/// Initialize Sentry when `SENTRY_DSN` is set.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN")
        .ok()
        .filter(|dsn| !dsn.trim().is_empty())?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load .env before reading SENTRY_DSN
    let _ = dotenvy::dotenv();
    let sentry_guard = init_sentry();

    // Logs go to stderr so stdout carries only command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "appetit_cli=warn,appetit_client=error".into());

    let is_json = std::env::var("APPETIT_LOG_JSON").is_ok();
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli).await {
        // API failures were already shown as a notice
        if !e.is_surfaced() {
            tracing::error!("Command failed: {e}");
        }
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_base) = &cli.api_base {
        config = config.with_api_base(api_base)?;
    }
    if let Some(state_file) = cli.state_file {
        config = config.with_state_file(state_file);
    }

    let client = surface(ApiClient::new(&config), &TerminalNotifier)?;
    let store = FileStore::new(config.state_file.clone());
    let session = SessionStore::new(&store).load()?;
    tracing::debug!(api_base = %client.base_url(), authenticated = session.is_some(), "Client ready");

    let mut ctx = Context {
        client,
        store,
        session,
        notifier: TerminalNotifier,
        json: cli.json,
    };

    match cli.command {
        Commands::Auth { command } => commands::auth::run(&mut ctx, command).await,
        Commands::Menu { command } => commands::menu::run(&ctx, command).await,
        Commands::Cart { command } => commands::cart::run(&ctx, command).await,
        Commands::Orders { command } => commands::orders::run(&ctx, command).await,
        Commands::Promo { command } => commands::promo::run(&ctx, command).await,
        Commands::Integrations { command } => commands::integrations::run(&ctx, command).await,
        Commands::Analytics { command } => commands::analytics::run(&ctx, command).await,
        Commands::Banners { command } => commands::banners::run(&ctx, command).await,
        Commands::Hours { command } => commands::hours::run(&ctx, command).await,
    }
}
