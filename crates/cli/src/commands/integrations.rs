//! Third-party integration checks: SMS, email, push, devices, and maps.

use std::io::Write;

use appetit_client::{GeocodeResult, KNOWN_SERVICES, Notice, PushMessage};
use appetit_core::{DevicePlatform, PushTarget};
use clap::Subcommand;
use tracing::warn;

use super::{CommandResult, Context, or_dash};

#[derive(Subcommand)]
pub enum IntegrationCommands {
    /// Show which integrations are configured (admin)
    Status,

    /// Send a test SMS (admin)
    Sms {
        phone: String,

        #[arg(long, default_value = "Appetit test message")]
        message: String,
    },

    /// Send a test email (admin)
    Email {
        email: String,

        #[arg(long, default_value = "Appetit test")]
        subject: String,

        #[arg(long, default_value = "Appetit test message")]
        message: String,
    },

    /// Broadcast a push notification (admin)
    Push {
        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,

        /// all or test
        #[arg(long, default_value_t = PushTarget::All)]
        target: PushTarget,
    },

    /// Register a device for push notifications
    RegisterDevice {
        /// FCM registration token
        token: String,

        /// android, ios or web
        #[arg(long, default_value_t = DevicePlatform::Web)]
        platform: DevicePlatform,
    },

    /// Look up coordinates for an address
    Geocode { address: String },

    /// Look up the address at a point
    ReverseGeocode {
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
}

/// Run an integration command.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn run(ctx: &Context, command: IntegrationCommands) -> CommandResult {
    match command {
        IntegrationCommands::Status => {
            let report = ctx.surface(ctx.client.integration_status(ctx.session()).await)?;
            ctx.render(&report, |out, report| {
                if let Some(summary) = &report.summary {
                    writeln!(
                        out,
                        "{}/{} configured{}",
                        summary.configured,
                        summary.total,
                        if summary.all_ready { ", all ready" } else { "" }
                    )?;
                }
                let mut names: Vec<&str> = KNOWN_SERVICES.to_vec();
                for name in report.services.keys() {
                    if !names.contains(&name.as_str()) {
                        names.push(name);
                    }
                }
                for name in names {
                    let state = if report.is_connected(name) {
                        "connected"
                    } else {
                        "not connected"
                    };
                    writeln!(out, "{name:<8} {state}")?;
                }
                Ok(())
            })
        }
        IntegrationCommands::Sms { phone, message } => {
            let response = ctx.surface(ctx.client.test_sms(ctx.session(), &phone, &message).await)?;
            ctx.done(&format!("Test SMS sent to {phone}"), &response)
        }
        IntegrationCommands::Email {
            email,
            subject,
            message,
        } => {
            let response = ctx.surface(
                ctx.client
                    .test_email(ctx.session(), &email, &subject, &message)
                    .await,
            )?;
            ctx.done(&format!("Test email sent to {email}"), &response)
        }
        IntegrationCommands::Push {
            title,
            body,
            target,
        } => {
            let push = PushMessage {
                title,
                body,
                target,
            };
            let response = ctx.surface(ctx.client.send_push(ctx.session(), &push).await)?;
            ctx.done(&format!("Push sent to {target}"), &response)
        }
        IntegrationCommands::RegisterDevice { token, platform } => {
            let token = token.trim();
            if token.is_empty() {
                warn!("Skipping device registration without an FCM token");
                ctx.notify(Notice::warning("Enter an FCM token to register a device"));
                return Ok(());
            }
            let response = ctx.surface(
                ctx.client
                    .register_device(ctx.session(), token, platform)
                    .await,
            )?;
            ctx.done(&format!("Device registered ({platform})"), &response)
        }
        IntegrationCommands::Geocode { address } => {
            let result = ctx.surface(ctx.client.geocode(ctx.session(), &address).await)?;
            ctx.render(&result, write_geocode)
        }
        IntegrationCommands::ReverseGeocode { lat, lng } => {
            let result = ctx.surface(ctx.client.reverse_geocode(ctx.session(), lat, lng).await)?;
            ctx.render(&result, write_geocode)
        }
    }
}

fn write_geocode(out: &mut dyn Write, result: &GeocodeResult) -> std::io::Result<()> {
    writeln!(out, "address: {}", or_dash(result.formatted_address.as_deref()))?;
    match (result.lat, result.lng) {
        (Some(lat), Some(lng)) => writeln!(out, "point:   {lat}, {lng}")?,
        _ => writeln!(out, "point:   -")?,
    }
    writeln!(out, "place:   {}", or_dash(result.place_id.as_deref()))
}
