//! Promocode commands.

use std::io::Write;

use appetit_client::{NewPromocode, PromoBatchRequest, PromoLimits};
use appetit_core::{Money, PromoKind};
use chrono::NaiveDateTime;
use clap::{Args, Subcommand};

use super::{CommandResult, Context};

#[derive(Subcommand)]
pub enum PromoCommands {
    /// List promocodes (admin)
    List,

    /// Create one promocode (admin)
    Create {
        code: String,

        #[command(flatten)]
        discount: Discount,

        #[command(flatten)]
        limits: Limits,
    },

    /// Check a code against a subtotal and show the new total
    Validate {
        code: String,

        #[arg(long)]
        subtotal: Money,
    },

    /// Enable a promocode (admin)
    Enable { code: String },

    /// Disable a promocode (admin)
    Disable { code: String },

    /// Generate a batch of random codes sharing a prefix (admin)
    Generate {
        prefix: String,

        /// Random characters after the prefix
        #[arg(long, default_value_t = 6)]
        length: u32,

        #[arg(long, default_value_t = 10)]
        count: u32,

        #[command(flatten)]
        discount: Discount,

        #[command(flatten)]
        limits: Limits,
    },
}

#[derive(Args)]
pub struct Discount {
    /// percent or amount
    #[arg(long, default_value_t = PromoKind::Percent)]
    kind: PromoKind,

    #[arg(long, default_value_t = 10.0)]
    value: f64,

    /// Create the codes switched off
    #[arg(long)]
    inactive: bool,
}

#[derive(Args)]
pub struct Limits {
    /// Start of validity (YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    valid_from: Option<NaiveDateTime>,

    /// End of validity (YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    valid_to: Option<NaiveDateTime>,

    #[arg(long)]
    max_redemptions: Option<u32>,

    #[arg(long)]
    per_user_limit: Option<u32>,

    #[arg(long)]
    min_subtotal: Option<Money>,
}

impl From<Limits> for PromoLimits {
    fn from(limits: Limits) -> Self {
        Self {
            valid_from: limits.valid_from,
            valid_to: limits.valid_to,
            max_redemptions: limits.max_redemptions,
            per_user_limit: limits.per_user_limit,
            min_subtotal: limits.min_subtotal,
        }
    }
}

/// Run a promocode command.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn run(ctx: &Context, command: PromoCommands) -> CommandResult {
    match command {
        PromoCommands::List => {
            let codes = ctx.surface(ctx.client.list_promocodes(ctx.session()).await)?;
            ctx.render(&codes, |out, codes| {
                if codes.is_empty() {
                    return writeln!(out, "No promocodes.");
                }
                for promo in codes {
                    let used = promo
                        .max_redemptions
                        .map_or_else(|| "unlimited".to_owned(), |max| format!("max {max}"));
                    writeln!(
                        out,
                        "{:<16} {:<8} {:>8} {:<8} {}",
                        promo.code,
                        promo.kind.as_str(),
                        promo.value,
                        if promo.active { "active" } else { "inactive" },
                        used
                    )?;
                }
                Ok(())
            })
        }
        PromoCommands::Create {
            code,
            discount,
            limits,
        } => {
            let promo = NewPromocode {
                code,
                kind: discount.kind,
                value: discount.value,
                active: !discount.inactive,
                limits: limits.into(),
            };
            let response = ctx.surface(ctx.client.create_promocode(ctx.session(), &promo).await)?;
            ctx.done(&format!("Promocode {} created", promo.code), &response)
        }
        PromoCommands::Validate { code, subtotal } => {
            let validation = ctx.surface(
                ctx.client
                    .validate_promocode(ctx.session(), &code, subtotal)
                    .await,
            )?;
            let new_total = validation.new_total(subtotal);
            ctx.render(&validation, |out, validation| {
                if let Some(reason) = &validation.reason {
                    writeln!(out, "note:      {reason}")?;
                }
                writeln!(out, "subtotal:  {subtotal}")?;
                writeln!(out, "discount:  {}", validation.discount)?;
                writeln!(out, "new total: {new_total}")
            })
        }
        PromoCommands::Enable { code } => toggle(ctx, &code, true).await,
        PromoCommands::Disable { code } => toggle(ctx, &code, false).await,
        PromoCommands::Generate {
            prefix,
            length,
            count,
            discount,
            limits,
        } => {
            let batch = PromoBatchRequest {
                length,
                count,
                kind: discount.kind,
                value: discount.value,
                active: !discount.inactive,
                limits: limits.into(),
                ..PromoBatchRequest::new(prefix)
            };
            let generated = ctx.surface(ctx.client.generate_promocodes(ctx.session(), &batch).await)?;
            ctx.render(&generated, |out, generated| {
                writeln!(
                    out,
                    "Batch {}: {} codes {}{}",
                    generated.batch_id,
                    generated.generated,
                    generated.prefix,
                    "*".repeat(generated.length as usize)
                )
            })
        }
    }
}

async fn toggle(ctx: &Context, code: &str, active: bool) -> CommandResult {
    let response = ctx.surface(
        ctx.client
            .set_promocode_active(ctx.session(), code, active)
            .await,
    )?;
    let state = if active { "enabled" } else { "disabled" };
    ctx.done(&format!("Promocode {code} {state}"), &response)
}
