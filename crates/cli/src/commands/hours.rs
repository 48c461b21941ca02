//! Business hours commands (admin).

use appetit_client::{DayHours, WEEK, day_name};
use chrono::{NaiveTime, Weekday};
use clap::Subcommand;

use super::{CliError, CommandResult, Context};

#[derive(Subcommand)]
pub enum HoursCommands {
    /// Show the weekly schedule
    Show,

    /// Set one day's hours
    Set {
        /// Day name (monday, tue, ...) or number from 0 (Monday) to 6
        #[arg(value_parser = parse_day)]
        day: Weekday,

        /// Opening time (HH:MM)
        #[arg(long, value_parser = parse_time, required_unless_present = "closed")]
        open: Option<NaiveTime>,

        /// Closing time (HH:MM)
        #[arg(long, value_parser = parse_time, required_unless_present = "closed")]
        close: Option<NaiveTime>,

        /// Closed all day
        #[arg(long, conflicts_with_all = ["open", "close"])]
        closed: bool,
    },

    /// Close immediately regardless of the schedule
    EmergencyClose,

    /// Lift an emergency closure
    EmergencyOpen,
}

/// Parse a weekday name or its number counted from Monday.
fn parse_day(raw: &str) -> Result<Weekday, String> {
    if let Ok(index) = raw.trim().parse::<usize>() {
        return WEEK
            .get(index)
            .copied()
            .ok_or_else(|| format!("day number must be 0-6, got {index}"));
    }
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| format!("unknown day: {raw}"))
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

/// Run a business hours command.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn run(ctx: &Context, command: HoursCommands) -> CommandResult {
    match command {
        HoursCommands::Show => {
            let hours = ctx.surface(ctx.client.business_hours(ctx.session()).await)?;
            ctx.render(&hours, |out, hours| {
                for (day, hours) in hours.iter() {
                    if hours.is_closed {
                        writeln!(out, "{:<10} closed", day_name(day))?;
                    } else {
                        writeln!(
                            out,
                            "{:<10} {} - {}",
                            day_name(day),
                            time_or_dash(hours.open_time),
                            time_or_dash(hours.close_time)
                        )?;
                    }
                }
                Ok(())
            })
        }
        HoursCommands::Set {
            day,
            open,
            close,
            closed,
        } => {
            match (open, close) {
                (Some(open), Some(close)) if close <= open => {
                    return Err(CliError::Input(format!(
                        "Closing time {} must be after opening time {}",
                        close.format("%H:%M"),
                        open.format("%H:%M")
                    )));
                }
                _ => {}
            }
            let hours = DayHours {
                open_time: open,
                close_time: close,
                is_closed: closed,
            };
            let response = ctx.surface(
                ctx.client
                    .update_business_day(ctx.session(), day, &hours)
                    .await,
            )?;
            ctx.done(&format!("Hours for {} updated", day_name(day)), &response)
        }
        HoursCommands::EmergencyClose => {
            let response = ctx.surface(ctx.client.set_emergency_closure(ctx.session(), true).await)?;
            ctx.done("Emergency closure on", &response)
        }
        HoursCommands::EmergencyOpen => {
            let response = ctx.surface(ctx.client.set_emergency_closure(ctx.session(), false).await)?;
            ctx.done("Emergency closure lifted", &response)
        }
    }
}

fn time_or_dash(time: Option<NaiveTime>) -> String {
    time.map_or_else(|| "-".to_owned(), |t| t.format("%H:%M").to_string())
}
