//! Account commands: register, login, contact verification, and the
//! remembered session.

use appetit_client::{
    AuthStatus, LoginRequest, Notice, RegisterRequest, SessionStore, VerifyChannel, VerifyRequest,
};
use appetit_core::Contact;
use chrono::NaiveDate;
use clap::Subcommand;
use secrecy::SecretString;
use tracing::info;

use super::{CliError, CommandResult, Context, or_dash};

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account
    Register {
        /// Full name
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: Option<NaiveDate>,

        #[arg(long, env = "APPETIT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and remember the session
    Login {
        /// Email address or phone number
        email_or_phone: String,

        #[arg(long, env = "APPETIT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the remembered session
    Logout,

    /// Show whether a session is remembered
    Status,

    /// Show the logged-in user's profile
    Me,

    /// Send a verification code to an email address
    EmailStart { email: String },

    /// Confirm an email address with the received code
    EmailVerify {
        email: String,
        code: String,
        /// Token returned by `email-start`
        #[arg(long)]
        token: Option<String>,
    },

    /// Send a verification code by SMS
    PhoneStart { phone: String },

    /// Confirm a phone number with the received code
    PhoneVerify {
        phone: String,
        code: String,
        /// Token returned by `phone-start`
        #[arg(long)]
        token: Option<String>,
    },
}

/// Run an auth command.
///
/// # Errors
///
/// Returns an error if the request fails or the session cannot be stored.
pub async fn run(ctx: &mut Context, command: AuthCommands) -> CommandResult {
    match command {
        AuthCommands::Register {
            name,
            email,
            phone,
            dob,
            password,
        } => {
            if email.is_none() && phone.is_none() {
                return Err(CliError::Input(
                    "Provide --email or --phone to register".to_owned(),
                ));
            }
            let request = RegisterRequest {
                full_name: name,
                email,
                phone,
                dob,
                password: SecretString::from(password),
            };
            let response = ctx.surface(ctx.client.register(&request).await)?;
            ctx.done("Registration successful", &response)
        }
        AuthCommands::Login {
            email_or_phone,
            password,
        } => {
            let contact = Contact::parse(&email_or_phone)
                .map_err(|e| CliError::Input(e.to_string()))?;
            let request = LoginRequest {
                email_or_phone: contact,
                password: SecretString::from(password),
            };
            let token = ctx.surface(ctx.client.login(&request).await)?;
            let session = token.session();
            SessionStore::new(&ctx.store).save(&session)?;
            info!(user_id = %token.user.id, role = %token.user.role, "Logged in");
            ctx.session = Some(session);

            ctx.notify(Notice::success(format!("Welcome, {}", token.user.full_name)));
            ctx.render(&token.user, |out, user| {
                writeln!(out, "{} ({})", user.full_name, user.role)
            })
        }
        AuthCommands::Logout => {
            SessionStore::new(&ctx.store).clear()?;
            ctx.session = None;
            ctx.notify(Notice::info("Logged out"));
            Ok(())
        }
        AuthCommands::Status => {
            let status = AuthStatus(ctx.session()).to_string();
            ctx.render(&status, |out, status| writeln!(out, "{status}"))
        }
        AuthCommands::Me => {
            let me = ctx.surface(ctx.client.me(ctx.session()).await)?;
            ctx.render(&me, |out, me| {
                writeln!(out, "#{} {}", me.user.id, me.user.full_name)?;
                writeln!(out, "  role:  {}", me.user.role)?;
                writeln!(
                    out,
                    "  email: {} ({})",
                    or_dash(me.user.email.as_deref()),
                    verified(me.is_email_verified)
                )?;
                writeln!(
                    out,
                    "  phone: {} ({})",
                    or_dash(me.user.phone.as_deref()),
                    verified(me.is_phone_verified)
                )
            })
        }
        AuthCommands::EmailStart { email } => start(ctx, VerifyChannel::Email, &email).await,
        AuthCommands::PhoneStart { phone } => start(ctx, VerifyChannel::Phone, &phone).await,
        AuthCommands::EmailVerify { email, code, token } => {
            let request = VerifyRequest {
                contact: email,
                code,
                token,
            };
            let response = ctx.surface(
                ctx.client
                    .verify(ctx.session(), VerifyChannel::Email, &request)
                    .await,
            )?;
            ctx.done("Email verified", &response)
        }
        AuthCommands::PhoneVerify { phone, code, token } => {
            let request = VerifyRequest {
                contact: phone,
                code,
                token,
            };
            let response = ctx.surface(
                ctx.client
                    .verify(ctx.session(), VerifyChannel::Phone, &request)
                    .await,
            )?;
            ctx.done("Phone verified", &response)
        }
    }
}

async fn start(ctx: &Context, channel: VerifyChannel, contact: &str) -> CommandResult {
    let started = ctx.surface(
        ctx.client
            .start_verification(ctx.session(), channel, contact)
            .await,
    )?;
    ctx.notify(Notice::success(format!("Verification code sent to {contact}")));
    ctx.render(&started, |out, started| match &started.token {
        Some(token) => writeln!(out, "token: {token}"),
        None => Ok(()),
    })
}

const fn verified(flag: bool) -> &'static str {
    if flag { "verified" } else { "not verified" }
}
