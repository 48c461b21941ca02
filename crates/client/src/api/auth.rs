//! Registration, login, and contact verification.

use appetit_core::{Contact, UserId};
use chrono::NaiveDate;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::expose;
use crate::dispatcher::{ApiClient, Request};
use crate::error::ClientError;
use crate::session::Session;

/// New account details.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email_or_phone: Contact,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: String,
}

/// Profile of the calling user, with verification flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_phone_verified: bool,
}

/// Successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

impl TokenResponse {
    /// The session this login establishes.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self.access_token.clone(), Some(self.user.role.clone()))
    }
}

/// Verification started; the token ties the later verify call to this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStarted {
    #[serde(default)]
    pub token: Option<String>,
}

/// Which contact channel a verification targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyChannel {
    Email,
    Phone,
}

impl VerifyChannel {
    const fn path_segment(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    const fn field(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

/// Code the user received, plus the token from the start call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    pub contact: String,
    pub code: String,
    pub token: Option<String>,
}

impl ApiClient {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, request), fields(full_name = %request.full_name))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ClientError> {
        self.dispatch(None, Request::post("/auth/register").json(request)?)
            .await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// The caller decides whether to remember the resulting session.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected or the request fails.
    #[instrument(skip(self, request), fields(login = %request.email_or_phone))]
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ClientError> {
        self.call(None, Request::post("/auth/login").json(request)?)
            .await
    }

    /// Begin verifying an email address or phone number.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, contact))]
    pub async fn start_verification(
        &self,
        session: Option<&Session>,
        channel: VerifyChannel,
        contact: &str,
    ) -> Result<VerificationStarted, ClientError> {
        let mut body = serde_json::Map::new();
        body.insert(channel.field().to_owned(), Value::from(contact));

        let path = format!("/auth/{}/start", channel.path_segment());
        self.call(session, Request::post(path).with_body(Value::Object(body)))
            .await
    }

    /// Complete a verification with the code the user received.
    ///
    /// # Errors
    ///
    /// Returns error if the code is rejected or the request fails.
    #[instrument(skip(self, session, request))]
    pub async fn verify(
        &self,
        session: Option<&Session>,
        channel: VerifyChannel,
        request: &VerifyRequest,
    ) -> Result<Value, ClientError> {
        let mut body = serde_json::Map::new();
        body.insert(channel.field().to_owned(), Value::from(request.contact.as_str()));
        body.insert("code".to_owned(), Value::from(request.code.as_str()));
        if let Some(token) = &request.token {
            body.insert("token".to_owned(), Value::from(token.as_str()));
        }

        let path = format!("/auth/{}/verify", channel.path_segment());
        self.dispatch(session, Request::post(path).with_body(Value::Object(body)))
            .await
    }

    /// Profile of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns error if unauthenticated or the request fails.
    #[instrument(skip(self, session))]
    pub async fn me(&self, session: Option<&Session>) -> Result<CurrentUser, ClientError> {
        self.call(session, Request::get("/users/me")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_login_payload_exposes_password_only_on_the_wire() {
        let request = LoginRequest {
            email_or_phone: Contact::parse("admin@appetit.kz").unwrap(),
            password: SecretString::from("hunter2"),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"email_or_phone": "admin@appetit.kz", "password": "hunter2"})
        );
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[test]
    fn test_register_omits_blank_optionals() {
        let request = RegisterRequest {
            full_name: "Aigerim".to_owned(),
            email: None,
            phone: Some("+77011234567".to_owned()),
            dob: NaiveDate::from_ymd_opt(1995, 4, 12),
            password: SecretString::from("pw"),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"full_name": "Aigerim", "phone": "+77011234567", "dob": "1995-04-12", "password": "pw"})
        );
    }

    #[test]
    fn test_token_response_session() {
        let response: TokenResponse = serde_json::from_value(json!({
            "access_token": "jwt-token",
            "user": {"id": 1, "full_name": "Admin", "role": "admin"}
        }))
        .unwrap();

        assert_eq!(response.token_type, "bearer");
        let session = response.session();
        assert_eq!(session.token(), "jwt-token");
        assert!(session.is_admin());
    }

    #[test]
    fn test_current_user_flattens_profile() {
        let me: CurrentUser = serde_json::from_value(json!({
            "id": 4, "full_name": "Chef", "email": "chef@appetit.kz", "phone": null,
            "role": "user", "is_email_verified": true, "is_phone_verified": false
        }))
        .unwrap();

        assert_eq!(me.user.id, UserId::new(4));
        assert!(me.is_email_verified);
        assert_eq!(me.user.phone, None);
    }
}
