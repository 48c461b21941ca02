//! Integration tests for the login, persistence, and logout flow.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use appetit_client::{
    FileStore, KeyValueStore, LoginRequest, MemoryNotifier, SessionStore, surface,
};
use appetit_client::session::{ROLE_KEY, TOKEN_KEY};
use appetit_core::Contact;
use appetit_integration_tests::{FixtureApi, temp_state_file};
use axum::http::Method;
use serde_json::json;

fn login_reply() -> serde_json::Value {
    json!({
        "access_token": "tok-admin",
        "token_type": "bearer",
        "user": {"id": 1, "full_name": "Aigerim", "email": "admin@appetit.kz", "phone": null, "role": "admin"}
    })
}

fn credentials() -> LoginRequest {
    LoginRequest {
        email_or_phone: Contact::parse("admin@appetit.kz").unwrap(),
        password: "secret".to_owned().into(),
    }
}

#[tokio::test]
async fn test_login_persists_session_and_later_calls_use_it() {
    let api = FixtureApi::builder()
        .json(Method::POST, "/auth/login", 200, &login_reply())
        .json(Method::GET, "/cart", 200, &json!({"items": []}))
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let state_file = temp_state_file("login-persists");

    let token = client.login(&credentials()).await.unwrap();
    let store = FileStore::new(state_file.clone());
    SessionStore::new(&store).save(&token.session()).unwrap();

    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-admin"));
    assert_eq!(store.get(ROLE_KEY).unwrap().as_deref(), Some("admin"));

    // A fresh store over the same file sees the session.
    let reopened = FileStore::new(state_file);
    let session = SessionStore::new(&reopened).load().unwrap().unwrap();
    assert!(session.is_admin());

    let cart = client.get_cart(Some(&session)).await.unwrap();
    assert!(cart.is_empty());

    let login = &api.requests_to("/auth/login")[0];
    assert_eq!(login.authorization, None);
    assert_eq!(
        login.body,
        json!({"email_or_phone": "admin@appetit.kz", "password": "secret"})
    );
    assert_eq!(
        api.requests_to("/cart")[0].authorization.as_deref(),
        Some("Bearer tok-admin")
    );
}

#[tokio::test]
async fn test_logout_clears_session_and_drops_header() {
    let api = FixtureApi::builder()
        .json(Method::POST, "/auth/login", 200, &login_reply())
        .json(Method::GET, "/menu/items", 200, &json!([]))
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let store = FileStore::new(temp_state_file("logout-clears"));
    let sessions = SessionStore::new(&store);

    let token = client.login(&credentials()).await.unwrap();
    sessions.save(&token.session()).unwrap();
    sessions.clear().unwrap();

    assert!(sessions.load().unwrap().is_none());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(ROLE_KEY).unwrap(), None);

    let session = sessions.load().unwrap();
    client.list_menu_items(session.as_ref()).await.unwrap();
    assert_eq!(api.requests_to("/menu/items")[0].authorization, None);
}

#[tokio::test]
async fn test_failed_login_leaves_store_untouched() {
    let api = FixtureApi::builder()
        .json(
            Method::POST,
            "/auth/login",
            401,
            &json!({"detail": "Invalid credentials"}),
        )
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let store = FileStore::new(temp_state_file("failed-login"));
    let notifier = MemoryNotifier::new();

    let result = surface(client.login(&credentials()).await, &notifier);

    assert!(result.unwrap_err().is_unauthorized());
    assert!(SessionStore::new(&store).load().unwrap().is_none());
    assert_eq!(notifier.notices().len(), 1);
    assert_eq!(notifier.notices()[0].message, "Invalid credentials");
}

#[tokio::test]
async fn test_login_with_phone_number() {
    let api = FixtureApi::builder()
        .json(Method::POST, "/auth/login", 200, &login_reply())
        .start()
        .await
        .unwrap();
    let client = api.client().unwrap();
    let request = LoginRequest {
        email_or_phone: Contact::parse("+77001234567").unwrap(),
        password: "secret".to_owned().into(),
    };

    client.login(&request).await.unwrap();

    assert_eq!(
        api.requests_to("/auth/login")[0].body["email_or_phone"],
        json!("+77001234567")
    );
}
