//! Login and registration form tests.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use secrecy::SecretString;
use serde_json::json;
use wishlist_client::api::{Method, StatusCode};
use wishlist_client::controllers::{AuthMode, AuthOutcome};
use wishlist_client::routes::Route;
use wishlist_integration_tests::{ALICE, FakeServer, app};

fn pw(s: &str) -> SecretString {
    SecretString::from(s)
}

#[tokio::test]
async fn test_login_navigates_to_dashboard() {
    let server = FakeServer::new();
    server.ok(Method::POST, "/auth/login", &ALICE.login_body());
    let (state, _) = app(&server);

    let outcome = state.auth_flow().login("a@x.com", pw("p")).await;

    assert_eq!(outcome, AuthOutcome::Navigate(Route::Dashboard));
    assert_eq!(state.session().identity().await.unwrap().username, "alice");
}

#[tokio::test]
async fn test_bad_credentials_stay_on_form() {
    let server = FakeServer::new();
    server.respond(Method::POST, "/auth/login", StatusCode::UNAUTHORIZED, &json!(null));
    let (state, _) = app(&server);

    let outcome = state.auth_flow().login("alice", pw("wrong")).await;

    assert_eq!(
        outcome,
        AuthOutcome::Message("Login failed. Invalid credentials.".to_string())
    );
    assert_eq!(state.session().identity().await, None);
}

#[tokio::test]
async fn test_empty_fields_are_not_sent() {
    let server = FakeServer::new();
    let (state, _) = app(&server);

    let outcome = state.auth_flow().login("  ", pw("p")).await;

    assert!(matches!(outcome, AuthOutcome::Message(_)));
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn test_register_switches_to_login_without_logging_in() {
    let server = FakeServer::new();
    server.respond(Method::POST, "/auth/signup", StatusCode::CREATED, &json!(null));
    let (state, _) = app(&server);
    let flow = state.auth_flow();
    assert_eq!(flow.toggle_mode().await, AuthMode::Register);

    let outcome = flow.register("alice", "a@x.com", pw("p")).await;

    assert_eq!(
        outcome,
        AuthOutcome::Message("Registration successful! Please login.".to_string())
    );
    assert_eq!(flow.mode().await, AuthMode::Login);
    assert_eq!(state.session().identity().await, None);

    let signup = server.requests().pop().unwrap();
    assert_eq!(signup.line(), "POST /auth/signup");
    assert_eq!(
        signup.body,
        Some(json!({"username": "alice", "email": "a@x.com", "passwordHash": "p"}))
    );
}

#[tokio::test]
async fn test_register_shows_server_reason() {
    let server = FakeServer::new();
    server.respond(
        Method::POST,
        "/auth/signup",
        StatusCode::CONFLICT,
        &json!({"message": "Username already taken"}),
    );
    let (state, _) = app(&server);
    let flow = state.auth_flow();
    flow.toggle_mode().await;

    let outcome = flow.register("alice", "a@x.com", pw("p")).await;

    assert_eq!(outcome, AuthOutcome::Message("Username already taken".to_string()));
    assert_eq!(flow.mode().await, AuthMode::Register);
}

#[tokio::test]
async fn test_register_rejects_bad_email_locally() {
    let server = FakeServer::new();
    let (state, _) = app(&server);

    let outcome = state.auth_flow().register("alice", "not-an-email", pw("p")).await;

    assert_eq!(
        outcome,
        AuthOutcome::Message("Please enter a valid email address.".to_string())
    );
    assert_eq!(server.request_count(), 0);
}
