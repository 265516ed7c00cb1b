//! Session lifecycle tests.
//!
//! Covers login, startup validation of a stored credential, logout and the
//! purge that follows a 401 from any authenticated call.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wishlist_client::AppState;
use wishlist_client::api::{Method, StatusCode};
use wishlist_client::session::{
    CredentialStore, FileCredentialStore, LoginDraft, MemoryCredentialStore, SessionStatus,
};
use wishlist_client::ErrorKind;
use wishlist_core::WishlistId;
use wishlist_integration_tests::{ALICE, BOB, FakeServer, app, logged_in, wait_until, wishlist};

fn draft(login: &str) -> LoginDraft {
    LoginDraft::new(login, SecretString::from("secret")).unwrap()
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_installs_and_persists_credential() {
    let server = FakeServer::new();
    server.ok(Method::POST, "/auth/login", &ALICE.login_body());
    let (state, storage) = app(&server);

    let identity = state.session().establish(&draft("alice")).await.unwrap();

    assert_eq!(identity.username, "alice");
    assert_eq!(identity.email.as_str(), "a@x.com");
    assert_eq!(
        state.session().status().await,
        SessionStatus::Authenticated(identity)
    );
    assert_eq!(
        storage.load().unwrap().unwrap().expose_secret(),
        ALICE.token
    );

    let sent = server.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].bearer, None);
    assert_eq!(
        sent[0].body,
        Some(json!({"emailOrUsername": "alice", "password": "secret"}))
    );
}

#[tokio::test]
async fn test_rejected_login_leaves_nothing_behind() {
    let server = FakeServer::new();
    server.respond(
        Method::POST,
        "/auth/login",
        StatusCode::UNAUTHORIZED,
        &json!({"message": "Bad credentials"}),
    );
    let (state, storage) = app(&server);

    let err = state.session().establish(&draft("alice")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(!storage.has_token());
    assert_eq!(state.session().credential().await.map(|_| ()), None);
}

#[tokio::test]
async fn test_requests_carry_the_installed_credential() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    server.ok(Method::GET, "/wishlists", &json!([]));

    state.api().list_wishlists().await.unwrap();

    let last = server.requests().pop().unwrap();
    assert_eq!(last.line(), "GET /wishlists");
    assert_eq!(last.bearer.as_deref(), Some(ALICE.token));
}

// =============================================================================
// Startup validation
// =============================================================================

#[tokio::test]
async fn test_stored_credential_is_revalidated() {
    let server = FakeServer::new();
    server.ok(Method::GET, "/auth/validate", &ALICE.identity_body());
    let storage = Arc::new(MemoryCredentialStore::with_token(ALICE.token));
    let state = AppState::with_parts(server.clone(), storage.clone());

    assert!(state.session().status().await.is_pending());

    let status = state.session().revalidate().await;

    assert_eq!(status.identity().unwrap().username, "alice");
    assert_eq!(state.session().status().await, status);
    let sent = server.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].bearer.as_deref(), Some(ALICE.token));
}

#[tokio::test]
async fn test_nothing_stored_settles_without_network() {
    let server = FakeServer::new();
    let (state, _) = app(&server);

    let status = state.session().revalidate().await;

    assert_eq!(status, SessionStatus::Unauthenticated);
    assert_eq!(server.request_count(), 0);
}

/// Scenario: the server has revoked the stored token.
#[tokio::test]
async fn test_revoked_credential_is_purged_at_startup() {
    let server = FakeServer::new();
    server.respond(Method::GET, "/auth/validate", StatusCode::UNAUTHORIZED, &json!(null));
    let storage = Arc::new(MemoryCredentialStore::with_token("stale"));
    let state = AppState::with_parts(server.clone(), storage.clone());

    let status = state.session().revalidate().await;

    assert_eq!(status, SessionStatus::Unauthenticated);
    assert!(!storage.has_token());
    assert_eq!(state.session().status().await, SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_unreachable_server_at_startup_purges() {
    let server = FakeServer::new();
    server.drop_connection(Method::GET, "/auth/validate");
    let storage = Arc::new(MemoryCredentialStore::with_token(ALICE.token));
    let state = AppState::with_parts(server.clone(), storage.clone());

    assert_eq!(state.session().revalidate().await, SessionStatus::Unauthenticated);
    assert!(!storage.has_token());
}

#[tokio::test]
async fn test_login_survives_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let server = FakeServer::new();
    server.ok(Method::POST, "/auth/login", &ALICE.login_body());
    server.ok(Method::GET, "/auth/validate", &ALICE.identity_body());

    let first = AppState::with_parts(server.clone(), Arc::new(FileCredentialStore::new(path.clone())));
    first.session().establish(&draft("a@x.com")).await.unwrap();
    drop(first);

    let second = AppState::with_parts(server.clone(), Arc::new(FileCredentialStore::new(path.clone())));
    let status = second.session().revalidate().await;

    assert_eq!(status.identity().unwrap().username, "alice");
    let validate = server.requests().pop().unwrap();
    assert_eq!(validate.line(), "GET /auth/validate");
    assert_eq!(validate.bearer.as_deref(), Some(ALICE.token));
}

/// A login that lands while the stored credential is still being checked
/// wins over the late rejection of that credential.
#[tokio::test]
async fn test_login_during_startup_check_survives_late_rejection() {
    let server = FakeServer::new();
    let gate = server.gate(Method::GET, "/auth/validate");
    server.ok(Method::POST, "/auth/login", &BOB.login_body());
    let storage = Arc::new(MemoryCredentialStore::with_token("STALE"));
    let state = AppState::with_parts(server.clone(), storage.clone());

    let session = state.session().clone();
    let startup = tokio::spawn(async move { session.revalidate().await });
    wait_until(|| server.request_count() == 1).await;
    assert!(state.session().status().await.is_pending());

    let bob = state.session().establish(&draft("bob")).await.unwrap();
    gate.release(StatusCode::UNAUTHORIZED, "");
    let reported = startup.await.unwrap();

    assert_eq!(reported, SessionStatus::Authenticated(bob.clone()));
    assert_eq!(state.session().status().await, SessionStatus::Authenticated(bob));
    assert_eq!(
        storage.load().unwrap().unwrap().expose_secret(),
        BOB.token
    );
}

#[tokio::test]
async fn test_login_during_startup_check_survives_late_acceptance() {
    let server = FakeServer::new();
    let gate = server.gate(Method::GET, "/auth/validate");
    server.ok(Method::POST, "/auth/login", &BOB.login_body());
    let storage = Arc::new(MemoryCredentialStore::with_token(ALICE.token));
    let state = AppState::with_parts(server.clone(), storage.clone());

    let session = state.session().clone();
    let startup = tokio::spawn(async move { session.revalidate().await });
    wait_until(|| server.request_count() == 1).await;

    state.session().establish(&draft("bob")).await.unwrap();
    gate.release(StatusCode::OK, ALICE.identity_body());
    startup.await.unwrap();

    assert_eq!(state.session().identity().await.unwrap().username, "bob");
    assert_eq!(
        state.session().credential().await.unwrap().expose_secret(),
        BOB.token
    );
    assert_eq!(
        storage.load().unwrap().unwrap().expose_secret(),
        BOB.token
    );
}

#[tokio::test]
async fn test_failed_login_during_startup_check_stays_pending() {
    let server = FakeServer::new();
    let gate = server.gate(Method::GET, "/auth/validate");
    server.respond(Method::POST, "/auth/login", StatusCode::UNAUTHORIZED, &json!(null));
    let storage = Arc::new(MemoryCredentialStore::with_token(ALICE.token));
    let state = AppState::with_parts(server.clone(), storage.clone());

    let session = state.session().clone();
    let startup = tokio::spawn(async move { session.revalidate().await });
    wait_until(|| server.request_count() == 1).await;

    state.session().establish(&draft("alice")).await.unwrap_err();
    assert!(state.session().status().await.is_pending());

    gate.release(StatusCode::OK, ALICE.identity_body());
    assert_eq!(startup.await.unwrap().identity().unwrap().username, "alice");
}

#[tokio::test]
async fn test_failed_first_login_settles_unauthenticated() {
    let server = FakeServer::new();
    server.respond(Method::POST, "/auth/login", StatusCode::UNAUTHORIZED, &json!(null));
    let (state, _) = app(&server);

    state.session().establish(&draft("alice")).await.unwrap_err();

    assert_eq!(state.session().status().await, SessionStatus::Unauthenticated);
}

// =============================================================================
// Logout and purge
// =============================================================================

#[tokio::test]
async fn test_terminate_is_idempotent() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;

    state.session().terminate().await;
    state.session().terminate().await;

    assert_eq!(state.session().status().await, SessionStatus::Unauthenticated);
    assert_eq!(state.session().identity().await, None);
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn test_calls_after_logout_are_not_sent() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    state.session().terminate().await;

    let err = state.api().list_wishlists().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(server.log().is_empty());
}

/// Scenario: any authenticated call answered with 401 ends the session
/// before the next call can be made.
#[tokio::test]
async fn test_unauthorized_response_purges_session() {
    let server = FakeServer::new();
    server.ok(Method::POST, "/auth/login", &ALICE.login_body());
    let storage = Arc::new(MemoryCredentialStore::new());
    let state = AppState::with_parts(server.clone(), storage.clone());
    state.session().establish(&draft("alice")).await.unwrap();
    server.respond(Method::GET, "/wishlists/w1", StatusCode::UNAUTHORIZED, &json!(null));
    server.ok(Method::GET, "/wishlists/w2", &wishlist("w2", ALICE, &[], vec![]));

    let err = state.api().get_wishlist(&WishlistId::new("w1")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(state.session().status().await, SessionStatus::Unauthenticated);
    assert!(!storage.has_token());

    let next = state.api().get_wishlist(&WishlistId::new("w2")).await.unwrap_err();
    assert_eq!(next.kind(), ErrorKind::Auth);
    assert_eq!(server.log(), vec!["GET /wishlists/w1"]);
}

#[tokio::test]
async fn test_forbidden_response_keeps_session() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    server.respond(Method::GET, "/wishlists/w1", StatusCode::FORBIDDEN, &json!(null));

    let err = state.api().get_wishlist(&WishlistId::new("w1")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFoundOrForbidden);
    assert!(state.session().identity().await.is_some());
}

/// A 401 for a request sent with an old credential must not end a session
/// that a newer login installed while the request was in flight.
#[tokio::test]
async fn test_late_unauthorized_leaves_newer_login_alone() {
    let server = FakeServer::new();
    server.ok(Method::POST, "/auth/login", &ALICE.login_body());
    let (state, storage) = app(&server);
    state.session().establish(&draft("alice")).await.unwrap();
    let gate = server.gate(Method::GET, "/wishlists");

    let api = state.api().clone();
    let pending = tokio::spawn(async move { api.list_wishlists().await });
    wait_until(|| server.request_count() == 2).await;

    server.clear(Method::POST, "/auth/login");
    server.ok(Method::POST, "/auth/login", &BOB.login_body());
    state.session().establish(&draft("bob")).await.unwrap();
    gate.release(StatusCode::UNAUTHORIZED, "");

    let err = pending.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(state.session().identity().await.unwrap().username, "bob");
    assert_eq!(
        storage.load().unwrap().unwrap().expose_secret(),
        BOB.token
    );
}
