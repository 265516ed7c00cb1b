//! Dashboard tests.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use serde_json::json;
use wishlist_client::api::{Method, StatusCode};
use wishlist_client::controllers::{ActionOutcome, Feedback, ListPhase};
use wishlist_client::routes::Route;
use wishlist_core::{ValidationError, WishlistId};
use wishlist_integration_tests::{ALICE, BOB, FakeServer, logged_in, wishlist};

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_lists_owned_and_shared_wishlists() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    server.ok(
        Method::GET,
        "/wishlists",
        &json!([
            wishlist("w1", ALICE, &[], vec![]),
            wishlist("w2", BOB, &[ALICE], vec![]),
        ]),
    );
    let dashboard = state.wishlists_controller();

    assert_eq!(dashboard.refresh().await, ActionOutcome::Applied);

    let view = dashboard.snapshot().await;
    let lists = view.wishlists();
    assert_eq!(lists.len(), 2);
    assert!(view.can_delete(&lists[0]));
    assert!(!view.can_delete(&lists[1]));
    assert!(!view.busy);
}

#[tokio::test]
async fn test_unreachable_server_shows_failure() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    server.drop_connection(Method::GET, "/wishlists");
    let dashboard = state.wishlists_controller();

    let outcome = dashboard.refresh().await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed("Failed to load wishlists.".to_string())
    );
    assert_eq!(
        dashboard.snapshot().await.phase,
        ListPhase::Failed("Failed to load wishlists.".to_string())
    );
}

// =============================================================================
// Create and delete
// =============================================================================

#[tokio::test]
async fn test_create_then_refresh() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    server.ok(Method::POST, "/wishlists", &wishlist("w3", ALICE, &[], vec![]));
    server.ok(Method::GET, "/wishlists", &json!([wishlist("w3", ALICE, &[], vec![])]));
    let dashboard = state.wishlists_controller();

    assert_eq!(
        dashboard.create("Birthday", "Things I'd like").await,
        ActionOutcome::Applied
    );

    let create = server
        .requests()
        .into_iter()
        .find(|r| r.line() == "POST /wishlists")
        .unwrap();
    assert_eq!(
        create.body,
        Some(json!({"title": "Birthday", "description": "Things I'd like"}))
    );
    assert_eq!(server.log(), vec!["POST /wishlists", "GET /wishlists"]);
    assert_eq!(dashboard.snapshot().await.wishlists().len(), 1);
}

#[tokio::test]
async fn test_blank_title_is_rejected_locally() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    let dashboard = state.wishlists_controller();

    let outcome = dashboard.create("   ", "").await;

    assert_eq!(outcome, ActionOutcome::Invalid(ValidationError::EmptyTitle));
    assert!(server.log().is_empty());
    assert!(dashboard.snapshot().await.feedback.unwrap().is_error());
}

#[tokio::test]
async fn test_owner_deletes_after_confirming() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    server.ok(Method::GET, "/wishlists", &json!([wishlist("w1", ALICE, &[], vec![])]));
    server.ok(Method::GET, "/wishlists", &json!([]));
    server.respond(Method::DELETE, "/wishlists/w1", StatusCode::NO_CONTENT, &json!(null));
    let dashboard = state.wishlists_controller();
    dashboard.refresh().await;

    let declined = dashboard.delete(&WishlistId::new("w1"), &|_: &str| false).await;
    assert_eq!(declined, ActionOutcome::Declined);
    assert_eq!(server.log(), vec!["GET /wishlists"]);

    let deleted = dashboard.delete(&WishlistId::new("w1"), &|_: &str| true).await;
    assert_eq!(deleted, ActionOutcome::Applied);
    assert_eq!(
        server.log(),
        vec!["GET /wishlists", "DELETE /wishlists/w1", "GET /wishlists"]
    );
    assert!(dashboard.snapshot().await.wishlists().is_empty());
}

#[tokio::test]
async fn test_non_owner_cannot_delete() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    server.ok(Method::GET, "/wishlists", &json!([wishlist("w2", BOB, &[ALICE], vec![])]));
    let dashboard = state.wishlists_controller();
    dashboard.refresh().await;

    let outcome = dashboard.delete(&WishlistId::new("w2"), &|_: &str| true).await;

    assert!(matches!(outcome, ActionOutcome::Failed(_)));
    assert_eq!(server.log(), vec!["GET /wishlists"]);
    assert_eq!(
        dashboard.snapshot().await.feedback,
        Some(Feedback::Error(
            "Only the owner can delete this wishlist.".to_string()
        ))
    );
}

#[tokio::test]
async fn test_expired_session_goes_to_login() {
    let server = FakeServer::new();
    let state = logged_in(&server, ALICE).await;
    server.respond(Method::GET, "/wishlists", StatusCode::UNAUTHORIZED, &json!(null));
    let dashboard = state.wishlists_controller();

    assert_eq!(
        dashboard.refresh().await,
        ActionOutcome::Navigate(Route::Login)
    );
    assert_eq!(state.session().identity().await, None);
}
