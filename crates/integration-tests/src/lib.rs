//! Integration tests for the wishlist client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p wishlist-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session` - Login, startup validation, logout, credential purge
//! - `wishlist_controller` - Loading, product changes, owner actions, races
//! - `dashboard` - Wishlist collection
//! - `auth_flow` - Login/register form
//! - `routes` - Authentication gate
//!
//! Everything runs against [`FakeServer`], an in-memory [`Transport`] with
//! scripted answers. Answers can be held back behind a [`Gate`] to reproduce
//! slow or out-of-order responses.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::sync::oneshot;
use wishlist_client::AppState;
use wishlist_client::api::{ApiRequest, ApiResponse, Method, StatusCode, Transport, TransportError};
use wishlist_client::session::{LoginDraft, MemoryCredentialStore};

// =============================================================================
// Fake server
// =============================================================================

enum Reply {
    Respond(StatusCode, String),
    Drop(String),
    Gated(oneshot::Receiver<(StatusCode, String)>),
}

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// `"METHOD /path"`.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Holds back one answer until released.
pub struct Gate {
    sender: oneshot::Sender<(StatusCode, String)>,
}

impl Gate {
    /// Let the held request complete with `status` and `body`.
    pub fn release(self, status: StatusCode, body: impl ToString) {
        let _ = self.sender.send((status, body.to_string()));
    }
}

/// In-memory API with scripted answers per `(method, path)`.
///
/// Answers queued for a route are used in order. The last plain answer
/// repeats; gated answers are used once. Unscripted routes answer 404.
#[derive(Default)]
pub struct FakeServer {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeServer {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Forget everything scripted for `method path`.
    pub fn clear(&self, method: Method, path: &str) {
        self.replies
            .lock()
            .unwrap()
            .remove(&(method, path.to_string()));
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: &Value) {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.push(method, path, Reply::Respond(status, body));
    }

    /// Answer `method path` with 200 and `body`.
    pub fn ok(&self, method: Method, path: &str, body: &Value) {
        self.respond(method, path, StatusCode::OK, body);
    }

    /// Fail `method path` as if the connection dropped.
    pub fn drop_connection(&self, method: Method, path: &str) {
        self.push(method, path, Reply::Drop("connection reset".to_string()));
    }

    /// Hold the next `method path` request until the returned gate is released.
    #[must_use]
    pub fn gate(&self, method: Method, path: &str) -> Gate {
        let (sender, receiver) = oneshot::channel();
        self.push(method, path, Reply::Gated(receiver));
        Gate { sender }
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Request lines received so far, excluding logins.
    #[must_use]
    pub fn log(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r.path != "/auth/login")
            .map(RecordedRequest::line)
            .collect()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_reply(&self, method: &Method, path: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.get_mut(&(method.clone(), path.to_string()))?;
        let keep_last = queue.len() == 1 && !matches!(queue.front(), Some(Reply::Gated(_)));
        if keep_last {
            return match queue.front()? {
                Reply::Respond(status, body) => Some(Reply::Respond(*status, body.clone())),
                Reply::Drop(reason) => Some(Reply::Drop(reason.clone())),
                Reply::Gated(_) => None,
            };
        }
        queue.pop_front()
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method.clone(),
            path: request.path.clone(),
            bearer: request
                .bearer
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            body: request.body.clone(),
        });

        match self.next_reply(&request.method, &request.path) {
            None => Ok(ApiResponse::new(StatusCode::NOT_FOUND, "")),
            Some(Reply::Respond(status, body)) => Ok(ApiResponse::new(status, body)),
            Some(Reply::Drop(reason)) => Err(TransportError::new(reason)),
            Some(Reply::Gated(receiver)) => match receiver.await {
                Ok((status, body)) => Ok(ApiResponse::new(status, body)),
                Err(_) => Err(TransportError::new("gate dropped")),
            },
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A user the fake server knows about.
#[derive(Debug, Clone, Copy)]
pub struct User {
    pub id: u64,
    pub username: &'static str,
    pub email: &'static str,
    pub token: &'static str,
}

pub const ALICE: User = User {
    id: 1,
    username: "alice",
    email: "a@x.com",
    token: "T-alice",
};

pub const BOB: User = User {
    id: 2,
    username: "bob",
    email: "b@x.com",
    token: "T-bob",
};

impl User {
    /// Body of a successful login for this user.
    #[must_use]
    pub fn login_body(&self) -> Value {
        json!({
            "token": self.token,
            "userId": self.id,
            "username": self.username,
            "email": self.email,
        })
    }

    /// Body of a successful validation for this user.
    #[must_use]
    pub fn identity_body(&self) -> Value {
        json!({"id": self.id, "username": self.username, "email": self.email})
    }
}

/// A product as the server returns it.
#[must_use]
pub fn product(id: &str, name: &str, price: f64, added_by: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "imageUrl": format!("https://img.example/{name}.png"),
        "price": price,
        "addedByUsername": added_by,
        "createdAt": "2024-05-01T09:00:00",
        "lastEditedAt": "2024-05-01T09:00:00"
    })
}

/// A wishlist as the server returns it.
#[must_use]
pub fn wishlist(id: &str, owner: User, collaborators: &[User], products: Vec<Value>) -> Value {
    json!({
        "id": id,
        "title": format!("Wishlist {id}"),
        "description": "Things we'd like",
        "ownerId": owner.id,
        "ownerUsername": owner.username,
        "collaboratorIds": collaborators.iter().map(|u| u.id).collect::<Vec<_>>(),
        "products": products
    })
}

/// App state over `server` with an in-memory credential store.
#[must_use]
pub fn app(server: &Arc<FakeServer>) -> (AppState, Arc<MemoryCredentialStore>) {
    let storage = Arc::new(MemoryCredentialStore::new());
    let state = AppState::with_parts(server.clone(), storage.clone());
    (state, storage)
}

/// App state over `server`, logged in as `user`.
pub async fn logged_in(server: &Arc<FakeServer>, user: User) -> AppState {
    server.clear(Method::POST, "/auth/login");
    server.ok(Method::POST, "/auth/login", &user.login_body());
    let (state, _) = app(server);
    state
        .session()
        .establish(&LoginDraft::new(user.username, SecretString::from("p")).unwrap())
        .await
        .unwrap();
    state
}

/// Yield until `condition` holds.
///
/// # Panics
///
/// Panics if the condition is still false after many scheduler turns.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
