//! Canned-response transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;
use wishlist_core::ProductForm;

use crate::api::{ApiRequest, ApiResponse, Method, StatusCode, Transport, TransportError, WishlistApi};
use crate::session::{LoginDraft, MemoryCredentialStore, SessionStore};

/// Answers `(method, path)` pairs from per-route queues; the last queued
/// answer for a route repeats. Unrouted requests get a 404.
#[derive(Default)]
pub struct Routes {
    answers: Mutex<HashMap<(Method, String), VecDeque<(StatusCode, String)>>>,
    log: Mutex<Vec<String>>,
}

impl Routes {
    pub fn new() -> Arc<Self> {
        let routes = Arc::new(Self::default());
        routes.on(
            Method::POST,
            "/auth/login",
            StatusCode::OK,
            r#"{"token":"T","userId":1,"username":"alice","email":"a@x.com"}"#,
        );
        routes
    }

    pub fn on(&self, method: Method, path: &str, status: StatusCode, body: impl Into<String>) {
        self.answers
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back((status, body.into()));
    }

    /// Requests seen, as `"METHOD /path"`, excluding login.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Routes {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        if request.path != "/auth/login" {
            self.log
                .lock()
                .unwrap()
                .push(format!("{} {}", request.method, request.path));
        }

        let mut answers = self.answers.lock().unwrap();
        let Some(queue) = answers.get_mut(&(request.method.clone(), request.path.clone())) else {
            return Ok(ApiResponse::new(StatusCode::NOT_FOUND, ""));
        };
        let answer = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        let (status, body) = answer.unwrap_or((StatusCode::NOT_FOUND, String::new()));
        Ok(ApiResponse::new(status, body))
    }
}

/// A gateway logged in as alice (user 1).
pub async fn logged_in_api(routes: &Arc<Routes>) -> WishlistApi {
    let session = SessionStore::new(routes.clone(), Arc::new(MemoryCredentialStore::new()));
    session
        .establish(&LoginDraft::new("alice", SecretString::from("p")).unwrap())
        .await
        .unwrap();
    WishlistApi::new(routes.clone(), session)
}

/// Wishlist JSON owned by `owner` with the given `(id, name, price)` products.
pub fn wishlist_json(id: &str, owner: &str, products: &[(&str, &str, f64)]) -> String {
    let products: Vec<serde_json::Value> = products
        .iter()
        .map(|(pid, name, price)| {
            serde_json::json!({
                "id": pid,
                "name": name,
                "imageUrl": format!("https://img.example/{pid}.png"),
                "price": price,
                "addedByUsername": "alice",
                "createdAt": "2024-05-01T09:00:00Z",
                "lastEditedAt": "2024-05-01T09:00:00Z"
            })
        })
        .collect();
    serde_json::json!({
        "id": id,
        "title": "Birthday",
        "description": "",
        "ownerId": owner,
        "ownerUsername": "someone",
        "collaboratorIds": [],
        "products": products
    })
    .to_string()
}

pub fn form(name: &str, price: &str) -> ProductForm {
    ProductForm::new(name, "https://img.example/x.png", price)
}
