//! Resource gateway for the wishlist API.
//!
//! [`WishlistApi`] is a typed façade over the HTTP endpoints. It takes the
//! credential from the [`SessionStore`] it was built with, so callers never
//! pass tokens around. Each operation is exactly one request: no retries, no
//! caching.

mod transport;
mod types;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use wishlist_core::{InviteDraft, ProductDraft, ProductId, Wishlist, WishlistDraft, WishlistId};

pub use transport::{
    ApiRequest, ApiResponse, Method, ReqwestTransport, StatusCode, Transport, TransportError,
};
pub use types::{InviteReceipt, LoginResponse};

use crate::error::ClientError;
use crate::session::SessionStore;

struct ApiInner {
    transport: Arc<dyn Transport>,
    session: SessionStore,
}

/// Authenticated client for wishlists, products and invitations.
#[derive(Clone)]
pub struct WishlistApi {
    inner: Arc<ApiInner>,
}

impl std::fmt::Debug for WishlistApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistApi").finish_non_exhaustive()
    }
}

impl WishlistApi {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self {
            inner: Arc::new(ApiInner { transport, session }),
        }
    }

    /// The session this gateway takes its credential from.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Send `request` with the installed credential attached.
    ///
    /// Without a credential nothing is sent. A 401 purges the session before
    /// the error is returned, so no later call can reuse the rejected token.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let Some(token) = self.inner.session.credential().await else {
            return Err(ClientError::Auth("Not logged in".to_string()));
        };

        let response = self
            .inner
            .transport
            .send(request.with_bearer(token.clone()))
            .await?;

        match response.error_for_status() {
            Ok(response) => Ok(response),
            Err(err) => {
                if err.is_auth() {
                    self.inner.session.invalidate(&token).await;
                }
                Err(err)
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        self.send(request).await?.json()
    }

    // =========================================================================
    // Wishlists
    // =========================================================================

    /// All wishlists the user owns or collaborates on.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn list_wishlists(&self) -> Result<Vec<Wishlist>, ClientError> {
        let wishlists: Vec<Wishlist> = self.send_json(ApiRequest::get("/wishlists")).await?;
        debug!(count = wishlists.len(), "Fetched wishlists");
        Ok(wishlists)
    }

    /// One wishlist with its products.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFoundOrForbidden`] if it does not exist or
    /// the user has no access.
    #[instrument(skip(self), fields(wishlist_id = %id))]
    pub async fn get_wishlist(&self, id: &WishlistId) -> Result<Wishlist, ClientError> {
        self.send_json(ApiRequest::get(wishlist_path(id)))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    #[instrument(skip(self, draft), fields(title = %draft.title()))]
    pub async fn create_wishlist(&self, draft: &WishlistDraft) -> Result<Wishlist, ClientError> {
        self.send_json(ApiRequest::post("/wishlists").with_json(draft)?)
            .await
    }

    /// Change a wishlist's title and description.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    #[instrument(skip(self, draft), fields(wishlist_id = %id))]
    pub async fn update_wishlist(
        &self,
        id: &WishlistId,
        draft: &WishlistDraft,
    ) -> Result<Wishlist, ClientError> {
        self.send_json(ApiRequest::put(wishlist_path(id)).with_json(draft)?)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails; a non-owner usually gets
    /// [`ClientError::NotFoundOrForbidden`].
    #[instrument(skip(self), fields(wishlist_id = %id))]
    pub async fn delete_wishlist(&self, id: &WishlistId) -> Result<(), ClientError> {
        self.send(ApiRequest::delete(wishlist_path(id)))
            .await?;
        Ok(())
    }

    /// Invite someone by email. The wishlist itself is not returned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    #[instrument(skip(self, draft), fields(wishlist_id = %id))]
    pub async fn invite(
        &self,
        id: &WishlistId,
        draft: &InviteDraft,
    ) -> Result<InviteReceipt, ClientError> {
        let response = self
            .send(ApiRequest::post(format!("{}/invite", wishlist_path(id))).with_json(draft)?)
            .await?;

        // Some servers answer with an empty body.
        if response.body.trim().is_empty() {
            return Ok(InviteReceipt {
                message: String::new(),
            });
        }
        response.json()
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Add a product; returns the whole updated wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    #[instrument(skip(self, draft), fields(wishlist_id = %id))]
    pub async fn add_product(
        &self,
        id: &WishlistId,
        draft: &ProductDraft,
    ) -> Result<Wishlist, ClientError> {
        self.send_json(ApiRequest::post(format!("{}/products", wishlist_path(id))).with_json(draft)?)
            .await
    }

    /// Replace a product's fields; returns the whole updated wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    #[instrument(skip(self, draft), fields(wishlist_id = %id, product_id = %product_id))]
    pub async fn update_product(
        &self,
        id: &WishlistId,
        product_id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Wishlist, ClientError> {
        self.send_json(
            ApiRequest::put(product_path(id, product_id)).with_json(draft)?,
        )
        .await
    }

    /// Remove a product; returns the whole updated wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    #[instrument(skip(self), fields(wishlist_id = %id, product_id = %product_id))]
    pub async fn remove_product(
        &self,
        id: &WishlistId,
        product_id: &ProductId,
    ) -> Result<Wishlist, ClientError> {
        self.send_json(ApiRequest::delete(product_path(id, product_id)))
        .await
    }
}

/// `/wishlists/{id}`, with the id escaped as a single path segment.
fn wishlist_path(id: &WishlistId) -> String {
    format!("/wishlists/{}", urlencoding::encode(id.as_str()))
}

fn product_path(id: &WishlistId, product_id: &ProductId) -> String {
    format!(
        "{}/products/{}",
        wishlist_path(id),
        urlencoding::encode(product_id.as_str())
    )
}
