//! Request and response bodies specific to the API.
//!
//! Domain records (`Wishlist`, `Product`, `Identity`) live in `wishlist-core`;
//! only envelope types that never leave the client are defined here.

use serde::{Deserialize, Serialize};
use wishlist_core::{Email, Identity, UserId};

/// Body of a successful `POST /auth/login`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    pub email: Email,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl LoginResponse {
    /// Split into the bearer token and the identity it belongs to.
    #[must_use]
    pub fn into_parts(self) -> (String, Identity) {
        (
            self.token,
            Identity {
                id: self.user_id,
                username: self.username,
                email: self.email,
            },
        )
    }
}

/// Body of a successful invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteReceipt {
    /// Human-readable result, shown as-is.
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_wire_format() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"token":"T","userId":1,"username":"alice","email":"a@x.com"}"#,
        )
        .unwrap();
        let (token, identity) = response.into_parts();
        assert_eq!(token, "T");
        assert_eq!(identity.id, UserId::new("1"));
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.email.as_str(), "a@x.com");
    }

    #[test]
    fn test_invite_receipt_tolerates_missing_message() {
        let receipt: InviteReceipt = serde_json::from_str("{}").unwrap();
        assert!(receipt.message.is_empty());
    }
}
