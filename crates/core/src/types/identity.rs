//! Authenticated identity.

use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// The user record held client-side once a credential has been validated.
///
/// Replaced wholesale on re-authentication and dropped on logout; never
/// edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Server-assigned user ID.
    #[serde(alias = "userId")]
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Account email address.
    pub email: Email,
}
