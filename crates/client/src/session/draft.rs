//! Login and sign-up form input.

use secrecy::{ExposeSecret, SecretString};
use wishlist_core::{Email, ValidationError};

/// Validated login form.
pub struct LoginDraft {
    email_or_username: String,
    password: SecretString,
}

impl std::fmt::Debug for LoginDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginDraft")
            .field("email_or_username", &self.email_or_username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginDraft {
    /// Both fields are required. The identifier is trimmed; the password is
    /// sent exactly as typed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingCredentials`] if either is blank.
    pub fn new(email_or_username: &str, password: SecretString) -> Result<Self, ValidationError> {
        let email_or_username = email_or_username.trim();
        if email_or_username.is_empty() || password.expose_secret().is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(Self {
            email_or_username: email_or_username.to_owned(),
            password,
        })
    }

    #[must_use]
    pub fn email_or_username(&self) -> &str {
        &self.email_or_username
    }

    /// `{emailOrUsername, password}` request body.
    pub(crate) fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "emailOrUsername": self.email_or_username,
            "password": self.password.expose_secret(),
        })
    }
}

/// Validated sign-up form.
pub struct SignupDraft {
    username: String,
    email: Email,
    password: SecretString,
}

impl std::fmt::Debug for SignupDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupDraft")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SignupDraft {
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingSignupField`] if any field is blank
    /// and [`ValidationError::InvalidEmail`] for a malformed address.
    pub fn new(username: &str, email: &str, password: SecretString) -> Result<Self, ValidationError> {
        let username = username.trim();
        if username.is_empty() || email.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(ValidationError::MissingSignupField);
        }
        let email = Email::parse(email).map_err(ValidationError::InvalidEmail)?;
        Ok(Self {
            username: username.to_owned(),
            email,
            password,
        })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// `{username, email, passwordHash}` request body. The server hashes the
    /// field itself despite its name.
    pub(crate) fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "username": self.username,
            "email": self.email.as_str(),
            "passwordHash": self.password.expose_secret(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pw(s: &str) -> SecretString {
        SecretString::from(s)
    }

    #[test]
    fn test_login_draft_requires_both_fields() {
        assert!(matches!(
            LoginDraft::new("  ", pw("p")),
            Err(ValidationError::MissingCredentials)
        ));
        assert!(matches!(
            LoginDraft::new("alice", pw("")),
            Err(ValidationError::MissingCredentials)
        ));
    }

    #[test]
    fn test_login_body() {
        let draft = LoginDraft::new(" a@x.com ", pw("p")).unwrap();
        assert_eq!(
            draft.to_body(),
            serde_json::json!({"emailOrUsername": "a@x.com", "password": "p"})
        );
        assert!(!format!("{draft:?}").contains("\"p\""));
    }

    #[test]
    fn test_signup_draft() {
        assert!(matches!(
            SignupDraft::new("alice", "", pw("p")),
            Err(ValidationError::MissingSignupField)
        ));
        assert!(matches!(
            SignupDraft::new("alice", "nope", pw("p")),
            Err(ValidationError::InvalidEmail(_))
        ));

        let draft = SignupDraft::new("alice", "a@x.com", pw("hunter2")).unwrap();
        assert_eq!(
            draft.to_body(),
            serde_json::json!({"username": "alice", "email": "a@x.com", "passwordHash": "hunter2"})
        );
        assert!(!format!("{draft:?}").contains("hunter2"));
    }
}
