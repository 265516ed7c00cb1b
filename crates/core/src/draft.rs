//! Validated user input.
//!
//! Drafts are built from raw form fields before any request is made. A
//! failed draft never reaches the network; a successful one is exactly what
//! gets sent. The server still has the final say on every field.

use serde::Serialize;

use crate::types::{Email, EmailError, Price, PriceError, Product};

/// Local, pre-flight validation failure.
///
/// The `Display` text is the message shown next to the form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name, image URL or price left blank.
    #[error("All product fields are required.")]
    MissingProductField,

    /// Price is not a number greater than zero.
    #[error("Price must be a positive number.")]
    InvalidPrice(#[source] PriceError),

    /// Wishlist title left blank.
    #[error("Wishlist title cannot be empty.")]
    EmptyTitle,

    /// Invite submitted without an address.
    #[error("Please enter an email to invite.")]
    EmptyInviteEmail,

    /// Address is not a valid email.
    #[error("Please enter a valid email address.")]
    InvalidEmail(#[source] EmailError),

    /// Login submitted without identifier or password.
    #[error("Please enter your email or username and password.")]
    MissingCredentials,

    /// Sign-up submitted with a blank field.
    #[error("Username, email and password are all required.")]
    MissingSignupField,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Product fields ready to be sent to the server.
///
/// Serializes to the `{name, imageUrl, price}` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    name: String,
    image_url: String,
    price: Price,
}

impl ProductDraft {
    /// Validate raw product form fields.
    ///
    /// All three fields are required; the price must parse as a number
    /// strictly greater than zero. Name and image URL are sent as typed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingProductField`] or
    /// [`ValidationError::InvalidPrice`].
    pub fn new(name: &str, image_url: &str, price: &str) -> Result<Self, ValidationError> {
        if is_blank(name) || is_blank(image_url) || is_blank(price) {
            return Err(ValidationError::MissingProductField);
        }

        let price = Price::parse(price).map_err(ValidationError::InvalidPrice)?;

        Ok(Self {
            name: name.to_owned(),
            image_url: image_url.to_owned(),
            price,
        })
    }

    /// Product name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image URL.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Validated price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Whether a product returned by the server carries exactly these fields.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        product.name == self.name && product.image_url == self.image_url && product.price == self.price
    }
}

/// Raw product form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub image_url: String,
    pub price: String,
}

impl ProductForm {
    /// Build a form from raw field values.
    #[must_use]
    pub fn new(name: impl Into<String>, image_url: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
            price: price.into(),
        }
    }

    /// Pre-fill an edit form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            price: product.price.amount().normalize().to_string(),
        }
    }

    /// Validate into a [`ProductDraft`].
    ///
    /// # Errors
    ///
    /// See [`ProductDraft::new`].
    pub fn validate(&self) -> Result<ProductDraft, ValidationError> {
        ProductDraft::new(&self.name, &self.image_url, &self.price)
    }
}

/// Wishlist fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistDraft {
    title: String,
    description: String,
}

impl WishlistDraft {
    /// Validate wishlist form fields. Only the title is required.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTitle`] if the title is blank.
    pub fn new(title: &str, description: &str) -> Result<Self, ValidationError> {
        if is_blank(title) {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
        })
    }

    /// Title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// An invitation request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteDraft {
    email: Email,
}

impl InviteDraft {
    /// Validate the address to invite.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyInviteEmail`] for blank input and
    /// [`ValidationError::InvalidEmail`] for a malformed address.
    pub fn new(email: &str) -> Result<Self, ValidationError> {
        if is_blank(email) {
            return Err(ValidationError::EmptyInviteEmail);
        }
        let email = Email::parse(email).map_err(ValidationError::InvalidEmail)?;
        Ok(Self { email })
    }

    /// The address being invited.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }
}
