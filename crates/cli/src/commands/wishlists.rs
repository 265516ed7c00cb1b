//! Wishlist and product commands.

use wishlist_client::controllers::{
    ActionKind, ActionOutcome, Feedback, LoadPhase, WishlistController, WishlistView,
};
use wishlist_client::routes::Route;
use wishlist_core::{ProductForm, ProductId, Wishlist, WishlistId};

use super::{App, CliError, settle};

/// Fields to change on `edit-product`; `None` keeps the current value.
pub struct ProductChanges {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<String>,
}

impl App {
    pub async fn list(&self) -> Result<(), CliError> {
        self.open(&Route::Dashboard)?;
        let dashboard = self.state.wishlists_controller();
        settle(dashboard.refresh().await)?;

        let view = dashboard.snapshot().await;
        if view.wishlists().is_empty() {
            println!("No wishlists yet. Create one with `wishlist create <title>`.");
            return Ok(());
        }
        for wishlist in view.wishlists() {
            let owner = if view.can_delete(wishlist) {
                "you".to_string()
            } else {
                wishlist.owner_username.clone()
            };
            println!(
                "[{}] {} ({} products, owner: {owner})",
                wishlist.id,
                wishlist.title,
                wishlist.products.len()
            );
        }
        Ok(())
    }

    pub async fn create(&self, title: &str, description: &str) -> Result<(), CliError> {
        self.open(&Route::Dashboard)?;
        let dashboard = self.state.wishlists_controller();
        settle(dashboard.create(title, description).await)?;

        let view = dashboard.snapshot().await;
        if let Some(created) = view.wishlists().iter().rev().find(|w| w.title == title) {
            println!("Created wishlist [{}] {}.", created.id, created.title);
        } else {
            println!("Created wishlist {title}.");
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CliError> {
        self.open(&Route::Dashboard)?;
        let dashboard = self.state.wishlists_controller();
        settle(dashboard.refresh().await)?;

        let outcome = dashboard.delete(&WishlistId::new(id), &self.console).await;
        let deleted = outcome == ActionOutcome::Applied;
        settle(outcome)?;
        if deleted {
            println!("Wishlist deleted.");
        }
        Ok(())
    }

    pub async fn show(&self, id: &str) -> Result<(), CliError> {
        let controller = self.load(id).await?;
        print_wishlist(&controller.snapshot().await);
        Ok(())
    }

    pub async fn add_product(
        &self,
        id: &str,
        name: &str,
        image_url: &str,
        price: &str,
    ) -> Result<(), CliError> {
        let controller = self.load(id).await?;
        let form = ProductForm::new(name, image_url, price);
        settle(controller.add_product(&form).await)?;
        print_wishlist(&controller.snapshot().await);
        Ok(())
    }

    pub async fn edit_product(
        &self,
        id: &str,
        product_id: &str,
        changes: ProductChanges,
    ) -> Result<(), CliError> {
        let controller = self.load(id).await?;
        let product_id = ProductId::new(product_id);

        let mut form = {
            let view = controller.snapshot().await;
            let product = view
                .wishlist()
                .and_then(|w| w.product(&product_id))
                .ok_or_else(|| CliError::Action(format!("No product {product_id} in this wishlist.")))?;
            ProductForm::from_product(product)
        };
        if let Some(name) = changes.name {
            form.name = name;
        }
        if let Some(image_url) = changes.image_url {
            form.image_url = image_url;
        }
        if let Some(price) = changes.price {
            form.price = price;
        }

        settle(controller.update_product(&product_id, &form).await)?;
        print_wishlist(&controller.snapshot().await);
        Ok(())
    }

    pub async fn remove_product(&self, id: &str, product_id: &str) -> Result<(), CliError> {
        let controller = self.load(id).await?;
        let outcome = controller
            .remove_product(&ProductId::new(product_id), &self.console)
            .await;
        let removed = outcome == ActionOutcome::Applied;
        settle(outcome)?;
        if removed {
            print_wishlist(&controller.snapshot().await);
        }
        Ok(())
    }

    pub async fn invite(&self, id: &str, email: &str) -> Result<(), CliError> {
        let controller = self.load(id).await?;
        settle(controller.invite(email).await)?;

        let view = controller.snapshot().await;
        if let Some(Feedback::Success(message)) = view.feedback(ActionKind::Invite) {
            println!("{message}");
        }
        Ok(())
    }

    /// Open the wishlist screen for `id` and load it.
    async fn load(&self, id: &str) -> Result<WishlistController, CliError> {
        let id = WishlistId::new(id);
        self.open(&Route::Wishlist(id.clone()))?;

        let controller = self.state.wishlist_controller();
        settle(controller.load(&id).await)?;
        Ok(controller)
    }
}

fn print_wishlist(view: &WishlistView) {
    let wishlist = match &view.phase {
        LoadPhase::Loaded(wishlist) => wishlist,
        LoadPhase::LoadFailed(message) => {
            println!("{message}");
            return;
        }
        LoadPhase::Unloaded | LoadPhase::Loading => return,
    };

    print_header(wishlist);

    if wishlist.products.is_empty() {
        println!("  (no products yet)");
    }
    for product in &wishlist.products {
        let edited = if product.was_edited() { " (edited)" } else { "" };
        println!(
            "  [{}] {}  {}  added by {}{edited}",
            product.id, product.name, product.price, product.added_by_username
        );
        println!("      {}", product.image_url);
    }

    let affordances = &view.affordances;
    let actions: Vec<&str> = [
        (affordances.can_add_product, "add-product"),
        (affordances.can_edit_product, "edit-product"),
        (affordances.can_remove_product, "remove-product"),
        (affordances.can_invite, "invite"),
        (affordances.can_delete_wishlist, "delete"),
    ]
    .into_iter()
    .filter_map(|(allowed, action)| allowed.then_some(action))
    .collect();
    println!();
    println!("You can: {}", actions.join(", "));
}

fn print_header(wishlist: &Wishlist) {
    println!("[{}] {}  (owner: {})", wishlist.id, wishlist.title, wishlist.owner_username);
    if let Some(description) = wishlist.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{description}");
    }
    println!(
        "Collaborators: {}",
        wishlist
            .collaborators_label()
            .unwrap_or_else(|| "none".to_string())
    );
    println!();
}
