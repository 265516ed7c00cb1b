//! Route table and authentication gate.
//!
//! Routes are plain values. Controllers return them as navigation commands
//! and the front-end decides how to show them.

use std::fmt;

use wishlist_core::WishlistId;

use crate::session::SessionStatus;

/// A screen the front-end can show.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Wishlist(WishlistId),
    NotFound,
}

/// What to do for a requested path given the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Show this route.
    Render(Route),
    /// Go to this route instead.
    Redirect(Route),
    /// Session validation is still running; show a loading indicator.
    Loading,
}

impl Route {
    /// Match a path. Trailing slashes are ignored; anything unknown is
    /// [`Route::NotFound`].
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["dashboard"] => Self::Dashboard,
            ["login"] => Self::Login,
            ["wishlist", id] => Self::Wishlist(WishlistId::new(*id)),
            _ => Self::NotFound,
        }
    }

    /// Canonical path.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Wishlist(id) => format!("/wishlist/{id}"),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Whether the route needs an authenticated session.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        matches!(self, Self::Dashboard | Self::Wishlist(_))
    }

    /// Decide what to show for `path`.
    ///
    /// `/` always redirects to the dashboard. Private routes wait while the
    /// session is pending and send anyone unauthenticated to the login page.
    #[must_use]
    pub fn resolve(path: &str, session: &SessionStatus) -> RouteDecision {
        let route = Self::parse(path);

        if path.trim_matches('/').is_empty() {
            return RouteDecision::Redirect(route);
        }

        if !route.is_private() {
            return RouteDecision::Render(route);
        }

        match session {
            SessionStatus::Pending => RouteDecision::Loading,
            SessionStatus::Unauthenticated => RouteDecision::Redirect(Self::Login),
            SessionStatus::Authenticated(_) => RouteDecision::Render(route),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wishlist_core::{Email, Identity, UserId};

    use super::*;

    fn signed_in() -> SessionStatus {
        SessionStatus::Authenticated(Identity {
            id: UserId::new("1"),
            username: "alice".to_string(),
            email: Email::parse("a@x.com").unwrap(),
        })
    }

    #[test]
    fn test_parse() {
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(
            Route::parse("/wishlist/42?tab=products"),
            Route::Wishlist(WishlistId::new("42"))
        );
        assert_eq!(Route::parse("/wishlist"), Route::NotFound);
        assert_eq!(Route::parse("/settings"), Route::NotFound);
    }

    #[test]
    fn test_path_round_trips() {
        for route in [
            Route::Login,
            Route::Dashboard,
            Route::Wishlist(WishlistId::new("42")),
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_root_redirects_to_dashboard() {
        assert_eq!(
            Route::resolve("/", &SessionStatus::Pending),
            RouteDecision::Redirect(Route::Dashboard)
        );
    }

    #[test]
    fn test_private_routes_wait_for_session() {
        assert_eq!(
            Route::resolve("/wishlist/7", &SessionStatus::Pending),
            RouteDecision::Loading
        );
        assert_eq!(
            Route::resolve("/dashboard", &SessionStatus::Unauthenticated),
            RouteDecision::Redirect(Route::Login)
        );
        assert_eq!(
            Route::resolve("/dashboard", &signed_in()),
            RouteDecision::Render(Route::Dashboard)
        );
    }

    #[test]
    fn test_public_routes_render_immediately() {
        assert_eq!(
            Route::resolve("/login", &SessionStatus::Pending),
            RouteDecision::Render(Route::Login)
        );
        assert_eq!(
            Route::resolve("/nope", &SessionStatus::Unauthenticated),
            RouteDecision::Render(Route::NotFound)
        );
    }
}
