//! Route table

use std::fmt;

use super::RouteError;

/// Every page the front end can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Signup,
    Login,
    Dashboard,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Root, Route::Signup, Route::Login, Route::Dashboard];

    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Signup => "/signup",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn title(self) -> Option<&'static str> {
        match self {
            Route::Root => None,
            Route::Signup => Some("Sign Up"),
            Route::Login => Some("Login"),
            Route::Dashboard => Some("Dashboard"),
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Dashboard)
    }

    /// Pages that only make sense without a session
    pub fn is_guest_only(self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }

    /// Static redirect applied before the guard runs
    pub fn redirect(self) -> Option<Route> {
        match self {
            Route::Root => Some(Route::Dashboard),
            _ => None,
        }
    }

    /// Resolve a location such as `/login/?next=x` to its route
    pub fn from_path(location: &str) -> Result<Route, RouteError> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };

        Route::ALL
            .into_iter()
            .find(|route| route.path() == normalized)
            .ok_or_else(|| RouteError::NotFound(location.to_string()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
