//! Client-side navigation with an authentication guard
//!
//! The first guarded navigation after start-up restores the persisted
//! session (at most once) before the guard predicate runs, so a reload
//! with a valid token never bounces through `/login`.

pub mod guard;
pub mod routes;

pub use guard::GuardDecision;
pub use routes::Route;

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::store::AuthStore;

/// Upper bound on guard redirects for a single navigation
pub const MAX_REDIRECTS: usize = 8;

/// Result of a completed navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// Route resolved from the requested location
    pub requested: Route,
    /// Route actually shown after redirects
    pub route: Route,
}

impl Navigation {
    pub fn redirected(&self) -> bool {
        self.requested != self.route
    }
}

/// Router errors
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("No route matches {0}")]
    NotFound(String),

    #[error("Too many redirects while navigating to {0}")]
    RedirectLoop(String),
}

pub struct Router {
    auth: Arc<AuthStore>,
    /// Outcome of the one-shot session restoration
    restored: OnceCell<bool>,
    current: RwLock<Option<Route>>,
}

impl Router {
    pub fn new(auth: Arc<AuthStore>) -> Self {
        Self {
            auth,
            restored: OnceCell::new(),
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<Route> {
        *self.current.read()
    }

    /// Whether session restoration has been attempted
    pub fn restoration_attempted(&self) -> bool {
        self.restored.initialized()
    }

    /// Navigate to `location`, running static redirects and the guard
    pub async fn navigate(&self, location: &str) -> Result<Navigation, RouteError> {
        let requested = Route::from_path(location)?;
        self.ensure_session_restored().await;

        let mut target = requested;
        for _ in 0..MAX_REDIRECTS {
            if let Some(next) = target.redirect() {
                target = next;
                continue;
            }

            match guard::evaluate(target, self.auth.is_authenticated()) {
                GuardDecision::Proceed => {
                    *self.current.write() = Some(target);
                    debug!(from = %requested, to = %target, "Navigation complete");
                    return Ok(Navigation {
                        requested,
                        route: target,
                    });
                }
                GuardDecision::Redirect(next) => {
                    debug!(from = %target, to = %next, "Guard redirect");
                    target = next;
                }
            }
        }

        Err(RouteError::RedirectLoop(location.to_string()))
    }

    /// Hard redirect to the login page, bypassing the guard
    pub fn force_login(&self) {
        info!("Session invalidated, redirecting to {}", Route::Login);
        *self.current.write() = Some(Route::Login);
    }

    async fn ensure_session_restored(&self) {
        if self.restored.initialized() || self.auth.is_authenticated() {
            return;
        }
        if !self.auth.has_persisted_token() {
            return;
        }

        let restored = self
            .restored
            .get_or_init(|| async { self.auth.restore_session().await })
            .await;
        debug!(restored = *restored, "Session restoration finished");
    }
}
