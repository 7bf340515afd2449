//! Session state: current user, business snapshot and auth lifecycle

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::api::types::{AuthPayload, Business, SignupRequest, User};
use crate::api::{ApiError, AuthApi};
use crate::storage::TokenStorage;

/// Where the session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    Restoring,
}

/// Snapshot of the auth store
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub phase: AuthPhase,
    pub user: Option<User>,
    /// Business as of the last login/restore; may lag the business store
    pub business: Option<Business>,
    pub loading: bool,
    /// Last classified error message, cleared when a new attempt starts
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn settled_phase(&self) -> AuthPhase {
        if self.user.is_some() {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Anonymous
        }
    }
}

/// Auth store operations
pub struct AuthStore {
    api: AuthApi,
    state: RwLock<AuthState>,
}

impl AuthStore {
    pub fn new(api: AuthApi) -> Self {
        Self {
            api,
            state: RwLock::new(AuthState::default()),
        }
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn phase(&self) -> AuthPhase {
        self.state.read().phase
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn business(&self) -> Option<Business> {
        self.state.read().business.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// True iff a user is loaded; a persisted token alone does not count
    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    pub fn has_persisted_token(&self) -> bool {
        self.api.client().storage().access_token().is_some()
    }

    /// Create an account and start a session for it
    pub async fn signup(&self, data: &SignupRequest) -> Result<AuthPayload, ApiError> {
        self.begin(AuthPhase::Authenticating);
        let result = self.api.signup(data).await;
        self.finish_authentication("Signup", result)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthPayload, ApiError> {
        self.begin(AuthPhase::Authenticating);
        let result = self.api.login(username, password).await;
        self.finish_authentication("Login", result)
    }

    /// Drop the session locally. There is no server-side revocation.
    pub fn logout(&self) {
        if let Err(e) = self.api.client().storage().clear() {
            warn!(error = %e, "Failed to clear persisted tokens");
        }
        self.clear_session();
        info!("Logged out");
    }

    /// Forget the in-memory session without touching storage
    pub fn clear_session(&self) {
        let mut state = self.state.write();
        state.user = None;
        state.business = None;
        state.loading = false;
        state.phase = AuthPhase::Anonymous;
    }

    /// Rebuild user/business from the persisted access token.
    ///
    /// Returns false without a network call when no token is persisted.
    /// A rejected token is removed from storage.
    pub async fn restore_session(&self) -> bool {
        let storage = self.api.client().storage().clone();
        if storage.access_token().is_none() {
            return false;
        }

        {
            let mut state = self.state.write();
            state.phase = AuthPhase::Restoring;
            state.loading = true;
        }

        match self.api.get_me().await {
            Ok(profile) => {
                info!(user = %profile.user.username, "Session restored");
                let mut state = self.state.write();
                state.user = Some(profile.user);
                state.business = profile.business;
                state.phase = AuthPhase::Authenticated;
                state.loading = false;
                true
            }
            Err(e) => {
                warn!(error = %e, "Session restore failed");
                if let Err(e) = storage.clear() {
                    warn!(error = %e, "Failed to clear persisted tokens");
                }
                self.clear_session();
                false
            }
        }
    }

    fn begin(&self, phase: AuthPhase) {
        let mut state = self.state.write();
        state.phase = phase;
        state.loading = true;
        state.error = None;
    }

    fn finish_authentication(
        &self,
        action: &'static str,
        result: Result<AuthPayload, ApiError>,
    ) -> Result<AuthPayload, ApiError> {
        let result = result.and_then(|payload| {
            let storage = self.api.client().storage();
            if let Err(e) = storage.store_pair(&payload.tokens) {
                // A half-written pair would be picked up by the next restore
                if let Err(e) = storage.clear() {
                    warn!(error = %e, "Failed to roll back persisted tokens");
                }
                return Err(e.into());
            }
            Ok(payload)
        });

        let mut state = self.state.write();
        state.loading = false;

        match result {
            Ok(payload) => {
                info!(user = %payload.user.username, "{} succeeded", action);
                state.user = Some(payload.user.clone());
                state.business = payload.business.clone();
                state.phase = AuthPhase::Authenticated;
                Ok(payload)
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %message, "{} failed", action);
                state.error = Some(message);
                let settled = state.settled_phase();
                state.phase = settled;
                Err(e)
            }
        }
    }
}
