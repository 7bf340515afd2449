//! Authoritative business profile state

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::api::types::{Business, BusinessPatch};
use crate::api::{ApiError, AuthApi};

#[derive(Debug, Clone, Default)]
pub struct BusinessState {
    pub business: Option<Business>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Business store operations.
///
/// Independent of the copy held by the auth store: updates here are not
/// pushed back into the session snapshot.
pub struct BusinessStore {
    api: AuthApi,
    state: RwLock<BusinessState>,
}

impl BusinessStore {
    pub fn new(api: AuthApi) -> Self {
        Self {
            api,
            state: RwLock::new(BusinessState::default()),
        }
    }

    pub fn snapshot(&self) -> BusinessState {
        self.state.read().clone()
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

    /// Seed the store with an already known business
    pub fn set_business(&self, business: Option<Business>) {
        self.state.write().business = business;
    }

    pub fn reset(&self) {
        *self.state.write() = BusinessState::default();
    }

    pub async fn fetch_business(&self) -> Result<Business, ApiError> {
        self.begin();
        let result = self.api.get_business().await;
        self.finish("Fetch business", result)
    }

    pub async fn update_business(&self, patch: &BusinessPatch) -> Result<Business, ApiError> {
        self.begin();
        let result = self.api.update_business(patch).await;
        self.finish("Update business", result)
    }

    fn begin(&self) {
        let mut state = self.state.write();
        state.loading = true;
        state.error = None;
    }

    fn finish(
        &self,
        action: &'static str,
        result: Result<Business, ApiError>,
    ) -> Result<Business, ApiError> {
        let mut state = self.state.write();
        state.loading = false;

        match result {
            Ok(business) => {
                info!(business_id = business.id, "{} succeeded", action);
                state.business = Some(business.clone());
                Ok(business)
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %message, "{} failed", action);
                state.error = Some(message);
                Err(e)
            }
        }
    }
}
