//! Auth and business endpoints

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{
    AuthPayload, Business, BusinessPatch, Envelope, LoginRequest, ProfilePayload, SignupRequest,
};

pub const SIGNUP_PATH: &str = "auth/signup/";
pub const LOGIN_PATH: &str = "auth/login/";
pub const ME_PATH: &str = "auth/me/";
pub const BUSINESS_PATH: &str = "business/";

/// Maps account and business operations onto API calls
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Create an account and its business
    pub async fn signup(&self, data: &SignupRequest) -> Result<AuthPayload, ApiError> {
        let envelope: Envelope<AuthPayload> = self.client.post(SIGNUP_PATH, data).await?;
        Ok(envelope.data)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthPayload, ApiError> {
        let body = LoginRequest { username, password };
        let envelope: Envelope<AuthPayload> = self.client.post(LOGIN_PATH, &body).await?;
        Ok(envelope.data)
    }

    /// Current user and business for the persisted access token
    pub async fn get_me(&self) -> Result<ProfilePayload, ApiError> {
        let envelope: Envelope<ProfilePayload> = self.client.get(ME_PATH).await?;
        Ok(envelope.data)
    }

    pub async fn get_business(&self) -> Result<Business, ApiError> {
        let envelope: Envelope<Business> = self.client.get(BUSINESS_PATH).await?;
        Ok(envelope.data)
    }

    pub async fn update_business(&self, patch: &BusinessPatch) -> Result<Business, ApiError> {
        let envelope: Envelope<Business> = self.client.put(BUSINESS_PATH, patch).await?;
        Ok(envelope.data)
    }
}
