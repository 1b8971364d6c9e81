use kinema_model::{
    LoginRequest, Profile, RefreshRequest, RefreshResponse, RegisterRequest,
    TokenPair,
};
use log::debug;
use reqwest::Client;

use super::{ensure_success, read_json};
use crate::errors::ApiResult;
use crate::routes;

/// Account endpoints. These are called without the gateway: they either
/// need no token or take one explicitly.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: Client,
    base_url: String,
}

impl AuthApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<TokenPair> {
        debug!("[AuthApi] Logging in as {}", email);
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url(routes::auth::LOGIN))
            .json(&body)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> ApiResult<()> {
        debug!("[AuthApi] Registering {}", email);
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            display_name: display_name.to_string(),
        };
        let response = self
            .client
            .post(self.url(routes::auth::REGISTER))
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Any non-2xx status is a failure.
    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshResponse> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response = self
            .client
            .post(self.url(routes::v1::auth::REFRESH))
            .json(&body)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn profile(&self, access_token: &str) -> ApiResult<Profile> {
        let response = self
            .client
            .get(self.url(routes::auth::PROFILE))
            .bearer_auth(access_token)
            .send()
            .await?;
        read_json(response).await
    }
}
