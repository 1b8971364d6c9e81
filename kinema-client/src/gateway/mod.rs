//! Authenticated fetch gateway
//!
//! Every authenticated call goes through [`Gateway::request`]. The access
//! token is read from storage on each call and attached as a bearer token.
//! A 401 triggers at most one refresh followed by one retry:
//!
//! ```text
//! SEND(current) -> status != 401                    -> DONE(response)
//!               -> 401, no refresh token            -> CLEAR -> SessionExpired
//!               -> 401, refresh token -> REFRESH ok -> STORE -> SEND(new) -> DONE(response)
//!                                     -> REFRESH err -> CLEAR -> SessionExpired
//! ```
//!
//! Any status other than the first 401 is handed back untouched.

mod request;

pub use request::{MultipartBody, RequestBody, RequestOptions};

use log::{debug, info, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::api::AuthApi;
use crate::errors::{GatewayError, GatewayResult};
use crate::storage::CredentialStore;

#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    credentials: CredentialStore,
    auth: AuthApi,
}

impl Gateway {
    /// `base_url` must already be normalized (scheme present, no trailing slash)
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        credentials: CredentialStore,
    ) -> Self {
        let base_url = base_url.into();
        let auth = AuthApi::new(client.clone(), base_url.clone());
        Self {
            client,
            base_url,
            credentials,
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    /// Send `options` to `target`, renewing the session once on a 401.
    ///
    /// `target` is either an absolute http(s) URL or a path joined onto the
    /// base URL. Caller headers are kept except `Content-Type` and
    /// `Authorization`, which the gateway always sets itself.
    pub async fn request(
        &self,
        target: &str,
        options: RequestOptions,
    ) -> GatewayResult<Response> {
        let url = self.resolve(target)?;

        let token = self.credentials.access_token()?;
        let response = self.send(&url, &options, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(refresh_token) = self.credentials.refresh_token()? else {
            warn!(
                "[Gateway] {} {} unauthorized and no refresh token stored",
                options.method,
                url.path()
            );
            self.forget_pair();
            return Err(GatewayError::SessionExpired);
        };

        info!("[Gateway] Token expired, attempting refresh");
        let refreshed = match self.auth.refresh(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!("[Gateway] Token refresh failed: {}", e);
                self.forget_pair();
                return Err(GatewayError::SessionExpired);
            }
        };
        self.credentials.store_refreshed(&refreshed)?;

        info!("[Gateway] Token refreshed, retrying {} {}", options.method, url.path());
        self.send(&url, &options, Some(&refreshed.access_token)).await
    }

    /// Drop the stored pair ahead of `SessionExpired`. A storage failure
    /// here is logged and does not change the outcome.
    fn forget_pair(&self) {
        if let Err(e) = self.credentials.clear_pair() {
            warn!("[Gateway] Failed to clear tokens: {}", e);
        }
    }

    fn resolve(&self, target: &str) -> GatewayResult<Url> {
        let raw = if target.starts_with("http://") || target.starts_with("https://")
        {
            target.to_string()
        } else {
            format!("{}/{}", self.base_url, target.trim_start_matches('/'))
        };
        Url::parse(&raw).map_err(|source| GatewayError::InvalidTarget {
            target: target.to_string(),
            source,
        })
    }

    async fn send(
        &self,
        url: &Url,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> GatewayResult<Response> {
        let mut headers = options.headers.clone();
        headers.remove(CONTENT_TYPE);
        headers.remove(AUTHORIZATION);
        // Multipart bodies get their boundary content type from reqwest
        if !options.body.is_multipart() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let builder = self
            .client
            .request(options.method.clone(), url.clone())
            .headers(headers);
        let builder = match &options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes.clone()),
            RequestBody::Multipart(body) => builder.multipart(body.to_form()?),
        };

        debug!(
            "[Gateway] {} {} (authenticated: {})",
            options.method,
            url.path(),
            token.is_some()
        );
        Ok(builder.send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use std::sync::Arc;

    fn gateway() -> Gateway {
        Gateway::new(
            Client::new(),
            "http://localhost:3001",
            CredentialStore::new(Arc::new(MemoryTokenStore::new())),
        )
    }

    #[test]
    fn relative_targets_join_base() {
        let gateway = gateway();
        assert_eq!(
            gateway.resolve("/api/v1/content/topics").unwrap().as_str(),
            "http://localhost:3001/api/v1/content/topics"
        );
        assert_eq!(
            gateway.resolve("api/v1/users").unwrap().as_str(),
            "http://localhost:3001/api/v1/users"
        );
    }

    #[test]
    fn absolute_targets_are_kept() {
        let gateway = gateway();
        assert_eq!(
            gateway.resolve("https://cdn.example.com/a.png").unwrap().as_str(),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn unparsable_target_is_reported() {
        let gateway = Gateway::new(
            Client::new(),
            "http://[bad",
            CredentialStore::new(Arc::new(MemoryTokenStore::new())),
        );
        assert!(matches!(
            gateway.resolve("/x"),
            Err(GatewayError::InvalidTarget { .. })
        ));
    }
}
