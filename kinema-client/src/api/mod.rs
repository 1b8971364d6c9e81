//! Typed REST surfaces of the learning backend

mod auth;
mod content;
mod users;

pub use auth::AuthApi;
pub use content::ContentApi;
pub use users::UsersApi;

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::errors::{ApiError, ApiResult};

/// Turn a non-2xx response into [`ApiError::Status`], keeping the body text
pub(crate) async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ApiError::Status { status, body })
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
) -> ApiResult<T> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ApiError::Decode)
}
