use kinema_model::User;

use super::read_json;
use crate::errors::ApiResult;
use crate::gateway::{Gateway, RequestOptions};
use crate::routes::v1;

/// Admin user listing
#[derive(Debug, Clone)]
pub struct UsersApi {
    gateway: Gateway,
}

impl UsersApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn users(&self) -> ApiResult<Vec<User>> {
        let response = self
            .gateway
            .request(v1::users::COLLECTION, RequestOptions::get())
            .await?;
        read_json(response).await
    }
}
