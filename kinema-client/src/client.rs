use std::sync::Arc;

use crate::api::{AuthApi, ContentApi, UsersApi};
use crate::config::ClientConfig;
use crate::errors::{ClientError, StorageError};
use crate::gateway::Gateway;
use crate::http::build_http_client;
use crate::session::Session;
use crate::storage::{CredentialStore, EncryptedFileTokenStore, TokenStore};

/// Everything a front end needs, wired to one token store and one HTTP client
#[derive(Debug, Clone)]
pub struct KinemaClient {
    config: ClientConfig,
    gateway: Gateway,
    session: Session,
    content: ContentApi,
    users: UsersApi,
}

impl KinemaClient {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        let http = build_http_client(&config)?;
        let credentials = CredentialStore::new(store);
        let gateway = Gateway::new(http, config.server_url.clone(), credentials.clone());
        let session = Session::new(credentials, gateway.auth().clone());
        Ok(Self {
            content: ContentApi::new(gateway.clone()),
            users: UsersApi::new(gateway.clone()),
            config,
            gateway,
            session,
        })
    }

    /// Build a client backed by the encrypted on-disk token store
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let path = config
            .resolved_token_store_path()
            .ok_or(StorageError::NoDataDir)?;
        log::debug!("[KinemaClient] Using token store at {:?}", path);
        let store = Arc::new(EncryptedFileTokenStore::new(path));
        Self::new(config, store)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn auth(&self) -> &AuthApi {
        self.gateway.auth()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn content(&self) -> &ContentApi {
        &self.content
    }

    pub fn users(&self) -> &UsersApi {
        &self.users
    }
}
