//! Persistent token storage
//!
//! Tokens live in a small synchronous key/value store with no expiry. The
//! gateway reads it on every call, so whatever was written last is what the
//! next request carries.

mod encrypted;
mod memory;

pub use encrypted::EncryptedFileTokenStore;
pub use memory::MemoryTokenStore;

use std::fmt::Debug;
use std::sync::Arc;

use kinema_model::{RefreshResponse, TokenPair};

use crate::errors::StorageResult;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Synchronous string key/value store
pub trait TokenStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Apply a batch of writes (`Some`) and removals (`None`).
    ///
    /// Stores that can commit a batch in one step should override this.
    fn apply(&self, changes: &[(&str, Option<&str>)]) -> StorageResult<()> {
        for (key, value) in changes {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }
}

/// Credential-pair view over a [`TokenStore`].
///
/// All writes go through here so access and refresh tokens are stored and
/// removed together.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    inner: Arc<dyn TokenStore>,
}

impl CredentialStore {
    pub fn new(inner: Arc<dyn TokenStore>) -> Self {
        Self { inner }
    }

    pub fn access_token(&self) -> StorageResult<Option<String>> {
        self.inner.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> StorageResult<Option<String>> {
        self.inner.get(REFRESH_TOKEN_KEY)
    }

    /// Both tokens, only when both are present
    pub fn load_pair(&self) -> StorageResult<Option<TokenPair>> {
        match (self.access_token()?, self.refresh_token()?) {
            (Some(access), Some(refresh)) => {
                Ok(Some(TokenPair::new(access, refresh)))
            }
            _ => Ok(None),
        }
    }

    /// Persist a freshly issued pair (login, registration, session restore)
    pub fn store_pair(&self, pair: &TokenPair) -> StorageResult<()> {
        self.inner.apply(&[
            (ACCESS_TOKEN_KEY, Some(pair.access_token.as_str())),
            (REFRESH_TOKEN_KEY, Some(pair.refresh_token.as_str())),
        ])
    }

    /// Persist the result of a refresh. The refresh token is only replaced
    /// when the server rotated it.
    pub fn store_refreshed(&self, refreshed: &RefreshResponse) -> StorageResult<()> {
        match refreshed.refresh_token.as_deref() {
            Some(rotated) => self.inner.apply(&[
                (ACCESS_TOKEN_KEY, Some(refreshed.access_token.as_str())),
                (REFRESH_TOKEN_KEY, Some(rotated)),
            ]),
            None => self
                .inner
                .set(ACCESS_TOKEN_KEY, refreshed.access_token.as_str()),
        }
    }

    pub fn clear_pair(&self) -> StorageResult<()> {
        self.inner
            .apply(&[(ACCESS_TOKEN_KEY, None), (REFRESH_TOKEN_KEY, None)])
    }

    pub fn inner(&self) -> &Arc<dyn TokenStore> {
        &self.inner
    }
}
