//! Session context
//!
//! [`Session`] owns the client's belief about who is logged in. State is
//! published through a `watch` channel so front ends can react to changes,
//! including the forced logout that follows a gateway `SessionExpired`.

use std::sync::Arc;

use kinema_model::{Profile, TokenPair};
use log::{info, warn};
use tokio::sync::watch;

use crate::api::AuthApi;
use crate::errors::{ApiResult, SessionError, SessionResult};
use crate::storage::CredentialStore;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing has been restored yet
    #[default]
    Init,
    Loading,
    Authenticated(Profile),
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SessionState::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    sender: Arc<watch::Sender<SessionState>>,
    receiver: watch::Receiver<SessionState>,
    credentials: CredentialStore,
    auth: AuthApi,
}

impl Session {
    pub fn new(credentials: CredentialStore, auth: AuthApi) -> Self {
        let (sender, receiver) = watch::channel(SessionState::Init);
        Self {
            sender: Arc::new(sender),
            receiver,
            credentials,
            auth,
        }
    }

    pub fn state(&self) -> SessionState {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.receiver.clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.receiver.borrow().profile().cloned()
    }

    pub fn is_admin(&self) -> bool {
        self.receiver
            .borrow()
            .profile()
            .is_some_and(|profile| profile.role.is_admin())
    }

    fn set(&self, state: SessionState) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(state);
    }

    /// Restore the session from stored tokens.
    ///
    /// Any failure to reach an authenticated state ends in a logout, so
    /// stale tokens never outlive a failed restore.
    pub async fn init(&self) -> SessionResult<SessionState> {
        self.set(SessionState::Loading);

        let access_token = self.credentials.access_token()?;
        let refresh_token = self.credentials.refresh_token()?;

        let restored = match (access_token, refresh_token) {
            (None, None) => {
                info!("[Session] No stored tokens");
                self.set(SessionState::Unauthenticated);
                return Ok(self.state());
            }
            (None, Some(refresh_token)) => {
                info!("[Session] No access token, restoring with refresh token");
                self.restore_with_refresh(&refresh_token).await
            }
            (Some(access_token), refresh_token) => {
                match self.auth.profile(&access_token).await {
                    Ok(profile) => Ok(profile),
                    Err(e) => {
                        warn!("[Session] Profile fetch failed: {}", e);
                        match refresh_token {
                            Some(refresh_token) => {
                                self.restore_with_refresh(&refresh_token).await
                            }
                            None => Err(e.into()),
                        }
                    }
                }
            }
        };

        match restored {
            Ok(profile) => {
                info!("[Session] Restored session for {}", profile.email);
                self.set(SessionState::Authenticated(profile));
            }
            Err(e) => {
                warn!("[Session] Session restore failed: {}", e);
                self.logout()?;
            }
        }
        Ok(self.state())
    }

    async fn restore_with_refresh(&self, refresh_token: &str) -> SessionResult<Profile> {
        let refreshed = self.auth.refresh(refresh_token).await?;
        self.credentials.store_refreshed(&refreshed)?;
        Ok(self.auth.profile(&refreshed.access_token).await?)
    }

    /// Log in and adopt the returned pair.
    ///
    /// A rejected attempt leaves the stored pair and the previous state as
    /// they were. Once a new pair has been stored, any later failure clears
    /// it and ends unauthenticated.
    pub async fn login(&self, email: &str, password: &str) -> SessionResult<Profile> {
        let previous = self.state();
        self.set(SessionState::Loading);
        match self.auth.login(email, password).await {
            Ok(pair) => self.adopt(&pair).await,
            Err(e) => self.reject(previous, e.into()),
        }
    }

    /// Create an account and log straight into it
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> SessionResult<Profile> {
        let previous = self.state();
        self.set(SessionState::Loading);
        if let Err(e) = self.auth.register(email, password, display_name).await {
            return self.reject(previous, e.into());
        }
        match self.auth.login(email, password).await {
            Ok(pair) => self.adopt(&pair).await,
            Err(e) => self.reject(previous, e.into()),
        }
    }

    async fn adopt(&self, pair: &TokenPair) -> SessionResult<Profile> {
        let profile = match self.credentials.store_pair(pair) {
            Ok(()) => self
                .auth
                .profile(&pair.access_token)
                .await
                .map_err(SessionError::from),
            Err(e) => Err(e.into()),
        };
        match profile {
            Ok(profile) => {
                info!("[Session] Logged in as {}", profile.email);
                self.set(SessionState::Authenticated(profile.clone()));
                Ok(profile)
            }
            Err(e) => {
                warn!("[Session] Login failed after storing tokens: {}", e);
                if let Err(clear_err) = self.credentials.clear_pair() {
                    warn!("[Session] Failed to clear tokens: {}", clear_err);
                }
                self.set(SessionState::Unauthenticated);
                Err(e)
            }
        }
    }

    fn reject(&self, previous: SessionState, e: SessionError) -> SessionResult<Profile> {
        warn!("[Session] Login failed: {}", e);
        let restored = match previous {
            SessionState::Loading => SessionState::Init,
            other => other,
        };
        self.set(restored);
        Err(e)
    }

    pub fn logout(&self) -> SessionResult<()> {
        info!("[Session] Logging out");
        self.set(SessionState::Unauthenticated);
        self.credentials.clear_pair()?;
        Ok(())
    }

    /// React to a gateway `SessionExpired`
    pub fn expire(&self) -> SessionResult<()> {
        warn!("[Session] Session expired");
        self.logout()
    }

    /// Pass `result` through, expiring the session when it reports
    /// `SessionExpired`
    pub fn track<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(e) = &result
            && e.is_session_expired()
            && let Err(storage_err) = self.expire()
        {
            warn!("[Session] Failed to clear tokens: {}", storage_err);
        }
        result
    }
}
