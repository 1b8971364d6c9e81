//! Client library for the Kinema physics learning platform.
//!
//! The core is the [`gateway::Gateway`], which attaches the stored access
//! token to each request and renews it once on a 401. The typed APIs, the
//! [`session::Session`] context and the student [`catalog`] are built on it.

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod http;
pub mod routes;
pub mod session;
pub mod storage;

pub use api::{AuthApi, ContentApi, UsersApi};
pub use client::KinemaClient;
pub use config::ClientConfig;
pub use errors::{
    ApiError, ApiResult, ClientError, ConfigError, GatewayError, GatewayResult,
    SessionError, SessionResult, StorageError, StorageResult,
};
pub use gateway::{Gateway, MultipartBody, RequestBody, RequestOptions};
pub use session::{Session, SessionState};
pub use storage::{
    CredentialStore, EncryptedFileTokenStore, MemoryTokenStore, TokenStore,
};
