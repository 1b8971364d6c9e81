//! Error types for the client
//!
//! The gateway only resolves authentication-renewal failures itself; every
//! other failure surfaces to the caller through these types.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single gateway call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network failure before any response arrived
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Tokens were rejected and could not be renewed; the user must log in again
    #[error("session expired, please login again")]
    SessionExpired,

    /// Token storage could not be read or written
    #[error("token storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid request target '{target}'")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header value")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Token storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read token store")]
    ReadFailed(#[source] std::io::Error),

    #[error("failed to write token store")]
    WriteFailed(#[source] std::io::Error),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("key derivation failed")]
    KeyDerivationFailed,

    #[error("corrupted token store data")]
    CorruptedData(#[source] serde_json::Error),

    #[error("unable to determine a data directory for the token store")]
    NoDataDir,
}

/// Errors from the typed REST surfaces
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Failure of an unauthenticated call made outside the gateway
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status; interpreting it is up to the caller
    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode response body")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    /// Whether the caller should treat this as "log the user out"
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::Gateway(GatewayError::SessionExpired))
    }

    /// HTTP status for domain-level failures, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Session lifecycle errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("authentication failed: {0}")]
    Api(#[from] ApiError),

    #[error("token storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Failure to assemble a [`crate::KinemaClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

pub type GatewayResult<T> = Result<T, GatewayError>;
pub type StorageResult<T> = Result<T, StorageError>;
pub type ApiResult<T> = Result<T, ApiError>;
pub type SessionResult<T> = Result<T, SessionError>;
