//! kinemactl: terminal client for the Kinema learning platform

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Target};
use kinema_client::{ApiError, GatewayError, SessionError};
use log::LevelFilter;

use crate::cli::Cli;

const SESSION_EXPIRED_EXIT: u8 = 2;

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("kinemactl", LevelFilter::Debug)
        .filter_module("kinema_client", LevelFilter::Debug)
        .init();
}

fn is_session_expired(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<GatewayError>(),
            Some(GatewayError::SessionExpired)
        ) || cause
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_session_expired)
            || matches!(
                cause.downcast_ref::<SessionError>(),
                Some(SessionError::Api(api)) if api.is_session_expired()
            )
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();
    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_session_expired(&err) => {
            eprintln!("session expired, please log in again");
            ExitCode::from(SESSION_EXPIRED_EXIT)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_wrapped_session_expiry() {
        let err = anyhow::Error::from(ApiError::Gateway(GatewayError::SessionExpired))
            .context("listing topics");
        assert!(is_session_expired(&err));
    }

    #[test]
    fn other_errors_are_not_session_expiry() {
        let err = anyhow::anyhow!("boom");
        assert!(!is_session_expired(&err));
    }
}
