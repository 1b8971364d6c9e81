#![allow(dead_code)]

use std::sync::Arc;

use kinema_client::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use kinema_client::{ClientConfig, KinemaClient, MemoryTokenStore, TokenStore};
use mockito::{Matcher, Mock, Server, ServerGuard};

pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";
pub const PROFILE_PATH: &str = "/api/user/profile";
pub const LOGIN_PATH: &str = "/api/auth/login";

pub struct TestSetup {
    pub server: ServerGuard,
    pub store: Arc<MemoryTokenStore>,
    pub client: KinemaClient,
}

impl TestSetup {
    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY).unwrap()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY).unwrap()
    }
}

/// Mock backend plus a client whose token store starts with `entries`
pub async fn test_setup(entries: &[(&str, &str)]) -> TestSetup {
    let server = Server::new_async().await;
    let store = Arc::new(MemoryTokenStore::with_entries(entries.iter().copied()));
    let client = KinemaClient::new(
        ClientConfig::with_server_url(server.url()),
        store.clone(),
    )
    .expect("Failed to build client");
    TestSetup {
        server,
        store,
        client,
    }
}

pub fn tokens<'a>(access: &'a str, refresh: &'a str) -> [(&'a str, &'a str); 2] {
    [(ACCESS_TOKEN_KEY, access), (REFRESH_TOKEN_KEY, refresh)]
}

/// Refresh endpoint expecting `refresh_token` and answering with `status`/`body`
pub async fn mock_refresh(
    server: &mut ServerGuard,
    refresh_token: &str,
    status: usize,
    body: serde_json::Value,
    expected_requests: usize,
) -> Mock {
    server
        .mock("POST", REFRESH_PATH)
        .match_body(Matcher::Json(
            serde_json::json!({ "refreshToken": refresh_token }),
        ))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(expected_requests)
        .create_async()
        .await
}

pub async fn mock_profile(
    server: &mut ServerGuard,
    access_token: &str,
    status: usize,
    expected_requests: usize,
) -> Mock {
    server
        .mock("GET", PROFILE_PATH)
        .match_header("authorization", format!("Bearer {access_token}").as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "id": "u1",
                "email": "ada@example.com",
                "displayName": "Ada",
                "role": "USER"
            })
            .to_string(),
        )
        .expect(expected_requests)
        .create_async()
        .await
}
