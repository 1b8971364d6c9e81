use reqwest::Client;

use crate::config::ClientConfig;

/// Build the shared HTTP client used by the gateway and the auth endpoints
pub fn build_http_client(config: &ClientConfig) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        // In development, don't follow redirects to avoid HTTP->HTTPS issues
        .redirect(if cfg!(debug_assertions) {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::default()
        })
        .user_agent(concat!("kinema-client/", env!("CARGO_PKG_VERSION")))
        .build()
}
