use config::Config;
use log::info;

pub mod config;
pub mod logging;

/// Builds the HTTP transport shared by every call to the transcript service.
///
/// Timeouts are the only ones the client applies; there are no retries at this
/// layer or above it.
pub fn init_http_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    info!(
        "HTTP client config: base_url={}, connect_timeout={}s, request_timeout={}s",
        config.base_url(),
        config.connect_timeout_secs,
        config.request_timeout_secs,
    );

    reqwest::Client::builder()
        .use_rustls_tls()
        .connect_timeout(config.connect_timeout())
        .timeout(config.request_timeout())
        .user_agent(format!("transcript-admin/{}", env!("CARGO_PKG_VERSION")))
        .build()
}

// Infrastructure shared by the controllers: configuration and the HTTP transport.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http_client = init_http_client(&config)?;
        Ok(Self {
            config,
            http_client,
        })
    }
}
