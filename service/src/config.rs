use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::time::Duration;
use url::Url;

/// Default location of the transcript service when `TRANSCRIPT_SERVICE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base URL of the transcript service. Every request path and every
    /// download/audio link is derived from it.
    #[arg(long, env = "TRANSCRIPT_SERVICE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: Url,

    /// Whole-request timeout in seconds. The service transcribes synchronously,
    /// so a transcription request may legitimately take minutes.
    #[arg(long, env, default_value_t = 300)]
    pub request_timeout_secs: u64,

    /// Timeout in seconds for establishing a connection to the service
    #[arg(long, env, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Delay in milliseconds between status checks of a transcript that was
    /// accepted but not finished yet
    #[arg(long, env, default_value_t = 2000)]
    pub poll_interval_ms: u64,

    /// Number of status checks before giving up on a provisional transcript
    #[arg(long, env, default_value_t = 150)]
    pub poll_max_attempts: u32,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    /// Configuration from environment variables and defaults only.
    fn default() -> Self {
        Config::parse_from([env!("CARGO_PKG_NAME")])
    }
}

impl Config {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn set_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Loads a `.env` file, if present, so its variables act as argument fallbacks.
pub fn load_env_file() {
    dotenv().ok();
}
