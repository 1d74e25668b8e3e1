use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;

/// Environment variable that overrides the API base URL.
pub const API_URL_ENV: &str = "LBRY_APP_API_URL";

/// Host used when no override is present.
pub const DEFAULT_API_URL: &str = "https://api.lbry.io/";

/// Prefix for environment overrides of any other config key
/// (nested keys are separated with `__`, e.g. `LBRYIO_LOGGING__LEVEL`).
pub const ENV_PREFIX: &str = "LBRYIO_";

const STRIPE_TEST_KEY: &str = "pk_test_NoL1JWL7i1ipfhVId5KfDZgo";
const STRIPE_LIVE_KEY: &str = "pk_live_e8M4dRNnCCbmpZzduEUZBgJO";

/// What happens to a failed authentication attempt.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthRetryPolicy {
    /// The first attempt is memoized for the lifetime of the client,
    /// failures included.
    #[default]
    Once,
    /// A failed attempt is discarded and the next caller starts a new one.
    /// Successful attempts stay memoized.
    AfterFailure,
}

/// Client configuration.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the remote API, always ending with exactly one slash.
    pub api_url: String,
    /// Global enablement. When off, only allow-listed calls go out and
    /// authentication resolves to a placeholder user.
    pub enabled: bool,
    /// Freshness window for exchange rates.
    pub exchange_rate_ttl_secs: u64,
    pub auth_retry: AuthRetryPolicy,
    /// Language sent when registering a new installation.
    pub language: String,
    /// JSON-RPC endpoint of the local daemon reporting the installation id.
    pub daemon_url: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            api_url: DEFAULT_API_URL.to_string(),
            enabled: true,
            exchange_rate_ttl_secs: 20 * 60,
            auth_retry: AuthRetryPolicy::default(),
            language: "en".to_string(),
            daemon_url: "http://localhost:5279".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn exchange_rate_ttl(&self) -> Duration {
        Duration::from_secs(self.exchange_rate_ttl_secs)
    }
}

/// Load the configuration: built-in defaults, then the optional YAML file,
/// then `LBRYIO_*` variables, then the `LBRY_APP_API_URL` override.
pub fn load_config(path: Option<&Path>) -> Result<ApiConfig, figment::Error> {
    let mut figment = Figment::from(Serialized::defaults(ApiConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let api_url_override = std::env::var(API_URL_ENV).ok();
    extract_config(figment, api_url_override.as_deref())
}

/// Extract a config from an already assembled figment, applying the base URL
/// override and normalization.
pub fn extract_config(
    figment: Figment,
    api_url_override: Option<&str>,
) -> Result<ApiConfig, figment::Error> {
    let mut config: ApiConfig = figment.extract()?;
    match api_url_override {
        Some(url) if !url.is_empty() => config.api_url = normalize_base_url(url),
        _ => config.api_url = normalize_base_url(&config.api_url),
    }
    Ok(config)
}

/// Trim every trailing slash and append exactly one.
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

/// The payment processor key matching the environment the base URL targets.
pub fn stripe_publishable_key(base_url: &str) -> &'static str {
    if base_url.starts_with("http://localhost:") {
        STRIPE_TEST_KEY
    } else {
        STRIPE_LIVE_KEY
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(ApiConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
