use std::sync::Arc;

use figment::{
    providers::{Format, Serialized, Yaml},
    Figment,
};
use lbryio::config::{extract_config, ApiConfig};
use lbryio::host::MemoryHost;
use lbryio::Lbryio;

/// Build a config from YAML on top of the defaults, pointing the API and the
/// daemon at mock servers.
pub fn test_config(api_url: &str, daemon_url: &str, extra_yaml: &str) -> ApiConfig {
    let yaml = format!(
        "api_url: \"{}\"\ndaemon_url: \"{}/\"\nlogging:\n  level: debug\n  format: json\n{}",
        api_url, daemon_url, extra_yaml
    );
    let figment =
        Figment::from(Serialized::defaults(ApiConfig::default())).merge(Yaml::string(&yaml));
    extract_config(figment, None).expect("Failed to parse test config YAML")
}

pub fn build_client(config: &ApiConfig, token: Option<&str>) -> (Lbryio, Arc<MemoryHost>) {
    let host = Arc::new(MemoryHost::new(token.map(str::to_string)));
    (Lbryio::new(config, host.clone()), host)
}

pub const DAEMON_STATUS: &str =
    r#"{"jsonrpc": "2.0", "id": 1, "result": {"installation_id": "install-42", "is_running": true}}"#;
