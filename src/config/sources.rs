use super::models::Config;
use crate::profiles::ProviderProfile;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "SMARTSAVE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/smartsave.toml";
const ENV_PREFIX: &str = "SMARTSAVE";
const ENV_SEPARATOR: &str = "__";
const SECRET_ENV_PREFIX: &str = "SMARTSAVE_PROVIDER_";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    apply_secret_overrides(&mut config.providers);

    Ok(config)
}

/// Overlay provider credentials from the environment.
///
/// `SMARTSAVE_PROVIDER_<ID>_API_KEY` and `SMARTSAVE_PROVIDER_<ID>_SECRET_KEY`,
/// where `<ID>` is the profile id upper-cased with `-` replaced by `_`.
pub fn apply_secret_overrides(profiles: &mut [ProviderProfile]) {
    for profile in profiles.iter_mut() {
        let env_id = secret_env_id(&profile.id);

        if let Ok(api_key) = env::var(format!("{SECRET_ENV_PREFIX}{env_id}_API_KEY")) {
            tracing::debug!(provider = %profile.id, "API key taken from environment");
            profile.api_key = api_key;
        }
        if let Ok(secret_key) = env::var(format!("{SECRET_ENV_PREFIX}{env_id}_SECRET_KEY")) {
            profile.secondary_key = Some(secret_key);
        }
    }
}

fn secret_env_id(profile_id: &str) -> String {
    profile_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // SMARTSAVE__NAMING__AI_ENABLED -> naming.ai_enabled
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:7878");
        assert_eq!(config.providers.len(), 1);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"

[naming]
pattern = "{siteName}-{mainTopic}"
ai_enabled = true
active_provider_id = "deepseek"
ai_timeout_seconds = 8

[http]
proxy = "http://proxy.local:3128"

[[providers]]
id = "custom-default"
display_name = "Custom API"
endpoint = "https://api.example.com/v1/chat/completions"
is_default = true

[[providers]]
id = "deepseek"
display_name = "DeepSeek"
endpoint = "https://api.deepseek.com/chat/completions"
api_key = "sk-test"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.naming.pattern, "{siteName}-{mainTopic}");
        assert!(config.naming.ai_enabled);
        assert_eq!(config.naming.ai_timeout_seconds, 8);
        assert_eq!(config.http.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[1].api_key, "sk-test");
        assert_eq!(config.providers[1].model, None);
        assert!(!config.providers[1].is_default);
    }

    #[test]
    fn test_secret_env_id() {
        assert_eq!(secret_env_id("custom-default"), "CUSTOM_DEFAULT");
        assert_eq!(secret_env_id("baidu"), "BAIDU");
    }

    // Secret overrides read process env; tested without mutating it since
    // env::set_var is unsafe on edition 2024.
    #[test]
    fn test_secret_overrides_leave_profiles_without_env_untouched() {
        let mut profiles = vec![ProviderProfile {
            api_key: "from-file".to_string(),
            ..ProviderProfile::new("smartsave-test-unset-provider", "Unset")
        }];

        apply_secret_overrides(&mut profiles);
        assert_eq!(profiles[0].api_key, "from-file");
        assert_eq!(profiles[0].secondary_key, None);
    }
}
