use crate::agent::DEFAULT_MAX_STEPS;
use crate::client::{API_KEY_ENV, ClientConfig, DEFAULT_BASE_URL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const CTX7_DIR: &str = ".ctx7";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context7Config {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Context7Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Context7Config {
    /// Client settings; an empty key is left unset so the client falls back
    /// to `CONTEXT7_API_KEY`.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_key: Some(self.api_key.clone()).filter(|k| !k.trim().is_empty()),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: String,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: String::new(),
            base_url: None,
            model: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub context7: Context7Config,
    pub model: ModelConfig,
    pub agent: AgentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "warn".to_string(),
            context7: Context7Config::default(),
            model: ModelConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        let mut config = if config_exists() {
            load_config()?
        } else {
            Config::default()
        };
        config.apply_env(|var| std::env::var(var).ok());
        Ok(config)
    }

    /// Recovers from a config file that failed to load: defaults plus the
    /// environment, so commands that only need the Context7 key keep working.
    pub fn or_env_defaults(loaded: Result<Self>, env: impl Fn(&str) -> Option<String>) -> Self {
        loaded.unwrap_or_else(|e| {
            warn!("{e:#}; falling back to default settings");
            let mut config = Config::default();
            config.apply_env(env);
            config
        })
    }

    /// `CONTEXT7_API_KEY` takes precedence over the file.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(key) = env(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.context7.api_key = key.trim().to_string();
        }
    }
}

pub fn get_ctx7_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CTX7_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_ctx7_dir().join("config.toml")
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Config file not found at {}. Run 'ctx7 onboard' to set up your configuration.",
                config_path.display()
            )
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))
}

/// Reads the config file without environment overrides. A file that cannot
/// be read or parsed is logged and replaced by defaults.
pub fn load_config_or_default() -> Config {
    load_config_or_default_from(&get_config_path())
}

pub fn load_config_or_default_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        return Config::default();
    }
    load_config_from(config_path).unwrap_or_else(|e| {
        warn!("{e:#}; starting from default settings");
        Config::default()
    })
}

pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &get_config_path())
}

pub fn save_config_to(config: &Config, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[context7]\napi_key = \"ctx7sk-abc\"\n\n[model]\nprovider = \"ollama\"\n",
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.context7.api_key, "ctx7sk-abc");
        assert_eq!(config.context7.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model.provider, "ollama");
        assert_eq!(config.agent.max_steps, DEFAULT_MAX_STEPS);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn save_then_load_preserves_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.model.model = Some("gpt-4o-mini".into());
        config.agent.max_steps = 8;
        save_config_to(&config, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_mentions_onboard() {
        let tmp = TempDir::new().unwrap();
        let err = load_config_from(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("ctx7 onboard"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[context7\n").unwrap();
        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn malformed_file_recovers_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[context7\n").unwrap();

        assert_eq!(load_config_or_default_from(&path), Config::default());
        assert_eq!(
            load_config_or_default_from(&tmp.path().join("absent.toml")),
            Config::default()
        );
    }

    #[test]
    fn failed_load_keeps_env_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[context7\n").unwrap();

        let config = Config::or_env_defaults(load_config_from(&path), |var| {
            (var == API_KEY_ENV).then(|| "ctx7sk-env".to_string())
        });
        assert_eq!(config.context7.api_key, "ctx7sk-env");
        assert_eq!(config.model, ModelConfig::default());

        let mut stored = Config::default();
        stored.agent.max_steps = 9;
        let config = Config::or_env_defaults(Ok(stored.clone()), |_| None);
        assert_eq!(config, stored);
    }

    #[test]
    fn env_key_overrides_file() {
        let mut config = Config::default();
        config.context7.api_key = "ctx7sk-file".into();
        config.apply_env(|_| Some("ctx7sk-env".into()));
        assert_eq!(config.context7.api_key, "ctx7sk-env");

        config.apply_env(|_| None);
        assert_eq!(config.context7.api_key, "ctx7sk-env");
    }

    #[test]
    fn blank_key_left_unset_for_client() {
        let config = Context7Config::default();
        assert_eq!(config.client_config().api_key, None);
    }
}
