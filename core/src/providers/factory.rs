use crate::config::ModelConfig;
use crate::providers::OpenAIProvider;
use crate::traits::Provider;
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub const PROVIDERS: &[&str] = &["openai", "openrouter", "ollama"];

pub fn create_provider(config: &ModelConfig) -> Result<Arc<dyn Provider>> {
    create_provider_with_env(config, |var| std::env::var(var).ok())
}

fn create_provider_with_env(
    config: &ModelConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn Provider>> {
    let mut provider = match config.provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENAI_API_KEY", "CTX7_OPENAI_API_KEY"],
                &config.api_key,
                &env,
            )?;
            OpenAIProvider::new(api_key)
        }
        "openrouter" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENROUTER_API_KEY", "CTX7_OPENROUTER_API_KEY"],
                &config.api_key,
                &env,
            )?;
            OpenAIProvider::openrouter(api_key)
        }
        "ollama" => OpenAIProvider::ollama(),
        other => {
            return Err(anyhow!(
                "Unknown provider: {}. Available: {}",
                other,
                PROVIDERS.join(", ")
            ));
        }
    };

    if let Some(model) = config.model.as_deref().filter(|m| !m.is_empty()) {
        provider = provider.with_model(model);
    }
    if let Some(base_url) = config.base_url.as_deref().filter(|u| !u.is_empty()) {
        provider = provider.with_base_url(base_url);
    }

    Ok(Arc::new(provider))
}

fn resolve_api_key_with_fallback(
    env_vars: &[&str],
    config_key: &str,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<String> {
    for var_name in env_vars {
        if let Some(key) = env(var_name).filter(|k| !k.trim().is_empty()) {
            return Ok(key.trim().to_string());
        }
    }
    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!(
            "No API key found. Set {} or add it to the config file.",
            env_vars.join(" or ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_config(provider: &str) -> ModelConfig {
        ModelConfig {
            provider: provider.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn env_key_wins_over_config_key() {
        let key = resolve_api_key_with_fallback(
            &["OPENAI_API_KEY"],
            "from-config",
            &|_| Some("from-env".to_string()),
        )
        .unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn config_key_used_without_env() {
        let key = resolve_api_key_with_fallback(&["OPENAI_API_KEY"], "from-config", &|_| None)
            .unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn openai_without_key_fails() {
        let err = create_provider_with_env(&model_config("openai"), |_| None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn ollama_needs_no_key() {
        let provider = create_provider_with_env(&model_config("Ollama"), |_| None).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn unknown_provider_lists_choices() {
        let err = create_provider_with_env(&model_config("glm"), |_| None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("openai, openrouter, ollama"));
    }
}
