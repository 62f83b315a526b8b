use anyhow::{Context, Result};
use console::style;
use ctx7_core::config::{self, Config};
use ctx7_core::providers::PROVIDERS;
use dialoguer::{Input, Password, Select};

const BANNER: &str = r"
    ---------------------------
       ctx7 · Context7 docs
    ---------------------------
";

const TOTAL_STEPS: usize = 3;

fn print_step(step: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, TOTAL_STEPS, title))
            .cyan()
            .bold()
    );
    println!();
}

/// Walks through the settings interactively, starting from the existing
/// config when there is one.
pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan());

    let mut config = config::load_config_or_default();

    print_step(1, "Context7");
    println!(
        "Get an API key at {}. Leave empty to use {} instead.",
        style("https://context7.com/dashboard").underlined(),
        style("CONTEXT7_API_KEY").bold()
    );
    let api_key: String = Password::new()
        .with_prompt("Context7 API key")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read Context7 API key")?;
    if !api_key.trim().is_empty() {
        config.context7.api_key = api_key.trim().to_string();
    }

    print_step(2, "Model provider");
    let default_idx = PROVIDERS
        .iter()
        .position(|p| *p == config.model.provider)
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Provider used by 'ctx7 ask'")
        .items(PROVIDERS)
        .default(default_idx)
        .interact()
        .context("Failed to read provider")?;
    config.model.provider = PROVIDERS[idx].to_string();

    if config.model.provider != "ollama" {
        let key: String = Password::new()
            .with_prompt(format!(
                "{} API key (empty to read it from the environment)",
                config.model.provider
            ))
            .allow_empty_password(true)
            .interact()
            .context("Failed to read provider API key")?;
        config.model.api_key = key.trim().to_string();
    }

    let model: String = Input::new()
        .with_prompt("Model (empty for the provider default)")
        .allow_empty(true)
        .with_initial_text(config.model.model.clone().unwrap_or_default())
        .interact_text()
        .context("Failed to read model")?;
    config.model.model = Some(model.trim().to_string()).filter(|m| !m.is_empty());

    print_step(3, "Agent");
    config.agent.max_steps = Input::new()
        .with_prompt("Maximum tool-calling steps per question")
        .default(config.agent.max_steps)
        .interact_text()
        .context("Failed to read max steps")?;

    Ok(config)
}
