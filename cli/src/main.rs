use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use ctx7_core::agent::{Context7Agent, FinishReason};
use ctx7_core::client::{Context7Client, DocsFormat, DocsMode, DocsOptions};
use ctx7_core::config::{self, Config};
use ctx7_core::providers;
use ctx7_core::traits::ChatMessage;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use termimad::MadSkin;
use tracing::debug;

mod logging;
mod onboard;
mod render;

#[derive(Parser)]
#[command(name = "ctx7", version)]
#[command(about = "ctx7 - Up-to-date library documentation from Context7", long_about = None)]
struct Cli {
    /// Log filter such as `debug` or `ctx7_core=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive setup of API keys and model provider
    Onboard,
    /// Search Context7 for libraries
    Search {
        query: String,
        #[arg(short = 'n', long)]
        library_name: Option<String>,
        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch documentation for a library ID such as /vercel/next.js
    Docs {
        library_id: String,
        #[arg(short, long, default_value = "code")]
        mode: DocsMode,
        #[arg(short, long, default_value = "txt")]
        format: DocsFormat,
        #[arg(short, long)]
        topic: Option<String>,
        #[arg(long)]
        version: Option<String>,
        #[arg(short, long)]
        page: Option<u32>,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Ask a question answered by the documentation agent
    Ask {
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = Config::load_or_default();
    let log_level = match &loaded {
        Ok(config) => config.log_level.clone(),
        Err(_) => Config::default().log_level,
    };
    logging::init_logging(cli.log_level.as_deref(), &log_level)?;
    debug!(
        path = %config::get_config_path().display(),
        exists = config::config_exists(),
        valid = loaded.is_ok(),
        "configuration loaded"
    );

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Ask { message: None }
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().context("Onboarding failed")?;
            config::save_config(&onboard_config)?;
            println!();
            println!(
                "{} Configuration saved to {}",
                style("✔").green().bold(),
                config::get_config_path().display()
            );
        }
        Commands::Search {
            query,
            library_name,
            json,
        } => {
            let config = Config::or_env_defaults(loaded, |var| std::env::var(var).ok());
            let client = Context7Client::new(config.context7.client_config())?;
            let response = client
                .search_library(&query, library_name.as_deref())
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else if response.results.is_empty() {
                println!("No libraries found matching '{}'.", query);
            } else {
                for lib in &response.results {
                    println!("{}  {}", style(&lib.id).cyan().bold(), render::library_line(lib));
                    if let Some(description) = lib.description.as_deref().filter(|d| !d.is_empty())
                    {
                        println!("    {}", style(description).dim());
                    }
                }
            }
        }
        Commands::Docs {
            library_id,
            mode,
            format,
            topic,
            version,
            page,
            limit,
            json,
        } => {
            let config = Config::or_env_defaults(loaded, |var| std::env::var(var).ok());
            let client = Context7Client::new(config.context7.client_config())?;
            let options = DocsOptions {
                mode,
                format,
                topic,
                version,
                page,
                limit,
            };
            let docs = client.get_docs(&library_id, &options).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&docs)?);
            } else {
                MadSkin::default().print_text(&render::docs_to_markdown(&docs));
            }
        }
        Commands::Ask { message } => {
            let config = loaded.context("Run 'ctx7 onboard' to rewrite the configuration")?;
            let agent = build_agent(&config)?;
            match message {
                Some(msg) => {
                    println!("\n🔎 Searching documentation...\n");
                    answer(&agent, &msg, vec![]).await?;
                }
                None => run_repl(&agent).await?,
            }
        }
    }

    Ok(())
}

fn build_agent(config: &Config) -> Result<Context7Agent> {
    let client = Arc::new(Context7Client::new(config.context7.client_config())?);
    let provider = providers::create_provider(&config.model)?;

    let mut agent = Context7Agent::new(provider, client).with_max_steps(config.agent.max_steps);
    debug!(tools = ?agent.tools().names(), "agent ready");
    if let Some(prompt) = &config.agent.system_prompt {
        agent = agent.with_system_prompt(prompt.clone());
    }
    if let Some(temperature) = config.model.temperature {
        agent = agent.with_temperature(temperature);
    }
    Ok(agent)
}

async fn answer(agent: &Context7Agent, prompt: &str, history: Vec<ChatMessage>) -> Result<String> {
    let output = agent.generate_with_history(prompt, history).await?;

    MadSkin::default().print_text(&output.text);
    if output.finish_reason == FinishReason::MaxSteps {
        eprintln!(
            "{} stopped after {} steps without a final answer",
            style("⚠").yellow(),
            output.steps.len()
        );
    }
    Ok(output.text)
}

async fn run_repl(agent: &Context7Agent) -> Result<()> {
    println!("📚 ctx7");
    println!("Ask about any library (Ctrl+D to exit):\n");

    let stdin = io::stdin();
    let mut history: Vec<ChatMessage> = Vec::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        let read = stdin.lock().read_line(&mut input);
        match read {
            Ok(0) | Err(_) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }

                println!("\n🔎 Searching documentation...\n");
                match answer(agent, input, history.clone()).await {
                    Ok(reply) => {
                        history.push(ChatMessage::user(input));
                        history.push(ChatMessage::assistant(reply));
                    }
                    Err(e) => eprintln!("❌ Error: {:#}", e),
                }
                println!();
            }
        }
    }

    Ok(())
}
