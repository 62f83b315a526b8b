use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "CTX7_LOG";

/// Logs go to stderr so command output stays pipeable. An explicit
/// `--log-level` wins over `CTX7_LOG`, which wins over the config value.
pub fn init_logging(cli_level: Option<&str>, config_level: &str) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(config_level)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()?;

    Ok(())
}
