mod commands;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use waypost_core::WaypostConfig;

use commands::record::KindArg;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "waypost.yaml";

#[derive(Parser, Debug)]
#[command(name = "waypost", version, about = "Waypost CLI")]
struct Cli {
    /// Configuration file (YAML, or TOML with a .toml extension)
    #[arg(long, global = true, env = "WAYPOST_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve this client's network address through the lookup services.
    Resolve {
        /// Endpoint to query; repeat to set priority order. Overrides the config.
        #[arg(long = "endpoint")]
        endpoints: Vec<String>,

        /// Per-attempt timeout in milliseconds. Overrides the config.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Print the full result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Save one record through the configured sink and print the report.
    Record {
        /// Kind of user action
        #[arg(value_enum)]
        kind: KindArg,

        /// Subject identifier, e.g. an email address
        #[arg(long)]
        subject: String,

        /// Client context to record. Defaults to the configured user agent.
        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Validate the configuration.
    Config {
        /// Print the effective configuration as YAML
        #[arg(long, default_value_t = false)]
        print: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Resolve {
            endpoints,
            timeout_ms,
            json,
        } => {
            commands::resolve::run(&config.resolver, endpoints, timeout_ms, json).await?;
        }

        Command::Record {
            kind,
            subject,
            user_agent,
        } => {
            commands::record::run(&config, kind, &subject, user_agent).await?;
        }

        Command::Config { print } => commands::config::check(&config, print)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<WaypostConfig> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading configuration");
            Ok(WaypostConfig::from_file(path)?)
        }
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Ok(WaypostConfig::from_file(DEFAULT_CONFIG_FILE)?)
        }
        None => Ok(WaypostConfig::default()),
    }
}
