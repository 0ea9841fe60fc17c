use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::commands;
use crate::constants::{
    DEFAULT_PORT, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_UPSTREAM_TIMEOUT_SECS, DEFAULT_UPSTREAM_URL,
    DEFAULT_USER_AGENT,
};
use crate::models::ServerConfig;
use crate::utils::{get_public_dir, init_tracing};

#[derive(Parser)]
#[command(name = "priceproxy")]
#[command(about = "Price aggregation proxy", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the server
    Serve(ConfigArgs),
    /// Fetch and merge prices once, print a summary and exit
    Pull {
        #[command(flatten)]
        config: ConfigArgs,

        /// Number of highest-volume items to print
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

/// Settings shared by every subcommand; each one can also come from the environment
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// HTTP listen port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Upstream price API base URL
    #[arg(long, env = "UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Identifying User-Agent sent on every upstream request
    #[arg(long, env = "WIKI_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Durable mirror project id (mirroring is skipped when unset)
    #[arg(long, env = "GCP_PROJECT_ID")]
    pub mirror_project: Option<String>,

    /// Directory holding the mirror database
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Static frontend directory (default: ./static, then ../../molten-rosette)
    #[arg(long, env = "PUBLIC_DIR")]
    pub public_dir: Option<PathBuf>,

    /// Seconds between in-process price refreshes, 0 disables
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = DEFAULT_REFRESH_INTERVAL_SECS)]
    pub refresh_interval: u64,

    /// Upstream request timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    pub upstream_timeout: u64,
}

impl From<ConfigArgs> for ServerConfig {
    fn from(args: ConfigArgs) -> Self {
        ServerConfig {
            port: args.port,
            upstream_url: args.upstream_url,
            user_agent: args.user_agent,
            mirror_project: args.mirror_project,
            data_dir: args.data_dir,
            public_dir: get_public_dir(args.public_dir),
            refresh_interval: Duration::from_secs(args.refresh_interval),
            upstream_timeout: Duration::from_secs(args.upstream_timeout),
        }
    }
}

pub async fn run() {
    let cli = Cli::parse();
    init_tracing();

    let (config, command) = match cli.command {
        Commands::Serve(args) => (args, None),
        Commands::Pull { config, top } => (config, Some(top)),
    };

    let config = match ServerConfig::from(config).validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    match command {
        None => commands::serve::run(config).await,
        Some(top) => commands::pull::run(config, top).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["priceproxy", "serve"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.upstream_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(args.refresh_interval, DEFAULT_REFRESH_INTERVAL_SECS);
    }

    #[test]
    fn test_parse_pull_flags() {
        let cli = Cli::try_parse_from([
            "priceproxy",
            "pull",
            "--top",
            "3",
            "--mirror-project",
            "flip-prod",
            "--user-agent",
            "Custom/2.0",
        ])
        .unwrap();

        let Commands::Pull { config, top } = cli.command else {
            panic!("expected pull");
        };
        assert_eq!(top, 3);
        assert_eq!(config.mirror_project.as_deref(), Some("flip-prod"));

        let config = ServerConfig::from(config);
        assert_eq!(config.user_agent, "Custom/2.0");
    }
}
