//! backend-api binary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use common::{AppConfig, LogConfig};

#[derive(Parser, Debug)]
#[command(name = "backend-api")]
#[command(about = "HTTP API backed by PostgreSQL")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long)]
    verbose: bool,

    /// Load environment variables from this file instead of `.env`
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load environment variables
    let env_loaded = match &cli.env_file {
        Some(path) => dotenvy::from_path(path).map_err(|e| (path.clone(), e)),
        None => {
            dotenvy::dotenv().ok();
            Ok(())
        }
    };

    // Initialize tracing
    let mut log = LogConfig::from_env();
    if cli.verbose {
        log.filter = "debug,tower_http=debug".to_string();
    }
    app::init_tracing(&log);

    if let Err((path, e)) = env_loaded {
        error!("Failed to load {}: {}", path.display(), e);
        return ExitCode::FAILURE;
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match app::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Startup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["backend-api"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.env_file.is_none());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["backend-api", "-v", "--env-file", "staging.env"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.env_file, Some(PathBuf::from("staging.env")));
    }

    #[test]
    fn test_cli_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["backend-api", "--port", "4000"]).is_err());
    }
}
