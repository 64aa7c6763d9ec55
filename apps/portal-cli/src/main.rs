//! Registry portal CLI - read, watch and append to the on-chain registry.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portal_config_and_utils::{init_logging, Config, Paths};
use tracing::debug;

/// Registry portal - connect a wallet and follow the shared registry.
#[derive(Parser)]
#[command(name = "registry-portal")]
#[command(about = "Read, watch and append to the on-chain registry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error). Defaults to the config file value.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory holding config.json and logs (default ~/.registry-portal)
    #[arg(long, global = true, env = "REGISTRY_PORTAL_HOME")]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print all records
    List,

    /// Print all records, then follow new ones until Ctrl-C
    Watch {
        /// Ask the wallet for an account if none is authorized yet
        #[arg(short, long)]
        connect: bool,
    },

    /// Ask the wallet to authorize an account
    Connect,

    /// Append a message to the registry
    Submit {
        /// Message to record
        message: String,
        /// Wait until the transaction is mined
        #[arg(short, long)]
        wait: bool,
    },

    /// Print the registry's record counter
    Count,
}

fn load_config(paths: &Paths, log_level: Option<String>) -> anyhow::Result<Config> {
    let mut config = Config::load(paths)?;
    if let Some(level) = log_level {
        config.log_level = level;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Paths::resolve(cli.base_dir.clone())
        .map_err(anyhow::Error::from)
        .and_then(|paths| {
            let config = load_config(&paths, cli.log_level.clone())?;
            Ok((paths, config))
        }) {
        Ok((paths, config)) => {
            if let Err(e) = init_logging(&config.log_level, Some(paths.log_file()), false) {
                eprintln!("Warning: logging disabled: {e}");
            }
            debug!(base_dir = %paths.base_dir().display(), "Configuration loaded");
            config
        }
        Err(e) => {
            output::print_error(&e.to_string(), &cli.format);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::List => commands::list(&config, &cli.format).await,
        Commands::Watch { connect } => commands::watch(&config, connect, &cli.format).await,
        Commands::Connect => commands::connect(&config, &cli.format).await,
        Commands::Submit { message, wait } => {
            commands::submit(&config, &message, wait, &cli.format).await
        }
        Commands::Count => commands::count(&config, &cli.format).await,
    };

    if let Err(e) = result {
        output::print_error(&e.to_string(), &cli.format);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parses_submit() {
        let cli = Cli::try_parse_from(["registry-portal", "--format", "json", "submit", "gm", "--wait"])
            .unwrap();
        assert!(matches!(cli.format, output::OutputFormat::Json));
        match cli.command {
            Commands::Submit { message, wait } => {
                assert_eq!(message, "gm");
                assert!(wait);
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "registry-portal",
            "watch",
            "--connect",
            "--log-level",
            "debug",
            "--base-dir",
            "/tmp/portal",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Watch { connect: true }));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.base_dir, Some(PathBuf::from("/tmp/portal")));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["registry-portal"]).is_err());
    }

    #[test]
    fn test_load_config_applies_log_level_flag() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = load_config(&paths, Some("trace".to_string())).unwrap();
        assert_eq!(config.log_level, "trace");
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        std::fs::write(
            paths.config_file(),
            r#"{ "registry_address": "0xnope" }"#,
        )
        .unwrap();

        assert!(load_config(&paths, None).is_err());
    }
}
