//! Videobrowser
//!
//! Browse a directory tree over HTTP without leaving its root.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use server::config::{default_config_path, Config};
use server::logging::init_logging;
use tokio_util::sync::CancellationToken;

/// Videobrowser - browse a directory tree over HTTP.
#[derive(Parser, Debug)]
#[command(name = "videobrowser")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Directory to serve (overrides config)
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Address to listen on, e.g. 127.0.0.1:8900 (overrides config)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    let command = cli.command.clone().unwrap_or(Commands::Serve {
        root: None,
        bind: None,
    });

    match command {
        Commands::Serve { root, bind } => {
            let mut config = Config::load(&config_path)?;
            let env_overrides = config.apply_env_overrides();
            if let Some(root) = root {
                config.browse.root = root;
            }
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            config.validate()?;

            let _log_guard = init_logging(&config.server, cli.verbose)?;
            tracing::info!("Using config file: {:?}", config_path);
            for name in env_overrides {
                tracing::info!("Applied override from environment: {}", name);
            }

            let shutdown = CancellationToken::new();
            tokio::spawn(watch_signals(shutdown.clone()));

            server::run(&config, shutdown).await?;
        }
        Commands::Config(ConfigCommands::Show) => {
            let mut config = Config::load(&config_path)?;
            config.apply_env_overrides();
            config.validate()?;
            print!("{}", config.to_toml()?);
        }
        Commands::Config(ConfigCommands::Init { force }) => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {} (use --force to overwrite)",
                    config_path.display()
                );
            }
            Config::default().save(&config_path)?;
            println!("Wrote default configuration to {}", config_path.display());
        }
    }

    Ok(())
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    shutdown.cancel();
}
