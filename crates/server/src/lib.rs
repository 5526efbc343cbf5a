//! # Videobrowser Server
//!
//! HTTP front end exposing a directory tree, confined to a single root, for
//! browsing in a web browser.
//!
//! ## Overview
//!
//! - **Configuration**: TOML file with environment and CLI overrides
//! - **Logging**: `tracing` to stdout, optionally to a daily rolling file
//! - **HTTP**: one `GET /?path=...` endpoint served by `axum`
//! - **Rendering**: directory and text pages built with `maud`
//!
//! The browsing rules themselves (confinement, listing, classification) live in
//! the [`browse`] crate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use server::Config;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load_default()?;
//!     config.apply_env_overrides();
//!     config.validate()?;
//!
//!     let shutdown = CancellationToken::new();
//!     server::run(&config, shutdown).await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and defaults
//! - [`logging`]: Tracing subscriber setup
//! - [`http`]: Router, handlers, and file streaming
//! - [`render`]: HTML pages

pub mod config;
pub mod http;
pub mod logging;
pub mod render;

use std::sync::Arc;

use anyhow::{Context, Result};
use browse::{RequestOrchestrator, RootBoundary};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

// Re-export browse for convenience
pub use browse;

pub use config::{Config, ConfigError};
pub use http::{router, serve, HttpError};

/// Build the request orchestrator for a configuration.
///
/// Fails when the configured root does not exist or is not a directory.
pub fn build_orchestrator(config: &Config) -> Result<RequestOrchestrator> {
    let root = RootBoundary::new(&config.browse.root).with_context(|| {
        format!(
            "Base directory {} does not exist or is not a directory",
            config.browse.root.display()
        )
    })?;

    Ok(RequestOrchestrator::new(root, config.browse.options()))
}

/// Run the server until `shutdown` is cancelled.
pub async fn run(config: &Config, shutdown: CancellationToken) -> Result<()> {
    let orchestrator = Arc::new(build_orchestrator(config)?);
    let addr = config.bind_addr()?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;
    let local_addr = listener.local_addr().context("Failed to read local address")?;

    info!("videobrowser {}", env!("CARGO_PKG_VERSION"));
    info!("Serving files from: {}", orchestrator.root().path().display());
    info!("Listening on http://{}", local_addr);

    serve(listener, orchestrator, shutdown)
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}
