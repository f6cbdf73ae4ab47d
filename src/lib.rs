//! Library root for `nebula-api`.
//!
//! Nebula-api is the backend of a property-management app. It:
//! - Accepts tenant maintenance requests over HTTP
//! - Triages each request with an OpenAI model, falling back to a fixed classification
//! - Persists requests and lists them, newest first
//! - Assigns technicians and notifies a scheduling webhook
//!
//! The service integrates with SurrealDB for storage, OpenAI for triage, and a
//! plain webhook for notifications. The architecture is built around
//! extensible traits that allow for different implementations of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the nebula-api runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with database, LLM, and notification clients
/// - Serves the HTTP API until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting nebula-api ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("A process-wide crypto provider is already installed."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
