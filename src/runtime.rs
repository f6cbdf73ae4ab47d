//! Runtime services and shared state for nebula-api.

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{db::DbClient, http, llm::LlmClient, notify::NotifyClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the database, LLM and notification clients along with the
/// configuration. It is designed to be trivially cloneable, allowing it to be
/// handed to every request without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The database client instance.
    pub db: DbClient,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The notification client instance.
    pub notify: NotifyClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the database.
        let db = DbClient::surreal(&config).await?;

        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);

        // Initialize the notifier.
        let notify = NotifyClient::webhook(&config)?;

        Ok(Self { config, db, llm, notify })
    }

    /// Serve the HTTP API until Ctrl-C.
    pub async fn start(&self) -> Void {
        let listener = TcpListener::bind(self.config.bind_address.as_str()).await?;

        info!("API listening on {}.", listener.local_addr()?);

        axum::serve(listener, http::router(self.clone()))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutting down ...");
            })
            .await?;

        Ok(())
    }
}
