pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Classification, Res};

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with large language models.
/// Implementing this trait allows different LLM providers to be used with nebula-api.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Triage a ticket description into a category, severity and suggestion.
    ///
    /// This is a single best-effort round trip: no retries, no caching.  Any
    /// transport, refusal or parse failure is returned as an error, and the
    /// caller decides what to substitute.
    async fn triage_ticket(&self, text: &str) -> Res<Classification>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
