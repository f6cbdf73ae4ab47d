//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::Res;

/// Default OpenAI triage model to use
fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default sampling temperature for the triage model
fn default_openai_temperature() -> f32 {
    0.0
}

/// Default system directive for the triage agent.
fn default_triage_system_directive() -> String {
    prompts::TRIAGE_SYSTEM_DIRECTIVE.to_string()
}

/// Default database namespace.
fn default_db_namespace() -> String {
    "nebula".to_string()
}

/// Default database name.
fn default_db_database() -> String {
    "api".to_string()
}

/// Default HTTP bind address.
fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Configuration for the nebula-api application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// OpenAI API key (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// OpenAI model used for triage (`OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Sampling temperature to use for the triage model (`OPENAI_TEMPERATURE`).
    /// Value between 0 and 2.
    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f32,
    /// Optional custom triage directive to override the default (`TRIAGE_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_triage_system_directive")]
    pub triage_system_directive: String,
    /// Database endpoint URL (`DB_ENDPOINT`), e.g. `wss://db.example.com`.
    pub db_endpoint: String,
    /// Database username (`DB_USERNAME`).
    pub db_username: String,
    /// Database password (`DB_PASSWORD`).
    pub db_password: String,
    /// Database namespace (`DB_NAMESPACE`).
    #[serde(default = "default_db_namespace")]
    pub db_namespace: String,
    /// Database name (`DB_DATABASE`).
    #[serde(default = "default_db_database")]
    pub db_database: String,
    /// Webhook notified when a ticket is scheduled (`NOTIFY_WEBHOOK_URL`).
    /// Notifications are skipped when unset.
    #[serde(default)]
    pub notify_webhook_url: Option<String>,
    /// Address the HTTP server binds to (`BIND_ADDRESS`).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Config {
    /// Load from the optional TOML file, then `NEBULA_*` environment variables.
    ///
    /// Environment variables take precedence over the file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        cfg = cfg.add_source(config::Environment::default().prefix("NEBULA"));

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the values that deserialization alone cannot.
    pub fn validate(&self) -> Res<()> {
        if self.openai_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("OpenAI API key must be set."));
        }

        if self.openai_temperature < 0.0 || self.openai_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI temperature must be between 0 and 2."));
        }

        if self.db_endpoint.trim().is_empty() {
            return Err(anyhow::anyhow!("Database endpoint must be set."));
        }

        if self.db_username.trim().is_empty() || self.db_password.trim().is_empty() {
            return Err(anyhow::anyhow!("Database credentials must be set."));
        }

        if let Some(url) = &self.notify_webhook_url {
            reqwest::Url::parse(url).map_err(|e| anyhow::anyhow!("Notify webhook URL `{url}` is invalid: {e}"))?;
        }

        Ok(())
    }
}
