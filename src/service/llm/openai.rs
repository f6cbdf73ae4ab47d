//! Integration with Large Language Model services.
//!
//! This module provides a thin wrapper around the OpenAI chat completions API
//! for triaging maintenance tickets.  The model is constrained with a strict
//! JSON schema so the reply always parses into a [`Classification`].

use std::sync::{Arc, OnceLock};

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
        ResponseFormat, ResponseFormatJsonSchema,
    },
};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::base::{
    config::Config,
    prompts::triage_user_message,
    types::{Classification, Res},
};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the triage messages: the fixed directive, then the quoted ticket.
    #[instrument(name = "OpenAiLlmClient::build_triage_messages", skip_all)]
    fn build_triage_messages(&self, text: &str) -> Res<Vec<ChatCompletionRequestMessage>> {
        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default().content(self.config.triage_system_directive.clone()).build()?.into(),
            ChatCompletionRequestUserMessageArgs::default().content(triage_user_message(text)).build()?.into(),
        ])
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::triage_ticket", skip_all)]
    async fn triage_ticket(&self, text: &str) -> Res<Classification> {
        let messages = self.build_triage_messages(text)?;

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(&self.config.openai_model).response_format(get_triage_response_format().clone()).messages(messages);

        // Add the temperature for the non-reasoning models.
        if self.config.openai_model.starts_with("gpt") {
            request.temperature(self.config.openai_temperature);
        }

        let response = self.client.chat().create(request.build()?).await?;

        let classification = parse_triage_response(&response)?;
        info!("Ticket triaged as {} / {}.", classification.category, classification.severity.as_str());

        Ok(classification)
    }
}

/// Parse the first choice of a triage completion.
#[instrument(skip_all)]
pub fn parse_triage_response(response: &CreateChatCompletionResponse) -> Res<Classification> {
    let choice = response.choices.first().ok_or_else(|| anyhow::anyhow!("Triage response has no choices."))?;

    if let Some(refusal) = &choice.message.refusal {
        warn!("Triage request refused: {refusal}");
        return Err(anyhow::anyhow!("Request refused: {refusal}"));
    }

    let content = choice.message.content.as_deref().ok_or_else(|| anyhow::anyhow!("Triage response has no content."))?;

    Classification::from_model_output(content)
}

// Statics.

static TRIAGE_RESPONSE_FORMAT: OnceLock<ResponseFormat> = OnceLock::new();

/// Get the strict JSON schema format for triage replies.
fn get_triage_response_format() -> &'static ResponseFormat {
    TRIAGE_RESPONSE_FORMAT.get_or_init(|| ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            name: "TicketTriage".to_string(),
            description: Some("Classification of a property maintenance ticket.".to_string()),
            schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "enum": ["HVAC", "plumbing", "electrical", "other"]
                    },
                    "severity": {
                        "type": "string",
                        "enum": ["low", "medium", "high"]
                    },
                    "suggestion": {
                        "type": "string",
                        "description": "A practical next step, at most 120 characters."
                    }
                },
                "required": ["category", "severity", "suggestion"],
                "additionalProperties": false
            })),
            strict: Some(true),
        },
    })
}

// Tests.
