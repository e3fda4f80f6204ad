//! Thin chat-completion client.
//!
//! One request, two messages (system + user), first choice returned verbatim.
//! No retries, no streaming, no validation of the generated text.

use crate::config::Config;
use crate::log_debug;
use crate::providers::{Provider, ProviderError};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: String,
}

/// Validates that the configuration can issue requests for the given provider
pub fn validate_provider_config(config: &Config, provider: Provider) -> Result<()> {
    if provider.requires_api_key() && config.resolve_api_key(provider).is_none() {
        return Err(ProviderError::MissingApiKey(provider.name().to_string()).into());
    }
    Ok(())
}

/// Issue a single chat-completion request and return the first completion's
/// text verbatim.
pub async fn complete(
    config: &Config,
    provider: Provider,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String> {
    log_debug!("Generating completion using provider: {}", provider);
    log_debug!("System prompt: {}", system_prompt);
    log_debug!("User prompt: {}", user_prompt);

    let provider_config = config
        .get_provider_config(provider.name())
        .ok_or_else(|| anyhow!("Provider '{}' not found in configuration", provider))?;

    let api_key = config.resolve_api_key(provider);
    if provider.requires_api_key() && api_key.is_none() {
        return Err(ProviderError::MissingApiKey(provider.name().to_string()).into());
    }

    let temperature = provider_config
        .additional_params
        .get("temperature")
        .and_then(|t| t.parse::<f32>().ok());

    let request = ChatCompletionRequest {
        model: provider_config.effective_model(provider).to_string(),
        messages: vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ],
        temperature,
    };

    let url = format!(
        "{}/chat/completions",
        provider_config
            .effective_api_base(provider)
            .trim_end_matches('/')
    );

    let client = reqwest::Client::new();
    let mut builder = client.post(&url).json(&request);
    if let Some(key) = api_key {
        builder = builder.bearer_auth(key);
    }

    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log_debug!("Provider returned {}: {}", status, body);
        return Err(anyhow!("Provider returned {status}: {body}"));
    }

    let completion: ChatCompletionResponse = response.json().await?;
    let text = completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| anyhow!("Provider returned no completions"))?;

    log_debug!("Received {} bytes of completion text", text.len());
    Ok(text)
}
