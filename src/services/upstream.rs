// src/services/upstream.rs
//! Chat-completions client and wire types for the upstream API.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::RelayConfig;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Request body sent upstream. Sampling parameters are fixed.
#[derive(Debug, Serialize)]
pub struct UpstreamPayload<'a> {
    pub model: &'a str,
    pub messages: &'a [UpstreamMessage],
    pub top_p: u32,
    pub temperature: u32,
    pub frequency_penalty: u32,
    pub presence_penalty: u32,
    pub repetition_penalty: u32,
    pub top_k: u32,
}

impl<'a> UpstreamPayload<'a> {
    pub fn new(model: &'a str, messages: &'a [UpstreamMessage]) -> Self {
        Self {
            model,
            messages,
            top_p: 1,
            temperature: 1,
            frequency_penalty: 0,
            presence_penalty: 0,
            repetition_penalty: 1,
            top_k: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

pub struct UpstreamClient {
    http: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl UpstreamClient {
    pub fn new(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Single POST, no retry. The upstream status is logged but not
    /// enforced: an error body simply carries no choices.
    pub async fn complete(
        &self,
        messages: &[UpstreamMessage],
    ) -> Result<CompletionResponse, AppError> {
        let payload = UpstreamPayload::new(&self.model, messages);

        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, "upstream returned non-success status");
        }

        let body = resp.bytes().await?;
        let parsed = serde_json::from_slice(&body)?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_carries_fixed_sampling_parameters() {
        let messages = vec![UpstreamMessage {
            role: "user",
            content: MessageContent::Text("hello".into()),
        }];
        let value = serde_json::to_value(UpstreamPayload::new("m", &messages)).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "m",
                "messages": [{"role": "user", "content": "hello"}],
                "top_p": 1,
                "temperature": 1,
                "frequency_penalty": 0,
                "presence_penalty": 0,
                "repetition_penalty": 1,
                "top_k": 0
            })
        );
    }

    #[test]
    fn multipart_content_shape() {
        let msg = UpstreamMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: "what is this?".into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: "https://x/cat.png".into() },
                },
            ]),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "what is this?"},
                    {"type": "image_url", "image_url": {"url": "https://x/cat.png"}}
                ]
            })
        );
    }

    #[test]
    fn missing_choices_deserialize_as_empty() {
        let resp: CompletionResponse =
            serde_json::from_value(json!({"error": {"message": "rate limited"}})).unwrap();
        assert!(resp.choices.is_empty());
    }

    #[test]
    fn choice_without_content_is_an_error() {
        let parsed: Result<CompletionResponse, _> =
            serde_json::from_value(json!({"choices": [{"message": {}}]}));
        assert!(parsed.is_err());
    }
}
