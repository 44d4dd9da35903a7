use crate::{endpoint, ClientError, Result};
use async_trait::async_trait;
use serde_json::json;

/// A language model that turns one prompt into one reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl OpenAiChat {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            temperature,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = endpoint(&self.base_url, "chat/completions");
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": self.temperature,
        });

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "requesting completion");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response.json().await?;
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::Response("no message content in first choice".into()))
    }
}
