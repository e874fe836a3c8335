use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::LlmSettings;

use super::chroma::Embedder;
use super::error::{CollaboratorError, check_status};
use super::retry::RetryPolicy;
use super::{GenerationRequest, ResponseFormat, TextGenerator};

const SERVICE: &str = "text generation";

/// Client for an OpenAI-compatible chat completions and embeddings API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
    max_tokens: u32,
    timeout: Duration,
    retry: RetryPolicy,
}

impl OpenAiClient {
    pub fn new(settings: &LlmSettings, retry: RetryPolicy) -> Result<Self, CollaboratorError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|source| CollaboratorError::Network {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            embedding_model: settings.embedding_model.clone(),
            max_tokens: settings.max_tokens,
            timeout,
            retry,
        })
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CollaboratorError> {
        let url = format!("{}/chat/completions", self.base_url);
        self.retry
            .run("chat_completion", || self.post_json(&url, request))
            .await
    }

    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, CollaboratorError> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input,
        };
        let response: EmbeddingResponse = self
            .retry
            .run("embeddings", || self.post_json(&url, &request))
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| CollaboratorError::malformed(SERVICE, "embedding response had no data"))
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, CollaboratorError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(url, "POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| CollaboratorError::from_reqwest(SERVICE, self.timeout, err))?;

        let response = check_status(SERVICE, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| CollaboratorError::from_reqwest(SERVICE, self.timeout, err))
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, CollaboratorError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage {
                role: ChatMessageRole::System,
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: ChatMessageRole::User,
            content: request.user,
        });

        let chat_request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.max_tokens),
            temperature: Some(0.0),
            response_format: match request.format {
                ResponseFormat::Json => Some(ResponseFormatParam::json_object()),
                ResponseFormat::Text => None,
            },
        };

        let response = self.chat_completion(&chat_request).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                CollaboratorError::malformed(SERVICE, "completion returned no choices")
            })?;
        debug!(finish_reason = ?choice.finish_reason, "completion received");

        let content = choice.message.content.trim().to_string();
        if content.is_empty() {
            return Err(CollaboratorError::malformed(SERVICE, "completion was empty"));
        }
        Ok(content)
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        self.embeddings(text).await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormatParam>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormatParam {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormatParam {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatMessageRole,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
