use crate::ai_agent::llm::model_provider::{ChatMessage, LLMChatter, LLMModelConfig, LLMResponse};

use reqwest::{header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE}, Client, Response};
use serde::{Deserialize, Serialize};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;


#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
  messages: &'a [ChatMessage],
  model: &'a str,              // e.g., "openai/gpt-oss-20b:free"
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  top_p: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
  #[serde(default)]
  content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
  message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
}

/// Chat client for any OpenAI-style `/chat/completions` endpoint
/// (OpenRouter, OpenAI, Groq, Ollama).
pub struct OpenAICompatibleProvider {
  chat_url : String,
  api_key : Option<String>,
  model_name: String,
  client : Client
}

impl OpenAICompatibleProvider {

  pub fn new(base_url: &str, api_key: Option<String>, model_name: &str) -> Self {
    let chat_url: String = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    OpenAICompatibleProvider {chat_url, api_key, model_name: model_name.to_string(), client: Client::new()}
  }

  pub fn chat_url(&self) -> &str {
    &self.chat_url
  }

  fn headers(&self) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(api_key) = &self.api_key {
      let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).context("API key is not a valid header value")?;
      headers.insert(AUTHORIZATION, bearer);
    }
    Ok(headers)
  }
}

#[async_trait]
impl LLMChatter for OpenAICompatibleProvider {
  async fn chat(&self, messages: Vec<ChatMessage>, config: &LLMModelConfig) -> Result<LLMResponse> {
    let request = ChatCompletionRequest {
      model: &self.model_name,
      messages: &messages,
      temperature: config.temperature,
      max_tokens: config.max_tokens,
      top_p: config.top_p,
    };

    let response: Response = self.client.post(&self.chat_url).headers(self.headers()?).json(&request).send().await
      .with_context(|| format!("Failed to reach {} at {}", config.provider, self.chat_url))?;

    let status = response.status();
    if !status.is_success() {
      let body: String = response.text().await.unwrap_or_default();
      log::error!("Error getting response from {}: {} {}", config.provider, status, body);
      return Err(anyhow!("{} returned {}: {}", config.provider, status, body));
    }

    let completion : ChatCompletionResponse = response.json().await.context("Malformed chat completion response")?;
    // Pull out the first choice (or fail)
    let first : ChatChoice = completion.choices.into_iter().next().ok_or_else(|| anyhow!("No response choices received from {}", config.provider))?;
    return Ok(LLMResponse{
      content: first.message.content.unwrap_or_default()
    });
  }
}
