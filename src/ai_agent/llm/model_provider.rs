use serde::{Serialize, Deserialize};
use std::str::FromStr;
use std::fmt;
use anyhow::{Result};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelProvider {
  OpenRouter,
  OpenAI,
  Groq,
  Ollama,
}

impl ModelProvider {

  pub fn as_str(&self) -> &'static str {
    match self {
      ModelProvider::OpenRouter => "OpenRouter",
      ModelProvider::OpenAI => "OpenAI",
      ModelProvider::Groq => "Groq",
      ModelProvider::Ollama => "Ollama",
    }
  }

  /// Environment variable holding the API key, if the provider needs one.
  pub fn api_key_var(&self) -> Option<&'static str> {
    match self {
      ModelProvider::OpenRouter => Some("OPENROUTER_API_KEY"),
      ModelProvider::OpenAI => Some("OPENAI_API_KEY"),
      ModelProvider::Groq => Some("GROQ_API_KEY"),
      ModelProvider::Ollama => None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMModelConfig {
  pub provider: ModelProvider,
  pub model_name: String,
  #[serde(skip_serializing)]
  pub api_key: Option<String>,
  pub base_url: Option<String>, // Useful for Ollama or other self-hosted/proxy setups
  pub temperature: Option<f32>,
  pub max_tokens: Option<u32>,
  pub top_p : Option<f32>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role: String, // e.g., "user", "assistant", "system"
  pub content: String,
}

impl ChatMessage {
  pub fn system(content: impl Into<String>) -> Self {
    ChatMessage { role: "system".to_string(), content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    ChatMessage { role: "user".to_string(), content: content.into() }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    ChatMessage { role: "assistant".to_string(), content: content.into() }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
  pub content: String,
}

impl fmt::Display for ModelProvider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ModelProvider {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "openrouter" => Ok(ModelProvider::OpenRouter),
      "openai" => Ok(ModelProvider::OpenAI),
      "groq" => Ok(ModelProvider::Groq),
      "ollama" => Ok(ModelProvider::Ollama),
      _ => Err(format!("Unknown model provider: {}", s)),
    }
  }
}

#[async_trait]
pub trait LLMChatter : Send + Sync {
  async fn chat(&self, messages: Vec<ChatMessage>,config : &LLMModelConfig) -> Result<LLMResponse>;

}
