use std::env; // For environment variables
use std::sync::Arc;
use anyhow::{Result, anyhow};


use crate::ai_agent::llm::model_provider::{LLMModelConfig, ModelProvider, LLMChatter};
use crate::ai_agent::llm::openai_compatible::OpenAICompatibleProvider;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b:free";

pub fn default_base_url(provider: &ModelProvider) -> String {
  match provider {
    ModelProvider::OpenRouter => "https://openrouter.ai/api/v1".to_string(),
    ModelProvider::OpenAI => "https://api.openai.com/v1".to_string(),
    ModelProvider::Groq => "https://api.groq.com/openai/v1".to_string(),
    ModelProvider::Ollama => {
      let ollama_host = env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string());
      format!("http://{}:11434/v1", ollama_host)
    }
  }
}

pub fn get_model(config: &LLMModelConfig) -> Result<Arc<dyn LLMChatter>> {
  log::info!("Initializing LLM client for provider: {}, model: {}", config.provider,config.model_name);

  let base_url: String = match config.base_url.as_deref() {
    Some(url) if !url.trim().is_empty() => url.to_string(),
    _ => default_base_url(&config.provider),
  };

  let api_key: Option<String> = config.api_key.clone().filter(|key| !key.trim().is_empty());

  if let Some(var) = config.provider.api_key_var() {
    if api_key.is_none() {
      return Err(anyhow!("{} API key not found. Set {} in the environment or .env file.", config.provider, var));
    }
  }

  log::info!("{} configured with base_url: {}", config.provider, base_url);
  let client = OpenAICompatibleProvider::new(&base_url, api_key, &config.model_name);
  return Ok(Arc::new(client));
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(provider: ModelProvider, api_key: Option<&str>, base_url: Option<&str>) -> LLMModelConfig {
    LLMModelConfig {
      provider,
      model_name: DEFAULT_MODEL.to_string(),
      api_key: api_key.map(String::from),
      base_url: base_url.map(String::from),
      temperature: Some(0.7),
      max_tokens: None,
      top_p: None,
    }
  }

  #[test]
  fn hosted_providers_require_a_key() {
    let err = get_model(&config(ModelProvider::OpenRouter, None, None)).err().unwrap();
    assert!(err.to_string().contains("OPENROUTER_API_KEY"));

    let blank = get_model(&config(ModelProvider::Groq, Some("  "), None)).err().unwrap();
    assert!(blank.to_string().contains("GROQ_API_KEY"));
  }

  #[test]
  fn ollama_runs_without_a_key() {
    assert!(get_model(&config(ModelProvider::Ollama, None, Some("http://127.0.0.1:11434/v1"))).is_ok());
  }

  #[test]
  fn hosted_defaults() {
    assert_eq!(default_base_url(&ModelProvider::OpenRouter), "https://openrouter.ai/api/v1");
    assert_eq!(default_base_url(&ModelProvider::Groq), "https://api.groq.com/openai/v1");
  }
}
