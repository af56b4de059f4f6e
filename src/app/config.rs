use std::env;
use std::str::FromStr;

use log;

use crate::ai_agent::llm::model_provider::{LLMModelConfig, ModelProvider};
use crate::ai_agent::llm::models::DEFAULT_MODEL;

pub const DEFAULT_QUERY: &str = "Analyze this financial document for investment insights";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
  pub model_provider: ModelProvider,
  pub model_name: String,
  pub llm_api_key: Option<String>,
  pub llm_base_url: Option<String>,
  pub llm_temperature: f32,
  pub llm_max_tokens: u32,
  pub server_host: String,
  pub server_port: u16,
  pub upload_dir: String,
  pub max_upload_bytes: usize,
  pub show_reasoning: bool,
}

fn parse_or_default<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
  match value {
    Some(raw) => match raw.trim().parse::<T>() {
      Ok(parsed) => parsed,
      Err(_) => {
        log::error!("Invalid value {:?} for {}, using default", raw, key);
        default
      }
    },
    None => default,
  }
}

impl Config {

  pub fn load() -> Self {
    match dotenv::dotenv() {
      Ok(_) => log::info!("Loaded .env file"),
      Err(_) => log::warn!("No .env file found"),
    }

    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Builds the config from any key lookup; missing or malformed values fall back to defaults.
  pub fn from_lookup<F>(lookup: F) -> Self where F: Fn(&str) -> Option<String> {
    let model_provider: ModelProvider = match lookup("LLM_PROVIDER") {
      Some(raw) => ModelProvider::from_str(&raw).unwrap_or_else(|e| {
        log::error!("{}, using OpenRouter", e);
        ModelProvider::OpenRouter
      }),
      None => ModelProvider::OpenRouter,
    };

    let model_name: String = lookup("LLM_MODEL").unwrap_or_else(|| {
      log::info!("LLM_MODEL not set, using default {}", DEFAULT_MODEL);
      DEFAULT_MODEL.to_string()
    });

    let llm_api_key: Option<String> = model_provider.api_key_var().and_then(|var| {
      let key = lookup(var);
      if key.is_none() {
        log::error!("Warning: {} not found, LLM calls will fail", var);
      }
      key
    });

    let llm_base_url: Option<String> = lookup("LLM_BASE_URL");
    let llm_temperature: f32 = parse_or_default("LLM_TEMPERATURE", lookup("LLM_TEMPERATURE"), 0.7);
    let llm_max_tokens: u32 = parse_or_default("LLM_MAX_TOKENS", lookup("LLM_MAX_TOKENS"), 2048);
    let server_host: String = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port: u16 = parse_or_default("SERVER_PORT", lookup("SERVER_PORT"), 8001);
    let upload_dir: String = lookup("UPLOAD_DIR").unwrap_or_else(|| "data".to_string());
    let max_upload_bytes: usize = parse_or_default("MAX_UPLOAD_BYTES", lookup("MAX_UPLOAD_BYTES"), DEFAULT_MAX_UPLOAD_BYTES);
    let show_reasoning: bool = parse_or_default("SHOW_REASONING", lookup("SHOW_REASONING"), false);

    return Config {
      model_provider, model_name, llm_api_key, llm_base_url, llm_temperature, llm_max_tokens,
      server_host, server_port, upload_dir, max_upload_bytes, show_reasoning,
    }
  }

  pub fn llm_model_config(&self) -> LLMModelConfig {
    LLMModelConfig {
      provider: self.model_provider.clone(),
      model_name: self.model_name.clone(),
      api_key: self.llm_api_key.clone(),
      base_url: self.llm_base_url.clone(),
      temperature: Some(self.llm_temperature),
      max_tokens: Some(self.llm_max_tokens),
      top_p: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Config::from_lookup(|key| vars.get(key).cloned())
  }

  #[test]
  fn defaults_match_the_reference_deployment() {
    let config = config_from(&[]);
    assert_eq!(config.model_provider, ModelProvider::OpenRouter);
    assert_eq!(config.model_name, "openai/gpt-oss-20b:free");
    assert_eq!(config.llm_api_key, None);
    assert_eq!(config.llm_temperature, 0.7);
    assert_eq!(config.server_host, "127.0.0.1");
    assert_eq!(config.server_port, 8001);
    assert_eq!(config.upload_dir, "data");
    assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
    assert!(!config.show_reasoning);
  }

  #[test]
  fn api_key_comes_from_the_provider_variable() {
    let config = config_from(&[("LLM_PROVIDER", "groq"), ("GROQ_API_KEY", "gsk"), ("OPENROUTER_API_KEY", "or")]);
    assert_eq!(config.model_provider, ModelProvider::Groq);
    assert_eq!(config.llm_api_key.as_deref(), Some("gsk"));
    assert_eq!(config.llm_model_config().api_key.as_deref(), Some("gsk"));
  }

  #[test]
  fn malformed_values_fall_back() {
    let config = config_from(&[("SERVER_PORT", "eighty"), ("LLM_TEMPERATURE", "hot"), ("LLM_PROVIDER", "nope"), ("SHOW_REASONING", "true"), ("MAX_UPLOAD_BYTES", "-1")]);
    assert_eq!(config.server_port, 8001);
    assert_eq!(config.llm_temperature, 0.7);
    assert_eq!(config.model_provider, ModelProvider::OpenRouter);
    assert!(config.show_reasoning);
    assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
  }
}
