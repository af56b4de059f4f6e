use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use log;

pub const QUERY_KEY: &str = "query";
pub const FILE_PATH_KEY: &str = "file_path";
pub const DOCUMENT_KEY: &str = "financial_document_data";

/// What one agent stage produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
  pub stage: String,
  pub display_name: String,
  pub agent_role: String,
  pub output: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentState {
  pub data : HashMap<String, Value>,
  pub metadata: HashMap<String, Value>,
  pub stage_outputs: Vec<StageOutput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialAgentStateUpdate {
  pub data: Option<HashMap<String, Value>>,
  pub metadata: Option<HashMap<String, Value>>,
  pub stage_output: Option<StageOutput>,
}


impl AgentState {
  pub fn new() -> Self {
    AgentState {
      data: HashMap::new(), metadata: HashMap::new(), stage_outputs: Vec::new(),
    }
  }

  pub fn merge_data(&mut self, data: HashMap<String, Value>) {
    self.data.extend(data);
  }

  pub fn merge_metadata(&mut self, metadata: HashMap<String, Value>) {
    self.metadata.extend(metadata);
  }

  pub fn data_str(&self, key: &str) -> Option<&str> {
    self.data.get(key).and_then(Value::as_str)
  }

  pub fn show_reasoning(&self) -> bool {
    self.metadata.get("show_reasoning").and_then(Value::as_bool).unwrap_or(false)
  }

  pub fn update_from_partial(&mut self, update: PartialAgentStateUpdate) {
    if let Some(new_data) = update.data {
      self.merge_data(new_data);
    }

    if let Some(new_metadata) = update.metadata {
      self.merge_metadata(new_metadata);
    }

    if let Some(stage_output) = update.stage_output {
      log::debug!("Recorded output of stage {}", stage_output.stage);
      self.stage_outputs.push(stage_output);
    }
  }

  /// Stage outputs in run order, each under its display name.
  pub fn narrative(&self) -> String {
    self.stage_outputs
      .iter()
      .map(|stage| format!("## {}\n\n{}", stage.display_name, stage.output.trim()))
      .collect::<Vec<String>>()
      .join("\n\n")
  }
}


impl PartialAgentStateUpdate {
  pub fn new() -> Self {
    PartialAgentStateUpdate { data: None, metadata: None, stage_output: None }
  }

  pub fn with_data(mut self, data: HashMap<String, Value>) -> Self {
    self.data = Some(data);
    return self;
  }

  pub fn with_stage_output(mut self, stage_output: StageOutput) -> Self {
    self.stage_output = Some(stage_output);
    return self;
  }
}

pub fn show_agent_reasoning(output_str: &str, agent_name: &str) {
  log::info!("\n{:=<10} {:^28} {:=<10}", "", agent_name, "");

  match serde_json::from_str::<serde_json::Value>(output_str) {
    Ok(json_value) => { // Successfully parsed the string as JSON
      match serde_json::to_string_pretty(&json_value) {
        Ok(pretty_json_string) => log::info!("{}", pretty_json_string),
        Err(e) => {
          log::error!("Failed to re-serialize parsed JSON for '{}': {}. Printing raw parsed value.", agent_name, e);
          log::info!("{:?}", json_value);
        }
      }
    }
    Err(_) => { // Plain narrative, print as is
      log::info!("{}", output_str);
    }
  }
  log::info!("{:=<48}", "");
}

#[cfg(test)]
mod tests {
  use super::*;

  fn output(stage: &str, display_name: &str, text: &str) -> StageOutput {
    StageOutput { stage: stage.to_string(), display_name: display_name.to_string(), agent_role: "Role".to_string(), output: text.to_string() }
  }

  #[test]
  fn partial_updates_merge_into_state() {
    let mut state = AgentState::new();
    state.merge_data(HashMap::from([(QUERY_KEY.to_string(), Value::from("q"))]));

    let update = PartialAgentStateUpdate::new()
      .with_data(HashMap::from([(DOCUMENT_KEY.to_string(), Value::from("text"))]))
      .with_stage_output(output("verification", "Verification", "ok"));
    state.update_from_partial(update);

    assert_eq!(state.data_str(QUERY_KEY), Some("q"));
    assert_eq!(state.data_str(DOCUMENT_KEY), Some("text"));
    assert_eq!(state.stage_outputs.len(), 1);
  }

  #[test]
  fn narrative_concatenates_stages_in_order() {
    let mut state = AgentState::new();
    state.stage_outputs.push(output("verification", "Document Verification", " Valid report. "));
    state.stage_outputs.push(output("risk_assessment", "Risk Assessment", "Medium risk."));

    assert_eq!(state.narrative(), "## Document Verification\n\nValid report.\n\n## Risk Assessment\n\nMedium risk.");
  }

  #[test]
  fn show_reasoning_defaults_off() {
    let mut state = AgentState::new();
    assert!(!state.show_reasoning());
    state.merge_metadata(HashMap::from([("show_reasoning".to_string(), Value::from(true))]));
    assert!(state.show_reasoning());
  }
}
