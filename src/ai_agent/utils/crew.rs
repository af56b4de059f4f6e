use std::collections::HashMap;

use crate::ai_agent::agents::agent::CrewAgent;
use crate::ai_agent::agents::financial_analyst::FinancialAnalystAgent;
use crate::ai_agent::agents::investment_advisor::InvestmentAdvisorAgent;
use crate::ai_agent::agents::risk_assessor::RiskAssessorAgent;
use crate::ai_agent::agents::verifier::VerifierAgent;
use crate::ai_agent::tools::financial_tools::Toolbox;

pub type AgentBuilder = fn(&Toolbox) -> CrewAgent;

pub struct StageConfig {
  pub display_name: String,
  pub agent_builder: AgentBuilder,
  pub order: usize,
}

pub fn get_stage_config() -> HashMap<String, StageConfig> {
  let mut config: HashMap<String, StageConfig> = HashMap::new();

  config.insert("verification".to_string(), StageConfig {
    display_name: "Document Verification".to_string(),
    agent_builder: VerifierAgent::build,
    order: 1,
  });
  config.insert("financial_analysis".to_string(), StageConfig {
    display_name: "Financial Analysis".to_string(),
    agent_builder: FinancialAnalystAgent::build,
    order: 2,
  });
  config.insert("investment_analysis".to_string(), StageConfig {
    display_name: "Investment Analysis".to_string(),
    agent_builder: InvestmentAdvisorAgent::build,
    order: 3,
  });
  config.insert("risk_assessment".to_string(), StageConfig {
    display_name: "Risk Assessment".to_string(),
    agent_builder: RiskAssessorAgent::build,
    order: 4,
  });

  return config;
}

/// (key, stage) pairs in run order.
pub fn get_stage_order() -> Vec<(String, StageConfig)> {
  let mut stages: Vec<(String, StageConfig)> = get_stage_config().into_iter().collect();
  stages.sort_by_key(|(_, config)| config.order);
  return stages;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stages_run_in_fixed_order() {
    let keys: Vec<String> = get_stage_order().into_iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["verification", "financial_analysis", "investment_analysis", "risk_assessment"]);
  }

  #[test]
  fn each_stage_builds_its_agent_with_its_tools() {
    let toolbox = Toolbox::new();
    let agents: Vec<(String, Vec<&'static str>)> = get_stage_order()
      .into_iter()
      .map(|(key, config)| {
        let agent = (config.agent_builder)(&toolbox);
        assert_eq!(agent.task.name, key);
        assert_eq!(agent.task.display_name, config.display_name);
        (agent.profile.role.to_string(), agent.tool_names())
      })
      .collect();

    assert_eq!(agents[0], ("Financial Document Verifier".to_string(), vec!["financial_document_reader"]));
    assert_eq!(agents[1], (
      "Senior Financial Analyst".to_string(),
      vec!["financial_document_reader", "investment_analysis", "risk_assessment"]
    ));
    assert_eq!(agents[2], ("Investment Advisor".to_string(), vec!["financial_document_reader", "investment_analysis"]));
    assert_eq!(agents[3], ("Risk Assessment Specialist".to_string(), vec!["financial_document_reader", "risk_assessment"]));
  }
}
