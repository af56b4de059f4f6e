use crate::ai_agent::agents::agent::{AgentProfile, CrewAgent, TaskSpec};
use crate::ai_agent::tools::financial_tools::Toolbox;

pub const RISK_ASSESSOR: AgentProfile = AgentProfile {
  role: "Risk Assessment Specialist",
  goal: "Identify, evaluate, and communicate financial risks from company documents and market data in a balanced manner.",
  backstory: "You are a financial risk management expert. \
              You assess credit risk, liquidity risk, market volatility, and operational risks \
              from financial reports. \
              You provide structured risk evaluations, including high, medium, and low-risk classifications. \
              Your insights are careful, evidence-based, and always consider both opportunities and threats.",
};

pub const RISK_ASSESSMENT: TaskSpec = TaskSpec {
  name: "risk_assessment",
  display_name: "Risk Assessment",
  description: "Assess the financial and market risks associated with the company based on the provided financial document. \
                Consider credit risk, liquidity risk, leverage, and market volatility. \
                Provide a clear, structured risk assessment report for the user's query: {query}.",
  expected_output: "A structured risk assessment including:\n\
                    - Identification of key risk factors\n\
                    - Evaluation of liquidity, leverage, and profitability risks\n\
                    - Market and operational risks if identifiable\n\
                    - A final risk classification (Low, Medium, or High)",
};

pub struct RiskAssessorAgent;

impl RiskAssessorAgent {
  pub fn build(toolbox: &Toolbox) -> CrewAgent {
    CrewAgent::new(RISK_ASSESSOR, RISK_ASSESSMENT, vec![
      toolbox.document_reader.clone(),
      toolbox.risk_assessment.clone(),
    ])
  }
}
