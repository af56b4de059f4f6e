use crate::ai_agent::agents::agent::{AgentProfile, CrewAgent, TaskSpec};
use crate::ai_agent::tools::financial_tools::Toolbox;

pub const INVESTMENT_ADVISOR: AgentProfile = AgentProfile {
  role: "Investment Advisor",
  goal: "Provide responsible investment recommendations based on verified financial documents and analysis. Prioritize client goals and risk tolerance.",
  backstory: "You are a trusted investment advisor with experience in equities, bonds, and diversified portfolios. \
              You use verified financial analysis to recommend suitable investment strategies. \
              You always consider risk levels, investor objectives, and compliance regulations. \
              Your recommendations are data-driven and client-focused, not speculative.",
};

pub const INVESTMENT_ANALYSIS: TaskSpec = TaskSpec {
  name: "investment_analysis",
  display_name: "Investment Analysis",
  description: "Use the verified financial document and query: {query} to provide an investment-focused analysis. \
                Identify whether the company or its sector shows potential for growth, stability, or risk. \
                Recommend responsible investment actions based on data, such as buy/hold/sell considerations. \
                Consider both opportunities and potential risks.",
  expected_output: "An investment recommendation report including:\n\
                    - Summary of financial strengths and weaknesses\n\
                    - Opportunities for investment\n\
                    - Potential risks to watch out for\n\
                    - Clear recommendation (Buy, Hold, or Sell) with rationale",
};

pub struct InvestmentAdvisorAgent;

impl InvestmentAdvisorAgent {
  pub fn build(toolbox: &Toolbox) -> CrewAgent {
    CrewAgent::new(INVESTMENT_ADVISOR, INVESTMENT_ANALYSIS, vec![
      toolbox.document_reader.clone(),
      toolbox.investment_analysis.clone(),
    ])
  }
}
