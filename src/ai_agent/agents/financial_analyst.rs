use crate::ai_agent::agents::agent::{AgentProfile, CrewAgent, TaskSpec};
use crate::ai_agent::tools::financial_tools::Toolbox;

pub const FINANCIAL_ANALYST: AgentProfile = AgentProfile {
  role: "Senior Financial Analyst",
  goal: "Provide accurate and professional investment analysis based on financial documents and data. Always ensure compliance and clear reasoning.",
  backstory: "You are an experienced financial analyst with deep expertise in markets, \
              valuation techniques, and financial modeling. \
              You carefully read and interpret financial reports, focusing on fundamentals \
              like revenue growth, profitability, leverage, and liquidity. \
              You always provide balanced, risk-aware insights supported by evidence. \
              You communicate findings clearly and avoid speculation.",
};

pub const FINANCIAL_ANALYSIS: TaskSpec = TaskSpec {
  name: "financial_analysis",
  display_name: "Financial Analysis",
  description: "Analyze the uploaded financial document at {file_path} for insights.\n\
                User query: {query}\n\
                Extract key financial data, summarize trends, identify risks, and provide investment recommendations.",
  expected_output: "A detailed financial analysis including:\n\
                    - Revenue, profit, and cash flow trends\n\
                    - Risk factors\n\
                    - Investment opportunities\n\
                    - Clear actionable recommendations",
};

pub struct FinancialAnalystAgent;

impl FinancialAnalystAgent {
  pub fn build(toolbox: &Toolbox) -> CrewAgent {
    CrewAgent::new(FINANCIAL_ANALYST, FINANCIAL_ANALYSIS, vec![
      toolbox.document_reader.clone(),
      toolbox.investment_analysis.clone(),
      toolbox.risk_assessment.clone(),
    ])
  }
}
