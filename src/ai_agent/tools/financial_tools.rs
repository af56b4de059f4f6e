use std::path::Path;
use std::sync::Arc;

use crate::ai_agent::data::document::read_document;
use crate::ai_agent::data::report::{analyze_investment, assess_risk};
use crate::ai_agent::tools::tool::{FinancialTool, ToolContext, ToolError, ToolSpec};

pub const DOCUMENT_READER_SPEC: ToolSpec = ToolSpec {
  name: "financial_document_reader",
  description: "Reads and extracts structured text data from a financial PDF, with table rows flattened and formatting cleaned.",
  inputs: &["path"],
  output: "normalized document text",
};

pub const INVESTMENT_ANALYSIS_SPEC: ToolSpec = ToolSpec {
  name: "investment_analysis",
  description: "Extracts revenue, net income, EPS and debt-to-equity and applies leverage and profitability rules.",
  inputs: &["financial_document_data"],
  output: "investment analysis report",
};

pub const RISK_ASSESSMENT_SPEC: ToolSpec = ToolSpec {
  name: "risk_assessment",
  description: "Extracts current ratio and debt-to-equity, flags volatility mentions and applies liquidity and leverage rules.",
  inputs: &["financial_document_data"],
  output: "risk assessment report",
};

/// Text substituted for the document when the PDF cannot be parsed.
pub fn document_error_text(error: &impl std::fmt::Display) -> String {
  format!("❌ Error parsing PDF: {}", error)
}

/// Reads the PDF at `path`, substituting an error string on failure so the
/// run can continue with whatever the agents can still say.
pub fn load_document_text(path: &Path) -> String {
  match read_document(path) {
    Ok(content) => content,
    Err(e) => {
      log::warn!("Could not parse {}: {}", path.display(), e);
      document_error_text(&e)
    }
  }
}

/// Hands the stage the document text read once at intake.
pub struct DocumentReaderTool;

impl FinancialTool for DocumentReaderTool {
  fn spec(&self) -> &'static ToolSpec {
    &DOCUMENT_READER_SPEC
  }

  fn run(&self, ctx: &ToolContext<'_>) -> Result<String, ToolError> {
    log::debug!("Providing document text for {}", ctx.file_path);
    Ok(ctx.financial_document_data.to_string())
  }
}

pub struct InvestmentAnalysisTool;

impl FinancialTool for InvestmentAnalysisTool {
  fn spec(&self) -> &'static ToolSpec {
    &INVESTMENT_ANALYSIS_SPEC
  }

  fn run(&self, ctx: &ToolContext<'_>) -> Result<String, ToolError> {
    Ok(analyze_investment(ctx.financial_document_data)?.into_string())
  }
}

pub struct RiskAssessmentTool;

impl FinancialTool for RiskAssessmentTool {
  fn spec(&self) -> &'static ToolSpec {
    &RISK_ASSESSMENT_SPEC
  }

  fn run(&self, ctx: &ToolContext<'_>) -> Result<String, ToolError> {
    Ok(assess_risk(ctx.financial_document_data)?.into_string())
  }
}

/// Shared tool instances handed to the agents.
#[derive(Clone)]
pub struct Toolbox {
  pub document_reader: Arc<dyn FinancialTool>,
  pub investment_analysis: Arc<dyn FinancialTool>,
  pub risk_assessment: Arc<dyn FinancialTool>,
}

impl Toolbox {
  pub fn new() -> Self {
    Toolbox {
      document_reader: Arc::new(DocumentReaderTool),
      investment_analysis: Arc::new(InvestmentAnalysisTool),
      risk_assessment: Arc::new(RiskAssessmentTool),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TEXT: &str = "Revenue: $200M Net Income: $30M Current Ratio: 1.5 Debt-to-Equity: 0.7";

  fn ctx() -> ToolContext<'static> {
    ToolContext { file_path: "data/financial_document_test.pdf", financial_document_data: TEXT }
  }

  #[test]
  fn reader_returns_the_intake_text() {
    assert_eq!(DocumentReaderTool.run(&ctx()).unwrap(), TEXT);
    assert_eq!(DocumentReaderTool.name(), "financial_document_reader");
  }

  #[test]
  fn investment_tool_builds_the_report() {
    let report = InvestmentAnalysisTool.run(&ctx()).unwrap();
    assert!(report.contains("- Profit Margin: 15.00%"));
    assert!(report.contains("✅ Healthy leverage"));
  }

  #[test]
  fn risk_tool_builds_the_report() {
    let report = RiskAssessmentTool.run(&ctx()).unwrap();
    assert!(report.contains("⚠️ Moderate liquidity risk."));
    assert!(report.contains("✅ Acceptable leverage level."));
  }

  #[test]
  fn unreadable_documents_become_error_text() {
    let text = load_document_text(Path::new("/nonexistent/financial_document.pdf"));
    assert!(text.starts_with("❌ Error parsing PDF: Failed to load PDF"));
  }

  #[test]
  fn specs_declare_their_inputs() {
    let toolbox = Toolbox::new();
    assert_eq!(toolbox.document_reader.spec().inputs, &["path"]);
    assert_eq!(toolbox.investment_analysis.spec().inputs, &["financial_document_data"]);
    assert_eq!(toolbox.risk_assessment.spec().output, "risk assessment report");
  }
}
