use thiserror::Error;

use crate::ai_agent::data::metrics::ExtractionError;

/// Declared surface of a tool: what it is called, what it reads and what it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
  pub name: &'static str,
  pub description: &'static str,
  pub inputs: &'static [&'static str],
  pub output: &'static str,
}

/// Inputs available to a tool during one stage.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
  pub file_path: &'a str,
  pub financial_document_data: &'a str,
}

#[derive(Error, Debug)]
pub enum ToolError {
  #[error(transparent)]
  Extraction(#[from] ExtractionError),
}

pub trait FinancialTool: Send + Sync {
  fn spec(&self) -> &'static ToolSpec;

  fn run(&self, ctx: &ToolContext<'_>) -> Result<String, ToolError>;

  fn name(&self) -> &'static str {
    self.spec().name
  }
}
