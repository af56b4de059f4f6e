use crate::ai_agent::agents::agent::{AgentProfile, CrewAgent, TaskSpec};
use crate::ai_agent::tools::financial_tools::Toolbox;

pub const VERIFIER: AgentProfile = AgentProfile {
  role: "Financial Document Verifier",
  goal: "Verify the authenticity, structure, and relevance of uploaded financial documents. Ensure they are valid before analysis.",
  backstory: "You are a compliance officer specializing in financial reporting. \
              You carefully review uploaded documents to confirm they are valid financial reports. \
              You look for key indicators such as balance sheets, income statements, \
              cash flow statements, and financial disclosures. \
              You ensure accuracy, authenticity, and compliance with reporting standards.",
};

pub const VERIFICATION: TaskSpec = TaskSpec {
  name: "verification",
  display_name: "Document Verification",
  description: "Check whether the uploaded file is a valid financial document related to the user's query: {query}. \
                Look for key sections like balance sheets, income statements, or cash flow statements. \
                Verify whether the content appears authentic and suitable for financial analysis.",
  expected_output: "A verification summary including:\n\
                    - Confirmation if the document is financial in nature\n\
                    - Which financial sections were identified\n\
                    - Any concerns about authenticity or completeness",
};

pub struct VerifierAgent;

impl VerifierAgent {
  pub fn build(toolbox: &Toolbox) -> CrewAgent {
    CrewAgent::new(VERIFIER, VERIFICATION, vec![toolbox.document_reader.clone()])
  }
}
