use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ai_agent::graph::graph::{CrewContext, NodeFunction};
use crate::ai_agent::graph::state::{show_agent_reasoning, AgentState, PartialAgentStateUpdate, StageOutput, DOCUMENT_KEY, FILE_PATH_KEY, QUERY_KEY};
use crate::ai_agent::llm::model_provider::ChatMessage;
use crate::ai_agent::tools::tool::{FinancialTool, ToolContext};

/// Who the agent is: sent as the system prompt.
#[derive(Debug, Clone, Copy)]
pub struct AgentProfile {
  pub role: &'static str,
  pub goal: &'static str,
  pub backstory: &'static str,
}

/// What the agent is asked to do. `{query}` and `{file_path}` are filled from the run inputs.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
  pub name: &'static str,
  pub display_name: &'static str,
  pub description: &'static str,
  pub expected_output: &'static str,
}

/// One stage of the crew: an agent profile, its task and the tools it may use.
pub struct CrewAgent {
  pub profile: AgentProfile,
  pub task: TaskSpec,
  pub tools: Vec<Arc<dyn FinancialTool>>,
}

pub fn interpolate(template: &str, inputs: &HashMap<&str, &str>) -> String {
  let mut rendered: String = template.to_string();
  for (key, value) in inputs {
    rendered = rendered.replace(&format!("{{{}}}", key), value);
  }
  rendered
}

impl CrewAgent {
  pub fn new(profile: AgentProfile, task: TaskSpec, tools: Vec<Arc<dyn FinancialTool>>) -> Self {
    CrewAgent { profile, task, tools }
  }

  pub fn tool_names(&self) -> Vec<&'static str> {
    self.tools.iter().map(|tool| tool.name()).collect()
  }

  fn system_prompt(&self) -> String {
    format!(
      "You are {}. {}\nYour personal goal is: {}",
      self.profile.role, self.profile.backstory, self.profile.goal
    )
  }

  /// Runs every tool against the document. A failing tool is reported to the
  /// agent in place of its output instead of stopping the stage.
  fn run_tools(&self, ctx: &ToolContext<'_>) -> Vec<(&'static str, String)> {
    self.tools.iter().map(|tool| {
      log::debug!("[{}] Running tool {}: {}", self.profile.role, tool.name(), tool.spec().description);
      let output: String = match tool.run(ctx) {
        Ok(output) => output,
        Err(e) => {
          log::warn!("[{}] Tool {} failed: {}", self.profile.role, tool.name(), e);
          format!("Tool {} failed: {}", tool.name(), e)
        }
      };
      (tool.name(), output)
    }).collect()
  }

  pub fn build_messages(&self, state: &AgentState) -> Vec<ChatMessage> {
    let query: &str = state.data_str(QUERY_KEY).unwrap_or_default();
    let file_path: &str = state.data_str(FILE_PATH_KEY).unwrap_or_default();
    let document: &str = state.data_str(DOCUMENT_KEY).unwrap_or_default();

    let inputs: HashMap<&str, &str> = HashMap::from([(QUERY_KEY, query), (FILE_PATH_KEY, file_path)]);
    let tool_ctx = ToolContext { file_path, financial_document_data: document };

    let mut prompt: String = format!(
      "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\nYou MUST return the actual complete content as the final answer, not a summary.",
      interpolate(self.task.description, &inputs),
      self.task.expected_output
    );

    for (name, output) in self.run_tools(&tool_ctx) {
      prompt.push_str(&format!("\n\n# Tool result: {}\n{}", name, output));
    }

    if !state.stage_outputs.is_empty() {
      prompt.push_str("\n\n# Context from previous tasks");
      for previous in &state.stage_outputs {
        prompt.push_str(&format!("\n\n## {} ({})\n{}", previous.display_name, previous.agent_role, previous.output));
      }
    }

    prompt.push_str("\n\nBegin! This is VERY important to you, use the tools available and give your best Final Answer.");

    vec![ChatMessage::system(self.system_prompt()), ChatMessage::user(prompt)]
  }

  pub async fn perform(&self, state: AgentState, ctx: CrewContext) -> Result<PartialAgentStateUpdate> {
    let messages: Vec<ChatMessage> = self.build_messages(&state);

    log::info!("[{}] Calling LLM for task {} with tools {:?}", self.profile.role, self.task.name, self.tool_names());

    let response = ctx.llm.chat(messages, &ctx.model_config).await
      .with_context(|| format!("{} could not complete task {}", self.profile.role, self.task.name))?;

    log::debug!("[{}] LLM raw response: {}", self.profile.role, response.content);

    if state.show_reasoning() {
      show_agent_reasoning(&response.content, self.profile.role);
    }

    let stage_output = StageOutput {
      stage: self.task.name.to_string(),
      display_name: self.task.display_name.to_string(),
      agent_role: self.profile.role.to_string(),
      output: response.content,
    };

    return Ok(PartialAgentStateUpdate::new().with_stage_output(stage_output));
  }
}

#[async_trait]
impl NodeFunction for CrewAgent {
  async fn call(&self, state: AgentState, ctx: CrewContext) -> Result<PartialAgentStateUpdate> {
    self.perform(state, ctx).await
  }
}
