// src/ai_agent/graph/graph.rs
use std::collections::{HashMap, HashSet};
use async_trait::async_trait;
use anyhow::{Result, Error};
use std::sync::Arc;
use std::future::Future;
use std::pin::Pin;

use crate::ai_agent::graph::state::{AgentState, PartialAgentStateUpdate, StageOutput};
use crate::ai_agent::llm::model_provider::{LLMChatter, LLMModelConfig};

pub const END_NODE: &str = "END";

/// Shared by every node of a run: the LLM client and the sampling settings.
#[derive(Clone)]
pub struct CrewContext {
  pub llm: Arc<dyn LLMChatter>,
  pub model_config: LLMModelConfig,
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
  #[error("graph has no entry point")]
  MissingEntryPoint,

  #[error("node not found: {0}")]
  NodeNotFound(String),

  #[error("no edges defined for node: {0}")]
  DeadEnd(String),

  #[error("cycle detected at node: {0}")]
  CycleDetected(String),

  #[error("stage '{stage}' failed: {message}")]
  StageFailed {
    stage: String,
    message: String,
    completed: Vec<StageOutput>,
  },
}

// Define a trait for node functions
#[async_trait]
pub trait NodeFunction: Send + Sync {
  async fn call(&self, state: AgentState, ctx: CrewContext) -> Result<PartialAgentStateUpdate>;
}

// Allow Fn types to be used as NodeFunction
#[async_trait]
impl<F> NodeFunction for F where F: Fn(AgentState, CrewContext) -> Pin<Box<dyn Future<Output = Result<PartialAgentStateUpdate, Error>> + Send>> + Send + Sync,
{
    async fn call(&self, state: AgentState, ctx: CrewContext) -> Result<PartialAgentStateUpdate> {
      let future = self(state, ctx);
      future.await
    }
}

pub struct StateGraph {
  nodes: HashMap<String, Box<dyn NodeFunction>>,
  edges: HashMap<String, Vec<String>>,
  entry_point: Option<String>,
}

impl StateGraph {
  pub fn new() -> Self {
    StateGraph {
      nodes: HashMap::new(),
      edges: HashMap::new(),
      entry_point: None,
    }
  }

  pub fn add_node<F>(&mut self, name: &str, func: F) where F: NodeFunction + 'static, {
    self.nodes.insert(name.to_string(), Box::new(func));
    self.edges.entry(name.to_string()).or_insert_with(Vec::new);
  }

  pub fn add_edge(&mut self, from: &str, to: &str) {
    self.edges.entry(from.to_string()).or_insert_with(Vec::new).push(to.to_string());
  }

  pub fn set_entry_point(&mut self, node: &str) {
    self.entry_point = Some(node.to_string());
  }

  /// Resolves the run order by following the first edge of each node until END.
  /// Misconfigured graphs are rejected here, before any stage runs.
  pub fn compile(self) -> std::result::Result<CompiledGraph, PipelineError> {
    let mut current_node: String = self.entry_point.clone().ok_or(PipelineError::MissingEntryPoint)?;
    let mut order: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();

    while current_node != END_NODE {
      if !visited.insert(current_node.clone()) {
        return Err(PipelineError::CycleDetected(current_node));
      }
      if !self.nodes.contains_key(&current_node) {
        return Err(PipelineError::NodeNotFound(current_node));
      }

      let next_node: String = match self.edges.get(&current_node).and_then(|next| next.first()) {
        Some(next) => next.clone(),
        None => return Err(PipelineError::DeadEnd(current_node)),
      };
      order.push(current_node);
      current_node = next_node;
    }

    Ok(CompiledGraph { graph: Arc::new(self), order: Arc::new(order) })
  }
}

#[derive(Clone)]
pub struct CompiledGraph {
  graph: Arc<StateGraph>,
  order: Arc<Vec<String>>,
}

impl CompiledGraph {
  pub fn stages(&self) -> &[String] {
    &self.order
  }

  /// Runs every node in order. The first failing node stops the run; nothing
  /// after it is invoked and nothing is retried.
  pub async fn invoke(&self, initial_state: AgentState, ctx: CrewContext) -> std::result::Result<AgentState, PipelineError> {
    let mut current_state = initial_state;

    for node_name in self.order.iter() {
      let node_func = self.graph.nodes.get(node_name).ok_or_else(|| PipelineError::NodeNotFound(node_name.clone()))?;

      log::info!("Running stage {}", node_name);
      match node_func.call(current_state.clone(), ctx.clone()).await {
        Ok(update) => current_state.update_from_partial(update),
        Err(e) => {
          log::error!("Stage {} failed after {} completed stage(s): {:#}", node_name, current_state.stage_outputs.len(), e);
          return Err(PipelineError::StageFailed {
            stage: node_name.clone(),
            message: format!("{:#}", e),
            completed: current_state.stage_outputs,
          });
        }
      }
    }

    Ok(current_state)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ai_agent::llm::model_provider::{ChatMessage, LLMResponse, ModelProvider};
  use anyhow::anyhow;
  use serde_json::Value;

  struct SilentLLM;

  #[async_trait]
  impl LLMChatter for SilentLLM {
    async fn chat(&self, _messages: Vec<ChatMessage>, _config: &LLMModelConfig) -> Result<LLMResponse> {
      Ok(LLMResponse { content: String::new() })
    }
  }

  fn ctx() -> CrewContext {
    CrewContext {
      llm: Arc::new(SilentLLM),
      model_config: LLMModelConfig {
        provider: ModelProvider::Ollama,
        model_name: "test".to_string(),
        api_key: None,
        base_url: None,
        temperature: None,
        max_tokens: None,
        top_p: None,
      },
    }
  }

  fn record(state: AgentState, _ctx: CrewContext) -> Pin<Box<dyn Future<Output = Result<PartialAgentStateUpdate, Error>> + Send>> {
    Box::pin(async move {
      let step: usize = state.stage_outputs.len();
      Ok(PartialAgentStateUpdate::new().with_stage_output(StageOutput {
        stage: format!("step_{}", step),
        display_name: format!("Step {}", step),
        agent_role: "Recorder".to_string(),
        output: format!("output {}", step),
      }))
    })
  }

  fn fail(_state: AgentState, _ctx: CrewContext) -> Pin<Box<dyn Future<Output = Result<PartialAgentStateUpdate, Error>> + Send>> {
    Box::pin(async move { Err(anyhow!("LLM unavailable")) })
  }

  fn mark_reached(_state: AgentState, _ctx: CrewContext) -> Pin<Box<dyn Future<Output = Result<PartialAgentStateUpdate, Error>> + Send>> {
    Box::pin(async move {
      Ok(PartialAgentStateUpdate::new().with_data(HashMap::from([("reached".to_string(), Value::from(true))])))
    })
  }

  #[tokio::test]
  async fn runs_nodes_in_edge_order() {
    let mut graph = StateGraph::new();
    graph.add_node("a", record);
    graph.add_node("b", record);
    graph.add_node("c", record);
    graph.add_edge("a", "b");
    graph.add_edge("b", "c");
    graph.add_edge("c", END_NODE);
    graph.set_entry_point("a");

    let compiled = graph.compile().unwrap();
    assert_eq!(compiled.stages(), ["a", "b", "c"]);

    let state = compiled.invoke(AgentState::new(), ctx()).await.unwrap();
    let outputs: Vec<&str> = state.stage_outputs.iter().map(|s| s.output.as_str()).collect();
    assert_eq!(outputs, vec!["output 0", "output 1", "output 2"]);
  }

  #[tokio::test]
  async fn first_failure_aborts_and_keeps_completed_outputs() {
    let mut graph = StateGraph::new();
    graph.add_node("first", record);
    graph.add_node("broken", fail);
    graph.add_node("after", mark_reached);
    graph.add_edge("first", "broken");
    graph.add_edge("broken", "after");
    graph.add_edge("after", END_NODE);
    graph.set_entry_point("first");

    let err = graph.compile().unwrap().invoke(AgentState::new(), ctx()).await.unwrap_err();
    match err {
      PipelineError::StageFailed { stage, message, completed } => {
        assert_eq!(stage, "broken");
        assert_eq!(message, "LLM unavailable");
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].output, "output 0");
      }
      other => panic!("unexpected error: {}", other),
    }
  }

  #[test]
  fn misconfigured_graphs_do_not_compile() {
    let missing_entry = StateGraph::new();
    assert!(matches!(missing_entry.compile(), Err(PipelineError::MissingEntryPoint)));

    let mut dead_end = StateGraph::new();
    dead_end.add_node("a", record);
    dead_end.set_entry_point("a");
    assert!(matches!(dead_end.compile(), Err(PipelineError::DeadEnd(node)) if node == "a"));

    let mut unknown = StateGraph::new();
    unknown.add_node("a", record);
    unknown.add_edge("a", "ghost");
    unknown.set_entry_point("a");
    assert!(matches!(unknown.compile(), Err(PipelineError::NodeNotFound(node)) if node == "ghost"));

    let mut cycle = StateGraph::new();
    cycle.add_node("a", record);
    cycle.add_node("b", record);
    cycle.add_edge("a", "b");
    cycle.add_edge("b", "a");
    cycle.set_entry_point("a");
    assert!(matches!(cycle.compile(), Err(PipelineError::CycleDetected(node)) if node == "a"));
  }
}
