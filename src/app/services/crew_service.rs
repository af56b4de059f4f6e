use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{Context, Error, Result};
use serde_json::Value;

use crate::ai_agent::graph::graph::{CompiledGraph, CrewContext, PipelineError, StateGraph, END_NODE};
use crate::ai_agent::graph::state::{AgentState, PartialAgentStateUpdate, DOCUMENT_KEY, FILE_PATH_KEY, QUERY_KEY};
use crate::ai_agent::llm::model_provider::LLMChatter;
use crate::ai_agent::tools::financial_tools::{load_document_text, Toolbox};
use crate::ai_agent::utils::crew::get_stage_order;
use crate::app::config::Config;

pub const INTAKE_NODE: &str = "document_intake";

pub struct CrewService {
  config : Config,
  context : CrewContext,
  crew : CompiledGraph
}

impl CrewService {
  pub fn new(config: Config, llm: Arc<dyn LLMChatter>) -> Result<Self> {
    let toolbox: Toolbox = Toolbox::new();
    let crew: CompiledGraph = Self::create_workflow(&toolbox).compile().context("Crew workflow is misconfigured")?;
    log::info!("Crew ready with stages: {:?}", crew.stages());

    let context: CrewContext = CrewContext { llm, model_config: config.llm_model_config() };
    Ok(CrewService { config, context, crew })
  }

  /// Reads the uploaded PDF once; every later stage works from this text.
  pub fn document_intake(state: AgentState, _ctx: CrewContext) -> Pin<Box<dyn Future<Output = Result<PartialAgentStateUpdate, Error>> + Send>> {
    Box::pin(async move {
      let file_path: PathBuf = state.data_str(FILE_PATH_KEY).map(PathBuf::from).context("Crew inputs are missing file_path")?;
      let display_path: String = file_path.display().to_string();

      let content: String = tokio::task::spawn_blocking(move || load_document_text(&file_path))
        .await
        .context("Document reader task did not complete")?;

      log::info!("Document intake read {} characters from {}", content.len(), display_path);

      let mut data: HashMap<String, Value> = HashMap::new();
      data.insert(DOCUMENT_KEY.to_string(), Value::from(content));
      Ok(PartialAgentStateUpdate::new().with_data(data))
    })
  }

  fn create_workflow(toolbox: &Toolbox) -> StateGraph {
    let mut workflow: StateGraph = StateGraph::new();

    workflow.add_node(INTAKE_NODE, Self::document_intake);
    workflow.set_entry_point(INTAKE_NODE);

    let mut previous: String = INTAKE_NODE.to_string();
    for (stage_key, stage) in get_stage_order() {
      workflow.add_node(&stage_key, (stage.agent_builder)(toolbox));
      workflow.add_edge(&previous, &stage_key);
      previous = stage_key;
    }
    workflow.add_edge(&previous, END_NODE);

    return workflow;
  }

  /// Runs the whole crew for one document and returns the concatenated stage outputs.
  pub async fn run_crew(&self, query: &str, file_path: &str) -> std::result::Result<String, PipelineError> {
    let mut initial_state: AgentState = AgentState::new();

    let mut data: HashMap<String, Value> = HashMap::new();
    data.insert(QUERY_KEY.to_string(), Value::from(query));
    data.insert(FILE_PATH_KEY.to_string(), Value::from(file_path));
    initial_state.merge_data(data);

    let mut meta_data: HashMap<String, Value> = HashMap::new();
    meta_data.insert("show_reasoning".to_string(), Value::from(self.config.show_reasoning));
    meta_data.insert("model_name".to_string(), Value::from(self.config.model_name.clone()));
    meta_data.insert("model_provider".to_string(), Value::from(self.config.model_provider.to_string()));
    initial_state.merge_metadata(meta_data);

    let final_state: AgentState = match self.crew.invoke(initial_state, self.context.clone()).await {
      Ok(state) => state,
      Err(e) => {
        if let PipelineError::StageFailed { completed, .. } = &e {
          for partial in completed {
            log::info!("Output of {} before failure:\n{}", partial.display_name, partial.output);
          }
        }
        return Err(e);
      }
    };

    log::info!("Crew finished {} stage(s) for {}", final_state.stage_outputs.len(), file_path);
    Ok(final_state.narrative())
  }
}
