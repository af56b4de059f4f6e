use actix_web::{web, App};
use anyhow::Result;
use std::sync::Arc;

use crate::ai_agent::llm::model_provider::LLMChatter;
use crate::ai_agent::llm::models::get_model;
use crate::app::config::Config;
use crate::app::routes::routes::Routes;

use super::controller::analysis_controller::AnalysisController;
use super::services::crew_service::CrewService;
use super::services::service::FinancialDocumentServices;

#[derive(Clone)]
pub struct AppState {
  pub analysis_controller: Arc<AnalysisController>
}

impl AppState {

  pub fn new(app_config: &Config) -> Result<Self> {
    let llm: Arc<dyn LLMChatter> = get_model(&app_config.llm_model_config())?;
    Self::with_llm(app_config, llm)
  }

  pub fn with_llm(app_config: &Config, llm: Arc<dyn LLMChatter>) -> Result<Self> {
    let crew_service : CrewService = CrewService::new(app_config.clone(), llm)?;
    let document_service: Arc<FinancialDocumentServices> = Arc::new(FinancialDocumentServices::new(crew_service, app_config.upload_dir.clone()));
    let analysis_controller : Arc<AnalysisController> = Arc::new(AnalysisController::new(document_service, app_config.max_upload_bytes));
    Ok(AppState { analysis_controller })
  }
}

pub struct CreateApp {
  app_state: AppState,
}

impl CreateApp {
  pub fn new(app_state: AppState) -> Self {
    CreateApp { app_state }
  }

  pub fn build_app(&self,) -> App<impl actix_web::dev::ServiceFactory<actix_web::dev::ServiceRequest,Config = (),Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,Error = actix_web::Error,InitError = (),>,> {
    App::new()
    .app_data(web::Data::new(self.app_state.analysis_controller.clone()))
    .configure(Routes::configure)
  }
}
