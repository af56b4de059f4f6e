use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use anyhow::{anyhow, Context};
use futures::TryStreamExt;
use std::sync::Arc;

use crate::app::controller::analysis_controller::AnalysisController;
use crate::app::services::service::UploadedDocument;

/// Fields of the `POST /analyze` multipart form.
pub struct AnalyzeForm {
  pub file: UploadedDocument,
  pub query: Option<String>,
}

impl AnalyzeForm {
  /// Reads the form, rejecting any field larger than `max_field_bytes`.
  pub async fn from_multipart(mut payload: Multipart, max_field_bytes: usize) -> anyhow::Result<Self> {
    let mut file: Option<UploadedDocument> = None;
    let mut query: Option<String> = None;

    while let Some(mut field) = payload.try_next().await.map_err(|e| anyhow!("Malformed multipart body: {}", e))? {
      let name: String = field.name().unwrap_or_default().to_string();
      let filename: Option<String> = field.content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(|name| name.to_string());

      let mut content: Vec<u8> = Vec::new();
      while let Some(chunk) = field.try_next().await.map_err(|e| anyhow!("Malformed multipart body: {}", e))? {
        if content.len() + chunk.len() > max_field_bytes {
          return Err(anyhow!("Form field '{}' exceeds the {} byte upload limit", name, max_field_bytes));
        }
        content.extend_from_slice(&chunk);
      }

      match name.as_str() {
        "file" => file = Some(UploadedDocument { filename, content }),
        "query" => query = Some(String::from_utf8_lossy(&content).into_owned()),
        other => log::debug!("Ignoring form field {}", other),
      }
    }

    let file: UploadedDocument = file.context("Missing required form field: file")?;
    Ok(AnalyzeForm { file, query })
  }
}

pub struct Routes;

impl Routes {

  pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(Self::health)));
    cfg.service(web::resource("/analyze").route(web::post().to(Self::analyze)));
  }

  async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
      "message": "Financial Document Analyzer API is running",
    }))
  }

  async fn analyze(controller: web::Data<Arc<AnalysisController>>, payload: Multipart) -> impl Responder {
    let form: AnalyzeForm = match AnalyzeForm::from_multipart(payload, controller.max_upload_bytes()).await {
      Ok(form) => form,
      Err(e) => {
        log::warn!("Rejected analyze request: {}", e);
        return HttpResponse::BadRequest().json(serde_json::json!({ "detail": e.to_string() }));
      }
    };

    match controller.analyze(form.file, form.query).await {
      Ok(data) => HttpResponse::Ok().json(data),
      Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
        "detail": format!("Error processing financial document: {}", e),
      }))
    }
  }
}
