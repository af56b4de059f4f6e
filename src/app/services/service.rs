use std::path::{Path, PathBuf};

use anyhow::{Context, Error, Result};
use serde::Serialize;
use uuid::Uuid;

use super::crew_service::CrewService;
use crate::app::config::DEFAULT_QUERY;

/// The raw `file` part of an upload.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
  pub filename: Option<String>,
  pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
  pub status: String,
  pub query: String,
  pub analysis: String,
  pub file_processed: Option<String>,
}

pub struct FinancialDocumentServices {
  crew_service : CrewService,
  upload_dir : PathBuf
}

fn resolve_query(query: Option<String>) -> String {
  match query {
    Some(query) if !query.trim().is_empty() => query,
    _ => DEFAULT_QUERY.to_string(),
  }
}

impl FinancialDocumentServices {

  pub fn new(crew_service: CrewService, upload_dir: impl Into<PathBuf>) -> Self {
    FinancialDocumentServices { crew_service, upload_dir: upload_dir.into() }
  }

  fn upload_path(&self) -> PathBuf {
    self.upload_dir.join(format!("financial_document_{}.pdf", Uuid::new_v4()))
  }

  /// Stores the upload under a fresh name, runs the crew over it and always
  /// removes the stored file afterwards, whatever the outcome.
  pub async fn analyze_document(&self, document: UploadedDocument, query: Option<String>) -> Result<AnalysisResponse, Error> {
    let query: String = resolve_query(query);
    let file_path: PathBuf = self.upload_path();

    let outcome: Result<String> = self.store_and_run(&file_path, &document.content, query.trim()).await;
    Self::remove_upload(&file_path).await;

    let analysis: String = outcome?;
    return Ok(AnalysisResponse {
      status: "success".to_string(),
      query,
      analysis,
      file_processed: document.filename,
    });
  }

  async fn store_and_run(&self, file_path: &Path, content: &[u8], query: &str) -> Result<String> {
    tokio::fs::create_dir_all(&self.upload_dir).await
      .with_context(|| format!("Cannot create upload directory {}", self.upload_dir.display()))?;
    tokio::fs::write(file_path, content).await
      .with_context(|| format!("Cannot store upload at {}", file_path.display()))?;

    log::info!("Stored {} byte upload at {}", content.len(), file_path.display());

    let file_path: String = file_path.to_string_lossy().into_owned();
    let analysis: String = self.crew_service.run_crew(query, &file_path).await?;
    Ok(analysis)
  }

  async fn remove_upload(file_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(file_path).await {
      log::debug!("Upload {} not removed: {}", file_path.display(), e);
    }
  }
}
