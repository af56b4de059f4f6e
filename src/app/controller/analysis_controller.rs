use std::sync::Arc;
use anyhow::Error;

use crate::app::services::service::{AnalysisResponse, FinancialDocumentServices, UploadedDocument};

pub struct AnalysisController {
  services : Arc<FinancialDocumentServices>,
  max_upload_bytes : usize
}

impl AnalysisController {
  pub fn new(services: Arc<FinancialDocumentServices>, max_upload_bytes: usize) -> Self {
    AnalysisController { services, max_upload_bytes }
  }

  /// Largest form field accepted by `POST /analyze`, in bytes.
  pub fn max_upload_bytes(&self) -> usize {
    self.max_upload_bytes
  }

  pub async fn analyze(&self, document: UploadedDocument, query: Option<String>) -> Result<AnalysisResponse, Error> {
    let filename: String = document.filename.clone().unwrap_or_else(|| "<unnamed>".to_string());
    log::info!("Analyzing upload {} ({} bytes)", filename, document.content.len());

    let result = match self.services.analyze_document(document, query).await {
      Ok(response) => response,
      Err(e) => {
        log::error!("Analysis of {} failed: {:#}", filename, e);
        return Err(e);
      }
    };

    return Ok(result);
  }
}
