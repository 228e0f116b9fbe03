//! AI-assisted document processing endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{get_shaped, post_shaped};
use crate::query::QueryBuilder;

/// Filters for extraction listings.
#[derive(Debug, Default, Clone)]
pub struct ExtractionQuery {
    /// Processing status (`queued`, `processing`, `done`, `failed`).
    pub status: Option<String>,
    /// Document kind (`invoice`, `receipt`, `statement`).
    pub kind: Option<String>,
    /// Page number.
    pub page: Option<u32>,
}

impl ExtractionQuery {
    fn to_query_string(&self) -> String {
        QueryBuilder::new()
            .push("status", self.status.as_deref())
            .push("kind", self.kind.as_deref())
            .push("page", self.page)
            .finish()
    }
}

/// Document extraction jobs.
#[derive(Debug)]
pub struct DocumentsService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl DocumentsService {
    const NAME: &'static str = "documents";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// Submit a document for extraction. The backend queues the job and
    /// returns its handle.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn submit_document(&self, document: Value) -> Result<Value, NormalizedError> {
        post_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            "documents/extractions",
            document,
            None,
            None,
        )
        .await
    }

    /// Fetch one extraction job with its recognized fields.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn get_extraction(&self, extraction_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("documents/extractions/{extraction_id}");
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }

    /// List extraction jobs matching the filter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_extractions(
        &self,
        query: &ExtractionQuery,
    ) -> Result<Value, NormalizedError> {
        let path = format!("documents/extractions{}", query.to_query_string());
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }

    /// Approve an extraction, booking its recognized document.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn approve_extraction(&self, extraction_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("documents/extractions/{extraction_id}/approve");
        post_shaped(&self.client, &self.reporter, Self::NAME, &path, Value::Null, None, None).await
    }
}
