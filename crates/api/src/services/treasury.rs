//! Treasury endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{get_shaped, post_shaped};
use crate::query::QueryBuilder;

/// Cash position and forecasting.
#[derive(Debug)]
pub struct TreasuryService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl TreasuryService {
    const NAME: &'static str = "treasury";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// Consolidated cash position, optionally as of a date (`YYYY-MM-DD`).
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn cash_position(&self, as_of: Option<&str>) -> Result<Value, NormalizedError> {
        let query = QueryBuilder::new().push("as_of", as_of).finish();
        let path = format!("treasury/position{query}");
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }

    /// List cash-flow forecasts.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_forecasts(&self) -> Result<Value, NormalizedError> {
        get_shaped(&self.client, &self.reporter, Self::NAME, "treasury/forecasts", None).await
    }

    /// Create a cash-flow forecast.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn create_forecast(&self, forecast: Value) -> Result<Value, NormalizedError> {
        post_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            "treasury/forecasts",
            forecast,
            None,
            None,
        )
        .await
    }
}
