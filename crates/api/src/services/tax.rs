//! Tax endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{get_shaped, post_shaped};
use crate::query::QueryBuilder;

/// Tax rates and reporting.
#[derive(Debug)]
pub struct TaxService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl TaxService {
    const NAME: &'static str = "tax";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// List configured tax rates.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_rates(&self) -> Result<Value, NormalizedError> {
        get_shaped(&self.client, &self.reporter, Self::NAME, "tax/rates", None).await
    }

    /// Create a tax rate.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn create_rate(&self, rate: Value) -> Result<Value, NormalizedError> {
        post_shaped(&self.client, &self.reporter, Self::NAME, "tax/rates", rate, None, None).await
    }

    /// Tax report for a year, optionally narrowed to a quarter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn report(&self, year: u16, quarter: Option<u8>) -> Result<Value, NormalizedError> {
        let query = QueryBuilder::new()
            .push("year", Some(year))
            .push("quarter", quarter)
            .finish();
        let path = format!("tax/reports{query}");
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }
}
