//! Sales endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{get_shaped, post_shaped};
use crate::query::QueryBuilder;

/// Filters for quote and order listings.
#[derive(Debug, Default, Clone)]
pub struct QuoteQuery {
    /// Lifecycle status (`draft`, `sent`, `accepted`, `expired`).
    pub status: Option<String>,
    /// Restrict to one customer.
    pub customer_id: Option<String>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub page_size: Option<u32>,
}

impl QuoteQuery {
    fn to_query_string(&self) -> String {
        QueryBuilder::new()
            .push("status", self.status.as_deref())
            .push("customer_id", self.customer_id.as_deref())
            .push("page", self.page)
            .push("page_size", self.page_size)
            .finish()
    }
}

/// Quotes and sales orders.
#[derive(Debug)]
pub struct SalesService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl SalesService {
    const NAME: &'static str = "sales";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// List quotes matching the filter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_quotes(&self, query: &QuoteQuery) -> Result<Value, NormalizedError> {
        let path = format!("sales/quotes{}", query.to_query_string());
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }

    /// Create a quote.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn create_quote(&self, quote: Value) -> Result<Value, NormalizedError> {
        post_shaped(&self.client, &self.reporter, Self::NAME, "sales/quotes", quote, None, None)
            .await
    }

    /// Convert an accepted quote into a sales order. The conversion is a
    /// single remote call; the backend owns the workflow.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn convert_quote_to_order(&self, quote_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("sales/quotes/{quote_id}/convert");
        post_shaped(&self.client, &self.reporter, Self::NAME, &path, Value::Null, None, None).await
    }

    /// List sales orders matching the filter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_orders(&self, query: &QuoteQuery) -> Result<Value, NormalizedError> {
        let path = format!("sales/orders{}", query.to_query_string());
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }
}
