//! Purchasing endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{get_shaped, post_shaped};
use crate::query::QueryBuilder;

/// Filters for purchase order listings.
#[derive(Debug, Default, Clone)]
pub struct PurchaseOrderQuery {
    /// Lifecycle status (`draft`, `ordered`, `received`, `billed`).
    pub status: Option<String>,
    /// Restrict to one supplier.
    pub supplier_id: Option<String>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub page_size: Option<u32>,
}

impl PurchaseOrderQuery {
    fn to_query_string(&self) -> String {
        QueryBuilder::new()
            .push("status", self.status.as_deref())
            .push("supplier_id", self.supplier_id.as_deref())
            .push("page", self.page)
            .push("page_size", self.page_size)
            .finish()
    }
}

/// Purchase orders and receiving.
#[derive(Debug)]
pub struct PurchasingService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl PurchasingService {
    const NAME: &'static str = "purchasing";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// List purchase orders matching the filter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_purchase_orders(
        &self,
        query: &PurchaseOrderQuery,
    ) -> Result<Value, NormalizedError> {
        let path = format!("purchasing/orders{}", query.to_query_string());
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }

    /// Create a purchase order.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn create_purchase_order(&self, order: Value) -> Result<Value, NormalizedError> {
        post_shaped(&self.client, &self.reporter, Self::NAME, "purchasing/orders", order, None, None)
            .await
    }

    /// Record receipt of goods against a purchase order.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn receive_purchase_order(
        &self,
        order_id: &str,
        receipt: Value,
    ) -> Result<Value, NormalizedError> {
        let path = format!("purchasing/orders/{order_id}/receipts");
        post_shaped(&self.client, &self.reporter, Self::NAME, &path, receipt, None, None).await
    }
}
