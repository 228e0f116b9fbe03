//! Inventory endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{get_shaped, patch_shaped, post_shaped, put_shaped};
use crate::query::QueryBuilder;

/// Filters for stock item listings.
#[derive(Debug, Default, Clone)]
pub struct ItemQuery {
    /// Free-text search over SKU and name.
    pub search: Option<String>,
    /// Restrict to one warehouse/location.
    pub location: Option<String>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub page_size: Option<u32>,
}

impl ItemQuery {
    fn to_query_string(&self) -> String {
        QueryBuilder::new()
            .push("search", self.search.as_deref())
            .push("location", self.location.as_deref())
            .push("page", self.page)
            .push("page_size", self.page_size)
            .finish()
    }
}

/// Stock items and adjustments.
#[derive(Debug)]
pub struct InventoryService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl InventoryService {
    const NAME: &'static str = "inventory";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// List stock items matching the filter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_items(&self, query: &ItemQuery) -> Result<Value, NormalizedError> {
        let path = format!("inventory/items{}", query.to_query_string());
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }

    /// Fetch one stock item.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn get_item(&self, item_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("inventory/items/{item_id}");
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }

    /// Create a stock item.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn create_item(&self, item: Value) -> Result<Value, NormalizedError> {
        post_shaped(&self.client, &self.reporter, Self::NAME, "inventory/items", item, None, None)
            .await
    }

    /// Replace a stock item.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn update_item(&self, item_id: &str, item: Value) -> Result<Value, NormalizedError> {
        let path = format!("inventory/items/{item_id}");
        put_shaped(&self.client, &self.reporter, Self::NAME, &path, item, None, None).await
    }

    /// Partially update a stock item (price, reorder level, ...).
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn patch_item(&self, item_id: &str, changes: Value) -> Result<Value, NormalizedError> {
        let path = format!("inventory/items/{item_id}");
        patch_shaped(&self.client, &self.reporter, Self::NAME, &path, changes, None, None).await
    }

    /// Post a stock adjustment for an item.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn adjust_stock(
        &self,
        item_id: &str,
        adjustment: Value,
    ) -> Result<Value, NormalizedError> {
        let path = format!("inventory/items/{item_id}/adjustments");
        post_shaped(&self.client, &self.reporter, Self::NAME, &path, adjustment, None, None).await
    }
}
