//! Invoicing endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_common::transform::Resource;
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{delete_shaped, get_shaped, post_shaped, put_shaped};
use crate::query::QueryBuilder;

/// Filters for invoice listings.
#[derive(Debug, Default, Clone)]
pub struct InvoiceQuery {
    /// Lifecycle status (`draft`, `sent`, `paid`, `overdue`).
    pub status: Option<String>,
    /// Restrict to one customer.
    pub customer_id: Option<String>,
    /// Issue date lower bound (`YYYY-MM-DD`).
    pub date_from: Option<String>,
    /// Issue date upper bound (`YYYY-MM-DD`).
    pub date_to: Option<String>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub page_size: Option<u32>,
}

impl InvoiceQuery {
    fn to_query_string(&self) -> String {
        QueryBuilder::new()
            .push("status", self.status.as_deref())
            .push("customer_id", self.customer_id.as_deref())
            .push("date_from", self.date_from.as_deref())
            .push("date_to", self.date_to.as_deref())
            .push("page", self.page)
            .push("page_size", self.page_size)
            .finish()
    }
}

/// Invoices and their payments.
#[derive(Debug)]
pub struct InvoicingService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl InvoicingService {
    const NAME: &'static str = "invoicing";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// List invoices matching the filter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Value, NormalizedError> {
        let path = format!("invoicing/invoices{}", query.to_query_string());
        get_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            Some(Resource::Invoice.profile()),
        )
        .await
    }

    /// Fetch one invoice.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn get_invoice(&self, invoice_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("invoicing/invoices/{invoice_id}");
        get_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            Some(Resource::Invoice.profile()),
        )
        .await
    }

    /// Create an invoice from an application-shaped draft.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn create_invoice(&self, draft: Value) -> Result<Value, NormalizedError> {
        post_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            "invoicing/invoices",
            draft,
            Some(Resource::Invoice.profile()),
            Some(Resource::Invoice.profile()),
        )
        .await
    }

    /// Replace an invoice.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn update_invoice(
        &self,
        invoice_id: &str,
        invoice: Value,
    ) -> Result<Value, NormalizedError> {
        let path = format!("invoicing/invoices/{invoice_id}");
        put_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            invoice,
            Some(Resource::Invoice.profile()),
            Some(Resource::Invoice.profile()),
        )
        .await
    }

    /// Delete an invoice.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn delete_invoice(&self, invoice_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("invoicing/invoices/{invoice_id}");
        delete_shaped(&self.client, &self.reporter, Self::NAME, &path).await
    }

    /// Send an invoice to its recipient. One remote call; the backend owns
    /// rendering and delivery.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn send_invoice(&self, invoice_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("invoicing/invoices/{invoice_id}/send");
        post_shaped(&self.client, &self.reporter, Self::NAME, &path, Value::Null, None, None).await
    }

    /// Record a payment against an invoice.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn record_payment(
        &self,
        invoice_id: &str,
        payment: Value,
    ) -> Result<Value, NormalizedError> {
        let path = format!("invoicing/invoices/{invoice_id}/payments");
        post_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            payment,
            Some(Resource::Transaction.profile()),
            Some(Resource::Invoice.profile()),
        )
        .await
    }
}
