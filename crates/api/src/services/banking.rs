//! Banking endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_common::transform::Resource;
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{get_shaped, post_shaped};
use crate::query::QueryBuilder;

/// Filters for bank transaction listings.
#[derive(Debug, Default, Clone)]
pub struct TransactionQuery {
    /// Restrict to one bank account.
    pub account_id: Option<String>,
    /// Booking date lower bound (`YYYY-MM-DD`).
    pub date_from: Option<String>,
    /// Booking date upper bound (`YYYY-MM-DD`).
    pub date_to: Option<String>,
    /// Filter on reconciliation state.
    pub reconciled: Option<bool>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub page_size: Option<u32>,
}

impl TransactionQuery {
    fn to_query_string(&self) -> String {
        QueryBuilder::new()
            .push("account_id", self.account_id.as_deref())
            .push("date_from", self.date_from.as_deref())
            .push("date_to", self.date_to.as_deref())
            .push("reconciled", self.reconciled)
            .push("page", self.page)
            .push("page_size", self.page_size)
            .finish()
    }
}

/// Bank transactions, statements and reconciliation.
#[derive(Debug)]
pub struct BankingService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl BankingService {
    const NAME: &'static str = "banking";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// List transactions matching the filter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Value, NormalizedError> {
        let path = format!("banking/transactions{}", query.to_query_string());
        get_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            Some(Resource::Transaction.profile()),
        )
        .await
    }

    /// Fetch one transaction.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("banking/transactions/{transaction_id}");
        get_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            Some(Resource::Transaction.profile()),
        )
        .await
    }

    /// Import a bank statement. The backend parses and books it; this is
    /// one remote call.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn import_statement(&self, statement: Value) -> Result<Value, NormalizedError> {
        post_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            "banking/statements/import",
            statement,
            None,
            None,
        )
        .await
    }

    /// Mark a transaction reconciled.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn reconcile_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Value, NormalizedError> {
        let path = format!("banking/transactions/{transaction_id}/reconcile");
        post_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            Value::Null,
            None,
            Some(Resource::Transaction.profile()),
        )
        .await
    }
}
