//! Chart-of-accounts endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_common::transform::Resource;
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{delete_shaped, get_shaped, post_shaped, put_shaped};
use crate::query::QueryBuilder;

/// Filters for account listings.
#[derive(Debug, Default, Clone)]
pub struct AccountQuery {
    /// Account kind (`asset`, `liability`, `equity`, `income`, `expense`).
    pub kind: Option<String>,
    /// Filter on archived state.
    pub archived: Option<bool>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub page_size: Option<u32>,
}

impl AccountQuery {
    fn to_query_string(&self) -> String {
        QueryBuilder::new()
            .push("kind", self.kind.as_deref())
            .push("archived", self.archived)
            .push("page", self.page)
            .push("page_size", self.page_size)
            .finish()
    }
}

/// Ledger accounts and balances.
#[derive(Debug)]
pub struct AccountingService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl AccountingService {
    const NAME: &'static str = "accounting";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// List accounts matching the filter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_accounts(&self, query: &AccountQuery) -> Result<Value, NormalizedError> {
        let path = format!("accounting/accounts{}", query.to_query_string());
        get_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            Some(Resource::Account.profile()),
        )
        .await
    }

    /// Fetch one account.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn get_account(&self, account_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("accounting/accounts/{account_id}");
        get_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            Some(Resource::Account.profile()),
        )
        .await
    }

    /// Create an account from an application-shaped payload.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn create_account(&self, account: Value) -> Result<Value, NormalizedError> {
        post_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            "accounting/accounts",
            account,
            Some(Resource::Account.profile()),
            Some(Resource::Account.profile()),
        )
        .await
    }

    /// Replace an account.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn update_account(
        &self,
        account_id: &str,
        account: Value,
    ) -> Result<Value, NormalizedError> {
        let path = format!("accounting/accounts/{account_id}");
        put_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            &path,
            account,
            Some(Resource::Account.profile()),
            Some(Resource::Account.profile()),
        )
        .await
    }

    /// Delete an account.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn delete_account(&self, account_id: &str) -> Result<Value, NormalizedError> {
        let path = format!("accounting/accounts/{account_id}");
        delete_shaped(&self.client, &self.reporter, Self::NAME, &path).await
    }

    /// Balance of one account as of an optional date (`YYYY-MM-DD`).
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn account_balance(
        &self,
        account_id: &str,
        as_of: Option<&str>,
    ) -> Result<Value, NormalizedError> {
        let query = QueryBuilder::new().push("as_of", as_of).finish();
        let path = format!("accounting/accounts/{account_id}/balance{query}");
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }
}
