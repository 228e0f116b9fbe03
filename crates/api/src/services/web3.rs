//! Web3 display endpoints.
//!
//! Read-only views over on-chain wallets the workspace tracks; signing
//! and submission never happen client-side.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::get_shaped;
use crate::query::QueryBuilder;

/// Filters for on-chain transfer listings.
#[derive(Debug, Default, Clone)]
pub struct TransferQuery {
    /// Chain identifier (`ethereum`, `polygon`, ...).
    pub chain: Option<String>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub page_size: Option<u32>,
}

impl TransferQuery {
    fn to_query_string(&self) -> String {
        QueryBuilder::new()
            .push("chain", self.chain.as_deref())
            .push("page", self.page)
            .push("page_size", self.page_size)
            .finish()
    }
}

/// Tracked wallets and transfers.
#[derive(Debug)]
pub struct Web3Service {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl Web3Service {
    const NAME: &'static str = "web3";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// List tracked wallets.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_wallets(&self) -> Result<Value, NormalizedError> {
        get_shaped(&self.client, &self.reporter, Self::NAME, "web3/wallets", None).await
    }

    /// Balances for one wallet across tracked chains.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn wallet_balance(&self, address: &str) -> Result<Value, NormalizedError> {
        let path = format!("web3/wallets/{address}/balance");
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }

    /// Transfers for one wallet matching the filter.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn list_transfers(
        &self,
        address: &str,
        query: &TransferQuery,
    ) -> Result<Value, NormalizedError> {
        let path = format!("web3/wallets/{address}/transfers{}", query.to_query_string());
        get_shaped(&self.client, &self.reporter, Self::NAME, &path, None).await
    }
}
