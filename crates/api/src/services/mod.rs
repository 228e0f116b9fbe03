//! Domain façades.
//!
//! One façade per backend domain. Every method follows the same shape:
//! build the path (and query string from defined parameters), apply the
//! outgoing transformation profile when one is declared for the resource,
//! delegate to the client verb, apply the incoming profile, and on failure
//! rewrap through the reporter with a `{service, "METHOD path"}` context.

mod accounting;
mod banking;
mod documents;
mod identity;
mod inventory;
mod invoicing;
mod purchasing;
mod sales;
mod tax;
mod treasury;
mod web3;

use std::sync::Arc;

use ledgerline_common::error::{ErrorContext, ErrorReporter, NormalizedError};
use ledgerline_common::transform::{from_wire, to_wire, TransformProfile};
use ledgerline_infra::ApiClient;
use serde_json::Value;

pub use accounting::{AccountQuery, AccountingService};
pub use banking::{BankingService, TransactionQuery};
pub use documents::{DocumentsService, ExtractionQuery};
pub use identity::IdentityService;
pub use inventory::{InventoryService, ItemQuery};
pub use invoicing::{InvoiceQuery, InvoicingService};
pub use purchasing::{PurchaseOrderQuery, PurchasingService};
pub use sales::{QuoteQuery, SalesService};
pub use tax::TaxService;
pub use treasury::TreasuryService;
pub use web3::{TransferQuery, Web3Service};

/// All domain façades over one client and reporter.
#[derive(Debug)]
pub struct Services {
    /// Authentication and user profile.
    pub identity: IdentityService,
    /// Chart of accounts and balances.
    pub accounting: AccountingService,
    /// Invoices and payments.
    pub invoicing: InvoicingService,
    /// Bank transactions, statements, reconciliation.
    pub banking: BankingService,
    /// Stock items and adjustments.
    pub inventory: InventoryService,
    /// Quotes and orders.
    pub sales: SalesService,
    /// Purchase orders and receiving.
    pub purchasing: PurchasingService,
    /// AI-assisted document extraction.
    pub documents: DocumentsService,
    /// On-chain wallets and transfers.
    pub web3: Web3Service,
    /// Tax rates and reports.
    pub tax: TaxService,
    /// Cash position and forecasts.
    pub treasury: TreasuryService,
}

impl Services {
    /// Assemble every façade over the given client and reporter.
    #[must_use]
    pub fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self {
            identity: IdentityService::new(client.clone(), reporter.clone()),
            accounting: AccountingService::new(client.clone(), reporter.clone()),
            invoicing: InvoicingService::new(client.clone(), reporter.clone()),
            banking: BankingService::new(client.clone(), reporter.clone()),
            inventory: InventoryService::new(client.clone(), reporter.clone()),
            sales: SalesService::new(client.clone(), reporter.clone()),
            purchasing: PurchasingService::new(client.clone(), reporter.clone()),
            documents: DocumentsService::new(client.clone(), reporter.clone()),
            web3: Web3Service::new(client.clone(), reporter.clone()),
            tax: TaxService::new(client.clone(), reporter.clone()),
            treasury: TreasuryService::new(client, reporter),
        }
    }
}

pub(crate) fn tag(
    reporter: &ErrorReporter,
    service: &'static str,
    method: &str,
    path: &str,
    error: NormalizedError,
) -> NormalizedError {
    reporter.report(error, &ErrorContext::new(service, format!("{method} {path}")))
}

fn shape_response(raw: Value, profile: Option<&'static TransformProfile>) -> Value {
    match profile {
        Some(profile) => from_wire(raw, profile),
        None => raw,
    }
}

pub(crate) async fn get_shaped(
    client: &ApiClient,
    reporter: &ErrorReporter,
    service: &'static str,
    path: &str,
    profile: Option<&'static TransformProfile>,
) -> Result<Value, NormalizedError> {
    match client.get::<Value>(path).await {
        Ok(raw) => Ok(shape_response(raw, profile)),
        Err(error) => Err(tag(reporter, service, "GET", path, error)),
    }
}

pub(crate) async fn post_shaped(
    client: &ApiClient,
    reporter: &ErrorReporter,
    service: &'static str,
    path: &str,
    body: Value,
    request_profile: Option<&'static TransformProfile>,
    response_profile: Option<&'static TransformProfile>,
) -> Result<Value, NormalizedError> {
    let body = match request_profile {
        Some(profile) => to_wire(body, profile),
        None => body,
    };
    match client.post::<Value>(path, &body).await {
        Ok(raw) => Ok(shape_response(raw, response_profile)),
        Err(error) => Err(tag(reporter, service, "POST", path, error)),
    }
}

pub(crate) async fn put_shaped(
    client: &ApiClient,
    reporter: &ErrorReporter,
    service: &'static str,
    path: &str,
    body: Value,
    request_profile: Option<&'static TransformProfile>,
    response_profile: Option<&'static TransformProfile>,
) -> Result<Value, NormalizedError> {
    let body = match request_profile {
        Some(profile) => to_wire(body, profile),
        None => body,
    };
    match client.put::<Value>(path, &body).await {
        Ok(raw) => Ok(shape_response(raw, response_profile)),
        Err(error) => Err(tag(reporter, service, "PUT", path, error)),
    }
}

pub(crate) async fn patch_shaped(
    client: &ApiClient,
    reporter: &ErrorReporter,
    service: &'static str,
    path: &str,
    body: Value,
    request_profile: Option<&'static TransformProfile>,
    response_profile: Option<&'static TransformProfile>,
) -> Result<Value, NormalizedError> {
    let body = match request_profile {
        Some(profile) => to_wire(body, profile),
        None => body,
    };
    match client.patch::<Value>(path, &body).await {
        Ok(raw) => Ok(shape_response(raw, response_profile)),
        Err(error) => Err(tag(reporter, service, "PATCH", path, error)),
    }
}

pub(crate) async fn delete_shaped(
    client: &ApiClient,
    reporter: &ErrorReporter,
    service: &'static str,
    path: &str,
) -> Result<Value, NormalizedError> {
    match client.delete::<Value>(path).await {
        Ok(raw) => Ok(raw),
        Err(error) => Err(tag(reporter, service, "DELETE", path, error)),
    }
}
