//! Façade behavior against a mock backend.

use std::sync::Arc;

use ledgerline_api::services::{InvoiceQuery, Services};
use ledgerline_common::error::{ErrorCode, ErrorReporter};
use ledgerline_common::time::MockClock;
use ledgerline_infra::testing::{RecordingNavigator, RecordingNotifier};
use ledgerline_infra::{ApiClient, ApiConfig, MemoryVault, TokenStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    services: Services,
    reporter: Arc<ErrorReporter>,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let clock = Arc::new(MockClock::new(0));
    let tokens = Arc::new(TokenStore::new(Arc::new(MemoryVault::new()), clock));
    tokens.set_tokens("acc", "ref", 3600).await;

    let navigator = Arc::new(RecordingNavigator::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let reporter = Arc::new(ErrorReporter::with_notifier(notifier.clone()));

    let config = ApiConfig::new(&server.uri()).expect("config");
    let client = Arc::new(
        ApiClient::builder(config)
            .token_store(tokens)
            .navigator(navigator.clone())
            .build()
            .expect("client"),
    );
    let services = Services::new(client, reporter.clone());

    Harness { server, services, reporter, notifier, navigator }
}

#[tokio::test]
async fn invoice_listings_are_shaped_for_the_application() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/invoicing/invoices"))
        .and(header("Authorization", "Bearer acc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "issue_date": "2024-03-01",
                "total_amount": "1190.00",
                "is_paid": 0,
                "customer_ref": { "display_name": "ACME" },
            }],
        })))
        .mount(&h.server)
        .await;

    let listing = h
        .services
        .invoicing
        .list_invoices(&InvoiceQuery::default())
        .await
        .expect("listing");

    assert_eq!(
        listing,
        json!({
            "items": [{
                "issueDate": "2024-03-01T00:00:00Z",
                "totalAmount": 1190.0,
                "isPaid": false,
                "customerRef": { "displayName": "ACME" },
            }],
        })
    );
}

#[tokio::test]
async fn invoice_drafts_are_shaped_for_the_wire() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/invoicing/invoices"))
        .and(body_json(json!({
            "issue_date": "2024-06-01T00:00:00Z",
            "total_amount": 500,
            "is_paid": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "inv-1" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let draft = json!({
        "issueDate": "2024-06-01",
        "totalAmount": "500",
        "isPaid": "no",
        "internalNotes": "never leaves the client",
        "reference": null,
    });
    let created = h.services.invoicing.create_invoice(draft).await.expect("created");

    assert_eq!(created, json!({ "id": "inv-1" }));
}

#[tokio::test]
async fn only_defined_query_parameters_reach_the_wire() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/invoicing/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&h.server)
        .await;

    let query = InvoiceQuery { status: Some("open".into()), ..InvoiceQuery::default() };
    let _ = h.services.invoicing.list_invoices(&query).await.expect("listing");

    let requests = h.server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("status=open"));
}

#[tokio::test]
async fn failures_are_tagged_logged_and_notified() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/invoicing/invoices"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&h.server)
        .await;

    let error = h
        .services
        .invoicing
        .list_invoices(&InvoiceQuery::default())
        .await
        .expect_err("validation failure");

    assert_eq!(error.code, ErrorCode::ValidationError);
    assert_eq!(error.message, "Validation failed. Please check your input.");

    let log = h.reporter.recent_errors();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status, 422);
    assert_eq!(h.notifier.messages(), vec![error.message.clone()]);
}

#[tokio::test]
async fn auth_failures_stay_silent_but_redirect() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tax/rates"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let error = h.services.tax.list_rates().await.expect_err("session over");

    assert_eq!(error.status, 401);
    // The refresh/redirect flow owns 401s; the user sees navigation, not
    // a toast.
    assert!(h.notifier.messages().is_empty());
    assert_eq!(h.navigator.redirects(), 1);
    assert_eq!(h.reporter.recent_errors().len(), 1);
}
