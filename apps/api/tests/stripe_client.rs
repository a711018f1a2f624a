//! Stripe adapter against a mock HTTP server

use std::collections::HashMap;

use httpmock::prelude::*;
use league_signup_api::infrastructure::payments::{
    CheckoutRequest, LineItem, PaymentError, PaymentGateway, StripeClient,
};
use serde_json::json;

fn client(server: &MockServer) -> StripeClient {
    StripeClient::new(&server.base_url(), "sk_test_123").unwrap()
}

#[tokio::test]
async fn test_create_checkout_session() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/checkout/sessions")
                .header("Authorization", "Bearer sk_test_123")
                .body_contains("mode=payment")
                .body_contains("customer_email=parent%40example.com");
            then.status(200).json_body(json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.test/cs_test_1",
                "payment_status": "unpaid",
                "metadata": { "league_id": "abc" },
            }));
        })
        .await;

    let request = CheckoutRequest {
        line_item: LineItem::Catalog {
            price_id: "price_123".to_string(),
        },
        metadata: HashMap::from([("league_id".to_string(), "abc".to_string())]),
        customer_email: Some("parent@example.com".to_string()),
        success_url: "http://league.test/success?session_id={CHECKOUT_SESSION_ID}".to_string(),
        cancel_url: "http://league.test/cancel".to_string(),
    };
    let session = client(&server).create_checkout_session(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(session.id, "cs_test_1");
    assert!(!session.is_paid());
    assert_eq!(session.metadata["league_id"], "abc");
}

#[tokio::test]
async fn test_retrieve_paid_session() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/checkout/sessions/cs_test_2");
            then.status(200).json_body(json!({
                "id": "cs_test_2",
                "url": null,
                "payment_status": "paid",
                "payment_intent": "pi_123",
                "metadata": {},
            }));
        })
        .await;

    let session = client(&server).retrieve_checkout_session("cs_test_2").await.unwrap();
    assert!(session.is_paid());
    assert_eq!(session.payment_intent.as_deref(), Some("pi_123"));
}

#[tokio::test]
async fn test_provider_error_message_is_surfaced() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/checkout/sessions/cs_missing");
            then.status(404).json_body(json!({
                "error": { "message": "No such checkout.session: cs_missing", "type": "invalid_request_error" }
            }));
        })
        .await;

    let err = client(&server).retrieve_checkout_session("cs_missing").await.unwrap_err();
    match err {
        PaymentError::Provider { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "No such checkout.session: cs_missing");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_list_active_prices_for_product() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/prices")
                .query_param("active", "true")
                .query_param("product", "prod_1")
                .query_param("limit", "100");
            then.status(200).json_body(json!({
                "object": "list",
                "has_more": false,
                "data": [
                    {
                        "id": "price_1",
                        "product": "prod_1",
                        "currency": "usd",
                        "unit_amount": 8000,
                        "active": true,
                        "nickname": "Members",
                        "recurring": null,
                        "metadata": { "is_member": "true" }
                    },
                    {
                        "id": "price_2",
                        "product": "prod_1",
                        "currency": "usd",
                        "unit_amount": null,
                        "active": true,
                        "metadata": {}
                    }
                ]
            }));
        })
        .await;

    let prices = client(&server).list_active_prices("prod_1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(prices.len(), 2);
    assert_eq!(prices[0].unit_amount, Some(8000));
    assert_eq!(prices[0].metadata["is_member"], "true");
    assert!(prices[1].unit_amount.is_none());
}
