//! Integration tests for the storefront wizard API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied (glyca-cli migrate)
//! - The storefront server running (cargo run -p glyca-storefront)
//!
//! No test here submits an order.

use glyca_integration_tests::storefront_base_url;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Client that keeps the session cookie between requests.
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

async fn post(client: &Client, path: &str, body: Value) -> Value {
    let resp = client
        .post(format!("{}{path}", storefront_base_url()))
        .json(&body)
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK, "POST {path}");
    resp.json().await.expect("Invalid JSON")
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_health() {
    let resp = Client::new()
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_wizard_state_survives_between_requests() {
    let client = session_client();

    let wizard: Value = client
        .get(format!("{}/api/wizard", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get wizard")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(wizard["step"], "language");

    let blocked = post(&client, "/api/wizard/advance", json!({})).await;
    assert_eq!(blocked["result"]["result"], "blocked");
    assert_eq!(blocked["wizard"]["step"], "language");

    post(&client, "/api/wizard/language", json!({"language": "pt"})).await;
    let moved = post(&client, "/api/wizard/advance", json!({})).await;
    assert_eq!(moved["result"]["result"], "moved");
    assert_eq!(moved["wizard"]["step"], "welcome");

    let reset = post(&client, "/api/wizard/reset", json!({})).await;
    assert_eq!(reset["step"], "language");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_shipping_country_change_resets_region() {
    let client = session_client();

    let wizard = post(
        &client,
        "/api/wizard/shipping",
        json!({"region": "Porto", "city": "Matosinhos"}),
    )
    .await;
    assert_eq!(wizard["shipping"]["city"], "Matosinhos");

    let wizard = post(&client, "/api/wizard/shipping", json!({"country": "ES"})).await;
    assert_eq!(wizard["shipping"]["country"], "ES");
    assert_eq!(wizard["shipping"]["region"], "");
    assert_eq!(wizard["shipping"]["city"], "");

    post(&client, "/api/wizard/shipping", json!({"phone": "12345"})).await;
    let blurred = post(&client, "/api/wizard/shipping/phone/blur", json!({})).await;
    assert_eq!(blurred["result"], false);
    assert!(blurred["wizard"]["shipping"]["errors"]["phone"].is_object());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_product_is_rejected() {
    let resp = session_client()
        .post(format!("{}/api/wizard/product", storefront_base_url()))
        .json(&json!({"product_id": "compra-9"}))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["errors"]["product"]["code"], "unknown_product");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_submit_before_purchase_is_refused() {
    let client = session_client();

    let outcome = post(&client, "/api/wizard/submit", json!({})).await;
    assert_eq!(outcome["result"]["result"], "failed");
    assert_eq!(outcome["result"]["notice"]["code"], "not_at_purchase");
}
