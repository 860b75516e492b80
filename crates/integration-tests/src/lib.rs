//! Integration tests for Lumina.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare the database and load a catalog
//! cargo run -p lumina-cli -- migrate
//! cargo run -p lumina-cli -- seed catalog catalog.yaml
//!
//! # Start the storefront, then run the ignored tests
//! cargo run -p lumina-storefront &
//! cargo test -p lumina-integration-tests -- --ignored
//! ```
//!
//! Tests talk to a running server over HTTP. Each test registers its own
//! throwaway shopper so tests can run in any order. Each client also sends
//! its own `X-Forwarded-For` address, so parallel tests land in separate
//! rate-limit buckets instead of sharing the loopback address.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A random private address for one test client.
#[must_use]
pub fn unique_client_ip() -> String {
    let [a, b, c, ..] = Uuid::new_v4().into_bytes();
    format!("10.{a}.{b}.{c}")
}

/// A client with its own cookie jar and its own client address.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&unique_client_ip()).expect("Generated address is a valid header"),
    );
    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email for a throwaway shopper.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4().simple())
}

/// Password accepted by the storefront's strength check.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// A signed-in client for a fresh shopper, plus the shopper's email.
///
/// # Panics
///
/// Panics if registration fails.
pub async fn signed_in_client() -> (Client, String) {
    let client = client();
    let email = unique_email();
    let resp = client
        .post(format!("{}/auth/register", storefront_base_url()))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to register test shopper");
    assert_eq!(resp.status(), StatusCode::CREATED);
    (client, email)
}

/// Read a JSON body, panicking with the status on failure.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn json_body(resp: Response) -> Value {
    let status = resp.status();
    resp.json()
        .await
        .unwrap_or_else(|e| panic!("Expected JSON body (status {status}): {e}"))
}

/// The first active product in the catalog.
///
/// # Panics
///
/// Panics if the catalog is empty.
pub async fn any_product_id(client: &Client) -> i64 {
    let resp = client
        .get(format!("{}/products", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list products");
    let products = json_body(resp).await;
    products
        .as_array()
        .and_then(|p| p.first())
        .and_then(|p| p["id"].as_i64())
        .expect("Catalog is empty; seed it before running integration tests")
}
