//! Integration tests for registration, login and logout.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (lumina-cli migrate)
//! - The storefront server running (cargo run -p lumina-storefront)

use lumina_integration_tests::{
    TEST_PASSWORD, client, json_body, signed_in_client, storefront_base_url, unique_email,
};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_register_signs_in() {
    let (client, email) = signed_in_client().await;

    let resp = client
        .get(format!("{}/auth/me", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get current user");
    assert_eq!(resp.status(), StatusCode::OK);

    let me = json_body(resp).await;
    assert_eq!(me["email"], email.as_str());
    // Display name falls back to the email's local part
    assert_eq!(me["display_name"], email.split('@').next().unwrap_or_default());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_duplicate_registration_conflicts() {
    let (_, email) = signed_in_client().await;

    let resp = client()
        .post(format!("{}/auth/register", storefront_base_url()))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to send registration");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_weak_password_rejected() {
    let resp = client()
        .post(format!("{}/auth/register", storefront_base_url()))
        .json(&json!({ "email": unique_email(), "password": "short" }))
        .send()
        .await
        .expect("Failed to send registration");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_login_logout_cycle() {
    let (_, email) = signed_in_client().await;
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to send logout");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/auth/me"))
        .send()
        .await
        .expect("Failed to get current user");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
