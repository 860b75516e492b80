//! Integration tests for the account area.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (lumina-cli migrate)
//! - The storefront server running (cargo run -p lumina-storefront)

use lumina_integration_tests::{json_body, signed_in_client, storefront_base_url};
use reqwest::StatusCode;
use serde_json::{Value, json};

fn address(name: &str, is_default: bool) -> Value {
    json!({
        "full_name": name,
        "address": "1 Market Street",
        "city": "Springfield",
        "state": "OR",
        "postal_code": "97477",
        "country": "US",
        "is_default": is_default
    })
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_overview_for_new_shopper() {
    let (client, _) = signed_in_client().await;

    let overview = json_body(
        client
            .get(format!("{}/account", storefront_base_url()))
            .send()
            .await
            .expect("Failed to get account"),
    )
    .await;
    assert_eq!(overview["counts"]["orders"], 0);
    assert_eq!(overview["counts"]["addresses"], 0);
    assert_eq!(overview["recent_orders"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_profile_update() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();

    let resp = client
        .put(format!("{base_url}/account/profile"))
        .json(&json!({
            "display_name": "  Ada  ",
            "phone": "555-0100",
            "birth_date": "1990-12-10"
        }))
        .send()
        .await
        .expect("Failed to update profile");
    assert_eq!(resp.status(), StatusCode::OK);

    let profile = json_body(resp).await;
    assert_eq!(profile["display_name"], "Ada");
    assert_eq!(profile["phone"], "555-0100");
    assert_eq!(profile["birth_date"], "1990-12-10");

    let resp = client
        .put(format!("{base_url}/account/profile"))
        .json(&json!({ "display_name": "   " }))
        .send()
        .await
        .expect("Failed to update profile");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_single_default_address() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();

    for name in ["Home", "Work"] {
        let resp = client
            .post(format!("{base_url}/account/addresses"))
            .json(&address(name, true))
            .send()
            .await
            .expect("Failed to create address");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let addresses = json_body(
        client
            .get(format!("{base_url}/account/addresses"))
            .send()
            .await
            .expect("Failed to list addresses"),
    )
    .await;
    let defaults: Vec<&Value> = addresses
        .as_array()
        .into_iter()
        .flatten()
        .filter(|a| a["is_default"] == true)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults.first().map(|a| &a["full_name"]), Some(&json!("Work")));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_address_missing_field_rejected() {
    let (client, _) = signed_in_client().await;
    let mut body = address("Home", false);
    body["city"] = json!("");

    let resp = client
        .post(format!("{}/account/addresses", storefront_base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_card_number_is_masked() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/account/payment-methods"))
        .json(&json!({
            "type": "card",
            "card_number": "5555444433331111",
            "card_holder": "Ada Lovelace",
            "expiry_date": "12/30"
        }))
        .send()
        .await
        .expect("Failed to create payment method");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let method = json_body(resp).await;
    assert_eq!(method["card_brand"], "Mastercard");
    let number = method["card_number"].as_str().unwrap_or_default();
    assert!(number.ends_with("1111"));
    assert!(!number.contains("5555"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_notification_toggle() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();

    let settings = json_body(
        client
            .get(format!("{base_url}/account/notifications"))
            .send()
            .await
            .expect("Failed to get notifications"),
    )
    .await;
    assert_eq!(settings["email"]["promotions"], true);

    let settings = json_body(
        client
            .post(format!("{base_url}/account/notifications/toggle"))
            .json(&json!({ "channel": "email", "kind": "promotions" }))
            .send()
            .await
            .expect("Failed to toggle notification"),
    )
    .await;
    assert_eq!(settings["email"]["promotions"], false);

    let resp = client
        .post(format!("{base_url}/account/notifications/toggle"))
        .json(&json!({ "channel": "sms", "kind": "newsletter" }))
        .send()
        .await
        .expect("Failed to toggle notification");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
