//! Integration tests for the cart, saved-for-later and wishlist.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database
//! - The storefront server running (cargo run -p lumina-storefront)

use lumina_integration_tests::{
    any_product_id, client, json_body, signed_in_client, storefront_base_url,
};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cart_requires_sign_in() {
    let resp = client()
        .get(format!("{}/cart", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_add_twice_increments_quantity() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/cart/items"))
            .json(&json!({ "product_id": product_id }))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let cart = json_body(
        client
            .get(format!("{base_url}/cart"))
            .send()
            .await
            .expect("Failed to get cart"),
    )
    .await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(cart["total_items"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_quantity_zero_removes_row() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    client
        .post(format!("{base_url}/cart/items"))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .patch(format!("{base_url}/cart/items/{product_id}"))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to update quantity");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart = json_body(resp).await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_save_for_later_and_back() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    client
        .post(format!("{base_url}/cart/items"))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("Failed to add to cart");

    let cart = json_body(
        client
            .post(format!("{base_url}/cart/items/{product_id}/save-for-later"))
            .send()
            .await
            .expect("Failed to save for later"),
    )
    .await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(cart["saved_items"].as_array().map(Vec::len), Some(1));

    let cart = json_body(
        client
            .post(format!("{base_url}/cart/saved/{product_id}/move-to-cart"))
            .send()
            .await
            .expect("Failed to move to cart"),
    )
    .await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["saved_items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_moving_missing_row_is_not_found() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    let resp = client
        .post(format!("{base_url}/cart/saved/{product_id}/move-to-cart"))
        .send()
        .await
        .expect("Failed to send move");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_wishlist_has_no_duplicates() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    for _ in 0..2 {
        client
            .post(format!("{base_url}/wishlist/items"))
            .json(&json!({ "product_id": product_id }))
            .send()
            .await
            .expect("Failed to add to wishlist");
    }

    let wishlist = json_body(
        client
            .get(format!("{base_url}/wishlist"))
            .send()
            .await
            .expect("Failed to get wishlist"),
    )
    .await;
    assert_eq!(wishlist["items"].as_array().map(Vec::len), Some(1));

    let resp = client
        .delete(format!("{base_url}/wishlist/items/{product_id}"))
        .send()
        .await
        .expect("Failed to remove from wishlist");
    assert_eq!(json_body(resp).await["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product_is_not_found() {
    let (client, _) = signed_in_client().await;

    let resp = client
        .post(format!("{}/cart/items", storefront_base_url()))
        .json(&json!({ "product_id": i32::MAX }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
