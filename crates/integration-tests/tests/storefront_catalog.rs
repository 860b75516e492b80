//! Integration tests for catalog browsing and search.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database
//! - The storefront server running (cargo run -p lumina-storefront)

use lumina_core::catalog::SUGGESTION_LIMIT;
use lumina_integration_tests::{client, json_body, storefront_base_url};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_shop_price_sort() {
    let resp = client()
        .get(format!(
            "{}/shop?sort_by=price-low&max_price=100000",
            storefront_base_url()
        ))
        .send()
        .await
        .expect("Failed to get shop");
    assert_eq!(resp.status(), StatusCode::OK);

    let shop = json_body(resp).await;
    let prices: Vec<f64> = shop["products"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|p| p["price"].as_str()?.parse().ok())
        .collect();
    assert!(prices.windows(2).all(|w| w.first() <= w.last()));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_sort_rejected() {
    let resp = client()
        .get(format!("{}/shop?sort_by=cheapest", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get shop");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_suggestions_are_capped() {
    let resp = client()
        .get(format!("{}/search/suggest?q=e", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get suggestions");
    assert_eq!(resp.status(), StatusCode::OK);

    let suggestions = json_body(resp).await;
    let count = suggestions.as_array().map_or(0, Vec::len);
    assert!(count <= SUGGESTION_LIMIT);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_empty_suggest_query() {
    let resp = client()
        .get(format!("{}/search/suggest?q=", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get suggestions");
    assert_eq!(json_body(resp).await.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_category_is_not_found() {
    let resp = client()
        .get(format!(
            "{}/categories/no-such-category",
            storefront_base_url()
        ))
        .send()
        .await
        .expect("Failed to get category");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
