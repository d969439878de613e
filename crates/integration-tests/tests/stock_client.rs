//! Integration tests for the stock API client.

#![allow(clippy::unwrap_used)]

use rocket_shoes_core::{Price, ProductId};
use rocket_shoes_integration_tests::{
    mount_product, mount_stock, mount_stock_amount_only, stock_client,
};
use rocket_shoes_storefront::config::StockApiConfig;
use rocket_shoes_storefront::{StockClient, StockError, StockService};
use secrecy::SecretString;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_stock() {
    let server = MockServer::start().await;
    mount_stock(&server, 1, 3).await;

    let stock = stock_client(&server).stock(ProductId::new(1)).await.unwrap();

    assert_eq!(stock.id, Some(ProductId::new(1)));
    assert_eq!(stock.amount, 3);
}

#[tokio::test]
async fn test_fetch_stock_without_id() {
    let server = MockServer::start().await;
    mount_stock_amount_only(&server, 4, 5).await;

    let stock = stock_client(&server).stock(ProductId::new(4)).await.unwrap();

    assert_eq!(stock.id, None);
    assert_eq!(stock.amount, 5);
}

#[tokio::test]
async fn test_fetch_product() {
    let server = MockServer::start().await;
    mount_product(&server, 2, 139.9).await;

    let product = stock_client(&server)
        .product(ProductId::new(2))
        .await
        .unwrap();

    assert_eq!(product.title, "Tênis 2");
    assert_eq!(product.price, Price::from_cents(13990));
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{}"))
        .mount(&server)
        .await;

    let result = stock_client(&server).stock(ProductId::new(404)).await;

    assert!(matches!(result, Err(StockError::NotFound(id)) if id == ProductId::new(404)));
}

#[tokio::test]
async fn test_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/1"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let result = stock_client(&server).stock(ProductId::new(1)).await;

    assert!(matches!(result, Err(StockError::RateLimited(7))));
}

#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = stock_client(&server).stock(ProductId::new(1)).await;

    match result {
        Err(StockError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = stock_client(&server).stock(ProductId::new(1)).await;

    assert!(matches!(result, Err(StockError::Parse(_))));
}

#[tokio::test]
async fn test_product_metadata_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 5, "title": "Tênis 5", "price": 99.9, "image": "https://cdn/5.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = stock_client(&server);
    let first = client.product(ProductId::new(5)).await.unwrap();
    let second = client.product(ProductId::new(5)).await.unwrap();

    assert_eq!(first, second);
    // `expect(1)` is verified when the server drops
}

#[tokio::test]
async fn test_stock_is_never_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 5, "amount": 2 })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = stock_client(&server);
    client.stock(ProductId::new(5)).await.unwrap();
    client.stock(ProductId::new(5)).await.unwrap();
}

#[tokio::test]
async fn test_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/1"))
        .and(header("Authorization", "Bearer k9$Qz!7vLp2@Xw4#"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 1, "amount": 1 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = StockApiConfig::new(&server.uri()).unwrap();
    config.token = Some(SecretString::from("k9$Qz!7vLp2@Xw4#"));
    let client = StockClient::new(&config).unwrap();

    let stock = client.stock(ProductId::new(1)).await.unwrap();
    assert_eq!(stock.amount, 1);
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stock/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 1, "amount": 4 })),
        )
        .mount(&server)
        .await;

    let config = StockApiConfig::new(&format!("{}/api/v1", server.uri())).unwrap();
    let client = StockClient::new(&config).unwrap();

    assert_eq!(client.stock(ProductId::new(1)).await.unwrap().amount, 4);
}
