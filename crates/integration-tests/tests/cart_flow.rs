//! Cart mutations and coupons.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use essence_arabe_integration_tests::TestClient;

#[tokio::test]
async fn test_empty_cart_page() {
    let mut client = TestClient::new();
    let response = client.get("/carrinho").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Seu carrinho"));

    let count = client.get("/carrinho/contagem").await;
    assert_eq!(count.body.trim(), "0");
}

#[tokio::test]
async fn test_add_to_cart_redirects_and_flashes() {
    let mut client = TestClient::new();
    let response = client.add_to_cart("7", 2).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/carrinho"));

    let cart = client.get("/carrinho").await;
    assert!(cart.body.contains("Adicionado ao carrinho"));
    assert!(cart.body.contains("Khamrah"));

    let count = client.get("/carrinho/contagem").await;
    assert_eq!(count.body.trim(), "2");
}

#[tokio::test]
async fn test_flash_shows_only_once() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;

    let first = client.get("/carrinho").await;
    assert!(first.body.contains("Adicionado ao carrinho"));
    let second = client.get("/carrinho").await;
    assert!(!second.body.contains("Adicionado ao carrinho"));
}

#[tokio::test]
async fn test_htmx_add_returns_count_fragment() {
    let mut client = TestClient::new();
    let request = Request::builder()
        .method("POST")
        .uri("/carrinho/adicionar")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true")
        .body(Body::from("product_id=7&quantity=3"))
        .unwrap();
    let response = client.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["hx-trigger"], "cart-updated");
    assert_eq!(response.body.trim(), "3");
}

#[tokio::test]
async fn test_out_of_stock_product_is_rejected() {
    let mut client = TestClient::new();
    client.add_to_cart("1", 1).await;

    let count = client.get("/carrinho/contagem").await;
    assert_eq!(count.body.trim(), "0");
}

#[tokio::test]
async fn test_quantity_changes() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;

    client
        .post_form("/carrinho/incrementar", &[("product_id", "7")])
        .await;
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "2");

    client
        .post_form("/carrinho/quantidade", &[("product_id", "7"), ("quantity", "5")])
        .await;
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "5");

    client
        .post_form("/carrinho/quantidade", &[("product_id", "7"), ("quantity", "0")])
        .await;
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "0");
}

#[tokio::test]
async fn test_decrement_at_one_removes_line() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;
    client.add_to_cart("8", 1).await;

    client
        .post_form("/carrinho/decrementar", &[("product_id", "7")])
        .await;
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "1");

    client
        .post_form("/carrinho/remover", &[("product_id", "8")])
        .await;
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "0");
}

#[tokio::test]
async fn test_valid_coupon_is_applied() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;

    let response = client
        .post_form("/carrinho/cupom", &[("code", "bemvindo10")])
        .await;
    assert_eq!(response.location(), Some("/carrinho"));

    let cart = client.get("/carrinho").await;
    assert!(cart.body.contains("Cupom aplicado!"));
    assert!(cart.body.contains("BEMVINDO10"));
}

#[tokio::test]
async fn test_unknown_coupon_is_rejected() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;

    client
        .post_form("/carrinho/cupom", &[("code", "NAOEXISTE")])
        .await;
    let cart = client.get("/carrinho").await;
    assert!(cart.body.contains("Cupom inválido"));
}

#[tokio::test]
async fn test_coupon_minimum_is_enforced() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;

    client
        .post_form("/carrinho/cupom", &[("code", "PRIMEIRA20")])
        .await;
    let cart = client.get("/carrinho").await;
    assert!(cart.body.contains("Compra mínima de R$"));
}

#[tokio::test]
async fn test_removing_coupon_restores_total() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 2).await;
    client
        .post_form("/carrinho/cupom", &[("code", "BEMVINDO10")])
        .await;
    let discounted = client.get("/carrinho").await;
    assert!(discounted.body.contains("coupon-applied"));
    assert!(discounted.body.contains("R$ 484,20"));

    let response = client.post_form("/carrinho/cupom/remover", &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/carrinho"));

    let cart = client.get("/carrinho").await;
    assert!(!cart.body.contains("coupon-applied"));
    assert!(!cart.body.contains("R$ 484,20"));
    assert!(cart.body.contains("R$ 538,00"));
}

#[tokio::test]
async fn test_coupon_dropped_below_minimum() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 2).await;
    client
        .post_form("/carrinho/cupom", &[("code", "PRIMEIRA20")])
        .await;
    assert!(client.get("/carrinho").await.body.contains("coupon-applied"));

    client
        .post_form("/carrinho/decrementar", &[("product_id", "7")])
        .await;
    let cart = client.get("/carrinho").await;
    assert!(cart.body.contains("Cupom removido"));
    assert!(cart.body.contains("Compra mínima de R$ 300,00"));
    assert!(!cart.body.contains("coupon-applied"));
}

#[tokio::test]
async fn test_oversized_quantity_keeps_cart_usable() {
    let mut client = TestClient::new();
    let response = client.add_to_cart("7", u32::MAX).await;
    assert_eq!(response.location(), Some("/carrinho"));
    assert!(client.get("/carrinho").await.body.contains("Quantidade inválida"));

    client.add_to_cart("8", 1).await;
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "1");

    client
        .post_form("/carrinho/quantidade", &[("product_id", "8"), ("quantity", "500")])
        .await;
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "1");
    assert_eq!(client.get("/").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_cart_page_offers_whatsapp_help() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;

    let cart = client.get("/carrinho").await;
    assert!(cart.body.contains("https://wa.me/"));
}
