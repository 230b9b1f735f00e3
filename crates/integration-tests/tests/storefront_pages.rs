//! Page rendering, catalog browsing and response headers.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use essence_arabe_integration_tests::TestClient;

#[tokio::test]
async fn test_health_check() {
    let mut client = TestClient::new();
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_home_page_renders_with_security_headers() {
    let mut client = TestClient::new();
    let response = client.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Fragrâncias intensas"));
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert!(response.headers.contains_key("x-request-id"));

    let csp = response.headers["content-security-policy"].to_str().unwrap();
    assert!(csp.contains("'nonce-"));
}

#[tokio::test]
async fn test_about_page() {
    let mut client = TestClient::new();
    let response = client.get("/sobre").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Sobre a Essence Árabe"));
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let mut client = TestClient::new();
    let response = client.get("/nao-existe").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Página não encontrada"));
}

#[tokio::test]
async fn test_catalog_lists_products() {
    let mut client = TestClient::new();
    let response = client.get("/produtos").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Khamrah"));
    assert!(response.body.contains("Khamrah Qahwa"));

    let alias = client.get("/catalogo").await;
    assert_eq!(alias.status, StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_search_narrows_results() {
    let mut client = TestClient::new();
    let response = client.get("/produtos?q=qahwa").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Khamrah Qahwa"));
    assert!(!response.body.contains("Yum Yum"));
}

#[tokio::test]
async fn test_catalog_ignores_bad_filter_values() {
    let mut client = TestClient::new();
    let response = client
        .get("/produtos?preco_min=abc&tamanho=grande&ordenar=whatever")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Khamrah"));
}

#[tokio::test]
async fn test_product_page_by_slug() {
    let mut client = TestClient::new();
    let response = client.get("/p/khamrah-lattafa").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<h1>Khamrah</h1>"));
}

#[tokio::test]
async fn test_product_page_by_id() {
    let mut client = TestClient::new();
    let response = client.get("/produto/7").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<h1>Khamrah</h1>"));
}

#[tokio::test]
async fn test_unknown_product_falls_back_to_first() {
    let mut client = TestClient::new();
    let response = client.get("/p/perfume-que-nao-existe").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<h1>"));
}

#[tokio::test]
async fn test_static_stylesheet_is_served() {
    let mut client = TestClient::new();
    let response = client.get("/static/css/main.css").await;
    assert_eq!(response.status, StatusCode::OK);
}
