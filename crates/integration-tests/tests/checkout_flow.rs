//! Four-step checkout, order placement and the confirmation offer.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::Duration;
use essence_arabe_integration_tests::{TestClient, TestResponse};

/// Submit the review form.
async fn place(client: &mut TestClient, accept_terms: bool) -> TestResponse {
    let mut fields = vec![("notes", "Embrulhar para presente")];
    if accept_terms {
        fields.push(("accept_terms", "on"));
    }
    client.post_form("/checkout/finalizar", &fields).await
}

/// Buy one Khamrah and return the confirmation path.
async fn placed_order_path(client: &mut TestClient) -> String {
    client.add_to_cart("7", 1).await;
    client.fill_checkout(false).await;
    let response = place(client, true).await;
    response.location().unwrap().to_string()
}

#[tokio::test]
async fn test_checkout_with_empty_cart_redirects_to_cart() {
    let mut client = TestClient::new();
    let response = client.get("/checkout").await;
    assert_eq!(response.location(), Some("/carrinho"));
}

#[tokio::test]
async fn test_checkout_starts_at_contact_step() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;

    let response = client.get("/checkout").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Finalizar compra"));
    assert!(response.body.contains("name=\"email\""));
}

#[tokio::test]
async fn test_invalid_contact_rerenders_with_errors() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;

    let response = client
        .post_form(
            "/checkout/contato",
            &[("name", "M"), ("email", "nao-e-email"), ("phone", "123")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Nome deve ter pelo menos 2 caracteres"));
    assert!(response.body.contains("Email inválido"));
    assert!(response.body.contains("Telefone inválido"));
}

#[tokio::test]
async fn test_invalid_delivery_rerenders_with_errors() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;
    client
        .post_form(
            "/checkout/contato",
            &[
                ("name", "Maria Silva"),
                ("email", "maria@example.com"),
                ("phone", "11988887777"),
            ],
        )
        .await;

    let response = client
        .post_form(
            "/checkout/entrega",
            &[
                ("cep", "123"),
                ("address", "Rua"),
                ("number", ""),
                ("neighborhood", "B"),
                ("city", "S"),
                ("state", "Sao Paulo"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("field-error"));
}

#[tokio::test]
async fn test_review_step_summarizes_draft() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;
    client.fill_checkout(false).await;

    let response = client.get("/checkout").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Maria Silva"));
    assert!(response.body.contains("Avenida Paulista"));
}

#[tokio::test]
async fn test_back_returns_to_previous_step() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;
    client.fill_checkout(false).await;

    let response = client.post_form("/checkout/voltar", &[]).await;
    assert_eq!(response.location(), Some("/checkout"));

    let page = client.get("/checkout").await;
    assert!(page.body.contains("name=\"method\""));
}

#[tokio::test]
async fn test_order_needs_terms() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;
    client.fill_checkout(false).await;

    let response = place(&mut client, false).await;
    assert_eq!(response.location(), Some("/checkout"));

    let page = client.get("/checkout").await;
    assert!(page.body.contains("Você precisa aceitar os termos para finalizar"));
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "1");
}

#[tokio::test]
async fn test_place_order_clears_cart_and_confirms() {
    let mut client = TestClient::new();
    let path = placed_order_path(&mut client).await;

    assert!(path.starts_with("/pedido/EA-20260301-"));
    assert_eq!(path.len(), "/pedido/EA-20260301-0000".len());
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "0");

    let confirmation = client.get(&path).await;
    assert_eq!(confirmation.status, StatusCode::OK);
    assert!(confirmation.body.contains("Obrigado pela compra!"));
    assert!(confirmation.body.contains("class=\"oto\""));
    assert!(confirmation.body.contains("data-seconds=\"600\""));
}

#[tokio::test]
async fn test_unknown_order_confirmation_is_not_found() {
    let mut client = TestClient::new();
    let response = client.get("/pedido/EA-20260301-9999").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_bump_is_added_to_order() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;

    let payment_page = {
        client
            .post_form(
                "/checkout/contato",
                &[
                    ("name", "Maria Silva"),
                    ("email", "maria@example.com"),
                    ("phone", "11988887777"),
                ],
            )
            .await;
        client
            .post_form(
                "/checkout/entrega",
                &[
                    ("cep", "01310100"),
                    ("address", "Avenida Paulista"),
                    ("number", "1000"),
                    ("neighborhood", "Bela Vista"),
                    ("city", "São Paulo"),
                    ("state", "SP"),
                    ("shipping_method", "express"),
                ],
            )
            .await;
        client.get("/checkout").await
    };
    assert!(payment_page.body.contains("name=\"add_order_bump\""));

    client
        .post_form("/checkout/pagamento", &[("method", "card"), ("add_order_bump", "on")])
        .await;
    let review = client.get("/checkout").await;
    assert!(review.body.contains("Amostra 5ml - Khamrah"));

    let metrics = client.get("/upsell/metricas").await.json();
    assert_eq!(metrics["BUMP_DECANT_10ML"]["accepts"], 1);
    assert_eq!(metrics["BUMP_DECANT_10ML"]["impressions"], 1);
}

#[tokio::test]
async fn test_post_purchase_offer_adds_to_cart() {
    let mut client = TestClient::new();
    let path = placed_order_path(&mut client).await;

    let response = client.post_form(&format!("{path}/oferta"), &[]).await;
    assert_eq!(response.location(), Some("/carrinho"));

    let cart = client.get("/carrinho").await;
    assert!(cart.body.contains("Oferta adicionada!"));
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "1");
}

#[tokio::test]
async fn test_post_purchase_offer_expires() {
    let mut client = TestClient::new();
    let path = placed_order_path(&mut client).await;

    client.clock().advance(Duration::minutes(11));

    let confirmation = client.get(&path).await;
    assert_eq!(confirmation.status, StatusCode::OK);
    assert!(!confirmation.body.contains("class=\"oto\""));

    let response = client.post_form(&format!("{path}/oferta"), &[]).await;
    assert_eq!(response.location(), Some(path.as_str()));
    assert_eq!(client.get("/carrinho/contagem").await.body.trim(), "0");
}
