//! Mocked login, signup, password recovery and the account area.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use essence_arabe_integration_tests::TestClient;

#[tokio::test]
async fn test_account_requires_login() {
    let mut client = TestClient::new();
    let response = client.get("/conta/pedidos?status=ENVIADO").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location(),
        Some("/entrar?next=%2Fconta%2Fpedidos%3Fstatus%3DENVIADO")
    );
}

#[tokio::test]
async fn test_login_page_renders() {
    let mut client = TestClient::new();
    let response = client.get("/entrar?next=/conta/cupons").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("value=\"/conta/cupons\""));
}

#[tokio::test]
async fn test_login_with_email_opens_account() {
    let mut client = TestClient::new();
    let response = client.login().await;
    assert_eq!(response.location(), Some("/conta"));

    let account = client.get("/conta").await;
    assert_eq!(account.status, StatusCode::OK);
    assert!(account.body.contains("Login realizado!"));
    assert!(account.body.contains("Olá, Cliente!"));
}

#[tokio::test]
async fn test_login_returns_to_next() {
    let mut client = TestClient::new();
    let response = client
        .post_form(
            "/entrar",
            &[
                ("identifier", "11988887777"),
                ("password", "x"),
                ("next", "/conta/cupons"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/conta/cupons"));
}

#[tokio::test]
async fn test_login_rejects_offsite_next() {
    let mut client = TestClient::new();
    let response = client
        .post_form(
            "/entrar",
            &[
                ("identifier", "ana@example.com"),
                ("password", "x"),
                ("next", "//evil.example"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/conta"));
}

#[tokio::test]
async fn test_login_rejects_next_with_control_characters() {
    let mut client = TestClient::new();
    let response = client
        .post_form(
            "/entrar",
            &[
                ("identifier", "ana@example.com"),
                ("password", "x"),
                ("next", "/conta\nX"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/conta"));
}

#[tokio::test]
async fn test_login_with_bad_identifier() {
    let mut client = TestClient::new();
    let response = client
        .post_form("/entrar", &[("identifier", "ana"), ("password", "x")])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Use um email ou WhatsApp válido."));

    let account = client.get("/conta").await;
    assert_eq!(account.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_logged_in_visitor_skips_login_page() {
    let mut client = TestClient::new();
    client.login().await;
    let response = client.get("/entrar").await;
    assert_eq!(response.location(), Some("/conta"));
}

#[tokio::test]
async fn test_logout() {
    let mut client = TestClient::new();
    client.login().await;

    let response = client.post_form("/sair", &[]).await;
    assert_eq!(response.location(), Some("/"));

    let account = client.get("/conta").await;
    assert_eq!(account.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_signup_creates_account() {
    let mut client = TestClient::new();
    let response = client
        .post_form(
            "/criar-conta",
            &[
                ("full_name", "Joana Lima"),
                ("whatsapp", "(21) 99876-5432"),
                ("email", "joana@example.com"),
                ("password", "segredo123"),
                ("confirm_password", "segredo123"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/conta"));

    let account = client.get("/conta").await;
    assert!(account.body.contains("Conta criada!"));
    assert!(account.body.contains("Olá, Joana!"));

    let preferences = client.get("/conta/preferencias").await;
    assert!(!preferences.body.contains("name=\"receive_whatsapp_updates\" checked"));
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let mut client = TestClient::new();
    let response = client
        .post_form(
            "/criar-conta",
            &[
                ("full_name", "Jo"),
                ("whatsapp", "123"),
                ("password", "curta"),
                ("confirm_password", "outra"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Nome deve ter pelo menos 3 caracteres"));
    assert!(response.body.contains("WhatsApp inválido"));
    assert!(response.body.contains("Senha deve ter pelo menos 8 caracteres"));
    assert!(response.body.contains("As senhas não coincidem"));
}

#[tokio::test]
async fn test_password_recovery() {
    let mut client = TestClient::new();
    let page = client.get("/recuperar-senha").await;
    assert_eq!(page.status, StatusCode::OK);

    let response = client
        .post_form("/recuperar-senha", &[("identifier", "ana@example.com")])
        .await;
    assert_eq!(response.location(), Some("/entrar"));
    let login = client.get("/entrar").await;
    assert!(login.body.contains("Instruções enviadas!"));

    let invalid = client
        .post_form("/recuperar-senha", &[("identifier", "ana")])
        .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_profile() {
    let mut client = TestClient::new();
    client.login().await;

    let response = client
        .post_form(
            "/conta/perfil",
            &[
                ("full_name", "Ana Souza"),
                ("email", "ana@example.com"),
                ("whatsapp", "11999998888"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/conta"));

    let account = client.get("/conta").await;
    assert!(account.body.contains("Perfil atualizado"));
    assert!(account.body.contains("Olá, Ana!"));
}

#[tokio::test]
async fn test_addresses() {
    let mut client = TestClient::new();
    client.login().await;

    let empty = client.get("/conta/enderecos").await;
    assert!(empty.body.contains("Nenhum endereço salvo."));

    let invalid = client
        .post_form(
            "/conta/enderecos",
            &[
                ("cep", "1"),
                ("address_line1", ""),
                ("neighborhood", ""),
                ("city", ""),
                ("state", ""),
            ],
        )
        .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(invalid.body.contains("CEP inválido"));

    let saved = client
        .post_form(
            "/conta/enderecos",
            &[
                ("label", "Trabalho"),
                ("cep", "01310-100"),
                ("address_line1", "Avenida Paulista, 1000"),
                ("neighborhood", "Bela Vista"),
                ("city", "São Paulo"),
                ("state", "SP"),
            ],
        )
        .await;
    assert_eq!(saved.location(), Some("/conta/enderecos"));

    let page = client.get("/conta/enderecos").await;
    assert!(page.body.contains("Endereço salvo"));
    assert!(page.body.contains("Avenida Paulista, 1000"));
}

#[tokio::test]
async fn test_preferences_round_trip_through_form() {
    let mut client = TestClient::new();
    client.login().await;

    let response = client
        .post_form(
            "/conta/preferencias",
            &[
                ("receive_email_updates", "on"),
                ("favorite_categories", "Doce"),
                ("favorite_categories", "Fresco"),
                ("favorite_categories", "Inexistente"),
            ],
        )
        .await;
    assert_eq!(response.location(), Some("/conta/preferencias"));

    let page = client.get("/conta/preferencias").await;
    assert!(page.body.contains("Preferências salvas"));
    assert!(page.body.contains("value=\"Doce\" checked"));
    assert!(page.body.contains("value=\"Fresco\" checked"));
    assert!(!page.body.contains("value=\"Amadeirado\" checked"));
    assert!(!page.body.contains("Inexistente"));
}

#[tokio::test]
async fn test_order_history_and_filters() {
    let mut client = TestClient::new();
    client.add_to_cart("7", 1).await;
    client.fill_checkout(false).await;
    let placed = client
        .post_form("/checkout/finalizar", &[("accept_terms", "on")])
        .await;
    let code = placed
        .location()
        .unwrap()
        .trim_start_matches("/pedido/")
        .to_string();

    client.login().await;

    let orders = client.get("/conta/pedidos").await;
    assert_eq!(orders.status, StatusCode::OK);
    assert!(orders.body.contains(&code));

    let by_product = client.get("/conta/pedidos?q=khamrah").await;
    assert!(by_product.body.contains(&code));

    let cancelled = client.get("/conta/pedidos?status=CANCELADO").await;
    assert!(!cancelled.body.contains(&code));
    assert!(cancelled.body.contains("Nenhum pedido encontrado com esses filtros."));

    let detail = client.get(&format!("/conta/pedidos/{code}")).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert!(detail.body.contains(&format!("Pedido {code}")));
}

#[tokio::test]
async fn test_unknown_order_detail() {
    let mut client = TestClient::new();
    client.login().await;

    let response = client.get("/conta/pedidos/EA-20260301-0000").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Pedido não encontrado"));
}

#[tokio::test]
async fn test_coupons_and_referrals() {
    let mut client = TestClient::new();
    client.login().await;

    let coupons = client.get("/conta/cupons").await;
    assert_eq!(coupons.status, StatusCode::OK);
    assert!(coupons.body.contains("BEMVINDO10"));
    assert!(coupons.body.contains("PRIMEIRA20"));

    let referrals = client.get("/conta/indicacoes").await;
    assert_eq!(referrals.status, StatusCode::OK);
    assert!(referrals.body.contains("Indique e ganhe"));
}
