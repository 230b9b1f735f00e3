//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /sobre                     - About page
//! GET  /health                    - Health check
//!
//! # Catalog
//! GET  /produtos, /catalogo       - Catalog with filters and sort
//! GET  /p/{slug}                  - Product detail
//! GET  /produto/{id}              - Product detail by id
//!
//! # Cart
//! GET  /carrinho                  - Cart page
//! POST /carrinho/adicionar        - Add item (HTMX: count fragment + HX-Trigger)
//! POST /carrinho/incrementar      - +1
//! POST /carrinho/decrementar      - -1, removing at 1
//! POST /carrinho/quantidade       - Set quantity, 0 removes
//! POST /carrinho/remover          - Remove line
//! POST /carrinho/cupom            - Apply coupon
//! POST /carrinho/cupom/remover    - Remove coupon
//! GET  /carrinho/contagem         - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                  - Current step
//! POST /checkout/contato          - Contact step
//! POST /checkout/entrega          - Delivery step
//! POST /checkout/pagamento        - Payment step (+ order bump)
//! POST /checkout/revisao          - Review notes and terms
//! POST /checkout/voltar           - Previous step
//! POST /checkout/finalizar        - Place order
//! GET  /pedido/{code}             - Confirmation (+ post-purchase offer)
//! POST /pedido/{code}/oferta      - Accept post-purchase offer
//!
//! # Upsell
//! POST /upsell/aceitar            - Accept offer
//! POST /upsell/eventos            - Record event (JSON)
//! GET  /upsell/metricas           - Per-offer metrics (JSON)
//!
//! # API
//! GET  /api/cep/{cep}             - Postal-code lookup (JSON)
//!
//! # Auth (posts rate limited)
//! GET  /entrar                    - Login page
//! POST /entrar                    - Login action
//! GET  /criar-conta               - Signup page
//! POST /criar-conta               - Signup action
//! GET  /recuperar-senha           - Password recovery page
//! POST /recuperar-senha           - Password recovery action
//! POST /sair                      - Logout
//!
//! # Account (requires auth)
//! GET  /conta                     - Overview and profile form
//! POST /conta/perfil              - Update profile
//! GET  /conta/pedidos             - Order history
//! GET  /conta/pedidos/{code}      - Order detail
//! GET  /conta/enderecos           - Address book
//! POST /conta/enderecos           - Add address
//! POST /conta/enderecos/{id}/padrao  - Set default address
//! POST /conta/enderecos/{id}/remover - Remove address
//! GET  /conta/cupons              - Coupon list
//! GET  /conta/indicacoes          - Referral link
//! GET  /conta/preferencias        - Preferences
//! POST /conta/preferencias        - Save preferences
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod layout;
pub mod orders;
pub mod pages;
pub mod products;
pub mod upsell;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Form posts get the rate limiter when `rate_limit` is set; the pages
/// themselves are never limited.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let pages = Router::new()
        .route("/entrar", get(auth::login_page))
        .route("/criar-conta", get(auth::signup_page))
        .route("/recuperar-senha", get(auth::recover_page));

    let mut posts = Router::new()
        .route("/entrar", post(auth::login))
        .route("/criar-conta", post(auth::signup))
        .route("/recuperar-senha", post(auth::recover));
    if rate_limit {
        posts = posts.route_layer(auth_rate_limiter());
    }

    pages.merge(posts).route("/sair", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/adicionar", post(cart::add))
        .route("/incrementar", post(cart::increment))
        .route("/decrementar", post(cart::decrement))
        .route("/quantidade", post(cart::set_quantity))
        .route("/remover", post(cart::remove))
        .route("/cupom", post(cart::apply_coupon))
        .route("/cupom/remover", post(cart::remove_coupon))
        .route("/contagem", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/contato", post(checkout::submit_contact))
        .route("/entrega", post(checkout::submit_delivery))
        .route("/pagamento", post(checkout::submit_payment))
        .route("/revisao", post(checkout::submit_review))
        .route("/voltar", post(checkout::back))
        .route("/finalizar", post(checkout::place))
}

/// Create the upsell routes router.
pub fn upsell_routes() -> Router<AppState> {
    Router::new()
        .route("/aceitar", post(upsell::accept))
        .route("/eventos", post(upsell::record_event))
        .route("/metricas", get(upsell::metrics))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::home))
        .route("/perfil", post(account::update_profile))
        .route("/pedidos", get(account::orders))
        .route("/pedidos/{code}", get(account::order_detail))
        .route(
            "/enderecos",
            get(account::addresses).post(account::add_address),
        )
        .route(
            "/enderecos/{id}/padrao",
            post(account::set_default_address),
        )
        .route("/enderecos/{id}/remover", post(account::remove_address))
        .route("/cupons", get(account::coupons))
        .route("/indicacoes", get(account::referrals))
        .route(
            "/preferencias",
            get(account::preferences).post(account::update_preferences),
        )
}

/// Create all routes for the storefront.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        // Pages
        .route("/", get(home::home))
        .route("/sobre", get(pages::about))
        // Catalog
        .route("/produtos", get(products::index))
        .route("/catalogo", get(products::index))
        .route("/p/{slug}", get(products::show_by_slug))
        .route("/produto/{id}", get(products::show_by_id))
        // Cart and checkout
        .nest("/carrinho", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/pedido/{code}", get(orders::confirmation))
        .route("/pedido/{code}/oferta", post(orders::accept_offer))
        // Upsell
        .nest("/upsell", upsell_routes())
        .route("/api/cep/{cep}", get(api::cep))
        // Auth and account
        .merge(auth_routes(rate_limit))
        .nest("/conta", account_routes())
        .fallback(pages::not_found)
}
