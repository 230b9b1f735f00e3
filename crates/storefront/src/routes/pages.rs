//! Static content pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use super::layout::Layout;
use crate::filters;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

/// Display the about page.
#[instrument(skip(layout))]
pub async fn about(layout: Layout) -> impl IntoResponse {
    AboutTemplate { layout }
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

/// Fallback for unknown paths.
#[instrument(skip(layout))]
pub async fn not_found(layout: Layout) -> impl IntoResponse {
    (axum::http::StatusCode::NOT_FOUND, NotFoundTemplate { layout })
}
