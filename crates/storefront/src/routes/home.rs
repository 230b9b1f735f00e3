//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use essence_arabe_core::catalog::{COLLECTIONS, Collection};

use super::layout::Layout;
use super::views::{ProductCard, cards};
use crate::filters;
use crate::state::AppState;

/// Best sellers shown on the home page.
const HOME_BEST_SELLERS: usize = 8;

/// A value proposition shown under the hero.
pub struct Highlight {
    pub title: &'static str,
    pub text: &'static str,
}

const HIGHLIGHTS: [Highlight; 3] = [
    Highlight {
        title: "Frete grátis",
        text: "Entrega padrão grátis acima de R$ 200",
    },
    Highlight {
        title: "12x sem juros",
        text: "Parcele suas compras no cartão",
    },
    Highlight {
        title: "Atendimento no WhatsApp",
        text: "Tire dúvidas com nossa equipe",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub best_sellers: Vec<ProductCard>,
    pub collections: &'static [Collection],
    pub highlights: &'static [Highlight],
}

/// Display the home page.
#[instrument(skip(state, layout))]
pub async fn home(State(state): State<AppState>, layout: Layout) -> impl IntoResponse {
    HomeTemplate {
        layout,
        best_sellers: cards(state.catalog().best_sellers(HOME_BEST_SELLERS)),
        collections: &COLLECTIONS,
        highlights: &HIGHLIGHTS,
    }
}
