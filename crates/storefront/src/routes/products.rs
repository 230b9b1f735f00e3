//! Catalog and product detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, RawQuery, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use tracing::instrument;

use essence_arabe_core::catalog::{COLLECTIONS, CatalogQuery, SortBy, collection};
use essence_arabe_core::upsell::{UpsellContext, eligible_offers};
use essence_arabe_core::{Audience, Availability, Product, format_brl};

use super::layout::Layout;
use super::views::{OfferCard, OptionView, ProductCard, cards};
use crate::error::{AppError, Result};
use crate::filters;
use crate::services::{CartStore, UpsellTracker, whatsapp};
use crate::state::AppState;

/// Related products shown under the product detail.
const RELATED_LIMIT: usize = 4;

/// Parse the catalog query string.
///
/// Multi-select filters repeat their key (`marca=LATTAFA&marca=ARMAF`).
/// Unknown keys and unparseable values are ignored.
#[must_use]
pub fn parse_catalog_query(raw: Option<&str>) -> CatalogQuery {
    let mut query = CatalogQuery::default();
    let Some(raw) = raw else {
        return query;
    };

    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "q" => query.search = value.to_string(),
            "marca" => query.brands.push(value.to_string()),
            "publico" => {
                if let Ok(audience) = value.parse::<Audience>() {
                    query.audiences.push(audience);
                }
            }
            "tamanho" => {
                if let Ok(size) = value.parse::<u32>() {
                    query.sizes.push(size);
                }
            }
            "inspirado" => query.inspired_by = value.to_string(),
            "disponibilidade" => query.availability = value.parse::<Availability>().ok(),
            "preco_min" => {
                if let Ok(min) = value.parse::<Decimal>() {
                    query.price_min = min.max(Decimal::ZERO);
                }
            }
            "preco_max" => {
                if let Ok(max) = value.parse::<Decimal>() {
                    query.price_max = max;
                }
            }
            "colecao" => {
                query.collection = collection(value).map(|c| c.id.to_string());
            }
            "ordenar" => {
                if let Ok(sort) = value.parse::<SortBy>() {
                    query.sort = sort;
                }
            }
            _ => {}
        }
    }
    query
}

/// Collection chip above the catalog.
pub struct CollectionChip {
    pub label: &'static str,
    pub url: String,
    pub active: bool,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductCard>,
    pub search: String,
    pub inspired_by: String,
    pub price_min: String,
    pub price_max: String,
    pub brands: Vec<OptionView>,
    pub audiences: Vec<OptionView>,
    pub sizes: Vec<OptionView>,
    pub availability: Vec<OptionView>,
    pub sorts: Vec<OptionView>,
    pub collections: Vec<CollectionChip>,
    pub active_filters: usize,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductCard,
    pub tags: Vec<String>,
    pub related: Vec<ProductCard>,
    pub offers: Vec<OfferCard>,
    /// WhatsApp pitch for the first discounted offer on the page.
    pub pitch_whatsapp: Option<String>,
}

/// Display the catalog with filters applied.
#[instrument(skip(state, layout))]
pub async fn index(
    State(state): State<AppState>,
    layout: Layout,
    RawQuery(raw): RawQuery,
) -> impl IntoResponse {
    let query = parse_catalog_query(raw.as_deref());
    let catalog = state.catalog();
    let products = cards(catalog.search(&query));
    tracing::debug!(results = products.len(), filters = query.active_filter_count(), "Catalog search");

    ProductsIndexTemplate {
        layout,
        search: query.search.clone(),
        inspired_by: query.inspired_by.clone(),
        price_min: query.price_min.normalize().to_string(),
        price_max: query.price_max.normalize().to_string(),
        brands: catalog
            .brands()
            .into_iter()
            .map(|b| OptionView::new(b, b, query.brands.iter().any(|q| q == b)))
            .collect(),
        audiences: Audience::ALL
            .into_iter()
            .map(|a| OptionView::new(a.label(), a.label(), query.audiences.contains(&a)))
            .collect(),
        sizes: catalog
            .sizes()
            .into_iter()
            .map(|s| OptionView::new(s.to_string(), format!("{s}ml"), query.sizes.contains(&s)))
            .collect(),
        availability: [
            ("", "Todos", query.availability.is_none()),
            ("in_stock", "Em estoque", query.availability == Some(Availability::InStock)),
            ("out_of_stock", "Esgotado", query.availability == Some(Availability::OutOfStock)),
        ]
        .into_iter()
        .map(|(value, label, selected)| OptionView::new(value, label, selected))
        .collect(),
        sorts: SortBy::ALL
            .into_iter()
            .map(|s| OptionView::new(s.as_str(), s.label(), query.sort == s))
            .collect(),
        collections: collection_chips(query.collection.as_deref()),
        active_filters: query.active_filter_count(),
        products,
    }
}

fn collection_chips(active: Option<&str>) -> Vec<CollectionChip> {
    COLLECTIONS
        .iter()
        .map(|c| CollectionChip {
            label: c.label,
            url: format!("/produtos?colecao={}", c.id),
            active: active == Some(c.id),
        })
        .collect()
}

/// Display a product by slug.
///
/// # Errors
///
/// Returns 404 only when the catalog is empty.
#[instrument(skip(state, layout, cart, tracker))]
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    layout: Layout,
    cart: CartStore,
    tracker: UpsellTracker,
) -> Result<impl IntoResponse> {
    let product = state
        .catalog()
        .by_slug(&slug)
        .or_else(|| state.catalog().first())
        .ok_or_else(|| AppError::NotFound(slug.clone()))?;
    Ok(show(&state, product, layout, &cart, &tracker).await)
}

/// Display a product by numeric id.
///
/// # Errors
///
/// Returns 404 only when the catalog is empty.
#[instrument(skip(state, layout, cart, tracker))]
pub async fn show_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    layout: Layout,
    cart: CartStore,
    tracker: UpsellTracker,
) -> Result<impl IntoResponse> {
    let product = state
        .catalog()
        .by_id(&id)
        .or_else(|| state.catalog().first())
        .ok_or_else(|| AppError::NotFound(id.clone()))?;
    Ok(show(&state, product, layout, &cart, &tracker).await)
}

async fn show(
    state: &AppState,
    product: &Product,
    layout: Layout,
    cart: &CartStore,
    tracker: &UpsellTracker,
) -> ProductShowTemplate {
    let catalog = state.catalog();
    let cart = cart.load().await;
    let offers = eligible_offers(
        UpsellContext::Pdp,
        cart.subtotal(),
        &cart.product_ids(),
        Some(product.id.as_str()),
    );
    tracker
        .impressions(state.now(), &offers, UpsellContext::Pdp, cart.subtotal())
        .await;

    let offers = OfferCard::all(&offers, catalog);
    let pitch_whatsapp = offers.iter().find(|o| o.has_savings).map(|o| {
        whatsapp::link(
            &state.config().whatsapp_number,
            &whatsapp::custom_upsell_message(o.title, &format_brl(o.savings)),
        )
    });

    ProductShowTemplate {
        layout,
        product: ProductCard::from(product),
        tags: product.tags.clone(),
        related: cards(catalog.related(product, RELATED_LIMIT)),
        offers,
        pitch_whatsapp,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_filters() {
        let query = parse_catalog_query(Some(
            "q=khamrah&marca=LATTAFA&marca=ARMAF&publico=Unissex&tamanho=100&ordenar=price_asc",
        ));
        assert_eq!(query.search, "khamrah");
        assert_eq!(query.brands, vec!["LATTAFA", "ARMAF"]);
        assert_eq!(query.audiences, vec![Audience::Unissex]);
        assert_eq!(query.sizes, vec![100]);
        assert_eq!(query.sort, SortBy::PriceAsc);
        assert_eq!(query.active_filter_count(), 4);
    }

    #[test]
    fn test_parse_ignores_bad_values() {
        let query = parse_catalog_query(Some(
            "publico=Infantil&tamanho=grande&colecao=nada&ordenar=random&disponibilidade=",
        ));
        assert_eq!(query, CatalogQuery::default());
    }

    #[test]
    fn test_parse_price_and_collection() {
        let query = parse_catalog_query(Some("preco_min=100&preco_max=300&colecao=gourmand"));
        assert_eq!(query.price_min, Decimal::from(100));
        assert_eq!(query.price_max, Decimal::from(300));
        assert_eq!(query.collection.as_deref(), Some("gourmand"));
    }

    #[test]
    fn test_collection_chips_mark_active() {
        let chips = collection_chips(Some("baccarat"));
        assert_eq!(chips.len(), COLLECTIONS.len());
        assert!(chips.iter().any(|c| c.active && c.url.ends_with("baccarat")));
    }
}
