//! Static product catalog.
//!
//! The catalog is built once from a fixed table and never changes. Prices
//! are derived from the USD cost (or a brand fallback when the cost is
//! unknown), product ids are the 1-based table position, and ratings are a
//! deterministic function of that position.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::slug::product_slug;
use crate::types::{Audience, Availability, ProductId};

/// USD → BRL exchange rate used for pricing.
const USD_BRL: Decimal = Decimal::from_parts(520, 0, 0, false, 2);
/// Retail markup over converted cost.
const MARKUP: Decimal = Decimal::from_parts(26, 0, 0, false, 1);
/// Default upper bound of the price filter.
pub const PRICE_FILTER_MAX: u32 = 1000;

const PRODUCT_IMAGE: &str =
    "https://images.unsplash.com/photo-1541643600914-78b084683601?w=400&h=400&fit=crop&auto=format";

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub brand: String,
    pub audience: Audience,
    pub size_ml: u32,
    pub inspired_by: Option<String>,
    pub tags: Vec<String>,
    pub price: Decimal,
    pub cost_usd: Option<Decimal>,
    pub wholesale_usd: Option<Decimal>,
    pub stock: u32,
    pub availability: Availability,
    pub is_best_seller: bool,
    pub is_new: bool,
    pub rating: Decimal,
    pub reviews_count: u32,
    pub image: String,
}

impl Product {
    /// Whether the product can be bought.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.availability == Availability::InStock
    }

    /// Whether the product carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// One row of the static product table.
struct RawProduct {
    name: &'static str,
    brand: &'static str,
    audience: Audience,
    size_ml: u32,
    inspired_by: Option<&'static str>,
    /// USD cost in cents.
    cost_usd: Option<i64>,
    /// USD wholesale in cents.
    wholesale_usd: Option<i64>,
    stock: u32,
    is_best_seller: bool,
    tags: &'static [&'static str],
}

macro_rules! raw {
    ($name:literal, $brand:literal, $aud:ident, $size:literal, $insp:expr, $cost:expr, $whole:expr, $stock:literal, $best:literal, [$($tag:literal),*]) => {
        RawProduct {
            name: $name,
            brand: $brand,
            audience: Audience::$aud,
            size_ml: $size,
            inspired_by: $insp,
            cost_usd: $cost,
            wholesale_usd: $whole,
            stock: $stock,
            is_best_seller: $best,
            tags: &[$($tag),*],
        }
    };
}

#[rustfmt::skip]
static RAW_PRODUCTS: [RawProduct; 31] = [
    raw!("Club de Nuit Iconic", "ARMAF", Masculino, 105, Some("Bleu de Chanel"), None, None, 0, true, ["azul", "versatil", "fresco"]),
    raw!("Club de Nuit Intense", "ARMAF", Masculino, 105, Some("Aventus"), None, None, 0, true, ["assinatura", "frutado", "amadeirado"]),
    raw!("Club de Nuit Milestone", "ARMAF", Unissex, 105, Some("Millesime Imperial"), Some(3000), Some(2800), 9, true, ["marinho", "fresco", "luxo"]),
    raw!("Club de Nuit Precieux I.", "ARMAF", Unissex, 55, Some("Aventus Absolu"), Some(3800), Some(3600), 6, false, ["assinatura", "premium", "amadeirado"]),
    raw!("Club de Nuit Urban Elixir", "ARMAF", Masculino, 105, Some("Sauvage"), Some(3000), Some(2800), 12, true, ["noite", "versatil", "aromatico"]),
    raw!("Yum Yum", "ARMAF", Feminino, 100, Some("Very Good Girl"), Some(3700), Some(3500), 7, false, ["doce", "feminino", "noite"]),
    raw!("Khamrah", "LATTAFA", Unissex, 100, Some("Angel's Share"), Some(2000), Some(1800), 15, true, ["gourmand", "doce", "noite"]),
    raw!("Khamrah Qahwa", "LATTAFA", Unissex, 100, None, Some(2200), Some(2000), 8, true, ["cafe", "gourmand", "noite"]),
    raw!("Asad", "LATTAFA", Masculino, 100, Some("Sauvage Elixir"), Some(2000), Some(1800), 10, true, ["especiado", "noite", "intenso"]),
    raw!("Fakhar Black", "LATTAFA", Masculino, 100, Some("Y Eau de Parfum"), Some(2000), Some(1800), 11, false, ["fresco", "versatil", "aromatico"]),
    raw!("Yara", "LATTAFA", Feminino, 100, Some("Poison Girl"), Some(1800), Some(1500), 9, true, ["doce", "cremoso", "feminino"]),
    raw!("Yara Moi", "LATTAFA", Feminino, 100, Some("Marc Jacobs Perfect Intense"), Some(2000), Some(1800), 6, false, ["feminino", "elegante", "doce"]),
    raw!("Badee Noble Blush", "LATTAFA", Feminino, 100, Some("Good Girl Blush"), Some(2000), Some(1800), 13, false, ["floral", "feminino", "noite"]),
    raw!("Ana A. Rouge", "LATTAFA", Feminino, 60, Some("Baccarat Rouge 540 Extrait"), Some(1500), Some(1300), 5, false, ["baccarat", "ambarado", "doce"]),
    raw!("Ana Abiyedh", "LATTAFA", Feminino, 60, Some("Erba Pura"), None, None, 0, false, ["frutado", "erba_pura", "unissex"]),
    raw!("Al Nashama Caprice", "LATTAFA", Unissex, 100, Some("Bleu Electrique"), Some(2200), Some(2000), 7, false, ["azul", "noite", "versatil"]),
    raw!("Al Noble Safeer", "LATTAFA", Unissex, 100, Some("Oud for Happiness"), Some(2200), Some(2000), 8, false, ["oud", "amadeirado", "premium"]),
    raw!("Royal Blue", "ORIENTICA", Masculino, 80, Some("Layton"), Some(5900), None, 6, true, ["premium", "noite", "versatil"]),
    raw!("Luxury Royal Amber", "ORIENTICA", Unissex, 80, Some("Erba Pura"), Some(5000), None, 5, true, ["frutado", "premium", "assinatura"]),
    raw!("Velvet Gold", "ORIENTICA", Feminino, 80, Some("Gentle Fluidity Gold"), Some(5900), None, 7, false, ["elegante", "feminino", "premium"]),
    raw!("Amber Noir", "ORIENTICA", Unissex, 80, Some("Santal 33"), None, None, 0, false, ["amadeirado", "santal", "unissex"]),
    raw!("Amber Rouge", "ORIENTICA", Feminino, 80, Some("Baccarat Rouge 540 Extrait"), None, None, 0, true, ["baccarat", "doce", "premium"]),
    raw!("Watani Purple", "AL WATANIAH / FRENCH AVENUE", Feminino, 100, Some("Giorgio Armani Sì"), Some(1800), Some(1500), 10, false, ["elegante", "feminino", "dia"]),
    raw!("Shagaf Al Ward", "AL WATANIAH / FRENCH AVENUE", Feminino, 100, Some("Good Girl Blush"), Some(1800), Some(1500), 12, false, ["floral", "feminino", "noite"]),
    raw!("Durrat Al Aroos", "AL WATANIAH / FRENCH AVENUE", Feminino, 85, Some("Erba Pura"), Some(1800), Some(1500), 9, true, ["frutado", "erba_pura", "doce"]),
    raw!("Ameerati", "AL WATANIAH / FRENCH AVENUE", Feminino, 100, Some("Roberto Cavalli"), Some(1800), Some(1500), 8, false, ["feminino", "assinatura", "noite"]),
    raw!("Royal Blend", "AL WATANIAH / FRENCH AVENUE", Unissex, 100, Some("Angel's Share"), None, None, 0, true, ["gourmand", "doce", "noite"]),
    raw!("Spectre Ghost", "AL WATANIAH / FRENCH AVENUE", Masculino, 80, Some("Ani (Nishane)"), Some(3600), Some(3300), 7, false, ["especiado", "premium", "noite"]),
    raw!("Vulcan Feu", "AL WATANIAH / FRENCH AVENUE", Unissex, 100, None, Some(3800), Some(3600), 6, false, ["premium", "amadeirado", "assinatura"]),
    raw!("Vulcan Sable", "AL WATANIAH / FRENCH AVENUE", Unissex, 100, None, Some(3200), Some(3000), 8, false, ["amadeirado", "versatil", "premium"]),
    raw!("Veneno Bianco", "AL WATANIAH / FRENCH AVENUE", Unissex, 100, None, Some(3800), Some(3600), 5, false, ["premium", "noite", "intenso"]),
];

const RATINGS: [Decimal; 5] = [
    Decimal::from_parts(45, 0, 0, false, 1),
    Decimal::from_parts(46, 0, 0, false, 1),
    Decimal::from_parts(47, 0, 0, false, 1),
    Decimal::from_parts(48, 0, 0, false, 1),
    Decimal::from_parts(49, 0, 0, false, 1),
];

/// Round to the nearest ten, minus one: 405.6 → 409, 281.2 → 279.
#[must_use]
pub fn round_to_9(value: Decimal) -> Decimal {
    let tens = (value / Decimal::TEN)
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    tens * Decimal::TEN - Decimal::ONE
}

/// Retail price in BRL for a product.
#[must_use]
pub fn retail_price(cost_usd: Option<Decimal>, brand: &str, name: &str) -> Decimal {
    if let Some(cost) = cost_usd {
        return round_to_9(cost * USD_BRL * MARKUP);
    }

    let name = name.to_lowercase();
    let brand = brand.to_lowercase();
    if name.contains("club de nuit") || brand.contains("orientica") {
        Decimal::from(399)
    } else if brand.contains("lattafa") {
        Decimal::from(279)
    } else {
        Decimal::from(349)
    }
}

fn build_product(index: usize, raw: &RawProduct) -> Product {
    let cost_usd = raw.cost_usd.map(|cents| Decimal::new(cents, 2));
    let availability = if raw.stock > 0 {
        Availability::InStock
    } else {
        Availability::OutOfStock
    };
    #[allow(clippy::cast_possible_truncation)]
    let reviews_count = 100 + ((index * 137) % 800) as u32;

    Product {
        id: ProductId::new((index + 1).to_string()),
        slug: product_slug(raw.name, raw.brand),
        name: raw.name.to_string(),
        brand: raw.brand.to_string(),
        audience: raw.audience,
        size_ml: raw.size_ml,
        inspired_by: raw.inspired_by.map(str::to_string),
        tags: raw.tags.iter().map(|t| (*t).to_string()).collect(),
        price: retail_price(cost_usd, raw.brand, raw.name),
        cost_usd,
        wholesale_usd: raw.wholesale_usd.map(|cents| Decimal::new(cents, 2)),
        stock: raw.stock,
        availability,
        is_best_seller: raw.is_best_seller,
        is_new: index + 3 >= RAW_PRODUCTS.len(),
        rating: RATINGS[index % RATINGS.len()],
        reviews_count,
        image: PRODUCT_IMAGE.to_string(),
    }
}

/// A curated grouping of products by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub id: &'static str,
    pub label: &'static str,
    pub tags: &'static [&'static str],
}

impl Collection {
    /// Whether `product` carries any of this collection's tags.
    #[must_use]
    pub fn contains(&self, product: &Product) -> bool {
        self.tags.iter().any(|tag| product.has_tag(tag))
    }
}

/// Curated collections shown as chips above the catalog.
pub static COLLECTIONS: [Collection; 7] = [
    Collection { id: "aventus", label: "Aventus vibes", tags: &["assinatura", "frutado"] },
    Collection { id: "azul", label: "Azul versátil", tags: &["azul", "fresco", "versatil"] },
    Collection { id: "gourmand", label: "Doces gourmands", tags: &["gourmand", "doce"] },
    Collection { id: "baccarat", label: "Baccarat DNA", tags: &["baccarat"] },
    Collection { id: "erba", label: "Erba Pura style", tags: &["erba_pura", "frutado"] },
    Collection { id: "noite", label: "Ultra Male noite", tags: &["noite", "intenso"] },
    Collection { id: "femininos", label: "Femininos elegantes", tags: &["feminino", "elegante"] },
];

/// Look up a collection by id.
#[must_use]
pub fn collection(id: &str) -> Option<&'static Collection> {
    COLLECTIONS.iter().find(|c| c.id == id)
}

/// A non-catalog item offered as a checkout order bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddOn {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub price: Decimal,
    pub benefit: &'static str,
}

/// Order-bump add-ons.
pub static ADD_ONS: [AddOn; 3] = [
    AddOn {
        id: "DECANT_5ML_KHAMRAH",
        title: "Amostra 5ml - Khamrah",
        description: "Experimente nossa fragrância mais vendida em tamanho de teste",
        price: Decimal::from_parts(2990, 0, 0, false, 2),
        benefit: "Perfeito para testar antes de comprar o frasco completo",
    },
    AddOn {
        id: "PORTA_PERFUME",
        title: "Porta Perfume Premium",
        description: "Proteja seus perfumes com nosso porta perfume elegante",
        price: Decimal::from_parts(3990, 0, 0, false, 2),
        benefit: "Mantém a fragrância preservada por mais tempo",
    },
    AddOn {
        id: "KIT_HIDRATANTE",
        title: "Kit Hidratante Corporal",
        description: "Hidratante corporal com fragrância suave",
        price: Decimal::from_parts(4990, 0, 0, false, 2),
        benefit: "Compre junto e ganhe 15% de desconto",
    },
];

/// Look up an add-on by id.
#[must_use]
pub fn add_on(id: &str) -> Option<&'static AddOn> {
    ADD_ONS.iter().find(|a| a.id == id)
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    BestSeller,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl SortBy {
    /// All orderings in menu order.
    pub const ALL: [Self; 4] = [Self::BestSeller, Self::PriceAsc, Self::PriceDesc, Self::Newest];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BestSeller => "best_seller",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
        }
    }

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BestSeller => "Mais vendidos",
            Self::PriceAsc => "Menor preço",
            Self::PriceDesc => "Maior preço",
            Self::Newest => "Novidades",
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| format!("invalid sort: {s}"))
    }
}

/// Catalog filters and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub brands: Vec<String>,
    pub audiences: Vec<Audience>,
    pub sizes: Vec<u32>,
    pub inspired_by: String,
    /// `None` means any availability.
    pub availability: Option<Availability>,
    pub price_min: Decimal,
    pub price_max: Decimal,
    pub collection: Option<String>,
    pub sort: SortBy,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            brands: Vec::new(),
            audiences: Vec::new(),
            sizes: Vec::new(),
            inspired_by: String::new(),
            availability: None,
            price_min: Decimal::ZERO,
            price_max: Decimal::from(PRICE_FILTER_MAX),
            collection: None,
            sort: SortBy::default(),
        }
    }
}

impl CatalogQuery {
    /// Number of filter groups narrowing the result (collection and sort excluded).
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        [
            !self.search.is_empty(),
            !self.brands.is_empty(),
            !self.audiences.is_empty(),
            !self.sizes.is_empty(),
            !self.inspired_by.is_empty(),
            self.availability.is_some(),
            self.price_min > Decimal::ZERO || self.price_max < Decimal::from(PRICE_FILTER_MAX),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    fn matches(&self, product: &Product) -> bool {
        if let Some(active) = self.collection.as_deref().and_then(collection) {
            if !active.contains(product) {
                return false;
            }
        }

        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let hit = product.name.to_lowercase().contains(&needle)
                || product.brand.to_lowercase().contains(&needle)
                || product
                    .inspired_by
                    .as_ref()
                    .is_some_and(|i| i.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if !self.brands.is_empty() && !self.brands.contains(&product.brand) {
            return false;
        }
        if !self.audiences.is_empty() && !self.audiences.contains(&product.audience) {
            return false;
        }
        if !self.sizes.is_empty() && !self.sizes.contains(&product.size_ml) {
            return false;
        }

        if !self.inspired_by.is_empty() {
            let needle = self.inspired_by.to_lowercase();
            if !product
                .inspired_by
                .as_ref()
                .is_some_and(|i| i.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        if self.availability.is_some_and(|a| a != product.availability) {
            return false;
        }

        product.price >= self.price_min && product.price <= self.price_max
    }
}

/// The immutable product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Build the catalog from the static table.
    #[must_use]
    pub fn new() -> Self {
        let products = RAW_PRODUCTS
            .iter()
            .enumerate()
            .map(|(index, raw)| build_product(index, raw))
            .collect();
        Self { products }
    }

    /// All products in table order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// The first product, used as a fallback for unknown lookups.
    #[must_use]
    pub fn first(&self) -> Option<&Product> {
        self.products.first()
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    #[must_use]
    pub fn by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// Price of a catalog product or add-on.
    #[must_use]
    pub fn price_of(&self, id: &str) -> Option<Decimal> {
        self.by_id(id)
            .map(|p| p.price)
            .or_else(|| add_on(id).map(|a| a.price))
    }

    /// Display name of a catalog product or add-on.
    #[must_use]
    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.by_id(id)
            .map(|p| p.name.as_str())
            .or_else(|| add_on(id).map(|a| a.title))
    }

    /// Distinct brands in first-seen order.
    #[must_use]
    pub fn brands(&self) -> Vec<&str> {
        let mut brands: Vec<&str> = Vec::new();
        for product in &self.products {
            if !brands.contains(&product.brand.as_str()) {
                brands.push(&product.brand);
            }
        }
        brands
    }

    /// Distinct sizes, ascending.
    #[must_use]
    pub fn sizes(&self) -> Vec<u32> {
        let mut sizes: Vec<u32> = self.products.iter().map(|p| p.size_ml).collect();
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }

    /// Best sellers in table order.
    #[must_use]
    pub fn best_sellers(&self, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.is_best_seller)
            .take(limit)
            .collect()
    }

    /// Other products for the same audience.
    #[must_use]
    pub fn related(&self, product: &Product, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.audience == product.audience && p.id != product.id)
            .take(limit)
            .collect()
    }

    /// Apply filters and ordering.
    #[must_use]
    pub fn search(&self, query: &CatalogQuery) -> Vec<&Product> {
        let mut result: Vec<&Product> = self.products.iter().filter(|p| query.matches(p)).collect();

        // `sort_by` is stable, so ties keep table order.
        match query.sort {
            SortBy::BestSeller => result.sort_by_key(|p| !p.is_best_seller),
            SortBy::PriceAsc => result.sort_by(|a, b| a.price.cmp(&b.price)),
            SortBy::PriceDesc => result.sort_by(|a, b| b.price.cmp(&a.price)),
            SortBy::Newest => result.sort_by_key(|p| !p.is_new),
        }
        result
    }
}
