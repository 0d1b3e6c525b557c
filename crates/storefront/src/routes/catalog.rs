//! Catalog (store front page) route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use shopfloor_core::{CATEGORIES, ListFilter, Product, Record, filter_products, format_price};
use shopfloor_store::DocumentStore;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Option<String>,
    pub image: Option<String>,
    pub stock: u32,
    pub in_stock: bool,
    pub low_stock: bool,
    pub variant_count: usize,
}

impl From<&Record<Product>> for ProductCardView {
    fn from(record: &Record<Product>) -> Self {
        let product = &record.data;
        Self {
            id: record.id_str().to_owned(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.display_price().map(format_price),
            image: product.cover_image().map(str::to_owned),
            stock: product.total_stock(),
            in_stock: product.in_stock(),
            low_stock: product.in_stock() && product.is_low_stock(),
            variant_count: product.variants.len(),
        }
    }
}

/// Category selector option.
#[derive(Clone)]
pub struct CategoryOption {
    pub name: &'static str,
    pub selected: bool,
}

fn category_options(selected: &str) -> Vec<CategoryOption> {
    CATEGORIES
        .iter()
        .map(|&name| CategoryOption {
            name,
            selected: name == selected,
        })
        .collect()
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "store.html")]
pub struct StoreTemplate {
    pub page: PageContext,
    pub products: Vec<ProductCardView>,
    pub total: usize,
    pub search: String,
    pub category: String,
    pub categories: Vec<CategoryOption>,
}

/// Display the catalog, filtered by `q` (name search) and `category`.
///
/// # Errors
///
/// Returns an error if the product collection cannot be read.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(filter): Query<ListFilter>,
) -> Result<impl IntoResponse> {
    let products = DocumentStore::new(state.pool()).list::<Product>().await?;
    let visible: Vec<ProductCardView> = filter_products(&products, &filter)
        .into_iter()
        .map(ProductCardView::from)
        .collect();

    tracing::debug!(
        total = products.len(),
        shown = visible.len(),
        "Catalog filtered"
    );

    Ok(StoreTemplate {
        page: PageContext::load(&state, &session).await,
        products: visible,
        total: products.len(),
        search: filter.search.trim().to_owned(),
        category: filter.selector_or_all().to_owned(),
        categories: category_options(filter.selector_or_all()),
    })
}
